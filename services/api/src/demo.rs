use crate::infra::LocalService;
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use serde_json::json;
use society::config::DirectoryConfig;
use society::error::AppError;
use society::records::{
    AssignmentDraft, BuildingDraft, ComplaintDraft, DefaultValue, FieldKind, NotificationDraft,
    RecordSchema, SchemaRegistry, VisitorDraft,
};
use society::{
    Assignment, Building, Complaint, ComplaintStatus, Notification, Record, ServiceError, Visitor,
};

#[derive(Args, Debug, Default)]
pub(crate) struct SchemasArgs {
    /// Only print the schema registered under this handle (e.g. Visitor)
    #[arg(long)]
    pub(crate) handle: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Minutes the demo visitor stays before checking out
    #[arg(long, default_value_t = 25)]
    pub(crate) visit_minutes: i64,
    /// Skip the complaint portion of the demo
    #[arg(long)]
    pub(crate) skip_complaint: bool,
    /// Print every stored document as JSON at the end
    #[arg(long)]
    pub(crate) dump: bool,
}

pub(crate) fn run_schemas(args: SchemasArgs) -> Result<(), AppError> {
    let registry = SchemaRegistry::standard();

    match args.handle {
        Some(handle) => match registry.get(&handle) {
            Some(schema) => render_schema(schema),
            None => {
                let known: Vec<_> = registry.handles().collect();
                println!("Unknown handle '{handle}'. Known handles: {}", known.join(", "));
            }
        },
        None => {
            for schema in registry.schemas() {
                render_schema(schema);
                println!();
            }
        }
    }

    Ok(())
}

fn render_schema(schema: &RecordSchema) {
    println!(
        "{} (collection '{}', {:?} timestamps)",
        schema.handle, schema.collection, schema.timestamps
    );
    for field in schema.fields {
        let requirement = if field.required {
            "required".to_string()
        } else {
            match field.default {
                Some(default) => format!("default {}", describe_default(default)),
                None => "optional".to_string(),
            }
        };
        println!(
            "- {}: {} ({})",
            field.name,
            describe_kind(field.kind),
            requirement
        );
    }
}

fn describe_kind(kind: FieldKind) -> String {
    match kind {
        FieldKind::Text => "text".to_string(),
        FieldKind::Number => "number".to_string(),
        FieldKind::Date => "timestamp".to_string(),
        FieldKind::Reference { target } => format!("reference to {target}"),
        FieldKind::Enumeration { values } => format!("one of [{}]", values.join(", ")),
        FieldKind::TextList => "list of text".to_string(),
    }
}

fn describe_default(default: DefaultValue) -> String {
    match default {
        DefaultValue::Text(text) => format!("\"{text}\""),
        DefaultValue::Now => "creation time".to_string(),
        DefaultValue::Null => "null".to_string(),
        DefaultValue::EmptyList => "[]".to_string(),
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        visit_minutes,
        skip_complaint,
        dump,
    } = args;

    let service = crate::infra::build_service(&DirectoryConfig::default());

    println!("Society records demo");
    let building = service.create::<Building>(BuildingDraft {
        building_name: Some("Lotus".to_string()),
        building_number: Some("A1".to_string()),
        number_of_flats: Some(json!(24)),
        location: Some("North gate".to_string()),
    })?;
    println!(
        "- Building {} '{}' with {} flats ({})",
        building.id,
        building.record.building_name,
        building.record.number_of_flats,
        building.record.location
    );

    let flat = service.create::<Assignment>(AssignmentDraft {
        resident_name: Some("Asha Rao".to_string()),
        flat_number: Some("12B".to_string()),
        building_name: Some(building.record.building_name.clone()),
        role: None,
        resident_number: Some("555-0142".to_string()),
        resident_email: Some("asha@example.com".to_string()),
    })?;
    println!(
        "- {} assigned to flat {} as {}",
        flat.record.resident_name, flat.record.flat_number, flat.record.role
    );

    let notice = service.create::<Notification>(NotificationDraft {
        name: Some("Meera Iyer".to_string()),
        role: Some("admin".to_string()),
        title: Some("Water supply".to_string()),
        message: Some("Tanks will be cleaned on Sunday morning.".to_string()),
    })?;
    println!(
        "- Notice '{}' posted by {} ({})",
        notice.record.title, notice.record.name, notice.record.role
    );

    println!("\nVisitor gate log");
    let visitor = service.create::<Visitor>(VisitorDraft {
        visitor_name: Some("Jane Doe".to_string()),
        flat_number: Some(flat.record.flat_number.clone()),
        visitor_phone_number: Some("555-0100".to_string()),
        purpose: Some("Delivery".to_string()),
        building_number: Some(building.record.building_number.clone()),
        ..VisitorDraft::default()
    })?;
    println!(
        "- {} checked in at {} (status {})",
        visitor.record.visitor_name,
        format_instant(visitor.record.check_in),
        visitor.record.status
    );

    let departure = Duration::try_minutes(visit_minutes.max(0))
        .and_then(|stay| visitor.record.check_in.checked_add_signed(stay))
        .ok_or_else(|| {
            AppError::Usage(format!("--visit-minutes {visit_minutes} is out of range"))
        })?;
    let visitor = service.check_out(&visitor.id, Some(departure))?;
    println!(
        "- {} checked out at {} (status {})",
        visitor.record.visitor_name,
        visitor
            .record
            .check_out
            .map(format_instant)
            .unwrap_or_else(|| "unknown".to_string()),
        visitor.record.status
    );

    match service.create::<Visitor>(VisitorDraft {
        visitor_name: Some("Unnamed courier".to_string()),
        ..VisitorDraft::default()
    }) {
        Ok(_) => println!("- Incomplete visitor entry was unexpectedly accepted"),
        Err(ServiceError::Validation(error)) => {
            println!("- Incomplete visitor entry rejected:");
            for field in &error.fields {
                println!("    - {}: {}", field.field, field.message);
            }
        }
        Err(other) => return Err(other.into()),
    }

    if !skip_complaint {
        run_complaint_demo(&service)?;
    }

    if dump {
        println!("\nStored documents");
        dump_collection::<Building>(&service)?;
        dump_collection::<Assignment>(&service)?;
        dump_collection::<Notification>(&service)?;
        dump_collection::<Visitor>(&service)?;
        dump_collection::<Complaint>(&service)?;
    }

    Ok(())
}

fn run_complaint_demo(service: &LocalService) -> Result<(), AppError> {
    println!("\nComplaint desk");
    let complaint = service.create::<Complaint>(ComplaintDraft {
        user_id: Some("user-17".to_string()),
        complaint: Some("Corridor light on floor 3 is out".to_string()),
        ..ComplaintDraft::default()
    })?;
    println!(
        "- Complaint {} filed: '{}' ({})",
        complaint.id, complaint.record.complaint, complaint.record.status
    );

    service.set_complaint_status(&complaint.id, ComplaintStatus::InProgress)?;
    service.add_comment(&complaint.id, "Electrician notified")?;
    let complaint = service.set_complaint_status(&complaint.id, ComplaintStatus::Resolved)?;
    println!("- Status now {}", complaint.record.status);
    for comment in &complaint.record.comments {
        println!("    - {comment}");
    }

    Ok(())
}

fn dump_collection<R: Record>(service: &LocalService) -> Result<(), AppError> {
    let documents = service.list::<R>()?;
    match serde_json::to_string_pretty(&documents) {
        Ok(json) => println!("{} ({}):\n{}", R::SCHEMA.handle, documents.len(), json),
        Err(err) => println!("{} unavailable: {}", R::SCHEMA.handle, err),
    }
    Ok(())
}

fn format_instant(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}
