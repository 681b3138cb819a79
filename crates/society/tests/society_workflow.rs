//! Integration specifications for the society record service.
//!
//! Scenarios go through the public service facade and schema registry only, covering the
//! visitor gate log, the complaint desk, and the registry that describes every handle.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use society::records::{
    AssignmentDraft, BuildingDraft, ComplaintDraft, DefaultValue, FieldKind, NotificationDraft,
    SchemaRegistry, TimestampPolicy, VisitorDraft,
};
use society::{
    Assignment, Building, Complaint, ComplaintStatus, InMemoryDocumentStore,
    InMemoryUserDirectory, Notification, Role, ServiceError, SocietyService, Visitor,
    VisitorStatus,
};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 10, 0, 0)
        .single()
        .expect("valid instant")
}

fn service() -> SocietyService<InMemoryDocumentStore, InMemoryUserDirectory> {
    SocietyService::new(
        Arc::new(InMemoryDocumentStore::default()),
        Arc::new(InMemoryUserDirectory::with_users(["user-1", "user-2"])),
    )
    .with_clock(Arc::new(fixed_now))
}

#[test]
fn visitor_gate_log_end_to_end() {
    let service = service();

    let draft: VisitorDraft = serde_json::from_value(json!({
        "visitorName": "Jane Doe",
        "flatNumber": "12B",
        "visitorPhoneNumber": "555-0100",
        "purpose": "Delivery",
        "buildingNumber": "A1"
    }))
    .expect("draft parses");

    let arrived = service.create::<Visitor>(draft).expect("visitor logged");
    assert_eq!(arrived.record.check_in, fixed_now());
    assert_eq!(arrived.record.check_out, None);
    assert_eq!(arrived.record.status, VisitorStatus::CheckedIn);
    assert_eq!(arrived.record.additional_notes, "");

    let departed = service
        .check_out(&arrived.id, None)
        .expect("visitor checked out");
    assert_eq!(departed.record.status, VisitorStatus::CheckedOut);
    assert_eq!(departed.record.check_out, Some(fixed_now()));

    let log = service.list::<Visitor>().expect("gate log");
    assert_eq!(log.len(), 1);
    assert_eq!(log[0], departed);
}

#[test]
fn complaint_desk_end_to_end() {
    let service = service();

    let filed = service
        .create::<Complaint>(ComplaintDraft {
            user_id: Some("user-2".to_string()),
            complaint: Some("Water leaking into parking level".to_string()),
            ..ComplaintDraft::default()
        })
        .expect("complaint filed");
    assert_eq!(filed.record.status, ComplaintStatus::Pending);
    assert!(filed.record.comments.is_empty());

    service
        .set_complaint_status(&filed.id, ComplaintStatus::InProgress)
        .expect("status updated");
    service
        .add_comment(&filed.id, "Plumber inspected the pipe")
        .expect("comment added");
    let resolved = service
        .set_complaint_status(&filed.id, ComplaintStatus::Resolved)
        .expect("resolved");

    assert!(!resolved.record.is_open());
    assert_eq!(resolved.record.comments, vec!["Plumber inspected the pipe"]);

    let reopened = service
        .set_complaint_status(&filed.id, ComplaintStatus::Pending)
        .expect("reopening is allowed");
    assert!(reopened.record.is_open());
}

#[test]
fn every_handle_accepts_a_complete_draft() {
    let service = service();

    let flat = service
        .create::<Assignment>(AssignmentDraft {
            resident_name: Some("Kiran Shah".to_string()),
            flat_number: Some("4C".to_string()),
            building_name: Some("Orchid".to_string()),
            role: Some("president".to_string()),
            resident_number: Some("555-0199".to_string()),
            resident_email: Some("kiran@example.com".to_string()),
        })
        .expect("assignment");
    assert_eq!(flat.record.role, Role::President);

    let building = service
        .create::<Building>(BuildingDraft {
            building_name: Some("Orchid".to_string()),
            building_number: Some("B2".to_string()),
            number_of_flats: Some(json!(40)),
            location: Some("East wing".to_string()),
        })
        .expect("building");
    assert_eq!(building.record.number_of_flats, 40);

    let notice = service
        .create::<Notification>(NotificationDraft {
            name: Some("Kiran Shah".to_string()),
            role: Some("watchman".to_string()),
            title: Some("Gate timing".to_string()),
            message: Some("Main gate closes at 11pm.".to_string()),
        })
        .expect("notification");
    assert_eq!(notice.record.role, Role::Watchman);
}

#[test]
fn validation_failures_name_the_offending_field() {
    let service = service();

    let error = service
        .create::<Building>(BuildingDraft {
            building_name: Some("Orchid".to_string()),
            building_number: Some("B2".to_string()),
            number_of_flats: Some(json!(40)),
            location: None,
        })
        .expect_err("location missing");

    match error {
        ServiceError::Validation(validation) => {
            assert_eq!(validation.fields.len(), 1);
            assert_eq!(validation.fields[0].field, "location");
            assert_eq!(validation.fields[0].message, "Location is required");
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn registry_describes_defaults_and_policies() {
    let registry = SchemaRegistry::standard();
    assert_eq!(registry.len(), 5);

    let visitor = registry.get("Visitor").expect("visitor schema");
    let status = visitor.field("status").expect("status field");
    assert_eq!(status.default, Some(DefaultValue::Text("checked-in")));
    assert!(matches!(status.kind, FieldKind::Enumeration { values } if values.len() == 2));
    assert_eq!(
        visitor.field("checkOut").and_then(|field| field.default),
        Some(DefaultValue::Null)
    );

    let complaint = registry.get("Complaint").expect("complaint schema");
    assert_eq!(complaint.timestamps, TimestampPolicy::Manual);
    assert_eq!(
        complaint.field("userId").map(|field| field.kind),
        Some(FieldKind::Reference { target: "User" })
    );
}
