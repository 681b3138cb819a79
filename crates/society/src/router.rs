use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::records::{
    screen, settle, Assignment, Building, Choice, Complaint, ComplaintStatus, FieldSpec,
    Notification, Record, SchemaRegistry, Screened, ValidationError, Visitor, BODY_FIELD,
};
use crate::store::{DocumentStore, RecordId, ServiceError, SocietyService, StoreError, UserDirectory};

/// Shared state handed to every handler.
pub struct RouterState<S, U> {
    pub service: Arc<SocietyService<S, U>>,
    pub registry: Arc<SchemaRegistry>,
}

impl<S, U> Clone for RouterState<S, U> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            registry: self.registry.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutRequest {
    #[serde(default)]
    pub check_out: Option<DateTime<Utc>>,
}

/// Unreadable bodies get the same 422 shape as field failures, pinned to `body`.
fn unreadable_body(handle: &'static str, rejection: JsonRejection) -> Response {
    let error = ValidationError::single(handle, BODY_FIELD, rejection.body_text());
    ServiceError::Validation(error).into_response()
}

/// Router builder exposing CRUD endpoints for every record handle plus the lifecycle helpers.
pub fn society_router<S, U>(
    service: Arc<SocietyService<S, U>>,
    registry: Arc<SchemaRegistry>,
) -> Router
where
    S: DocumentStore + 'static,
    U: UserDirectory + 'static,
{
    let router = Router::new();
    let router = collection_routes::<Assignment, S, U>(router);
    let router = collection_routes::<Building, S, U>(router);
    let router = collection_routes::<Complaint, S, U>(router);
    let router = collection_routes::<Notification, S, U>(router);
    let router = collection_routes::<Visitor, S, U>(router);

    router
        .route(
            "/api/v1/complaints/:id/comments",
            post(comment_handler::<S, U>),
        )
        .route(
            "/api/v1/complaints/:id/status",
            put(complaint_status_handler::<S, U>),
        )
        .route(
            "/api/v1/visitors/:id/check-out",
            post(check_out_handler::<S, U>),
        )
        .route("/api/v1/schemas", get(schemas_handler::<S, U>))
        .route("/api/v1/schemas/:handle", get(schema_handler::<S, U>))
        .with_state(RouterState { service, registry })
}

fn collection_routes<R, S, U>(
    router: Router<RouterState<S, U>>,
) -> Router<RouterState<S, U>>
where
    R: Record,
    S: DocumentStore + 'static,
    U: UserDirectory + 'static,
{
    let base = format!("/api/v1/{}", R::SCHEMA.collection);
    let item = format!("{base}/:id");
    router
        .route(
            &base,
            get(list_handler::<R, S, U>).post(create_handler::<R, S, U>),
        )
        .route(
            &item,
            get(fetch_handler::<R, S, U>)
                .patch(update_handler::<R, S, U>)
                .delete(delete_handler::<R, S, U>),
        )
}

pub(crate) async fn create_handler<R, S, U>(
    State(state): State<RouterState<S, U>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response
where
    R: Record,
    S: DocumentStore + 'static,
    U: UserDirectory + 'static,
{
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => return unreadable_body(R::SCHEMA.handle, rejection),
    };

    match state.service.create_json::<R>(body) {
        Ok(document) => (StatusCode::CREATED, Json(document)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn list_handler<R, S, U>(State(state): State<RouterState<S, U>>) -> Response
where
    R: Record,
    S: DocumentStore + 'static,
    U: UserDirectory + 'static,
{
    match state.service.list::<R>() {
        Ok(documents) => (StatusCode::OK, Json(documents)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn fetch_handler<R, S, U>(
    State(state): State<RouterState<S, U>>,
    Path(id): Path<String>,
) -> Response
where
    R: Record,
    S: DocumentStore + 'static,
    U: UserDirectory + 'static,
{
    match state.service.fetch::<R>(&RecordId(id)) {
        Ok(document) => (StatusCode::OK, Json(document)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn update_handler<R, S, U>(
    State(state): State<RouterState<S, U>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response
where
    R: Record,
    S: DocumentStore + 'static,
    U: UserDirectory + 'static,
{
    let patch = match body {
        Ok(Json(patch)) => patch,
        Err(rejection) => return unreadable_body(R::SCHEMA.handle, rejection),
    };

    match state.service.update_json::<R>(&RecordId(id), patch) {
        Ok(document) => (StatusCode::OK, Json(document)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn delete_handler<R, S, U>(
    State(state): State<RouterState<S, U>>,
    Path(id): Path<String>,
) -> Response
where
    R: Record,
    S: DocumentStore + 'static,
    U: UserDirectory + 'static,
{
    match state.service.delete::<R>(&RecordId(id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn comment_handler<S, U>(
    State(state): State<RouterState<S, U>>,
    Path(id): Path<String>,
    request: Result<Json<CommentRequest>, JsonRejection>,
) -> Response
where
    S: DocumentStore + 'static,
    U: UserDirectory + 'static,
{
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => return unreadable_body(Complaint::SCHEMA.handle, rejection),
    };

    match state.service.add_comment(&RecordId(id), request.comment) {
        Ok(document) => (StatusCode::OK, Json(document)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn complaint_status_handler<S, U>(
    State(state): State<RouterState<S, U>>,
    Path(id): Path<String>,
    request: Result<Json<StatusRequest>, JsonRejection>,
) -> Response
where
    S: DocumentStore + 'static,
    U: UserDirectory + 'static,
{
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => return unreadable_body(Complaint::SCHEMA.handle, rejection),
    };

    let Some(status) = ComplaintStatus::from_label(&request.status) else {
        let message = Complaint::SCHEMA
            .field("status")
            .map(FieldSpec::invalid_message)
            .unwrap_or_else(|| format!("unknown status '{}'", request.status));
        let error = ValidationError::single(Complaint::SCHEMA.handle, "status", message);
        return ServiceError::Validation(error).into_response();
    };

    match state.service.set_complaint_status(&RecordId(id), status) {
        Ok(document) => (StatusCode::OK, Json(document)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn check_out_handler<S, U>(
    State(state): State<RouterState<S, U>>,
    Path(id): Path<String>,
    request: Result<Json<Value>, JsonRejection>,
) -> Response
where
    S: DocumentStore + 'static,
    U: UserDirectory + 'static,
{
    let at = match request {
        Ok(Json(body)) => match departure_time(body) {
            Ok(at) => at,
            Err(error) => return ServiceError::Validation(error).into_response(),
        },
        Err(JsonRejection::MissingJsonContentType(_)) => None,
        Err(rejection) => return unreadable_body(Visitor::SCHEMA.handle, rejection),
    };

    match state.service.check_out(&RecordId(id), at) {
        Ok(document) => (StatusCode::OK, Json(document)).into_response(),
        Err(err) => err.into_response(),
    }
}

fn departure_time(body: Value) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let Screened { draft, mismatched } = screen::<CheckOutRequest>(Visitor::SCHEMA, body)?;
    settle(Visitor::SCHEMA, mismatched, Ok(draft.check_out))
}

pub(crate) async fn schemas_handler<S, U>(State(state): State<RouterState<S, U>>) -> Response
where
    S: DocumentStore + 'static,
    U: UserDirectory + 'static,
{
    let schemas: Vec<_> = state.registry.schemas().collect();
    (StatusCode::OK, Json(schemas)).into_response()
}

pub(crate) async fn schema_handler<S, U>(
    State(state): State<RouterState<S, U>>,
    Path(handle): Path<String>,
) -> Response
where
    S: DocumentStore + 'static,
    U: UserDirectory + 'static,
{
    match state.registry.get(&handle) {
        Some(schema) => (StatusCode::OK, Json(schema)).into_response(),
        None => {
            let payload = json!({
                "error": format!("unknown record handle '{handle}'"),
                "handles": state.registry.handles().collect::<Vec<_>>(),
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ServiceError::Validation(error) => {
                let payload = json!({
                    "error": "validation failed",
                    "handle": error.handle,
                    "fields": error.fields,
                });
                (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
            }
            ServiceError::Store(StoreError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            ServiceError::Store(StoreError::Conflict) => {
                (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response()
            }
            ServiceError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
        }
    }
}
