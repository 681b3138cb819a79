use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};

use crate::records::{
    AssignmentDraft, BuildingDraft, ComplaintDraft, NotificationDraft, SchemaRegistry, UserId,
    VisitorDraft,
};
use crate::router::society_router;
use crate::store::{
    Clock, DocumentStore, InMemoryDocumentStore, InMemoryUserDirectory, RecordId,
    SocietyService, StoreError, UserDirectory,
};

pub(super) const RESIDENT: &str = "user-17";

pub(super) fn opening_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0)
        .single()
        .expect("valid instant")
}

/// Clock that starts at `opening_time` and can be moved forward by tests.
#[derive(Clone)]
pub(super) struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub(super) fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(opening_time())),
        }
    }

    pub(super) fn advance(&self, minutes: i64) -> DateTime<Utc> {
        let mut guard = self.now.lock().expect("clock mutex poisoned");
        *guard += Duration::minutes(minutes);
        *guard
    }

    pub(super) fn clock(&self) -> Clock {
        let now = self.now.clone();
        Arc::new(move || *now.lock().expect("clock mutex poisoned"))
    }
}

pub(super) type TestService = SocietyService<InMemoryDocumentStore, InMemoryUserDirectory>;

pub(super) fn build_service() -> (TestService, Arc<InMemoryDocumentStore>, ManualClock) {
    let store = Arc::new(InMemoryDocumentStore::default());
    let users = Arc::new(InMemoryUserDirectory::with_users([RESIDENT]));
    let clock = ManualClock::new();
    let service = SocietyService::new(store.clone(), users).with_clock(clock.clock());
    (service, store, clock)
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    society_router(Arc::new(service), Arc::new(SchemaRegistry::standard()))
}

pub(super) fn assignment() -> AssignmentDraft {
    AssignmentDraft {
        resident_name: Some("Asha Rao".to_string()),
        flat_number: Some("12B".to_string()),
        building_name: Some("Lotus".to_string()),
        role: None,
        resident_number: Some("555-0142".to_string()),
        resident_email: Some("asha@example.com".to_string()),
    }
}

pub(super) fn building() -> BuildingDraft {
    BuildingDraft {
        building_name: Some("Lotus".to_string()),
        building_number: Some("A1".to_string()),
        number_of_flats: Some(json!(24)),
        location: Some("North gate".to_string()),
    }
}

pub(super) fn complaint() -> ComplaintDraft {
    ComplaintDraft {
        user_id: Some(RESIDENT.to_string()),
        complaint: Some("Corridor light on floor 3 is out".to_string()),
        ..ComplaintDraft::default()
    }
}

pub(super) fn notification() -> NotificationDraft {
    NotificationDraft {
        name: Some("Meera Iyer".to_string()),
        role: Some("admin".to_string()),
        title: Some("Maintenance dues".to_string()),
        message: Some("Dues for June are payable by the 10th.".to_string()),
    }
}

pub(super) fn visitor() -> VisitorDraft {
    VisitorDraft {
        visitor_name: Some("Jane Doe".to_string()),
        flat_number: Some("12B".to_string()),
        visitor_phone_number: Some("555-0100".to_string()),
        purpose: Some("Delivery".to_string()),
        building_number: Some("A1".to_string()),
        ..VisitorDraft::default()
    }
}

/// Store whose every call fails, for exercising 500 paths.
pub(super) struct UnavailableStore;

impl DocumentStore for UnavailableStore {
    fn insert(&self, _: &str, _: &RecordId, _: Value) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("maintenance window".to_string()))
    }

    fn fetch(&self, _: &str, _: &RecordId) -> Result<Option<Value>, StoreError> {
        Err(StoreError::Unavailable("maintenance window".to_string()))
    }

    fn replace(&self, _: &str, _: &RecordId, _: Value) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("maintenance window".to_string()))
    }

    fn delete(&self, _: &str, _: &RecordId) -> Result<Value, StoreError> {
        Err(StoreError::Unavailable("maintenance window".to_string()))
    }

    fn list(&self, _: &str) -> Result<Vec<(RecordId, Value)>, StoreError> {
        Err(StoreError::Unavailable("maintenance window".to_string()))
    }
}

/// Directory that cannot be reached.
pub(super) struct OfflineDirectory;

impl UserDirectory for OfflineDirectory {
    fn contains(&self, _: &UserId) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("directory offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
