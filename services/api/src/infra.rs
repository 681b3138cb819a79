use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use society::config::DirectoryConfig;
use society::{InMemoryDocumentStore, InMemoryUserDirectory, SocietyService};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type LocalService = SocietyService<InMemoryDocumentStore, InMemoryUserDirectory>;

pub(crate) fn build_service(directory: &DirectoryConfig) -> LocalService {
    let users = InMemoryUserDirectory::from_config(directory);
    if users.is_open() {
        warn!("APP_KNOWN_USERS not set; complaints may reference any user id");
    } else if let Some(known) = &directory.known_users {
        info!(known_users = known.len(), "user directory seeded");
    }

    SocietyService::new(
        Arc::new(InMemoryDocumentStore::default()),
        Arc::new(users),
    )
}
