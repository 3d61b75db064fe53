use std::sync::Arc;

use crate::campaigns::visits::VisitLogger;
use crate::config::Config;
use crate::store::CampaignStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Client profiles and campaign view records. Redis in production.
    pub store: Arc<dyn CampaignStore>,
    /// Analytics sink. Postgres when `DATABASE_URL` is set, the service log otherwise.
    pub visit_logger: Arc<dyn VisitLogger>,
    pub config: Config,
}
