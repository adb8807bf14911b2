use crate::config::ServerConfig;
use crate::insights::InsightPipeline;
use csvinsight_ai::InsightGenerator;
use csvinsight_storage::ReportStore;
use std::sync::Arc;

/// Shared handler state. Every field is cheap to clone; the report store's
/// connection pool is the only process-wide resource.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn InsightGenerator>,
    pub store: Arc<dyn ReportStore>,
    pub pipeline: Arc<InsightPipeline>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(
        generator: Arc<dyn InsightGenerator>,
        store: Arc<dyn ReportStore>,
        config: ServerConfig,
    ) -> Self {
        let pipeline = Arc::new(InsightPipeline::new(generator.clone(), store.clone()));
        Self {
            generator,
            store,
            pipeline,
            config: Arc::new(config),
        }
    }
}
