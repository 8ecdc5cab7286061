use dse_cutoffs::config::CutoffSourceConfig;
use dse_cutoffs::cutoffs::{load_cutoff_data, DocumentLocations, FileSystemSource, LoadedCutoffs};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Read-only cutoff data shared by the cutoff and attempt handlers.
#[derive(Clone, Default)]
pub(crate) struct CutoffState {
    pub(crate) cutoffs: Arc<LoadedCutoffs>,
}

impl CutoffState {
    pub(crate) fn new(cutoffs: LoadedCutoffs) -> Self {
        Self {
            cutoffs: Arc::new(cutoffs),
        }
    }
}

pub(crate) async fn load_from_config(config: &CutoffSourceConfig) -> LoadedCutoffs {
    let source = FileSystemSource::new(config.base_dir.clone());
    load_cutoff_data(source, DocumentLocations::from(config)).await
}
