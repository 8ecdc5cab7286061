use super::parser::DocumentFormat;
use super::store::CutoffStore;
use crate::config::CutoffSourceConfig;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("cutoff document '{location}' could not be read: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cutoff document '{0}' is not available")]
    NotFound(String),
}

/// Supplies raw boundary documents by location.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<String, FetchError>;
}

/// Reads documents relative to a base directory.
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    base_dir: PathBuf,
}

impl FileSystemSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

#[async_trait]
impl DocumentSource for FileSystemSource {
    async fn fetch(&self, location: &str) -> Result<String, FetchError> {
        let path = self.base_dir.join(location);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| FetchError::Io {
                location: path.display().to_string(),
                source,
            })
    }
}

/// In-memory documents, keyed by location.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, location: impl Into<String>, text: impl Into<String>) -> Self {
        self.documents.insert(location.into(), text.into());
        self
    }
}

#[async_trait]
impl DocumentSource for StaticSource {
    async fn fetch(&self, location: &str) -> Result<String, FetchError> {
        self.documents
            .get(location)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(location.to_string()))
    }
}

/// Locations of the primary (compulsory or legacy) and elective documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLocations {
    pub primary: String,
    pub elective: String,
}

impl Default for DocumentLocations {
    fn default() -> Self {
        Self {
            primary: CutoffSourceConfig::DEFAULT_PRIMARY.to_string(),
            elective: CutoffSourceConfig::DEFAULT_ELECTIVE.to_string(),
        }
    }
}

impl From<&CutoffSourceConfig> for DocumentLocations {
    fn from(config: &CutoffSourceConfig) -> Self {
        Self {
            primary: config.primary.clone(),
            elective: config.elective.clone(),
        }
    }
}

/// Result of the startup load. An empty store means generic fallback mode.
#[derive(Debug, Clone, Default)]
pub struct LoadedCutoffs {
    pub store: CutoffStore,
    pub using_generic_fallback: bool,
}

impl LoadedCutoffs {
    pub fn generic_fallback() -> Self {
        Self {
            store: CutoffStore::new(),
            using_generic_fallback: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum PrimaryFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("no subject cutoffs were recognised in '{0}'")]
    Empty(String),
}

pub struct CutoffLoader<S> {
    source: S,
    locations: DocumentLocations,
}

impl<S: DocumentSource> CutoffLoader<S> {
    pub fn new(source: S, locations: DocumentLocations) -> Self {
        Self { source, locations }
    }

    /// Fetches both documents concurrently and builds the merged store.
    ///
    /// Never fails: a missing or empty primary document degrades to generic
    /// fallback mode, a missing elective document only drops electives.
    pub async fn load(&self) -> LoadedCutoffs {
        let (primary, elective) = tokio::join!(
            self.source.fetch(&self.locations.primary),
            self.source.fetch(&self.locations.elective),
        );

        match self.assemble(primary, elective) {
            Ok(store) => {
                info!(subjects = store.len(), "loaded subject-specific cutoffs");
                LoadedCutoffs {
                    store,
                    using_generic_fallback: false,
                }
            }
            Err(err) => {
                warn!(error = %err, "falling back to generic cutoffs");
                LoadedCutoffs::generic_fallback()
            }
        }
    }

    fn assemble(
        &self,
        primary: Result<String, FetchError>,
        elective: Result<String, FetchError>,
    ) -> Result<CutoffStore, PrimaryFailure> {
        let primary = primary?;
        let mut store = DocumentFormat::sniff_primary(&primary).parse(&primary);
        if store.is_empty() {
            return Err(PrimaryFailure::Empty(self.locations.primary.clone()));
        }

        match elective {
            Ok(text) if DocumentFormat::is_elective_document(&text) => {
                store.merge(DocumentFormat::Elective.parse(&text));
            }
            Ok(_) => info!(
                location = %self.locations.elective,
                "elective document has no recognised cut-off tables"
            ),
            Err(err) => info!(error = %err, "elective cutoffs unavailable"),
        }

        Ok(store)
    }
}

/// Loads cutoffs from `source` using the given document locations.
pub async fn load_cutoff_data<S: DocumentSource>(
    source: S,
    locations: DocumentLocations,
) -> LoadedCutoffs {
    CutoffLoader::new(source, locations).load().await
}
