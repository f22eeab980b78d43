use std::path::Path;
use std::sync::Arc;

use formflow_persistence::{FilePersistenceAdapter, InMemoryPersistenceAdapter, PersistenceAdapter};
use serde_json::Value;

use crate::dto::StoredTemplate;
use crate::store::Collection;

pub struct AppState {
    pub conversations: Arc<dyn PersistenceAdapter>,
    pub templates: Collection<StoredTemplate>,
    pub objects: Collection<Value>,
}

impl AppState {
    /// Everything lives in memory and vanishes with the process.
    pub fn in_memory() -> Self {
        Self {
            conversations: Arc::new(InMemoryPersistenceAdapter::new()),
            templates: Collection::in_memory("template"),
            objects: Collection::in_memory("object"),
        }
    }

    /// Conversations are stored as JSON files directly under `data_dir`,
    /// templates and objects in its `templates/` and `objects/` subdirectories.
    pub fn with_data_dir(data_dir: &Path) -> Self {
        log::info!("Storing data at: {:?}", data_dir);
        Self {
            conversations: Arc::new(FilePersistenceAdapter::new(data_dir)),
            templates: Collection::on_disk("template", &data_dir.join("templates")),
            objects: Collection::on_disk("object", &data_dir.join("objects")),
        }
    }
}
