use crate::catalog::{CatalogError, TemplateCatalog};
use crate::config::AppConfig;
use crate::storage::{BlobStore, LocalBlobStore};
use log::{info, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Everything a request handler needs, built once in `main`.
pub struct AppContext {
    pub config: AppConfig,
    pub catalog: TemplateCatalog,
    pub store: Box<dyn BlobStore>,
}

impl AppContext {
    pub fn new(config: AppConfig, catalog: TemplateCatalog, store: Box<dyn BlobStore>) -> Self {
        Self {
            config,
            catalog,
            store,
        }
    }

    /// Loads the template families and opens the local blob store.
    ///
    /// Missing templates and an unusable store are only logged; `/health`
    /// reports them and requests that need them fail on their own.
    pub fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        let mut catalog = match &config.families_file {
            Some(path) => TemplateCatalog::from_path(path)?,
            None => TemplateCatalog::embedded()?,
        };
        if let Some(file) = &config.default_template {
            catalog = catalog.with_legacy_file(file.as_str());
        }

        for file in catalog.template_files() {
            if !config.template_path(file).is_file() {
                warn!(
                    "Template {} is missing from {}",
                    file,
                    config.template_dir.display()
                );
            }
        }

        let store = LocalBlobStore::new(&config.store_root);
        if let Err(e) = store.create_bucket(&config.bucket_name) {
            warn!("Bucket {} is not usable: {}", config.bucket_name, e);
        }
        info!(
            "Storing documents in bucket {} under {}",
            config.bucket_name,
            config.store_root.display()
        );

        Ok(Self::new(config, catalog, Box::new(store)))
    }
}
