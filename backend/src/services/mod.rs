//! # HTTP Services
//!
//! Thin actix-web adapters over the replacement builder, the document engine
//! and the blob store.
//!
//! ## Sub-modules:
//! - `form`: renders the petition form and handles the plain form submission.
//! - `documents`: generates one document per `docType`, or all of them as a zip.
//! - `status`: readiness and configuration reports.
//! - `assets`: stylesheets embedded in the binary.
//! - `attachment`: serves stored objects as downloads.

pub mod assets;
pub mod attachment;
pub mod documents;
pub mod form;
pub mod status;

use crate::error::{AppError, AppResult};
use actix_web::web::{FormConfig, ServiceConfig};

/// Largest accepted form body.
pub const FORM_LIMIT: usize = 1024 * 1024;

/// Registers every route of the service.
pub fn configure_routes(cfg: &mut ServiceConfig) {
    cfg.app_data(form_config())
        .configure(form::configure_routes)
        .configure(documents::configure_routes)
        .configure(status::configure_routes)
        .configure(assets::configure_routes);
}

/// Form extractor settings. A body that is too large or not url-encoded is
/// answered with the usual JSON error body.
pub fn form_config() -> FormConfig {
    FormConfig::default()
        .limit(FORM_LIMIT)
        .error_handler(|err, _req| AppError::InvalidForm(err.to_string()).into())
}

/// Runs document and storage work on the blocking pool.
///
/// A panic inside `work` is reported as an internal error.
pub async fn run_blocking<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("document task failed: {e}")))?
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::catalog::TemplateCatalog;
    use crate::config::AppConfig;
    use crate::context::AppContext;
    use crate::docx::substitute::tests::docx;
    use crate::storage::LocalBlobStore;
    use actix_web::web;
    use tempfile::TempDir;

    /// A context over temporary template and store directories.
    pub(crate) struct Fixture {
        pub dir: TempDir,
        pub ctx: web::Data<AppContext>,
    }

    impl Fixture {
        pub(crate) fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let config = AppConfig {
                store_root: dir.path().join("store"),
                template_dir: dir.path().join("templates"),
                debug: true,
                ..AppConfig::default()
            };
            std::fs::create_dir_all(&config.template_dir).unwrap();
            let store = LocalBlobStore::new(&config.store_root);
            store.create_bucket(&config.bucket_name).unwrap();

            let ctx = AppContext::new(
                config,
                TemplateCatalog::embedded().unwrap(),
                Box::new(store),
            );
            Self {
                dir,
                ctx: web::Data::new(ctx),
            }
        }

        /// Writes a one-paragraph template.
        pub(crate) fn template(&self, file: &str, text: &str) {
            let body = format!(r#"<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>{text}</w:t></w:r></w:p>"#);
            std::fs::write(self.ctx.config.template_path(file), docx(&body)).unwrap();
        }

        /// Writes every template the catalog knows about.
        pub(crate) fn all_templates(&self) {
            for file in self.ctx.catalog.template_files() {
                self.template(file, "(DISTRICT) for (PETITIONER)");
            }
        }
    }
}
