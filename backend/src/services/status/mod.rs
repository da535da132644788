//! # Status Service Module
//!
//! `GET /health` reports whether the service can generate documents;
//! `GET /debug` shows which configuration values are set without
//! revealing them.

use crate::config::ENV_PREFIX;
use crate::context::AppContext;
use actix_web::web::{self, get, ServiceConfig};
use actix_web::HttpResponse;
use common::responses::{DebugReport, HealthReport};
use std::collections::BTreeMap;

/// Variables `AppConfig::load` understands, reported even when unset.
const KNOWN_VARIABLES: [&str; 10] = [
    "HOST",
    "PORT",
    "BUCKET_NAME",
    "STORE_ROOT",
    "TEMPLATE_DIR",
    "OUTPUT_PREFIX",
    "DEFAULT_TEMPLATE",
    "FAMILIES_FILE",
    "OPEN_BROWSER",
    "DEBUG",
];

pub fn configure_routes(cfg: &mut ServiceConfig) {
    cfg.route("/health", get().to(health))
        .route("/debug", get().to(debug));
}

async fn health(ctx: web::Data<AppContext>) -> HttpResponse {
    let report = health_report(&ctx);
    if report.ready {
        HttpResponse::Ok().json(report)
    } else {
        HttpResponse::ServiceUnavailable().json(report)
    }
}

fn health_report(ctx: &AppContext) -> HealthReport {
    let families = ctx.catalog.families();
    let fields_loaded = !families.is_empty() && families.iter().all(|f| !f.fields.is_empty());
    let template_dir_present = ctx.config.template_dir_present();
    let files = ctx.catalog.template_files();
    let templates_present = files
        .iter()
        .filter(|file| ctx.config.template_path(file).is_file())
        .count();
    let store_available = ctx.store.is_available(&ctx.config.bucket_name);

    HealthReport {
        ready: fields_loaded && template_dir_present && store_available,
        fields_loaded,
        families: families.len(),
        template_dir_present,
        templates_present,
        templates_configured: files.len(),
        store_available,
    }
}

async fn debug(ctx: web::Data<AppContext>) -> HttpResponse {
    if !ctx.config.debug {
        return HttpResponse::NotFound().body("Not Found");
    }
    let config = &ctx.config;
    HttpResponse::Ok().json(DebugReport {
        bucket_name: config.bucket_name.clone(),
        store_root: config.store_root.display().to_string(),
        template_dir: config.template_dir.display().to_string(),
        output_prefix: config.output_prefix.clone(),
        families_file: config
            .families_file
            .as_ref()
            .map(|path| path.display().to_string()),
        environment: environment(std::env::vars()),
    })
}

/// `EFILING_*` variables mapped to `missing` or a masked value.
fn environment(vars: impl Iterator<Item = (String, String)>) -> BTreeMap<String, String> {
    let prefix = format!("{ENV_PREFIX}_");
    let mut report: BTreeMap<String, String> = KNOWN_VARIABLES
        .iter()
        .map(|name| (format!("{prefix}{name}"), "missing".to_string()))
        .collect();
    for (name, value) in vars.filter(|(name, _)| name.starts_with(&prefix)) {
        report.insert(name, mask(&value));
    }
    report
}

fn mask(value: &str) -> String {
    if value.chars().count() <= 4 {
        return "****".to_string();
    }
    let shown: String = value.chars().take(2).collect();
    format!("{shown}****")
}
