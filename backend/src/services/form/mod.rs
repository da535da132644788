//! # Form Service Module
//!
//! Serves the petition form and the plain form submission.
//!
//! ## Sub-modules:
//! - `render`: builds the form page from a family's field list.
//! - `submit`: the single-template flow behind `POST /`.

mod render;
mod submit;

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use actix_web::web::{self, get, post, ServiceConfig};
use actix_web::HttpResponse;
use common::model::family::FamilyProfile;

/// Registers the form routes.
///
/// # Registered Routes:
///
/// *   **`GET /`**: form of the default family.
/// *   **`POST /`**: fills the legacy template (`submit::process`).
/// *   **`GET /form/{family}`**: form of any configured family.
pub fn configure_routes(cfg: &mut ServiceConfig) {
    cfg.route("/", get().to(index))
        .route("/", post().to(submit::process))
        .route("/form/{family}", get().to(family_form));
}

async fn index(ctx: web::Data<AppContext>) -> HttpResponse {
    form_page(&ctx, ctx.catalog.default_family())
}

async fn family_form(
    ctx: web::Data<AppContext>,
    family: web::Path<String>,
) -> AppResult<HttpResponse> {
    let name = family.into_inner();
    let family = ctx
        .catalog
        .family(&name)
        .ok_or_else(|| AppError::UnknownFamily(name.clone()))?;
    Ok(form_page(&ctx, family))
}

fn form_page(ctx: &AppContext, family: &FamilyProfile) -> HttpResponse {
    let (legacy, _) = ctx.catalog.legacy();
    let html = render::form_page(family, legacy.name == family.name);
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
