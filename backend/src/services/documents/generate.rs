use crate::context::AppContext;
use crate::docx::render_template;
use crate::error::{AppError, AppResult};
use crate::replacements::{build_replacements, validate, RawForm};
use crate::services::attachment::Attachment;
use crate::services::run_blocking;
use crate::storage::keys::{document_file_name, output_key, timestamp_label};
use actix_web::{web, HttpResponse};
use chrono::Local;
use common::model::family::FamilyProfile;
use log::{debug, info};
use std::io::Cursor;

/// Handler for `POST /download-document/{doc_type}`.
pub async fn process(
    ctx: web::Data<AppContext>,
    doc_type: web::Path<String>,
    form: web::Form<RawForm>,
) -> AppResult<HttpResponse> {
    let doc_type = doc_type.into_inner();
    let form = form.into_inner();

    let attachment = run_blocking(move || {
        let template = ctx
            .catalog
            .resolve(&doc_type)
            .ok_or_else(|| AppError::UnknownDocType(doc_type.clone()))?;
        validate(&template.family.fields, &form)?;
        render_and_store(
            &ctx,
            template.family,
            &template.entry.file,
            Some(&doc_type),
            &form,
        )
    })
    .await?;

    Ok(attachment.into_response())
}

/// Fills `file` with the family's replacements, uploads the result under a
/// timestamped key and reads it back for download.
///
/// The form must already be validated.
pub(crate) fn render_and_store(
    ctx: &AppContext,
    family: &FamilyProfile,
    file: &str,
    doc_type: Option<&str>,
    form: &RawForm,
) -> AppResult<Attachment> {
    let now = Local::now();
    let replacements = build_replacements(family, form, now.date_naive());
    debug!(
        "Built {} replacements for family {}",
        replacements.len(),
        family.name
    );

    let bytes = render_template(&ctx.config.template_path(file), &replacements)?;

    let filename = document_file_name(&timestamp_label(now.naive_local()), doc_type);
    let key = output_key(&ctx.config.output_prefix, &filename);
    ctx.store
        .upload(&mut Cursor::new(bytes), &ctx.config.bucket_name, &key)?;
    info!("Uploaded {} to bucket {}", key, ctx.config.bucket_name);

    Ok(Attachment::fetch(
        ctx.store.as_ref(),
        &ctx.config.bucket_name,
        &key,
        &filename,
    )?)
}
