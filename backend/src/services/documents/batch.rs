use crate::context::AppContext;
use crate::docx::package::write_archive;
use crate::docx::render_template;
use crate::error::{AppError, AppResult};
use crate::replacements::{build_replacements, validate, RawForm, ReplacementMap, ValidationError};
use crate::services::attachment::Attachment;
use crate::services::run_blocking;
use crate::storage::keys::{archive_file_name, document_file_name, output_key, timestamp_label};
use actix_web::{web, HttpResponse};
use chrono::Local;
use log::{info, warn};
use std::collections::HashMap;
use std::io::Cursor;

/// Handler for `POST /download-all-documents-zip`.
pub async fn process(
    ctx: web::Data<AppContext>,
    form: web::Form<RawForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let attachment = run_blocking(move || generate_all(&ctx, &form)).await?;
    Ok(attachment.into_response())
}

/// Fills every configured template into one zip.
///
/// Templates are processed in configuration order. One that fails is logged
/// and left out; the batch only fails when none succeeded.
fn generate_all(ctx: &AppContext, form: &RawForm) -> AppResult<Attachment> {
    let templates: Vec<_> = ctx.catalog.document_templates().collect();

    let mut missing: Vec<String> = Vec::new();
    let mut checked: Vec<&str> = Vec::new();
    for template in &templates {
        if checked.contains(&template.family.name.as_str()) {
            continue;
        }
        checked.push(&template.family.name);
        if let Err(e) = validate(&template.family.fields, form) {
            for name in e.missing {
                if !missing.contains(&name) {
                    missing.push(name);
                }
            }
        }
    }
    if !missing.is_empty() {
        return Err(ValidationError { missing }.into());
    }

    let now = Local::now();
    let stamp = timestamp_label(now.naive_local());
    let mut replacements: HashMap<&str, ReplacementMap> = HashMap::new();
    let mut entries = Vec::with_capacity(templates.len());

    for template in &templates {
        let doc_type = template.entry.doc_type.as_str();
        let map = replacements
            .entry(template.family.name.as_str())
            .or_insert_with(|| build_replacements(template.family, form, now.date_naive()));

        match render_template(&ctx.config.template_path(&template.entry.file), map) {
            Ok(bytes) => entries.push((document_file_name(&stamp, Some(doc_type)), bytes)),
            Err(e) => warn!("Skipping {} in document bundle: {}", doc_type, e),
        }
    }

    if entries.is_empty() {
        return Err(AppError::BatchFailed {
            attempted: templates.len(),
        });
    }
    info!(
        "Bundled {} of {} documents",
        entries.len(),
        templates.len()
    );

    let archive = write_archive(&entries)?;
    let filename = archive_file_name(&stamp);
    let key = output_key(&ctx.config.output_prefix, &filename);
    ctx.store
        .upload(&mut Cursor::new(archive), &ctx.config.bucket_name, &key)?;
    info!("Uploaded {} to bucket {}", key, ctx.config.bucket_name);

    Ok(Attachment::fetch(
        ctx.store.as_ref(),
        &ctx.config.bucket_name,
        &key,
        &filename,
    )?)
}
