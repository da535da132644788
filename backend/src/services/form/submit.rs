use crate::context::AppContext;
use crate::error::AppResult;
use crate::replacements::{validate, RawForm};
use crate::services::documents::generate::render_and_store;
use crate::services::run_blocking;
use actix_web::{web, HttpResponse};

/// Handler for `POST /`: fills the legacy template with the legacy family's
/// fields and returns it as `{stamp}_output.docx`.
pub async fn process(
    ctx: web::Data<AppContext>,
    form: web::Form<RawForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let attachment = run_blocking(move || {
        let (family, file) = ctx.catalog.legacy();
        validate(&family.fields, &form)?;
        render_and_store(&ctx, family, file, None, &form)
    })
    .await?;
    Ok(attachment.into_response())
}
