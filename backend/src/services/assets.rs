use actix_web::web::{self, get, ServiceConfig};
use actix_web::HttpResponse;
use include_dir::{include_dir, Dir};
use mime_guess::from_path;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static");

pub fn configure_routes(cfg: &mut ServiceConfig) {
    cfg.route("/static/{path:.*}", get().to(serve_embedded));
}

async fn serve_embedded(path: web::Path<String>) -> HttpResponse {
    let file_path = path.into_inner();
    match STATIC_DIR.get_file(&file_path) {
        Some(file) => {
            let mime = from_path(&file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => HttpResponse::NotFound().body("Not Found"),
    }
}
