mod catalog;
mod config;
mod context;
mod docx;
mod error;
mod replacements;
mod services;
mod storage;

use crate::config::AppConfig;
use crate::context::AppContext;
use actix_web::{middleware, web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};
use std::io;
use std::thread;
use std::time::Duration;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let dotenv = dotenvy::dotenv();
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let config = AppConfig::load().map_err(io::Error::other)?;
    let url = config.local_url();
    let bind_addr = config.bind_addr();
    let open_browser = config.open_browser;

    let ctx = web::Data::new(AppContext::from_config(config).map_err(io::Error::other)?);

    if open_browser {
        let url = url.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            if let Err(e) = webbrowser::open(&url) {
                warn!("Could not open browser: {}", e);
            }
        });
    }

    info!("Server running at {}", url);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(ctx.clone())
            .configure(services::configure_routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
