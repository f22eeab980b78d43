use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use std::io;
use std::path::PathBuf;

use crate::handlers::{conversations, health, objects, templates};
use crate::state::AppState;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory of the JSON file store. In memory when absent.
    pub data_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn build_state(&self) -> AppState {
        match &self.data_dir {
            Some(dir) => AppState::with_data_dir(dir),
            None => AppState::in_memory(),
        }
    }
}

/// Every route of the backend. Callers register `web::Data<AppState>`.
pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health))
        .route("/health/store", web::get().to(health::store_health))
        .service(
            web::scope("/templates")
                .route("", web::post().to(templates::create))
                .route("/{id}", web::get().to(templates::get)),
        )
        .service(
            web::scope("/objects")
                .route("", web::post().to(objects::create))
                .route("/{id}", web::get().to(objects::get))
                .route("/{id}/applyPatch", web::post().to(objects::apply)),
        )
        .service(
            web::scope("/conversations")
                .route("", web::post().to(conversations::create))
                .route("", web::get().to(conversations::list))
                .route("/{id}", web::get().to(conversations::get))
                .route("/{id}/title", web::patch().to(conversations::rename))
                .route("/{id}/appendStep", web::post().to(conversations::append_step))
                .route("/{id}/undo", web::post().to(conversations::undo))
                .route("/{id}/reset", web::post().to(conversations::reset))
                .route("/{id}/state", web::patch().to(conversations::save_state)),
        );
}

pub async fn run(config: ServerConfig) -> io::Result<()> {
    let state = web::Data::new(config.build_state());
    if let Err(error) = state.conversations.health().await {
        log::warn!("Conversation store is not ready yet: {}", error);
    }

    let addr = config.bind_addr();
    log::info!("Starting formflow server on {}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .configure(app_config)
    })
    .bind(addr)?
    .run()
    .await
}
