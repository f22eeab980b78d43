pub mod dto;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod server;
pub mod state;
pub mod store;

pub use error::ApiError;
pub use server::{app_config, run, ServerConfig};
pub use state::AppState;
