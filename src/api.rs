//! HTTP surface: websocket endpoint and the embedded chat client

mod assets;
mod handlers;

pub use handlers::create_router;

use crate::config::Config;
use crate::connection::ConnectionSettings;
use crate::script::ScriptFactory;
use std::path::PathBuf;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Builds a fresh conversation for each websocket
    pub scripts: ScriptFactory,
    pub connection: ConnectionSettings,
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(config: &Config, scripts: ScriptFactory, connection: ConnectionSettings) -> Self {
        Self {
            scripts,
            connection,
            static_dir: config.static_dir.clone(),
        }
    }
}
