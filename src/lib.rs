pub mod config;
pub mod error;
pub mod guard;
pub mod logging;
pub mod providers;
pub mod proxy;
pub mod server;
pub mod translate;

pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use logging::SharedLogger;
pub use server::{build_router, AppState};
