pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::KisanConfig;
pub use error::{KisanError, Result};
pub use events::{EventBus, SessionEvent};
pub use types::*;
