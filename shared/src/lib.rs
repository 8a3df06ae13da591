pub mod config;
pub mod feed;
pub mod format;
pub mod view_state;

pub use config::{Config, ConfigError};
pub use feed::*;
pub use view_state::*;
