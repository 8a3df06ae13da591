//! Build-time configuration. Values are baked into the wasm binary when it is compiled
//! (`WILDFIRE_MAPS_API_KEY=... trunk build`), the browser has no environment to read.

use wildfire_shared::config::feed_url_or_default;
use wildfire_shared::{Config, ConfigError};

const MAPS_API_KEY: Option<&str> = option_env!("WILDFIRE_MAPS_API_KEY");
const FEED_URL: Option<&str> = option_env!("WILDFIRE_FEED_URL");

pub fn load() -> Result<Config, ConfigError> {
    Config::from_values(MAPS_API_KEY, FEED_URL)
}

/// The feed does not need the maps key, so it is resolved on its own.
pub fn feed_url() -> String {
    feed_url_or_default(FEED_URL)
}
