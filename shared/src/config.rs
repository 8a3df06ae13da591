pub const DEFAULT_FEED_URL: &str =
    "https://eonet.gsfc.nasa.gov/api/v3/events?category=wildfires&status=open";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub maps_api_key: String,
    pub feed_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("maps API key is not set")]
    MissingApiKey,
    #[error("feed URL must be http(s), got {0:?}")]
    InvalidFeedUrl(String),
}

impl Config {
    /// Build from raw values. A blank feed URL falls back to the public EONET endpoint.
    pub fn from_values(
        maps_api_key: Option<&str>,
        feed_url: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let maps_api_key = maps_api_key
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingApiKey)?
            .to_string();

        let feed_url = feed_url_or_default(feed_url);
        if !(feed_url.starts_with("https://") || feed_url.starts_with("http://")) {
            return Err(ConfigError::InvalidFeedUrl(feed_url));
        }

        Ok(Self {
            maps_api_key,
            feed_url,
        })
    }
}

/// Feed URL alone, for the loader, which must not depend on the map key.
pub fn feed_url_or_default(feed_url: Option<&str>) -> String {
    feed_url
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_FEED_URL)
        .to_string()
}
