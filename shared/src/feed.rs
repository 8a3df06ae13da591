use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category title that marks an event as a wildfire.
pub const WILDFIRE_CATEGORY: &str = "Wildfires";

/// Feed envelope. Events stay untyped until their categories say they are
/// wildfires; other categories carry shapes (polygons, no geometry at all)
/// that a [`WildfireEvent`] does not model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedResponse {
    pub events: Vec<Value>,
}

/// The only part of an event read before it is known to be a wildfire.
#[derive(Debug, Default, Deserialize)]
struct EventCategories {
    #[serde(default)]
    categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WildfireEvent {
    pub title: String,
    pub categories: Vec<Category>,
    pub geometries: Vec<Geometry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
}

/// One observation of an event. Coordinates are `[longitude, latitude, ...]`;
/// anything past the first two (altitude) is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub date: DateTime<Utc>,
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl Geometry {
    pub fn lat_lng(&self) -> Option<LatLng> {
        match self.coordinates.as_slice() {
            [lng, lat, ..] => Some(LatLng {
                lat: *lat,
                lng: *lng,
            }),
            _ => None,
        }
    }
}

fn is_wildfire_category(categories: &[Category]) -> bool {
    categories
        .iter()
        .any(|category| category.title == WILDFIRE_CATEGORY)
}

impl WildfireEvent {
    pub fn is_wildfire(&self) -> bool {
        is_wildfire_category(&self.categories)
    }

    /// The geometry used for display. Later observations are ignored.
    pub fn first_geometry(&self) -> Option<&Geometry> {
        self.geometries.first()
    }

    pub fn position(&self) -> Option<LatLng> {
        self.first_geometry().and_then(Geometry::lat_lng)
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.first_geometry().map(|geometry| geometry.date)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("fetch error: {0}")]
    Network(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("event {title:?} has no geometry")]
    MissingGeometry { title: String },
    #[error("event {title:?} needs at least longitude and latitude")]
    BadCoordinates { title: String },
}

/// Keep only wildfire events, preserving feed order.
///
/// Other events are dropped on their categories alone and never decoded
/// further. Every kept event must decode as a [`WildfireEvent`] whose first
/// geometry has a longitude and latitude; a wildfire that cannot be placed on
/// the map fails the whole feed.
pub fn filter_wildfires(response: FeedResponse) -> Result<Vec<WildfireEvent>, FeedError> {
    let mut wildfires = Vec::new();
    for raw in response.events {
        let EventCategories { categories } =
            EventCategories::deserialize(&raw).unwrap_or_default();
        if !is_wildfire_category(&categories) {
            continue;
        }
        let event: WildfireEvent = serde_json::from_value(raw)?;
        if event.geometries.is_empty() {
            return Err(FeedError::MissingGeometry { title: event.title });
        }
        if event.position().is_none() {
            return Err(FeedError::BadCoordinates { title: event.title });
        }
        wildfires.push(event);
    }
    Ok(wildfires)
}

/// Parse a raw feed body and filter it down to wildfires.
pub fn parse_feed(body: &str) -> Result<Vec<WildfireEvent>, FeedError> {
    let response: FeedResponse = serde_json::from_str(body)?;
    filter_wildfires(response)
}
