use serde::{Deserialize, Serialize};

/// A point on the globe in WGS84 degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Circular query area: center point plus radius in kilometers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: Position,
    #[serde(rename = "radiusKm")]
    pub radius_km: f64,
}

impl Region {
    pub fn new(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        Self {
            center: Position::new(latitude, longitude),
            radius_km,
        }
    }
}

/// Registered developer record
///
/// Display metadata (name, bio, avatar) is opaque payload; only position and
/// techs participate in matching. The persistence collaborator is the source
/// of truth and pushes changes via upsert/delete notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Developer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(rename = "avatarUrl", default)]
    pub avatar_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub techs: Vec<String>,
}

impl Developer {
    pub fn position(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }
}

/// A connection's standing interest: region + tech filter
///
/// At most one per connection; installing a new one replaces the old.
/// An empty `techs` filter matches every developer.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub connection_id: String,
    pub region: Region,
    pub techs: Vec<String>,
}

/// Push event delivered to a subscribed connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub developer: Developer,
    #[serde(rename = "deliveredAt")]
    pub delivered_at: chrono::DateTime<chrono::Utc>,
}

impl Notification {
    pub fn new(developer: Developer) -> Self {
        Self {
            developer,
            delivered_at: chrono::Utc::now(),
        }
    }
}

/// Search result entry: developer plus distance from the query center
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchMatch {
    #[serde(flatten)]
    pub developer: Developer,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

/// Geospatial bounding box used as a cheap pre-filter
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}
