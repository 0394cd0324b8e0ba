use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Region;

/// Search request: one-shot query plus implicit subscription install
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "connection_id", rename = "connectionId")]
    pub connection_id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(alias = "radius_km", rename = "radiusKm")]
    pub radius_km: f64,
    #[serde(default)]
    pub techs: Vec<String>,
}

impl SearchRequest {
    pub fn region(&self) -> Region {
        Region::new(self.latitude, self.longitude, self.radius_km)
    }
}
