use serde::{Deserialize, Serialize};
use crate::models::domain::SearchMatch;

/// Response for the search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub matches: Vec<SearchMatch>,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub developers: usize,
    pub subscriptions: usize,
    pub connections: usize,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Response for a developer upsert notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertResponse {
    pub accepted: bool,
    /// Number of subscriptions notified by this upsert
    pub notified: usize,
}

/// Response for opening a live connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenConnectionResponse {
    #[serde(rename = "connectionId")]
    pub connection_id: String,
}
