//! DevRadar Match - proximity matching and live notification service
//!
//! This library answers "which developers are within a radius and match a
//! tech filter" and keeps live subscriptions so that each connected client is
//! pushed a notification whenever a newly upserted developer falls inside its
//! current search region and filter.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::{MatchEngine, MatchError, distance::{haversine_distance, distance_between}};
pub use self::models::{Developer, Notification, Position, Region, SearchMatch, SearchRequest, SearchResponse, Subscription};
pub use self::services::ConnectionGateway;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let region = Region::new(40.7128, -74.0060, 10.0);
        assert!(distance_between(&region.center, &Position::new(40.72, -74.0)) < 10.0);
    }
}
