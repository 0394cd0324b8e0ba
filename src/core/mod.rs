// Core engine exports
pub mod distance;
pub mod engine;
pub mod filters;
pub mod registry;
pub mod spatial;

pub use distance::{calculate_bounding_box, distance_between, haversine_distance, is_within_bounding_box, within_radius};
pub use engine::{MatchEngine, MatchError};
pub use filters::{normalize_techs, tech_filter_matches};
pub use registry::SubscriptionRegistry;
pub use spatial::SpatialIndex;
