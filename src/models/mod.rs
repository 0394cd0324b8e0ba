// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{BoundingBox, Developer, Notification, Position, Region, SearchMatch, Subscription};
pub use requests::SearchRequest;
pub use responses::{ErrorResponse, HealthResponse, OpenConnectionResponse, SearchResponse, UpsertResponse};
