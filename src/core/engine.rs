use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

use crate::core::distance::{distance_between, within_radius};
use crate::core::filters::{normalize_techs, tech_filter_matches};
use crate::core::registry::SubscriptionRegistry;
use crate::core::spatial::SpatialIndex;
use crate::models::{Developer, Notification, Region, SearchMatch};
use crate::services::ConnectionGateway;

/// Errors surfaced by the match engine
///
/// Everything else is total: unknown connections and unknown developers are
/// no-ops, not failures.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid region: {0}")]
    InvalidRegion(String),

    #[error("malformed developer record: {0}")]
    MalformedDeveloper(String),
}

/// Proximity matching and live notification engine
///
/// Owns the spatial index, the developer cache and the subscription
/// registry; pushes match notifications through the connection gateway.
/// One instance per process, shared by `Arc`.
pub struct MatchEngine {
    index: RwLock<SpatialIndex>,
    developers: RwLock<HashMap<String, Developer>>,
    registry: SubscriptionRegistry,
    gateway: Arc<ConnectionGateway>,
    max_radius_km: Option<f64>,
}

impl MatchEngine {
    pub fn new(gateway: Arc<ConnectionGateway>) -> Self {
        Self {
            index: RwLock::new(SpatialIndex::new()),
            developers: RwLock::new(HashMap::new()),
            registry: SubscriptionRegistry::new(),
            gateway,
            max_radius_km: None,
        }
    }

    /// Cap the accepted search radius; larger regions are rejected as invalid
    pub fn with_max_radius_km(mut self, max_radius_km: Option<f64>) -> Self {
        self.max_radius_km = max_radius_km;
        self
    }

    /// One-shot radius search, sorted by ascending distance (id tie-break)
    ///
    /// Side effect: installs (replacing any previous one) the caller's
    /// subscription with the same region and filter, so later upserts that
    /// satisfy it are pushed without polling.
    pub async fn search(
        &self,
        connection_id: &str,
        region: Region,
        techs: &[String],
    ) -> Result<Vec<SearchMatch>, MatchError> {
        self.validate_region(&region)?;
        let filter = normalize_techs(techs);

        let candidate_ids = {
            let index = self.index.read().await;
            index.query(&region.center, region.radius_km)
        };

        let mut matches: Vec<SearchMatch> = {
            let developers = self.developers.read().await;
            candidate_ids
                .iter()
                .filter_map(|id| developers.get(id))
                .filter(|dev| tech_filter_matches(&dev.techs, &filter))
                .map(|dev| SearchMatch {
                    distance_km: distance_between(&region.center, &dev.position()),
                    developer: dev.clone(),
                })
                .collect()
        };

        matches.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.developer.id.cmp(&b.developer.id))
        });

        self.registry.install(connection_id, region, filter).await;

        tracing::debug!(
            "Search for connection {} returned {} matches",
            connection_id,
            matches.len()
        );

        Ok(matches)
    }

    /// Apply an authoritative developer upsert from the persistence
    /// collaborator, then notify every subscription it satisfies
    ///
    /// The index and cache are fully written before subscriptions are
    /// evaluated. Every satisfying upsert notifies; there is no
    /// de-duplication across repeated upserts of the same developer.
    /// Returns the number of notified subscriptions.
    pub async fn notify_upsert(&self, developer: Developer) -> Result<usize, MatchError> {
        let mut developer = developer;
        developer.techs = normalize_techs(&developer.techs);
        self.validate_developer(&developer)?;

        {
            let mut index = self.index.write().await;
            index.upsert(&developer.id, developer.position());
        }
        {
            let mut developers = self.developers.write().await;
            developers.insert(developer.id.clone(), developer.clone());
        }

        let position = developer.position();
        let mut notified = 0;
        for subscription in self.registry.snapshot().await {
            if within_radius(&subscription.region.center, &position, subscription.region.radius_km)
                && tech_filter_matches(&developer.techs, &subscription.techs)
            {
                self.gateway
                    .deliver(&subscription.connection_id, Notification::new(developer.clone()))
                    .await;
                notified += 1;
            }
        }

        tracing::debug!(
            "Upsert of developer {} notified {} subscriptions",
            developer.id,
            notified
        );

        Ok(notified)
    }

    /// Apply an authoritative delete: drop the cached record and its index
    /// entry. Never notifies; unknown ids are a no-op.
    pub async fn notify_delete(&self, developer_id: &str) {
        {
            let mut index = self.index.write().await;
            index.remove(developer_id);
        }
        let mut developers = self.developers.write().await;
        developers.remove(developer_id);
    }

    /// Tear down a connection: drop its subscription and close its channel
    pub async fn unsubscribe(&self, connection_id: &str) {
        self.registry.remove(connection_id).await;
        self.gateway.close(connection_id).await;
    }

    /// Stream-teardown path: only tears down if `epoch` still identifies the
    /// connection's current channel binding (reconnects bump the epoch)
    pub async fn disconnect(&self, connection_id: &str, epoch: u64) {
        if self.gateway.close_if_current(connection_id, epoch).await {
            self.registry.remove(connection_id).await;
            tracing::debug!("Connection {} disconnected", connection_id);
        }
    }

    pub async fn developer_count(&self) -> usize {
        self.developers.read().await.len()
    }

    pub async fn subscription_count(&self) -> usize {
        self.registry.len().await
    }

    fn validate_region(&self, region: &Region) -> Result<(), MatchError> {
        if !region.radius_km.is_finite() || region.radius_km <= 0.0 {
            return Err(MatchError::InvalidRegion(format!(
                "radius must be positive, got {}",
                region.radius_km
            )));
        }
        if let Some(max) = self.max_radius_km {
            if region.radius_km > max {
                return Err(MatchError::InvalidRegion(format!(
                    "radius {}km exceeds the configured maximum of {}km",
                    region.radius_km, max
                )));
            }
        }
        validate_position(region.center.latitude, region.center.longitude)
            .map_err(MatchError::InvalidRegion)
    }

    fn validate_developer(&self, developer: &Developer) -> Result<(), MatchError> {
        if developer.id.trim().is_empty() {
            return Err(MatchError::MalformedDeveloper("missing id".to_string()));
        }
        validate_position(developer.latitude, developer.longitude)
            .map_err(MatchError::MalformedDeveloper)?;
        if developer.techs.is_empty() {
            return Err(MatchError::MalformedDeveloper(format!(
                "developer {} has an empty tech set",
                developer.id
            )));
        }
        Ok(())
    }
}

fn validate_position(latitude: f64, longitude: f64) -> Result<(), String> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("latitude out of range: {}", latitude));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("longitude out of range: {}", longitude));
    }
    Ok(())
}
