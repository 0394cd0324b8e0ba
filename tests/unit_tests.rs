// Unit tests for DevRadar Match

use devradar_match::core::{
    distance::{calculate_bounding_box, distance_between, haversine_distance, is_within_bounding_box},
    filters::{normalize_techs, tech_filter_matches},
    spatial::SpatialIndex,
    registry::SubscriptionRegistry,
};
use devradar_match::models::{Position, Region};

fn tags(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(40.7128, -74.0060, 40.7128, -74.0060);
    assert!(distance < 0.01);
}

#[test]
fn test_haversine_distance_manhattan_to_brooklyn() {
    // Manhattan to Brooklyn is approximately 5-10 km
    let distance = haversine_distance(40.7580, -73.9855, 40.6782, -73.9442);
    assert!(distance > 5.0 && distance < 15.0);
}

#[test]
fn test_haversine_distance_nyc_to_la() {
    // Approximately 3944 km
    let distance = haversine_distance(40.7128, -74.0060, 34.0522, -118.2437);
    assert!((distance - 3944.0).abs() < 100.0, "Expected ~3944km, got {}", distance);
}

#[test]
fn test_distance_one_hundredth_degree_longitude_at_equator() {
    // 0.05 degrees of longitude at the equator is ~5.5km; this is the
    // geometry behind the "B at (0, 0.05) is nearby" scenario
    let d = distance_between(&Position::new(0.0, 0.0), &Position::new(0.0, 0.05));
    assert!((d - 5.56).abs() < 0.1, "Expected ~5.56km, got {}", d);

    let far = distance_between(&Position::new(0.0, 0.0), &Position::new(0.0, 1.0));
    assert!((far - 111.0).abs() < 2.0, "Expected ~111km, got {}", far);
}

#[test]
fn test_bounding_box_contains_radius() {
    let center = Position::new(40.7128, -74.0060);
    let bbox = calculate_bounding_box(&center, 10.0);

    // Every point within the radius must fall inside the box
    for (lat, lon) in [(40.75, -74.0), (40.68, -74.01), (40.71, -73.95)] {
        let p = Position::new(lat, lon);
        if distance_between(&center, &p) <= 10.0 {
            assert!(is_within_bounding_box(&p, &bbox));
        }
    }
}

#[test]
fn test_tech_filter_semantics() {
    // Empty filter matches any tag set
    assert!(tech_filter_matches(&tags(&["go"]), &[]));
    // Non-empty intersection
    assert!(tech_filter_matches(&tags(&["go", "node"]), &tags(&["node", "rust"])));
    // Disjoint
    assert!(!tech_filter_matches(&tags(&["go"]), &tags(&["rust"])));
    // Case-insensitive and trimmed
    assert!(tech_filter_matches(&tags(&["ReactJS"]), &tags(&[" reactjs "])));
}

#[test]
fn test_normalize_techs_drops_empties_and_dedups() {
    assert_eq!(
        normalize_techs(&tags(&["Go", " go", "", "Rust"])),
        vec!["go".to_string(), "rust".to_string()]
    );
    assert!(normalize_techs(&tags(&["", "  "])).is_empty());
}

#[test]
fn test_spatial_index_radius_query() {
    let mut index = SpatialIndex::new();
    index.upsert("a", Position::new(0.0, 0.0));
    index.upsert("b", Position::new(0.0, 0.05));
    index.upsert("c", Position::new(0.0, 1.0));

    let mut within_10km = index.query(&Position::new(0.0, 0.0), 10.0);
    within_10km.sort();
    assert_eq!(within_10km, vec!["a".to_string(), "b".to_string()]);

    let within_200km = index.query(&Position::new(0.0, 0.0), 200.0);
    assert_eq!(within_200km.len(), 3);
}

#[test]
fn test_spatial_index_upsert_overwrites() {
    let mut index = SpatialIndex::new();
    index.upsert("a", Position::new(0.0, 0.0));
    index.upsert("a", Position::new(45.0, 45.0));

    assert_eq!(index.len(), 1);
    assert_eq!(index.position_of("a"), Some(Position::new(45.0, 45.0)));
}

#[tokio::test]
async fn test_registry_per_connection_replacement() {
    let registry = SubscriptionRegistry::new();
    registry.install("c1", Region::new(0.0, 0.0, 10.0), vec![]).await;
    registry.install("c2", Region::new(1.0, 1.0, 20.0), vec![]).await;
    registry.install("c1", Region::new(2.0, 2.0, 30.0), vec![]).await;

    assert_eq!(registry.len().await, 2);
    let c1 = registry.get("c1").await.unwrap();
    assert_eq!(c1.region.radius_km, 30.0);
}
