use std::collections::HashSet;

/// Normalize a raw tag list: trim, lowercase, drop empties, dedup
///
/// Applied at every boundary (developer upsert, search request) so that the
/// index and the registry only ever hold canonical tags.
pub fn normalize_techs(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut techs = Vec::new();

    for tag in raw {
        let normalized = tag.trim().to_lowercase();
        if !normalized.is_empty() && seen.insert(normalized.clone()) {
            techs.push(normalized);
        }
    }

    techs
}

/// Tech filter predicate
///
/// An empty filter matches everything; otherwise the developer matches iff
/// the two tag sets intersect. Comparison is case-insensitive and ignores
/// surrounding whitespace.
#[inline]
pub fn tech_filter_matches(developer_techs: &[String], filter_techs: &[String]) -> bool {
    if filter_techs.is_empty() {
        return true;
    }

    let wanted: HashSet<String> = filter_techs
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    if wanted.is_empty() {
        return true;
    }

    developer_techs
        .iter()
        .any(|t| wanted.contains(&t.trim().to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(tech_filter_matches(&tags(&["go"]), &[]));
        assert!(tech_filter_matches(&tags(&["rust", "go"]), &[]));
    }

    #[test]
    fn test_whitespace_only_filter_matches_everything() {
        assert!(tech_filter_matches(&tags(&["go"]), &tags(&["  ", ""])));
    }

    #[test]
    fn test_intersection_matches() {
        assert!(tech_filter_matches(&tags(&["go", "docker"]), &tags(&["go"])));
        assert!(tech_filter_matches(&tags(&["go"]), &tags(&["rust", "go"])));
    }

    #[test]
    fn test_disjoint_sets_do_not_match() {
        assert!(!tech_filter_matches(&tags(&["go"]), &tags(&["rust"])));
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        assert!(tech_filter_matches(&tags(&["Rust"]), &tags(&[" rust "])));
        assert!(tech_filter_matches(&tags(&["  GO"]), &tags(&["Go"])));
    }

    #[test]
    fn test_normalize_techs() {
        let normalized = normalize_techs(&tags(&[" Rust ", "GO", "go", "", "  "]));
        assert_eq!(normalized, vec!["rust".to_string(), "go".to_string()]);
    }
}
