//! Resolution of the effective ordering rule

use super::compare::{CustomComparator, OrderingRule, SortDirection};

/// Ordering inputs gathered from a collection's configuration
#[derive(Debug, Clone, Default)]
pub struct SortConfig {
    /// Caller-supplied comparison function
    pub custom: Option<CustomComparator>,
    /// Primary `field:direction` descriptor
    pub sort_by: Option<String>,
    /// `sort_by` passed through the API query parameters
    pub legacy_sort_by: Option<String>,
}

/// Pick the effective rule: custom, then `sort_by`, then the legacy query
/// parameter, then none.
pub fn resolve(config: &SortConfig) -> OrderingRule {
    if let Some(custom) = &config.custom {
        return OrderingRule::Custom(custom.clone());
    }

    [config.sort_by.as_deref(), config.legacy_sort_by.as_deref()]
        .into_iter()
        .flatten()
        .find_map(parse_descriptor)
        .unwrap_or_default()
}

/// Parse a `field[:direction]` descriptor; blank fields yield `None`
pub fn parse_descriptor(descriptor: &str) -> Option<OrderingRule> {
    let (field, direction) = match descriptor.rsplit_once(':') {
        Some((field, direction)) => (field, SortDirection::parse(direction)),
        None => (descriptor, SortDirection::Ascending),
    };
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    Some(OrderingRule::standard(field, direction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn custom_wins_over_descriptors() {
        let custom = CustomComparator::new(|_, _| Ordering::Equal);
        let config = SortConfig {
            custom: Some(custom.clone()),
            sort_by: Some("created_at:desc".to_string()),
            legacy_sort_by: Some("name:asc".to_string()),
        };
        assert_eq!(resolve(&config), OrderingRule::Custom(custom));
    }

    #[test]
    fn primary_descriptor_wins_over_legacy() {
        let config = SortConfig {
            sort_by: Some("created_at:desc".to_string()),
            legacy_sort_by: Some("name:asc".to_string()),
            ..SortConfig::default()
        };
        assert_eq!(
            resolve(&config),
            OrderingRule::standard("created_at", SortDirection::Descending)
        );
    }

    #[test]
    fn legacy_descriptor_used_when_primary_missing_or_blank() {
        let config = SortConfig {
            sort_by: Some("  :desc".to_string()),
            legacy_sort_by: Some("content.date:desc".to_string()),
            ..SortConfig::default()
        };
        assert_eq!(
            resolve(&config),
            OrderingRule::standard("content.date", SortDirection::Descending)
        );
    }

    #[test]
    fn nothing_configured_resolves_to_none() {
        assert_eq!(resolve(&SortConfig::default()), OrderingRule::None);
    }

    #[test]
    fn descriptor_without_direction_is_ascending() {
        assert_eq!(
            parse_descriptor("name"),
            Some(OrderingRule::standard("name", SortDirection::Ascending))
        );
    }

    #[test]
    fn resolve_is_deterministic() {
        let config = SortConfig {
            sort_by: Some("published_at:desc".to_string()),
            ..SortConfig::default()
        };
        assert_eq!(resolve(&config), resolve(&config));
    }
}
