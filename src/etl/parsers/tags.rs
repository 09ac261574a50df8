/// Tag Lookup Helpers
///
/// OSM tags are free-form strings; an empty value is treated the same as a
/// missing key wherever a fallback applies.
use crate::models::OsmNode;

/// Return the value as an owned string unless it is empty
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// First non-empty value among `keys`, checked in order
pub fn first_non_empty(node: &OsmNode, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| non_empty(node.tag(key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn node_with(tags: &[(&str, &str)]) -> OsmNode {
        OsmNode {
            id: 1,
            lat: 46.8,
            lon: 9.5,
            tags: tags.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("Mo-Fr 09:00-18:00")), Some("Mo-Fr 09:00-18:00".to_string()));
        assert_eq!(non_empty(Some("")), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_first_non_empty_skips_empty_values() {
        let node = node_with(&[("description", ""), ("note", "Nur im Sommer")]);

        assert_eq!(first_non_empty(&node, &["description", "note"]), Some("Nur im Sommer".to_string()));
        assert_eq!(first_non_empty(&node, &["name"]), None);
    }

    #[test]
    fn test_first_non_empty_respects_order() {
        let node = node_with(&[("leisure", "playground"), ("amenity", "library")]);

        assert_eq!(first_non_empty(&node, &["leisure", "amenity"]), Some("playground".to_string()));
        assert_eq!(first_non_empty(&node, &["amenity", "leisure"]), Some("library".to_string()));
    }
}
