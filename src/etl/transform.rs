/// Transform Module
///
/// Turns a raw OSM node into a normalized activity row. Pure: no I/O, no
/// shared state.
use geo::Point;

use super::parsers::{first_non_empty, non_empty, parse_address};
use crate::models::{Activity, OsmNode, OsmType};

/// Stored name for nodes without a `name` tag
pub const DEFAULT_NAME: &str = "Unbekannter Spielplatz";

/// Tags consulted for the category, in priority order
const CATEGORY_KEYS: [&str; 2] = ["leisure", "amenity"];

/// Errors raised while transforming a single node
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("node {0} has neither a leisure nor an amenity tag")]
    MissingCategory(i64),

    #[error("node {osm_id} has an invalid coordinate (lat {lat}, lon {lon})")]
    InvalidCoordinate { osm_id: i64, lat: f64, lon: f64 },
}

/// Build the insertable row for one node
pub fn transform_node(node: &OsmNode) -> Result<Activity, TransformError> {
    let activity_type = first_non_empty(node, &CATEGORY_KEYS).ok_or(TransformError::MissingCategory(node.id))?;

    if !node.lat.is_finite() || !node.lon.is_finite() {
        return Err(TransformError::InvalidCoordinate { osm_id: node.id, lat: node.lat, lon: node.lon });
    }

    Ok(Activity {
        osm_id: node.id,
        osm_type: OsmType::Node,
        activity_type,
        name: node.tag("name").unwrap_or(DEFAULT_NAME).to_string(),
        description: first_non_empty(node, &["description", "note"]),
        address: parse_address(node),
        opening_hours: non_empty(node.tag("opening_hours")),
        age_range: first_non_empty(node, &["age_range", "access"]),
        location: Point::new(node.lon, node.lat),
    })
}
