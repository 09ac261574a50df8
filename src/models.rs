/// Data Models Module
///
/// This module defines the core data structures used throughout the application.
/// Raw OpenStreetMap nodes as returned by the Overpass API, and the normalized
/// activity rows written to the `activities` table.
use geo::Point;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Spatial reference identifier for WGS84 longitude/latitude
pub const WGS84_SRID: i32 = 4326;

/// Top-level Overpass API JSON document
#[derive(Debug, Clone, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

/// A single element of an Overpass result set
///
/// Only nodes carry coordinates directly; ways and relations are decoded so
/// the document parses, then dropped during extraction.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OverpassElement {
    Node(OsmNode),
    Way { id: i64 },
    Relation { id: i64 },
    #[serde(other)]
    Other,
}

/// Represents a tagged OpenStreetMap node
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OsmNode {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl OsmNode {
    /// Look up a tag value by key
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// OSM element kinds we persist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsmType {
    Node,
}

impl OsmType {
    /// Short element code stored in the `osm_type` column
    pub fn as_str(&self) -> &str {
        match self {
            Self::Node => "n",
        }
    }
}

/// A normalized activity row, ready for upsert
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub osm_id: i64,
    pub osm_type: OsmType,
    pub activity_type: String,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub opening_hours: Option<String>,
    pub age_range: Option<String>,
    /// x = longitude, y = latitude
    pub location: Point<f64>,
}

impl Activity {
    /// Well-known text of the location, longitude first
    pub fn location_wkt(&self) -> String {
        format!("POINT ({} {})", self.location.x(), self.location.y())
    }
}
