/// ETL Module
///
/// The stages of a sync run:
/// - Extract: Fetch tagged nodes from the Overpass API
/// - Transform: Normalize each node into an activity row
/// - Load: Upsert activity rows into PostgreSQL/PostGIS
pub mod extract;
pub mod load;
pub mod parsers;
pub mod transform;
