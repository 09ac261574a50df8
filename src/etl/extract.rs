/// Extract Module
///
/// Handles fetching nodes from the Overpass API and pulling them out of the
/// result set.
use anyhow::{Context, Result};

use crate::models::{OsmNode, OverpassElement, OverpassResponse};
use crate::overpass::{OverpassClient, OverpassQuery};

/// Keep the node elements of a result set, in response order
pub fn extract_nodes(response: OverpassResponse) -> Vec<OsmNode> {
    let total = response.elements.len();

    let nodes: Vec<OsmNode> = response
        .elements
        .into_iter()
        .filter_map(|element| match element {
            OverpassElement::Node(node) => Some(node),
            OverpassElement::Way { id } => {
                tracing::debug!("Skipping way {}", id);
                None
            }
            OverpassElement::Relation { id } => {
                tracing::debug!("Skipping relation {}", id);
                None
            }
            OverpassElement::Other => None,
        })
        .collect();

    if nodes.len() < total {
        tracing::info!("Dropped {} non-node elements", total - nodes.len());
    }

    nodes
}

/// Run the query once and return every matching node
pub async fn extract_nodes_from_api(client: &OverpassClient, query: &OverpassQuery) -> Result<Vec<OsmNode>> {
    println!("\n🔄 Querying Overpass API...");
    println!("   Endpoint: {}", client.endpoint());
    println!(
        "   Bounding box: ({}, {}, {}, {})",
        query.bbox.south, query.bbox.west, query.bbox.north, query.bbox.east
    );
    for filter in &query.filters {
        println!("   Filter: {}={}", filter.key, filter.value);
    }

    let start_time = std::time::Instant::now();
    let response = client.fetch(query).await.context("Failed to fetch nodes from Overpass API")?;
    let nodes = extract_nodes(response);

    println!("✅ Fetched {} elements from OSM in {:.2}s", nodes.len(), start_time.elapsed().as_secs_f64());
    Ok(nodes)
}
