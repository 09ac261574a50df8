/// Address Parser
///
/// Builds a single-line postal address from the `addr:*` tags of a node.
///
/// When either a street or a city is known the address is composed as
/// `"{street} {house_number}, {city}"` and only the outer whitespace is
/// trimmed, so a node with a city but no street yields `", Chur"`.
/// Without street and city the free-form `address` tag is used.
use super::tags::{first_non_empty, non_empty};
use crate::models::OsmNode;

pub fn parse_address(node: &OsmNode) -> Option<String> {
    let street = node.tag("addr:street").unwrap_or("");
    let house_number = node.tag("addr:housenumber").unwrap_or("");
    let city = first_non_empty(node, &["addr:city", "destination"]).unwrap_or_default();

    if !street.is_empty() || !city.is_empty() {
        let composed = format!("{} {}, {}", street, house_number, city);
        non_empty(Some(composed.trim()))
    } else {
        non_empty(node.tag("address"))
    }
}
