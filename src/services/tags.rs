//! Arr tag lookups
//!
//! Items in Sonarr/Radarr only carry numeric tag ids; the configuration refers
//! to tags by label.

use serde::Deserialize;

/// Tag as returned by `GET /api/v3/tag`
#[derive(Debug, Clone, Deserialize)]
pub struct ArrTag {
    pub id: i64,
    pub label: String,
}

/// True when any of the item's tags has a label listed in `check`.
pub fn contains_tag(tags: &[ArrTag], item_tags: &[i64], check: &[String]) -> bool {
    tags.iter()
        .filter(|tag| item_tags.contains(&tag.id))
        .any(|tag| check.iter().any(|label| *label == tag.label))
}

/// Apply include/exclude tag rules to one item.
///
/// With an include list the item needs at least one listed tag; with an
/// exclude list a single listed tag drops it.
pub fn passes_tag_rules(
    tags: &[ArrTag],
    item_tags: &[i64],
    include: &[String],
    exclude: &[String],
) -> bool {
    if !include.is_empty() && (item_tags.is_empty() || !contains_tag(tags, item_tags, include)) {
        return false;
    }

    if !exclude.is_empty() && contains_tag(tags, item_tags, exclude) {
        return false;
    }

    true
}
