//! Prefix range bounds and result merging for the secondary-index search.
//!
//! A prefix match over an ordered string index is expressed as an inclusive
//! range scan from the query itself up to the query extended with the
//! maximum representable character. Values that start with the query sort
//! inside that range; everything else sorts outside it.

use std::collections::HashMap;

use crate::card::ContactCard;

/// Sentinel appended to a query to form the upper bound of a prefix range.
///
/// This is the highest Unicode scalar value (U+10FFFF). An indexed value
/// that itself contains this character immediately after the queried prefix
/// sorts above the bound and is not matched; that corner is accepted rather
/// than special-cased.
pub const PREFIX_SENTINEL: char = char::MAX;

/// Inclusive `[lower, upper]` bounds matching every indexed value that
/// starts with `query`.
///
/// The query is folded to lowercase so the bounds line up with the
/// normalized index keys; the same fold is applied on the write path, so
/// non-ASCII queries compare consistently.
#[must_use]
pub fn prefix_bounds(query: &str) -> (String, String) {
    let lower = query.to_lowercase();
    let mut upper = lower.clone();
    upper.push(PREFIX_SENTINEL);
    (lower, upper)
}

/// Merge independently-scanned result sets into a deduplicated union keyed
/// by card id. A card matched by more than one scan appears once. Order
/// beyond deduplication is unspecified.
#[must_use]
pub fn merge_by_id(scans: Vec<Vec<ContactCard>>) -> Vec<ContactCard> {
    let mut by_id: HashMap<i64, ContactCard> = HashMap::new();
    for card in scans.into_iter().flatten() {
        // Scanned rows always carry an id; a card without one cannot be
        // deduplicated and is dropped.
        if let Some(id) = card.id {
            by_id.insert(id, card);
        }
    }
    by_id.into_values().collect()
}
