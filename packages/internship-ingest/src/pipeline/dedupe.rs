//! In-batch deduplication by url.

use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::debug;

use crate::types::{listing::Listing, summary::DedupeStats};

/// Keep the first listing seen for each url, in first-seen order.
///
/// Listings without a usable identity url are dropped. Only the batch
/// passed in is considered; stored listings are the existence filter's
/// concern.
pub fn dedupe(listings: Vec<Listing>) -> (Vec<Listing>, DedupeStats) {
    let mut stats = DedupeStats {
        input: listings.len(),
        ..Default::default()
    };
    let mut by_url: IndexMap<String, Listing> = IndexMap::with_capacity(listings.len());

    for listing in listings {
        if !listing.has_identity() {
            stats.dropped_invalid += 1;
            continue;
        }
        match by_url.entry(listing.url.clone()) {
            Entry::Occupied(_) => stats.dropped_duplicate += 1,
            Entry::Vacant(slot) => {
                slot.insert(listing);
            }
        }
    }

    let unique: Vec<Listing> = by_url.into_values().collect();
    stats.output = unique.len();

    debug!(
        input = stats.input,
        invalid = stats.dropped_invalid,
        duplicate = stats.dropped_duplicate,
        output = stats.output,
        "Deduplicated batch"
    );

    (unique, stats)
}
