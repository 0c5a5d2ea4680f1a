//! Feed Sorter
//!
//! Stable total order over token entries for display. Sorting never
//! mutates cached data; callers get a freshly ordered copy.
//!
//! Missing-value policy:
//! - numeric keys treat NaN/non-finite values as 0 (low), before the
//!   direction is applied
//! - `ai_rank` treats absent as worst-possible: unranked entries always
//!   sort after ranked ones, in both directions

use std::cmp::Ordering;

use crate::models::{SortDirection, SortKey, SortSpec, TokenEntry};

/// Return the entries reordered according to the sort spec.
pub fn sort_entries(entries: &[TokenEntry], spec: SortSpec) -> Vec<TokenEntry> {
    let mut sorted = entries.to_vec();
    // Vec::sort_by is stable: ties keep their pre-sort relative order
    sorted.sort_by(|a, b| compare(a, b, spec));
    sorted
}

fn compare(a: &TokenEntry, b: &TokenEntry, spec: SortSpec) -> Ordering {
    match spec.key {
        SortKey::Rank => spec.direction.apply(a.rank.cmp(&b.rank)),
        SortKey::Name => spec
            .direction
            .apply(a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        SortKey::Price => numeric(a.price, b.price, spec.direction),
        SortKey::MarketCap => numeric(a.market_cap, b.market_cap, spec.direction),
        SortKey::PriceChangePercent => numeric(
            a.price_change_percent,
            b.price_change_percent,
            spec.direction,
        ),
        SortKey::AiRank => match (a.ai_rank, b.ai_rank) {
            (Some(x), Some(y)) => spec.direction.apply(x.cmp(&y)),
            // Unranked entries fall to the end regardless of direction
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

fn numeric(a: f64, b: f64, direction: SortDirection) -> Ordering {
    let a = if a.is_finite() { a } else { 0.0 };
    let b = if b.is_finite() { b } else { 0.0 };
    direction.apply(a.partial_cmp(&b).unwrap_or(Ordering::Equal))
}
