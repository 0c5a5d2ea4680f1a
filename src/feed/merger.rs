//! Rank Merger
//!
//! Pure merge of an externally computed symbol-to-rank mapping into an
//! entry list. No I/O, no mutation of the input: the caller replaces the
//! cached list with the returned one.

use std::collections::HashMap;
use tracing::debug;

use crate::models::TokenEntry;

/// Produce a new entry list with `ai_rank` set from the mapping.
///
/// Lookup is by exact, case-sensitive `symbol`. An entry whose symbol is
/// not in the mapping ends up with `ai_rank` absent, even if a previous
/// merge had ranked it. Applying the same mapping twice is idempotent.
pub fn merge_ai_ranks(
    entries: &[TokenEntry],
    ranks: &HashMap<String, u32>,
) -> Vec<TokenEntry> {
    let mut matched = 0usize;
    let merged = entries
        .iter()
        .map(|entry| {
            let ai_rank = ranks.get(&entry.symbol).copied();
            if ai_rank.is_some() {
                matched += 1;
            }
            TokenEntry { ai_rank, ..entry.clone() }
        })
        .collect();

    debug!(
        "Merged AI ranking: {}/{} entries matched ({} ranks supplied)",
        matched,
        entries.len(),
        ranks.len()
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(symbol: &str, rank: u32) -> TokenEntry {
        TokenEntry {
            mint: format!("mint-{}", symbol),
            name: symbol.to_string(),
            symbol: symbol.to_string(),
            image_url: None,
            price: 1.0,
            market_cap: 0.0,
            price_change_percent: 0.0,
            rank,
            ai_rank: None,
        }
    }

    #[test]
    fn test_rank_set_iff_symbol_mapped() {
        let entries = vec![entry("AAA", 1), entry("BBB", 2), entry("CCC", 3)];
        let ranks = HashMap::from([("BBB".to_string(), 1), ("AAA".to_string(), 2)]);

        let merged = merge_ai_ranks(&entries, &ranks);
        assert_eq!(merged[0].ai_rank, Some(2));
        assert_eq!(merged[1].ai_rank, Some(1));
        assert_eq!(merged[2].ai_rank, None);

        // Input untouched
        assert!(entries.iter().all(|e| e.ai_rank.is_none()));
    }

    #[test]
    fn test_symbol_match_is_case_sensitive() {
        let entries = vec![entry("AAA", 1)];
        let ranks = HashMap::from([("aaa".to_string(), 1)]);

        let merged = merge_ai_ranks(&entries, &ranks);
        assert_eq!(merged[0].ai_rank, None);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let entries = vec![entry("AAA", 1), entry("BBB", 2)];
        let ranks = HashMap::from([("AAA".to_string(), 1)]);

        let once = merge_ai_ranks(&entries, &ranks);
        let twice = merge_ai_ranks(&once, &ranks);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_fresh_merge_clears_stale_ranks() {
        let mut ranked = entry("AAA", 1);
        ranked.ai_rank = Some(7);

        let merged = merge_ai_ranks(&[ranked], &HashMap::new());
        assert_eq!(merged[0].ai_rank, None);
    }
}
