//! AI Ranking Output
//!
//! The ranking itself is computed by an external analysis pipeline; this
//! module only consumes its output. Analyses arrive as free text with a
//! numbered list of tokens (e.g. `1. Bonk (BONK) - strongest inflow`),
//! ordered best-first or worst-first.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::models::{SortDirection, TokenEntry};

/// Whether the analysis listed tokens best-first or worst-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankDirection {
    Best,
    Worst,
}

impl RankDirection {
    /// Sort direction that puts the analysis's first pick on top.
    pub fn sort_direction(self) -> SortDirection {
        match self {
            RankDirection::Best => SortDirection::Ascending,
            RankDirection::Worst => SortDirection::Descending,
        }
    }
}

/// Extract a symbol-to-rank mapping from analysis text.
///
/// Each numbered line is resolved against the entry snapshot the analysis
/// was run on, by case-insensitive name or symbol match. Positions are
/// 1-based over the *resolved* lines, so an unrecognized line does not
/// leave a gap. The returned keys are the entries' exact symbols, ready
/// for the case-sensitive merge. First resolution of a symbol wins.
pub fn parse_ranking(text: &str, entries: &[TokenEntry]) -> HashMap<String, u32> {
    let mut ranks: HashMap<String, u32> = HashMap::new();
    let mut position = 0u32;

    for line in text.lines() {
        let Some(label) = ranked_line_label(line) else {
            continue;
        };
        let Some(entry) = entries.iter().find(|e| {
            e.name.eq_ignore_ascii_case(label) || e.symbol.eq_ignore_ascii_case(label)
        }) else {
            debug!("No token in snapshot matches ranked line {:?}", label);
            continue;
        };
        if ranks.contains_key(&entry.symbol) {
            continue;
        }
        position += 1;
        ranks.insert(entry.symbol.clone(), position);
    }

    debug!("Parsed {} ranked symbols from analysis text", ranks.len());
    ranks
}

/// Pull the token label out of a numbered line: digits, a dot, whitespace,
/// then everything up to an opening parenthesis.
fn ranked_line_label(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let digits = trimmed.find(|c: char| !c.is_ascii_digit())?;
    if digits == 0 {
        return None;
    }
    let rest = trimmed[digits..].strip_prefix('.')?;
    if !rest.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }
    let label = rest.split('(').next().unwrap_or("").trim();
    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, symbol: &str) -> TokenEntry {
        TokenEntry {
            mint: format!("mint-{}", symbol),
            name: name.to_string(),
            symbol: symbol.to_string(),
            image_url: None,
            price: 1.0,
            market_cap: 0.0,
            price_change_percent: 0.0,
            rank: 1,
            ai_rank: None,
        }
    }

    #[test]
    fn test_parses_numbered_list() {
        let entries = vec![entry("Bonk", "BONK"), entry("Dogwifhat", "WIF")];
        let text = "Here is my take:\n\
                    1. Bonk (BONK) - strongest inflow\n\
                    2. dogwifhat (WIF) - steady volume\n\
                    Overall the market looks frothy.";

        let ranks = parse_ranking(text, &entries);
        assert_eq!(ranks.get("BONK"), Some(&1));
        assert_eq!(ranks.get("WIF"), Some(&2));
        assert_eq!(ranks.len(), 2);
    }

    #[test]
    fn test_resolves_by_symbol_case_insensitively() {
        let entries = vec![entry("Some Long Name", "ABC")];
        let ranks = parse_ranking("1. abc - looks good", &entries);
        assert_eq!(ranks.get("ABC"), Some(&1));
    }

    #[test]
    fn test_unresolved_lines_leave_no_gap() {
        let entries = vec![entry("Bonk", "BONK"), entry("Dogwifhat", "WIF")];
        let text = "1. Bonk\n2. SomethingUnknown\n3. WIF";

        let ranks = parse_ranking(text, &entries);
        assert_eq!(ranks.get("BONK"), Some(&1));
        // WIF holds position 2, not 3: positions count resolved lines only
        assert_eq!(ranks.get("WIF"), Some(&2));
    }

    #[test]
    fn test_first_resolution_wins() {
        let entries = vec![entry("Bonk", "BONK")];
        let text = "1. Bonk\n2. BONK";

        let ranks = parse_ranking(text, &entries);
        assert_eq!(ranks.get("BONK"), Some(&1));
        assert_eq!(ranks.len(), 1);
    }

    #[test]
    fn test_ignores_non_numbered_lines() {
        let entries = vec![entry("Bonk", "BONK")];
        let text = "Bonk is great\n- Bonk\n1776 was a year\n1.Bonk\n\n1. Bonk";

        // Only the final, well-formed line counts (numbered, dot, space)
        let ranks = parse_ranking(text, &entries);
        assert_eq!(ranks.get("BONK"), Some(&1));
        assert_eq!(ranks.len(), 1);
    }

    #[test]
    fn test_sort_direction_mapping() {
        assert_eq!(RankDirection::Best.sort_direction(), SortDirection::Ascending);
        assert_eq!(RankDirection::Worst.sort_direction(), SortDirection::Descending);
    }
}
