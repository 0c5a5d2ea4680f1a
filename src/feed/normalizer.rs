//! Token Record Normalizer
//!
//! Projects raw upstream records into canonical `TokenEntry` rows.
//! Ingestion is tolerant: malformed rows are dropped, never surfaced as
//! errors. A row is usable when it carries a non-empty mint, a non-empty
//! name and a finite non-negative USD price.

use std::collections::HashSet;
use tracing::debug;

use crate::error::FeedError;
use crate::models::{RawTokenRecord, TimeframeKey, TokenEntry};

/// Normalize one fetch cycle's worth of raw records.
///
/// Duplicate mints keep the earliest occurrence. Positional `rank` is
/// assigned 1-based from arrival order after filtering and deduplication.
pub fn normalize_records(records: &[RawTokenRecord], timeframe: TimeframeKey) -> Vec<TokenEntry> {
    let mut seen_mints: HashSet<String> = HashSet::new();
    let mut entries: Vec<TokenEntry> = Vec::with_capacity(records.len());

    for record in records {
        match project(record, timeframe, (entries.len() + 1) as u32) {
            Ok(entry) => {
                if !seen_mints.insert(entry.mint.clone()) {
                    debug!("Dropping duplicate mint {} ({})", entry.mint, entry.symbol);
                    continue;
                }
                entries.push(entry);
            }
            Err(e) => {
                debug!("Dropping malformed trending record: {}", e);
            }
        }
    }

    entries
}

fn project(
    record: &RawTokenRecord,
    timeframe: TimeframeKey,
    rank: u32,
) -> Result<TokenEntry, FeedError> {
    let token = record
        .token
        .as_ref()
        .ok_or_else(|| FeedError::InvalidRecord("missing token object".to_string()))?;

    let mint = token
        .mint
        .as_deref()
        .filter(|m| !m.is_empty())
        .ok_or_else(|| FeedError::InvalidRecord("missing mint".to_string()))?;

    let name = token
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| FeedError::InvalidRecord(format!("missing name for {}", mint)))?;

    let price = record
        .price_usd()
        .ok_or_else(|| FeedError::InvalidRecord(format!("missing price for {}", mint)))?;
    if !price.is_finite() || price < 0.0 {
        return Err(FeedError::InvalidRecord(format!(
            "unusable price {} for {}",
            price, mint
        )));
    }

    Ok(TokenEntry {
        mint: mint.to_string(),
        name: name.to_string(),
        symbol: token.symbol.clone().unwrap_or_default(),
        image_url: token.image.clone(),
        price,
        market_cap: record.market_cap_usd(),
        price_change_percent: record.price_change_percent(timeframe),
        rank,
        ai_rank: None,
    })
}
