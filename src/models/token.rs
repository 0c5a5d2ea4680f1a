use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Trending windows supported by the upstream feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeframeKey {
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "6h")]
    H6,
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "24h")]
    H24,
}

impl TimeframeKey {
    /// All supported windows, in ascending span order.
    pub const ALL: [TimeframeKey; 7] = [
        TimeframeKey::M5,
        TimeframeKey::M15,
        TimeframeKey::M30,
        TimeframeKey::H1,
        TimeframeKey::H6,
        TimeframeKey::H12,
        TimeframeKey::H24,
    ];

    /// Path segment used by the upstream API (e.g. `5m`, `24h`).
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeframeKey::M5 => "5m",
            TimeframeKey::M15 => "15m",
            TimeframeKey::M30 => "30m",
            TimeframeKey::H1 => "1h",
            TimeframeKey::H6 => "6h",
            TimeframeKey::H12 => "12h",
            TimeframeKey::H24 => "24h",
        }
    }

    /// Display label (e.g. `5M`, `24H`).
    pub fn label(&self) -> &'static str {
        match self {
            TimeframeKey::M5 => "5M",
            TimeframeKey::M15 => "15M",
            TimeframeKey::M30 => "30M",
            TimeframeKey::H1 => "1H",
            TimeframeKey::H6 => "6H",
            TimeframeKey::H12 => "12H",
            TimeframeKey::H24 => "24H",
        }
    }
}

impl fmt::Display for TimeframeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeframeKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "5m" => Ok(TimeframeKey::M5),
            "15m" => Ok(TimeframeKey::M15),
            "30m" => Ok(TimeframeKey::M30),
            "1h" => Ok(TimeframeKey::H1),
            "6h" => Ok(TimeframeKey::H6),
            "12h" => Ok(TimeframeKey::H12),
            "24h" => Ok(TimeframeKey::H24),
            other => bail!("Unsupported timeframe: {}", other),
        }
    }
}

/// Canonical token row, immutable for the duration of a fetch cycle.
///
/// `rank` is the upstream positional rank, assigned once at normalization
/// time from arrival order. Sorting changes display order only; it never
/// touches this field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenEntry {
    /// Token mint address, unique within a normalized set
    pub mint: String,
    /// Token name
    pub name: String,
    /// Token symbol
    pub symbol: String,
    /// Logo URL, if the upstream record carried one
    pub image_url: Option<String>,
    /// Price in USD
    pub price: f64,
    /// Market cap in USD
    pub market_cap: f64,
    /// Signed price change over the fetched timeframe, 0 when unavailable
    pub price_change_percent: f64,
    /// Upstream positional rank (1-based)
    pub rank: u32,
    /// AI ranking position, set only after a merge matched this symbol
    pub ai_rank: Option<u32>,
}

/// Sortable columns of the feed view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Rank,
    Name,
    Price,
    MarketCap,
    PriceChangePercent,
    AiRank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Orient a comparison result for this direction.
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Current sort column and direction; controller state only, cached
/// entry data is never reordered in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: SortKey::Rank,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortSpec {
    /// Header-click behavior: clicking the active column flips direction,
    /// clicking a new column sorts it ascending.
    pub fn toggle(self, key: SortKey) -> Self {
        if self.key == key {
            Self {
                key,
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                key,
                direction: SortDirection::Ascending,
            }
        }
    }
}

// --- Raw upstream shapes ---
//
// Malformed and partial rows are common upstream, so every leaf is
// optional and unknown fields are ignored. The normalizer decides what
// is usable.

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawTokenRecord {
    pub token: Option<RawTokenInfo>,
    #[serde(default)]
    pub pools: Vec<RawPool>,
    #[serde(default)]
    pub events: HashMap<String, RawEventWindow>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawTokenInfo {
    pub mint: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPool {
    pub price: Option<RawUsdAmount>,
    pub market_cap: Option<RawUsdAmount>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawUsdAmount {
    pub usd: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventWindow {
    pub price_change_percentage: Option<f64>,
}

impl RawTokenRecord {
    /// USD price from the primary pool, if present.
    pub fn price_usd(&self) -> Option<f64> {
        self.pools
            .first()
            .and_then(|p| p.price.as_ref())
            .and_then(|v| v.usd)
    }

    /// USD market cap from the primary pool, 0 when unavailable.
    pub fn market_cap_usd(&self) -> f64 {
        self.pools
            .first()
            .and_then(|p| p.market_cap.as_ref())
            .and_then(|v| v.usd)
            .unwrap_or(0.0)
    }

    /// Price change percentage for the given window, 0 when unavailable.
    pub fn price_change_percent(&self, timeframe: TimeframeKey) -> f64 {
        self.events
            .get(timeframe.as_str())
            .and_then(|e| e.price_change_percentage)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_roundtrip() {
        for tf in TimeframeKey::ALL {
            let parsed: TimeframeKey = tf.as_str().parse().unwrap();
            assert_eq!(parsed, tf);
        }
        // Labels parse too (case-insensitive)
        assert_eq!("5M".parse::<TimeframeKey>().unwrap(), TimeframeKey::M5);
        assert!("2h".parse::<TimeframeKey>().is_err());
    }

    #[test]
    fn test_sort_spec_toggle() {
        let spec = SortSpec::default();
        assert_eq!(spec.key, SortKey::Rank);

        let spec = spec.toggle(SortKey::Price);
        assert_eq!(spec.key, SortKey::Price);
        assert_eq!(spec.direction, SortDirection::Ascending);

        let spec = spec.toggle(SortKey::Price);
        assert_eq!(spec.direction, SortDirection::Descending);

        let spec = spec.toggle(SortKey::Name);
        assert_eq!(spec.key, SortKey::Name);
        assert_eq!(spec.direction, SortDirection::Ascending);
    }

    #[test]
    fn test_raw_record_parsing() {
        let json = r#"{
            "token": {"mint": "So111", "name": "Wrapped SOL", "symbol": "SOL", "image": "https://img/sol.png"},
            "pools": [{"price": {"usd": 142.5}, "marketCap": {"usd": 68000000000.0}}],
            "events": {"5m": {"priceChangePercentage": -0.42}, "1h": {}}
        }"#;

        let record: RawTokenRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.price_usd(), Some(142.5));
        assert_eq!(record.market_cap_usd(), 68000000000.0);
        assert_eq!(record.price_change_percent(TimeframeKey::M5), -0.42);
        assert_eq!(record.price_change_percent(TimeframeKey::H1), 0.0);
        assert_eq!(record.price_change_percent(TimeframeKey::H24), 0.0);
    }

    #[test]
    fn test_raw_record_tolerates_missing_fields() {
        let record: RawTokenRecord =
            serde_json::from_str(r#"{"token": {"mint": "abc"}}"#).unwrap();
        assert_eq!(record.price_usd(), None);
        assert_eq!(record.market_cap_usd(), 0.0);

        // An empty object is still a record, just unusable
        let record: RawTokenRecord = serde_json::from_str("{}").unwrap();
        assert!(record.token.is_none());
    }
}
