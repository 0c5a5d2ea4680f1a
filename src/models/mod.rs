pub mod token;

// Re-export commonly used types
pub use token::{
    RawEventWindow, RawPool, RawTokenInfo, RawTokenRecord, RawUsdAmount, SortDirection, SortKey,
    SortSpec, TimeframeKey, TokenEntry,
};
