pub mod ranking;

pub use ranking::{parse_ranking, RankDirection};
