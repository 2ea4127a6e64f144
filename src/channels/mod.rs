//! Channel catalog and name reconciliation

pub mod aliases;
pub mod catalog;
pub mod matcher;
pub mod normalizer;

pub use aliases::AliasTable;
pub use catalog::ChannelCatalog;
pub use matcher::{ChannelMatcher, MatchingOptions};
pub use normalizer::NameNormalizer;
