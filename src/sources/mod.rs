//! EPG source adapters
//!
//! Each upstream provider implements [`EpgSource`]; [`SourceFactory`] builds
//! them from configured names.
//!
//! - `cctv`: the official CCTV schedule API (CCTV channels only)
//! - `tvmao`: two-hour listing pages, CCTV fetch deferred
//! - `tvsou`: per-channel schedule pages

pub mod cctv;
pub mod factory;
pub mod http;
pub mod traits;
pub mod tvmao;
pub mod tvsou;

pub use factory::{SourceContext, SourceFactory};
pub use http::SourceHttpClient;
pub use traits::{EpgSource, FetchMode, SourceStaging};
