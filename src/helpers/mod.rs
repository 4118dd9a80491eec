//! Helper functions shared by the generator and the feed

mod url;

pub use url::*;
