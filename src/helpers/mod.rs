//! Helper functions shared by the generator, feeds and server

mod date;
mod url;

pub use date::*;
pub use url::*;
