//! eBay marketplace integration.

mod client;
mod source;

pub use client::Client;
pub use source::EbaySource;
