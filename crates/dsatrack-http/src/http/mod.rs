//! HTTP transport for the tracker API.

mod client;
pub mod endpoints;

pub use client::HttpClient;
pub(crate) use client::map_transport;
