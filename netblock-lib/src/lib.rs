//! `netblock-lib` is a library for aggregating IP blocklists.
//!
//! It fetches remotely hosted blocklists over HTTP with bounded
//! concurrency and retries, validates the entries as IPv4 networks and
//! collapses them into a minimal, overlap-free set.
//!
//! ```no_run
//! use std::time::Duration;
//! use netblock_lib::{collapse::collapse, ClientBuilder, Collector, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!   let client = ClientBuilder::default().client()?;
//!   let collector = Collector::new(client, 3, Duration::from_secs(1));
//!   let sources = vec!["https://example.com/blocklist.txt".parse().unwrap()];
//!   let harvest = collector.collect_all(sources).await;
//!   let networks = collapse(harvest.networks);
//!   for network in networks {
//!     println!("{network}");
//!   }
//!   Ok(())
//! }
//! ```
//!
//! For finer control over timeouts, retries and backoff, configure the
//! client through [`ClientBuilder`] and consume the per-source stream
//! from [`Collector::collect`] instead.
#![warn(clippy::all, clippy::pedantic)]
#![deny(missing_docs)]

mod client;
mod retry;
mod types;

pub mod collapse;
pub mod collector;
pub mod validate;

pub use client::{
    Client, ClientBuilder, DEFAULT_BACKOFF_BASE_SECS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_CONCURRENCY, DEFAULT_PACING_DELAY_SECS, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
pub use collector::{Collector, Harvest, SourceReport};
pub use types::*;
