//! opencode-bridge: drive a server-based coding agent as a conventional
//! text-generation backend.
//!
//! The agent server multiplexes every session onto one SSE event feed; this
//! crate correlates those events to the active session, translates them into
//! a well-formed stream of generation events (start/delta/end triads, tool
//! lifecycle, one terminal finish or error), and can fold the same
//! interpretation into a synchronous result.
//!
//! # Quick Start
//!
//! ```no_run
//! use opencode_bridge::prelude::*;
//! use tokio_util::sync::CancellationToken;
//! use futures::StreamExt;
//!
//! # async fn example() -> opencode_bridge::error::Result<()> {
//! let provider = OpenCodeProvider::from_shared();
//! let request = ProviderRequest::text("add a unit test for the parser");
//! let mut stream = provider.stream_text(&request, CancellationToken::new()).await?;
//! while let Some(part) = stream.next().await {
//!     println!("{part:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod correlate;
pub mod error;
pub mod finish;
pub mod prelude;
pub mod provider;
pub mod translate;
pub mod types;
