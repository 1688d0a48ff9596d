//! # Leadlist - Real-Time Synchronized Lead List
//!
//! A lead-capture list mirrored from a remote append/remove collection over
//! WebSocket, with snapshot-driven full re-rendering.
//!
//! ## Features
//!
//! - **Full-snapshot sync**: the store broadcasts its complete state on
//!   every change; the view is always a pure function of the latest snapshot
//! - **Fire-and-forget writes**: `append` and `clear_all` queue a request
//!   and return immediately, confirmation arrives as the next snapshot
//! - **Pluggable rendering**: HTML link-list, terminal output, or any
//!   `Render` implementation (closures work too)
//! - **Self-hosted store**: an axum WebSocket server backed by SQLite
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use leadlist::{ListSync, StoreClient};
//! use leadlist::render::HtmlList;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = StoreClient::connect("ws://localhost:3000/ws").await?;
//!     let snapshots = client.subscribe();
//!
//!     let mut sync = ListSync::new(client, Box::new(HtmlList::new()));
//!     sync.append("https://example.com")?;
//!     sync.drive(snapshots).await;
//!     Ok(())
//! }
//! ```

pub mod list;
pub mod render;
pub mod server;
pub mod storage;
pub mod sync;

// Re-export main types for library consumers
pub use list::{Entry, Snapshot};
pub use render::Render;
pub use storage::ListStore;
pub use sync::{ClientRequest, ListSync, RemoteList, ServerMessage, SnapshotHub, StoreClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
