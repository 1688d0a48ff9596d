pub mod list_sync;
pub mod protocol;
pub mod remote;

pub use list_sync::{ListSync, RemoteList};
pub use protocol::{ClientRequest, ServerMessage, SnapshotHub};
pub use remote::StoreClient;

// Real-time list sync: the server publishes a full snapshot of the
// collection on every change, and every subscriber (WebSocket handlers,
// the watch CLI, tests) re-renders from the latest snapshot it receives.
