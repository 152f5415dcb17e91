//! Remote search-server clients.
//!
//! [`RemoteIndex`] is the thin abstraction over the server's wire API;
//! [`HttpIndex`] speaks the real REST protocol and [`MemoryIndex`] is the
//! in-process implementation used by tests, demos and embedders that want
//! a local index.

pub mod http;
pub mod memory;
pub mod traits;

pub use http::{HttpIndex, HttpProvider};
pub use memory::{MemoryIndex, MemoryProvider};
pub use traits::{
    DocumentOutcome, ImportMode, ImportReport, IndexError, RemoteIndex, RemoteIndexProvider,
};
