//! skein — hierarchical remote logging.
//!
//! Programs create [`Logger`](skein_client::Logger)s through a
//! [`Client`](skein_client::Client); every record travels as a CRLF-terminated
//! JSON frame over TCP to the viewer, which resolves logger hierarchies,
//! keeps the last records, and shows them through a live regex filter.
//!
//! # Architecture
//!
//! ```text
//! Client ──► Transport ══TCP══► Server ──► Aggregator ──► TUI
//!                                         (Registry, LogBuffer)
//! ```
//!
//! The member crates are re-exported so integration tests can reach every
//! layer from one place.

pub mod demo;

pub use skein_client;
pub use skein_core;
pub use skein_server;
pub use skein_tui;
