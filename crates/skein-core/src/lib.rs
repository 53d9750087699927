//! skein-core — shared data model and pipeline layers for skein.
//!
//! Both sides of the pipeline link this crate: clients use the protocol codec
//! and a mirrored [`Registry`] to mint loggers, the viewer uses everything.
//!
//! # Architecture
//!
//! ```text
//! client facade ──► codec ──► TCP ──► codec ──► Aggregator ─┬─► Registry  ("add")
//!                                                           └─► LogBuffer ("log") ──► view
//! ```
//!
//! Nothing in this crate performs I/O except [`config::Config::load`]; the
//! server and client crates own the sockets.

pub mod aggregator;
pub mod color;
pub mod config;
pub mod protocol;
pub mod registry;
pub mod search;
pub mod store;
pub mod types;

pub use aggregator::Aggregator;
pub use protocol::{FrameCodec, Message, ProtocolError};
pub use registry::{Registry, RegistryError};
pub use search::{FilterCompileError, FilterState};
pub use store::LogBuffer;
pub use types::{Level, LogMessage, LogRecord, LoggerDescriptor, LoggerId, LoggerRecord};
