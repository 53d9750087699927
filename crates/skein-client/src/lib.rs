//! skein-client — the emitting side of skein.
//!
//! A [`Client`] owns the transport and mints [`Logger`]s. Loggers form a
//! hierarchy through their parent paths; the viewer resolves the labels.
//!
//! ```ignore
//! let transport = Arc::new(TcpTransport::connect(addr));
//! let client = Client::new(transport.clone());
//! let db = client.create("db");
//! let rows = db.create_child("query").info("rows fetched", rows);
//! ```

pub mod limiter;
pub mod logger;
pub mod transport;

pub use logger::{Client, Logger, LoggerOptions};
pub use skein_core::Level;
pub use transport::{MemoryTransport, TcpTransport, Transport, TransportWriteError};
