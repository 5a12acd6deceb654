//! A minimal HTTP/1.0 client that fetches one resource over a raw TCP socket.
//!
//! The body is streamed to an output writer as it arrives, and elapsed time
//! and bandwidth are reported to a diagnostic writer once the transfer ends.

pub mod error;
pub mod http;
pub mod metrics;
pub mod socket;
pub mod url;

pub use error::{Error, Result};
pub use http::{Client, Exchange, Request, ResponseOutcome};
pub use metrics::{Metrics, Stopwatch};
pub use socket::{Connection, dial};
pub use url::Url;

/// Log to stderr at `warn` unless `RUST_LOG` says otherwise.
pub fn init_logging() {
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_module("curlit", LevelFilter::Warn)
        .parse_default_env()
        .init();
}
