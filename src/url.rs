use std::fmt;

use crate::error::{Error, Result};

const HOST_DELIMITER: &str = "://";
const PATH_DELIMITER: char = '/';
const PORT_DELIMITER: char = ':';

pub const DEFAULT_PORT: &str = "80";

/// Longest host name accepted, matching `NI_MAXHOST` without its terminator.
pub const MAX_HOST_LEN: usize = 1024;
/// Longest service name or port accepted, matching `NI_MAXSERV`.
pub const MAX_PORT_LEN: usize = 31;
/// Longest path accepted, matching `PATH_MAX`.
pub const MAX_PATH_LEN: usize = 4095;

/// A URL split into the three pieces the client needs.
///
/// `path` never carries the leading slash; the request line adds it back.
/// No percent-decoding or query handling is done, and an empty host is
/// left for address resolution to reject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    host: String,
    port: String,
    path: String,
}

impl Url {
    pub fn parse(s: &str) -> Result<Self> {
        // Skip the scheme, if any. Its value is never checked.
        let rest = match s.find(HOST_DELIMITER) {
            Some(index) => &s[index + HOST_DELIMITER.len()..],
            None => s,
        };

        let (authority, path) = rest.split_once(PATH_DELIMITER).unwrap_or((rest, ""));
        let (host, port) = authority
            .split_once(PORT_DELIMITER)
            .unwrap_or((authority, DEFAULT_PORT));

        Ok(Self {
            host: bounded("host", host, MAX_HOST_LEN)?,
            port: bounded("port", port, MAX_PORT_LEN)?,
            path: bounded("path", path, MAX_PATH_LEN)?,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.host, self.port, self.path)
    }
}

fn bounded(component: &'static str, value: &str, max: usize) -> Result<String> {
    if value.len() > max {
        return Err(Error::ComponentTooLong {
            component,
            len: value.len(),
            max,
        });
    }
    Ok(value.to_string())
}
