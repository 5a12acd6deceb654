use std::io::{self, BufRead, Read, Write};

use log::debug;

use crate::{
    error::{Error, Result},
    metrics::Stopwatch,
    socket::{self, Connection},
    url::Url,
};

/// Size of each body read, matching stdio's `BUFSIZ`.
pub const CHUNK_SIZE: usize = 8192;

/// Status and header lines longer than this are read in pieces.
const MAX_LINE: u64 = CHUNK_SIZE as u64;

const STATUS_OK_MARKER: &[u8] = b"200 OK";
const CONTENT_LENGTH_PREFIX: &[u8] = b"Content-Length:";

#[derive(Debug, Clone)]
pub struct Client {
    chunk_size: usize,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    pub fn new() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn get(&self, url: &str, out: impl Write, diag: impl Write) -> Result<ResponseOutcome> {
        self.fetch(&Url::parse(url)?, out, diag)
    }

    /// Stream the body of `url` into `out` and write timing metrics to `diag`.
    ///
    /// Metrics are written whenever the connection was established, even if
    /// the response turns out to be a failure. Body bytes already written to
    /// `out` are never taken back.
    pub fn fetch(&self, url: &Url, out: impl Write, diag: impl Write) -> Result<ResponseOutcome> {
        let stopwatch = Stopwatch::start();
        let conn = socket::dial(url.host(), url.port())?;
        if let Ok(peer) = conn.peer_addr() {
            debug!("fetching {url} from {peer}");
        }
        self.fetch_over(url, stopwatch, conn, out, diag, Connection::close)
    }

    fn fetch_over<S: BufRead + Write>(
        &self,
        url: &Url,
        stopwatch: Stopwatch,
        stream: S,
        mut out: impl Write,
        mut diag: impl Write,
        close: impl FnOnce(S),
    ) -> Result<ResponseOutcome> {
        let mut exchange = Exchange::with_chunk_size(stream, self.chunk_size);
        let exchanged = exchange.run(&Request::get(url), &mut out);
        let (stream, outcome) = exchange.into_parts();
        let metrics = stopwatch.stop(outcome.received_bytes);

        let reported = metrics.report(&mut diag);
        close(stream);

        exchanged?;
        reported?;
        outcome.check()?;
        Ok(outcome)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    host: &'a str,
    path: &'a str,
}

impl<'a> Request<'a> {
    pub fn get(url: &'a Url) -> Self {
        Self {
            host: url.host(),
            path: url.path(),
        }
    }

    /// The slash is always prepended, so a path that already starts with one
    /// is sent with two.
    pub fn send_v10(&self, mut writer: impl Write) -> io::Result<()> {
        let mut bytes = Vec::new();
        write!(bytes, "GET /{} HTTP/1.0\r\n", self.path)?;
        write!(bytes, "Host: {}\r\n", self.host)?;
        bytes.extend_from_slice(b"\r\n");

        writer.write_all(&bytes)?;
        writer.flush()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseOutcome {
    pub status_line: String,
    pub status_ok: bool,
    pub declared_length: Option<u64>,
    pub received_bytes: u64,
}

impl ResponseOutcome {
    /// A missing or zero `Content-Length` skips the comparison.
    pub fn length_ok(&self) -> bool {
        match self.declared_length {
            None | Some(0) => true,
            Some(declared) => declared == self.received_bytes,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_ok && self.length_ok()
    }

    pub fn check(&self) -> Result<()> {
        if !self.status_ok {
            return Err(Error::ProtocolStatus(self.status_line.clone()));
        }
        match self.declared_length {
            Some(declared) if !self.length_ok() => Err(Error::LengthMismatch {
                declared,
                received: self.received_bytes,
            }),
            _ => Ok(()),
        }
    }
}

/// One request/response cycle. Headers end at the first line of two bytes
/// or fewer; the body runs to end of stream.
pub struct Exchange<S> {
    stream: S,
    chunk_size: usize,
    outcome: ResponseOutcome,
}

impl<S: BufRead + Write> Exchange<S> {
    pub fn new(stream: S) -> Self {
        Self::with_chunk_size(stream, CHUNK_SIZE)
    }

    pub fn with_chunk_size(stream: S, chunk_size: usize) -> Self {
        Self {
            stream,
            chunk_size: chunk_size.max(1),
            outcome: ResponseOutcome::default(),
        }
    }

    pub fn run(&mut self, request: &Request<'_>, out: impl Write) -> io::Result<()> {
        self.send_request(request)?;
        self.read_status()?;
        self.read_headers()?;
        self.drain_body(out)
    }

    pub fn outcome(&self) -> &ResponseOutcome {
        &self.outcome
    }

    pub fn into_parts(self) -> (S, ResponseOutcome) {
        (self.stream, self.outcome)
    }

    fn send_request(&mut self, request: &Request<'_>) -> io::Result<()> {
        request.send_v10(&mut self.stream)
    }

    fn read_line(&mut self, line: &mut Vec<u8>) -> io::Result<usize> {
        line.clear();
        (&mut self.stream).take(MAX_LINE).read_until(b'\n', line)
    }

    fn read_status(&mut self) -> io::Result<()> {
        let mut line = Vec::new();
        self.read_line(&mut line)?;

        self.outcome.status_ok = contains(&line, STATUS_OK_MARKER);
        self.outcome.status_line = String::from_utf8_lossy(&line).trim_end().to_string();
        debug!("status: {}", self.outcome.status_line);
        Ok(())
    }

    fn read_headers(&mut self) -> io::Result<()> {
        let mut line = Vec::new();
        while self.read_line(&mut line)? > 2 {
            if let Some(length) = parse_content_length(&line) {
                self.outcome.declared_length = Some(length);
            }
        }
        Ok(())
    }

    fn drain_body(&mut self, mut out: impl Write) -> io::Result<()> {
        let mut buf = vec![0u8; self.chunk_size];
        loop {
            let n = match self.stream.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            };
            out.write_all(&buf[..n])?;
            self.outcome.received_bytes += n as u64;
        }
        out.flush()
    }
}

/// Mirrors `sscanf(line, "Content-Length: %d")`: case-sensitive name,
/// optional whitespace and `+`, trailing bytes ignored. Negative or
/// out-of-range values yield `None`.
pub fn parse_content_length(line: &[u8]) -> Option<u64> {
    let value = line.strip_prefix(CONTENT_LENGTH_PREFIX)?.trim_ascii_start();
    let value = value.strip_prefix(b"+").unwrap_or(value);
    let digits = value.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    std::str::from_utf8(&value[..digits]).ok()?.parse().ok()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
