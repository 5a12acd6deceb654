use std::{
    io::{self, BufRead, BufReader, Read, Write},
    net::{Shutdown, SocketAddr, TcpStream},
};

use dns_lookup::{AddrInfoHints, Protocol, SockType, getaddrinfo};
use log::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFailure {
    pub addr: SocketAddr,
    pub cause: String,
}

/// Resolve `host` and `port` to TCP endpoints in resolver order. `port` may
/// be a number or any service name the system knows.
pub fn resolve(host: &str, port: &str) -> Result<Vec<SocketAddr>> {
    let resolution_error = |cause: String| Error::AddressResolution {
        host: host.to_string(),
        port: port.to_string(),
        cause,
    };

    if host.is_empty() {
        return Err(resolution_error("empty host".to_string()));
    }
    if port.is_empty() {
        return Err(resolution_error("empty service".to_string()));
    }

    let hints = AddrInfoHints {
        socktype: SockType::Stream.into(),
        protocol: Protocol::TCP.into(),
        ..AddrInfoHints::default()
    };
    let addrs = getaddrinfo(Some(host), Some(port), Some(hints))
        .map_err(|err| resolution_error(io::Error::from(err).to_string()))?
        .map(|info| info.map(|info| info.sockaddr))
        .collect::<io::Result<Vec<_>>>()
        .map_err(|err| resolution_error(err.to_string()))?;
    if addrs.is_empty() {
        return Err(resolution_error("no addresses found".to_string()));
    }
    Ok(addrs)
}

pub fn dial(host: &str, port: &str) -> Result<Connection> {
    let candidates = resolve(host, port)?;

    let mut attempts = Vec::new();
    for addr in candidates {
        match TcpStream::connect(addr) {
            Ok(stream) => {
                debug!("connected to {addr}");
                return Ok(Connection::new(stream));
            }
            Err(err) => {
                debug!("connect to {addr} failed: {err}");
                attempts.push(CandidateFailure {
                    addr,
                    cause: err.to_string(),
                });
            }
        }
    }

    Err(Error::Connect {
        host: host.to_string(),
        port: port.to_string(),
        attempts,
    })
}

/// Buffered TCP stream. Consumed by `close`; dropping it also closes the socket.
#[derive(Debug)]
pub struct Connection {
    inner: BufReader<TcpStream>,
}

impl Connection {
    fn new(stream: TcpStream) -> Self {
        Self {
            inner: BufReader::new(stream),
        }
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.inner.get_ref().peer_addr()
    }

    pub fn close(self) {
        let stream = self.inner.into_inner();
        if let Err(err) = stream.shutdown(Shutdown::Both) {
            // The peer usually got there first.
            debug!("shutdown: {err}");
        }
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for Connection {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.get_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.get_mut().flush()
    }
}
