#![allow(dead_code)]

use std::{
    io::{BufRead, BufReader, Write},
    net::TcpListener,
    thread::{self, JoinHandle},
};

/// A server that answers exactly one connection with a canned response.
pub struct OneShot {
    pub url: String,
    handle: JoinHandle<Vec<u8>>,
}

impl OneShot {
    pub fn serve(path: &str, response: &[u8]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let response = response.to_vec();

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request = Vec::new();
            loop {
                let n = reader.read_until(b'\n', &mut request).unwrap();
                if n == 0 || request.ends_with(b"\r\n\r\n") {
                    break;
                }
            }
            let mut stream = reader.into_inner();
            stream.write_all(&response).unwrap();
            request
        });

        Self {
            url: format!("http://127.0.0.1:{port}/{path}"),
            handle,
        }
    }

    /// The raw request the server received.
    pub fn request(self) -> Vec<u8> {
        self.handle.join().unwrap()
    }
}

/// A URL on a local port that nothing listens on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/")
}

pub fn metric_lines(diag: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(diag)
        .lines()
        .filter(|line| line.starts_with("Time Elapsed: ") || line.starts_with("Bandwidth: "))
        .map(str::to_string)
        .collect()
}
