//! Local HTTP fixtures for the market client tests.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

/// A canned answer for every request whose path contains `fragment`.
pub(crate) struct Route {
    pub fragment: &'static str,
    pub status: u16,
    pub body: String,
}

impl Route {
    pub fn new(fragment: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self { fragment, status, body: body.into() }
    }
}

/// Serves `routes` until the test process exits. Unmatched paths get a 404.
pub(crate) fn route_server(routes: Vec<Route>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to random port");
    let port = listener.local_addr().unwrap().port();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut buf = [0u8; 8192];
            let n = stream.read(&mut buf).unwrap_or(0);
            let request = String::from_utf8_lossy(&buf[..n]);
            let path = request.lines().next().and_then(|l| l.split_whitespace().nth(1)).unwrap_or("/");

            let (status, body) = routes
                .iter()
                .find(|r| path.contains(r.fragment))
                .map(|r| (r.status, r.body.as_str()))
                .unwrap_or((404, "{}"));

            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });

    format!("http://127.0.0.1:{}/", port)
}

/// Accepts connections and never answers.
pub(crate) fn stalled_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to random port");
    let port = listener.local_addr().unwrap().port();

    thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming().flatten() {
            held.push(stream);
            thread::sleep(Duration::from_millis(10));
        }
    });

    format!("http://127.0.0.1:{}/", port)
}
