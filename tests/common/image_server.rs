//! Minimal HTTP/1.1 server for integration tests.
//!
//! Routes map a request path to a status and body. A path registered with
//! `hang` accepts the request and never answers. `stall` and `truncate` send
//! headers promising more body than they deliver, then hold the connection
//! open or close it. Unknown paths return 404.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Route {
    Respond { status: u16, body: Vec<u8> },
    Hang,
    /// Send `sent` bytes of a `promised`-byte body.
    Partial {
        promised: usize,
        sent: Vec<u8>,
        close: bool,
    },
}

#[derive(Debug, Default, Clone)]
pub struct ImageServer {
    routes: HashMap<String, Route>,
}

impl ImageServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(self, path: &str, body: Vec<u8>) -> Self {
        self.status(path, 200, body)
    }

    pub fn status(mut self, path: &str, status: u16, body: Vec<u8>) -> Self {
        self.routes
            .insert(path.to_string(), Route::Respond { status, body });
        self
    }

    pub fn hang(mut self, path: &str) -> Self {
        self.routes.insert(path.to_string(), Route::Hang);
        self
    }

    /// Promise `promised` bytes, send `sent`, then wait without closing.
    pub fn stall(mut self, path: &str, promised: usize, sent: Vec<u8>) -> Self {
        self.routes.insert(
            path.to_string(),
            Route::Partial {
                promised,
                sent,
                close: false,
            },
        );
        self
    }

    /// Promise `promised` bytes, send `sent`, then close the connection.
    pub fn truncate(mut self, path: &str, promised: usize, sent: Vec<u8>) -> Self {
        self.routes.insert(
            path.to_string(),
            Route::Partial {
                promised,
                sent,
                close: true,
            },
        );
        self
    }

    /// Serve in a background thread. Returns the base URL without a trailing
    /// slash, e.g. "http://127.0.0.1:12345". Runs until the process exits.
    pub fn start(self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let routes = Arc::new(self.routes);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                thread::spawn(move || handle(stream, &routes));
            }
        });
        format!("http://127.0.0.1:{}", port)
    }
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Route>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    match routes.get(&path) {
        Some(Route::Hang) => {
            // Hold the connection open until the client gives up.
            let _ = stream.set_read_timeout(None);
            while matches!(stream.read(&mut buf), Ok(n) if n > 0) {}
        }
        Some(Route::Partial {
            promised,
            sent,
            close,
        }) => {
            write_head(&mut stream, 200, *promised);
            let _ = stream.write_all(sent);
            let _ = stream.flush();
            if !*close {
                let _ = stream.set_read_timeout(None);
                while matches!(stream.read(&mut buf), Ok(n) if n > 0) {}
            }
        }
        Some(Route::Respond { status, body }) => respond(&mut stream, *status, body),
        None => respond(&mut stream, 404, b"not found"),
    }
}

fn respond(stream: &mut TcpStream, status: u16, body: &[u8]) {
    write_head(stream, status, body.len());
    let _ = stream.write_all(body);
}

fn write_head(stream: &mut TcpStream, status: u16, content_length: usize) {
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason,
        content_length
    );
    let _ = stream.write_all(head.as_bytes());
}
