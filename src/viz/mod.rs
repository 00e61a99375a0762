//! Visualization host
//!
//! One [`VizSession`] per analysis run. The session renders the graph page
//! once, serves it over loopback HTTP, and handles navigation events from
//! the page until it is closed. Events are processed inline on the session
//! loop, so after [`VizSession::run`] returns nothing can fire.

mod opener;
mod page;

pub use opener::{EditorOpener, FileOpener};
pub use page::PageRenderer;

use crate::config::VizConfig;
use crate::error::{Error, Result};
use crate::graph::CallGraph;
use serde::Deserialize;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};

/// An event posted by the rendering surface
#[derive(Debug, Deserialize)]
#[serde(tag = "command")]
enum SurfaceEvent {
    #[serde(rename = "openFile")]
    OpenFile(NavigationRequest),
    #[serde(rename = "close")]
    Close,
}

/// A request to open `file` at the 1-based `line`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NavigationRequest {
    pub file: String,
    pub line: u32,
}

/// A live visualization session bound to one call graph
pub struct VizSession {
    listener: TcpListener,
    page: String,
    base_dir: PathBuf,
    opener: Box<dyn FileOpener>,
    graph: CallGraph,
}

impl VizSession {
    /// Render the page and bind the loopback listener. The session owns
    /// the graph for its whole lifetime.
    pub fn start(
        graph: CallGraph,
        config: &VizConfig,
        project_name: &str,
        base_dir: PathBuf,
        opener: Box<dyn FileOpener>,
    ) -> Result<VizSession> {
        let page = PageRenderer::new()?.render(&graph, project_name)?;

        let listener = TcpListener::bind(("127.0.0.1", config.port)).map_err(|e| {
            Error::other(format!("failed to bind to port {}: {}", config.port, e))
        })?;

        Ok(VizSession {
            listener,
            page,
            base_dir,
            opener,
            graph,
        })
    }

    /// The graph this session is rendering
    pub fn graph(&self) -> &CallGraph {
        &self.graph
    }

    /// The address the session is serving on
    pub fn url(&self) -> String {
        match self.listener.local_addr() {
            Ok(addr) => format!("http://{}", addr),
            Err(_) => "http://127.0.0.1".to_string(),
        }
    }

    /// Serve until the surface is closed. Connections are handled inline;
    /// a malformed request never ends the session, only `close` does.
    pub fn run(&mut self) -> Result<()> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => match self.handle_connection(stream) {
                    Ok(SessionControl::Continue) => {}
                    Ok(SessionControl::Stop) => break,
                    Err(e) => eprintln!("Request error: {}", e),
                },
                Err(e) => eprintln!("Connection error: {}", e),
            }
        }

        Ok(())
    }

    fn handle_connection(&self, mut stream: TcpStream) -> Result<SessionControl> {
        let request = read_request(&mut stream)?;

        match (request.method.as_str(), request.path.as_str()) {
            ("GET", "/") => {
                send_response(
                    &mut stream,
                    200,
                    "OK",
                    "text/html; charset=utf-8",
                    self.page.as_bytes(),
                )?;
                Ok(SessionControl::Continue)
            }
            ("POST", "/event") => self.handle_event(&mut stream, &request.body),
            _ => {
                send_response(&mut stream, 404, "Not Found", "text/plain", b"Not Found")?;
                Ok(SessionControl::Continue)
            }
        }
    }

    fn handle_event(&self, stream: &mut TcpStream, body: &str) -> Result<SessionControl> {
        let event: SurfaceEvent = match serde_json::from_str(body) {
            Ok(event) => event,
            Err(e) => {
                send_response(
                    stream,
                    400,
                    "Bad Request",
                    "text/plain",
                    e.to_string().as_bytes(),
                )?;
                return Ok(SessionControl::Continue);
            }
        };

        match event {
            SurfaceEvent::OpenFile(request) => {
                if request.line < 1 {
                    send_response(stream, 400, "Bad Request", "text/plain", b"line must be >= 1")?;
                    return Ok(SessionControl::Continue);
                }

                let path = self.resolve(&request.file);
                match self.opener.open(&path, request.line) {
                    Ok(()) => send_response(stream, 200, "OK", "text/plain", b"ok")?,
                    Err(e) => send_response(
                        stream,
                        500,
                        "Internal Server Error",
                        "text/plain",
                        e.to_string().as_bytes(),
                    )?,
                }
                Ok(SessionControl::Continue)
            }
            SurfaceEvent::Close => {
                send_response(stream, 200, "OK", "text/plain", b"bye")?;
                Ok(SessionControl::Stop)
            }
        }
    }

    /// Resolve a surface-supplied path against the analysis base directory
    fn resolve(&self, file: &str) -> PathBuf {
        let path = Path::new(file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

enum SessionControl {
    Continue,
    Stop,
}

struct Request {
    method: String,
    path: String,
    body: String,
}

/// Read one HTTP request: headers, then as many body bytes as
/// Content-Length announces.
fn read_request(stream: &mut TcpStream) -> Result<Request> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break buffer.len();
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_header_end(&buffer) {
            break pos;
        }
        if buffer.len() > 64 * 1024 {
            return Err(Error::other("request too large"));
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let request_line = head.lines().next().unwrap_or("");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let path = parts.next().unwrap_or("").to_string();

    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    let body_start = (header_end + 4).min(buffer.len());
    let mut body = buffer[body_start..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Ok(Request {
        method,
        path,
        body: String::from_utf8_lossy(&body).to_string(),
    })
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Send an HTTP response
fn send_response(
    stream: &mut TcpStream,
    status_code: u16,
    status_text: &str,
    content_type: &str,
    body: &[u8],
) -> Result<()> {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status_code,
        status_text,
        content_type,
        body.len()
    );

    stream.write_all(response.as_bytes())?;
    stream.write_all(body)?;
    stream.flush()?;

    Ok(())
}
