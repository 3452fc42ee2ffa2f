//! HTTP service exposing the renderer.
//!
//! A fixed pool of worker threads shares one `tiny_http` listener. Every
//! request renders onto its own surface, so workers never share drawing
//! state. Routing and error formatting live in [`handle`], which is plain
//! `(method, url) -> HttpResponse` and is tested without a socket.

use std::io::Cursor;
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info, warn};
use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, Server};
use url::form_urlencoded;

use crate::{CanvasConfig, Error, Result};

/// How often idle workers check the shutdown flag.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Deployment mode; development adds diagnostic detail to error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

/// Configuration for the HTTP service
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Listening port (0 picks an ephemeral port)
    pub port: u16,
    pub environment: Environment,
    /// Number of worker threads accepting requests
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: Environment::default(),
            workers: num_cpus::get(),
        }
    }
}

/// A response produced by [`handle`], independent of the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl HttpResponse {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_else(|_| {
            br#"{"success":false,"error":{"message":"An unexpected error occurred","statusCode":500}}"#.to_vec()
        });
        Self {
            status,
            content_type: "application/json; charset=utf-8",
            body,
        }
    }

    fn into_tiny(self) -> Response<Cursor<Vec<u8>>> {
        // Always send Content-Length; tiny_http chunks large bodies by default.
        let mut resp = Response::from_data(self.body)
            .with_status_code(self.status)
            .with_chunked_threshold(usize::MAX);
        if let Ok(h) = Header::from_bytes(&b"Content-Type"[..], self.content_type.as_bytes()) {
            resp = resp.with_header(h);
        }
        resp
    }
}

#[derive(Serialize)]
struct HealthBody {
    success: bool,
    message: &'static str,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: ErrorDetail,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    message: String,
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<String>,
}

/// Format an error as the JSON error body.
///
/// Unclassified errors always become a generic 500.
pub fn error_response(err: &Error, environment: Environment) -> HttpResponse {
    let status = if err.is_operational() { err.status_code() } else { 500 };
    let body = ErrorBody {
        success: false,
        error: ErrorDetail {
            message: err.public_message(),
            status_code: status,
            stack: (environment == Environment::Development).then(|| format!("{:?}", err)),
        },
    };
    HttpResponse::json(status, &body)
}

/// Route one request.
pub fn handle(method: &Method, url: &str, environment: Environment) -> HttpResponse {
    let (path, query) = match url.split_once('?') {
        Some((p, q)) => (p, q),
        None => (url, ""),
    };
    let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };

    let result = match (method, path) {
        (Method::Post, "/api/canvas/generate") => generate(query),
        (Method::Get, "/api/health") => Ok(HttpResponse::json(
            200,
            &HealthBody {
                success: true,
                message: "Server is healthy",
            },
        )),
        _ => Err(Error::NotFound(format!("Not Found - {}", url))),
    };

    result.unwrap_or_else(|err| {
        match &err {
            e if e.is_render_failure() => error!("{} {}: {}", method, url, e),
            e if !e.is_operational() => error!("{} {}: unexpected: {}", method, url, e),
            e => warn!("{} {}: {}", method, url, e),
        }
        error_response(&err, environment)
    })
}

fn generate(query: &str) -> Result<HttpResponse> {
    let width = query_param(query, "width");
    let height = query_param(query, "height");
    let config = CanvasConfig::from_raw(width.as_deref(), height.as_deref())?;
    let shot = crate::generate_cityscape(&config)?;
    debug!(
        "rendered {}x{} cityscape ({} bytes)",
        shot.width,
        shot.height,
        shot.png_data.len()
    );
    Ok(HttpResponse {
        status: 200,
        content_type: "image/png",
        body: shot.png_data,
    })
}

/// First decoded value of `key` in a form-urlencoded query string.
fn query_param(query: &str, key: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// Signals workers to stop accepting requests.
#[derive(Debug, Clone)]
struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A bound, not yet serving, listener.
pub struct CityscapeServer {
    server: Arc<Server>,
    config: ServerConfig,
    shutdown: ShutdownHandle,
}

impl CityscapeServer {
    pub fn bind(config: ServerConfig) -> Result<Self> {
        if config.workers == 0 {
            return Err(Error::ConfigError("at least one worker is required".into()));
        }
        let addr = format!("{}:{}", config.host, config.port);
        let server = Server::http(&addr)
            .map_err(|e| Error::InitializationError(format!("failed to bind {}: {}", addr, e)))?;
        Ok(Self {
            server: Arc::new(server),
            config,
            shutdown: ShutdownHandle(Arc::new(AtomicBool::new(false))),
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Start the worker pool.
    pub fn spawn(self) -> Result<RunningServer> {
        let addr = self.local_addr();
        let mut workers = Vec::with_capacity(self.config.workers);
        for id in 0..self.config.workers {
            let server = Arc::clone(&self.server);
            let shutdown = self.shutdown.clone();
            let environment = self.config.environment;
            let spawned = thread::Builder::new()
                .name(format!("nightscape-worker-{}", id))
                .spawn(move || worker_loop(&server, &shutdown, environment));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    // Stop whatever already started before bailing out.
                    self.shutdown.trigger();
                    return Err(Error::InitializationError(format!("failed to spawn worker: {}", e)));
                }
            }
        }
        info!(
            "serving on {} with {} workers ({:?})",
            addr.map(|a| a.to_string()).unwrap_or_default(),
            workers.len(),
            self.config.environment
        );
        Ok(RunningServer {
            workers,
            shutdown: self.shutdown,
            addr,
        })
    }
}

/// A serving worker pool.
pub struct RunningServer {
    workers: Vec<JoinHandle<()>>,
    shutdown: ShutdownHandle,
    addr: Option<SocketAddr>,
}

impl RunningServer {
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    /// Wait for every worker to exit. Workers exit once shutdown is triggered.
    pub fn join(self) {
        for w in self.workers {
            if w.join().is_err() {
                warn!("worker thread panicked");
            }
        }
    }

    /// Trigger shutdown and wait for the workers.
    pub fn stop(self) {
        self.shutdown.trigger();
        self.join();
    }
}

fn worker_loop(server: &Server, shutdown: &ShutdownHandle, environment: Environment) {
    while !shutdown.is_triggered() {
        match server.recv_timeout(POLL_INTERVAL) {
            Ok(Some(request)) => serve(request, environment),
            Ok(None) => {}
            Err(e) => {
                error!("accept failed: {}", e);
                break;
            }
        }
    }
}

fn serve(request: Request, environment: Environment) {
    let method = request.method().clone();
    let url = request.url().to_string();
    debug!("{} {}", method, url);

    let response = panic::catch_unwind(AssertUnwindSafe(|| handle(&method, &url, environment)))
        .unwrap_or_else(|_| {
            error!("{} {}: handler panicked", method, url);
            error_response(&Error::Other("request handler panicked".into()), environment)
        });
    if let Err(e) = request.respond(response.into_tiny()) {
        warn!("{} {}: failed to write response: {}", method, url, e);
    }
}
