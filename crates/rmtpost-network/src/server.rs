//! HTTP POST listener.
//!
//! Serves one connection at a time on the calling task: read the request,
//! hand a POST body to the [`Dispatcher`], write one of two fixed responses,
//! close. Because connections are never served concurrently, one body is
//! fully executed before the next request is read.
//!
//! ```text
//! client ──> HttpServer ──> Dispatcher ──> Peripherals
//!               │
//!               └── "202 Accepted" | "405 Method Not Allowed"
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use rmtpost_controller::Dispatcher;
//! use rmtpost_hardware::{ChannelConfig, mock};
//! use rmtpost_network::{HttpServer, HttpServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (peripherals, _handle) = mock::peripherals(&ChannelConfig::default())?;
//! let config = HttpServerConfig {
//!     bind_addr: "127.0.0.1:8080".parse()?,
//!     ..Default::default()
//! };
//!
//! let mut server = HttpServer::bind(config, Dispatcher::new(peripherals)).await?;
//! server.serve_with_shutdown(async {
//!     let _ = tokio::signal::ctrl_c().await;
//! }).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Design Principles
//!
//! - **No HTTP library**: only the header terminator and `Content-Length`
//!   are looked at
//! - **Opaque responses**: a POST is always "accepted", whatever happened
//!   to its lines; see the dispatch report for details
//! - **No keep-alive**: every connection carries exactly one request

use crate::request;
use bytes::BytesMut;
use chrono::{DateTime, Utc};
use rmtpost_controller::{DispatchReport, Dispatcher};
use rmtpost_core::constants::{DEFAULT_HTTP_PORT, HTTP_ACCEPTED, HTTP_METHOD_NOT_ALLOWED};
use rmtpost_hardware::{CarrierClock, PulseTransmitter, Scheduler, StatusPin};
use rmtpost_protocol::is_post;
use serde::Serialize;
use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{Instant, timeout_at};
use tracing::{debug, error, info, trace, warn};

/// Default upper bound on a buffered request.
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 16 * 1024;

/// Default time allowed for a request to arrive.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the HTTP listener
///
/// # Example
///
/// ```
/// use rmtpost_network::HttpServerConfig;
///
/// let config = HttpServerConfig::default();
/// assert_eq!(config.bind_addr.port(), 80);
/// ```
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,

    /// Bytes buffered per request before the read stops
    pub max_request_size: usize,

    /// Time allowed for a whole request to arrive
    pub read_timeout: Duration,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_HTTP_PORT)),
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Errors that can occur during HTTP server operations
#[derive(Debug, Error)]
pub enum HttpServerError {
    /// Failed to bind to address
    #[error("Failed to bind to {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// Low-level I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Request counters for monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerStats {
    /// POST requests answered with "202 Accepted"
    pub requests_accepted: u64,

    /// Requests answered with "405 Method Not Allowed"
    pub requests_rejected: u64,

    /// Transmit lines that reached the peripheral
    pub lines_transmitted: u64,

    /// Lines dropped by validation
    pub lines_rejected: u64,

    /// Lines the peripheral failed to execute
    pub hardware_faults: u64,

    /// When the last request was answered
    pub last_request_at: Option<DateTime<Utc>>,
}

impl ServerStats {
    fn record(&mut self, response: &Response) {
        match response {
            Response::Accepted(report) => {
                self.requests_accepted += 1;
                if let Some(report) = report {
                    let summary = report.summary();
                    self.lines_transmitted += summary.transmitted as u64;
                    self.lines_rejected += summary.rejected as u64;
                    self.hardware_faults += summary.hardware_faults as u64;
                }
            }
            Response::MethodNotAllowed => self.requests_rejected += 1,
        }
        self.last_request_at = Some(Utc::now());
    }
}

/// How a request was answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// POST accepted. Carries the dispatch report when a body was found.
    Accepted(Option<DispatchReport>),

    /// Anything that is not a POST.
    MethodNotAllowed,
}

impl Response {
    /// Raw bytes written to the client.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Response::Accepted(_) => HTTP_ACCEPTED,
            Response::MethodNotAllowed => HTTP_METHOD_NOT_ALLOWED,
        }
    }
}

/// Sequential HTTP listener driving a [`Dispatcher`].
///
/// # Thread Safety
///
/// `HttpServer` is meant to be driven from a single task. It owns the
/// dispatcher, and with it the peripherals.
pub struct HttpServer<T, C, P, S> {
    /// TCP listener for accepting new connections
    listener: TcpListener,

    dispatcher: Dispatcher<T, C, P, S>,

    /// Server configuration
    config: HttpServerConfig,

    stats: ServerStats,
}

impl<T, C, P, S> HttpServer<T, C, P, S>
where
    T: PulseTransmitter,
    C: CarrierClock,
    P: StatusPin,
    S: Scheduler,
{
    /// Bind the server to the configured address
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Address is already in use
    /// - Permission denied (e.g., binding to privileged port)
    pub async fn bind(
        config: HttpServerConfig,
        dispatcher: Dispatcher<T, C, P, S>,
    ) -> Result<Self, HttpServerError> {
        info!("Binding HTTP server to {}", config.bind_addr);

        let listener = TcpListener::bind(config.bind_addr).await.map_err(|source| {
            HttpServerError::BindFailed {
                addr: config.bind_addr,
                source,
            }
        })?;

        info!(
            addr = %listener.local_addr()?,
            max_request_size = config.max_request_size,
            read_timeout_ms = config.read_timeout.as_millis() as u64,
            "HTTP server listening"
        );

        Ok(Self {
            listener,
            dispatcher,
            config,
            stats: ServerStats::default(),
        })
    }

    /// Address the listener is bound to.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket address cannot be read.
    pub fn local_addr(&self) -> Result<SocketAddr, HttpServerError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn config(&self) -> &HttpServerConfig {
        &self.config
    }

    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }

    pub fn dispatcher(&self) -> &Dispatcher<T, C, P, S> {
        &self.dispatcher
    }

    pub fn into_dispatcher(self) -> Dispatcher<T, C, P, S> {
        self.dispatcher
    }

    /// Serve connections until the listener fails.
    ///
    /// # Errors
    ///
    /// Never returns on its own; see [`Self::serve_with_shutdown`].
    pub async fn serve(&mut self) -> Result<(), HttpServerError> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Serve connections until `shutdown` completes.
    ///
    /// Shutdown is only observed between connections; a request being
    /// executed always runs to completion. Accept errors are logged and
    /// the loop continues.
    ///
    /// # Errors
    ///
    /// Currently always returns `Ok(())`.
    pub async fn serve_with_shutdown<F>(&mut self, shutdown: F) -> Result<(), HttpServerError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let accepted = tokio::select! {
                _ = &mut shutdown => {
                    info!(
                        accepted = self.stats.requests_accepted,
                        rejected = self.stats.requests_rejected,
                        "HTTP server shutting down"
                    );
                    return Ok(());
                }
                accepted = self.listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, addr)) => {
                    if let Err(e) = self.handle_connection(stream, addr).await {
                        warn!(addr = %addr, error = %e, "Connection failed");
                    }
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    /// Accept and serve exactly one connection.
    ///
    /// # Errors
    ///
    /// Returns an error if accepting fails or the client connection breaks
    /// before the response is written.
    pub async fn serve_one(&mut self) -> Result<Response, HttpServerError> {
        let (stream, addr) = self.listener.accept().await?;
        self.handle_connection(stream, addr).await
    }

    async fn handle_connection(
        &mut self,
        mut stream: TcpStream,
        addr: SocketAddr,
    ) -> Result<Response, HttpServerError> {
        debug!("Accepted connection from {}", addr);

        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to set TCP_NODELAY for {}: {}", addr, e);
        }

        let request = self.read_request(&mut stream).await?;
        let response = self.respond(&request).await;

        stream.write_all(response.as_bytes()).await?;
        stream.shutdown().await?;

        self.stats.record(&response);
        match &response {
            Response::Accepted(Some(report)) => {
                info!(addr = %addr, lines = report.len(), summary = ?report.summary(), "Request executed");
            }
            Response::Accepted(None) => info!(addr = %addr, "POST without body"),
            Response::MethodNotAllowed => info!(addr = %addr, "Request rejected: not a POST"),
        }
        Ok(response)
    }

    async fn respond(&mut self, request: &[u8]) -> Response {
        if !is_post(request) {
            return Response::MethodNotAllowed;
        }
        Response::Accepted(self.dispatcher.dispatch_request(request).await)
    }

    /// Buffer one request, stopping at completion, EOF, the size limit or
    /// the read deadline. Whatever arrived by then is the request.
    async fn read_request(&self, stream: &mut TcpStream) -> Result<BytesMut, HttpServerError> {
        let max = self.config.max_request_size;
        let deadline = Instant::now() + self.config.read_timeout;
        let mut buf = BytesMut::with_capacity(max.min(4096));

        while buf.len() < max && !request::is_complete(&buf) {
            let mut chunk = (&mut *stream).take((max - buf.len()) as u64);
            match timeout_at(deadline, chunk.read_buf(&mut buf)).await {
                Ok(Ok(0)) => break,
                Ok(Ok(n)) => trace!(bytes = n, total = buf.len(), "Read request data"),
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => {
                    debug!(bytes = buf.len(), "Read timeout, using partial request");
                    break;
                }
            }
        }

        Ok(buf)
    }
}
