//! Network layer for the RMT request server
//!
//! This crate accepts HTTP connections, hands POST bodies to the command
//! dispatcher, and answers with one of two fixed responses.
//!
//! # Components
//!
//! - **HttpServer**: sequential listener driving a `Dispatcher`
//! - **request**: minimal request framing (header end, `Content-Length`)

pub mod request;
mod server;

pub use server::{
    DEFAULT_MAX_REQUEST_SIZE, DEFAULT_READ_TIMEOUT, HttpServer, HttpServerConfig, HttpServerError,
    Response, ServerStats,
};
