//! Integration tests for HttpServer
//!
//! Each test runs the server and a loopback client on the same task, so the
//! server keeps exclusive ownership of its peripherals.

use rmtpost_controller::{Dispatcher, LineOutcome};
use rmtpost_core::Level;
use rmtpost_hardware::ChannelConfig;
use rmtpost_hardware::mock::{
    self, MockClock, MockHandle, MockScheduler, MockStatusPin, MockTransmitter, PeripheralEvent,
};
use rmtpost_network::{HttpServer, HttpServerConfig, Response};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::time::timeout;

type MockServer = HttpServer<MockTransmitter, MockClock, MockStatusPin, MockScheduler>;

const ACCEPTED: &[u8] = b"HTTP/1.1 202 Accepted\r\nConnection: close\r\n\r\n";
const NOT_ALLOWED: &[u8] = b"HTTP/1.1 405 Method Not Allowed\r\nConnection: close\r\n\r\n";

async fn start_server(config: HttpServerConfig) -> (MockServer, MockHandle, SocketAddr) {
    let (peripherals, handle) = mock::peripherals(&ChannelConfig::default()).unwrap();
    let server = HttpServer::bind(config, Dispatcher::new(peripherals))
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    (server, handle, addr)
}

fn loopback_config() -> HttpServerConfig {
    HttpServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        ..Default::default()
    }
}

fn post(body: &str) -> Vec<u8> {
    format!(
        "POST /rmt HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}

/// Send raw bytes and collect the full response.
async fn exchange(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn test_post_is_executed_and_accepted() {
    let (mut server, handle, addr) = start_server(loopback_config()).await;

    let request = post("t,100,-50,200\nd,10\nc,40,1,1\n");
    let (served, response) = tokio::join!(server.serve_one(), exchange(addr, &request));

    assert_eq!(response, ACCEPTED);

    let Response::Accepted(Some(report)) = served.unwrap() else {
        panic!("expected an executed POST");
    };
    assert_eq!(report.len(), 3);
    assert!(matches!(
        report.lines()[0].outcome,
        LineOutcome::Transmitted { records: 3, .. }
    ));

    assert_eq!(handle.transmissions().len(), 1);
    assert_eq!(handle.divisor(), 40);
    assert_eq!(handle.pin_level(), Level::Low);
}

#[tokio::test]
async fn test_non_post_is_rejected() {
    let (mut server, handle, addr) = start_server(loopback_config()).await;

    let request = b"GET /rmt HTTP/1.1\r\nHost: localhost\r\n\r\n";
    let (served, response) = tokio::join!(server.serve_one(), exchange(addr, request));

    assert_eq!(response, NOT_ALLOWED);
    assert_eq!(served.unwrap(), Response::MethodNotAllowed);
    assert!(handle.events().is_empty());
    assert_eq!(server.stats().requests_rejected, 1);
}

#[tokio::test]
async fn test_invalid_lines_still_accepted() {
    let (mut server, handle, addr) = start_server(loopback_config()).await;

    let request = post("c,256,1,1\nt,1,99999\nq,1\n");
    let (served, response) = tokio::join!(server.serve_one(), exchange(addr, &request));

    assert_eq!(response, ACCEPTED);
    assert!(matches!(served.unwrap(), Response::Accepted(Some(_))));
    assert!(handle.transmissions().is_empty());
    assert_eq!(handle.divisor_writes(), 0);
    assert_eq!(server.stats().lines_rejected, 2);
}

#[tokio::test]
async fn test_post_without_body_is_accepted() {
    let (mut server, handle, addr) = start_server(loopback_config()).await;

    let exchange_then_close = async {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"POST /rmt HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        stream.shutdown().await.unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        response
    };
    let (served, response) = tokio::join!(server.serve_one(), exchange_then_close);

    assert_eq!(response, ACCEPTED);
    assert_eq!(served.unwrap(), Response::Accepted(None));
    assert!(handle.events().is_empty());
}

#[tokio::test]
async fn test_request_split_across_writes() {
    let (mut server, handle, addr) = start_server(loopback_config()).await;

    let client = async {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"POST /rmt HTTP/1.1\r\nContent-Length: 9\r\n\r\n")
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        stream.write_all(b"c,20,3,4\n").await.unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        response
    };
    let (served, response) = tokio::join!(server.serve_one(), client);

    assert_eq!(response, ACCEPTED);
    assert!(served.is_ok());
    assert_eq!(handle.divisor(), 20);
    assert_eq!(handle.carrier(), (3, 4));
}

#[tokio::test]
async fn test_read_timeout_uses_partial_request() {
    let config = HttpServerConfig {
        read_timeout: Duration::from_millis(100),
        ..loopback_config()
    };
    let (mut server, handle, addr) = start_server(config).await;

    // Claims more body than it sends and keeps the connection open
    let client = async {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"POST /rmt HTTP/1.1\r\nContent-Length: 100\r\n\r\nd,1\n")
            .await
            .unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        response
    };
    let (served, response) = timeout(Duration::from_secs(5), async {
        tokio::join!(server.serve_one(), client)
    })
    .await
    .expect("server did not time out the read");

    assert_eq!(response, ACCEPTED);
    assert!(served.is_ok());
    assert_eq!(
        handle.events(),
        vec![PeripheralEvent::Delayed(Duration::from_millis(1))]
    );
}

#[tokio::test]
async fn test_serve_until_shutdown() {
    let (mut server, handle, addr) = start_server(loopback_config()).await;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let clients = async {
        let first = exchange(addr, &post("t,10,-10\n")).await;
        let second = exchange(addr, b"PUT /rmt HTTP/1.1\r\n\r\n").await;
        let third = exchange(addr, &post("t,20,-20\n")).await;
        let _ = shutdown_tx.send(());
        (first, second, third)
    };
    let serve = server.serve_with_shutdown(async {
        let _ = shutdown_rx.await;
    });

    let (served, (first, second, third)) = timeout(Duration::from_secs(5), async {
        tokio::join!(serve, clients)
    })
    .await
    .expect("server did not shut down");

    assert!(served.is_ok());
    assert_eq!(first, ACCEPTED);
    assert_eq!(second, NOT_ALLOWED);
    assert_eq!(third, ACCEPTED);

    let stats = server.stats();
    assert_eq!(stats.requests_accepted, 2);
    assert_eq!(stats.requests_rejected, 1);
    assert_eq!(stats.lines_transmitted, 2);
    assert!(stats.last_request_at.is_some());
    assert_eq!(handle.transmissions().len(), 2);
}

#[tokio::test]
async fn test_bind_failure_reported() {
    let (server, _handle, addr) = start_server(loopback_config()).await;

    let (peripherals, _) = mock::peripherals(&ChannelConfig::default()).unwrap();
    let config = HttpServerConfig {
        bind_addr: addr,
        ..Default::default()
    };
    let result = HttpServer::bind(config, Dispatcher::new(peripherals)).await;

    assert!(matches!(
        result,
        Err(rmtpost_network::HttpServerError::BindFailed { .. })
    ));
    drop(server);
}
