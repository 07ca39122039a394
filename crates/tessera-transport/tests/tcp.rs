//! Integration tests for the TCP transport.
//!
//! These spin up a real listener on loopback and talk to it with a plain
//! `tokio::net::TcpStream`, verifying bytes flow both ways unchanged.

use tessera_transport::{Connection, TcpTransport, Transport, TransportError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

async fn bind_random() -> (TcpTransport, String) {
    let transport = TcpTransport::bind("127.0.0.1:0")
        .await
        .expect("should bind");
    let addr = transport.local_addr().expect("local addr").to_string();
    (transport, addr)
}

#[tokio::test]
async fn test_tcp_accept_and_send_receive() {
    let (mut transport, addr) = bind_random().await;

    let server_handle = tokio::spawn(async move {
        transport.accept().await.expect("should accept")
    });
    let mut client = TcpStream::connect(&addr).await.expect("connect");
    let server_conn = server_handle.await.expect("task should complete");

    assert!(server_conn.id().into_inner() > 0);

    // --- Server sends, client receives ---
    server_conn
        .send(b"hello from server")
        .await
        .expect("send should succeed");
    let mut buf = [0u8; 17];
    client.read_exact(&mut buf).await.expect("client read");
    assert_eq!(&buf, b"hello from server");

    // --- Client sends, server receives ---
    client.write_all(b"hello from client").await.expect("write");
    let mut received = Vec::new();
    while received.len() < 17 {
        let chunk = server_conn
            .recv()
            .await
            .expect("recv ok")
            .expect("not closed");
        received.extend_from_slice(&chunk);
    }
    assert_eq!(received, b"hello from client");
}

#[tokio::test]
async fn test_tcp_recv_returns_none_on_peer_close() {
    let (mut transport, addr) = bind_random().await;

    let server_handle = tokio::spawn(async move {
        transport.accept().await.expect("should accept")
    });
    let client = TcpStream::connect(&addr).await.expect("connect");
    let server_conn = server_handle.await.expect("task should complete");

    drop(client);

    let result = server_conn.recv().await.expect("recv should not error");
    assert!(result.is_none(), "closed peer should yield None");
}

#[tokio::test]
async fn test_tcp_connection_ids_are_unique() {
    let (mut transport, addr) = bind_random().await;

    let server_handle = tokio::spawn(async move {
        let a = transport.accept().await.expect("accept a");
        let b = transport.accept().await.expect("accept b");
        (a, b)
    });
    let _c1 = TcpStream::connect(&addr).await.expect("connect 1");
    let _c2 = TcpStream::connect(&addr).await.expect("connect 2");
    let (a, b) = server_handle.await.expect("task should complete");

    assert_ne!(a.id(), b.id());
}

#[tokio::test]
async fn test_tcp_bind_address_in_use_returns_bind_failed() {
    let (_held, addr) = bind_random().await;

    let result = TcpTransport::bind(&addr).await;

    match result {
        Err(err @ TransportError::BindFailed(_)) => {
            assert!(err.to_string().starts_with("bind failed"));
        }
        Err(other) => panic!("expected BindFailed, got {other}"),
        Ok(_) => panic!("second bind on {addr} should fail"),
    }
}
