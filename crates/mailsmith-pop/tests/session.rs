//! POP3 session tests against an in-process mock server.

#![allow(clippy::unwrap_used)]

use mailsmith_pop::{Error, PopClient, connect};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// Minimal POP3 server: accepts one connection and serves a two-message
/// mailbox, with message 99 always missing.
async fn run_mock_pop(listener: TcpListener) {
    let (socket, _) = listener.accept().await.unwrap();
    let (read_half, mut write_half) = socket.into_split();
    let mut reader = BufReader::new(read_half);
    write_half.write_all(b"+OK mock POP3 ready\r\n").await.unwrap();

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await.unwrap() == 0 {
            break;
        }
        let cmd = line.trim_end_matches(['\r', '\n']).to_string();

        if cmd.starts_with("USER") || cmd.starts_with("PASS") || cmd.starts_with("DELE") {
            write_half.write_all(b"+OK\r\n").await.unwrap();
        } else if cmd == "STAT" {
            write_half.write_all(b"+OK 2 320\r\n").await.unwrap();
        } else if cmd == "RETR 99" {
            write_half
                .write_all(b"-ERR no such message\r\n")
                .await
                .unwrap();
        } else if cmd.starts_with("RETR") {
            write_half
                .write_all(
                    b"+OK 94 octets\r\n\
                      From: sender@example.com\r\n\
                      Subject: Stored\r\n\
                      \r\n\
                      Line one\r\n\
                      ..starts with a dot\r\n\
                      .\r\n",
                )
                .await
                .unwrap();
        } else if cmd == "QUIT" {
            write_half.write_all(b"+OK bye\r\n").await.unwrap();
            break;
        } else {
            write_half.write_all(b"-ERR unknown command\r\n").await.unwrap();
        }
    }
}

async fn spawn_mock() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(run_mock_pop(listener));
    port
}

#[tokio::test]
async fn full_session_stat_retr_dele() {
    let port = spawn_mock().await;
    let stream = connect("127.0.0.1", port).await.unwrap();
    let mut client = PopClient::from_stream(stream).await.unwrap();
    client.login("user@example.com", "secret").await.unwrap();

    assert_eq!(client.stat().await.unwrap(), (2, 320));

    // Blank body lines survive and byte-stuffed dots are undone
    let lines = client.retr(1).await.unwrap();
    assert_eq!(
        lines,
        vec![
            "From: sender@example.com",
            "Subject: Stored",
            "",
            "Line one",
            ".starts with a dot",
        ]
    );

    client.dele(1).await.unwrap();
    client.quit().await.unwrap();
}

#[tokio::test]
async fn server_err_surfaces_as_typed_error() {
    let port = spawn_mock().await;
    let stream = connect("127.0.0.1", port).await.unwrap();
    let mut client = PopClient::from_stream(stream).await.unwrap();
    client.login("user@example.com", "secret").await.unwrap();

    let err = client.retr(99).await.unwrap_err();
    assert!(matches!(err, Error::Server(msg) if msg == "no such message"));
}

#[tokio::test]
async fn closed_connection_is_an_error_not_a_hang() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (_read_half, mut write_half) = socket.into_split();
        write_half.write_all(b"+OK ready\r\n").await.unwrap();
        // Connection dropped here without serving any command
    });

    let stream = connect("127.0.0.1", port).await.unwrap();
    let mut client = PopClient::from_stream(stream).await.unwrap();
    let err = client.login("user@example.com", "secret").await.unwrap_err();
    assert!(matches!(err, Error::Protocol(_) | Error::Io(_)));
}
