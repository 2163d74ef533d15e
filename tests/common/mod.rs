//! Shared utilities for integration testing.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufStream};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

/// Start a minimal RESP key-value store on a loopback port and return its
/// address. Understands `SET` and `GET`; everything else gets `-ERR`.
pub async fn start_mock_store() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let store: Arc<Mutex<HashMap<String, String>>> = Arc::default();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let store = store.clone();
                    tokio::spawn(async move {
                        let _ = serve_connection(socket, store).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a store that answers every command with an error reply.
#[allow(dead_code)]
pub async fn start_error_store() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    tokio::spawn(async move {
                        let mut stream = BufStream::new(socket);
                        while let Ok(Some(_)) = read_command(&mut stream).await {
                            if stream.write_all(b"-ERR store is on fire\r\n").await.is_err() {
                                break;
                            }
                            if stream.flush().await.is_err() {
                                break;
                            }
                        }
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address nothing is listening on.
#[allow(dead_code)]
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn serve_connection(
    socket: TcpStream,
    store: Arc<Mutex<HashMap<String, String>>>,
) -> std::io::Result<()> {
    let mut stream = BufStream::new(socket);
    loop {
        let command = match read_command(&mut stream).await? {
            Some(command) => command,
            None => return Ok(()),
        };

        let reply = match command.first().map(|s| s.to_ascii_uppercase()).as_deref() {
            Some("SET") if command.len() == 3 => {
                store
                    .lock()
                    .await
                    .insert(command[1].clone(), command[2].clone());
                "+OK\r\n".to_string()
            }
            Some("GET") if command.len() == 2 => match store.lock().await.get(&command[1]) {
                Some(value) => format!("${}\r\n{value}\r\n", value.len()),
                None => "$-1\r\n".to_string(),
            },
            _ => "-ERR unknown command\r\n".to_string(),
        };

        stream.write_all(reply.as_bytes()).await?;
        stream.flush().await?;
    }
}

async fn read_command(stream: &mut BufStream<TcpStream>) -> std::io::Result<Option<Vec<String>>> {
    let mut header = String::new();
    if stream.read_line(&mut header).await? == 0 {
        return Ok(None);
    }
    let count: usize = header
        .trim_start_matches('*')
        .trim()
        .parse()
        .map_err(bad_input)?;

    let mut parts = Vec::with_capacity(count);
    for _ in 0..count {
        let mut len_line = String::new();
        stream.read_line(&mut len_line).await?;
        let len: usize = len_line
            .trim_start_matches('$')
            .trim()
            .parse()
            .map_err(bad_input)?;
        let mut buf = vec![0u8; len + 2];
        stream.read_exact(&mut buf).await?;
        buf.truncate(len);
        parts.push(String::from_utf8(buf).map_err(bad_input)?);
    }
    Ok(Some(parts))
}

fn bad_input<E: std::error::Error + Send + Sync + 'static>(err: E) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, err)
}
