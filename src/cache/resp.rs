//! Remote cache client speaking the Redis wire protocol.
//!
//! Deliberately minimal: one lazily-established connection behind an async
//! mutex, array-framed `SET`/`GET`, no pooling, no pipelining, no retries.
//! Any IO failure drops the connection; the next call reconnects.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufStream};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::cache::{CacheClient, CacheError};

/// Server replies this client understands.
#[derive(Debug, PartialEq, Eq)]
enum Reply {
    Simple(String),
    Bulk(String),
    Nil,
}

/// RESP client for a remote key-value store.
pub struct RespCache {
    addr: String,
    conn: Mutex<Option<BufStream<TcpStream>>>,
}

impl RespCache {
    /// Create a client for `addr` (`host:port`). No connection is made
    /// until the first operation.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            conn: Mutex::new(None),
        }
    }

    async fn round_trip(&self, command: &[&str]) -> Result<Reply, CacheError> {
        let mut guard = self.conn.lock().await;
        let mut stream = match guard.take() {
            Some(stream) => stream,
            None => {
                let stream = TcpStream::connect(&self.addr).await.map_err(|err| {
                    CacheError::Unavailable(format!("connect {}: {err}", self.addr))
                })?;
                tracing::debug!(addr = %self.addr, "cache connection established");
                BufStream::new(stream)
            }
        };

        match Self::send_and_read(&mut stream, command).await {
            Ok(reply) => {
                // Keep the connection only after a clean exchange.
                *guard = Some(stream);
                Ok(reply)
            }
            Err(err) => Err(err),
        }
    }

    async fn send_and_read(
        stream: &mut BufStream<TcpStream>,
        command: &[&str],
    ) -> Result<Reply, CacheError> {
        let mut frame = format!("*{}\r\n", command.len());
        for part in command {
            frame.push_str(&format!("${}\r\n{part}\r\n", part.len()));
        }

        stream
            .write_all(frame.as_bytes())
            .await
            .map_err(|err| CacheError::Unavailable(format!("write: {err}")))?;
        stream
            .flush()
            .await
            .map_err(|err| CacheError::Unavailable(format!("write: {err}")))?;

        Self::read_reply(stream).await
    }

    async fn read_reply(stream: &mut BufStream<TcpStream>) -> Result<Reply, CacheError> {
        let mut line = String::new();
        stream
            .read_line(&mut line)
            .await
            .map_err(|err| CacheError::Unavailable(format!("read: {err}")))?;
        if line.is_empty() {
            return Err(CacheError::Unavailable("connection closed by store".into()));
        }

        let line = line.trim_end_matches(['\r', '\n']);
        match line.as_bytes().first() {
            Some(b'+') => Ok(Reply::Simple(line[1..].to_string())),
            Some(b'-') => Err(CacheError::Unavailable(line[1..].to_string())),
            Some(b'$') => {
                let rest = &line[1..];
                let len: i64 = rest
                    .parse()
                    .map_err(|_| CacheError::Protocol(format!("bad bulk length {rest:?}")))?;
                if len < 0 {
                    return Ok(Reply::Nil);
                }
                // Payload plus trailing CRLF.
                let mut buf = vec![0u8; len as usize + 2];
                stream
                    .read_exact(&mut buf)
                    .await
                    .map_err(|err| CacheError::Unavailable(format!("read: {err}")))?;
                buf.truncate(len as usize);
                String::from_utf8(buf)
                    .map(Reply::Bulk)
                    .map_err(|_| CacheError::Protocol("bulk payload is not utf-8".into()))
            }
            _ => Err(CacheError::Protocol(format!("unexpected reply {line:?}"))),
        }
    }
}

#[async_trait]
impl CacheClient for RespCache {
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        match self.round_trip(&["SET", key, value]).await? {
            Reply::Simple(_) | Reply::Bulk(_) => Ok(()),
            Reply::Nil => Err(CacheError::Protocol("nil reply to SET".into())),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self.round_trip(&["GET", key]).await? {
            Reply::Simple(value) | Reply::Bulk(value) => Ok(Some(value)),
            Reply::Nil => Ok(None),
        }
    }
}
