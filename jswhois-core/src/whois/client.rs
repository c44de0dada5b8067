use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, instrument};

use crate::error::{JswhoisError, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RESPONSE_SIZE: usize = 1024 * 1024; // 1MB

/// Sends one query to one WHOIS server and returns the full reply.
pub trait Transport: Send + Sync {
    fn query(
        &self,
        server: &str,
        port: u16,
        query: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// RFC 3912 over TCP: write the query and CRLF, read until the server
/// closes the connection.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    timeout: Duration,
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WhoisClient {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[instrument(skip(self), fields(server = %server, port = port))]
    async fn query_server(&self, server: &str, port: u16, query: &str) -> Result<String> {
        let addr = format!("{}:{}", server, port);

        let mut stream = timeout(self.timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| JswhoisError::Timeout(format!("Connection to {} timed out", server)))?
            .map_err(|e| JswhoisError::Connection {
                server: server.to_string(),
                reason: e.to_string(),
            })?;

        debug!(query = %query, "Sending query");
        let query_bytes = format!("{}\r\n", query);
        timeout(self.timeout, stream.write_all(query_bytes.as_bytes()))
            .await
            .map_err(|_| JswhoisError::Timeout(format!("Write to {} timed out", server)))?
            .map_err(|e| JswhoisError::Connection {
                server: server.to_string(),
                reason: format!("failed to send query: {}", e),
            })?;

        let mut response = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            match timeout(self.timeout, stream.read(&mut buf)).await {
                Ok(Ok(0)) => break, // EOF
                Ok(Ok(n)) => {
                    response.extend_from_slice(&buf[..n]);
                    if response.len() > MAX_RESPONSE_SIZE {
                        return Err(JswhoisError::ResponseTooLarge {
                            server: server.to_string(),
                            limit: MAX_RESPONSE_SIZE,
                        });
                    }
                }
                Ok(Err(e)) => {
                    return Err(JswhoisError::Connection {
                        server: server.to_string(),
                        reason: format!("read error: {}", e),
                    });
                }
                Err(_) => {
                    // Some servers never close; keep what already arrived.
                    if !response.is_empty() {
                        break;
                    }
                    return Err(JswhoisError::Timeout(format!("Read from {} timed out", server)));
                }
            }
        }

        debug!(bytes = response.len(), "Reply received");
        Ok(decode(response))
    }
}

impl Transport for WhoisClient {
    async fn query(&self, server: &str, port: u16, query: &str) -> Result<String> {
        self.query_server(server, port, query).await
    }
}

/// UTF-8 when valid, Latin-1 otherwise.
fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().iter().map(|&c| c as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::TcpListener;

    /// Serve one connection: capture the query line, reply, close.
    async fn serve_once(reply: &'static [u8]) -> (u16, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(socket);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            reader.get_mut().write_all(reply).await.unwrap();
            reader.get_mut().shutdown().await.unwrap();
            line
        });
        (port, handle)
    }

    #[test]
    fn test_decode_falls_back_to_latin1() {
        assert_eq!(decode(b"plain".to_vec()), "plain");
        assert_eq!(decode(vec![0x4d, 0xfc, 0x6e]), "M\u{fc}n");
    }

    #[tokio::test]
    async fn test_query_sends_crlf_and_reads_to_eof() {
        let (port, server) = serve_once(b"domain: ORG\r\nrefer: whois.pir.org\r\n").await;

        let client = WhoisClient::new().with_timeout(Duration::from_secs(5));
        let reply = client.query("127.0.0.1", port, "org").await.unwrap();

        assert_eq!(reply, "domain: ORG\r\nrefer: whois.pir.org\r\n");
        assert_eq!(server.await.unwrap(), "org\r\n");
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = WhoisClient::new()
            .with_timeout(Duration::from_secs(2))
            .query("127.0.0.1", port, "example.com")
            .await
            .unwrap_err();
        assert!(err.is_transport(), "{:?}", err);
    }

    #[test]
    fn test_default_timeout() {
        assert_eq!(WhoisClient::default().timeout(), DEFAULT_TIMEOUT);
    }
}
