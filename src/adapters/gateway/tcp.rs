//! TCP gateway connector

use super::traits::{Connector, GatewayConnection, ACK};
use crate::config::{GatewayConfig, WriteMode};
use crate::domain::GatewayError;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Dials the gateway over plain TCP
#[derive(Debug, Clone)]
pub struct TcpConnector {
    host: String,
    port: u16,
    write_mode: WriteMode,
    timeout: Duration,
}

impl TcpConnector {
    /// Creates a connector from the `[gateway]` section
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            write_mode: config.write_mode,
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    fn connection_failed(&self, reason: impl ToString) -> GatewayError {
        GatewayError::ConnectionFailed {
            address: self.address(),
            reason: reason.to_string(),
        }
    }
}

impl Connector for TcpConnector {
    fn connect(&self) -> Result<Box<dyn GatewayConnection>, GatewayError> {
        let addrs = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| self.connection_failed(e))?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => {
                    stream
                        .set_read_timeout(Some(self.timeout))
                        .and_then(|_| stream.set_write_timeout(Some(self.timeout)))
                        .and_then(|_| stream.set_nodelay(true))
                        .map_err(|e| self.connection_failed(e))?;
                    tracing::debug!(address = %addr, "Connected to gateway");
                    return Ok(Box::new(TcpConnection {
                        stream,
                        write_mode: self.write_mode,
                    }));
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(self.connection_failed(
            last_error.map_or_else(|| "no addresses resolved".to_string(), |e| e.to_string()),
        ))
    }

    fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

struct TcpConnection {
    stream: TcpStream,
    write_mode: WriteMode,
}

impl GatewayConnection for TcpConnection {
    fn write(&mut self, payload: &[u8]) -> io::Result<bool> {
        self.stream.write_all(payload)?;
        self.stream.flush()?;

        match self.write_mode {
            WriteMode::FireAndForget => Ok(true),
            WriteMode::WaitForAck => {
                let mut answer = [0u8; 1];
                match self.stream.read(&mut answer)? {
                    0 => Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "gateway closed the connection before acknowledging",
                    )),
                    _ => Ok(answer[0] == ACK),
                }
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        match self.stream.shutdown(std::net::Shutdown::Both) {
            Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::gateway::NAK;
    use crate::config::CommitMode;
    use std::net::TcpListener;
    use std::thread;

    fn config(port: u16, write_mode: WriteMode) -> GatewayConfig {
        GatewayConfig {
            host: "127.0.0.1".to_string(),
            port,
            write_mode,
            commit_mode: CommitMode::Batch,
            send_eof: false,
            debug_logging: false,
            timeout_seconds: 5,
        }
    }

    /// Accepts one connection, answers each read with the next scripted byte
    fn scripted_gateway(answers: Vec<u8>) -> (u16, thread::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            for answer in answers {
                let n = stream.read(&mut buf).unwrap();
                received.extend_from_slice(&buf[..n]);
                stream.write_all(&[answer]).unwrap();
            }
            received
        });
        (port, handle)
    }

    #[test]
    fn test_ack_and_rejection() {
        let (port, handle) = scripted_gateway(vec![ACK, NAK]);
        let connector = TcpConnector::new(&config(port, WriteMode::WaitForAck));

        let mut conn = connector.connect().unwrap();
        assert!(conn.write(b"<Record/>").unwrap());
        assert!(!conn.write(b"<Record/>").unwrap());
        conn.close().unwrap();

        assert_eq!(handle.join().unwrap(), b"<Record/><Record/>");
    }

    #[test]
    fn test_eof_before_ack_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 64];
            let _ = stream.read(&mut buf);
        });

        let connector = TcpConnector::new(&config(port, WriteMode::WaitForAck));
        let mut conn = connector.connect().unwrap();
        let result = conn.write(b"<Record/>");
        handle.join().unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let connector = TcpConnector::new(&config(port, WriteMode::FireAndForget));
        let err = connector.connect().err().unwrap();
        assert!(matches!(err, GatewayError::ConnectionFailed { .. }));
        assert_eq!(connector.address(), format!("127.0.0.1:{port}"));
    }
}
