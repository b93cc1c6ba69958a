//! Socket listener
//!
//! Accepts TCP (optionally TLS) connections on a dedicated thread and serves
//! each connection on its own thread. Inbound bytes are buffered until the
//! peer goes quiet for `read_timeout_ms` or closes its side; the buffered
//! message is handed to the callback and the callback's response is written
//! back, either on the same connection or to the configured response
//! address.
//!
//! A message that grows past `max_message_bytes` is answered with [`NAK`]
//! and the connection is closed.
//!
//! Stopping is cooperative: the accept loop and every connection loop check
//! a shared flag between reads.

use crate::adapters::gateway::NAK;
use crate::config::ListenerConfig;
use crate::domain::{PharmaGateError, Result};
use native_tls::{Identity, TlsAcceptor};
use secrecy::ExposeSecret;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Turns one inbound message into the bytes sent back
pub type MessageHandler = Arc<dyn Fn(&[u8]) -> Vec<u8> + Send + Sync>;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(50);
const READ_CHUNK: usize = 8192;

/// A configured, not yet started listener
pub struct SocketListener {
    bind: SocketAddr,
    read_timeout: Duration,
    max_message: usize,
    tls: Option<TlsAcceptor>,
    response_to: Option<(String, u16)>,
    handler: MessageHandler,
}

impl std::fmt::Debug for SocketListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketListener")
            .field("bind", &self.bind)
            .field("read_timeout", &self.read_timeout)
            .field("max_message", &self.max_message)
            .field("tls", &self.tls.is_some())
            .field("response_to", &self.response_to)
            .finish_non_exhaustive()
    }
}

impl SocketListener {
    /// Validates the configuration and loads the TLS identity.
    ///
    /// # Errors
    ///
    /// Returns `Listener` when `handler` is `None`, the bind address is empty
    /// or does not resolve, or the TLS identity cannot be loaded.
    pub fn new(config: &ListenerConfig, handler: Option<MessageHandler>) -> Result<Self> {
        let handler = handler.ok_or_else(|| {
            PharmaGateError::Listener("a message handler is required".to_string())
        })?;

        let host = config.bind_address.trim();
        if host.is_empty() {
            return Err(PharmaGateError::Listener(
                "bind address cannot be empty".to_string(),
            ));
        }
        let bind = (host, config.port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| {
                PharmaGateError::Listener(format!("invalid bind address '{host}:{}'", config.port))
            })?;

        let tls = if config.tls_enabled {
            Some(load_acceptor(config)?)
        } else {
            None
        };

        let response_to = match (&config.response_host, config.response_port) {
            (Some(host), Some(port)) => Some((host.clone(), port)),
            _ => None,
        };

        Ok(Self {
            bind,
            read_timeout: Duration::from_millis(config.read_timeout_ms.max(1)),
            max_message: config.max_message_bytes.max(1),
            tls,
            response_to,
            handler,
        })
    }

    /// Binds the socket and starts the accept thread
    ///
    /// # Errors
    ///
    /// Returns `Listener` if the socket cannot be bound.
    pub fn start(self) -> Result<ListenerHandle> {
        let socket = TcpListener::bind(self.bind)
            .map_err(|e| PharmaGateError::Listener(format!("bind {} failed: {e}", self.bind)))?;
        socket.set_nonblocking(true)?;
        let local_addr = socket.local_addr()?;
        let stop = Arc::new(AtomicBool::new(false));

        tracing::info!(
            address = %local_addr,
            tls = self.tls.is_some(),
            "Socket listener started"
        );

        let accept_stop = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name("pharmagate-listener".to_string())
            .spawn(move || self.accept_loop(socket, &accept_stop))?;

        Ok(ListenerHandle {
            local_addr,
            stop,
            thread,
        })
    }

    fn accept_loop(self, socket: TcpListener, stop: &Arc<AtomicBool>) {
        let shared = Arc::new(self);
        let mut connections: Vec<JoinHandle<()>> = Vec::new();

        while !stop.load(Ordering::SeqCst) {
            match socket.accept() {
                Ok((stream, peer)) => {
                    connections.retain(|c| !c.is_finished());
                    let listener = Arc::clone(&shared);
                    let stop = Arc::clone(stop);
                    let spawned = thread::Builder::new()
                        .name(format!("pharmagate-conn-{peer}"))
                        .spawn(move || listener.serve_connection(stream, peer, &stop));
                    match spawned {
                        Ok(handle) => connections.push(handle),
                        Err(e) => tracing::error!(%peer, error = %e, "Could not spawn connection thread"),
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(ACCEPT_BACKOFF),
                Err(e) => {
                    tracing::error!(error = %e, "Accept failed");
                    thread::sleep(ACCEPT_BACKOFF);
                }
            }
        }

        for connection in connections {
            let _ = connection.join();
        }
        tracing::info!("Socket listener stopped");
    }

    fn serve_connection(&self, stream: TcpStream, peer: SocketAddr, stop: &AtomicBool) {
        tracing::debug!(%peer, "Connection accepted");
        let prepared = stream
            .set_nonblocking(false)
            .and_then(|_| stream.set_read_timeout(Some(self.read_timeout)));
        if let Err(e) = prepared {
            tracing::error!(%peer, error = %e, "Could not configure connection");
            return;
        }

        let outcome = match &self.tls {
            Some(acceptor) => match acceptor.accept(stream) {
                Ok(tls) => self.exchange(tls, peer, stop),
                Err(e) => {
                    tracing::warn!(%peer, error = %e, "TLS handshake failed");
                    return;
                }
            },
            None => self.exchange(stream, peer, stop),
        };

        match outcome {
            Ok(messages) => tracing::debug!(%peer, messages, "Connection closed"),
            Err(e) => tracing::warn!(%peer, error = %e, "Connection ended with error"),
        }
    }

    /// Reads messages until the peer closes or the listener stops; returns
    /// the number of messages handled
    fn exchange<S: Read + Write>(&self, mut stream: S, peer: SocketAddr, stop: &AtomicBool) -> io::Result<usize> {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        let mut messages = 0;

        loop {
            match stream.read(&mut chunk) {
                Ok(0) => {
                    if !buffer.is_empty() {
                        self.reply(&mut stream, peer, &buffer)?;
                        messages += 1;
                    }
                    return Ok(messages);
                }
                Ok(n) => {
                    if buffer.len() + n > self.max_message {
                        tracing::warn!(
                            %peer,
                            limit = self.max_message,
                            "Inbound message too large, closing connection"
                        );
                        let mut response = vec![NAK];
                        response.extend_from_slice(
                            format!("message exceeds {} bytes", self.max_message).as_bytes(),
                        );
                        self.send(&mut stream, &response)?;
                        return Ok(messages);
                    }
                    buffer.extend_from_slice(&chunk[..n]);
                }
                Err(e) if is_timeout(&e) => {
                    if !buffer.is_empty() {
                        self.reply(&mut stream, peer, &buffer)?;
                        buffer.clear();
                        messages += 1;
                    }
                    if stop.load(Ordering::SeqCst) {
                        return Ok(messages);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }

    fn reply<S: Write>(&self, stream: &mut S, peer: SocketAddr, message: &[u8]) -> io::Result<()> {
        tracing::debug!(%peer, bytes = message.len(), "Message received");
        let response = (self.handler)(message);
        self.send(stream, &response)
    }

    /// Writes `response` to the response channel, or back on `stream`
    fn send<S: Write>(&self, stream: &mut S, response: &[u8]) -> io::Result<()> {
        match &self.response_to {
            Some((host, port)) => {
                let mut channel = TcpStream::connect((host.as_str(), *port))?;
                channel.write_all(response)?;
                channel.flush()
            }
            None => {
                stream.write_all(response)?;
                stream.flush()
            }
        }
    }
}

/// A running listener
#[derive(Debug)]
pub struct ListenerHandle {
    local_addr: SocketAddr,
    stop: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl ListenerHandle {
    /// Bound address (useful with port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Asks the accept and connection loops to finish
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Stops the listener and waits for its threads
    ///
    /// # Errors
    ///
    /// Returns `Listener` if the accept thread panicked.
    pub fn shutdown(self) -> Result<()> {
        self.stop();
        self.thread
            .join()
            .map_err(|_| PharmaGateError::Listener("listener thread panicked".to_string()))
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

fn load_acceptor(config: &ListenerConfig) -> Result<TlsAcceptor> {
    let path = config.tls_identity_path.as_deref().ok_or_else(|| {
        PharmaGateError::Listener("tls_identity_path is required when TLS is enabled".to_string())
    })?;
    let der = std::fs::read(path).map_err(|e| {
        PharmaGateError::Listener(format!("cannot read TLS identity {path}: {e}"))
    })?;
    let password = config
        .tls_identity_password
        .as_ref()
        .map(|p| p.expose_secret().as_ref().to_string())
        .unwrap_or_default();

    let identity = Identity::from_pkcs12(&der, &password)
        .map_err(|e| PharmaGateError::Listener(format!("invalid TLS identity {path}: {e}")))?;
    TlsAcceptor::new(identity)
        .map_err(|e| PharmaGateError::Listener(format!("TLS setup failed: {e}")))
}
