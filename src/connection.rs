pub mod config;
pub mod framing;
pub mod resolver;
pub mod watchdog;

use crate::connection::config::{ClientOptions, ConnectionConfig, KeepAlivePolicy};
use crate::connection::framing::LineFramer;
use crate::connection::watchdog::{Tick, Watchdog};
use crate::event::ClientEvent;
use crate::parser::{LineKind, PacketDecoder};
use crate::thread_manager::SteppableTask;

use std::io::{Read, Write};

pub const CLIENT_NAME: &str = env!("CARGO_PKG_NAME");
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

const READ_BUFFER_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Closing,
}

struct Connection {
    stream: std::net::TcpStream,
    framer: LineFramer,
    last_keepalive: std::time::Instant,
    watchdog: Watchdog,
}

/// APRS-IS client for the OGN feed.
///
/// Owns the socket and runs the whole lifecycle on whichever thread steps it:
/// connect, log in, read and decode lines, check liveness, and reconnect
/// whenever the connection drops. Nothing is shared with other threads except
/// the event channel going out and the outbox channel coming in, so the socket
/// and the keepalive timestamp need no locking.
pub struct AprsClient {
    config: ConnectionConfig,
    options: ClientOptions,
    decoder: PacketDecoder,
    events: crossbeam_channel::Sender<ClientEvent>,
    outbox_sender: crossbeam_channel::Sender<String>,
    outbox: crossbeam_channel::Receiver<String>,
    state: ConnectionState,
    connection: Option<Connection>,
    retry_at: Option<std::time::Instant>,
    stopped: bool,
}

impl AprsClient {
    #[must_use]
    pub fn new(
        config: ConnectionConfig,
        options: ClientOptions,
        events: crossbeam_channel::Sender<ClientEvent>,
    ) -> Self {
        let (outbox_sender, outbox) = crossbeam_channel::unbounded();
        AprsClient {
            decoder: PacketDecoder::new(options.corrections()),
            config,
            options,
            events,
            outbox_sender,
            outbox,
            state: ConnectionState::Disconnected,
            connection: None,
            retry_at: None,
            stopped: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Lines queued here are written by the client thread between reads.
    #[must_use]
    pub fn outbox(&self) -> crossbeam_channel::Sender<String> {
        self.outbox_sender.clone()
    }

    pub fn connect(&mut self) {
        self.stopped = false;
        self.retry_at = None;
        self.state = ConnectionState::Connecting;
        self.try_connect();
    }

    /// Writes `data` to the socket verbatim and reports it as [`ClientEvent::Sent`].
    pub fn send(&mut self, data: &str) -> Result<(), std::io::Error> {
        let Some(connection) = self.connection.as_mut() else {
            return Err(std::io::Error::from(std::io::ErrorKind::NotConnected));
        };

        if let Err(err) = write_line(&mut connection.stream, data) {
            log::warn!("Failed to write to {}: {err}", self.config.address());
            self.handle_close();
            return Err(err);
        }
        self.emit(ClientEvent::Sent(data.to_string()));
        Ok(())
    }

    pub fn shutdown(&mut self) {
        self.state = ConnectionState::Closing;
        log::info!("Shutting down connection to {}", self.config.address());

        if let Some(connection) = self.connection.take() {
            let _ = connection.stream.shutdown(std::net::Shutdown::Both);
        }
        self.retry_at = None;
        self.stopped = true;
        self.state = ConnectionState::Disconnected;
    }

    fn try_connect(&mut self) {
        let address = self.config.address();
        log::info!("Connecting to {address}.");

        match open_stream(&address, self.options.connect_timeout()) {
            Ok(stream) => self.handle_connect(stream),
            Err(err) => {
                log::warn!(
                    "Connection to {address} failed: {err}. Retrying in {}ms.",
                    self.options.retry_delay_ms
                );
                self.emit(ClientEvent::Closed);
                self.retry_at = Some(std::time::Instant::now() + self.options.retry_delay());
            }
        }
    }

    fn handle_connect(&mut self, mut stream: std::net::TcpStream) {
        let login = self.config.login_line(CLIENT_NAME, CLIENT_VERSION);
        if let Err(err) = write_line(&mut stream, &login) {
            log::warn!("Failed to log in to {}: {err}", self.config.address());
            self.handle_close();
            return;
        }
        self.emit(ClientEvent::Sent(login));

        // the watchdog period starts once the login line is out
        let now = std::time::Instant::now();
        self.retry_at = None;
        self.connection = Some(Connection {
            stream,
            framer: LineFramer::new(),
            last_keepalive: now,
            watchdog: Watchdog::arm(
                self.options.watchdog_interval(),
                self.options.keepalive_timeout(),
                now,
            ),
        });

        self.state = ConnectionState::Connected;
        log::info!("Connection to {} successful.", self.config.address());
        self.emit(ClientEvent::Connected);
    }

    fn handle_close(&mut self) {
        self.connection = None;
        self.state = ConnectionState::Connecting;
        self.retry_at = None;
        self.emit(ClientEvent::Closed);
    }

    fn poll_connection(&mut self) {
        self.flush_outbox();

        let mut buffer = [0u8; READ_BUFFER_SIZE];
        let read = {
            let Some(connection) = self.connection.as_mut() else {
                self.state = ConnectionState::Connecting;
                return;
            };
            let wait = connection.watchdog.time_until_tick(std::time::Instant::now());
            connection
                .stream
                .set_read_timeout(Some(wait))
                .and_then(|()| connection.stream.read(&mut buffer))
        };

        match read {
            Ok(0) => {
                log::info!("Connection closed by {}.", self.config.address());
                self.handle_close();
                return;
            }
            Ok(bytes_read) => {
                let lines = match self.connection.as_mut() {
                    Some(connection) => connection.framer.push(&buffer[..bytes_read]),
                    None => Vec::new(),
                };
                self.process_lines(lines);
            }
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock
                        | std::io::ErrorKind::TimedOut
                        | std::io::ErrorKind::Interrupted
                ) => {}
            Err(err) => {
                log::warn!("Error reading from {}: {err}", self.config.address());
                self.handle_close();
                return;
            }
        }

        self.check_watchdog();
    }

    fn process_lines(&mut self, lines: Vec<String>) {
        for line in lines {
            match self.decoder.classify(&line) {
                LineKind::KeepAlive => {
                    if let Some(connection) = self.connection.as_mut() {
                        connection.last_keepalive = std::time::Instant::now();
                    }
                    self.emit(ClientEvent::KeepAlive(line));
                    if self.options.keepalive_policy == KeepAlivePolicy::Stop {
                        break;
                    }
                }
                LineKind::Position(position) => self.emit(ClientEvent::Position(position)),
                LineKind::Unparsed(_) => self.emit(ClientEvent::Packet(line)),
            }
        }
    }

    fn check_watchdog(&mut self) {
        let Some(connection) = self.connection.as_mut() else {
            return;
        };
        let now = std::time::Instant::now();
        if connection.watchdog.poll(now, connection.last_keepalive) != Tick::Expired {
            return;
        }

        log::warn!(
            "No keepalive from {} for {}s, closing connection.",
            self.config.address(),
            now.duration_since(connection.last_keepalive).as_secs()
        );
        let _ = connection.stream.shutdown(std::net::Shutdown::Write);
        drain_after_half_close(&mut connection.stream, self.options.watchdog_interval());
        self.handle_close();
    }

    fn flush_outbox(&mut self) {
        while self.state == ConnectionState::Connected {
            let Ok(line) = self.outbox.try_recv() else {
                break;
            };
            if self.send(&line).is_err() {
                break;
            }
        }
    }

    fn wait_for_retry(&mut self) {
        let Some(retry_at) = self.retry_at else {
            self.try_connect();
            return;
        };
        let now = std::time::Instant::now();
        if now >= retry_at {
            self.retry_at = None;
            self.try_connect();
        } else {
            // short naps so a stop signal is noticed between them
            std::thread::sleep((retry_at - now).min(self.options.watchdog_interval()));
        }
    }

    fn emit(&mut self, event: ClientEvent) {
        log::trace!("Event: {}", event.name());
        if self.events.send(event).is_err() {
            log::error!("AprsClient: event receiver disconnected");
            self.stopped = true;
        }
    }
}

impl SteppableTask for AprsClient {
    fn step(&mut self) -> bool {
        if self.stopped {
            return false;
        }

        match self.state {
            ConnectionState::Disconnected => self.connect(),
            ConnectionState::Connecting => self.wait_for_retry(),
            ConnectionState::Connected => self.poll_connection(),
            ConnectionState::Closing => return false,
        }
        !self.stopped
    }

    fn finish(&mut self) {
        self.shutdown();
    }
}

fn write_line(stream: &mut std::net::TcpStream, data: &str) -> Result<(), std::io::Error> {
    stream.write_all(data.as_bytes())?;
    stream.flush()
}

/// Reads and discards what the peer still sends after our FIN, for at most
/// `limit`. Closing a socket with unread input makes the kernel answer with an
/// RST instead of finishing the close.
fn drain_after_half_close(stream: &mut std::net::TcpStream, limit: std::time::Duration) {
    let deadline = std::time::Instant::now() + limit;
    let mut buffer = [0u8; READ_BUFFER_SIZE];
    loop {
        let remaining = deadline.saturating_duration_since(std::time::Instant::now());
        if remaining.is_zero() || stream.set_read_timeout(Some(remaining)).is_err() {
            return;
        }
        match stream.read(&mut buffer) {
            Ok(0) | Err(_) => return,
            Ok(bytes_read) => log::trace!("Discarded {bytes_read} bytes after half-close"),
        }
    }
}

fn open_stream(
    address: &str,
    timeout: std::time::Duration,
) -> Result<std::net::TcpStream, std::io::Error> {
    use std::net::ToSocketAddrs;

    let mut last_error = None;
    for socket_address in address.to_socket_addrs()? {
        match std::net::TcpStream::connect_timeout(&socket_address, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => last_error = Some(err),
        }
    }
    Err(last_error.unwrap_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            format!("{address} resolved to no addresses"),
        )
    }))
}
