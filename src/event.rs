use crate::parser::types::PositionPacket;

/// Everything the client reports to its observer, in emission order.
#[derive(Debug, PartialEq, Clone)]
pub enum ClientEvent {
    /// Socket connected and login line written.
    Connected,
    /// A `#` comment line from the server.
    KeepAlive(String),
    Position(PositionPacket),
    /// A line that is neither a keepalive nor a decodable position report.
    Packet(String),
    /// A line written to the socket, verbatim.
    Sent(String),
    /// The connection dropped or a connect attempt failed; a reconnect follows.
    Closed,
}

impl ClientEvent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Connected => "connected",
            ClientEvent::KeepAlive(_) => "keepalive",
            ClientEvent::Position(_) => "position",
            ClientEvent::Packet(_) => "packet",
            ClientEvent::Sent(_) => "sent",
            ClientEvent::Closed => "closed",
        }
    }
}
