//! Client for the Open Glider Network APRS-IS feed.
//!
//! [`connection::AprsClient`] keeps a login-filtered TCP connection alive
//! (keepalive watchdog, automatic reconnect) and reports what it reads as
//! [`event::ClientEvent`]s: decoded [`parser::types::PositionPacket`]s,
//! server keepalives, and raw lines it could not decode.

pub mod cli;
pub mod config;
pub mod connection;
pub mod event;
pub mod logging;
pub mod parser;
pub mod thread_manager;
