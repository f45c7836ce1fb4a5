//! # Planned Path Client
//!
//! Subscribes to the planned paths published by the planning service.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    net::{zmq, JsonMsgError, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
    plan::PlannedPath,
};
use log::warn;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Planned path subscriber
pub struct PathClient {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PathClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PathClient {
    /// Create a new instance of the path client.
    ///
    /// This function will not block until the planning service connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, PathClientError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::SUB,
            socket_options,
            &params.planned_path_endpoint,
        )
        .map_err(PathClientError::SocketError)?;

        Ok(Self { socket })
    }

    /// Receive all paths that have arrived since the last call, oldest first.
    ///
    /// Never blocks. Messages which cannot be parsed are logged and skipped.
    pub fn recv_paths(&self) -> Vec<PlannedPath> {
        let mut paths = Vec::new();

        loop {
            match self.socket.recv_json::<PlannedPath>(zmq::DONTWAIT) {
                Ok(Some(p)) => paths.push(p),
                Ok(None) => break,
                Err(JsonMsgError::RecvError(e)) => {
                    warn!("Could not recieve planned paths: {}", e);
                    break;
                }
                Err(e) => warn!("Could not read planned path: {}", e),
            }
        }

        paths
    }
}
