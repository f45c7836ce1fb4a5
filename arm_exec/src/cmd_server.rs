//! # Command Server
//!
//! Publishes joint commands and the arm status. Each message is sent as a topic frame followed by
//! a JSON payload frame, so subscribers can filter on a single joint.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::arm::{joint_cmd_topic, status_topic, ArmStatus, JointCmd},
    net::{zmq, JsonMsgError, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
};

use crate::emitter::{CommandSink, Joint};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Joint command and status publisher
pub struct CmdServer {
    socket: MonitoredSocket,

    robot_name: String,

    status_topic: String,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CmdServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CmdServer {
    /// Create a new instance of the command server.
    ///
    /// This function will not block until a subscriber connects.
    pub fn new(
        ctx: &zmq::Context,
        params: &NetParams,
        robot_name: &str,
    ) -> Result<Self, CmdServerError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            bind: true,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 10,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::PUB, socket_options, &params.arm_cmd_endpoint)
            .map_err(CmdServerError::SocketError)?;

        Ok(Self {
            socket,
            robot_name: robot_name.into(),
            status_topic: status_topic(robot_name),
        })
    }
}

impl CommandSink for CmdServer {
    type Error = JsonMsgError;

    fn send_joint_cmd(&mut self, joint: &Joint, cmd: JointCmd) -> Result<(), Self::Error> {
        self.socket
            .publish_json(&joint_cmd_topic(&self.robot_name, &joint.name), &cmd)
    }

    fn send_status(&mut self, status: ArmStatus) -> Result<(), Self::Error> {
        self.socket.publish_json(&self.status_topic, &status)
    }
}
