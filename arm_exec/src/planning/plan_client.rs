//! # Planning Service Client
//!
//! This module provides networking abstractions to connect to the planning service.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    net::{zmq, JsonMsgError, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
    plan::{JointPose, PlanRequest, PlanResponse, Pose, PoseStamped},
};
use log::trace;

use super::{PlanningError, PlanningService};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// REQ client of the planning service.
pub struct PlanClient {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum PlanClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("The client is not connected to the planning service")]
    NotConnected,

    #[error("Message error: {0}")]
    MsgError(JsonMsgError),

    #[error("No response was recieved from the planning service")]
    NoResponse,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PlanClient {
    /// Create a new instance of the planning service client.
    ///
    /// This function will not block until the service is connected.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, PlanClientError> {
        // Planning can take a while, so the receive timeout is far longer than a cycle. The client
        // is only used from the planning worker thread, never from the main loop.
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: 5000,
            send_timeout: 10,
            req_correlate: true,
            req_relaxed: true,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::REQ,
            socket_options,
            &params.plan_service_endpoint,
        )
        .map_err(PlanClientError::SocketError)?;

        Ok(Self { socket })
    }

    /// Send a request to the planning service and wait for its response.
    pub fn request(&mut self, request: &PlanRequest) -> Result<PlanResponse, PlanClientError> {
        if !self.socket.connected() {
            return Err(PlanClientError::NotConnected);
        }

        trace!("Sending {:?} to the planning service", request);

        self.socket
            .send_json(request, 0)
            .map_err(PlanClientError::MsgError)?;

        match self.socket.recv_json(0) {
            Ok(Some(r)) => Ok(r),
            Ok(None) => Err(PlanClientError::NoResponse),
            Err(e) => Err(PlanClientError::MsgError(e)),
        }
    }

    fn execute(&mut self, request: &PlanRequest) -> Result<(), PlanningError> {
        match self.request(request)? {
            PlanResponse::PlanExecuted => Ok(()),
            PlanResponse::PlanFailed(reason) => Err(PlanningError::PlanningFailed(reason)),
            r => Err(unexpected(r)),
        }
    }
}

impl PlanningService for PlanClient {
    fn is_connected(&self) -> bool {
        self.socket.connected()
    }

    fn plan_joint_target(&mut self, target_rad: &[f64]) -> Result<(), PlanningError> {
        self.execute(&PlanRequest::JointTarget(target_rad.to_vec()))
    }

    fn plan_pose_target(&mut self, target: &Pose) -> Result<(), PlanningError> {
        self.execute(&PlanRequest::PoseTarget(*target))
    }

    fn get_current_joint_values(&mut self) -> Result<JointPose, PlanningError> {
        match self.request(&PlanRequest::GetJointValues)? {
            PlanResponse::JointValues(jp) => Ok(jp),
            r => Err(unexpected(r)),
        }
    }

    fn get_current_pose(&mut self) -> Result<PoseStamped, PlanningError> {
        match self.request(&PlanRequest::GetCurrentPose)? {
            PlanResponse::CurrentPose(p) => Ok(p),
            r => Err(unexpected(r)),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn unexpected(response: PlanResponse) -> PlanningError {
    PlanningError::UnexpectedResponse(format!("{:?}", response))
}
