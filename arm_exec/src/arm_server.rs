//! # Arm Request Server
//!
//! Serves [`ArmRequest`]s from other software. Every request must be answered with
//! [`ArmServer::send_response`] before the next one is received.
//!
//! A REP socket which failed to send a reply can never recieve again, so in that case the socket
//! is closed and bound afresh. The client of the lost reply has to retry its request.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    net::{zmq, JsonMsgError, MonitoredSocket, MonitoredSocketError, NetParams, SocketOptions},
    tc::{
        arm_ctrl::{ArmRequest, ArmResponse},
        TcParseError,
    },
};
use log::{info, warn};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Arm request server
pub struct ArmServer {
    ctx: zmq::Context,

    endpoint: String,

    /// `None` after a failed rebind, the next call tries to bind again.
    socket: Option<MonitoredSocket>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ArmServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not recieve a request: {0}")]
    RecvError(zmq::Error),

    #[error("Could not send the response: {0}")]
    SendError(JsonMsgError),

    #[error("Could not parse the recieved request: {0}")]
    ParseError(TcParseError),

    #[error("The server socket is not bound")]
    NotBound,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ArmServer {
    /// Create a new instance of the arm request server.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, ArmServerError> {
        let socket = bind(ctx, &params.arm_request_endpoint)?;

        Ok(Self {
            ctx: ctx.clone(),
            endpoint: params.arm_request_endpoint.clone(),
            socket: Some(socket),
        })
    }

    /// Recieve a single request.
    ///
    /// Call in a loop until `Ok(None)` is returned, meaning there are no more pending requests
    /// right now.
    ///
    /// After recieving a valid request a response must be sent using `.send_response()`. If the
    /// request could not be parsed the `Invalid` response is sent automatically by this function.
    pub fn recv_request(&mut self) -> Result<Option<ArmRequest>, ArmServerError> {
        let recieved = self.socket()?.recv_string(zmq::DONTWAIT);

        let req_str = match recieved {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => {
                self.send_response(&ArmResponse::Invalid)?;

                return Err(ArmServerError::ParseError(TcParseError::NonUtf8));
            }
            Err(zmq::Error::EAGAIN) => return Ok(None),
            // Still waiting on a reply, which will never come
            Err(zmq::Error::EFSM) => {
                self.reset();
                return Err(ArmServerError::RecvError(zmq::Error::EFSM));
            }
            // No response is sent if we could not recieve
            Err(e) => return Err(ArmServerError::RecvError(e)),
        };

        match ArmRequest::from_json(&req_str) {
            Ok(r) => Ok(Some(r)),
            Err(e) => {
                self.send_response(&ArmResponse::Invalid)?;

                Err(ArmServerError::ParseError(e))
            }
        }
    }

    /// Send the response to the last recieved request.
    ///
    /// The send is tried twice. If both fail the socket is reset and the response is lost.
    pub fn send_response(&mut self, response: &ArmResponse) -> Result<(), ArmServerError> {
        match self.socket()?.send_json(response, 0) {
            Ok(()) => return Ok(()),
            Err(e) => warn!("Could not send {:?} ({}), retrying", response, e),
        }

        match self.socket()?.send_json(response, 0) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.reset();
                Err(ArmServerError::SendError(e))
            }
        }
    }

    /// Close the socket and bind a new one, dropping any request still waiting for a reply.
    ///
    /// If binding fails the server is left unbound and binding is tried again on the next call to
    /// `recv_request` or `send_response`.
    pub fn reset(&mut self) {
        self.socket = None;

        match bind(&self.ctx, &self.endpoint) {
            Ok(s) => {
                self.socket = Some(s);
                info!("ArmServer socket reset");
            }
            Err(e) => warn!("Could not rebind the ArmServer socket: {}", e),
        }
    }

    fn socket(&mut self) -> Result<&MonitoredSocket, ArmServerError> {
        if self.socket.is_none() {
            self.socket = Some(bind(&self.ctx, &self.endpoint)?);
            info!("ArmServer socket rebound");
        }

        self.socket.as_ref().ok_or(ArmServerError::NotBound)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn bind(ctx: &zmq::Context, endpoint: &str) -> Result<MonitoredSocket, ArmServerError> {
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

    MonitoredSocket::new(ctx, zmq::REP, socket_options, endpoint)
        .map_err(ArmServerError::SocketError)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::{
        thread,
        time::{Duration, Instant},
    };

    fn params(arm_request_endpoint: &str) -> NetParams {
        NetParams {
            planned_path_endpoint: "inproc://unused_paths".into(),
            plan_service_endpoint: "inproc://unused_plan".into(),
            arm_request_endpoint: arm_request_endpoint.into(),
            arm_cmd_endpoint: "inproc://unused_cmd".into(),
        }
    }

    fn send_request(ctx: &zmq::Context, endpoint: &str, request: &str) -> zmq::Socket {
        let client = ctx.socket(zmq::REQ).unwrap();
        client.set_linger(0).unwrap();
        client.set_rcvtimeo(2000).unwrap();
        client.connect(endpoint).unwrap();
        client.send(request, 0).unwrap();
        client
    }

    /// Poll the server until something arrives, tolerating errors while it rebinds.
    fn wait_request(server: &mut ArmServer) -> ArmRequest {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Ok(Some(r)) = server.recv_request() {
                return r;
            }
            assert!(Instant::now() < deadline, "no request recieved");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_request_answered() {
        let ctx = zmq::Context::new();
        let endpoint = "inproc://arm_server_answered";
        let mut server = ArmServer::new(&ctx, &params(endpoint)).unwrap();

        let client = send_request(&ctx, endpoint, r#""GetJointPose""#);
        assert_eq!(wait_request(&mut server), ArmRequest::GetJointPose);

        server.send_response(&ArmResponse::Ok).unwrap();
        assert_eq!(client.recv_string(0).unwrap().unwrap(), r#""Ok""#);
    }

    #[test]
    fn test_unanswered_request_does_not_wedge_server() {
        let ctx = zmq::Context::new();
        let endpoint = "inproc://arm_server_unanswered";
        let mut server = ArmServer::new(&ctx, &params(endpoint)).unwrap();

        let _abandoned = send_request(&ctx, endpoint, r#""GetJointPose""#);
        assert_eq!(wait_request(&mut server), ArmRequest::GetJointPose);

        // No reply was sent, the socket can't recieve so it is reset
        assert!(matches!(
            server.recv_request(),
            Err(ArmServerError::RecvError(zmq::Error::EFSM))
        ));

        // Wait for the new socket to be bound and listening
        let deadline = Instant::now() + Duration::from_secs(5);
        while !matches!(server.recv_request(), Ok(None)) {
            assert!(Instant::now() < deadline, "server never recovered");
            thread::sleep(Duration::from_millis(5));
        }

        let client = send_request(&ctx, endpoint, r#""GetKinematicsPose""#);
        assert_eq!(wait_request(&mut server), ArmRequest::GetKinematicsPose);

        server.send_response(&ArmResponse::Ok).unwrap();
        assert_eq!(client.recv_string(0).unwrap().unwrap(), r#""Ok""#);
    }
}
