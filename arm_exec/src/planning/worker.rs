//! Planning worker thread
//!
//! A planning request can take seconds to answer. Requests are served on a worker thread so the
//! main loop keeps stepping playback and publishing the arm status while the planner works.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    sync::mpsc::{channel, Receiver, Sender, TryRecvError},
    thread,
    time::{Duration, Instant},
};

use comms_if::tc::arm_ctrl::{ArmRequest, ArmResponse};
use log::{debug, warn};

use super::PlanningService;
use crate::request_handler::serve_request;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// How often the worker checks the planner connection while waiting for it.
const CONNECT_POLL_PERIOD: Duration = Duration::from_millis(50);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Handle to the planning worker thread.
///
/// Serves one request at a time. The thread is stopped when the handle is dropped.
pub struct PlanWorker {
    worker_jh: Option<thread::JoinHandle<()>>,

    worker_sender: Sender<WorkerSignal>,

    worker_reciever: Receiver<WorkerSignal>,

    busy: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Where a request came from, so its response can be routed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOrigin {
    /// A client of the arm server, which is waiting for the response.
    ArmServer,

    /// Issued by the executable itself during startup.
    Startup,
}

#[derive(Debug, thiserror::Error)]
pub enum PlanWorkerError {
    #[error("Could not start the planning worker thread: {0}")]
    SpawnError(std::io::Error),

    #[error("The planning worker is already serving a request")]
    Busy,

    #[error("The planning worker has stopped")]
    WorkerStopped,
}

#[derive(Debug)]
enum WorkerSignal {
    /// The worker should stop
    Stop,

    /// Serve the request
    Serve(ArmRequest, RequestOrigin),

    /// The request has been served
    Served(ArmResponse, RequestOrigin),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PlanWorker {
    /// Start the worker, which takes ownership of the planner.
    ///
    /// Before serving a request the worker waits up to `connect_timeout` for the planner to be
    /// connected.
    pub fn spawn<P>(
        planner: P,
        joint_num: usize,
        connect_timeout: Duration,
    ) -> Result<Self, PlanWorkerError>
    where
        P: PlanningService + Send + 'static,
    {
        let (worker_sender, rx) = channel();
        let (tx, worker_reciever) = channel();

        let worker_jh = thread::Builder::new()
            .name("plan_worker".into())
            .spawn(move || worker_thread(planner, joint_num, connect_timeout, tx, rx))
            .map_err(PlanWorkerError::SpawnError)?;

        Ok(Self {
            worker_jh: Some(worker_jh),
            worker_sender,
            worker_reciever,
            busy: false,
        })
    }

    /// True between submitting a request and collecting its response.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Hand a request to the worker.
    pub fn submit(
        &mut self,
        request: ArmRequest,
        origin: RequestOrigin,
    ) -> Result<(), PlanWorkerError> {
        if self.busy {
            return Err(PlanWorkerError::Busy);
        }

        self.worker_sender
            .send(WorkerSignal::Serve(request, origin))
            .map_err(|_| PlanWorkerError::WorkerStopped)?;

        self.busy = true;

        Ok(())
    }

    /// Collect the response to the submitted request if it is ready. Never blocks.
    pub fn try_response(
        &mut self,
    ) -> Result<Option<(ArmResponse, RequestOrigin)>, PlanWorkerError> {
        match self.worker_reciever.try_recv() {
            Ok(WorkerSignal::Served(response, origin)) => {
                self.busy = false;
                Ok(Some((response, origin)))
            }
            Ok(_) | Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(PlanWorkerError::WorkerStopped),
        }
    }
}

impl Drop for PlanWorker {
    fn drop(&mut self) {
        self.worker_sender.send(WorkerSignal::Stop).ok();

        if let Some(jh) = self.worker_jh.take() {
            jh.join().ok();
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn worker_thread<P: PlanningService>(
    mut planner: P,
    joint_num: usize,
    connect_timeout: Duration,
    main_sender: Sender<WorkerSignal>,
    main_reciever: Receiver<WorkerSignal>,
) {
    while let Ok(signal) = main_reciever.recv() {
        match signal {
            WorkerSignal::Stop => break,
            WorkerSignal::Serve(request, origin) => {
                let response = match wait_connected(&planner, connect_timeout) {
                    true => serve_request(&request, joint_num, &mut planner),
                    false => {
                        warn!(
                            "Planning service not connected after {:.1} s",
                            connect_timeout.as_secs_f64()
                        );
                        ArmResponse::PlanningFailed(
                            "the planning service is not connected".into(),
                        )
                    }
                };

                debug!("Served {:?} ({:?}): {:?}", request, origin, response);

                if main_sender
                    .send(WorkerSignal::Served(response, origin))
                    .is_err()
                {
                    break;
                }
            }
            WorkerSignal::Served(..) => (),
        }
    }
}

/// Wait for the planner to connect, returns false if it didn't within the timeout.
fn wait_connected<P: PlanningService>(planner: &P, timeout: Duration) -> bool {
    let start = Instant::now();

    while !planner.is_connected() {
        if start.elapsed() >= timeout {
            return false;
        }
        thread::sleep(CONNECT_POLL_PERIOD);
    }

    true
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::emitter::{test::RecordingSink, CommandEmitter, Joint};
    use crate::planning::test::MockPlanner;
    use crate::playback::{Params, PlaybackCtrl};
    use comms_if::{eqpt::arm::ArmStatus, plan::JointPose};
    use std::sync::{atomic::Ordering, mpsc};
    use util::module::State;

    fn joint_target() -> ArmRequest {
        ArmRequest::JointTarget(JointPose {
            joint_name: vec!["joint1".into(), "joint2".into()],
            position: vec![0.5, -0.5],
        })
    }

    fn wait_response(worker: &mut PlanWorker) -> (ArmResponse, RequestOrigin) {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(r) = worker.try_response().unwrap() {
                return r;
            }
            assert!(Instant::now() < deadline, "the worker never responded");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_status_published_while_planning() {
        let (hold_tx, hold_rx) = mpsc::channel();
        let mut planner = MockPlanner::new(2);
        planner.hold = Some(hold_rx);

        let mut worker = PlanWorker::spawn(planner, 2, Duration::from_secs(1)).unwrap();
        let mut playback = PlaybackCtrl::new(Params {
            joint_num: 2,
            ..Default::default()
        })
        .unwrap();
        let mut emitter = CommandEmitter::new(
            RecordingSink::default(),
            Joint::arm_joints(2, 1).unwrap(),
            true,
        );

        worker
            .submit(joint_target(), RequestOrigin::ArmServer)
            .unwrap();

        // The planner is stuck, cycles carry on regardless
        for _ in 0..5 {
            assert_eq!(worker.try_response().unwrap(), None);
            assert!(worker.is_busy());

            let (output, _) = playback.proc(&()).unwrap();
            emitter.emit(&output);
        }
        assert_eq!(emitter.sink().statuses, vec![ArmStatus::stopped(); 5]);

        hold_tx.send(()).unwrap();
        assert_eq!(
            wait_response(&mut worker),
            (ArmResponse::Ok, RequestOrigin::ArmServer)
        );
        assert!(!worker.is_busy());
    }

    #[test]
    fn test_one_request_at_a_time() {
        let (hold_tx, hold_rx) = mpsc::channel();
        let mut planner = MockPlanner::new(2);
        planner.hold = Some(hold_rx);

        let mut worker = PlanWorker::spawn(planner, 2, Duration::from_secs(1)).unwrap();

        worker
            .submit(joint_target(), RequestOrigin::ArmServer)
            .unwrap();
        assert!(matches!(
            worker.submit(ArmRequest::GetJointPose, RequestOrigin::ArmServer),
            Err(PlanWorkerError::Busy)
        ));

        hold_tx.send(()).unwrap();
        wait_response(&mut worker);

        worker
            .submit(ArmRequest::GetJointPose, RequestOrigin::ArmServer)
            .unwrap();
        assert!(matches!(
            wait_response(&mut worker),
            (ArmResponse::JointPose(_), RequestOrigin::ArmServer)
        ));
    }

    #[test]
    fn test_startup_request_waits_for_connection() {
        let planner = MockPlanner::new(2);
        let connected = planner.connected.clone();
        connected.store(false, Ordering::Relaxed);

        let mut worker = PlanWorker::spawn(planner, 2, Duration::from_secs(5)).unwrap();
        worker.submit(joint_target(), RequestOrigin::Startup).unwrap();

        thread::sleep(Duration::from_millis(100));
        assert_eq!(worker.try_response().unwrap(), None);

        connected.store(true, Ordering::Relaxed);
        assert_eq!(
            wait_response(&mut worker),
            (ArmResponse::Ok, RequestOrigin::Startup)
        );
    }

    #[test]
    fn test_connection_timeout_reported() {
        let planner = MockPlanner::new(2);
        planner.connected.store(false, Ordering::Relaxed);

        let mut worker = PlanWorker::spawn(planner, 2, Duration::from_millis(50)).unwrap();
        worker.submit(joint_target(), RequestOrigin::Startup).unwrap();

        assert!(matches!(
            wait_response(&mut worker),
            (ArmResponse::PlanningFailed(_), RequestOrigin::Startup)
        ));
    }
}
