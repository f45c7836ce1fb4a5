//! Main arm executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logger, parameters and network
//!     - Start the planning worker and submit the initial joint pose, if one is configured
//!     - Main loop:
//!         - Planned path ingestion
//!         - Planning worker responses
//!         - Arm request handling
//!         - Playback processing
//!         - Joint command and status emission
//!
//! Playback runs on the main thread. Paths and requests are drained between playback cycles, so
//! they can never interleave with a playback step. Requests which need the planner are served by
//! the planning worker, one at a time, so a slow planner never stalls the cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Result,
};
use comms_if::{
    eqpt::arm::joint_name,
    net::NetParams,
    plan::JointPose,
    tc::arm_ctrl::{ArmRequest, ArmResponse},
};
use log::{debug, info, trace, warn};
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use arm_lib::{
    arm_server::ArmServer,
    cmd_server::CmdServer,
    emitter::{CommandEmitter, Joint},
    params::ArmExecParams,
    path_client::PathClient,
    planning::{PlanClient, PlanWorker, RequestOrigin},
    playback::{IngestOutcome, PlaybackCtrl},
    request_handler::gate_request,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
    time,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Arm trajectory playback executable
#[derive(Debug, StructOpt)]
#[structopt(name = "arm_exec")]
struct Opts {
    /// Parameter file of the executable, relative to `$ARM_SW_ROOT/params`
    #[structopt(long, default_value = "arm_exec.toml")]
    params: String,

    /// Network parameter file, relative to `$ARM_SW_ROOT/params`
    #[structopt(long, default_value = "net.toml")]
    net_params: String,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    let opts = Opts::from_args();

    // Initialise session
    let session = Session::new("arm_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Arm Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    debug!("CLI options: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let params: ArmExecParams =
        util::params::load(&opts.params).wrap_err("Could not load arm_exec params")?;

    let net_params: NetParams =
        util::params::load(&opts.net_params).wrap_err("Could not load net params")?;

    if params.cycle_frequency_hz <= 0.0 {
        return Err(eyre!(
            "The cycle frequency must be positive, found {} Hz",
            params.cycle_frequency_hz
        ));
    }

    info!("Parameters loaded");

    // ---- INITIALISE MODULES ----

    let mut playback =
        PlaybackCtrl::new(params.playback.clone()).wrap_err("Failed to initialise playback")?;
    info!(
        "Playback initialised for {} joints",
        playback.params().joint_num
    );

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let mut plan_worker = {
        let c = PlanClient::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise PlanClient")?;
        info!("PlanClient initialised");

        PlanWorker::spawn(
            c,
            playback.params().joint_num,
            Duration::from_secs_f64(params.planner_connect_timeout_s.max(0.0)),
        )
        .wrap_err("Failed to start the planning worker")?
    };

    let path_client = {
        let c = PathClient::new(&zmq_ctx, &net_params)
            .wrap_err("Failed to initialise PathClient")?;
        info!("PathClient initialised");
        c
    };

    let mut arm_server = {
        let s =
            ArmServer::new(&zmq_ctx, &net_params).wrap_err("Failed to initialise ArmServer")?;
        info!("ArmServer initialised");
        s
    };

    let mut emitter = {
        let s = CmdServer::new(&zmq_ctx, &net_params, &params.robot_name)
            .wrap_err("Failed to initialise CmdServer")?;
        info!("CmdServer initialised");

        let joints = Joint::arm_joints(playback.params().joint_num, params.first_joint_id)
            .wrap_err("Invalid joint actuator IDs")?;

        CommandEmitter::new(s, joints, params.sim_mode)
    };

    for joint in emitter.joints() {
        debug!("{} has actuator ID {}", joint.name, joint.id);
    }

    if !params.sim_mode {
        info!("Running on hardware, only the arm status will be published");
    }

    info!("Network initialisation complete");

    // ---- INITIAL POSE ----

    if let Some(ref pose) = params.initial_joint_pose {
        info!("Requesting initial joint pose {:?}", pose);

        let request = ArmRequest::JointTarget(JointPose {
            joint_name: (0..pose.len()).map(joint_name).collect(),
            position: pose.clone(),
        });

        // Answered by the worker once the planning service is up
        plan_worker
            .submit(request, RequestOrigin::Startup)
            .wrap_err("Could not request the initial joint pose")?;
    }

    // ---- MAIN LOOP ----

    let cycle_period = Duration::from_secs_f64(time::period_s(params.cycle_frequency_hz));
    let settle_time = Duration::from_secs_f64(params.arm_settle_time_s.max(0.0));

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let mut cycle_start_instant = Instant::now();

        // ---- PLANNED PATHS ----

        for path in path_client.recv_paths() {
            match playback.ingest(&path) {
                Ok(IngestOutcome::Armed { .. }) => {
                    // Give the arm time to settle before the first waypoint. Not counted as part
                    // of the cycle.
                    thread::sleep(settle_time);
                    cycle_start_instant = Instant::now();
                }
                Ok(IngestOutcome::NotArmPath) => trace!("Ignored a gripper path"),
                Err(e) => warn!("Planned path rejected: {}", e),
            }
        }

        // ---- PLANNING RESPONSES ----

        match plan_worker.try_response() {
            Ok(Some((response, RequestOrigin::ArmServer))) => {
                if let Err(e) = arm_server.send_response(&response) {
                    warn!("Could not send response {:?}: {}", response, e);
                }
            }
            Ok(Some((response, RequestOrigin::Startup))) => {
                info!("Initial joint pose response: {:?}", response)
            }
            Ok(None) => (),
            Err(e) => return Err(e).wrap_err("Planning worker failed"),
        }

        // ---- ARM REQUESTS ----

        // The REP socket can't recieve again until the worker's answer has been sent
        while !plan_worker.is_busy() {
            let request = match arm_server.recv_request() {
                Ok(Some(r)) => r,
                Ok(None) => break,
                Err(e) => {
                    warn!("ArmServer error: {}", e);
                    break;
                }
            };

            debug!("Recieved request: {:?}", request);

            if let Some(response) = gate_request(&request, &playback) {
                if let Err(e) = arm_server.send_response(&response) {
                    warn!("Could not send response to {:?}: {}", request, e);
                }
                continue;
            }

            if let Err(e) = plan_worker.submit(request, RequestOrigin::ArmServer) {
                warn!("Could not hand the request to the planning worker: {}", e);

                let response = ArmResponse::PlanningFailed(e.to_string());
                if let Err(e) = arm_server.send_response(&response) {
                    warn!("Could not send response {:?}: {}", response, e);
                }
            }
        }

        // ---- PLAYBACK ----

        match playback.proc(&()) {
            Ok((output, report)) => {
                trace!("Playback status: {:?}", report);

                let emit_report = emitter.emit(&output);
                if emit_report.num_failed > 0 {
                    warn!("{} command writes failed", emit_report.num_failed);
                }
            }
            Err(e) => warn!("Playback error: {}", e),
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
            }
        }
    }
}
