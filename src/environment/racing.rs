use nalgebra::Vector3;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::bridge::{ObjectSettings, RenderBridge, SceneView, TcpBridge, VehicleSettings};
use crate::components::{Command, QuadState, RgbCamera, StaticGate, WorldBox};
use crate::config::RacingConfig;
use crate::environment::{Session, SessionError, SessionState, Track};
use crate::physics::{Quadrotor, QuadrotorDynamics};
use crate::rendering::{ImageMarshaller, RenderError};
use crate::resources::{CameraExtrinsics, FrameConvention};
use crate::utils::{quaternion_to_euler, SimError, ACT_DIM, OBS_DIM, QUAD_SIZE};

/// Renderer id of the quadrotor
pub const QUAD_ID: &str = "racing_quadrotor";
/// Renderer id of the onboard RGB camera
pub const CAMERA_ID: &str = "racing_rgb_camera";

/// Creates the renderer bridge on the first arm.
pub type BridgeFactory = Box<dyn FnMut() -> Box<dyn RenderBridge> + Send>;

/// Builder for [`RacingEnv`].
pub struct RacingEnvBuilder {
    config: RacingConfig,
    rendering_only: bool,
    dynamics: Option<Box<dyn QuadrotorDynamics>>,
    bridge_factory: Option<BridgeFactory>,
}

impl RacingEnvBuilder {
    pub fn new(config: RacingConfig) -> Self {
        Self {
            config,
            rendering_only: false,
            dynamics: None,
            bridge_factory: None,
        }
    }

    /// Camera at the body origin, zero-size body, configured dynamics
    /// parameters ignored.
    pub fn rendering_only(mut self, rendering_only: bool) -> Self {
        self.rendering_only = rendering_only;
        self
    }

    pub fn dynamics(mut self, dynamics: Box<dyn QuadrotorDynamics>) -> Self {
        self.dynamics = Some(dynamics);
        self
    }

    pub fn bridge_factory<F>(mut self, factory: F) -> Self
    where
        F: FnMut() -> Box<dyn RenderBridge> + Send + 'static,
    {
        self.bridge_factory = Some(Box::new(factory));
        self
    }

    pub fn build(self) -> Result<RacingEnv, SimError> {
        let config = self.config;

        let extrinsics = if self.rendering_only {
            CameraExtrinsics::rendering_only()
        } else {
            CameraExtrinsics::mounted(config.camera.mount_offset, config.camera.uptilt)
        };

        let mut dynamics = self
            .dynamics
            .unwrap_or_else(|| Box::new(Quadrotor::default()) as Box<dyn QuadrotorDynamics>);
        if self.rendering_only {
            dynamics.set_size(Vector3::zeros());
        } else {
            dynamics.set_size(Vector3::repeat(QUAD_SIZE));
            if let Some(params) = &config.dynamics {
                dynamics.update_params(params)?;
            }
        }
        let world_box = WorldBox::default();
        dynamics.set_world_box(&world_box);

        let quad_state = QuadState::default();
        dynamics.set_state(&quad_state)?;

        let bridge_factory: BridgeFactory = match self.bridge_factory {
            Some(factory) => factory,
            None => {
                let unity = config.unity.clone();
                Box::new(move || Box::new(TcpBridge::local(&unity)) as Box<dyn RenderBridge>)
            }
        };

        let marshaller = ImageMarshaller::new(config.camera.height, config.camera.width)?;

        let mut env = RacingEnv {
            sim_dt: config.simulation.sim_dt,
            rendering_only: self.rendering_only,
            dynamics,
            quad_state,
            cmd: Command::default(),
            camera: RgbCamera::new(CAMERA_ID, &config.camera, extrinsics),
            track: Track::from_config(&config.track),
            world_box,
            marshaller,
            convention: FrameConvention::default(),
            session: Session::Unarmed,
            bridge_factory,
            config,
        };

        info!(
            "Racing environment with {} gates, {}x{} camera",
            env.track.num_gates(),
            env.config.camera.width,
            env.config.camera.height
        );

        if env.config.unity.render {
            env.arm()?;
        }
        Ok(env)
    }
}

/// Drone racing environment.
///
/// Owns the quadrotor, its camera and the track gates, steps the dynamics and
/// drives the renderer session. Every runtime operation reports failure as
/// `false` together with a warning.
pub struct RacingEnv {
    config: RacingConfig,
    sim_dt: f64,
    rendering_only: bool,
    dynamics: Box<dyn QuadrotorDynamics>,
    quad_state: QuadState,
    cmd: Command,
    camera: RgbCamera,
    track: Track,
    world_box: WorldBox,
    marshaller: ImageMarshaller,
    convention: FrameConvention,
    session: Session,
    bridge_factory: BridgeFactory,
}

impl RacingEnv {
    pub fn new(config: RacingConfig) -> Result<Self, SimError> {
        RacingEnvBuilder::new(config).build()
    }

    pub fn builder(config: RacingConfig) -> RacingEnvBuilder {
        RacingEnvBuilder::new(config)
    }

    pub fn from_path(path: impl AsRef<Path>, rendering_only: bool) -> Result<Self, SimError> {
        let config = RacingConfig::from_file(path)?;
        RacingEnvBuilder::new(config)
            .rendering_only(rendering_only)
            .build()
    }

    /// Load the configuration from [`crate::config::default_config_path`].
    pub fn from_default_path() -> Result<Self, SimError> {
        Self::new(RacingConfig::from_default_path()?)
    }

    /// Advance the simulation by one step.
    ///
    /// `action` is `[collective_thrust, omega_x, omega_y, omega_z]`. The
    /// state is read back from the dynamics even when the step fails.
    pub fn step(&mut self, action: &[f64]) -> bool {
        let action: &[f64; ACT_DIM] = match action.try_into() {
            Ok(action) => action,
            Err(_) => {
                warn!(
                    "Action has {} entries, expected {}",
                    action.len(),
                    ACT_DIM
                );
                return false;
            }
        };

        self.cmd.t += self.sim_dt;
        self.cmd.set_action(action);

        let result = self.dynamics.run(&self.cmd, self.sim_dt);
        self.quad_state = self.dynamics.state().clone();

        match result {
            Ok(()) => true,
            Err(e) => {
                warn!("Dynamics step failed: {}", e);
                false
            }
        }
    }

    /// Overwrite the first `num_vars` state entries and push the state to
    /// the dynamics. The rest of the state is left untouched.
    pub fn set_reduced_state(&mut self, state: &[f64], num_vars: usize) -> bool {
        if num_vars > QuadState::SIZE || num_vars > state.len() {
            warn!(
                "Cannot set {} state entries from {} values (state size {})",
                num_vars,
                state.len(),
                QuadState::SIZE
            );
            return false;
        }

        let mut next = self.quad_state.clone();
        next.x.as_mut_slice()[..num_vars].copy_from_slice(&state[..num_vars]);
        match self.dynamics.set_state(&next) {
            Ok(()) => {
                self.quad_state = next;
                true
            }
            Err(e) => {
                warn!("Dynamics rejected the state: {}", e);
                false
            }
        }
    }

    pub fn get_state(&self, out: &mut [f64]) -> bool {
        if out.len() < QuadState::SIZE {
            warn!(
                "State buffer has {} entries, expected at least {}",
                out.len(),
                QuadState::SIZE
            );
            return false;
        }
        out[..QuadState::SIZE].copy_from_slice(self.quad_state.x.as_slice());
        true
    }

    /// Observation: position, euler angles, linear velocity, body rates.
    pub fn get_obs(&self, out: &mut [f64]) -> bool {
        if out.len() < OBS_DIM {
            warn!(
                "Observation buffer has {} entries, expected at least {}",
                out.len(),
                OBS_DIM
            );
            return false;
        }
        let euler = quaternion_to_euler(&self.quad_state.attitude());
        out[0..3].copy_from_slice(self.quad_state.position().as_slice());
        out[3..6].copy_from_slice(euler.as_slice());
        out[6..9].copy_from_slice(self.quad_state.velocity().as_slice());
        out[9..12].copy_from_slice(self.quad_state.angular_velocity().as_slice());
        true
    }

    /// Back to rest at the origin with a zero command.
    pub fn reset(&mut self) {
        self.dynamics.reset();
        self.quad_state = self.dynamics.state().clone();
        self.cmd = Command::default();
        self.camera.clear();
        debug!("Environment reset");
    }

    /// Request one frame and wait for it. Only possible while connected.
    pub fn render(&mut self) -> bool {
        let view = SceneView {
            quad_id: QUAD_ID,
            quad_state: &self.quad_state,
            gates: self.track.gates(),
        };
        let bridge = match self.session.frame_bridge() {
            Ok(bridge) => bridge,
            Err(e) => {
                warn!("Rendering not available, cannot render: {}", e);
                return false;
            }
        };
        if let Err(e) = bridge.get_render(0, &view) {
            warn!("Frame request failed: {}", e);
            return false;
        }
        if let Err(e) = bridge.handle_output(&mut self.camera) {
            warn!("Frame retrieval failed: {}", e);
            return false;
        }
        true
    }

    /// Write the latest RGB frame channel-major into `out` (length 3*H*W).
    pub fn get_image(&mut self, out: &mut [u8]) -> bool {
        if let Err(e) = self.session.ensure_connected() {
            warn!("Rendering not available, cannot get images: {}", e);
            return false;
        }
        let frame = match self.camera.take_rgb() {
            Some(frame) => frame,
            None => {
                warn!("{}", RenderError::NoFrame("RGB"));
                return false;
            }
        };
        match self.marshaller.marshal_rgb(&frame, out) {
            Ok(()) => true,
            Err(e) => {
                warn!("Cannot unpack RGB frame: {}", e);
                false
            }
        }
    }

    /// Write the latest optical flow frame channel-major into `out`
    /// (length 2*H*W), in pixels with a bottom-left origin.
    pub fn get_optical_flow(&mut self, out: &mut [f32]) -> bool {
        if let Err(e) = self.session.ensure_connected() {
            warn!("Rendering not available, cannot get optical flow: {}", e);
            return false;
        }
        let frame = match self.camera.take_optical_flow() {
            Some(frame) => frame,
            None => {
                warn!("{}", RenderError::NoFrame("optical flow"));
                return false;
            }
        };
        match self.marshaller.marshal_optical_flow(&frame, out) {
            Ok(()) => true,
            Err(e) => {
                warn!("Cannot unpack optical flow: {}", e);
                false
            }
        }
    }

    pub fn set_wave_track(&mut self, on: bool) {
        self.track.set_wave_track(on);
    }

    /// Arm (`true`) or disarm (`false`) rendering.
    pub fn set_unity(&mut self, render: bool) -> bool {
        if render {
            if let Err(e) = self.arm() {
                warn!("Cannot arm rendering: {}", e);
                return false;
            }
        } else {
            self.session.disarm();
        }
        true
    }

    /// Create the bridge on first use and register the quadrotor (with its
    /// camera) followed by the gates in index order.
    fn arm(&mut self) -> Result<bool, SimError> {
        let factory = &mut self.bridge_factory;
        let vehicle = VehicleSettings::from_quadrotor(
            QUAD_ID,
            &self.quad_state,
            &self.dynamics.size(),
            &self.camera,
            &self.convention,
        );
        let gates = self.track.gates();
        let convention = &self.convention;

        let created = self.session.arm(|| {
            let mut bridge = factory();
            bridge.add_quadrotor(vehicle)?;
            for gate in gates {
                bridge.add_static_object(ObjectSettings::from_gate(gate, convention))?;
            }
            Ok(bridge)
        })?;
        if created {
            info!(
                "Renderer bridge created with {} registered gates",
                gates.len()
            );
        }
        Ok(created)
    }

    pub fn connect_unity(&mut self, pub_port: u16, sub_port: u16) -> bool {
        match self
            .session
            .connect(self.config.simulation.scene, pub_port, sub_port)
        {
            Ok(()) => true,
            Err(e) => {
                warn!("Cannot connect to renderer: {}", e);
                false
            }
        }
    }

    /// Connect on the configured ports.
    pub fn connect_unity_default(&mut self) -> bool {
        let (pub_port, sub_port) = (self.config.unity.pub_port, self.config.unity.sub_port);
        self.connect_unity(pub_port, sub_port)
    }

    pub fn disconnect_unity(&mut self) {
        match self.session.disconnect() {
            Ok(()) => {}
            Err(e @ SessionError::NeverConnected) => warn!("{}", e),
            Err(e) => warn!("Nothing to disconnect: {}", e),
        }
    }

    pub fn image_height(&self) -> usize {
        self.config.camera.height
    }

    pub fn image_width(&self) -> usize {
        self.config.camera.width
    }

    pub fn obs_dim(&self) -> usize {
        OBS_DIM
    }

    pub fn act_dim(&self) -> usize {
        ACT_DIM
    }

    pub fn sim_time_step(&self) -> f64 {
        self.sim_dt
    }

    pub fn num_gates(&self) -> usize {
        self.track.num_gates()
    }

    pub fn gates(&self) -> &[StaticGate] {
        self.track.gates()
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn camera(&self) -> &RgbCamera {
        &self.camera
    }

    pub fn quad_state(&self) -> &QuadState {
        &self.quad_state
    }

    pub fn command(&self) -> &Command {
        &self.cmd
    }

    pub fn world_box(&self) -> &WorldBox {
        &self.world_box
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn is_rendering_only(&self) -> bool {
        self.rendering_only
    }

    pub fn config(&self) -> &RacingConfig {
        &self.config
    }
}
