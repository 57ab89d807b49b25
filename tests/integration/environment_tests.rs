use approx::assert_relative_eq;
use nalgebra::Vector3;
use pretty_assertions::assert_eq;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use racing_env::{
    components::QuadState,
    config::SceneId,
    resources::{axis_alignment, gate_world_orientation, CameraExtrinsics},
    utils::GRAVITY,
    RacingEnv, SessionState, SimError,
};

use crate::common::{
    assert_bits_eq, assert_state_finite, assert_untouched, init_test_logging, load,
    mounted_camera_track, no_render_track, write_config, NINE_GATE_TRACK, TEST_HEIGHT,
    TEST_WIDTH,
};

fn offline_env() -> RacingEnv {
    init_test_logging();
    RacingEnv::new(load(&no_render_track())).expect("environment")
}

#[test]
fn test_construction_from_file() {
    init_test_logging();
    let file = write_config(&no_render_track());
    let env = RacingEnv::from_path(file.path(), false).expect("environment");

    assert_eq!(env.num_gates(), 2);
    assert_eq!(env.image_height(), TEST_HEIGHT);
    assert_eq!(env.image_width(), TEST_WIDTH);
    assert_eq!(env.obs_dim(), 12);
    assert_eq!(env.act_dim(), 4);
    assert_eq!(env.config().simulation.scene, SceneId::Garage);
    assert_eq!(env.session_state(), SessionState::Unarmed);

    let gates = env.gates();
    assert_eq!(gates[0].id, "racing_gate_0");
    assert_eq!(gates[1].id, "racing_gate_1");
    assert_eq!(gates[1].position, Vector3::new(5.0, 0.0, 1.0));

    // Configured orientation followed by the fixed axis alignment
    let configured = env.config().track.orientations[1];
    let expected = gate_world_orientation(&configured);
    assert_relative_eq!(gates[1].orientation, expected, epsilon = 1e-12);
    assert_relative_eq!(
        gates[0].orientation,
        axis_alignment().into_inner(),
        epsilon = 1e-12
    );
}

#[test]
fn test_missing_file_is_an_error() {
    init_test_logging();
    let dir = tempfile::tempdir().expect("temp dir");
    assert!(RacingEnv::from_path(dir.path().join("absent.yaml"), false).is_err());
}

#[test]
fn test_camera_extrinsics() {
    init_test_logging();
    let env = RacingEnv::new(load(&mounted_camera_track())).expect("environment");
    let expected = CameraExtrinsics::mounted(Vector3::new(0.2, 0.0, 0.1), 30.0);
    assert_eq!(env.camera().extrinsics, expected);
    assert!(!env.is_rendering_only());

    let config = load(&mounted_camera_track());
    let env = RacingEnv::builder(config)
        .rendering_only(true)
        .build()
        .expect("environment");
    assert!(env.is_rendering_only());
    assert_eq!(env.camera().extrinsics, CameraExtrinsics::rendering_only());
    assert_eq!(env.camera().extrinsics.b_r_bc, Vector3::zeros());
}

#[test]
fn test_hover_keeps_position() {
    let mut env = offline_env();
    let hover = [GRAVITY, 0.0, 0.0, 0.0];

    for _ in 0..100 {
        assert!(env.step(&hover));
    }

    let state = env.quad_state();
    assert_state_finite(state);
    assert_relative_eq!(state.position(), Vector3::zeros(), epsilon = 1e-9);
    assert_relative_eq!(state.velocity(), Vector3::zeros(), epsilon = 1e-9);
    assert_relative_eq!(env.command().t, 100.0 * env.sim_time_step(), epsilon = 1e-9);
    assert_relative_eq!(state.t, 100.0 * env.sim_time_step(), epsilon = 1e-9);
}

#[test]
fn test_observation_layout() {
    let mut env = offline_env();
    assert!(env.step(&[GRAVITY + 1.0, 0.0, 0.0, 0.5]));

    let mut obs = [0.0; 12];
    assert!(env.get_obs(&mut obs));
    let state = env.quad_state();
    assert_eq!(&obs[0..3], state.position().as_slice());
    assert_eq!(&obs[6..9], state.velocity().as_slice());
    assert_eq!(&obs[9..12], state.angular_velocity().as_slice());
    assert!(obs[2] > 0.0, "body should climb");
    assert!(obs[5] > 0.0, "yaw should grow");

    let mut short = [0.0; 11];
    assert!(!env.get_obs(&mut short));
}

#[test]
fn test_reduced_state_preserves_tail() {
    let mut env = offline_env();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    for _ in 0..20 {
        let before = env.quad_state().clone();
        let n = rng.gen_range(0..=QuadState::REDUCED_SIZE);
        let values: Vec<f64> = (0..n).map(|_| rng.gen_range(-5.0..5.0)).collect();

        assert!(env.set_reduced_state(&values, n));

        let mut after = [0.0; QuadState::SIZE];
        assert!(env.get_state(&mut after));
        assert_bits_eq(&after[..n], &values);
        assert_bits_eq(&after[n..], &before.x.as_slice()[n..]);
    }
}

#[test]
fn test_reduced_state_rejects_bad_lengths() {
    let mut env = offline_env();
    let before = env.quad_state().clone();

    assert!(!env.set_reduced_state(&[1.0, 2.0], 3));
    assert!(!env.set_reduced_state(&[0.0; 30], 30));
    assert!(!env.set_reduced_state(&[f64::NAN], 1));
    assert_eq!(env.quad_state(), &before);
}

#[test]
fn test_bad_actions_are_rejected() {
    let mut env = offline_env();

    assert!(!env.step(&[GRAVITY, 0.0, 0.0]));
    assert!(!env.step(&[GRAVITY, 0.0, 0.0, 0.0, 0.0]));
    assert_eq!(env.command().t, 0.0);

    assert!(!env.step(&[f64::NAN, 0.0, 0.0, 0.0]));
    assert_state_finite(env.quad_state());
    assert_eq!(env.quad_state().position(), Vector3::zeros());
}

#[test]
fn test_reset_returns_to_rest() {
    let mut env = offline_env();
    for _ in 0..10 {
        assert!(env.step(&[GRAVITY + 2.0, 0.1, 0.0, 0.0]));
    }
    assert!(env.quad_state().position().z > 0.0);

    env.reset();
    assert_eq!(env.quad_state(), &QuadState::default());
    assert_eq!(env.command().t, 0.0);
    assert_eq!(env.command().collective_thrust, 0.0);
}

#[test]
fn test_dynamics_parameters_from_config() {
    init_test_logging();
    let yaml = format!("{}quadrotor_dynamics:\n  thrust_max: 5.0\n", no_render_track());
    let mut env = RacingEnv::new(load(&yaml)).expect("environment");

    // Thrust is capped below gravity, so a hover command sinks
    for _ in 0..10 {
        assert!(env.step(&[GRAVITY, 0.0, 0.0, 0.0]));
    }
    assert!(env.quad_state().velocity().z < 0.0);

    // Rendering-only environments ignore the dynamics block
    let mut env = RacingEnv::builder(load(&yaml))
        .rendering_only(true)
        .build()
        .expect("environment");
    for _ in 0..10 {
        assert!(env.step(&[GRAVITY, 0.0, 0.0, 0.0]));
    }
    assert_relative_eq!(env.quad_state().velocity().z, 0.0, epsilon = 1e-9);
}

#[test]
fn test_invalid_dynamics_parameters_fail_construction() {
    init_test_logging();
    let yaml = format!(
        "{}quadrotor_dynamics:\n  thrust_min: 30.0\n  thrust_max: 10.0\n",
        no_render_track()
    );
    assert!(RacingEnv::new(load(&yaml)).is_err());
}

#[test]
fn test_unaddressable_camera_fails_construction() {
    init_test_logging();
    let mut config = load(&no_render_track());
    config.camera.height = usize::MAX / 2;
    config.camera.width = 4;
    assert!(matches!(RacingEnv::new(config), Err(SimError::Render(_))));
}

#[test]
fn test_world_box_is_respected() {
    let mut env = offline_env();
    assert!(env.set_reduced_state(&[0.0, 0.0, -99.9], 3));
    for _ in 0..50 {
        assert!(env.step(&[0.0, 0.0, 0.0, 0.0]));
    }
    let z = env.quad_state().position().z;
    assert_relative_eq!(z, env.world_box().min().z, epsilon = 1e-9);
}

#[test]
fn test_rendering_disabled() {
    let mut env = offline_env();
    assert_eq!(env.session_state(), SessionState::Unarmed);

    let mut image = vec![7u8; 3 * TEST_HEIGHT * TEST_WIDTH];
    let mut flow = vec![-1.0f32; 2 * TEST_HEIGHT * TEST_WIDTH];

    assert!(!env.render());
    assert!(!env.get_image(&mut image));
    assert!(!env.get_optical_flow(&mut flow));
    assert!(!env.connect_unity_default());

    assert_untouched(&image, 7);
    assert_untouched(&flow, -1.0);
    assert_eq!(env.session_state(), SessionState::Unarmed);

    // Dynamics keep working without a renderer
    assert!(env.step(&[GRAVITY, 0.0, 0.0, 0.0]));
    env.disconnect_unity();
    assert_eq!(env.session_state(), SessionState::Unarmed);
}

#[test]
fn test_wave_track() {
    init_test_logging();
    let mut env = RacingEnv::new(load(NINE_GATE_TRACK)).expect("environment");
    let configured: Vec<f64> = env.gates().iter().map(|g| g.position.z).collect();
    assert_eq!(env.track().elevated_gates(), &[2, 3, 6, 7]);

    env.set_wave_track(true);
    assert!(env.track().is_wave_track());
    for (i, gate) in env.gates().iter().enumerate() {
        let lift = if [2, 3, 6, 7].contains(&i) { 3.0 } else { 0.0 };
        assert_relative_eq!(gate.position.z, configured[i] + lift, epsilon = 1e-12);
    }

    // Toggling is idempotent and reversible
    env.set_wave_track(true);
    assert_relative_eq!(env.gates()[2].position.z, configured[2] + 3.0, epsilon = 1e-12);
    env.set_wave_track(false);
    let restored: Vec<f64> = env.gates().iter().map(|g| g.position.z).collect();
    assert_eq!(restored, configured);
}
