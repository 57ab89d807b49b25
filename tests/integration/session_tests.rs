use pretty_assertions::assert_eq;
use racing_env::{
    environment::{CAMERA_ID, QUAD_ID},
    utils::{GRAVITY, QUAD_SIZE},
    RacingEnv, SessionState,
};

use crate::common::{
    assert_untouched, extrema, init_test_logging, load, mock_factory, no_render_track,
    BridgeCall, BridgeLog, MockOptions, TEST_HEIGHT, TEST_WIDTH, TWO_GATE_TRACK,
};

const PUB_PORT: u16 = 20253;
const SUB_PORT: u16 = 20254;

fn mocked_env(yaml: &str, options: MockOptions) -> (RacingEnv, BridgeLog) {
    init_test_logging();
    let log = BridgeLog::default();
    let env = RacingEnv::builder(load(yaml))
        .bridge_factory(mock_factory(&log, options))
        .build()
        .expect("environment");
    (env, log)
}

fn connected_env(options: MockOptions) -> (RacingEnv, BridgeLog) {
    let (mut env, log) = mocked_env(TWO_GATE_TRACK, options);
    assert!(env.connect_unity(PUB_PORT, SUB_PORT));
    (env, log)
}

fn image_buffer() -> Vec<u8> {
    vec![0u8; 3 * TEST_HEIGHT * TEST_WIDTH]
}

fn flow_buffer() -> Vec<f32> {
    vec![0.0f32; 2 * TEST_HEIGHT * TEST_WIDTH]
}

#[test]
fn test_objects_registered_before_connect() {
    let (mut env, log) = mocked_env(TWO_GATE_TRACK, MockOptions::default());
    assert_eq!(env.session_state(), SessionState::Armed);
    assert_eq!(log.bridges_created(), 1);

    assert!(env.connect_unity(PUB_PORT, SUB_PORT));
    assert_eq!(env.session_state(), SessionState::Connected);

    assert_eq!(
        log.calls(),
        vec![
            BridgeCall::AddQuadrotor {
                id: QUAD_ID.to_string(),
                size: [QUAD_SIZE as f32; 3],
                cameras: 1,
            },
            BridgeCall::AddStaticObject {
                id: "racing_gate_0".to_string(),
                prefab: "rpg_gate".to_string(),
            },
            BridgeCall::AddStaticObject {
                id: "racing_gate_1".to_string(),
                prefab: "rpg_gate".to_string(),
            },
            BridgeCall::Connect {
                scene: 2,
                pub_port: PUB_PORT,
                sub_port: SUB_PORT,
            },
        ]
    );
    assert_eq!(env.camera().id, CAMERA_ID);
}

#[test]
fn test_rendering_only_registers_zero_size_body() {
    init_test_logging();
    let log = BridgeLog::default();
    let _env = RacingEnv::builder(load(TWO_GATE_TRACK))
        .rendering_only(true)
        .bridge_factory(mock_factory(&log, MockOptions::default()))
        .build()
        .expect("environment");

    assert!(matches!(
        log.calls().first(),
        Some(BridgeCall::AddQuadrotor { size, .. }) if *size == [0.0; 3]
    ));
}

#[test]
fn test_no_frames_before_connect() {
    let (mut env, log) = mocked_env(TWO_GATE_TRACK, MockOptions::default());
    let mut image = vec![9u8; 3 * TEST_HEIGHT * TEST_WIDTH];

    assert!(!env.render());
    assert!(!env.get_image(&mut image));
    assert_untouched(&image, 9);
    assert_eq!(
        log.count(|c| matches!(c, BridgeCall::GetRender { .. })),
        0
    );
}

#[test]
fn test_render_and_unpack_image() {
    let (mut env, log) = connected_env(MockOptions::default());
    assert!(env.step(&[GRAVITY, 0.0, 0.0, 0.0]));
    assert!(env.render());
    assert_eq!(log.count(|c| *c == BridgeCall::HandleOutput), 1);

    let mut image = image_buffer();
    assert!(env.get_image(&mut image));

    let plane = TEST_HEIGHT * TEST_WIDTH;
    for row in 0..TEST_HEIGHT {
        for col in 0..TEST_WIDTH {
            let idx = row * TEST_WIDTH + col;
            assert_eq!(image[idx], col as u8, "red at ({row}, {col})");
            assert_eq!(image[plane + idx], row as u8, "green at ({row}, {col})");
            assert_eq!(image[2 * plane + idx], 1, "blue at ({row}, {col})");
        }
    }

    // The frame was consumed
    let mut again = vec![42u8; 3 * plane];
    assert!(!env.get_image(&mut again));
    assert_untouched(&again, 42);
}

#[test]
fn test_render_and_unpack_optical_flow() {
    let (mut env, _log) = connected_env(MockOptions::default());
    assert!(env.render());

    let mut flow = flow_buffer();
    assert!(env.get_optical_flow(&mut flow));

    let plane = TEST_HEIGHT * TEST_WIDTH;
    let (dx_min, dx_max) = extrema(&flow[..plane]);
    let (dy_min, dy_max) = extrema(&flow[plane..]);
    assert_eq!((dx_min, dx_max), (-0.5 * TEST_WIDTH as f32, 0.5 * TEST_WIDTH as f32));
    assert_eq!((dy_min, dy_max), (-0.5 * TEST_HEIGHT as f32, 0.5 * TEST_HEIGHT as f32));

    // Left half flows right; the vertical axis points up
    assert_eq!(flow[0], 0.5 * TEST_WIDTH as f32);
    assert_eq!(flow[plane], 0.5 * TEST_HEIGHT as f32);
}

#[test]
fn test_flow_channel_mismatch_leaves_buffer() {
    let options = MockOptions {
        flow_channels: 3,
        ..MockOptions::default()
    };
    let (mut env, _log) = connected_env(options);
    assert!(env.render());

    let mut flow = vec![-2.0f32; 2 * TEST_HEIGHT * TEST_WIDTH];
    assert!(!env.get_optical_flow(&mut flow));
    assert_untouched(&flow, -2.0);

    // RGB from the same render is still fine
    let mut image = image_buffer();
    assert!(env.get_image(&mut image));
}

#[test]
fn test_wrong_buffer_length() {
    let (mut env, _log) = connected_env(MockOptions::default());
    assert!(env.render());

    let mut short = vec![5u8; 3 * TEST_HEIGHT * TEST_WIDTH - 1];
    assert!(!env.get_image(&mut short));
    assert_untouched(&short, 5);
}

#[test]
fn test_render_carries_wave_track() {
    let (mut env, log) = connected_env(MockOptions::default());
    assert!(env.render());
    env.set_wave_track(true);
    assert!(env.render());

    let gate_z: Vec<Vec<f64>> = log
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            BridgeCall::GetRender { env_idx, gate_z } => {
                assert_eq!(env_idx, 0);
                Some(gate_z)
            }
            _ => None,
        })
        .collect();
    // Only two gates exist, so nothing in the default wave subset is raised
    assert_eq!(gate_z, vec![vec![1.0, 1.0], vec![1.0, 1.0]]);
}

#[test]
fn test_disconnect_and_rearm_reuses_bridge() {
    let (mut env, log) = connected_env(MockOptions::default());

    env.disconnect_unity();
    assert_eq!(env.session_state(), SessionState::Disconnected);
    assert!(!env.render());
    assert!(!env.connect_unity(PUB_PORT, SUB_PORT));

    assert!(env.set_unity(true));
    assert_eq!(env.session_state(), SessionState::Armed);
    assert!(env.connect_unity(PUB_PORT, SUB_PORT));
    assert!(env.render());

    assert_eq!(log.bridges_created(), 1);
    assert_eq!(
        log.count(|c| matches!(c, BridgeCall::AddStaticObject { .. })),
        2
    );
    assert_eq!(
        log.count(|c| matches!(c, BridgeCall::AddQuadrotor { .. })),
        1
    );
    assert_eq!(log.count(|c| *c == BridgeCall::Disconnect), 1);
    assert_eq!(
        log.count(|c| matches!(c, BridgeCall::Connect { .. })),
        2
    );
}

#[test]
fn test_refused_connect_stays_armed() {
    let options = MockOptions {
        refuse_connect: true,
        ..MockOptions::default()
    };
    let (mut env, log) = mocked_env(TWO_GATE_TRACK, options);

    assert!(!env.connect_unity(PUB_PORT, SUB_PORT));
    assert_eq!(env.session_state(), SessionState::Armed);
    assert!(!env.connect_unity_default());
    assert_eq!(
        log.count(|c| matches!(c, BridgeCall::Connect { .. })),
        2
    );
    assert!(!env.render());
}

#[test]
fn test_set_unity_toggles_session() {
    let (mut env, log) = mocked_env(&no_render_track(), MockOptions::default());
    assert_eq!(env.session_state(), SessionState::Unarmed);
    assert_eq!(log.bridges_created(), 0);

    assert!(env.set_unity(true));
    assert_eq!(env.session_state(), SessionState::Armed);
    assert!(env.set_unity(true));
    assert_eq!(log.bridges_created(), 1);

    assert!(env.connect_unity(PUB_PORT, SUB_PORT));
    assert!(env.set_unity(false));
    assert_eq!(env.session_state(), SessionState::Disconnected);
    assert_eq!(log.count(|c| *c == BridgeCall::Disconnect), 1);

    let mut image = image_buffer();
    assert!(!env.get_image(&mut image));
}

#[test]
fn test_disarm_before_connect() {
    let (mut env, log) = mocked_env(TWO_GATE_TRACK, MockOptions::default());

    env.disconnect_unity();
    assert_eq!(env.session_state(), SessionState::Disconnected);
    assert_eq!(log.count(|c| *c == BridgeCall::Disconnect), 0);

    assert!(env.set_unity(true));
    assert!(env.connect_unity_default());
    assert_eq!(
        log.calls().last(),
        Some(&BridgeCall::Connect {
            scene: 2,
            pub_port: 10253,
            sub_port: 10254,
        })
    );
}

#[test]
fn test_reset_drops_pending_frames() {
    let (mut env, _log) = connected_env(MockOptions::default());
    assert!(env.render());
    assert_eq!(env.camera().pending_rgb(), 1);

    env.reset();
    assert_eq!(env.camera().pending_rgb(), 0);
    let mut image = image_buffer();
    assert!(!env.get_image(&mut image));
}
