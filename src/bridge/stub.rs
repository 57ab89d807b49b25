use std::io::{BufRead, BufReader, BufWriter, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

use crate::bridge::messages::{encode_optical_flow, encode_rgb, LAYER_OPTICAL_FLOW};
use crate::bridge::{BridgeError, CameraSettings, Reply, Request, SensorOutput};
use crate::rendering::{FlowFrame, RgbFrame};
use crate::utils::FLOW_CHANNELS;

/// Stand-in for the real renderer that answers with synthetic frames.
///
/// RGB is a gradient (`r = col`, `g = row`, `b = frame_id`, all mod 256).
/// Optical flow has `dx = +0.5` on the left half of the image, `-0.5` on the
/// right half, and `dy = -dx`.
pub struct StubRenderer {
    pub_listener: TcpListener,
    sub_listener: TcpListener,
}

impl StubRenderer {
    /// Bind both ports. Port 0 picks a free port, see [`Self::local_ports`].
    pub fn bind(host: &str, pub_port: u16, sub_port: u16) -> Result<Self, BridgeError> {
        let pub_listener = TcpListener::bind((host, pub_port))?;
        let sub_listener = TcpListener::bind((host, sub_port))?;
        Ok(Self {
            pub_listener,
            sub_listener,
        })
    }

    /// (publish, subscribe) ports actually bound
    pub fn local_ports(&self) -> Result<(u16, u16), BridgeError> {
        Ok((
            self.pub_listener.local_addr()?.port(),
            self.sub_listener.local_addr()?.port(),
        ))
    }

    /// Serve `sessions` client sessions one after another, or forever when
    /// `None`.
    pub fn run(&self, sessions: Option<usize>) -> Result<(), BridgeError> {
        let mut served = 0;
        while sessions.map_or(true, |n| served < n) {
            let (requests, peer) = self.pub_listener.accept()?;
            let (replies, _) = self.sub_listener.accept()?;
            info!("Stub renderer session {} with {}", served, peer);
            if let Err(e) = serve_session(requests, replies) {
                warn!("Session with {} ended with error: {}", peer, e);
            }
            served += 1;
        }
        Ok(())
    }

    /// Serve on a background thread.
    pub fn spawn(self, sessions: Option<usize>) -> JoinHandle<Result<(), BridgeError>> {
        thread::spawn(move || self.run(sessions))
    }
}

fn serve_session(requests: TcpStream, replies: TcpStream) -> Result<(), BridgeError> {
    let mut reader = BufReader::new(requests);
    let mut writer = BufWriter::new(replies);
    let mut cameras: Option<Vec<CameraSettings>> = None;
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            debug!("Client closed the session");
            return Ok(());
        }
        let reply = match serde_json::from_str::<Request>(line.trim_end()) {
            Ok(Request::Settings {
                scene_id,
                vehicles,
                objects,
            }) => {
                debug!(
                    "Loading scene {} with {} vehicles and {} objects",
                    scene_id,
                    vehicles.len(),
                    objects.len()
                );
                cameras = Some(vehicles.into_iter().flat_map(|v| v.cameras).collect());
                Reply::Ready { scene_id }
            }
            Ok(Request::Render { frame_id, .. }) => match &cameras {
                Some(cameras) => Reply::Frame {
                    frame_id,
                    sensors: cameras
                        .iter()
                        .map(|camera| render_camera(camera, frame_id))
                        .collect::<Result<Vec<_>, BridgeError>>()?,
                },
                None => Reply::Error {
                    message: "render requested before settings".into(),
                },
            },
            Ok(Request::Disconnect) => {
                debug!("Client disconnected");
                return Ok(());
            }
            Err(e) => Reply::Error {
                message: format!("malformed request: {e}"),
            },
        };
        serde_json::to_writer(&mut writer, &reply)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
}

fn render_camera(camera: &CameraSettings, frame_id: u64) -> Result<SensorOutput, BridgeError> {
    let rgb = RgbFrame::from_fn(camera.height, camera.width, 3, |row, col, channel| {
        match channel {
            0 => (col % 256) as u8,
            1 => (row % 256) as u8,
            _ => (frame_id % 256) as u8,
        }
    });
    let optical_flow = if camera.wants(LAYER_OPTICAL_FLOW) {
        Some(encode_optical_flow(&synthetic_flow(camera.height, camera.width)))
    } else {
        None
    };
    Ok(SensorOutput {
        camera_id: camera.id.clone(),
        height: camera.height,
        width: camera.width,
        rgb: Some(encode_rgb(&rgb)?),
        optical_flow,
    })
}

pub fn synthetic_flow(height: usize, width: usize) -> FlowFrame {
    FlowFrame::from_fn(height, width, FLOW_CHANNELS, |_, col, channel| {
        let dx = if col < width / 2 { 0.5 } else { -0.5 };
        if channel == 0 {
            dx
        } else {
            -dx
        }
    })
}
