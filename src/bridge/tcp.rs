use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::bridge::messages::{decode_optical_flow, decode_rgb, render_request};
use crate::bridge::{
    BridgeError, ObjectSettings, RenderBridge, Reply, Request, SceneView, VehicleSettings,
};
use crate::components::RgbCamera;
use crate::config::{SceneId, UnityConfig};
use crate::resources::FrameConvention;

const CONNECT_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Renderer bridge speaking newline-delimited JSON over two TCP streams.
///
/// Requests go out on the publish port; replies come back on the subscribe
/// port and are decoded by a reader thread that hands them over a channel.
pub struct TcpBridge {
    host: String,
    connect_timeout: Duration,
    reply_timeout: Duration,
    convention: FrameConvention,
    vehicles: Vec<VehicleSettings>,
    objects: Vec<ObjectSettings>,
    link: Option<Link>,
    last_frame_id: u64,
    outstanding: Option<u64>,
}

struct Link {
    writer: BufWriter<TcpStream>,
    reader_stream: TcpStream,
    replies: Receiver<Result<Reply, BridgeError>>,
    reader: Option<JoinHandle<()>>,
}

impl TcpBridge {
    pub fn new(host: impl Into<String>, connect_timeout: Duration, reply_timeout: Duration) -> Self {
        Self {
            host: host.into(),
            connect_timeout,
            reply_timeout,
            convention: FrameConvention::default(),
            vehicles: Vec::new(),
            objects: Vec::new(),
            link: None,
            last_frame_id: 0,
            outstanding: None,
        }
    }

    /// Bridge to a renderer on the local machine.
    pub fn local(config: &UnityConfig) -> Self {
        Self::new("127.0.0.1", config.connect_timeout, config.reply_timeout)
    }

    pub fn vehicles(&self) -> &[VehicleSettings] {
        &self.vehicles
    }

    pub fn objects(&self) -> &[ObjectSettings] {
        &self.objects
    }

    fn resolve(&self, port: u16) -> Result<SocketAddr, BridgeError> {
        (self.host.as_str(), port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| BridgeError::Protocol(format!("cannot resolve {}:{}", self.host, port)))
    }

    /// Keep trying until the renderer accepts or the connect timeout expires.
    fn connect_stream(&self, port: u16, deadline: Instant) -> Result<TcpStream, BridgeError> {
        let addr = self.resolve(port)?;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(BridgeError::Timeout(self.connect_timeout));
            }
            match TcpStream::connect_timeout(&addr, remaining) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    return Ok(stream);
                }
                Err(e) => {
                    debug!("Renderer not reachable on {}: {}", addr, e);
                    thread::sleep(CONNECT_RETRY_INTERVAL.min(remaining));
                }
            }
        }
    }

    fn open_link(&self, pub_port: u16, sub_port: u16) -> Result<Link, BridgeError> {
        let deadline = Instant::now() + self.connect_timeout;
        let pub_stream = self.connect_stream(pub_port, deadline)?;
        let sub_stream = self.connect_stream(sub_port, deadline)?;

        let reader_stream = sub_stream.try_clone()?;
        let (sender, replies) = crossbeam_channel::unbounded::<Result<Reply, BridgeError>>();
        let reader = thread::Builder::new()
            .name("renderer-reader".into())
            .spawn(move || {
                let mut lines = BufReader::new(sub_stream);
                let mut line = String::new();
                loop {
                    line.clear();
                    let message: Result<Reply, BridgeError> = match lines.read_line(&mut line) {
                        Ok(0) => break,
                        Ok(_) => serde_json::from_str::<Reply>(line.trim_end()).map_err(Into::into),
                        Err(e) => Err(e.into()),
                    };
                    let failed = message.is_err();
                    if sender.send(message).is_err() || failed {
                        break;
                    }
                }
            })?;

        Ok(Link {
            writer: BufWriter::new(pub_stream),
            reader_stream,
            replies,
            reader: Some(reader),
        })
    }

    fn send(&mut self, request: &Request) -> Result<(), BridgeError> {
        let link = self.link.as_mut().ok_or(BridgeError::NotConnected)?;
        serde_json::to_writer(&mut link.writer, request)?;
        link.writer.write_all(b"\n")?;
        link.writer.flush()?;
        Ok(())
    }

    fn receive(&self, deadline: Instant) -> Result<Reply, BridgeError> {
        let link = self.link.as_ref().ok_or(BridgeError::NotConnected)?;
        let remaining = deadline.saturating_duration_since(Instant::now());
        match link.replies.recv_timeout(remaining) {
            Ok(reply) => reply,
            Err(RecvTimeoutError::Timeout) => Err(BridgeError::Timeout(self.reply_timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(BridgeError::Protocol(
                "renderer closed the connection".into(),
            )),
        }
    }

    fn handshake(&mut self, scene: SceneId) -> Result<(), BridgeError> {
        let settings = Request::Settings {
            scene_id: scene.index(),
            vehicles: self.vehicles.clone(),
            objects: self.objects.clone(),
        };
        self.send(&settings)?;
        match self.receive(Instant::now() + self.reply_timeout)? {
            Reply::Ready { scene_id } if scene_id == scene.index() => Ok(()),
            Reply::Ready { scene_id } => Err(BridgeError::Protocol(format!(
                "renderer loaded scene {} instead of {}",
                scene_id,
                scene.index()
            ))),
            Reply::Error { message } => Err(BridgeError::Remote(message)),
            other => Err(BridgeError::Protocol(format!(
                "expected Ready, got {:?}",
                other
            ))),
        }
    }

    fn close_link(&mut self) {
        if let Some(mut link) = self.link.take() {
            let _ = link.reader_stream.shutdown(Shutdown::Both);
            let _ = link.writer.get_ref().shutdown(Shutdown::Both);
            if let Some(reader) = link.reader.take() {
                if reader.join().is_err() {
                    warn!("Renderer reader thread panicked");
                }
            }
        }
        self.outstanding = None;
    }
}

impl RenderBridge for TcpBridge {
    fn add_quadrotor(&mut self, vehicle: VehicleSettings) -> Result<(), BridgeError> {
        if self.link.is_some() {
            return Err(BridgeError::Protocol(
                "objects must be registered before connecting".into(),
            ));
        }
        self.vehicles.push(vehicle);
        Ok(())
    }

    fn add_static_object(&mut self, object: ObjectSettings) -> Result<(), BridgeError> {
        if self.link.is_some() {
            return Err(BridgeError::Protocol(
                "objects must be registered before connecting".into(),
            ));
        }
        self.objects.push(object);
        Ok(())
    }

    fn connect_unity(
        &mut self,
        scene: SceneId,
        pub_port: u16,
        sub_port: u16,
    ) -> Result<(), BridgeError> {
        if self.link.is_some() {
            return Ok(());
        }
        info!(
            "Connecting to renderer on {} (pub {}, sub {})",
            self.host, pub_port, sub_port
        );
        self.link = Some(self.open_link(pub_port, sub_port)?);
        if let Err(e) = self.handshake(scene) {
            self.close_link();
            return Err(e);
        }
        info!("Renderer ready with scene {:?}", scene);
        Ok(())
    }

    fn get_render(&mut self, env_idx: usize, view: &SceneView<'_>) -> Result<u64, BridgeError> {
        if self.link.is_none() {
            return Err(BridgeError::NotConnected);
        }
        if let Some(frame_id) = self.outstanding {
            return Err(BridgeError::RequestOutstanding(frame_id));
        }
        let frame_id = self.last_frame_id + 1;
        let request = render_request(frame_id, env_idx, view, &self.convention);
        self.send(&request)?;
        self.last_frame_id = frame_id;
        self.outstanding = Some(frame_id);
        Ok(frame_id)
    }

    fn handle_output(&mut self, camera: &mut RgbCamera) -> Result<(), BridgeError> {
        let expected = self.outstanding.take().ok_or(BridgeError::NoRequest)?;
        let deadline = Instant::now() + self.reply_timeout;
        loop {
            match self.receive(deadline)? {
                // Late replies to requests that already timed out
                Reply::Frame { frame_id, .. } if frame_id < expected => {
                    debug!("Dropping stale frame {}", frame_id);
                }
                Reply::Frame { frame_id, sensors } if frame_id == expected => {
                    // Decode everything first so a bad payload leaves the camera untouched
                    let camera_id = camera.id.clone();
                    let mut decoded = Vec::new();
                    for sensor in sensors.iter().filter(|s| s.camera_id == camera_id) {
                        if sensor.height != camera.height || sensor.width != camera.width {
                            return Err(BridgeError::Decode(format!(
                                "camera {} sent a {}x{} frame, expected {}x{}",
                                camera_id, sensor.width, sensor.height, camera.width, camera.height
                            )));
                        }
                        let rgb = sensor.rgb.as_deref().map(decode_rgb).transpose()?;
                        let flow = sensor
                            .optical_flow
                            .as_deref()
                            .map(|flow| decode_optical_flow(flow, sensor.height, sensor.width))
                            .transpose()?;
                        decoded.push((rgb, flow));
                    }
                    for (rgb, flow) in decoded {
                        if let Some(rgb) = rgb {
                            camera.feed_rgb(rgb);
                        }
                        if let Some(flow) = flow {
                            camera.feed_optical_flow(flow);
                        }
                    }
                    return Ok(());
                }
                Reply::Error { message } => return Err(BridgeError::Remote(message)),
                other => {
                    return Err(BridgeError::Protocol(format!(
                        "expected frame {}, got {:?}",
                        expected, other
                    )))
                }
            }
        }
    }

    fn disconnect_unity(&mut self) {
        if self.link.is_none() {
            return;
        }
        if let Err(e) = self.send(&Request::Disconnect) {
            debug!("Renderer already gone: {}", e);
        }
        self.close_link();
        info!("Disconnected from renderer");
    }

    fn is_connected(&self) -> bool {
        self.link.is_some()
    }
}

impl Drop for TcpBridge {
    fn drop(&mut self) {
        self.disconnect_unity();
    }
}
