use std::fmt;
use thiserror::Error;

use crate::bridge::{BridgeError, RenderBridge};
use crate::config::SceneId;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("Rendering is not armed")]
    NotArmed,
    #[error("Renderer is not connected")]
    NotConnected,
    #[error("Renderer bridge is not initialized")]
    BridgeMissing,
    /// Disconnect from `Armed`: nothing was open, but the session is disarmed anyway
    #[error("Renderer was never connected, rendering disarmed")]
    NeverConnected,
}

/// Observable phase of the renderer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No bridge has been created yet
    Unarmed,
    /// Bridge exists with all objects registered, not connected
    Armed,
    /// Frame requests are allowed
    Connected,
    /// Torn down; the bridge and its registrations are kept for a re-arm
    Disconnected,
}

/// Renderer session lifecycle.
///
/// The bridge lives inside the states that have one, so a frame request in
/// any state but `Connected` has nothing to talk to.
#[derive(Default)]
pub enum Session {
    #[default]
    Unarmed,
    Armed(Box<dyn RenderBridge>),
    Connected(Box<dyn RenderBridge>),
    Disconnected(Box<dyn RenderBridge>),
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session::{:?}", self.state())
    }
}

impl Session {
    pub fn state(&self) -> SessionState {
        match self {
            Session::Unarmed => SessionState::Unarmed,
            Session::Armed(_) => SessionState::Armed,
            Session::Connected(_) => SessionState::Connected,
            Session::Disconnected(_) => SessionState::Disconnected,
        }
    }

    /// Arm rendering.
    ///
    /// `create` runs only on the very first arm and must return a bridge with
    /// every object already registered. A disconnected session re-arms with
    /// its existing bridge. Returns whether a bridge was created.
    pub fn arm<F>(&mut self, create: F) -> Result<bool, BridgeError>
    where
        F: FnOnce() -> Result<Box<dyn RenderBridge>, BridgeError>,
    {
        match std::mem::take(self) {
            Session::Unarmed => {
                *self = Session::Armed(create()?);
                Ok(true)
            }
            Session::Disconnected(bridge) => {
                *self = Session::Armed(bridge);
                Ok(false)
            }
            armed_or_connected => {
                *self = armed_or_connected;
                Ok(false)
            }
        }
    }

    /// Stop rendering, closing the connection if there is one.
    pub fn disarm(&mut self) {
        *self = match std::mem::take(self) {
            Session::Armed(bridge) => Session::Disconnected(bridge),
            Session::Connected(mut bridge) => {
                bridge.disconnect_unity();
                Session::Disconnected(bridge)
            }
            other => other,
        };
    }

    /// Connect an armed session. A failed attempt leaves the session armed.
    pub fn connect(
        &mut self,
        scene: SceneId,
        pub_port: u16,
        sub_port: u16,
    ) -> Result<(), ConnectError> {
        match std::mem::take(self) {
            Session::Armed(mut bridge) => match bridge.connect_unity(scene, pub_port, sub_port) {
                Ok(()) => {
                    *self = Session::Connected(bridge);
                    Ok(())
                }
                Err(e) => {
                    *self = Session::Armed(bridge);
                    Err(e.into())
                }
            },
            Session::Connected(bridge) => {
                *self = Session::Connected(bridge);
                Ok(())
            }
            Session::Unarmed => Err(SessionError::BridgeMissing.into()),
            Session::Disconnected(bridge) => {
                *self = Session::Disconnected(bridge);
                Err(SessionError::NotArmed.into())
            }
        }
    }

    /// Tear the connection down.
    ///
    /// An armed but unconnected session still moves to `Disconnected`; the
    /// returned error only reports that there was nothing to close.
    pub fn disconnect(&mut self) -> Result<(), SessionError> {
        let (next, result) = match std::mem::take(self) {
            Session::Connected(mut bridge) => {
                bridge.disconnect_unity();
                (Session::Disconnected(bridge), Ok(()))
            }
            Session::Armed(bridge) => (
                Session::Disconnected(bridge),
                Err(SessionError::NeverConnected),
            ),
            Session::Unarmed => (Session::Unarmed, Err(SessionError::BridgeMissing)),
            Session::Disconnected(bridge) => (
                Session::Disconnected(bridge),
                Err(SessionError::NotConnected),
            ),
        };
        *self = next;
        result
    }

    pub fn ensure_connected(&self) -> Result<(), SessionError> {
        match self {
            Session::Connected(_) => Ok(()),
            Session::Armed(_) => Err(SessionError::NotConnected),
            Session::Unarmed | Session::Disconnected(_) => Err(SessionError::NotArmed),
        }
    }

    /// The bridge, but only when frames may be requested.
    pub fn frame_bridge(&mut self) -> Result<&mut dyn RenderBridge, SessionError> {
        match self {
            Session::Connected(bridge) => Ok(bridge.as_mut()),
            Session::Armed(_) => Err(SessionError::NotConnected),
            Session::Disconnected(_) => Err(SessionError::NotArmed),
            Session::Unarmed => Err(SessionError::NotArmed),
        }
    }
}

/// Why `Session::connect` failed.
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}
