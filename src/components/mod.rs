mod camera;
mod gate;
mod state;

pub use camera::{PostProcessing, RgbCamera, FRAME_QUEUE_CAPACITY};
pub use gate::StaticGate;
pub use state::{Command, QuadState, StateVector, WorldBox, STATE_SIZE};
