pub mod constants;
pub mod errors;
pub mod logging;
pub mod math;

pub use constants::*;
pub use errors::*;
pub use logging::init_logging;
pub use math::*;
