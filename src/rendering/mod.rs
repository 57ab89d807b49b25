mod error;
mod marshaller;
mod types;

pub use error::RenderError;
pub use marshaller::ImageMarshaller;
pub use types::*;
