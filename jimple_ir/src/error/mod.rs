pub mod body;
pub mod conversion;
pub mod pipeline;

pub use body::BodyError;
pub use conversion::{ConversionError, ConversionErrorKind};
pub use pipeline::PipelineError;
