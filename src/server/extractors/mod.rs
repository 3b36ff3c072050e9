mod configured_extractor;
mod validation_extractor;

pub use configured_extractor::*;
pub use validation_extractor::*;
