pub mod origin;
pub mod outline;
pub mod pipeline;
pub mod references;
pub mod wireframe;

pub mod errors {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum EngineError {
        #[error("no usable shapes on outline layer `{layer}`")]
        EmptyGeometry { layer: String },
        #[error("invalid reference filter `{pattern}` at byte {position}: {reason}")]
        InvalidPattern {
            pattern: String,
            position: usize,
            reason: String,
        },
        #[error("unknown corner `{0}` (expected tl, tr, bl, br or top-left style names)")]
        UnknownCorner(String),
        #[error("unknown wireframe preset `{0}`")]
        UnknownPreset(String),
    }
}

pub use errors::EngineError;
pub use origin::{Corner, OriginRequest};
pub use pipeline::{FilterConfig, Side, filter_board};
pub use references::ReferenceFilter;
