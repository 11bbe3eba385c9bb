#![forbid(unsafe_code)]

pub mod error;

pub mod riff {
    pub mod chunk;
    pub mod codec;
    pub mod describe;
    pub mod document;
    pub mod fourcc;
}

pub mod wav {
    pub mod format;
    pub mod samples;
    pub mod view;
}

pub mod split {
    pub mod cue;
    pub mod planner;
}

pub mod domain;

// Re-exports: stable API surface
pub use error::{Result, RiffError};
pub use riff::chunk::{Chunk, DataChunk, ListChunk};
pub use riff::describe::{Detail, describe};
pub use riff::document::RiffDocument;
pub use riff::fourcc::FourCc;
pub use split::cue::{CueMetadata, CuePoint, extract};
pub use split::planner::{SplitSegment, plan, plan_split};
pub use wav::format::WavFormat;
pub use wav::view::WavView;
