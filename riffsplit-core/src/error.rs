use std::path::PathBuf;

use thiserror::Error;

use crate::riff::fourcc::FourCc;

#[derive(Error, Debug)]
pub enum RiffError {
    #[error("invalid identifier {0:?}: must be exactly four ASCII bytes")]
    InvalidIdentifier(String),

    #[error("not a RIFF file: first four bytes were {0}")]
    NotARiffFile(FourCc),

    #[error("not a WAVE file: root form type is {0}")]
    NotAWaveFile(FourCc),

    #[error("missing required chunk {0}")]
    MissingChunk(FourCc),

    /// Truncated or otherwise structurally malformed input.
    #[error("truncated or malformed input: {0}")]
    Malformed(String),

    #[error("malformed sample data: {0}")]
    MalformedSampleData(String),

    #[error("malformed cue chunk: {declared} cue points declared, only {available} payload bytes")]
    MalformedCueChunk { declared: u32, available: usize },

    #[error("channel {channel} out of range for {channels} channel(s)")]
    ChannelOutOfRange { channel: u16, channels: u16 },

    #[error("sample index {index} out of range for {len} sample(s)")]
    SampleOutOfRange { index: usize, len: usize },

    #[error("chunk {id} too large for a 32-bit size field: {size} bytes")]
    ChunkTooLarge { id: FourCc, size: u64 },

    #[error("no file path set")]
    NoFilePathSet,

    #[error("I/O error on {}: {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RiffError {
    pub(crate) fn file_io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| RiffError::FileIo { path, source }
    }
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, RiffError>;
