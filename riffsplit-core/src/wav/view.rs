use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::format::WavFormat;
use super::samples;
use crate::error::{Result, RiffError};
use crate::riff::chunk::{DataChunk, ListChunk};
use crate::riff::document::RiffDocument;
use crate::riff::fourcc::{DATA, FMT, FourCc, RIFF, WAVE};

/// A RIFF document interpreted as WAVE audio: its header and decoded sample buffer.
///
/// `format` and `samples` are the working state; [`synchronize`](Self::synchronize)
/// copies them back into the `fmt ` and `data` chunk bytes, and every write does so first.
#[derive(Clone, Debug)]
pub struct WavView {
    document: RiffDocument,
    format: WavFormat,
    samples: Vec<u64>,
}

impl Default for WavView {
    fn default() -> Self {
        Self::new()
    }
}

fn data_chunk(doc: &RiffDocument, id: FourCc) -> Result<&DataChunk> {
    doc.find_first(id)
        .and_then(|c| c.as_data())
        .ok_or(RiffError::MissingChunk(id))
}

fn data_chunk_mut(doc: &mut RiffDocument, id: FourCc) -> Result<&mut DataChunk> {
    doc.find_first_mut(id)
        .and_then(|c| c.as_data_mut())
        .ok_or(RiffError::MissingChunk(id))
}

impl WavView {
    /// An empty WAVE with a default header and no samples.
    pub fn new() -> Self {
        let format = WavFormat::default();
        let root = ListChunk::with_id(RIFF, WAVE)
            .with_child(DataChunk::new(FMT, format.encode_base().to_vec()))
            .with_child(DataChunk::new(DATA, Vec::new()));
        Self {
            document: RiffDocument::from_root(root),
            format,
            samples: Vec::new(),
        }
    }

    /// Build a WAVE holding a copy of `format` and the given raw sample bytes.
    pub fn from_parts(format: &WavFormat, sample_bytes: &[u8]) -> Result<Self> {
        let mut format = format.clone();
        format.refresh_derived();
        let root = ListChunk::with_id(RIFF, WAVE)
            .with_child(DataChunk::new(FMT, format.encode()?))
            .with_child(DataChunk::new(DATA, sample_bytes.to_vec()));
        Self::from_document(RiffDocument::from_root(root))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_document(RiffDocument::open(path)?)
    }

    /// Interpret `document` as WAVE, decoding its header and samples.
    pub fn from_document(document: RiffDocument) -> Result<Self> {
        if document.form_type() != WAVE {
            return Err(RiffError::NotAWaveFile(document.form_type()));
        }
        let format = WavFormat::decode(data_chunk(&document, FMT)?.payload())?;
        if format.num_channels == 0 {
            return Err(RiffError::MalformedSampleData(
                "header declares zero channels".into(),
            ));
        }
        let samples = samples::decode(
            data_chunk(&document, DATA)?.payload(),
            format.bits_per_sample,
        )?;
        if samples.len() % usize::from(format.num_channels) != 0 {
            return Err(RiffError::MalformedSampleData(format!(
                "{} samples do not fill whole frames of {} channels",
                samples.len(),
                format.num_channels
            )));
        }
        debug!(
            channels = format.num_channels,
            bits = format.bits_per_sample,
            samples = samples.len(),
            "loaded WAVE"
        );
        Ok(Self {
            document,
            format,
            samples,
        })
    }

    pub fn format(&self) -> &WavFormat {
        &self.format
    }

    pub fn format_mut(&mut self) -> &mut WavFormat {
        &mut self.format
    }

    pub fn samples(&self) -> &[u64] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut Vec<u64> {
        &mut self.samples
    }

    pub fn set_samples(&mut self, samples: Vec<u64>) {
        self.samples = samples;
    }

    /// Drop every sample and flush the empty buffer into the `data` chunk.
    pub fn clear_samples(&mut self) -> Result<()> {
        self.samples.clear();
        self.synchronize()
    }

    /// Bytes per sample of a single channel.
    pub fn sample_size(&self) -> usize {
        self.format.sample_size()
    }

    pub fn frame_count(&self) -> usize {
        match self.format.num_channels {
            0 => 0,
            n => self.samples.len() / usize::from(n),
        }
    }

    fn sample_index(&self, frame: usize, channel: u16) -> Result<usize> {
        if channel >= self.format.num_channels {
            return Err(RiffError::ChannelOutOfRange {
                channel,
                channels: self.format.num_channels,
            });
        }
        let index = frame
            .checked_mul(usize::from(self.format.num_channels))
            .and_then(|i| i.checked_add(usize::from(channel)))
            .filter(|&i| i < self.samples.len())
            .ok_or(RiffError::SampleOutOfRange {
                index: frame,
                len: self.frame_count(),
            })?;
        Ok(index)
    }

    pub fn sample_at(&self, frame: usize, channel: u16) -> Result<u64> {
        Ok(self.samples[self.sample_index(frame, channel)?])
    }

    pub fn set_sample(&mut self, frame: usize, channel: u16, value: u64) -> Result<()> {
        let i = self.sample_index(frame, channel)?;
        self.samples[i] = value;
        Ok(())
    }

    /// The current sample buffer encoded as `data` chunk bytes.
    pub fn sample_bytes(&self) -> Result<Vec<u8>> {
        samples::encode(&self.samples, self.format.bits_per_sample)
    }

    /// Write the header and sample buffer back into the `fmt ` and `data` chunks.
    ///
    /// On error neither the header nor the document is modified.
    pub fn synchronize(&mut self) -> Result<()> {
        let mut format = self.format.clone();
        format.refresh_derived();
        let fmt_bytes = format.encode()?;
        let data_bytes = samples::encode(&self.samples, format.bits_per_sample)?;
        data_chunk(&self.document, FMT)?;
        data_chunk(&self.document, DATA)?;

        data_chunk_mut(&mut self.document, FMT)?.set_payload(fmt_bytes);
        data_chunk_mut(&mut self.document, DATA)?.set_payload(data_bytes);
        self.format = format;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.document.path()
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.document.set_path(path);
    }

    /// Synchronize, then write to the bound path.
    pub fn write(&mut self) -> Result<u64> {
        self.synchronize()?;
        self.document.write()
    }

    pub fn write_to<W: Write + ?Sized>(&mut self, sink: &mut W) -> Result<u64> {
        self.synchronize()?;
        self.document.write_to(sink)
    }

    pub fn document(&self) -> &RiffDocument {
        &self.document
    }

    /// The underlying document, synchronized with the current header and samples.
    pub fn into_document(mut self) -> Result<RiffDocument> {
        self.synchronize()?;
        Ok(self.document)
    }
}
