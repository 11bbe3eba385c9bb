use std::collections::HashMap;

use tracing::{debug, warn};

use super::cue::{self, CueMetadata, CuePoint};
use crate::error::Result;
use crate::wav::view::WavView;

/// One derived file of a split: a named, contiguous byte range of the source samples.
#[derive(Clone, Debug)]
pub struct SplitSegment {
    /// Label of the cue, made unique within the split.
    pub name: String,
    pub cue: CuePoint,
    /// Offset into the source's sample bytes.
    pub byte_offset: usize,
    pub byte_length: usize,
    pub view: WavView,
}

/// Segment names in cue-chunk order: the cue's label, or its id in decimal, with `_N`
/// appended to the second and later uses of the same name.
pub fn segment_names(meta: &CueMetadata) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    meta.cues
        .iter()
        .map(|cue| {
            let base = meta
                .label_for(cue)
                .map(str::to_owned)
                .unwrap_or_else(|| cue.identifier.to_string());
            let n = seen.entry(base.clone()).or_insert(0);
            let name = if *n == 0 {
                base
            } else {
                format!("{base}_{n}")
            };
            *n += 1;
            name
        })
        .collect()
}

/// `(byte_offset, byte_length)` per cue, in cue-chunk order, over a buffer of
/// `total_len` bytes with `frame_len` bytes per frame.
///
/// Ranges are ordered by `sample_start` (ties keep chunk order) and each runs to the next
/// one's start; the last runs to the end of the buffer. Offsets past the end are clamped.
pub fn segment_ranges(cues: &[CuePoint], frame_len: usize, total_len: usize) -> Vec<(usize, usize)> {
    let offsets: Vec<usize> = cues
        .iter()
        .map(|c| {
            let off = (c.sample_start as usize).saturating_mul(frame_len);
            if off > total_len {
                warn!(
                    cue = c.identifier,
                    sample_start = c.sample_start,
                    "cue starts beyond the sample data, clamped to the end"
                );
            }
            off.min(total_len)
        })
        .collect();

    let mut order: Vec<usize> = (0..cues.len()).collect();
    order.sort_by_key(|&i| cues[i].sample_start);

    let mut ranges = vec![(0, 0); cues.len()];
    for (k, &i) in order.iter().enumerate() {
        let end = order.get(k + 1).map_or(total_len, |&next| offsets[next]);
        ranges[i] = (offsets[i], end - offsets[i]);
    }
    ranges
}

/// Derive one [`SplitSegment`] per cue point of `meta`, in cue-chunk order.
pub fn plan(source: &WavView, meta: &CueMetadata) -> Result<Vec<SplitSegment>> {
    if meta.cues.is_empty() {
        return Ok(Vec::new());
    }
    let format = source.format();
    let frame_len = source.sample_size() * usize::from(format.num_channels);
    let bytes = source.sample_bytes()?;

    let names = segment_names(meta);
    let ranges = segment_ranges(&meta.cues, frame_len, bytes.len());

    let mut segments = Vec::with_capacity(meta.cues.len());
    for ((name, (byte_offset, byte_length)), cue) in names.into_iter().zip(ranges).zip(&meta.cues) {
        let view = WavView::from_parts(format, &bytes[byte_offset..byte_offset + byte_length])?;
        debug!(%name, byte_offset, byte_length, "planned segment");
        segments.push(SplitSegment {
            name,
            cue: *cue,
            byte_offset,
            byte_length,
            view,
        });
    }
    Ok(segments)
}

/// Extract the cue metadata of `source` and plan its split.
pub fn plan_split(source: &WavView) -> Result<Vec<SplitSegment>> {
    let meta = cue::extract(source.document())?;
    plan(source, &meta)
}
