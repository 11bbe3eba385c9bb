//! Reading and writing chunk trees in RIFF wire form.
//!
//! Layout of every chunk: `id (4) | size (u32 LE) | payload`, where a `RIFF`/`LIST`
//! payload is `form type (4) | children...`. A single zero pad byte follows any payload of
//! odd length and is never counted by the size field.

use std::io::{self, BufRead, Read, Write};

use tracing::trace;

use super::chunk::{Chunk, DataChunk, HEADER_LEN, ListChunk};
use super::fourcc::{FourCc, LIST};
use crate::error::{Result, RiffError};

/// Lists nested deeper than this are rejected rather than recursed into.
pub const MAX_NESTING: usize = 256;

/// Byte source that tracks its absolute position and can peek one byte ahead.
pub(crate) struct ChunkReader<R> {
    inner: R,
    pos: u64,
}

impl<R: BufRead> ChunkReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner, pos: 0 }
    }

    /// Start counting from `pos`, for sources whose first bytes were consumed elsewhere.
    pub(crate) fn at(inner: R, pos: u64) -> Self {
        Self { inner, pos }
    }

    pub(crate) fn position(&self) -> u64 {
        self.pos
    }

    fn read_array<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner
            .read_exact(&mut buf)
            .map_err(|e| eof_as_malformed(e, what))?;
        self.pos += N as u64;
        Ok(buf)
    }

    fn read_fourcc(&mut self, what: &str) -> Result<FourCc> {
        Ok(FourCc::new(self.read_array::<4>(what)?))
    }

    fn read_u32_le(&mut self, what: &str) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array::<4>(what)?))
    }

    fn read_vec(&mut self, len: u64, what: &str) -> Result<Vec<u8>> {
        // take() keeps a bogus size field from forcing a huge up-front allocation
        let mut buf = Vec::new();
        (&mut self.inner).take(len).read_to_end(&mut buf)?;
        self.pos += buf.len() as u64;
        if (buf.len() as u64) < len {
            return Err(RiffError::Malformed(format!(
                "{what}: expected {len} bytes, stream ended after {}",
                buf.len()
            )));
        }
        Ok(buf)
    }

    fn peek_byte(&mut self) -> Result<Option<u8>> {
        Ok(self.inner.fill_buf()?.first().copied())
    }

    fn skip_byte(&mut self) {
        self.inner.consume(1);
        self.pos += 1;
    }
}

fn eof_as_malformed(e: io::Error, what: &str) -> RiffError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        RiffError::Malformed(format!("stream ended while reading {what}"))
    } else {
        RiffError::Io(e)
    }
}

/// Parse one chunk (recursively) from `reader`.
///
/// When `known_id` is `None` the identifier is read from the stream first; otherwise the
/// caller has already consumed it. `RIFF` and `LIST` parse as lists, anything else as data.
pub fn parse<R: BufRead>(reader: R, known_id: Option<FourCc>) -> Result<Chunk> {
    let mut r = ChunkReader::new(reader);
    parse_from(&mut r, known_id)
}

fn parse_from<R: BufRead>(
    r: &mut ChunkReader<R>,
    known_id: Option<FourCc>,
) -> Result<Chunk> {
    let id = match known_id {
        Some(id) => id,
        None => r.read_fourcc("chunk identifier")?,
    };
    if id.is_list() {
        Ok(Chunk::List(parse_list(r, id, 0)?))
    } else {
        Ok(Chunk::Data(parse_data(r, id)?))
    }
}

/// Convenience over [`parse`] for an in-memory buffer.
pub fn parse_bytes(bytes: &[u8]) -> Result<Chunk> {
    parse(bytes, None)
}

fn parse_data<R: BufRead>(r: &mut ChunkReader<R>, id: FourCc) -> Result<DataChunk> {
    let size = r.read_u32_le("chunk size")?;
    let payload = r.read_vec(u64::from(size), &format!("payload of {id}"))?;
    trace!(%id, size, "parsed data chunk");
    Ok(DataChunk::new(id, payload))
}

pub(crate) fn parse_list<R: BufRead>(
    r: &mut ChunkReader<R>,
    id: FourCc,
    depth: usize,
) -> Result<ListChunk> {
    if depth > MAX_NESTING {
        return Err(RiffError::Malformed(format!(
            "lists nested deeper than {MAX_NESTING}"
        )));
    }
    let size = u64::from(r.read_u32_le("list size")?);
    let start = r.position();
    let form_type = r.read_fourcc("form type")?;
    let mut list = ListChunk::with_id(id, form_type);

    // the form type fills the whole declared payload
    if size <= 4 {
        trace!(%id, %form_type, "parsed empty list");
        return Ok(list);
    }

    let end = start + size;
    while r.position() < end {
        match r.peek_byte()? {
            None => break,
            Some(0) => {
                r.skip_byte();
                continue;
            }
            Some(_) => {}
        }
        let child_id = r.read_fourcc("child identifier")?;
        let child = if child_id == LIST {
            Chunk::List(parse_list(r, child_id, depth + 1)?)
        } else {
            Chunk::Data(parse_data(r, child_id)?)
        };
        list.push(child);
    }
    trace!(%id, %form_type, children = list.children().len(), "parsed list");
    Ok(list)
}

fn size_field(id: FourCc, size: u64) -> Result<u32> {
    u32::try_from(size).map_err(|_| RiffError::ChunkTooLarge { id, size })
}

/// Serialize `chunk` to `sink`, returning the number of bytes emitted (header and pad
/// bytes included). Size fields are recomputed from the current contents.
pub fn write<W: Write + ?Sized>(chunk: &Chunk, sink: &mut W) -> Result<u64> {
    match chunk {
        Chunk::Data(d) => write_data(d, sink),
        Chunk::List(l) => write_list(l, sink),
    }
}

pub fn write_data<W: Write + ?Sized>(chunk: &DataChunk, sink: &mut W) -> Result<u64> {
    let size = size_field(chunk.id(), chunk.declared_size())?;
    sink.write_all(chunk.id().as_bytes())?;
    sink.write_all(&size.to_le_bytes())?;
    sink.write_all(chunk.payload())?;
    let mut written = HEADER_LEN + chunk.size();
    if chunk.size() % 2 == 1 {
        sink.write_all(&[0])?;
        written += 1;
    }
    Ok(written)
}

pub fn write_list<W: Write + ?Sized>(chunk: &ListChunk, sink: &mut W) -> Result<u64> {
    let size = size_field(chunk.id(), chunk.declared_size())?;
    sink.write_all(chunk.id().as_bytes())?;
    sink.write_all(&size.to_le_bytes())?;
    sink.write_all(chunk.form_type().as_bytes())?;
    let mut written = HEADER_LEN + 4;
    for child in chunk.children() {
        written += write(child, sink)?;
    }
    if (written - HEADER_LEN) % 2 == 1 {
        sink.write_all(&[0])?;
        written += 1;
    }
    Ok(written)
}

/// Serialize `chunk` into a fresh buffer.
pub fn to_bytes(chunk: &Chunk) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(chunk.total_size() as usize);
    write(chunk, &mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::riff::fourcc::{ADTL, DATA, FMT, LABL, RIFF, WAVE};

    fn sample_tree() -> Chunk {
        Chunk::from(
            ListChunk::with_id(RIFF, WAVE)
                .with_child(DataChunk::new(FMT, vec![1, 0, 2, 0]))
                .with_child(
                    ListChunk::new(ADTL)
                        .with_child(DataChunk::new(LABL, b"\x01\0\0\0abc".to_vec()))
                        .with_child(DataChunk::new(LABL, b"\x02\0\0\0de\0".to_vec())),
                )
                .with_child(DataChunk::new(DATA, vec![7, 8, 9])),
        )
    }

    #[test]
    fn write_then_parse_reproduces_tree() {
        let tree = sample_tree();
        let bytes = to_bytes(&tree).unwrap();
        assert_eq!(bytes.len() as u64, tree.total_size());
        let parsed = parse_bytes(&bytes).unwrap();
        assert_eq!(parsed, tree);
    }

    #[test]
    fn odd_payload_gets_uncounted_pad_byte() {
        let chunk = Chunk::from(DataChunk::new(DATA, vec![0xaa, 0xbb, 0xcc]));
        let bytes = to_bytes(&chunk).unwrap();
        assert_eq!(bytes, b"data\x03\0\0\0\xaa\xbb\xcc\0");
    }

    #[test]
    fn write_reports_bytes_emitted() {
        let tree = sample_tree();
        let mut sink = Vec::new();
        let n = write(&tree, &mut sink).unwrap();
        assert_eq!(n, sink.len() as u64);
        // RIFF size field = total - 8
        let declared = u32::from_le_bytes(sink[4..8].try_into().unwrap());
        assert_eq!(u64::from(declared), n - 8);
    }

    #[test]
    fn size_field_is_recomputed_not_trusted() {
        let mut tree = sample_tree();
        tree.find_first_mut(DATA)
            .and_then(Chunk::as_data_mut)
            .unwrap()
            .payload_mut()
            .extend_from_slice(&[1, 2, 3, 4, 5]);
        let bytes = to_bytes(&tree).unwrap();
        let parsed = parse_bytes(&bytes).unwrap();
        assert_eq!(parsed.find_first(DATA).unwrap().size(), 8);
    }

    #[test]
    fn list_with_only_form_type_has_no_children() {
        let bytes = b"LIST\x04\0\0\0INFO";
        let parsed = parse_bytes(bytes).unwrap();
        let list = parsed.as_list().unwrap();
        assert_eq!(list.form_type(), FourCc::new(*b"INFO"));
        assert!(list.children().is_empty());
    }

    #[test]
    fn known_identifier_skips_reading_it() {
        let bytes = b"\x02\0\0\0hi";
        let parsed = parse(&bytes[..], Some(FourCc::new(*b"abcd"))).unwrap();
        assert_eq!(parsed.as_data().unwrap().payload(), b"hi");
    }

    #[test]
    fn nested_riff_identifier_is_data() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF\x10\0\0\0WAVE");
        bytes.extend_from_slice(b"RIFF\x04\0\0\0abcd");
        let parsed = parse_bytes(&bytes).unwrap();
        let child = &parsed.as_list().unwrap().children()[0];
        assert_eq!(child.as_data().unwrap().payload(), b"abcd");
    }

    #[test]
    fn list_stops_at_declared_end() {
        // inner list declares only its first child; the second belongs to the root
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF\x28\0\0\0WAVE");
        bytes.extend_from_slice(b"LIST\x0e\0\0\0adtl");
        bytes.extend_from_slice(b"labl\x02\0\0\0ab");
        bytes.extend_from_slice(b"data\x04\0\0\x001234");
        let parsed = parse_bytes(&bytes).unwrap();
        let root = parsed.as_list().unwrap();
        assert_eq!(root.children().len(), 2);
        assert_eq!(root.children()[0].as_list().unwrap().children().len(), 1);
        assert_eq!(root.children()[1].id(), DATA);
    }

    #[test]
    fn truncated_payload_is_malformed() {
        let bytes = b"RIFF\x14\0\0\0WAVEdata\x08\0\0\0abc";
        assert!(matches!(parse_bytes(bytes), Err(RiffError::Malformed(_))));
    }

    #[test]
    fn truncated_header_is_malformed() {
        assert!(matches!(parse_bytes(b"RIF"), Err(RiffError::Malformed(_))));
        assert!(matches!(
            parse_bytes(b"RIFF\x10\0\0\0WAVEda"),
            Err(RiffError::Malformed(_))
        ));
    }

    #[test]
    fn short_stream_ends_list_without_error() {
        // declared size overshoots the stream; children read so far are kept
        let bytes = b"RIFF\xff\0\0\0WAVEdata\x02\0\0\0ab";
        let parsed = parse_bytes(bytes).unwrap();
        assert_eq!(parsed.as_list().unwrap().children().len(), 1);
    }

    #[test]
    fn excessive_nesting_is_rejected() {
        let depth = MAX_NESTING + 2;
        let mut bytes = Vec::new();
        for level in 0..depth {
            let remaining = (depth - level - 1) as u32 * 12;
            bytes.extend_from_slice(if level == 0 { b"RIFF" } else { b"LIST" });
            bytes.extend_from_slice(&(remaining + 4).to_le_bytes());
            bytes.extend_from_slice(b"NEST");
        }
        assert!(matches!(parse_bytes(&bytes), Err(RiffError::Malformed(_))));
    }
}
