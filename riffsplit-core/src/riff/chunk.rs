use super::fourcc::{FourCc, LIST};

/// Header bytes preceding every payload: identifier + size.
pub const HEADER_LEN: u64 = 8;
/// Header bytes of a list chunk: identifier + size + form type.
pub const LIST_HEADER_LEN: u64 = 12;

#[inline]
pub(crate) fn round_even(n: u64) -> u64 {
    n + (n & 1)
}

/// A node of the chunk tree. `RIFF` and `LIST` chunks are lists, everything else is data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Chunk {
    Data(DataChunk),
    List(ListChunk),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataChunk {
    id: FourCc,
    payload: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListChunk {
    id: FourCc,
    form_type: FourCc,
    children: Vec<Chunk>,
}

impl Chunk {
    pub fn id(&self) -> FourCc {
        match self {
            Chunk::Data(d) => d.id,
            Chunk::List(l) => l.id,
        }
    }

    /// Payload bytes excluding the header (and, for lists, the form type).
    pub fn size(&self) -> u64 {
        match self {
            Chunk::Data(d) => d.size(),
            Chunk::List(l) => l.size(),
        }
    }

    /// Bytes occupied on the wire, including header and pad byte.
    pub fn total_size(&self) -> u64 {
        match self {
            Chunk::Data(d) => d.total_size(),
            Chunk::List(l) => l.total_size(),
        }
    }

    /// Value written to the 32-bit size field.
    pub fn declared_size(&self) -> u64 {
        match self {
            Chunk::Data(d) => d.declared_size(),
            Chunk::List(l) => l.declared_size(),
        }
    }

    pub fn as_data(&self) -> Option<&DataChunk> {
        match self {
            Chunk::Data(d) => Some(d),
            Chunk::List(_) => None,
        }
    }

    pub fn as_data_mut(&mut self) -> Option<&mut DataChunk> {
        match self {
            Chunk::Data(d) => Some(d),
            Chunk::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListChunk> {
        match self {
            Chunk::List(l) => Some(l),
            Chunk::Data(_) => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut ListChunk> {
        match self {
            Chunk::List(l) => Some(l),
            Chunk::Data(_) => None,
        }
    }

    /// Depth-first, pre-order search: this node first, then children in stored order.
    pub fn find_first(&self, id: FourCc) -> Option<&Chunk> {
        if self.id() == id {
            return Some(self);
        }
        match self {
            Chunk::List(l) => l.children.iter().find_map(|c| c.find_first(id)),
            Chunk::Data(_) => None,
        }
    }

    pub fn find_first_mut(&mut self, id: FourCc) -> Option<&mut Chunk> {
        if self.id() == id {
            return Some(self);
        }
        match self {
            Chunk::List(l) => l.children.iter_mut().find_map(|c| c.find_first_mut(id)),
            Chunk::Data(_) => None,
        }
    }

    pub fn exists(&self, id: FourCc) -> bool {
        self.find_first(id).is_some()
    }
}

impl From<DataChunk> for Chunk {
    fn from(d: DataChunk) -> Self {
        Chunk::Data(d)
    }
}

impl From<ListChunk> for Chunk {
    fn from(l: ListChunk) -> Self {
        Chunk::List(l)
    }
}

impl DataChunk {
    pub fn new(id: FourCc, payload: Vec<u8>) -> Self {
        Self { id, payload }
    }

    pub fn id(&self) -> FourCc {
        self.id
    }

    pub fn set_id(&mut self, id: FourCc) {
        self.id = id;
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut Vec<u8> {
        &mut self.payload
    }

    pub fn set_payload(&mut self, payload: Vec<u8>) {
        self.payload = payload;
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    pub fn size(&self) -> u64 {
        self.payload.len() as u64
    }

    pub fn declared_size(&self) -> u64 {
        self.size()
    }

    pub fn total_size(&self) -> u64 {
        round_even(self.size()) + HEADER_LEN
    }
}

impl ListChunk {
    /// A `LIST` chunk with the given form type and no children.
    pub fn new(form_type: FourCc) -> Self {
        Self::with_id(LIST, form_type)
    }

    pub fn with_id(id: FourCc, form_type: FourCc) -> Self {
        Self {
            id,
            form_type,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> FourCc {
        self.id
    }

    pub fn set_id(&mut self, id: FourCc) {
        self.id = id;
    }

    pub fn form_type(&self) -> FourCc {
        self.form_type
    }

    pub fn set_form_type(&mut self, form_type: FourCc) {
        self.form_type = form_type;
    }

    pub fn children(&self) -> &[Chunk] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Chunk> {
        &mut self.children
    }

    pub fn push(&mut self, child: impl Into<Chunk>) {
        self.children.push(child.into());
    }

    /// Builder-style [`push`](Self::push).
    pub fn with_child(mut self, child: impl Into<Chunk>) -> Self {
        self.push(child);
        self
    }

    /// Sum of the children's on-wire sizes (everything after the form type).
    pub fn size(&self) -> u64 {
        self.children.iter().map(Chunk::total_size).sum()
    }

    pub fn declared_size(&self) -> u64 {
        4 + round_even(self.size())
    }

    pub fn total_size(&self) -> u64 {
        round_even(self.size()) + LIST_HEADER_LEN
    }

    /// Same search as [`Chunk::find_first`], starting at this list.
    pub fn find_first(&self, id: FourCc) -> Option<&Chunk> {
        self.children.iter().find_map(|c| c.find_first(id))
    }

    pub fn find_first_mut(&mut self, id: FourCc) -> Option<&mut Chunk> {
        self.children.iter_mut().find_map(|c| c.find_first_mut(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::riff::fourcc::{ADTL, DATA, FMT, LABL, RIFF, WAVE};

    fn id(s: &str) -> FourCc {
        FourCc::parse(s).unwrap()
    }

    #[test]
    fn data_chunk_sizes_account_for_pad_byte() {
        let even = DataChunk::new(DATA, vec![0; 4]);
        assert_eq!(even.size(), 4);
        assert_eq!(even.declared_size(), 4);
        assert_eq!(even.total_size(), 12);

        let odd = DataChunk::new(DATA, vec![0; 5]);
        assert_eq!(odd.size(), 5);
        assert_eq!(odd.declared_size(), 5);
        assert_eq!(odd.total_size(), 14);
    }

    #[test]
    fn list_sizes_sum_children_total_sizes() {
        let list = ListChunk::new(ADTL)
            .with_child(DataChunk::new(LABL, vec![1; 7]))
            .with_child(DataChunk::new(LABL, vec![1; 2]));
        assert_eq!(list.size(), 16 + 10);
        assert_eq!(list.declared_size(), 4 + 26);
        assert_eq!(list.total_size(), 12 + 26);

        let empty = ListChunk::new(ADTL);
        assert_eq!(empty.size(), 0);
        assert_eq!(empty.declared_size(), 4);
        assert_eq!(empty.total_size(), 12);
    }

    #[test]
    fn total_sizes_are_even() {
        let root = ListChunk::with_id(RIFF, WAVE)
            .with_child(DataChunk::new(FMT, vec![0; 3]))
            .with_child(ListChunk::new(ADTL).with_child(DataChunk::new(LABL, vec![0; 9])))
            .with_child(DataChunk::new(DATA, vec![0; 1]));
        let root = Chunk::from(root);
        assert_eq!(root.total_size() % 2, 0);
        for c in root.as_list().unwrap().children() {
            assert_eq!(c.total_size() % 2, 0);
        }
        assert_eq!(root.total_size(), 12 + 12 + (12 + 18) + 10);
    }

    #[test]
    fn find_first_is_preorder_depth_first() {
        let tree = Chunk::from(
            ListChunk::with_id(RIFF, WAVE)
                .with_child(
                    ListChunk::new(id("INFO"))
                        .with_child(DataChunk::new(id("IART"), b"deep".to_vec())),
                )
                .with_child(DataChunk::new(id("IART"), b"shallow".to_vec())),
        );
        let hit = tree.find_first(id("IART")).unwrap();
        assert_eq!(hit.as_data().unwrap().payload(), b"deep");
        assert_eq!(tree.find_first(RIFF).unwrap().id(), RIFF);
        assert!(tree.find_first(id("LIST")).unwrap().as_list().is_some());
        assert!(tree.find_first(id("nope")).is_none());
        assert!(!tree.exists(id("nope")));
    }

    #[test]
    fn find_first_mut_allows_in_place_edit() {
        let mut tree = Chunk::from(
            ListChunk::with_id(RIFF, WAVE).with_child(DataChunk::new(DATA, vec![1, 2])),
        );
        tree.find_first_mut(DATA)
            .and_then(Chunk::as_data_mut)
            .unwrap()
            .set_payload(vec![9; 3]);
        assert_eq!(tree.find_first(DATA).unwrap().size(), 3);
    }
}
