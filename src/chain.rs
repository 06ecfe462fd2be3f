//! Zero-copy data unit chains.
//!
//! A [DataUnit] represents a packet as an ordered sequence of non-contiguous
//! memory regions. Payload nodes borrow caller-owned byte slices, header nodes
//! own their 6-byte wire representation. Prepending a header to a payload or
//! stripping it again therefore never copies payload bytes, only the chain
//! links move.
//!
//! The caller constructing a chain owns it exclusively until it is passed by
//! value into a service call. The bytes referenced by a payload node are
//! owned by whoever supplied them and must outlive every use of the chain,
//! which the borrow on the `'a` lifetime enforces.
use crate::header::zc;
use crate::CCSDS_HEADER_LEN;
use alloc::boxed::Box;
use zerocopy::AsBytes;

#[derive(Debug)]
enum NodeKind<'a> {
    /// Borrowed view of a contiguous caller-owned byte region.
    View(&'a [u8]),
    /// Owned primary header in wire representation.
    Header(zc::SpHeader),
}

/// A single node of a data unit chain with an optional owned successor.
///
/// A node has at most one successor. [DataUnit::append] sets and replaces that
/// link, it is not a tail insertion.
#[derive(Debug)]
pub struct DataUnit<'a> {
    kind: NodeKind<'a>,
    next: Option<Box<DataUnit<'a>>>,
}

impl<'a> DataUnit<'a> {
    /// Create an unlinked payload node viewing the passed byte region.
    pub fn from_slice(buf: &'a [u8]) -> Self {
        DataUnit {
            kind: NodeKind::View(buf),
            next: None,
        }
    }

    /// Create an unlinked node owning the passed primary header.
    pub fn from_header(header: zc::SpHeader) -> Self {
        DataUnit {
            kind: NodeKind::Header(header),
            next: None,
        }
    }

    /// Wrap a contiguous received Space Packet into a two-node chain, a
    /// 6-byte header node followed by a payload node viewing the rest of the
    /// buffer. Returns [None] if the buffer does not hold a primary header
    /// followed by at least one payload octet. No bytes are copied.
    pub fn from_packet_bytes(buf: &'a [u8]) -> Option<Self> {
        if buf.len() <= CCSDS_HEADER_LEN {
            return None;
        }
        let (header, payload) = buf.split_at(CCSDS_HEADER_LEN);
        let mut du = DataUnit::from_slice(header);
        du.append(DataUnit::from_slice(payload));
        Some(du)
    }

    /// Size of this node only in bytes.
    pub fn size(&self) -> usize {
        self.get().len()
    }

    /// Total size of this node and all its successors in bytes.
    pub fn total_size(&self) -> usize {
        match &self.next {
            Some(next) => self.size() + next.total_size(),
            None => self.size(),
        }
    }

    /// Number of chained nodes including this one. A chain consists of at
    /// least its own node, so there is no matching `is_empty`.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        match &self.next {
            Some(next) => next.len() + 1,
            None => 1,
        }
    }

    /// Read-only view of this node's bytes.
    pub fn get(&self) -> &[u8] {
        match &self.kind {
            NodeKind::View(buf) => buf,
            NodeKind::Header(header) => header.as_bytes(),
        }
    }

    /// Access the owned header of a header node. Returns [None] for payload
    /// nodes.
    pub fn header(&self) -> Option<&zc::SpHeader> {
        match &self.kind {
            NodeKind::Header(header) => Some(header),
            NodeKind::View(_) => None,
        }
    }

    /// Mutable access to the owned header of a header node, usable while the
    /// header is still under construction.
    pub fn header_mut(&mut self) -> Option<&mut zc::SpHeader> {
        match &mut self.kind {
            NodeKind::Header(header) => Some(header),
            NodeKind::View(_) => None,
        }
    }

    /// Attach a successor chain, taking ownership of it. A previously
    /// attached successor is dropped.
    pub fn append(&mut self, du: DataUnit<'a>) {
        self.next = Some(Box::new(du));
    }

    /// Borrow the successor chain, if any.
    pub fn next(&self) -> Option<&DataUnit<'a>> {
        self.next.as_deref()
    }

    /// Detach and return the successor chain, leaving this node unlinked.
    /// Used to strip a header node and yield the remaining payload chain.
    pub fn pop(&mut self) -> Option<DataUnit<'a>> {
        self.next.take().map(|boxed| *boxed)
    }
}
