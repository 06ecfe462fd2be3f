//! Primary header model for CCSDS Space Packets.
//!
//! The [SpHeader] type holds the decomposed header fields and is convenient to
//! construct and inspect. The [zc::SpHeader] type in the [zc] submodule is the
//! bit-exact wire representation with network byte order fields, used wherever
//! a header is read from or written to raw memory. Conversions exist in both
//! directions.
use crate::{APID_IDLE, CCSDS_HEADER_LEN, MAX_SEQ_COUNT};
use delegate::delegate;

/// Packet type field of the packet identification.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, num_enum::IntoPrimitive, num_enum::TryFromPrimitive,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PacketType {
    /// Telemetry packet.
    Tm = 0,
    /// Telecommand packet.
    Tc = 1,
}

/// Sequence flags field of the packet sequence control.
///
/// The Octet Assembly Service only ever emits [SequenceFlags::Unsegmented]
/// because the octet string service does not segment user data.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, num_enum::IntoPrimitive, num_enum::TryFromPrimitive,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum SequenceFlags {
    ContinuationSegment = 0b00,
    FirstSegment = 0b01,
    LastSegment = 0b10,
    Unsegmented = 0b11,
}

/// Packet identification, the last 13 bits of the first header word.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PacketId {
    pub ptype: PacketType,
    pub sec_header_flag: bool,
    apid: u16,
}

impl PacketId {
    /// Returns [None] if the passed APID does not fit into the 11-bit field.
    pub fn new(ptype: PacketType, sec_header_flag: bool, apid: u16) -> Option<PacketId> {
        let mut pid = PacketId {
            ptype,
            sec_header_flag,
            apid: 0,
        };
        pid.set_apid(apid).then_some(pid)
    }

    /// Set a new Application Process ID (APID). If the passed number does not
    /// fit into the 11-bit field, the APID will not be set and false will be
    /// returned.
    pub fn set_apid(&mut self, apid: u16) -> bool {
        if apid > APID_IDLE {
            return false;
        }
        self.apid = apid;
        true
    }

    pub fn apid(&self) -> u16 {
        self.apid
    }

    pub fn raw(&self) -> u16 {
        ((self.ptype as u16) << 12) | ((self.sec_header_flag as u16) << 11) | self.apid
    }
}

impl From<u16> for PacketId {
    fn from(raw_id: u16) -> Self {
        PacketId {
            // Cannot fail, the mask only leaves the values 0 and 1.
            ptype: PacketType::try_from(((raw_id >> 12) & 0b1) as u8).unwrap(),
            sec_header_flag: ((raw_id >> 11) & 0b1) != 0,
            apid: raw_id & APID_IDLE,
        }
    }
}

/// Packet sequence control, the second header word.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PacketSequenceCtrl {
    pub seq_flags: SequenceFlags,
    seq_count: u16,
}

impl PacketSequenceCtrl {
    /// Returns [None] if the passed sequence count exceeds [MAX_SEQ_COUNT].
    pub fn new(seq_flags: SequenceFlags, seq_count: u16) -> Option<PacketSequenceCtrl> {
        let mut psc = PacketSequenceCtrl {
            seq_flags,
            seq_count: 0,
        };
        psc.set_seq_count(seq_count).then_some(psc)
    }

    /// Set a new sequence count. If the passed number does not fit into the
    /// 14-bit field, the count will not be set and false will be returned.
    pub fn set_seq_count(&mut self, ssc: u16) -> bool {
        if ssc > MAX_SEQ_COUNT {
            return false;
        }
        self.seq_count = ssc;
        true
    }

    pub fn seq_count(&self) -> u16 {
        self.seq_count
    }

    pub fn raw(&self) -> u16 {
        ((self.seq_flags as u16) << 14) | self.seq_count
    }
}

impl From<u16> for PacketSequenceCtrl {
    fn from(raw: u16) -> Self {
        PacketSequenceCtrl {
            // Cannot fail, the mask only leaves two bits.
            seq_flags: SequenceFlags::try_from(((raw >> 14) & 0b11) as u8).unwrap(),
            seq_count: raw & MAX_SEQ_COUNT,
        }
    }
}

/// Decomposed Space Packet primary header.
///
/// The packet version number is not stored, this crate only emits version
/// 000b headers. The `data_len` field carries the on-wire value, which is one
/// less than the packet data field length in bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpHeader {
    pub packet_id: PacketId,
    pub psc: PacketSequenceCtrl,
    pub data_len: u16,
}

impl SpHeader {
    /// Create a new Space Packet header with unsegmented sequence flags. This
    /// will return [None] if the APID or sequence count argument do not fit
    /// into their header fields.
    pub fn new(
        ptype: PacketType,
        sec_header: bool,
        apid: u16,
        seq_count: u16,
        data_len: u16,
    ) -> Option<Self> {
        Some(SpHeader {
            packet_id: PacketId::new(ptype, sec_header, apid)?,
            psc: PacketSequenceCtrl::new(SequenceFlags::Unsegmented, seq_count)?,
            data_len,
        })
    }

    /// Helper function for telemetry packet headers.
    pub fn tm(apid: u16, seq_count: u16, data_len: u16) -> Option<Self> {
        Self::new(PacketType::Tm, false, apid, seq_count, data_len)
    }

    /// Helper function for telecommand packet headers.
    pub fn tc(apid: u16, seq_count: u16, data_len: u16) -> Option<Self> {
        Self::new(PacketType::Tc, false, apid, seq_count, data_len)
    }

    delegate!(to self.packet_id {
        pub fn set_apid(&mut self, apid: u16) -> bool;
        pub fn apid(&self) -> u16;
    });

    delegate!(to self.psc {
        pub fn set_seq_count(&mut self, seq_count: u16) -> bool;
        pub fn seq_count(&self) -> u16;
    });

    pub fn ptype(&self) -> PacketType {
        self.packet_id.ptype
    }

    pub fn is_tm(&self) -> bool {
        self.ptype() == PacketType::Tm
    }

    pub fn is_tc(&self) -> bool {
        self.ptype() == PacketType::Tc
    }

    pub fn sec_header_flag(&self) -> bool {
        self.packet_id.sec_header_flag
    }

    /// Total packet size in bytes based on the data length field.
    pub fn total_len(&self) -> usize {
        usize::from(self.data_len) + CCSDS_HEADER_LEN + 1
    }

    /// Parse a header from the beginning of a raw byte slice. Returns [None]
    /// if the slice is too short to hold a primary header.
    pub fn from_raw_slice(buf: &[u8]) -> Option<Self> {
        zc::SpHeader::from_bytes(buf).map(Self::from)
    }
}

impl From<zc::SpHeader> for SpHeader {
    fn from(zc_header: zc::SpHeader) -> Self {
        SpHeader {
            packet_id: PacketId::from(zc_header.packet_id_raw()),
            psc: PacketSequenceCtrl::from(zc_header.psc_raw()),
            data_len: zc_header.data_len(),
        }
    }
}

/// Wire representation of the primary header.
pub mod zc {
    use super::SpHeader as SpHeaderDecomposed;
    use super::{PacketId, PacketSequenceCtrl, PacketType, SequenceFlags};
    use crate::{APID_IDLE, MAX_SEQ_COUNT};
    use zerocopy::byteorder::NetworkEndian;
    use zerocopy::{AsBytes, FromBytes, FromZeroes, Unaligned, U16};

    const VERSION_MASK: u16 = 0xE000;

    /// Space Packet primary header in its on-wire layout: three big-endian
    /// 16-bit words, 6 bytes total.
    #[derive(FromBytes, FromZeroes, AsBytes, Unaligned, Debug)]
    #[repr(C)]
    pub struct SpHeader {
        version_packet_id: U16<NetworkEndian>,
        psc: U16<NetworkEndian>,
        data_len: U16<NetworkEndian>,
    }

    impl SpHeader {
        /// Assemble a header from its composite fields. The version number
        /// field is always written as 000b.
        pub fn new(packet_id: PacketId, psc: PacketSequenceCtrl, data_len: u16) -> Self {
            SpHeader {
                version_packet_id: U16::from(packet_id.raw()),
                psc: U16::from(psc.raw()),
                data_len: U16::from(data_len),
            }
        }

        /// Read a header from the beginning of a byte slice. Returns [None]
        /// if the slice holds fewer than 6 bytes.
        pub fn from_bytes(slice: &[u8]) -> Option<Self> {
            SpHeader::read_from_prefix(slice)
        }

        /// Write the header to a byte slice. Returns [None] if the slice is
        /// not exactly 6 bytes long.
        pub fn to_bytes(&self, slice: &mut [u8]) -> Option<()> {
            self.write_to(slice)
        }

        pub fn version(&self) -> u8 {
            ((self.version_packet_id.get() >> 13) as u8) & 0b111
        }

        pub fn packet_id_raw(&self) -> u16 {
            self.version_packet_id.get() & !VERSION_MASK
        }

        pub fn psc_raw(&self) -> u16 {
            self.psc.get()
        }

        pub fn ptype(&self) -> PacketType {
            // Cannot fail, the mask only leaves the values 0 and 1.
            PacketType::try_from(((self.version_packet_id.get() >> 12) & 0b1) as u8).unwrap()
        }

        pub fn sec_header_flag(&self) -> bool {
            ((self.version_packet_id.get() >> 11) & 0b1) != 0
        }

        pub fn apid(&self) -> u16 {
            self.version_packet_id.get() & APID_IDLE
        }

        pub fn seq_flags(&self) -> SequenceFlags {
            // Cannot fail, the mask only leaves two bits.
            SequenceFlags::try_from(((self.psc.get() >> 14) & 0b11) as u8).unwrap()
        }

        pub fn seq_count(&self) -> u16 {
            self.psc.get() & MAX_SEQ_COUNT
        }

        pub fn data_len(&self) -> u16 {
            self.data_len.get()
        }
    }

    impl From<SpHeaderDecomposed> for SpHeader {
        fn from(header: SpHeaderDecomposed) -> Self {
            SpHeader::new(header.packet_id, header.psc, header.data_len)
        }
    }
}
