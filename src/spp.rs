//! Space Packet Protocol transmit and receive services.
//!
//! Two service layers are provided on top of an abstract subnetwork:
//!
//!  - [PacketService] moves fully assembled Space Packets. It forwards
//!    outgoing packets verbatim and reports every incoming packet together
//!    with its APID and a packet loss indicator.
//!  - [OctetService] is the payload facing layer. It frames raw octet strings
//!    into Space Packets for one configured APID and unwraps incoming packets
//!    of that APID again, discarding all others.
//!
//! Both layers are synchronous. A `request` either completes with the
//! subnetwork's result or fails immediately, and indication callbacks run on
//! the caller's thread inside `reception`.
use crate::chain::DataUnit;
use crate::header::{zc, PacketId, PacketSequenceCtrl, PacketType, SequenceFlags};
use crate::seq_count::{CcsdsSeqCountProvider, SeqCountTracker, SequenceCountProvider};
use crate::{MAX_APID, MAX_SEQ_COUNT};
use alloc::boxed::Box;
use core::fmt::{Display, Formatter};

/// Failure codes of the service layer.
///
/// Success is conveyed as `Ok(())`, see [ServiceResult]. Reception problems
/// are never surfaced through this type: packets with a foreign APID are
/// dropped silently and sequence gaps are reported through the loss
/// indicator of the indication callback.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ServiceError {
    /// The invoked operation is not offered by this service endpoint. Not
    /// retryable, this indicates a caller logic error.
    NoSupport,
    /// No subnetwork is configured below this service. Not retryable without
    /// reconfiguration.
    NoNetwork,
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        match self {
            ServiceError::NoSupport => write!(f, "operation not supported by this service"),
            ServiceError::NoNetwork => write!(f, "no subnetwork configured"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ServiceError {}

/// Outcome of every fallible service operation.
pub type ServiceResult = Result<(), ServiceError>;

/// Capability contract between service layers: accept a data unit chain,
/// attempt to move it further down the stack, report the outcome.
///
/// The chain is passed by value, so a successful or failed transfer alike
/// consumes it. Implementors take ownership exactly once per call.
pub trait Service<'a> {
    fn transfer(&mut self, du: DataUnit<'a>) -> ServiceResult;
}

/// Indication callback reporting a received chain together with the packet
/// APID and the packet loss indicator. Invoked synchronously on the thread
/// calling `reception`.
pub type Indication<'a> = Box<dyn FnMut(DataUnit<'a>, u16, bool) + 'a>;

/// Space Packet transmit and receive service.
///
/// The thinnest protocol layer: outgoing packets must already carry their
/// primary header and are forwarded verbatim to the subnetwork. Incoming
/// packets are reported to the registered indication callback without any
/// APID filtering, together with a loss indicator derived from the packet
/// sequence count.
pub struct PacketService<'a, S> {
    subnetwork: Option<S>,
    indication: Option<Indication<'a>>,
    tracker: SeqCountTracker,
}

impl<'a, S: Service<'a>> PacketService<'a, S> {
    pub fn new(subnetwork: S) -> Self {
        Self {
            subnetwork: Some(subnetwork),
            indication: None,
            tracker: SeqCountTracker::default(),
        }
    }

    /// Create a service without a subnetwork. Every transfer through this
    /// service fails with [ServiceError::NoNetwork] until it is replaced by
    /// a connected instance.
    pub fn unconnected() -> Self {
        Self {
            subnetwork: None,
            indication: None,
            tracker: SeqCountTracker::default(),
        }
    }

    pub fn subnetwork(&self) -> Option<&S> {
        self.subnetwork.as_ref()
    }

    pub fn subnetwork_mut(&mut self) -> Option<&mut S> {
        self.subnetwork.as_mut()
    }

    /// Register the indication callback invoked on packet reception. A
    /// previously registered callback is replaced.
    pub fn set_indication<F: FnMut(DataUnit<'a>, u16, bool) + 'a>(&mut self, func: F) {
        self.indication = Some(Box::new(func));
    }

    /// Unregister the indication callback. Packets received afterwards still
    /// update the loss tracking state but are not reported.
    pub fn clear_indication(&mut self) {
        self.indication = None;
    }

    /// Last observed packet sequence count of the reception path.
    pub fn last_observed_seq(&self) -> u16 {
        self.tracker.last()
    }

    /// Send a pre-assembled Space Packet.
    ///
    /// The quality of service parameter is accepted but not interpreted by
    /// this layer, it is reserved for subnetworks which understand priority
    /// classes.
    pub fn request(&mut self, packet: DataUnit<'a>, _qos: u8) -> ServiceResult {
        self.transfer(packet)
    }

    /// Called by the subnetwork when a Space Packet arrives.
    ///
    /// The packet sequence count is checked for continuity and the last
    /// observed count is updated unconditionally, even when a loss was
    /// detected. Every packet with a decodable primary header is reported to
    /// the indication callback, there is no APID filtering at this layer.
    /// Chains too short to hold a primary header are dropped silently.
    pub fn reception(&mut self, packet: DataUnit<'a>) {
        let Some(header) = zc::SpHeader::from_bytes(packet.get()) else {
            return;
        };
        let loss = self.tracker.accept(header.seq_count());
        if let Some(indication) = self.indication.as_mut() {
            indication(packet, header.apid(), loss);
        }
    }
}

impl<'a, S: Service<'a>> Service<'a> for PacketService<'a, S> {
    /// Forward a chain to the subnetwork, or fail with
    /// [ServiceError::NoNetwork] if none is configured.
    fn transfer(&mut self, du: DataUnit<'a>) -> ServiceResult {
        match self.subnetwork.as_mut() {
            Some(subnetwork) => subnetwork.transfer(du),
            None => Err(ServiceError::NoNetwork),
        }
    }
}

/// Octet string assembly service for one logical data stream.
///
/// Owns the APID of the stream, an automatic packet counter for outgoing
/// telemetry and the loss tracking state for incoming packets. Payloads are
/// framed by prepending an owned header node to the caller's chain, payload
/// bytes are never copied.
pub struct OctetService<'a, S> {
    service: PacketService<'a, S>,
    indication: Option<Indication<'a>>,
    tracker: SeqCountTracker,
    counter: CcsdsSeqCountProvider,
    apid: u16,
}

impl<'a, S: Service<'a>> OctetService<'a, S> {
    /// Create a service for the given APID on top of the given subnetwork.
    /// Returns [None] if the APID exceeds [MAX_APID]. The idle packet APID
    /// cannot be owned by a service instance.
    pub fn new(apid: u16, subnetwork: S) -> Option<Self> {
        if apid > MAX_APID {
            return None;
        }
        Some(Self {
            service: PacketService::new(subnetwork),
            indication: None,
            tracker: SeqCountTracker::default(),
            counter: CcsdsSeqCountProvider::default(),
            apid,
        })
    }

    pub fn apid(&self) -> u16 {
        self.apid
    }

    /// Sequence count the next automatically counted request will carry.
    pub fn next_seq_count(&self) -> u16 {
        self.counter.get()
    }

    /// Last observed packet sequence count of the reception path.
    pub fn last_observed_seq(&self) -> u16 {
        self.tracker.last()
    }

    delegate::delegate! {
        to self.service {
            pub fn subnetwork(&self) -> Option<&S>;
            pub fn subnetwork_mut(&mut self) -> Option<&mut S>;
        }
    }

    /// Register the indication callback invoked with the payload of received
    /// packets. A previously registered callback is replaced.
    pub fn set_indication<F: FnMut(DataUnit<'a>, u16, bool) + 'a>(&mut self, func: F) {
        self.indication = Some(Box::new(func));
    }

    /// Unregister the indication callback.
    pub fn clear_indication(&mut self) {
        self.indication = None;
    }

    /// Frame the payload into a Space Packet stamped with the automatic
    /// packet counter and send it. The counter advances by exactly one per
    /// call, wrapping around at [MAX_SEQ_COUNT].
    ///
    /// The payload chain must not be empty.
    pub fn request(
        &mut self,
        payload: DataUnit<'a>,
        sec_header: bool,
        ptype: PacketType,
    ) -> ServiceResult {
        let seq_count = self.counter.get_and_increment();
        let packet = self.assemble(payload, sec_header, ptype, seq_count);
        self.service.request(packet, 0)
    }

    /// Frame the payload into a telecommand Space Packet carrying the given
    /// packet name verbatim in the sequence count field and send it. The
    /// automatic packet counter is not advanced: named traffic is addressed
    /// out of band, gaps between names are multiplexing, not loss.
    ///
    /// The payload chain must not be empty.
    pub fn request_by_name(
        &mut self,
        payload: DataUnit<'a>,
        sec_header: bool,
        name: u16,
    ) -> ServiceResult {
        let packet = self.assemble(payload, sec_header, PacketType::Tc, name);
        self.service.request(packet, 0)
    }

    fn assemble(
        &self,
        payload: DataUnit<'a>,
        sec_header: bool,
        ptype: PacketType,
        seq_count: u16,
    ) -> DataUnit<'a> {
        debug_assert!(payload.total_size() > 0);
        // Cannot fail, the APID was validated at construction and the count
        // is masked to 14 bits.
        let packet_id = PacketId::new(ptype, sec_header, self.apid).unwrap();
        let psc =
            PacketSequenceCtrl::new(SequenceFlags::Unsegmented, seq_count & MAX_SEQ_COUNT).unwrap();
        let header = zc::SpHeader::new(packet_id, psc, (payload.total_size() - 1) as u16);
        let mut packet = DataUnit::from_header(header);
        packet.append(payload);
        packet
    }

    /// Called by the packet layer when a Space Packet arrives.
    ///
    /// Packets whose APID does not match this instance are dropped without
    /// any callback or state change, this instance only speaks for its own
    /// logical stream. On a match, the sequence count is checked against
    /// this instance's own tracker, the header node is stripped and the bare
    /// payload chain is reported to the indication callback. Chains without
    /// a decodable header or without a payload node are dropped silently
    /// without any state change.
    pub fn reception(&mut self, mut packet: DataUnit<'a>) {
        let Some(header) = zc::SpHeader::from_bytes(packet.get()) else {
            return;
        };
        if header.apid() != self.apid {
            return;
        }
        let Some(payload) = packet.pop() else {
            return;
        };
        let loss = self.tracker.accept(header.seq_count());
        if let Some(indication) = self.indication.as_mut() {
            indication(payload, self.apid, loss);
        }
    }
}

impl<'a, S: Service<'a>> Service<'a> for OctetService<'a, S> {
    /// Always fails with [ServiceError::NoSupport]. This service is a
    /// payload facing endpoint, not a pass-through for foreign chains.
    fn transfer(&mut self, _du: DataUnit<'a>) -> ServiceResult {
        Err(ServiceError::NoSupport)
    }
}
