//! # CCSDS Space Packet Protocol services
//!
//! This crate implements the packetization layer of the CCSDS Space Packet
//! Protocol according to
//! [CCSDS 133.0-B-2](https://public.ccsds.org/Pubs/133x0b2e1.pdf). It covers
//! both directions of the protocol:
//!
//!  - On transmission, arbitrary payload octet strings are framed into Space
//!    Packets by prepending the 6-octet primary header and handing the result
//!    to a configured subnetwork.
//!  - On reception, the primary header is parsed and stripped again, sequence
//!    continuity is checked and the payload is delivered to a registered
//!    indication callback.
//!
//! Packet contents are moved between layers as zero-copy [chain::DataUnit]
//! chains, so payload bytes are never copied while a packet travels through
//! the service stack.
//!
//! ## Features
//!
//! `spp-services` is suitable for `no_std` environments. The [chain] and
//! [spp] modules require the `alloc` feature because chain links are boxed.
//! The optional `serde` feature adds [`serde`](https://serde.rs/) derives to
//! the header model types.
//!
//! ## Example
//!
//! ```rust
//! use spp_services::chain::DataUnit;
//! use spp_services::header::PacketType;
//! use spp_services::spp::{OctetService, Service, ServiceResult};
//!
//! struct Loopback;
//!
//! impl<'a> Service<'a> for Loopback {
//!     fn transfer(&mut self, du: DataUnit<'a>) -> ServiceResult {
//!         // 6 octet primary header plus the 10 payload octets.
//!         assert_eq!(du.total_size(), 16);
//!         Ok(())
//!     }
//! }
//!
//! let payload = [0_u8; 10];
//! let mut service = OctetService::new(0x42, Loopback).expect("invalid APID");
//! service
//!     .request(DataUnit::from_slice(&payload), false, PacketType::Tc)
//!     .expect("request failed");
//! ```
#![no_std]
#![cfg_attr(doc_cfg, feature(doc_cfg))]
#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(any(feature = "std", test))]
extern crate std;

#[cfg(feature = "alloc")]
pub mod chain;
pub mod header;
pub mod seq_count;
#[cfg(feature = "alloc")]
pub mod spp;

/// Maximum APID which may be assigned to a logical data stream.
pub const MAX_APID: u16 = 0x7FE;
/// APID reserved for idle packets.
pub const APID_IDLE: u16 = 0x7FF;
/// Maximum value of the 14-bit packet sequence count field.
pub const MAX_SEQ_COUNT: u16 = 2u16.pow(14) - 1;
/// Length of the Space Packet primary header in bytes.
pub const CCSDS_HEADER_LEN: usize = core::mem::size_of::<header::zc::SpHeader>();

pub use crate::header::{PacketId, PacketSequenceCtrl, PacketType, SequenceFlags, SpHeader};
