//! Sequence count bookkeeping for both protocol directions.
//!
//! [CcsdsSeqCountProvider] is the transmit side counter which stamps outgoing
//! packets, [SeqCountTracker] is the receive side continuity check which
//! detects packet loss in a stream of incoming sequence counts.
use crate::MAX_SEQ_COUNT;
use core::cell::Cell;

/// Core trait for objects which can provide a 14-bit packet sequence count.
///
/// The functions are not mutable on purpose to allow easier usage with
/// static structs when using the interior mutability pattern.
pub trait SequenceCountProvider {
    fn get(&self) -> u16;

    fn increment(&self);

    fn get_and_increment(&self) -> u16 {
        let val = self.get();
        self.increment();
        val
    }
}

/// Sequence count provider wrapping around at a configurable maximum value.
#[derive(Debug, Clone)]
pub struct SeqCountProviderSimple {
    seq_count: Cell<u16>,
    max_val: u16,
}

impl SeqCountProviderSimple {
    pub fn new(max_val: u16) -> Self {
        Self {
            seq_count: Cell::new(0),
            max_val,
        }
    }
}

impl SequenceCountProvider for SeqCountProviderSimple {
    fn get(&self) -> u16 {
        self.seq_count.get()
    }

    fn increment(&self) {
        self.get_and_increment();
    }

    fn get_and_increment(&self) -> u16 {
        let curr_count = self.seq_count.get();
        if curr_count == self.max_val {
            self.seq_count.set(0);
        } else {
            self.seq_count.set(curr_count + 1);
        }
        curr_count
    }
}

/// Sequence count provider which wraps around at [MAX_SEQ_COUNT].
#[derive(Debug, Clone)]
pub struct CcsdsSeqCountProvider {
    provider: SeqCountProviderSimple,
}

impl Default for CcsdsSeqCountProvider {
    fn default() -> Self {
        Self {
            provider: SeqCountProviderSimple::new(MAX_SEQ_COUNT),
        }
    }
}

impl SequenceCountProvider for CcsdsSeqCountProvider {
    delegate::delegate! {
        to self.provider {
            fn get(&self) -> u16;
            fn increment(&self);
            fn get_and_increment(&self) -> u16;
        }
    }
}

/// Receive side loss detector for one stream of sequence counts.
///
/// The tracker starts out one count before 0, so the first expected count is
/// 0 and any other first count is flagged as loss. The last observed count is
/// updated unconditionally on every accepted packet, even when a loss was
/// detected, so the tracker follows the actual stream position rather than
/// the expected one.
#[derive(Debug, Clone)]
pub struct SeqCountTracker {
    last: u16,
}

impl Default for SeqCountTracker {
    fn default() -> Self {
        Self {
            last: MAX_SEQ_COUNT,
        }
    }
}

impl SeqCountTracker {
    /// Last observed sequence count.
    pub fn last(&self) -> u16 {
        self.last
    }

    /// Feed the sequence count of a received packet into the tracker.
    /// Returns true if the count does not directly follow the last observed
    /// one, which indicates at least one lost packet.
    pub fn accept(&mut self, received: u16) -> bool {
        let received = received & MAX_SEQ_COUNT;
        let expected = self.last.wrapping_add(1) & MAX_SEQ_COUNT;
        self.last = received;
        received != expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_counter() {
        let counter = SeqCountProviderSimple::new(u16::MAX);
        assert_eq!(counter.get(), 0);
        assert_eq!(counter.get_and_increment(), 0);
        assert_eq!(counter.get_and_increment(), 1);
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn test_ccsds_counter() {
        let counter = CcsdsSeqCountProvider::default();
        assert_eq!(counter.get(), 0);
        assert_eq!(counter.get_and_increment(), 0);
        assert_eq!(counter.get_and_increment(), 1);
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn test_ccsds_counter_overflow() {
        let counter = CcsdsSeqCountProvider::default();
        for _ in 0..MAX_SEQ_COUNT as u32 + 1 {
            counter.increment();
        }
        assert_eq!(counter.get(), 0);
    }

    #[test]
    fn test_tracker_first_packet() {
        let mut tracker = SeqCountTracker::default();
        assert_eq!(tracker.last(), MAX_SEQ_COUNT);
        assert!(!tracker.accept(0));
        assert_eq!(tracker.last(), 0);
    }

    #[test]
    fn test_tracker_first_packet_nonzero() {
        // There is no special case for the very first packet, any first
        // count other than 0 is flagged as loss.
        let mut tracker = SeqCountTracker::default();
        assert!(tracker.accept(5));
        assert_eq!(tracker.last(), 5);
    }

    #[test]
    fn test_tracker_gap_detection() {
        let mut tracker = SeqCountTracker::default();
        assert!(!tracker.accept(0));
        assert!(!tracker.accept(1));
        // Counts 2 and 3 lost.
        assert!(tracker.accept(4));
        assert_eq!(tracker.last(), 4);
        // The tracker resynchronizes on the received value.
        assert!(!tracker.accept(5));
    }

    #[test]
    fn test_tracker_wraparound() {
        let mut tracker = SeqCountTracker::default();
        assert!(tracker.accept(MAX_SEQ_COUNT));
        assert!(!tracker.accept(0));
        assert!(!tracker.accept(1));
    }

    #[test]
    fn test_tracker_masks_received_count() {
        let mut tracker = SeqCountTracker::default();
        // Sequence flag bits of a raw sequence control word are ignored.
        assert!(!tracker.accept(0xC000));
        assert_eq!(tracker.last(), 0);
    }
}
