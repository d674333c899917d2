//! Send/receive sequence numbers and the k/w flow-control window.

use std::collections::VecDeque;

use tokio::time::Instant;

use crate::error::{Iec104Error, Result};
use crate::types::SEQ_MODULUS;

/// Sequence counters of one connection.
///
/// `send_seq` is V(S), the number the next outgoing I-frame carries.
/// `recv_seq` is V(R), the number the next incoming I-frame must carry.
#[derive(Debug, Clone)]
pub struct SequenceState {
    send_seq: u16,
    recv_seq: u16,
    /// Sent but unacknowledged I-frames with their send instants, oldest first.
    pending: VecDeque<(u16, Instant)>,
    unacked_received: u16,
    k: u16,
    w: u16,
}

impl SequenceState {
    /// Create a fresh state with both counters at zero.
    pub fn new(k: u16, w: u16) -> Self {
        Self {
            send_seq: 0,
            recv_seq: 0,
            pending: VecDeque::with_capacity(usize::from(k)),
            unacked_received: 0,
            k,
            w,
        }
    }

    #[inline]
    pub fn send_seq(&self) -> u16 {
        self.send_seq
    }

    #[inline]
    pub fn recv_seq(&self) -> u16 {
        self.recv_seq
    }

    /// Number of sent I-frames still waiting for an acknowledgment.
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Number of received I-frames not yet acknowledged to the peer.
    #[inline]
    pub fn unacked_received(&self) -> u16 {
        self.unacked_received
    }

    /// Whether k I-frames are outstanding.
    #[inline]
    pub fn window_full(&self) -> bool {
        self.pending.len() >= usize::from(self.k)
    }

    /// Send instant of the oldest unacknowledged I-frame.
    #[inline]
    pub fn oldest_pending(&self) -> Option<Instant> {
        self.pending.front().map(|&(_, sent)| sent)
    }

    /// Claim the sequence numbers for an outgoing I-frame.
    ///
    /// Returns `(N(S), N(R))`. The frame acknowledges everything received
    /// so far. Callers must check [`window_full`](Self::window_full) first.
    pub fn next_send(&mut self, now: Instant) -> (u16, u16) {
        let ns = self.send_seq;
        self.send_seq = (ns + 1) % SEQ_MODULUS;
        self.pending.push_back((ns, now));
        self.unacked_received = 0;
        (ns, self.recv_seq)
    }

    /// Record an S-frame sent to the peer; returns the N(R) it carries.
    pub fn ack_received(&mut self) -> u16 {
        self.unacked_received = 0;
        self.recv_seq
    }

    /// Apply an acknowledgment N(R) received from the peer.
    ///
    /// Every pending frame preceding `nr` is released. Returns how many
    /// frames were released. An `nr` acknowledging frames never sent is a
    /// sequence error.
    pub fn acknowledge(&mut self, nr: u16) -> Result<usize> {
        let base = self.pending.front().map_or(self.send_seq, |&(seq, _)| seq);
        let released = usize::from(nr.wrapping_sub(base) % SEQ_MODULUS);
        if nr >= SEQ_MODULUS || released > self.pending.len() {
            return Err(Iec104Error::Sequence {
                expected: self.send_seq,
                actual: nr,
            });
        }
        self.pending.drain(..released);
        Ok(released)
    }

    /// Accept an incoming I-frame carrying `ns`.
    ///
    /// Returns `true` once w frames are unacknowledged and an S-frame is due.
    pub fn receive(&mut self, ns: u16) -> Result<bool> {
        if ns != self.recv_seq {
            return Err(Iec104Error::Sequence {
                expected: self.recv_seq,
                actual: ns,
            });
        }
        self.recv_seq = (ns + 1) % SEQ_MODULUS;
        self.unacked_received = self.unacked_received.saturating_add(1);
        Ok(self.unacked_received >= self.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_wrap() {
        let now = Instant::now();
        let mut seq = SequenceState::new(12, 8);
        for _ in 0..40_000u32 {
            seq.next_send(now);
            let released = seq.acknowledge(seq.send_seq()).unwrap();
            assert_eq!(released, 1);
        }
        assert_eq!(u32::from(seq.send_seq()), 40_000 % 32_768);

        for n in 0..40_000u32 {
            seq.receive((n % 32_768) as u16).unwrap();
            seq.ack_received();
        }
        assert_eq!(u32::from(seq.recv_seq()), 40_000 % 32_768);
    }

    #[test]
    fn test_window_fills_at_k() {
        let now = Instant::now();
        let mut seq = SequenceState::new(3, 2);
        for expected in 0..3 {
            assert!(!seq.window_full());
            assert_eq!(seq.next_send(now), (expected, 0));
        }
        assert!(seq.window_full());

        assert_eq!(seq.acknowledge(2).unwrap(), 2);
        assert_eq!(seq.pending_count(), 1);
        assert!(!seq.window_full());
    }

    #[test]
    fn test_acknowledge_across_wrap() {
        let now = Instant::now();
        let mut seq = SequenceState::new(12, 8);
        seq.send_seq = 32_766;
        seq.next_send(now);
        seq.next_send(now);
        seq.next_send(now);
        assert_eq!(seq.send_seq(), 1);

        assert_eq!(seq.acknowledge(0).unwrap(), 2);
        assert_eq!(seq.acknowledge(0).unwrap(), 0);
        assert_eq!(seq.acknowledge(1).unwrap(), 1);
    }

    #[test]
    fn test_acknowledge_unsent_frame() {
        let now = Instant::now();
        let mut seq = SequenceState::new(12, 8);
        seq.next_send(now);
        assert!(matches!(
            seq.acknowledge(2),
            Err(Iec104Error::Sequence { expected: 1, actual: 2 })
        ));
        assert!(seq.acknowledge(32_767).is_err());
        assert!(seq.acknowledge(0).is_ok());
    }

    #[test]
    fn test_receive_requires_exact_sequence() {
        let mut seq = SequenceState::new(12, 8);
        assert!(!seq.receive(0).unwrap());
        assert!(matches!(
            seq.receive(2),
            Err(Iec104Error::Sequence { expected: 1, actual: 2 })
        ));
    }

    #[test]
    fn test_w_threshold() {
        let mut seq = SequenceState::new(12, 3);
        assert!(!seq.receive(0).unwrap());
        assert!(!seq.receive(1).unwrap());
        assert!(seq.receive(2).unwrap());
        assert_eq!(seq.ack_received(), 3);
        assert_eq!(seq.unacked_received(), 0);

        // An outgoing I-frame also acknowledges
        seq.receive(3).unwrap();
        let (_, nr) = seq.next_send(Instant::now());
        assert_eq!(nr, 4);
        assert_eq!(seq.unacked_received(), 0);
    }

    #[test]
    fn test_oldest_pending() {
        let start = Instant::now();
        let mut seq = SequenceState::new(12, 8);
        assert!(seq.oldest_pending().is_none());
        seq.next_send(start);
        seq.next_send(start + std::time::Duration::from_secs(1));
        assert_eq!(seq.oldest_pending(), Some(start));
        seq.acknowledge(1).unwrap();
        assert_eq!(
            seq.oldest_pending(),
            Some(start + std::time::Duration::from_secs(1))
        );
    }
}
