//! Deadline table for the t1/t2/t3 protocol timers.
//!
//! The table performs no waiting itself. The supervision task of a
//! connection sleeps until [`TimerManager::next_deadline`] and then
//! collects what expired with [`TimerManager::take_expired`].

use std::fmt;

use tokio::time::Instant;

/// Protocol timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Acknowledgment of a sent I-frame or U-frame activation
    T1,
    /// Acknowledgment of received I-frames
    T2,
    /// Idle link test
    T3,
}

impl Timer {
    const ALL: [Timer; 3] = [Timer::T1, Timer::T2, Timer::T3];

    const fn index(self) -> usize {
        match self {
            Self::T1 => 0,
            Self::T2 => 1,
            Self::T3 => 2,
        }
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::T1 => f.write_str("t1"),
            Self::T2 => f.write_str("t2"),
            Self::T3 => f.write_str("t3"),
        }
    }
}

/// Armed deadlines, at most one per timer.
#[derive(Debug, Clone, Default)]
pub struct TimerManager {
    deadlines: [Option<Instant>; 3],
}

impl TimerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `timer`, replacing any previous deadline.
    pub fn arm(&mut self, timer: Timer, deadline: Instant) {
        self.deadlines[timer.index()] = Some(deadline);
    }

    /// Arm `timer` only if it is not already running.
    ///
    /// Returns whether the deadline was set.
    pub fn arm_if_idle(&mut self, timer: Timer, deadline: Instant) -> bool {
        let slot = &mut self.deadlines[timer.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(deadline);
        true
    }

    pub fn cancel(&mut self, timer: Timer) {
        self.deadlines[timer.index()] = None;
    }

    pub fn cancel_all(&mut self) {
        self.deadlines = [None; 3];
    }

    pub fn deadline(&self, timer: Timer) -> Option<Instant> {
        self.deadlines[timer.index()]
    }

    pub fn is_armed(&self, timer: Timer) -> bool {
        self.deadlines[timer.index()].is_some()
    }

    /// Earliest armed deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.iter().flatten().min().copied()
    }

    /// Disarm and return every timer whose deadline is at or before `now`,
    /// in t1, t2, t3 order.
    pub fn take_expired(&mut self, now: Instant) -> Vec<Timer> {
        Timer::ALL
            .into_iter()
            .filter(|&timer| {
                let slot = &mut self.deadlines[timer.index()];
                match *slot {
                    Some(deadline) if deadline <= now => {
                        *slot = None;
                        true
                    }
                    _ => false,
                }
            })
            .collect()
    }
}
