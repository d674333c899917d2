//! Connection settings.
//!
//! A [`ConnectionSettings`] value is an immutable snapshot: every connection
//! keeps its own clone, so changing a settings value after a connection was
//! created never affects that connection.

use std::time::Duration;

use crate::error::{Iec104Error, Result};

/// Default IEC 104 port.
pub const DEFAULT_PORT: u16 = 2404;

/// Default t1 timeout (acknowledgment of sent frames).
pub const DEFAULT_T1: Duration = Duration::from_secs(15);

/// Default t2 timeout (acknowledgment of received I-frames).
pub const DEFAULT_T2: Duration = Duration::from_secs(10);

/// Default t3 timeout (idle link test).
pub const DEFAULT_T3: Duration = Duration::from_secs(20);

/// Default k parameter (max unacknowledged sent I-frames).
pub const DEFAULT_K: u16 = 12;

/// Default w parameter (max unacknowledged received I-frames).
pub const DEFAULT_W: u16 = 8;

const MAX_WINDOW: u16 = 32767;

/// Per-connection protocol settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Width of the cause of transmission field (1 or 2 bytes).
    pub cot_field_length: usize,
    /// Width of the common address field (1 or 2 bytes).
    pub common_address_field_length: usize,
    /// Width of the information object address field (1 to 3 bytes).
    pub ioa_field_length: usize,
    /// t1: acknowledgment timeout for sent I-frames and test/stop frames.
    pub t1: Duration,
    /// t2: acknowledgment delay for received I-frames.
    pub t2: Duration,
    /// t3: idle time before a test frame is sent.
    pub t3: Duration,
    /// k: max unacknowledged sent I-frames before sending blocks.
    pub k: u16,
    /// w: max unacknowledged received I-frames before an S-frame is sent.
    pub w: u16,
    /// Default timeout for a STARTDT exchange.
    pub handshake_timeout: Duration,
    /// Default timeout for application confirmations.
    pub response_timeout: Duration,
    /// Originator address stamped on commands sent by the helpers.
    ///
    /// 0 routes responses to every controlling station. Only carried on the
    /// wire with a two-octet COT field.
    pub originator_address: u8,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            cot_field_length: 2,
            common_address_field_length: 2,
            ioa_field_length: 3,
            t1: DEFAULT_T1,
            t2: DEFAULT_T2,
            t3: DEFAULT_T3,
            k: DEFAULT_K,
            w: DEFAULT_W,
            handshake_timeout: DEFAULT_T1,
            response_timeout: Duration::from_secs(20),
            originator_address: 0,
        }
    }
}

impl ConnectionSettings {
    /// Create settings with the standard defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cause of transmission field width.
    pub fn cot_field_length(mut self, length: usize) -> Self {
        self.cot_field_length = length;
        self
    }

    /// Set the common address field width.
    pub fn common_address_field_length(mut self, length: usize) -> Self {
        self.common_address_field_length = length;
        self
    }

    /// Set the information object address field width.
    pub fn ioa_field_length(mut self, length: usize) -> Self {
        self.ioa_field_length = length;
        self
    }

    /// Set the t1 timeout.
    pub fn t1(mut self, timeout: Duration) -> Self {
        self.t1 = timeout;
        self
    }

    /// Set the t2 timeout.
    pub fn t2(mut self, timeout: Duration) -> Self {
        self.t2 = timeout;
        self
    }

    /// Set the t3 timeout.
    pub fn t3(mut self, timeout: Duration) -> Self {
        self.t3 = timeout;
        self
    }

    /// Set the k parameter.
    pub fn k(mut self, k: u16) -> Self {
        self.k = k;
        self
    }

    /// Set the w parameter.
    pub fn w(mut self, w: u16) -> Self {
        self.w = w;
        self
    }

    /// Set the STARTDT handshake timeout.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Set the application confirmation timeout.
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Set the originator address of outgoing commands.
    pub fn originator_address(mut self, address: u8) -> Self {
        self.originator_address = address;
        self
    }

    /// Check the settings for consistency.
    pub fn validate(&self) -> Result<()> {
        if !(1..=2).contains(&self.cot_field_length) {
            return Err(Iec104Error::config(format!(
                "COT field length must be 1 or 2, got {}",
                self.cot_field_length
            )));
        }
        if !(1..=2).contains(&self.common_address_field_length) {
            return Err(Iec104Error::config(format!(
                "common address field length must be 1 or 2, got {}",
                self.common_address_field_length
            )));
        }
        if !(1..=3).contains(&self.ioa_field_length) {
            return Err(Iec104Error::config(format!(
                "IOA field length must be 1 to 3, got {}",
                self.ioa_field_length
            )));
        }
        if !(1..=MAX_WINDOW).contains(&self.k) || !(1..=MAX_WINDOW).contains(&self.w) {
            return Err(Iec104Error::config(format!(
                "k and w must be within 1..={MAX_WINDOW}, got k={} w={}",
                self.k, self.w
            )));
        }
        if self.w > self.k {
            return Err(Iec104Error::config(format!(
                "w ({}) must not exceed k ({})",
                self.w, self.k
            )));
        }
        for (name, value) in [
            ("t1", self.t1),
            ("t2", self.t2),
            ("t3", self.t3),
            ("handshake timeout", self.handshake_timeout),
            ("response timeout", self.response_timeout),
        ] {
            if value.is_zero() {
                return Err(Iec104Error::config(format!("{name} must be non-zero")));
            }
        }
        if self.originator_address != 0 && self.cot_field_length != 2 {
            return Err(Iec104Error::config(format!(
                "originator address {} needs a two-octet COT field",
                self.originator_address
            )));
        }
        if self.t2 >= self.t1 {
            return Err(Iec104Error::config(format!(
                "t2 ({:?}) must be shorter than t1 ({:?})",
                self.t2, self.t1
            )));
        }
        Ok(())
    }
}
