//! IEC 60870-5-104 APCI (Application Protocol Control Information).
//!
//! ```text
//! +--------+--------+--------+--------+--------+--------+
//! | 0x68   | Length | CF1    | CF2    | CF3    | CF4    |
//! +--------+--------+--------+--------+--------+--------+
//! ```
//!
//! The length octet counts the four control octets plus the ASDU.

use std::fmt;

use bytes::BufMut;

use crate::error::{Iec104Error, Result};

/// Start byte for IEC 104 frames.
pub const START_BYTE: u8 = 0x68;

/// Minimum APDU length (control field only).
pub const MIN_APDU_LENGTH: usize = 4;

/// Maximum APDU length.
pub const MAX_APDU_LENGTH: usize = 253;

/// Largest ASDU an I-frame can carry.
pub const MAX_ASDU_LENGTH: usize = MAX_APDU_LENGTH - MIN_APDU_LENGTH;

/// Sequence numbers are 15 bits wide.
pub const SEQ_MODULUS: u16 = 1 << 15;

/// APCI frame type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    /// I-frame: Information transfer
    IFrame,
    /// S-frame: Supervisory (acknowledgment)
    SFrame,
    /// U-frame: Unnumbered (control)
    UFrame,
}

/// U-frame function codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UFunction {
    StartDtAct,
    StartDtCon,
    StopDtAct,
    StopDtCon,
    TestFrAct,
    TestFrCon,
}

impl UFunction {
    /// First control octet carrying this function.
    #[inline]
    pub const fn control_byte(self) -> u8 {
        match self {
            Self::StartDtAct => 0x07,
            Self::StartDtCon => 0x0B,
            Self::StopDtAct => 0x13,
            Self::StopDtCon => 0x23,
            Self::TestFrAct => 0x43,
            Self::TestFrCon => 0x83,
        }
    }

    /// Parse a U-function from the first control octet.
    ///
    /// Exactly one function bit must be set.
    #[inline]
    pub fn from_control_byte(byte: u8) -> Result<Self> {
        match byte {
            0x07 => Ok(Self::StartDtAct),
            0x0B => Ok(Self::StartDtCon),
            0x13 => Ok(Self::StopDtAct),
            0x23 => Ok(Self::StopDtCon),
            0x43 => Ok(Self::TestFrAct),
            0x83 => Ok(Self::TestFrCon),
            other => Err(Iec104Error::framing(format!(
                "invalid U-frame control octet 0x{other:02X}"
            ))),
        }
    }

    /// Whether this is an activation (`*_ACT`).
    #[inline]
    pub const fn is_activation(self) -> bool {
        matches!(self, Self::StartDtAct | Self::StopDtAct | Self::TestFrAct)
    }

    /// Confirmation answering this activation; confirmations map to themselves.
    #[inline]
    pub const fn confirmation(self) -> Self {
        match self {
            Self::StartDtAct | Self::StartDtCon => Self::StartDtCon,
            Self::StopDtAct | Self::StopDtCon => Self::StopDtCon,
            Self::TestFrAct | Self::TestFrCon => Self::TestFrCon,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::StartDtAct => "STARTDT act",
            Self::StartDtCon => "STARTDT con",
            Self::StopDtAct => "STOPDT act",
            Self::StopDtCon => "STOPDT con",
            Self::TestFrAct => "TESTFR act",
            Self::TestFrCon => "TESTFR con",
        }
    }
}

impl fmt::Display for UFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded control field of an APDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Apci {
    /// I-frame with send and receive sequence numbers.
    IFrame { send_seq: u16, recv_seq: u16 },
    /// S-frame acknowledging everything before `recv_seq`.
    SFrame { recv_seq: u16 },
    /// U-frame with function code.
    UFrame { function: UFunction },
}

impl Apci {
    /// Create a new I-frame APCI.
    #[inline]
    pub const fn i_frame(send_seq: u16, recv_seq: u16) -> Self {
        Self::IFrame { send_seq, recv_seq }
    }

    /// Create a new S-frame APCI.
    #[inline]
    pub const fn s_frame(recv_seq: u16) -> Self {
        Self::SFrame { recv_seq }
    }

    /// Create a new U-frame APCI.
    #[inline]
    pub const fn u_frame(function: UFunction) -> Self {
        Self::UFrame { function }
    }

    /// Get the frame type.
    #[inline]
    pub const fn frame_type(&self) -> FrameType {
        match self {
            Self::IFrame { .. } => FrameType::IFrame,
            Self::SFrame { .. } => FrameType::SFrame,
            Self::UFrame { .. } => FrameType::UFrame,
        }
    }

    /// Parse the four control octets.
    pub fn parse(control: [u8; 4]) -> Result<Self> {
        let [cf1, cf2, cf3, cf4] = control;
        let recv_seq = (u16::from(cf4) << 7) | u16::from(cf3 >> 1);

        if cf1 & 0x01 == 0 {
            let send_seq = (u16::from(cf2) << 7) | u16::from(cf1 >> 1);
            return Ok(Self::IFrame { send_seq, recv_seq });
        }
        if cf1 & 0x03 == 0x01 {
            if cf1 != 0x01 || cf2 != 0x00 {
                return Err(Iec104Error::framing(format!(
                    "invalid S-frame control octets 0x{cf1:02X} 0x{cf2:02X}"
                )));
            }
            return Ok(Self::SFrame { recv_seq });
        }
        if cf2 != 0 || cf3 != 0 || cf4 != 0 {
            return Err(Iec104Error::framing_static(
                "U-frame with non-zero trailing control octets",
            ));
        }
        UFunction::from_control_byte(cf1).map(Self::u_frame)
    }

    /// Encode the four control octets.
    pub const fn encode(&self) -> [u8; 4] {
        match *self {
            Self::IFrame { send_seq, recv_seq } => {
                let [cf1, cf2] = seq_octets(send_seq);
                let [cf3, cf4] = seq_octets(recv_seq);
                [cf1, cf2, cf3, cf4]
            }
            Self::SFrame { recv_seq } => {
                let [cf3, cf4] = seq_octets(recv_seq);
                [0x01, 0x00, cf3, cf4]
            }
            Self::UFrame { function } => [function.control_byte(), 0x00, 0x00, 0x00],
        }
    }

    /// Write start byte, length and control octets for an ASDU of `asdu_len` bytes.
    pub fn write_header(&self, asdu_len: usize, dst: &mut impl BufMut) -> Result<()> {
        if asdu_len > MAX_ASDU_LENGTH {
            return Err(Iec104Error::framing(format!(
                "ASDU of {asdu_len} bytes exceeds {MAX_ASDU_LENGTH}"
            )));
        }
        if asdu_len > 0 && !matches!(self, Self::IFrame { .. }) {
            return Err(Iec104Error::framing_static("only I-frames carry an ASDU"));
        }
        dst.put_u8(START_BYTE);
        dst.put_u8((MIN_APDU_LENGTH + asdu_len) as u8);
        dst.put_slice(&self.encode());
        Ok(())
    }

    /// Get the send sequence number (I-frame only).
    #[inline]
    pub const fn send_seq(&self) -> Option<u16> {
        match *self {
            Self::IFrame { send_seq, .. } => Some(send_seq),
            _ => None,
        }
    }

    /// Get the receive sequence number (I-frame and S-frame).
    #[inline]
    pub const fn recv_seq(&self) -> Option<u16> {
        match *self {
            Self::IFrame { recv_seq, .. } | Self::SFrame { recv_seq } => Some(recv_seq),
            Self::UFrame { .. } => None,
        }
    }
}

const fn seq_octets(seq: u16) -> [u8; 2] {
    let seq = seq % SEQ_MODULUS;
    [((seq & 0x7F) << 1) as u8, (seq >> 7) as u8]
}

impl fmt::Display for Apci {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IFrame { send_seq, recv_seq } => write!(f, "I(S={send_seq}, R={recv_seq})"),
            Self::SFrame { recv_seq } => write!(f, "S(R={recv_seq})"),
            Self::UFrame { function } => write!(f, "U({function})"),
        }
    }
}
