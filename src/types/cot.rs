//! IEC 60870-5-104 Cause of Transmission (COT).
//!
//! The cause occupies the low six bits of the first COT octet; bit 6 is the
//! negative-confirm flag and bit 7 the test flag. Both flags live on the
//! ASDU, not here.

use crate::error::{Iec104Error, Result};

/// Mask of the cause code within the COT octet.
pub const COT_CAUSE_MASK: u8 = 0x3F;
/// Negative confirmation (P/N) flag within the COT octet.
pub const COT_NEGATIVE_FLAG: u8 = 0x40;
/// Test (T) flag within the COT octet.
pub const COT_TEST_FLAG: u8 = 0x80;

/// Cause of Transmission (COT).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cot {
    /// Periodic, cyclic (1)
    Periodic,
    /// Background scan (2)
    Background,
    /// Spontaneous (3)
    Spontaneous,
    /// Initialized (4)
    Initialized,
    /// Request or requested (5)
    Request,
    /// Activation (6)
    Activation,
    /// Activation confirmation (7)
    ActivationConfirm,
    /// Deactivation (8)
    Deactivation,
    /// Deactivation confirmation (9)
    DeactivationConfirm,
    /// Activation termination (10)
    ActivationTermination,
    /// Return information caused by a remote command (11)
    ReturnRemoteCommand,
    /// Return information caused by a local command (12)
    ReturnLocalCommand,
    /// File transfer (13)
    FileTransfer,
    /// Interrogated by station interrogation (20)
    InterrogatedByStation,
    /// Interrogated by group 1..16 interrogation (21..36)
    InterrogatedByGroup1,
    InterrogatedByGroup2,
    InterrogatedByGroup3,
    InterrogatedByGroup4,
    InterrogatedByGroup5,
    InterrogatedByGroup6,
    InterrogatedByGroup7,
    InterrogatedByGroup8,
    InterrogatedByGroup9,
    InterrogatedByGroup10,
    InterrogatedByGroup11,
    InterrogatedByGroup12,
    InterrogatedByGroup13,
    InterrogatedByGroup14,
    InterrogatedByGroup15,
    InterrogatedByGroup16,
    /// Requested by general counter request (37)
    RequestedByGeneralCounter,
    /// Requested by group 1..4 counter request (38..41)
    RequestedByGroup1Counter,
    RequestedByGroup2Counter,
    RequestedByGroup3Counter,
    RequestedByGroup4Counter,
    /// Unknown type identification (44)
    UnknownTypeId,
    /// Unknown cause of transmission (45)
    UnknownCot,
    /// Unknown common address of ASDU (46)
    UnknownCommonAddress,
    /// Unknown information object address (47)
    UnknownIoa,
    /// Reserved (14..=19, 42, 43), special use (48..=63) or unused (0) code
    Other(u8),
}

impl Cot {
    /// Create COT from the raw COT octet; the flag bits are ignored.
    ///
    /// Codes without a standard meaning decode to [`Cot::Other`].
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        let code = value & COT_CAUSE_MASK;
        match code {
            1 => Self::Periodic,
            2 => Self::Background,
            3 => Self::Spontaneous,
            4 => Self::Initialized,
            5 => Self::Request,
            6 => Self::Activation,
            7 => Self::ActivationConfirm,
            8 => Self::Deactivation,
            9 => Self::DeactivationConfirm,
            10 => Self::ActivationTermination,
            11 => Self::ReturnRemoteCommand,
            12 => Self::ReturnLocalCommand,
            13 => Self::FileTransfer,
            20 => Self::InterrogatedByStation,
            21 => Self::InterrogatedByGroup1,
            22 => Self::InterrogatedByGroup2,
            23 => Self::InterrogatedByGroup3,
            24 => Self::InterrogatedByGroup4,
            25 => Self::InterrogatedByGroup5,
            26 => Self::InterrogatedByGroup6,
            27 => Self::InterrogatedByGroup7,
            28 => Self::InterrogatedByGroup8,
            29 => Self::InterrogatedByGroup9,
            30 => Self::InterrogatedByGroup10,
            31 => Self::InterrogatedByGroup11,
            32 => Self::InterrogatedByGroup12,
            33 => Self::InterrogatedByGroup13,
            34 => Self::InterrogatedByGroup14,
            35 => Self::InterrogatedByGroup15,
            36 => Self::InterrogatedByGroup16,
            37 => Self::RequestedByGeneralCounter,
            38 => Self::RequestedByGroup1Counter,
            39 => Self::RequestedByGroup2Counter,
            40 => Self::RequestedByGroup3Counter,
            41 => Self::RequestedByGroup4Counter,
            44 => Self::UnknownTypeId,
            45 => Self::UnknownCot,
            46 => Self::UnknownCommonAddress,
            47 => Self::UnknownIoa,
            _ => Self::Other(code),
        }
    }

    /// Convert to raw cause code.
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Periodic => 1,
            Self::Background => 2,
            Self::Spontaneous => 3,
            Self::Initialized => 4,
            Self::Request => 5,
            Self::Activation => 6,
            Self::ActivationConfirm => 7,
            Self::Deactivation => 8,
            Self::DeactivationConfirm => 9,
            Self::ActivationTermination => 10,
            Self::ReturnRemoteCommand => 11,
            Self::ReturnLocalCommand => 12,
            Self::FileTransfer => 13,
            Self::InterrogatedByStation => 20,
            Self::InterrogatedByGroup1 => 21,
            Self::InterrogatedByGroup2 => 22,
            Self::InterrogatedByGroup3 => 23,
            Self::InterrogatedByGroup4 => 24,
            Self::InterrogatedByGroup5 => 25,
            Self::InterrogatedByGroup6 => 26,
            Self::InterrogatedByGroup7 => 27,
            Self::InterrogatedByGroup8 => 28,
            Self::InterrogatedByGroup9 => 29,
            Self::InterrogatedByGroup10 => 30,
            Self::InterrogatedByGroup11 => 31,
            Self::InterrogatedByGroup12 => 32,
            Self::InterrogatedByGroup13 => 33,
            Self::InterrogatedByGroup14 => 34,
            Self::InterrogatedByGroup15 => 35,
            Self::InterrogatedByGroup16 => 36,
            Self::RequestedByGeneralCounter => 37,
            Self::RequestedByGroup1Counter => 38,
            Self::RequestedByGroup2Counter => 39,
            Self::RequestedByGroup3Counter => 40,
            Self::RequestedByGroup4Counter => 41,
            Self::UnknownTypeId => 44,
            Self::UnknownCot => 45,
            Self::UnknownCommonAddress => 46,
            Self::UnknownIoa => 47,
            Self::Other(code) => code,
        }
    }

    /// Raw cause code, checked to fit the six cause bits.
    pub fn to_code(self) -> Result<u8> {
        match self {
            Self::Other(code) if code > COT_CAUSE_MASK => Err(Iec104Error::UnknownCot(code)),
            other => Ok(other.as_u8()),
        }
    }

    /// Check if the code lies in the special use range (48..=63).
    #[inline]
    pub const fn is_special_use(&self) -> bool {
        matches!(self.as_u8(), 48..=63)
    }

    /// Check if this cause confirms or terminates an activation.
    #[inline]
    pub const fn is_confirmation(&self) -> bool {
        matches!(
            self,
            Self::ActivationConfirm | Self::DeactivationConfirm | Self::ActivationTermination
        )
    }

    /// Check if this cause reports an addressing or type error of the peer.
    #[inline]
    pub const fn is_unknown_reply(&self) -> bool {
        matches!(self.as_u8(), 44..=47)
    }

    /// Check if this COT indicates an interrogation response.
    #[inline]
    pub const fn is_interrogation_response(&self) -> bool {
        matches!(self.as_u8(), 20..=36)
    }

    /// Check if this COT indicates a counter request response.
    #[inline]
    pub const fn is_counter_response(&self) -> bool {
        matches!(self.as_u8(), 37..=41)
    }

    /// Interrogation response cause for a qualifier of interrogation
    /// (20 = station, 21..=36 = groups).
    pub fn for_interrogation_group(qoi: u8) -> Option<Self> {
        if (20..=36).contains(&qoi) {
            Some(Self::from_u8(qoi))
        } else {
            None
        }
    }
}

impl std::fmt::Display for Cot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InterrogatedByStation => write!(f, "InterrogatedByStation"),
            Self::RequestedByGeneralCounter => write!(f, "RequestedByGeneralCounter"),
            other if other.is_interrogation_response() => {
                write!(f, "InterrogatedByGroup{}", other.as_u8() - 20)
            }
            other if other.is_counter_response() => {
                write!(f, "RequestedByGroup{}Counter", other.as_u8() - 37)
            }
            Self::Other(code) => write!(f, "Cot({code})"),
            other => write!(f, "{other:?}"),
        }
    }
}
