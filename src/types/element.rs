//! Information elements.
//!
//! Every element has a fixed encoded width except the file segment, which
//! carries a one-octet length prefix. Multi-octet integers are little-endian.

use bytes::{Buf, BufMut, Bytes};

use crate::error::{Iec104Error, Result};
use crate::types::quality::{
    CounterFlags, FileStatusFlags, OutputCircuits, ProtectionQuality, ProtectionStartEvents,
    Quality,
};
use crate::types::time::{Cp16Time2a, Cp24Time2a, Cp56Time2a};

/// Fixed test bit pattern (FBP) value.
pub const FIXED_TEST_PATTERN: u16 = 0x55AA;

/// Two-bit state of double points, double commands and protection events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoublePointState {
    /// Intermediate state (00), not permitted in commands
    Indeterminate = 0,
    /// Determined OFF (01)
    Off = 1,
    /// Determined ON (10)
    On = 2,
    /// Indeterminate or faulty (11), not permitted in commands
    Faulty = 3,
}

impl DoublePointState {
    /// Decode from the two low bits.
    #[inline]
    pub const fn from_bits(value: u8) -> Self {
        match value & 0x03 {
            0 => Self::Indeterminate,
            1 => Self::Off,
            2 => Self::On,
            _ => Self::Faulty,
        }
    }
}

/// Regulating step command state (RCS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepCommandState {
    /// Not permitted (00)
    NotPermitted = 0,
    /// Next step lower (01)
    Lower = 1,
    /// Next step higher (10)
    Higher = 2,
    /// Not permitted (11)
    Invalid = 3,
}

impl StepCommandState {
    #[inline]
    const fn from_bits(value: u8) -> Self {
        match value & 0x03 {
            0 => Self::NotPermitted,
            1 => Self::Lower,
            2 => Self::Higher,
            _ => Self::Invalid,
        }
    }
}

/// Binary counter reading (BCR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinaryCounterReading {
    /// Counter value
    pub value: i32,
    /// Sequence number (0-31)
    pub sequence: u8,
    /// Carry, adjusted and invalid flags
    pub flags: CounterFlags,
}

/// Information element.
#[derive(Debug, Clone, PartialEq)]
pub enum InformationElement {
    /// Single-point information with quality (SIQ)
    SinglePoint { on: bool, quality: Quality },
    /// Double-point information with quality (DIQ)
    DoublePoint {
        state: DoublePointState,
        quality: Quality,
    },
    /// Value with transient state indication (VTI), value in -64..=63
    StepPosition { value: i8, transient: bool },
    /// Binary state information (BSI), 32 bits
    Bitstring(u32),
    /// Normalized value (NVA), raw fixed-point in [-1, 1 - 2^-15]
    Normalized(i16),
    /// Scaled value (SVA)
    Scaled(i16),
    /// Short floating point value (IEEE 754)
    ShortFloat(f32),
    /// Quality descriptor (QDS)
    Quality(Quality),
    /// Binary counter reading (BCR)
    Counter(BinaryCounterReading),
    /// Single event of protection equipment (SEP)
    ProtectionEvent {
        state: DoublePointState,
        quality: ProtectionQuality,
    },
    /// Start events of protection equipment (SPE)
    ProtectionStart(ProtectionStartEvents),
    /// Output circuit information of protection equipment (OCI)
    OutputCircuit(OutputCircuits),
    /// Quality descriptor for protection equipment events (QDP)
    ProtectionQuality(ProtectionQuality),
    /// Status and status change detection (SCD)
    StatusChanges { status: u16, changes: u16 },
    /// Single command (SCO)
    SingleCommand {
        on: bool,
        qualifier: u8,
        select: bool,
    },
    /// Double command (DCO)
    DoubleCommand {
        state: DoublePointState,
        qualifier: u8,
        select: bool,
    },
    /// Regulating step command (RCO)
    RegulatingStep {
        state: StepCommandState,
        qualifier: u8,
        select: bool,
    },
    /// Qualifier of set-point command (QOS)
    SetpointQualifier { qualifier: u8, select: bool },
    /// Qualifier of interrogation (QOI)
    InterrogationQualifier(u8),
    /// Qualifier of counter interrogation (QCC)
    CounterQualifier { request: u8, freeze: u8 },
    /// Qualifier of parameter of measured values (QPM)
    MeasuredParameterQualifier {
        kind: u8,
        change: bool,
        not_in_operation: bool,
    },
    /// Qualifier of parameter activation (QPA)
    ParameterActivationQualifier(u8),
    /// Qualifier of reset process command (QRP)
    ResetQualifier(u8),
    /// Cause of initialization (COI)
    InitializationCause {
        cause: u8,
        after_parameter_change: bool,
    },
    /// Fixed test bit pattern (FBP)
    FixedTestPattern,
    /// Test sequence counter (TSC)
    TestSequenceCounter(u16),
    /// Elapsed time (CP16Time2a)
    Time16(Cp16Time2a),
    /// Three-octet time tag (CP24Time2a)
    Time24(Cp24Time2a),
    /// Seven-octet time tag (CP56Time2a)
    Time56(Cp56Time2a),
    /// Name of file (NOF)
    FileName(u16),
    /// Name of section (NOS)
    SectionName(u8),
    /// Length of file or section (LOF), 24 bits
    FileLength(u32),
    /// File ready qualifier (FRQ)
    FileReady { qualifier: u8, negative: bool },
    /// Section ready qualifier (SRQ)
    SectionReady { qualifier: u8, not_ready: bool },
    /// Select and call qualifier (SCQ)
    SelectCall(u8),
    /// Last section or segment qualifier (LSQ)
    LastSection(u8),
    /// Checksum (CHS)
    Checksum(u8),
    /// Acknowledge file or section qualifier (AFQ)
    AckFile { action: u8, notice: u8 },
    /// Status of file (SOF)
    FileStatus { status: u8, flags: FileStatusFlags },
    /// File segment with its own length prefix
    Segment(Bytes),
    /// Element bytes produced by a custom type decoder
    Raw(Bytes),
}

/// Element kind, used by the type layout registry to drive decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Siq,
    Diq,
    Vti,
    Bsi,
    Nva,
    Sva,
    Float,
    Qds,
    Bcr,
    Sep,
    Spe,
    Oci,
    Qdp,
    Scd,
    Sco,
    Dco,
    Rco,
    Qos,
    Qoi,
    Qcc,
    Qpm,
    Qpa,
    Qrp,
    Coi,
    Fbp,
    Tsc,
    Time16,
    Time24,
    Time56,
    Nof,
    Nos,
    Lof,
    Frq,
    Srq,
    Scq,
    Lsq,
    Chs,
    Afq,
    Sof,
    Segment,
}

impl ElementKind {
    /// Fixed encoded width, `None` for the length-prefixed segment.
    pub const fn encoded_len(self) -> Option<usize> {
        Some(match self {
            Self::Siq
            | Self::Diq
            | Self::Vti
            | Self::Qds
            | Self::Sep
            | Self::Spe
            | Self::Oci
            | Self::Qdp
            | Self::Sco
            | Self::Dco
            | Self::Rco
            | Self::Qos
            | Self::Qoi
            | Self::Qcc
            | Self::Qpm
            | Self::Qpa
            | Self::Qrp
            | Self::Coi
            | Self::Nos
            | Self::Frq
            | Self::Srq
            | Self::Scq
            | Self::Lsq
            | Self::Chs
            | Self::Afq
            | Self::Sof => 1,
            Self::Nva | Self::Sva | Self::Fbp | Self::Tsc | Self::Time16 | Self::Nof => 2,
            Self::Time24 | Self::Lof => 3,
            Self::Bsi | Self::Float | Self::Scd => 4,
            Self::Bcr => 5,
            Self::Time56 => 7,
            Self::Segment => return None,
        })
    }

    /// Decode one element of this kind from the head of `buf`.
    pub fn decode(self, buf: &mut impl Buf) -> Result<InformationElement> {
        if let Some(len) = self.encoded_len() {
            if buf.remaining() < len {
                return Err(Iec104Error::invalid_asdu(format!(
                    "{self:?} element needs {len} bytes, {} left",
                    buf.remaining()
                )));
            }
        }

        let element = match self {
            Self::Siq => {
                let b = buf.get_u8();
                InformationElement::SinglePoint {
                    on: b & 0x01 != 0,
                    quality: Quality::from_bits_truncate(b & Quality::POINT_MASK),
                }
            }
            Self::Diq => {
                let b = buf.get_u8();
                InformationElement::DoublePoint {
                    state: DoublePointState::from_bits(b),
                    quality: Quality::from_bits_truncate(b & Quality::POINT_MASK),
                }
            }
            Self::Vti => {
                let b = buf.get_u8();
                InformationElement::StepPosition {
                    // sign-extend the 7-bit value
                    value: ((b << 1) as i8) >> 1,
                    transient: b & 0x80 != 0,
                }
            }
            Self::Bsi => InformationElement::Bitstring(buf.get_u32_le()),
            Self::Nva => InformationElement::Normalized(buf.get_i16_le()),
            Self::Sva => InformationElement::Scaled(buf.get_i16_le()),
            Self::Float => InformationElement::ShortFloat(buf.get_f32_le()),
            Self::Qds => InformationElement::Quality(Quality::from_bits_truncate(buf.get_u8())),
            Self::Bcr => {
                let value = buf.get_i32_le();
                let b = buf.get_u8();
                InformationElement::Counter(BinaryCounterReading {
                    value,
                    sequence: b & 0x1F,
                    flags: CounterFlags::from_bits_truncate(b),
                })
            }
            Self::Sep => {
                let b = buf.get_u8();
                InformationElement::ProtectionEvent {
                    state: DoublePointState::from_bits(b),
                    quality: ProtectionQuality::from_bits_truncate(b),
                }
            }
            Self::Spe => InformationElement::ProtectionStart(
                ProtectionStartEvents::from_bits_truncate(buf.get_u8()),
            ),
            Self::Oci => {
                InformationElement::OutputCircuit(OutputCircuits::from_bits_truncate(buf.get_u8()))
            }
            Self::Qdp => InformationElement::ProtectionQuality(
                ProtectionQuality::from_bits_truncate(buf.get_u8()),
            ),
            Self::Scd => {
                let status = buf.get_u16_le();
                let changes = buf.get_u16_le();
                InformationElement::StatusChanges { status, changes }
            }
            Self::Sco => {
                let b = buf.get_u8();
                InformationElement::SingleCommand {
                    on: b & 0x01 != 0,
                    qualifier: (b >> 2) & 0x1F,
                    select: b & 0x80 != 0,
                }
            }
            Self::Dco => {
                let b = buf.get_u8();
                InformationElement::DoubleCommand {
                    state: DoublePointState::from_bits(b),
                    qualifier: (b >> 2) & 0x1F,
                    select: b & 0x80 != 0,
                }
            }
            Self::Rco => {
                let b = buf.get_u8();
                InformationElement::RegulatingStep {
                    state: StepCommandState::from_bits(b),
                    qualifier: (b >> 2) & 0x1F,
                    select: b & 0x80 != 0,
                }
            }
            Self::Qos => {
                let b = buf.get_u8();
                InformationElement::SetpointQualifier {
                    qualifier: b & 0x7F,
                    select: b & 0x80 != 0,
                }
            }
            Self::Qoi => InformationElement::InterrogationQualifier(buf.get_u8()),
            Self::Qcc => {
                let b = buf.get_u8();
                InformationElement::CounterQualifier {
                    request: b & 0x3F,
                    freeze: (b >> 6) & 0x03,
                }
            }
            Self::Qpm => {
                let b = buf.get_u8();
                InformationElement::MeasuredParameterQualifier {
                    kind: b & 0x3F,
                    change: b & 0x40 != 0,
                    not_in_operation: b & 0x80 != 0,
                }
            }
            Self::Qpa => InformationElement::ParameterActivationQualifier(buf.get_u8()),
            Self::Qrp => InformationElement::ResetQualifier(buf.get_u8()),
            Self::Coi => {
                let b = buf.get_u8();
                InformationElement::InitializationCause {
                    cause: b & 0x7F,
                    after_parameter_change: b & 0x80 != 0,
                }
            }
            Self::Fbp => {
                let pattern = buf.get_u16_le();
                if pattern != FIXED_TEST_PATTERN {
                    return Err(Iec104Error::invalid_asdu(format!(
                        "fixed test bit pattern 0x{pattern:04X} is not 0x55AA"
                    )));
                }
                InformationElement::FixedTestPattern
            }
            Self::Tsc => InformationElement::TestSequenceCounter(buf.get_u16_le()),
            Self::Time16 => InformationElement::Time16(Cp16Time2a::decode(buf)?),
            Self::Time24 => InformationElement::Time24(Cp24Time2a::decode(buf)?),
            Self::Time56 => InformationElement::Time56(Cp56Time2a::decode(buf)?),
            Self::Nof => InformationElement::FileName(buf.get_u16_le()),
            Self::Nos => InformationElement::SectionName(buf.get_u8()),
            Self::Lof => InformationElement::FileLength(buf.get_uint_le(3) as u32),
            Self::Frq => {
                let b = buf.get_u8();
                InformationElement::FileReady {
                    qualifier: b & 0x7F,
                    negative: b & 0x80 != 0,
                }
            }
            Self::Srq => {
                let b = buf.get_u8();
                InformationElement::SectionReady {
                    qualifier: b & 0x7F,
                    not_ready: b & 0x80 != 0,
                }
            }
            Self::Scq => InformationElement::SelectCall(buf.get_u8()),
            Self::Lsq => InformationElement::LastSection(buf.get_u8()),
            Self::Chs => InformationElement::Checksum(buf.get_u8()),
            Self::Afq => {
                let b = buf.get_u8();
                InformationElement::AckFile {
                    action: b & 0x0F,
                    notice: (b >> 4) & 0x0F,
                }
            }
            Self::Sof => {
                let b = buf.get_u8();
                InformationElement::FileStatus {
                    status: b & 0x1F,
                    flags: FileStatusFlags::from_bits_truncate(b),
                }
            }
            Self::Segment => {
                if !buf.has_remaining() {
                    return Err(Iec104Error::invalid_asdu_static("segment length missing"));
                }
                let len = usize::from(buf.get_u8());
                if buf.remaining() < len {
                    return Err(Iec104Error::invalid_asdu(format!(
                        "segment of {len} bytes truncated to {}",
                        buf.remaining()
                    )));
                }
                InformationElement::Segment(buf.copy_to_bytes(len))
            }
        };
        Ok(element)
    }
}

impl InformationElement {
    /// Element kind, `None` for raw custom elements.
    pub fn kind(&self) -> Option<ElementKind> {
        Some(match self {
            Self::SinglePoint { .. } => ElementKind::Siq,
            Self::DoublePoint { .. } => ElementKind::Diq,
            Self::StepPosition { .. } => ElementKind::Vti,
            Self::Bitstring(_) => ElementKind::Bsi,
            Self::Normalized(_) => ElementKind::Nva,
            Self::Scaled(_) => ElementKind::Sva,
            Self::ShortFloat(_) => ElementKind::Float,
            Self::Quality(_) => ElementKind::Qds,
            Self::Counter(_) => ElementKind::Bcr,
            Self::ProtectionEvent { .. } => ElementKind::Sep,
            Self::ProtectionStart(_) => ElementKind::Spe,
            Self::OutputCircuit(_) => ElementKind::Oci,
            Self::ProtectionQuality(_) => ElementKind::Qdp,
            Self::StatusChanges { .. } => ElementKind::Scd,
            Self::SingleCommand { .. } => ElementKind::Sco,
            Self::DoubleCommand { .. } => ElementKind::Dco,
            Self::RegulatingStep { .. } => ElementKind::Rco,
            Self::SetpointQualifier { .. } => ElementKind::Qos,
            Self::InterrogationQualifier(_) => ElementKind::Qoi,
            Self::CounterQualifier { .. } => ElementKind::Qcc,
            Self::MeasuredParameterQualifier { .. } => ElementKind::Qpm,
            Self::ParameterActivationQualifier(_) => ElementKind::Qpa,
            Self::ResetQualifier(_) => ElementKind::Qrp,
            Self::InitializationCause { .. } => ElementKind::Coi,
            Self::FixedTestPattern => ElementKind::Fbp,
            Self::TestSequenceCounter(_) => ElementKind::Tsc,
            Self::Time16(_) => ElementKind::Time16,
            Self::Time24(_) => ElementKind::Time24,
            Self::Time56(_) => ElementKind::Time56,
            Self::FileName(_) => ElementKind::Nof,
            Self::SectionName(_) => ElementKind::Nos,
            Self::FileLength(_) => ElementKind::Lof,
            Self::FileReady { .. } => ElementKind::Frq,
            Self::SectionReady { .. } => ElementKind::Srq,
            Self::SelectCall(_) => ElementKind::Scq,
            Self::LastSection(_) => ElementKind::Lsq,
            Self::Checksum(_) => ElementKind::Chs,
            Self::AckFile { .. } => ElementKind::Afq,
            Self::FileStatus { .. } => ElementKind::Sof,
            Self::Segment(_) => ElementKind::Segment,
            Self::Raw(_) => return None,
        })
    }

    /// Number of octets written by [`InformationElement::encode`].
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Segment(data) => 1 + data.len(),
            Self::Raw(data) => data.len(),
            other => other.kind().and_then(ElementKind::encoded_len).unwrap_or(0),
        }
    }

    /// Encode into `buf`.
    pub fn encode(&self, buf: &mut impl BufMut) -> Result<()> {
        match self {
            Self::SinglePoint { on, quality } => {
                buf.put_u8((quality.bits() & Quality::POINT_MASK) | u8::from(*on))
            }
            Self::DoublePoint { state, quality } => {
                buf.put_u8((quality.bits() & Quality::POINT_MASK) | *state as u8)
            }
            Self::StepPosition { value, transient } => {
                if !(-64..=63).contains(value) {
                    return Err(Iec104Error::invalid_asdu(format!(
                        "step position {value} outside -64..=63"
                    )));
                }
                buf.put_u8((*value as u8 & 0x7F) | if *transient { 0x80 } else { 0 })
            }
            Self::Bitstring(bits) => buf.put_u32_le(*bits),
            Self::Normalized(value) | Self::Scaled(value) => buf.put_i16_le(*value),
            Self::ShortFloat(value) => buf.put_f32_le(*value),
            Self::Quality(quality) => buf.put_u8(quality.bits()),
            Self::Counter(reading) => {
                buf.put_i32_le(reading.value);
                buf.put_u8(reading.flags.bits() | (reading.sequence & 0x1F));
            }
            Self::ProtectionEvent { state, quality } => {
                buf.put_u8(quality.bits() | *state as u8)
            }
            Self::ProtectionStart(events) => buf.put_u8(events.bits()),
            Self::OutputCircuit(circuits) => buf.put_u8(circuits.bits()),
            Self::ProtectionQuality(quality) => buf.put_u8(quality.bits()),
            Self::StatusChanges { status, changes } => {
                buf.put_u16_le(*status);
                buf.put_u16_le(*changes);
            }
            Self::SingleCommand {
                on,
                qualifier,
                select,
            } => buf.put_u8(command_octet(u8::from(*on), *qualifier, *select)),
            Self::DoubleCommand {
                state,
                qualifier,
                select,
            } => buf.put_u8(command_octet(*state as u8, *qualifier, *select)),
            Self::RegulatingStep {
                state,
                qualifier,
                select,
            } => buf.put_u8(command_octet(*state as u8, *qualifier, *select)),
            Self::SetpointQualifier { qualifier, select } => {
                buf.put_u8((qualifier & 0x7F) | if *select { 0x80 } else { 0 })
            }
            Self::InterrogationQualifier(value)
            | Self::ParameterActivationQualifier(value)
            | Self::ResetQualifier(value)
            | Self::SectionName(value)
            | Self::SelectCall(value)
            | Self::LastSection(value)
            | Self::Checksum(value) => buf.put_u8(*value),
            Self::CounterQualifier { request, freeze } => {
                buf.put_u8((request & 0x3F) | ((freeze & 0x03) << 6))
            }
            Self::MeasuredParameterQualifier {
                kind,
                change,
                not_in_operation,
            } => buf.put_u8(
                (kind & 0x3F)
                    | if *change { 0x40 } else { 0 }
                    | if *not_in_operation { 0x80 } else { 0 },
            ),
            Self::InitializationCause {
                cause,
                after_parameter_change,
            } => buf.put_u8((cause & 0x7F) | if *after_parameter_change { 0x80 } else { 0 }),
            Self::FixedTestPattern => buf.put_u16_le(FIXED_TEST_PATTERN),
            Self::TestSequenceCounter(counter) => buf.put_u16_le(*counter),
            Self::Time16(time) => time.encode(buf),
            Self::Time24(time) => time.encode(buf),
            Self::Time56(time) => time.encode(buf),
            Self::FileName(name) => buf.put_u16_le(*name),
            Self::FileLength(length) => {
                if *length > 0x00FF_FFFF {
                    return Err(Iec104Error::invalid_asdu(format!(
                        "file length {length} exceeds 24 bits"
                    )));
                }
                buf.put_uint_le(u64::from(*length), 3)
            }
            Self::FileReady {
                qualifier,
                negative,
            } => buf.put_u8((qualifier & 0x7F) | if *negative { 0x80 } else { 0 }),
            Self::SectionReady {
                qualifier,
                not_ready,
            } => buf.put_u8((qualifier & 0x7F) | if *not_ready { 0x80 } else { 0 }),
            Self::AckFile { action, notice } => {
                buf.put_u8((action & 0x0F) | ((notice & 0x0F) << 4))
            }
            Self::FileStatus { status, flags } => buf.put_u8((status & 0x1F) | flags.bits()),
            Self::Segment(data) => {
                let len = u8::try_from(data.len())
                    .map_err(|_| Iec104Error::invalid_asdu_static("segment exceeds 255 bytes"))?;
                buf.put_u8(len);
                buf.put_slice(data);
            }
            Self::Raw(data) => buf.put_slice(data),
        }
        Ok(())
    }

    /// Normalized value as a fraction in [-1, 1).
    pub fn normalized_fraction(&self) -> Option<f32> {
        match self {
            Self::Normalized(raw) => Some(f32::from(*raw) / 32768.0),
            _ => None,
        }
    }
}

#[inline]
fn command_octet(state: u8, qualifier: u8, select: bool) -> u8 {
    (state & 0x03) | ((qualifier & 0x1F) << 2) | if select { 0x80 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(element: &InformationElement) -> Vec<u8> {
        let mut buf = Vec::new();
        element.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), element.encoded_len());
        buf
    }

    #[test]
    fn test_scaled_value_bounds() {
        for value in [i16::MIN, -1, 0, i16::MAX] {
            let bytes = encode(&InformationElement::Scaled(value));
            assert_eq!(bytes, value.to_le_bytes());
            assert_eq!(
                ElementKind::Sva.decode(&mut &bytes[..]).unwrap(),
                InformationElement::Scaled(value)
            );
        }
    }

    #[test]
    fn test_quality_descriptor_all_flags() {
        for bits in 0..=u8::MAX {
            let quality = Quality::from_bits_truncate(bits);
            let decoded = ElementKind::Qds.decode(&mut &[bits][..]).unwrap();
            assert_eq!(decoded, InformationElement::Quality(quality));
            assert_eq!(encode(&decoded), vec![bits & 0xF1]);
        }
    }

    #[test]
    fn test_single_point_keeps_value_bit_separate() {
        let decoded = ElementKind::Siq.decode(&mut &[0x91][..]).unwrap();
        assert_eq!(
            decoded,
            InformationElement::SinglePoint {
                on: true,
                quality: Quality::BLOCKED | Quality::INVALID,
            }
        );
        assert_eq!(encode(&decoded), vec![0x91]);
    }

    #[test]
    fn test_binary_counter_reading() {
        let bytes = [0xFF, 0xFF, 0xFF, 0x7F, 0xFF];
        let decoded = ElementKind::Bcr.decode(&mut &bytes[..]).unwrap();
        assert_eq!(
            decoded,
            InformationElement::Counter(BinaryCounterReading {
                value: i32::MAX,
                sequence: 31,
                flags: CounterFlags::all(),
            })
        );
        assert_eq!(encode(&decoded), bytes);

        let negative = InformationElement::Counter(BinaryCounterReading {
            value: i32::MIN,
            sequence: 0,
            flags: CounterFlags::CARRY,
        });
        assert_eq!(encode(&negative), vec![0x00, 0x00, 0x00, 0x80, 0x20]);
    }

    #[test]
    fn test_bitstring_little_endian() {
        let bytes = encode(&InformationElement::Bitstring(0x1234_5678));
        assert_eq!(bytes, vec![0x78, 0x56, 0x34, 0x12]);
    }

    #[test]
    fn test_step_position_sign() {
        let decoded = ElementKind::Vti.decode(&mut &[0xC0][..]).unwrap();
        assert_eq!(
            decoded,
            InformationElement::StepPosition {
                value: -64,
                transient: true
            }
        );
        assert_eq!(encode(&decoded), vec![0xC0]);

        let decoded = ElementKind::Vti.decode(&mut &[0x3F][..]).unwrap();
        assert_eq!(
            decoded,
            InformationElement::StepPosition {
                value: 63,
                transient: false
            }
        );

        let out_of_range = InformationElement::StepPosition {
            value: 64,
            transient: false,
        };
        assert!(out_of_range.encode(&mut Vec::new()).is_err());
    }

    #[test]
    fn test_command_octets() {
        let sco = InformationElement::SingleCommand {
            on: true,
            qualifier: 1,
            select: true,
        };
        assert_eq!(encode(&sco), vec![0x85]);
        assert_eq!(ElementKind::Sco.decode(&mut &[0x85][..]).unwrap(), sco);

        let dco = ElementKind::Dco.decode(&mut &[0x02][..]).unwrap();
        assert_eq!(
            dco,
            InformationElement::DoubleCommand {
                state: DoublePointState::On,
                qualifier: 0,
                select: false,
            }
        );
    }

    #[test]
    fn test_fixed_test_pattern() {
        assert_eq!(encode(&InformationElement::FixedTestPattern), vec![0xAA, 0x55]);
        assert!(ElementKind::Fbp.decode(&mut &[0xAA, 0x55][..]).is_ok());
        assert!(ElementKind::Fbp.decode(&mut &[0x55, 0xAA][..]).is_err());
    }

    #[test]
    fn test_segment_length_prefix() {
        let segment = InformationElement::Segment(Bytes::from_static(b"abc"));
        let bytes = encode(&segment);
        assert_eq!(bytes, vec![3, b'a', b'b', b'c']);
        assert_eq!(ElementKind::Segment.decode(&mut &bytes[..]).unwrap(), segment);
        assert!(ElementKind::Segment.decode(&mut &[5, 1, 2][..]).is_err());
    }

    #[test]
    fn test_truncated_element() {
        assert!(matches!(
            ElementKind::Float.decode(&mut &[0x00, 0x00][..]),
            Err(Iec104Error::InvalidAsdu(_))
        ));
    }

    #[test]
    fn test_protection_event() {
        let decoded = ElementKind::Sep.decode(&mut &[0x8A][..]).unwrap();
        assert_eq!(
            decoded,
            InformationElement::ProtectionEvent {
                state: DoublePointState::On,
                quality: ProtectionQuality::ELAPSED_TIME_INVALID | ProtectionQuality::INVALID,
            }
        );
        assert_eq!(encode(&decoded), vec![0x8A]);
    }

    #[test]
    fn test_normalized_fraction() {
        assert_eq!(
            InformationElement::Normalized(-32768).normalized_fraction(),
            Some(-1.0)
        );
        assert_eq!(InformationElement::Normalized(16384).normalized_fraction(), Some(0.5));
    }

    const FIXED_KINDS: [ElementKind; 39] = [
        ElementKind::Siq,
        ElementKind::Diq,
        ElementKind::Vti,
        ElementKind::Bsi,
        ElementKind::Nva,
        ElementKind::Sva,
        ElementKind::Float,
        ElementKind::Qds,
        ElementKind::Bcr,
        ElementKind::Sep,
        ElementKind::Spe,
        ElementKind::Oci,
        ElementKind::Qdp,
        ElementKind::Scd,
        ElementKind::Sco,
        ElementKind::Dco,
        ElementKind::Rco,
        ElementKind::Qos,
        ElementKind::Qoi,
        ElementKind::Qcc,
        ElementKind::Qpm,
        ElementKind::Qpa,
        ElementKind::Qrp,
        ElementKind::Coi,
        ElementKind::Fbp,
        ElementKind::Tsc,
        ElementKind::Time16,
        ElementKind::Time24,
        ElementKind::Time56,
        ElementKind::Nof,
        ElementKind::Nos,
        ElementKind::Lof,
        ElementKind::Frq,
        ElementKind::Srq,
        ElementKind::Scq,
        ElementKind::Lsq,
        ElementKind::Chs,
        ElementKind::Afq,
        ElementKind::Sof,
    ];

    fn assert_round_trip(element: &InformationElement) {
        let bytes = encode(element);
        let kind = element.kind().unwrap();
        let decoded = kind.decode(&mut &bytes[..]).unwrap();
        match (element, &decoded) {
            // NaN never equals itself
            (InformationElement::ShortFloat(a), InformationElement::ShortFloat(b)) => {
                assert_eq!(a.to_bits(), b.to_bits())
            }
            _ => assert_eq!(&decoded, element, "{kind:?} from {bytes:02X?}"),
        }
    }

    #[test]
    fn test_every_fixed_kind_round_trips_byte_patterns() {
        for kind in FIXED_KINDS {
            let len = kind.encoded_len().unwrap();
            for byte in 0..=u8::MAX {
                let uniform = vec![byte; len];
                let alternating: Vec<u8> = (0..len)
                    .map(|i| if i % 2 == 0 { byte } else { !byte })
                    .collect();
                let counting: Vec<u8> = (0..len).map(|i| byte.wrapping_add(i as u8)).collect();

                for pattern in [uniform, alternating, counting] {
                    let Ok(element) = kind.decode(&mut &pattern[..]) else {
                        assert_eq!(kind, ElementKind::Fbp, "{kind:?} rejected {pattern:02X?}");
                        continue;
                    };
                    assert_eq!(element.kind(), Some(kind));
                    assert_round_trip(&element);
                }
            }
        }
    }

    #[test]
    fn test_boundary_values_round_trip() {
        use InformationElement as E;

        let point_flags =
            Quality::BLOCKED | Quality::SUBSTITUTED | Quality::NOT_TOPICAL | Quality::INVALID;
        let elements = [
            E::SinglePoint {
                on: false,
                quality: Quality::empty(),
            },
            E::SinglePoint {
                on: true,
                quality: point_flags,
            },
            E::DoublePoint {
                state: DoublePointState::Indeterminate,
                quality: Quality::empty(),
            },
            E::DoublePoint {
                state: DoublePointState::Faulty,
                quality: point_flags,
            },
            E::Bitstring(0),
            E::Bitstring(u32::MAX),
            E::Normalized(i16::MIN),
            E::Normalized(i16::MAX),
            E::ShortFloat(f32::MIN),
            E::ShortFloat(f32::MAX),
            E::ShortFloat(f32::MIN_POSITIVE),
            E::ShortFloat(-0.0),
            E::ShortFloat(f32::INFINITY),
            E::ShortFloat(f32::NEG_INFINITY),
            E::ShortFloat(f32::NAN),
            E::Quality(Quality::all()),
            E::ProtectionEvent {
                state: DoublePointState::Off,
                quality: ProtectionQuality::all(),
            },
            E::ProtectionStart(ProtectionStartEvents::empty()),
            E::ProtectionStart(ProtectionStartEvents::all()),
            E::OutputCircuit(OutputCircuits::empty()),
            E::OutputCircuit(OutputCircuits::all()),
            E::ProtectionQuality(ProtectionQuality::empty()),
            E::ProtectionQuality(ProtectionQuality::all()),
            E::StatusChanges {
                status: 0,
                changes: 0,
            },
            E::StatusChanges {
                status: u16::MAX,
                changes: u16::MAX,
            },
            E::StatusChanges {
                status: 0x8001,
                changes: 0x0180,
            },
            E::DoubleCommand {
                state: DoublePointState::Off,
                qualifier: 31,
                select: true,
            },
            E::RegulatingStep {
                state: StepCommandState::Lower,
                qualifier: 0,
                select: false,
            },
            E::RegulatingStep {
                state: StepCommandState::Higher,
                qualifier: 31,
                select: true,
            },
            E::SetpointQualifier {
                qualifier: 0,
                select: false,
            },
            E::SetpointQualifier {
                qualifier: 127,
                select: true,
            },
            E::InterrogationQualifier(0),
            E::InterrogationQualifier(u8::MAX),
            E::CounterQualifier {
                request: 0,
                freeze: 0,
            },
            E::CounterQualifier {
                request: 63,
                freeze: 3,
            },
            E::MeasuredParameterQualifier {
                kind: 0,
                change: false,
                not_in_operation: false,
            },
            E::MeasuredParameterQualifier {
                kind: 63,
                change: true,
                not_in_operation: true,
            },
            E::ParameterActivationQualifier(u8::MAX),
            E::ResetQualifier(u8::MAX),
            E::InitializationCause {
                cause: 0,
                after_parameter_change: false,
            },
            E::InitializationCause {
                cause: 127,
                after_parameter_change: true,
            },
            E::TestSequenceCounter(0),
            E::TestSequenceCounter(u16::MAX),
            E::Time16(Cp16Time2a(0)),
            E::Time16(Cp16Time2a(u16::MAX)),
            E::Time24(Cp24Time2a {
                milliseconds: 0,
                minute: 0,
                invalid: false,
            }),
            E::Time24(Cp24Time2a {
                milliseconds: 59_999,
                minute: 59,
                invalid: true,
            }),
            E::FileName(0),
            E::FileName(u16::MAX),
            E::SectionName(u8::MAX),
            E::FileLength(0),
            E::FileLength(0x00FF_FFFF),
            E::FileReady {
                qualifier: 0,
                negative: false,
            },
            E::FileReady {
                qualifier: 127,
                negative: true,
            },
            E::SectionReady {
                qualifier: 127,
                not_ready: true,
            },
            E::SelectCall(u8::MAX),
            E::LastSection(u8::MAX),
            E::Checksum(u8::MAX),
            E::AckFile {
                action: 0,
                notice: 0,
            },
            E::AckFile {
                action: 15,
                notice: 15,
            },
            E::FileStatus {
                status: 0,
                flags: FileStatusFlags::empty(),
            },
            E::FileStatus {
                status: 31,
                flags: FileStatusFlags::all(),
            },
            E::Segment(Bytes::new()),
            E::Segment(Bytes::from(vec![0xA5; 255])),
        ];
        for element in &elements {
            assert_round_trip(element);
        }
    }

    #[test]
    fn test_file_length_limited_to_24_bits() {
        assert_eq!(
            encode(&InformationElement::FileLength(0x00FF_FFFF)),
            vec![0xFF, 0xFF, 0xFF]
        );
        assert!(matches!(
            InformationElement::FileLength(0x0100_0000).encode(&mut Vec::new()),
            Err(Iec104Error::InvalidAsdu(_))
        ));
        assert!(InformationElement::Segment(Bytes::from(vec![0; 256]))
            .encode(&mut Vec::new())
            .is_err());
    }
}
