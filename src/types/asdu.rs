//! IEC 60870-5-104 ASDU (Application Service Data Unit).
//!
//! ```text
//! +---------+-----+-----------+-------------+----+-----------------------+
//! | TypeId  | VSQ | COT       | Originator  | CA | Information objects   |
//! | 1       | 1   | 1         | 0/1         | 1-2| IOA(1-3) + elements...|
//! +---------+-----+-----------+-------------+----+-----------------------+
//! ```
//!
//! With SQ=0 every object carries its own address and one element set.
//! With SQ=1 the ASDU holds one object whose element sets are addressed
//! consecutively from its address.

use std::fmt;
use std::sync::Arc;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::config::ConnectionSettings;
use crate::error::{Iec104Error, Result};
use crate::types::cot::{Cot, COT_NEGATIVE_FLAG, COT_TEST_FLAG};
use crate::types::element::{ElementKind, InformationElement};
use crate::types::type_id::{TypeCode, TypeId};

/// Largest number of objects or element sets a VSQ can announce.
pub const MAX_VSQ_COUNT: usize = 127;

/// Variable Structure Qualifier (VSQ).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vsq {
    /// Number of information objects or element sets (0-127)
    pub count: u8,
    /// If true, element sets are addressed sequentially (SQ=1)
    pub sequence: bool,
}

impl Vsq {
    /// Create a new VSQ.
    #[inline]
    pub const fn new(count: u8, sequence: bool) -> Self {
        Self { count, sequence }
    }

    /// Parse VSQ from byte.
    #[inline]
    pub const fn from_u8(value: u8) -> Self {
        Self {
            count: value & 0x7F,
            sequence: (value & 0x80) != 0,
        }
    }

    /// Encode VSQ to byte.
    #[inline]
    pub const fn as_u8(&self) -> u8 {
        (self.count & 0x7F) | if self.sequence { 0x80 } else { 0 }
    }
}

/// Information object: an address and one or more element sets.
#[derive(Debug, Clone, PartialEq)]
pub struct InformationObject {
    /// Information object address of the first element set
    pub address: u32,
    /// Element sets; more than one only in SQ=1 ASDUs
    pub element_sets: Vec<Vec<InformationElement>>,
}

impl InformationObject {
    /// Object with a single element set.
    pub fn new(address: u32, elements: Vec<InformationElement>) -> Self {
        Self {
            address,
            element_sets: vec![elements],
        }
    }

    /// Object with consecutive element sets for an SQ=1 ASDU.
    pub fn sequence(address: u32, element_sets: Vec<Vec<InformationElement>>) -> Self {
        Self {
            address,
            element_sets,
        }
    }

    /// Iterate over `(address, elements)` pairs, resolving SQ addressing.
    pub fn addressed_sets(&self) -> impl Iterator<Item = (u32, &[InformationElement])> + '_ {
        self.element_sets
            .iter()
            .enumerate()
            .map(move |(i, set)| (self.address.wrapping_add(i as u32), set.as_slice()))
    }
}

/// ASDU body.
#[derive(Debug, Clone, PartialEq)]
pub enum AsduPayload {
    /// Decoded information objects.
    Objects(Vec<InformationObject>),
    /// Undecoded body of a private-range type, kept verbatim.
    Private { count: u8, data: Bytes },
}

/// Complete ASDU.
#[derive(Debug, Clone, PartialEq)]
pub struct Asdu {
    /// Type identification
    pub type_code: TypeCode,
    /// SQ bit of the VSQ
    pub sequence: bool,
    /// Cause of transmission
    pub cot: Cot,
    /// Test flag
    pub test: bool,
    /// Negative confirmation flag
    pub negative: bool,
    /// Originator address, only sent with a 2-octet COT field
    pub originator: u8,
    /// Common address of ASDU (station address)
    pub common_address: u16,
    /// Information objects
    pub payload: AsduPayload,
}

impl Asdu {
    /// Create an SQ=0 ASDU of a standard type.
    pub fn new(
        type_id: TypeId,
        cot: Cot,
        common_address: u16,
        objects: Vec<InformationObject>,
    ) -> Self {
        Self {
            type_code: TypeCode::Standard(type_id),
            sequence: false,
            cot,
            test: false,
            negative: false,
            originator: 0,
            common_address,
            payload: AsduPayload::Objects(objects),
        }
    }

    /// Create an ASDU with one object holding one element set.
    pub fn single(
        type_id: TypeId,
        cot: Cot,
        common_address: u16,
        address: u32,
        elements: Vec<InformationElement>,
    ) -> Self {
        Self::new(
            type_id,
            cot,
            common_address,
            vec![InformationObject::new(address, elements)],
        )
    }

    /// Create an SQ=1 ASDU from consecutive element sets.
    pub fn sequence(
        type_id: TypeId,
        cot: Cot,
        common_address: u16,
        address: u32,
        element_sets: Vec<Vec<InformationElement>>,
    ) -> Self {
        let mut asdu = Self::new(
            type_id,
            cot,
            common_address,
            vec![InformationObject::sequence(address, element_sets)],
        );
        asdu.sequence = true;
        asdu
    }

    /// Standard type identification, if any.
    #[inline]
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_code.standard()
    }

    /// Decoded information objects; empty for private payloads.
    pub fn objects(&self) -> &[InformationObject] {
        match &self.payload {
            AsduPayload::Objects(objects) => objects,
            AsduPayload::Private { .. } => &[],
        }
    }

    /// Address of the first information object.
    pub fn first_address(&self) -> Option<u32> {
        self.objects().first().map(|object| object.address)
    }

    /// Variable structure qualifier as it will be encoded.
    pub fn vsq(&self) -> Vsq {
        let count = match &self.payload {
            AsduPayload::Objects(objects) if self.sequence => {
                objects.first().map_or(0, |object| object.element_sets.len())
            }
            AsduPayload::Objects(objects) => objects.len(),
            AsduPayload::Private { count, .. } => usize::from(*count),
        };
        Vsq::new(count.min(MAX_VSQ_COUNT) as u8, self.sequence)
    }

    /// Mirror of this ASDU with the matching confirmation cause.
    ///
    /// Activations are confirmed with `ActivationConfirm`, deactivations
    /// with `DeactivationConfirm`; other causes are kept.
    pub fn confirmation(&self, negative: bool) -> Self {
        let mut reply = self.clone();
        reply.cot = match self.cot {
            Cot::Activation => Cot::ActivationConfirm,
            Cot::Deactivation => Cot::DeactivationConfirm,
            other => other,
        };
        reply.negative = negative;
        reply
    }
}

impl fmt::Display for Asdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] COT={} CA={}",
            self.type_code, self.cot, self.common_address
        )?;
        if self.test {
            write!(f, " test")?;
        }
        if self.negative {
            write!(f, " negative")?;
        }
        match &self.payload {
            AsduPayload::Objects(objects) => write!(f, " objects={}", objects.len()),
            AsduPayload::Private { data, .. } => write!(f, " private={}B", data.len()),
        }
    }
}

/// Decoder for type codes without a standard element layout.
///
/// Consulted for reserved and private-range codes only. Codes the decoder
/// does not handle fall back: private codes are kept as raw bytes and
/// reserved codes fail with [`Iec104Error::UnknownTypeId`].
pub trait CustomTypeDecoder: Send + Sync {
    /// Whether this decoder understands `type_code`.
    fn handles(&self, type_code: u8) -> bool;

    /// Decode one element set of `type_code` from the head of `buf`.
    fn decode_element_set(&self, type_code: u8, buf: &mut Bytes)
        -> Result<Vec<InformationElement>>;
}

/// ASDU encoder/decoder for one set of field widths.
#[derive(Clone)]
pub struct AsduCodec {
    cot_field_length: usize,
    common_address_field_length: usize,
    ioa_field_length: usize,
    custom: Option<Arc<dyn CustomTypeDecoder>>,
}

impl fmt::Debug for AsduCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsduCodec")
            .field("cot_field_length", &self.cot_field_length)
            .field("common_address_field_length", &self.common_address_field_length)
            .field("ioa_field_length", &self.ioa_field_length)
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

impl Default for AsduCodec {
    fn default() -> Self {
        Self::new(&ConnectionSettings::default())
    }
}

impl AsduCodec {
    /// Create a codec using the field widths of `settings`.
    pub fn new(settings: &ConnectionSettings) -> Self {
        Self {
            cot_field_length: settings.cot_field_length,
            common_address_field_length: settings.common_address_field_length,
            ioa_field_length: settings.ioa_field_length,
            custom: None,
        }
    }

    /// Attach a decoder for reserved and private type codes.
    pub fn with_custom_decoder(mut self, decoder: Arc<dyn CustomTypeDecoder>) -> Self {
        self.custom = Some(decoder);
        self
    }

    fn header_len(&self) -> usize {
        2 + self.cot_field_length + self.common_address_field_length
    }

    /// Decode a complete ASDU.
    pub fn decode(&self, mut data: Bytes) -> Result<Asdu> {
        if data.len() < self.header_len() {
            return Err(Iec104Error::invalid_asdu(format!(
                "ASDU of {} bytes shorter than its {}-byte header",
                data.len(),
                self.header_len()
            )));
        }

        let type_code = TypeCode::from_u8(data.get_u8());
        let vsq = Vsq::from_u8(data.get_u8());
        let cot_octet = data.get_u8();
        let cot = Cot::from_u8(cot_octet);
        let originator = if self.cot_field_length == 2 {
            data.get_u8()
        } else {
            0
        };
        let common_address = data.get_uint_le(self.common_address_field_length) as u16;

        let payload = match type_code {
            TypeCode::Standard(type_id) => {
                let layout = type_id.elements();
                self.decode_objects(vsq, &mut data, |buf| decode_element_set(layout, buf))?
            }
            TypeCode::Reserved(code) | TypeCode::Private(code) => match &self.custom {
                Some(custom) if custom.handles(code) => self.decode_objects(vsq, &mut data, |buf| {
                    custom.decode_element_set(code, buf)
                })?,
                _ if matches!(type_code, TypeCode::Private(_)) => AsduPayload::Private {
                    count: vsq.count,
                    data: data.split_to(data.len()),
                },
                _ => return Err(Iec104Error::UnknownTypeId(code)),
            },
        };

        if data.has_remaining() {
            return Err(Iec104Error::invalid_asdu(format!(
                "{} trailing bytes after {} information objects",
                data.remaining(),
                vsq.count
            )));
        }

        Ok(Asdu {
            type_code,
            sequence: vsq.sequence,
            cot,
            test: cot_octet & COT_TEST_FLAG != 0,
            negative: cot_octet & COT_NEGATIVE_FLAG != 0,
            originator,
            common_address,
            payload,
        })
    }

    fn decode_objects<F>(&self, vsq: Vsq, data: &mut Bytes, mut decode_set: F) -> Result<AsduPayload>
    where
        F: FnMut(&mut Bytes) -> Result<Vec<InformationElement>>,
    {
        let count = usize::from(vsq.count);
        if vsq.sequence {
            if count == 0 {
                return Ok(AsduPayload::Objects(Vec::new()));
            }
            let address = self.read_address(data)?;
            let mut element_sets = Vec::with_capacity(count);
            for _ in 0..count {
                element_sets.push(decode_set(data)?);
            }
            Ok(AsduPayload::Objects(vec![InformationObject::sequence(
                address,
                element_sets,
            )]))
        } else {
            let mut objects = Vec::with_capacity(count);
            for _ in 0..count {
                let address = self.read_address(data)?;
                objects.push(InformationObject::new(address, decode_set(data)?));
            }
            Ok(AsduPayload::Objects(objects))
        }
    }

    fn read_address(&self, data: &mut Bytes) -> Result<u32> {
        if data.remaining() < self.ioa_field_length {
            return Err(Iec104Error::invalid_asdu_static(
                "information object address truncated",
            ));
        }
        Ok(data.get_uint_le(self.ioa_field_length) as u32)
    }

    /// Encode a complete ASDU.
    pub fn encode(&self, asdu: &Asdu) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(64);
        self.encode_to(asdu, &mut buf)?;
        Ok(buf.freeze())
    }

    /// Encode a complete ASDU into `buf`.
    pub fn encode_to(&self, asdu: &Asdu, buf: &mut BytesMut) -> Result<()> {
        self.validate(asdu)?;
        let mut cot_octet = asdu.cot.to_code()?;

        buf.put_u8(asdu.type_code.as_u8());
        buf.put_u8(asdu.vsq().as_u8());

        if asdu.test {
            cot_octet |= COT_TEST_FLAG;
        }
        if asdu.negative {
            cot_octet |= COT_NEGATIVE_FLAG;
        }
        buf.put_u8(cot_octet);
        if self.cot_field_length == 2 {
            buf.put_u8(asdu.originator);
        }
        buf.put_uint_le(
            u64::from(asdu.common_address),
            self.common_address_field_length,
        );

        match &asdu.payload {
            AsduPayload::Objects(objects) => {
                for object in objects {
                    buf.put_uint_le(u64::from(object.address), self.ioa_field_length);
                    for set in &object.element_sets {
                        for element in set {
                            element.encode(buf)?;
                        }
                    }
                }
            }
            AsduPayload::Private { data, .. } => buf.put_slice(data),
        }
        Ok(())
    }

    fn validate(&self, asdu: &Asdu) -> Result<()> {
        let max_common_address = (1u64 << (8 * self.common_address_field_length)) - 1;
        if u64::from(asdu.common_address) > max_common_address {
            return Err(Iec104Error::invalid_asdu(format!(
                "common address {} does not fit {} byte(s)",
                asdu.common_address, self.common_address_field_length
            )));
        }

        let objects = match &asdu.payload {
            AsduPayload::Objects(objects) => objects,
            AsduPayload::Private { count, .. } => {
                if usize::from(*count) > MAX_VSQ_COUNT {
                    return Err(Iec104Error::invalid_asdu_static("VSQ count exceeds 127"));
                }
                return Ok(());
            }
        };

        if asdu.sequence {
            if objects.len() != 1 {
                return Err(Iec104Error::invalid_asdu(format!(
                    "SQ=1 ASDU must hold exactly one object, got {}",
                    objects.len()
                )));
            }
        } else if let Some(object) = objects.iter().find(|o| o.element_sets.len() != 1) {
            return Err(Iec104Error::invalid_asdu(format!(
                "SQ=0 object {} must hold exactly one element set, got {}",
                object.address,
                object.element_sets.len()
            )));
        }

        let count = if asdu.sequence {
            objects[0].element_sets.len()
        } else {
            objects.len()
        };
        if count > MAX_VSQ_COUNT {
            return Err(Iec104Error::invalid_asdu(format!(
                "{count} element sets exceed the VSQ limit of {MAX_VSQ_COUNT}"
            )));
        }

        let max_address = (1u64 << (8 * self.ioa_field_length)) - 1;
        for object in objects {
            let last = u64::from(object.address) + object.element_sets.len().saturating_sub(1) as u64;
            if last > max_address {
                return Err(Iec104Error::invalid_asdu(format!(
                    "information object address {last} does not fit {} byte(s)",
                    self.ioa_field_length
                )));
            }
        }

        if let Some(type_id) = asdu.type_id() {
            let layout = type_id.elements();
            for set in objects.iter().flat_map(|o| o.element_sets.iter()) {
                let matches = set.len() == layout.len()
                    && set.iter().zip(layout).all(|(e, kind)| e.kind() == Some(*kind));
                if !matches {
                    return Err(Iec104Error::invalid_asdu(format!(
                        "element set does not match the layout of {type_id}"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn decode_element_set(layout: &[ElementKind], buf: &mut Bytes) -> Result<Vec<InformationElement>> {
    layout.iter().map(|kind| kind.decode(buf)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::quality::Quality;

    fn codec() -> AsduCodec {
        AsduCodec::default()
    }

    #[test]
    fn test_vsq() {
        let vsq = Vsq::new(10, false);
        assert_eq!(vsq.as_u8(), 10);

        let vsq = Vsq::new(10, true);
        assert_eq!(vsq.as_u8(), 0x8A);

        let vsq = Vsq::from_u8(0x8A);
        assert_eq!(vsq.count, 10);
        assert!(vsq.sequence);
    }

    #[test]
    fn test_interrogation_layout() {
        let asdu = Asdu::single(
            TypeId::InterrogationCommand,
            Cot::Activation,
            1,
            0,
            vec![InformationElement::InterrogationQualifier(20)],
        );
        let bytes = codec().encode(&asdu).unwrap();
        assert_eq!(
            &bytes[..],
            &[0x64, 0x01, 0x06, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x14]
        );
        assert_eq!(codec().decode(bytes).unwrap(), asdu);
    }

    #[test]
    fn test_sequence_addressing() {
        let sets = (0..3)
            .map(|i| {
                vec![
                    InformationElement::Scaled(i * 100),
                    InformationElement::Quality(Quality::empty()),
                ]
            })
            .collect();
        let asdu = Asdu::sequence(TypeId::MeasuredScaled, Cot::Periodic, 7, 1000, sets);
        let bytes = codec().encode(&asdu).unwrap();
        // header 6 + one IOA 3 + 3 sets of 3 bytes
        assert_eq!(bytes.len(), 6 + 3 + 9);
        assert_eq!(bytes[1], 0x83);

        let decoded = codec().decode(bytes).unwrap();
        let addresses: Vec<u32> = decoded.objects()[0].addressed_sets().map(|(a, _)| a).collect();
        assert_eq!(addresses, vec![1000, 1001, 1002]);
        assert_eq!(decoded, asdu);
    }

    #[test]
    fn test_short_field_widths() {
        let settings = ConnectionSettings::new()
            .cot_field_length(1)
            .common_address_field_length(1)
            .ioa_field_length(1);
        let codec = AsduCodec::new(&settings);

        let asdu = Asdu::single(
            TypeId::SinglePoint,
            Cot::Spontaneous,
            5,
            9,
            vec![InformationElement::SinglePoint {
                on: true,
                quality: Quality::empty(),
            }],
        );
        let bytes = codec.encode(&asdu).unwrap();
        assert_eq!(&bytes[..], &[0x01, 0x01, 0x03, 0x05, 0x09, 0x01]);
        assert_eq!(codec.decode(bytes).unwrap(), asdu);

        let too_far = Asdu::single(TypeId::SinglePoint, Cot::Spontaneous, 5, 256, vec![
            InformationElement::SinglePoint {
                on: true,
                quality: Quality::empty(),
            },
        ]);
        assert!(codec.encode(&too_far).is_err());
    }

    #[test]
    fn test_test_and_negative_flags() {
        let mut asdu = Asdu::single(
            TypeId::SingleCommand,
            Cot::Activation,
            1,
            5000,
            vec![InformationElement::SingleCommand {
                on: true,
                qualifier: 0,
                select: false,
            }],
        )
        .confirmation(true);
        asdu.test = true;
        asdu.originator = 3;

        let bytes = codec().encode(&asdu).unwrap();
        assert_eq!(bytes[2], 0xC7);
        assert_eq!(bytes[3], 3);
        let decoded = codec().decode(bytes).unwrap();
        assert!(decoded.test);
        assert!(decoded.negative);
        assert_eq!(decoded.cot, Cot::ActivationConfirm);
    }

    #[test]
    fn test_special_use_and_reserved_causes_decode() {
        for cause in [0x30u8, 0x0E, 0x3F] {
            let data = Bytes::from(vec![
                0x0B, 0x01, cause, 0x00, 0x01, 0x00, 0x64, 0x00, 0x00, 0x05, 0x00, 0x00,
            ]);
            let asdu = codec().decode(data.clone()).unwrap();
            assert_eq!(asdu.cot, Cot::Other(cause));
            assert_eq!(asdu.objects()[0].element_sets[0][0], InformationElement::Scaled(5));
            assert_eq!(codec().encode(&asdu).unwrap(), data);
        }
    }

    #[test]
    fn test_cause_wider_than_six_bits_rejected() {
        let asdu = Asdu::single(TypeId::ReadCommand, Cot::Other(0x40), 1, 42, Vec::new());
        assert_eq!(codec().encode(&asdu), Err(Iec104Error::UnknownCot(0x40)));
    }

    #[test]
    fn test_reserved_type_is_rejected() {
        let data = Bytes::from_static(&[0x29, 0x01, 0x03, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00]);
        assert!(matches!(
            codec().decode(data),
            Err(Iec104Error::UnknownTypeId(41))
        ));
    }

    #[test]
    fn test_private_type_kept_raw() {
        let data = Bytes::from_static(&[0x88, 0x01, 0x03, 0x00, 0x01, 0x00, 0xAA, 0xBB, 0xCC]);
        let asdu = codec().decode(data.clone()).unwrap();
        assert_eq!(asdu.type_code, TypeCode::Private(0x88));
        assert_eq!(
            asdu.payload,
            AsduPayload::Private {
                count: 1,
                data: Bytes::from_static(&[0xAA, 0xBB, 0xCC]),
            }
        );
        assert_eq!(codec().encode(&asdu).unwrap(), data);
    }

    struct PairDecoder;

    impl CustomTypeDecoder for PairDecoder {
        fn handles(&self, type_code: u8) -> bool {
            type_code == 0x90
        }

        fn decode_element_set(
            &self,
            _type_code: u8,
            buf: &mut Bytes,
        ) -> Result<Vec<InformationElement>> {
            if buf.remaining() < 2 {
                return Err(Iec104Error::invalid_asdu_static("short pair"));
            }
            Ok(vec![InformationElement::Raw(buf.split_to(2))])
        }
    }

    #[test]
    fn test_custom_decoder_resolves_private_type() {
        let codec = codec().with_custom_decoder(Arc::new(PairDecoder));

        let data = Bytes::from_static(&[
            0x90, 0x02, 0x03, 0x00, 0x01, 0x00, // header
            0x01, 0x00, 0x00, 0x11, 0x22, // object 1
            0x02, 0x00, 0x00, 0x33, 0x44, // object 2
        ]);
        let asdu = codec.decode(data.clone()).unwrap();
        let objects = asdu.objects();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[1].address, 2);
        assert_eq!(
            objects[1].element_sets[0],
            vec![InformationElement::Raw(Bytes::from_static(&[0x33, 0x44]))]
        );
        assert_eq!(codec.encode(&asdu).unwrap(), data);

        // Unhandled private code still falls back to raw bytes
        let other = Bytes::from_static(&[0x91, 0x01, 0x03, 0x00, 0x01, 0x00, 0x01]);
        assert!(matches!(
            codec.decode(other).unwrap().payload,
            AsduPayload::Private { .. }
        ));

        let truncated = Bytes::from_static(&[0x90, 0x01, 0x03, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x11]);
        assert!(codec.decode(truncated).is_err());
    }

    #[test]
    fn test_truncated_and_trailing_bytes() {
        let truncated = Bytes::from_static(&[0x0D, 0x01, 0x03, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00]);
        assert!(matches!(codec().decode(truncated), Err(Iec104Error::InvalidAsdu(_))));

        let trailing = Bytes::from_static(&[
            0x01, 0x01, 0x03, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x01, 0xFF,
        ]);
        assert!(matches!(codec().decode(trailing), Err(Iec104Error::InvalidAsdu(_))));

        assert!(codec().decode(Bytes::from_static(&[0x01, 0x01])).is_err());
    }

    #[test]
    fn test_layout_mismatch_rejected() {
        let asdu = Asdu::single(
            TypeId::MeasuredFloat,
            Cot::Spontaneous,
            1,
            1,
            vec![InformationElement::ShortFloat(1.5)],
        );
        assert!(codec().encode(&asdu).is_err());
    }

    #[test]
    fn test_vsq_limit() {
        let objects = (0..128)
            .map(|i| InformationObject::new(i, vec![InformationElement::Normalized(0)]))
            .collect();
        let asdu = Asdu::new(TypeId::MeasuredNormalizedNoQuality, Cot::Periodic, 1, objects);
        assert!(codec().encode(&asdu).is_err());
    }

    #[test]
    fn test_read_command_without_elements() {
        let asdu = Asdu::single(TypeId::ReadCommand, Cot::Request, 1, 42, Vec::new());
        let bytes = codec().encode(&asdu).unwrap();
        assert_eq!(bytes.len(), 9);
        assert_eq!(codec().decode(bytes).unwrap(), asdu);
    }
}
