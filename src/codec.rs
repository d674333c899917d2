//! IEC 60870-5-104 APDU framing for tokio.
//!
//! The codec only splits the byte stream into APDUs and classifies the
//! control field. ASDU bodies stay as raw bytes here; they are decoded by
//! [`AsduCodec`](crate::types::AsduCodec) with the field widths of the
//! owning connection.

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::Iec104Error;
use crate::types::{
    Apci, UFunction, MAX_APDU_LENGTH, MAX_ASDU_LENGTH, MIN_APDU_LENGTH, START_BYTE,
};

/// An IEC 104 APDU (Application Protocol Data Unit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Apdu {
    /// Decoded control field
    pub apci: Apci,
    /// Encoded ASDU, present on I-frames only
    pub payload: Option<Bytes>,
}

impl Apdu {
    /// Create a new I-frame APDU around an encoded ASDU.
    pub fn i_frame(send_seq: u16, recv_seq: u16, payload: Bytes) -> Self {
        Self {
            apci: Apci::i_frame(send_seq, recv_seq),
            payload: Some(payload),
        }
    }

    /// Create a new S-frame APDU.
    pub fn s_frame(recv_seq: u16) -> Self {
        Self {
            apci: Apci::s_frame(recv_seq),
            payload: None,
        }
    }

    /// Create a new U-frame APDU.
    pub fn u_frame(function: UFunction) -> Self {
        Self {
            apci: Apci::u_frame(function),
            payload: None,
        }
    }
}

impl std::fmt::Display for Apdu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.apci)?;
        if let Some(payload) = &self.payload {
            write!(f, " +{}B", payload.len())?;
        }
        Ok(())
    }
}

/// IEC 60870-5-104 APDU codec.
///
/// ```rust,ignore
/// use futures::{SinkExt, StreamExt};
/// use tokio_util::codec::Framed;
///
/// let stream = TcpStream::connect("192.168.1.100:2404").await?;
/// let mut framed = Framed::new(stream, Iec104Codec::new());
/// framed.send(Apdu::u_frame(UFunction::StartDtAct)).await?;
/// let reply = framed.next().await;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Iec104Codec {
    state: DecodeState,
}

#[derive(Debug, Clone, Copy, Default)]
enum DecodeState {
    #[default]
    Start,
    Body {
        length: usize,
    },
}

impl Iec104Codec {
    /// Create a new IEC 104 codec.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for Iec104Codec {
    type Item = Apdu;
    type Error = Iec104Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.state {
                DecodeState::Start => {
                    let skip = src
                        .iter()
                        .position(|&b| b == START_BYTE)
                        .unwrap_or(src.len());
                    if skip > 0 {
                        tracing::trace!(skipped = skip, "discarding bytes before start byte");
                        src.advance(skip);
                    }
                    if src.len() < 2 {
                        return Ok(None);
                    }

                    let length = usize::from(src[1]);
                    if !(MIN_APDU_LENGTH..=MAX_APDU_LENGTH).contains(&length) {
                        return Err(Iec104Error::framing(format!(
                            "APDU length {length} outside [{MIN_APDU_LENGTH}, {MAX_APDU_LENGTH}]"
                        )));
                    }
                    src.advance(2);
                    self.state = DecodeState::Body { length };
                }

                DecodeState::Body { length } => {
                    if src.len() < length {
                        src.reserve(length - src.len());
                        return Ok(None);
                    }
                    self.state = DecodeState::Start;

                    let mut frame = src.split_to(length);
                    let control = [frame[0], frame[1], frame[2], frame[3]];
                    frame.advance(MIN_APDU_LENGTH);
                    let apci = Apci::parse(control)?;

                    let payload = match apci {
                        Apci::IFrame { .. } if frame.is_empty() => {
                            return Err(Iec104Error::framing_static("I-frame without ASDU"));
                        }
                        Apci::IFrame { .. } => Some(frame.freeze()),
                        _ if !frame.is_empty() => {
                            return Err(Iec104Error::framing(format!(
                                "{apci} carries {} unexpected bytes",
                                frame.len()
                            )));
                        }
                        _ => None,
                    };
                    return Ok(Some(Apdu { apci, payload }));
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(apdu) => Ok(Some(apdu)),
            None if src.is_empty() && matches!(self.state, DecodeState::Start) => Ok(None),
            None => Err(Iec104Error::framing_static("stream ended mid-frame")),
        }
    }
}

impl Encoder<Apdu> for Iec104Codec {
    type Error = Iec104Error;

    fn encode(&mut self, item: Apdu, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let asdu_len = item.payload.as_ref().map_or(0, Bytes::len);
        if asdu_len > MAX_ASDU_LENGTH {
            return Err(Iec104Error::framing(format!(
                "ASDU of {asdu_len} bytes exceeds {MAX_ASDU_LENGTH}"
            )));
        }

        dst.reserve(2 + MIN_APDU_LENGTH + asdu_len);
        item.apci.write_header(asdu_len, dst)?;
        if let Some(payload) = &item.payload {
            dst.extend_from_slice(payload);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_u_frame() {
        let mut codec = Iec104Codec::new();
        let mut buf = BytesMut::from(&[0x68, 0x04, 0x07, 0x00, 0x00, 0x00][..]);

        let apdu = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(apdu, Apdu::u_frame(UFunction::StartDtAct));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_s_frame() {
        let mut codec = Iec104Codec::new();
        let mut buf = BytesMut::from(&[0x68, 0x04, 0x01, 0x00, 0xC8, 0x00][..]);

        let apdu = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(apdu.apci.recv_seq(), Some(100));
        assert!(apdu.payload.is_none());
    }

    #[test]
    fn test_decode_i_frame_keeps_payload() {
        let mut codec = Iec104Codec::new();
        let mut buf = BytesMut::from(
            &[
                0x68, 0x0E, 0x02, 0x00, 0x04, 0x00, // I(S=1, R=2)
                0x64, 0x01, 0x06, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x14,
            ][..],
        );

        let apdu = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(apdu.apci, Apci::i_frame(1, 2));
        assert_eq!(apdu.payload.unwrap().len(), 10);
    }

    #[test]
    fn test_encode_frames() {
        let mut codec = Iec104Codec::new();
        let mut buf = BytesMut::new();

        codec.encode(Apdu::u_frame(UFunction::StartDtAct), &mut buf).unwrap();
        codec.encode(Apdu::s_frame(100), &mut buf).unwrap();
        assert_eq!(
            &buf[..],
            &[0x68, 0x04, 0x07, 0x00, 0x00, 0x00, 0x68, 0x04, 0x01, 0x00, 0xC8, 0x00]
        );

        let mut buf = BytesMut::new();
        let payload = Bytes::from_static(&[0x64, 0x01, 0x06, 0x00, 0x01, 0x00]);
        codec.encode(Apdu::i_frame(10, 5, payload), &mut buf).unwrap();
        assert_eq!(buf[0], START_BYTE);
        assert_eq!(buf[1], 10);
    }

    #[test]
    fn test_encode_oversized_asdu() {
        let mut codec = Iec104Codec::new();
        let mut buf = BytesMut::new();

        let ok = Bytes::from(vec![0u8; MAX_ASDU_LENGTH]);
        codec.encode(Apdu::i_frame(0, 0, ok), &mut buf).unwrap();
        assert_eq!(buf[1], 253);

        let too_big = Bytes::from(vec![0u8; MAX_ASDU_LENGTH + 1]);
        assert!(matches!(
            codec.encode(Apdu::i_frame(0, 0, too_big), &mut BytesMut::new()),
            Err(Iec104Error::Framing(_))
        ));
    }

    #[test]
    fn test_decode_partial_frame() {
        let mut codec = Iec104Codec::new();

        let mut buf = BytesMut::from(&[0x68, 0x04][..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(&[0x07, 0x00]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(&[0x00, 0x00]);
        assert!(codec.decode(&mut buf).unwrap().is_some());
    }

    #[test]
    fn test_decode_skip_garbage() {
        let mut codec = Iec104Codec::new();
        let mut buf = BytesMut::from(&[0xFF, 0xAA, 0x68, 0x04, 0x07, 0x00, 0x00, 0x00][..]);

        let apdu = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(apdu.apci, Apci::u_frame(UFunction::StartDtAct));
    }

    #[test]
    fn test_decode_bad_length() {
        for length in [0x00, 0x03, 0xFE, 0xFF] {
            let mut codec = Iec104Codec::new();
            let mut buf = BytesMut::from(&[0x68, length, 0x07, 0x00, 0x00, 0x00][..]);
            assert!(matches!(codec.decode(&mut buf), Err(Iec104Error::Framing(_))));
        }
    }

    #[test]
    fn test_decode_malformed_control() {
        let mut codec = Iec104Codec::new();
        let mut buf = BytesMut::from(&[0x68, 0x04, 0x33, 0x00, 0x00, 0x00][..]);
        assert!(matches!(codec.decode(&mut buf), Err(Iec104Error::Framing(_))));

        let mut codec = Iec104Codec::new();
        let mut buf = BytesMut::from(&[0x68, 0x04, 0x00, 0x00, 0x00, 0x00][..]);
        assert!(codec.decode(&mut buf).is_err(), "I-frame needs an ASDU");

        let mut codec = Iec104Codec::new();
        let mut buf = BytesMut::from(&[0x68, 0x05, 0x07, 0x00, 0x00, 0x00, 0x01][..]);
        assert!(codec.decode(&mut buf).is_err(), "U-frame cannot carry data");
    }

    #[test]
    fn test_decode_eof() {
        let mut codec = Iec104Codec::new();
        let mut empty = BytesMut::new();
        assert!(codec.decode_eof(&mut empty).unwrap().is_none());

        let mut codec = Iec104Codec::new();
        let mut truncated = BytesMut::from(&[0x68, 0x04, 0x07][..]);
        assert!(matches!(
            codec.decode_eof(&mut truncated),
            Err(Iec104Error::Framing(_))
        ));
    }

    #[test]
    fn test_u_frame_roundtrip() {
        let mut codec = Iec104Codec::new();
        for func in [
            UFunction::StartDtAct,
            UFunction::StartDtCon,
            UFunction::StopDtAct,
            UFunction::StopDtCon,
            UFunction::TestFrAct,
            UFunction::TestFrCon,
        ] {
            let mut buf = BytesMut::new();
            codec.encode(Apdu::u_frame(func), &mut buf).unwrap();
            assert_eq!(codec.decode(&mut buf).unwrap(), Some(Apdu::u_frame(func)));
        }
    }
}
