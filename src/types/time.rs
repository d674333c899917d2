//! Binary time elements: CP56Time2a, CP24Time2a and CP16Time2a.
//!
//! The 7-octet CP56Time2a carries local calendar time plus a summer-time
//! (SU) flag. Conversion to an absolute instant takes the *standard* UTC
//! offset of the zone and adds one hour when SU is set, so the repeated hour
//! at a fall-back transition is resolved by the flag alone.

use bytes::{Buf, BufMut};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, TimeZone, Timelike};

use crate::error::{Iec104Error, Result};

/// Earliest year a two-digit CP56Time2a year is mapped to by default.
pub const DEFAULT_START_OF_CENTURY: i32 = 1970;

const MS_PER_MINUTE: u16 = 60_000;

/// Seven-octet binary time (CP56Time2a).
///
/// ```text
/// octet 0-1  milliseconds of minute (LE)
/// octet 2    minute (bits 0..5)        IV (bit 7)
/// octet 3    hour (bits 0..4)          SU (bit 7)
/// octet 4    day of month (bits 0..4)  day of week (bits 5..7)
/// octet 5    month (bits 0..3)
/// octet 6    year (bits 0..6)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cp56Time2a {
    /// Milliseconds within the minute (0-59999)
    pub milliseconds: u16,
    /// Minute (0-59)
    pub minute: u8,
    /// Hour (0-23)
    pub hour: u8,
    /// Day of month (1-31)
    pub day: u8,
    /// Day of week (1=Monday .. 7=Sunday, 0=unused)
    pub day_of_week: u8,
    /// Month (1-12)
    pub month: u8,
    /// Two-digit year (0-99)
    pub year: u8,
    /// Time is invalid (IV)
    pub invalid: bool,
    /// Summer time in effect (SU)
    pub summer_time: bool,
}

impl Cp56Time2a {
    /// Encoded length in octets.
    pub const LENGTH: usize = 7;

    /// Build from an instant in any time zone.
    ///
    /// `standard_offset` is the zone's offset outside daylight saving time;
    /// SU is set when the instant's own offset differs from it.
    pub fn from_datetime<Tz: TimeZone>(
        datetime: &DateTime<Tz>,
        standard_offset: FixedOffset,
        invalid: bool,
    ) -> Self {
        let local = datetime.naive_local();
        let summer_time = datetime.offset().fix() != standard_offset;
        let milliseconds =
            (local.second() * 1000 + (local.nanosecond() / 1_000_000).min(999)) as u16;
        Self {
            milliseconds,
            minute: local.minute() as u8,
            hour: local.hour() as u8,
            day: local.day() as u8,
            day_of_week: local.weekday().number_from_monday() as u8,
            month: local.month() as u8,
            year: local.year().rem_euclid(100) as u8,
            invalid,
            summer_time,
        }
    }

    /// Build from milliseconds since the Unix epoch.
    ///
    /// `summer_time` selects whether one hour of daylight saving is applied
    /// on top of `standard_offset`.
    pub fn from_timestamp_millis(
        millis: i64,
        standard_offset: FixedOffset,
        summer_time: bool,
    ) -> Result<Self> {
        let offset = if summer_time {
            shifted_by_hour(standard_offset)?
        } else {
            standard_offset
        };
        let datetime = offset
            .timestamp_millis_opt(millis)
            .single()
            .ok_or(Iec104Error::invalid_asdu_static("timestamp out of range"))?;
        Ok(Self::from_datetime(&datetime, standard_offset, false))
    }

    /// Resolve to an absolute instant.
    ///
    /// Two-digit years below `start_of_century % 100` fall into the next
    /// century, so with 1970 the years 70..=99 map to 19xx and 0..=69 to 20xx.
    pub fn to_datetime(
        &self,
        standard_offset: FixedOffset,
        start_of_century: i32,
    ) -> Result<DateTime<FixedOffset>> {
        let mut century = start_of_century / 100 * 100;
        if i32::from(self.year) < start_of_century % 100 {
            century += 100;
        }
        let offset = if self.summer_time {
            shifted_by_hour(standard_offset)?
        } else {
            standard_offset
        };

        let naive = NaiveDate::from_ymd_opt(
            century + i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
        .and_then(|date| {
            date.and_hms_milli_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.milliseconds / 1000),
                u32::from(self.milliseconds % 1000),
            )
        })
        .ok_or(Iec104Error::invalid_asdu_static(
            "CP56Time2a does not denote a calendar date",
        ))?;

        offset
            .from_local_datetime(&naive)
            .single()
            .ok_or(Iec104Error::invalid_asdu_static("CP56Time2a out of range"))
    }

    /// Milliseconds since the Unix epoch, see [`Cp56Time2a::to_datetime`].
    pub fn timestamp_millis(&self, standard_offset: FixedOffset, start_of_century: i32) -> Result<i64> {
        Ok(self
            .to_datetime(standard_offset, start_of_century)?
            .timestamp_millis())
    }

    /// Decode from the head of `buf`.
    pub fn decode(buf: &mut impl Buf) -> Result<Self> {
        if buf.remaining() < Self::LENGTH {
            return Err(Iec104Error::invalid_asdu_static("CP56Time2a too short"));
        }
        let milliseconds = buf.get_u16_le();
        let minute = buf.get_u8();
        let hour = buf.get_u8();
        let day = buf.get_u8();
        let month = buf.get_u8();
        let year = buf.get_u8();
        Ok(Self {
            milliseconds,
            minute: minute & 0x3F,
            invalid: minute & 0x80 != 0,
            hour: hour & 0x1F,
            summer_time: hour & 0x80 != 0,
            day: day & 0x1F,
            day_of_week: (day >> 5) & 0x07,
            month: month & 0x0F,
            year: year & 0x7F,
        })
    }

    /// Encode into `buf`.
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u16_le(self.milliseconds);
        buf.put_u8((self.minute & 0x3F) | if self.invalid { 0x80 } else { 0 });
        buf.put_u8((self.hour & 0x1F) | if self.summer_time { 0x80 } else { 0 });
        buf.put_u8((self.day & 0x1F) | ((self.day_of_week & 0x07) << 5));
        buf.put_u8(self.month & 0x0F);
        buf.put_u8(self.year & 0x7F);
    }

    /// Seven octets in wire order.
    pub fn to_bytes(&self) -> [u8; 7] {
        let mut out = [0u8; 7];
        let mut slice = &mut out[..];
        self.encode(&mut slice);
        out
    }
}

fn shifted_by_hour(offset: FixedOffset) -> Result<FixedOffset> {
    FixedOffset::east_opt(offset.local_minus_utc() + 3600)
        .ok_or(Iec104Error::invalid_asdu_static("UTC offset out of range"))
}

/// Three-octet binary time (CP24Time2a): milliseconds and minute only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Cp24Time2a {
    /// Milliseconds within the minute (0-59999)
    pub milliseconds: u16,
    /// Minute (0-59)
    pub minute: u8,
    /// Time is invalid (IV)
    pub invalid: bool,
}

impl Cp24Time2a {
    /// Encoded length in octets.
    pub const LENGTH: usize = 3;

    /// Build from milliseconds within the hour.
    pub fn from_millis_of_hour(millis: u32, invalid: bool) -> Self {
        let millis = millis % (u32::from(MS_PER_MINUTE) * 60);
        Self {
            milliseconds: (millis % u32::from(MS_PER_MINUTE)) as u16,
            minute: (millis / u32::from(MS_PER_MINUTE)) as u8,
            invalid,
        }
    }

    /// Milliseconds elapsed within the hour.
    pub fn millis_of_hour(&self) -> u32 {
        u32::from(self.minute) * u32::from(MS_PER_MINUTE) + u32::from(self.milliseconds)
    }

    /// Decode from the head of `buf`.
    pub fn decode(buf: &mut impl Buf) -> Result<Self> {
        if buf.remaining() < Self::LENGTH {
            return Err(Iec104Error::invalid_asdu_static("CP24Time2a too short"));
        }
        let milliseconds = buf.get_u16_le();
        let minute = buf.get_u8();
        Ok(Self {
            milliseconds,
            minute: minute & 0x3F,
            invalid: minute & 0x80 != 0,
        })
    }

    /// Encode into `buf`.
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u16_le(self.milliseconds);
        buf.put_u8((self.minute & 0x3F) | if self.invalid { 0x80 } else { 0 });
    }
}

impl From<Cp56Time2a> for Cp24Time2a {
    fn from(time: Cp56Time2a) -> Self {
        Self {
            milliseconds: time.milliseconds,
            minute: time.minute,
            invalid: time.invalid,
        }
    }
}

/// Two-octet binary elapsed time (CP16Time2a) in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Cp16Time2a(pub u16);

impl Cp16Time2a {
    /// Encoded length in octets.
    pub const LENGTH: usize = 2;

    /// Elapsed time as a duration.
    pub fn as_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(u64::from(self.0))
    }

    /// Decode from the head of `buf`.
    pub fn decode(buf: &mut impl Buf) -> Result<Self> {
        if buf.remaining() < Self::LENGTH {
            return Err(Iec104Error::invalid_asdu_static("CP16Time2a too short"));
        }
        Ok(Self(buf.get_u16_le()))
    }

    /// Encode into `buf`.
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u16_le(self.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cet() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    #[test]
    fn test_encode_after_fall_back() {
        // 2018-10-28T02:00:00 CET, first instant after the DST switch
        let time = Cp56Time2a::from_timestamp_millis(1_540_688_400_000, cet(), false).unwrap();
        assert_eq!(time.to_bytes(), [0x00, 0x00, 0x00, 0x02, 0xFC, 0x0A, 0x12]);
    }

    #[test]
    fn test_encode_last_summer_millisecond() {
        let cest = FixedOffset::east_opt(7200).unwrap();
        let datetime = cest.timestamp_millis_opt(1_540_688_399_999).unwrap();
        let time = Cp56Time2a::from_datetime(&datetime, cet(), false);
        assert!(time.summer_time);
        assert_eq!(time.to_bytes(), [0x5F, 0xEA, 0x3B, 0x82, 0xFC, 0x0A, 0x12]);
    }

    #[test]
    fn test_decode_summer_time_flag() {
        let mut buf = &[0x30, 0x75, 0x00, 0x81, 0xFC, 0x0A, 0x12][..];
        let time = Cp56Time2a::decode(&mut buf).unwrap();
        assert!(time.summer_time);
        assert_eq!(time.hour, 1);
        assert_eq!(time.day_of_week, 7);
        assert_eq!(
            time.timestamp_millis(cet(), DEFAULT_START_OF_CENTURY).unwrap(),
            1_540_681_230_000
        );
    }

    #[test]
    fn test_decode_standard_time() {
        let mut buf = &[0x30, 0x75, 0x00, 0x01, 0xFF, 0x03, 0x13][..];
        let time = Cp56Time2a::decode(&mut buf).unwrap();
        assert!(!time.summer_time);
        assert_eq!(
            time.timestamp_millis(cet(), DEFAULT_START_OF_CENTURY).unwrap(),
            1_553_990_430_000
        );
    }

    #[test]
    fn test_invalid_flag_round_trip() {
        let mut time = Cp56Time2a::from_timestamp_millis(1_383_060_654_596, cet(), false).unwrap();
        time.invalid = true;
        let bytes = time.to_bytes();
        assert_eq!(bytes, [0x44, 0xD5, 0x9E, 0x10, 0x5D, 0x0A, 0x0D]);
        let decoded = Cp56Time2a::decode(&mut &bytes[..]).unwrap();
        assert!(decoded.invalid);
        assert_eq!(decoded, time);
    }

    #[test]
    fn test_century_resolution() {
        let mut time = Cp56Time2a::from_timestamp_millis(0, FixedOffset::east_opt(0).unwrap(), false)
            .unwrap();
        assert_eq!(time.year, 70);
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(time.to_datetime(utc, 1970).unwrap().year(), 1970);

        time.year = 69;
        assert_eq!(time.to_datetime(utc, 1970).unwrap().year(), 2069);
        assert_eq!(time.to_datetime(utc, 2000).unwrap().year(), 2069);
    }

    #[test]
    fn test_invalid_calendar_date() {
        let mut buf = &[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00][..];
        let time = Cp56Time2a::decode(&mut buf).unwrap();
        assert!(time.to_datetime(cet(), DEFAULT_START_OF_CENTURY).is_err());
    }

    #[test]
    fn test_cp56_too_short() {
        let mut buf = &[0x00, 0x00, 0x00][..];
        assert!(Cp56Time2a::decode(&mut buf).is_err());
    }

    #[test]
    fn test_cp24_layout() {
        let time = Cp24Time2a::from_millis_of_hour(59 * 60_000 + 59_999, true);
        let mut buf = Vec::new();
        time.encode(&mut buf);
        assert_eq!(buf, vec![0x5F, 0xEA, 0xBB]);
        let decoded = Cp24Time2a::decode(&mut &buf[..]).unwrap();
        assert_eq!(decoded.millis_of_hour(), 3_599_999);
        assert!(decoded.invalid);
    }

    #[test]
    fn test_cp16_elapsed() {
        let decoded = Cp16Time2a::decode(&mut &[0xE8, 0x03][..]).unwrap();
        assert_eq!(decoded.as_duration(), std::time::Duration::from_secs(1));
    }
}
