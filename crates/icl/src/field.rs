//! Fixed-width field codec.
//!
//! Every record is a run of fixed-width column slots. This module maps typed
//! values to those slots and back:
//!
//! | Codec            | Justification | Padding | Unset value      |
//! |------------------|---------------|---------|------------------|
//! | [`Alphanumeric`] | left          | spaces  | empty string     |
//! | [`Numeric`]      | right         | zeros   | `0`              |
//! | [`BlankNumeric`] | right         | spaces  | all blanks       |
//! | [`Date`]         | `YYYYMMDD`    | —       | eight blanks     |
//! | [`Time`]         | `HHMM`        | —       | four blanks      |
//!
//! Widths are part of the record catalog and never supplied by callers, so
//! an encoded slot always has exactly its declared width. Decoding is
//! tolerant: a slot cut short by the end of the line decodes whatever is
//! present, and a slot entirely past the end decodes as its unset value.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{
    error::{FieldError, RuleKind},
    record::RecordKind,
};

/// Codec used by a layout slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodecKind {
    Alphanumeric,
    Numeric,
    BlankNumeric,
    Date,
    Time,
    /// Blank on encode, ignored on decode.
    Reserved,
}

/// One column slot of a record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot {
    /// Field name as used in [`FieldError`] and [`field`](crate::record::RecordFormat::field).
    pub name: &'static str,
    /// Width in columns.
    pub width: usize,
    /// Codec applied to the slot.
    pub codec: CodecKind,
}

const DATE_FORMAT: &str = "%Y%m%d";
const TIME_FORMAT: &str = "%H%M";

// ============================================================================
// Encoding
// ============================================================================

/// Left-justifies `value` in `width` columns, truncating or padding with spaces.
///
/// Truncation never splits a UTF-8 sequence; the slot is still exactly
/// `width` bytes wide.
///
/// ```
/// use icl::field::encode_alphanumeric;
/// assert_eq!(encode_alphanumeric("Citadel", 10), "Citadel   ");
/// assert_eq!(encode_alphanumeric("Wells Fargo Bank", 5), "Wells");
/// ```
#[must_use]
pub fn encode_alphanumeric(value: &str, width: usize) -> String {
    let mut end = value.len().min(width);
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::with_capacity(width);
    out.push_str(&value[..end]);
    out.extend(std::iter::repeat_n(' ', width - end));
    out
}

/// Right-justifies `value` in `width` columns, padding with zeros.
///
/// A value with more digits than the slot keeps its rightmost `width` digits;
/// validation reports such values as [`RuleKind::OutOfRange`].
///
/// ```
/// use icl::field::encode_numeric;
/// assert_eq!(encode_numeric(34, 4), "0034");
/// assert_eq!(encode_numeric(123456, 4), "3456");
/// ```
#[must_use]
pub fn encode_numeric(value: u64, width: usize) -> String {
    let digits = value.to_string();
    if digits.len() > width {
        digits[digits.len() - width..].to_string()
    } else {
        format!("{digits:0>width$}")
    }
}

/// Right-justifies `value` in `width` columns, padding with spaces; an unset
/// value becomes `width` blanks.
///
/// Overlong values keep their rightmost digits, as in [`encode_numeric`].
///
/// ```
/// use icl::field::encode_blank_numeric;
/// assert_eq!(encode_blank_numeric(Some(123), 7), "    123");
/// assert_eq!(encode_blank_numeric(None, 3), "   ");
/// ```
#[must_use]
pub fn encode_blank_numeric(value: Option<u64>, width: usize) -> String {
    let Some(value) = value else {
        return " ".repeat(width);
    };
    let digits = value.to_string();
    if digits.len() > width {
        digits[digits.len() - width..].to_string()
    } else {
        format!("{digits:>width$}")
    }
}

/// Renders a date as `YYYYMMDD`, or eight blanks when unset.
#[must_use]
pub fn encode_date(value: Option<NaiveDate>) -> String {
    match value {
        Some(d) => d.format(DATE_FORMAT).to_string(),
        None => " ".repeat(8),
    }
}

/// Renders a time as `HHMM`, or four blanks when unset.
#[must_use]
pub fn encode_time(value: Option<NaiveTime>) -> String {
    match value {
        Some(t) => t.format(TIME_FORMAT).to_string(),
        None => " ".repeat(4),
    }
}

// ============================================================================
// Decoding
// ============================================================================

fn is_blank(raw: &[u8]) -> bool {
    raw.iter().all(|b| *b == b' ')
}

/// Decodes a left-justified slot, dropping the trailing blank padding.
///
/// Leading blanks are kept, so re-encoding reproduces the slot exactly.
pub fn decode_alphanumeric(raw: &[u8]) -> Result<String, RuleKind> {
    let text = std::str::from_utf8(raw).map_err(|_| RuleKind::InvalidCharacterClass)?;
    Ok(text.trim_end_matches(' ').to_string())
}

/// Decodes a numeric slot. Blanks around the digits are tolerated and an
/// all-blank slot is zero.
pub fn decode_numeric(raw: &[u8]) -> Result<u64, RuleKind> {
    Ok(decode_blank_numeric(raw)?.unwrap_or(0))
}

/// Decodes a blank-or-numeric slot; all blanks is `None`.
pub fn decode_blank_numeric(raw: &[u8]) -> Result<Option<u64>, RuleKind> {
    let text = std::str::from_utf8(raw).map_err(|_| RuleKind::InvalidCharacterClass)?;
    let digits = text.trim_matches(' ');
    if digits.is_empty() {
        return Ok(None);
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RuleKind::InvalidCharacterClass);
    }
    digits.parse().map(Some).map_err(|_| RuleKind::OutOfRange)
}

/// Decodes `YYYYMMDD`; blanks (or an absent slot) are `None`.
pub fn decode_date(raw: &[u8]) -> Result<Option<NaiveDate>, RuleKind> {
    if is_blank(raw) {
        return Ok(None);
    }
    let text = std::str::from_utf8(raw).map_err(|_| RuleKind::InvalidCharacterClass)?;
    if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RuleKind::InvalidCharacterClass);
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT).map(Some).map_err(|_| RuleKind::OutOfRange)
}

/// Decodes `HHMM`; blanks (or an absent slot) are `None`.
pub fn decode_time(raw: &[u8]) -> Result<Option<NaiveTime>, RuleKind> {
    if is_blank(raw) {
        return Ok(None);
    }
    let text = std::str::from_utf8(raw).map_err(|_| RuleKind::InvalidCharacterClass)?;
    if text.len() != 4 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RuleKind::InvalidCharacterClass);
    }
    NaiveTime::parse_from_str(text, TIME_FORMAT).map(Some).map_err(|_| RuleKind::OutOfRange)
}

// ============================================================================
// Typed codecs used by the record catalog
// ============================================================================

/// Maps a field type to and from one slot.
pub trait Codec<T> {
    /// Codec tag reported in record layouts.
    const KIND: CodecKind;

    /// Decodes the (possibly short or empty) slot contents.
    fn decode(raw: &[u8]) -> Result<T, RuleKind>;

    /// Appends exactly `width` bytes.
    fn encode(value: &T, width: usize, out: &mut Vec<u8>);
}

/// Left-justified, space-padded text.
pub struct Alphanumeric;

/// Right-justified, zero-padded unsigned integer.
pub struct Numeric;

/// Zero-padded integer where all blanks means unset.
pub struct BlankNumeric;

/// `YYYYMMDD` date.
pub struct Date;

/// `HHMM` time.
pub struct Time;

impl Codec<String> for Alphanumeric {
    const KIND: CodecKind = CodecKind::Alphanumeric;

    fn decode(raw: &[u8]) -> Result<String, RuleKind> {
        decode_alphanumeric(raw)
    }

    fn encode(value: &String, width: usize, out: &mut Vec<u8>) {
        out.extend_from_slice(encode_alphanumeric(value, width).as_bytes());
    }
}

impl<T> Codec<T> for Numeric
where
    T: Copy + Into<u64> + TryFrom<u64>,
{
    const KIND: CodecKind = CodecKind::Numeric;

    fn decode(raw: &[u8]) -> Result<T, RuleKind> {
        T::try_from(decode_numeric(raw)?).map_err(|_| RuleKind::OutOfRange)
    }

    fn encode(value: &T, width: usize, out: &mut Vec<u8>) {
        out.extend_from_slice(encode_numeric((*value).into(), width).as_bytes());
    }
}

impl<T> Codec<Option<T>> for BlankNumeric
where
    T: Copy + Into<u64> + TryFrom<u64>,
{
    const KIND: CodecKind = CodecKind::BlankNumeric;

    fn decode(raw: &[u8]) -> Result<Option<T>, RuleKind> {
        decode_blank_numeric(raw)?
            .map(|v| T::try_from(v).map_err(|_| RuleKind::OutOfRange))
            .transpose()
    }

    fn encode(value: &Option<T>, width: usize, out: &mut Vec<u8>) {
        out.extend_from_slice(encode_blank_numeric(value.map(Into::into), width).as_bytes());
    }
}

impl Codec<Option<NaiveDate>> for Date {
    const KIND: CodecKind = CodecKind::Date;

    fn decode(raw: &[u8]) -> Result<Option<NaiveDate>, RuleKind> {
        decode_date(raw)
    }

    fn encode(value: &Option<NaiveDate>, _width: usize, out: &mut Vec<u8>) {
        out.extend_from_slice(encode_date(*value).as_bytes());
    }
}

impl Codec<Option<NaiveTime>> for Time {
    const KIND: CodecKind = CodecKind::Time;

    fn decode(raw: &[u8]) -> Result<Option<NaiveTime>, RuleKind> {
        decode_time(raw)
    }

    fn encode(value: &Option<NaiveTime>, _width: usize, out: &mut Vec<u8>) {
        out.extend_from_slice(encode_time(*value).as_bytes());
    }
}

// ============================================================================
// Slot cursor
// ============================================================================

/// Walks the slots of one line, left to right.
///
/// Reads past the end of the line yield empty slices, which every codec
/// decodes as its unset value.
#[derive(Debug)]
pub struct FieldReader<'a> {
    record: RecordKind,
    line: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    /// Starts reading just after the two-character record discriminator.
    #[must_use]
    pub fn new(record: RecordKind, line: &'a [u8]) -> Self {
        Self { record, line, pos: 2 }
    }

    /// Takes the next `width` columns (fewer, or none, near the end of the line).
    pub fn take(&mut self, width: usize) -> &'a [u8] {
        let start = self.pos.min(self.line.len());
        let end = (self.pos + width).min(self.line.len());
        self.pos += width;
        &self.line[start..end]
    }

    /// Skips a reserved slot.
    pub fn skip(&mut self, width: usize) {
        self.pos += width;
    }

    /// Decodes the next slot with codec `C`.
    pub fn read<C: Codec<T>, T>(
        &mut self,
        width: usize,
        field: &'static str,
    ) -> Result<T, FieldError> {
        let raw = self.take(width);
        C::decode(raw).map_err(|rule| {
            FieldError::new(self.record, field, String::from_utf8_lossy(raw), rule)
        })
    }

    /// Everything after the current position.
    #[must_use]
    pub fn rest(&self) -> &'a [u8] {
        &self.line[self.pos.min(self.line.len())..]
    }
}

/// Appends `width` blanks for a reserved slot.
pub(crate) fn encode_reserved(width: usize, out: &mut Vec<u8>) {
    out.extend(std::iter::repeat_n(b' ', width));
}
