//! Record catalog.
//!
//! One type per record kind of the image cash letter format. Each type
//! carries its two-character discriminator and total width as constants
//! ([`RecordFormat::KIND`]), an ordered slot table ([`RecordFormat::LAYOUT`]),
//! and decode / encode / validate operations. [`Record`] is the tagged union
//! over all kinds, used when the kind is only known from the line itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, FieldError, Result},
    field::{FieldReader, FieldSlot},
};

#[macro_use]
mod macros;

mod bundle;
mod cash_letter;
#[macro_use]
mod check;
mod credit;
mod file;
mod image;
mod returns;

pub use bundle::{BundleControl, BundleHeader};
pub use cash_letter::{CashLetterControl, CashLetterHeader, RoutingNumberSummary};
pub use check::{CheckDetail, CheckDetailAddendumA, CheckDetailAddendumB, CheckDetailAddendumC};
pub use credit::{Credit, CreditItem};
pub use file::{FileControl, FileHeader};
pub use image::{ImageViewAnalysis, ImageViewData, ImageViewDetail};
pub use returns::{
    ReturnDetail, ReturnDetailAddendumA, ReturnDetailAddendumB, ReturnDetailAddendumC,
    ReturnDetailAddendumD,
};

/// Kind of a record, identified on the wire by its first two characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordKind {
    FileHeader,
    CashLetterHeader,
    BundleHeader,
    CheckDetail,
    CheckDetailAddendumA,
    CheckDetailAddendumB,
    CheckDetailAddendumC,
    ReturnDetail,
    ReturnDetailAddendumA,
    ReturnDetailAddendumB,
    ReturnDetailAddendumC,
    ReturnDetailAddendumD,
    ImageViewDetail,
    ImageViewData,
    ImageViewAnalysis,
    Credit,
    CreditItem,
    BundleControl,
    RoutingNumberSummary,
    CashLetterControl,
    FileControl,
}

impl RecordKind {
    /// Every kind, in discriminator order.
    pub const ALL: [Self; 21] = [
        Self::FileHeader,
        Self::CashLetterHeader,
        Self::BundleHeader,
        Self::CheckDetail,
        Self::CheckDetailAddendumA,
        Self::CheckDetailAddendumB,
        Self::CheckDetailAddendumC,
        Self::ReturnDetail,
        Self::ReturnDetailAddendumA,
        Self::ReturnDetailAddendumB,
        Self::ReturnDetailAddendumC,
        Self::ReturnDetailAddendumD,
        Self::ImageViewDetail,
        Self::ImageViewData,
        Self::ImageViewAnalysis,
        Self::Credit,
        Self::CreditItem,
        Self::BundleControl,
        Self::RoutingNumberSummary,
        Self::CashLetterControl,
        Self::FileControl,
    ];

    /// The two-character discriminator.
    ///
    /// ```
    /// use icl::record::RecordKind;
    /// assert_eq!(RecordKind::CheckDetailAddendumB.code(), "27");
    /// ```
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::FileHeader => "01",
            Self::CashLetterHeader => "10",
            Self::BundleHeader => "20",
            Self::CheckDetail => "25",
            Self::CheckDetailAddendumA => "26",
            Self::CheckDetailAddendumB => "27",
            Self::CheckDetailAddendumC => "28",
            Self::ReturnDetail => "31",
            Self::ReturnDetailAddendumA => "32",
            Self::ReturnDetailAddendumB => "33",
            Self::ReturnDetailAddendumC => "34",
            Self::ReturnDetailAddendumD => "35",
            Self::ImageViewDetail => "50",
            Self::ImageViewData => "52",
            Self::ImageViewAnalysis => "54",
            Self::Credit => "61",
            Self::CreditItem => "62",
            Self::BundleControl => "70",
            Self::RoutingNumberSummary => "85",
            Self::CashLetterControl => "90",
            Self::FileControl => "99",
        }
    }

    /// Total line width, or `None` for the variable-length Image View Data.
    #[must_use]
    pub const fn width(&self) -> Option<usize> {
        match self {
            Self::ImageViewData => None,
            Self::CreditItem => Some(100),
            _ => Some(80),
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::FileHeader => "File Header",
            Self::CashLetterHeader => "Cash Letter Header",
            Self::BundleHeader => "Bundle Header",
            Self::CheckDetail => "Check Detail",
            Self::CheckDetailAddendumA => "Check Detail Addendum A",
            Self::CheckDetailAddendumB => "Check Detail Addendum B",
            Self::CheckDetailAddendumC => "Check Detail Addendum C",
            Self::ReturnDetail => "Return Detail",
            Self::ReturnDetailAddendumA => "Return Detail Addendum A",
            Self::ReturnDetailAddendumB => "Return Detail Addendum B",
            Self::ReturnDetailAddendumC => "Return Detail Addendum C",
            Self::ReturnDetailAddendumD => "Return Detail Addendum D",
            Self::ImageViewDetail => "Image View Detail",
            Self::ImageViewData => "Image View Data",
            Self::ImageViewAnalysis => "Image View Analysis",
            Self::Credit => "Credit",
            Self::CreditItem => "Credit Item",
            Self::BundleControl => "Bundle Control",
            Self::RoutingNumberSummary => "Routing Number Summary",
            Self::CashLetterControl => "Cash Letter Control",
            Self::FileControl => "File Control",
        }
    }

    /// Looks a kind up by the first two bytes of a line.
    #[must_use]
    pub fn from_code(code: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code().as_bytes() == code)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns the discriminator of a line as text (for error messages).
pub(crate) fn discriminator(line: &[u8]) -> String {
    String::from_utf8_lossy(&line[..line.len().min(2)]).into_owned()
}

/// Fixed-layout record: decode, encode, validate, and per-field rendering.
pub trait RecordFormat: Sized {
    /// Kind (and therefore discriminator and width) of this record.
    const KIND: RecordKind;

    /// Ordered slot table after the two-character discriminator.
    const LAYOUT: &'static [FieldSlot];

    /// Decodes every slot after the discriminator.
    fn decode_fields(fields: &mut FieldReader<'_>) -> std::result::Result<Self, FieldError>;

    /// Appends every slot after the discriminator.
    fn encode_fields(&self, out: &mut Vec<u8>);

    /// Checks field rules; the first violation is returned.
    fn validate(&self) -> std::result::Result<(), FieldError>;

    /// Decodes one line.
    ///
    /// Fails with [`Error::TypeMismatch`] if the discriminator is not
    /// [`Self::KIND`]'s. A line shorter than the declared width is accepted:
    /// the missing trailing fields decode as their unset values.
    fn decode(line: &[u8]) -> Result<Self> {
        if !line.starts_with(Self::KIND.code().as_bytes()) {
            return Err(Error::TypeMismatch {
                line: 0,
                expected: Self::KIND,
                found: discriminator(line),
            });
        }
        let mut fields = FieldReader::new(Self::KIND, line);
        Self::decode_fields(&mut fields).map_err(|source| Error::Decode { line: 0, source })
    }

    /// Encodes the record as one line (without a line terminator).
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::KIND.width().unwrap_or(128));
        out.extend_from_slice(Self::KIND.code().as_bytes());
        self.encode_fields(&mut out);
        out
    }

    /// Fixed-width rendering of one field, looked up by its layout name.
    ///
    /// Returns `None` for names not in [`Self::LAYOUT`].
    fn field(&self, name: &str) -> Option<String> {
        render_slot(Self::LAYOUT, &self.encode(), name)
    }
}

/// Cuts the slot called `name` out of an encoded line.
pub(crate) fn render_slot(layout: &[FieldSlot], line: &[u8], name: &str) -> Option<String> {
    let mut offset = 2;
    let slot = layout.iter().find(|slot| {
        let found = slot.name == name;
        if !found {
            offset += slot.width;
        }
        found
    })?;
    let end = (offset + slot.width).min(line.len());
    Some(String::from_utf8_lossy(&line[offset.min(end)..end]).into_owned())
}

macro_rules! records {
    ($($kind:ident),* $(,)?) => {
        /// Any catalog record.
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(tag = "type", content = "record")]
        pub enum Record {
            $($kind($kind),)*
        }

        impl Record {
            /// Decodes a line of any kind, dispatching on its discriminator.
            pub fn decode(line: &[u8]) -> Result<Self> {
                match RecordKind::from_code(&line[..line.len().min(2)]) {
                    $(Some(RecordKind::$kind) => Ok(Self::$kind($kind::decode(line)?)),)*
                    None => Err(Error::structural(
                        0,
                        crate::error::StructuralError::UnknownRecordType(discriminator(line)),
                    )),
                }
            }

            /// Kind of the wrapped record.
            #[must_use]
            pub fn kind(&self) -> RecordKind {
                match self {
                    $(Self::$kind(_) => RecordKind::$kind,)*
                }
            }

            /// Encodes the wrapped record.
            #[must_use]
            pub fn encode(&self) -> Vec<u8> {
                match self {
                    $(Self::$kind(r) => r.encode(),)*
                }
            }

            /// Validates the wrapped record.
            pub fn validate(&self) -> std::result::Result<(), FieldError> {
                match self {
                    $(Self::$kind(r) => r.validate(),)*
                }
            }

            /// Fixed-width rendering of one field of the wrapped record.
            #[must_use]
            pub fn field(&self, name: &str) -> Option<String> {
                match self {
                    $(Self::$kind(r) => r.field(name),)*
                }
            }
        }

        $(
            impl From<$kind> for Record {
                fn from(record: $kind) -> Self {
                    Self::$kind(record)
                }
            }
        )*
    };
}

records!(
    FileHeader,
    CashLetterHeader,
    BundleHeader,
    CheckDetail,
    CheckDetailAddendumA,
    CheckDetailAddendumB,
    CheckDetailAddendumC,
    ReturnDetail,
    ReturnDetailAddendumA,
    ReturnDetailAddendumB,
    ReturnDetailAddendumC,
    ReturnDetailAddendumD,
    ImageViewDetail,
    ImageViewData,
    ImageViewAnalysis,
    Credit,
    CreditItem,
    BundleControl,
    RoutingNumberSummary,
    CashLetterControl,
    FileControl,
);
