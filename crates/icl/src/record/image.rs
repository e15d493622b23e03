//! Image View Detail (50), Image View Data (52) and Image View Analysis (54).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::{FieldError, RuleKind},
    field::{
        Alphanumeric, CodecKind, Date, FieldReader, FieldSlot, Numeric, decode_numeric,
        encode_alphanumeric, encode_date, encode_numeric,
    },
    record::{RecordFormat, RecordKind, render_slot},
    validation::{
        IMAGE_COMPRESSIONS, IMAGE_VIEW_FORMATS, OVERRIDE_INDICATORS, Rules, SIGNATURE_METHODS,
        VIEW_DESCRIPTORS,
    },
};

record! {
    /// Describes one image view (front, back, ...) of an item.
    pub struct ImageViewDetail(ImageViewDetail) {
        /// `0` means no image is present.
        image_indicator: u8 = Numeric(1) as "ImageIndicator",
        image_creator_routing_number: String = Alphanumeric(9) as "ImageCreatorRoutingNumber",
        image_creator_date: Option<NaiveDate> = Date(8) as "ImageCreatorDate",
        image_view_format_indicator: String = Alphanumeric(2) as "ImageViewFormatIndicator",
        image_view_compression_algorithm: String =
            Alphanumeric(2) as "ImageViewCompressionAlgorithm",
        image_view_data_size: Option<u32> = BlankNumeric(7) as "ImageViewDataSize",
        /// `0` front, `1` back.
        view_side_indicator: u8 = Numeric(1) as "ViewSideIndicator",
        view_descriptor: String = Alphanumeric(2) as "ViewDescriptor",
        digital_signature_indicator: u8 = Numeric(1) as "DigitalSignatureIndicator",
        digital_signature_method: String = Alphanumeric(2) as "DigitalSignatureMethod",
        security_key_size: Option<u32> = BlankNumeric(5) as "SecurityKeySize",
        protected_data_start: Option<u32> = BlankNumeric(7) as "ProtectedDataStart",
        protected_data_length: Option<u32> = BlankNumeric(7) as "ProtectedDataLength",
        image_recreate_indicator: u8 = Numeric(1) as "ImageRecreateIndicator",
        user_field: String = Alphanumeric(8) as "UserField",
        reserved(1),
        override_indicator: String = Alphanumeric(1) as "OverrideIndicator",
        reserved(13),
    }
}

impl ImageViewDetail {
    fn rules(&self) -> Result<(), FieldError> {
        let rules = Rules::new(RecordKind::ImageViewDetail);

        if self.image_indicator != 0 {
            rules.routing_number("ImageCreatorRoutingNumber", &self.image_creator_routing_number)?;
            rules.mandatory_date("ImageCreatorDate", self.image_creator_date)?;
            rules.mandatory("ViewDescriptor", &self.view_descriptor)?;
        }

        rules.range("ImageIndicator", self.image_indicator.into(), 0..=3)?;
        rules.optional_one_of(
            "ImageViewFormatIndicator",
            &self.image_view_format_indicator,
            IMAGE_VIEW_FORMATS,
        )?;
        rules.optional_one_of(
            "ImageViewCompressionAlgorithm",
            &self.image_view_compression_algorithm,
            IMAGE_COMPRESSIONS,
        )?;
        rules.range("ViewSideIndicator", self.view_side_indicator.into(), 0..=1)?;
        rules.optional_one_of("ViewDescriptor", &self.view_descriptor, VIEW_DESCRIPTORS)?;
        rules.range("DigitalSignatureIndicator", self.digital_signature_indicator.into(), 0..=1)?;
        rules.optional_one_of(
            "DigitalSignatureMethod",
            &self.digital_signature_method,
            SIGNATURE_METHODS,
        )?;
        rules.conditional(
            "DigitalSignatureMethod",
            &self.digital_signature_method,
            self.digital_signature_indicator == 0
                || !self.digital_signature_method.trim().is_empty(),
        )?;
        rules.range("ImageRecreateIndicator", self.image_recreate_indicator.into(), 0..=1)?;
        rules.alphanumeric_special("UserField", &self.user_field)?;
        rules.optional_one_of("OverrideIndicator", &self.override_indicator, OVERRIDE_INDICATORS)
    }
}

record! {
    /// Image quality and usability test results for one view.
    pub struct ImageViewAnalysis(ImageViewAnalysis) {
        global_image_quality: u8 = Numeric(1) as "GlobalImageQuality",
        global_image_usability: u8 = Numeric(1) as "GlobalImageUsability",
        imaging_bank_specific_test: u8 = Numeric(1) as "ImagingBankSpecificTest",
        partial_image: u8 = Numeric(1) as "PartialImage",
        excessive_image_skew: u8 = Numeric(1) as "ExcessiveImageSkew",
        piggyback_image: u8 = Numeric(1) as "PiggybackImage",
        too_light_or_too_dark: u8 = Numeric(1) as "TooLightOrTooDark",
        streaks_and_or_bands: u8 = Numeric(1) as "StreaksAndOrBands",
        below_minimum_image_size: u8 = Numeric(1) as "BelowMinimumImageSize",
        exceeds_maximum_image_size: u8 = Numeric(1) as "ExceedsMaximumImageSize",
        reserved(13),
        image_enabled_pod: u8 = Numeric(1) as "ImageEnabledPOD",
        source_document_bad: u8 = Numeric(1) as "SourceDocumentBad",
        date_usability: u8 = Numeric(1) as "DateUsability",
        payee_usability: u8 = Numeric(1) as "PayeeUsability",
        convenience_amount_usability: u8 = Numeric(1) as "ConvenienceAmountUsability",
        amount_in_words_usability: u8 = Numeric(1) as "AmountInWordsUsability",
        signature_usability: u8 = Numeric(1) as "SignatureUsability",
        payor_name_address_usability: u8 = Numeric(1) as "PayorNameAddressUsability",
        micr_line_usability: u8 = Numeric(1) as "MICRLineUsability",
        memo_line_usability: u8 = Numeric(1) as "MemoLineUsability",
        payor_bank_name_address_usability: u8 = Numeric(1) as "PayorBankNameAddressUsability",
        payee_endorsement_usability: u8 = Numeric(1) as "PayeeEndorsementUsability",
        bofd_endorsement_usability: u8 = Numeric(1) as "BOFDEndorsementUsability",
        transit_endorsement_usability: u8 = Numeric(1) as "TransitEndorsementUsability",
        reserved(6),
        user_field: String = Alphanumeric(20) as "UserField",
        reserved(15),
    }
}

impl ImageViewAnalysis {
    fn rules(&self) -> Result<(), FieldError> {
        let rules = Rules::new(RecordKind::ImageViewAnalysis);

        let indicators = [
            ("GlobalImageQuality", self.global_image_quality),
            ("GlobalImageUsability", self.global_image_usability),
            ("ImagingBankSpecificTest", self.imaging_bank_specific_test),
            ("PartialImage", self.partial_image),
            ("ExcessiveImageSkew", self.excessive_image_skew),
            ("PiggybackImage", self.piggyback_image),
            ("TooLightOrTooDark", self.too_light_or_too_dark),
            ("StreaksAndOrBands", self.streaks_and_or_bands),
            ("BelowMinimumImageSize", self.below_minimum_image_size),
            ("ExceedsMaximumImageSize", self.exceeds_maximum_image_size),
            ("ImageEnabledPOD", self.image_enabled_pod),
            ("SourceDocumentBad", self.source_document_bad),
            ("DateUsability", self.date_usability),
            ("PayeeUsability", self.payee_usability),
            ("ConvenienceAmountUsability", self.convenience_amount_usability),
            ("AmountInWordsUsability", self.amount_in_words_usability),
            ("SignatureUsability", self.signature_usability),
            ("PayorNameAddressUsability", self.payor_name_address_usability),
            ("MICRLineUsability", self.micr_line_usability),
            ("MemoLineUsability", self.memo_line_usability),
            ("PayorBankNameAddressUsability", self.payor_bank_name_address_usability),
            ("PayeeEndorsementUsability", self.payee_endorsement_usability),
            ("BOFDEndorsementUsability", self.bofd_endorsement_usability),
            ("TransitEndorsementUsability", self.transit_endorsement_usability),
        ];
        for (field, value) in indicators {
            rules.range(field, value.into(), 0..=2)?;
        }
        rules.alphanumeric_special("UserField", &self.user_field)
    }
}

// ============================================================================
// Image View Data: variable length
// ============================================================================

const REFERENCE_KEY_LENGTH_WIDTH: usize = 5;
const SIGNATURE_LENGTH_WIDTH: usize = 5;
const IMAGE_LENGTH_WIDTH: usize = 7;

fn payload_len(payload: &[u8]) -> u64 {
    u64::try_from(payload.len()).unwrap_or(u64::MAX)
}

fn digits(width: usize) -> u32 {
    u32::try_from(width).unwrap_or(u32::MAX)
}

fn to_usize(len: u32) -> usize {
    usize::try_from(len).unwrap_or(usize::MAX)
}

/// The image itself, plus the identifiers tying it to its item.
///
/// The only variable-length record. Three payloads follow a fixed prefix,
/// each announced by a length slot; on encode the length slots are always
/// derived from the payloads, so they cannot disagree with them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageViewData {
    pub ece_institution_routing_number: String,
    pub bundle_business_date: Option<NaiveDate>,
    pub cycle_number: String,
    pub ece_institution_item_sequence_number: String,
    pub security_originator_name: String,
    pub security_authenticator_name: String,
    pub security_key_name: String,
    /// `0` when the image is not clipped.
    pub clipping_origin: u8,
    pub clipping_coordinate_h1: String,
    pub clipping_coordinate_h2: String,
    pub clipping_coordinate_v1: String,
    pub clipping_coordinate_v2: String,
    /// Kept byte-for-byte, including any blanks.
    pub image_reference_key: String,
    pub digital_signature: Vec<u8>,
    pub image_data: Vec<u8>,
}

const fn slot(name: &'static str, width: usize, codec: CodecKind) -> FieldSlot {
    FieldSlot { name, width, codec }
}

impl ImageViewData {
    /// Columns before the first length slot, record type included.
    pub const PREFIX_WIDTH: usize = 101;

    /// Widths of the three length slots in record order: image reference
    /// key, digital signature, image data.
    pub const LENGTH_WIDTHS: [usize; 3] =
        [REFERENCE_KEY_LENGTH_WIDTH, SIGNATURE_LENGTH_WIDTH, IMAGE_LENGTH_WIDTH];

    /// Payload length announced by the `width`-column length slot at `at`.
    ///
    /// `None` when the record ends inside the slot or the slot is not
    /// numeric; the decoder reports the latter.
    #[must_use]
    pub fn declared_length(record: &[u8], at: usize, width: usize) -> Option<usize> {
        let raw = record.get(at..at + width)?;
        decode_numeric(raw).ok().and_then(|len| usize::try_from(len).ok())
    }

    fn encode_prefix(&self, out: &mut Vec<u8>) {
        let mut text = String::with_capacity(101);
        text.push_str(RecordKind::ImageViewData.code());
        text.push_str(&encode_alphanumeric(&self.ece_institution_routing_number, 9));
        text.push_str(&encode_date(self.bundle_business_date));
        text.push_str(&encode_alphanumeric(&self.cycle_number, 2));
        text.push_str(&encode_alphanumeric(&self.ece_institution_item_sequence_number, 15));
        text.push_str(&encode_alphanumeric(&self.security_originator_name, 16));
        text.push_str(&encode_alphanumeric(&self.security_authenticator_name, 16));
        text.push_str(&encode_alphanumeric(&self.security_key_name, 16));
        text.push_str(&encode_numeric(self.clipping_origin.into(), 1));
        for coordinate in [
            &self.clipping_coordinate_h1,
            &self.clipping_coordinate_h2,
            &self.clipping_coordinate_v1,
            &self.clipping_coordinate_v2,
        ] {
            text.push_str(&encode_alphanumeric(coordinate, 4));
        }
        out.extend_from_slice(text.as_bytes());
    }

    fn rules(&self) -> Result<(), FieldError> {
        let rules = Rules::new(RecordKind::ImageViewData);

        rules.routing_number(
            "ECEInstitutionRoutingNumber",
            &self.ece_institution_routing_number,
        )?;
        rules.mandatory_date("BundleBusinessDate", self.bundle_business_date)?;
        rules.mandatory(
            "ECEInstitutionItemSequenceNumber",
            &self.ece_institution_item_sequence_number,
        )?;

        rules.alphanumeric("CycleNumber", &self.cycle_number)?;
        rules.numeric(
            "ECEInstitutionItemSequenceNumber",
            &self.ece_institution_item_sequence_number,
        )?;
        rules.alphanumeric_special("SecurityOriginatorName", &self.security_originator_name)?;
        rules.alphanumeric_special(
            "SecurityAuthenticatorName",
            &self.security_authenticator_name,
        )?;
        rules.alphanumeric_special("SecurityKeyName", &self.security_key_name)?;
        rules.range("ClippingOrigin", self.clipping_origin.into(), 0..=4)?;
        for (field, value) in [
            ("ClippingCoordinateH1", &self.clipping_coordinate_h1),
            ("ClippingCoordinateH2", &self.clipping_coordinate_h2),
            ("ClippingCoordinateV1", &self.clipping_coordinate_v1),
            ("ClippingCoordinateV2", &self.clipping_coordinate_v2),
        ] {
            rules.numeric(field, value)?;
            // a clipped image needs all four coordinates
            rules.conditional(
                field,
                value,
                self.clipping_origin == 0 || !value.trim().is_empty(),
            )?;
        }
        rules.fits(
            "LengthImageReferenceKey",
            payload_len(self.image_reference_key.as_bytes()),
            digits(REFERENCE_KEY_LENGTH_WIDTH),
        )?;
        rules.alphanumeric_special("ImageReferenceKey", &self.image_reference_key)?;
        rules.fits(
            "LengthDigitalSignature",
            payload_len(&self.digital_signature),
            digits(SIGNATURE_LENGTH_WIDTH),
        )?;
        rules.fits("LengthImageData", payload_len(&self.image_data), digits(IMAGE_LENGTH_WIDTH))
    }
}

impl RecordFormat for ImageViewData {
    const KIND: RecordKind = RecordKind::ImageViewData;

    /// Fixed prefix only; the payloads that follow have no fixed position.
    const LAYOUT: &'static [FieldSlot] = &[
        slot("ECEInstitutionRoutingNumber", 9, CodecKind::Alphanumeric),
        slot("BundleBusinessDate", 8, CodecKind::Date),
        slot("CycleNumber", 2, CodecKind::Alphanumeric),
        slot("ECEInstitutionItemSequenceNumber", 15, CodecKind::Alphanumeric),
        slot("SecurityOriginatorName", 16, CodecKind::Alphanumeric),
        slot("SecurityAuthenticatorName", 16, CodecKind::Alphanumeric),
        slot("SecurityKeyName", 16, CodecKind::Alphanumeric),
        slot("ClippingOrigin", 1, CodecKind::Numeric),
        slot("ClippingCoordinateH1", 4, CodecKind::Alphanumeric),
        slot("ClippingCoordinateH2", 4, CodecKind::Alphanumeric),
        slot("ClippingCoordinateV1", 4, CodecKind::Alphanumeric),
        slot("ClippingCoordinateV2", 4, CodecKind::Alphanumeric),
        slot("LengthImageReferenceKey", REFERENCE_KEY_LENGTH_WIDTH, CodecKind::Numeric),
    ];

    fn decode_fields(r: &mut FieldReader<'_>) -> Result<Self, FieldError> {
        let mut rec = Self {
            ece_institution_routing_number: r
                .read::<Alphanumeric, String>(9, "ECEInstitutionRoutingNumber")?,
            bundle_business_date: r.read::<Date, _>(8, "BundleBusinessDate")?,
            cycle_number: r.read::<Alphanumeric, String>(2, "CycleNumber")?,
            ece_institution_item_sequence_number: r
                .read::<Alphanumeric, String>(15, "ECEInstitutionItemSequenceNumber")?,
            security_originator_name: r.read::<Alphanumeric, String>(16, "SecurityOriginatorName")?,
            security_authenticator_name: r
                .read::<Alphanumeric, String>(16, "SecurityAuthenticatorName")?,
            security_key_name: r.read::<Alphanumeric, String>(16, "SecurityKeyName")?,
            clipping_origin: r.read::<Numeric, u8>(1, "ClippingOrigin")?,
            clipping_coordinate_h1: r.read::<Alphanumeric, String>(4, "ClippingCoordinateH1")?,
            clipping_coordinate_h2: r.read::<Alphanumeric, String>(4, "ClippingCoordinateH2")?,
            clipping_coordinate_v1: r.read::<Alphanumeric, String>(4, "ClippingCoordinateV1")?,
            clipping_coordinate_v2: r.read::<Alphanumeric, String>(4, "ClippingCoordinateV2")?,
            ..Self::default()
        };

        let key_len = r.read::<Numeric, u32>(REFERENCE_KEY_LENGTH_WIDTH, "LengthImageReferenceKey")?;
        let key = r.take(to_usize(key_len));
        rec.image_reference_key = std::str::from_utf8(key)
            .map_err(|_| {
                FieldError::new(
                    RecordKind::ImageViewData,
                    "ImageReferenceKey",
                    String::from_utf8_lossy(key),
                    RuleKind::InvalidCharacterClass,
                )
            })?
            .to_string();

        let signature_len =
            r.read::<Numeric, u32>(SIGNATURE_LENGTH_WIDTH, "LengthDigitalSignature")?;
        rec.digital_signature = r.take(to_usize(signature_len)).to_vec();

        let image_len = r.read::<Numeric, u32>(IMAGE_LENGTH_WIDTH, "LengthImageData")?;
        rec.image_data = r.take(to_usize(image_len)).to_vec();

        Ok(rec)
    }

    fn encode_fields(&self, out: &mut Vec<u8>) {
        let mut prefix = Vec::new();
        self.encode_prefix(&mut prefix);
        out.extend_from_slice(&prefix[2..]);

        for (payload, width) in [
            (self.image_reference_key.as_bytes(), REFERENCE_KEY_LENGTH_WIDTH),
            (self.digital_signature.as_slice(), SIGNATURE_LENGTH_WIDTH),
            (self.image_data.as_slice(), IMAGE_LENGTH_WIDTH),
        ] {
            out.extend_from_slice(encode_numeric(payload_len(payload), width).as_bytes());
            out.extend_from_slice(payload);
        }
    }

    fn validate(&self) -> Result<(), FieldError> {
        self.rules()
    }

    fn field(&self, name: &str) -> Option<String> {
        let lossy = |bytes: &[u8]| String::from_utf8_lossy(bytes).into_owned();
        match name {
            "ImageReferenceKey" => Some(self.image_reference_key.clone()),
            "LengthDigitalSignature" => {
                Some(encode_numeric(payload_len(&self.digital_signature), SIGNATURE_LENGTH_WIDTH))
            }
            "DigitalSignature" => Some(lossy(&self.digital_signature)),
            "LengthImageData" => {
                Some(encode_numeric(payload_len(&self.image_data), IMAGE_LENGTH_WIDTH))
            }
            "ImageData" => Some(lossy(&self.image_data)),
            _ => {
                let mut line = Vec::new();
                self.encode_prefix(&mut line);
                line.extend_from_slice(
                    encode_numeric(
                        payload_len(self.image_reference_key.as_bytes()),
                        REFERENCE_KEY_LENGTH_WIDTH,
                    )
                    .as_bytes(),
                );
                render_slot(Self::LAYOUT, &line, name)
            }
        }
    }
}
