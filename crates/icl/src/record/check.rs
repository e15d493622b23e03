//! Check Detail (25) and its addenda (26, 27, 28).
//!
//! The addendum layouts are shared with the Return Detail addenda, so they
//! are declared through the `addendum_*!` macros below and instantiated
//! once here and once in [`returns`](super::returns).

use crate::{
    error::FieldError,
    record::RecordKind,
    validation::{
        ARCHIVE_TYPES, BOFD_INDICATORS, DOCUMENTATION_TYPES, RETURN_ACCEPTANCE, Rules,
    },
};

/// Endorsement by the bank of first deposit (26, 32).
macro_rules! addendum_a {
    ($(#[$meta:meta])* $name:ident) => {
        record! {
            $(#[$meta])*
            pub struct $name($name) {
                /// 1-based position among the item's A addenda.
                record_number: u8 = Numeric(1) as "RecordNumber",
                return_location_routing_number: String =
                    Alphanumeric(9) as "ReturnLocationRoutingNumber",
                bofd_endorsement_date: Option<::chrono::NaiveDate> =
                    Date(8) as "BOFDEndorsementDate",
                bofd_item_sequence_number: String = Alphanumeric(15) as "BOFDItemSequenceNumber",
                bofd_account_number: String = Alphanumeric(18) as "BOFDAccountNumber",
                bofd_branch_code: String = Alphanumeric(5) as "BOFDBranchCode",
                payee_name: String = Alphanumeric(15) as "PayeeName",
                /// `Y` if the paper item was truncated.
                truncation_indicator: String = Alphanumeric(1) as "TruncationIndicator",
                bofd_conversion_indicator: String = Alphanumeric(1) as "BOFDConversionIndicator",
                bofd_correction_indicator: u8 = Numeric(1) as "BOFDCorrectionIndicator",
                user_field: String = Alphanumeric(1) as "UserField",
                reserved(3),
            }
        }

        impl $name {
            fn rules(&self) -> Result<(), $crate::error::FieldError> {
                use $crate::validation::{CONVERSION_INDICATORS, Rules, YES_NO};

                let rules = Rules::new(<Self as $crate::record::RecordFormat>::KIND);

                rules.non_zero("RecordNumber", self.record_number.into())?;
                rules.routing_number(
                    "ReturnLocationRoutingNumber",
                    &self.return_location_routing_number,
                )?;
                rules.mandatory_date("BOFDEndorsementDate", self.bofd_endorsement_date)?;
                rules.mandatory("BOFDItemSequenceNumber", &self.bofd_item_sequence_number)?;
                rules.mandatory("TruncationIndicator", &self.truncation_indicator)?;

                rules.range("RecordNumber", self.record_number.into(), 1..=9)?;
                rules.alphanumeric_special(
                    "BOFDItemSequenceNumber",
                    &self.bofd_item_sequence_number,
                )?;
                rules.alphanumeric_special("BOFDAccountNumber", &self.bofd_account_number)?;
                rules.alphanumeric_special("BOFDBranchCode", &self.bofd_branch_code)?;
                rules.alphanumeric_special("PayeeName", &self.payee_name)?;
                rules.one_of("TruncationIndicator", &self.truncation_indicator, YES_NO)?;
                rules.optional_one_of(
                    "BOFDConversionIndicator",
                    &self.bofd_conversion_indicator,
                    CONVERSION_INDICATORS,
                )?;
                rules.range("BOFDCorrectionIndicator", self.bofd_correction_indicator.into(), 0..=4)?;
                rules.alphanumeric_special("UserField", &self.user_field)
            }
        }
    };
}

/// Image archive reference (27, 34).
macro_rules! addendum_b {
    ($(#[$meta:meta])* $name:ident) => {
        record! {
            $(#[$meta])*
            pub struct $name($name) {
                /// `0` if an image reference key is present, `1` if not.
                image_reference_key_indicator: u8 = Numeric(1) as "ImageReferenceKeyIndicator",
                microfilm_archive_sequence_number: String =
                    Alphanumeric(15) as "MicrofilmArchiveSequenceNumber",
                length_image_reference_key: String =
                    Alphanumeric(4) as "LengthImageReferenceKey",
                image_reference_key: String = Alphanumeric(34) as "ImageReferenceKey",
                description: String = Alphanumeric(15) as "Description",
                user_field: String = Alphanumeric(4) as "UserField",
                reserved(5),
            }
        }

        impl $name {
            fn rules(&self) -> Result<(), $crate::error::FieldError> {
                let rules = $crate::validation::Rules::new(
                    <Self as $crate::record::RecordFormat>::KIND,
                );

                rules.mandatory(
                    "MicrofilmArchiveSequenceNumber",
                    &self.microfilm_archive_sequence_number,
                )?;

                rules.range(
                    "ImageReferenceKeyIndicator",
                    self.image_reference_key_indicator.into(),
                    0..=1,
                )?;
                rules.alphanumeric_special(
                    "MicrofilmArchiveSequenceNumber",
                    &self.microfilm_archive_sequence_number,
                )?;
                rules.numeric("LengthImageReferenceKey", &self.length_image_reference_key)?;
                rules.alphanumeric_special("ImageReferenceKey", &self.image_reference_key)?;
                rules.alphanumeric_special("Description", &self.description)?;
                rules.alphanumeric_special("UserField", &self.user_field)
            }
        }
    };
}

/// Subsequent endorsement (28, 35).
macro_rules! addendum_c {
    ($(#[$meta:meta])* $name:ident) => {
        record! {
            $(#[$meta])*
            pub struct $name($name) {
                /// 1-based position among the item's endorsement addenda.
                record_number: u8 = Numeric(2) as "RecordNumber",
                endorsing_bank_routing_number: String =
                    Alphanumeric(9) as "EndorsingBankRoutingNumber",
                bofd_endorsement_business_date: Option<::chrono::NaiveDate> =
                    Date(8) as "BOFDEndorsementBusinessDate",
                endorsing_bank_item_sequence_number: String =
                    Alphanumeric(15) as "EndorsingBankItemSequenceNumber",
                truncation_indicator: String = Alphanumeric(1) as "TruncationIndicator",
                endorsing_bank_conversion_indicator: String =
                    Alphanumeric(1) as "EndorsingBankConversionIndicator",
                endorsing_bank_correction_indicator: u8 =
                    Numeric(1) as "EndorsingBankCorrectionIndicator",
                return_reason: String = Alphanumeric(1) as "ReturnReason",
                user_field: String = Alphanumeric(19) as "UserField",
                endorsing_bank_identifier: u8 = Numeric(1) as "EndorsingBankIdentifier",
                reserved(20),
            }
        }

        impl $name {
            fn rules(&self) -> Result<(), $crate::error::FieldError> {
                use $crate::validation::{CONVERSION_INDICATORS, Rules, YES_NO};

                let rules = Rules::new(<Self as $crate::record::RecordFormat>::KIND);

                rules.non_zero("RecordNumber", self.record_number.into())?;
                rules.routing_number(
                    "EndorsingBankRoutingNumber",
                    &self.endorsing_bank_routing_number,
                )?;
                rules.mandatory_date(
                    "BOFDEndorsementBusinessDate",
                    self.bofd_endorsement_business_date,
                )?;
                rules.mandatory(
                    "EndorsingBankItemSequenceNumber",
                    &self.endorsing_bank_item_sequence_number,
                )?;
                rules.mandatory("TruncationIndicator", &self.truncation_indicator)?;

                rules.range("RecordNumber", self.record_number.into(), 1..=99)?;
                rules.alphanumeric_special(
                    "EndorsingBankItemSequenceNumber",
                    &self.endorsing_bank_item_sequence_number,
                )?;
                rules.one_of("TruncationIndicator", &self.truncation_indicator, YES_NO)?;
                rules.optional_one_of(
                    "EndorsingBankConversionIndicator",
                    &self.endorsing_bank_conversion_indicator,
                    CONVERSION_INDICATORS,
                )?;
                rules.range(
                    "EndorsingBankCorrectionIndicator",
                    self.endorsing_bank_correction_indicator.into(),
                    0..=4,
                )?;
                rules.alphanumeric("ReturnReason", &self.return_reason)?;
                rules.alphanumeric_special("UserField", &self.user_field)?;
                rules.range(
                    "EndorsingBankIdentifier",
                    self.endorsing_bank_identifier.into(),
                    0..=3,
                )
            }
        }
    };
}

record! {
    /// One forward-presented check.
    pub struct CheckDetail(CheckDetail) {
        auxiliary_on_us: String = Alphanumeric(15) as "AuxiliaryOnUs",
        external_processing_code: String = Alphanumeric(1) as "ExternalProcessingCode",
        /// First eight digits of the payor bank routing number.
        payor_bank_routing_number: String = Alphanumeric(8) as "PayorBankRoutingNumber",
        payor_bank_check_digit: String = Alphanumeric(1) as "PayorBankCheckDigit",
        on_us: String = Alphanumeric(20) as "OnUs",
        /// In cents.
        item_amount: u64 = Numeric(10) as "ItemAmount",
        ece_institution_item_sequence_number: String =
            Alphanumeric(15) as "ECEInstitutionItemSequenceNumber",
        documentation_type_indicator: String = Alphanumeric(1) as "DocumentationTypeIndicator",
        return_acceptance_indicator: String = Alphanumeric(1) as "ReturnAcceptanceIndicator",
        /// `1` means the MICR line was read without errors.
        micr_valid_indicator: Option<u8> = BlankNumeric(1) as "MICRValidIndicator",
        bofd_indicator: String = Alphanumeric(1) as "BOFDIndicator",
        /// Number of addendum records (26, 27, 28) that follow the detail.
        addendum_count: u8 = Numeric(2) as "AddendumCount",
        correction_indicator: u8 = Numeric(1) as "CorrectionIndicator",
        archive_type_indicator: String = Alphanumeric(1) as "ArchiveTypeIndicator",
    }
}

impl CheckDetail {
    fn rules(&self) -> Result<(), FieldError> {
        let rules = Rules::new(RecordKind::CheckDetail);

        rules.routing_number("PayorBankRoutingNumber", &self.payor_bank_routing_number)?;
        rules.mandatory("PayorBankCheckDigit", &self.payor_bank_check_digit)?;
        rules.mandatory(
            "ECEInstitutionItemSequenceNumber",
            &self.ece_institution_item_sequence_number,
        )?;
        rules.mandatory("BOFDIndicator", &self.bofd_indicator)?;

        rules.alphanumeric_special("AuxiliaryOnUs", &self.auxiliary_on_us)?;
        rules.alphanumeric_special("ExternalProcessingCode", &self.external_processing_code)?;
        rules.numeric("PayorBankCheckDigit", &self.payor_bank_check_digit)?;
        rules.alphanumeric_special("OnUs", &self.on_us)?;
        rules.fits("ItemAmount", self.item_amount, 10)?;
        rules.numeric(
            "ECEInstitutionItemSequenceNumber",
            &self.ece_institution_item_sequence_number,
        )?;
        rules.optional_one_of(
            "DocumentationTypeIndicator",
            &self.documentation_type_indicator,
            DOCUMENTATION_TYPES,
        )?;
        rules.optional_one_of(
            "ReturnAcceptanceIndicator",
            &self.return_acceptance_indicator,
            RETURN_ACCEPTANCE,
        )?;
        rules.optional_range("MICRValidIndicator", self.micr_valid_indicator.map(Into::into), 1..=4)?;
        rules.one_of("BOFDIndicator", &self.bofd_indicator, BOFD_INDICATORS)?;
        rules.range("AddendumCount", self.addendum_count.into(), 0..=99)?;
        rules.range("CorrectionIndicator", self.correction_indicator.into(), 0..=4)?;
        rules.optional_one_of("ArchiveTypeIndicator", &self.archive_type_indicator, ARCHIVE_TYPES)
    }
}

addendum_a!(
    /// First-deposit endorsement of a check.
    CheckDetailAddendumA
);

addendum_b!(
    /// Image archive reference of a check.
    CheckDetailAddendumB
);

addendum_c!(
    /// Subsequent endorsement of a check.
    CheckDetailAddendumC
);
