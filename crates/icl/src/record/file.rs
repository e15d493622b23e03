//! File Header (01) and File Control (99).

use chrono::{NaiveDate, NaiveTime};

use crate::{
    error::FieldError,
    record::RecordKind,
    validation::{
        COMPANION_DOCUMENT_CA, COMPANION_DOCUMENT_US, Rules, STANDARD_LEVELS,
        TEST_FILE_INDICATORS, YES_NO,
    },
};

record! {
    /// First record of every file: sender, receiver and creation timestamp.
    pub struct FileHeader(FileHeader) {
        /// `03`, `30` or `35`.
        standard_level: String = Alphanumeric(2) as "StandardLevel",
        /// `T` (test) or `P` (production).
        test_file_indicator: String = Alphanumeric(1) as "TestFileIndicator",
        immediate_destination: String = Alphanumeric(9) as "ImmediateDestination",
        immediate_origin: String = Alphanumeric(9) as "ImmediateOrigin",
        file_creation_date: Option<NaiveDate> = Date(8) as "FileCreationDate",
        file_creation_time: Option<NaiveTime> = Time(4) as "FileCreationTime",
        resend_indicator: String = Alphanumeric(1) as "ResendIndicator",
        immediate_destination_name: String = Alphanumeric(18) as "ImmediateDestinationName",
        immediate_origin_name: String = Alphanumeric(18) as "ImmediateOriginName",
        file_id_modifier: String = Alphanumeric(1) as "FileIDModifier",
        country_code: String = Alphanumeric(2) as "CountryCode",
        user_field: String = Alphanumeric(4) as "UserField",
        /// Meaningful only for `US` and `CA` files.
        companion_document_indicator: String = Alphanumeric(1) as "CompanionDocumentIndicator",
    }
}

impl FileHeader {
    fn rules(&self) -> Result<(), FieldError> {
        let rules = Rules::new(RecordKind::FileHeader);

        rules.mandatory("StandardLevel", &self.standard_level)?;
        rules.mandatory("TestFileIndicator", &self.test_file_indicator)?;
        rules.routing_number("ImmediateDestination", &self.immediate_destination)?;
        rules.routing_number("ImmediateOrigin", &self.immediate_origin)?;
        rules.mandatory_date("FileCreationDate", self.file_creation_date)?;
        rules.mandatory_time("FileCreationTime", self.file_creation_time)?;
        rules.mandatory("ResendIndicator", &self.resend_indicator)?;

        rules.one_of("StandardLevel", &self.standard_level, STANDARD_LEVELS)?;
        rules.one_of("TestFileIndicator", &self.test_file_indicator, TEST_FILE_INDICATORS)?;
        rules.one_of("ResendIndicator", &self.resend_indicator, YES_NO)?;
        rules.alphanumeric_special("ImmediateDestinationName", &self.immediate_destination_name)?;
        rules.alphanumeric_special("ImmediateOriginName", &self.immediate_origin_name)?;
        rules.alphanumeric("FileIDModifier", &self.file_id_modifier)?;
        rules.upper_alpha("CountryCode", &self.country_code)?;
        rules.alphanumeric_special("UserField", &self.user_field)?;

        let allowed = match self.country_code.as_str() {
            "US" => COMPANION_DOCUMENT_US,
            "CA" => COMPANION_DOCUMENT_CA,
            _ => return Ok(()),
        };
        let indicator = self.companion_document_indicator.trim();
        rules.conditional(
            "CompanionDocumentIndicator",
            &self.companion_document_indicator,
            indicator.is_empty() || allowed.contains(&indicator),
        )
    }
}

record! {
    /// Last record of every file: totals over the whole file.
    pub struct FileControl(FileControl) {
        cash_letter_count: u32 = Numeric(6) as "CashLetterCount",
        /// Every record in the file, including this one and the File Header.
        total_record_count: u32 = Numeric(8) as "TotalRecordCount",
        total_item_count: u32 = Numeric(8) as "TotalItemCount",
        /// In cents.
        file_total_amount: u64 = Numeric(16) as "FileTotalAmount",
        immediate_origin_contact_name: String = Alphanumeric(14) as "ImmediateOriginContactName",
        immediate_origin_contact_phone_number: String =
            Alphanumeric(10) as "ImmediateOriginContactPhoneNumber",
        credit_total_indicator: u8 = Numeric(1) as "CreditTotalIndicator",
        reserved(15),
    }
}

impl FileControl {
    fn rules(&self) -> Result<(), FieldError> {
        let rules = Rules::new(RecordKind::FileControl);

        rules.non_zero("CashLetterCount", self.cash_letter_count.into())?;
        rules.non_zero("TotalRecordCount", self.total_record_count.into())?;

        rules.fits("CashLetterCount", self.cash_letter_count.into(), 6)?;
        rules.fits("TotalRecordCount", self.total_record_count.into(), 8)?;
        rules.fits("TotalItemCount", self.total_item_count.into(), 8)?;
        rules.fits("FileTotalAmount", self.file_total_amount, 16)?;
        rules.alphanumeric_special(
            "ImmediateOriginContactName",
            &self.immediate_origin_contact_name,
        )?;
        rules.numeric(
            "ImmediateOriginContactPhoneNumber",
            &self.immediate_origin_contact_phone_number,
        )?;
        rules.range("CreditTotalIndicator", self.credit_total_indicator.into(), 0..=1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::RuleKind, record::RecordFormat};

    fn header_line() -> String {
        format!(
            "0135T231380104121042882201809051523N{:<18}{:<18} US     ",
            "Citadel", "Wells Fargo"
        )
    }

    fn mock_header() -> FileHeader {
        FileHeader::decode(header_line().as_bytes()).unwrap()
    }

    #[test]
    fn parse_file_header() {
        let line = header_line();
        assert_eq!(line.len(), 80);

        let header = FileHeader::decode(line.as_bytes()).unwrap();
        assert_eq!(header.standard_level, "35");
        assert_eq!(header.test_file_indicator, "T");
        assert_eq!(header.immediate_destination, "231380104");
        assert_eq!(header.immediate_origin, "121042882");
        assert_eq!(header.file_creation_date, NaiveDate::from_ymd_opt(2018, 9, 5));
        assert_eq!(header.file_creation_time, NaiveTime::from_hms_opt(15, 23, 0));
        assert_eq!(header.resend_indicator, "N");
        assert_eq!(header.immediate_destination_name, "Citadel");
        assert_eq!(header.country_code, "US");
        assert!(header.validate().is_ok());

        assert_eq!(header.encode(), line.as_bytes());
    }

    #[test]
    fn fixed_width_field_renderings() {
        let header = mock_header();
        assert_eq!(header.field("FileCreationDate").as_deref(), Some("20180905"));
        assert_eq!(header.field("FileCreationTime").as_deref(), Some("1523"));
        assert_eq!(
            header.field("ImmediateDestinationName").as_deref(),
            Some("Citadel           ")
        );
        assert_eq!(header.field("FileIDModifier").as_deref(), Some(" "));
        assert_eq!(header.field("UserField").as_deref(), Some("    "));
        assert_eq!(header.field("NoSuchField"), None);
    }

    #[test]
    fn short_line_yields_unset_fields() {
        let header = FileHeader::decode(b"01").unwrap();
        assert_eq!(header.immediate_origin, "");
        assert_eq!(header.file_creation_date, None);
    }

    #[test]
    fn invalid_enumerations() {
        let mut header = mock_header();
        header.standard_level = "01".into();
        let err = header.validate().unwrap_err();
        assert_eq!((err.field, err.rule), ("StandardLevel", RuleKind::InvalidEnumValue));

        let mut header = mock_header();
        header.test_file_indicator = "S".into();
        assert_eq!(header.validate().unwrap_err().field, "TestFileIndicator");

        let mut header = mock_header();
        header.resend_indicator = "R".into();
        assert_eq!(header.validate().unwrap_err().field, "ResendIndicator");
    }

    #[test]
    fn invalid_character_classes() {
        let mut header = mock_header();
        header.immediate_origin_name = "Wells\tFargo".into();
        let err = header.validate().unwrap_err();
        assert_eq!(
            (err.field, err.rule),
            ("ImmediateOriginName", RuleKind::InvalidCharacterClass)
        );

        let mut header = mock_header();
        header.file_id_modifier = "-".into();
        assert_eq!(header.validate().unwrap_err().field, "FileIDModifier");

        let mut header = mock_header();
        header.country_code = "us".into();
        assert_eq!(header.validate().unwrap_err().field, "CountryCode");
    }

    #[test]
    fn companion_document_indicator_depends_on_country() {
        let mut header = mock_header();
        header.companion_document_indicator = "D".into();
        let err = header.validate().unwrap_err();
        assert_eq!(
            (err.field, err.rule),
            ("CompanionDocumentIndicator", RuleKind::ConditionalRuleViolated)
        );

        header.country_code = "CA".into();
        assert!(header.validate().is_ok());
        header.companion_document_indicator = "1".into();
        assert_eq!(header.validate().unwrap_err().field, "CompanionDocumentIndicator");

        header.country_code = "MX".into();
        assert!(header.validate().is_ok());
    }

    #[test]
    fn mandatory_fields_come_first() {
        let mut header = mock_header();
        header.immediate_destination = "000000000".into();
        header.standard_level = "01".into();
        let err = header.validate().unwrap_err();
        assert_eq!(
            (err.field, err.rule),
            ("ImmediateDestination", RuleKind::MandatoryFieldMissing)
        );

        let mut header = mock_header();
        header.file_creation_time = None;
        assert_eq!(header.validate().unwrap_err().field, "FileCreationTime");

        let mut header = mock_header();
        header.resend_indicator = String::new();
        let err = header.validate().unwrap_err();
        assert_eq!((err.field, err.rule), ("ResendIndicator", RuleKind::MandatoryFieldMissing));
    }

    #[test]
    fn file_control_roundtrip_and_rules() {
        let control = FileControl {
            cash_letter_count: 1,
            total_record_count: 7,
            total_item_count: 1,
            file_total_amount: 100_000,
            immediate_origin_contact_name: "Contact Name".into(),
            immediate_origin_contact_phone_number: "5558675552".into(),
            credit_total_indicator: 0,
        };
        let line = control.encode();
        assert_eq!(line.len(), 80);
        assert!(line.starts_with(b"9900000100000007000000010000000000100000Contact Name  5558675552"));
        assert_eq!(FileControl::decode(&line).unwrap(), control);
        assert!(control.validate().is_ok());

        let mut bad = control.clone();
        bad.cash_letter_count = 0;
        assert_eq!(bad.validate().unwrap_err().field, "CashLetterCount");

        let mut bad = control.clone();
        bad.immediate_origin_contact_phone_number = "555-867".into();
        assert_eq!(
            bad.validate().unwrap_err().rule,
            RuleKind::InvalidCharacterClass
        );

        let mut bad = control;
        bad.credit_total_indicator = 2;
        assert_eq!(bad.validate().unwrap_err().rule, RuleKind::OutOfRange);
    }

    #[test]
    fn oversized_count_is_out_of_range() {
        let control = FileControl {
            cash_letter_count: 1_000_000,
            total_record_count: 1,
            ..FileControl::default()
        };
        let err = control.validate().unwrap_err();
        assert_eq!((err.field, err.rule), ("CashLetterCount", RuleKind::OutOfRange));
        // the slot keeps the rightmost digits
        assert_eq!(control.field("CashLetterCount").as_deref(), Some("000000"));
    }
}
