//! Return Detail (31) and its addenda (32, 33, 34, 35).

use chrono::NaiveDate;

use crate::{
    error::FieldError,
    record::RecordKind,
    validation::{ARCHIVE_TYPES, DOCUMENTATION_TYPES, RETURN_NOTIFICATION, Rules},
};

record! {
    /// One returned item.
    pub struct ReturnDetail(ReturnDetail) {
        payor_bank_routing_number: String = Alphanumeric(8) as "PayorBankRoutingNumber",
        payor_bank_check_digit: String = Alphanumeric(1) as "PayorBankCheckDigit",
        on_us: String = Alphanumeric(20) as "OnUs",
        /// In cents.
        item_amount: u64 = Numeric(10) as "ItemAmount",
        return_reason: String = Alphanumeric(1) as "ReturnReason",
        addendum_count: u8 = Numeric(2) as "AddendumCount",
        documentation_type_indicator: String = Alphanumeric(1) as "DocumentationTypeIndicator",
        forward_bundle_date: Option<NaiveDate> = Date(8) as "ForwardBundleDate",
        ece_institution_item_sequence_number: String =
            Alphanumeric(15) as "ECEInstitutionItemSequenceNumber",
        external_processing_code: String = Alphanumeric(1) as "ExternalProcessingCode",
        return_notification_indicator: String =
            Alphanumeric(1) as "ReturnNotificationIndicator",
        archive_type_indicator: String = Alphanumeric(1) as "ArchiveTypeIndicator",
        times_returned: Option<u8> = BlankNumeric(1) as "TimesReturned",
        reserved(8),
    }
}

impl ReturnDetail {
    fn rules(&self) -> Result<(), FieldError> {
        let rules = Rules::new(RecordKind::ReturnDetail);

        rules.routing_number("PayorBankRoutingNumber", &self.payor_bank_routing_number)?;
        rules.mandatory("PayorBankCheckDigit", &self.payor_bank_check_digit)?;
        rules.mandatory("ReturnReason", &self.return_reason)?;
        rules.mandatory(
            "ECEInstitutionItemSequenceNumber",
            &self.ece_institution_item_sequence_number,
        )?;

        rules.numeric("PayorBankCheckDigit", &self.payor_bank_check_digit)?;
        rules.alphanumeric_special("OnUs", &self.on_us)?;
        rules.fits("ItemAmount", self.item_amount, 10)?;
        rules.alphanumeric("ReturnReason", &self.return_reason)?;
        rules.range("AddendumCount", self.addendum_count.into(), 0..=99)?;
        rules.optional_one_of(
            "DocumentationTypeIndicator",
            &self.documentation_type_indicator,
            DOCUMENTATION_TYPES,
        )?;
        rules.numeric(
            "ECEInstitutionItemSequenceNumber",
            &self.ece_institution_item_sequence_number,
        )?;
        rules.alphanumeric_special("ExternalProcessingCode", &self.external_processing_code)?;
        rules.optional_one_of(
            "ReturnNotificationIndicator",
            &self.return_notification_indicator,
            RETURN_NOTIFICATION,
        )?;
        rules.optional_one_of("ArchiveTypeIndicator", &self.archive_type_indicator, ARCHIVE_TYPES)?;
        rules.optional_range("TimesReturned", self.times_returned.map(Into::into), 0..=3)
    }
}

addendum_a!(
    /// First-deposit endorsement of a returned item.
    ReturnDetailAddendumA
);

record! {
    /// Payor bank details of a returned item.
    pub struct ReturnDetailAddendumB(ReturnDetailAddendumB) {
        payor_bank_name: String = Alphanumeric(18) as "PayorBankName",
        auxiliary_on_us: String = Alphanumeric(15) as "AuxiliaryOnUs",
        payor_bank_sequence_number: String = Alphanumeric(15) as "PayorBankSequenceNumber",
        payor_bank_business_date: Option<NaiveDate> = Date(8) as "PayorBankBusinessDate",
        payor_account_name: String = Alphanumeric(22) as "PayorAccountName",
    }
}

impl ReturnDetailAddendumB {
    fn rules(&self) -> Result<(), FieldError> {
        let rules = Rules::new(RecordKind::ReturnDetailAddendumB);

        rules.mandatory("PayorBankSequenceNumber", &self.payor_bank_sequence_number)?;
        rules.mandatory_date("PayorBankBusinessDate", self.payor_bank_business_date)?;

        rules.alphanumeric_special("PayorBankName", &self.payor_bank_name)?;
        rules.alphanumeric_special("AuxiliaryOnUs", &self.auxiliary_on_us)?;
        rules.alphanumeric_special("PayorBankSequenceNumber", &self.payor_bank_sequence_number)?;
        rules.alphanumeric_special("PayorAccountName", &self.payor_account_name)
    }
}

addendum_b!(
    /// Image archive reference of a returned item.
    ReturnDetailAddendumC
);

addendum_c!(
    /// Subsequent endorsement of a returned item.
    ReturnDetailAddendumD
);
