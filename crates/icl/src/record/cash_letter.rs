//! Cash Letter Header (10), Routing Number Summary (85) and Cash Letter
//! Control (90).

use chrono::{NaiveDate, NaiveTime};

use crate::{
    error::FieldError,
    record::RecordKind,
    validation::{
        COLLECTION_TYPES, DOCUMENTATION_TYPES, FED_WORK_TYPES, RECORD_TYPE_INDICATORS,
        RETURNS_INDICATORS, Rules,
    },
};

record! {
    /// Opens a cash letter: a batch of bundles sent to one destination.
    pub struct CashLetterHeader(CashLetterHeader) {
        collection_type_indicator: String = Alphanumeric(2) as "CollectionTypeIndicator",
        destination_routing_number: String = Alphanumeric(9) as "DestinationRoutingNumber",
        ece_institution_routing_number: String =
            Alphanumeric(9) as "ECEInstitutionRoutingNumber",
        cash_letter_business_date: Option<NaiveDate> = Date(8) as "CashLetterBusinessDate",
        cash_letter_creation_date: Option<NaiveDate> = Date(8) as "CashLetterCreationDate",
        cash_letter_creation_time: Option<NaiveTime> = Time(4) as "CashLetterCreationTime",
        /// `N` (no images), `E` (electronic), `I` (image) or `F` (image with paper).
        record_type_indicator: String = Alphanumeric(1) as "RecordTypeIndicator",
        documentation_type_indicator: String = Alphanumeric(1) as "DocumentationTypeIndicator",
        cash_letter_id: String = Alphanumeric(8) as "CashLetterID",
        originator_contact_name: String = Alphanumeric(14) as "OriginatorContactName",
        originator_contact_phone_number: String =
            Alphanumeric(10) as "OriginatorContactPhoneNumber",
        fed_work_type: String = Alphanumeric(1) as "FedWorkType",
        returns_indicator: String = Alphanumeric(1) as "ReturnsIndicator",
        user_field: String = Alphanumeric(1) as "UserField",
        reserved(1),
    }
}

impl CashLetterHeader {
    fn rules(&self) -> Result<(), FieldError> {
        let rules = Rules::new(RecordKind::CashLetterHeader);

        rules.mandatory("CollectionTypeIndicator", &self.collection_type_indicator)?;
        rules.routing_number("DestinationRoutingNumber", &self.destination_routing_number)?;
        rules.routing_number("ECEInstitutionRoutingNumber", &self.ece_institution_routing_number)?;
        rules.mandatory_date("CashLetterBusinessDate", self.cash_letter_business_date)?;
        rules.mandatory_date("CashLetterCreationDate", self.cash_letter_creation_date)?;
        rules.mandatory_time("CashLetterCreationTime", self.cash_letter_creation_time)?;
        rules.mandatory("RecordTypeIndicator", &self.record_type_indicator)?;
        rules.mandatory("CashLetterID", &self.cash_letter_id)?;

        rules.one_of(
            "CollectionTypeIndicator",
            &self.collection_type_indicator,
            COLLECTION_TYPES,
        )?;
        rules.one_of("RecordTypeIndicator", &self.record_type_indicator, RECORD_TYPE_INDICATORS)?;
        rules.optional_one_of(
            "DocumentationTypeIndicator",
            &self.documentation_type_indicator,
            DOCUMENTATION_TYPES,
        )?;
        // image cash letters must say how the items are documented
        rules.conditional(
            "DocumentationTypeIndicator",
            &self.documentation_type_indicator,
            !matches!(self.record_type_indicator.as_str(), "E" | "I")
                || !self.documentation_type_indicator.trim().is_empty(),
        )?;
        rules.alphanumeric("CashLetterID", &self.cash_letter_id)?;
        rules.alphanumeric_special("OriginatorContactName", &self.originator_contact_name)?;
        rules.numeric("OriginatorContactPhoneNumber", &self.originator_contact_phone_number)?;
        rules.optional_one_of("FedWorkType", &self.fed_work_type, FED_WORK_TYPES)?;
        rules.optional_one_of("ReturnsIndicator", &self.returns_indicator, RETURNS_INDICATORS)?;
        rules.alphanumeric_special("UserField", &self.user_field)
    }
}

record! {
    /// Optional per-routing-number subtotal, written after the last bundle.
    pub struct RoutingNumberSummary(RoutingNumberSummary) {
        cash_letter_routing_number: String = Alphanumeric(9) as "CashLetterRoutingNumber",
        routing_number_total_amount: u64 = Numeric(14) as "RoutingNumberTotalAmount",
        routing_number_item_count: u32 = Numeric(6) as "RoutingNumberItemCount",
        user_field: String = Alphanumeric(24) as "UserField",
        reserved(25),
    }
}

impl RoutingNumberSummary {
    fn rules(&self) -> Result<(), FieldError> {
        let rules = Rules::new(RecordKind::RoutingNumberSummary);

        rules.routing_number("CashLetterRoutingNumber", &self.cash_letter_routing_number)?;

        rules.fits("RoutingNumberTotalAmount", self.routing_number_total_amount, 14)?;
        rules.fits("RoutingNumberItemCount", self.routing_number_item_count.into(), 6)?;
        rules.alphanumeric_special("UserField", &self.user_field)
    }
}

record! {
    /// Closes a cash letter with its totals.
    pub struct CashLetterControl(CashLetterControl) {
        cash_letter_bundle_count: u32 = Numeric(6) as "CashLetterBundleCount",
        cash_letter_items_count: u32 = Numeric(8) as "CashLetterItemsCount",
        /// In cents.
        cash_letter_total_amount: u64 = Numeric(14) as "CashLetterTotalAmount",
        cash_letter_images_count: u32 = Numeric(9) as "CashLetterImagesCount",
        ece_institution_name: String = Alphanumeric(18) as "ECEInstitutionName",
        settlement_date: Option<NaiveDate> = Date(8) as "SettlementDate",
        credit_total_indicator: u8 = Numeric(1) as "CreditTotalIndicator",
        reserved(14),
    }
}

impl CashLetterControl {
    fn rules(&self) -> Result<(), FieldError> {
        let rules = Rules::new(RecordKind::CashLetterControl);

        rules.fits("CashLetterBundleCount", self.cash_letter_bundle_count.into(), 6)?;
        rules.fits("CashLetterItemsCount", self.cash_letter_items_count.into(), 8)?;
        rules.fits("CashLetterTotalAmount", self.cash_letter_total_amount, 14)?;
        rules.fits("CashLetterImagesCount", self.cash_letter_images_count.into(), 9)?;
        rules.alphanumeric_special("ECEInstitutionName", &self.ece_institution_name)?;
        rules.range("CreditTotalIndicator", self.credit_total_indicator.into(), 0..=1)
    }
}
