//! Bundle Header (20) and Bundle Control (70).

use chrono::NaiveDate;

use crate::{
    error::FieldError,
    record::RecordKind,
    validation::{COLLECTION_TYPES, Rules},
};

record! {
    /// Opens a bundle of items inside a cash letter.
    pub struct BundleHeader(BundleHeader) {
        collection_type_indicator: String = Alphanumeric(2) as "CollectionTypeIndicator",
        destination_routing_number: String = Alphanumeric(9) as "DestinationRoutingNumber",
        ece_institution_routing_number: String =
            Alphanumeric(9) as "ECEInstitutionRoutingNumber",
        bundle_business_date: Option<NaiveDate> = Date(8) as "BundleBusinessDate",
        bundle_creation_date: Option<NaiveDate> = Date(8) as "BundleCreationDate",
        bundle_id: String = Alphanumeric(10) as "BundleID",
        /// Position of the bundle within its cash letter, starting at 1.
        bundle_sequence_number: u16 = Numeric(4) as "BundleSequenceNumber",
        cycle_number: String = Alphanumeric(2) as "CycleNumber",
        reserved(9),
        user_field: String = Alphanumeric(5) as "UserField",
        reserved(12),
    }
}

impl BundleHeader {
    fn rules(&self) -> Result<(), FieldError> {
        let rules = Rules::new(RecordKind::BundleHeader);

        rules.mandatory("CollectionTypeIndicator", &self.collection_type_indicator)?;
        rules.routing_number("DestinationRoutingNumber", &self.destination_routing_number)?;
        rules.routing_number("ECEInstitutionRoutingNumber", &self.ece_institution_routing_number)?;
        rules.mandatory_date("BundleBusinessDate", self.bundle_business_date)?;
        rules.mandatory_date("BundleCreationDate", self.bundle_creation_date)?;

        rules.one_of(
            "CollectionTypeIndicator",
            &self.collection_type_indicator,
            COLLECTION_TYPES,
        )?;
        rules.alphanumeric("BundleID", &self.bundle_id)?;
        rules.fits("BundleSequenceNumber", self.bundle_sequence_number.into(), 4)?;
        rules.alphanumeric("CycleNumber", &self.cycle_number)?;
        rules.alphanumeric_special("UserField", &self.user_field)
    }
}

record! {
    /// Closes a bundle with its totals.
    pub struct BundleControl(BundleControl) {
        bundle_items_count: u16 = Numeric(4) as "BundleItemsCount",
        /// In cents.
        bundle_total_amount: u64 = Numeric(12) as "BundleTotalAmount",
        /// Sum over items whose MICR line was read without errors.
        micr_valid_total_amount: u64 = Numeric(12) as "MICRValidTotalAmount",
        bundle_images_count: u32 = Numeric(5) as "BundleImagesCount",
        user_field: String = Alphanumeric(20) as "UserField",
        credit_total_indicator: u8 = Numeric(1) as "CreditTotalIndicator",
        reserved(24),
    }
}

impl BundleControl {
    fn rules(&self) -> Result<(), FieldError> {
        let rules = Rules::new(RecordKind::BundleControl);

        rules.non_zero("BundleItemsCount", self.bundle_items_count.into())?;

        rules.fits("BundleItemsCount", self.bundle_items_count.into(), 4)?;
        rules.fits("BundleTotalAmount", self.bundle_total_amount, 12)?;
        rules.fits("MICRValidTotalAmount", self.micr_valid_total_amount, 12)?;
        rules.fits("BundleImagesCount", self.bundle_images_count.into(), 5)?;
        rules.alphanumeric_special("UserField", &self.user_field)?;
        rules.range("CreditTotalIndicator", self.credit_total_indicator.into(), 0..=1)
    }
}
