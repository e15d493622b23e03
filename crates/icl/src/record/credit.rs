//! Credit (61) and Credit Item (62).

use crate::{
    error::FieldError,
    record::RecordKind,
    validation::{CREDIT_DOCUMENTATION_TYPES, Rules},
};

record! {
    /// Deposit credit for the cash letter, written before the first bundle.
    pub struct Credit(Credit) {
        auxiliary_on_us: String = Alphanumeric(15) as "AuxiliaryOnUs",
        external_processing_code: String = Alphanumeric(1) as "ExternalProcessingCode",
        payor_bank_routing_number: String = Alphanumeric(9) as "PayorBankRoutingNumber",
        credit_account_number_on_us: String = Alphanumeric(20) as "CreditAccountNumberOnUs",
        /// In cents.
        item_amount: u64 = Numeric(10) as "ItemAmount",
        ece_institution_item_sequence_number: String =
            Alphanumeric(15) as "ECEInstitutionItemSequenceNumber",
        documentation_type_indicator: String = Alphanumeric(1) as "DocumentationTypeIndicator",
        account_type_code: String = Alphanumeric(1) as "AccountTypeCode",
        source_work_code: String = Alphanumeric(2) as "SourceWorkCode",
        work_type: String = Alphanumeric(1) as "WorkType",
        debit_credit_indicator: String = Alphanumeric(1) as "DebitCreditIndicator",
        reserved(2),
    }
}

impl Credit {
    fn rules(&self) -> Result<(), FieldError> {
        let rules = Rules::new(RecordKind::Credit);

        rules.routing_number("PayorBankRoutingNumber", &self.payor_bank_routing_number)?;
        rules.mandatory("CreditAccountNumberOnUs", &self.credit_account_number_on_us)?;
        rules.mandatory(
            "ECEInstitutionItemSequenceNumber",
            &self.ece_institution_item_sequence_number,
        )?;

        rules.alphanumeric_special("AuxiliaryOnUs", &self.auxiliary_on_us)?;
        rules.alphanumeric_special("ExternalProcessingCode", &self.external_processing_code)?;
        rules.alphanumeric_special("CreditAccountNumberOnUs", &self.credit_account_number_on_us)?;
        rules.fits("ItemAmount", self.item_amount, 10)?;
        rules.numeric(
            "ECEInstitutionItemSequenceNumber",
            &self.ece_institution_item_sequence_number,
        )?;
        rules.optional_one_of(
            "DocumentationTypeIndicator",
            &self.documentation_type_indicator,
            CREDIT_DOCUMENTATION_TYPES,
        )?;
        rules.alphanumeric("AccountTypeCode", &self.account_type_code)?;
        rules.numeric("SourceWorkCode", &self.source_work_code)?;
        rules.alphanumeric("WorkType", &self.work_type)?;
        rules.alphanumeric("DebitCreditIndicator", &self.debit_credit_indicator)
    }
}

record! {
    /// Credit item, the only 100-column record.
    pub struct CreditItem(CreditItem) {
        auxiliary_on_us: String = Alphanumeric(15) as "AuxiliaryOnUs",
        external_processing_code: String = Alphanumeric(1) as "ExternalProcessingCode",
        posting_bank_routing_number: String = Alphanumeric(9) as "PostingBankRoutingNumber",
        on_us: String = Alphanumeric(20) as "OnUs",
        /// In cents.
        item_amount: u64 = Numeric(14) as "ItemAmount",
        credit_item_sequence_number: String = Alphanumeric(15) as "CreditItemSequenceNumber",
        documentation_type_indicator: String = Alphanumeric(1) as "DocumentationTypeIndicator",
        account_type_code: String = Alphanumeric(1) as "AccountTypeCode",
        source_work_code: String = Alphanumeric(2) as "SourceWorkCode",
        user_field: String = Alphanumeric(16) as "UserField",
        reserved(4),
    }
}

impl CreditItem {
    fn rules(&self) -> Result<(), FieldError> {
        let rules = Rules::new(RecordKind::CreditItem);

        rules.routing_number("PostingBankRoutingNumber", &self.posting_bank_routing_number)?;
        rules.mandatory("CreditItemSequenceNumber", &self.credit_item_sequence_number)?;

        rules.alphanumeric_special("AuxiliaryOnUs", &self.auxiliary_on_us)?;
        rules.alphanumeric_special("ExternalProcessingCode", &self.external_processing_code)?;
        rules.alphanumeric_special("OnUs", &self.on_us)?;
        rules.fits("ItemAmount", self.item_amount, 14)?;
        rules.alphanumeric_special("CreditItemSequenceNumber", &self.credit_item_sequence_number)?;
        rules.optional_one_of(
            "DocumentationTypeIndicator",
            &self.documentation_type_indicator,
            CREDIT_DOCUMENTATION_TYPES,
        )?;
        rules.alphanumeric("AccountTypeCode", &self.account_type_code)?;
        rules.numeric("SourceWorkCode", &self.source_work_code)?;
        rules.alphanumeric_special("UserField", &self.user_field)
    }
}
