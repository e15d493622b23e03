//! Валидация модели файла.
//!
//! Обход дерева в порядке записи: заголовок, дочерние агрегаты, контроль.
//! Возвращается первое найденное нарушение.

use super::{Bundle, CashLetter, CheckItem, CreditRecord, File, ImageView, Item, ReturnItem};
use crate::{
    error::{Error, Result, StructuralError},
    record::{RecordFormat, RecordKind},
};

/// Параметры валидации модели.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Сверять итоги контрольных записей с пересчитанными.
    pub strict_totals: bool,
}

impl ValidateOptions {
    /// Валидация со сверкой итогов.
    #[must_use]
    pub const fn strict() -> Self {
        Self { strict_totals: true }
    }
}

fn require<'a, T>(
    slot: Option<&'a T>,
    aggregate: &'static str,
    missing: RecordKind,
) -> Result<&'a T> {
    slot.ok_or(Error::Incomplete { aggregate, missing })
}

fn limit(record: RecordKind, len: usize, limit: usize) -> Result<()> {
    if len > limit {
        return Err(Error::structural(0, StructuralError::TooManyAddenda { record, limit }));
    }
    Ok(())
}

impl File {
    /// Проверяет все записи файла без сверки итогов.
    ///
    /// # Errors
    ///
    /// Первое нарушение: [`Error::Incomplete`] при отсутствии заголовка или
    /// контроля, [`Error::Field`] для правил полей, [`Error::Structural`] при
    /// превышении количества дополнений.
    pub fn validate(&self) -> Result<()> {
        self.validate_with(ValidateOptions::default())
    }

    /// Проверяет все записи файла с заданными параметрами.
    ///
    /// # Errors
    ///
    /// Как [`File::validate`]; дополнительно [`Error::TotalsMismatch`] при
    /// `strict_totals`.
    pub fn validate_with(&self, options: ValidateOptions) -> Result<()> {
        require(self.header.as_ref(), "File", RecordKind::FileHeader)?.validate()?;
        for cash_letter in &self.cash_letters {
            cash_letter.validate_with(options)?;
        }
        let control = require(self.control.as_ref(), "File", RecordKind::FileControl)?;
        control.validate()?;
        if options.strict_totals {
            self.totals().check(control)?;
        }
        Ok(())
    }
}

impl CashLetter {
    pub fn validate_with(&self, options: ValidateOptions) -> Result<()> {
        require(self.header.as_ref(), "CashLetter", RecordKind::CashLetterHeader)?.validate()?;
        for credit in &self.credits {
            match credit {
                CreditRecord::Credit(record) => record.validate()?,
                CreditRecord::CreditItem(record) => record.validate()?,
            }
        }
        for bundle in &self.bundles {
            bundle.validate_with(options)?;
        }
        for summary in &self.routing_number_summaries {
            summary.validate()?;
        }
        let control = require(self.control.as_ref(), "CashLetter", RecordKind::CashLetterControl)?;
        control.validate()?;
        if options.strict_totals {
            self.totals().check(control)?;
        }
        Ok(())
    }
}

impl Bundle {
    pub fn validate_with(&self, options: ValidateOptions) -> Result<()> {
        require(self.header.as_ref(), "Bundle", RecordKind::BundleHeader)?.validate()?;
        for item in &self.items {
            item.validate()?;
        }
        let control = require(self.control.as_ref(), "Bundle", RecordKind::BundleControl)?;
        control.validate()?;
        if options.strict_totals {
            self.totals().check(control)?;
        }
        Ok(())
    }
}

impl Item {
    /// Проверяет деталь, дополнения (включая их количество) и изображения.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Check(check) => check.validate(),
            Self::Return(ret) => ret.validate(),
        }
    }
}

impl CheckItem {
    pub fn validate(&self) -> Result<()> {
        self.detail.validate()?;
        limit(RecordKind::CheckDetailAddendumA, self.addenda_a.len(), Self::MAX_ADDENDA_A)?;
        limit(RecordKind::CheckDetailAddendumC, self.addenda_c.len(), Self::MAX_ADDENDA_C)?;
        for addendum in &self.addenda_a {
            addendum.validate()?;
        }
        if let Some(addendum) = &self.addendum_b {
            addendum.validate()?;
        }
        for addendum in &self.addenda_c {
            addendum.validate()?;
        }
        self.image_views.iter().try_for_each(ImageView::validate)
    }
}

impl ReturnItem {
    pub fn validate(&self) -> Result<()> {
        self.detail.validate()?;
        limit(RecordKind::ReturnDetailAddendumA, self.addenda_a.len(), Self::MAX_ADDENDA_A)?;
        limit(RecordKind::ReturnDetailAddendumD, self.addenda_d.len(), Self::MAX_ADDENDA_D)?;
        for addendum in &self.addenda_a {
            addendum.validate()?;
        }
        if let Some(addendum) = &self.addendum_b {
            addendum.validate()?;
        }
        if let Some(addendum) = &self.addendum_c {
            addendum.validate()?;
        }
        for addendum in &self.addenda_d {
            addendum.validate()?;
        }
        self.image_views.iter().try_for_each(ImageView::validate)
    }
}

impl ImageView {
    pub fn validate(&self) -> Result<()> {
        self.detail.validate()?;
        if let Some(data) = &self.data {
            data.validate()?;
        }
        if let Some(analysis) = &self.analysis {
            analysis.validate()?;
        }
        Ok(())
    }
}
