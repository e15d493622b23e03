//! Правила валидации полей.
//!
//! Предикаты классов символов и набор проверок [`Rules`], общих для всех
//! видов записей. Каждая проверка возвращает `Ok(())` или [`FieldError`]
//! с именем поля, отображением значения и видом правила, поэтому
//! `validate()` записи — это цепочка проверок через `?`: первая ошибка
//! прерывает валидацию.

use std::ops::RangeInclusive;

use chrono::{NaiveDate, NaiveTime};

use crate::{
    error::{FieldError, RuleKind},
    record::RecordKind,
};

// ============================================================================
// Предикаты
// ============================================================================

/// Только латинские буквы, цифры и пробелы.
#[must_use]
pub fn is_alphanumeric(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_alphanumeric() || b == b' ')
}

/// Печатные символы ASCII (буквы, цифры, пробел и спецсимволы).
#[must_use]
pub fn is_alphanumeric_special(value: &str) -> bool {
    value.bytes().all(|b| (b' '..=b'~').contains(&b))
}

/// Только заглавные латинские буквы.
#[must_use]
pub fn is_upper_alpha(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_uppercase())
}

/// Только цифры.
#[must_use]
pub fn is_numeric(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

// ============================================================================
// Проверки
// ============================================================================

/// Набор проверок, привязанный к виду записи.
#[derive(Debug, Clone, Copy)]
pub struct Rules {
    record: RecordKind,
}

impl Rules {
    #[must_use]
    pub const fn new(record: RecordKind) -> Self {
        Self { record }
    }

    fn fail(&self, field: &'static str, value: impl ToString, rule: RuleKind) -> FieldError {
        FieldError::new(self.record, field, value.to_string(), rule)
    }

    // === Обязательность ===

    /// Поле не должно быть пустым.
    pub fn mandatory(&self, field: &'static str, value: &str) -> Result<(), FieldError> {
        if is_blank(value) {
            return Err(self.fail(field, value, RuleKind::MandatoryFieldMissing));
        }
        Ok(())
    }

    /// Дата должна быть задана.
    pub fn mandatory_date(
        &self,
        field: &'static str,
        value: Option<NaiveDate>,
    ) -> Result<(), FieldError> {
        if value.is_none() {
            return Err(self.fail(field, "", RuleKind::MandatoryFieldMissing));
        }
        Ok(())
    }

    /// Время должно быть задано.
    pub fn mandatory_time(
        &self,
        field: &'static str,
        value: Option<NaiveTime>,
    ) -> Result<(), FieldError> {
        if value.is_none() {
            return Err(self.fail(field, "", RuleKind::MandatoryFieldMissing));
        }
        Ok(())
    }

    /// Число не должно быть нулём.
    pub fn non_zero(&self, field: &'static str, value: u64) -> Result<(), FieldError> {
        if value == 0 {
            return Err(self.fail(field, value, RuleKind::MandatoryFieldMissing));
        }
        Ok(())
    }

    /// Номер маршрутизации: обязателен, только цифры, не все нули.
    pub fn routing_number(&self, field: &'static str, value: &str) -> Result<(), FieldError> {
        self.mandatory(field, value)?;
        if !is_numeric(value) {
            return Err(self.fail(field, value, RuleKind::InvalidCharacterClass));
        }
        if value.bytes().all(|b| b == b'0') {
            return Err(self.fail(field, value, RuleKind::MandatoryFieldMissing));
        }
        Ok(())
    }

    // === Классы символов ===

    /// Только буквы, цифры и пробелы.
    pub fn alphanumeric(&self, field: &'static str, value: &str) -> Result<(), FieldError> {
        if !is_alphanumeric(value) {
            return Err(self.fail(field, value, RuleKind::InvalidCharacterClass));
        }
        Ok(())
    }

    /// Печатные символы ASCII.
    pub fn alphanumeric_special(
        &self,
        field: &'static str,
        value: &str,
    ) -> Result<(), FieldError> {
        if !is_alphanumeric_special(value) {
            return Err(self.fail(field, value, RuleKind::InvalidCharacterClass));
        }
        Ok(())
    }

    /// Заглавные буквы; пустое значение допустимо.
    pub fn upper_alpha(&self, field: &'static str, value: &str) -> Result<(), FieldError> {
        if !is_blank(value) && !is_upper_alpha(value) {
            return Err(self.fail(field, value, RuleKind::InvalidCharacterClass));
        }
        Ok(())
    }

    /// Цифры (с пробелами по краям); пустое значение допустимо.
    pub fn numeric(&self, field: &'static str, value: &str) -> Result<(), FieldError> {
        if !is_numeric(value.trim()) {
            return Err(self.fail(field, value, RuleKind::InvalidCharacterClass));
        }
        Ok(())
    }

    // === Перечисления и диапазоны ===

    /// Значение из допустимого набора. Пустое значение тоже ошибка.
    pub fn one_of(
        &self,
        field: &'static str,
        value: &str,
        allowed: &[&str],
    ) -> Result<(), FieldError> {
        if !allowed.contains(&value) {
            return Err(self.fail(field, value, RuleKind::InvalidEnumValue));
        }
        Ok(())
    }

    /// Пустое значение или значение из допустимого набора.
    pub fn optional_one_of(
        &self,
        field: &'static str,
        value: &str,
        allowed: &[&str],
    ) -> Result<(), FieldError> {
        if is_blank(value) {
            return Ok(());
        }
        self.one_of(field, value, allowed)
    }

    /// Число в заданном диапазоне.
    pub fn range(
        &self,
        field: &'static str,
        value: u64,
        range: RangeInclusive<u64>,
    ) -> Result<(), FieldError> {
        if !range.contains(&value) {
            return Err(self.fail(field, value, RuleKind::OutOfRange));
        }
        Ok(())
    }

    /// Незаданное число или число в диапазоне.
    pub fn optional_range(
        &self,
        field: &'static str,
        value: Option<u64>,
        range: RangeInclusive<u64>,
    ) -> Result<(), FieldError> {
        match value {
            Some(v) => self.range(field, v, range),
            None => Ok(()),
        }
    }

    /// Число помещается в `width` десятичных разрядов.
    pub fn fits(&self, field: &'static str, value: u64, width: u32) -> Result<(), FieldError> {
        let fits = 10u64.checked_pow(width).is_none_or(|limit| value < limit);
        if !fits {
            return Err(self.fail(field, value, RuleKind::OutOfRange));
        }
        Ok(())
    }

    /// Правило, зависящее от соседнего поля: при `holds == false` поле невалидно.
    pub fn conditional(
        &self,
        field: &'static str,
        value: &str,
        holds: bool,
    ) -> Result<(), FieldError> {
        if !holds {
            return Err(self.fail(field, value, RuleKind::ConditionalRuleViolated));
        }
        Ok(())
    }
}

// ============================================================================
// Наборы кодов стандарта
// ============================================================================

pub(crate) const STANDARD_LEVELS: &[&str] = &["03", "30", "35"];
pub(crate) const TEST_FILE_INDICATORS: &[&str] = &["T", "P"];
pub(crate) const YES_NO: &[&str] = &["Y", "N"];
pub(crate) const COLLECTION_TYPES: &[&str] =
    &["00", "01", "02", "03", "04", "05", "06", "10", "20"];
pub(crate) const RECORD_TYPE_INDICATORS: &[&str] = &["N", "E", "I", "F"];
pub(crate) const DOCUMENTATION_TYPES: &[&str] =
    &["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "Z"];
pub(crate) const RETURNS_INDICATORS: &[&str] = &["E", "R", "J", "N"];
pub(crate) const FED_WORK_TYPES: &[&str] =
    &["1", "2", "3", "4", "5", "6", "7", "8", "9", "A", "B", "C", "D", "E"];
pub(crate) const BOFD_INDICATORS: &[&str] = &["Y", "N", "U"];
pub(crate) const ARCHIVE_TYPES: &[&str] = &["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"];
pub(crate) const RETURN_ACCEPTANCE: &[&str] = &[
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "A", "B", "C", "D", "E", "F",
];
pub(crate) const CONVERSION_INDICATORS: &[&str] =
    &["0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "A", "B"];
pub(crate) const RETURN_NOTIFICATION: &[&str] = &["1", "2"];
pub(crate) const COMPANION_DOCUMENT_US: &[&str] =
    &["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
pub(crate) const COMPANION_DOCUMENT_CA: &[&str] =
    &["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"];
pub(crate) const IMAGE_VIEW_FORMATS: &[&str] =
    &["00", "01", "02", "20", "21", "22", "23", "24", "25", "99"];
pub(crate) const IMAGE_COMPRESSIONS: &[&str] =
    &["00", "01", "02", "21", "22", "23", "24", "25", "99"];
pub(crate) const VIEW_DESCRIPTORS: &[&str] =
    &["00", "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12", "13"];
pub(crate) const SIGNATURE_METHODS: &[&str] = &["00", "01", "02", "03", "04", "05", "99"];
pub(crate) const OVERRIDE_INDICATORS: &[&str] = &[
    "0", "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q",
    "R", "S", "T", "U", "V", "W",
];
pub(crate) const CREDIT_DOCUMENTATION_TYPES: &[&str] = &["G", "K"];
