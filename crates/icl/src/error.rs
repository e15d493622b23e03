//! Модуль ошибок кодека, валидации и сборки файла.
//!
//! Все ошибки — закрытые перечисления со структурными данными: имя поля,
//! вид нарушенного правила, номер строки. Разбор ошибки выполняется
//! сопоставлением с образцом, без проверки типов во время выполнения.

use std::{fmt, io};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{reader::ParseState, record::RecordKind};

/// Вид нарушенного правила поля.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    /// Обязательное поле пустое (или нулевое для номеров маршрутизации).
    MandatoryFieldMissing,
    /// Значение не входит в допустимый набор кодов.
    InvalidEnumValue,
    /// Недопустимый класс символов (например, буква в числовом поле).
    InvalidCharacterClass,
    /// Число вне допустимого диапазона или не помещается в ширину поля.
    OutOfRange,
    /// Нарушено правило, зависящее от соседнего поля.
    ConditionalRuleViolated,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MandatoryFieldMissing => "is mandatory",
            Self::InvalidEnumValue => "has a value outside its allowed set",
            Self::InvalidCharacterClass => "contains invalid characters",
            Self::OutOfRange => "is out of range",
            Self::ConditionalRuleViolated => "violates a conditional rule",
        };
        f.write_str(text)
    }
}

/// Ошибка одного поля записи.
///
/// Возвращается `validate()` (первое нарушение в записи) и декодером,
/// если содержимое колонки не удаётся разобрать.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{record} {field} {rule}: '{value}'")]
pub struct FieldError {
    /// Вид записи, которой принадлежит поле.
    pub record: RecordKind,
    /// Имя поля в терминах стандарта (например, `TruncationIndicator`).
    pub field: &'static str,
    /// Отображение некорректного значения.
    pub value: String,
    /// Нарушенное правило.
    pub rule: RuleKind,
}

impl FieldError {
    /// Создаёт ошибку поля.
    pub fn new(
        record: RecordKind,
        field: &'static str,
        value: impl Into<String>,
        rule: RuleKind,
    ) -> Self {
        Self { record, field, value: value.into(), rule }
    }
}

/// Нарушение порядка или вложенности записей.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// Дискриминатор строки не соответствует ни одному виду записи.
    #[error("unknown record type '{0}'")]
    UnknownRecordType(String),

    /// Запись встретилась там, где автомат её не допускает.
    #[error("{record} is not allowed {state}")]
    OutOfSequence {
        /// Вид неожиданной записи.
        record: RecordKind,
        /// Состояние автомата в момент ошибки.
        state: ParseState,
    },

    /// Повторный заголовок при уже открытом агрегате того же уровня.
    #[error("duplicate {0}: the enclosing aggregate is still open")]
    DuplicateHeader(RecordKind),

    /// Превышено допустимое количество дополнений одного вида.
    #[error("more than {limit} {record} record(s) for one item")]
    TooManyAddenda {
        /// Вид дополнения.
        record: RecordKind,
        /// Максимально допустимое количество.
        limit: usize,
    },

    /// Вход закончился до File Control.
    #[error("input ended {state}")]
    UnexpectedEof {
        /// Состояние автомата в конце входа.
        state: ParseState,
    },

    /// Запись после File Control.
    #[error("{0} after the File Control record")]
    TrailingRecord(RecordKind),
}

/// Главная ошибка крейта.
#[derive(Debug, Error)]
pub enum Error {
    // === I/O ошибки ===
    /// Ошибка ввода/вывода.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // === Ошибки декодирования ===
    /// Содержимое колонки не удалось разобрать.
    ///
    /// `line` — номер строки входа (1-based), `0` вне [`Reader`](crate::Reader).
    #[error("line {line}: {source}")]
    Decode {
        /// Номер строки (1-based).
        line: usize,
        /// Ошибка поля.
        #[source]
        source: FieldError,
    },

    /// Дискриминатор строки не совпадает с ожидаемым видом записи.
    #[error("line {line}: expected {expected} record, found type '{found}'")]
    TypeMismatch {
        /// Номер строки (1-based).
        line: usize,
        /// Ожидаемый вид записи.
        expected: RecordKind,
        /// Фактические первые два символа.
        found: String,
    },

    // === Ошибки структуры ===
    /// Нарушен порядок записей.
    #[error("line {line}: {source}")]
    Structural {
        /// Номер строки (1-based).
        line: usize,
        /// Подробности.
        #[source]
        source: StructuralError,
    },

    // === Ошибки валидации ===
    /// Ошибка валидации поля.
    #[error("validation error: {0}")]
    Field(#[from] FieldError),

    /// Итоги управляющей записи расходятся с пересчитанными.
    #[error("{record} {field}: stated {stated}, computed {computed}")]
    TotalsMismatch {
        /// Вид управляющей записи.
        record: RecordKind,
        /// Имя поля итога.
        field: &'static str,
        /// Значение из записи.
        stated: u64,
        /// Значение, пересчитанное по дочерним записям.
        computed: u64,
    },

    // === Ошибки записи ===
    /// У агрегата нет обязательной записи заголовка или контроля.
    #[error("{aggregate} has no {missing} record")]
    Incomplete {
        /// Имя агрегата (`File`, `CashLetter`, `Bundle`).
        aggregate: &'static str,
        /// Отсутствующая запись.
        missing: RecordKind,
    },
}

/// Машинно-проверяемый тег вида ошибки.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    Decode,
    TypeMismatch,
    Structural,
    Field,
    TotalsMismatch,
    Incomplete,
}

impl Error {
    /// Возвращает тег вида ошибки.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::Structural { .. } => ErrorKind::Structural,
            Self::Field(_) => ErrorKind::Field,
            Self::TotalsMismatch { .. } => ErrorKind::TotalsMismatch,
            Self::Incomplete { .. } => ErrorKind::Incomplete,
        }
    }

    /// Номер строки входа, если ошибка возникла при разборе.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Decode { line, .. }
            | Self::TypeMismatch { line, .. }
            | Self::Structural { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Ошибка поля, если она есть (декодирование или валидация).
    #[must_use]
    pub fn field_error(&self) -> Option<&FieldError> {
        match self {
            Self::Decode { source, .. } => Some(source),
            Self::Field(err) => Some(err),
            _ => None,
        }
    }

    /// Подставляет номер строки в ошибки декодирования.
    pub(crate) fn at_line(self, at: usize) -> Self {
        match self {
            Self::Decode { source, .. } => Self::Decode { line: at, source },
            Self::TypeMismatch { expected, found, .. } => {
                Self::TypeMismatch { line: at, expected, found }
            }
            other => other,
        }
    }

    pub(crate) fn structural(line: usize, source: StructuralError) -> Self {
        Self::Structural { line, source }
    }
}

/// Удобный alias для Result с [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
