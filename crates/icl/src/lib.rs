//! Библиотека чтения и записи файлов image cash letter (X9.100-187).
//!
//! Файл X9 — последовательность строк фиксированной ширины; первые два
//! символа каждой строки определяют вид записи. Крейт предоставляет:
//!
//! - [`field`] — кодек полей фиксированной ширины
//! - [`validation`] — правила проверки полей
//! - [`record`] — каталог из 21 вида записей
//! - [`model`] — дерево File → CashLetter → Bundle → Item
//! - [`Reader`] и [`Writer`] — разбор и сериализация файла целиком
//! - [`report`] — CSV-список items
//!
//! # Быстрый старт
//!
//! ```
//! use icl::model::{Bundle, CashLetter, CheckItem, File};
//! use icl::record::{BundleHeader, CashLetterHeader, CheckDetail, FileHeader};
//!
//! let mut file = File::new(FileHeader::default());
//! let cash_letter = file.add_cash_letter(CashLetter::new(CashLetterHeader::default()));
//! let bundle = cash_letter.add_bundle(Bundle::new(BundleHeader::default()));
//! bundle.add_check(CheckItem::new(CheckDetail { item_amount: 12_345, ..CheckDetail::default() }));
//! file.recompute_controls();
//!
//! let bytes = icl::serialize(&file)?;
//! let parsed = icl::parse(bytes.as_slice())?;
//! assert_eq!(parsed.totals().amount, 12_345);
//! # Ok::<(), icl::Error>(())
//! ```

pub mod error;
pub mod field;
pub mod model;
pub mod reader;
pub mod record;
pub mod report;
pub mod validation;
pub mod writer;

use std::io::Read;

pub use error::{Error, ErrorKind, FieldError, Result, RuleKind, StructuralError};
pub use model::File;
pub use reader::{PartialRead, Reader, ReaderOptions};
pub use record::{Record, RecordFormat, RecordKind};
pub use writer::{WriteMode, Writer};

/// Читает файл целиком с параметрами по умолчанию.
///
/// # Errors
///
/// См. [`Reader::read`].
pub fn parse<R: Read>(reader: R) -> Result<File> {
    Reader::new(reader).read()
}

/// Сериализует файл с пересчётом итогов ([`WriteMode::Recompute`]).
///
/// # Errors
///
/// [`Error::Incomplete`], если у агрегата нет заголовка или контроля.
pub fn serialize(file: &File) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write(file)?;
    writer.into_inner()
}

/// Проверяет все записи файла (без сверки итогов).
///
/// # Errors
///
/// Первое найденное нарушение, см. [`File::validate`].
pub fn validate(file: &File) -> Result<()> {
    file.validate()
}
