//! Иерархическая модель файла.
//!
//! Дерево владения: [`File`] → [`CashLetter`] → [`Bundle`] → [`Item`] →
//! дополнения и [`ImageView`]. Каждая запись принадлежит ровно одному
//! родителю; обратных ссылок нет.
//!
//! # Основные компоненты
//!
//! - [`File`], [`CashLetter`], [`Bundle`] - агрегаты с заголовком и контролем
//! - [`Item`] - чек ([`CheckItem`]) или возврат ([`ReturnItem`])
//! - [`BundleTotals`], [`CashLetterTotals`], [`FileTotals`] - пересчитанные итоги
//! - [`ValidateOptions`] - параметры валидации дерева

mod totals;
mod types;
mod validation;

pub use totals::{BundleTotals, CashLetterTotals, FileTotals};
pub(crate) use totals::{addendum_number, item_sequence_number};
pub use types::{Bundle, CashLetter, CheckItem, CreditRecord, File, ImageView, Item, ReturnItem};
pub use validation::ValidateOptions;
