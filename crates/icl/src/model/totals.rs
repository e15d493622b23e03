//! Итоги агрегатов и пересчёт контрольных записей.
//!
//! Итоги всегда вычисляются обходом дочерних записей; контрольные записи
//! модели при этом не меняются, пока не вызван [`File::recompute_controls`].

use serde::{Deserialize, Serialize};

use super::{Bundle, CashLetter, File, Item};
use crate::{
    error::{Error, Result},
    record::{BundleControl, CashLetterControl, FileControl, RecordKind},
};

/// Итоги пачки.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleTotals {
    /// Количество items.
    pub items: u64,
    /// Сумма items в центах.
    pub amount: u64,
    /// Сумма чеков с MICR Valid Indicator = 1.
    pub micr_valid_amount: u64,
    /// Количество записей Image View Detail.
    pub images: u64,
}

/// Итоги cash letter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashLetterTotals {
    pub bundles: u64,
    /// Items всех пачек; кредиты учитываются только при Credit Total Indicator = 1.
    pub items: u64,
    pub amount: u64,
    pub images: u64,
}

/// Итоги файла.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTotals {
    pub cash_letters: u64,
    /// Все записи файла, включая File Header и File Control.
    pub records: u64,
    pub items: u64,
    pub amount: u64,
}

// ============================================================================
// Вычисление
// ============================================================================

fn count(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

fn clamp<T: TryFrom<u64>>(value: u64, max: T) -> T {
    T::try_from(value).unwrap_or(max)
}

impl Bundle {
    /// Вычисляет итоги пачки по её items.
    #[must_use]
    pub fn totals(&self) -> BundleTotals {
        self.items.iter().fold(BundleTotals::default(), |mut totals, item| {
            totals.items += 1;
            totals.amount = totals.amount.saturating_add(item.amount());
            if item.is_micr_valid() {
                totals.micr_valid_amount = totals.micr_valid_amount.saturating_add(item.amount());
            }
            totals.images += count(item.image_views().len());
            totals
        })
    }

    /// Количество записей пачки в файле, включая заголовок и контроль.
    #[must_use]
    pub fn record_count(&self) -> u64 {
        2 + self.items.iter().map(|item| count(item.record_count())).sum::<u64>()
    }
}

impl CashLetter {
    /// Вычисляет итоги cash letter по его пачкам и кредитам.
    #[must_use]
    pub fn totals(&self) -> CashLetterTotals {
        let mut totals = CashLetterTotals { bundles: count(self.bundles.len()), ..Default::default() };
        for bundle in &self.bundles {
            let bundle_totals = bundle.totals();
            totals.items += bundle_totals.items;
            totals.amount = totals.amount.saturating_add(bundle_totals.amount);
            totals.images += bundle_totals.images;
        }
        if self.control.as_ref().is_some_and(|c| c.credit_total_indicator == 1) {
            totals.items += count(self.credits.len());
            for credit in &self.credits {
                totals.amount = totals.amount.saturating_add(credit.amount());
            }
        }
        totals
    }

    /// Количество записей cash letter в файле, включая заголовок и контроль.
    #[must_use]
    pub fn record_count(&self) -> u64 {
        2 + count(self.credits.len())
            + count(self.routing_number_summaries.len())
            + self.bundles.iter().map(Bundle::record_count).sum::<u64>()
    }
}

impl File {
    /// Вычисляет итоги файла.
    #[must_use]
    pub fn totals(&self) -> FileTotals {
        let with_credits = self.control.as_ref().is_some_and(|c| c.credit_total_indicator == 1);
        let mut totals = FileTotals {
            cash_letters: count(self.cash_letters.len()),
            records: 2 + self.cash_letters.iter().map(CashLetter::record_count).sum::<u64>(),
            ..Default::default()
        };
        for cash_letter in &self.cash_letters {
            for bundle in &cash_letter.bundles {
                let bundle_totals = bundle.totals();
                totals.items += bundle_totals.items;
                totals.amount = totals.amount.saturating_add(bundle_totals.amount);
            }
            if with_credits {
                totals.items += count(cash_letter.credits.len());
                for credit in &cash_letter.credits {
                    totals.amount = totals.amount.saturating_add(credit.amount());
                }
            }
        }
        totals
    }

    /// Записывает пересчитанные значения в модель.
    ///
    /// Заполняет контрольные записи всех уровней (создавая отсутствующие),
    /// нумерует пачки внутри cash letter с 1, items внутри пачки с 1,
    /// дополнения внутри item с 1 и обновляет Addendum Count в записях
    /// деталей. Заголовки не создаются.
    pub fn recompute_controls(&mut self) {
        for cash_letter in &mut self.cash_letters {
            for (index, bundle) in cash_letter.bundles.iter_mut().enumerate() {
                if let Some(header) = bundle.header.as_mut() {
                    header.bundle_sequence_number = clamp(count(index) + 1, u16::MAX);
                }
                for (position, item) in bundle.items.iter_mut().enumerate() {
                    item.set_sequence_number(&item_sequence_number(position));
                    item.renumber_addenda();
                }
                let totals = bundle.totals();
                totals.apply(bundle.control.get_or_insert_with(BundleControl::default));
            }
            let totals = cash_letter.totals();
            totals.apply(cash_letter.control.get_or_insert_with(CashLetterControl::default));
        }
        let totals = self.totals();
        totals.apply(self.control.get_or_insert_with(FileControl::default));
    }
}

impl Item {
    /// Нумерует дополнения каждого вида с 1 и обновляет Addendum Count.
    pub fn renumber_addenda(&mut self) {
        let total = clamp(count(self.addenda_len()), u8::MAX);
        match self {
            Self::Check(check) => {
                for (n, addendum) in check.addenda_a.iter_mut().enumerate() {
                    addendum.record_number = addendum_number(n);
                }
                for (n, addendum) in check.addenda_c.iter_mut().enumerate() {
                    addendum.record_number = addendum_number(n);
                }
                check.detail.addendum_count = total;
            }
            Self::Return(ret) => {
                for (n, addendum) in ret.addenda_a.iter_mut().enumerate() {
                    addendum.record_number = addendum_number(n);
                }
                for (n, addendum) in ret.addenda_d.iter_mut().enumerate() {
                    addendum.record_number = addendum_number(n);
                }
                ret.detail.addendum_count = total;
            }
        }
    }
}

/// ECE Institution Item Sequence Number (1-based) по позиции item в пачке.
pub(crate) fn item_sequence_number(position: usize) -> String {
    (count(position) + 1).to_string()
}

/// Номер дополнения (1-based) по его индексу.
pub(crate) fn addendum_number(index: usize) -> u8 {
    clamp(count(index) + 1, u8::MAX)
}

// ============================================================================
// Применение и сверка
// ============================================================================

fn compare(record: RecordKind, fields: &[(&'static str, u64, u64)]) -> Result<()> {
    for &(field, stated, computed) in fields {
        if stated != computed {
            return Err(Error::TotalsMismatch { record, field, stated, computed });
        }
    }
    Ok(())
}

impl BundleTotals {
    /// Записывает итоги в контрольную запись пачки.
    pub fn apply(&self, control: &mut BundleControl) {
        control.bundle_items_count = clamp(self.items, u16::MAX);
        control.bundle_total_amount = self.amount;
        control.micr_valid_total_amount = self.micr_valid_amount;
        control.bundle_images_count = clamp(self.images, u32::MAX);
    }

    /// Сверяет итоги с контрольной записью.
    pub fn check(&self, control: &BundleControl) -> Result<()> {
        compare(
            RecordKind::BundleControl,
            &[
                ("BundleItemsCount", control.bundle_items_count.into(), self.items),
                ("BundleTotalAmount", control.bundle_total_amount, self.amount),
                ("MICRValidTotalAmount", control.micr_valid_total_amount, self.micr_valid_amount),
                ("BundleImagesCount", control.bundle_images_count.into(), self.images),
            ],
        )
    }
}

impl CashLetterTotals {
    pub fn apply(&self, control: &mut CashLetterControl) {
        control.cash_letter_bundle_count = clamp(self.bundles, u32::MAX);
        control.cash_letter_items_count = clamp(self.items, u32::MAX);
        control.cash_letter_total_amount = self.amount;
        control.cash_letter_images_count = clamp(self.images, u32::MAX);
    }

    pub fn check(&self, control: &CashLetterControl) -> Result<()> {
        compare(
            RecordKind::CashLetterControl,
            &[
                ("CashLetterBundleCount", control.cash_letter_bundle_count.into(), self.bundles),
                ("CashLetterItemsCount", control.cash_letter_items_count.into(), self.items),
                ("CashLetterTotalAmount", control.cash_letter_total_amount, self.amount),
                ("CashLetterImagesCount", control.cash_letter_images_count.into(), self.images),
            ],
        )
    }
}

impl FileTotals {
    pub fn apply(&self, control: &mut FileControl) {
        control.cash_letter_count = clamp(self.cash_letters, u32::MAX);
        control.total_record_count = clamp(self.records, u32::MAX);
        control.total_item_count = clamp(self.items, u32::MAX);
        control.file_total_amount = self.amount;
    }

    pub fn check(&self, control: &FileControl) -> Result<()> {
        compare(
            RecordKind::FileControl,
            &[
                ("CashLetterCount", control.cash_letter_count.into(), self.cash_letters),
                ("TotalRecordCount", control.total_record_count.into(), self.records),
                ("TotalItemCount", control.total_item_count.into(), self.items),
                ("FileTotalAmount", control.file_total_amount, self.amount),
            ],
        )
    }
}
