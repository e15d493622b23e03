//! Запись модели файла в формат X9.
//!
//! [`Writer`] обходит дерево в порядке хранения: File Header, затем для
//! каждого cash letter заголовок, кредиты, пачки (заголовок, items с
//! дополнениями и изображениями, контроль), сводки 85 и контроль, в конце
//! File Control. Каждая запись завершается `\n`.

use std::{
    borrow::Cow,
    io::{BufWriter, Write},
};

use tracing::debug;

use crate::{
    error::{Error, Result},
    model::{
        Bundle, CashLetter, CreditRecord, File, ImageView, Item, addendum_number,
        item_sequence_number,
    },
    record::{RecordFormat, RecordKind},
};

/// Как writer обращается с вычисляемыми полями.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Итоги контрольных записей, Bundle Sequence Number, ECE Institution
    /// Item Sequence Number, номера дополнений и Addendum Count
    /// пересчитываются по дереву. Модель не меняется.
    #[default]
    Recompute,
    /// Все записи выводятся как есть (побайтовый round trip).
    Preserve,
}

/// Writer файла image cash letter.
///
/// Использует буферизацию; данные гарантированно попадают в приёмник после
/// [`Writer::flush`] или [`Writer::into_inner`].
///
/// # Пример
///
/// ```
/// use icl::{Writer, model::File, record::{FileControl, FileHeader}};
///
/// let mut file = File::new(FileHeader::default());
/// file.set_control(FileControl::default());
///
/// let mut writer = Writer::new(Vec::new());
/// writer.write(&file)?;
/// assert_eq!(writer.records_written(), 2);
/// assert_eq!(writer.into_inner()?.len(), 2 * 81);
/// # Ok::<(), icl::Error>(())
/// ```
pub struct Writer<W: Write> {
    inner: BufWriter<W>,
    mode: WriteMode,
    /// Счётчик записанных записей.
    records_written: usize,
}

impl<W: Write> Writer<W> {
    /// Создаёт writer в режиме [`WriteMode::Recompute`].
    pub fn new(writer: W) -> Self {
        Self::with_mode(writer, WriteMode::default())
    }

    pub fn with_mode(writer: W, mode: WriteMode) -> Self {
        Self { inner: BufWriter::new(writer), mode, records_written: 0 }
    }

    /// Возвращает количество записанных записей.
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Записывает файл целиком.
    ///
    /// Полнота дерева проверяется до записи первой строки, поэтому при
    /// ошибке в приёмник ничего не попадает.
    ///
    /// # Errors
    ///
    /// [`Error::Incomplete`], если у какого-либо агрегата нет заголовка или
    /// контрольной записи; [`Error::Io`] при ошибке приёмника.
    pub fn write(&mut self, file: &File) -> Result<()> {
        ensure_complete(file)?;
        let before = self.records_written;
        self.write_file(file)?;
        debug!(
            records = self.records_written - before,
            mode = ?self.mode,
            "file written"
        );
        Ok(())
    }

    /// Сбрасывает буфер.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Сбрасывает буфер и возвращает приёмник.
    pub fn into_inner(self) -> Result<W> {
        self.inner.into_inner().map_err(|e| Error::Io(e.into_error()))
    }

    // ========================================================================
    // Обход дерева
    // ========================================================================

    fn write_file(&mut self, file: &File) -> Result<()> {
        let (Some(header), Some(control)) = (&file.header, &file.control) else {
            let missing =
                if file.header.is_none() { RecordKind::FileHeader } else { RecordKind::FileControl };
            return Err(Error::Incomplete { aggregate: "File", missing });
        };
        self.emit(header)?;
        for cash_letter in &file.cash_letters {
            self.write_cash_letter(cash_letter)?;
        }
        let control = adjust(self.mode, control, |c| file.totals().apply(c));
        self.emit(&*control)
    }

    fn write_cash_letter(&mut self, cash_letter: &CashLetter) -> Result<()> {
        let (Some(header), Some(control)) = (&cash_letter.header, &cash_letter.control) else {
            return Err(incomplete_cash_letter(cash_letter));
        };
        self.emit(header)?;
        for credit in &cash_letter.credits {
            match credit {
                CreditRecord::Credit(record) => self.emit(record)?,
                CreditRecord::CreditItem(record) => self.emit(record)?,
            }
        }
        for (index, bundle) in cash_letter.bundles.iter().enumerate() {
            self.write_bundle(index, bundle)?;
        }
        for summary in &cash_letter.routing_number_summaries {
            self.emit(summary)?;
        }
        let control = adjust(self.mode, control, |c| cash_letter.totals().apply(c));
        self.emit(&*control)
    }

    fn write_bundle(&mut self, index: usize, bundle: &Bundle) -> Result<()> {
        let (Some(header), Some(control)) = (&bundle.header, &bundle.control) else {
            return Err(incomplete_bundle(bundle));
        };
        let header = adjust(self.mode, header, |h| {
            h.bundle_sequence_number = u16::try_from(index + 1).unwrap_or(u16::MAX);
        });
        self.emit(&*header)?;
        for (position, item) in bundle.items.iter().enumerate() {
            self.write_item(position, item)?;
        }
        let control = adjust(self.mode, control, |c| bundle.totals().apply(c));
        self.emit(&*control)
    }

    fn write_item(&mut self, position: usize, item: &Item) -> Result<()> {
        let mode = self.mode;
        let addenda = u8::try_from(item.addenda_len()).unwrap_or(u8::MAX);
        let sequence = item_sequence_number(position);
        match item {
            Item::Check(check) => {
                self.emit(&*adjust(mode, &check.detail, |d| {
                    d.addendum_count = addenda;
                    d.ece_institution_item_sequence_number.clone_from(&sequence);
                }))?;
                for (index, addendum) in check.addenda_a.iter().enumerate() {
                    self.emit(&*adjust(mode, addendum, |a| a.record_number = addendum_number(index)))?;
                }
                if let Some(addendum) = &check.addendum_b {
                    self.emit(addendum)?;
                }
                for (index, addendum) in check.addenda_c.iter().enumerate() {
                    self.emit(&*adjust(mode, addendum, |a| a.record_number = addendum_number(index)))?;
                }
            }
            Item::Return(ret) => {
                self.emit(&*adjust(mode, &ret.detail, |d| {
                    d.addendum_count = addenda;
                    d.ece_institution_item_sequence_number.clone_from(&sequence);
                }))?;
                for (index, addendum) in ret.addenda_a.iter().enumerate() {
                    self.emit(&*adjust(mode, addendum, |a| a.record_number = addendum_number(index)))?;
                }
                if let Some(addendum) = &ret.addendum_b {
                    self.emit(addendum)?;
                }
                if let Some(addendum) = &ret.addendum_c {
                    self.emit(addendum)?;
                }
                for (index, addendum) in ret.addenda_d.iter().enumerate() {
                    self.emit(&*adjust(mode, addendum, |a| a.record_number = addendum_number(index)))?;
                }
            }
        }
        item.image_views().iter().try_for_each(|view| self.write_image_view(view, &sequence))
    }

    fn write_image_view(&mut self, view: &ImageView, sequence: &str) -> Result<()> {
        self.emit(&view.detail)?;
        if let Some(data) = &view.data {
            let data = adjust(self.mode, data, |d| {
                d.ece_institution_item_sequence_number = sequence.to_string();
            });
            self.emit(&*data)?;
        }
        if let Some(analysis) = &view.analysis {
            self.emit(analysis)?;
        }
        Ok(())
    }

    fn emit<R: RecordFormat>(&mut self, record: &R) -> Result<()> {
        self.inner.write_all(&record.encode())?;
        self.inner.write_all(b"\n")?;
        self.records_written += 1;
        Ok(())
    }
}

/// Запись как есть или её копия с пересчитанными полями.
fn adjust<'a, T: Clone>(mode: WriteMode, record: &'a T, update: impl FnOnce(&mut T)) -> Cow<'a, T> {
    match mode {
        WriteMode::Preserve => Cow::Borrowed(record),
        WriteMode::Recompute => {
            let mut owned = record.clone();
            update(&mut owned);
            Cow::Owned(owned)
        }
    }
}

// ============================================================================
// Проверка полноты
// ============================================================================

fn incomplete_cash_letter(cash_letter: &CashLetter) -> Error {
    let missing = if cash_letter.header.is_none() {
        RecordKind::CashLetterHeader
    } else {
        RecordKind::CashLetterControl
    };
    Error::Incomplete { aggregate: "CashLetter", missing }
}

fn incomplete_bundle(bundle: &Bundle) -> Error {
    let missing =
        if bundle.header.is_none() { RecordKind::BundleHeader } else { RecordKind::BundleControl };
    Error::Incomplete { aggregate: "Bundle", missing }
}

/// Проверяет, что у всех агрегатов есть заголовок и контроль.
fn ensure_complete(file: &File) -> Result<()> {
    if file.header.is_none() {
        return Err(Error::Incomplete { aggregate: "File", missing: RecordKind::FileHeader });
    }
    for cash_letter in &file.cash_letters {
        if cash_letter.header.is_none() || cash_letter.control.is_none() {
            return Err(incomplete_cash_letter(cash_letter));
        }
        if let Some(bundle) =
            cash_letter.bundles.iter().find(|b| b.header.is_none() || b.control.is_none())
        {
            return Err(incomplete_bundle(bundle));
        }
    }
    if file.control.is_none() {
        return Err(Error::Incomplete { aggregate: "File", missing: RecordKind::FileControl });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{CheckItem, ReturnItem},
        reader::Reader,
        record::{
            BundleControl, BundleHeader, CashLetterControl, CashLetterHeader, CheckDetail,
            CheckDetailAddendumA, CheckDetailAddendumC, CreditItem, FileControl, FileHeader,
            ImageViewData, ImageViewDetail, ReturnDetail, RoutingNumberSummary,
        },
    };

    fn sample_file() -> File {
        let mut file = File::new(FileHeader::default());
        file.set_control(FileControl::default());

        let cash_letter = file.add_cash_letter(CashLetter::new(CashLetterHeader::default()));
        cash_letter.set_control(CashLetterControl::default());
        cash_letter.add_credit_item(CreditItem { item_amount: 10, ..CreditItem::default() });
        cash_letter.add_routing_number_summary(RoutingNumberSummary::default());

        for amounts in [&[100u64, 250][..], &[7][..]] {
            let bundle = cash_letter.add_bundle(Bundle::new(BundleHeader::default()));
            bundle.set_control(BundleControl::default());
            for &amount in amounts {
                let mut check =
                    CheckItem::new(CheckDetail { item_amount: amount, ..CheckDetail::default() });
                check.add_addendum_a(CheckDetailAddendumA::default());
                check.add_addendum_c(CheckDetailAddendumC::default());
                check.add_addendum_c(CheckDetailAddendumC::default());
                let mut view = ImageView::new(ImageViewDetail::default());
                view.data = Some(ImageViewData {
                    image_data: vec![0x49, 0x49, 0x2a, 0x00],
                    ..ImageViewData::default()
                });
                check.add_image_view(view);
                bundle.add_check(check);
            }
        }
        file
    }

    fn serialize(file: &File, mode: WriteMode) -> Vec<u8> {
        let mut writer = Writer::with_mode(Vec::new(), mode);
        writer.write(file).unwrap();
        writer.into_inner().unwrap()
    }

    fn codes(bytes: &[u8]) -> Vec<String> {
        bytes
            .split(|&b| b == b'\n')
            .filter(|line| !line.is_empty())
            .map(|line| String::from_utf8_lossy(&line[..2]).into_owned())
            .collect()
    }

    #[test]
    fn canonical_record_order() {
        let out = serialize(&sample_file(), WriteMode::Recompute);
        let item = ["25", "26", "28", "28", "50", "52"];
        let mut expected = vec!["01", "10", "62", "20"];
        expected.extend(item);
        expected.extend(item);
        expected.extend(["70", "20"]);
        expected.extend(item);
        expected.extend(["70", "85", "90", "99"]);
        assert_eq!(codes(&out), expected);
        assert!(out.ends_with(b"\n"));
    }

    #[test]
    fn recompute_writes_fresh_totals_and_sequences() {
        let file = sample_file();
        let out = serialize(&file, WriteMode::Recompute);
        let decoded = Reader::new(out.as_slice()).read().unwrap();

        let cash_letter = &decoded.cash_letters[0];
        let first = &cash_letter.bundles[0];
        let control = first.control.as_ref().unwrap();
        assert_eq!(control.bundle_items_count, 2);
        assert_eq!(control.bundle_total_amount, 350);
        assert_eq!(control.bundle_images_count, 2);
        let sequences: Vec<u16> = cash_letter
            .bundles
            .iter()
            .map(|b| b.header.as_ref().unwrap().bundle_sequence_number)
            .collect();
        assert_eq!(sequences, [1, 2]);

        let Item::Check(check) = &first.items[0] else { panic!("expected a check") };
        assert_eq!(check.detail.addendum_count, 3);
        assert_eq!(
            check.addenda_c.iter().map(|a| a.record_number).collect::<Vec<_>>(),
            [1, 2]
        );

        let cash_letter_control = cash_letter.control.as_ref().unwrap();
        assert_eq!(cash_letter_control.cash_letter_items_count, 3);
        assert_eq!(cash_letter_control.cash_letter_total_amount, 357);

        let file_control = decoded.control.as_ref().unwrap();
        assert_eq!(file_control.total_record_count, 28);
        assert_eq!(file_control.cash_letter_count, 1);

        // the model itself is untouched
        assert_eq!(file.cash_letters[0].bundles[0].control, Some(BundleControl::default()));
    }

    #[test]
    fn recompute_renumbers_items_within_each_bundle() {
        let mut file = sample_file();
        for (bundle, stale) in file.cash_letters[0].bundles.iter_mut().zip([["7", "7"], ["", ""]]) {
            for (item, sequence) in bundle.items.iter_mut().zip(stale) {
                item.set_sequence_number(sequence);
            }
        }

        let out = serialize(&file, WriteMode::Recompute);
        let decoded = Reader::new(out.as_slice()).read().unwrap();
        let bundles = &decoded.cash_letters[0].bundles;
        let sequences: Vec<Vec<&str>> = bundles
            .iter()
            .map(|b| b.items.iter().map(Item::sequence_number).collect())
            .collect();
        assert_eq!(sequences, [vec!["1", "2"], vec!["1"]]);

        let Item::Check(second) = &bundles[0].items[1] else { panic!("expected a check") };
        let data = second.image_views[0].data.as_ref().unwrap();
        assert_eq!(data.ece_institution_item_sequence_number, "2");

        let kept = serialize(&file, WriteMode::Preserve);
        let decoded = Reader::new(kept.as_slice()).read().unwrap();
        let first: Vec<&str> =
            decoded.cash_letters[0].bundles[0].items.iter().map(Item::sequence_number).collect();
        assert_eq!(first, ["7", "7"]);
    }

    #[test]
    fn recompute_matches_recompute_controls() {
        let file = sample_file();
        let mut recomputed = file.clone();
        recomputed.recompute_controls();
        assert_eq!(
            serialize(&file, WriteMode::Recompute),
            serialize(&recomputed, WriteMode::Preserve)
        );
    }

    #[test]
    fn preserve_keeps_stale_values() {
        let out = serialize(&sample_file(), WriteMode::Preserve);
        let decoded = Reader::new(out.as_slice()).read().unwrap();
        assert_eq!(decoded, sample_file());
    }

    #[test]
    fn incomplete_tree_writes_nothing() {
        let mut file = sample_file();
        file.cash_letters[0].bundles[1].control = None;

        let mut writer = Writer::new(Vec::new());
        let err = writer.write(&file).unwrap_err();
        assert!(matches!(
            err,
            Error::Incomplete { aggregate: "Bundle", missing: RecordKind::BundleControl }
        ));
        assert_eq!(writer.records_written(), 0);
        assert!(writer.into_inner().unwrap().is_empty());

        let mut file = sample_file();
        file.control = None;
        let err = Writer::new(Vec::new()).write(&file).unwrap_err();
        assert!(matches!(err, Error::Incomplete { missing: RecordKind::FileControl, .. }));
    }

    #[test]
    fn returns_are_written_with_their_addenda() {
        let mut file = File::new(FileHeader::default());
        file.set_control(FileControl::default());
        let cash_letter = file.add_cash_letter(CashLetter::new(CashLetterHeader::default()));
        cash_letter.set_control(CashLetterControl::default());
        let bundle = cash_letter.add_bundle(Bundle::new(BundleHeader::default()));
        bundle.set_control(BundleControl::default());
        bundle.add_return(ReturnItem::new(ReturnDetail::default()));

        let out = serialize(&file, WriteMode::Recompute);
        assert_eq!(codes(&out), ["01", "10", "20", "31", "70", "90", "99"]);
    }
}
