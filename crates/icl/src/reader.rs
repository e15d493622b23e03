//! Чтение файла: строки → записи → дерево модели.
//!
//! [`Reader`] читает вход построчно за один проход. Каждая строка сначала
//! декодируется целиком, затем автомат состояний [`ParseState`] решает, к
//! какому открытому агрегату её прикрепить. Текущий cash letter, пачка и
//! item всегда являются последними элементами списков модели, так что
//! контекст разбора полностью описывается состоянием автомата.

use std::{
    fmt,
    io::{self, BufRead, BufReader, Read},
};

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{
    error::{Error, Result, StructuralError},
    model::{Bundle, CashLetter, CheckItem, File, ImageView, Item, ReturnItem},
    record::{ImageViewData, Record, RecordKind, discriminator},
};

/// Положение внутри item: какая запись была прикреплена последней.
///
/// Порядок вариантов совпадает с порядком записей в файле; дополнения
/// одного вида не могут следовать за дополнениями более позднего вида.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemPhase {
    /// Сразу после Check Detail или Return Detail.
    Detail,
    AddendumA,
    AddendumB,
    AddendumC,
    /// Только для возвратов.
    AddendumD,
    /// Внутри вида изображения (после 50, 52 или 54).
    ImageView,
}

/// Состояние автомата разбора.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseState {
    /// Ещё не было File Header.
    AwaitingFileHeader,
    /// Файл открыт, cash letter нет.
    InFile,
    /// Cash letter открыт, пачки нет.
    InCashLetter,
    /// После Routing Number Summary: допустимы только 85 и 90.
    InRoutingSummaries,
    /// Пачка открыта, item ещё нет.
    InBundle,
    /// Внутри item.
    InItem(ItemPhase),
    /// File Control прочитан.
    Complete,
}

impl fmt::Display for ParseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::AwaitingFileHeader => "before the File Header",
            Self::InFile => "inside a File",
            Self::InCashLetter => "inside a Cash Letter",
            Self::InRoutingSummaries => "after a Routing Number Summary",
            Self::InBundle => "inside a Bundle",
            Self::InItem(ItemPhase::Detail) => "after an item detail",
            Self::InItem(ItemPhase::AddendumA) => "after an Addendum A",
            Self::InItem(ItemPhase::AddendumB) => "after an Addendum B",
            Self::InItem(ItemPhase::AddendumC) => "after an Addendum C",
            Self::InItem(ItemPhase::AddendumD) => "after an Addendum D",
            Self::InItem(ItemPhase::ImageView) => "inside an image view",
            Self::Complete => "after the File Control",
        };
        f.write_str(text)
    }
}

/// Параметры чтения.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Пропускать пустые строки (с предупреждением в лог) вместо ошибки.
    pub skip_blank_lines: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self { skip_blank_lines: true }
    }
}

/// Ошибка чтения вместе с уже собранной частью файла.
///
/// Возвращается [`Reader::read_with_diagnostics`]; записи, прикреплённые до
/// ошибочной строки, остаются в `file` без изменений.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct PartialRead {
    /// Часть файла, собранная до ошибки.
    pub file: File,
    /// Ошибка, остановившая чтение.
    pub error: Error,
}

/// Reader файла image cash letter.
///
/// Записи разделены `\n`, завершающий `\r` отбрасывается. Image View Data
/// читается по объявленным в ней длинам: её подпись и изображение бинарные
/// и могут содержать `\n` и `\r`. Номера строк в ошибках физические.
///
/// # Пример
///
/// ```
/// use icl::Reader;
///
/// let err = Reader::new(&b"27"[..]).read().unwrap_err();
/// assert_eq!(err.line(), Some(1));
/// ```
pub struct Reader<R> {
    inner: BufReader<R>,
    options: ReaderOptions,
    /// Номер последней прочитанной строки (1-based).
    line: usize,
    /// Количество прикреплённых записей.
    records_read: usize,
}

impl<R: Read> Reader<R> {
    /// Создаёт reader с параметрами по умолчанию.
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, ReaderOptions::default())
    }

    pub fn with_options(reader: R, options: ReaderOptions) -> Self {
        Self { inner: BufReader::new(reader), options, line: 0, records_read: 0 }
    }

    /// Количество записей, прикреплённых к модели.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Читает файл целиком.
    ///
    /// # Errors
    ///
    /// [`Error::Io`], [`Error::Decode`] и [`Error::TypeMismatch`] для
    /// некорректной строки, [`Error::Structural`] для недопустимого порядка
    /// записей или входа, оборвавшегося до File Control.
    pub fn read(self) -> Result<File> {
        self.read_with_diagnostics().map_err(|partial| partial.error)
    }

    /// Читает файл целиком; при ошибке возвращает и собранную часть.
    ///
    /// # Errors
    ///
    /// Те же, что у [`Reader::read`], в обёртке [`PartialRead`].
    pub fn read_with_diagnostics(mut self) -> std::result::Result<File, PartialRead> {
        let mut assembler = Assembler::default();
        match self.run(&mut assembler) {
            Ok(()) => {
                debug!(records = self.records_read, lines = self.line, "file read");
                Ok(assembler.file)
            }
            Err(error) => Err(PartialRead { file: assembler.file, error }),
        }
    }

    fn run(&mut self, assembler: &mut Assembler) -> Result<()> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let terminated = self.read_line(&mut buf)?;
            if buf.is_empty() && !terminated {
                break;
            }
            self.line += 1;
            if buf.iter().all(u8::is_ascii_whitespace) {
                if self.options.skip_blank_lines {
                    warn!(line = self.line, "skipping blank line");
                    continue;
                }
                return Err(Error::structural(
                    self.line,
                    StructuralError::UnknownRecordType(discriminator(&buf)),
                ));
            }
            let continued = if buf.starts_with(RecordKind::ImageViewData.code().as_bytes()) {
                self.complete_image_view_data(&mut buf, terminated, assembler.state)?
            } else {
                0
            };
            self.step(assembler, &mut buf)?;
            self.line += continued;
        }

        if assembler.state != ParseState::Complete {
            return Err(Error::structural(
                self.line,
                StructuralError::UnexpectedEof { state: assembler.state },
            ));
        }
        Ok(())
    }

    /// Дописывает в `buf` строку без завершающего `\n`; `true`, если он был.
    fn read_line(&mut self, buf: &mut Vec<u8>) -> Result<bool> {
        let start = buf.len();
        self.inner.read_until(b'\n', buf)?;
        let terminated = buf.len() > start && buf.last() == Some(&b'\n');
        if terminated {
            buf.pop();
        }
        Ok(terminated)
    }

    /// Дочитывает Image View Data до длины, объявленной её слотами длины.
    ///
    /// `\n`, оказавшийся внутри данных, возвращается в запись, а недостающие
    /// байты дочитываются точной длиной. Возвращает количество таких `\n`.
    fn complete_image_view_data(
        &mut self,
        buf: &mut Vec<u8>,
        mut terminated: bool,
        state: ParseState,
    ) -> Result<usize> {
        let mut continued = 0;
        let mut end = ImageViewData::PREFIX_WIDTH;
        for width in ImageViewData::LENGTH_WIDTHS {
            // короткая запись разбирается как есть
            let Some(len) = ImageViewData::declared_length(buf, end, width) else {
                return Ok(continued);
            };
            end += width + len;
            if buf.len() < end && terminated {
                buf.push(b'\n');
                continued += 1;
                let start = buf.len();
                buf.resize(end.max(start), 0);
                self.inner.read_exact(&mut buf[start..]).map_err(|e| match e.kind() {
                    io::ErrorKind::UnexpectedEof => {
                        Error::structural(self.line, StructuralError::UnexpectedEof { state })
                    }
                    _ => Error::Io(e),
                })?;
                continued += buf[start..].iter().filter(|&&b| b == b'\n').count();
                terminated = self.read_line(buf)?;
            }
        }
        if buf.get(end..) == Some(&b"\r"[..]) {
            buf.truncate(end);
        }
        Ok(continued)
    }

    fn step(&mut self, assembler: &mut Assembler, line: &mut Vec<u8>) -> Result<()> {
        let Some(kind) = RecordKind::from_code(&line[..line.len().min(2)]) else {
            return Err(Error::structural(
                self.line,
                StructuralError::UnknownRecordType(discriminator(line)),
            ));
        };
        if kind != RecordKind::ImageViewData && line.last() == Some(&b'\r') {
            line.pop();
        }

        let record = Record::decode(line).map_err(|e| e.at_line(self.line))?;
        trace!(line = self.line, record = %kind, "decoded");

        assembler.attach(record).map_err(|source| Error::structural(self.line, source))?;
        self.records_read += 1;
        Ok(())
    }
}

// ============================================================================
// Автомат
// ============================================================================

/// Собираемый файл и состояние автомата.
struct Assembler {
    file: File,
    state: ParseState,
}

impl Default for Assembler {
    fn default() -> Self {
        Self { file: File::default(), state: ParseState::AwaitingFileHeader }
    }
}

impl Assembler {
    fn cash_letter(&mut self) -> Option<&mut CashLetter> {
        self.file.cash_letters.last_mut()
    }

    fn bundle(&mut self) -> Option<&mut Bundle> {
        self.cash_letter()?.bundles.last_mut()
    }

    fn item(&mut self) -> Option<&mut Item> {
        self.bundle()?.items.last_mut()
    }

    /// Можно ли в текущем состоянии прикрепить дополнение фазы `phase`.
    fn accepts(&self, phase: ItemPhase, repeatable: bool) -> bool {
        match self.state {
            ParseState::InItem(current) => current < phase || (repeatable && current == phase),
            _ => false,
        }
    }

    fn check(&mut self, phase: ItemPhase, repeatable: bool) -> Option<&mut CheckItem> {
        if !self.accepts(phase, repeatable) {
            return None;
        }
        match self.item()? {
            Item::Check(check) => Some(check),
            Item::Return(_) => None,
        }
    }

    fn returned(&mut self, phase: ItemPhase, repeatable: bool) -> Option<&mut ReturnItem> {
        if !self.accepts(phase, repeatable) {
            return None;
        }
        match self.item()? {
            Item::Return(ret) => Some(ret),
            Item::Check(_) => None,
        }
    }

    fn image_view(&mut self) -> Option<&mut ImageView> {
        if self.state != ParseState::InItem(ItemPhase::ImageView) {
            return None;
        }
        self.item()?.last_image_view_mut()
    }

    /// Прикрепляет запись к самому внутреннему открытому агрегату.
    fn attach(&mut self, record: Record) -> std::result::Result<(), StructuralError> {
        use ItemPhase as P;
        use ParseState as S;

        let kind = record.kind();
        let state = self.state;
        if state == S::Complete {
            return Err(StructuralError::TrailingRecord(kind));
        }
        let out_of_sequence = || StructuralError::OutOfSequence { record: kind, state };
        let too_many = |limit| StructuralError::TooManyAddenda { record: kind, limit };
        let in_bundle = matches!(state, S::InBundle | S::InItem(_));

        self.state = match record {
            Record::FileHeader(header) => {
                if state != S::AwaitingFileHeader {
                    return Err(StructuralError::DuplicateHeader(kind));
                }
                debug!("file opened");
                self.file.set_header(header);
                S::InFile
            }
            Record::FileControl(control) => {
                if state != S::InFile {
                    return Err(out_of_sequence());
                }
                debug!(cash_letters = self.file.cash_letters.len(), "file closed");
                self.file.set_control(control);
                S::Complete
            }

            Record::CashLetterHeader(header) => match state {
                S::InFile => {
                    debug!(id = %header.cash_letter_id, "cash letter opened");
                    self.file.add_cash_letter(CashLetter::new(header));
                    S::InCashLetter
                }
                S::AwaitingFileHeader => return Err(out_of_sequence()),
                _ => return Err(StructuralError::DuplicateHeader(kind)),
            },
            Record::Credit(credit) => {
                let cash_letter = self.open_for_credits(state).ok_or_else(out_of_sequence)?;
                cash_letter.add_credit(credit);
                S::InCashLetter
            }
            Record::CreditItem(credit_item) => {
                let cash_letter = self.open_for_credits(state).ok_or_else(out_of_sequence)?;
                cash_letter.add_credit_item(credit_item);
                S::InCashLetter
            }
            Record::RoutingNumberSummary(summary) => {
                if !matches!(state, S::InCashLetter | S::InRoutingSummaries) {
                    return Err(out_of_sequence());
                }
                self.cash_letter().ok_or_else(out_of_sequence)?.add_routing_number_summary(summary);
                S::InRoutingSummaries
            }
            Record::CashLetterControl(control) => {
                if !matches!(state, S::InCashLetter | S::InRoutingSummaries) {
                    return Err(out_of_sequence());
                }
                let cash_letter = self.cash_letter().ok_or_else(out_of_sequence)?;
                debug!(bundles = cash_letter.bundles.len(), "cash letter closed");
                cash_letter.set_control(control);
                S::InFile
            }

            Record::BundleHeader(header) => {
                if in_bundle {
                    return Err(StructuralError::DuplicateHeader(kind));
                }
                if state != S::InCashLetter {
                    return Err(out_of_sequence());
                }
                debug!(sequence = header.bundle_sequence_number, "bundle opened");
                self.cash_letter().ok_or_else(out_of_sequence)?.add_bundle(Bundle::new(header));
                S::InBundle
            }
            Record::BundleControl(control) => {
                if !in_bundle {
                    return Err(out_of_sequence());
                }
                let bundle = self.bundle().ok_or_else(out_of_sequence)?;
                debug!(items = bundle.items.len(), "bundle closed");
                bundle.set_control(control);
                S::InCashLetter
            }

            Record::CheckDetail(detail) => {
                if !in_bundle {
                    return Err(out_of_sequence());
                }
                self.bundle().ok_or_else(out_of_sequence)?.add_check(CheckItem::new(detail));
                S::InItem(P::Detail)
            }
            Record::CheckDetailAddendumA(addendum) => {
                let check = self.check(P::AddendumA, true).ok_or_else(out_of_sequence)?;
                if check.addenda_a.len() >= CheckItem::MAX_ADDENDA_A {
                    return Err(too_many(CheckItem::MAX_ADDENDA_A));
                }
                check.add_addendum_a(addendum);
                S::InItem(P::AddendumA)
            }
            Record::CheckDetailAddendumB(addendum) => {
                self.check(P::AddendumB, false)
                    .ok_or_else(out_of_sequence)?
                    .set_addendum_b(addendum);
                S::InItem(P::AddendumB)
            }
            Record::CheckDetailAddendumC(addendum) => {
                let check = self.check(P::AddendumC, true).ok_or_else(out_of_sequence)?;
                if check.addenda_c.len() >= CheckItem::MAX_ADDENDA_C {
                    return Err(too_many(CheckItem::MAX_ADDENDA_C));
                }
                check.add_addendum_c(addendum);
                S::InItem(P::AddendumC)
            }

            Record::ReturnDetail(detail) => {
                if !in_bundle {
                    return Err(out_of_sequence());
                }
                self.bundle().ok_or_else(out_of_sequence)?.add_return(ReturnItem::new(detail));
                S::InItem(P::Detail)
            }
            Record::ReturnDetailAddendumA(addendum) => {
                let ret = self.returned(P::AddendumA, true).ok_or_else(out_of_sequence)?;
                if ret.addenda_a.len() >= ReturnItem::MAX_ADDENDA_A {
                    return Err(too_many(ReturnItem::MAX_ADDENDA_A));
                }
                ret.add_addendum_a(addendum);
                S::InItem(P::AddendumA)
            }
            Record::ReturnDetailAddendumB(addendum) => {
                self.returned(P::AddendumB, false)
                    .ok_or_else(out_of_sequence)?
                    .set_addendum_b(addendum);
                S::InItem(P::AddendumB)
            }
            Record::ReturnDetailAddendumC(addendum) => {
                self.returned(P::AddendumC, false)
                    .ok_or_else(out_of_sequence)?
                    .set_addendum_c(addendum);
                S::InItem(P::AddendumC)
            }
            Record::ReturnDetailAddendumD(addendum) => {
                let ret = self.returned(P::AddendumD, true).ok_or_else(out_of_sequence)?;
                if ret.addenda_d.len() >= ReturnItem::MAX_ADDENDA_D {
                    return Err(too_many(ReturnItem::MAX_ADDENDA_D));
                }
                ret.add_addendum_d(addendum);
                S::InItem(P::AddendumD)
            }

            Record::ImageViewDetail(detail) => {
                if !matches!(state, S::InItem(_)) {
                    return Err(out_of_sequence());
                }
                self.item().ok_or_else(out_of_sequence)?.add_image_view(ImageView::new(detail));
                S::InItem(P::ImageView)
            }
            Record::ImageViewData(data) => {
                let view = self.image_view().ok_or_else(out_of_sequence)?;
                if view.data.is_some() {
                    return Err(out_of_sequence());
                }
                view.data = Some(data);
                S::InItem(P::ImageView)
            }
            Record::ImageViewAnalysis(analysis) => {
                let view = self.image_view().ok_or_else(out_of_sequence)?;
                if view.analysis.is_some() {
                    return Err(out_of_sequence());
                }
                view.analysis = Some(analysis);
                S::InItem(P::ImageView)
            }
        };
        Ok(())
    }

    /// Текущий cash letter, если кредиты ещё допустимы (до первой пачки).
    fn open_for_credits(&mut self, state: ParseState) -> Option<&mut CashLetter> {
        if state != ParseState::InCashLetter {
            return None;
        }
        self.cash_letter().filter(|cash_letter| cash_letter.bundles.is_empty())
    }
}
