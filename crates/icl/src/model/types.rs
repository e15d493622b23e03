//! Агрегаты файла: File → CashLetter → Bundle → Item.

use serde::{Deserialize, Serialize};

use crate::record::{
    BundleControl, BundleHeader, CashLetterControl, CashLetterHeader, CheckDetail,
    CheckDetailAddendumA, CheckDetailAddendumB, CheckDetailAddendumC, Credit, CreditItem,
    FileControl, FileHeader, ImageViewAnalysis, ImageViewData, ImageViewDetail, ReturnDetail,
    ReturnDetailAddendumA, ReturnDetailAddendumB, ReturnDetailAddendumC, ReturnDetailAddendumD,
    RoutingNumberSummary,
};

// ============================================================================
// File
// ============================================================================

/// Файл целиком: заголовок, cash letters в порядке следования и контрольная запись.
///
/// У заголовка и контроля по одному слоту, повторная установка заменяет
/// предыдущее значение.
///
/// # Пример
///
/// ```
/// use icl::model::{Bundle, CashLetter, CheckItem, File};
/// use icl::record::{BundleHeader, CashLetterHeader, CheckDetail, FileHeader};
///
/// let mut file = File::new(FileHeader::default());
/// let cash_letter = file.add_cash_letter(CashLetter::new(CashLetterHeader::default()));
/// let bundle = cash_letter.add_bundle(Bundle::new(BundleHeader::default()));
/// bundle.add_check(CheckItem::new(CheckDetail { item_amount: 100_000, ..CheckDetail::default() }));
///
/// assert_eq!(file.items().count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// File Header (01).
    pub header: Option<FileHeader>,
    /// Cash letters в порядке следования.
    pub cash_letters: Vec<CashLetter>,
    /// File Control (99).
    pub control: Option<FileControl>,
}

impl File {
    /// Создаёт файл с заголовком и без контрольной записи.
    #[must_use]
    pub fn new(header: FileHeader) -> Self {
        Self { header: Some(header), ..Self::default() }
    }

    /// Устанавливает (заменяет) заголовок.
    pub fn set_header(&mut self, header: FileHeader) {
        self.header = Some(header);
    }

    /// Устанавливает (заменяет) контрольную запись.
    pub fn set_control(&mut self, control: FileControl) {
        self.control = Some(control);
    }

    /// Добавляет cash letter в конец и возвращает ссылку на него.
    pub fn add_cash_letter(&mut self, cash_letter: CashLetter) -> &mut CashLetter {
        self.cash_letters.push(cash_letter);
        let last = self.cash_letters.len() - 1;
        &mut self.cash_letters[last]
    }

    /// Все items файла в порядке следования.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.cash_letters.iter().flat_map(|cl| cl.bundles.iter()).flat_map(|b| b.items.iter())
    }
}

// ============================================================================
// Cash letter
// ============================================================================

/// Кредитная запись cash letter (61 или 62).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "record")]
pub enum CreditRecord {
    Credit(Credit),
    CreditItem(CreditItem),
}

impl CreditRecord {
    /// Сумма кредита в центах.
    #[must_use]
    pub fn amount(&self) -> u64 {
        match self {
            Self::Credit(c) => c.item_amount,
            Self::CreditItem(c) => c.item_amount,
        }
    }
}

/// Cash letter: кредиты, пачки и сводки по номерам маршрутизации.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashLetter {
    /// Cash Letter Header (10).
    pub header: Option<CashLetterHeader>,
    /// Кредиты, записанные до первой пачки.
    pub credits: Vec<CreditRecord>,
    /// Пачки в порядке следования.
    pub bundles: Vec<Bundle>,
    /// Routing Number Summary (85), записанные после последней пачки.
    pub routing_number_summaries: Vec<RoutingNumberSummary>,
    /// Cash Letter Control (90).
    pub control: Option<CashLetterControl>,
}

impl CashLetter {
    #[must_use]
    pub fn new(header: CashLetterHeader) -> Self {
        Self { header: Some(header), ..Self::default() }
    }

    pub fn set_header(&mut self, header: CashLetterHeader) {
        self.header = Some(header);
    }

    pub fn set_control(&mut self, control: CashLetterControl) {
        self.control = Some(control);
    }

    /// Добавляет пачку в конец и возвращает ссылку на неё.
    pub fn add_bundle(&mut self, bundle: Bundle) -> &mut Bundle {
        self.bundles.push(bundle);
        let last = self.bundles.len() - 1;
        &mut self.bundles[last]
    }

    pub fn add_credit(&mut self, credit: Credit) {
        self.credits.push(CreditRecord::Credit(credit));
    }

    pub fn add_credit_item(&mut self, credit_item: CreditItem) {
        self.credits.push(CreditRecord::CreditItem(credit_item));
    }

    pub fn add_routing_number_summary(&mut self, summary: RoutingNumberSummary) {
        self.routing_number_summaries.push(summary);
    }

    /// Items всех пачек в порядке следования.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.bundles.iter().flat_map(|b| b.items.iter())
    }
}

// ============================================================================
// Bundle
// ============================================================================

/// Пачка items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Bundle Header (20).
    pub header: Option<BundleHeader>,
    /// Items в порядке следования; порядок сохраняется при записи.
    pub items: Vec<Item>,
    /// Bundle Control (70).
    pub control: Option<BundleControl>,
}

impl Bundle {
    #[must_use]
    pub fn new(header: BundleHeader) -> Self {
        Self { header: Some(header), ..Self::default() }
    }

    pub fn set_header(&mut self, header: BundleHeader) {
        self.header = Some(header);
    }

    pub fn set_control(&mut self, control: BundleControl) {
        self.control = Some(control);
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn add_check(&mut self, check: CheckItem) {
        self.items.push(Item::Check(check));
    }

    pub fn add_return(&mut self, item: ReturnItem) {
        self.items.push(Item::Return(item));
    }

    /// Только чеки пачки.
    pub fn checks(&self) -> impl Iterator<Item = &CheckItem> {
        self.items.iter().filter_map(|item| match item {
            Item::Check(check) => Some(check),
            Item::Return(_) => None,
        })
    }

    /// Только возвраты пачки.
    pub fn returns(&self) -> impl Iterator<Item = &ReturnItem> {
        self.items.iter().filter_map(|item| match item {
            Item::Return(ret) => Some(ret),
            Item::Check(_) => None,
        })
    }
}

// ============================================================================
// Items
// ============================================================================

/// Один вид изображения item: детали, затем необязательные данные и анализ.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageView {
    pub detail: ImageViewDetail,
    pub data: Option<ImageViewData>,
    pub analysis: Option<ImageViewAnalysis>,
}

impl ImageView {
    #[must_use]
    pub fn new(detail: ImageViewDetail) -> Self {
        Self { detail, data: None, analysis: None }
    }

    /// Количество записей, которое занимает вид в файле.
    #[must_use]
    pub fn record_count(&self) -> usize {
        1 + usize::from(self.data.is_some()) + usize::from(self.analysis.is_some())
    }
}

/// Чек с дополнениями и изображениями.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckItem {
    pub detail: CheckDetail,
    pub addenda_a: Vec<CheckDetailAddendumA>,
    pub addendum_b: Option<CheckDetailAddendumB>,
    pub addenda_c: Vec<CheckDetailAddendumC>,
    pub image_views: Vec<ImageView>,
}

impl CheckItem {
    /// Максимум Addendum A на один чек.
    pub const MAX_ADDENDA_A: usize = 9;
    /// Максимум Addendum C на один чек.
    pub const MAX_ADDENDA_C: usize = 99;

    #[must_use]
    pub fn new(detail: CheckDetail) -> Self {
        Self { detail, ..Self::default() }
    }

    pub fn add_addendum_a(&mut self, addendum: CheckDetailAddendumA) {
        self.addenda_a.push(addendum);
    }

    pub fn set_addendum_b(&mut self, addendum: CheckDetailAddendumB) {
        self.addendum_b = Some(addendum);
    }

    pub fn add_addendum_c(&mut self, addendum: CheckDetailAddendumC) {
        self.addenda_c.push(addendum);
    }

    pub fn add_image_view(&mut self, view: ImageView) {
        self.image_views.push(view);
    }
}

/// Возврат с дополнениями и изображениями.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnItem {
    pub detail: ReturnDetail,
    pub addenda_a: Vec<ReturnDetailAddendumA>,
    pub addendum_b: Option<ReturnDetailAddendumB>,
    pub addendum_c: Option<ReturnDetailAddendumC>,
    pub addenda_d: Vec<ReturnDetailAddendumD>,
    pub image_views: Vec<ImageView>,
}

impl ReturnItem {
    /// Максимум Addendum A на один возврат.
    pub const MAX_ADDENDA_A: usize = 9;
    /// Максимум Addendum D на один возврат.
    pub const MAX_ADDENDA_D: usize = 99;

    #[must_use]
    pub fn new(detail: ReturnDetail) -> Self {
        Self { detail, ..Self::default() }
    }

    pub fn add_addendum_a(&mut self, addendum: ReturnDetailAddendumA) {
        self.addenda_a.push(addendum);
    }

    pub fn set_addendum_b(&mut self, addendum: ReturnDetailAddendumB) {
        self.addendum_b = Some(addendum);
    }

    pub fn set_addendum_c(&mut self, addendum: ReturnDetailAddendumC) {
        self.addendum_c = Some(addendum);
    }

    pub fn add_addendum_d(&mut self, addendum: ReturnDetailAddendumD) {
        self.addenda_d.push(addendum);
    }

    pub fn add_image_view(&mut self, view: ImageView) {
        self.image_views.push(view);
    }
}

/// Item пачки: чек или возврат.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "item")]
pub enum Item {
    Check(CheckItem),
    Return(ReturnItem),
}

impl Item {
    /// `"check"` или `"return"`.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Check(_) => "check",
            Self::Return(_) => "return",
        }
    }

    /// Сумма item в центах.
    #[must_use]
    pub fn amount(&self) -> u64 {
        match self {
            Self::Check(c) => c.detail.item_amount,
            Self::Return(r) => r.detail.item_amount,
        }
    }

    /// Порядковый номер item у отправителя (ECE Institution Item Sequence Number).
    #[must_use]
    pub fn sequence_number(&self) -> &str {
        match self {
            Self::Check(c) => &c.detail.ece_institution_item_sequence_number,
            Self::Return(r) => &r.detail.ece_institution_item_sequence_number,
        }
    }

    /// Задаёт порядковый номер item в детали и во всех его Image View Data.
    pub fn set_sequence_number(&mut self, sequence: &str) {
        let (detail_sequence, views) = match self {
            Self::Check(c) => (&mut c.detail.ece_institution_item_sequence_number, &mut c.image_views),
            Self::Return(r) => (&mut r.detail.ece_institution_item_sequence_number, &mut r.image_views),
        };
        detail_sequence.clear();
        detail_sequence.push_str(sequence);
        for data in views.iter_mut().filter_map(|view| view.data.as_mut()) {
            data.ece_institution_item_sequence_number.clear();
            data.ece_institution_item_sequence_number.push_str(sequence);
        }
    }

    /// Восемь цифр номера маршрутизации банка плательщика и контрольная цифра.
    #[must_use]
    pub fn payor_routing_number(&self) -> String {
        let (routing, digit) = match self {
            Self::Check(c) => (&c.detail.payor_bank_routing_number, &c.detail.payor_bank_check_digit),
            Self::Return(r) => (&r.detail.payor_bank_routing_number, &r.detail.payor_bank_check_digit),
        };
        format!("{routing}{digit}")
    }

    #[must_use]
    pub fn on_us(&self) -> &str {
        match self {
            Self::Check(c) => &c.detail.on_us,
            Self::Return(r) => &r.detail.on_us,
        }
    }

    /// Addendum count из записи детали (как записан, не пересчитан).
    #[must_use]
    pub fn addendum_count(&self) -> u8 {
        match self {
            Self::Check(c) => c.detail.addendum_count,
            Self::Return(r) => r.detail.addendum_count,
        }
    }

    /// Сумма учитывается в MICR-valid итоге пачки.
    #[must_use]
    pub fn is_micr_valid(&self) -> bool {
        matches!(self, Self::Check(c) if c.detail.micr_valid_indicator == Some(1))
    }

    #[must_use]
    pub fn image_views(&self) -> &[ImageView] {
        match self {
            Self::Check(c) => &c.image_views,
            Self::Return(r) => &r.image_views,
        }
    }

    pub fn add_image_view(&mut self, view: ImageView) {
        match self {
            Self::Check(c) => c.add_image_view(view),
            Self::Return(r) => r.add_image_view(view),
        }
    }

    /// Последний добавленный вид изображения.
    pub fn last_image_view_mut(&mut self) -> Option<&mut ImageView> {
        match self {
            Self::Check(c) => c.image_views.last_mut(),
            Self::Return(r) => r.image_views.last_mut(),
        }
    }

    /// Количество записей дополнений item (все виды вместе).
    #[must_use]
    pub fn addenda_len(&self) -> usize {
        match self {
            Self::Check(c) => {
                c.addenda_a.len() + usize::from(c.addendum_b.is_some()) + c.addenda_c.len()
            }
            Self::Return(r) => {
                r.addenda_a.len()
                    + usize::from(r.addendum_b.is_some())
                    + usize::from(r.addendum_c.is_some())
                    + r.addenda_d.len()
            }
        }
    }

    /// Количество записей item в файле: деталь, дополнения и изображения.
    #[must_use]
    pub fn record_count(&self) -> usize {
        let images: usize = self.image_views().iter().map(ImageView::record_count).sum();
        1 + self.addenda_len() + images
    }
}

impl From<CheckItem> for Item {
    fn from(check: CheckItem) -> Self {
        Self::Check(check)
    }
}

impl From<ReturnItem> for Item {
    fn from(item: ReturnItem) -> Self {
        Self::Return(item)
    }
}
