//! CSV listing of the items in a file.
//!
//! One row per item, in file order:
//!
//! ```csv
//! CASH_LETTER_ID,BUNDLE_ID,BUNDLE_SEQUENCE,ITEM_KIND,ECE_SEQUENCE_NUMBER,PAYOR_ROUTING,ON_US,AMOUNT,ADDENDUM_COUNT,IMAGE_COUNT
//! A1,B1,1,check,1,031300012,5558881,100000,3,2
//! ```

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::{error::Result, model::File};

/// CSV header line with all column names.
pub const HEADER: [&str; 10] = [
    "CASH_LETTER_ID",
    "BUNDLE_ID",
    "BUNDLE_SEQUENCE",
    "ITEM_KIND",
    "ECE_SEQUENCE_NUMBER",
    "PAYOR_ROUTING",
    "ON_US",
    "AMOUNT",
    "ADDENDUM_COUNT",
    "IMAGE_COUNT",
];

/// One row of the item listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ItemRow {
    pub cash_letter_id: String,
    pub bundle_id: String,
    pub bundle_sequence: u16,
    /// `check` or `return`.
    pub item_kind: String,
    pub ece_sequence_number: String,
    /// Eight routing digits followed by the check digit.
    pub payor_routing: String,
    pub on_us: String,
    /// In cents.
    pub amount: u64,
    /// Addendum records actually attached to the item.
    pub addendum_count: usize,
    pub image_count: usize,
}

/// Builds the rows for every item of `file`.
#[must_use]
pub fn item_rows(file: &File) -> Vec<ItemRow> {
    let mut rows = Vec::new();
    for cash_letter in &file.cash_letters {
        let cash_letter_id =
            cash_letter.header.as_ref().map(|h| h.cash_letter_id.clone()).unwrap_or_default();
        for bundle in &cash_letter.bundles {
            let (bundle_id, bundle_sequence) = bundle
                .header
                .as_ref()
                .map(|h| (h.bundle_id.clone(), h.bundle_sequence_number))
                .unwrap_or_default();
            rows.extend(bundle.items.iter().map(|item| ItemRow {
                cash_letter_id: cash_letter_id.clone(),
                bundle_id: bundle_id.clone(),
                bundle_sequence,
                item_kind: item.kind_name().to_string(),
                ece_sequence_number: item.sequence_number().to_string(),
                payor_routing: item.payor_routing_number(),
                on_us: item.on_us().to_string(),
                amount: item.amount(),
                addendum_count: item.addenda_len(),
                image_count: item.image_views().len(),
            }));
        }
    }
    rows
}

/// Writes the item listing of `file` as CSV, header first.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// [`Error::Io`](crate::Error::Io) when the sink fails.
pub fn write_items_csv<W: Write>(file: &File, writer: W) -> Result<usize> {
    let mut csv_writer = ::csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(HEADER).map_err(io::Error::from)?;

    let rows = item_rows(file);
    for row in &rows {
        csv_writer.serialize(row).map_err(io::Error::from)?;
    }
    csv_writer.flush()?;
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{Bundle, CashLetter, CheckItem, ImageView, ReturnItem},
        record::{
            BundleHeader, CashLetterHeader, CheckDetail, CheckDetailAddendumA, FileHeader,
            ImageViewDetail, ReturnDetail,
        },
    };

    fn sample_file() -> File {
        let mut file = File::new(FileHeader::default());
        let cash_letter = file.add_cash_letter(CashLetter::new(CashLetterHeader {
            cash_letter_id: "A1".into(),
            ..CashLetterHeader::default()
        }));
        let bundle = cash_letter.add_bundle(Bundle::new(BundleHeader {
            bundle_id: "B1".into(),
            bundle_sequence_number: 1,
            ..BundleHeader::default()
        }));

        let mut check = CheckItem::new(CheckDetail {
            payor_bank_routing_number: "03130001".into(),
            payor_bank_check_digit: "2".into(),
            on_us: "5558881".into(),
            item_amount: 100_000,
            ece_institution_item_sequence_number: "1".into(),
            ..CheckDetail::default()
        });
        check.add_addendum_a(CheckDetailAddendumA::default());
        check.add_image_view(ImageView::new(ImageViewDetail::default()));
        check.add_image_view(ImageView::new(ImageViewDetail::default()));
        bundle.add_check(check);
        bundle.add_return(ReturnItem::new(ReturnDetail {
            item_amount: 250,
            ece_institution_item_sequence_number: "2".into(),
            ..ReturnDetail::default()
        }));
        file
    }

    #[test]
    fn writes_header_and_one_row_per_item() {
        let mut out = Vec::new();
        let count = write_items_csv(&sample_file(), &mut out).unwrap();
        assert_eq!(count, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], HEADER.join(","));
        assert_eq!(lines[1], "A1,B1,1,check,1,031300012,5558881,100000,1,2");
        assert_eq!(lines[2], "A1,B1,1,return,2,,,250,0,0");
    }

    #[test]
    fn rows_read_back_with_csv_reader() {
        let mut out = Vec::new();
        write_items_csv(&sample_file(), &mut out).unwrap();

        let mut reader = ::csv::Reader::from_reader(out.as_slice());
        let rows: Vec<ItemRow> = reader.deserialize().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(rows, item_rows(&sample_file()));
    }

    #[test]
    fn empty_file_still_has_header() {
        let mut out = Vec::new();
        let count = write_items_csv(&File::default(), &mut out).unwrap();
        assert_eq!(count, 0);
        assert_eq!(String::from_utf8(out).unwrap().trim_end(), HEADER.join(","));
    }
}
