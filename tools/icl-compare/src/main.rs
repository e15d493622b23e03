//! CLI tool for comparing the items of two image cash letter files.
//!
//! # Usage
//!
//! ```bash
//! # Compare an X9 file with its JSON dump
//! icl-compare --file1 sample.x9 --format1 x9 --file2 sample.json --format2 json
//!
//! # Compare two X9 files
//! icl-compare --file1 v1.x9 --format1 x9 --file2 v2.x9 --format2 x9
//! ```

use std::{
    collections::BTreeMap,
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use icl::{
    model::Item,
    report::{ItemRow, item_rows},
};

/// Compare the items of two image cash letter files.
///
/// Reads both files and matches items by cash letter, bundle sequence and
/// ECE institution item sequence number. Files can be in different formats
/// (X9, JSON).
#[derive(Parser, Debug)]
#[command(name = "icl-compare")]
#[command(version, about)]
struct Args {
    /// First file path.
    #[arg(long)]
    file1: PathBuf,

    /// Format of the first file.
    #[arg(long, value_enum)]
    format1: FormatArg,

    /// Second file path.
    #[arg(long)]
    file2: PathBuf,

    /// Format of the second file.
    #[arg(long, value_enum)]
    format2: FormatArg,
}

/// Supported input formats for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// X9.100-187 fixed-width records.
    X9,
    /// JSON snapshot of the file tree.
    Json,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let file1 = read_file(&args.file1, args.format1)?;
    let file2 = read_file(&args.file2, args.format2)?;

    let items1 = collect_items(&file1);
    let items2 = collect_items(&file2);

    match compare_items(&items1, &items2) {
        CompareResult::Identical => {
            println!(
                "The items in '{}' and '{}' are identical.",
                args.file1.display(),
                args.file2.display()
            );
        }
        CompareResult::Different(differences) => {
            format_differences(&args, &differences);
            bail!(
                "Found {} difference(s) between '{}' and '{}'",
                differences.len(),
                args.file1.display(),
                args.file2.display()
            );
        }
    }

    Ok(())
}

fn read_file(path: &Path, format: FormatArg) -> Result<icl::File> {
    let input =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    match format {
        FormatArg::X9 => icl::parse(input)
            .with_context(|| format!("Failed to read X9 file '{}'", path.display())),
        FormatArg::Json => serde_json::from_reader(input)
            .with_context(|| format!("Failed to read JSON file '{}'", path.display())),
    }
}

/// An item together with its listing row.
#[derive(Debug)]
struct Entry<'a> {
    item: &'a Item,
    row: ItemRow,
}

/// Item sequence numbers restart in every bundle, so the key carries the
/// bundle position as well.
type ItemKey<'e> = (&'e str, u16, &'e str);

impl Entry<'_> {
    fn key(&self) -> ItemKey<'_> {
        (&self.row.cash_letter_id, self.row.bundle_sequence, &self.row.ece_sequence_number)
    }

    fn label(&self) -> String {
        format!(
            "CASH_LETTER_ID={} BUNDLE_SEQUENCE={} ECE_SEQUENCE_NUMBER={}",
            self.row.cash_letter_id, self.row.bundle_sequence, self.row.ece_sequence_number
        )
    }
}

fn collect_items(file: &icl::File) -> Vec<Entry<'_>> {
    file.items().zip(item_rows(file)).map(|(item, row)| Entry { item, row }).collect()
}

/// Represents a single difference between two item lists.
#[derive(Debug)]
enum Difference<'e, 'a> {
    /// Item with this sequence number exists only in the first file.
    OnlyInFirst { entry: &'e Entry<'a> },
    /// Item with this sequence number exists only in the second file.
    OnlyInSecond { entry: &'e Entry<'a> },
    /// Items with the same sequence number differ.
    Mismatch { first: &'e Entry<'a>, second: &'e Entry<'a> },
}

/// Result of comparing two item lists.
enum CompareResult<'e, 'a> {
    /// Both lists contain identical items (matched by sequence number).
    Identical,
    /// Lists differ; contains the list of differences.
    Different(Vec<Difference<'e, 'a>>),
}

/// Compares two item lists by [`ItemKey`].
///
/// Items are matched by key, not by position within the bundle.
fn compare_items<'e, 'a>(
    first: &'e [Entry<'a>],
    second: &'e [Entry<'a>],
) -> CompareResult<'e, 'a> {
    let mut differences = Vec::new();
    let first_map: BTreeMap<ItemKey<'e>, &Entry<'a>> = first.iter().map(|e| (e.key(), e)).collect();
    let second_map: BTreeMap<ItemKey<'e>, &Entry<'a>> =
        second.iter().map(|e| (e.key(), e)).collect();

    for (key, entry1) in &first_map {
        match second_map.get(key) {
            Some(entry2) if entry1.item != entry2.item || entry1.row != entry2.row => {
                differences.push(Difference::Mismatch { first: *entry1, second: *entry2 });
            }
            Some(_) => {}
            None => differences.push(Difference::OnlyInFirst { entry: *entry1 }),
        }
    }
    for (key, entry2) in &second_map {
        if !first_map.contains_key(key) {
            differences.push(Difference::OnlyInSecond { entry: *entry2 });
        }
    }

    if differences.is_empty() {
        CompareResult::Identical
    } else {
        CompareResult::Different(differences)
    }
}

/// Formats and prints differences to stderr.
fn format_differences(args: &Args, differences: &[Difference<'_, '_>]) {
    eprintln!(
        "Comparing '{}' ({:?}) with '{}' ({:?}):",
        args.file1.display(),
        args.format1,
        args.file2.display(),
        args.format2
    );
    eprintln!();

    for diff in differences {
        match diff {
            Difference::OnlyInFirst { entry } => print_only_in(entry, &args.file1),
            Difference::OnlyInSecond { entry } => print_only_in(entry, &args.file2),
            Difference::Mismatch { first, second } => {
                let (r1, r2) = (&first.row, &second.row);
                eprintln!("Item {} differs:", first.label());
                print_field_diff("ITEM_KIND", &r1.item_kind, &r2.item_kind);
                print_field_diff("BUNDLE_ID", &r1.bundle_id, &r2.bundle_id);
                print_field_diff("PAYOR_ROUTING", &r1.payor_routing, &r2.payor_routing);
                print_field_diff("ON_US", &r1.on_us, &r2.on_us);
                print_field_diff("AMOUNT", &r1.amount, &r2.amount);
                print_field_diff("ADDENDUM_COUNT", &r1.addendum_count, &r2.addendum_count);
                print_field_diff("IMAGE_COUNT", &r1.image_count, &r2.image_count);
                if r1 == r2 {
                    eprintln!("  other record fields differ");
                }
                eprintln!();
            }
        }
    }
}

fn print_only_in(entry: &Entry<'_>, path: &Path) {
    eprintln!("Item {} exists only in '{}':", entry.label(), path.display());
    eprintln!("  ITEM_KIND: {}", entry.row.item_kind);
    eprintln!("  AMOUNT: {}", entry.row.amount);
    eprintln!();
}

/// Prints a field comparison, only showing if values differ.
fn print_field_diff<T: PartialEq + std::fmt::Display>(name: &str, val1: &T, val2: &T) {
    if val1 != val2 {
        eprintln!("  {name}: '{val1}' vs '{val2}'");
    }
}

#[cfg(test)]
mod tests {
    use icl::{
        model::{Bundle, CashLetter, CheckItem},
        record::{BundleHeader, CashLetterHeader, CheckDetail, FileHeader},
    };

    use super::*;

    fn sample_file(items: &[(&str, u64)]) -> icl::File {
        let mut file = icl::File::new(FileHeader::default());
        let bundle = file
            .add_cash_letter(CashLetter::new(CashLetterHeader::default()))
            .add_bundle(Bundle::new(BundleHeader::default()));
        for (sequence, amount) in items {
            bundle.add_check(CheckItem::new(CheckDetail {
                ece_institution_item_sequence_number: (*sequence).to_string(),
                item_amount: *amount,
                ..CheckDetail::default()
            }));
        }
        file
    }

    #[test]
    fn test_identical_items() {
        let file1 = sample_file(&[("1", 100), ("2", 200)]);
        let file2 = sample_file(&[("1", 100), ("2", 200)]);

        match compare_items(&collect_items(&file1), &collect_items(&file2)) {
            CompareResult::Identical => {}
            CompareResult::Different(_) => panic!("Expected identical"),
        }
    }

    #[test]
    fn test_identical_different_order() {
        let file1 = sample_file(&[("1", 100), ("2", 200), ("3", 300)]);
        let file2 = sample_file(&[("3", 300), ("1", 100), ("2", 200)]);

        match compare_items(&collect_items(&file1), &collect_items(&file2)) {
            CompareResult::Identical => {}
            CompareResult::Different(_) => panic!("Expected identical (order should not matter)"),
        }
    }

    #[test]
    fn test_only_in_first_and_second() {
        let file1 = sample_file(&[("1", 100), ("2", 200)]);
        let file2 = sample_file(&[("1", 100), ("99", 900)]);
        let (items1, items2) = (collect_items(&file1), collect_items(&file2));

        match compare_items(&items1, &items2) {
            CompareResult::Identical => panic!("Expected different"),
            CompareResult::Different(diffs) => {
                assert_eq!(diffs.len(), 2);
                match (&diffs[0], &diffs[1]) {
                    (
                        Difference::OnlyInFirst { entry: e1 },
                        Difference::OnlyInSecond { entry: e2 },
                    ) => {
                        assert_eq!(e1.row.ece_sequence_number, "2");
                        assert_eq!(e2.row.ece_sequence_number, "99");
                    }
                    other => panic!("Unexpected differences: {other:?}"),
                }
            }
        }
    }

    #[test]
    fn test_mismatched_amount() {
        let file1 = sample_file(&[("1", 1000)]);
        let file2 = sample_file(&[("1", 2000)]);
        let (items1, items2) = (collect_items(&file1), collect_items(&file2));

        match compare_items(&items1, &items2) {
            CompareResult::Identical => panic!("Expected different"),
            CompareResult::Different(diffs) => {
                assert_eq!(diffs.len(), 1);
                match &diffs[0] {
                    Difference::Mismatch { first, second } => {
                        assert_eq!(first.row.amount, 1000);
                        assert_eq!(second.row.amount, 2000);
                    }
                    _ => panic!("Expected Mismatch"),
                }
            }
        }
    }

    #[test]
    fn test_mismatch_outside_listed_columns() {
        let file1 = sample_file(&[("1", 100)]);
        let mut file2 = sample_file(&[("1", 100)]);
        if let Some(Item::Check(check)) = file2.cash_letters[0].bundles[0].items.first_mut() {
            check.detail.return_acceptance_indicator = "D".into();
        }
        let (items1, items2) = (collect_items(&file1), collect_items(&file2));

        match compare_items(&items1, &items2) {
            CompareResult::Identical => panic!("Expected different"),
            CompareResult::Different(diffs) => assert_eq!(diffs.len(), 1),
        }
    }

    #[test]
    fn test_same_sequence_in_different_bundles() {
        let mut file1 = sample_file(&[("1", 100)]);
        let bundle = file1.cash_letters[0].add_bundle(Bundle::new(BundleHeader {
            bundle_sequence_number: 2,
            ..BundleHeader::default()
        }));
        bundle.add_check(CheckItem::new(CheckDetail {
            ece_institution_item_sequence_number: "1".into(),
            item_amount: 500,
            ..CheckDetail::default()
        }));
        let file2 = sample_file(&[("1", 100)]);
        let (items1, items2) = (collect_items(&file1), collect_items(&file2));

        match compare_items(&items1, &items2) {
            CompareResult::Identical => panic!("Expected different"),
            CompareResult::Different(diffs) => {
                assert_eq!(diffs.len(), 1);
                match &diffs[0] {
                    Difference::OnlyInFirst { entry } => {
                        assert_eq!(entry.row.bundle_sequence, 2);
                        assert_eq!(entry.row.amount, 500);
                    }
                    other => panic!("Unexpected difference: {other:?}"),
                }
            }
        }
    }

    #[test]
    fn test_empty_files() {
        let file1 = icl::File::default();
        let file2 = icl::File::default();

        match compare_items(&collect_items(&file1), &collect_items(&file2)) {
            CompareResult::Identical => {}
            CompareResult::Different(_) => panic!("Expected identical for empty files"),
        }
    }
}
