use icl::{
    ErrorKind, Reader, RecordKind, StructuralError, WriteMode, Writer,
    model::{Item, ValidateOptions},
    reader::ParseState,
    record::RecordFormat,
};

const SAMPLE: &[u8] = include_bytes!("data/sample.x9");

fn write(file: &icl::File, mode: WriteMode) -> Vec<u8> {
    let mut writer = Writer::with_mode(Vec::new(), mode);
    writer.write(file).unwrap();
    writer.into_inner().unwrap()
}

fn lines(bytes: &[u8]) -> Vec<&[u8]> {
    bytes.split(|b| *b == b'\n').filter(|l| !l.is_empty()).collect()
}

#[test]
fn sample_has_expected_shape() {
    let file = icl::parse(SAMPLE).unwrap();

    assert_eq!(file.cash_letters.len(), 1);
    let cash_letter = &file.cash_letters[0];
    assert_eq!(cash_letter.bundles.len(), 2);
    assert_eq!(cash_letter.routing_number_summaries.len(), 1);

    let first = &cash_letter.bundles[0];
    assert_eq!(first.items.len(), 2);
    let Item::Check(check) = &first.items[0] else {
        panic!("expected a check");
    };
    assert_eq!(check.addenda_a.len(), 1);
    assert!(check.addendum_b.is_some());
    assert_eq!(check.addenda_c.len(), 1);
    assert_eq!(check.image_views.len(), 2);
    let data = check.image_views[0].data.as_ref().unwrap();
    assert_eq!(data.image_data, b"II*\x00\x08\x00\x00\x00\xff\x01\x02");
    assert!(check.image_views[0].analysis.is_some());
    assert!(check.image_views[1].data.is_none());

    let Item::Return(returned) = &cash_letter.bundles[1].items[0] else {
        panic!("expected a return");
    };
    assert_eq!(returned.addenda_a.len(), 1);
    assert!(returned.addendum_b.is_some());
    assert!(returned.addendum_c.is_some());
    assert_eq!(returned.addenda_d.len(), 1);
}

#[test]
fn totals_match_control_records() {
    let file = icl::parse(SAMPLE).unwrap();
    let totals = file.totals();
    let control = file.control.as_ref().unwrap();

    assert_eq!(totals.records, 24);
    assert_eq!(totals.records, u64::from(control.total_record_count));
    assert_eq!(totals.items, u64::from(control.total_item_count));
    assert_eq!(totals.amount, control.file_total_amount);
    assert_eq!(totals.amount, 130_000);

    let bundle = file.cash_letters[0].bundles[0].totals();
    assert_eq!(bundle.micr_valid_amount, 100_000);
    assert_eq!(bundle.images, 3);
}

#[test]
fn sample_passes_strict_validation() {
    let file = icl::parse(SAMPLE).unwrap();
    icl::validate(&file).unwrap();
    file.validate_with(ValidateOptions::strict()).unwrap();
}

#[test]
fn preserve_mode_reproduces_input() {
    let file = icl::parse(SAMPLE).unwrap();
    assert_eq!(write(&file, WriteMode::Preserve), SAMPLE);
}

#[test]
fn recompute_mode_leaves_consistent_file_unchanged() {
    let file = icl::parse(SAMPLE).unwrap();
    assert_eq!(icl::serialize(&file).unwrap(), SAMPLE);
}

#[test]
fn reencoding_is_idempotent() {
    let once = icl::serialize(&icl::parse(SAMPLE).unwrap()).unwrap();
    let twice = icl::serialize(&icl::parse(once.as_slice()).unwrap()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn every_fixed_width_line_is_80_bytes() {
    for line in lines(SAMPLE) {
        if &line[..2] != RecordKind::ImageViewData.code().as_bytes() {
            assert_eq!(line.len(), 80, "{}", String::from_utf8_lossy(line));
        }
    }
}

#[test]
fn amount_change_is_reflected_in_controls() {
    let mut file = icl::parse(SAMPLE).unwrap();
    if let Item::Check(check) = &mut file.cash_letters[0].bundles[0].items[1] {
        check.detail.item_amount = 30_000;
    }

    let stale = file.validate_with(ValidateOptions::strict()).unwrap_err();
    assert_eq!(stale.kind(), ErrorKind::TotalsMismatch);

    let bytes = icl::serialize(&file).unwrap();
    let reread = icl::parse(bytes.as_slice()).unwrap();
    reread.validate_with(ValidateOptions::strict()).unwrap();
    assert_eq!(reread.control.unwrap().file_total_amount, 135_000);
}

#[test]
fn binary_image_survives_round_trip() {
    let mut file = icl::parse(SAMPLE).unwrap();
    if let Item::Check(check) = &mut file.cash_letters[0].bundles[0].items[0] {
        let data = check.image_views[0].data.as_mut().unwrap();
        data.image_data = b"II*\x00\n\x08\r\n\x00\n".to_vec();
        data.digital_signature = b"\n\r\n".to_vec();
    }
    icl::validate(&file).unwrap();

    let bytes = icl::serialize(&file).unwrap();
    let reread = icl::parse(bytes.as_slice()).unwrap();
    assert_eq!(reread, file);
    assert_eq!(icl::serialize(&reread).unwrap(), bytes);
}

#[test]
fn addendum_b_ahead_of_detail_is_structural() {
    let mut input: Vec<&[u8]> = lines(SAMPLE);
    input.swap(3, 5);
    let joined = input.join(&b'\n');

    let err = icl::parse(joined.as_slice()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);
    assert_eq!(err.line(), Some(4));
    assert!(matches!(
        err,
        icl::Error::Structural {
            source: StructuralError::OutOfSequence {
                record: RecordKind::CheckDetailAddendumB,
                state: ParseState::InBundle,
            },
            ..
        }
    ));
}

#[test]
fn truncated_input_reports_open_state() {
    let input = lines(SAMPLE)[..10].join(&b'\n');
    let partial = Reader::new(input.as_slice()).read_with_diagnostics().unwrap_err();

    assert_eq!(partial.error.kind(), ErrorKind::Structural);
    assert_eq!(partial.file.cash_letters[0].bundles[0].items.len(), 1);
}

#[test]
fn short_lines_decode_as_blank_fields() {
    let mut input = Vec::new();
    for line in lines(SAMPLE) {
        let kind = RecordKind::from_code(&line[..2]).unwrap();
        if kind == RecordKind::FileHeader {
            // drop the trailing user field and companion indicator
            input.extend_from_slice(&line[..75]);
        } else {
            input.extend_from_slice(line);
        }
        input.push(b'\n');
    }

    let file = icl::parse(input.as_slice()).unwrap();
    let header = file.header.as_ref().unwrap();
    assert_eq!(header.user_field, "");
    assert_eq!(header.companion_document_indicator, "");
    header.validate().unwrap();
}

#[test]
fn json_snapshot_round_trips() {
    let file = icl::parse(SAMPLE).unwrap();
    let json = serde_json::to_string(&file).unwrap();
    let back: icl::File = serde_json::from_str(&json).unwrap();
    assert_eq!(back, file);
    assert_eq!(write(&back, WriteMode::Preserve), SAMPLE);
}

#[test]
fn writes_to_a_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.x9");

    let file = icl::parse(SAMPLE).unwrap();
    let mut writer = Writer::new(std::fs::File::create(&path).unwrap());
    writer.write(&file).unwrap();
    assert_eq!(writer.records_written(), 24);
    writer.flush().unwrap();
    drop(writer);

    assert_eq!(std::fs::read(&path).unwrap(), SAMPLE);
}
