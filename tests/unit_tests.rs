use approx::assert_abs_diff_eq;
use clap::Parser;
use csv2tfrecord::category::{CategoryMap, DEFAULT_CATEGORY};
use csv2tfrecord::config::{validate_quality, Args};
use csv2tfrecord::conversion::{normalize_boxes, sha256_hex};
use csv2tfrecord::error::ConvertError;
use csv2tfrecord::example::{feature, Example, ExampleBuilder, Feature, FeatureValue};
use csv2tfrecord::io::{group_annotations, read_annotations};
use csv2tfrecord::tfrecord::{masked_crc32c, RecordReader, RecordWriter};
use csv2tfrecord::types::AnnotationRow;
use csv2tfrecord::utils::{progress_message, write_progress};
use prost::Message;

fn row(filename: &str, obj_name: &str, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> AnnotationRow {
    AnnotationRow {
        filename: filename.to_string(),
        obj_name: obj_name.to_string(),
        xmin,
        ymin,
        xmax,
        ymax,
    }
}

#[test]
fn test_validate_quality() {
    assert_eq!(validate_quality("95"), Ok(95));
    assert_eq!(validate_quality("1"), Ok(1));
    assert_eq!(validate_quality("100"), Ok(100));
    assert!(validate_quality("0").is_err());
    assert!(validate_quality("101").is_err());
    assert!(validate_quality("abc").is_err());
}

#[test]
fn test_default_category_map() {
    let categories = CategoryMap::default();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories.label(DEFAULT_CATEGORY).unwrap(), 1);
}

#[test]
fn test_category_map_from_names() {
    let categories = CategoryMap::from_names(["Pedestrian", "Car", "Truck", "Stopsign"]).unwrap();
    assert_eq!(categories.label("Pedestrian").unwrap(), 1);
    assert_eq!(categories.label("Truck").unwrap(), 3);
    assert_eq!(categories.label("Stopsign").unwrap(), 4);

    let labels: Vec<_> = categories.iter().map(|(_, label)| label).collect();
    assert_eq!(labels, vec![1, 2, 3, 4]);
}

#[test]
fn test_category_map_rejects_duplicates() {
    let result = CategoryMap::from_names(["Pedestrian", "Stopsign", "Car", "Stopsign"]);
    match result {
        Err(ConvertError::DuplicateCategory(name)) => assert_eq!(name, "Stopsign"),
        other => panic!("expected duplicate category error, got {:?}", other),
    }
}

#[test]
fn test_unknown_category() {
    let categories = CategoryMap::default();
    match categories.label("Car") {
        Err(ConvertError::UnknownCategory(name)) => assert_eq!(name, "Car"),
        other => panic!("expected unknown category error, got {:?}", other),
    }
}

#[test]
fn test_group_annotations_keeps_first_seen_order() {
    let groups = group_annotations(vec![
        row("b.jpg", "Stopsign", 1.0, 1.0, 2.0, 2.0),
        row("a.jpg", "Stopsign", 3.0, 3.0, 4.0, 4.0),
        row("b.jpg", "Stopsign", 5.0, 5.0, 6.0, 6.0),
        row("c.jpg", "Stopsign", 7.0, 7.0, 8.0, 8.0),
    ]);

    let filenames: Vec<_> = groups.keys().cloned().collect();
    assert_eq!(filenames, vec!["b.jpg", "a.jpg", "c.jpg"]);

    let b_rows = &groups["b.jpg"];
    assert_eq!(b_rows.len(), 2);
    assert_eq!(b_rows[0].xmin, 1.0);
    assert_eq!(b_rows[1].xmin, 5.0);
}

#[test]
fn test_read_annotations_ignores_extra_columns() {
    let csv = "width,filename,obj_name,xmin,ymin,xmax,ymax,note\n\
               640,cat.jpg,Stopsign,10,20,100,200,first\n\
               640,dog.jpg,Stopsign,1.5,2.5,3.5,4.5,second\n";
    let groups = read_annotations(csv.as_bytes()).unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups["cat.jpg"][0], row("cat.jpg", "Stopsign", 10.0, 20.0, 100.0, 200.0));
    assert_eq!(groups["dog.jpg"][0].ymax, 4.5);
}

#[test]
fn test_read_annotations_missing_columns() {
    let csv = "filename,obj_name,xmin,xmax\ncat.jpg,Stopsign,10,100\n";
    match read_annotations(csv.as_bytes()) {
        Err(ConvertError::MissingColumns(missing)) => {
            assert_eq!(missing, vec!["ymin".to_string(), "ymax".to_string()])
        }
        other => panic!("expected missing column error, got {:?}", other),
    }
}

#[test]
fn test_read_annotations_bad_number() {
    let csv = "filename,obj_name,xmin,ymin,xmax,ymax\ncat.jpg,Stopsign,ten,20,100,200\n";
    assert!(matches!(
        read_annotations(csv.as_bytes()),
        Err(ConvertError::Csv(_))
    ));
}

#[test]
fn test_normalize_boxes() {
    let rows = vec![row("cat.jpg", "Stopsign", 10.0, 20.0, 100.0, 200.0)];
    let boxes = normalize_boxes(&rows, 200, 400);

    assert_eq!(boxes.len(), 1);
    assert_abs_diff_eq!(boxes.xmin[0], 0.05, epsilon = 1e-6);
    assert_abs_diff_eq!(boxes.ymin[0], 0.05, epsilon = 1e-6);
    assert_abs_diff_eq!(boxes.xmax[0], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(boxes.ymax[0], 0.5, epsilon = 1e-6);
}

#[test]
fn test_normalize_boxes_recovers_pixels() {
    let rows = vec![
        row("a.jpg", "Stopsign", 13.0, 7.0, 311.0, 233.0),
        row("a.jpg", "Stopsign", 0.0, 0.0, 639.0, 479.0),
    ];
    let boxes = normalize_boxes(&rows, 640, 480);

    for (i, r) in rows.iter().enumerate() {
        assert_abs_diff_eq!(boxes.xmin[i] as f64 * 640.0, r.xmin, epsilon = 1e-3);
        assert_abs_diff_eq!(boxes.ymin[i] as f64 * 480.0, r.ymin, epsilon = 1e-3);
        assert_abs_diff_eq!(boxes.xmax[i] as f64 * 640.0, r.xmax, epsilon = 1e-3);
        assert_abs_diff_eq!(boxes.ymax[i] as f64 * 480.0, r.ymax, epsilon = 1e-3);
    }
}

#[test]
fn test_normalize_boxes_does_not_clamp() {
    let rows = vec![row("a.jpg", "Stopsign", -10.0, -40.0, 300.0, 600.0)];
    let boxes = normalize_boxes(&rows, 200, 400);

    assert_abs_diff_eq!(boxes.xmin[0], -0.05, epsilon = 1e-6);
    assert_abs_diff_eq!(boxes.ymin[0], -0.1, epsilon = 1e-6);
    assert_abs_diff_eq!(boxes.xmax[0], 1.5, epsilon = 1e-6);
    assert_abs_diff_eq!(boxes.ymax[0], 1.5, epsilon = 1e-6);
}

#[test]
fn test_sha256_hex() {
    assert_eq!(
        sha256_hex(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn test_masked_crc32c() {
    assert_eq!(masked_crc32c(b""), 0xa282_ead8);
    assert_eq!(masked_crc32c(b"123456789"), 0xc78a_b0e5);
}

#[test]
fn test_record_framing() {
    let mut writer = RecordWriter::new(Vec::new());
    writer.write_record(b"abc").unwrap();
    assert_eq!(writer.records_written(), 1);
    let bytes = writer.finish().unwrap();

    let expected: Vec<u8> = vec![
        0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // length
        0xb0, 0x99, 0x49, 0x0e, // masked crc of length
        b'a', b'b', b'c', // data
        0x6e, 0x57, 0xf1, 0x21, // masked crc of data
    ];
    assert_eq!(bytes, expected);
}

#[test]
fn test_record_reader_reads_back_records() {
    let mut writer = RecordWriter::new(Vec::new());
    writer.write_record(b"first").unwrap();
    writer.write_record(b"").unwrap();
    writer.write_record(b"third record").unwrap();
    let bytes = writer.finish().unwrap();

    let records: Vec<Vec<u8>> = RecordReader::new(bytes.as_slice())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        records,
        vec![b"first".to_vec(), Vec::new(), b"third record".to_vec()]
    );
}

#[test]
fn test_record_reader_detects_corruption() {
    let mut writer = RecordWriter::new(Vec::new());
    writer.write_record(b"payload").unwrap();
    let mut bytes = writer.finish().unwrap();

    // flip one bit of the payload
    bytes[13] ^= 0x01;
    let mut reader = RecordReader::new(bytes.as_slice());
    assert!(matches!(
        reader.read_record(),
        Err(ConvertError::CorruptRecord(_))
    ));
}

#[test]
fn test_record_reader_detects_truncation() {
    let mut writer = RecordWriter::new(Vec::new());
    writer.write_record(b"payload").unwrap();
    let bytes = writer.finish().unwrap();

    let mut reader = RecordReader::new(&bytes[..bytes.len() - 2]);
    assert!(matches!(
        reader.read_record(),
        Err(ConvertError::CorruptRecord(_))
    ));

    let mut reader = RecordReader::new(&bytes[..5]);
    assert!(matches!(
        reader.read_record(),
        Err(ConvertError::CorruptRecord(_))
    ));
}

#[test]
fn test_feature_value_kinds() {
    let feature: Feature = FeatureValue::Int(7).into();
    assert_eq!(feature.as_int64_list(), Some(&[7i64][..]));

    let feature: Feature = FeatureValue::Bytes(b"jpeg".to_vec()).into();
    assert_eq!(feature.as_bytes_list(), Some(&[b"jpeg".to_vec()][..]));

    let feature: Feature = FeatureValue::FloatList(vec![0.25, 0.5]).into();
    assert_eq!(feature.as_float_list(), Some(&[0.25f32, 0.5][..]));
    assert!(feature.as_int64_list().is_none());

    let feature: Feature = FeatureValue::IntList(vec![1, 2, 3]).into();
    assert!(matches!(feature.kind, Some(feature::Kind::Int64List(_))));
}

#[test]
fn test_example_serialization_is_order_independent() {
    let first = ExampleBuilder::new()
        .insert("image/height", FeatureValue::Int(400))
        .insert("image/format", FeatureValue::Bytes(b"jpeg".to_vec()))
        .build();
    let second = ExampleBuilder::new()
        .insert("image/format", FeatureValue::Bytes(b"jpeg".to_vec()))
        .insert("image/height", FeatureValue::Int(400))
        .build();

    let bytes = first.encode_to_vec();
    assert_eq!(bytes, second.encode_to_vec());

    let decoded = Example::decode(bytes.as_slice()).unwrap();
    assert_eq!(decoded, first);
    assert_eq!(decoded.len(), 2);
}

#[test]
fn test_progress_message() {
    assert_eq!(
        progress_message(3, 10),
        "Converted 3 / 10 images&labels to tfrecord"
    );
}

#[test]
fn test_write_progress_overwrites_line() {
    let mut out = Vec::new();
    write_progress(&mut out, 1, 2).unwrap();
    write_progress(&mut out, 2, 2).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "\rConverted 1 / 2 images&labels to tfrecord\rConverted 2 / 2 images&labels to tfrecord"
    );
}

#[test]
fn test_args_require_all_paths() {
    let args = Args::try_parse_from([
        "csv2tfrecord",
        "--img_path",
        "images",
        "--csv_path",
        "labels.csv",
        "--out_path",
        "train.tfrecord",
    ])
    .unwrap();
    assert_eq!(args.out_path, std::path::PathBuf::from("train.tfrecord"));
    assert_eq!(args.quality, 95);
    assert!(args.label_list.is_empty());

    let missing_out = Args::try_parse_from([
        "csv2tfrecord",
        "--img_path",
        "images",
        "--csv_path",
        "labels.csv",
    ]);
    let err = missing_out.unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    assert_ne!(err.exit_code(), 0);
}

#[test]
fn test_args_label_list_and_quality() {
    let args = Args::try_parse_from([
        "csv2tfrecord",
        "--img_path",
        "images",
        "--csv_path",
        "labels.csv",
        "--out_path",
        "train.tfrecord",
        "--label_list",
        "Pedestrian,Car",
        "--quality",
        "80",
    ])
    .unwrap();
    assert_eq!(args.quality, 80);
    assert_eq!(args.category_map().unwrap().label("Car").unwrap(), 2);

    assert!(Args::try_parse_from([
        "csv2tfrecord",
        "--img_path",
        "images",
        "--csv_path",
        "labels.csv",
        "--out_path",
        "train.tfrecord",
        "--quality",
        "0",
    ])
    .is_err());
}
