use imagemeta_core::coder::{EncodeError, ExifCoder, RawRecord, RawValue};
use imagemeta_core::store::MetadataStore;
use imagemeta_core::types::{Lookup, Rational, TagValue};

/// The EXIF records of the classic test image fixture.
fn fixture_store() -> MetadataStore<ExifCoder> {
    MetadataStore::from_records(
        ExifCoder::default(),
        vec![
            RawRecord::new("Exif.Image.Software", RawValue::Text("plasq skitch".into())),
            RawRecord::new("Exif.Image.ExifTag", RawValue::Longs(vec![62])),
            RawRecord::new("Exif.Photo.ExifVersion", RawValue::Bytes(vec![48, 50, 49, 48])),
            RawRecord::new("Exif.Photo.PixelXDimension", RawValue::Longs(vec![32])),
            RawRecord::new("Exif.Photo.PixelYDimension", RawValue::Longs(vec![32])),
            RawRecord::new("Exif.Image.GPSTag", RawValue::Longs(vec![104])),
            RawRecord::new(
                "Exif.GPSInfo.GPSLatitude",
                RawValue::Rationals(vec![
                    Rational::new(4, 1),
                    Rational::new(22, 1),
                    Rational::new(1, 3),
                ]),
            ),
        ],
    )
}

fn gps_triple() -> TagValue {
    TagValue::Rationals(vec![
        Rational::new(4, 1),
        Rational::new(22, 1),
        Rational::new(1, 3),
    ])
}

#[test]
fn golden_entries_decode_in_stored_order() {
    assert_eq!(
        fixture_store().entries(),
        vec![
            ("Exif.Image.Software".to_string(), TagValue::text("plasq skitch")),
            ("Exif.Image.ExifTag".to_string(), TagValue::Int(62)),
            ("Exif.Photo.ExifVersion".to_string(), TagValue::text("48 50 49 48")),
            ("Exif.Photo.PixelXDimension".to_string(), TagValue::Int(32)),
            ("Exif.Photo.PixelYDimension".to_string(), TagValue::Int(32)),
            ("Exif.Image.GPSTag".to_string(), TagValue::Int(104)),
            ("Exif.GPSInfo.GPSLatitude".to_string(), gps_triple()),
        ]
    );
}

#[test]
fn golden_flatten_unique_keys_stay_scalar() {
    let flat = fixture_store().flatten();
    assert_eq!(flat.len(), 7);
    assert_eq!(
        flat.get("Exif.Image.Software"),
        Some(&Lookup::Single(TagValue::text("plasq skitch")))
    );
    assert_eq!(
        flat.get("Exif.Image.ExifTag"),
        Some(&Lookup::Single(TagValue::Int(62)))
    );
    assert_eq!(
        flat.get("Exif.GPSInfo.GPSLatitude"),
        Some(&Lookup::Single(gps_triple()))
    );
}

#[test]
fn geodetic_tag_decodes_to_exact_fractions() {
    let store = fixture_store();
    let Lookup::Single(TagValue::Rationals(components)) = store.get("Exif.GPSInfo.GPSLatitude")
    else {
        panic!("expected a single rational sequence");
    };
    assert_eq!(components.len(), 3);
    // 1/3 survives as a fraction; no float would compare equal here.
    assert_eq!(components[2], Rational::new(1, 3));
    assert_eq!(components[2], Rational::new(2, 6));
    assert_ne!(components[2], Rational::new(333, 1000));
}

#[test]
fn version_bytes_decode_to_space_separated_decimals() {
    assert_eq!(
        fixture_store().get("Exif.Photo.ExifVersion"),
        Lookup::Single(TagValue::text("48 50 49 48"))
    );
}

#[test]
fn version_bytes_encode_from_the_same_rendering() {
    let mut store = fixture_store();
    store.set("Exif.Photo.ExifVersion", "48 50 49 49").unwrap();
    assert_eq!(
        store.records().iter().find(|r| r.key == "Exif.Photo.ExifVersion").map(|r| &r.value),
        Some(&RawValue::Bytes(vec![48, 50, 49, 49]))
    );

    let err = store.set("Exif.Photo.ExifVersion", "48 fifty 49").unwrap_err();
    assert!(matches!(err, EncodeError::Parse { .. }));
}

#[test]
fn add_repeats_the_tag() {
    let mut store = fixture_store();
    store.add("Exif.Image.Software", "ruby-exiv2").unwrap();
    assert_eq!(
        store.flatten().get("Exif.Image.Software"),
        Some(&Lookup::Multiple(vec![
            TagValue::text("plasq skitch"),
            TagValue::text("ruby-exiv2"),
        ]))
    );
}

#[test]
fn set_scalar_then_sequence() {
    let mut store = fixture_store();

    store.set("Exif.Image.Software", "ruby-exiv2").unwrap();
    assert_eq!(
        store.get("Exif.Image.Software"),
        Lookup::Single(TagValue::text("ruby-exiv2"))
    );

    store
        .set("Exif.Image.Software", vec!["ruby-exiv2", "plasq skitch"])
        .unwrap();
    assert_eq!(
        store.get("Exif.Image.Software"),
        Lookup::Multiple(vec![
            TagValue::text("ruby-exiv2"),
            TagValue::text("plasq skitch"),
        ])
    );
}

#[test]
fn delete_one_then_all() {
    let mut store = fixture_store();
    store
        .set("Exif.Image.Software", vec!["ruby-exiv2", "plasq skitch"])
        .unwrap();

    assert_eq!(
        store.delete("Exif.Image.Software"),
        Some(TagValue::text("ruby-exiv2"))
    );
    assert_eq!(
        store.get("Exif.Image.Software"),
        Lookup::Single(TagValue::text("plasq skitch"))
    );

    assert_eq!(store.delete_all("Exif.Image.Software"), 1);
    assert_eq!(store.get("Exif.Image.Software"), Lookup::Absent);
}

#[test]
fn fixed_arity_rational_tag_rejects_other_lengths() {
    let mut store = fixture_store();
    let err = store
        .set(
            "Exif.GPSInfo.GPSLatitude",
            vec![Rational::new(4, 1), Rational::new(22, 1)],
        )
        .unwrap_err();
    assert!(matches!(
        err,
        EncodeError::Arity { expected: 3, actual: 2, .. }
    ));
}

#[test]
fn gps_sequence_packs_into_a_single_entry() {
    let mut store = fixture_store();
    store
        .set(
            "Exif.GPSInfo.GPSLongitude",
            vec![Rational::new(12, 1), Rational::new(30, 1), Rational::new(1, 2)],
        )
        .unwrap();
    let count = store
        .records()
        .iter()
        .filter(|r| r.key == "Exif.GPSInfo.GPSLongitude")
        .count();
    assert_eq!(count, 1);
}

#[test]
fn integer_tag_parses_numeric_text_and_rejects_the_rest() {
    let mut store = fixture_store();

    store.set("Exif.Image.ExifTag", "63").unwrap();
    assert_eq!(store.get("Exif.Image.ExifTag"), Lookup::Single(TagValue::Int(63)));

    let err = store.set("Exif.Image.ExifTag", "not a number").unwrap_err();
    assert!(matches!(err, EncodeError::Parse { .. }));
}

#[test]
fn rational_tag_parses_fraction_text() {
    let mut store = fixture_store();
    store.set("Exif.Photo.FNumber", "28/10").unwrap();
    assert_eq!(
        store.get("Exif.Photo.FNumber"),
        Lookup::Single(TagValue::Rational(Rational::new(28, 10)))
    );

    let err = store.set("Exif.Photo.FNumber", "wide open").unwrap_err();
    assert!(matches!(err, EncodeError::Parse { .. }));
}

#[test]
fn foreign_family_keys_are_rejected() {
    let mut store = fixture_store();
    let err = store.add("Iptc.Application2.Caption", "nope").unwrap_err();
    assert!(matches!(err, EncodeError::ForeignKey { .. }));
}

#[test]
fn utf8_text_survives_the_round_trip() {
    let mut store = fixture_store();
    let description = "UTF-8 description. ☃ł㌎";
    store.set("Exif.Image.ImageDescription", description).unwrap();
    assert_eq!(
        store.get("Exif.Image.ImageDescription"),
        Lookup::Single(TagValue::text(description))
    );
}

#[test]
fn multi_component_integer_payload_decodes_to_a_sequence() {
    let store = MetadataStore::from_records(
        ExifCoder::default(),
        vec![RawRecord::new(
            "Exif.Photo.ISOSpeedRatings",
            RawValue::Longs(vec![200, 400]),
        )],
    );
    assert_eq!(
        store.get("Exif.Photo.ISOSpeedRatings"),
        Lookup::Single(TagValue::Ints(vec![200, 400]))
    );
}

#[test]
fn rational_reduction_and_rendering() {
    let r = Rational::new(28, 10);
    assert_eq!(r.to_string(), "28/10");
    assert_eq!(r.reduced(), Rational::new(14, 5));
    assert_eq!(r.reduced().to_string(), "14/5");
    assert_eq!("28/10".parse::<Rational>().unwrap(), r);
    assert_eq!("62".parse::<Rational>().unwrap(), Rational::new(62, 1));
}
