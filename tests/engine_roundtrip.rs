use std::fs;

use chrono::{TimeZone, Utc};
use imagemeta_core::engine::EngineError;
use imagemeta_core::image::Image;
use imagemeta_core::types::{Lookup, Rational, TagValue};
use tempfile::tempdir;

fn make_image_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("test.jpg");
    fs::write(&path, b"not an actual jpeg, the engine never parses it").unwrap();
    path
}

#[test]
fn scenario_open_missing_file_fails_distinctly() {
    let dir = tempdir().unwrap();
    let result = Image::open(dir.path().join("no-such-file.jpg"));
    assert!(matches!(result, Err(EngineError::FileNotFound(_))));
}

#[test]
fn fresh_image_reads_as_empty_stores() {
    let dir = tempdir().unwrap();
    let path = make_image_file(&dir);

    let mut image = Image::open(&path).unwrap();
    image.read_metadata().unwrap();

    assert!(image.exif().is_empty());
    assert!(image.iptc().is_empty());
    assert!(image.xmp().is_empty());
}

#[test]
fn write_then_reopen_round_trips_all_families() {
    let dir = tempdir().unwrap();
    let path = make_image_file(&dir);

    let mut image = Image::open(&path).unwrap();
    image.read_metadata().unwrap();

    image.exif_data().set("Exif.Image.Software", "imagemeta").unwrap();
    image
        .exif_data()
        .set(
            "Exif.GPSInfo.GPSLatitude",
            vec![Rational::new(4, 1), Rational::new(22, 1), Rational::new(1, 3)],
        )
        .unwrap();
    image
        .iptc_data()
        .set("Iptc.Application2.Keywords", vec!["fish", "custard"])
        .unwrap();
    image
        .iptc_data()
        .set("Iptc.Application2.ReleaseDate", "2412-12-06")
        .unwrap();
    image
        .xmp_data()
        .set("Xmp.dc.title", vec!["abc", "lang=\"ab-CE\" cde"])
        .unwrap();
    image.write_metadata().unwrap();

    let mut reopened = Image::open(&path).unwrap();
    reopened.read_metadata().unwrap();

    assert_eq!(reopened.exif().flatten(), image.exif().flatten());
    assert_eq!(reopened.iptc().flatten(), image.iptc().flatten());
    assert_eq!(reopened.xmp().flatten(), image.xmp().flatten());

    assert_eq!(
        reopened.iptc().get("Iptc.Application2.ReleaseDate"),
        Lookup::Single(TagValue::Timestamp(
            Utc.with_ymd_and_hms(2412, 12, 6, 0, 0, 0).unwrap()
        ))
    );
}

#[test]
fn tampered_sidecar_fails_the_digest_check() {
    let dir = tempdir().unwrap();
    let path = make_image_file(&dir);

    let mut image = Image::open(&path).unwrap();
    image.exif_data().set("Exif.Image.Software", "original text").unwrap();
    image.write_metadata().unwrap();

    // Edit a record behind the digest's back.
    let sidecar = dir.path().join("test.jpg.meta.json");
    let contents = fs::read_to_string(&sidecar).unwrap();
    assert!(contents.contains("original text"));
    fs::write(&sidecar, contents.replace("original text", "tampered text")).unwrap();

    let mut reopened = Image::open(&path).unwrap();
    let err = reopened.read_metadata().unwrap_err();
    assert!(matches!(err, EngineError::Decode { .. }));
}

#[test]
fn garbage_sidecar_is_a_decode_error() {
    let dir = tempdir().unwrap();
    let path = make_image_file(&dir);
    fs::write(dir.path().join("test.jpg.meta.json"), b"{ not json").unwrap();

    let mut image = Image::open(&path).unwrap();
    let err = image.read_metadata().unwrap_err();
    assert!(matches!(err, EngineError::Decode { .. }));
}

#[test]
fn deleting_every_entry_of_a_family_removes_it_from_the_sidecar() {
    let dir = tempdir().unwrap();
    let path = make_image_file(&dir);

    let mut image = Image::open(&path).unwrap();
    image.iptc_data().add("Iptc.Application2.Keywords", "fleeting").unwrap();
    image.exif_data().set("Exif.Image.Software", "imagemeta").unwrap();
    image.write_metadata().unwrap();

    image.iptc_data().delete_all("Iptc.Application2.Keywords");
    image.write_metadata().unwrap();

    let mut reopened = Image::open(&path).unwrap();
    reopened.read_metadata().unwrap();
    assert!(reopened.iptc().is_empty());
    assert_eq!(
        reopened.exif().get("Exif.Image.Software"),
        Lookup::Single(TagValue::text("imagemeta"))
    );
}

#[test]
fn mutations_before_write_are_invisible_to_other_handles() {
    let dir = tempdir().unwrap();
    let path = make_image_file(&dir);

    let mut writer = Image::open(&path).unwrap();
    writer.exif_data().set("Exif.Image.Software", "unwritten").unwrap();

    let mut reader = Image::open(&path).unwrap();
    reader.read_metadata().unwrap();
    assert!(reader.exif().is_empty());
}
