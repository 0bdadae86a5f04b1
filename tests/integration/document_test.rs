use std::fs;

use chrono::Local;
use hwreport::core::document::{Align, Block, DocumentBuilder, ImageSource, PageSize};
use tempfile::TempDir;

fn png_file(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("chart.png");
    image::RgbImage::from_pixel(120, 80, image::Rgb([30, 90, 200]))
        .save(&path)
        .unwrap();
    path
}

#[test]
fn test_build_writes_exactly_one_file() {
    let out = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let chart = png_file(&scratch);

    let builder = DocumentBuilder::create_template(&Local::now(), PageSize::A4, out.path());
    let expected = builder.output_path().to_path_buf();
    let blocks = vec![
        DocumentBuilder::format_text("COMPUTER HARDWARE REPORT\nDate: 01/08/2022"),
        builder.format_image(&chart),
        DocumentBuilder::page_break(),
        DocumentBuilder::format_table(vec![
            vec!["Device".into(), "Mount".into()],
            vec!["/dev/sda1".into(), "/".into()],
        ]),
        DocumentBuilder::unformatted_table(vec![vec!["eth0:".into(), "".into(), "".into()]]),
    ];

    let path = builder.build(blocks).unwrap();

    assert_eq!(path, expected);
    let entries: Vec<_> = fs::read_dir(out.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("Hardware_Report_") && name.ends_with(".pdf"));
    assert!(fs::read(&path).unwrap().starts_with(b"%PDF"));
}

#[test]
fn test_logo_bytes_left_aligned() {
    let out = TempDir::new().unwrap();
    let mut logo = Vec::new();
    image::RgbImage::new(40, 10)
        .write_to(
            &mut std::io::Cursor::new(&mut logo),
            image::ImageOutputFormat::Png,
        )
        .unwrap();

    let builder = DocumentBuilder::create_template(&Local::now(), PageSize::A4, out.path());
    let block = builder.format_image_with(ImageSource::Bytes(logo), Align::Left, 50.8, 12.7);
    assert!(block.is_image());

    assert!(builder.build(vec![block]).is_ok());
}

#[test]
fn test_undecodable_image_fails_without_output() {
    let out = TempDir::new().unwrap();
    let builder = DocumentBuilder::create_template(&Local::now(), PageSize::A4, out.path());
    let block = builder.format_image_with(
        ImageSource::Bytes(b"not an image".to_vec()),
        Align::Center,
        50.0,
        20.0,
    );

    assert!(builder.build(vec![block]).is_err());
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_empty_document_builds() {
    let out = TempDir::new().unwrap();
    let builder = DocumentBuilder::create_template(&Local::now(), PageSize::A4, out.path());
    let path = builder.build(Vec::<Block>::new()).unwrap();
    assert!(path.exists());
}

#[cfg(unix)]
#[test]
fn test_report_is_readable_like_other_files() {
    use std::os::unix::fs::PermissionsExt;

    let out = TempDir::new().unwrap();
    let control = out.path().join("notes.txt");
    fs::write(&control, b"control").unwrap();

    let builder = DocumentBuilder::create_template(&Local::now(), PageSize::A4, out.path());
    let path = builder
        .build(vec![DocumentBuilder::format_text("COMPUTER HARDWARE REPORT")])
        .unwrap();

    let mode = |p: &std::path::Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
    let (pdf, plain) = (mode(&path), mode(&control));
    assert_eq!(pdf & 0o044, plain & 0o044, "pdf {:o}, plain {:o}", pdf, plain);
    assert_ne!(pdf & 0o400, 0);
}
