use fathom::{Engine, EngineConfig, FileEntity, FrameJournal};
use std::fs;
use std::io::{Cursor, Write};
use std::sync::Arc;
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="png" ContentType="image/png"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body><w:p><w:r><w:t>Hello</w:t></w:r></w:p></w:body>
</w:document>"#;

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.extend_from_slice(&13u32.to_be_bytes());
    data.extend_from_slice(b"IHDR");
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[8, 2, 0, 0, 0, 0, 0, 0, 0]);
    data
}

fn docx() -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let parts: [(&str, Vec<u8>); 3] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec()),
        ("word/document.xml", DOCUMENT.as_bytes().to_vec()),
        ("word/media/image1.png", png(640, 480)),
    ];
    for (name, data) in parts {
        writer.start_file(name, options).unwrap();
        writer.write_all(&data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn office_package_inside_zip() {
    let journal = Arc::new(FrameJournal::new());
    let engine = Engine::builder()
        .with_builtins()
        .journal(Arc::clone(&journal))
        .build();

    let analysis = engine
        .analyze(&FileEntity::from_bytes("report.docx", docx()))
        .unwrap();
    let root = analysis.root;

    assert!(analysis.result.failure.is_none());
    assert_eq!(root.label().as_deref(), Some("report.docx"));
    assert_eq!(root.property("mediaType").as_deref(), Some("application/zip"));

    let image = root
        .descend(&["contents", "word", "media", "image1.png"])
        .unwrap();
    assert_eq!(image.property("contentType").as_deref(), Some("image/png"));
    assert_eq!(image.property("mediaType").as_deref(), Some("image/png"));
    assert_eq!(image.property("width").as_deref(), Some("640"));
    assert_eq!(image.property("height").as_deref(), Some("480"));

    let document = root.descend(&["contents", "word", "document.xml"]).unwrap();
    assert_eq!(document.property("rootElement").as_deref(), Some("document"));
    assert_eq!(
        document.property("namespace").as_deref(),
        Some("http://schemas.openxmlformats.org/wordprocessingml/2006/main")
    );

    let records = journal.take();
    assert_eq!(records[0].entity, "directory");
    assert_eq!(records[0].analyzers, vec!["opc-content-types".to_string()]);
    assert!(records.iter().all(|r| !r.entity.contains("report.docx")));
    assert!(records.iter().any(|r| r.entity == "directory media"));
}

#[test]
fn repeated_runs_build_the_same_frames() {
    let journal = Arc::new(FrameJournal::new());
    let engine = Engine::builder()
        .with_builtins()
        .journal(Arc::clone(&journal))
        .build();
    let input = FileEntity::from_bytes("report.docx", docx());

    engine.analyze(&input).unwrap();
    let first = journal.take();
    engine.analyze(&input).unwrap();
    let second = journal.take();

    assert_eq!(first, second);
}

#[test]
fn package_on_disk() {
    let temp = TempDir::new().unwrap();
    let package = temp.path().join("unpacked");
    fs::create_dir_all(package.join("word/media")).unwrap();
    fs::write(package.join("[Content_Types].xml"), CONTENT_TYPES).unwrap();
    fs::write(package.join("word/document.xml"), DOCUMENT).unwrap();
    fs::write(package.join("word/media/image1.png"), png(2, 3)).unwrap();
    fs::write(temp.path().join("report.docx"), docx()).unwrap();

    let analysis = Engine::with_defaults(EngineConfig::default())
        .analyze_path(temp.path())
        .unwrap();
    let root = analysis.root;

    let unpacked = root
        .descend(&["unpacked", "word", "media", "image1.png"])
        .unwrap();
    assert_eq!(unpacked.property("contentType").as_deref(), Some("image/png"));
    assert_eq!(unpacked.property("width").as_deref(), Some("2"));

    let zipped = root
        .descend(&["report.docx", "contents", "word", "media", "image1.png"])
        .unwrap();
    assert_eq!(zipped.property("contentType").as_deref(), Some("image/png"));

    let snapshot = root.snapshot();
    let json = serde_json::to_value(&snapshot).unwrap();
    assert!(json["children"].as_array().is_some_and(|c| c.len() == 2));
}
