use super::*;
use crate::analyzer::TypedAnalyzer;
use crate::builtin::PngImage;
use crate::entity::FileEntity;
use crate::error::ErrorPolicy;
use crate::race::DEFAULT_RACE_CAPACITY;
use crate::test_support::{png_bytes, zip_bytes};
use crate::value::kinds;
use std::fs;
use tempfile::TempDir;

// ============================================
// Configuration
// ============================================

#[test]
fn test_config_defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.max_depth, 32);
    assert_eq!(config.race_capacity, DEFAULT_RACE_CAPACITY);
    assert_eq!(config.error_policy, ErrorPolicy::Contain);
    assert_eq!(config.archive_limits.max_entry_size, 50 * 1024 * 1024);
    assert_eq!(config.archive_limits.max_total_size, 500 * 1024 * 1024);
}

#[test]
fn test_config_builder() {
    let config = EngineConfig::builder()
        .max_depth(4)
        .race_capacity(0)
        .error_policy(ErrorPolicy::Propagate)
        .max_entry_size(10)
        .max_total_size(20)
        .build();

    assert_eq!(config.max_depth, 4);
    assert_eq!(config.race_capacity, 1);
    assert_eq!(config.error_policy, ErrorPolicy::Propagate);
    assert_eq!(
        config.archive_limits,
        ArchiveLimits {
            max_entry_size: 10,
            max_total_size: 20,
        }
    );
}

// ============================================
// Building
// ============================================

#[test]
fn test_empty_builder_has_only_xml_sniffing() {
    let engine = Engine::builder().build();

    assert!(engine.analyzers().is_empty());
    assert!(engine.provider_names().is_empty());
    let media: Vec<&str> = engine.formats().formats().map(|f| f.media_type()).collect();
    assert_eq!(media, vec!["application/xml"]);
}

#[test]
fn test_explicit_analyzer_precedes_builtin_of_same_kind() {
    let mut builder = Engine::builder().with_builtins();
    builder.register_analyzer(TypedAnalyzer::new(
        "thumbnail",
        kinds::PNG_IMAGE,
        |image: &PngImage, ctx: &AnalysisContext, _dispatch: &dyn Dispatch| {
            ctx.node().set("pixels", image.width * image.height);
            Ok(AnalysisResult::claimed(ctx.node().clone()))
        },
    ));
    let engine = builder.build();

    let names = engine.analyzers().names();
    let thumbnail = names.iter().position(|n| *n == "thumbnail").unwrap();
    let png = names.iter().position(|n| *n == "png").unwrap();
    assert!(thumbnail < png);

    let root = engine
        .analyze(&FileEntity::from_bytes("a.png", png_bytes(4, 5)))
        .unwrap()
        .root;
    assert_eq!(root.property("pixels").as_deref(), Some("20"));
    assert!(!root.has_class("image"));
}

#[test]
fn test_supertype_analyzer_runs_after_declining_specific_one() {
    let mut builder = Engine::builder().with_builtins();
    builder.register_analyzer(TypedAnalyzer::new(
        "any-image",
        kinds::IMAGE,
        |_image: &PngImage, ctx: &AnalysisContext, _dispatch: &dyn Dispatch| {
            ctx.node().add_class("generic-image");
            Ok(AnalysisResult::claimed(ctx.node().clone()))
        },
    ));
    let engine = builder.build();

    let names = engine.analyzers().names();
    let generic = names.iter().position(|n| *n == "any-image").unwrap();
    let png = names.iter().position(|n| *n == "png").unwrap();
    assert!(png < generic);

    // the specific analyzer claims first
    let root = engine
        .analyze(&FileEntity::from_bytes("a.png", png_bytes(1, 1)))
        .unwrap()
        .root;
    assert!(root.has_class("image"));
    assert!(!root.has_class("generic-image"));
}

#[test]
fn test_debug_lists_collaborators() {
    let engine = Engine::with_defaults(EngineConfig::default());
    let debug = format!("{:?}", engine);
    assert!(debug.contains("opc"));
    assert!(debug.contains("fallback"));
}

// ============================================
// Recursion
// ============================================

#[test]
fn test_nested_archives_respect_depth_limit() {
    let inner = zip_bytes(&[("deep.txt", b"deep")]);
    let outer = zip_bytes(&[("inner.zip", &inner)]);

    let unlimited = Engine::with_defaults(EngineConfig::default())
        .analyze(&FileEntity::from_bytes("outer.zip", outer.clone()))
        .unwrap();
    let deep = unlimited
        .root
        .descend(&["contents", "inner.zip", "contents", "deep.txt"])
        .unwrap();
    assert!(deep.has_class("text"));

    // outer.zip 0, contents 1, inner.zip 2, contents 3
    let config = EngineConfig::builder().max_depth(2).build();
    let limited = Engine::with_defaults(config)
        .analyze(&FileEntity::from_bytes("outer.zip", outer))
        .unwrap();
    let contents = limited
        .root
        .descend(&["contents", "inner.zip", "contents"])
        .unwrap();
    assert!(contents.has_class("depth-limit"));
    assert!(contents.children().is_empty());

    let inner = limited.root.descend(&["contents", "inner.zip"]).unwrap();
    assert!(inner.has_class("depth-limit"));
    assert!(limited.root.has_class("incomplete"));
}

#[test]
fn test_journal_records_package_frames() {
    let journal = Arc::new(FrameJournal::new());
    let engine = Engine::builder()
        .with_builtins()
        .journal(Arc::clone(&journal))
        .build();
    let data = zip_bytes(&[
        ("[Content_Types].xml", crate::test_support::CONTENT_TYPES.as_bytes()),
        ("word/document.xml", b"<document/>"),
    ]);
    engine
        .analyze(&FileEntity::from_bytes("report.docx", data))
        .unwrap();

    let records = journal.take();
    assert_eq!(records[0].entity, "directory");
    assert_eq!(records[0].depth, 1);
    assert_eq!(records[0].analyzers, vec!["opc-content-types".to_string()]);
    assert!(records.iter().all(|r| !r.entity.starts_with("file")));
}

// ============================================
// Paths
// ============================================

#[test]
fn test_analyze_path_directory() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("img")).unwrap();
    fs::write(temp.path().join("img/dot.png"), png_bytes(1, 1)).unwrap();
    fs::write(temp.path().join("readme.md"), "# hi\n").unwrap();

    let analysis = Engine::with_defaults(EngineConfig::default())
        .analyze_path(temp.path())
        .unwrap();

    assert!(analysis.root.has_class("directory"));
    let dot = analysis.root.descend(&["img", "dot.png"]).unwrap();
    assert_eq!(dot.property("mediaType").as_deref(), Some("image/png"));
    let readme = analysis.root.child("readme.md").unwrap();
    assert_eq!(readme.property("language").as_deref(), Some("markdown"));
    assert!(readme.property("modified").is_some());
}

#[test]
fn test_analyze_path_missing() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope");

    let err = Engine::with_defaults(EngineConfig::default())
        .analyze_path(&missing)
        .unwrap_err();
    assert!(matches!(err, EngineError::Source { .. }));
    assert!(err.to_string().contains("nope"));
}
