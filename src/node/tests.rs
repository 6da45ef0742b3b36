use super::*;

#[test]
fn test_child_nodes_are_linked() {
    let factory = NodeFactory::new();
    let root = factory.root();
    let child = factory.create_child(&root, "word");
    let grandchild = factory.create_child(&child, "document.xml");

    assert_eq!(root.children().len(), 1);
    assert_eq!(root.child("word"), Some(child));
    assert_eq!(root.descend(&["word", "document.xml"]), Some(grandchild));
    assert!(root.descend(&["word", "missing"]).is_none());
}

#[test]
fn test_ids_are_unique_per_factory() {
    let factory = NodeFactory::new();
    let root = factory.root();
    let a = factory.create_child(&root, "a");
    let b = factory.create_child(&root, "b");

    assert_ne!(root.id(), a.id());
    assert_ne!(a.id(), b.id());
}

#[test]
fn test_root_carries_run_iri() {
    let factory = NodeFactory::new();
    let root = factory.root();
    let iri = root.property("iri").unwrap();
    assert!(iri.starts_with("urn:uuid:"));
    assert_eq!(iri, factory.run_iri());
}

#[test]
fn test_classes_deduplicated() {
    let factory = NodeFactory::new();
    let node = factory.root();
    node.add_class("archive");
    node.add_class("archive");
    node.add_class("encrypted");

    assert_eq!(node.classes(), vec!["archive", "encrypted"]);
    assert!(node.has_class("encrypted"));
}

#[test]
fn test_label_if_absent_keeps_first() {
    let factory = NodeFactory::new();
    let node = factory.root();
    node.set_label_if_absent("first");
    node.set_label_if_absent("second");
    assert_eq!(node.label().as_deref(), Some("first"));

    node.set_label("explicit");
    assert_eq!(node.label().as_deref(), Some("explicit"));
}

#[test]
fn test_snapshot_serializes_to_json() {
    let factory = NodeFactory::new();
    let root = factory.root();
    let child = factory.create_child(&root, "image.png");
    child.add_class("image");
    child.set("width", 16);

    let snapshot = root.snapshot();
    assert_eq!(snapshot.count(), 2);

    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: NodeSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, snapshot);
    assert!(json.contains("\"width\""));
}

#[test]
fn test_render_tree_indents_children() {
    let factory = NodeFactory::new();
    let root = factory.root();
    let child = factory.create_child(&root, "a.png");
    child.add_class("image");

    let text = root.snapshot().render_tree();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("<root>"));
    assert!(text.contains("  a.png [image]"));
}
