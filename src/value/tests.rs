use super::*;

const SHAPE: ValueKind = ValueKind::new("shape");
const POLYGON: ValueKind = ValueKind::new("polygon");
const SQUARE: ValueKind = ValueKind::new("square");
const COLORED: ValueKind = ValueKind::new("colored");

fn shapes() -> KindHierarchy {
    let mut hierarchy = KindHierarchy::new();
    hierarchy
        .declare(POLYGON, &[SHAPE])
        .declare(SQUARE, &[POLYGON, COLORED]);
    hierarchy
}

#[derive(Debug)]
struct Square;

impl Value for Square {
    fn kind(&self) -> ValueKind {
        SQUARE
    }
}

#[test]
fn test_ancestors_nearest_first() {
    let hierarchy = shapes();
    assert_eq!(hierarchy.ancestors(SQUARE), vec![POLYGON, COLORED, SHAPE]);
    assert!(hierarchy.ancestors(SHAPE).is_empty());
}

#[test]
fn test_assignability() {
    let hierarchy = shapes();
    assert!(hierarchy.is_assignable(SHAPE, SQUARE));
    assert!(hierarchy.is_assignable(SQUARE, SQUARE));
    assert!(hierarchy.is_assignable(COLORED, SQUARE));
    assert!(!hierarchy.is_assignable(SQUARE, SHAPE));
    assert!(!hierarchy.is_assignable(COLORED, POLYGON));
}

#[test]
fn test_any_is_top() {
    let hierarchy = KindHierarchy::new();
    assert!(hierarchy.is_assignable(kinds::ANY, SQUARE));
    assert!(hierarchy.is_strict_ancestor(kinds::ANY, kinds::FILE));
    assert!(!hierarchy.is_strict_ancestor(kinds::ANY, kinds::ANY));
}

#[test]
fn test_cyclic_declaration_terminates() {
    let mut hierarchy = KindHierarchy::new();
    hierarchy.declare(SHAPE, &[POLYGON]).declare(POLYGON, &[SHAPE]);
    assert_eq!(hierarchy.ancestors(SHAPE), vec![POLYGON]);
}

#[test]
fn test_builtin_hierarchy() {
    let hierarchy = KindHierarchy::builtin();
    assert!(hierarchy.is_assignable(kinds::ENTITY, kinds::FILE));
    assert!(hierarchy.is_assignable(kinds::IMAGE, kinds::PNG_IMAGE));
    assert!(hierarchy.is_assignable(kinds::ARCHIVE, kinds::ZIP_ARCHIVE));
    assert!(!hierarchy.is_assignable(kinds::FILE, kinds::DIRECTORY));
}

#[test]
fn test_downcast_through_dyn_value() {
    let boxed: Box<dyn Value> = Box::new(Square);
    assert!(boxed.is::<Square>());
    assert!(boxed.downcast_ref::<Square>().is_some());
    assert_eq!(boxed.kind(), SQUARE);
}

fn as_square<'a>(value: &'a dyn Value) -> Option<&'a Square> {
    value.downcast_ref::<Square>()
}

#[test]
fn test_downcast_borrowed_value() {
    let square = Square;
    let values: Vec<&dyn Value> = vec![&square];

    assert!(values[0].is::<Square>());
    assert!(as_square(values[0]).is_some());
}
