use super::*;

#[test]
fn test_fold_unions_child_bits() {
    let a = RecursiveTypeProperties::HAS_ERROR;
    let b = RecursiveTypeProperties::HAS_TYPE_VARIABLE;
    let folded = RecursiveTypeProperties::fold([a, b]);
    assert!(folded.has_error());
    assert!(folded.has_type_variable());
}

#[test]
fn test_fold_does_not_propagate_lvalue() {
    let child = RecursiveTypeProperties::IS_LVALUE | RecursiveTypeProperties::HAS_ARCHETYPE;
    let folded = RecursiveTypeProperties::fold([child]);
    assert!(!folded.is_lvalue());
    assert!(folded.has_archetype());
}

#[test]
fn test_fold_empty_is_empty() {
    let folded = RecursiveTypeProperties::fold(std::iter::empty());
    assert_eq!(folded, RecursiveTypeProperties::empty());
}

#[test]
fn test_select_permanent_by_default() {
    assert_eq!(
        AllocationArena::select(RecursiveTypeProperties::empty()),
        AllocationArena::Permanent
    );
    assert_eq!(
        AllocationArena::select(RecursiveTypeProperties::HAS_ERROR),
        AllocationArena::Permanent
    );
    assert_eq!(
        AllocationArena::select(RecursiveTypeProperties::HAS_ARCHETYPE),
        AllocationArena::Permanent
    );
}

#[test]
fn test_select_solver_for_type_variables() {
    assert_eq!(
        AllocationArena::select(RecursiveTypeProperties::HAS_TYPE_VARIABLE),
        AllocationArena::ConstraintSolver
    );
    let mixed = RecursiveTypeProperties::HAS_TYPE_VARIABLE | RecursiveTypeProperties::HAS_ERROR;
    assert_eq!(
        AllocationArena::select(mixed),
        AllocationArena::ConstraintSolver
    );
}
