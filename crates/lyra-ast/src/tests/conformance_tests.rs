use super::*;
use crate::types::{ConformanceId, SubstitutionMap, TypeId};

#[test]
fn test_normal_interning_deduplicates() {
    let mut table = ConformanceTable::new();
    let ty = TypeId(100);
    let protocol = DeclId(1);
    let context = DeclId(2);

    let (a, bytes_a) = table.intern_normal(ty, protocol, context);
    let (b, bytes_b) = table.intern_normal(ty, protocol, context);

    assert_eq!(a, b);
    assert!(bytes_a > 0);
    assert_eq!(bytes_b, 0);
    assert_eq!(table.len(), 1);
}

#[test]
fn test_normal_keyed_by_context() {
    let mut table = ConformanceTable::new();
    let ty = TypeId(100);
    let protocol = DeclId(1);

    let (in_nominal, _) = table.intern_normal(ty, protocol, DeclId(2));
    let (in_extension, _) = table.intern_normal(ty, protocol, DeclId(3));

    assert_ne!(in_nominal, in_extension);
}

#[test]
fn test_self_conformance_direct_map() {
    let mut table = ConformanceTable::new();

    let (a, _) = table.intern_self(DeclId(1));
    let (b, _) = table.intern_self(DeclId(1));
    let (other, _) = table.intern_self(DeclId(2));

    assert_eq!(a, b);
    assert_ne!(a, other);
}

#[test]
fn test_specialized_keyed_by_substitutions() {
    let mut table = ConformanceTable::new();
    let ty = TypeId(100);
    let underlying = ConformanceId(0);

    let (a, _) = table.intern_specialized(ty, underlying, SubstitutionMap::EMPTY);
    let (b, _) = table.intern_specialized(ty, underlying, SubstitutionMap::EMPTY);
    assert_eq!(a, b);
}

#[test]
fn test_conformance_ref_predicates() {
    assert!(ConformanceRef::Invalid.is_invalid());
    assert!(ConformanceRef::Abstract(DeclId(1)).is_abstract());
    assert!(ConformanceRef::Concrete(ConformanceId(0)).is_concrete());
    assert!(!ConformanceRef::Invalid.is_concrete());
}
