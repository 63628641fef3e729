use super::*;
use crate::conformance::ConformanceRef;
use crate::generics::GenericParamKey;
use crate::intern::TypeInterner;
use lyra_common::limits::REGION_CHUNK_SIZE;

fn create_test_interner() -> TypeInterner {
    TypeInterner::new(REGION_CHUNK_SIZE)
}

#[test]
fn test_normal_conformance_deduplication() {
    let interner = create_test_interner();
    let ty = interner.nominal(DeclId(1), None);
    let protocol = DeclId(10);
    let context = DeclId(1);

    let a = interner.normal_conformance(ty, protocol, context);
    let b = interner.normal_conformance(ty, protocol, context);
    assert_eq!(a, b);
    assert!(!a.in_constraint_solver());

    // The same conformance declared in an extension is a distinct record.
    let in_extension = interner.normal_conformance(ty, protocol, DeclId(20));
    assert_ne!(a, in_extension);
}

#[test]
fn test_self_conformance_uniqueness() {
    let interner = create_test_interner();

    let a = interner.self_conformance(DeclId(10));
    let b = interner.self_conformance(DeclId(10));
    let other = interner.self_conformance(DeclId(11));

    assert_eq!(a, b);
    assert_ne!(a, other);
}

#[test]
fn test_specialized_collapse_on_identity() {
    let interner = create_test_interner();
    let ty = interner.nominal(DeclId(1), None);
    let normal = interner.normal_conformance(ty, DeclId(10), DeclId(1));

    // Signature-less substitution map.
    let collapsed = interner.specialized_conformance(ty, normal, SubstitutionMap::EMPTY);
    assert_eq!(collapsed, normal);

    // Identity substitution whose conformances are all abstract.
    let sig = interner.generic_signature(vec![GenericParamKey::new(0, 0)], vec![]);
    let identity = interner.substitution_map(
        Some(sig),
        vec![interner.generic_param(0, 0)],
        vec![ConformanceRef::Abstract(DeclId(10))],
    );
    let collapsed = interner.specialized_conformance(ty, normal, identity);
    assert_eq!(collapsed, normal);
}

#[test]
fn test_specialized_collapse_through_wrapper_chains() {
    let interner = create_test_interner();
    let generic_ty = interner.nominal(DeclId(1), None);
    let concrete_ty = interner.nominal(DeclId(2), None);
    let normal = interner.normal_conformance(generic_ty, DeclId(10), DeclId(1));

    let sig = interner.generic_signature(vec![GenericParamKey::new(0, 0)], vec![]);
    let subs = interner.substitution_map(
        Some(sig),
        vec![concrete_ty],
        vec![ConformanceRef::Concrete(normal)],
    );

    // A genuine specialization allocates a wrapper...
    let specialized = interner.specialized_conformance(concrete_ty, normal, subs);
    assert_ne!(specialized, normal);

    // ...and substituting back to the root's own type collapses through
    // the wrapper chain instead of growing it.
    let round_trip =
        interner.specialized_conformance(generic_ty, specialized, SubstitutionMap::EMPTY);
    assert_eq!(round_trip, normal);
}

#[test]
fn test_specialized_deduplication() {
    let interner = create_test_interner();
    let generic_ty = interner.nominal(DeclId(1), None);
    let concrete_ty = interner.nominal(DeclId(2), None);
    let normal = interner.normal_conformance(generic_ty, DeclId(10), DeclId(1));

    let a = interner.specialized_conformance(concrete_ty, normal, SubstitutionMap::EMPTY);
    let b = interner.specialized_conformance(concrete_ty, normal, SubstitutionMap::EMPTY);
    assert_eq!(a, b);
}

#[test]
fn test_inherited_conformance_deduplication() {
    let interner = create_test_interner();
    let base_ty = interner.nominal(DeclId(1), None);
    let derived_ty = interner.nominal(DeclId(2), None);
    let base_conf = interner.normal_conformance(base_ty, DeclId(10), DeclId(1));

    let a = interner.inherited_conformance(derived_ty, base_conf);
    let b = interner.inherited_conformance(derived_ty, base_conf);
    assert_eq!(a, b);
    assert_ne!(a, base_conf);
}

#[test]
fn test_witness_table_fills_in_later() {
    let interner = create_test_interner();
    let ty = interner.nominal(DeclId(1), None);
    let int = interner.nominal(DeclId(2), None);
    let conformance = interner.normal_conformance(ty, DeclId(10), DeclId(1));

    let requirement = Atom(5);
    assert_eq!(interner.witness(conformance, requirement), None);

    interner.set_witness(conformance, requirement, int);
    assert_eq!(interner.witness(conformance, requirement), Some(int));
}

#[test]
#[should_panic(expected = "witness for requirement already recorded")]
fn test_double_witness_recording_panics() {
    let interner = create_test_interner();
    let ty = interner.nominal(DeclId(1), None);
    let int = interner.nominal(DeclId(2), None);
    let conformance = interner.normal_conformance(ty, DeclId(10), DeclId(1));

    interner.set_witness(conformance, Atom(5), int);
    interner.set_witness(conformance, Atom(5), int);
}

#[test]
#[should_panic(expected = "witnesses can only be recorded on normal conformances")]
fn test_witness_on_self_conformance_panics() {
    let interner = create_test_interner();
    let conformance = interner.self_conformance(DeclId(10));
    let int = interner.nominal(DeclId(2), None);
    interner.set_witness(conformance, Atom(5), int);
}
