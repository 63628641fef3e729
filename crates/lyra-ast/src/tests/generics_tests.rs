use super::*;
use crate::types::{GenericSignatureId, TypeId};

#[test]
fn test_signature_table_deduplicates() {
    let mut table = SignatureTable::new();
    let params = vec![GenericParamKey::new(0, 0)];

    let (a, bytes_a) = table.intern(params.clone(), vec![]);
    let (b, bytes_b) = table.intern(params, vec![]);

    assert_eq!(a, b);
    assert!(bytes_a > 0);
    assert_eq!(bytes_b, 0);
    assert_eq!(table.len(), 1);
}

#[test]
fn test_signature_table_distinguishes_requirements() {
    let mut table = SignatureTable::new();
    let params = vec![GenericParamKey::new(0, 0)];
    let requirement = Requirement::conformance(TypeId(100), TypeId(200));

    let (bare, _) = table.intern(params.clone(), vec![]);
    let (constrained, _) = table.intern(params, vec![requirement]);

    assert_ne!(bare, constrained);
    assert_eq!(table.len(), 2);
}

#[test]
fn test_mark_canonical_stamps_in_place() {
    let mut table = SignatureTable::new();
    let (index, _) = table.intern(vec![GenericParamKey::new(0, 0)], vec![]);
    assert!(!table.get(index).expect("record exists").is_canonical);

    table.mark_canonical(index);
    assert!(table.get(index).expect("record exists").is_canonical);

    // No reinsertion: interning the same key again returns the stamped record.
    let (again, bytes) = table.intern(vec![GenericParamKey::new(0, 0)], vec![]);
    assert_eq!(again, index);
    assert_eq!(bytes, 0);
    assert!(table.get(again).expect("record exists").is_canonical);
}

#[test]
fn test_substitution_table_keys_by_profile() {
    let mut table = SubstitutionTable::new();
    let signature = GenericSignatureId(0);

    // Two storages whose profiles agree (the only position is
    // non-canonical) intern to the same record even though their actual
    // replacement types differ.
    let profile: SubstitutionProfile = (signature, vec![None], vec![]);
    let (a, bytes_a) = table.intern(
        profile.clone(),
        SubstitutionMapData {
            signature,
            replacements: vec![TypeId(100)],
            conformances: vec![],
        },
    );
    let (b, bytes_b) = table.intern(
        profile,
        SubstitutionMapData {
            signature,
            replacements: vec![TypeId(200)],
            conformances: vec![],
        },
    );

    assert_eq!(a, b);
    assert!(bytes_a > 0);
    assert_eq!(bytes_b, 0);
    assert_eq!(table.len(), 1);

    // The first storage is the canonical representative.
    assert_eq!(
        table.get(a).expect("record exists").replacements,
        vec![TypeId(100)]
    );
}

#[test]
fn test_substitution_table_distinguishes_canonical_positions() {
    let mut table = SubstitutionTable::new();
    let signature = GenericSignatureId(0);

    let (a, _) = table.intern(
        (signature, vec![Some(TypeId(100))], vec![]),
        SubstitutionMapData {
            signature,
            replacements: vec![TypeId(100)],
            conformances: vec![],
        },
    );
    let (b, _) = table.intern(
        (signature, vec![Some(TypeId(200))], vec![]),
        SubstitutionMapData {
            signature,
            replacements: vec![TypeId(200)],
            conformances: vec![],
        },
    );

    assert_ne!(a, b);
    assert_eq!(table.len(), 2);
}
