use super::*;
use lyra_common::interner::Interner;

#[test]
fn test_decl_id_validity() {
    assert!(!DeclId::INVALID.is_valid());
    assert!(DeclId(1).is_valid());
    assert!(DeclId(100).is_valid());
}

#[test]
fn test_register_and_lookup() {
    let mut interner = Interner::new();
    let mut store = DeclStore::new();

    let module_name = interner.intern("Stdlib");
    let module = store.register(DeclInfo::module(module_name));
    assert!(module.is_valid());
    assert!(store.contains(module));

    let int_name = interner.intern("Int");
    let int_decl = store.register(DeclInfo::nominal(DeclKind::Struct, int_name, module));

    assert_eq!(store.lookup(module, int_name), Some(int_decl));
    assert_eq!(store.get(int_decl).map(|info| info.kind), Some(DeclKind::Struct));
}

#[test]
fn test_lookup_misses_return_none() {
    let mut interner = Interner::new();
    let store = DeclStore::new();
    let _ = interner.intern("Nope");
    assert_eq!(store.lookup(DeclId(1), Atom(5)), None);
    assert_eq!(store.get(DeclId::INVALID), None);
}

#[test]
fn test_first_registration_wins() {
    let mut interner = Interner::new();
    let mut store = DeclStore::new();

    let module = store.register(DeclInfo::module(interner.intern("M")));
    let name = interner.intern("Foo");
    let first = store.register(DeclInfo::nominal(DeclKind::Struct, name, module));
    let _second = store.register(DeclInfo::nominal(DeclKind::Enum, name, module));

    assert_eq!(store.lookup(module, name), Some(first));
}

#[test]
fn test_known_protocol_registry_is_dense() {
    for (position, kind) in KnownProtocolKind::ALL.iter().enumerate() {
        assert_eq!(kind.cache_index(), position);
        assert!(!kind.name().is_empty());
    }
}

#[test]
fn test_known_type_registry_is_dense() {
    for (position, kind) in KnownTypeKind::ALL.iter().enumerate() {
        assert_eq!(kind.cache_index(), position);
        assert!(!kind.name().is_empty());
    }
}

#[test]
fn test_nominal_kinds() {
    assert!(DeclKind::Struct.is_nominal());
    assert!(DeclKind::Protocol.is_nominal());
    assert!(!DeclKind::Module.is_nominal());
    assert!(!DeclKind::TypeAlias.is_nominal());
}
