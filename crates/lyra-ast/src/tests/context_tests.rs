use super::*;
use crate::module_loader::ModuleLoader;
use rustc_hash::FxHashMap;
use std::cell::RefCell as StdRefCell;
use std::rc::Rc;

/// A loader serving a fixed set of modules and their top-level decls.
struct TestLoader {
    modules: FxHashMap<Atom, Vec<(Atom, DeclKind)>>,
}

impl TestLoader {
    fn new() -> TestLoader {
        TestLoader {
            modules: FxHashMap::default(),
        }
    }

    fn with_module(mut self, name: Atom, decls: Vec<(Atom, DeclKind)>) -> TestLoader {
        self.modules.insert(name, decls);
        self
    }
}

impl ModuleLoader for TestLoader {
    fn can_import_module(&self, name: Atom) -> bool {
        self.modules.contains_key(&name)
    }

    fn load_module(&mut self, name: Atom, decls: &mut DeclStore) -> Option<DeclId> {
        let members = self.modules.get(&name)?;
        let module = decls.register(DeclInfo::module(name));
        for &(member_name, kind) in members {
            decls.register(DeclInfo {
                kind,
                name: member_name,
                parent: module,
            });
        }
        Some(module)
    }

    fn collect_visible_top_level_module_names(&self, names: &mut Vec<Atom>) {
        names.extend(self.modules.keys().copied());
    }
}

fn stdlib_loader(ctx: &AstContext) -> TestLoader {
    let stdlib = ctx.intern_identifier("Stdlib");
    let decls = vec![
        (ctx.intern_identifier("Int"), DeclKind::Struct),
        (ctx.intern_identifier("Bool"), DeclKind::Struct),
        (ctx.intern_identifier("Equatable"), DeclKind::Protocol),
        (ctx.intern_identifier("Hashable"), DeclKind::Protocol),
    ];
    TestLoader::new().with_module(stdlib, decls)
}

#[test]
fn test_identifier_interning() {
    let ctx = AstContext::new();

    let a = ctx.intern_identifier("Foo");
    let b = ctx.intern_identifier("Foo");
    let c = ctx.intern_identifier("Bar");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(ctx.identifier_text(a), "Foo");
}

#[test]
fn test_allocate_from_permanent_arena() {
    let ctx = AstContext::new();
    let before = ctx.bytes_allocated(AllocationArena::Permanent);

    let storage = ctx.allocate(64, 8, AllocationArena::Permanent);
    assert_eq!(storage.len(), 64);
    assert_eq!(ctx.bytes_allocated(AllocationArena::Permanent), before + 64);
}

#[test]
#[should_panic(expected = "no active constraint-solver arena")]
fn test_allocate_from_inactive_solver_arena_panics() {
    let ctx = AstContext::new();
    ctx.allocate(8, 8, AllocationArena::ConstraintSolver);
}

#[test]
fn test_module_loading_and_generation() {
    let ctx = AstContext::new();
    let loader = stdlib_loader(&ctx);
    let stdlib = ctx.intern_identifier("Stdlib");
    let missing = ctx.intern_identifier("Missing");
    ctx.add_module_loader(Box::new(loader));

    assert_eq!(ctx.module_generation(), 0);
    assert!(ctx.can_import_module(stdlib));
    assert!(!ctx.can_import_module(missing));

    let module = ctx.load_module(stdlib).expect("stdlib loads");
    assert_eq!(ctx.module_generation(), 1);

    // Loading again is a cache hit, not a reload.
    assert_eq!(ctx.load_module(stdlib), Some(module));
    assert_eq!(ctx.module_generation(), 1);

    assert_eq!(ctx.load_module(missing), None);
    assert_eq!(ctx.visible_module_names(), vec![stdlib]);
}

#[test]
fn test_known_protocol_lookup_heals_after_load() {
    let ctx = AstContext::new();
    let loader = stdlib_loader(&ctx);
    let stdlib = ctx.intern_identifier("Stdlib");
    ctx.add_module_loader(Box::new(loader));

    // Before the stdlib loads, the lookup fails but is not negatively
    // cached.
    assert_eq!(ctx.known_protocol(KnownProtocolKind::Equatable), None);

    ctx.load_module(stdlib).expect("stdlib loads");

    let equatable = ctx
        .known_protocol(KnownProtocolKind::Equatable)
        .expect("resolves after load");
    assert_eq!(ctx.known_protocol(KnownProtocolKind::Equatable), Some(equatable));

    // A kind the stdlib does not define stays unresolved.
    assert_eq!(ctx.known_protocol(KnownProtocolKind::Sequence), None);
}

#[test]
fn test_known_stdlib_type_rejects_wrong_kind() {
    let ctx = AstContext::new();
    let name = ctx.intern_identifier("M");
    // A module defining a *protocol* named Int must not satisfy the Int
    // type lookup.
    let loader = TestLoader::new().with_module(
        name,
        vec![(ctx.intern_identifier("Int"), DeclKind::Protocol)],
    );
    ctx.add_module_loader(Box::new(loader));
    ctx.load_module(name).expect("module loads");

    assert_eq!(ctx.known_stdlib_type(KnownTypeKind::Int), None);
}

#[test]
fn test_default_type_cache_invalidates_by_generation() {
    let ctx = AstContext::new();
    let loader = stdlib_loader(&ctx);
    let stdlib = ctx.intern_identifier("Stdlib");
    ctx.add_module_loader(Box::new(loader));

    assert_eq!(ctx.default_type(KnownTypeKind::Int), None);

    ctx.load_module(stdlib).expect("stdlib loads");
    let int = ctx.default_type(KnownTypeKind::Int).expect("Int resolves");
    assert_eq!(ctx.default_type(KnownTypeKind::Int), Some(int));

    // Another load bumps the generation; the cache rebuilds to the same
    // canonical type.
    let extra = ctx.intern_identifier("Extra");
    let extra_loader = TestLoader::new().with_module(extra, vec![]);
    ctx.add_module_loader(Box::new(extra_loader));
    ctx.load_module(extra).expect("extra loads");
    assert_eq!(ctx.default_type(KnownTypeKind::Int), Some(int));
}

#[test]
fn test_diagnostics_forwarding() {
    let ctx = AstContext::new();
    assert!(!ctx.has_errors());

    ctx.diagnose(Diagnostic::error("main.lyra", 0, 3, "unresolved type", 100));
    assert!(ctx.has_errors());
}

#[test]
fn test_cleanups_run_in_reverse_order() {
    let order: Rc<StdRefCell<Vec<u32>>> = Rc::new(StdRefCell::new(Vec::new()));

    {
        let ctx = AstContext::new();
        let first = Rc::clone(&order);
        ctx.add_cleanup(move || first.borrow_mut().push(1));
        let second = Rc::clone(&order);
        ctx.add_cleanup(move || second.borrow_mut().push(2));
    }

    assert_eq!(*order.borrow(), vec![2, 1]);
}

#[test]
fn test_solver_session_restores_previous_arena() {
    let ctx = AstContext::new();
    let types = ctx.types();

    let outer = ctx.enter_constraint_solver();
    let outer_tv = types.type_variable();
    assert!(types.lookup(outer_tv).is_some());

    {
        let _inner = ctx.enter_constraint_solver();
        let inner_tv = types.type_variable();
        assert!(types.lookup(inner_tv).is_some());
        // The outer session's arena is shadowed while the inner one is
        // active.
        assert_eq!(types.lookup(outer_tv), None);
    }

    // Inner session ended: its arena is gone, the outer one is restored.
    assert!(types.lookup(outer_tv).is_some());
    drop(outer);
    assert_eq!(types.lookup(outer_tv), None);
    assert!(!types.has_constraint_solver_arena());
}

#[test]
fn test_solver_session_discards_solver_bytes() {
    let ctx = AstContext::new();
    let permanent_before = ctx.bytes_allocated(AllocationArena::Permanent);

    {
        let _session = ctx.enter_constraint_solver();
        ctx.types().type_variable();
        assert!(ctx.bytes_allocated(AllocationArena::ConstraintSolver) > 0);
    }

    assert_eq!(ctx.bytes_allocated(AllocationArena::ConstraintSolver), 0);
    assert_eq!(ctx.bytes_allocated(AllocationArena::Permanent), permanent_before);
}
