//! The AST context: the process-wide owner of every type, declaration,
//! conformance, and generic signature of one compilation.
//!
//! The context is singleton-like but not a global: it is created once per
//! compilation unit, passed explicitly by the driver, and destroyed once,
//! running registered cleanup callbacks first. All state is reachable only
//! through the context instance, so a host wanting concurrent compilations
//! creates one context per thread.
//!
//! The facade delegates downward only: allocation goes to the arenas,
//! interning to the per-arena tables, declaration lookups to the store and
//! the registered module loaders. Nothing below it calls back up.

use crate::arena::RegionRef;
use crate::decls::{DeclId, DeclInfo, DeclKind, DeclStore, KnownProtocolKind, KnownTypeKind};
use crate::intern::{ArenaTables, TypeInterner};
use crate::module_loader::ModuleLoader;
use crate::properties::AllocationArena;
use crate::types::TypeId;
use indexmap::IndexMap;
use lyra_common::diagnostics::{Diagnostic, DiagnosticHandler};
use lyra_common::interner::{Atom, Interner};
use lyra_common::limits::REGION_CHUNK_SIZE;
use rustc_hash::FxHashMap;
use std::cell::{Cell, RefCell};
use tracing::{debug, debug_span};

/// Construction-time configuration for a context. No hidden statics: a
/// host builds one of these once and passes it in.
#[derive(Clone, Debug)]
pub struct ContextOptions {
    /// Chunk size for the arenas' region allocators.
    pub region_chunk_size: usize,
    /// Pre-intern common keywords and identifiers at startup.
    pub preintern_common_identifiers: bool,
}

impl Default for ContextOptions {
    fn default() -> ContextOptions {
        ContextOptions {
            region_chunk_size: REGION_CHUNK_SIZE,
            preintern_common_identifiers: true,
        }
    }
}

/// Generation-invalidated cache for default type requests: new module
/// loads can change the answers, so the cache self-clears when the module
/// generation moves.
#[derive(Default)]
struct DefaultTypeCache {
    generation: u32,
    entries: FxHashMap<KnownTypeKind, TypeId>,
}

/// The AST context facade.
pub struct AstContext {
    options: ContextOptions,
    identifiers: RefCell<Interner>,
    types: TypeInterner,
    decls: RefCell<DeclStore>,
    loaders: RefCell<Vec<Box<dyn ModuleLoader>>>,
    /// Loaded modules in load order; iteration order matters for known
    /// declaration lookups.
    loaded_modules: RefCell<IndexMap<Atom, DeclId>>,
    /// Bumped on every successful module load.
    module_generation: Cell<u32>,
    /// Cached successful known-protocol resolutions. A failed lookup is
    /// not negatively cached: it is retried once more modules have loaded.
    known_protocols: RefCell<Vec<Option<DeclId>>>,
    known_types: RefCell<Vec<Option<DeclId>>>,
    default_types: RefCell<DefaultTypeCache>,
    diagnostics: RefCell<DiagnosticHandler>,
    cleanups: RefCell<Vec<Box<dyn FnOnce()>>>,
    /// Generation counter for constraint-solver sessions; lets stale
    /// solver handles resolve to nothing after their session ends.
    solver_generation: Cell<u16>,
}

impl AstContext {
    pub fn new() -> AstContext {
        AstContext::with_options(ContextOptions::default())
    }

    pub fn with_options(options: ContextOptions) -> AstContext {
        let span = debug_span!("ast_context_new");
        let _guard = span.enter();

        let mut identifiers = Interner::new();
        if options.preintern_common_identifiers {
            identifiers.intern_common();
        }

        let types = TypeInterner::new(options.region_chunk_size);
        debug!("created AST context");

        AstContext {
            types,
            identifiers: RefCell::new(identifiers),
            decls: RefCell::new(DeclStore::new()),
            loaders: RefCell::new(Vec::new()),
            loaded_modules: RefCell::new(IndexMap::new()),
            module_generation: Cell::new(0),
            known_protocols: RefCell::new(vec![None; KnownProtocolKind::ALL.len()]),
            known_types: RefCell::new(vec![None; KnownTypeKind::ALL.len()]),
            default_types: RefCell::new(DefaultTypeCache::default()),
            diagnostics: RefCell::new(DiagnosticHandler::new()),
            cleanups: RefCell::new(Vec::new()),
            solver_generation: Cell::new(0),
            options,
        }
    }

    /// The type interner: canonical type factories, conformance and
    /// generic-signature tables.
    #[inline]
    pub fn types(&self) -> &TypeInterner {
        &self.types
    }

    // =========================================================================
    // Raw allocation
    // =========================================================================

    /// Allocate raw storage from the given arena. Never fails softly; see
    /// the region allocator's abort policy.
    pub fn allocate(&self, size: usize, align: usize, arena: AllocationArena) -> RegionRef {
        self.types.allocate_raw(arena, size, align)
    }

    /// Bytes allocated by one arena, for memory-usage reporting.
    pub fn bytes_allocated(&self, arena: AllocationArena) -> usize {
        self.types.bytes_allocated(arena)
    }

    // =========================================================================
    // Identifiers
    // =========================================================================

    /// Intern an identifier. Atom equality afterward is string equality.
    pub fn intern_identifier(&self, text: &str) -> Atom {
        self.identifiers.borrow_mut().intern(text)
    }

    /// Resolve an identifier back to its text.
    pub fn identifier_text(&self, atom: Atom) -> String {
        self.identifiers.borrow().resolve(atom).to_string()
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// Register a declaration.
    pub fn register_decl(&self, info: DeclInfo) -> DeclId {
        self.decls.borrow_mut().register(info)
    }

    /// Clone out a declaration record.
    pub fn decl(&self, id: DeclId) -> Option<DeclInfo> {
        self.decls.borrow().get(id).cloned()
    }

    /// Look up a top-level declaration by module and name.
    pub fn lookup_decl(&self, module: DeclId, name: Atom) -> Option<DeclId> {
        self.decls.borrow().lookup(module, name)
    }

    // =========================================================================
    // Module loading
    // =========================================================================

    /// Register a module loader. Loaders are consulted in registration
    /// order.
    pub fn add_module_loader(&self, loader: Box<dyn ModuleLoader>) {
        self.loaders.borrow_mut().push(loader);
    }

    /// Load the module named `name`, or return it if already loaded.
    ///
    /// A successful load bumps the module generation, invalidating the
    /// default-type request caches.
    pub fn load_module(&self, name: Atom) -> Option<DeclId> {
        if let Some(&module) = self.loaded_modules.borrow().get(&name) {
            return Some(module);
        }

        let mut loaders = self.loaders.borrow_mut();
        for loader in loaders.iter_mut() {
            let loaded = loader.load_module(name, &mut self.decls.borrow_mut());
            if let Some(module) = loaded {
                self.loaded_modules.borrow_mut().insert(name, module);
                self.module_generation
                    .set(self.module_generation.get() + 1);
                debug!(module = ?name, "loaded module");
                return Some(module);
            }
        }
        None
    }

    /// Whether any registered loader could satisfy an import of `name`.
    pub fn can_import_module(&self, name: Atom) -> bool {
        self.loaders
            .borrow()
            .iter()
            .any(|loader| loader.can_import_module(name))
    }

    /// Ask every loader for extensions of `nominal`.
    pub fn load_extensions(&self, nominal: DeclId) {
        let mut loaders = self.loaders.borrow_mut();
        for loader in loaders.iter_mut() {
            loader.load_extensions(nominal, &mut self.decls.borrow_mut());
        }
    }

    /// Names of every top-level module visible to the registered loaders,
    /// sorted and deduplicated.
    pub fn visible_module_names(&self) -> Vec<Atom> {
        let mut names: Vec<Atom> = self.loaded_modules.borrow().keys().copied().collect();
        for loader in self.loaders.borrow().iter() {
            loader.collect_visible_top_level_module_names(&mut names);
        }
        names.sort();
        names.dedup();
        names
    }

    /// Current module generation, bumped per successful load.
    pub fn module_generation(&self) -> u32 {
        self.module_generation.get()
    }

    // =========================================================================
    // Known declarations
    // =========================================================================

    /// Resolve a known protocol, consulting loaded modules in load order.
    ///
    /// Cached once found, not once attempted: a successful resolution is
    /// never re-run, a failed one is retried on the next call (so lookups
    /// made before the standard library loads heal themselves).
    pub fn known_protocol(&self, kind: KnownProtocolKind) -> Option<DeclId> {
        let slot = kind.cache_index();
        if let Some(decl) = self.known_protocols.borrow()[slot] {
            return Some(decl);
        }

        let found = self.find_known_decl(kind.name(), |k| k == DeclKind::Protocol)?;
        self.known_protocols.borrow_mut()[slot] = Some(found);
        Some(found)
    }

    /// Resolve a known standard-library type. Same caching policy as
    /// [`known_protocol`](Self::known_protocol).
    pub fn known_stdlib_type(&self, kind: KnownTypeKind) -> Option<DeclId> {
        let slot = kind.cache_index();
        if let Some(decl) = self.known_types.borrow()[slot] {
            return Some(decl);
        }

        let found = self.find_known_decl(kind.name(), |k| {
            matches!(
                k,
                DeclKind::Struct | DeclKind::Class | DeclKind::Enum | DeclKind::TypeAlias
            )
        })?;
        self.known_types.borrow_mut()[slot] = Some(found);
        Some(found)
    }

    fn find_known_decl(
        &self,
        name: &str,
        accepts: impl Fn(DeclKind) -> bool,
    ) -> Option<DeclId> {
        let atom = self.intern_identifier(name);
        let decls = self.decls.borrow();
        for &module in self.loaded_modules.borrow().values() {
            if let Some(decl) = decls.lookup(module, atom) {
                let kind = decls.get(decl).map(|info| info.kind);
                if kind.is_some_and(&accepts) {
                    return Some(decl);
                }
            }
        }
        None
    }

    /// The default (nominal) type for a known standard-library type kind.
    ///
    /// Cached per kind, invalidated by generation when new modules load —
    /// unlike the known-declaration caches, the answer here can
    /// legitimately change as modules arrive.
    pub fn default_type(&self, kind: KnownTypeKind) -> Option<TypeId> {
        {
            let mut cache = self.default_types.borrow_mut();
            if cache.generation != self.module_generation.get() {
                cache.entries.clear();
                cache.generation = self.module_generation.get();
            }
            if let Some(&ty) = cache.entries.get(&kind) {
                return Some(ty);
            }
        }

        let decl = self.known_stdlib_type(kind)?;
        let ty = self.types.nominal(decl, None);
        self.default_types.borrow_mut().entries.insert(kind, ty);
        Some(ty)
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Record a diagnostic with the attached handler.
    pub fn diagnose(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().emit(diagnostic);
    }

    /// Whether any error has been diagnosed. The context forwards this
    /// query; it does not format or emit anything itself.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.borrow().has_errors()
    }

    // =========================================================================
    // Cleanups
    // =========================================================================

    /// Register a callback to run when the context is destroyed. Callbacks
    /// run in reverse registration order.
    pub fn add_cleanup(&self, cleanup: impl FnOnce() + 'static) {
        self.cleanups.borrow_mut().push(Box::new(cleanup));
    }

    // =========================================================================
    // Constraint-solver sessions
    // =========================================================================

    /// Enter a constraint-solver session, installing a fresh
    /// constraint-solver arena.
    ///
    /// The previous active arena (if any) is saved in the returned guard
    /// and restored when the guard drops, on every exit path. Sessions
    /// must unwind in LIFO order.
    pub fn enter_constraint_solver(&self) -> ConstraintSolverSession<'_> {
        let generation = self.solver_generation.get().wrapping_add(1);
        self.solver_generation.set(generation);
        let saved = self
            .types
            .push_solver_arena(generation, self.options.region_chunk_size);
        debug!(generation, "entered constraint-solver session");
        ConstraintSolverSession {
            context: self,
            saved: Some(saved),
            generation,
        }
    }
}

impl Default for AstContext {
    fn default() -> AstContext {
        AstContext::new()
    }
}

impl Drop for AstContext {
    fn drop(&mut self) {
        // Reverse registration order, mirroring construction.
        let mut cleanups = std::mem::take(&mut *self.cleanups.borrow_mut());
        while let Some(cleanup) = cleanups.pop() {
            cleanup();
        }
    }
}

/// RAII guard for a constraint-solver session.
///
/// Dropping the guard discards the session's arena — every type, signature,
/// and conformance interned into it — and restores the previously active
/// arena. Handles minted during the session resolve to nothing afterward.
pub struct ConstraintSolverSession<'ctx> {
    context: &'ctx AstContext,
    saved: Option<Option<ArenaTables>>,
    generation: u16,
}

impl ConstraintSolverSession<'_> {
    /// Generation of this session's arena.
    pub fn generation(&self) -> u16 {
        self.generation
    }
}

impl Drop for ConstraintSolverSession<'_> {
    fn drop(&mut self) {
        let active = self.context.types().active_solver_generation();
        assert_eq!(
            active,
            Some(self.generation),
            "constraint-solver sessions must unwind in LIFO order"
        );
        let saved = self.saved.take().unwrap_or(None);
        self.context.types().pop_solver_arena(saved);
        debug!(generation = self.generation, "left constraint-solver session");
    }
}

#[cfg(test)]
#[path = "tests/context_tests.rs"]
mod tests;
