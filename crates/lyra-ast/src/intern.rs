//! Type interning for structural canonicalization.
//!
//! This module implements the interning engine that converts [`TypeKey`]
//! structures into lightweight [`TypeId`] handles, one table family per
//! arena.
//!
//! Benefits:
//! - O(1) type equality (just compare TypeId values)
//! - Memory efficient (each unique structure stored once)
//! - Cache-friendly (work with u32 handles instead of heap objects)
//!
//! Every factory follows the same shape: fold the children's recursive
//! properties, select the arena, compute the structural key, and look it up
//! in that arena's table — the hit is the dominant fast path; a miss
//! constructs the entry, charges its bytes to the arena, and inserts.
//!
//! The engine is single-threaded per context. Interior mutability is
//! `RefCell`, and no borrow is held across a nested factory call, which is
//! what makes the re-entrant archetype construction in `intern_generics.rs`
//! legal.

use crate::arena::{Region, RegionRef};
use crate::conformance::ConformanceTable;
use crate::generics::{SignatureTable, SubstitutionTable};
use crate::properties::{AllocationArena, RecursiveTypeProperties};
use crate::types::*;
use lyra_common::limits::{
    MAX_EXISTENTIAL_MEMBERS, PERMANENT_TYPE_TABLE_CAPACITY, REGION_CHUNK_SIZE,
    SOLVER_TYPE_TABLE_CAPACITY,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::sync::Arc;
use tracing::trace;

const TYPE_LIST_INLINE: usize = 8;

pub(crate) type TypeBuffer = SmallVec<[TypeId; TYPE_LIST_INLINE]>;

/// One interned type: its structural key, folded properties, and the
/// canonical type it resolves to (itself, for canonical types).
#[derive(Clone, Debug)]
pub(crate) struct TypeEntry {
    pub(crate) key: TypeKey,
    pub(crate) properties: RecursiveTypeProperties,
    pub(crate) canonical: TypeId,
}

/// Uniquing table for slices, with the empty slice pre-interned at 0.
struct SliceTable<T> {
    items: Vec<Arc<[T]>>,
    map: FxHashMap<Arc<[T]>, u32>,
}

impl<T> SliceTable<T>
where
    T: Eq + std::hash::Hash,
{
    fn new() -> Self {
        let empty: Arc<[T]> = Arc::from(Vec::new());
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), 0);
        SliceTable {
            items: vec![empty],
            map,
        }
    }

    /// Intern a slice, returning its local index and the bytes charged
    /// (zero on a hit).
    fn intern(&mut self, items: Vec<T>) -> (u32, usize) {
        if items.is_empty() {
            return (0, 0);
        }
        if let Some(&id) = self.map.get(items.as_slice()) {
            return (id, 0);
        }

        let bytes = items.len() * std::mem::size_of::<T>();
        let arc: Arc<[T]> = items.into();
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        (id, bytes)
    }

    fn get(&self, id: u32) -> Option<Arc<[T]>> {
        self.items.get(id as usize).cloned()
    }

    fn empty(&self) -> Arc<[T]> {
        self.items[0].clone()
    }
}

/// A generic environment under construction or finalized.
#[derive(Clone, Debug)]
pub(crate) struct EnvRecord {
    pub(crate) signature: GenericSignatureId,
    pub(crate) archetypes: Vec<TypeId>,
    pub(crate) finalized: bool,
}

/// One arena's complete table family: the region plus every per-shape
/// uniquing table.
pub(crate) struct ArenaTables {
    pub(crate) arena: ArenaRef,
    pub(crate) region: Region,
    key_to_index: FxHashMap<TypeKey, u32>,
    entries: Vec<TypeEntry>,
    type_lists: SliceTable<TypeId>,
    tuple_lists: SliceTable<TupleElement>,
    param_lists: SliceTable<FunctionParam>,
    pub(crate) signatures: SignatureTable,
    pub(crate) substitutions: SubstitutionTable,
    pub(crate) conformances: ConformanceTable,
    pub(crate) envs: Vec<EnvRecord>,
    pub(crate) env_memo: FxHashMap<GenericSignatureId, u32>,
}

impl ArenaTables {
    pub(crate) fn new(arena: ArenaRef, chunk_size: usize) -> ArenaTables {
        let capacity = match arena {
            ArenaRef::Permanent => PERMANENT_TYPE_TABLE_CAPACITY,
            ArenaRef::Solver { .. } => SOLVER_TYPE_TABLE_CAPACITY,
        };
        ArenaTables {
            arena,
            region: Region::with_chunk_size(chunk_size),
            key_to_index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            entries: Vec::with_capacity(capacity),
            type_lists: SliceTable::new(),
            tuple_lists: SliceTable::new(),
            param_lists: SliceTable::new(),
            signatures: SignatureTable::new(),
            substitutions: SubstitutionTable::new(),
            conformances: ConformanceTable::new(),
            envs: Vec::new(),
            env_memo: FxHashMap::default(),
        }
    }

    /// Core lookup-or-insert. Returns the id and whether it was fresh.
    fn intern_key_raw(
        &mut self,
        key: TypeKey,
        properties: RecursiveTypeProperties,
        canonical: Option<TypeId>,
    ) -> (TypeId, bool) {
        if let Some(&index) = self.key_to_index.get(&key) {
            return (TypeId::from_parts(self.arena, index), false);
        }

        let index = self.entries.len() as u32;
        let id = TypeId::from_parts(self.arena, index);
        self.region.charge(std::mem::size_of::<TypeEntry>());
        self.entries.push(TypeEntry {
            key: key.clone(),
            properties,
            canonical: canonical.unwrap_or(id),
        });
        self.key_to_index.insert(key, index);
        (id, true)
    }

    fn entry(&self, index: u32) -> Option<&TypeEntry> {
        self.entries.get(index as usize)
    }

    fn find(&self, key: &TypeKey) -> Option<TypeId> {
        self.key_to_index
            .get(key)
            .map(|&index| TypeId::from_parts(self.arena, index))
    }

    /// Number of interned types in this arena.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// The per-context type interner: one permanent table family plus the
/// optional active constraint-solver family.
pub struct TypeInterner {
    permanent: RefCell<ArenaTables>,
    solver: RefCell<Option<ArenaTables>>,
    next_type_variable: Cell<u32>,
    next_opening: Cell<u32>,
}

impl TypeInterner {
    pub(crate) fn new(chunk_size: usize) -> TypeInterner {
        TypeInterner {
            permanent: RefCell::new(ArenaTables::new(ArenaRef::Permanent, chunk_size)),
            solver: RefCell::new(None),
            next_type_variable: Cell::new(0),
            next_opening: Cell::new(0),
        }
    }

    // =========================================================================
    // Arena routing
    // =========================================================================

    pub(crate) fn with_arena<R>(
        &self,
        arena: AllocationArena,
        f: impl FnOnce(&mut ArenaTables) -> R,
    ) -> R {
        match arena {
            AllocationArena::Permanent => f(&mut self.permanent.borrow_mut()),
            AllocationArena::ConstraintSolver => {
                let mut guard = self.solver.borrow_mut();
                let tables = guard
                    .as_mut()
                    .expect("no active constraint-solver arena");
                f(tables)
            }
        }
    }

    pub(crate) fn with_arena_ref<R>(
        &self,
        arena: AllocationArena,
        f: impl FnOnce(&ArenaTables) -> R,
    ) -> R {
        match arena {
            AllocationArena::Permanent => f(&self.permanent.borrow()),
            AllocationArena::ConstraintSolver => {
                let guard = self.solver.borrow();
                let tables = guard
                    .as_ref()
                    .expect("no active constraint-solver arena");
                f(tables)
            }
        }
    }

    /// Route a handle's arena tag to its owning tables, if still live. A
    /// stale solver handle (its session has ended) resolves to `None`.
    pub(crate) fn with_id_arena<R>(
        &self,
        arena: ArenaRef,
        f: impl FnOnce(&ArenaTables) -> Option<R>,
    ) -> Option<R> {
        match arena {
            ArenaRef::Permanent => f(&self.permanent.borrow()),
            ArenaRef::Solver { .. } => {
                let guard = self.solver.borrow();
                let tables = guard.as_ref()?;
                if tables.arena != arena {
                    return None;
                }
                f(tables)
            }
        }
    }

    pub(crate) fn with_id_arena_mut<R>(
        &self,
        arena: ArenaRef,
        f: impl FnOnce(&mut ArenaTables) -> Option<R>,
    ) -> Option<R> {
        match arena {
            ArenaRef::Permanent => f(&mut self.permanent.borrow_mut()),
            ArenaRef::Solver { .. } => {
                let mut guard = self.solver.borrow_mut();
                let tables = guard.as_mut()?;
                if tables.arena != arena {
                    return None;
                }
                f(tables)
            }
        }
    }

    /// Install a fresh constraint-solver arena, returning the previously
    /// active one (single-slot stack: the caller saves and restores it).
    pub(crate) fn push_solver_arena(
        &self,
        generation: u16,
        chunk_size: usize,
    ) -> Option<ArenaTables> {
        self.solver
            .borrow_mut()
            .replace(ArenaTables::new(ArenaRef::Solver { generation }, chunk_size))
    }

    /// Drop the active constraint-solver arena and restore the saved one.
    pub(crate) fn pop_solver_arena(&self, saved: Option<ArenaTables>) {
        *self.solver.borrow_mut() = saved;
    }

    /// Generation of the active constraint-solver arena, if any.
    pub(crate) fn active_solver_generation(&self) -> Option<u16> {
        match self.solver.borrow().as_ref()?.arena {
            ArenaRef::Solver { generation } => Some(generation),
            ArenaRef::Permanent => None,
        }
    }

    pub fn has_constraint_solver_arena(&self) -> bool {
        self.solver.borrow().is_some()
    }

    // =========================================================================
    // Raw allocation and introspection
    // =========================================================================

    /// Allocate raw storage from the given arena's region.
    pub(crate) fn allocate_raw(
        &self,
        arena: AllocationArena,
        size: usize,
        align: usize,
    ) -> RegionRef {
        self.with_arena(arena, |tables| tables.region.allocate(size, align))
    }

    /// Bytes allocated by the given arena (zero for an inactive solver
    /// arena), for memory-usage reporting.
    pub fn bytes_allocated(&self, arena: AllocationArena) -> usize {
        match arena {
            AllocationArena::Permanent => self.permanent.borrow().region.bytes_allocated(),
            AllocationArena::ConstraintSolver => self
                .solver
                .borrow()
                .as_ref()
                .map(|tables| tables.region.bytes_allocated())
                .unwrap_or(0),
        }
    }

    /// Total bytes across both arenas.
    pub fn total_bytes_allocated(&self) -> usize {
        self.bytes_allocated(AllocationArena::Permanent)
            + self.bytes_allocated(AllocationArena::ConstraintSolver)
    }

    /// Number of types interned in the permanent arena, including the
    /// intrinsic block.
    pub fn len(&self) -> usize {
        TypeId::FIRST_USER as usize + self.permanent.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= TypeId::FIRST_USER as usize
    }

    // =========================================================================
    // Core lookup
    // =========================================================================

    /// Look up the structural key for a TypeId.
    ///
    /// Returns `None` for a stale constraint-solver handle whose session
    /// has ended.
    pub fn lookup(&self, id: TypeId) -> Option<TypeKey> {
        if id.is_intrinsic() {
            return Self::intrinsic_key(id);
        }
        let (arena, index) = id.split()?;
        self.with_id_arena(arena, |tables| tables.entry(index).map(|e| e.key.clone()))
    }

    /// Recursive properties of a type. Intrinsics have fixed properties;
    /// stale solver handles report empty.
    pub fn properties(&self, id: TypeId) -> RecursiveTypeProperties {
        if id.is_intrinsic() {
            return match id {
                TypeId::ERROR => RecursiveTypeProperties::HAS_ERROR,
                _ => RecursiveTypeProperties::empty(),
            };
        }
        let Some((arena, index)) = id.split() else {
            return RecursiveTypeProperties::empty();
        };
        self.with_id_arena(arena, |tables| tables.entry(index).map(|e| e.properties))
            .unwrap_or_default()
    }

    /// Resolve a possibly-sugared type to its canonical type.
    pub fn canonical_type(&self, id: TypeId) -> TypeId {
        if id.is_intrinsic() {
            return id;
        }
        let Some((arena, index)) = id.split() else {
            return id;
        };
        self.with_id_arena(arena, |tables| tables.entry(index).map(|e| e.canonical))
            .unwrap_or(id)
    }

    /// Whether the type is its own canonical form.
    pub fn is_canonical(&self, id: TypeId) -> bool {
        self.canonical_type(id) == id
    }

    fn intrinsic_key(id: TypeId) -> Option<TypeKey> {
        match id {
            TypeId::ERROR => Some(TypeKey::Error),
            TypeId::VOID => Some(TypeKey::EmptyTuple),
            TypeId::ANY => Some(TypeKey::Any),
            _ => None,
        }
    }

    // =========================================================================
    // List accessors
    // =========================================================================

    pub fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        let (arena, index) = id.split();
        self.with_id_arena(arena, |tables| tables.type_lists.get(index))
            .unwrap_or_else(|| self.permanent.borrow().type_lists.empty())
    }

    pub fn tuple_list(&self, id: TupleListId) -> Arc<[TupleElement]> {
        let (arena, index) = id.split();
        self.with_id_arena(arena, |tables| tables.tuple_lists.get(index))
            .unwrap_or_else(|| self.permanent.borrow().tuple_lists.empty())
    }

    pub fn param_list(&self, id: ParamListId) -> Arc<[FunctionParam]> {
        let (arena, index) = id.split();
        self.with_id_arena(arena, |tables| tables.param_lists.get(index))
            .unwrap_or_else(|| self.permanent.borrow().param_lists.empty())
    }

    // =========================================================================
    // Interning plumbing
    // =========================================================================

    /// Fold the recursive properties of a set of child types.
    pub(crate) fn fold_props<I>(&self, children: I) -> RecursiveTypeProperties
    where
        I: IntoIterator<Item = TypeId>,
    {
        RecursiveTypeProperties::fold(children.into_iter().map(|child| self.properties(child)))
    }

    /// Intern a key into the selected arena.
    ///
    /// The structural-sharing invariant is checked here: a permanent
    /// composite must never reference constraint-solver children.
    pub(crate) fn intern_key(
        &self,
        arena: AllocationArena,
        key: TypeKey,
        properties: RecursiveTypeProperties,
        canonical: Option<TypeId>,
    ) -> TypeId {
        if arena == AllocationArena::Permanent {
            debug_assert!(
                !key_references_solver(&key),
                "permanent composite references constraint-solver children: {key:?}"
            );
        }
        let (id, fresh) = self.with_arena(arena, |tables| {
            tables.intern_key_raw(key, properties, canonical)
        });
        if fresh {
            trace!(?id, ?arena, "interned type");
        }
        id
    }

    /// First-phase insertion-point lookup, used by the archetype factories
    /// that must re-check after constructing their environment.
    pub(crate) fn find_key(&self, arena: AllocationArena, key: &TypeKey) -> Option<TypeId> {
        self.with_arena_ref(arena, |tables| tables.find(key))
    }

    pub(crate) fn intern_type_list(&self, arena: AllocationArena, items: Vec<TypeId>) -> TypeListId {
        self.with_arena(arena, |tables| {
            let (index, bytes) = tables.type_lists.intern(items);
            tables.region.charge(bytes);
            TypeListId::from_parts(tables.arena, index)
        })
    }

    fn intern_tuple_list(&self, arena: AllocationArena, items: Vec<TupleElement>) -> TupleListId {
        self.with_arena(arena, |tables| {
            let (index, bytes) = tables.tuple_lists.intern(items);
            tables.region.charge(bytes);
            TupleListId::from_parts(tables.arena, index)
        })
    }

    fn intern_param_list(&self, arena: AllocationArena, items: Vec<FunctionParam>) -> ParamListId {
        self.with_arena(arena, |tables| {
            let (index, bytes) = tables.param_lists.intern(items);
            tables.region.charge(bytes);
            ParamListId::from_parts(tables.arena, index)
        })
    }

    // =========================================================================
    // Intrinsic singletons
    // =========================================================================

    /// The canonical error type.
    pub fn error_type(&self) -> TypeId {
        TypeId::ERROR
    }

    /// The empty tuple, `Void`.
    pub fn empty_tuple_type(&self) -> TypeId {
        TypeId::VOID
    }

    /// The empty existential composition, `Any`.
    pub fn any_type(&self) -> TypeId {
        TypeId::ANY
    }

    // =========================================================================
    // Canonical type factories
    // =========================================================================

    /// Whether every child in the iterator is already canonical. A
    /// composite over sugared children is itself non-canonical; its
    /// canonical form is the same shape rebuilt over canonical children.
    fn all_canonical<I>(&self, children: I) -> bool
    where
        I: IntoIterator<Item = TypeId>,
    {
        children.into_iter().all(|child| self.is_canonical(child))
    }

    /// A nominal type, optionally nested inside a parent type.
    pub fn nominal(&self, decl: crate::decls::DeclId, parent: Option<TypeId>) -> TypeId {
        let props = self.fold_props(parent);
        let arena = AllocationArena::select(props);
        let canonical = if self.all_canonical(parent) {
            None
        } else {
            Some(self.nominal(decl, parent.map(|p| self.canonical_type(p))))
        };
        self.intern_key(arena, TypeKey::Nominal { decl, parent }, props, canonical)
    }

    /// A generic nominal type bound to concrete arguments.
    pub fn bound_generic(
        &self,
        decl: crate::decls::DeclId,
        parent: Option<TypeId>,
        args: Vec<TypeId>,
    ) -> TypeId {
        let mut children: TypeBuffer = SmallVec::new();
        children.extend(parent);
        children.extend(args.iter().copied());
        let props = self.fold_props(children.iter().copied());
        let arena = AllocationArena::select(props);
        let canonical = if self.all_canonical(children) {
            None
        } else {
            Some(self.bound_generic(
                decl,
                parent.map(|p| self.canonical_type(p)),
                args.iter().map(|&a| self.canonical_type(a)).collect(),
            ))
        };
        let args = self.intern_type_list(arena, args);
        self.intern_key(
            arena,
            TypeKey::BoundGeneric { decl, parent, args },
            props,
            canonical,
        )
    }

    /// A tuple type.
    ///
    /// The empty tuple is the `Void` singleton, and a single unnamed,
    /// non-variadic element collapses to the parenthesized wrapper over the
    /// element type: tuple-of-one is not a distinct shape.
    pub fn tuple(&self, elements: Vec<TupleElement>) -> TypeId {
        if elements.is_empty() {
            return TypeId::VOID;
        }
        if elements.len() == 1 && elements[0].name.is_none() && !elements[0].is_variadic() {
            return self.paren(elements[0].ty);
        }

        let props = self.fold_props(elements.iter().map(|e| e.ty));
        let arena = AllocationArena::select(props);
        let canonical = if self.all_canonical(elements.iter().map(|e| e.ty)) {
            None
        } else {
            Some(self.tuple(
                elements
                    .iter()
                    .map(|e| TupleElement {
                        ty: self.canonical_type(e.ty),
                        ..*e
                    })
                    .collect(),
            ))
        };
        let list = self.intern_tuple_list(arena, elements);
        self.intern_key(arena, TypeKey::Tuple(list), props, canonical)
    }

    /// Parenthesized sugar over a type. Non-canonical: the canonical type
    /// is the underlying type's canonical form.
    pub fn paren(&self, inner: TypeId) -> TypeId {
        let props = self.properties(inner);
        let arena = AllocationArena::select(props);
        let canonical = self.canonical_type(inner);
        self.intern_key(arena, TypeKey::Paren(inner), props, Some(canonical))
    }

    /// A type-alias expansion. Non-canonical sugar.
    pub fn type_alias(&self, decl: crate::decls::DeclId, underlying: TypeId) -> TypeId {
        let props = self.properties(underlying);
        let arena = AllocationArena::select(props);
        let canonical = self.canonical_type(underlying);
        self.intern_key(arena, TypeKey::Alias { decl, underlying }, props, Some(canonical))
    }

    /// A function type.
    pub fn function(
        &self,
        params: Vec<FunctionParam>,
        result: TypeId,
        flags: FunctionTypeFlags,
    ) -> TypeId {
        let mut children: TypeBuffer = params.iter().map(|p| p.ty).collect();
        children.push(result);
        let props = self.fold_props(children.iter().copied());
        let arena = AllocationArena::select(props);
        let canonical = if self.all_canonical(children) {
            None
        } else {
            Some(self.function(
                self.canonical_params(&params),
                self.canonical_type(result),
                flags,
            ))
        };
        let params = self.intern_param_list(arena, params);
        self.intern_key(
            arena,
            TypeKey::Function {
                params,
                result,
                flags,
            },
            props,
            canonical,
        )
    }

    fn canonical_params(&self, params: &[FunctionParam]) -> Vec<FunctionParam> {
        params
            .iter()
            .map(|p| FunctionParam {
                ty: self.canonical_type(p.ty),
                ..*p
            })
            .collect()
    }

    /// A generic function type.
    pub fn generic_function(
        &self,
        signature: GenericSignatureId,
        params: Vec<FunctionParam>,
        result: TypeId,
        flags: FunctionTypeFlags,
    ) -> TypeId {
        let mut children: TypeBuffer = params.iter().map(|p| p.ty).collect();
        children.push(result);
        let mut props = self.fold_props(children.iter().copied());
        props |= self.signature_properties(signature);
        let arena = AllocationArena::select(props);
        let canonical = if self.all_canonical(children) {
            None
        } else {
            Some(self.generic_function(
                signature,
                self.canonical_params(&params),
                self.canonical_type(result),
                flags,
            ))
        };
        let params = self.intern_param_list(arena, params);
        self.intern_key(
            arena,
            TypeKey::GenericFunction {
                signature,
                params,
                result,
                flags,
            },
            props,
            canonical,
        )
    }

    /// An optional type.
    pub fn optional(&self, wrapped: TypeId) -> TypeId {
        let props = self.fold_props([wrapped]);
        let arena = AllocationArena::select(props);
        let canonical = if self.is_canonical(wrapped) {
            None
        } else {
            Some(self.optional(self.canonical_type(wrapped)))
        };
        self.intern_key(arena, TypeKey::Optional(wrapped), props, canonical)
    }

    /// An array type.
    pub fn array(&self, element: TypeId) -> TypeId {
        let props = self.fold_props([element]);
        let arena = AllocationArena::select(props);
        let canonical = if self.is_canonical(element) {
            None
        } else {
            Some(self.array(self.canonical_type(element)))
        };
        self.intern_key(arena, TypeKey::Array(element), props, canonical)
    }

    /// A dictionary type.
    pub fn dictionary(&self, key: TypeId, value: TypeId) -> TypeId {
        let props = self.fold_props([key, value]);
        let arena = AllocationArena::select(props);
        let canonical = if self.all_canonical([key, value]) {
            None
        } else {
            Some(self.dictionary(self.canonical_type(key), self.canonical_type(value)))
        };
        self.intern_key(arena, TypeKey::Dictionary { key, value }, props, canonical)
    }

    /// A metatype of a concrete instance type.
    pub fn metatype(
        &self,
        instance: TypeId,
        representation: Option<MetatypeRepresentation>,
    ) -> TypeId {
        let props = self.fold_props([instance]);
        let arena = AllocationArena::select(props);
        let canonical = if self.is_canonical(instance) {
            None
        } else {
            Some(self.metatype(self.canonical_type(instance), representation))
        };
        self.intern_key(
            arena,
            TypeKey::Metatype {
                instance,
                representation,
            },
            props,
            canonical,
        )
    }

    /// A metatype of an existential instance type.
    pub fn existential_metatype(
        &self,
        instance: TypeId,
        representation: Option<MetatypeRepresentation>,
    ) -> TypeId {
        let props = self.fold_props([instance]);
        let arena = AllocationArena::select(props);
        let canonical = if self.is_canonical(instance) {
            None
        } else {
            Some(self.existential_metatype(self.canonical_type(instance), representation))
        };
        self.intern_key(
            arena,
            TypeKey::ExistentialMetatype {
                instance,
                representation,
            },
            props,
            canonical,
        )
    }

    /// An existential composition.
    ///
    /// Members are sorted and deduplicated for a stable profile. The empty
    /// composition is `Any`; a single-member composition without an
    /// `AnyObject` constraint collapses to the member itself.
    pub fn existential(&self, members: Vec<TypeId>, has_explicit_any_object: bool) -> TypeId {
        if members.len() > MAX_EXISTENTIAL_MEMBERS {
            trace!(count = members.len(), "existential composition exceeds member limit");
            return TypeId::ERROR;
        }

        let mut members: TypeBuffer = members.into();
        members.sort_by_key(|id| id.0);
        members.dedup();

        if members.contains(&TypeId::ERROR) {
            return TypeId::ERROR;
        }
        if members.is_empty() && !has_explicit_any_object {
            return TypeId::ANY;
        }
        if members.len() == 1 && !has_explicit_any_object {
            return members[0];
        }

        let props = self.fold_props(members.iter().copied());
        let arena = AllocationArena::select(props);
        let canonical = if self.all_canonical(members.iter().copied()) {
            None
        } else {
            Some(self.existential(
                members.iter().map(|&m| self.canonical_type(m)).collect(),
                has_explicit_any_object,
            ))
        };
        let members = self.intern_type_list(arena, members.into_vec());
        self.intern_key(
            arena,
            TypeKey::Existential {
                members,
                has_explicit_any_object,
            },
            props,
            canonical,
        )
    }

    /// A reference-storage wrapper.
    ///
    /// Weak storage requires the referent to already be optional; violating
    /// that is a compiler-internal error and panics.
    pub fn reference_storage(&self, referent: TypeId, ownership: ReferenceOwnership) -> TypeId {
        if ownership.requires_optional() && !referent.is_error() {
            let canonical_referent = self.canonical_type(referent);
            let is_optional = matches!(
                self.lookup(canonical_referent),
                Some(TypeKey::Optional(_))
            );
            assert!(
                is_optional,
                "weak reference storage requires an optional referent"
            );
        }
        let props = self.fold_props([referent]);
        let arena = AllocationArena::select(props);
        let canonical = if self.is_canonical(referent) {
            None
        } else {
            Some(self.reference_storage(self.canonical_type(referent), ownership))
        };
        self.intern_key(
            arena,
            TypeKey::ReferenceStorage {
                referent,
                ownership,
            },
            props,
            canonical,
        )
    }

    /// An l-value wrapper.
    pub fn lvalue(&self, object: TypeId) -> TypeId {
        let props = self.fold_props([object]) | RecursiveTypeProperties::IS_LVALUE;
        let arena = AllocationArena::select(props);
        let canonical = if self.is_canonical(object) {
            None
        } else {
            Some(self.lvalue(self.canonical_type(object)))
        };
        self.intern_key(arena, TypeKey::LValue(object), props, canonical)
    }

    /// A dependent member type.
    pub fn dependent_member(&self, base: TypeId, name: lyra_common::interner::Atom) -> TypeId {
        let props = self.fold_props([base]) | RecursiveTypeProperties::HAS_DEPENDENT_MEMBER;
        let arena = AllocationArena::select(props);
        let canonical = if self.is_canonical(base) {
            None
        } else {
            Some(self.dependent_member(self.canonical_type(base), name))
        };
        self.intern_key(arena, TypeKey::DependentMember { base, name }, props, canonical)
    }

    /// A canonical generic parameter.
    pub fn generic_param(&self, depth: u32, index: u32) -> TypeId {
        let props = RecursiveTypeProperties::HAS_GENERIC_PARAM;
        self.intern_key(
            AllocationArena::Permanent,
            TypeKey::GenericParam { depth, index },
            props,
            None,
        )
    }

    /// A fresh type variable. Only legal during a constraint-solver
    /// session; calling this without one is a programmer error.
    pub fn type_variable(&self) -> TypeId {
        let id = self.next_type_variable.get();
        self.next_type_variable.set(id + 1);
        let props = RecursiveTypeProperties::HAS_TYPE_VARIABLE;
        self.intern_key(
            AllocationArena::ConstraintSolver,
            TypeKey::TypeVariable { id },
            props,
            None,
        )
    }

    /// Open an existential, producing a fresh opened archetype. Every call
    /// mints a distinct opening.
    pub fn open_existential(&self, existential: TypeId) -> TypeId {
        let opening = self.next_opening.get();
        self.next_opening.set(opening + 1);
        let props = self.fold_props([existential])
            | RecursiveTypeProperties::HAS_ARCHETYPE
            | RecursiveTypeProperties::HAS_OPENED_EXISTENTIAL;
        let arena = AllocationArena::select(props);
        self.intern_key(
            arena,
            TypeKey::OpenedExistential {
                existential,
                opening,
            },
            props,
            None,
        )
    }
}

/// Whether a key structurally references any constraint-solver handle.
/// Used to assert the structural-sharing invariant for permanent inserts.
fn key_references_solver(key: &TypeKey) -> bool {
    let solver_type = |id: &TypeId| id.in_constraint_solver();
    let solver_opt = |id: &Option<TypeId>| id.is_some_and(|id| id.in_constraint_solver());
    match key {
        TypeKey::Error | TypeKey::EmptyTuple | TypeKey::Any => false,
        TypeKey::Nominal { parent, .. } => solver_opt(parent),
        TypeKey::BoundGeneric { parent, args, .. } => {
            solver_opt(parent) || args.in_constraint_solver()
        }
        TypeKey::Tuple(list) => list.in_constraint_solver(),
        TypeKey::Paren(inner) => solver_type(inner),
        TypeKey::Alias { underlying, .. } => solver_type(underlying),
        TypeKey::Function { params, result, .. } => {
            params.in_constraint_solver() || solver_type(result)
        }
        TypeKey::GenericFunction {
            signature,
            params,
            result,
            ..
        } => {
            signature.in_constraint_solver()
                || params.in_constraint_solver()
                || solver_type(result)
        }
        TypeKey::Optional(inner) | TypeKey::Array(inner) | TypeKey::LValue(inner) => {
            solver_type(inner)
        }
        TypeKey::Dictionary { key, value } => solver_type(key) || solver_type(value),
        TypeKey::Metatype { instance, .. } | TypeKey::ExistentialMetatype { instance, .. } => {
            solver_type(instance)
        }
        TypeKey::Existential { members, .. } => members.in_constraint_solver(),
        TypeKey::ReferenceStorage { referent, .. } => solver_type(referent),
        TypeKey::DependentMember { base, .. } => solver_type(base),
        TypeKey::GenericParam { .. } | TypeKey::TypeVariable { .. } => false,
        TypeKey::PrimaryArchetype { env, param } => {
            env.in_constraint_solver() || solver_type(param)
        }
        TypeKey::OpaqueArchetype { substitutions, .. } => substitutions
            .storage()
            .is_some_and(|id| id.in_constraint_solver()),
        TypeKey::OpenedExistential { existential, .. } => solver_type(existential),
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new(REGION_CHUNK_SIZE)
    }
}

#[cfg(test)]
#[path = "tests/intern_tests.rs"]
mod tests;
