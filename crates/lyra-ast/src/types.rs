//! Type identifiers, structural keys, and payload shapes.
//!
//! Every type is addressed by a [`TypeId`]: a `Copy` handle whose equality
//! is identity. The interning engine guarantees that structurally-equal
//! canonical types receive the same handle within an arena, so `==` on
//! `TypeId` is both pointer equality and structural equality.
//!
//! ## Handle encoding
//!
//! A raw `u32` encodes which arena owns the object:
//!
//! | Bits | Meaning |
//! |------|---------|
//! | 31 | set for ConstraintSolver-arena handles |
//! | 30..22 | solver-session generation (stale handles resolve to nothing) |
//! | 21..0 | index within the owning table |
//!
//! Permanent handles are plain indices with bit 31 clear. `TypeId`
//! additionally reserves a small intrinsic block below
//! [`TypeId::FIRST_USER`] for context singletons (`ERROR`, `VOID`, `ANY`).

use crate::decls::DeclId;
use bitflags::bitflags;
use lyra_common::interner::Atom;

pub(crate) const SOLVER_BIT: u32 = 1 << 31;
pub(crate) const SOLVER_GEN_SHIFT: u32 = 22;
pub(crate) const SOLVER_GEN_MASK: u32 = 0x1FF;
pub(crate) const SOLVER_INDEX_MASK: u32 = (1 << SOLVER_GEN_SHIFT) - 1;

/// Which arena minted a handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum ArenaRef {
    Permanent,
    Solver { generation: u16 },
}

impl ArenaRef {
    pub(crate) fn encode(self, index: u32) -> u32 {
        match self {
            ArenaRef::Permanent => {
                assert!(index < SOLVER_BIT, "permanent table overflow");
                index
            }
            ArenaRef::Solver { generation } => {
                assert!(index <= SOLVER_INDEX_MASK, "constraint-solver table overflow");
                SOLVER_BIT | ((generation as u32 & SOLVER_GEN_MASK) << SOLVER_GEN_SHIFT) | index
            }
        }
    }

    pub(crate) fn decode(raw: u32) -> (ArenaRef, u32) {
        if raw & SOLVER_BIT == 0 {
            (ArenaRef::Permanent, raw)
        } else {
            let generation = ((raw >> SOLVER_GEN_SHIFT) & SOLVER_GEN_MASK) as u16;
            (ArenaRef::Solver { generation }, raw & SOLVER_INDEX_MASK)
        }
    }
}

/// Defines an arena-encoded index newtype.
macro_rules! arena_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// Whether this handle was minted by a constraint-solver arena.
            #[inline]
            pub fn in_constraint_solver(self) -> bool {
                self.0 & SOLVER_BIT != 0
            }

            #[inline]
            pub(crate) fn from_parts(arena: ArenaRef, index: u32) -> $name {
                $name(arena.encode(index))
            }

            #[inline]
            pub(crate) fn split(self) -> (ArenaRef, u32) {
                ArenaRef::decode(self.0)
            }
        }
    };
}

arena_id! {
    /// Handle to an interned list of types.
    TypeListId
}
arena_id! {
    /// Handle to an interned list of tuple elements.
    TupleListId
}
arena_id! {
    /// Handle to an interned list of function parameters.
    ParamListId
}
arena_id! {
    /// Handle to a generic environment (signature plus its archetypes).
    GenericEnvId
}
arena_id! {
    /// Handle to an interned generic signature.
    GenericSignatureId
}
arena_id! {
    /// Handle to interned substitution-map storage.
    SubstitutionMapId
}
arena_id! {
    /// Handle to an interned protocol-conformance record.
    ConformanceId
}

/// An interned type handle.
///
/// Equality is identity; for canonical types the interner guarantees
/// identity iff structural equality (within an arena).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// The canonical error type singleton. Semantic failure propagates by
    /// value through this type instead of by exceptions.
    pub const ERROR: TypeId = TypeId(0);
    /// The empty tuple, `Void`.
    pub const VOID: TypeId = TypeId(1);
    /// The empty existential composition, `Any`.
    pub const ANY: TypeId = TypeId(2);

    /// First non-intrinsic id.
    pub const FIRST_USER: u32 = 8;

    #[inline]
    pub fn is_error(self) -> bool {
        self == TypeId::ERROR
    }

    #[inline]
    pub fn is_intrinsic(self) -> bool {
        self.0 < TypeId::FIRST_USER
    }

    /// Whether this handle was minted by a constraint-solver arena.
    #[inline]
    pub fn in_constraint_solver(self) -> bool {
        self.0 & SOLVER_BIT != 0
    }

    #[inline]
    pub(crate) fn from_parts(arena: ArenaRef, index: u32) -> TypeId {
        match arena {
            ArenaRef::Permanent => {
                let raw = TypeId::FIRST_USER + index;
                assert!(raw < SOLVER_BIT, "permanent type table overflow");
                TypeId(raw)
            }
            ArenaRef::Solver { .. } => TypeId(arena.encode(index)),
        }
    }

    /// Split a non-intrinsic id into its arena and table index.
    #[inline]
    pub(crate) fn split(self) -> Option<(ArenaRef, u32)> {
        if self.is_intrinsic() {
            return None;
        }
        let (arena, index) = ArenaRef::decode(self.0);
        match arena {
            ArenaRef::Permanent => Some((arena, index - TypeId::FIRST_USER)),
            ArenaRef::Solver { .. } => Some((arena, index)),
        }
    }
}

bitflags! {
    /// Per-element tuple flags.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct TupleElementFlags: u8 {
        const VARIADIC = 1 << 0;
    }
}

bitflags! {
    /// Per-parameter function flags.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ParamFlags: u8 {
        const VARIADIC = 1 << 0;
        const AUTOCLOSURE = 1 << 1;
        const INOUT = 1 << 2;
    }
}

bitflags! {
    /// Function-type level bits (calling convention and effects).
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct FunctionTypeFlags: u8 {
        const THROWS = 1 << 0;
        const ASYNC = 1 << 1;
        const NOESCAPE = 1 << 2;
    }
}

/// One element of a tuple type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TupleElement {
    pub name: Atom,
    pub ty: TypeId,
    pub flags: TupleElementFlags,
}

impl TupleElement {
    /// An unnamed, non-variadic element.
    pub fn unnamed(ty: TypeId) -> TupleElement {
        TupleElement {
            name: Atom::NONE,
            ty,
            flags: TupleElementFlags::empty(),
        }
    }

    pub fn named(name: Atom, ty: TypeId) -> TupleElement {
        TupleElement {
            name,
            ty,
            flags: TupleElementFlags::empty(),
        }
    }

    #[inline]
    pub fn is_variadic(self) -> bool {
        self.flags.contains(TupleElementFlags::VARIADIC)
    }
}

/// One parameter of a function type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionParam {
    pub label: Atom,
    pub ty: TypeId,
    pub flags: ParamFlags,
}

impl FunctionParam {
    /// An unlabeled, by-value parameter.
    pub fn plain(ty: TypeId) -> FunctionParam {
        FunctionParam {
            label: Atom::NONE,
            ty,
            flags: ParamFlags::empty(),
        }
    }

    pub fn labeled(label: Atom, ty: TypeId) -> FunctionParam {
        FunctionParam {
            label,
            ty,
            flags: ParamFlags::empty(),
        }
    }
}

/// How a metatype is represented at runtime, when it matters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MetatypeRepresentation {
    Thin,
    Thick,
}

/// Ownership qualifier of a reference-storage wrapper.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceOwnership {
    Weak,
    Unowned,
    Unmanaged,
}

impl ReferenceOwnership {
    /// Weak references can always become nil, so the wrapped type must
    /// already be optional. Constructing a weak wrapper around a
    /// non-optional type is a compiler-internal error, not a diagnostic.
    #[inline]
    pub fn requires_optional(self) -> bool {
        matches!(self, ReferenceOwnership::Weak)
    }
}

/// The substitution map of a generic context: replacement types for each
/// generic parameter plus the conformances satisfying its requirements.
///
/// The signature-less map is a sentinel with no storage at all; building it
/// performs no allocation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubstitutionMap {
    storage: Option<SubstitutionMapId>,
}

impl SubstitutionMap {
    /// The empty substitution map. Not an allocation.
    pub const EMPTY: SubstitutionMap = SubstitutionMap { storage: None };

    #[inline]
    pub(crate) fn from_storage(id: SubstitutionMapId) -> SubstitutionMap {
        SubstitutionMap { storage: Some(id) }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.storage.is_none()
    }

    /// The storage handle, or `None` for the empty sentinel.
    #[inline]
    pub fn storage(self) -> Option<SubstitutionMapId> {
        self.storage
    }
}

impl Default for SubstitutionMap {
    fn default() -> SubstitutionMap {
        SubstitutionMap::EMPTY
    }
}

/// Structural key of an interned type: the content-addressed profile the
/// uniquing tables hash and compare.
///
/// Keys referencing lists do so through arena-encoded list handles, so a
/// key is meaningful on its own without knowing which table produced it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKey {
    /// The error type singleton.
    Error,
    /// The empty tuple, `Void`.
    EmptyTuple,
    /// The empty existential composition, `Any`.
    Any,
    /// A nominal type, optionally nested in a parent type.
    Nominal { decl: DeclId, parent: Option<TypeId> },
    /// A generic nominal type bound to concrete arguments.
    BoundGeneric {
        decl: DeclId,
        parent: Option<TypeId>,
        args: TypeListId,
    },
    /// A tuple of two or more elements (or one named/variadic element).
    Tuple(TupleListId),
    /// Parenthesized sugar over an underlying type. Non-canonical.
    Paren(TypeId),
    /// A type-alias expansion. Non-canonical sugar over the underlying type.
    Alias { decl: DeclId, underlying: TypeId },
    /// A function type.
    Function {
        params: ParamListId,
        result: TypeId,
        flags: FunctionTypeFlags,
    },
    /// A generic function type.
    GenericFunction {
        signature: GenericSignatureId,
        params: ParamListId,
        result: TypeId,
        flags: FunctionTypeFlags,
    },
    /// An optional type.
    Optional(TypeId),
    /// An array type.
    Array(TypeId),
    /// A dictionary type.
    Dictionary { key: TypeId, value: TypeId },
    /// A metatype of a concrete instance type.
    Metatype {
        instance: TypeId,
        representation: Option<MetatypeRepresentation>,
    },
    /// A metatype of an existential instance type.
    ExistentialMetatype {
        instance: TypeId,
        representation: Option<MetatypeRepresentation>,
    },
    /// An existential composition of protocol members.
    Existential {
        members: TypeListId,
        has_explicit_any_object: bool,
    },
    /// A reference-storage wrapper (weak/unowned/unmanaged).
    ReferenceStorage {
        referent: TypeId,
        ownership: ReferenceOwnership,
    },
    /// An l-value wrapper.
    LValue(TypeId),
    /// A member type dependent on a base that is not yet resolved.
    DependentMember { base: TypeId, name: Atom },
    /// A canonical generic parameter, identified by position.
    GenericParam { depth: u32, index: u32 },
    /// An unresolved type variable of the constraint solver.
    TypeVariable { id: u32 },
    /// A primary archetype instantiating a generic parameter inside its
    /// generic environment.
    PrimaryArchetype { env: GenericEnvId, param: TypeId },
    /// An opaque-result archetype.
    OpaqueArchetype {
        decl: DeclId,
        substitutions: SubstitutionMap,
    },
    /// The archetype produced by opening an existential. Each opening is
    /// unique, so the key carries a fresh opening id.
    OpenedExistential { existential: TypeId, opening: u32 },
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
