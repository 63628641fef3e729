//! Declaration identifiers and storage.
//!
//! The context owns a flat [`DeclStore`] addressed by [`DeclId`]. Only the
//! declaration kinds the interning core needs are modeled here: enough to
//! name nominal types, protocols, and the modules that own them. Semantic
//! payload (members, bodies, access control) lives in out-of-scope layers.
//!
//! The known-declaration registries at the bottom replace the original
//! implementation's preprocessor-generated `.def` tables with plain const
//! data: a closed, compile-time-enumerable set of variants, each carrying
//! its name payload.

use lyra_common::interner::Atom;
use rustc_hash::FxHashMap;

/// Context-owned declaration identifier.
///
/// Declarations always live in the permanent arena; `DeclId` is a plain
/// index with `0` reserved as the invalid sentinel.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

impl DeclId {
    /// Sentinel value for invalid `DeclId`.
    pub const INVALID: Self = Self(0);

    /// First valid `DeclId`.
    pub const FIRST_VALID: u32 = 1;

    /// Check if this `DeclId` is valid.
    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

/// Kind of declaration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Module,
    Struct,
    Class,
    Enum,
    Protocol,
    TypeAlias,
    AssociatedType,
}

impl DeclKind {
    /// Whether a declaration of this kind names a nominal type.
    pub fn is_nominal(self) -> bool {
        matches!(
            self,
            DeclKind::Struct | DeclKind::Class | DeclKind::Enum | DeclKind::Protocol
        )
    }
}

/// A declaration record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclInfo {
    pub kind: DeclKind,
    pub name: Atom,
    /// Owning declaration context: the module for top-level declarations,
    /// [`DeclId::INVALID`] for modules themselves.
    pub parent: DeclId,
}

impl DeclInfo {
    pub fn module(name: Atom) -> DeclInfo {
        DeclInfo {
            kind: DeclKind::Module,
            name,
            parent: DeclId::INVALID,
        }
    }

    pub fn nominal(kind: DeclKind, name: Atom, parent: DeclId) -> DeclInfo {
        debug_assert!(kind.is_nominal());
        DeclInfo { kind, name, parent }
    }

    pub fn protocol(name: Atom, parent: DeclId) -> DeclInfo {
        DeclInfo {
            kind: DeclKind::Protocol,
            name,
            parent,
        }
    }
}

/// Flat declaration storage with a (parent, name) lookup index.
pub struct DeclStore {
    decls: Vec<DeclInfo>,
    /// Top-level lookup: (owning module, name) -> declaration.
    /// First registration wins; redeclaration handling is out of scope.
    by_name: FxHashMap<(DeclId, Atom), DeclId>,
}

impl DeclStore {
    pub fn new() -> DeclStore {
        DeclStore {
            // Index 0 is the invalid sentinel.
            decls: vec![DeclInfo {
                kind: DeclKind::Module,
                name: Atom::NONE,
                parent: DeclId::INVALID,
            }],
            by_name: FxHashMap::default(),
        }
    }

    /// Register a declaration, returning its id.
    pub fn register(&mut self, info: DeclInfo) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.by_name.entry((info.parent, info.name)).or_insert(id);
        self.decls.push(info);
        id
    }

    /// Get a declaration by id.
    pub fn get(&self, id: DeclId) -> Option<&DeclInfo> {
        if !id.is_valid() {
            return None;
        }
        self.decls.get(id.0 as usize)
    }

    pub fn contains(&self, id: DeclId) -> bool {
        id.is_valid() && (id.0 as usize) < self.decls.len()
    }

    /// Look up a declaration by owning context and name.
    pub fn lookup(&self, parent: DeclId, name: Atom) -> Option<DeclId> {
        self.by_name.get(&(parent, name)).copied()
    }

    /// Number of declarations, including the invalid sentinel slot.
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.len() <= 1
    }
}

impl Default for DeclStore {
    fn default() -> DeclStore {
        DeclStore::new()
    }
}

// =============================================================================
// Known declarations
// =============================================================================

/// Protocols the compiler knows by name.
///
/// A closed registry: each variant carries its source-level name. Lookup
/// results are cached by the context (see `AstContext::known_protocol`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KnownProtocolKind {
    Equatable,
    Hashable,
    Comparable,
    Error,
    Sequence,
    Collection,
    ExpressibleByNilLiteral,
    ExpressibleByStringLiteral,
    ExpressibleByIntegerLiteral,
    ExpressibleByArrayLiteral,
    ExpressibleByDictionaryLiteral,
    Encodable,
    Decodable,
    CustomStringConvertible,
}

impl KnownProtocolKind {
    pub const ALL: &'static [KnownProtocolKind] = &[
        KnownProtocolKind::Equatable,
        KnownProtocolKind::Hashable,
        KnownProtocolKind::Comparable,
        KnownProtocolKind::Error,
        KnownProtocolKind::Sequence,
        KnownProtocolKind::Collection,
        KnownProtocolKind::ExpressibleByNilLiteral,
        KnownProtocolKind::ExpressibleByStringLiteral,
        KnownProtocolKind::ExpressibleByIntegerLiteral,
        KnownProtocolKind::ExpressibleByArrayLiteral,
        KnownProtocolKind::ExpressibleByDictionaryLiteral,
        KnownProtocolKind::Encodable,
        KnownProtocolKind::Decodable,
        KnownProtocolKind::CustomStringConvertible,
    ];

    /// Source-level name of the protocol.
    pub const fn name(self) -> &'static str {
        match self {
            KnownProtocolKind::Equatable => "Equatable",
            KnownProtocolKind::Hashable => "Hashable",
            KnownProtocolKind::Comparable => "Comparable",
            KnownProtocolKind::Error => "Error",
            KnownProtocolKind::Sequence => "Sequence",
            KnownProtocolKind::Collection => "Collection",
            KnownProtocolKind::ExpressibleByNilLiteral => "ExpressibleByNilLiteral",
            KnownProtocolKind::ExpressibleByStringLiteral => "ExpressibleByStringLiteral",
            KnownProtocolKind::ExpressibleByIntegerLiteral => "ExpressibleByIntegerLiteral",
            KnownProtocolKind::ExpressibleByArrayLiteral => "ExpressibleByArrayLiteral",
            KnownProtocolKind::ExpressibleByDictionaryLiteral => "ExpressibleByDictionaryLiteral",
            KnownProtocolKind::Encodable => "Encodable",
            KnownProtocolKind::Decodable => "Decodable",
            KnownProtocolKind::CustomStringConvertible => "CustomStringConvertible",
        }
    }

    /// Dense index for cache vectors.
    pub(crate) fn cache_index(self) -> usize {
        Self::ALL
            .iter()
            .position(|kind| *kind == self)
            .expect("kind missing from ALL")
    }
}

/// Standard-library types the compiler knows by name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KnownTypeKind {
    Int,
    Bool,
    String,
    Double,
    Character,
    Optional,
    Array,
    Dictionary,
    Set,
    Never,
}

impl KnownTypeKind {
    pub const ALL: &'static [KnownTypeKind] = &[
        KnownTypeKind::Int,
        KnownTypeKind::Bool,
        KnownTypeKind::String,
        KnownTypeKind::Double,
        KnownTypeKind::Character,
        KnownTypeKind::Optional,
        KnownTypeKind::Array,
        KnownTypeKind::Dictionary,
        KnownTypeKind::Set,
        KnownTypeKind::Never,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            KnownTypeKind::Int => "Int",
            KnownTypeKind::Bool => "Bool",
            KnownTypeKind::String => "String",
            KnownTypeKind::Double => "Double",
            KnownTypeKind::Character => "Character",
            KnownTypeKind::Optional => "Optional",
            KnownTypeKind::Array => "Array",
            KnownTypeKind::Dictionary => "Dictionary",
            KnownTypeKind::Set => "Set",
            KnownTypeKind::Never => "Never",
        }
    }

    pub(crate) fn cache_index(self) -> usize {
        Self::ALL
            .iter()
            .position(|kind| *kind == self)
            .expect("kind missing from ALL")
    }
}

#[cfg(test)]
#[path = "tests/decls_tests.rs"]
mod tests;
