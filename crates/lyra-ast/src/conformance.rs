//! Protocol-conformance records and their uniquing tables.
//!
//! Four record kinds exist: Normal (the root witness of "type T conforms to
//! protocol P in this declaration context", owning a witness table filled in
//! later by type checking), Specialized (a generic conformance seen through
//! a substitution map), Inherited (a superclass conformance seen from a
//! subclass), and Self (a protocol's conformance to itself).
//!
//! Lookup results distinguish "searched and found nothing" from "didn't
//! search" via [`ConformanceRef::Invalid`]; bare nulls never cross the API.

use crate::decls::DeclId;
use crate::types::{ConformanceId, SubstitutionMap, TypeId};
use lyra_common::interner::Atom;
use rustc_hash::FxHashMap;

/// Reference to a conformance, or the documented absence of one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConformanceRef {
    /// Lookup ran and found nothing.
    Invalid,
    /// An abstract conformance: the subject is known to conform (e.g. via a
    /// generic requirement) without a concrete witness record.
    Abstract(DeclId),
    /// A concrete, interned conformance record.
    Concrete(ConformanceId),
}

impl ConformanceRef {
    #[inline]
    pub fn is_invalid(self) -> bool {
        matches!(self, ConformanceRef::Invalid)
    }

    #[inline]
    pub fn is_abstract(self) -> bool {
        matches!(self, ConformanceRef::Abstract(_))
    }

    #[inline]
    pub fn is_concrete(self) -> bool {
        matches!(self, ConformanceRef::Concrete(_))
    }
}

/// An interned conformance record.
#[derive(Clone, Debug)]
pub enum ConformanceData {
    Normal {
        ty: TypeId,
        protocol: DeclId,
        /// The declaration context that declared the conformance (the
        /// nominal itself or an extension).
        decl_context: DeclId,
        /// Witness table, filled in later by type checking. Maps a
        /// requirement name to the witnessing type.
        witnesses: FxHashMap<Atom, TypeId>,
    },
    Specialized {
        ty: TypeId,
        underlying: ConformanceId,
        substitutions: SubstitutionMap,
    },
    Inherited {
        ty: TypeId,
        underlying: ConformanceId,
    },
    SelfConformance {
        protocol: DeclId,
    },
}

impl ConformanceData {
    /// The concrete type this record conforms. `None` for self
    /// conformances, whose subject is the protocol's own existential.
    pub fn conforming_type(&self) -> Option<TypeId> {
        match self {
            ConformanceData::Normal { ty, .. }
            | ConformanceData::Specialized { ty, .. }
            | ConformanceData::Inherited { ty, .. } => Some(*ty),
            ConformanceData::SelfConformance { .. } => None,
        }
    }
}

/// Uniquing tables for conformances within one arena.
///
/// Normal and self conformances only ever live in the permanent arena's
/// table (enforced by the interner); specialized and inherited records may
/// be solver-scoped when their conforming type is.
pub(crate) struct ConformanceTable {
    records: Vec<ConformanceData>,
    normal_map: FxHashMap<(TypeId, DeclId, DeclId), u32>,
    specialized_map: FxHashMap<(TypeId, ConformanceId, SubstitutionMap), u32>,
    inherited_map: FxHashMap<(TypeId, ConformanceId), u32>,
    /// Direct map, not a folding set: at most one self conformance per
    /// protocol, created lazily.
    self_map: FxHashMap<DeclId, u32>,
}

impl ConformanceTable {
    pub(crate) fn new() -> ConformanceTable {
        ConformanceTable {
            records: Vec::new(),
            normal_map: FxHashMap::default(),
            specialized_map: FxHashMap::default(),
            inherited_map: FxHashMap::default(),
            self_map: FxHashMap::default(),
        }
    }

    pub(crate) fn get(&self, index: u32) -> Option<&ConformanceData> {
        self.records.get(index as usize)
    }

    pub(crate) fn get_mut(&mut self, index: u32) -> Option<&mut ConformanceData> {
        self.records.get_mut(index as usize)
    }

    pub(crate) fn intern_normal(
        &mut self,
        ty: TypeId,
        protocol: DeclId,
        decl_context: DeclId,
    ) -> (u32, usize) {
        if let Some(&index) = self.normal_map.get(&(ty, protocol, decl_context)) {
            return (index, 0);
        }
        let index = self.push(ConformanceData::Normal {
            ty,
            protocol,
            decl_context,
            witnesses: FxHashMap::default(),
        });
        self.normal_map.insert((ty, protocol, decl_context), index);
        (index, std::mem::size_of::<ConformanceData>())
    }

    pub(crate) fn intern_specialized(
        &mut self,
        ty: TypeId,
        underlying: ConformanceId,
        substitutions: SubstitutionMap,
    ) -> (u32, usize) {
        if let Some(&index) = self.specialized_map.get(&(ty, underlying, substitutions)) {
            return (index, 0);
        }
        let index = self.push(ConformanceData::Specialized {
            ty,
            underlying,
            substitutions,
        });
        self.specialized_map
            .insert((ty, underlying, substitutions), index);
        (index, std::mem::size_of::<ConformanceData>())
    }

    pub(crate) fn intern_inherited(
        &mut self,
        ty: TypeId,
        underlying: ConformanceId,
    ) -> (u32, usize) {
        if let Some(&index) = self.inherited_map.get(&(ty, underlying)) {
            return (index, 0);
        }
        let index = self.push(ConformanceData::Inherited { ty, underlying });
        self.inherited_map.insert((ty, underlying), index);
        (index, std::mem::size_of::<ConformanceData>())
    }

    pub(crate) fn intern_self(&mut self, protocol: DeclId) -> (u32, usize) {
        if let Some(&index) = self.self_map.get(&protocol) {
            return (index, 0);
        }
        let index = self.push(ConformanceData::SelfConformance { protocol });
        self.self_map.insert(protocol, index);
        (index, std::mem::size_of::<ConformanceData>())
    }

    fn push(&mut self, data: ConformanceData) -> u32 {
        let index = self.records.len() as u32;
        self.records.push(data);
        index
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
#[path = "tests/conformance_tests.rs"]
mod tests;
