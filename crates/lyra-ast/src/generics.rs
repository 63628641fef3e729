//! Generic signatures and substitution-map storage.
//!
//! A generic signature is keyed by its ordered parameter list plus its
//! requirement list; substitution-map storage is keyed by (signature,
//! replacement types at canonical parameter positions, conformance list).
//! The tables here are dumb uniquing stores; arena selection and profile
//! computation live on `TypeInterner` (see `intern_generics.rs`).

use crate::conformance::ConformanceRef;
use crate::types::{GenericSignatureId, TypeId};
use rustc_hash::FxHashMap;

/// A canonical generic parameter position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GenericParamKey {
    pub depth: u32,
    pub index: u32,
}

impl GenericParamKey {
    pub fn new(depth: u32, index: u32) -> GenericParamKey {
        GenericParamKey { depth, index }
    }
}

/// Kind of a generic requirement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RequirementKind {
    /// `subject : constraint` where constraint is a protocol or composition.
    Conformance,
    /// `subject : constraint` where constraint is a class.
    Superclass,
    /// `subject == constraint`.
    SameType,
}

/// One requirement of a generic signature.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Requirement {
    pub kind: RequirementKind,
    pub subject: TypeId,
    pub constraint: TypeId,
}

impl Requirement {
    pub fn conformance(subject: TypeId, constraint: TypeId) -> Requirement {
        Requirement {
            kind: RequirementKind::Conformance,
            subject,
            constraint,
        }
    }

    pub fn same_type(subject: TypeId, constraint: TypeId) -> Requirement {
        Requirement {
            kind: RequirementKind::SameType,
            subject,
            constraint,
        }
    }
}

/// A generic signature, cloned out of the interner for callers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericSignature {
    pub params: Vec<GenericParamKey>,
    pub requirements: Vec<Requirement>,
    /// Whether the signature has been stamped canonical. Stamping happens
    /// after the fact, without reinsertion.
    pub is_canonical: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct SignatureRecord {
    pub params: Vec<GenericParamKey>,
    pub requirements: Vec<Requirement>,
    pub is_canonical: bool,
}

/// Uniquing table for generic signatures within one arena.
pub(crate) struct SignatureTable {
    map: FxHashMap<(Vec<GenericParamKey>, Vec<Requirement>), u32>,
    records: Vec<SignatureRecord>,
}

impl SignatureTable {
    pub(crate) fn new() -> SignatureTable {
        SignatureTable {
            map: FxHashMap::default(),
            records: Vec::new(),
        }
    }

    /// Look up or insert a signature. Returns the local index and the
    /// number of bytes charged to the arena (zero on a hit).
    pub(crate) fn intern(
        &mut self,
        params: Vec<GenericParamKey>,
        requirements: Vec<Requirement>,
    ) -> (u32, usize) {
        let key = (params, requirements);
        if let Some(&index) = self.map.get(&key) {
            return (index, 0);
        }

        let (params, requirements) = key.clone();
        let bytes = std::mem::size_of::<SignatureRecord>()
            + params.len() * std::mem::size_of::<GenericParamKey>()
            + requirements.len() * std::mem::size_of::<Requirement>();
        let index = self.records.len() as u32;
        self.records.push(SignatureRecord {
            params,
            requirements,
            is_canonical: false,
        });
        self.map.insert(key, index);
        (index, bytes)
    }

    pub(crate) fn get(&self, index: u32) -> Option<&SignatureRecord> {
        self.records.get(index as usize)
    }

    /// Stamp an existing signature canonical. No reinsertion: the record is
    /// mutated in place.
    pub(crate) fn mark_canonical(&mut self, index: u32) {
        let record = self
            .records
            .get_mut(index as usize)
            .expect("mark_canonical on unknown signature");
        record.is_canonical = true;
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}

/// Substitution-map storage, cloned out of the interner for callers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubstitutionMapData {
    pub signature: GenericSignatureId,
    pub replacements: Vec<TypeId>,
    pub conformances: Vec<ConformanceRef>,
}

/// The hashed profile of substitution-map storage.
///
/// Replacement types at non-canonical parameter positions contribute a
/// `None` placeholder instead of their actual type, matching the
/// folding-set profile of the original design.
pub(crate) type SubstitutionProfile = (
    GenericSignatureId,
    Vec<Option<TypeId>>,
    Vec<ConformanceRef>,
);

/// Uniquing table for substitution-map storage within one arena.
pub(crate) struct SubstitutionTable {
    map: FxHashMap<SubstitutionProfile, u32>,
    records: Vec<SubstitutionMapData>,
}

impl SubstitutionTable {
    pub(crate) fn new() -> SubstitutionTable {
        SubstitutionTable {
            map: FxHashMap::default(),
            records: Vec::new(),
        }
    }

    /// Look up or insert storage under the given profile. Returns the local
    /// index and the bytes charged (zero on a hit).
    pub(crate) fn intern(
        &mut self,
        profile: SubstitutionProfile,
        data: SubstitutionMapData,
    ) -> (u32, usize) {
        if let Some(&index) = self.map.get(&profile) {
            return (index, 0);
        }

        let bytes = std::mem::size_of::<SubstitutionMapData>()
            + data.replacements.len() * std::mem::size_of::<TypeId>()
            + data.conformances.len() * std::mem::size_of::<ConformanceRef>();
        let index = self.records.len() as u32;
        self.records.push(data);
        self.map.insert(profile, index);
        (index, bytes)
    }

    pub(crate) fn get(&self, index: u32) -> Option<&SubstitutionMapData> {
        self.records.get(index as usize)
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
#[path = "tests/generics_tests.rs"]
mod tests;
