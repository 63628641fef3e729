//! Protocol-conformance interning.
//!
//! This file extends [`TypeInterner`] with the conformance tables. Normal
//! and self conformances always live in the permanent arena; specialized
//! and inherited records follow their conforming type's arena.
//!
//! The specialized factory applies the collapse rule before allocating:
//! a substitution that is the identity on the conforming type, with only
//! trivial conformances, returns the root conformance unchanged. Skipping
//! the collapse would grow unbounded wrapper chains under repeated
//! substitution round-trips, so it is a required step, not an optimization
//! toggle.

use crate::conformance::ConformanceData;
use crate::decls::DeclId;
use crate::intern::TypeInterner;
use crate::properties::AllocationArena;
use crate::types::{ConformanceId, SubstitutionMap, TypeId};
use lyra_common::interner::Atom;
use lyra_common::limits::MAX_CONFORMANCE_UNWRAP_DEPTH;
use tracing::trace;

impl TypeInterner {
    /// Look up or create the normal conformance of `ty` to `protocol`
    /// declared in `decl_context`.
    ///
    /// Normal conformances are never constraint-solver-scoped.
    pub fn normal_conformance(
        &self,
        ty: TypeId,
        protocol: DeclId,
        decl_context: DeclId,
    ) -> ConformanceId {
        assert!(
            !ty.in_constraint_solver(),
            "normal conformances live in the permanent arena"
        );
        self.with_arena(AllocationArena::Permanent, |tables| {
            let (index, bytes) = tables.conformances.intern_normal(ty, protocol, decl_context);
            tables.region.charge(bytes);
            ConformanceId::from_parts(tables.arena, index)
        })
    }

    /// Clone out a conformance record. `None` for stale solver handles.
    pub fn conformance(&self, id: ConformanceId) -> Option<ConformanceData> {
        let (arena, index) = id.split();
        self.with_id_arena(arena, |tables| tables.conformances.get(index).cloned())
    }

    /// Walk a chain of specialized wrappers to its root conformance
    /// (normal, inherited, or self).
    fn conformance_root(&self, id: ConformanceId) -> ConformanceId {
        let mut current = id;
        for _ in 0..MAX_CONFORMANCE_UNWRAP_DEPTH {
            match self.conformance(current) {
                Some(ConformanceData::Specialized { underlying, .. }) => current = underlying,
                _ => return current,
            }
        }
        panic!("conformance specialization chain exceeds unwrap depth limit");
    }

    /// Look up or create the conformance of `ty` seen through
    /// `substitutions` applied to `generic`.
    ///
    /// Collapses to the root conformance when the substitution is the
    /// identity on the root's type and carries only trivial conformances.
    pub fn specialized_conformance(
        &self,
        ty: TypeId,
        generic: ConformanceId,
        substitutions: SubstitutionMap,
    ) -> ConformanceId {
        let root = self.conformance_root(generic);
        let root_ty = self
            .conformance(root)
            .and_then(|data| data.conforming_type());
        let trivial = substitutions.is_empty()
            || self
                .substitution_map_data(substitutions)
                .is_some_and(|data| data.conformances.iter().all(|c| c.is_abstract()));
        if root_ty == Some(ty) && trivial {
            trace!(?root, "specialized conformance collapsed to its root");
            return root;
        }

        let arena = if ty.in_constraint_solver() {
            AllocationArena::ConstraintSolver
        } else {
            AllocationArena::Permanent
        };
        self.with_arena(arena, |tables| {
            let (index, bytes) = tables
                .conformances
                .intern_specialized(ty, generic, substitutions);
            tables.region.charge(bytes);
            ConformanceId::from_parts(tables.arena, index)
        })
    }

    /// Look up or create the conformance of `ty` inherited from a
    /// superclass conformance. No collapse rule applies.
    pub fn inherited_conformance(&self, ty: TypeId, inherited: ConformanceId) -> ConformanceId {
        let arena = if ty.in_constraint_solver() {
            AllocationArena::ConstraintSolver
        } else {
            AllocationArena::Permanent
        };
        self.with_arena(arena, |tables| {
            let (index, bytes) = tables.conformances.intern_inherited(ty, inherited);
            tables.region.charge(bytes);
            ConformanceId::from_parts(tables.arena, index)
        })
    }

    /// The self conformance of a protocol: at most one per protocol per
    /// context, lazily created in a direct map.
    pub fn self_conformance(&self, protocol: DeclId) -> ConformanceId {
        self.with_arena(AllocationArena::Permanent, |tables| {
            let (index, bytes) = tables.conformances.intern_self(protocol);
            tables.region.charge(bytes);
            ConformanceId::from_parts(tables.arena, index)
        })
    }

    /// Record a witness on a normal conformance. Witness tables are filled
    /// in by type checking after the record is interned.
    ///
    /// Re-recording an already-set witness is a programmer error, as is
    /// recording one on anything but a normal conformance.
    pub fn set_witness(&self, id: ConformanceId, requirement: Atom, witness: TypeId) {
        let (arena, index) = id.split();
        let updated = self.with_id_arena_mut(arena, |tables| {
            let record = tables.conformances.get_mut(index)?;
            match record {
                ConformanceData::Normal { witnesses, .. } => {
                    let previous = witnesses.insert(requirement, witness);
                    assert!(
                        previous.is_none(),
                        "witness for requirement already recorded"
                    );
                    Some(())
                }
                _ => panic!("witnesses can only be recorded on normal conformances"),
            }
        });
        assert!(updated.is_some(), "set_witness on a stale conformance");
    }

    /// Look up a recorded witness on a normal conformance.
    pub fn witness(&self, id: ConformanceId, requirement: Atom) -> Option<TypeId> {
        match self.conformance(id)? {
            ConformanceData::Normal { witnesses, .. } => witnesses.get(&requirement).copied(),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "tests/intern_conformance_tests.rs"]
mod tests;
