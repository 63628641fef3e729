//! Generic-signature, substitution-map, and archetype interning.
//!
//! This file extends [`TypeInterner`] with the generic-context tables:
//! signatures keyed on (parameters, requirements), substitution-map storage
//! keyed on (signature, replacements at canonical positions, conformances),
//! and the generic environments that tie primary archetypes to their
//! signatures.
//!
//! Environment construction is the one place interning re-enters itself:
//! building an environment interns archetypes into the same tables that
//! memoize the environment. The factories here reserve their entry first,
//! construct, then re-verify the insertion point — a safety net against a
//! nested call stealing the slot, not a concurrency mechanism.

use crate::generics::{
    GenericParamKey, GenericSignature, Requirement, RequirementKind, SubstitutionMapData,
};
use crate::intern::{EnvRecord, TypeInterner};
use crate::properties::{AllocationArena, RecursiveTypeProperties};
use crate::types::{
    GenericEnvId, GenericSignatureId, SubstitutionMap, SubstitutionMapId, TypeId, TypeKey,
};
use tracing::trace;

/// A finalized generic environment, cloned out for callers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericEnvironment {
    pub signature: GenericSignatureId,
    pub archetypes: Vec<TypeId>,
}

enum EnvPhase {
    Existing(GenericEnvId),
    Reserved(u32, GenericEnvId),
}

impl TypeInterner {
    // =========================================================================
    // Generic signatures
    // =========================================================================

    /// Fold the recursive properties of a signature's requirements.
    pub(crate) fn signature_properties(&self, id: GenericSignatureId) -> RecursiveTypeProperties {
        let Some(signature) = self.signature(id) else {
            return RecursiveTypeProperties::empty();
        };
        self.requirement_properties(&signature.requirements)
    }

    fn requirement_properties(&self, requirements: &[Requirement]) -> RecursiveTypeProperties {
        RecursiveTypeProperties::fold(
            requirements
                .iter()
                .flat_map(|req| [req.subject, req.constraint])
                .map(|ty| self.properties(ty)),
        )
    }

    /// Look up or create a generic signature.
    ///
    /// The arena is chosen by whether any requirement contains a type
    /// variable — the analogue of the type-level selector.
    pub fn generic_signature(
        &self,
        params: Vec<GenericParamKey>,
        requirements: Vec<Requirement>,
    ) -> GenericSignatureId {
        let props = self.requirement_properties(&requirements);
        let arena = AllocationArena::select(props);
        self.with_arena(arena, |tables| {
            let (index, bytes) = tables.signatures.intern(params, requirements);
            tables.region.charge(bytes);
            GenericSignatureId::from_parts(tables.arena, index)
        })
    }

    /// Clone out a signature. `None` for a stale solver handle.
    pub fn signature(&self, id: GenericSignatureId) -> Option<GenericSignature> {
        let (arena, index) = id.split();
        self.with_id_arena(arena, |tables| {
            tables.signatures.get(index).map(|record| GenericSignature {
                params: record.params.clone(),
                requirements: record.requirements.clone(),
                is_canonical: record.is_canonical,
            })
        })
    }

    /// Stamp an existing signature as known-canonical, in place. No
    /// reinsertion happens; the handle stays valid.
    pub fn mark_signature_canonical(&self, id: GenericSignatureId) {
        let (arena, index) = id.split();
        let stamped = self.with_id_arena_mut(arena, |tables| {
            tables.signatures.mark_canonical(index);
            Some(())
        });
        assert!(stamped.is_some(), "mark_signature_canonical on a stale signature");
    }

    // =========================================================================
    // Substitution maps
    // =========================================================================

    /// Look up or create substitution-map storage.
    ///
    /// A `None` signature yields the empty sentinel: no storage, no
    /// allocation, byte counters untouched. Otherwise the profile hashes
    /// replacements only at canonical parameter positions; positions fixed
    /// by a same-type requirement contribute a null placeholder.
    pub fn substitution_map(
        &self,
        signature: Option<GenericSignatureId>,
        replacements: Vec<TypeId>,
        conformances: Vec<crate::conformance::ConformanceRef>,
    ) -> SubstitutionMap {
        let Some(signature) = signature else {
            return SubstitutionMap::EMPTY;
        };

        let data = self
            .signature(signature)
            .expect("substitution map over a stale signature");
        assert_eq!(
            replacements.len(),
            data.params.len(),
            "substitution map replacement count must match signature arity"
        );

        let profile: Vec<Option<TypeId>> = data
            .params
            .iter()
            .zip(replacements.iter())
            .map(|(param, &replacement)| {
                if self.param_position_is_canonical(&data, *param) {
                    Some(replacement)
                } else {
                    None
                }
            })
            .collect();

        let props = self.fold_props(replacements.iter().copied());
        let arena = AllocationArena::select(props);
        self.with_arena(arena, |tables| {
            let (index, bytes) = tables.substitutions.intern(
                (signature, profile, conformances.clone()),
                SubstitutionMapData {
                    signature,
                    replacements,
                    conformances,
                },
            );
            tables.region.charge(bytes);
            SubstitutionMap::from_storage(SubstitutionMapId::from_parts(tables.arena, index))
        })
    }

    /// A parameter position is canonical unless a same-type requirement
    /// fixes that parameter to something else.
    fn param_position_is_canonical(
        &self,
        signature: &GenericSignature,
        param: GenericParamKey,
    ) -> bool {
        !signature.requirements.iter().any(|req| {
            req.kind == RequirementKind::SameType
                && matches!(
                    self.lookup(req.subject),
                    Some(TypeKey::GenericParam { depth, index })
                        if depth == param.depth && index == param.index
                )
        })
    }

    /// Clone out substitution-map storage. `None` for the empty sentinel
    /// and for stale solver handles.
    pub fn substitution_map_data(&self, map: SubstitutionMap) -> Option<SubstitutionMapData> {
        let storage = map.storage()?;
        let (arena, index) = storage.split();
        self.with_id_arena(arena, |tables| tables.substitutions.get(index).cloned())
    }

    // =========================================================================
    // Generic environments and archetypes
    // =========================================================================

    /// Look up or build the generic environment of a signature.
    ///
    /// Memoized per signature in the signature's arena. Construction is
    /// re-entrant: interning the primary archetypes mutates the same tables
    /// this memo lives in, so the entry is reserved first and the insertion
    /// point re-verified after construction.
    pub fn generic_environment(&self, signature: GenericSignatureId) -> GenericEnvId {
        let sig_props = self.signature_properties(signature);
        let arena = if signature.in_constraint_solver() {
            AllocationArena::ConstraintSolver
        } else {
            AllocationArena::Permanent
        };

        // Phase 1: memo hit, or reserve a placeholder entry.
        let phase = self.with_arena(arena, |tables| {
            if let Some(&index) = tables.env_memo.get(&signature) {
                return EnvPhase::Existing(GenericEnvId::from_parts(tables.arena, index));
            }
            let index = tables.envs.len() as u32;
            tables.envs.push(EnvRecord {
                signature,
                archetypes: Vec::new(),
                finalized: false,
            });
            tables.env_memo.insert(signature, index);
            tables.region.charge(std::mem::size_of::<EnvRecord>());
            EnvPhase::Reserved(index, GenericEnvId::from_parts(tables.arena, index))
        });

        let (index, env) = match phase {
            EnvPhase::Existing(env) => return env,
            EnvPhase::Reserved(index, env) => (index, env),
        };

        // Phase 2: construct, with no table borrow held. Interning the
        // archetypes may recurse into these tables.
        let params = self
            .signature(signature)
            .expect("generic environment over a stale signature")
            .params;
        let archetypes: Vec<TypeId> = params
            .iter()
            .map(|param| {
                let param_ty = self.generic_param(param.depth, param.index);
                let props = sig_props | RecursiveTypeProperties::HAS_ARCHETYPE;
                self.intern_key(
                    arena,
                    TypeKey::PrimaryArchetype {
                        env,
                        param: param_ty,
                    },
                    props,
                    None,
                )
            })
            .collect();

        // Phase 3: finalize and re-verify the insertion point.
        self.with_arena(arena, |tables| {
            let record = &mut tables.envs[index as usize];
            debug_assert!(!record.finalized, "generic environment finalized twice");
            record.archetypes = archetypes;
            record.finalized = true;

            let current = tables.env_memo.get(&signature).copied();
            assert_eq!(
                current,
                Some(index),
                "generic environment insertion point invalidated during construction"
            );
        });

        trace!(?env, ?signature, "built generic environment");
        env
    }

    /// Clone out a finalized environment. `None` for stale handles; an
    /// environment still under construction reports its reserved state.
    pub fn environment(&self, id: GenericEnvId) -> Option<GenericEnvironment> {
        let (arena, index) = id.split();
        self.with_id_arena(arena, |tables| {
            tables.envs.get(index as usize).map(|record| GenericEnvironment {
                signature: record.signature,
                archetypes: record.archetypes.clone(),
            })
        })
    }

    /// The primary archetype instantiating the environment's parameter at
    /// `position`.
    pub fn archetype(&self, env: GenericEnvId, position: usize) -> Option<TypeId> {
        self.environment(env)?.archetypes.get(position).copied()
    }

    /// Look up or create an opaque-result archetype.
    ///
    /// Constructing the archetype's generic environment can itself intern
    /// new types into the same table, so the factory commits the node
    /// first, builds the environment, then re-checks that the insertion
    /// point still resolves to the committed node.
    pub fn opaque_archetype(
        &self,
        decl: crate::decls::DeclId,
        signature: GenericSignatureId,
        substitutions: SubstitutionMap,
    ) -> TypeId {
        let mut props = RecursiveTypeProperties::HAS_ARCHETYPE
            | self.signature_properties(signature);
        if let Some(data) = self.substitution_map_data(substitutions) {
            props |= self.fold_props(data.replacements.iter().copied());
        }
        let arena = AllocationArena::select(props);

        let key = TypeKey::OpaqueArchetype {
            decl,
            substitutions,
        };

        // First insertion-point lookup: the dominant fast path.
        if let Some(existing) = self.find_key(arena, &key) {
            return existing;
        }

        let id = self.intern_key(arena, key.clone(), props, None);

        // Environment construction may mutate the table we just inserted
        // into; tolerate that and re-check the insertion point.
        let _env = self.generic_environment(signature);

        let committed = self
            .find_key(arena, &key)
            .expect("opaque archetype entry lost during environment construction");
        assert_eq!(
            committed, id,
            "opaque archetype insertion point invalidated during environment construction"
        );
        id
    }
}

#[cfg(test)]
#[path = "tests/intern_generics_tests.rs"]
mod tests;
