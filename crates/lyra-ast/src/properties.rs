//! Recursive type properties and allocation-arena selection.
//!
//! Every type entry carries a bitset summarizing structural facts about its
//! transitive children (contains the error type, contains an unresolved type
//! variable, is an l-value, ...). The bits are computed bottom-up when a type
//! is constructed and are the sole input to arena selection: anything that
//! contains a type variable belongs to the short-lived constraint-solver
//! arena, everything else to the permanent arena.

use bitflags::bitflags;

bitflags! {
    /// Structural facts about a type, folded over its children.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
    pub struct RecursiveTypeProperties: u16 {
        /// The type is or contains the error type.
        const HAS_ERROR = 1 << 0;
        /// The type contains an unresolved type variable.
        const HAS_TYPE_VARIABLE = 1 << 1;
        /// The type contains a dependent member type.
        const HAS_DEPENDENT_MEMBER = 1 << 2;
        /// The type contains an archetype.
        const HAS_ARCHETYPE = 1 << 3;
        /// The type contains an opened-existential archetype.
        const HAS_OPENED_EXISTENTIAL = 1 << 4;
        /// The type contains an unbound generic parameter.
        const HAS_GENERIC_PARAM = 1 << 5;
        /// The type is an l-value.
        const IS_LVALUE = 1 << 6;
    }
}

impl RecursiveTypeProperties {
    /// Fold properties of several children into one parent bitset.
    ///
    /// All bits except `IS_LVALUE` propagate upward: an l-value child does
    /// not make the aggregate an l-value.
    pub fn fold<I>(children: I) -> Self
    where
        I: IntoIterator<Item = RecursiveTypeProperties>,
    {
        let mut folded = RecursiveTypeProperties::empty();
        for child in children {
            folded |= child;
        }
        folded.remove(RecursiveTypeProperties::IS_LVALUE);
        folded
    }

    #[inline]
    pub fn has_error(self) -> bool {
        self.contains(RecursiveTypeProperties::HAS_ERROR)
    }

    #[inline]
    pub fn has_type_variable(self) -> bool {
        self.contains(RecursiveTypeProperties::HAS_TYPE_VARIABLE)
    }

    #[inline]
    pub fn has_dependent_member(self) -> bool {
        self.contains(RecursiveTypeProperties::HAS_DEPENDENT_MEMBER)
    }

    #[inline]
    pub fn has_archetype(self) -> bool {
        self.contains(RecursiveTypeProperties::HAS_ARCHETYPE)
    }

    #[inline]
    pub fn is_lvalue(self) -> bool {
        self.contains(RecursiveTypeProperties::IS_LVALUE)
    }
}

/// The two allocation arenas of a context.
///
/// Objects must never be allocated into a shorter-lived arena than the
/// longest-lived object that references them: a composite whose children are
/// all permanent may still be solver-scoped (it has a type variable of its
/// own), but a permanent composite can never reference solver-scoped
/// children.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AllocationArena {
    /// Lives for the whole compilation.
    Permanent,
    /// Scoped to a single type-inference attempt.
    ConstraintSolver,
}

impl AllocationArena {
    /// Select the arena for an object with the given recursive properties.
    ///
    /// Pure: ConstraintSolver iff the properties indicate an unresolved type
    /// variable.
    #[inline]
    pub fn select(properties: RecursiveTypeProperties) -> AllocationArena {
        if properties.has_type_variable() {
            AllocationArena::ConstraintSolver
        } else {
            AllocationArena::Permanent
        }
    }
}

#[cfg(test)]
#[path = "tests/properties_tests.rs"]
mod tests;
