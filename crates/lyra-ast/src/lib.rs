//! AST context and type-interning substrate for the lyra compiler.
//!
//! This crate implements the data-interning layer every other compiler
//! component depends on:
//!
//! - **`AstContext`**: the per-compilation owner of all types,
//!   declarations, conformances, and generic signatures
//! - **Arenas**: a permanent region for whole-compilation objects and a
//!   scoped constraint-solver region for inference attempts
//! - **Canonicalization**: structurally-equal composite types intern to
//!   the same [`TypeId`] handle, so type equality is O(1)
//!
//! Key benefits:
//! - O(1) type equality via interning (`TypeId` comparison)
//! - Arena lifetimes enforced at construction time (a permanent composite
//!   can never reference solver-scoped children)
//! - Errors are data: semantic failure propagates through the canonical
//!   error type, not exceptions

pub mod arena;
pub mod conformance;
pub mod context;
pub mod decls;
pub mod generics;
mod intern;
mod intern_conformance;
mod intern_generics;
pub mod module_loader;
pub mod properties;
pub mod types;

pub use arena::{Region, RegionRef};
pub use conformance::{ConformanceData, ConformanceRef};
pub use context::{AstContext, ConstraintSolverSession, ContextOptions};
pub use decls::{DeclId, DeclInfo, DeclKind, DeclStore, KnownProtocolKind, KnownTypeKind};
pub use generics::{
    GenericParamKey, GenericSignature, Requirement, RequirementKind, SubstitutionMapData,
};
pub use intern::TypeInterner;
pub use intern_generics::GenericEnvironment;
pub use module_loader::ModuleLoader;
pub use properties::{AllocationArena, RecursiveTypeProperties};
pub use types::{
    ConformanceId, FunctionParam, FunctionTypeFlags, GenericEnvId, GenericSignatureId,
    MetatypeRepresentation, ParamFlags, ParamListId, ReferenceOwnership, SubstitutionMap,
    SubstitutionMapId, TupleElement, TupleElementFlags, TupleListId, TypeId, TypeKey, TypeListId,
};
