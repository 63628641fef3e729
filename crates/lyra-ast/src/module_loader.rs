//! The module-loader boundary.
//!
//! The context never reads the filesystem or deserializes modules itself;
//! hosts register loaders and the context calls back through this narrow,
//! enumerable trait. Loaders receive the declaration store directly so
//! they can register the declarations they produce without re-entering the
//! context.

use crate::decls::{DeclId, DeclStore};
use lyra_common::interner::Atom;

/// A source of modules, registered with the context by the host.
pub trait ModuleLoader {
    /// Whether this loader could satisfy an import of `name`, without
    /// actually loading it.
    fn can_import_module(&self, name: Atom) -> bool;

    /// Load the module named `name`, registering its declarations into
    /// `decls`. Returns the module declaration, or `None` if this loader
    /// does not provide it.
    fn load_module(&mut self, name: Atom, decls: &mut DeclStore) -> Option<DeclId>;

    /// Load any extensions of `nominal` this loader knows about.
    fn load_extensions(&mut self, nominal: DeclId, decls: &mut DeclStore) {
        let _ = (nominal, decls);
    }

    /// Append the names of every top-level module this loader can see.
    fn collect_visible_top_level_module_names(&self, names: &mut Vec<Atom>);
}
