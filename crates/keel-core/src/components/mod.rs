//! Components shipped with `keel-core`.
//!
//! Currently this is only the anchor, [`CoreComponent`], which every
//! environment needs: chains start with it and it provides the store that
//! schema metadata is bound to.
pub mod core_component;

pub use core_component::{CoreComponent, CorePackage};
