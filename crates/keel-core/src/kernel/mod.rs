//! # Keel Core Kernel
//!
//! The `kernel` module forms the heart of `keel-core`. It owns the component
//! contract, computes dependency-ordered chains for each lifecycle phase and
//! drives every component through those phases.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Component Contract**: the [`Component`](component::Component) trait and the
//!   static [`ComponentDescriptor`](component::ComponentDescriptor) each component
//!   type registers, including its per-phase requirement table.
//! - **Chain Building**: [`ChainBuilder`](chain::ChainBuilder) orders components for a
//!   phase so that the anchor comes first and every requirement precedes its dependent.
//! - **Environment**: [`Environment`](environment::Environment) instantiates the
//!   registered components from configuration and runs the `initialize` and
//!   `configure` phases.
//! - **Global Handle**: the [`handle`] submodule publishes one environment for code
//!   that cannot receive it as a parameter.
//! - **Error Handling**: kernel error types ([`Error`](error::Error)) and a `Result`
//!   alias in the `error` submodule.
pub mod chain;
pub mod component;
pub mod constants;
pub mod environment;
pub mod error;
pub mod handle;

pub use chain::ChainBuilder;
pub use component::{Component, ComponentDescriptor, ComponentFactory, EnvRef, Phase};
pub use environment::Environment;
pub use error::{Error, Result};
// Test module declaration
#[cfg(test)]
mod tests;
