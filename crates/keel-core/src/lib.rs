pub mod components;
pub mod config;
pub mod kernel;
pub mod registry;
pub mod schema;

// Re-export key public types/traits for easier use by the binary and component packages
pub use components::{CoreComponent, CorePackage};
pub use config::{Config, ConfigFormat, Settings};
pub use kernel::error::Error as KernelError;
pub use kernel::{Component, ComponentDescriptor, EnvRef, Environment, Phase};
pub use registry::{ComponentPackage, ComponentRegistry, IgnoreList};
pub use schema::{SchemaCatalog, SchemaMetadata, StoreHandle};
