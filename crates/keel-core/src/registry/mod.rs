//! # Keel Core Component Registry
//!
//! Components are registered explicitly: every [`ComponentPackage`] adds its
//! [`ComponentDescriptor`]s to one ordered [`ComponentRegistry`], which
//! [`discover`] returns complete before any environment is built.
//! Registration order is the order components are constructed in and the
//! tie-break order of every phase chain.
pub mod error;

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::config::Settings;
use crate::kernel::component::ComponentDescriptor;
use crate::kernel::constants;
pub use error::RegistryError;

/// A named group of components registered together.
pub trait ComponentPackage {
    fn name(&self) -> &'static str;

    fn register(&self, registry: &mut ComponentRegistry) -> Result<(), RegistryError>;
}

/// Package registering a fixed list of descriptors.
#[derive(Debug, Clone)]
pub struct StaticPackage {
    name: &'static str,
    descriptors: Vec<ComponentDescriptor>,
}

impl StaticPackage {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            descriptors: Vec::new(),
        }
    }

    pub fn with(mut self, descriptor: ComponentDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }
}

impl ComponentPackage for StaticPackage {
    fn name(&self) -> &'static str {
        self.name
    }

    fn register(&self, registry: &mut ComponentRegistry) -> Result<(), RegistryError> {
        for descriptor in &self.descriptors {
            registry.register(descriptor.clone())?;
        }
        Ok(())
    }
}

/// Packages and component identities excluded from an environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    packages: HashSet<String>,
    components: HashSet<String>,
}

impl IgnoreList {
    pub fn new<P, C>(packages: P, components: C) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    /// Read `packages.ignore` and `components.ignore` from the core settings section.
    pub fn from_settings(core: &Settings) -> Self {
        Self::new(
            core.get_list(constants::PACKAGES_IGNORE_KEY),
            core.get_list(constants::COMPONENTS_IGNORE_KEY),
        )
    }

    pub fn ignores_package(&self, package: &str) -> bool {
        self.packages.contains(package)
    }

    pub fn ignores_component(&self, identity: &str) -> bool {
        self.components.contains(identity)
    }

    /// Whether a component with this identity and owning package is excluded.
    pub fn excludes(&self, identity: &str, package: &str) -> bool {
        self.ignores_component(identity) || self.ignores_package(package)
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty() && self.components.is_empty()
    }
}

/// Ordered collection of component descriptors.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    descriptors: IndexMap<&'static str, ComponentDescriptor>,
    ignore: IgnoreList,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that silently skips descriptors matching `ignore`.
    pub fn with_ignore(ignore: IgnoreList) -> Self {
        Self {
            descriptors: IndexMap::new(),
            ignore,
        }
    }

    /// Register a descriptor. Ignored descriptors are skipped; a second
    /// descriptor with an already registered identity is an error.
    pub fn register(&mut self, descriptor: ComponentDescriptor) -> Result<(), RegistryError> {
        let identity = descriptor.identity();
        if self.ignore.excludes(identity, descriptor.package()) {
            log::info!("Skipping ignored component: {}", identity);
            return Ok(());
        }
        if let Some(existing) = self.descriptors.get(identity) {
            return Err(RegistryError::DuplicateIdentity {
                identity: identity.to_string(),
                package: existing.package().to_string(),
            });
        }
        log::debug!("Registered component '{}' from package '{}'", identity, descriptor.package());
        self.descriptors.insert(identity, descriptor);
        Ok(())
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.descriptors.contains_key(identity)
    }

    pub fn get(&self, identity: &str) -> Option<&ComponentDescriptor> {
        self.descriptors.get(identity)
    }

    /// Registered identities in registration order.
    pub fn identities(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.descriptors.keys().copied()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.descriptors.values()
    }

    pub fn into_descriptors(self) -> Vec<ComponentDescriptor> {
        self.descriptors.into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Build the registry from `packages`, honouring `ignore`.
///
/// Ignored packages are never asked to register. The first failing package
/// aborts discovery.
pub fn discover(packages: &[&dyn ComponentPackage], ignore: &IgnoreList) -> Result<ComponentRegistry, RegistryError> {
    let mut registry = ComponentRegistry::with_ignore(ignore.clone());

    for package in packages {
        let name = package.name();
        if ignore.ignores_package(name) {
            log::info!("Skipping ignored package: {}", name);
            continue;
        }
        log::debug!("Loading components from package: {}", name);
        package
            .register(&mut registry)
            .map_err(|e| RegistryError::PackageFailed {
                package: name.to_string(),
                source: Box::new(e),
            })?;
    }

    log::info!(
        "Discovered {} component(s): {}",
        registry.len(),
        registry.identities().collect::<Vec<_>>().join(", ")
    );
    Ok(registry)
}
