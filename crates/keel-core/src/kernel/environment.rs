use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexMap;

use crate::components::CoreComponent;
use crate::config::{Config, Settings};
use crate::kernel::chain::ChainBuilder;
use crate::kernel::component::{Component, ComponentDescriptor, EnvRef, Phase};
use crate::kernel::constants;
use crate::kernel::error::{Error, Result};
use crate::registry::{self, ComponentPackage, ComponentRegistry, IgnoreList};
use crate::schema::{SchemaCatalog, StoreHandle};

/// An instantiated component together with the descriptor that built it.
#[derive(Debug)]
struct ComponentSlot {
    descriptor: ComponentDescriptor,
    instance: Arc<dyn Component>,
}

/// Owns every instantiated component and drives them through their lifecycle.
///
/// An environment is built once per process run, initialized once, and then
/// only read. A failed construction or lifecycle run leaves nothing to
/// recover: drop the environment and report the error.
#[derive(Debug)]
pub struct Environment {
    config: Config,
    components: IndexMap<String, ComponentSlot>,
    initialized: AtomicBool,
}

impl Environment {
    /// Discover components from `packages` and instantiate them from `config`.
    ///
    /// Ignore lists are read from the `core` section (`packages.ignore`,
    /// `components.ignore`).
    pub fn new(config: Config, packages: &[&dyn ComponentPackage]) -> Result<Arc<Self>> {
        log::info!("Initializing {} v{}", constants::APP_NAME, constants::APP_VERSION);

        let ignore = IgnoreList::from_settings(&config.settings(constants::CORE_IDENTITY));
        let registry = registry::discover(packages, &ignore)?;
        Self::from_registry(config, registry)
    }

    /// Load configuration from the file named by `KEEL_CONFIG`, interpolating
    /// process environment variables, then build as in [`Environment::new`].
    pub fn from_env(packages: &[&dyn ComponentPackage]) -> Result<Arc<Self>> {
        let config = Config::from_env()?;
        Self::new(config, packages)
    }

    /// Instantiate the components of an already populated registry.
    pub fn from_registry(config: Config, registry: ComponentRegistry) -> Result<Arc<Self>> {
        let ignore = IgnoreList::from_settings(&config.settings(constants::CORE_IDENTITY));
        let descriptors: Vec<ComponentDescriptor> = registry
            .into_descriptors()
            .into_iter()
            .filter(|d| !ignore.excludes(d.identity(), d.package()))
            .collect();

        // Components receive a weak reference to the environment they are built into,
        // so construction has to happen inside `new_cyclic`.
        let mut failure = None;
        let env = Arc::new_cyclic(|weak| {
            let env_ref = EnvRef::new(weak.clone());
            let components = match Self::instantiate(&config, descriptors, env_ref) {
                Ok(components) => components,
                Err(e) => {
                    failure = Some(e);
                    IndexMap::new()
                }
            };
            Environment {
                config,
                components,
                initialized: AtomicBool::new(false),
            }
        });

        match failure {
            Some(e) => Err(e),
            None => {
                log::info!("Instantiated {} component(s)", env.components.len());
                Ok(env)
            }
        }
    }

    fn instantiate(
        config: &Config,
        descriptors: Vec<ComponentDescriptor>,
        env_ref: EnvRef,
    ) -> Result<IndexMap<String, ComponentSlot>> {
        let mut components = IndexMap::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let identity = descriptor.identity();
            if constants::RESERVED_NAMES.contains(&identity) || components.contains_key(identity) {
                return Err(Error::IdentityCollision {
                    identity: identity.to_string(),
                });
            }

            let settings = config.settings(identity);
            log::debug!("Constructing component '{}' with {} setting(s)", identity, settings.len());
            let instance = descriptor.instantiate(env_ref.clone(), settings)?;
            components.insert(identity.to_string(), ComponentSlot { descriptor, instance });
        }

        Ok(components)
    }

    /// Components ordered for `phase`: `anchor` first, every requirement before
    /// its dependent, otherwise in construction order.
    pub fn chain(&self, phase: Phase, anchor: &str) -> Result<Vec<Arc<dyn Component>>> {
        let order = self.chain_order(phase, anchor)?;
        Ok(order
            .iter()
            .filter_map(|identity| self.components.get(identity))
            .map(|slot| slot.instance.clone())
            .collect())
    }

    /// Identities in the order [`Environment::chain`] returns components.
    pub fn chain_order(&self, phase: Phase, anchor: &str) -> Result<Vec<String>> {
        let mut builder = ChainBuilder::new(phase);
        for (identity, slot) in &self.components {
            builder.add_node(identity, slot.descriptor.requirements(phase));
        }
        let order = builder.build(anchor)?;
        Ok(order.into_iter().map(str::to_string).collect())
    }

    /// Run the `initialize` phase, then the `configure` phase, each in its own chain order.
    ///
    /// Schema metadata of a component is bound to the anchor's store right after that
    /// component initializes, before the next component in the chain runs.
    pub fn initialize(&self) -> Result<()> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyInitialized);
        }

        log::info!("Initializing components...");
        for component in self.chain(Phase::Initialize, constants::CORE_IDENTITY)? {
            self.run_phase(Phase::Initialize, component.as_ref())?;

            if let Some(metadata) = component.metadata() {
                let store = self.anchor_store(component.identity())?;
                log::debug!("Binding schema metadata of '{}' to {}", component.identity(), store);
                metadata.bind(store);
            }
        }
        log::info!("Component initialization complete.");

        log::info!("Configuring components...");
        for component in self.chain(Phase::Configure, constants::CORE_IDENTITY)? {
            self.run_phase(Phase::Configure, component.as_ref())?;
        }
        log::info!("Component configuration complete.");
        Ok(())
    }

    fn run_phase(&self, phase: Phase, component: &dyn Component) -> Result<()> {
        log::info!("Running {} for component: {}", phase, component.identity());
        phase.invoke(component).inspect_err(|e| {
            log::error!("Component '{}' failed to {}: {}", component.identity(), phase, e);
        })
    }

    fn anchor_store(&self, identity: &str) -> Result<StoreHandle> {
        self.get(constants::CORE_IDENTITY)
            .and_then(|anchor| anchor.store())
            .ok_or_else(|| Error::StoreUnavailable {
                identity: identity.to_string(),
                anchor: constants::CORE_IDENTITY.to_string(),
            })
    }

    /// Combine the schema metadata of every component into one catalog.
    ///
    /// Tables are merged in `initialize` chain order so that tables referenced by
    /// foreign keys precede the tables referencing them.
    pub fn metadata(&self) -> Result<SchemaCatalog> {
        let mut catalog = SchemaCatalog::new();
        for component in self.chain(Phase::Initialize, constants::CORE_IDENTITY)? {
            if let Some(metadata) = component.metadata() {
                catalog.merge(component.identity(), metadata)?;
            }
        }
        Ok(catalog)
    }

    /// Get a component by identity.
    pub fn get(&self, identity: &str) -> Option<Arc<dyn Component>> {
        self.components.get(identity).map(|slot| slot.instance.clone())
    }

    /// Get a component by identity, downcast to its concrete type.
    pub fn component<T: Component>(&self, identity: &str) -> Option<Arc<T>> {
        let instance: Arc<dyn Any + Send + Sync> = self.get(identity)?;
        Arc::downcast::<T>(instance).ok()
    }

    /// The anchor component, if the built-in core component is installed.
    pub fn core(&self) -> Option<Arc<CoreComponent>> {
        self.component::<CoreComponent>(constants::CORE_IDENTITY)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.components.contains_key(identity)
    }

    /// Identities in construction order.
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    /// Components in construction order.
    pub fn components(&self) -> impl Iterator<Item = (&str, &Arc<dyn Component>)> {
        self.components
            .iter()
            .map(|(identity, slot)| (identity.as_str(), &slot.instance))
    }

    /// Package that registered `identity`.
    pub fn package_of(&self, identity: &str) -> Option<&'static str> {
        self.components.get(identity).map(|slot| slot.descriptor.package())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Settings section handed to `identity` at construction.
    pub fn settings(&self, identity: &str) -> Settings {
        self.config.settings(identity)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }
}
