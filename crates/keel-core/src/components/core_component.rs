use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::Settings;
use crate::kernel::component::{Component, ComponentDescriptor, EnvRef};
use crate::kernel::constants;
use crate::kernel::environment::Environment;
use crate::kernel::error::{Error, Result};
use crate::registry::{ComponentPackage, ComponentRegistry, RegistryError};
use crate::schema::{ColumnDef, SchemaMetadata, StoreHandle, TableDef};

/// Package the core component is registered under
pub const CORE_PACKAGE: &str = "keel.core";

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_DATABASE: &str = "keel";

/// The anchor component: first in every chain, owner of the data store binding.
///
/// Settings (section `[core]`):
/// - `database.host` (default `localhost`)
/// - `database.port` (optional)
/// - `database.name` (default `keel`)
/// - `database.user`, `database.password` (optional)
/// - `debug` (boolean, default `false`)
#[derive(Debug)]
pub struct CoreComponent {
    env: EnvRef,
    settings: Settings,
    metadata: SchemaMetadata,
    store: RwLock<Option<StoreHandle>>,
    debug: RwLock<bool>,
}

impl CoreComponent {
    pub fn new(env: EnvRef, settings: Settings) -> Result<Self> {
        let mut metadata = SchemaMetadata::new();
        metadata.add_table(
            TableDef::new("setting")
                .column(ColumnDef::new("component", "character varying").primary_key())
                .column(ColumnDef::new("name", "character varying").primary_key())
                .column(ColumnDef::new("value", "text").not_null()),
        )?;

        Ok(Self {
            env,
            settings,
            metadata,
            store: RwLock::new(None),
            debug: RwLock::new(false),
        })
    }

    pub fn descriptor() -> ComponentDescriptor {
        ComponentDescriptor::new(constants::CORE_IDENTITY, CORE_PACKAGE, |env, settings| {
            let component: Arc<dyn Component> = Arc::new(CoreComponent::new(env, settings)?);
            Ok(component)
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The environment this component was built into, while it is alive.
    pub fn env(&self) -> Option<Arc<Environment>> {
        self.env.upgrade()
    }

    pub fn is_debug(&self) -> bool {
        *self.debug.read()
    }

    fn build_store_url(&self) -> Result<String> {
        let host = self.settings.get_or("database.host", DEFAULT_HOST);
        let name = self.settings.get_or("database.name", DEFAULT_DATABASE);
        if name.trim().is_empty() {
            return Err(Error::setting(constants::CORE_IDENTITY, "database.name", "must not be empty"));
        }
        let port: Option<u16> = self
            .settings
            .get_parsed("database.port")
            .map_err(|e| Error::setting(constants::CORE_IDENTITY, "database.port", e.to_string()))?;

        let credentials = match (self.settings.get("database.user"), self.settings.get("database.password")) {
            (Some(user), Some(password)) => format!("{}:{}@", user, password),
            (Some(user), None) => format!("{}@", user),
            (None, Some(_)) => {
                return Err(Error::setting(
                    constants::CORE_IDENTITY,
                    "database.password",
                    "set without database.user",
                ));
            }
            (None, None) => String::new(),
        };
        let authority = match port {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        Ok(format!("postgresql://{}{}/{}", credentials, authority, name))
    }
}

impl Component for CoreComponent {
    fn identity(&self) -> &'static str {
        constants::CORE_IDENTITY
    }

    fn initialize(&self) -> Result<()> {
        let debug = self
            .settings
            .get_bool("debug")
            .map_err(|e| Error::setting(constants::CORE_IDENTITY, "debug", e.to_string()))?
            .unwrap_or(false);
        *self.debug.write() = debug;

        let store = StoreHandle::new(self.build_store_url()?);
        log::info!("Core store target: {}", store);
        *self.store.write() = Some(store);
        Ok(())
    }

    fn metadata(&self) -> Option<&SchemaMetadata> {
        Some(&self.metadata)
    }

    fn store(&self) -> Option<StoreHandle> {
        self.store.read().clone()
    }
}

/// Registers [`CoreComponent`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CorePackage;

impl ComponentPackage for CorePackage {
    fn name(&self) -> &'static str {
        CORE_PACKAGE
    }

    fn register(&self, registry: &mut ComponentRegistry) -> std::result::Result<(), RegistryError> {
        registry.register(CoreComponent::descriptor())
    }
}
