// crates/keel-core/src/kernel/tests/common.rs
#![cfg(test)]

use std::sync::Arc;

use parking_lot::Mutex;

use crate::components::CorePackage;
use crate::config::{Config, Settings};
use crate::kernel::component::{Component, ComponentDescriptor, EnvRef, Phase};
use crate::kernel::environment::Environment;
use crate::kernel::error::{Error, Result};
use crate::registry::StaticPackage;
use crate::schema::{SchemaMetadata, TableDef};

pub const TEST_PACKAGE: &str = "tests";

/// Shared record of lifecycle calls, in the order they happened.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().clone()
}

/// Test component recording every lifecycle call it receives.
#[derive(Debug)]
pub struct Probe {
    pub identity: &'static str,
    pub settings: Settings,
    env: EnvRef,
    log: CallLog,
    fail_on: Option<Phase>,
    metadata: Option<SchemaMetadata>,
    /// Identity whose metadata binding is recorded when this probe initializes
    observe: Option<&'static str>,
}

impl Probe {
    fn record(&self, phase: Phase) -> Result<()> {
        self.log.lock().push(format!("{}:{}", phase, self.identity));
        if self.fail_on == Some(phase) {
            return Err(Error::Other(format!("{} failed to {}", self.identity, phase)));
        }
        Ok(())
    }
}

impl Component for Probe {
    fn identity(&self) -> &'static str {
        self.identity
    }

    fn initialize(&self) -> Result<()> {
        if let Some(target) = self.observe {
            let env = self.env.upgrade().ok_or("environment dropped")?;
            let bound = env
                .get(target)
                .and_then(|c| c.metadata().map(|m| m.is_bound()))
                .unwrap_or(false);
            self.log.lock().push(format!("bound:{}:{}", target, bound));
        }
        self.record(Phase::Initialize)
    }

    fn configure(&self) -> Result<()> {
        self.record(Phase::Configure)
    }

    fn metadata(&self) -> Option<&SchemaMetadata> {
        self.metadata.as_ref()
    }
}

/// Builder for [`Probe`] descriptors.
pub struct ProbeBuilder {
    identity: &'static str,
    log: CallLog,
    fail_on: Option<Phase>,
    tables: Vec<TableDef>,
    observe: Option<&'static str>,
    requires: Vec<(Phase, Vec<&'static str>)>,
}

pub fn probe(identity: &'static str, log: &CallLog) -> ProbeBuilder {
    ProbeBuilder {
        identity,
        log: log.clone(),
        fail_on: None,
        tables: Vec::new(),
        observe: None,
        requires: Vec::new(),
    }
}

impl ProbeBuilder {
    pub fn requires(mut self, phase: Phase, identities: &[&'static str]) -> Self {
        self.requires.push((phase, identities.to_vec()));
        self
    }

    pub fn fail_on(mut self, phase: Phase) -> Self {
        self.fail_on = Some(phase);
        self
    }

    pub fn table(mut self, table: TableDef) -> Self {
        self.tables.push(table);
        self
    }

    pub fn observe(mut self, identity: &'static str) -> Self {
        self.observe = Some(identity);
        self
    }

    pub fn descriptor(self) -> ComponentDescriptor {
        let ProbeBuilder {
            identity,
            log,
            fail_on,
            tables,
            observe,
            requires,
        } = self;

        let mut descriptor = ComponentDescriptor::new(identity, TEST_PACKAGE, move |env, settings| {
            let metadata = if tables.is_empty() {
                None
            } else {
                let mut metadata = SchemaMetadata::new();
                for table in &tables {
                    metadata.add_table(table.clone())?;
                }
                Some(metadata)
            };
            let component: Arc<dyn Component> = Arc::new(Probe {
                identity,
                settings,
                env,
                log: log.clone(),
                fail_on,
                metadata,
                observe,
            });
            Ok(component)
        });
        for (phase, identities) in &requires {
            descriptor = descriptor.requires(*phase, identities);
        }
        descriptor
    }
}

pub fn package(descriptors: Vec<ComponentDescriptor>) -> StaticPackage {
    descriptors
        .into_iter()
        .fold(StaticPackage::new(TEST_PACKAGE), |package, d| package.with(d))
}

/// Environment with the core package followed by the given test components.
pub fn environment(config: Config, descriptors: Vec<ComponentDescriptor>) -> Result<Arc<Environment>> {
    let tests = package(descriptors);
    Environment::new(config, &[&CorePackage, &tests])
}
