use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Weak};

use crate::config::Settings;
use crate::kernel::environment::Environment;
use crate::kernel::error::Result;
use crate::schema::{SchemaMetadata, StoreHandle};

/// A named lifecycle step run once per component, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Initialize,
    Configure,
}

impl Phase {
    /// Phases in the order the environment runs them.
    pub const ALL: [Phase; 2] = [Phase::Initialize, Phase::Configure];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Initialize => "initialize",
            Phase::Configure => "configure",
        }
    }

    /// Run this phase's lifecycle method on `component`.
    pub fn invoke(&self, component: &dyn Component) -> Result<()> {
        match self {
            Phase::Initialize => component.initialize(),
            Phase::Configure => component.configure(),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "initialize" => Ok(Phase::Initialize),
            "configure" => Ok(Phase::Configure),
            other => Err(format!("Unknown lifecycle phase: {}", other)),
        }
    }
}

/// Lifecycle contract every pluggable subsystem implements.
///
/// Components are shared as `Arc<dyn Component>`, so lifecycle methods take
/// `&self`; state changed during a phase lives behind the component's own
/// interior mutability.
pub trait Component: Any + Send + Sync + fmt::Debug {
    /// Unique identity, equal to the identity of the descriptor that built it.
    fn identity(&self) -> &'static str;

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn configure(&self) -> Result<()> {
        Ok(())
    }

    /// Table definitions this component persists, if any.
    fn metadata(&self) -> Option<&SchemaMetadata> {
        None
    }

    /// Binding target for schema metadata. Only the anchor is expected to provide one,
    /// and only once it has been initialized.
    fn store(&self) -> Option<StoreHandle> {
        None
    }
}

/// Weak back-reference to the environment a component belongs to.
///
/// The environment owns its components, so components must not keep it alive.
#[derive(Debug, Clone)]
pub struct EnvRef(Weak<Environment>);

impl EnvRef {
    pub(crate) fn new(env: Weak<Environment>) -> Self {
        Self(env)
    }

    /// A reference that never resolves; for components built outside an environment.
    pub fn detached() -> Self {
        Self(Weak::new())
    }

    /// Resolve the environment; `None` once it has been dropped or while detached.
    pub fn upgrade(&self) -> Option<Arc<Environment>> {
        self.0.upgrade()
    }
}

/// Builds a component instance from its environment and settings section.
pub type ComponentFactory = Arc<dyn Fn(EnvRef, Settings) -> Result<Arc<dyn Component>> + Send + Sync>;

/// Static metadata for a component type, registered before any environment exists.
#[derive(Clone)]
pub struct ComponentDescriptor {
    identity: &'static str,
    package: &'static str,
    factory: ComponentFactory,
    requires: Vec<(Phase, Vec<&'static str>)>,
}

impl ComponentDescriptor {
    pub fn new<F>(identity: &'static str, package: &'static str, factory: F) -> Self
    where
        F: Fn(EnvRef, Settings) -> Result<Arc<dyn Component>> + Send + Sync + 'static,
    {
        Self {
            identity,
            package,
            factory: Arc::new(factory),
            requires: Vec::new(),
        }
    }

    /// Declare the identities whose `phase` method must run before this component's.
    /// Declaring the same phase again replaces the earlier list.
    pub fn requires(mut self, phase: Phase, identities: &[&'static str]) -> Self {
        self.requires.retain(|(p, _)| *p != phase);
        self.requires.push((phase, identities.to_vec()));
        self
    }

    pub fn identity(&self) -> &'static str {
        self.identity
    }

    pub fn package(&self) -> &'static str {
        self.package
    }

    /// Ordered requirements for `phase`; empty when none were declared.
    pub fn requirements(&self, phase: Phase) -> &[&'static str] {
        self.requires
            .iter()
            .find(|(p, _)| *p == phase)
            .map(|(_, ids)| ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn instantiate(&self, env: EnvRef, settings: Settings) -> Result<Arc<dyn Component>> {
        (self.factory)(env, settings)
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("identity", &self.identity)
            .field("package", &self.package)
            .field("requires", &self.requires)
            .finish_non_exhaustive()
    }
}
