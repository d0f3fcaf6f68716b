/// Application name
pub const APP_NAME: &str = "Keel";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the default configuration file path
pub const CONFIG_PATH_VAR: &str = "KEEL_CONFIG";

/// Identity of the anchor component placed first in every chain
pub const CORE_IDENTITY: &str = "core";

/// Settings key (in the core section) listing ignored packages
pub const PACKAGES_IGNORE_KEY: &str = "packages.ignore";

/// Settings key (in the core section) listing ignored components
pub const COMPONENTS_IGNORE_KEY: &str = "components.ignore";

/// Names already taken by the environment itself; no component may use them as identity.
pub const RESERVED_NAMES: &[&str] = &[
    "chain",
    "components",
    "configure",
    "initialize",
    "metadata",
    "settings",
];
