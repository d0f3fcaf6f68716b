//! # Keel Core Registry Errors
//!
//! Defines [`RegistryError`], raised while packages register their
//! component descriptors.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Component '{identity}' is already registered (by package '{package}')")]
    DuplicateIdentity { identity: String, package: String },

    #[error("Package '{package}' failed to register its components: {source}")]
    PackageFailed {
        package: String,
        #[source]
        source: Box<RegistryError>,
    },

    #[error("Package '{package}': {message}")]
    InvalidPackage { package: String, message: String },
}
