//! Git-side of the comparison.
//!
//! This module provides:
//! - Argo CD Application manifest types and validation
//! - Read-only git plumbing over committed trees
//! - The change-set resolver that finds changed applications between branches

pub mod error;
pub mod git;
pub mod resolver;
pub mod resource;
pub mod validation;

pub use error::{GitOpsError, ManifestDisposition, ManifestError, Result};
pub use git::GitRepository;
pub use resolver::{ChangeSet, ChangeSetResolver, ChangedApplication, InvalidFile};
pub use resource::{
    Application, ApplicationManifest, ChartSources, HelmSource, ObjectMeta, Source,
    APPLICATION_KIND,
};
pub use validation::parse_application;
