pub mod chart;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod gitops;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod sanitize;
pub mod secrets;
pub mod storage;

pub use compare::{ComparisonResult, FileEntry, Reconciler};
pub use config::{load_repo_credentials_from_env, CredentialStore, OutputKind, RunConfig};
pub use engine::{ComparisonEngine, RunReport};
pub use error::{ArgoCompareError, ConfigError, Result};
pub use gitops::{
    Application, ChangeSet, ChangeSetResolver, GitOpsError, GitRepository, InvalidFile,
};
pub use output::{CommentPublisher, GitLabPublisher, Presenter};
pub use pipeline::{RenderPipeline, Revision};
pub use secrets::{resolve_secret, SecretError};
pub use storage::ChartCache;
