pub mod loader;
pub mod schema;

pub use loader::{
    default_cache_dir, default_external_diff_tool, load_repo_credentials_from_env,
    parse_credentials,
};
pub use schema::{CredentialStore, OutputKind, RepoCredentials, RunConfig};
