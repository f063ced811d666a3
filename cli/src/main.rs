use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use argo_compare::config::{default_cache_dir, default_external_diff_tool};
use argo_compare::gitops::GitOpsError;
use argo_compare::output::CommentPublisher;
use argo_compare::{
    load_repo_credentials_from_env, ArgoCompareError, ComparisonEngine, ConfigError,
    GitLabPublisher, GitRepository, OutputKind, RunConfig, RunReport,
};
use clap::{Args, Parser, Subcommand};
use log::{error, info};

const EXIT_INVALID_FILES: u8 = 2;

#[derive(Parser)]
#[command(
    name = "argo-compare",
    version,
    about = "Compare rendered Argo CD applications between git branches",
    long_about = "Finds Argo CD Application manifests that changed between HEAD and a target \
    branch, renders both versions with helm and shows what changes in the resulting \
    Kubernetes manifests."
)]
struct Cli {
    #[arg(short, long, global = true, help = "Enable debug logging")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "branch",
        about = "Compare HEAD against a remote branch",
        long_about = "Compares every changed Application manifest in HEAD against \
        origin/<TARGET>. The remote-tracking branch must be fetched beforehand."
    )]
    Branch(BranchArgs),
}

#[derive(Args)]
struct BranchArgs {
    #[arg(index = 1, help = "The target branch to compare against")]
    target: String,

    #[arg(long, help = "Only compare this repository-relative manifest")]
    file: Option<String>,

    #[arg(long, help = "Skip this repository-relative manifest (repeatable)")]
    ignore: Vec<String>,

    #[arg(long, help = "Keep labels injected by helm when comparing")]
    preserve_helm_labels: bool,

    #[arg(long, help = "Show content of manifests that only exist in HEAD")]
    print_added_manifests: bool,

    #[arg(long, help = "Show content of manifests that only exist in the target branch")]
    print_removed_manifests: bool,

    #[arg(long, default_value = "console", help = "Where to send results: console or gitlab")]
    output: OutputKind,

    #[arg(long, help = "Program fed each diff on stdin [env: EXTERNAL_DIFF_TOOL]")]
    external_diff_tool: Option<String>,

    #[arg(long, help = "Chart cache directory [env: ARGO_COMPARE_CACHE_DIR]")]
    cache_dir: Option<PathBuf>,

    #[arg(long, help = "Base directory for temporary workspaces")]
    tmp_dir: Option<PathBuf>,

    #[arg(long, help = "File holding the GitLab token [env: GITLAB_TOKEN]")]
    gitlab_token_file: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();

    info!("Starting argo-compare v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Branch(args) => {
            let print_removed = args.print_removed_manifests;
            match run_branch(args).await {
                Ok(report) => {
                    print_report(&report, print_removed);
                    ExitCode::SUCCESS
                }
                Err(ArgoCompareError::InvalidFiles(files)) => {
                    error!("The following files were invalid:");
                    for file in &files {
                        error!("  {}", file);
                    }
                    ExitCode::from(EXIT_INVALID_FILES)
                }
                Err(e) => {
                    error!("{}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

async fn run_branch(args: BranchArgs) -> Result<RunReport, ArgoCompareError> {
    let cwd = std::env::current_dir().map_err(GitOpsError::from)?;
    let repo = GitRepository::discover(&cwd)?;

    let cache_dir = args
        .cache_dir
        .or_else(default_cache_dir)
        .ok_or(ConfigError::MissingCacheDir)?;

    let mut config = RunConfig::new(args.target, cache_dir);
    config.ignore = args.ignore;
    config.file = args.file;
    config.tmp_dir = args.tmp_dir;
    config.preserve_helm_labels = args.preserve_helm_labels;
    config.print_added_manifests = args.print_added_manifests;
    config.print_removed_manifests = args.print_removed_manifests;
    config.external_diff_tool = args.external_diff_tool.or_else(default_external_diff_tool);
    config.output = args.output;
    config.credentials = load_repo_credentials_from_env()?;

    let publisher: Option<Arc<dyn CommentPublisher>> = match config.output {
        OutputKind::GitLab => {
            let publisher = GitLabPublisher::from_env(None, args.gitlab_token_file.as_deref())?;
            Some(Arc::new(publisher) as Arc<dyn CommentPublisher>)
        }
        OutputKind::Console => None,
    };

    let mut engine = ComparisonEngine::from_config(config, repo, publisher)?;
    engine.run().await
}

fn print_report(report: &RunReport, print_removed: bool) {
    println!(
        "Compared {} application(s), skipped {} new application(s)",
        report.compared.len(),
        report.skipped_new.len()
    );

    if print_removed && !report.removed.is_empty() {
        println!("Removed application manifests:");
        for path in &report.removed {
            println!("  - {}", path);
        }
    }
}
