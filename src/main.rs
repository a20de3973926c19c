mod config_defs;
mod git;
mod image;
mod pipeline;
mod runner;

use anyhow::Context as _;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Builds the production image from this checkout and pushes it to the registry.
#[derive(Parser, Debug)]
struct Args {
    /// Deployment environment label (display only)
    env: Option<String>,
    /// Image tag used for both build and push
    tag: Option<String>,
    /// Repository root; detected with `git rev-parse` when omitted
    #[clap(long)]
    root: Option<PathBuf>,
    /// JSON or YAML release config
    #[clap(long)]
    config: Option<PathBuf>,
    /// Stop at the first failing step instead of pushing anyway
    #[clap(long)]
    fail_fast: bool,
    /// Print docker commands instead of running them
    #[clap(long)]
    dry_run: bool,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "abz_push=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn release(args: Args) -> anyhow::Result<i32> {
    let config = match &args.config {
        Some(path) => config_defs::ReleaseConfig::load(path)?,
        None => Default::default(),
    };
    tracing::debug!(?config, "loaded config");

    let runner: Box<dyn runner::Runner> = if args.dry_run {
        Box::new(runner::DryRunner)
    } else {
        Box::new(runner::ShellRunner)
    };

    let root = match args.root {
        Some(root) => root,
        None => git::toplevel(runner.as_ref(), &config)?,
    };
    // Absolute before pushd, so later joins do not resolve against the new cwd.
    let root = std::fs::canonicalize(&root)
        .with_context(|| format!("repository root {} is not accessible", root.display()))?;
    let _cwd = xshell::pushd(&root)
        .with_context(|| format!("failed to enter {}", root.display()))?;
    tracing::debug!(root = %root.display(), "entered repository root");

    let plan = pipeline::Plan {
        env: pipeline::resolve_label(args.env, &config.default_env),
        tag: pipeline::resolve_label(args.tag, &config.default_tag),
        config,
        root,
        policy: if args.fail_fast {
            pipeline::Policy::FailFast
        } else {
            pipeline::Policy::Continue
        },
        write_version: !args.dry_run,
    };
    let report = pipeline::run(runner.as_ref(), &plan).await?;
    Ok(report.exit_code())
}

#[tokio::main]
async fn main() {
    init_tracing();
    let args = Args::parse();
    match release(args).await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            std::process::exit(1)
        }
    }
}
