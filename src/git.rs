use crate::{
    config_defs::ReleaseConfig,
    runner::{Invocation, Runner},
};
use anyhow::Context as _;
use std::path::{Path, PathBuf};

pub fn describe(config: &ReleaseConfig) -> Invocation {
    Invocation::new(&config.git, vec!["describe", "--tags", "--dirty", "--always"])
}

/// Top level of the checkout containing the current directory.
pub fn toplevel(runner: &dyn Runner, config: &ReleaseConfig) -> anyhow::Result<PathBuf> {
    let inv = Invocation::new(&config.git, vec!["rev-parse", "--show-toplevel"]);
    let out = runner.read(&inv)?;
    anyhow::ensure!(
        out.code == 0,
        "`{}` failed with exit code {}; pass --root outside a checkout",
        inv,
        out.code
    );
    anyhow::ensure!(!out.stdout.is_empty(), "`{}` printed nothing", inv);
    Ok(out.stdout.into())
}

pub fn write_version_file(path: &Path, version: &str) -> anyhow::Result<()> {
    xshell::write_file(path, format!("{}\n", version))
        .with_context(|| format!("failed to write {}", path.display()))
}
