use crate::{config_defs::ReleaseConfig, git, image, image::ImageRef, runner::Runner};
use std::{fmt, path::PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Keep going after a failed step, like the shell script always did.
    Continue,
    FailFast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Describe,
    Build,
    Push,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::Describe => "describe",
            Step::Build => "build",
            Step::Push => "push",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: Step,
    pub exit_code: i32,
}

impl StepReport {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Debug)]
pub struct Report {
    pub version: String,
    pub image: ImageRef,
    pub steps: Vec<StepReport>,
}

impl Report {
    /// Exit code of the last failing step, 0 when everything passed.
    pub fn exit_code(&self) -> i32 {
        match self.steps.iter().rev().find(|s| !s.succeeded()) {
            None => 0,
            Some(s) if s.exit_code > 0 => s.exit_code,
            Some(_) => 1,
        }
    }
}

/// Positional argument with shell `${n:-default}` semantics: empty means absent.
pub fn resolve_label(arg: Option<String>, default: &str) -> String {
    match arg {
        Some(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

pub struct Plan {
    pub config: ReleaseConfig,
    pub root: PathBuf,
    pub env: String,
    pub tag: String,
    pub policy: Policy,
    pub write_version: bool,
}

impl Plan {
    pub fn image(&self) -> ImageRef {
        ImageRef::new(&self.config.image, &self.tag)
    }
}

fn print_outcome(report: &StepReport) {
    if report.succeeded() {
        println!("Done!");
    } else {
        println!("Failed with exit code {}", report.exit_code);
    }
}

/// Returns true when the sequence should stop here.
fn should_stop(plan: &Plan, report: &StepReport) -> bool {
    if report.succeeded() {
        return false;
    }
    match plan.policy {
        Policy::FailFast => {
            tracing::error!(step = %report.step, code = report.exit_code, "step failed, stopping");
            true
        }
        Policy::Continue => {
            tracing::warn!(step = %report.step, code = report.exit_code, "step failed, continuing");
            false
        }
    }
}

pub async fn run(runner: &dyn Runner, plan: &Plan) -> anyhow::Result<Report> {
    let config = &plan.config;
    let mut report = Report {
        version: String::new(),
        image: plan.image(),
        steps: Vec::new(),
    };

    let describe = git::describe(config);
    let described = runner.read(&describe)?;
    report.version = described.stdout;
    let step = StepReport {
        step: Step::Describe,
        exit_code: described.code,
    };
    let stop = should_stop(plan, &step);
    report.steps.push(step);
    if stop {
        return Ok(report);
    }
    tracing::info!(version = %report.version, "resolved version");
    if plan.write_version {
        git::write_version_file(&plan.root.join(&config.version_file), &report.version)?;
    }

    println!("building for env {} tag {}", plan.env, plan.tag);
    let build = image::build(config, &report.image, &report.version);
    let step = StepReport {
        step: Step::Build,
        exit_code: runner.status(&build).await?,
    };
    print_outcome(&step);
    let stop = should_stop(plan, &step);
    report.steps.push(step);
    if stop {
        return Ok(report);
    }

    println!("Pushing image to registry {}...", report.image);
    let push = image::push(config, &report.image);
    let step = StepReport {
        step: Step::Push,
        exit_code: runner.status(&push).await?,
    };
    print_outcome(&step);
    should_stop(plan, &step);
    report.steps.push(step);

    Ok(report)
}
