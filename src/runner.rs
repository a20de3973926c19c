use anyhow::Context as _;
use std::{fmt, future::Future, pin::Pin, process::Stdio};

/// A fully resolved external command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub code: i32,
    /// Trimmed.
    pub stdout: String,
}

pub trait Runner {
    /// Runs the command with inherited stdio and returns its exit code.
    fn status<'a>(
        &'a self,
        inv: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<i32>> + 'a>>;

    /// Runs the command and captures its stdout. Never fails on a non-zero exit.
    /// Blocks the calling thread until the child exits.
    fn read(&self, inv: &Invocation) -> anyhow::Result<Captured>;
}

pub struct ShellRunner;

impl Runner for ShellRunner {
    fn status<'a>(
        &'a self,
        inv: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<i32>> + 'a>> {
        Box::pin(async move {
            tracing::debug!(command = %inv, "spawning");
            let status = tokio::process::Command::new(&inv.program)
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .args(&inv.args)
                .status()
                .await
                .with_context(|| format!("failed to spawn {}", inv.program))?;
            Ok(status.code().unwrap_or(-1))
        })
    }

    fn read(&self, inv: &Invocation) -> anyhow::Result<Captured> {
        tracing::debug!(command = %inv, "reading");
        let out = xshell::Cmd::new(&inv.program)
            .args(&inv.args)
            .ignore_status()
            .output()
            .with_context(|| format!("failed to spawn {}", inv.program))?;
        if !out.stderr.is_empty() {
            eprint!("{}", String::from_utf8_lossy(&out.stderr));
        }
        Ok(Captured {
            code: out.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&out.stdout).trim().to_string(),
        })
    }
}

/// Prints docker commands instead of running them. Reads still go to the shell.
pub struct DryRunner;

impl Runner for DryRunner {
    fn status<'a>(
        &'a self,
        inv: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<i32>> + 'a>> {
        Box::pin(async move {
            println!("$ {}", inv);
            Ok(0)
        })
    }

    fn read(&self, inv: &Invocation) -> anyhow::Result<Captured> {
        ShellRunner.read(inv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_args() {
        let inv = Invocation::new("docker", vec!["push", "example/app:beta"]);
        assert_eq!(inv.to_string(), "docker push example/app:beta");
    }

    #[cfg(unix)]
    #[test]
    fn read_keeps_going_on_failure() {
        let out = ShellRunner.read(&Invocation::new("false", Vec::<String>::new())).unwrap();
        assert_eq!(out.code, 1);
        assert_eq!(out.stdout, "");
    }

    #[cfg(unix)]
    #[test]
    fn read_trims_stdout() {
        let out = ShellRunner.read(&Invocation::new("echo", vec!["v1.2-3-gabc"])).unwrap();
        assert_eq!(out.code, 0);
        assert_eq!(out.stdout, "v1.2-3-gabc");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn status_returns_exit_code() {
        let code = ShellRunner
            .status(&Invocation::new("false", Vec::<String>::new()))
            .await
            .unwrap();
        assert_eq!(code, 1);
    }

    #[tokio::test]
    async fn missing_program_is_an_error() {
        let inv = Invocation::new("abz-push-no-such-tool", vec!["build"]);
        let err = ShellRunner.status(&inv).await.unwrap_err();
        assert!(format!("{:#}", err).contains("abz-push-no-such-tool"));
    }
}
