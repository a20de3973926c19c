use crate::{config_defs::ReleaseConfig, runner::Invocation};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub repository: String,
    pub tag: String,
}

impl ImageRef {
    pub fn new(repository: &str, tag: &str) -> Self {
        ImageRef {
            repository: repository.to_string(),
            tag: tag.to_string(),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}

/// `docker build` against the current directory, selecting the configured stage
/// and passing the version descriptor as a build argument.
pub fn build(config: &ReleaseConfig, image: &ImageRef, version: &str) -> Invocation {
    Invocation::new(
        &config.docker,
        vec![
            "build".to_string(),
            "-t".to_string(),
            image.to_string(),
            "--target".to_string(),
            config.target.clone(),
            "--build-arg".to_string(),
            format!("{}={}", config.version_build_arg, version),
            ".".to_string(),
        ],
    )
}

pub fn push(config: &ReleaseConfig, image: &ImageRef) -> Invocation {
    Invocation::new(&config.docker, vec!["push".to_string(), image.to_string()])
}
