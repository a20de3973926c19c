use anyhow::Context as _;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ReleaseConfig {
    #[serde(default = "ReleaseConfig::default_image")]
    pub image: String,
    /// Build stage selected with `--target`.
    #[serde(default = "ReleaseConfig::default_target")]
    pub target: String,
    #[serde(default = "ReleaseConfig::default_version_build_arg")]
    pub version_build_arg: String,
    /// Relative to the repository root.
    #[serde(default = "ReleaseConfig::default_version_file")]
    pub version_file: PathBuf,
    #[serde(default = "ReleaseConfig::default_label")]
    pub default_env: String,
    #[serde(default = "ReleaseConfig::default_label")]
    pub default_tag: String,
    #[serde(default = "ReleaseConfig::default_git")]
    pub git: String,
    #[serde(default = "ReleaseConfig::default_docker")]
    pub docker: String,
}

impl ReleaseConfig {
    fn default_image() -> String {
        "metabrainz/acousticbrainz".to_string()
    }

    fn default_target() -> String {
        "acousticbrainz-prod".to_string()
    }

    fn default_version_build_arg() -> String {
        "GIT_COMMIT_SHA".to_string()
    }

    fn default_version_file() -> PathBuf {
        ".git-version".into()
    }

    fn default_label() -> String {
        "beta".to_string()
    }

    fn default_git() -> String {
        "git".to_string()
    }

    fn default_docker() -> String {
        "docker".to_string()
    }

    /// Parses config text, picking the format from the file extension.
    pub fn parse(path: &Path, text: &str) -> anyhow::Result<ReleaseConfig> {
        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            serde_yaml::from_str(text).context("invalid yaml config")
        } else {
            serde_json::from_str(text).context("invalid json config")
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<ReleaseConfig> {
        let text = xshell::read_file(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(path, &text).with_context(|| format!("failed to load {}", path.display()))
    }
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            image: Self::default_image(),
            target: Self::default_target(),
            version_build_arg: Self::default_version_build_arg(),
            version_file: Self::default_version_file(),
            default_env: Self::default_label(),
            default_tag: Self::default_label(),
            git: Self::default_git(),
            docker: Self::default_docker(),
        }
    }
}
