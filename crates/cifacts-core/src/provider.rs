//! CI provider detection from marker variables.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::env::EnvSource;

/// CI providers whose environment variables the candidate chains cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiProvider {
    /// Bitrise (`BITRISE_IO` is set on every build).
    Bitrise,
    /// Jenkins, including multibranch pipelines (`JENKINS_URL`).
    Jenkins,
    /// GitHub Actions (`GITHUB_ACTIONS`).
    GithubActions,
}

impl CiProvider {
    /// Detects the provider from its marker variable, in the same order
    /// the candidate chains list providers.
    pub fn detect<E: EnvSource>(env: &E) -> Option<Self> {
        let marked = |key: &str| env.get(key).is_some_and(|value| !value.is_empty());

        if marked("BITRISE_IO") {
            Some(Self::Bitrise)
        } else if marked("JENKINS_URL") {
            Some(Self::Jenkins)
        } else if marked("GITHUB_ACTIONS") {
            Some(Self::GithubActions)
        } else {
            None
        }
    }

    /// Stable lowercase name, matching the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bitrise => "bitrise",
            Self::Jenkins => "jenkins",
            Self::GithubActions => "github_actions",
        }
    }
}

impl fmt::Display for CiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
