//! Remote-URL parsing into a repository identity.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Pattern deriving organization and repository name from a git remote
/// URL. Matches both HTTPS (`https://github.com/org/name.git`) and SSH
/// (`git@github.com:org/name.git`) forms; the `.git` suffix is required.
const REMOTE_URL_PATTERN: &str = r"(?:.*)[:|/]([\w-]+)/(.*)\.git";

/// Organization and repository name derived from a remote URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoIdentity {
    /// Organization (or user) owning the repository.
    pub org: String,
    /// Repository name without the `.git` suffix.
    pub name: String,
}

impl RepoIdentity {
    /// The `organization/repository-name` identifier string.
    #[must_use]
    pub fn slug(&self) -> String {
        format!("{}/{}", self.org, self.name)
    }
}

/// Parses a remote URL into a [`RepoIdentity`].
///
/// Returns `None` when the URL does not match [`REMOTE_URL_PATTERN`],
/// including remotes without a `.git` suffix.
#[must_use]
pub fn parse_remote_url(url: &str) -> Option<RepoIdentity> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(REMOTE_URL_PATTERN).ok()).as_ref()?;

    let captures = re.captures(url.trim())?;
    let org = captures.get(1)?.as_str().to_string();
    let name = captures.get(2)?.as_str().to_string();
    Some(RepoIdentity { org, name })
}

#[cfg(test)]
mod tests {
    use super::{parse_remote_url, RepoIdentity};

    #[test]
    fn parses_https_remote() {
        let identity = parse_remote_url("https://github.com/acmeinc/iOS.git").expect("parse");
        assert_eq!(identity.org, "acmeinc");
        assert_eq!(identity.name, "iOS");
        assert_eq!(identity.slug(), "acmeinc/iOS");
    }

    #[test]
    fn parses_ssh_remote_to_the_same_identity() {
        let https = parse_remote_url("https://github.com/acmeinc/iOS.git").expect("https");
        let ssh = parse_remote_url("git@github.com:acmeinc/iOS.git").expect("ssh");
        assert_eq!(https, ssh);
    }

    #[test]
    fn takes_the_last_two_path_components() {
        let identity =
            parse_remote_url("https://gitlab.example.com/group/team/project.git").expect("parse");
        assert_eq!(identity.org, "team");
        assert_eq!(identity.name, "project");
    }

    #[test]
    fn rejects_url_without_git_suffix() {
        assert_eq!(parse_remote_url("https://github.com/acmeinc/iOS"), None);
    }

    #[test]
    fn rejects_bare_remote_name() {
        // `git ls-remote --get-url origin` echoes `origin` back when no
        // URL is configured.
        assert_eq!(parse_remote_url("origin"), None);
    }

    #[test]
    fn identity_round_trips_through_serde() {
        let identity = RepoIdentity {
            org: "acmeinc".to_string(),
            name: "iOS".to_string(),
        };
        let json = serde_json::to_string(&identity).expect("serialize");
        let back: RepoIdentity = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(identity, back);
    }
}
