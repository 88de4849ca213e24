//! Fact accessors: ordered env candidates first, git fallback second.
//!
//! Each accessor is independent. The only shared state is the memoized
//! remote URL and the repository identity parsed from it, both computed
//! at most once per resolver.

use std::cell::OnceCell;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::env::{first_match, EnvSource, ProcessEnv};
use crate::error::GitError;
use crate::git::GitClient;
use crate::provider::CiProvider;
use crate::remote::{parse_remote_url, RepoIdentity};

// ── Candidate chains ─────────────────────────────────────────────────────────
//
// Order is part of the public contract: the first non-empty variable wins
// verbatim and nothing after it is consulted.

/// PR number candidates. No fallback.
pub const PR_NUMBER_VARS: &[&str] = &["BITRISE_PULL_REQUEST", "CHANGE_ID"];

/// PR title candidates. No fallback.
pub const PR_TITLE_VARS: &[&str] = &["CHANGE_TITLE"];

/// PR author candidates. No fallback.
pub const PR_AUTHOR_VARS: &[&str] = &["CHANGE_AUTHOR"];

/// PR link candidates. Falls back to a GitHub URL built from the
/// repository slug and the PR number when both resolve.
pub const PR_LINK_VARS: &[&str] = &["CHANGE_URL"];

/// Remote URL candidates. Falls back to `git ls-remote --get-url origin`.
pub const REMOTE_URL_VARS: &[&str] = &["GIT_REPOSITORY_URL", "GIT_URL"];

/// Commit hash candidates. Falls back to `git show -s --format=%H`.
pub const COMMIT_SHA_VARS: &[&str] = &["BITRISE_GIT_COMMIT", "GIT_COMMIT", "GITHUB_SHA"];

/// Commit message candidates. Falls back to `git log -1 --format=%B`.
pub const COMMIT_MESSAGE_VARS: &[&str] = &["BITRISE_GIT_MESSAGE"];

/// Branch candidates. Falls back to `git rev-parse --abbrev-ref HEAD`.
pub const BRANCH_VARS: &[&str] = &[
    "BITRISE_GIT_BRANCH",
    "CHANGE_BRANCH",
    "GITHUB_HEAD_REF",
    "GIT_BRANCH",
];

/// Target-branch candidates for PR builds. No fallback.
pub const BASE_BRANCH_VARS: &[&str] = &[
    "BITRISEIO_GIT_BRANCH_DEST",
    "CHANGE_TARGET",
    "GITHUB_BASE_REF",
];

/// Build URL candidates. No fallback.
pub const BUILD_URL_VARS: &[&str] = &["BITRISE_BUILD_URL", "BUILD_URL"];

// ── Resolver ─────────────────────────────────────────────────────────────────

/// Resolves build facts from an environment source with git fallback.
///
/// Accessors for git-backed facts return `Result`; a failed fallback
/// surfaces the git argv and stderr. Facts without a fallback return
/// `Option` and treat absence as a plain miss. [`Self::resolve`] is the
/// tolerant aggregate used for reporting.
pub struct MetadataResolver<E: EnvSource = ProcessEnv> {
    env: E,
    git: GitClient,
    remote_url: OnceCell<Option<String>>,
    identity: OnceCell<Option<RepoIdentity>>,
}

impl MetadataResolver<ProcessEnv> {
    /// Resolver over the live process environment, running git in the
    /// current working directory.
    #[must_use]
    pub fn from_process_env() -> Self {
        Self::new(ProcessEnv, GitClient::default())
    }
}

impl<E: EnvSource> MetadataResolver<E> {
    /// Creates a resolver over `env`, running fallbacks through `git`.
    #[must_use]
    pub fn new(env: E, git: GitClient) -> Self {
        Self {
            env,
            git,
            remote_url: OnceCell::new(),
            identity: OnceCell::new(),
        }
    }

    /// The CI provider this process runs under, if recognized.
    pub fn provider(&self) -> Option<CiProvider> {
        CiProvider::detect(&self.env)
    }

    /// PR number, verbatim from the environment.
    pub fn pr_number(&self) -> Option<String> {
        first_match(&self.env, PR_NUMBER_VARS)
    }

    /// PR title.
    pub fn pr_title(&self) -> Option<String> {
        first_match(&self.env, PR_TITLE_VARS)
    }

    /// PR author.
    pub fn pr_author(&self) -> Option<String> {
        first_match(&self.env, PR_AUTHOR_VARS)
    }

    /// PR link; constructed from the repository slug and PR number when
    /// no candidate variable is set.
    pub fn pr_link(&self) -> Result<Option<String>, GitError> {
        if let Some(link) = first_match(&self.env, PR_LINK_VARS) {
            return Ok(Some(link));
        }
        let (Some(identity), Some(number)) = (self.repo_identity()?, self.pr_number()) else {
            return Ok(None);
        };
        Ok(Some(format!(
            "https://github.com/{}/pull/{}",
            identity.slug(),
            number
        )))
    }

    /// Remote URL of the repository. Memoized.
    ///
    /// Yields `None` when no candidate variable is set and git reports
    /// no URL for `origin` (git echoes the remote name back in that
    /// case).
    pub fn remote_url(&self) -> Result<Option<String>, GitError> {
        if let Some(cached) = self.remote_url.get() {
            return Ok(cached.clone());
        }

        let value = match first_match(&self.env, REMOTE_URL_VARS) {
            Some(url) => Some(url),
            None => {
                let url = self.git.remote_url()?;
                if url.is_empty() || url == "origin" {
                    None
                } else {
                    Some(url)
                }
            }
        };

        let _ = self.remote_url.set(value.clone());
        Ok(value)
    }

    /// Repository identity parsed from [`Self::remote_url`]. Memoized.
    pub fn repo_identity(&self) -> Result<Option<RepoIdentity>, GitError> {
        if let Some(cached) = self.identity.get() {
            return Ok(cached.clone());
        }

        let value = self.remote_url()?.as_deref().and_then(parse_remote_url);
        let _ = self.identity.set(value.clone());
        Ok(value)
    }

    /// Repository organization.
    pub fn repo_org(&self) -> Result<Option<String>, GitError> {
        Ok(self.repo_identity()?.map(|identity| identity.org))
    }

    /// Repository name.
    pub fn repo_name(&self) -> Result<Option<String>, GitError> {
        Ok(self.repo_identity()?.map(|identity| identity.name))
    }

    /// Repository slug (`organization/repository-name`).
    pub fn repo_slug(&self) -> Result<Option<String>, GitError> {
        Ok(self.repo_identity()?.map(|identity| identity.slug()))
    }

    /// Full commit hash being built.
    pub fn commit_sha(&self) -> Result<String, GitError> {
        match first_match(&self.env, COMMIT_SHA_VARS) {
            Some(sha) => Ok(sha),
            None => self.git.head_sha(),
        }
    }

    /// Full commit message being built, trimmed.
    pub fn commit_message(&self) -> Result<String, GitError> {
        match first_match(&self.env, COMMIT_MESSAGE_VARS) {
            Some(message) => Ok(message),
            None => self.git.head_message(),
        }
    }

    /// Committer datetime of the commit being built.
    ///
    /// Always comes from git; no provider exposes it directly.
    pub fn commit_datetime(&self) -> Result<DateTime<FixedOffset>, GitError> {
        let raw = self.git.head_datetime()?;
        DateTime::parse_from_rfc3339(&raw).map_err(|_| GitError::UnexpectedOutput {
            args: "log -1 --format=%cI".to_string(),
            output: raw,
        })
    }

    /// Branch being built.
    pub fn branch(&self) -> Result<String, GitError> {
        match first_match(&self.env, BRANCH_VARS) {
            Some(branch) => Ok(branch),
            None => self.git.head_branch(),
        }
    }

    /// Target branch of the PR, for PR builds.
    pub fn base_branch(&self) -> Option<String> {
        first_match(&self.env, BASE_BRANCH_VARS)
    }

    /// URL of the CI build page.
    pub fn build_url(&self) -> Option<String> {
        first_match(&self.env, BUILD_URL_VARS)
    }

    /// Resolves every fact into a serializable snapshot.
    ///
    /// Tolerant by design: a failed git fallback leaves the field unset
    /// instead of aborting the report, so a partial snapshot is still
    /// produced outside a checkout. Failures are logged at `warn`.
    pub fn resolve(&self) -> BuildMetadata {
        BuildMetadata {
            provider: self.provider(),
            pr_number: self.pr_number(),
            pr_title: self.pr_title(),
            pr_author: self.pr_author(),
            pr_link: tolerated("pr_link", self.pr_link()).flatten(),
            remote_url: tolerated("remote_url", self.remote_url()).flatten(),
            repo_org: tolerated("repo_org", self.repo_org()).flatten(),
            repo_name: tolerated("repo_name", self.repo_name()).flatten(),
            repo_slug: tolerated("repo_slug", self.repo_slug()).flatten(),
            branch: tolerated("branch", self.branch()),
            base_branch: self.base_branch(),
            build_url: self.build_url(),
            commit_sha: tolerated("commit_sha", self.commit_sha()),
            commit_message: tolerated("commit_message", self.commit_message()),
            commit_datetime: tolerated("commit_datetime", self.commit_datetime()),
        }
    }
}

fn tolerated<T>(fact: &str, result: Result<T, GitError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(fact = %fact, error = %err, "fallback failed; leaving fact unset");
            None
        }
    }
}

// ── Snapshot ─────────────────────────────────────────────────────────────────

/// Every fact the resolver knows, resolved once.
///
/// Unresolved facts are omitted from the serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildMetadata {
    /// Detected CI provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<CiProvider>,
    /// PR number, verbatim.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<String>,
    /// PR title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_title: Option<String>,
    /// PR author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_author: Option<String>,
    /// PR link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_link: Option<String>,
    /// Remote URL of the repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    /// Repository organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_org: Option<String>,
    /// Repository name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_name: Option<String>,
    /// Repository slug.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_slug: Option<String>,
    /// Branch being built.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Target branch of the PR.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_branch: Option<String>,
    /// CI build page URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_url: Option<String>,
    /// Commit hash.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
    /// Commit message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
    /// Committer datetime.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_datetime: Option<DateTime<FixedOffset>>,
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::MetadataResolver;
    use crate::env::{EnvSource, StaticEnv};
    use crate::git::GitClient;
    use crate::provider::CiProvider;

    /// Git client pointed at a directory that cannot exist, so any
    /// fallback consultation fails loudly.
    fn unreachable_git() -> GitClient {
        GitClient::new("/nonexistent/cifacts-resolver-test")
    }

    fn resolver(env: StaticEnv) -> MetadataResolver<StaticEnv> {
        MetadataResolver::new(env, unreachable_git())
    }

    #[test]
    fn env_hit_wins_without_consulting_git() {
        let r = resolver(StaticEnv::new().set("BITRISE_GIT_COMMIT", "abc123"));
        assert_eq!(r.commit_sha().expect("env hit"), "abc123");
    }

    #[test]
    fn earlier_candidate_shadows_later_one() {
        let r = resolver(
            StaticEnv::new()
                .set("BITRISE_PULL_REQUEST", "17")
                .set("CHANGE_ID", "99"),
        );
        assert_eq!(r.pr_number().as_deref(), Some("17"));
    }

    #[test]
    fn pr_number_is_none_when_no_candidate_is_set() {
        assert_eq!(resolver(StaticEnv::new()).pr_number(), None);
    }

    #[test]
    fn pr_fields_resolve_from_jenkins_change_vars() {
        let r = resolver(
            StaticEnv::new()
                .set("CHANGE_ID", "99")
                .set("CHANGE_TITLE", "Fix the flaky build")
                .set("CHANGE_AUTHOR", "jdoe")
                .set("CHANGE_URL", "https://github.com/acmeinc/iOS/pull/99")
                .set("CHANGE_TARGET", "main"),
        );
        assert_eq!(r.pr_number().as_deref(), Some("99"));
        assert_eq!(r.pr_title().as_deref(), Some("Fix the flaky build"));
        assert_eq!(r.pr_author().as_deref(), Some("jdoe"));
        assert_eq!(
            r.pr_link().expect("env hit").as_deref(),
            Some("https://github.com/acmeinc/iOS/pull/99")
        );
        assert_eq!(r.base_branch().as_deref(), Some("main"));
    }

    #[test]
    fn pr_link_is_constructed_from_slug_and_pr_number() {
        let r = resolver(
            StaticEnv::new()
                .set("GIT_REPOSITORY_URL", "https://github.com/acmeinc/iOS.git")
                .set("BITRISE_PULL_REQUEST", "42"),
        );
        assert_eq!(
            r.pr_link().expect("constructed").as_deref(),
            Some("https://github.com/acmeinc/iOS/pull/42")
        );
    }

    #[test]
    fn pr_link_is_none_without_a_pr_number() {
        let r = resolver(
            StaticEnv::new().set("GIT_REPOSITORY_URL", "https://github.com/acmeinc/iOS.git"),
        );
        assert_eq!(r.pr_link().expect("no number"), None);
    }

    #[test]
    fn repo_identity_derives_org_name_and_slug() {
        let r = resolver(
            StaticEnv::new().set("GIT_REPOSITORY_URL", "git@github.com:acmeinc/iOS.git"),
        );
        assert_eq!(r.repo_org().expect("org").as_deref(), Some("acmeinc"));
        assert_eq!(r.repo_name().expect("name").as_deref(), Some("iOS"));
        assert_eq!(r.repo_slug().expect("slug").as_deref(), Some("acmeinc/iOS"));
    }

    #[test]
    fn unparsable_remote_yields_no_identity() {
        let r = resolver(StaticEnv::new().set("GIT_URL", "https://example.com/tarball"));
        assert_eq!(r.repo_slug().expect("parsed"), None);
    }

    #[test]
    fn provider_detection_reads_marker_vars() {
        let r = resolver(StaticEnv::new().set("JENKINS_URL", "https://ci.example.com/"));
        assert_eq!(r.provider(), Some(CiProvider::Jenkins));
    }

    #[test]
    fn build_url_walks_its_candidates() {
        let r = resolver(StaticEnv::new().set("BUILD_URL", "https://ci.example.com/job/7/"));
        assert_eq!(r.build_url().as_deref(), Some("https://ci.example.com/job/7/"));
    }

    /// Env source that counts lookups per key, to pin down memoization.
    struct CountingEnv {
        inner: StaticEnv,
        lookups: RefCell<usize>,
    }

    impl EnvSource for CountingEnv {
        fn get(&self, key: &str) -> Option<String> {
            if key == "GIT_REPOSITORY_URL" {
                *self.lookups.borrow_mut() += 1;
            }
            self.inner.get(key)
        }
    }

    #[test]
    fn remote_url_is_resolved_at_most_once() {
        let env = CountingEnv {
            inner: StaticEnv::new()
                .set("GIT_REPOSITORY_URL", "https://github.com/acmeinc/iOS.git"),
            lookups: RefCell::new(0),
        };
        let r = MetadataResolver::new(env, unreachable_git());

        assert!(r.repo_slug().expect("slug").is_some());
        assert!(r.repo_org().expect("org").is_some());
        assert!(r.remote_url().expect("url").is_some());
        assert_eq!(*r.env.lookups.borrow(), 1);
    }

    #[test]
    fn snapshot_is_tolerant_of_missing_checkout() {
        let r = resolver(
            StaticEnv::new()
                .set("BITRISE_IO", "true")
                .set("BITRISE_PULL_REQUEST", "42")
                .set("BITRISE_GIT_COMMIT", "abc123")
                .set("GIT_REPOSITORY_URL", "https://github.com/acmeinc/iOS.git"),
        );
        let meta = r.resolve();
        assert_eq!(meta.provider, Some(CiProvider::Bitrise));
        assert_eq!(meta.pr_number.as_deref(), Some("42"));
        assert_eq!(meta.commit_sha.as_deref(), Some("abc123"));
        assert_eq!(meta.repo_slug.as_deref(), Some("acmeinc/iOS"));
        // No checkout behind the git client: git-only facts stay unset.
        assert_eq!(meta.branch, None);
        assert_eq!(meta.commit_datetime, None);
    }

    #[test]
    fn snapshot_omits_unresolved_facts_in_json() {
        let r = resolver(StaticEnv::new().set("BITRISE_PULL_REQUEST", "42"));
        let json = serde_json::to_value(r.resolve()).expect("serialize");
        assert_eq!(json["pr_number"], "42");
        assert!(json.get("commit_sha").is_none());
        assert!(json.get("provider").is_none());
    }
}
