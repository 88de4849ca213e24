//! Resolve pull-request, repository, and commit metadata in CI.
//!
//! `cifacts-core` answers "what is being built right now?" for build
//! tooling that runs both inside CI and on developer machines. Every fact
//! (PR number, PR title/author/link, repository org/name/slug, commit
//! hash/message/datetime, branch) is looked up through an ordered list of
//! CI-provider environment variables (Bitrise, Jenkins multibranch,
//! GitHub Actions) and, where the contract defines one, falls back to the
//! local `git` checkout when no candidate variable is set.
//!
//! The first non-empty candidate wins verbatim; later candidates and the
//! git fallback are never consulted. Empty values count as unset.
//!
//! ```
//! use cifacts_core::{GitClient, MetadataResolver, StaticEnv};
//!
//! let env = StaticEnv::new()
//!     .set("BITRISE_PULL_REQUEST", "42")
//!     .set("GIT_REPOSITORY_URL", "https://github.com/acmeinc/iOS.git");
//! let resolver = MetadataResolver::new(env, GitClient::new("."));
//!
//! assert_eq!(resolver.pr_number().as_deref(), Some("42"));
//! assert_eq!(resolver.repo_slug().unwrap().as_deref(), Some("acmeinc/iOS"));
//! ```

pub mod env;
pub mod error;
pub mod git;
pub mod provider;
pub mod remote;
pub mod resolver;

pub use env::{EnvSource, ProcessEnv, StaticEnv};
pub use error::GitError;
pub use git::GitClient;
pub use provider::CiProvider;
pub use remote::{parse_remote_url, RepoIdentity};
pub use resolver::{BuildMetadata, MetadataResolver};
