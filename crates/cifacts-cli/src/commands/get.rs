//! `cifacts get <fact>`: a single fact on stdout.

use anyhow::{bail, Result};
use cifacts_core::{EnvSource, MetadataResolver};
use clap::ValueEnum;

use super::JsonOut;

/// Facts addressable from the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Fact {
    Provider,
    PrNumber,
    PrTitle,
    PrAuthor,
    PrLink,
    RemoteUrl,
    RepoOrg,
    RepoName,
    RepoSlug,
    Branch,
    BaseBranch,
    BuildUrl,
    CommitSha,
    CommitMessage,
    CommitDatetime,
}

impl Fact {
    fn name(self) -> String {
        self.to_possible_value()
            .map(|value| value.get_name().to_string())
            .unwrap_or_default()
    }
}

pub fn run<E: EnvSource>(resolver: &MetadataResolver<E>, fact: Fact, json: bool) -> Result<()> {
    let value: Option<String> = match fact {
        Fact::Provider => resolver.provider().map(|p| p.to_string()),
        Fact::PrNumber => resolver.pr_number(),
        Fact::PrTitle => resolver.pr_title(),
        Fact::PrAuthor => resolver.pr_author(),
        Fact::PrLink => resolver.pr_link()?,
        Fact::RemoteUrl => resolver.remote_url()?,
        Fact::RepoOrg => resolver.repo_org()?,
        Fact::RepoName => resolver.repo_name()?,
        Fact::RepoSlug => resolver.repo_slug()?,
        Fact::Branch => Some(resolver.branch()?),
        Fact::BaseBranch => resolver.base_branch(),
        Fact::BuildUrl => resolver.build_url(),
        Fact::CommitSha => Some(resolver.commit_sha()?),
        Fact::CommitMessage => Some(resolver.commit_message()?),
        Fact::CommitDatetime => Some(resolver.commit_datetime()?.to_rfc3339()),
    };

    let Some(value) = value else {
        bail!("{} did not resolve", fact.name());
    };

    if json {
        println!(
            "{}",
            serde_json::to_string(&JsonOut {
                ok: true,
                data: value
            })?
        );
    } else {
        println!("{value}");
    }
    Ok(())
}
