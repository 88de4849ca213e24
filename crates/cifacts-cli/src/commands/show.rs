//! `cifacts show`: the full metadata snapshot.

use anyhow::Result;
use cifacts_core::{BuildMetadata, EnvSource, MetadataResolver};

use super::JsonOut;

pub fn run<E: EnvSource>(resolver: &MetadataResolver<E>, json: bool) -> Result<()> {
    let meta = resolver.resolve();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut {
                ok: true,
                data: &meta
            })?
        );
    } else {
        print_plain(&meta);
    }
    Ok(())
}

/// One `name: value` line per resolved fact, unresolved facts omitted.
fn print_plain(meta: &BuildMetadata) {
    let rows: Vec<(&str, Option<String>)> = vec![
        ("provider", meta.provider.map(|p| p.to_string())),
        ("pr_number", meta.pr_number.clone()),
        ("pr_title", meta.pr_title.clone()),
        ("pr_author", meta.pr_author.clone()),
        ("pr_link", meta.pr_link.clone()),
        ("remote_url", meta.remote_url.clone()),
        ("repo_org", meta.repo_org.clone()),
        ("repo_name", meta.repo_name.clone()),
        ("repo_slug", meta.repo_slug.clone()),
        ("branch", meta.branch.clone()),
        ("base_branch", meta.base_branch.clone()),
        ("build_url", meta.build_url.clone()),
        ("commit_sha", meta.commit_sha.clone()),
        ("commit_message", meta.commit_message.clone()),
        ("commit_datetime", meta.commit_datetime.map(|dt| dt.to_rfc3339())),
    ];
    for (name, value) in rows {
        if let Some(value) = value {
            println!("{name}: {value}");
        }
    }
}
