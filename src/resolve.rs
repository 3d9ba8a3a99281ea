//! Archive URL resolution from a repository listing page.
//!
//! Repositories expose a plain HTML index of archive files. Resolution
//! fetches that page, scans its links for filenames shaped like
//! `<name>-<version>-x86_64.pkg.tar.xz`, and requires exactly one distinct
//! candidate; none or several is a resolution failure, never a guess.

use std::collections::BTreeSet;

use regex::Regex;

use crate::error::{InstallError, InstallResult};

/// Filename suffix of installable archives on the listing page.
const ARCHIVE_SUFFIX: &str = "x86_64.pkg.tar.xz";

/// Resolve `name` against the repository listing at `repo` and return the
/// fully qualified archive URL.
pub fn resolve(name: &str, repo: &str) -> InstallResult<String> {
    let listing = fetch_listing(name, repo)?;
    let filename = scan_listing(&listing, name)?;
    Ok(join_url(repo, &filename))
}

fn fetch_listing(name: &str, repo: &str) -> InstallResult<String> {
    let response = reqwest::blocking::get(repo)
        .and_then(|response| response.error_for_status())
        .map_err(|err| InstallError::Resolution {
            name: name.to_string(),
            reason: format!("cannot fetch listing {repo}: {err}"),
        })?;
    response.text().map_err(|err| InstallError::Resolution {
        name: name.to_string(),
        reason: format!("cannot read listing {repo}: {err}"),
    })
}

/// Scan listing HTML for link targets whose filename matches the expected
/// archive pattern for `name`. Exactly one distinct filename must match.
pub fn scan_listing(html: &str, name: &str) -> InstallResult<String> {
    let resolution_err = |reason: String| InstallError::Resolution {
        name: name.to_string(),
        reason,
    };

    let filename_re = Regex::new(&format!(
        "^{}-.+-{}$",
        regex::escape(name),
        regex::escape(ARCHIVE_SUFFIX)
    ))
    .map_err(|err| resolution_err(format!("bad archive pattern: {err}")))?;
    let href_re = Regex::new(r#"href="([^"]+)""#)
        .map_err(|err| resolution_err(format!("bad href pattern: {err}")))?;

    let mut candidates = BTreeSet::new();
    for capture in href_re.captures_iter(html) {
        let href = &capture[1];
        // Links may be absolute or relative; only the filename part counts.
        let filename = href.rsplit('/').next().unwrap_or(href);
        if filename_re.is_match(filename) {
            candidates.insert(filename.to_string());
        }
    }

    match candidates.len() {
        0 => Err(resolution_err(format!(
            "no archive matching {name}-*-{ARCHIVE_SUFFIX} in listing"
        ))),
        1 => Ok(candidates.into_iter().next().unwrap_or_default()),
        n => Err(resolution_err(format!(
            "{n} archives match {name}-*-{ARCHIVE_SUFFIX}: {}",
            candidates.into_iter().collect::<Vec<_>>().join(", ")
        ))),
    }
}

fn join_url(base: &str, filename: &str) -> String {
    if base.ends_with('/') {
        format!("{base}{filename}")
    } else {
        format!("{base}/{filename}")
    }
}
