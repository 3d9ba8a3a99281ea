//! Install orchestration: resolve → fetch → decompress → extract → place.
//!
//! The whole chain is lazy; no bytes move until the tar iterator is driven.
//! Entries are processed strictly in archive order and the first failure at
//! any stage aborts the install with that stage's error. The caller owns the
//! session and decides whether to roll it back.

use std::io::Read;

use crate::config::{CompiledRule, Package};
use crate::error::InstallResult;
use crate::session::Session;
use crate::{fetch, place, resolve, stream};

/// Outcome of a successful package install.
#[derive(Debug)]
pub struct Report {
    /// Fully qualified archive URL the package resolved to.
    pub url: String,
    /// Number of archive entries placed.
    pub placed: usize,
}

/// Run the full pipeline for one package, recording every placed file in
/// `session`.
pub fn install(pkg: &Package, session: &mut Session) -> InstallResult<Report> {
    let url = resolve::resolve(&pkg.name, &pkg.repo)?;
    println!("installing {} from {}", pkg.name, url);

    let body = fetch::open(&url)?;
    let placed = place_archive(stream::decompress(body), &pkg.rules, session, &url)?;

    Ok(Report { url, placed })
}

/// Iterate a decompressed tar stream and place every entry that matches a
/// rule. Returns the number of entries placed.
///
/// Only regular-file entries are placement candidates; directories, links
/// and other entry types are skipped. Entry content left unconsumed by a
/// non-matching rule is skipped by the archive iterator itself.
pub fn place_archive<R: Read>(
    source: R,
    rules: &[CompiledRule],
    session: &mut Session,
    url: &str,
) -> InstallResult<usize> {
    let mut archive = tar::Archive::new(source);
    let entries = archive.entries().map_err(|err| stream::classify(url, err))?;

    let mut placed = 0;
    for entry in entries {
        let mut entry = entry.map_err(|err| stream::classify(url, err))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        // Entry names are /-delimited byte paths; lossy decoding keeps the
        // iteration going on the rare non-UTF-8 name, which no rule can
        // match anyway.
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        if place::place(&name, &mut entry, rules, session, url)? {
            placed += 1;
        }
    }
    Ok(placed)
}
