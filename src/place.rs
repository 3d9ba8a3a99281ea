//! Rule evaluation and destination writes.
//!
//! Rules are evaluated in declaration order and the first match wins; an
//! entry matching no rule is skipped without side effect. The destination is
//! always `dest-dir/<basename of the entry name>`, created or truncated, so
//! colliding basenames resolve last-write-wins in archive order.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::os::unix::fs::PermissionsExt;

use crate::config::CompiledRule;
use crate::error::{InstallError, InstallResult};
use crate::session::Session;
use crate::stream;

/// Evaluate `entry_name` against `rules` and, on the first match, stream
/// `content` to the rule's destination with the rule's permission bits.
///
/// Returns whether the entry matched. The destination path is recorded in
/// the session as soon as the file is created, before anything that can
/// still fail, so rollback also covers a partially written destination.
pub fn place<R: Read>(
    entry_name: &str,
    content: &mut R,
    rules: &[CompiledRule],
    session: &mut Session,
    url: &str,
) -> InstallResult<bool> {
    let Some(rule) = rules.iter().find(|rule| rule.matches(entry_name)) else {
        return Ok(false);
    };

    let basename = entry_name.rsplit('/').next().unwrap_or(entry_name);
    let dest = rule.dest_dir.join(basename);
    let place_err = |source| InstallError::Place {
        path: dest.clone(),
        source,
    };

    let mut file = File::create(&dest).map_err(place_err)?;
    session.record(dest.clone());

    // Read and write failures are told apart: read errors come from the
    // pipeline and classify by their originating stage, write errors are
    // placement failures at the destination.
    let mut buf = [0u8; 32 * 1024];
    loop {
        let n = content
            .read(&mut buf)
            .map_err(|err| stream::classify(url, err))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(place_err)?;
    }
    file.flush().map_err(place_err)?;
    drop(file);

    fs::set_permissions(&dest, fs::Permissions::from_mode(rule.mode)).map_err(place_err)?;
    Ok(true)
}
