//! Byte-stream composition for the install pipeline.
//!
//! The pipeline is a pull-driven chain of `Read` adapters: network body →
//! xz decompression → tar iteration. Nothing is buffered beyond the
//! decoder's internal window, so archives of any size stream through.
//!
//! A read error observed at the tar layer may have originated at any stage
//! below it, so each stage wraps its reader in a [`TagReader`] that stamps
//! errors with the stage they came from. [`classify`] later walks the error
//! source chain to recover the stage and pick the right error category.

use std::fmt;
use std::io::{self, Read};

use xz2::read::XzDecoder;

use crate::error::InstallError;

/// Pipeline stage a read error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Transport,
    Decompression,
}

/// Marker wrapped into an `io::Error` to carry its originating stage.
#[derive(Debug)]
struct Tagged {
    stage: Stage,
    source: io::Error,
}

impl fmt::Display for Tagged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for Tagged {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// `Read` adapter that stamps every error it surfaces with `stage`,
/// unless a stage further down already stamped it.
#[derive(Debug)]
pub struct TagReader<R> {
    inner: R,
    stage: Stage,
}

impl<R: Read> Read for TagReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).map_err(|err| tag(err, self.stage))
    }
}

fn tag(err: io::Error, stage: Stage) -> io::Error {
    if stage_of(&err).is_some() {
        // Propagated from a lower stage; keep the original tag.
        return err;
    }
    let kind = err.kind();
    io::Error::new(kind, Tagged { stage, source: err })
}

/// Tag a live network body so its read failures classify as transport errors.
pub fn transport<R: Read>(inner: R) -> TagReader<R> {
    TagReader {
        inner,
        stage: Stage::Transport,
    }
}

/// Compose streaming xz decompression onto `inner`.
///
/// The decoder's own failures (corrupt data, premature end of the compressed
/// stream) are tagged as decompression errors; failures it merely forwards
/// from `inner` keep their original tag.
pub fn decompress<R: Read>(inner: R) -> TagReader<XzDecoder<R>> {
    TagReader {
        inner: XzDecoder::new(inner),
        stage: Stage::Decompression,
    }
}

/// Recover the originating stage of `err`, if any stage tagged it.
pub fn stage_of(err: &io::Error) -> Option<Stage> {
    let mut current: Option<&(dyn std::error::Error + 'static)> = err
        .get_ref()
        .map(|inner| inner as &(dyn std::error::Error + 'static));
    while let Some(inner) = current {
        if let Some(tagged) = inner.downcast_ref::<Tagged>() {
            return Some(tagged.stage);
        }
        current = inner.source();
    }
    None
}

/// Map a read error surfaced during archive iteration to its category.
///
/// Untagged errors can only have been produced by the tar layer itself,
/// so they classify as archive-structure errors.
pub fn classify(url: &str, err: io::Error) -> InstallError {
    match stage_of(&err) {
        Some(Stage::Transport) => InstallError::Transport {
            url: url.to_string(),
            source: err,
        },
        Some(Stage::Decompression) => InstallError::Decompression {
            url: url.to_string(),
            source: err,
        },
        None => InstallError::Archive {
            url: url.to_string(),
            source: err,
        },
    }
}
