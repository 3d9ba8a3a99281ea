//! Streaming download of a resolved archive URL.
//!
//! The response body is never buffered: the returned reader pulls bytes off
//! the live connection, so decompression and extraction run while the
//! download is still in flight. Dropping the reader releases the connection.

use std::io;

use reqwest::blocking::Response;

use crate::error::{InstallError, InstallResult};
use crate::stream::{self, TagReader};

/// Open a streaming byte source for `url`.
///
/// A request failure or non-success status fails eagerly; a connection that
/// drops mid-transfer surfaces later as a transport-tagged read error.
pub fn open(url: &str) -> InstallResult<TagReader<Response>> {
    let response = reqwest::blocking::get(url)
        .and_then(|response| response.error_for_status())
        .map_err(|err| InstallError::Transport {
            url: url.to_string(),
            source: io::Error::new(io::ErrorKind::Other, err),
        })?;
    Ok(stream::transport(response))
}
