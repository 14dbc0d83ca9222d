//! Blocking fetch-to-disk transfer for one download task.
//!
//! Streams an HTTP GET into a `.part` file next to the destination and
//! renames over it on success, so a pre-existing file is only replaced by a
//! complete transfer. No retry; errors propagate to the caller.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_REDIRECTS: u32 = 10;

/// Downloads `url` into `destination`, overwriting any existing file there.
pub fn fetch_to_disk(url: &str, destination: &Path) -> Result<()> {
    let temp = temp_path(destination);
    let mut file = File::create(&temp)
        .with_context(|| format!("failed to create {}", temp.display()))?;

    let mut easy = curl::easy::Easy::new();
    easy.url(url).context("invalid URL")?;
    easy.follow_location(true)?;
    easy.max_redirections(MAX_REDIRECTS)?;
    easy.connect_timeout(CONNECT_TIMEOUT)?;

    let perform = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match file.write_all(data) {
            Ok(()) => Ok(data.len()),
            Err(err) => {
                tracing::warn!("write to {} failed: {}", temp.display(), err);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };
    if let Err(err) = perform {
        let _ = fs::remove_file(&temp);
        return Err(err).with_context(|| format!("download failed: {url}"));
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        let _ = fs::remove_file(&temp);
        anyhow::bail!("download of {} returned HTTP {}", url, code);
    }

    file.flush()
        .with_context(|| format!("flushing {}", temp.display()))?;
    drop(file);

    fs::rename(&temp, destination).with_context(|| {
        format!("failed to move {} to {}", temp.display(), destination.display())
    })?;
    Ok(())
}

/// Path for the in-flight file: appends `.part` to the destination.
fn temp_path(destination: &Path) -> PathBuf {
    let mut o = destination.as_os_str().to_owned();
    o.push(".part");
    PathBuf::from(o)
}
