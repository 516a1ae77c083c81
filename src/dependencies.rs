use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use tokio::process::Command;

/// Verify the configured codec binary is present and runnable before any
/// audio work starts
pub async fn validate_codec(codec_binary: &Path) -> Result<()> {
    let output = Command::new(codec_binary)
        .args(["-version"])
        .output()
        .await
        .with_context(|| {
            format!(
                "codec binary {:?} is not available; install FFmpeg or point \
                 --codec / CODEC_BINARY_PATH at a compatible binary",
                codec_binary
            )
        })?;

    if !output.status.success() {
        anyhow::bail!(
            "codec binary {:?} is installed but not working properly",
            codec_binary
        );
    }

    let version_info = String::from_utf8_lossy(&output.stdout);
    if let Some(version_line) = version_info.lines().next() {
        info!("Codec found: {}", version_line);
    }

    Ok(())
}
