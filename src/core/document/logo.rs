use std::time::Duration;

use log::{info, warn};
use once_cell::sync::OnceCell;

use crate::error::Result;

pub const DEFAULT_LOGO_URL: &str =
    "https://www.python.org/static/community_logos/python-logo-master-v3-TM.png";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Logo bytes, downloaded at most once per process
static LOGO: OnceCell<Option<Vec<u8>>> = OnceCell::new();

/// Fetch the report logo. The first call performs the download; later calls
/// return the cached result whatever URL they pass. A failed download is
/// logged and cached as `None`.
pub fn fetch_logo(url: &str) -> Option<&'static [u8]> {
    LOGO.get_or_init(|| match download(url) {
        Ok(bytes) => {
            info!("Fetched logo ({} bytes) from {}", bytes.len(), url);
            Some(bytes)
        }
        Err(e) => {
            warn!("Continuing without logo: {}", e);
            None
        }
    })
    .as_deref()
}

fn download(url: &str) -> Result<Vec<u8>> {
    let response = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .user_agent(concat!("hwreport/", env!("CARGO_PKG_VERSION")))
        .build()?
        .get(url)
        .send()?
        .error_for_status()?;

    Ok(response.bytes()?.to_vec())
}
