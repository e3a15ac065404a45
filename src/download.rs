use reqwest::blocking::Client;

const USER_AGENT: &str = concat!("release-shim/", env!("CARGO_PKG_VERSION"));

/// Download `url` into memory. Any non-2xx status is an error.
pub fn fetch(client: &Client, url: &str) -> Result<Vec<u8>, String> {
    tracing::debug!(url, "downloading");

    let resp = client
        .get(url)
        .header("User-Agent", USER_AGENT)
        .send()
        .map_err(|e| format!("failed to download {url}: {e}"))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(format!(
            "received a bad HTTP status code ({status}) when requesting {url}"
        ));
    }

    let bytes = resp
        .bytes()
        .map_err(|e| format!("failed to read response body from {url}: {e}"))?;

    tracing::debug!(url, len = bytes.len(), "downloaded");
    Ok(bytes.to_vec())
}
