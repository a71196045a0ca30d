use std::time::Duration;

use reqwest::{Url, blocking::Client};

use crate::error::PepFragError;

pub const TINYURL_ENDPOINT: &str = "http://tinyurl.com/api-create.php";

fn api_url(endpoint: &str, url: &str) -> Result<Url, PepFragError> {
    Url::parse_with_params(endpoint, &[("url", url)]).map_err(|e| PepFragError::Url {
        url: endpoint.to_string(),
        reason: e.to_string(),
    })
}

fn request_short_url(endpoint: &str, url: &str) -> Result<String, PepFragError> {
    let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
    let response = client
        .get(api_url(endpoint, url)?)
        .send()?
        .error_for_status()?;
    Ok(response.text()?.trim().to_string())
}

/// Shorten the url with TinyURL. This never fails, on failure the result is the error text.
pub fn shorten_url(url: &str) -> String {
    shorten_url_with(TINYURL_ENDPOINT, url)
}

pub fn shorten_url_with(endpoint: &str, url: &str) -> String {
    match request_short_url(endpoint, url) {
        Ok(short) => {
            log::debug!("Shortened {url} to {short}");
            short
        }
        Err(e) => {
            log::warn!("Could not shorten {url}: {e}");
            format!("Error: {e}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request() {
        assert_eq!(
            api_url(TINYURL_ENDPOINT, "http://localhost:8501/?peptide=PEPTIDE&charge=2")
                .unwrap()
                .as_str(),
            "http://tinyurl.com/api-create.php?url=http%3A%2F%2Flocalhost%3A8501%2F%3Fpeptide%3DPEPTIDE%26charge%3D2"
        );
    }

    #[test]
    fn failure_is_text() {
        // Nothing listens on the discard port
        let short = shorten_url_with("http://127.0.0.1:9/api-create.php", "http://localhost/");
        assert!(short.starts_with("Error: "), "{short}");
        assert!(shorten_url_with("not a url", "http://localhost/").starts_with("Error: Invalid url"));
    }
}
