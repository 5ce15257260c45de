use std::sync::LazyLock;

use genuine_tables::{TableError, decode_html};
use regex::Regex;
use url::Url;
use worker::Fetch;

use crate::error::ApiError;

static CHARSET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*"?\s*([a-z0-9_:.\-]+)"#).expect("static regex must compile")
});

/// Parses a page address and accepts only http and https.
pub fn validate_source_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw.trim())?;
    if matches!(url.scheme(), "http" | "https") {
        return Ok(url);
    }
    Err(ApiError::BadRequest(format!(
        "unsupported url scheme '{}', expected http or https",
        url.scheme()
    )))
}

/// Charset parameter of a `Content-Type` header value.
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    CHARSET_RE
        .captures(content_type)
        .and_then(|capture| capture.get(1))
        .map(|label| label.as_str().to_ascii_lowercase())
}

pub async fn fetch_page(source_url: &str) -> Result<String, ApiError> {
    let source = validate_source_url(source_url)?;
    let mut response = Fetch::Url(source).send().await?;
    let status = response.status_code();
    if status >= 400 {
        return Err(ApiError::Upstream(format!(
            "failed to fetch source page: status {status}"
        )));
    }

    let charset = response
        .headers()
        .get("Content-Type")?
        .as_deref()
        .and_then(charset_from_content_type);
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Err(ApiError::Upstream("fetched page is empty".to_string()));
    }

    match decode_html(&bytes, charset.as_deref()) {
        Err(TableError::UnknownEncoding(label)) => {
            worker::console_log!("ignoring unknown charset '{label}' from {source_url}");
            Ok(decode_html(&bytes, None)?)
        }
        decoded => Ok(decoded?),
    }
}
