use serde::{Serialize, de::DeserializeOwned};
use worker::{Cache, Response};

use crate::error::ApiError;

const CACHE_ORIGIN: &str = "https://genuine-tables.cache/";

/// Synthetic request URL the Cache API stores `key` under.
pub fn cache_url(key: &str) -> String {
    format!("{CACHE_ORIGIN}{}", urlencoding::encode(key))
}

async fn lookup(key: &str) -> Result<Option<Response>, ApiError> {
    let cache = Cache::default();
    Ok(cache.get(cache_url(key), true).await?)
}

async fn store(
    key: &str,
    mut response: Response,
    ttl_seconds: u32,
    content_type: &str,
) -> Result<(), ApiError> {
    response
        .headers_mut()
        .set("Cache-Control", &format!("public, max-age={ttl_seconds}"))?;
    response.headers_mut().set("Content-Type", content_type)?;

    Cache::default().put(cache_url(key), response).await?;
    Ok(())
}

pub async fn get_json<T>(key: &str) -> Result<Option<T>, ApiError>
where
    T: DeserializeOwned,
{
    let Some(mut response) = lookup(key).await? else {
        return Ok(None);
    };

    let body = response.text().await?;
    Ok(Some(serde_json::from_str::<T>(&body)?))
}

pub async fn put_json<T>(key: &str, value: &T, ttl_seconds: u32) -> Result<(), ApiError>
where
    T: Serialize,
{
    let body = serde_json::to_string(value)?;
    store(
        key,
        Response::ok(body)?,
        ttl_seconds,
        "application/json; charset=utf-8",
    )
    .await
}

pub async fn get_bytes(key: &str) -> Result<Option<Vec<u8>>, ApiError> {
    let Some(mut response) = lookup(key).await? else {
        return Ok(None);
    };

    Ok(Some(response.bytes().await?))
}

pub async fn put_bytes(
    key: &str,
    bytes: &[u8],
    ttl_seconds: u32,
    content_type: &str,
) -> Result<(), ApiError> {
    store(
        key,
        Response::from_bytes(bytes.to_vec())?,
        ttl_seconds,
        content_type,
    )
    .await
}
