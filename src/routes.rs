use std::collections::HashMap;

use genuine_tables::{MergedFill, OrientationSet};
use serde::Serialize;
use url::Url;
use worker::{Context, Env, Request, Response, Result, RouteContext, Router};

use crate::error::ApiError;
use crate::models::TablesResponse;
use crate::source_fetch::validate_source_url;
use crate::table_pipeline::{self, PageRequest};

#[derive(Debug, Clone)]
pub struct AppState {
    pub source_url: Option<String>,
}

pub async fn handle(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    let source_url = env.var("SOURCE_URL").ok().map(|value| value.to_string());

    let state = AppState { source_url };

    Router::with_data(state)
        .get_async("/api/v1/tables", tables_route)
        .get_async("/api/v1/csv", csv_route)
        .run(req, env)
        .await
}

async fn tables_route(req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    match tables_response(&req, ctx.data.source_url.as_deref()).await {
        Ok(response) => json_response(&response),
        Err(error) => error.into_response(),
    }
}

async fn csv_route(req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    match csv_response(&req, ctx.data.source_url.as_deref()).await {
        Ok(response) => Ok(response),
        Err(error) => error.into_response(),
    }
}

fn page_request(
    query: &HashMap<String, String>,
    default_source: Option<&str>,
) -> Result<PageRequest, ApiError> {
    let source = parse_source_url(query, default_source)?;
    Ok(PageRequest {
        source_url: source.to_string(),
        orientations: parse_orientations_query(query)?,
        fill: parse_fill_query(query)?,
    })
}

async fn tables_response(
    req: &Request,
    default_source: Option<&str>,
) -> Result<TablesResponse, ApiError> {
    let query = parse_query(req)?;
    let request = page_request(&query, default_source)?;
    let force = parse_force_query(&query);

    table_pipeline::load_tables(&request, force).await
}

async fn csv_response(req: &Request, default_source: Option<&str>) -> Result<Response, ApiError> {
    let query = parse_query(req)?;
    let request = page_request(&query, default_source)?;
    let force = parse_force_query(&query);

    let (csv, cache_status) = if force {
        table_pipeline::rebuild_csv_with_status(&request).await?
    } else {
        table_pipeline::get_or_build_csv_with_status(&request).await?
    };
    let mut response = Response::ok(csv)?;
    response
        .headers_mut()
        .set("Content-Type", "text/csv; charset=utf-8")?;
    response.headers_mut().set(
        "Content-Disposition",
        &format!(
            "inline; filename=\"{}\"",
            csv_filename(&Url::parse(&request.source_url)?)
        ),
    )?;
    response
        .headers_mut()
        .set("X-Cache-Status", cache_status.as_header_value())?;
    response.headers_mut().set("Cache-Control", "no-store")?;
    Ok(response)
}

fn json_response<T>(payload: &T) -> Result<Response>
where
    T: Serialize,
{
    let mut response = Response::from_json(payload)?;
    response.headers_mut().set("Cache-Control", "no-store")?;
    Ok(response)
}

fn parse_query(req: &Request) -> Result<HashMap<String, String>, ApiError> {
    let url = req.url()?;
    let query = url
        .query_pairs()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect::<HashMap<_, _>>();
    Ok(query)
}

/// Page to convert: the `url` query parameter, else the configured source.
pub fn parse_source_url(
    query: &HashMap<String, String>,
    default_source: Option<&str>,
) -> Result<Url, ApiError> {
    let raw = query
        .get("url")
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
        .or(default_source)
        .ok_or_else(|| {
            ApiError::BadRequest("missing url parameter and no SOURCE_URL configured".to_string())
        })?;
    validate_source_url(raw)
}

pub fn parse_orientations_query(
    query: &HashMap<String, String>,
) -> Result<OrientationSet, ApiError> {
    let Some(raw) = query.get("orientations") else {
        return Ok(OrientationSet::default());
    };
    raw.parse().map_err(ApiError::BadRequest)
}

pub fn parse_fill_query(query: &HashMap<String, String>) -> Result<MergedFill, ApiError> {
    let Some(raw) = query.get("fill") else {
        return Ok(MergedFill::default());
    };
    raw.parse().map_err(ApiError::BadRequest)
}

pub fn parse_force_query(query: &HashMap<String, String>) -> bool {
    query.get("force").is_some_and(|value| {
        let lowered = value.trim().to_ascii_lowercase();
        lowered == "true" || lowered == "1" || lowered == "yes"
    })
}

/// Download name derived from the page host, e.g. `tables-example.com.csv`.
pub fn csv_filename(source: &Url) -> String {
    let host = source
        .host_str()
        .unwrap_or("page")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect::<String>();
    format!("tables-{host}.csv")
}
