use chrono::{DateTime, SecondsFormat, Utc};
use genuine_tables::{
    Classification, ExtractOptions, MergedFill, OrientationSet, TableOutcome, classify_html,
    extract_html_to_csv_string,
};

use crate::cache;
use crate::error::ApiError;
use crate::models::{
    SkippedTable, TABLES_CACHE_KEY_PREFIX, TABLES_CACHE_TTL_SECONDS, TableView, TablesResponse,
};
use crate::source_fetch;

pub const CSV_CACHE_TTL_SECONDS: u32 = 24 * 60 * 60;
pub const CSV_CACHE_KEY_PREFIX: &str = "csv:page:v1:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvCacheStatus {
    Hit,
    Miss,
    Bypass,
}

impl CsvCacheStatus {
    pub const fn as_header_value(self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
            Self::Bypass => "BYPASS",
        }
    }
}

/// One page conversion: the page plus the settings that change its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub source_url: String,
    pub orientations: OrientationSet,
    pub fill: MergedFill,
}

impl PageRequest {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            orientations: OrientationSet::default(),
            fill: MergedFill::default(),
        }
    }

    pub fn csv_cache_key(&self) -> String {
        format!(
            "{CSV_CACHE_KEY_PREFIX}{}:{}:{}",
            self.orientations, self.fill, self.source_url
        )
    }

    pub fn tables_cache_key(&self) -> String {
        format!(
            "{TABLES_CACHE_KEY_PREFIX}{}:{}",
            self.orientations, self.source_url
        )
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            orientations: self.orientations.clone(),
            fill: self.fill,
            ..ExtractOptions::default()
        }
    }
}

pub async fn get_or_build_csv_with_status(
    request: &PageRequest,
) -> Result<(String, CsvCacheStatus), ApiError> {
    let cache_key = request.csv_cache_key();
    if let Some(cached) = cache::get_bytes(&cache_key).await? {
        let csv = String::from_utf8(cached).map_err(|error| {
            ApiError::Internal(format!("cached csv is not valid UTF-8: {error}"))
        })?;
        return Ok((csv, CsvCacheStatus::Hit));
    }

    let csv = build_csv(request).await?;
    put_csv_in_cache(&cache_key, &csv).await?;
    Ok((csv, CsvCacheStatus::Miss))
}

pub async fn rebuild_csv_with_status(
    request: &PageRequest,
) -> Result<(String, CsvCacheStatus), ApiError> {
    let csv = build_csv(request).await?;
    put_csv_in_cache(&request.csv_cache_key(), &csv).await?;
    Ok((csv, CsvCacheStatus::Bypass))
}

async fn put_csv_in_cache(cache_key: &str, csv: &str) -> Result<(), ApiError> {
    cache::put_bytes(
        cache_key,
        csv.as_bytes(),
        CSV_CACHE_TTL_SECONDS,
        "text/csv; charset=utf-8",
    )
    .await
}

/// Rebuilds the cached CSV and table listing of `source_url` with default
/// settings.
pub async fn refresh_source(source_url: &str) -> Result<(), ApiError> {
    let request = PageRequest::new(source_url);
    rebuild_csv_with_status(&request).await?;
    load_tables(&request, true).await?;
    Ok(())
}

async fn build_csv(request: &PageRequest) -> Result<String, ApiError> {
    let html = source_fetch::fetch_page(&request.source_url).await?;
    let (csv, report) = extract_html_to_csv_string(&html, &request.extract_options())?;

    worker::console_log!(
        "table extraction completed: tables={}, genuine={}, rows={}",
        report.table_count,
        report.genuine_count,
        report.row_count
    );

    if report.genuine_count == 0 {
        return Err(ApiError::NotFound(
            "no genuine tables found on the source page".to_string(),
        ));
    }
    Ok(csv)
}

/// Classification listing for the page, served from cache unless `force`.
pub async fn load_tables(request: &PageRequest, force: bool) -> Result<TablesResponse, ApiError> {
    let cache_key = request.tables_cache_key();
    if !force
        && let Some(mut cached) = cache::get_json::<TablesResponse>(&cache_key).await?
    {
        cached.cached = true;
        return Ok(cached);
    }

    let html = source_fetch::fetch_page(&request.source_url).await?;
    let classification = classify_html(&html, &request.extract_options());
    let response = tables_response(
        &request.source_url,
        &request.orientations,
        &classification,
        Utc::now(),
    );

    cache::put_json(&cache_key, &response, TABLES_CACHE_TTL_SECONDS).await?;
    Ok(response)
}

pub fn tables_response(
    source_url: &str,
    orientations: &OrientationSet,
    classification: &Classification,
    generated_at: DateTime<Utc>,
) -> TablesResponse {
    let skipped = classification
        .tables
        .iter()
        .filter_map(|report| match &report.outcome {
            TableOutcome::Skipped(warning) => Some(SkippedTable::from(warning)),
            TableOutcome::Genuine(_) => None,
        })
        .collect();

    TablesResponse {
        source_url: source_url.to_string(),
        generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        orientations: orientations.to_string(),
        tables: classification.sheets().map(TableView::from).collect(),
        skipped,
        cached: false,
    }
}
