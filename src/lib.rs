pub mod cache;
pub mod error;
pub mod models;
pub mod routes;
pub mod source_fetch;
pub mod table_pipeline;

use worker::{Context, Env, Request, Response, Result, ScheduleContext, ScheduledEvent, event};

#[event(fetch)]
async fn fetch(req: Request, env: Env, ctx: Context) -> Result<Response> {
    routes::handle(req, env, ctx).await
}

#[event(scheduled)]
async fn scheduled(_event: ScheduledEvent, env: Env, _ctx: ScheduleContext) {
    let Ok(source_url) = env.var("SOURCE_URL").map(|value| value.to_string()) else {
        worker::console_log!("SOURCE_URL is not configured; skipping scheduled refresh");
        return;
    };

    if let Err(error) = table_pipeline::refresh_source(&source_url).await {
        worker::console_error!("scheduled table refresh failed for {source_url}: {error}");
    }
}
