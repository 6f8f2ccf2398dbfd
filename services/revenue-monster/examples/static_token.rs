use paysign_core::{Context, LogTracer, OsEnv, Result};
use paysign_file_read_tokio::TokioFileRead;
use paysign_http_send_reqwest::ReqwestHttpSend;
use paysign_revenue_monster::{Client, Config, Request, StaticTokenProvider};
use serde_json::Value;

/// Query a store with an access token issued by another service.
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);

    let token = ctx.env_var("REVENUE_MONSTER_ACCESS_TOKEN").unwrap_or_default();
    let config = Config::new().with_sandbox(true).from_env(&ctx);
    let client = Client::builder(config)
        .with_token_provider(StaticTokenProvider::new(&token))
        .with_tracer(LogTracer)
        .build(ctx)
        .await?;

    let store_id = client.store_id().unwrap_or_default().to_string();
    let req = Request::new(
        "get_store",
        http::Method::GET,
        client.open_url(&format!("v3/store/{store_id}")),
    );
    let store: Option<Value> = client.execute(req).await?;
    println!("{store:#?}");
    Ok(())
}
