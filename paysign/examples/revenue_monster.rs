use paysign::revenue_monster::{Client, Config, Request, RESPONSE_SUCCESS};
use paysign::{default_context, LogTracer, Result};
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // Credentials and key path come from REVENUE_MONSTER_* env values.
    let ctx = default_context();
    let config = Config::new().with_sandbox(true).from_env(&ctx);
    let client = Client::builder(config)
        .with_tracer(LogTracer)
        .build(ctx)
        .await?;

    let req = Request::new(
        "create_online_payment",
        http::Method::POST,
        client.open_url("v3/payment/online"),
    )
    .with_json(json!({
        "storeId": client.store_id().unwrap_or_default(),
        "redirectUrl": "https://example.com/return",
        "notifyUrl": "https://example.com/notify",
        "layoutVersion": "v3",
        "type": "WEB_PAYMENT",
        "method": [],
        "order": {
            "id": "ORDER-0001",
            "title": "Sample order",
            "currencyType": "MYR",
            "amount": 100,
            "detail": "",
            "additionalData": ""
        }
    }));

    let resp: Option<Value> = client.execute(req).await?;
    match resp {
        Some(v) if v["code"] == RESPONSE_SUCCESS => println!("checkout: {}", v["item"]["url"]),
        other => println!("unexpected response: {other:?}"),
    }
    Ok(())
}
