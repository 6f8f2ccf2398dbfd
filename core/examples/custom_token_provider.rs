use async_trait::async_trait;
use paysign_core::canonical::canonicalize;
use paysign_core::hash::base64_encode;
use paysign_core::time::{now, unix_seconds};
use paysign_core::utils::{random_nonce, NONCE_LENGTH};
use paysign_core::{
    Context, PrivateKey, ProvideToken, Result, SignType, SigningMaterial, StaticEnv, Token,
    TokenSource,
};
use std::collections::HashMap;

// A token provider backed by an external token service, here faked with an env var.
#[derive(Debug)]
struct EnvTokenProvider;

#[async_trait]
impl ProvideToken for EnvTokenProvider {
    async fn provide_token(&self, ctx: &Context) -> Result<Token> {
        let token = ctx
            .env_var("MY_GATEWAY_TOKEN")
            .unwrap_or_else(|| "demo-token".to_string());
        Ok(Token::new(token))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::builder().try_init();

    let ctx = Context::new().with_env(StaticEnv {
        home_dir: None,
        envs: HashMap::from([(
            "MY_GATEWAY_TOKEN".to_string(),
            "token-from-env".to_string(),
        )]),
    });
    let source = TokenSource::new(ctx, EnvTokenProvider);
    let token = source.token().await?;
    println!("token: {token:?}");

    let body = canonicalize(br#"{"currency":"MYR","amount":100}"#)?;
    println!(
        "canonical body: {}",
        String::from_utf8_lossy(body.as_deref().unwrap_or_default())
    );

    let material = SigningMaterial {
        data: body.as_deref().map(base64_encode),
        method: "post".to_string(),
        nonce_str: random_nonce(NONCE_LENGTH),
        request_url: "https://api.example/orders".to_string(),
        sign_type: SignType::Sha256,
        timestamp: unix_seconds(now()),
    };
    println!("string to sign: {}", material.string_to_sign());

    let key = PrivateKey::from_pem(include_str!("../testdata/private_key.pem"))?;
    println!("signature: sha256 {}", material.sign(&key)?);
    Ok(())
}
