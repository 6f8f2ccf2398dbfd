use paysign_core::{Context, OsEnv, PrivateKey, Result};
use paysign_file_read_tokio::TokioFileRead;
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    let ctx = Context::new().with_file_read(TokioFileRead).with_env(OsEnv);

    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "~/.paysign/private_key.pem".to_string());
    let Some(path) = ctx.expand_home_dir(&path) else {
        eprintln!("home dir not found, pass an absolute path");
        return Ok(());
    };

    println!("Attempting to read key: {}", path);
    match ctx.file_read_as_string(&path).await {
        Ok(pem) => {
            let key = PrivateKey::from_pem(&pem)?;
            println!("Loaded {key:?}, public key: {:?}", key.public_key());
        }
        Err(e) => {
            eprintln!("Failed to read file: {}", e);
        }
    }

    Ok(())
}
