use hrepr_browser::{mount, ChromiumBridge, Session, SessionConfig, TimeoutConfig};
use hrepr_core::{Callee, LoaderConfig};
use hrepr_loader::ScriptLoader;
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Usage: counter_page <page-url> <script-url>...
///
/// Opens the page, loads every script once, then mounts a `Counter` on the
/// element with id `H1`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let url = args.next().ok_or_else(|| anyhow::anyhow!("missing page url"))?;
    let scripts: Vec<String> = args.collect();

    let session = Session::launch(SessionConfig::default(), TimeoutConfig::default()).await?;
    let page = session.open(&url).await?;

    let (bridge, mut events) = ChromiumBridge::spawn(session.injector(page.clone()));
    let loader = ScriptLoader::with_config(bridge, LoaderConfig::default().with_retries(2));

    let batch = loader.load(scripts);
    loader.bridge().drive(&mut events, batch).await?;

    let mounted = mount(&page, "H1", &Callee::construct("Counter"), &[json!({"increment": 3})], false).await?;
    println!("{}", mounted);

    session.close().await?;
    Ok(())
}
