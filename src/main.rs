use anyhow::{bail, Context, Result};
use polyglot_client::{ClientConfig, Language, PolyglotClient, TranslationParams};
use tracing::info;

const USAGE: &str = "Usage: polyglot <language> <text> [description] [string-id]";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("polyglot_client=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (language, text) = match args.as_slice() {
        [language, text, ..] => (language, text),
        _ => bail!(USAGE),
    };
    let language: Language = language.parse().context("Invalid language argument")?;
    let description = args.get(2).map(String::as_str).filter(|d| !d.is_empty());
    let string_id = args.get(3).map(String::as_str).unwrap_or(text);

    let config = ClientConfig::from_env()?;
    let client = PolyglotClient::connect(config)
        .await
        .context("Failed to initialize translation client")?;

    let translation = client
        .get_or_translate_with(
            language,
            text,
            description,
            string_id,
            &TranslationParams::default(),
        )
        .await;

    match translation {
        Some(translation) => println!("{}", translation),
        None => info!("No {} translation available for {}", language, string_id),
    }

    Ok(())
}
