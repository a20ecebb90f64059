use anyhow::Result;
use livechat_filter::config::Config;
use livechat_filter::{FilterListStore, MessageClassifier};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging (stderr, so stdout stays machine-readable)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("livechat_filter=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        language = %config.language.code,
        allow = config.allow_patterns.len(),
        block = config.block_patterns.len(),
        "Loaded configuration"
    );

    let allow = FilterListStore::new(config.allow_patterns);
    let block = FilterListStore::new(config.block_patterns);
    let classifier = MessageClassifier::new(&allow, &block, config.language)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut count = 0usize;
    let mut shown = 0usize;

    while let Some(message) = lines.next_line().await? {
        let classification = classifier.classify(&message);
        let show = classification.should_show();
        count += 1;
        if show {
            shown += 1;
        }

        let line = json!({
            "message": message,
            "classification": classification,
            "show": show,
        });
        stdout.write_all(format!("{}\n", line).as_bytes()).await?;
    }
    stdout.flush().await?;

    info!(count, shown, "Finished classifying messages");
    Ok(())
}
