use app::Config;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = Config::from_env();
    app::telemetry::init_tracing(&config);

    tracing::info!(log_format = ?config.log_format, "basket driver starting");

    let service = app::create_service();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if let Some(output) = app::run_line(&service, &line).await {
            stdout.write_all(format!("{output}\n").as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    tracing::info!("input closed, shutting down");
    Ok(())
}
