use std::env;

use tracing::warn;
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        let port = parse_port(raw_args.get(2).map(|s| s.as_str()));
        readiness::api::run_http_server(port).await?;
        return Ok(());
    }

    let report = readiness::api::run_cli()?;
    println!("{report}");
    Ok(())
}

fn parse_port(raw: Option<&str>) -> u16 {
    let Some(raw) = raw else {
        return DEFAULT_PORT;
    };
    raw.parse::<u16>().unwrap_or_else(|_| {
        warn!(port = %raw, "invalid port, falling back to {DEFAULT_PORT}");
        DEFAULT_PORT
    })
}
