use clap::Parser;
use rustdoc_search::cli::{Cli, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    rustdoc_search::tracing::init(cli.log_format);
    run(cli).await
}
