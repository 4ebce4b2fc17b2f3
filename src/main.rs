use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    kinship_cli::cli::app::run().await
}
