use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    soulbrowser_locator::cli::app::run().await
}
