use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    codemap_cli::main_entry().await
}
