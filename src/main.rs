use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let code = fluidmap::cli::run().await?;
    std::process::exit(code);
}
