use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Optional .env next to the binary's working directory
    dotenvy::dotenv().ok();

    guess_duel::cli::run_cli().await
}
