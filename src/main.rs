#[tokio::main]
async fn main() -> std::io::Result<()> {
    corner_hits::run_with_config().await
}
