#[tokio::main]
async fn main() -> anyhow::Result<()> {
    venue_listings_lib::run().await
}
