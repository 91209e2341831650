#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    segue::runtime::run().await
}
