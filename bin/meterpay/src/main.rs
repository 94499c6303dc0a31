use eyre::Report;

#[tokio::main]
async fn main() -> Result<(), Report> {
    meterpay::run().await
}
