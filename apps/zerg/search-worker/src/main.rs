//! Search Worker Service - Entry Point
//!
//! Background worker that drains the vtree search job stream.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    zerg_search_worker::run().await
}
