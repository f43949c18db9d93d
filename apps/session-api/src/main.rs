//! Session API Service - Entry Point
//!
//! HTTP service with Redis-backed sessions.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    session_api::run().await
}
