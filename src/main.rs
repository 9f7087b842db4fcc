mod application;
mod domain;
mod infrastructure;
mod presentation;

use infrastructure::{AppConfig, AppContainer};
use presentation::http::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    tracing::info!("Starting docassist on port {}", config.server.port);

    let container = AppContainer::new(&config)?;
    let server = HttpServer::new(
        container.upload_handler.clone(),
        container.ask_handler.clone(),
        Some(config.server.port),
    );

    server.run().await
}
