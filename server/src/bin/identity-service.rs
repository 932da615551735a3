use pulse::{config::IdentityConfig, server};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    server::init_tracing();

    let config = match IdentityConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(
        listen_port = config.listen_port,
        store_timeout = ?config.store_timeout,
        "Loaded configuration"
    );

    if let Err(e) = server::run_identity(config).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
