use pulse::{config::TodoConfig, server};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    server::init_tracing();

    let config = match TodoConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(
        users_base_url = %config.users_base_url,
        listen_port = config.listen_port,
        verify_timeout = ?config.verify_timeout,
        store_timeout = ?config.store_timeout,
        "Loaded configuration"
    );

    if let Err(e) = server::run_todos(config).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
