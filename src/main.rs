use socialweb::{logging::init_tracing, run_app, Config};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("Invalid configuration: {:#}", error);
            std::process::exit(1);
        }
    };
    if let Err(error) = run_app(config).await {
        tracing::error!("Error: {:#}", error);
        std::process::exit(1);
    }
}
