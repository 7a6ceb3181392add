use hopewell_server::{
    config::ServerConfig,
    gateway::client::{GatewayClient, GatewayCredentials},
    interceptors::authn::AdminAuthnInterceptor,
    routes::{router, AppState, RouterOptions},
    services::{
        dashboard::DashboardServiceImpl, donation::DonationServiceImpl, event::EventServiceImpl,
    },
    share::WebhookSharer,
    side_effect::SideEffects,
    signature::SignatureVerifier,
};
use hopewell_storage::postgres::{
    client::PgDatabaseClient,
    store::{PgOnDemandStore, PgTransactionalStore},
};
use log::info;
use std::sync::Arc;
use tokio::{net::TcpListener, signal};

fn load_config() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let config_path = std::env::var("CONFIG_PATH").ok();
    let config = std::env::var("CONFIG").ok();

    let config_str = match (config_path, config) {
        (None, Some(config)) => config,
        (Some(config_path), None) => std::fs::read_to_string(config_path)?,
        (Some(_), Some(_)) => {
            return Err(
                "Only one of CONFIG and CONFIG_PATH environment variables should be specified"
                    .into(),
            )
        }
        (None, None) => {
            return Err(
                "Either CONFIG or CONFIG_PATH environment variables should be specified".into(),
            )
        }
    };

    Ok(ServerConfig::from_toml(&config_str)?)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {:?}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => log::error!("Failed to install terminate handler: {:?}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    info!("Loading config");
    let config = load_config()?;
    let currency = config.gateway.currency()?;

    // Database:
    info!("Connecting to database");
    let database = Arc::new(
        PgDatabaseClient::connect(&config.postgres.uri, config.postgres.max_connections).await?,
    );

    info!("Running migrations (if any)");
    database.run_migrations().await?;

    // Dependencies:
    let gateway = Arc::new(GatewayClient::new(
        &config.gateway.base_url,
        GatewayCredentials::new(
            config.gateway.key_id.clone(),
            config.gateway.key_secret.clone(),
        ),
        config.gateway.timeout(),
    )?);
    let verifier = SignatureVerifier::new(config.gateway.key_secret.as_str());
    let sharer = Arc::new(WebhookSharer::new(
        config.sharing.webhook_urls.clone(),
        config.sharing.timeout(),
    )?);
    let side_effects = SideEffects::new(config.sharing.timeout() * 2);

    // Services:
    let donations: DonationServiceImpl<PgDatabaseClient, PgOnDemandStore, PgTransactionalStore> =
        DonationServiceImpl::new(database.clone(), gateway, verifier, currency)
            .with_settlement_timeout(config.settlement_timeout());
    let events: EventServiceImpl<PgDatabaseClient, PgOnDemandStore, PgTransactionalStore> =
        EventServiceImpl::new(database.clone(), sharer, side_effects);
    let dashboard: DashboardServiceImpl<PgDatabaseClient, PgOnDemandStore, PgTransactionalStore> =
        DashboardServiceImpl::new(database.clone(), currency);
    let state = AppState {
        donations: Arc::new(donations),
        events: Arc::new(events),
        dashboard: Arc::new(dashboard),
    };
    let authn = AdminAuthnInterceptor::new(config.admin.api_token.clone());
    let options = RouterOptions {
        request_timeout: config.request_timeout(),
        allowed_origins: config.allowed_origins()?,
    };
    let app = router(state, authn, options);

    let address = format!("0.0.0.0:{}", config.port);
    info!("Starting server: {}", address);
    let listener = TcpListener::bind(&address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
