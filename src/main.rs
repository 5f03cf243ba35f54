use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use drugcheck_core::{CoreConfig, EnvValues};

/// Main entry point for the drugcheck service
///
/// Resolves configuration once, builds the report service and serves the REST API.
///
/// # Environment Variables
/// - `GEMINI_API_KEY`: model service credential (required)
/// - `GEMINI_MODEL`: model name (default: "gemini-2.0-flash")
/// - `GEMINI_BASE_URL`: model service base URL
/// - `OPENFDA_BASE_URL`: label service base URL (default: "https://api.fda.gov")
/// - `OPENFDA_API_KEY`: optional openFDA key
/// - `DRUGCHECK_FETCH_TIMEOUT_SECS`: label lookup timeout (default: 10)
/// - `DRUGCHECK_MODEL_TIMEOUT_SECS`: model call timeout (default: 60)
/// - `DRUGCHECK_CATALOG_PATH`: YAML catalog replacing the built-in drug list
/// - `DRUGCHECK_REST_ADDR`: listen address (default: "0.0.0.0:5000")
///
/// # Errors
/// Returns an error if:
/// - `GEMINI_API_KEY` is missing or any other setting is invalid,
/// - the catalog file cannot be loaded,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("drugcheck_run=info".parse()?)
                .add_directive("drugcheck_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::from_env_values(&EnvValues::from_process_env())?;

    tracing::info!(
        model = %cfg.gemini().model,
        drugs = cfg.catalog().len(),
        "configuration resolved"
    );

    let reports = cfg.build_report_service()?;
    let app = api_rest::router(AppState::new(reports));

    let addr = std::env::var("DRUGCHECK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into());
    tracing::info!("++ Starting drugcheck REST on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
