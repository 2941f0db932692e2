use docsite_server::{bootstrap, error::StartupError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(report) = run(&args).await {
        tracing::error!("startup failed: {report}");
        std::process::exit(1);
    }
}

async fn run(args: &[String]) -> docsite_core::Result<(), StartupError> {
    let config = bootstrap::load_config(args)?;
    let application = bootstrap::build(config)?;

    // Cleanup expired sessions for as long as the server runs
    application.spawn_session_cleanup();

    application.serve().await
}
