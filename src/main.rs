use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[rocket::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pulse_ui=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rocket = match pulse_ui::build(rocket::Config::figment()) {
        Ok(rocket) => rocket,
        Err(e) => {
            tracing::error!(error = %e, "failed to assemble dashboard");
            std::process::exit(1);
        }
    };

    tracing::info!("starting dashboard");
    if let Err(e) = rocket.launch().await {
        tracing::error!(error = %e, "dashboard stopped");
        std::process::exit(1);
    }
}
