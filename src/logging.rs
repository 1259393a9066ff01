use crate::config::Environment;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
fn default_filter(env: &Environment) -> &'static str {
    match env {
        Environment::Dev => "crm_backend=debug,tower_http=debug,sqlx=warn,info",
        Environment::Staging => "crm_backend=debug,tower_http=info,sqlx=warn,info",
        Environment::Prod => "crm_backend=info,tower_http=info,sqlx=error,warn",
    }
}

pub fn init_logging(env: &Environment) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(env)));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(env.is_dev())
        .with_line_number(env.is_dev());

    // JSON outside dev so log shippers can parse it
    if env.is_dev() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.pretty())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    }

    tracing::info!("Logging initialized for {:?} environment", env);
}
