use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init() {
    let installed = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=info,shuffle_core=info,rocket=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if let Err(err) = installed {
        eprintln!("tracing subscriber already installed: {}", err);
    }
}
