#[macro_use]
extern crate rocket;

mod entrypoints;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use rocket_prometheus::PrometheusMetrics;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use commit_streak_server::{
    checkin,
    config::{AppConfig, Env},
    db,
    github_pull::GithubClient,
    metrics::Metrics,
    sweep,
};

#[launch]
async fn rocket() -> _ {
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().pretty());
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let env = Env::load().expect("Failed to load environment variables");
    let config = AppConfig::try_from(&env).expect("Invalid configuration");
    let github = GithubClient::new(env.github_token.clone(), env.github_api_url.as_deref())
        .expect("Failed to create Github client");

    let prometheus = PrometheusMetrics::new();
    let metrics = Metrics::register(prometheus.registry()).expect("Failed to register metrics");

    let atomic_bool = Arc::new(AtomicBool::new(true));
    let atomic_bool_clone = atomic_bool.clone();

    let span = tracing::info_span!("Starting Rocket");
    let _enter = span.enter();
    tracing::info!("Check-in days follow {}", config.zone.name());

    let mut rocket = rocket::build()
        .attach(db::stage())
        .attach(prometheus.clone())
        .attach(checkin::stage(github, config.clone()))
        .manage(metrics);

    if let Some(sleep_duration) = config.sweep_interval {
        rocket = rocket.attach(sweep::stage(config.zone, sleep_duration, atomic_bool));
    }

    rocket
        .attach(rocket::fairing::AdHoc::on_shutdown(
            "Stop the streak sweep",
            |_| {
                Box::pin(async move {
                    atomic_bool_clone.store(false, Ordering::Relaxed);
                })
            },
        ))
        .manage(config)
        .mount("/metrics", prometheus)
        .attach(entrypoints::stage())
}
