use std::{net::SocketAddr, sync::Arc, time::Duration};

use backend::{
    geocode::{HttpGeocoder, NoopGeocoder, ReverseGeocoder},
    itinerary::ItineraryPlanner,
    provider::{RoutesClient, RoutesClientConfig},
    AppState,
};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(about = "Road-trip itinerary planner backend")]
struct Args {
    /// Address to bind the HTTP server on
    #[arg(long, default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// Base URL of the routing provider
    #[arg(long, default_value = "https://routes.googleapis.com")]
    routes_url: String,

    /// Base URL of the reverse-geocoding provider
    #[arg(long, default_value = "https://maps.googleapis.com")]
    geocode_url: String,

    /// Provider request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let api_key = std::env::var("MAPS_API_KEY").ok().filter(|k| !k.is_empty());
    if api_key.is_none() {
        tracing::warn!("MAPS_API_KEY is not set; provider calls will fail until configured");
    }

    let http = reqwest::Client::new();

    let routes = RoutesClient::new(
        http.clone(),
        RoutesClientConfig {
            base_url: args.routes_url,
            api_key: api_key.clone(),
            timeout: Duration::from_secs(args.timeout_secs),
        },
    );

    let geocoder: Arc<dyn ReverseGeocoder> = match &api_key {
        Some(key) => Arc::new(HttpGeocoder::new(http, args.geocode_url, key.clone())),
        None => Arc::new(NoopGeocoder),
    };

    let state = AppState {
        routes: Arc::new(routes),
        geocoder,
        planner: Arc::new(ItineraryPlanner::new()),
        maps_key: api_key,
    };
    let app = backend::create_router(state);

    tracing::info!("starting backend on http://{}", args.bind);
    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .expect("bind server address");
    axum::serve(listener, app).await.expect("serve");
}
