use std::net::{IpAddr, SocketAddr};

use mapscan::{
    AppState,
    config::Config,
    database::{Store, StoreOptions},
    router::create_router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置，不支持的数据库类型直接退出
    let config = Config::from_env().expect("Failed to load configuration");

    tracing::info!(
        "Parsing sightings: {}, stops: {}, gyms: {}",
        config.parse_flags.sightings,
        config.parse_flags.stops,
        config.parse_flags.gyms
    );

    // 连接数据库，整个进程共用一个连接池
    let store = Store::connect(
        &config.backend,
        config.max_connections,
        StoreOptions::from(&config),
    )
    .await
    .expect("Failed to connect to database");

    let state = AppState::new(store, config.clone());
    let router = create_router(state);

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router,
    )
    .await
    .expect("Failed to start server");
}
