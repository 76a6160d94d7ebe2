use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dict_engine::config::Config;
use dict_engine::store::{MemStore, PgStore, Store};
use dict_engine::tokenizer::LangTable;
use dict_engine::services::suggest_service;
use dict_engine::{handlers, AppState};

#[tokio::main]
async fn main() {
    // 1. 初始化日志系统
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. 加载 .env 环境变量和配置文件
    dotenv().ok();
    let config_path = std::env::var("DICT_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = Config::load(&config_path).expect("Failed to load config");

    // 3. 解析每种语言的分词器, 任何一个失败都直接退出
    let langs = LangTable::build(&config).expect("Failed to load tokenizers");

    // 4. 存储: 有 DATABASE_URL 用 Postgres, 否则或 --memory 时用内存
    let memory = std::env::args().any(|a| a == "--memory");
    let store: Arc<dyn Store> = match std::env::var("DATABASE_URL") {
        Ok(url) if !memory => {
            let pg = PgStore::connect(&url, config.db.max_connections)
                .await
                .expect("Failed to create database connection pool");
            pg.migrate().await.expect("Failed to migrate database");
            Arc::new(pg)
        }
        _ => {
            tracing::warn!("--- 未使用数据库, 数据只保存在内存中");
            Arc::new(MemStore::new())
        }
    };

    let shared_state = Arc::new(AppState::new(config, langs, store));
    if let Err(e) = suggest_service::rebuild(&shared_state).await {
        tracing::warn!("--- 自动补全初始化失败: {}", e);
    }

    // 5. 配置跨域 (CORS)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 6. 构建路由, 中间件：日志记录和跨域
    let app = handlers::router(shared_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // 7. 启动服务
    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".into())
        .parse()
        .expect("BIND_ADDR must be host:port");
    tracing::info!("🚀 Server started at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
