use axum::{Router, routing::get};
use std::sync::Arc;
use upload_relay::features::health::handler::health_check;
use upload_relay::features::upload::{ImageHostClient, create_upload_router};
use upload_relay::state::AppState;
use upload_relay::{ShutdownManager, config::AppConfig, cors::build_cors_layer, request_id};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        upload_relay::features::upload::handler::upload_image,
        upload_relay::features::health::handler::health_check,
    ),
    components(
        schemas(
            upload_relay::features::upload::UploadRequest,
            upload_relay::features::upload::UploadResponse,
            upload_relay::features::health::handler::HealthResponse,
        )
    ),
    tags(
        (name = "Upload", description = "Upload APIs"),
        (name = "Health", description = "Health APIs"),
    ),
    info(
        title = "Upload Relay API",
        version = "0.1.0",
        description = "Image upload relay service (Axum)"
    )
)]
pub struct ApiDoc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upload_relay=info,tower_http=info".into()),
        )
        .init();

    // 创建优雅退出管理器
    let shutdown_manager = ShutdownManager::new();

    // Load config
    if let Err(e) = AppConfig::init_global() {
        tracing::error!("Config init failed: {}", e);
        std::process::exit(1);
    }
    let config = AppConfig::global();

    // 启动信号处理器
    if let Err(e) = shutdown_manager.start_signal_handler().await {
        tracing::error!("信号处理器启动失败: {}", e);
        std::process::exit(1);
    }

    // 图床凭据缺省不拦截启动：请求会透传给图床并由其拒绝（见契约）
    if config.provider.cloud_name.is_empty() || config.provider.upload_preset.is_empty() {
        tracing::warn!("provider.cloud_name / provider.upload_preset 未配置，上传请求将被图床拒绝");
    }

    // 图床客户端（启动时构建一次，显式注入 cloud_name / upload_preset）
    let uploader = match ImageHostClient::new(&config.provider) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            tracing::error!("图床客户端初始化失败: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = AppState {
        uploader: uploader.clone(),
        max_data_url_len: config.upload.max_data_url_len,
    };

    // Routes
    let api_router = create_upload_router();

    let mut app = Router::<AppState>::new()
        .route("/health", get(health_check))
        .nest(&config.api.prefix, api_router)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // 全局 request_id 中间件
    app = app.layer(axum::middleware::from_fn(
        request_id::request_id_middleware,
    ));

    // CORS（按配置启用）
    if let Some(cors) = build_cors_layer(&config.cors) {
        app = app.layer(cors);
    }

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("Server: http://{}", addr);
    tracing::info!("Docs: http://{}/docs", addr);
    tracing::info!("Health: http://{}/health", addr);
    tracing::info!("Upload API: http://{}{}/upload", addr, config.api.prefix);
    tracing::info!("Provider endpoint: {}", uploader.upload_url());

    // 启动服务器并等待优雅退出信号
    let shutdown_config = config.shutdown.clone();
    let shutdown_signal = async move {
        let reason = shutdown_manager.wait_for_shutdown().await;
        tracing::info!("接收到退出信号: {:?}，开始优雅退出...", reason);

        // 在途请求超时仍未排干时强制退出，避免进程悬挂
        if shutdown_config.force_quit {
            let timeout = shutdown_config.timeout_duration();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                tracing::warn!("优雅退出超时（{}秒），强制退出", shutdown_config.timeout_secs);
                std::process::exit(0);
            });
        }
    };

    let graceful = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal);

    if let Err(e) = graceful.await {
        tracing::error!("服务器运行错误: {}", e);
        std::process::exit(1);
    }

    tracing::info!("服务器已优雅关闭");
}
