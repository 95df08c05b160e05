use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use std::sync::Arc;
use tower::ServiceExt;
use upload_relay::config::ProviderConfig;
use upload_relay::features::upload::{ImageHostClient, create_upload_router};
use upload_relay::state::AppState;

/// 构建只挂上传路由的测试应用。校验类用例不会真正出网，
/// 因此图床地址指向一个保证拒绝连接的本地端口即可。
fn build_app(api_base: &str, max_data_url_len: usize) -> Router {
    let uploader = ImageHostClient::new(&ProviderConfig {
        api_base: api_base.to_string(),
        cloud_name: "demo".to_string(),
        upload_preset: "unsigned".to_string(),
    })
    .expect("build uploader");

    create_upload_router().with_state(AppState {
        uploader: Arc::new(uploader),
        max_data_url_len,
    })
}

/// 绑定后立刻释放的端口，用于“连接被拒绝”的场景。
async fn refused_addr() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}", addr)
}

async fn send(app: Router, method: Method, body: &str) -> (StatusCode, String) {
    let resp = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri("/upload")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("build request"),
        )
        .await
        .expect("request /upload");

    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, String::from_utf8(bytes.to_vec()).expect("utf8 body"))
}

#[tokio::test]
async fn non_post_methods_get_405_with_contract_text() {
    let base = refused_addr().await;
    for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
        let app = build_app(&base, 5_242_880);
        let (status, body) = send(app, method.clone(), "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "method {}", method);
        assert_eq!(body, "Method Not Allowed");
    }
}

#[tokio::test]
async fn malformed_json_gets_400() {
    let app = build_app(&refused_addr().await, 5_242_880);
    let (status, body) = send(app, Method::POST, "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid JSON in request body");
}

#[tokio::test]
async fn missing_image_data_gets_400() {
    let base = refused_addr().await;
    for payload in [r#"{}"#, r#"{"imageData":123}"#, r#"{"image":"x"}"#] {
        let app = build_app(&base, 5_242_880);
        let (status, body) = send(app, Method::POST, payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
        assert_eq!(body, "Missing imageData");
    }
}

#[tokio::test]
async fn non_image_data_url_gets_400() {
    let app = build_app(&refused_addr().await, 5_242_880);
    let (status, body) = send(
        app,
        Method::POST,
        r#"{"imageData":"data:application/pdf;base64,JVBERi0="}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Invalid image data format");
}

#[tokio::test]
async fn oversized_data_url_gets_400() {
    // 上限压到 64 字符，避免在测试里构造 5MB 字符串
    let app = build_app(&refused_addr().await, 64);
    let long_payload = "A".repeat(128);
    let body_json = format!(r#"{{"imageData":"data:image/png;base64,{}"}}"#, long_payload);
    let (status, body) = send(app, Method::POST, &body_json).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Image is too large");
}

#[tokio::test]
async fn data_url_at_limit_passes_validation() {
    let data_url = "data:image/png;base64,iVBORw0KGgo=";
    let app = build_app(&refused_addr().await, data_url.len());
    let body_json = format!(r#"{{"imageData":"{}"}}"#, data_url);

    // 校验放行后才会触发对已关闭端口的转发，因此得到的是 500 而不是 400
    let (status, body) = send(app, Method::POST, &body_json).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Server error during image upload");
}
