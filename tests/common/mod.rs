// 集成测试公共模块
//
// 提供模拟生成服务、伪上游服务器和请求辅助函数

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode, Uri};
use axum::response::Json;
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use restyle::core::{RestyleError, RestyleResult};
use restyle::network::GenerationGateway;
use restyle::web::{create_router, AppState};

/// 模拟生成服务，记录收到的指令
pub struct MockGateway {
    reply: RestyleResult<String>,
    ready: RestyleResult<()>,
    prompts: Mutex<Vec<String>>,
}

impl MockGateway {
    pub fn replying(css: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(css.to_string()),
            ready: Ok(()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: RestyleError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(error),
            ready: Ok(()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn not_ready(error: RestyleError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(error.clone()),
            ready: Err(error),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationGateway for MockGateway {
    fn name(&self) -> &str {
        "mock"
    }

    fn ensure_ready(&self) -> RestyleResult<()> {
        self.ready.clone()
    }

    async fn generate(&self, prompt: &str) -> RestyleResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone()
    }
}

/// 使用给定网关构建路由
pub fn test_app(gateway: Arc<dyn GenerationGateway>) -> Router {
    create_router(Arc::new(AppState::new(gateway)))
}

/// 发送请求并解析 JSON 响应体
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

/// POST /restyle
pub async fn post_restyle(app: Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/restyle")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, _, body) = send(app, request).await;
    (status, body)
}

/// 伪上游收到的请求
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Value,
}

/// 在 127.0.0.1 随机端口上运行的伪上游服务
#[derive(Clone)]
pub struct FakeUpstream {
    status: StatusCode,
    reply: Value,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl FakeUpstream {
    pub fn new(status: StatusCode, reply: Value) -> Self {
        Self {
            status,
            reply,
            captured: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 启动服务并返回基础 URL
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = Router::new().fallback(capture).with_state(self.clone());

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{}", addr)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }
}

async fn capture(
    State(upstream): State<FakeUpstream>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    upstream.captured.lock().unwrap().push(CapturedRequest {
        path: uri.path().to_string(),
        headers,
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });
    (upstream.status, Json(upstream.reply.clone()))
}
