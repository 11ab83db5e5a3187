//! 样式生成 API
//!
//! 请求在一条直线上完成：清理 HTML、拼接指令、调用生成服务、返回 CSS。
//! 不重试，失败时不返回部分结果。

use std::sync::Arc;

use axum::{
    extract::{Json as ExtractJson, State},
    http::StatusCode,
    response::Json,
};
use tokio::task;

use crate::builders::{build_prompt, estimate_tokens, strip_code_fences};
use crate::core::RestyleError;
use crate::parsers::html::Sanitizer;
use crate::web::types::{AppState, ErrorResponse, RestyleRequest, RestyleResponse};

/// 日志中 CSS 预览的最大字符数
const CSS_PREVIEW_CHARS: usize = 500;

/// 生成样式端点
pub async fn restyle_endpoint(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<RestyleRequest>,
) -> Result<Json<RestyleResponse>, (StatusCode, Json<ErrorResponse>)> {
    let RestyleRequest {
        prompt,
        html_structure,
    } = request;

    tracing::info!("收到样式请求: {}", prompt);

    state.gateway.ensure_ready().map_err(error_response)?;

    let original_len = html_structure.len();
    let original_tokens = estimate_tokens(&html_structure);
    if original_len > state.max_html_bytes {
        tracing::warn!(
            "HTML 输入较大: {} 字节（建议上限 {} 字节），生成成本会增加",
            original_len,
            state.max_html_bytes
        );
    }

    let cleaned_html = sanitize_blocking(state.sanitizer.clone(), html_structure).await;
    log_token_reduction(original_tokens, estimate_tokens(&cleaned_html));

    match state.snapshots.save_html(&cleaned_html, &prompt) {
        Ok(Some(path)) => tracing::info!("已保存清理后的 HTML: {}", path.display()),
        Ok(None) => {}
        Err(e) => tracing::warn!("保存 HTML 快照失败: {}", e),
    }

    let full_prompt = build_prompt(&prompt, &cleaned_html);

    let generated = state.gateway.generate(&full_prompt).await.map_err(|e| {
        tracing::error!("调用生成服务 {} 失败: {}", state.gateway.name(), e);
        error_response(e)
    })?;
    let generated_style = strip_code_fences(&generated);

    tracing::info!("生成的 CSS 长度: {} 字符", generated_style.chars().count());
    tracing::info!("CSS 预览:\n{}", css_preview(&generated_style));

    match state.snapshots.save_css(&generated_style, &prompt) {
        Ok(Some(path)) => tracing::info!("已保存生成的 CSS: {}", path.display()),
        Ok(None) => {}
        Err(e) => tracing::warn!("保存 CSS 快照失败: {}", e),
    }

    Ok(Json(RestyleResponse { generated_style }))
}

/// 在阻塞线程池中清理 HTML
///
/// 任务本身失败时退回原始 HTML，与清理器的容错约定一致。
async fn sanitize_blocking(sanitizer: Arc<Sanitizer>, html: String) -> String {
    let fallback = html.clone();
    match task::spawn_blocking(move || sanitizer.sanitize(&html)).await {
        Ok(cleaned) => cleaned,
        Err(e) => {
            tracing::warn!("HTML 清理任务失败，使用原始 HTML: {}", e);
            fallback
        }
    }
}

fn log_token_reduction(original_tokens: usize, cleaned_tokens: usize) {
    let reduction = original_tokens.saturating_sub(cleaned_tokens);
    let percent = if original_tokens > 0 {
        reduction as f64 * 100.0 / original_tokens as f64
    } else {
        0.0
    };

    tracing::info!(
        "HTML 清理: 约 {} -> {} tokens（减少 {}，{:.1}%）",
        original_tokens,
        cleaned_tokens,
        reduction,
        percent
    );
}

fn css_preview(css: &str) -> String {
    let preview: String = css.chars().take(CSS_PREVIEW_CHARS).collect();
    if preview.len() < css.len() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// 把用户可见的错误转换为 HTTP 响应
pub fn error_response(error: RestyleError) -> (StatusCode, Json<ErrorResponse>) {
    let detail = match &error {
        RestyleError::Config(_) => error.to_string(),
        _ => format!("Error generating style: {}", error),
    };

    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { detail }))
}
