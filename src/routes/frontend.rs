//! 前端静态资源路由
//!
//! 使用 rust-embed 嵌入前端构建产物。未匹配的非 API 路径返回 `index.html`
//! 交给前端路由处理；`app.frontend_dir` 配置的目录优先于嵌入资源。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::StatusCode, web};
use rust_embed::Embed;
use std::path::{Component, Path, PathBuf};

use crate::config::AppConfig;
use crate::middlewares::create_error_response;
use crate::models::ErrorCode;

#[derive(Embed)]
#[folder = "frontend/dist/"]
struct FrontendAssets;

const INDEX: &str = "index.html";

fn mime_type(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    match ext {
        "html" => "text/html; charset=utf-8",
        "js" | "mjs" => "application/javascript; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "json" | "map" => "application/json; charset=utf-8",
        "webmanifest" => "application/manifest+json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "txt" => "text/plain; charset=utf-8",
        "wasm" => "application/wasm",
        _ => "application/octet-stream",
    }
}

/// 构建产物中带 hash 的资源可长期缓存
fn is_immutable_asset(path: &str) -> bool {
    path.starts_with("assets/")
        && matches!(
            Path::new(path).extension().and_then(|s| s.to_str()),
            Some("js" | "css" | "woff" | "woff2" | "ttf" | "png" | "jpg" | "svg" | "webp")
        )
}

/// 拒绝 `..` 和绝对路径，防止读取目录之外的文件
fn safe_relative(path: &str) -> Option<PathBuf> {
    let relative = Path::new(path);
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| relative.to_path_buf())
}

fn read_asset(path: &str) -> Option<Vec<u8>> {
    if let Some(dir) = AppConfig::get().frontend_override_dir()
        && let Some(relative) = safe_relative(path)
        && let Ok(data) = std::fs::read(Path::new(dir).join(relative))
    {
        return Some(data);
    }
    FrontendAssets::get(path).map(|f| f.data.to_vec())
}

pub async fn serve_frontend(req: HttpRequest) -> ActixResult<HttpResponse> {
    let path = req.match_info().query("tail").trim_start_matches('/');

    // 未注册的 API 路径返回 JSON 404
    if path == "api" || path.starts_with("api/") {
        return Ok(create_error_response(
            StatusCode::NOT_FOUND,
            ErrorCode::NotFound,
            "API endpoint not found",
        ));
    }

    let (file_path, content) = match (!path.is_empty()).then(|| read_asset(path)).flatten() {
        Some(content) => (path, Some(content)),
        None => (INDEX, read_asset(INDEX)),
    };

    let Some(data) = content else {
        return Ok(HttpResponse::NotFound()
            .content_type("text/html; charset=utf-8")
            .body(
                "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>EduCRM</title></head>\
                 <body><h1>Frontend Not Found</h1>\
                 <p>Build the frontend first: <code>cd frontend &amp;&amp; bun run build</code></p>\
                 </body></html>",
            ));
    };

    let cache_control = if is_immutable_asset(file_path) {
        "public, max-age=31536000, immutable"
    } else {
        "no-cache, no-store, must-revalidate"
    };
    Ok(HttpResponse::Ok()
        .content_type(mime_type(file_path))
        .insert_header(("Cache-Control", cache_control))
        .body(data))
}

pub fn configure_frontend_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{tail:.*}", web::get().to(serve_frontend));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_type() {
        assert_eq!(mime_type("index.html"), "text/html; charset=utf-8");
        assert_eq!(mime_type("assets/app.mjs"), "application/javascript; charset=utf-8");
        assert_eq!(mime_type("site.webmanifest"), "application/manifest+json");
        assert_eq!(mime_type("blob.xyz"), "application/octet-stream");
    }

    #[test]
    fn test_immutable_assets() {
        assert!(is_immutable_asset("assets/index-3f9a.js"));
        assert!(!is_immutable_asset("index.html"));
        assert!(!is_immutable_asset("logo.png"));
    }

    #[test]
    fn test_safe_relative_rejects_traversal() {
        assert!(safe_relative("assets/app.js").is_some());
        assert!(safe_relative("../secret").is_none());
        assert!(safe_relative("/etc/passwd").is_none());
    }
}
