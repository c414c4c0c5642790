// HTTP surface: the static page and the /analyze endpoint.
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpMessage, HttpRequest, HttpResponse, HttpServer, Responder};
use anyhow::anyhow;
use log::info;
use serde_json::Value;

use crate::analyzer::Analyzer;
use crate::config::Settings;
use crate::error::ApiError;

const INDEX_HTML: &str = include_str!("../static/index.html");
const INDEX_JS: &str = include_str!("../static/index.js");

async fn serve_app() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

async fn serve_script() -> impl Responder {
    HttpResponse::Ok()
        .content_type("application/javascript; charset=utf-8")
        .body(INDEX_JS)
}

async fn analyze_text(
    req: HttpRequest,
    analyzer: web::Data<Analyzer>,
    body: Result<web::Bytes, actix_web::Error>,
) -> Result<HttpResponse, ApiError> {
    if !is_json_content_type(req.content_type()) {
        return Err(anyhow!("unsupported content type {:?}", req.content_type()).into());
    }
    let body = body.map_err(|e| anyhow!("failed to read request body: {}", e))?;
    let text = extract_text(&body)?;
    let analysis = analyzer.analyze(&text)?;
    Ok(HttpResponse::Ok().json(analysis))
}

async fn preflight() -> impl Responder {
    HttpResponse::NoContent().finish()
}

/// Pulls the `text` field out of a JSON body. Missing or falsy values are a
/// client error; anything else that is not a string is a processing failure.
pub fn extract_text(body: &[u8]) -> Result<String, ApiError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| anyhow!("invalid JSON body: {}", e))?;
    let Value::Object(fields) = value else {
        return Err(anyhow!("request body is not a JSON object").into());
    };

    match fields.get("text") {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(v) if !is_falsy(v) => Err(anyhow!("text field is not a string").into()),
        _ => Err(ApiError::MissingText),
    }
}

/// `application/json` or any `application/*+json` type.
fn is_json_content_type(mime: &str) -> bool {
    let mime = mime.trim().to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn cors_headers() -> middleware::DefaultHeaders {
    middleware::DefaultHeaders::new()
        .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .add((header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"))
        .add((header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
}

pub fn payload_config(settings: &Settings) -> web::PayloadConfig {
    web::PayloadConfig::new(settings.server.max_body_bytes)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(serve_app))
        .route("/static/index.js", web::get().to(serve_script))
        .service(
            web::resource("/analyze")
                .route(web::post().to(analyze_text))
                .route(web::method(actix_web::http::Method::OPTIONS).to(preflight)),
        );
}

pub async fn run_server(settings: &Settings, analyzer: Analyzer) -> std::io::Result<()> {
    let data = web::Data::new(analyzer);
    let address = settings.bind_address();
    let settings = settings.clone();
    info!("Listening on http://{}", address);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .app_data(payload_config(&settings))
            .wrap(middleware::Logger::default())
            .wrap(cors_headers())
            .configure(configure)
    })
    .bind(address)?
    .run()
    .await
}
