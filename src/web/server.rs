use axum::http::header;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Query},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::cli::ServeArgs;
use crate::export::xlsx::results_to_xlsx_bytes;
use crate::matching::engine::ScoringWeights;
use crate::matching::progress::TracingProgress;
use crate::matching::reconcile::{reconcile_parallel, MatchResult, ReconcileConfig};
use crate::parsing::{parse_table_bytes, TableFormat, TableOptions};
use crate::utils::validation::{validate_upload, ValidationError};
use crate::web::format_detection::detect_format;

/// Security configuration constants to prevent `DoS` attacks
pub const MAX_MULTIPART_FIELDS: usize = 10;
pub const MAX_FILE_FIELD_SIZE: usize = 16 * 1024 * 1024; // 16MB
pub const MAX_TEXT_FIELD_SIZE: usize = 4 * 1024; // 4KB

/// Two files at the field limit plus multipart overhead
pub const MAX_BODY_SIZE: usize = 2 * MAX_FILE_FIELD_SIZE + 1024 * 1024;

/// Matching is quadratic in table size; allow large lists to finish
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Name of the workbook returned by `?download=xlsx`
pub const RESULT_FILENAME: &str = "result_combined_high_accuracy.xlsx";

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// One uploaded table
#[derive(Debug)]
struct Upload {
    /// Sanitized original filename
    filename: Option<String>,
    content: Vec<u8>,
    format: TableFormat,
}

/// Everything a reconcile request carries
#[derive(Debug)]
struct RequestData {
    variants: Upload,
    references: Upload,
    config: ReconcileConfig,
}

/// Enhanced error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
    pub details: Option<String>,
}

/// Query parameters for the reconcile endpoint
#[derive(Deserialize)]
struct ReconcileQueryParams {
    /// `xlsx` to receive the results as a workbook attachment instead of JSON
    download: Option<String>,
}

/// Create a safe error response that prevents information disclosure
/// while logging detailed errors server-side for debugging
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
        details: None, // Never expose internal details to prevent information disclosure
    }
}

fn error_response(
    status: StatusCode,
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> Response {
    (
        status,
        Json(create_safe_error_response(
            error_type,
            user_message,
            internal_error,
        )),
    )
        .into_response()
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if the tokio runtime cannot be created or the server fails to start.
pub fn run(args: ServeArgs) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args).await })
}

/// Application routes without the connection-level middleware.
///
/// [`create_router`] wraps these with rate limiting and the other security
/// layers; tests drive them directly.
pub fn routes() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/reconcile", post(reconcile_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
}

/// Create the application router with all routes and middleware configured.
///
/// # Errors
///
/// Returns an error if the rate limiter configuration is rejected.
pub fn create_router() -> anyhow::Result<Router> {
    // Configure IP-based rate limiting
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(10) // 10 requests per second per IP
        .burst_size(50) // Allow bursts of 50 requests
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?;

    let app = routes().layer(
        ServiceBuilder::new()
            // Security headers for browser protection
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-content-type-options"),
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-frame-options"),
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("x-xss-protection"),
                HeaderValue::from_static("1; mode=block"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("strict-transport-security"),
                HeaderValue::from_static("max-age=31536000; includeSubDomains"),
            ))
            .layer(SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static("referrer-policy"),
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            ))
            // IP-based rate limiting to prevent abuse
            .layer(GovernorLayer {
                config: Arc::new(governor_conf),
            })
            // Request timeout to prevent slow client attacks
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                REQUEST_TIMEOUT,
            ))
            // Limit concurrent requests to prevent DOS
            .layer(ConcurrencyLimitLayer::new(100)),
    );

    Ok(app)
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let app = create_router()?;

    let addr = format!("{}:{}", args.address, args.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Starting name-reconciler web server at http://{addr}");

    if args.open {
        if let Err(e) = open::that(format!("http://{addr}")) {
            tracing::warn!("Could not open a browser: {e}");
        }
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Main page handler
async fn index_handler() -> Html<&'static str> {
    Html(include_str!("templates/index.html"))
}

/// API endpoint for reconciling two uploaded tables
async fn reconcile_handler(
    Query(params): Query<ReconcileQueryParams>,
    mut multipart: Multipart,
) -> Response {
    let start_time = Instant::now();

    let request = match extract_request_data(&mut multipart).await {
        Ok(data) => data,
        Err(response) => return *response,
    };

    let want_xlsx = match params.download.as_deref() {
        None => false,
        Some(kind) if kind.eq_ignore_ascii_case("xlsx") => true,
        Some(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "unsupported_download",
                "Only download=xlsx is supported",
                None,
            )
        }
    };

    // Matching is CPU-bound; keep it off the async workers
    let job = tokio::task::spawn_blocking(move || {
        run_reconciliation(&request).map(|outcome| (request, outcome))
    })
    .await;

    let (request, outcome) = match job {
        Ok(Ok(done)) => done,
        Ok(Err(response)) => return *response,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Reconciliation failed unexpectedly",
                Some(&e.to_string()),
            )
        }
    };

    if want_xlsx {
        return match results_to_xlsx_bytes(&outcome.results) {
            Ok(bytes) => (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{RESULT_FILENAME}\""),
                    ),
                ],
                bytes,
            )
                .into_response(),
            Err(e) => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "export_failed",
                "Unable to build the result workbook",
                Some(&e.to_string()),
            ),
        };
    }

    let processing_time = u64::try_from(start_time.elapsed().as_millis()).unwrap_or(u64::MAX);
    let matched = outcome.results.iter().filter(|r| r.is_match()).count();
    let perfect = outcome
        .results
        .iter()
        .filter(|r| r.score.is_some_and(|s| s.is_perfect()))
        .count();

    Json(serde_json::json!({
        "results": outcome.results,
        "summary": {
            "variant_count": outcome.variant_count,
            "reference_count": outcome.reference_count,
            "matched": matched,
            "perfect": perfect,
        },
        "processing_info": {
            "variant_file": request.variants.filename,
            "variant_format": request.variants.format.display_name(),
            "reference_file": request.references.filename,
            "reference_format": request.references.format.display_name(),
            "processing_time_ms": processing_time,
            "configuration": request.config,
        }
    }))
    .into_response()
}

struct Outcome {
    results: Vec<MatchResult>,
    variant_count: usize,
    reference_count: usize,
}

/// Parse both uploads and reconcile them
fn run_reconciliation(request: &RequestData) -> Result<Outcome, Box<Response>> {
    let options = TableOptions::default();

    let variants = parse_table_bytes(
        &request.variants.content,
        request.variants.format,
        &options,
    )
    .map_err(|e| {
        Box::new(error_response(
            StatusCode::BAD_REQUEST,
            "parse_failed",
            "Unable to read the variant file. Please check the file format and try again.",
            Some(&e.to_string()),
        ))
    })?;

    let references = parse_table_bytes(
        &request.references.content,
        request.references.format,
        &options,
    )
    .map_err(|e| {
        Box::new(error_response(
            StatusCode::BAD_REQUEST,
            "parse_failed",
            "Unable to read the reference file. Please check the file format and try again.",
            Some(&e.to_string()),
        ))
    })?;

    // Column names come from the caller's own files, so the message is safe to return
    let results = reconcile_parallel(
        &variants,
        &references,
        &request.config,
        &TracingProgress::new(),
    )
    .map_err(|e| {
        Box::new(error_response(
            StatusCode::BAD_REQUEST,
            "missing_field",
            &e.to_string(),
            None,
        ))
    })?;

    Ok(Outcome {
        results,
        variant_count: variants.len(),
        reference_count: references.len(),
    })
}

/// Extract both uploads and the configuration from the multipart form
async fn extract_request_data(multipart: &mut Multipart) -> Result<RequestData, Box<Response>> {
    let mut variants = None;
    let mut references = None;
    let mut config = ReconcileConfig::default();
    let mut char_weight = config.weights.char_weight;
    let mut token_weight = config.weights.token_weight;

    let mut fields_received = 0usize;
    let mut had_parse_error = false;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                // Check field count limit before processing
                if fields_received >= MAX_MULTIPART_FIELDS {
                    return Err(Box::new(error_response(
                        StatusCode::BAD_REQUEST,
                        "field_limit_exceeded",
                        "Too many form fields",
                        None,
                    )));
                }
                fields_received += 1;
                let name = field.name().unwrap_or_default().to_string();

                match name.as_str() {
                    "variants" | "references" => {
                        let filename = field.file_name().map(ToString::to_string);
                        match field.bytes().await {
                            Ok(bytes) => {
                                let upload = read_upload(filename.as_deref(), bytes.to_vec())?;
                                if name == "variants" {
                                    variants = Some(upload);
                                } else {
                                    references = Some(upload);
                                }
                            }
                            Err(_) => had_parse_error = true,
                        }
                    }
                    "variant_field" | "reference_field" => match field.text().await {
                        Ok(text) => {
                            check_text_field_size(&text)?;
                            let text = text.trim();
                            if !text.is_empty() {
                                if name == "variant_field" {
                                    config.variant_field = text.to_string();
                                } else {
                                    config.reference_field = text.to_string();
                                }
                            }
                        }
                        Err(_) => had_parse_error = true,
                    },
                    "char_weight" | "token_weight" => {
                        if let Ok(text) = field.text().await {
                            check_text_field_size(&text)?;
                            if let Some(weight) = parse_slider_weight(&text) {
                                if name == "char_weight" {
                                    char_weight = weight;
                                } else {
                                    token_weight = weight;
                                }
                            }
                        }
                    }
                    _ => {} // Ignore unknown fields
                }
            }
            Ok(None) => break,
            Err(_) => {
                had_parse_error = true;
                break;
            }
        }
    }

    let (Some(variants), Some(references)) = (variants, references) else {
        let error_msg = if had_parse_error {
            "Failed to parse upload. Please check the files and try again."
        } else if fields_received == 0 {
            "No data received. Please upload a variant file and a reference file."
        } else {
            "Both a variant file and a reference file are required."
        };

        return Err(Box::new(error_response(
            StatusCode::BAD_REQUEST,
            "missing_input",
            error_msg,
            None,
        )));
    };

    config.weights = ScoringWeights::new(char_weight, token_weight);

    Ok(RequestData {
        variants,
        references,
        config,
    })
}

/// Size-check, detect and validate one uploaded file
fn read_upload(filename: Option<&str>, content: Vec<u8>) -> Result<Upload, Box<Response>> {
    if content.len() > MAX_FILE_FIELD_SIZE {
        return Err(Box::new(error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "file_too_large",
            "File size exceeds limit",
            None,
        )));
    }

    let format = detect_format(&content, filename).map_err(|e| {
        Box::new(error_response(
            StatusCode::BAD_REQUEST,
            "format_detection_failed",
            "Unable to detect file format. Please upload an xlsx, xls, ods, csv or tsv file.",
            Some(&e.to_string()),
        ))
    })?;

    let filename = validate_upload(filename, &content, format)
        .map_err(|e| Box::new(validation_error_response(&e)))?;

    Ok(Upload {
        filename,
        content,
        format,
    })
}

fn validation_error_response(error: &ValidationError) -> Response {
    match error {
        ValidationError::FilenameTooLong => error_response(
            StatusCode::BAD_REQUEST,
            "filename_too_long",
            "Filename exceeds maximum length limit",
            Some("Filename validation failed due to length constraints"),
        ),
        ValidationError::InvalidFilename | ValidationError::EmptyFilename => error_response(
            StatusCode::BAD_REQUEST,
            "invalid_filename",
            "Filename contains invalid or dangerous characters",
            Some("Filename validation failed due to invalid characters"),
        ),
        ValidationError::FormatValidationFailed => error_response(
            StatusCode::BAD_REQUEST,
            "format_mismatch",
            "File content does not match the expected format based on filename",
            Some("Format validation failed"),
        ),
        ValidationError::InvalidFileContent => error_response(
            StatusCode::BAD_REQUEST,
            "invalid_content",
            "File content appears malformed or corrupted",
            None,
        ),
    }
}

fn check_text_field_size(text: &str) -> Result<(), Box<Response>> {
    if text.len() > MAX_TEXT_FIELD_SIZE {
        return Err(Box::new(error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "text_too_large",
            "Text field size exceeds limit",
            None,
        )));
    }
    Ok(())
}

/// Parse a weight from the form's 0-1 sliders; unparseable input keeps the default
fn parse_slider_weight(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|w| w.is_finite())
        .map(|w| w.clamp(0.0, 1.0))
}
