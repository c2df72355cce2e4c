use std::path::Path;

use axum::{
    extract::{Multipart, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::decoding::{decode_upload, DocumentFormat};
use crate::errors::AppError;
use crate::extraction::text::normalize;
use crate::extraction::{ParseResult, RequiredSkillSet};
use crate::resumes::models::{BatchError, BatchItem, BatchResponse, OutputFormat, ParseQuery, ParseTextRequest};
use crate::state::AppState;

/// A `file` part received in a multipart upload.
struct Upload {
    filename: String,
    bytes: Bytes,
}

/// All parts of a multipart parse request.
struct ParseForm {
    files: Vec<Upload>,
    required_skills: Option<RequiredSkillSet>,
}

async fn read_form(mut multipart: Multipart) -> Result<ParseForm, AppError> {
    let mut files = Vec::new();
    let mut required_skills = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                files.push(Upload { filename, bytes });
            }
            "required_skills" => {
                required_skills = Some(RequiredSkillSet::from_csv(&field.text().await?));
            }
            other => warn!("Ignoring unexpected multipart field '{other}'"),
        }
    }

    Ok(ParseForm {
        files,
        required_skills,
    })
}

async fn parse_upload(
    state: &AppState,
    upload: Upload,
    required_skills: Option<RequiredSkillSet>,
) -> Result<ParseResult, AppError> {
    let format = DocumentFormat::from_path(Path::new(&upload.filename))?;
    let text = decode_upload(upload.bytes, format).await?;
    Ok(state.parser.parse(&text, required_skills).await)
}

fn render(result: ParseResult, format: OutputFormat) -> Response {
    match format {
        OutputFormat::Json => Json(result).into_response(),
        OutputFormat::Text => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            result.to_listing(),
        )
            .into_response(),
    }
}

/// POST /api/v1/resumes/parse
pub async fn handle_parse_upload(
    State(state): State<AppState>,
    Query(query): Query<ParseQuery>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_form(multipart).await?;
    let upload = form
        .files
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Validation("Missing 'file' part".to_string()))?;

    info!("Parsing uploaded resume '{}'", upload.filename);
    let result = parse_upload(&state, upload, form.required_skills).await?;
    Ok(render(result, query.format))
}

/// POST /api/v1/resumes/parse-text
pub async fn handle_parse_text(
    State(state): State<AppState>,
    Query(query): Query<ParseQuery>,
    Json(req): Json<ParseTextRequest>,
) -> Result<Response, AppError> {
    let text = normalize(req.text)?;
    let required_skills = req.required_skills.map(RequiredSkillSet::new);
    let result = state.parser.parse(&text, required_skills).await;
    Ok(render(result, query.format))
}

/// POST /api/v1/resumes/batch
///
/// Parses every `file` part concurrently, bounded by the shared parse
/// permits. One entry per file, in upload order; a failed file does not
/// affect the others.
pub async fn handle_parse_batch(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<BatchResponse>, AppError> {
    let form = read_form(multipart).await?;
    if form.files.is_empty() {
        return Err(AppError::Validation("Missing 'file' parts".to_string()));
    }
    info!("Parsing batch of {} resumes", form.files.len());

    let mut tasks = JoinSet::new();
    for (index, upload) in form.files.into_iter().enumerate() {
        let state = state.clone();
        let required_skills = form.required_skills.clone();
        tasks.spawn(async move {
            let filename = upload.filename.clone();
            let outcome = match state.parse_permits.clone().acquire_owned().await {
                Ok(_permit) => parse_upload(&state, upload, required_skills).await,
                Err(e) => Err(AppError::Internal(e.into())),
            };
            (index, filename, outcome)
        });
    }

    let mut items = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (index, filename, outcome) = joined.map_err(|e| AppError::Internal(e.into()))?;
        let item = match outcome {
            Ok(result) => BatchItem {
                filename,
                result: Some(result),
                error: None,
            },
            Err(e) => {
                warn!("Batch item '{filename}' failed: {e}");
                let (_, code) = e.status_and_code();
                BatchItem {
                    filename,
                    result: None,
                    error: Some(BatchError {
                        code: code.to_string(),
                        message: e.to_string(),
                    }),
                }
            }
        };
        items.push((index, item));
    }
    items.sort_by_key(|(index, _)| *index);

    Ok(Json(BatchResponse {
        items: items.into_iter().map(|(_, item)| item).collect(),
    }))
}
