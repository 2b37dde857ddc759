//! Diary conversation endpoints
//!
//! POST /generate_caption, GET /initial_question,
//! POST /followup_question, GET /summarize_conversation,
//! POST /revise_diary, GET /recommend_song, POST /save_diary

use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header, HeaderMap},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use diary_common::Emotion;
use serde::{Deserialize, Serialize};

use crate::catalog::Recommendation;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

use super::{client_token, session_response};

/// POST /generate_caption JSON request (URL intake)
#[derive(Debug, Deserialize)]
pub struct CaptionUrlRequest {
    pub img_url: String,
}

/// POST /generate_caption response
#[derive(Debug, Serialize)]
pub struct CaptionResponse {
    pub client_id: String,
    pub caption: String,
}

/// GET /initial_question response
#[derive(Debug, Serialize)]
pub struct InitialQuestionResponse {
    pub client_id: String,
    pub question: String,
}

/// POST /followup_question request
#[derive(Debug, Deserialize)]
pub struct FollowupRequest {
    pub user_answer: String,
}

/// POST /followup_question response
#[derive(Debug, Serialize)]
pub struct FollowupResponse {
    pub client_id: String,
    pub user_answer: String,
    pub emotion: Emotion,
    pub followup_question: String,
}

/// GET /summarize_conversation and POST /revise_diary response
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub client_id: String,
    pub diary_summary: String,
    pub final_emotion: Emotion,
}

/// POST /revise_diary request
#[derive(Debug, Deserialize)]
pub struct ReviseRequest {
    pub user_changes: String,
}

/// GET /recommend_song response
///
/// `recommended_song` is null when no catalog row carries the diary's
/// emotion; `matched` makes the sentinel explicit.
#[derive(Debug, Serialize)]
pub struct RecommendSongResponse {
    pub client_id: String,
    pub matched: bool,
    pub recommended_song: Option<Recommendation>,
}

/// POST /save_diary request
#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub final_diary: String,
}

/// POST /save_diary response
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub client_id: String,
}

/// POST /generate_caption
///
/// Accepts exactly one image source: a multipart file upload, or a
/// JSON body naming an image URL. Either way the image is re-encoded
/// to JPEG and handed to the caption oracle as base64.
pub async fn generate_caption(
    State(state): State<AppState>,
    request: Request,
) -> ApiResult<Response> {
    let headers = request.headers().clone();
    let token = client_token(&headers);

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let image_jpeg_base64 = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?;
        read_uploaded_image(multipart).await?
    } else if content_type.starts_with("application/json") {
        let bytes = axum::body::to_bytes(request.into_body(), MAX_IMAGE_BYTES)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?;
        let body: CaptionUrlRequest = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))?;
        if body.img_url.trim().is_empty() {
            return Err(ApiError::BadRequest("img_url must not be empty".to_string()));
        }
        fetch_image_from_url(&state.http_client, body.img_url.trim()).await?
    } else {
        return Err(ApiError::BadRequest(
            "Provide either a multipart image upload or a JSON body with img_url".to_string(),
        ));
    };

    let caption = state.service.caption_image(&image_jpeg_base64).await?;

    // Resolve or mint the session only once the oracle has succeeded,
    // so a captioning failure never leaves an unreachable entry behind.
    let (client_id, session, created) = state.registry.resolve_or_create(token.as_deref()).await;
    session.lock().await.record_caption(caption.clone());

    tracing::info!(client_id = %client_id, caption = %caption, "Caption stored");

    Ok(session_response(
        created,
        &client_id,
        CaptionResponse { client_id: client_id.clone(), caption },
    ))
}

/// GET /initial_question
pub async fn initial_question(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let token = client_token(&headers);
    let (client_id, session, created) = state.registry.resolve_or_create(token.as_deref()).await;
    let mut session = session.lock().await;

    let question = state.service.first_question(&mut session).await?;

    Ok(session_response(
        created,
        &client_id,
        InitialQuestionResponse { client_id: client_id.clone(), question },
    ))
}

/// POST /followup_question
pub async fn followup_question(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<FollowupRequest>,
) -> ApiResult<Response> {
    let user_answer = request.user_answer.trim().to_string();
    if user_answer.is_empty() {
        return Err(ApiError::BadRequest(
            "user_answer must not be empty".to_string(),
        ));
    }

    let token = client_token(&headers);
    let (client_id, session, created) = state.registry.resolve_or_create(token.as_deref()).await;
    let mut session = session.lock().await;

    let (emotion, followup) = state.service.answer(&mut session, &user_answer).await?;

    Ok(session_response(
        created,
        &client_id,
        FollowupResponse {
            client_id: client_id.clone(),
            user_answer,
            emotion,
            followup_question: followup,
        },
    ))
}

/// GET /summarize_conversation
pub async fn summarize_conversation(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let token = client_token(&headers);
    let (client_id, session, created) = state.registry.resolve_or_create(token.as_deref()).await;
    let mut session = session.lock().await;

    let (diary_summary, final_emotion) = state.service.summarize(&mut session).await?;

    Ok(session_response(
        created,
        &client_id,
        SummaryResponse { client_id: client_id.clone(), diary_summary, final_emotion },
    ))
}

/// POST /revise_diary
pub async fn revise_diary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ReviseRequest>,
) -> ApiResult<Response> {
    let user_changes = request.user_changes.trim().to_string();
    if user_changes.is_empty() {
        return Err(ApiError::BadRequest(
            "user_changes must not be empty".to_string(),
        ));
    }

    let token = client_token(&headers);
    let (client_id, session, created) = state.registry.resolve_or_create(token.as_deref()).await;
    let mut session = session.lock().await;

    let (diary_summary, final_emotion) = state.service.revise(&mut session, &user_changes).await?;

    Ok(session_response(
        created,
        &client_id,
        SummaryResponse { client_id: client_id.clone(), diary_summary, final_emotion },
    ))
}

/// GET /recommend_song
pub async fn recommend_song(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let token = client_token(&headers);
    let (client_id, session, created) = state.registry.resolve_or_create(token.as_deref()).await;
    let session = session.lock().await;

    let recommendation = state.service.recommend_song(&session).await?;

    Ok(session_response(
        created,
        &client_id,
        RecommendSongResponse {
            client_id: client_id.clone(),
            matched: recommendation.is_some(),
            recommended_song: recommendation,
        },
    ))
}

/// POST /save_diary
///
/// Saving has no precondition: the snapshot records whatever the
/// session holds, and `diary_summary` stays empty when the user saves
/// without summarizing.
pub async fn save_diary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SaveRequest>,
) -> ApiResult<Response> {
    let final_diary = request.final_diary.trim().to_string();
    if final_diary.is_empty() {
        return Err(ApiError::BadRequest(
            "final_diary must not be empty".to_string(),
        ));
    }

    let token = client_token(&headers);
    let (client_id, session, created) = state.registry.resolve_or_create(token.as_deref()).await;
    let mut session = session.lock().await;

    let snapshot = session.record_save(final_diary);
    state.store.persist(&client_id, &snapshot)?;

    Ok(session_response(
        created,
        &client_id,
        SaveResponse { client_id: client_id.clone() },
    ))
}

/// Upload cap, matching the UI's 10 MB limit
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Pull the image out of a multipart upload and re-encode it
async fn read_uploaded_image(mut multipart: Multipart) -> ApiResult<String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart field: {}", e)))?
    {
        // The UI posts the image under "file"; accept any file field.
        if field.name() == Some("file") || field.file_name().is_some() {
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
            return encode_jpeg_base64(&data);
        }
    }

    Err(ApiError::BadRequest(
        "Multipart body contains no image file".to_string(),
    ))
}

/// Download an image from a URL and re-encode it
///
/// The size cap is enforced before and during the download, so a
/// remote body larger than the limit is never buffered whole.
async fn fetch_image_from_url(client: &reqwest::Client, url: &str) -> ApiResult<String> {
    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to fetch image URL: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::BadRequest(format!(
            "Image URL returned status {}",
            status
        )));
    }

    if let Some(len) = response.content_length() {
        if len > MAX_IMAGE_BYTES as u64 {
            return Err(ApiError::BadRequest("Image exceeds 10 MB limit".to_string()));
        }
    }

    // Content-Length may be absent or wrong; bound the stream itself.
    let mut data = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read image bytes: {}", e)))?
    {
        if data.len() + chunk.len() > MAX_IMAGE_BYTES {
            return Err(ApiError::BadRequest("Image exceeds 10 MB limit".to_string()));
        }
        data.extend_from_slice(&chunk);
    }

    encode_jpeg_base64(&data)
}

/// Decode any supported image format and re-encode as base64 JPEG
fn encode_jpeg_base64(data: &[u8]) -> ApiResult<String> {
    let img = image::load_from_memory(data)
        .map_err(|_| ApiError::BadRequest("Unsupported or corrupt image data".to_string()))?;

    let mut jpeg_bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut jpeg_bytes),
        image::ImageOutputFormat::Jpeg(85),
    )
    .map_err(|e| ApiError::Internal(format!("JPEG encoding failed: {}", e)))?;

    Ok(general_purpose::STANDARD.encode(&jpeg_bytes))
}

/// Build diary conversation routes
pub fn diary_routes() -> Router<AppState> {
    Router::new()
        .route("/generate_caption", post(generate_caption))
        .route("/initial_question", get(initial_question))
        .route("/followup_question", post(followup_question))
        .route("/summarize_conversation", get(summarize_conversation))
        .route("/revise_diary", post(revise_diary))
        .route("/recommend_song", get(recommend_song))
        .route("/save_diary", post(save_diary))
}
