//! Diagnosis endpoint — image upload in, normalized diagnosis out.
//!
//! `POST /predict` — reads the uploaded image from a multipart form,
//! validates it decodes as a raster image, sends it to the vision provider
//! with a fixed instruction, and normalizes the reply into a [`Diagnosis`].
//! Not idempotent: the provider may phrase its reply differently per call.

use axum::extract::{Multipart, State};
use axum::Json;
use base64::Engine as _;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::diagnosis::{parse_diagnosis, Diagnosis};

/// Fixed instruction sent with every image. The short keys match the wire
/// shape the report endpoint consumes.
const ANALYSIS_PROMPT: &str = "\
Analyze this vegetable/plant image for diseases. \
Return ONLY a valid JSON object with exactly these keys: \
{\"v\": \"vegetable_name\", \"d\": \"disease_name_or_none\", \"t\": \"treatment_advice\"}";

#[derive(Serialize)]
pub struct PredictResponse {
    pub status: &'static str,
    pub data: Diagnosis,
}

/// `POST /predict` — analyze one uploaded plant photo.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    let image_bytes = read_file_field(&mut multipart).await?;

    // The upload must decode as a raster image; the detected format also
    // supplies the MIME type the provider needs.
    let format = image::guess_format(&image_bytes)
        .map_err(|e| ApiError::Provider(format!("unrecognized image data: {e}")))?;
    image::load_from_memory_with_format(&image_bytes, format)
        .map_err(|e| ApiError::Provider(format!("image decoding failed: {e}")))?;
    let mime_type = format.to_mime_type();

    tracing::debug!(
        mime_type,
        image_size = image_bytes.len(),
        "dispatching image for analysis"
    );

    let _permit = ctx
        .analysis_gate
        .acquire()
        .await
        .map_err(|_| ApiError::Provider("analysis gate closed".into()))?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(&image_bytes);
    let raw_reply = ctx
        .provider
        .analyze_image(mime_type, &encoded, ANALYSIS_PROMPT)
        .await
        .map_err(|e| ApiError::Provider(e.to_string()))?;

    let diagnosis = parse_diagnosis(&raw_reply).map_err(|e| ApiError::Provider(e.to_string()))?;

    tracing::info!(
        subject = %diagnosis.subject,
        condition = %diagnosis.condition,
        "analysis complete"
    );

    Ok(Json(PredictResponse {
        status: "success",
        data: diagnosis,
    }))
}

/// Pull the uploaded file out of the multipart form: the field named `file`,
/// or failing that the first field carrying a filename. A request without
/// such a field is the stable "no image uploaded" validation error, raised
/// before any provider work; a stream that cannot be read at all (truncated
/// or malformed body) gets its own message so the 400 is not misleading.
async fn read_file_field(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidUpload(e.to_string()))?
    {
        let is_file = field.name() == Some("file") || field.file_name().is_some();
        if is_file {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::InvalidUpload(e.to_string()))?;
            return Ok(bytes.to_vec());
        }
    }
    Err(ApiError::MissingImage)
}
