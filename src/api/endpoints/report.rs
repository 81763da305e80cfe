//! Report endpoint — diagnosis record in, PDF attachment out.

use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::diagnosis::Diagnosis;
use crate::report::{
    render_report, report_filename, DEFAULT_ADVICE, DEFAULT_CONDITION, DEFAULT_SUBJECT,
};

/// Request body: any subset of the wire fields. Missing fields get the
/// documented defaults; a missing or unreadable body is an empty record.
#[derive(Debug, Default, Deserialize)]
pub struct ReportRequest {
    #[serde(rename = "v")]
    pub subject: Option<String>,
    #[serde(rename = "d")]
    pub condition: Option<String>,
    #[serde(rename = "t")]
    pub advice: Option<String>,
}

impl ReportRequest {
    fn into_record(self) -> Diagnosis {
        Diagnosis {
            subject: self.subject.unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            condition: self
                .condition
                .unwrap_or_else(|| DEFAULT_CONDITION.to_string()),
            advice: self.advice.unwrap_or_else(|| DEFAULT_ADVICE.to_string()),
        }
    }
}

/// `POST /generate_pdf` — render the diagnosis record as a PDF attachment.
pub async fn generate(payload: Option<Json<ReportRequest>>) -> Result<Response, ApiError> {
    let record = payload.map(|Json(r)| r).unwrap_or_default().into_record();
    let filename = report_filename(&record.subject);

    // Wall-clock is sampled here so the renderer stays a pure function of
    // its inputs.
    let pdf_bytes =
        render_report(&record, Local::now()).map_err(|e| ApiError::Render(e.to_string()))?;

    tracing::info!(%filename, size = pdf_bytes.len(), "report rendered");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        pdf_bytes,
    )
        .into_response())
}
