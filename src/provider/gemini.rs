//! Gemini `generateContent` client.
//!
//! Thin reqwest wrapper around the Generative Language REST API. The image
//! travels as an `inline_data` part next to the instruction text; the reply
//! is the concatenated text of the first candidate.

use serde::{Deserialize, Serialize};

use super::{ProviderError, VisionProvider};

pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    /// Create a client. `api_key` may be absent — the service still starts,
    /// and every call then fails with `MissingCredentials`.
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            client,
            timeout_secs,
        })
    }

    pub fn from_config(config: &crate::config::AppConfig) -> Result<Self, ProviderError> {
        Self::new(
            &config.gemini_base_url,
            &config.gemini_model,
            config.gemini_api_key.clone(),
            config.provider_timeout_secs,
        )
    }
}

// ── Wire types ──

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(rename = "inline_data", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData<'a>>,
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Concatenate the text parts of the first candidate, if any.
fn first_candidate_text(response: &GenerateContentResponse) -> Option<String> {
    let candidate = response.candidates.first()?;
    let parts = &candidate.content.as_ref()?.parts;
    let text: String = parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait::async_trait]
impl VisionProvider for GeminiClient {
    async fn analyze_image(
        &self,
        mime_type: &str,
        base64_data: &str,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredentials)?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some(prompt),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type,
                            data: base64_data,
                        }),
                    },
                ],
            }],
        };

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ProviderError::NotReachable(self.base_url.clone())
                } else if e.is_timeout() {
                    ProviderError::Timeout(self.timeout_secs)
                } else {
                    ProviderError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Http(format!("invalid provider response: {e}")))?;

        let text = first_candidate_text(&parsed).ok_or(ProviderError::EmptyReply)?;

        tracing::debug!(
            model = %self.model,
            elapsed_ms = %start.elapsed().as_millis(),
            reply_len = text.len(),
            "analysis reply received"
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_serializes_text_and_image_parts() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some("analyze this"),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: "image/png",
                            data: "aGVsbG8=",
                        }),
                    },
                ],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "analyze this");
        assert!(parts[0].get("inline_data").is_none());
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[1]["inline_data"]["data"], "aGVsbG8=");
        assert!(parts[1].get("text").is_none());
    }

    #[test]
    fn response_text_extraction_concatenates_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"```json\n"},{"text":"{}"},{"text":"\n```"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(
            first_candidate_text(&response).unwrap(),
            "```json\n{}\n```"
        );
    }

    #[test]
    fn response_without_candidates_yields_none() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(first_candidate_text(&response).is_none());
    }

    #[test]
    fn response_with_empty_parts_yields_none() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[]}}]}"#).unwrap();
        assert!(first_candidate_text(&response).is_none());
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_network_call() {
        let client = GeminiClient::new("http://127.0.0.1:1", "gemini-2.5-flash", None, 5).unwrap();
        let err = client
            .analyze_image("image/png", "aGk=", "prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredentials));
    }

    #[tokio::test]
    async fn unreachable_host_maps_to_not_reachable() {
        // Port 1 on localhost refuses connections immediately.
        let client = GeminiClient::new(
            "http://127.0.0.1:1",
            "gemini-2.5-flash",
            Some("test-key".into()),
            5,
        )
        .unwrap();
        let err = client
            .analyze_image("image/png", "aGk=", "prompt")
            .await
            .unwrap_err();
        assert!(
            matches!(err, ProviderError::NotReachable(_)),
            "got: {err}"
        );
    }
}
