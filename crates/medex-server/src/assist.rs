//! Model-assisted extraction.
//!
//! The model is asked for a JSON object keyed by category name. Its answer is only a
//! proposal: `Extractor::verify` keeps the fragments that literally occur in the input,
//! so the result obeys the same invariants as keyword extraction.

use medex_common::chat::{ChatClient, ChatClientError, ChatCompletionRequest, Message};
use medex_core::dictionary::DEFAULT_NOTES;
use medex_core::extract::NO_TEXT_NOTICE;
use medex_core::normalize::normalize;
use medex_core::{CategoryConfig, ExtractionResult, Extractor, RawDocument};
use serde_json::Value;
use tracing::{debug, info};

pub const MODEL_NOTES: &str = "Extracted with model assistance, verified against the source text.";
const MAX_PROMPT_CHARS: usize = 12_000;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The endpoint could not be reached or refused the request.
    #[error("model unavailable: {0}")]
    Unavailable(ChatClientError),

    /// The endpoint answered, but not with a usable JSON object.
    #[error("model returned an unusable answer: {0}")]
    InvalidResponse(String),
}

impl From<ChatClientError> for ModelError {
    fn from(err: ChatClientError) -> Self {
        if err.is_unavailable() {
            ModelError::Unavailable(err)
        } else {
            ModelError::InvalidResponse(err.to_string())
        }
    }
}

pub struct ModelExtractor {
    client: ChatClient,
    model: String,
    extractor: Extractor,
}

impl ModelExtractor {
    pub fn new(client: ChatClient, model: String, extractor: Extractor) -> Self {
        Self {
            client,
            model,
            extractor,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// `Ok` with empty lists means the model found nothing; failures to obtain an answer
    /// are always `Err`.
    pub async fn extract(&self, document: &RawDocument) -> Result<ExtractionResult, ModelError> {
        let text = normalize(&document.combined_text());
        if text.is_empty() {
            return Ok(self.extractor.degraded(NO_TEXT_NOTICE));
        }

        let request = build_request(&self.model, self.extractor.config(), &text);
        let answer = self.client.complete(&request).await?;
        let proposed = parse_answer(&answer)?;
        debug!(
            model = %self.model,
            categories = proposed.len(),
            "model answer parsed"
        );

        let mut result = self.extractor.verify(&text, proposed);
        // Operator-supplied notes win over the model note.
        if result.notes == DEFAULT_NOTES {
            result.notes = MODEL_NOTES.to_string();
        }
        info!(
            model = %self.model,
            fragments = result.sections.iter().map(|s| s.fragments.len()).sum::<usize>(),
            "model extraction complete"
        );
        Ok(result)
    }
}

fn build_request(model: &str, config: &CategoryConfig, text: &str) -> ChatCompletionRequest {
    let categories = config
        .categories()
        .iter()
        .map(|spec| format!("- {} (cues: {})", spec.name, spec.keywords.join(", ")))
        .collect::<Vec<_>>()
        .join("\n");

    let instruction = format!(
        "Classify sentences of a medical article into these categories:\n{categories}\n\n\
Answer with a single JSON object whose keys are the category names and whose values are \
arrays of sentences copied verbatim from the article. Use an empty array when nothing fits. \
Do not paraphrase and do not add text that is not in the article."
    );

    let article: String = text.chars().take(MAX_PROMPT_CHARS).collect();

    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![Message::system(instruction), Message::user(article)],
        temperature: Some(0.0),
        max_tokens: None,
    }
}

/// Parse the model's JSON object, tolerating code fences and prose around it.
///
/// Keys whose value is not an array are ignored, as are non-string array entries.
fn parse_answer(answer: &str) -> Result<Vec<(String, Vec<String>)>, ModelError> {
    let start = answer.find('{');
    let end = answer.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &answer[start..=end],
        _ => {
            return Err(ModelError::InvalidResponse(
                "answer contains no JSON object".to_string(),
            ))
        }
    };

    let object: serde_json::Map<String, Value> = serde_json::from_str(json)
        .map_err(|e| ModelError::InvalidResponse(format!("answer is not a JSON object: {e}")))?;

    Ok(object
        .into_iter()
        .filter_map(|(category, value)| match value {
            Value::Array(items) => Some((
                category,
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            )),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use medex_common::chat::{ChatClientConfig, StatusCode};

    use super::*;
    use crate::test_support::{chat_client, spawn_chat_endpoint};

    fn fragments<'a>(parsed: &'a [(String, Vec<String>)], category: &str) -> Option<&'a [String]> {
        parsed
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, f)| f.as_slice())
    }

    #[test]
    fn parses_fenced_answer() {
        let answer = "Here you go:\n```json\n{\"symptoms\": [\"Fever is common\", 3], \"causes\": \"none\", \"treatments\": []}\n```";
        let parsed = parse_answer(answer).expect("valid answer");
        assert_eq!(parsed.len(), 2);
        assert_eq!(fragments(&parsed, "symptoms"), Some(&["Fever is common".to_string()][..]));
        assert_eq!(fragments(&parsed, "treatments"), Some(&[][..]));
        assert!(fragments(&parsed, "causes").is_none());
    }

    #[test]
    fn rejects_answers_without_object() {
        assert!(matches!(
            parse_answer("I cannot help with that."),
            Err(ModelError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_answer("} nope {"),
            Err(ModelError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_answer("{\"symptoms\": [\"unterminated\"}"),
            Err(ModelError::InvalidResponse(_))
        ));
    }

    #[test]
    fn request_lists_every_category_and_caps_article() {
        let config = CategoryConfig::medical_default();
        let long_text = "a".repeat(MAX_PROMPT_CHARS + 50);
        let request = build_request("local", &config, &long_text);

        assert_eq!(request.model, "local");
        assert_eq!(request.messages.len(), 2);
        for spec in config.categories() {
            assert!(request.messages[0].content.contains(&spec.name));
        }
        assert_eq!(request.messages[1].content.chars().count(), MAX_PROMPT_CHARS);
    }

    #[test]
    fn client_failures_map_to_explicit_errors() {
        let unavailable = ModelError::from(ChatClientError::UpstreamBody {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: String::new(),
        });
        assert!(matches!(unavailable, ModelError::Unavailable(_)));
        assert!(unavailable.to_string().starts_with("model unavailable"));

        let empty = ModelError::from(ChatClientError::EmptyCompletion);
        assert!(matches!(empty, ModelError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_unavailable() {
        let client = ChatClient::new(ChatClientConfig {
            base_url: "http://127.0.0.1:9/v1".to_string(),
            timeout: Duration::from_secs(2),
            max_retries: 0,
            ..ChatClientConfig::default()
        })
        .expect("client");
        let extractor = Extractor::new(Arc::new(CategoryConfig::medical_default()));
        let model = ModelExtractor::new(client, "local".to_string(), extractor);

        let err = model
            .extract(&RawDocument::from_body("Fever is a common symptom."))
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Unavailable(_)), "got {err}");

        let degraded = model
            .extract(&RawDocument::default())
            .await
            .expect("empty input never reaches the model");
        assert!(degraded.is_degraded());
    }

    #[tokio::test]
    async fn grounded_answer_keeps_operator_notes() {
        let answer = r#"{"symptoms": ["Fever is a common symptom", "Patients glow green"], "treatments": []}"#;
        let document = RawDocument::from_body("Fever is a common symptom. Rest helps.");

        let default_config = Arc::new(CategoryConfig::medical_default());
        let model = ModelExtractor::new(
            chat_client(spawn_chat_endpoint(answer).await),
            "local".to_string(),
            Extractor::new(default_config),
        );
        let result = model.extract(&document).await.expect("usable answer");
        assert_eq!(
            result.get("symptoms"),
            Some(&["Fever is a common symptom".to_string()][..])
        );
        assert_eq!(result.notes, MODEL_NOTES);

        let custom = CategoryConfig::medical_default().with_advisory(medex_core::Advisory {
            when_to_see_a_doctor: "Call your clinic.".to_string(),
            notes: "Reviewed by the ward team.".to_string(),
        });
        let model = ModelExtractor::new(
            chat_client(spawn_chat_endpoint(answer).await),
            "local".to_string(),
            Extractor::new(Arc::new(custom)),
        );
        let result = model.extract(&document).await.expect("usable answer");
        assert_eq!(result.notes, "Reviewed by the ward team.");
        assert_eq!(result.when_to_see_a_doctor, "Call your clinic.");
    }

    /// Runs against a live OpenAI-compatible endpoint when `MEDEX_TEST_MODEL_URL` is set.
    #[tokio::test]
    async fn live_model_answers_are_grounded() {
        let Ok(base_url) = std::env::var("MEDEX_TEST_MODEL_URL") else {
            eprintln!("skipping live_model_answers_are_grounded: MEDEX_TEST_MODEL_URL not set");
            return;
        };
        let model_id = std::env::var("MEDEX_TEST_MODEL").unwrap_or_else(|_| "local".to_string());
        let client = ChatClient::new(ChatClientConfig {
            base_url,
            ..ChatClientConfig::default()
        })
        .expect("client");
        let extractor = Extractor::new(Arc::new(CategoryConfig::medical_default()));
        let model = ModelExtractor::new(client, model_id, extractor);

        let text = "Symptoms include fever and cough. Treatment involves rest and hydration.";
        let result = model
            .extract(&RawDocument::from_body(text))
            .await
            .expect("live model should answer");
        for section in &result.sections {
            for fragment in &section.fragments {
                assert!(text.contains(fragment.as_str()), "{fragment}");
            }
        }
    }
}
