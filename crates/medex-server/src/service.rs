//! Mode dispatch shared by the HTTP and MCP surfaces.

use std::sync::Arc;

use medex_common::api::{
    CategoryInfo, CategoryListResponse, ExtractParams, ExtractSectionsResponse, SectionPayload,
};
use medex_common::chat::{ChatClient, ChatClientConfig};
use medex_core::{CategoryConfig, ExtractionResult, Extractor, RawDocument};
use tracing::{info, warn};

use crate::assist::{ModelError, ModelExtractor};
use crate::config::{Config, Mode};
use crate::error::AppError;

pub const MODEL_UNAVAILABLE_NOTICE: &str = "model unavailable, used keyword extraction";
pub const MODEL_UNUSABLE_NOTICE: &str = "model answer unusable, used keyword extraction";

#[derive(Clone)]
pub struct ExtractionService {
    extractor: Extractor,
    model: Option<Arc<ModelExtractor>>,
    mode: Mode,
}

impl ExtractionService {
    pub fn keyword(extractor: Extractor) -> Self {
        Self {
            extractor,
            model: None,
            mode: Mode::Keyword,
        }
    }

    pub fn with_model(extractor: Extractor, model: ModelExtractor, mode: Mode) -> Self {
        Self {
            extractor,
            model: Some(Arc::new(model)),
            mode,
        }
    }

    /// Builds the service for `config.mode`. The chat client is only created when a model
    /// is in play.
    pub fn from_config(
        config: &Config,
        categories: Arc<CategoryConfig>,
        chat: ChatClientConfig,
    ) -> Result<Self, AppError> {
        let extractor = Extractor::new(categories);
        let model_id = match (config.mode, &config.model) {
            (Mode::Keyword, _) => return Ok(Self::keyword(extractor)),
            (_, Some(model_id)) => model_id.clone(),
            (_, None) => {
                return Err(AppError::Config(
                    "a model ID is required for model-assisted extraction".to_string(),
                ))
            }
        };

        info!(
            base_url = %chat.base_url,
            timeout_ms = chat.timeout.as_millis(),
            max_retries = chat.max_retries,
            model = %model_id,
            "chat client configured"
        );
        let client = ChatClient::new(chat)?;
        let model = ModelExtractor::new(client, model_id, extractor.clone());
        Ok(Self::with_model(extractor, model, config.mode))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &CategoryConfig {
        self.extractor.config()
    }

    /// Only `Mode::Model` can return an error; keyword and hybrid modes always produce a
    /// result.
    pub async fn extract(&self, document: &RawDocument) -> Result<ExtractionResult, ModelError> {
        let model = match (&self.model, self.mode) {
            (Some(model), Mode::Model | Mode::Hybrid) => model,
            _ => return Ok(self.extractor.extract(document)),
        };

        match model.extract(document).await {
            Ok(result) => Ok(result),
            Err(e) if self.mode == Mode::Hybrid => {
                warn!(model = model.model(), error = %e, "model extraction failed, falling back to keywords");
                let mut result = self.extractor.extract(document);
                if result.notice.is_none() {
                    result.notice = Some(fallback_notice(&e).to_string());
                }
                Ok(result)
            }
            Err(e) => Err(e),
        }
    }

    pub fn categories(&self) -> CategoryListResponse {
        let config = self.config();
        CategoryListResponse {
            categories: config
                .categories()
                .iter()
                .map(|spec| CategoryInfo {
                    name: spec.name.clone(),
                    keywords: spec.keywords.clone(),
                    weight: spec.weight,
                    limit: config.cap_for(spec),
                })
                .collect(),
        }
    }
}

fn fallback_notice(err: &ModelError) -> &'static str {
    match err {
        ModelError::Unavailable(_) => MODEL_UNAVAILABLE_NOTICE,
        ModelError::InvalidResponse(_) => MODEL_UNUSABLE_NOTICE,
    }
}

pub fn to_document(params: ExtractParams) -> RawDocument {
    RawDocument {
        title: params.title,
        summary: params.summary,
        body: params.body.unwrap_or_default(),
    }
}

pub fn to_sections_response(result: ExtractionResult) -> ExtractSectionsResponse {
    ExtractSectionsResponse {
        sections: result
            .sections
            .into_iter()
            .map(|s| SectionPayload {
                category: s.category,
                fragments: s.fragments,
            })
            .collect(),
        when_to_see_a_doctor: result.when_to_see_a_doctor,
        notes: result.notes,
        notice: result.notice,
    }
}
