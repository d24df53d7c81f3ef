use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tracing::info;

use medex_common::api::{CategoryListResponse, ExtractParams, ExtractSectionsResponse};

use crate::service::{to_document, to_sections_response, ExtractionService};

#[derive(Clone)]
pub struct MedexMcpServer {
    service: ExtractionService,
    tool_router: ToolRouter<MedexMcpServer>,
}

impl MedexMcpServer {
    pub fn new(service: ExtractionService) -> Self {
        Self {
            service,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl MedexMcpServer {
    #[tool(
        description = "Extract clinical sections (symptoms, causes, risk factors, diagnosis, \
                       complications, treatments, prevention) from a medical article."
    )]
    async fn extract_medical_sections(
        &self,
        Parameters(params): Parameters<ExtractParams>,
    ) -> Result<Json<ExtractSectionsResponse>, String> {
        let document = to_document(params);
        let result = self
            .service
            .extract(&document)
            .await
            .map_err(|e| format!("extraction failed: {e}"))?;

        info!(
            sections = result.sections.len(),
            degraded = result.is_degraded(),
            "extract_medical_sections complete"
        );
        Ok(Json(to_sections_response(result)))
    }

    #[tool(description = "List the extraction categories with their keywords, weights and limits.")]
    async fn list_categories(&self) -> Result<Json<CategoryListResponse>, String> {
        Ok(Json(self.service.categories()))
    }
}

#[tool_handler]
impl ServerHandler for MedexMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "medex".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Medical article section extractor. Use extract_medical_sections with the \
                 article title, summary and body to get verbatim sentences grouped by clinical \
                 category, and list_categories to see the active dictionary."
                    .to_string(),
            ),
        }
    }
}
