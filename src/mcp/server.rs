//! NutriCare MCP Server Implementation
//!
//! Implements the MCP server with all NutriCare tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::db::Database;
use crate::engine::{KeywordClassifier, TextClassifier};
use crate::llm::TextGenerator;
use crate::tools::profile::{self, HealthIntake};
use crate::tools::recommendations::{self, AiRecommendationResponse};
use crate::tools::status::StatusTracker;

/// NutriCare MCP Service
#[derive(Clone)]
pub struct NutriCareService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    /// Absent when no Gemini API key is configured
    generator: Option<Arc<dyn TextGenerator>>,
    classifier: Arc<dyn TextClassifier>,
    tool_router: ToolRouter<NutriCareService>,
}

impl NutriCareService {
    pub fn new(
        database_path: PathBuf,
        database: Database,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        let tracker = StatusTracker::new(database_path, generator.is_some());
        Self {
            status_tracker: Arc::new(Mutex::new(tracker)),
            database,
            generator,
            classifier: Arc::new(KeywordClassifier::new()),
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserIdParams {
    pub user_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SaveHealthProfileParams {
    pub user_id: String,
    #[serde(flatten)]
    pub intake: HealthIntake,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PreviewRecommendationsParams {
    #[serde(flatten)]
    pub intake: HealthIntake,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRecommendationHistoryParams {
    pub user_id: String,
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 { recommendations::DASHBOARD_HISTORY_LIMIT }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ClassifyRecommendationTextParams {
    /// Generated recommendation text, one suggestion per line
    pub text: String,
}

/// Normalized user id, or `invalid_params` when blank
fn user_id_param(user_id: &str) -> Result<&str, McpError> {
    profile::validate_user_id(user_id).map_err(|e| McpError::invalid_params(e, None))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value).map_err(|e| McpError::internal_error(e.to_string(), None))
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl NutriCareService {
    // --- Status ---

    #[tool(description = "Get the current status of the NutriCare service including build info, database status, AI availability, and process information")]
    async fn nutricare_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get the intake field catalog and the recommended tool workflow. Call this before collecting a user's health intake.")]
    fn intake_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::INTAKE_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(INTAKE_INSTRUCTIONS)]))
    }

    // --- Profile ---

    #[tool(description = "Save a user's health intake (overwrites any previous profile), then generate and store a new rule-based recommendation. Returns the stored profile, conditions, and recommendation.")]
    fn save_health_profile(&self, Parameters(p): Parameters<SaveHealthProfileParams>) -> Result<CallToolResult, McpError> {
        let user_id = user_id_param(&p.user_id)?;
        let intake = profile::validate_intake(&p.intake).map_err(|e| McpError::invalid_params(e, None))?;
        let result = profile::save_validated_profile(&self.database, user_id, &intake)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = to_json(&result)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get a user's stored profile and health conditions")]
    fn get_profile(&self, Parameters(p): Parameters<UserIdParams>) -> Result<CallToolResult, McpError> {
        let user_id = user_id_param(&p.user_id)?;
        let result = profile::get_profile(&self.database, user_id).map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(detail) => to_json(&detail)?,
            None => serde_json::json!({"error": "Profile not found", "user_id": user_id}).to_string(),
        };
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Run the rule-based recommendation engine on an intake without saving anything")]
    fn preview_recommendations(&self, Parameters(p): Parameters<PreviewRecommendationsParams>) -> Result<CallToolResult, McpError> {
        let result = profile::preview_recommendations(&p.intake).map_err(|e| McpError::invalid_params(e, None))?;
        let json = to_json(&result)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    // --- Recommendations ---

    #[tool(description = "Get a user's dashboard: profile summary and the 5 most recent recommendations")]
    fn get_dashboard(&self, Parameters(p): Parameters<UserIdParams>) -> Result<CallToolResult, McpError> {
        let user_id = user_id_param(&p.user_id)?;
        let result = recommendations::get_dashboard(&self.database, user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = to_json(&result)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get a user's most recent recommendation with the explanation for each item")]
    fn get_latest_recommendation(&self, Parameters(p): Parameters<UserIdParams>) -> Result<CallToolResult, McpError> {
        let user_id = user_id_param(&p.user_id)?;
        let result = recommendations::get_latest_recommendation(&self.database, user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = match result {
            Some(detail) => to_json(&detail)?,
            None => serde_json::json!({"error": "No recommendations found", "user_id": user_id}).to_string(),
        };
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List a user's stored recommendations, newest first (default limit 5)")]
    fn list_recommendation_history(&self, Parameters(p): Parameters<ListRecommendationHistoryParams>) -> Result<CallToolResult, McpError> {
        let user_id = user_id_param(&p.user_id)?;
        if p.limit < 1 {
            return Err(McpError::invalid_params("Limit must be at least 1", None));
        }
        let result = recommendations::list_recommendation_history(&self.database, user_id, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        let json = to_json(&result)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Ask the Gemini model for personalized recommendations based on the user's stored profile, split into recommended and not-recommended lines. Creates a placeholder profile if none exists.")]
    async fn get_ai_recommendation(&self, Parameters(p): Parameters<UserIdParams>) -> Result<CallToolResult, McpError> {
        let user_id = user_id_param(&p.user_id)?;
        let result = match &self.generator {
            Some(generator) => recommendations::get_ai_recommendation(
                &self.database,
                generator.as_ref(),
                self.classifier.as_ref(),
                user_id,
            )
            .await
            .map_err(|e| McpError::internal_error(e, None))?,
            None => AiRecommendationResponse::failed(
                "AI recommendations are not configured: set NUTRICARE_GEMINI_API_KEY".to_string(),
            ),
        };
        let json = to_json(&result)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Split free-form recommendation text into recommended and not-recommended lines using the keyword classifier")]
    fn classify_recommendation_text(&self, Parameters(p): Parameters<ClassifyRecommendationTextParams>) -> Result<CallToolResult, McpError> {
        let result = recommendations::classify_recommendation_text(self.classifier.as_ref(), &p.text);
        let json = to_json(&result)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for NutriCareService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "nutricare".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("NutriCare Health Intake & Diet Advisor".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "NutriCare - Health intake and diet recommendations for rural India. \
                 IMPORTANT: Call intake_instructions before collecting an intake. \
                 Profile: save_health_profile, get_profile, preview_recommendations. \
                 Recommendations: get_dashboard, get_latest_recommendation, list_recommendation_history. \
                 AI: get_ai_recommendation, classify_recommendation_text. \
                 Status: nutricare_status."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_user_id_is_invalid_params() {
        let err = user_id_param("   ").unwrap_err();
        assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
        assert_eq!(user_id_param(" user-1 ").unwrap(), "user-1");
    }
}
