//! Recommendation MCP Tools
//!
//! Read-side views over stored recommendations (dashboard, latest, history)
//! and the AI recommendation flow.

use serde::Serialize;
use tracing::{info, warn};

use crate::db::Database;
use crate::engine::{build_prompt, ClassifiedText, TextClassifier};
use crate::llm::TextGenerator;
use crate::models::{Recommendation, UserProfile, UserProfileUpsert};
use crate::tools::profile::validate_user_id;

/// Number of recommendations shown on the dashboard
pub const DASHBOARD_HISTORY_LIMIT: i64 = 5;

/// A list entry with its explanation, if one is keyed by the entry's text
#[derive(Debug, Serialize)]
pub struct ExplainedItem {
    pub name: String,
    pub explanation: Option<String>,
}

/// Full recommendation view
#[derive(Debug, Serialize)]
pub struct RecommendationDetail {
    pub id: i64,
    pub created_at: String,
    pub recommended_foods: Vec<ExplainedItem>,
    pub foods_to_avoid: Vec<ExplainedItem>,
    pub supplements: Vec<ExplainedItem>,
    pub warnings: Vec<String>,
    pub explanations: std::collections::BTreeMap<String, String>,
}

impl From<Recommendation> for RecommendationDetail {
    fn from(rec: Recommendation) -> Self {
        let explain = |items: &[String]| -> Vec<ExplainedItem> {
            items
                .iter()
                .map(|name| ExplainedItem {
                    name: name.clone(),
                    explanation: rec.bundle.explanation_for(name).map(String::from),
                })
                .collect()
        };

        Self {
            id: rec.id,
            recommended_foods: explain(&rec.bundle.recommended_foods),
            foods_to_avoid: explain(&rec.bundle.foods_to_avoid),
            supplements: explain(&rec.bundle.supplements),
            created_at: rec.created_at,
            warnings: rec.bundle.warnings,
            explanations: rec.bundle.explanations,
        }
    }
}

/// Recommendation summary for history listings
#[derive(Debug, Serialize)]
pub struct RecommendationSummary {
    pub id: i64,
    pub created_at: String,
    pub recommended_count: usize,
    pub avoid_count: usize,
    pub supplement_count: usize,
    pub recommended_foods: Vec<String>,
    pub foods_to_avoid: Vec<String>,
    pub supplements: Vec<String>,
}

impl From<Recommendation> for RecommendationSummary {
    fn from(rec: Recommendation) -> Self {
        Self {
            id: rec.id,
            created_at: rec.created_at,
            recommended_count: rec.bundle.recommended_foods.len(),
            avoid_count: rec.bundle.foods_to_avoid.len(),
            supplement_count: rec.bundle.supplements.len(),
            recommended_foods: rec.bundle.recommended_foods,
            foods_to_avoid: rec.bundle.foods_to_avoid,
            supplements: rec.bundle.supplements,
        }
    }
}

/// Response for list_recommendation_history
#[derive(Debug, Serialize)]
pub struct RecommendationHistoryResponse {
    pub user_id: String,
    pub recommendations: Vec<RecommendationSummary>,
    pub total: usize,
}

/// Profile fields shown on the dashboard
#[derive(Debug, Serialize)]
pub struct ProfileSummary {
    pub full_name: String,
    pub age: i64,
    pub gender: String,
    pub dietary_preference: String,
    pub location: Option<String>,
    pub created_at: String,
}

impl From<UserProfile> for ProfileSummary {
    fn from(profile: UserProfile) -> Self {
        Self {
            full_name: profile.full_name,
            age: profile.age,
            gender: profile.gender.as_str().to_string(),
            dietary_preference: profile.dietary_preference.as_str().to_string(),
            location: profile.location.filter(|l| !l.is_empty()),
            created_at: profile.created_at,
        }
    }
}

/// Response for get_dashboard
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user_id: String,
    pub profile: Option<ProfileSummary>,
    pub recent_recommendations: Vec<RecommendationSummary>,
}

/// Response for get_ai_recommendation
#[derive(Debug, Serialize)]
pub struct AiRecommendationResponse {
    pub success: bool,
    pub raw_text: Option<String>,
    pub classified: Option<ClassifiedText>,
    pub error: Option<String>,
}

impl AiRecommendationResponse {
    pub fn failed(message: String) -> Self {
        Self {
            success: false,
            raw_text: None,
            classified: None,
            error: Some(message),
        }
    }
}

// ============================================================================
// Tool Functions
// ============================================================================

/// Most recent recommendation for a user
pub fn get_latest_recommendation(
    db: &Database,
    user_id: &str,
) -> Result<Option<RecommendationDetail>, String> {
    let user_id = validate_user_id(user_id)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let latest = Recommendation::latest_for_user(&conn, user_id)
        .map_err(|e| format!("Failed to get recommendation: {}", e))?;

    Ok(latest.map(RecommendationDetail::from))
}

/// Recommendation history for a user, newest first
pub fn list_recommendation_history(
    db: &Database,
    user_id: &str,
    limit: i64,
) -> Result<RecommendationHistoryResponse, String> {
    if limit < 1 {
        return Err("Limit must be at least 1".to_string());
    }
    let user_id = validate_user_id(user_id)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let recs = Recommendation::list_for_user(&conn, user_id, limit)
        .map_err(|e| format!("Failed to list recommendations: {}", e))?;

    let recommendations: Vec<RecommendationSummary> =
        recs.into_iter().map(RecommendationSummary::from).collect();
    let total = recommendations.len();

    Ok(RecommendationHistoryResponse {
        user_id: user_id.to_string(),
        recommendations,
        total,
    })
}

/// Dashboard: profile summary plus the most recent recommendations
pub fn get_dashboard(db: &Database, user_id: &str) -> Result<DashboardResponse, String> {
    let user_id = validate_user_id(user_id)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = UserProfile::get_by_user(&conn, user_id)
        .map_err(|e| format!("Failed to get profile: {}", e))?;

    let recent = Recommendation::list_for_user(&conn, user_id, DASHBOARD_HISTORY_LIMIT)
        .map_err(|e| format!("Failed to list recommendations: {}", e))?;

    Ok(DashboardResponse {
        user_id: user_id.to_string(),
        profile: profile.map(ProfileSummary::from),
        recent_recommendations: recent.into_iter().map(RecommendationSummary::from).collect(),
    })
}

/// Classify caller-supplied generated text
pub fn classify_recommendation_text(classifier: &dyn TextClassifier, text: &str) -> ClassifiedText {
    classifier.classify(text)
}

/// Load the profile the AI prompt is built from.
///
/// A missing profile is created from the placeholder; an existing one has
/// its `updated_at` bumped.
fn load_prompt_profile(db: &Database, user_id: &str) -> Result<UserProfile, String> {
    db.with_transaction(|conn| match UserProfile::touch(conn, user_id)? {
        Some(profile) => Ok(profile),
        None => UserProfile::upsert(conn, user_id, &UserProfileUpsert::placeholder()),
    })
    .map_err(|e| format!("Failed to load profile: {}", e))
}

/// Ask the generative-text service for recommendations and classify them.
///
/// Storage failures are returned as `Err`. Service failures come back as an
/// unsuccessful response carrying the message, and are not retried.
pub async fn get_ai_recommendation(
    db: &Database,
    generator: &dyn TextGenerator,
    classifier: &dyn TextClassifier,
    user_id: &str,
) -> Result<AiRecommendationResponse, String> {
    let user_id = validate_user_id(user_id)?;

    let profile = load_prompt_profile(db, user_id)?;
    let prompt = build_prompt(&profile).map_err(|e| format!("Failed to build prompt: {}", e))?;

    match generator.complete(&prompt).await {
        Ok(text) => {
            let classified = classifier.classify(&text);
            info!(
                user_id,
                recommended = classified.recommended.len(),
                not_recommended = classified.not_recommended.len(),
                "Received AI recommendation"
            );
            Ok(AiRecommendationResponse {
                success: true,
                raw_text: Some(text),
                classified: Some(classified),
                error: None,
            })
        }
        Err(e) => {
            warn!(user_id, error = %e, "AI recommendation failed");
            Ok(AiRecommendationResponse::failed(format!(
                "Failed to fetch AI recommendation: {}",
                e
            )))
        }
    }
}
