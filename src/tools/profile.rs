//! Profile MCP Tools
//!
//! Intake submission: validation, profile and health-condition storage, and
//! generation of the recommendation bundle.

use rmcp::schemars;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::db::Database;
use crate::engine::generate;
use crate::models::{
    catalog_condition, catalog_food_type, DietaryPreference, Gender, HealthConditionRecord,
    HealthConditionUpsert, Profile, Recommendation, RecommendationBundle, UserProfile,
    UserProfileUpsert, WaterConsumption,
};

pub const MIN_AGE: i64 = 1;
pub const MAX_AGE: i64 = 120;

/// Raw intake form fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct HealthIntake {
    pub full_name: String,
    /// Age in years (1-120)
    pub age: i64,
    /// male, female or other
    pub gender: String,
    /// vegetarian, non-vegetarian or vegan
    pub dietary_preference: String,
    /// Names from the health condition catalog
    #[serde(default)]
    pub health_conditions: Vec<String>,
    #[serde(default)]
    pub medications: Option<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Names from the food type catalog
    #[serde(default)]
    pub food_types: Vec<String>,
    /// "1-3 liters" or "Above 3 liters"
    #[serde(default)]
    pub water_consumption: Option<String>,
}

/// Response for save_health_profile
#[derive(Debug, Serialize)]
pub struct SaveHealthProfileResponse {
    pub success: bool,
    pub profile: UserProfile,
    pub health_conditions: HealthConditionRecord,
    pub recommendation: Recommendation,
}

/// Response for get_profile
#[derive(Debug, Serialize)]
pub struct ProfileDetail {
    pub profile: UserProfile,
    pub health_conditions: Option<HealthConditionRecord>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Trim a user id, rejecting blank ones.
///
/// Every tool goes through this so an id is stored and looked up the same way.
pub fn validate_user_id(user_id: &str) -> Result<&str, String> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err("User ID cannot be empty".to_string());
    }
    Ok(user_id)
}

/// Check an intake and turn it into an engine profile.
///
/// Conditions and food types are normalized to their catalog spelling,
/// keeping the order they were selected in. Allergies are kept verbatim,
/// whitespace included, since they are echoed back in a warning.
pub fn validate_intake(intake: &HealthIntake) -> Result<Profile, String> {
    let full_name = intake.full_name.trim();
    if full_name.is_empty() {
        return Err("Full name cannot be empty".to_string());
    }

    if !(MIN_AGE..=MAX_AGE).contains(&intake.age) {
        return Err(format!(
            "Age must be between {} and {}, got {}",
            MIN_AGE, MAX_AGE, intake.age
        ));
    }

    let gender = Gender::parse(&intake.gender)
        .ok_or_else(|| format!("Invalid gender '{}': expected male, female or other", intake.gender))?;

    let dietary_preference = DietaryPreference::parse(&intake.dietary_preference).ok_or_else(|| {
        format!(
            "Invalid dietary preference '{}': expected vegetarian, non-vegetarian or vegan",
            intake.dietary_preference
        )
    })?;

    let water_consumption = match non_blank(&intake.water_consumption) {
        Some(raw) => Some(WaterConsumption::parse(&raw).ok_or_else(|| {
            format!(
                "Invalid water consumption '{}': expected '1-3 liters' or 'Above 3 liters'",
                raw
            )
        })?),
        None => None,
    };

    let health_conditions = intake
        .health_conditions
        .iter()
        .map(|c| {
            catalog_condition(c)
                .map(String::from)
                .ok_or_else(|| format!("Unknown health condition: {}", c))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let food_types = intake
        .food_types
        .iter()
        .map(|t| {
            catalog_food_type(t)
                .map(String::from)
                .ok_or_else(|| format!("Unknown food type: {}", t))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Profile {
        full_name: full_name.to_string(),
        age: u32::try_from(intake.age).ok(),
        gender,
        dietary_preference,
        health_conditions,
        medications: non_blank(&intake.medications).unwrap_or_default(),
        allergies: intake.allergies.clone().unwrap_or_default(),
        location: non_blank(&intake.location),
        food_types,
        water_consumption,
    })
}

/// Save an intake, then generate and store a fresh recommendation bundle
pub fn save_health_profile(
    db: &Database,
    user_id: &str,
    intake: &HealthIntake,
) -> Result<SaveHealthProfileResponse, String> {
    let user_id = validate_user_id(user_id)?;
    let profile = validate_intake(intake)?;
    save_validated_profile(db, user_id, &profile)
}

/// Store an already validated profile and its recommendation bundle.
///
/// `user_id` must already have been through [`validate_user_id`].
pub fn save_validated_profile(
    db: &Database,
    user_id: &str,
    profile: &Profile,
) -> Result<SaveHealthProfileResponse, String> {
    let bundle = generate(profile);

    let conditions = HealthConditionUpsert {
        conditions: profile.health_conditions.clone(),
        medications: Some(profile.medications.clone()).filter(|m| !m.is_empty()),
        allergies: Some(profile.allergies.clone()).filter(|a| !a.is_empty()),
    };

    let (stored_profile, stored_conditions, recommendation) = db
        .with_transaction(|conn| {
            let stored_profile = UserProfile::upsert(conn, user_id, &UserProfileUpsert::from(profile))?;
            let stored_conditions = HealthConditionRecord::upsert(conn, user_id, &conditions)?;
            let recommendation = Recommendation::create(conn, user_id, &bundle)?;
            Ok((stored_profile, stored_conditions, recommendation))
        })
        .map_err(|e| format!("Failed to save health profile: {}", e))?;

    info!(
        user_id,
        recommendation_id = recommendation.id,
        conditions = stored_conditions.condition_name.as_str(),
        "Saved health profile"
    );

    Ok(SaveHealthProfileResponse {
        success: true,
        profile: stored_profile,
        health_conditions: stored_conditions,
        recommendation,
    })
}

/// Get the stored profile and health conditions for a user
pub fn get_profile(db: &Database, user_id: &str) -> Result<Option<ProfileDetail>, String> {
    let user_id = validate_user_id(user_id)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let profile = UserProfile::get_by_user(&conn, user_id)
        .map_err(|e| format!("Failed to get profile: {}", e))?;

    let Some(profile) = profile else {
        return Ok(None);
    };

    let health_conditions = HealthConditionRecord::get_by_user(&conn, user_id)
        .map_err(|e| format!("Failed to get health conditions: {}", e))?;

    Ok(Some(ProfileDetail {
        profile,
        health_conditions,
    }))
}

/// Run the rule engine on an intake without storing anything
pub fn preview_recommendations(intake: &HealthIntake) -> Result<RecommendationBundle, String> {
    let profile = validate_intake(intake)?;
    Ok(generate(&profile))
}
