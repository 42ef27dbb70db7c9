//! Prompt construction for AI recommendations

use crate::models::UserProfile;

/// Instruction sentence that opens every prompt
pub const PROMPT_PREAMBLE: &str =
    "Given the following user profile, provide personalized nutrition and health recommendations.";

/// Build the generative-text prompt for a stored profile
pub fn build_prompt(profile: &UserProfile) -> Result<String, serde_json::Error> {
    let serialized = serde_json::to_string(profile)?;
    Ok(format!("{}\nProfile: {}", PROMPT_PREAMBLE, serialized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::classify;
    use crate::models::{DietaryPreference, Gender};

    fn stored_profile() -> UserProfile {
        UserProfile {
            id: 1,
            user_id: "user-1".to_string(),
            full_name: "Meena".to_string(),
            age: 44,
            gender: Gender::Female,
            dietary_preference: DietaryPreference::Vegetarian,
            location: Some("Pune".to_string()),
            food_types: vec!["Grains".to_string()],
            water_consumption: None,
            created_at: "2026-01-01 00:00:00".to_string(),
            updated_at: "2026-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn test_prompt_embeds_profile_json() {
        let prompt = build_prompt(&stored_profile()).unwrap();
        assert!(prompt.starts_with(PROMPT_PREAMBLE));
        assert!(prompt.contains("\nProfile: {"));
        assert!(prompt.contains("\"dietary_preference\":\"vegetarian\""));
    }

    #[test]
    fn test_echoed_prompt_classifies_to_nothing() {
        let prompt = build_prompt(&stored_profile()).unwrap();
        assert!(classify(&prompt).is_empty());
    }
}
