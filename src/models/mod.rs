//! Data models
//!
//! Rust structs representing intake data and database entities.

mod health_condition;
mod profile;
mod recommendation;

pub use health_condition::{
    catalog_condition, catalog_food_type, HealthConditionRecord, HealthConditionUpsert,
    FOOD_TYPE_CATALOG, HEALTH_CONDITION_CATALOG,
};
pub use profile::{
    DietaryPreference, Gender, Profile, UserProfile, UserProfileUpsert, WaterConsumption,
};
pub use recommendation::{Recommendation, RecommendationBundle};
