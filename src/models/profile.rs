//! User profile models
//!
//! [`UserProfile`] is the stored `user_profiles` row. [`Profile`] is the
//! hydrated intake the recommendation engine consumes.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use super::health_condition::HealthConditionRecord;
use crate::db::columns::{enum_column, json_column, optional_enum_column};
use crate::db::{DbError, DbResult};

/// Gender as selected on the intake form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

/// Dietary preference as selected on the intake form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DietaryPreference {
    Vegetarian,
    NonVegetarian,
    Vegan,
}

impl DietaryPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            DietaryPreference::Vegetarian => "vegetarian",
            DietaryPreference::NonVegetarian => "non-vegetarian",
            DietaryPreference::Vegan => "vegan",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "vegetarian" => Some(DietaryPreference::Vegetarian),
            "non-vegetarian" | "non_vegetarian" | "nonvegetarian" => {
                Some(DietaryPreference::NonVegetarian)
            }
            "vegan" => Some(DietaryPreference::Vegan),
            _ => None,
        }
    }

    /// Vegetarian and vegan diets both exclude meat and fish
    pub fn is_plant_based(&self) -> bool {
        matches!(self, DietaryPreference::Vegetarian | DietaryPreference::Vegan)
    }
}

/// Daily water intake bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaterConsumption {
    #[serde(rename = "1-3 liters")]
    OneToThreeLiters,
    #[serde(rename = "Above 3 liters")]
    AboveThreeLiters,
}

impl WaterConsumption {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaterConsumption::OneToThreeLiters => "1-3 liters",
            WaterConsumption::AboveThreeLiters => "Above 3 liters",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "1-3 liters" => Some(WaterConsumption::OneToThreeLiters),
            "above 3 liters" => Some(WaterConsumption::AboveThreeLiters),
            _ => None,
        }
    }
}

/// Intake profile consumed by the recommendation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub full_name: String,
    /// `None` when the age is unknown or not positive
    pub age: Option<u32>,
    pub gender: Gender,
    pub dietary_preference: DietaryPreference,
    pub health_conditions: Vec<String>,
    pub medications: String,
    pub allergies: String,
    pub location: Option<String>,
    pub food_types: Vec<String>,
    pub water_consumption: Option<WaterConsumption>,
}

impl Profile {
    /// Rebuild an intake from the stored profile and health-condition rows
    pub fn from_records(profile: &UserProfile, conditions: Option<&HealthConditionRecord>) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            age: u32::try_from(profile.age).ok().filter(|age| *age > 0),
            gender: profile.gender,
            dietary_preference: profile.dietary_preference,
            health_conditions: conditions
                .map(HealthConditionRecord::condition_names)
                .unwrap_or_default(),
            medications: conditions
                .and_then(|c| c.medications.clone())
                .unwrap_or_default(),
            allergies: conditions
                .and_then(|c| c.allergies.clone())
                .unwrap_or_default(),
            location: profile.location.clone(),
            food_types: profile.food_types.clone(),
            water_consumption: profile.water_consumption,
        }
    }
}

/// A stored user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub user_id: String,
    pub full_name: String,
    pub age: i64,
    pub gender: Gender,
    pub dietary_preference: DietaryPreference,
    pub location: Option<String>,
    pub food_types: Vec<String>,
    pub water_consumption: Option<WaterConsumption>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating or overwriting a user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfileUpsert {
    pub full_name: String,
    pub age: i64,
    pub gender: Gender,
    pub dietary_preference: DietaryPreference,
    pub location: Option<String>,
    pub food_types: Vec<String>,
    pub water_consumption: Option<WaterConsumption>,
}

impl UserProfileUpsert {
    /// Placeholder profile used when an AI recommendation is requested
    /// before any intake was saved
    pub fn placeholder() -> Self {
        Self {
            full_name: "Your Name".to_string(),
            age: 30,
            gender: Gender::Other,
            dietary_preference: DietaryPreference::Vegetarian,
            location: Some(String::new()),
            food_types: Vec::new(),
            water_consumption: None,
        }
    }
}

impl From<&Profile> for UserProfileUpsert {
    fn from(profile: &Profile) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            age: profile.age.map(i64::from).unwrap_or(0),
            gender: profile.gender,
            dietary_preference: profile.dietary_preference,
            location: profile.location.clone(),
            food_types: profile.food_types.clone(),
            water_consumption: profile.water_consumption,
        }
    }
}

impl UserProfile {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            full_name: row.get("full_name")?,
            age: row.get("age")?,
            gender: enum_column(row, "gender", Gender::parse)?,
            dietary_preference: enum_column(row, "dietary_preference", DietaryPreference::parse)?,
            location: row.get("location")?,
            food_types: json_column(row, "food_types")?,
            water_consumption: optional_enum_column(row, "water_consumption", WaterConsumption::parse)?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Create or overwrite the profile for a user
    pub fn upsert(conn: &Connection, user_id: &str, data: &UserProfileUpsert) -> DbResult<Self> {
        let food_types = serde_json::to_string(&data.food_types)?;
        conn.execute(
            r#"
            INSERT INTO user_profiles (
                user_id, full_name, age, gender, dietary_preference,
                location, food_types, water_consumption
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(user_id) DO UPDATE SET
                full_name = excluded.full_name,
                age = excluded.age,
                gender = excluded.gender,
                dietary_preference = excluded.dietary_preference,
                location = excluded.location,
                food_types = excluded.food_types,
                water_consumption = excluded.water_consumption,
                updated_at = datetime('now')
            "#,
            params![
                user_id,
                data.full_name,
                data.age,
                data.gender.as_str(),
                data.dietary_preference.as_str(),
                data.location,
                food_types,
                data.water_consumption.map(|w| w.as_str()),
            ],
        )?;

        Self::get_by_user(conn, user_id)?
            .ok_or_else(|| DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get the profile for a user
    pub fn get_by_user(conn: &Connection, user_id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM user_profiles WHERE user_id = ?1")?;

        match stmt.query_row([user_id], Self::from_row) {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Bump `updated_at` without changing any field
    pub fn touch(conn: &Connection, user_id: &str) -> DbResult<Option<Self>> {
        let changed = conn.execute(
            "UPDATE user_profiles SET updated_at = datetime('now') WHERE user_id = ?1",
            [user_id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get_by_user(conn, user_id)
    }

    /// List all profiles ordered by user
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM user_profiles ORDER BY user_id")?;
        let profiles = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn sample() -> UserProfileUpsert {
        UserProfileUpsert {
            full_name: "Asha Devi".to_string(),
            age: 56,
            gender: Gender::Female,
            dietary_preference: DietaryPreference::NonVegetarian,
            location: Some("Nashik".to_string()),
            food_types: vec!["Grains".to_string(), "Dairy".to_string()],
            water_consumption: Some(WaterConsumption::AboveThreeLiters),
        }
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!(Gender::parse("Female"), Some(Gender::Female));
        assert_eq!(Gender::parse("robot"), None);
        assert_eq!(
            DietaryPreference::parse("non-vegetarian"),
            Some(DietaryPreference::NonVegetarian)
        );
        assert_eq!(DietaryPreference::parse(""), None);
        assert_eq!(
            WaterConsumption::parse("Above 3 liters"),
            Some(WaterConsumption::AboveThreeLiters)
        );
        assert_eq!(WaterConsumption::parse("lots"), None);
    }

    #[test]
    fn test_serde_names_match_stored_strings() {
        assert_eq!(
            serde_json::to_string(&DietaryPreference::NonVegetarian).unwrap(),
            "\"non-vegetarian\""
        );
        assert_eq!(
            serde_json::to_string(&WaterConsumption::OneToThreeLiters).unwrap(),
            "\"1-3 liters\""
        );
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), "\"female\"");
    }

    #[test]
    fn test_upsert_overwrites_single_row() {
        let conn = setup();
        let first = UserProfile::upsert(&conn, "user-1", &sample()).unwrap();
        assert_eq!(first.full_name, "Asha Devi");
        assert_eq!(first.food_types, vec!["Grains", "Dairy"]);

        let mut changed = sample();
        changed.age = 57;
        changed.water_consumption = None;
        let second = UserProfile::upsert(&conn, "user-1", &changed).unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.age, 57);
        assert_eq!(second.water_consumption, None);
        assert_eq!(UserProfile::list(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_profile_is_none() {
        let conn = setup();
        assert!(UserProfile::get_by_user(&conn, "nobody").unwrap().is_none());
        assert!(UserProfile::touch(&conn, "nobody").unwrap().is_none());
    }

    #[test]
    fn test_from_records_rebuilds_intake() {
        let conn = setup();
        let stored = UserProfile::upsert(&conn, "user-1", &sample()).unwrap();
        let conditions = HealthConditionRecord {
            id: 1,
            user_id: "user-1".to_string(),
            condition_name: "Diabetes, Anemia".to_string(),
            medications: Some("Warfarin".to_string()),
            allergies: None,
            created_at: String::new(),
        };

        let profile = Profile::from_records(&stored, Some(&conditions));
        assert_eq!(profile.age, Some(56));
        assert_eq!(profile.health_conditions, vec!["Diabetes", "Anemia"]);
        assert_eq!(profile.medications, "Warfarin");
        assert_eq!(profile.allergies, "");

        let bare = Profile::from_records(&stored, None);
        assert!(bare.health_conditions.is_empty());
    }
}
