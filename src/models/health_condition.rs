//! Health condition model
//!
//! One `health_conditions` row per user holding the selected conditions,
//! current medications and food allergies.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// Conditions offered on the intake form, in display order
pub const HEALTH_CONDITION_CATALOG: [&str; 12] = [
    "Diabetes",
    "High Blood Pressure",
    "High Cholesterol",
    "Heart Disease",
    "Kidney Disease",
    "Liver Disease",
    "Thyroid Disorder",
    "Anemia",
    "Arthritis",
    "Osteoporosis",
    "Digestive Issues",
    "Other",
];

/// Food groups offered on the intake form
pub const FOOD_TYPE_CATALOG: [&str; 5] = ["Fruits", "Vegetables", "Grains", "Protein", "Dairy"];

/// Separator used when storing the selected conditions in one column
const CONDITION_SEPARATOR: &str = ", ";

/// Case-insensitive lookup returning the catalog spelling
pub fn catalog_condition(name: &str) -> Option<&'static str> {
    let needle = name.trim();
    HEALTH_CONDITION_CATALOG
        .iter()
        .copied()
        .find(|c| c.eq_ignore_ascii_case(needle))
}

/// Case-insensitive lookup returning the catalog spelling
pub fn catalog_food_type(name: &str) -> Option<&'static str> {
    let needle = name.trim();
    FOOD_TYPE_CATALOG
        .iter()
        .copied()
        .find(|t| t.eq_ignore_ascii_case(needle))
}

/// A stored health condition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConditionRecord {
    pub id: i64,
    pub user_id: String,
    pub condition_name: String,
    pub medications: Option<String>,
    pub allergies: Option<String>,
    pub created_at: String,
}

/// Data for creating or overwriting a health condition record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthConditionUpsert {
    pub conditions: Vec<String>,
    pub medications: Option<String>,
    pub allergies: Option<String>,
}

impl HealthConditionRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            condition_name: row.get("condition_name")?,
            medications: row.get("medications")?,
            allergies: row.get("allergies")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Selected conditions in their original order
    pub fn condition_names(&self) -> Vec<String> {
        self.condition_name
            .split(CONDITION_SEPARATOR.trim())
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from)
            .collect()
    }

    /// Create or overwrite the record for a user
    pub fn upsert(conn: &Connection, user_id: &str, data: &HealthConditionUpsert) -> DbResult<Self> {
        let condition_name = data.conditions.join(CONDITION_SEPARATOR);
        conn.execute(
            r#"
            INSERT INTO health_conditions (user_id, condition_name, medications, allergies)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(user_id) DO UPDATE SET
                condition_name = excluded.condition_name,
                medications = excluded.medications,
                allergies = excluded.allergies
            "#,
            params![user_id, condition_name, data.medications, data.allergies],
        )?;

        Self::get_by_user(conn, user_id)?
            .ok_or_else(|| DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get the record for a user
    pub fn get_by_user(conn: &Connection, user_id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM health_conditions WHERE user_id = ?1")?;

        match stmt.query_row([user_id], Self::from_row) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    #[test]
    fn test_catalog_lookup_is_case_insensitive() {
        assert_eq!(catalog_condition("high blood pressure"), Some("High Blood Pressure"));
        assert_eq!(catalog_condition(" ANEMIA "), Some("Anemia"));
        assert_eq!(catalog_condition("Gout"), None);
        assert_eq!(catalog_food_type("dairy"), Some("Dairy"));
        assert_eq!(catalog_food_type("Sweets"), None);
    }

    #[test]
    fn test_upsert_and_split_conditions() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let data = HealthConditionUpsert {
            conditions: vec!["Diabetes".to_string(), "High Blood Pressure".to_string()],
            medications: Some("Metformin".to_string()),
            allergies: None,
        };
        let record = HealthConditionRecord::upsert(&conn, "user-1", &data).unwrap();
        assert_eq!(record.condition_name, "Diabetes, High Blood Pressure");
        assert_eq!(record.condition_names(), vec!["Diabetes", "High Blood Pressure"]);

        let cleared = HealthConditionRecord::upsert(&conn, "user-1", &HealthConditionUpsert::default()).unwrap();
        assert_eq!(cleared.id, record.id);
        assert!(cleared.condition_names().is_empty());
        assert_eq!(cleared.medications, None);
    }
}
