//! Recommendation models
//!
//! [`RecommendationBundle`] is the value produced by the rule engine;
//! [`Recommendation`] is a bundle stored in the `recommendations` history.

use std::collections::BTreeMap;

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::columns::json_column;
use crate::db::{DbError, DbResult};

/// Dietary recommendations derived from one intake.
///
/// Lists keep rule order and may contain duplicates; repetition across rules
/// is meaningful to readers and must not be collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationBundle {
    pub recommended_foods: Vec<String>,
    pub foods_to_avoid: Vec<String>,
    pub supplements: Vec<String>,
    /// Lowercase topic key (e.g. "calcium", "bp") to explanation sentence
    pub explanations: BTreeMap<String, String>,
    pub warnings: Vec<String>,
}

impl RecommendationBundle {
    /// Explanation keyed by the lowercased item text, if any
    pub fn explanation_for(&self, item: &str) -> Option<&str> {
        self.explanations.get(&item.to_lowercase()).map(String::as_str)
    }
}

/// A stored recommendation bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: i64,
    pub user_id: String,
    #[serde(flatten)]
    pub bundle: RecommendationBundle,
    pub created_at: String,
}

impl Recommendation {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            bundle: RecommendationBundle {
                recommended_foods: json_column(row, "recommended_foods")?,
                foods_to_avoid: json_column(row, "foods_to_avoid")?,
                supplements: json_column(row, "supplements")?,
                explanations: json_column(row, "explanations")?,
                warnings: json_column(row, "warnings")?,
            },
            created_at: row.get("created_at")?,
        })
    }

    /// Store a new bundle in the user's history
    pub fn create(conn: &Connection, user_id: &str, bundle: &RecommendationBundle) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO recommendations (
                user_id, recommended_foods, foods_to_avoid,
                supplements, explanations, warnings
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                user_id,
                serde_json::to_string(&bundle.recommended_foods)?,
                serde_json::to_string(&bundle.foods_to_avoid)?,
                serde_json::to_string(&bundle.supplements)?,
                serde_json::to_string(&bundle.explanations)?,
                serde_json::to_string(&bundle.warnings)?,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or_else(|| DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a recommendation by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recommendations WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(rec) => Ok(Some(rec)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Most recent recommendation for a user
    pub fn latest_for_user(conn: &Connection, user_id: &str) -> DbResult<Option<Self>> {
        Ok(Self::list_for_user(conn, user_id, 1)?.into_iter().next())
    }

    /// Recommendations for a user, newest first
    pub fn list_for_user(conn: &Connection, user_id: &str, limit: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM recommendations WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC LIMIT ?2",
        )?;
        let recs = stmt
            .query_map(params![user_id, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recs)
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

    fn bundle(food: &str) -> RecommendationBundle {
        let mut bundle = RecommendationBundle::default();
        bundle.recommended_foods.push(food.to_string());
        bundle.recommended_foods.push(food.to_string());
        bundle.supplements.push("Iron".to_string());
        bundle
            .explanations
            .insert("iron".to_string(), "Important for women to prevent anemia".to_string());
        bundle
    }

    #[test]
    fn test_explanation_lookup_lowercases_item() {
        let b = bundle("Spinach");
        assert_eq!(b.explanation_for("Iron"), Some("Important for women to prevent anemia"));
        assert_eq!(b.explanation_for("Spinach"), None);
    }

    #[test]
    fn test_create_keeps_duplicates_and_order() {
        let conn = setup();
        let stored = Recommendation::create(&conn, "user-1", &bundle("Oats")).unwrap();
        assert_eq!(stored.bundle.recommended_foods, vec!["Oats", "Oats"]);
        assert_eq!(stored.bundle, bundle("Oats"));
    }

    #[test]
    fn test_history_is_newest_first_and_limited() {
        let conn = setup();
        for food in ["A", "B", "C"] {
            Recommendation::create(&conn, "user-1", &bundle(food)).unwrap();
        }
        Recommendation::create(&conn, "user-2", &bundle("Z")).unwrap();

        let history = Recommendation::list_for_user(&conn, "user-1", 2).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].bundle.recommended_foods[0], "C");
        assert_eq!(history[1].bundle.recommended_foods[0], "B");

        let latest = Recommendation::latest_for_user(&conn, "user-1").unwrap().unwrap();
        assert_eq!(latest.bundle.recommended_foods[0], "C");
        assert!(Recommendation::latest_for_user(&conn, "nobody").unwrap().is_none());
    }

    #[test]
    fn test_serialized_record_is_flat() {
        let conn = setup();
        let stored = Recommendation::create(&conn, "user-1", &bundle("Oats")).unwrap();
        let json = serde_json::to_value(&stored).unwrap();
        assert!(json.get("recommended_foods").is_some());
        assert!(json.get("bundle").is_none());
    }
}
