//! Utility to regenerate rule-based recommendations from stored profiles
//! Usage: cargo run --bin regenerate_recommendations -- [user_id]
//!
//! Appends a fresh recommendation to each user's history. Useful after the
//! recommendation rules change.

use nutricare::config::database_path_from_env;
use nutricare::db::{self, Database};
use nutricare::engine::generate;
use nutricare::models::{HealthConditionRecord, Profile, Recommendation, UserProfile};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let user_filter = args.get(1).map(|s| s.as_str());

    let db_path = database_path_from_env();
    println!("Database: {}", db_path.display());

    let database = Database::new(&db_path)?;

    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let regenerated = database.with_transaction(|conn| {
        let profiles: Vec<UserProfile> = match user_filter {
            Some(user_id) => UserProfile::get_by_user(conn, user_id)?.into_iter().collect(),
            None => UserProfile::list(conn)?,
        };

        if profiles.is_empty() {
            match user_filter {
                Some(user_id) => println!("No profile found for user: {}", user_id),
                None => println!("No profiles found"),
            }
            return Ok(0);
        }

        for stored in &profiles {
            let conditions = HealthConditionRecord::get_by_user(conn, &stored.user_id)?;
            let profile = Profile::from_records(stored, conditions.as_ref());
            let bundle = generate(&profile);

            let previous = Recommendation::latest_for_user(conn, &stored.user_id)?;
            let rec = Recommendation::create(conn, &stored.user_id, &bundle)?;

            println!("\nUser: {} ({})", stored.user_id, stored.full_name);
            println!("  Recommendation ID: {}", rec.id);
            println!(
                "  Foods: {} recommended, {} to avoid, {} supplements, {} warnings",
                bundle.recommended_foods.len(),
                bundle.foods_to_avoid.len(),
                bundle.supplements.len(),
                bundle.warnings.len()
            );
            match previous {
                Some(prev) if prev.bundle == bundle => println!("  Unchanged from #{}", prev.id),
                Some(prev) => println!("  Changed since #{}", prev.id),
                None => println!("  First recommendation"),
            }
        }

        Ok(profiles.len())
    })?;

    println!("\nRegenerated {} recommendation(s)", regenerated);

    Ok(())
}
