//! NutriCare Status Tool
//!
//! Provides runtime status information about the NutriCare service.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Intake instructions for AI assistants
pub const INTAKE_INSTRUCTIONS: &str = r#"
# NutriCare Intake Instructions

NutriCare stores a short health intake per user and turns it into diet
recommendations suited to rural India: foods to eat, foods to avoid,
supplements, explanations and warnings.

---

## Intake Fields

| Field | Required | Values |
|-------|----------|--------|
| `full_name` | yes | non-empty text |
| `age` | yes | whole number, 1 to 120 |
| `gender` | yes | `male`, `female`, `other` |
| `dietary_preference` | yes | `vegetarian`, `non-vegetarian`, `vegan` |
| `health_conditions` | no | list from the condition catalog below |
| `medications` | no | free text |
| `allergies` | no | free text, repeated verbatim in a warning |
| `location` | no | village, town or district |
| `food_types` | no | list from the food type catalog below |
| `water_consumption` | no | `1-3 liters` or `Above 3 liters` |

### Health Condition Catalog

Diabetes, High Blood Pressure, High Cholesterol, Heart Disease,
Kidney Disease, Liver Disease, Thyroid Disorder, Anemia, Arthritis,
Osteoporosis, Digestive Issues, Other

Catalog names match case-insensitively and are stored in catalog spelling.
Only Diabetes, High Blood Pressure, High Cholesterol and Anemia change the
rule-based recommendations; the rest are recorded for reference and for
the AI prompt.

### Food Type Catalog

Fruits, Vegetables, Grains, Protein, Dairy

---

## Workflow

1. **Collect the intake** from the user. Ask for anything required that is
   missing; do not guess an age.
2. **`preview_recommendations`** (optional) shows what the rules produce
   without saving anything.
3. **`save_health_profile`** stores the profile and conditions, generates a
   recommendation and appends it to the user's history. Submitting again
   overwrites the profile and adds a new history entry.
4. **`get_dashboard`** gives the profile summary and the 5 most recent
   recommendations.
5. **`get_latest_recommendation`** returns the newest recommendation with
   the explanation for each item where one exists.
6. **`list_recommendation_history`** returns older entries, newest first.

### AI Recommendations

**`get_ai_recommendation`** sends the stored profile to the configured
Gemini model and splits the reply into recommended and not-recommended
lines. If the user has no profile yet, a placeholder profile ("Your Name",
age 30) is created first, so save the intake before calling it.

The split is a keyword heuristic. Lines that mention avoiding or limiting
something go to not-recommended even when they also mention eating, and
lines with no keyword are dropped. Show the raw text as well when the
split looks wrong. **`classify_recommendation_text`** runs the same split
on any text.

If no Gemini API key is configured, or the request fails, the tool returns
`success: false` with an `error` message. Requests are not retried.

---

## Warnings To Relay

- Users taking blood thinners (e.g. warfarin) are warned:
  "Limit green leafy vegetables if taking blood thinners".
- Allergies are repeated back as "Avoid foods you are allergic to: ...".

These recommendations are general guidance, not a diagnosis. Encourage
users with medical conditions to confirm changes with a health worker.
"#;

/// Service status response
#[derive(Debug, Serialize)]
pub struct NutriCareStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Whether get_ai_recommendation can reach a model
    pub ai_configured: bool,

    /// Process information
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    started_at: DateTime<Utc>,
    database_path: PathBuf,
    ai_configured: bool,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, ai_configured: bool) -> Self {
        Self {
            start_time: Instant::now(),
            started_at: Utc::now(),
            database_path,
            ai_configured,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> NutriCareStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        NutriCareStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            ai_configured: self.ai_configured,
            started_at: self.started_at,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
