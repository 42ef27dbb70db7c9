//! Rule-based recommendation engine
//!
//! Maps an intake [`Profile`] to a [`RecommendationBundle`] through a fixed
//! sequence of rule blocks. Each block only appends; nothing is deduplicated.

use crate::models::{DietaryPreference, Gender, Profile, RecommendationBundle};

/// Staples recommended to everyone, suited to rural Indian diets
pub const BASELINE_FOODS: [&str; 5] = [
    "Green leafy vegetables (Spinach, Fenugreek leaves)",
    "Lentils (Dal - Moong, Masoor, Chana)",
    "Seasonal fruits (Banana, Papaya, Guava)",
    "Whole grains (Brown rice, Wheat, Millets)",
    "Nuts and seeds (Groundnuts, Sesame seeds)",
];

/// Ages strictly above this get the older-adult block
pub const OLDER_ADULT_AGE: u32 = 50;

const OLDER_ADULT_SUPPLEMENTS: [&str; 3] = ["Calcium", "Vitamin D", "Vitamin B12"];
const OLDER_ADULT_FOODS: [&str; 2] = ["Milk and dairy products", "Fish (if non-vegetarian)"];

const FEMALE_SUPPLEMENTS: [&str; 2] = ["Iron", "Folic Acid"];
const FEMALE_FOODS: [&str; 1] = ["Iron-rich foods (Jaggery, Dates)"];

const PLANT_PROTEIN_FOODS: [&str; 3] = ["Protein-rich legumes", "Quinoa", "Tofu"];
const VEGAN_SUPPLEMENTS: [&str; 1] = ["Vitamin B12"];

const BLOOD_THINNER: &str = "warfarin";
pub const BLOOD_THINNER_WARNING: &str = "Limit green leafy vegetables if taking blood thinners";
pub const ALLERGY_WARNING_PREFIX: &str = "Avoid foods you are allergic to: ";

/// Recommendations attached to one catalog condition
struct ConditionRule {
    /// Lowercase condition name as matched against the intake
    name: &'static str,
    foods: &'static [&'static str],
    avoid: &'static [&'static str],
    supplements: &'static [&'static str],
    explanation_key: &'static str,
    explanation: &'static str,
}

static CONDITION_RULES: [ConditionRule; 4] = [
    ConditionRule {
        name: "diabetes",
        foods: &["Bitter gourd", "Fenugreek seeds", "Cinnamon"],
        avoid: &["White rice", "Sugar", "Refined flour"],
        supplements: &[],
        explanation_key: "diabetes",
        explanation: "These foods help control blood sugar levels",
    },
    ConditionRule {
        name: "high blood pressure",
        foods: &["Garlic", "Onions", "Low-sodium foods"],
        avoid: &["Salt", "Pickles", "Processed foods"],
        supplements: &[],
        explanation_key: "bp",
        explanation: "Low sodium diet helps manage blood pressure",
    },
    ConditionRule {
        name: "high cholesterol",
        foods: &["Oats", "Barley", "Flax seeds"],
        avoid: &["Fried foods", "Ghee", "Butter"],
        supplements: &[],
        explanation_key: "cholesterol",
        explanation: "Fiber-rich foods help reduce cholesterol",
    },
    ConditionRule {
        name: "anemia",
        foods: &["Spinach", "Pomegranate", "Beetroot"],
        avoid: &[],
        supplements: &["Iron"],
        explanation_key: "anemia",
        explanation: "Iron-rich foods help increase hemoglobin",
    },
];

fn condition_rule(condition: &str) -> Option<&'static ConditionRule> {
    let condition = condition.trim().to_lowercase();
    CONDITION_RULES.iter().find(|rule| rule.name == condition)
}

fn push_all(list: &mut Vec<String>, items: &[&str]) {
    list.extend(items.iter().map(|item| item.to_string()));
}

fn explain(bundle: &mut RecommendationBundle, key: &str, sentence: &str) {
    bundle.explanations.insert(key.to_string(), sentence.to_string());
}

/// Derive the recommendation bundle for an intake profile
pub fn generate(profile: &Profile) -> RecommendationBundle {
    let mut bundle = RecommendationBundle::default();

    push_all(&mut bundle.recommended_foods, &BASELINE_FOODS);

    // An absent or unparseable age never crosses the threshold
    if profile.age.is_some_and(|age| age > OLDER_ADULT_AGE) {
        push_all(&mut bundle.supplements, &OLDER_ADULT_SUPPLEMENTS);
        push_all(&mut bundle.recommended_foods, &OLDER_ADULT_FOODS);
        explain(&mut bundle, "calcium", "Essential for bone health in older adults");
    }

    if profile.gender == Gender::Female {
        push_all(&mut bundle.supplements, &FEMALE_SUPPLEMENTS);
        push_all(&mut bundle.recommended_foods, &FEMALE_FOODS);
        explain(&mut bundle, "iron", "Important for women to prevent anemia");
    }

    for rule in profile.health_conditions.iter().filter_map(|c| condition_rule(c)) {
        push_all(&mut bundle.recommended_foods, rule.foods);
        push_all(&mut bundle.foods_to_avoid, rule.avoid);
        push_all(&mut bundle.supplements, rule.supplements);
        explain(&mut bundle, rule.explanation_key, rule.explanation);
    }

    if profile.dietary_preference.is_plant_based() {
        push_all(&mut bundle.recommended_foods, &PLANT_PROTEIN_FOODS);
        if profile.dietary_preference == DietaryPreference::Vegan {
            push_all(&mut bundle.supplements, &VEGAN_SUPPLEMENTS);
            explain(&mut bundle, "b12", "Vegans need B12 supplementation");
        }
    }

    if profile.medications.to_lowercase().contains(BLOOD_THINNER) {
        bundle.warnings.push(BLOOD_THINNER_WARNING.to_string());
    }

    // Echoed verbatim; escaping is up to whoever renders it
    if !profile.allergies.is_empty() {
        bundle
            .warnings
            .push(format!("{}{}", ALLERGY_WARNING_PREFIX, profile.allergies));
    }

    bundle
}
