//! Dysphoria-trigger rules. Exclusions and soft filters both resolve
//! through the trigger's config entry; soft filters are consumed later by
//! the scoring step, never at exclusion time.

use super::{ActionSpec, Condition, SafetyRule};
use crate::models::profile::DysphoriaTrigger;
use crate::models::safety::{RuleCategory, Severity};

macro_rules! dysphoria_rule {
    ($id:literal, $trigger:expr, $message:literal) => {
        SafetyRule {
            id: $id,
            category: RuleCategory::Dysphoria,
            severity: Severity::Moderate,
            condition: Condition::DysphoriaTriggerActive($trigger),
            action: ActionSpec::ApplyDysphoriaConfig($trigger),
            message: $message,
        }
    };
}

pub static RULES: &[SafetyRule] = &[
    dysphoria_rule!(
        "dysphoria_looking_at_chest",
        DysphoriaTrigger::LookingAtChest,
        "Chest-focused movements are deprioritized in favor of equivalents"
    ),
    dysphoria_rule!(
        "dysphoria_mirrors",
        DysphoriaTrigger::Mirrors,
        "Exercises that need a mirror are excluded"
    ),
    dysphoria_rule!(
        "dysphoria_body_contact",
        DysphoriaTrigger::BodyContact,
        "Partner-contact exercises are excluded"
    ),
    dysphoria_rule!(
        "dysphoria_crowded_spaces",
        DysphoriaTrigger::CrowdedSpaces,
        "Home-friendly movements are preferred over busy gym floors"
    ),
    dysphoria_rule!(
        "dysphoria_tight_clothing",
        DysphoriaTrigger::TightClothing,
        "Movements comfortable in loose clothing are preferred"
    ),
    dysphoria_rule!(
        "dysphoria_photos",
        DysphoriaTrigger::Photos,
        "Settings where photos are likely are deprioritized"
    ),
    dysphoria_rule!(
        "dysphoria_swimming",
        DysphoriaTrigger::Swimming,
        "Swimwear-dependent exercises are excluded"
    ),
    dysphoria_rule!(
        "dysphoria_form_focused",
        DysphoriaTrigger::FormFocused,
        "Highly form-focused movements are deprioritized"
    ),
];
