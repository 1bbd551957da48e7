//! In-memory joins and fixed classification tables.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::models::{Pet, PetId};

/// Shown for reminders with no (or an unknown) pet.
pub const GENERAL: &str = "General";
/// Shown in activity and medication tables for an unknown pet.
pub const UNKNOWN: &str = "Unknown";

/// Reminder types that appear on the appointments page.
pub const APPOINTMENT_TYPES: [&str; 3] = ["appointment", "vaccination", "grooming"];

/// Pet id → name lookup built from one loaded pet list.
#[derive(Debug, Clone, Default)]
pub struct PetNames(HashMap<PetId, String>);

impl PetNames {
    pub fn from_pets(pets: &[Pet]) -> Self {
        Self(pets.iter().map(|pet| (pet.id, pet.name.clone())).collect())
    }

    /// The mapped name, or `fallback` for an absent or dangling id.
    pub fn resolve<'a>(&'a self, pet_id: Option<PetId>, fallback: &'a str) -> &'a str {
        pet_id
            .and_then(|id| self.0.get(&id))
            .map(String::as_str)
            .unwrap_or(fallback)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStatus {
    Today,
    Overdue,
    Upcoming,
}

impl DateStatus {
    /// Same calendar day wins over elapsed time: 08:00 seen at 17:00 is still today.
    pub fn classify(date: NaiveDateTime, now: NaiveDateTime) -> Self {
        if date.date() == now.date() {
            DateStatus::Today
        } else if date < now {
            DateStatus::Overdue
        } else {
            DateStatus::Upcoming
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            DateStatus::Today => "today",
            DateStatus::Overdue => "overdue",
            DateStatus::Upcoming => "upcoming",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DateStatus::Today => "Today",
            DateStatus::Overdue => "Overdue",
            DateStatus::Upcoming => "Upcoming",
        }
    }
}

pub fn reminder_icon(reminder_type: &str) -> &'static str {
    match reminder_type {
        "appointment" => "fa-stethoscope",
        "vaccination" => "fa-syringe",
        "grooming" => "fa-cut",
        "medication" => "fa-pills",
        _ => "fa-calendar",
    }
}

/// Display label; unmapped types are shown as sent.
pub fn reminder_label(reminder_type: &str) -> String {
    match reminder_type {
        "appointment" => "Vet Visit",
        "vaccination" => "Vaccination",
        "grooming" => "Grooming",
        "medication" => "Medication",
        "other" => "Other",
        other => return other.to_string(),
    }
    .to_string()
}

pub fn species_icon(species: &str) -> &'static str {
    match species.trim().to_lowercase().as_str() {
        "dog" => "fa-dog",
        "cat" => "fa-cat",
        "bird" => "fa-dove",
        "fish" => "fa-fish",
        "rabbit" => "fa-carrot",
        "hamster" | "guinea pig" => "fa-otter",
        "reptile" => "fa-dragon",
        _ => "fa-paw",
    }
}

pub const SPECIES: [&str; 9] = [
    "dog",
    "cat",
    "bird",
    "fish",
    "rabbit",
    "hamster",
    "guinea pig",
    "reptile",
    "other",
];

/// `walk` → `Walk`, `vet_visit` → `Vet visit`.
pub fn humanize(raw: &str) -> String {
    let spaced = raw.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn pet(id: PetId, name: &str) -> Pet {
        Pet {
            id,
            name: name.into(),
            species: "dog".into(),
            breed: None,
            sex: None,
            birthday: None,
            age: None,
            weight: None,
            medical_notes: None,
            ai_care_tips: None,
            created_at: at(1, 0),
            updated_at: None,
        }
    }

    #[test]
    fn resolve_uses_fallback_for_missing_and_dangling_ids() {
        let names = PetNames::from_pets(&[pet(1, "Max"), pet(2, "Luna")]);
        assert_eq!(names.resolve(Some(2), GENERAL), "Luna");
        assert_eq!(names.resolve(Some(99), GENERAL), GENERAL);
        assert_eq!(names.resolve(None, UNKNOWN), UNKNOWN);
        assert_eq!(PetNames::default().resolve(Some(1), UNKNOWN), UNKNOWN);
    }

    #[test]
    fn classify_truncates_to_calendar_day() {
        let now = at(10, 17);
        assert_eq!(DateStatus::classify(at(10, 8), now), DateStatus::Today);
        assert_eq!(DateStatus::classify(at(10, 23), now), DateStatus::Today);
        assert_eq!(DateStatus::classify(at(9, 23), now), DateStatus::Overdue);
        assert_eq!(DateStatus::classify(at(11, 0), now), DateStatus::Upcoming);
    }

    #[test]
    fn reminder_tables_have_defaults() {
        assert_eq!(reminder_icon("grooming"), "fa-cut");
        assert_eq!(reminder_icon("party"), "fa-calendar");
        assert_eq!(reminder_label("appointment"), "Vet Visit");
        assert_eq!(reminder_label("party"), "party");
    }

    #[test]
    fn species_icon_is_case_insensitive() {
        assert_eq!(species_icon("Dog"), "fa-dog");
        assert_eq!(species_icon("Guinea Pig"), "fa-otter");
        assert_eq!(species_icon("axolotl"), "fa-paw");
    }

    #[test]
    fn humanize_replaces_underscores() {
        assert_eq!(humanize("vet_visit"), "Vet visit");
        assert_eq!(humanize(""), "");
    }
}
