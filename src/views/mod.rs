//! Page view models.
//!
//! Each page module builds a plain struct from loaded collections (pure and
//! unit-tested) and turns it into HTML with a `render` method.

pub mod account;
pub mod appointments;
pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod pets;
pub mod reports;

use chrono::NaiveDateTime;

use crate::models::Pet;
use crate::ui::{escape, options};

/// An open modal: the values to show and, after a failed submit, why.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModalState<F> {
    pub values: F,
    pub error: Option<String>,
}

impl<F: Default> ModalState<F> {
    pub fn blank() -> Self {
        Self::default()
    }
}

impl<F> ModalState<F> {
    pub fn failed(values: F, error: impl Into<String>) -> Self {
        Self {
            values,
            error: Some(error.into()),
        }
    }
}

/// `Tuesday, March 3, 2026`
pub fn long_date(date: NaiveDateTime) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// `2:30 PM`
pub fn clock_time(date: NaiveDateTime) -> String {
    date.format("%-I:%M %p").to_string()
}

/// `3/3/2026`
pub fn short_date(date: NaiveDateTime) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// `<select name="pet_id">` choices with a leading placeholder.
pub fn pet_select(pets: &[Pet], selected: &str) -> String {
    let ids: Vec<String> = pets.iter().map(|pet| pet.id.to_string()).collect();
    let choices = ids
        .iter()
        .zip(pets)
        .map(|(id, pet)| (id.as_str(), pet.name.as_str()));
    format!(
        r#"<select name="pet_id" required><option value="">Select a pet</option>{}</select>"#,
        options(choices, selected)
    )
}

/// Text input carrying a kept value.
pub fn text_input(label: &str, name: &str, kind: &str, value: &str, extra: &str) -> String {
    format!(
        r#"<label>{} <input type="{kind}" name="{name}" value="{}"{extra} /></label>"#,
        escape(label),
        escape(value),
    )
}

pub fn text_area(label: &str, name: &str, value: &str) -> String {
    format!(
        r#"<label>{} <textarea name="{name}" rows="3">{}</textarea></label>"#,
        escape(label),
        escape(value),
    )
}

pub fn weight(pounds: f64) -> String {
    let text = format!("{pounds:.1}");
    text.strip_suffix(".0").map(str::to_string).unwrap_or(text)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::models::{Activity, Medication, Pet, PetId, Reminder};

    pub fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    pub fn pet(id: PetId, name: &str, species: &str) -> Pet {
        Pet {
            id,
            name: name.into(),
            species: species.into(),
            breed: None,
            sex: None,
            birthday: None,
            age: None,
            weight: None,
            medical_notes: None,
            ai_care_tips: None,
            created_at: at(1, 9),
            updated_at: None,
        }
    }

    pub fn reminder(id: i64, pet_id: Option<PetId>, kind: &str, date: NaiveDateTime) -> Reminder {
        Reminder {
            id,
            pet_id,
            title: format!("Reminder {id}"),
            reminder_type: kind.into(),
            reminder_date: date,
            description: None,
            is_completed: false,
        }
    }

    pub fn activity(id: i64, pet_id: Option<PetId>, kind: &str, date: NaiveDateTime) -> Activity {
        Activity {
            id,
            pet_id,
            activity_type: kind.into(),
            title: format!("Activity {id}"),
            activity_date: date,
            duration: None,
            distance: None,
            description: None,
            notes: None,
        }
    }

    pub fn medication(id: i64, pet_id: Option<PetId>, name: &str) -> Medication {
        Medication {
            id,
            pet_id,
            name: name.into(),
            dosage: "10mg".into(),
            frequency: "daily".into(),
            route: None,
            reason: None,
            prescribing_vet: None,
            start_date: at(1, 0),
            end_date: None,
            is_active: true,
            notes: None,
        }
    }
}
