//! Submitted form fields → backend payloads.
//!
//! Checks here are existence and shape only; the backend's answer is
//! authoritative and is relayed as-is when it refuses a payload.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use thiserror::Error;

use crate::models::{
    Credentials, NewActivity, NewMedication, NewPet, NewReminder, PasswordChange, PetId,
    ProfileUpdate, Registration,
};
use crate::session::{DetailLevel, Preferences};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FormError(pub String);

impl FormError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type FormResult<T> = Result<T, FormError>;

pub fn blank_to_none(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn required(raw: &str, message: &str) -> FormResult<String> {
    blank_to_none(raw).ok_or_else(|| FormError::new(message))
}

pub fn parse_int(raw: &str, field: &str) -> FormResult<Option<i64>> {
    match blank_to_none(raw) {
        None => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| FormError::new(format!("{field} must be a whole number"))),
    }
}

pub fn parse_float(raw: &str, field: &str) -> FormResult<Option<f64>> {
    match blank_to_none(raw) {
        None => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map(Some)
            .ok_or_else(|| FormError::new(format!("{field} must be a number"))),
    }
}

fn parse_pet_id(raw: &str) -> FormResult<PetId> {
    blank_to_none(raw)
        .and_then(|value| value.parse::<PetId>().ok())
        .ok_or_else(|| FormError::new("Please select a pet"))
}

fn parse_date(raw: &str, field: &str) -> FormResult<Option<NaiveDate>> {
    match blank_to_none(raw) {
        None => Ok(None),
        Some(value) => NaiveDate::parse_from_str(&value, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| FormError::new(format!("{field} is not a valid date"))),
    }
}

fn parse_time(raw: &str) -> FormResult<NaiveTime> {
    let value = required(raw, "Please choose a time")?;
    NaiveTime::parse_from_str(&value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&value, "%H:%M:%S"))
        .map_err(|_| FormError::new("Time is not valid"))
}

/// `date` + `time` inputs → one timestamp with seconds zeroed.
fn combine(date: &str, time: &str) -> FormResult<NaiveDateTime> {
    let date = parse_date(date, "Date")?.ok_or_else(|| FormError::new("Please choose a date"))?;
    Ok(date.and_time(parse_time(time)?))
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PetForm {
    pub name: String,
    pub species: String,
    pub breed: String,
    pub age: String,
    pub weight: String,
    pub medical_notes: String,
    /// Page to return to after the confirmation.
    pub next: String,
}

impl PetForm {
    pub fn payload(&self) -> FormResult<NewPet> {
        Ok(NewPet {
            name: required(&self.name, "Please enter your pet's name")?,
            species: required(&self.species, "Please choose a species")?.to_lowercase(),
            breed: blank_to_none(&self.breed),
            age: parse_int(&self.age, "Age")?,
            weight: parse_float(&self.weight, "Weight")?,
            medical_notes: blank_to_none(&self.medical_notes),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppointmentForm {
    pub pet_id: String,
    pub title: String,
    pub reminder_type: String,
    pub date: String,
    pub time: String,
    pub description: String,
}

impl AppointmentForm {
    pub fn payload(&self) -> FormResult<NewReminder> {
        let pet_id = parse_pet_id(&self.pet_id)?;
        Ok(NewReminder {
            pet_id: Some(pet_id),
            title: required(&self.title, "Please enter a title")?,
            reminder_type: blank_to_none(&self.reminder_type).unwrap_or_else(|| "appointment".to_string()),
            reminder_date: combine(&self.date, &self.time)?,
            description: blank_to_none(&self.description),
            is_completed: false,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ActivityForm {
    pub pet_id: String,
    pub date: String,
    pub time: String,
    pub description: String,
}

impl ActivityForm {
    pub fn payload(&self) -> FormResult<NewActivity> {
        Ok(NewActivity {
            pet_id: parse_pet_id(&self.pet_id)?,
            activity_date: combine(&self.date, &self.time)?,
            description: required(&self.description, "Please describe the activity")?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MedicationForm {
    pub pet_id: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub route: String,
    pub reason: String,
    pub prescribing_vet: String,
    pub start_date: String,
    pub end_date: String,
    pub notes: String,
}

impl MedicationForm {
    /// A blank start date means `today`.
    pub fn payload(&self, today: NaiveDate) -> FormResult<NewMedication> {
        let pet_id = parse_pet_id(&self.pet_id)?;
        let start = parse_date(&self.start_date, "Start date")?.unwrap_or(today);
        let end = parse_date(&self.end_date, "End date")?;
        if end.is_some_and(|end| end < start) {
            return Err(FormError::new("End date cannot be before the start date"));
        }
        Ok(NewMedication {
            pet_id,
            name: required(&self.name, "Please enter the medication name")?,
            dosage: required(&self.dosage, "Please enter a dosage")?,
            frequency: required(&self.frequency, "Please enter a frequency")?,
            route: blank_to_none(&self.route),
            reason: blank_to_none(&self.reason),
            prescribing_vet: blank_to_none(&self.prescribing_vet),
            start_date: start.and_time(NaiveTime::MIN),
            end_date: end.map(|end| end.and_time(NaiveTime::MIN)),
            is_active: true,
            notes: blank_to_none(&self.notes),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn payload(&self) -> FormResult<Credentials> {
        Ok(Credentials {
            username: required(&self.username, "Please enter your username or email")?,
            password: if self.password.is_empty() {
                return Err(FormError::new("Please enter your password"));
            } else {
                self.password.clone()
            },
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn payload(&self) -> FormResult<Registration> {
        if self.password != self.confirm_password {
            return Err(FormError::new("Passwords do not match"));
        }
        Ok(Registration {
            first_name: required(&self.first_name, "Please enter your first name")?,
            last_name: required(&self.last_name, "Please enter your last name")?,
            email: required(&self.email, "Please enter your email")?,
            username: required(&self.username, "Please choose a username")?,
            password: if self.password.is_empty() {
                return Err(FormError::new("Please choose a password"));
            } else {
                self.password.clone()
            },
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

impl ProfileForm {
    /// The backend replaces the whole account record, password included, so the
    /// current password is asked for instead of inventing one.
    pub fn payload(&self) -> FormResult<ProfileUpdate> {
        if self.password.is_empty() {
            return Err(FormError::new("Please enter your password to save changes"));
        }
        Ok(ProfileUpdate {
            first_name: required(&self.first_name, "Please enter your first name")?,
            last_name: required(&self.last_name, "Please enter your last name")?,
            email: required(&self.email, "Please enter your email")?,
            username: required(&self.username, "Please choose a username")?,
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordForm {
    pub fn payload(&self) -> FormResult<PasswordChange> {
        if self.new_password != self.confirm_password {
            return Err(FormError::new("New passwords do not match"));
        }
        if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(FormError::new(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(PasswordChange {
            current_password: self.current_password.clone(),
            new_password: self.new_password.clone(),
        })
    }
}

/// Checkboxes are only submitted when ticked.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreferencesForm {
    pub email_notifications: Option<String>,
    pub appointment_reminders: Option<String>,
    pub medication_alerts: Option<String>,
    pub save_chat_history: Option<String>,
    pub include_pet_context: Option<String>,
    pub ai_detail_level: String,
}

impl PreferencesForm {
    pub fn preferences(&self) -> Preferences {
        Preferences {
            email_notifications: self.email_notifications.is_some(),
            appointment_reminders: self.appointment_reminders.is_some(),
            medication_alerts: self.medication_alerts.is_some(),
            save_chat_history: self.save_chat_history.is_some(),
            include_pet_context: self.include_pet_context.is_some(),
            ai_detail_level: DetailLevel::parse(&self.ai_detail_level).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChatForm {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pet_form_coerces_numbers_and_blanks() {
        let form = PetForm {
            name: " Luna ".into(),
            species: "Cat".into(),
            breed: "".into(),
            age: "3".into(),
            weight: "9.5".into(),
            medical_notes: "  ".into(),
            next: String::new(),
        };
        let pet = form.payload().unwrap();
        assert_eq!(pet.name, "Luna");
        assert_eq!(pet.species, "cat");
        assert_eq!(pet.breed, None);
        assert_eq!(pet.age, Some(3));
        assert_eq!(pet.weight, Some(9.5));
        assert_eq!(pet.medical_notes, None);
    }

    #[test]
    fn pet_form_requires_name_and_rejects_bad_numbers() {
        let mut form = PetForm {
            species: "dog".into(),
            ..PetForm::default()
        };
        assert_eq!(form.payload().unwrap_err().0, "Please enter your pet's name");
        form.name = "Rex".into();
        form.age = "three".into();
        assert_eq!(form.payload().unwrap_err().0, "Age must be a whole number");
        form.age.clear();
        form.weight = "NaN".into();
        assert_eq!(form.payload().unwrap_err().0, "Weight must be a number");
    }

    #[test]
    fn appointment_form_combines_date_and_time() {
        let form = AppointmentForm {
            pet_id: "4".into(),
            title: "Checkup".into(),
            reminder_type: "appointment".into(),
            date: "2026-06-01".into(),
            time: "14:30".into(),
            description: "".into(),
        };
        let reminder = form.payload().unwrap();
        assert_eq!(reminder.pet_id, Some(4));
        assert_eq!(
            reminder.reminder_date.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "2026-06-01T14:30:00"
        );
        assert_eq!(reminder.description, None);
        assert!(!reminder.is_completed);
    }

    #[test]
    fn appointment_form_requires_pet_first() {
        let form = AppointmentForm {
            title: "Checkup".into(),
            ..AppointmentForm::default()
        };
        assert_eq!(form.payload().unwrap_err().0, "Please select a pet");
    }

    #[test]
    fn medication_form_defaults_start_and_checks_range() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let mut form = MedicationForm {
            pet_id: "1".into(),
            name: "Apoquel".into(),
            dosage: "16mg".into(),
            frequency: "twice daily".into(),
            ..MedicationForm::default()
        };
        let medication = form.payload(today).unwrap();
        assert_eq!(medication.start_date.date(), today);
        assert_eq!(medication.end_date, None);
        assert!(medication.is_active);

        form.start_date = "2026-02-10".into();
        form.end_date = "2026-02-05".into();
        assert!(form.payload(today).is_err());
    }

    #[test]
    fn password_form_checks_match_then_length() {
        let mut form = PasswordForm {
            current_password: "old".into(),
            new_password: "abc".into(),
            confirm_password: "abd".into(),
        };
        assert_eq!(form.payload().unwrap_err().0, "New passwords do not match");
        form.confirm_password = "abc".into();
        assert_eq!(
            form.payload().unwrap_err().0,
            "Password must be at least 6 characters"
        );
        form.new_password = "abcdef".into();
        form.confirm_password = "abcdef".into();
        assert!(form.payload().is_ok());
    }

    #[test]
    fn register_form_rejects_mismatched_passwords() {
        let form = RegisterForm {
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.c".into(),
            username: "ab".into(),
            password: "secret1".into(),
            confirm_password: "secret2".into(),
        };
        assert_eq!(form.payload().unwrap_err().0, "Passwords do not match");
    }

    #[test]
    fn preferences_form_reads_checkboxes() {
        let form = PreferencesForm {
            email_notifications: Some("on".into()),
            include_pet_context: Some("on".into()),
            ai_detail_level: "brief".into(),
            ..PreferencesForm::default()
        };
        let prefs = form.preferences();
        assert!(prefs.email_notifications);
        assert!(!prefs.appointment_reminders);
        assert!(prefs.include_pet_context);
        assert_eq!(prefs.ai_detail_level, DetailLevel::Brief);
    }
}
