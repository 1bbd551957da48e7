//! Pure filter and sort functions over loaded collections.

use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::enrich::APPOINTMENT_TYPES;
use crate::models::{Activity, Medication, Pet, PetId, Reminder};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppointmentFilter {
    #[default]
    All,
    Upcoming,
    Overdue,
    Type(String),
}

impl AppointmentFilter {
    pub fn parse(key: &str) -> Self {
        match key.trim() {
            "" | "all" => AppointmentFilter::All,
            "upcoming" => AppointmentFilter::Upcoming,
            "overdue" => AppointmentFilter::Overdue,
            other => AppointmentFilter::Type(other.to_string()),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            AppointmentFilter::All => "all",
            AppointmentFilter::Upcoming => "upcoming",
            AppointmentFilter::Overdue => "overdue",
            AppointmentFilter::Type(kind) => kind,
        }
    }
}

/// Open reminders whose type belongs on the appointments page.
pub fn appointments_only(reminders: Vec<Reminder>) -> Vec<Reminder> {
    reminders
        .into_iter()
        .filter(|reminder| APPOINTMENT_TYPES.contains(&reminder.reminder_type.as_str()))
        .collect()
}

pub fn filter_appointments(
    appointments: &[Reminder],
    filter: &AppointmentFilter,
    now: NaiveDateTime,
) -> Vec<Reminder> {
    appointments
        .iter()
        .filter(|apt| match filter {
            AppointmentFilter::All => true,
            AppointmentFilter::Upcoming => apt.reminder_date > now,
            AppointmentFilter::Overdue => {
                apt.reminder_date < now && apt.reminder_date.date() != now.date()
            }
            AppointmentFilter::Type(kind) => apt.reminder_type == *kind,
        })
        .cloned()
        .collect()
}

/// Stable ascending sort by due date.
pub fn sort_by_due_date(reminders: &mut [Reminder]) {
    reminders.sort_by_key(|reminder| reminder.reminder_date);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PetSort {
    #[default]
    Name,
    Age,
    Newest,
    Oldest,
}

impl PetSort {
    /// Unknown keys sort by name.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "age" => PetSort::Age,
            "newest" => PetSort::Newest,
            "oldest" => PetSort::Oldest,
            _ => PetSort::Name,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            PetSort::Name => "name",
            PetSort::Age => "age",
            PetSort::Newest => "newest",
            PetSort::Oldest => "oldest",
        }
    }

    pub const ALL: [PetSort; 4] = [PetSort::Name, PetSort::Age, PetSort::Newest, PetSort::Oldest];

    pub fn label(self) -> &'static str {
        match self {
            PetSort::Name => "Name",
            PetSort::Age => "Age (oldest first)",
            PetSort::Newest => "Newest",
            PetSort::Oldest => "Oldest",
        }
    }
}

/// Search box, species dropdown and sort order of the pets page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PetQuery {
    pub search: String,
    pub species: String,
    pub sort: PetSort,
}

impl PetQuery {
    fn species_matches(&self, pet: &Pet) -> bool {
        let wanted = self.species.trim();
        wanted.is_empty() || wanted == "all" || pet.species.eq_ignore_ascii_case(wanted)
    }

    fn search_matches(&self, pet: &Pet) -> bool {
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || pet.name.to_lowercase().contains(&needle)
            || pet
                .breed
                .as_deref()
                .is_some_and(|breed| breed.to_lowercase().contains(&needle))
    }
}

pub fn filter_and_sort_pets(pets: &[Pet], query: &PetQuery) -> Vec<Pet> {
    let mut filtered: Vec<Pet> = pets
        .iter()
        .filter(|pet| query.search_matches(pet) && query.species_matches(pet))
        .cloned()
        .collect();

    filtered.sort_by(|a, b| match query.sort {
        PetSort::Name => compare_names(&a.name, &b.name),
        PetSort::Age => b.age.unwrap_or(0).cmp(&a.age.unwrap_or(0)),
        PetSort::Newest => b.created_at.cmp(&a.created_at),
        PetSort::Oldest => a.created_at.cmp(&b.created_at),
    });
    filtered
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Reports-page selector: every pet, or a single pet id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PetFilter {
    #[default]
    All,
    Only(PetId),
}

impl PetFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.trim().parse::<PetId>().ok())
            .map(PetFilter::Only)
            .unwrap_or(PetFilter::All)
    }

    pub fn admits(self, pet_id: Option<PetId>) -> bool {
        match self {
            PetFilter::All => true,
            PetFilter::Only(id) => pet_id == Some(id),
        }
    }

    pub fn pets(self, pets: &[Pet]) -> Vec<Pet> {
        pets.iter().filter(|pet| self.admits(Some(pet.id))).cloned().collect()
    }

    pub fn activities(self, activities: &[Activity]) -> Vec<Activity> {
        activities
            .iter()
            .filter(|activity| self.admits(activity.pet_id))
            .cloned()
            .collect()
    }

    pub fn medications(self, medications: &[Medication]) -> Vec<Medication> {
        medications
            .iter()
            .filter(|medication| self.admits(medication.pet_id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn reminder(id: i64, kind: &str, offset_hours: i64) -> Reminder {
        Reminder {
            id,
            pet_id: None,
            title: format!("r{id}"),
            reminder_type: kind.into(),
            reminder_date: now() + Duration::hours(offset_hours),
            description: None,
            is_completed: false,
        }
    }

    fn pet(id: PetId, name: &str, species: &str, age: Option<i64>, created_day: u32) -> Pet {
        Pet {
            id,
            name: name.into(),
            species: species.into(),
            breed: None,
            sex: None,
            birthday: None,
            age,
            weight: None,
            medical_notes: None,
            ai_care_tips: None,
            created_at: NaiveDate::from_ymd_opt(2026, 1, created_day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            updated_at: None,
        }
    }

    fn ids(reminders: &[Reminder]) -> Vec<i64> {
        reminders.iter().map(|r| r.id).collect()
    }

    #[test]
    fn overdue_excludes_earlier_today() {
        let list = vec![
            reminder(1, "appointment", -48),
            reminder(2, "appointment", -3),
            reminder(3, "grooming", 5),
            reminder(4, "vaccination", 72),
        ];
        let overdue = filter_appointments(&list, &AppointmentFilter::Overdue, now());
        assert_eq!(ids(&overdue), vec![1]);
        for apt in &overdue {
            assert!(apt.reminder_date < now());
            assert_ne!(apt.reminder_date.date(), now().date());
        }
    }

    #[test]
    fn upcoming_is_strictly_later_including_later_today() {
        let list = vec![reminder(1, "appointment", -1), reminder(2, "grooming", 5)];
        let upcoming = filter_appointments(&list, &AppointmentFilter::Upcoming, now());
        assert_eq!(ids(&upcoming), vec![2]);
    }

    #[test]
    fn unknown_keys_match_type_exactly() {
        let list = vec![reminder(1, "grooming", 1), reminder(2, "vaccination", 1)];
        let filter = AppointmentFilter::parse("grooming");
        assert_eq!(filter, AppointmentFilter::Type("grooming".into()));
        assert_eq!(ids(&filter_appointments(&list, &filter, now())), vec![1]);
        assert_eq!(AppointmentFilter::parse(""), AppointmentFilter::All);
    }

    #[test]
    fn appointments_only_drops_medication_and_other() {
        let list = vec![
            reminder(1, "medication", 1),
            reminder(2, "appointment", 1),
            reminder(3, "other", 1),
            reminder(4, "grooming", 1),
        ];
        assert_eq!(ids(&appointments_only(list)), vec![2, 4]);
    }

    #[test]
    fn due_date_sort_is_non_decreasing_and_stable() {
        let mut list = vec![
            reminder(1, "appointment", 10),
            reminder(2, "appointment", -5),
            reminder(3, "appointment", 10),
            reminder(4, "appointment", 0),
        ];
        sort_by_due_date(&mut list);
        assert_eq!(ids(&list), vec![2, 4, 1, 3]);
        assert!(list.windows(2).all(|w| w[0].reminder_date <= w[1].reminder_date));
    }

    #[test]
    fn pets_filter_by_search_and_species() {
        let mut luna = pet(1, "Luna", "cat", Some(3), 1);
        luna.breed = Some("Siamese".into());
        let pets = vec![luna, pet(2, "Max", "dog", Some(9), 2), pet(3, "lucky", "Dog", None, 3)];

        let query = PetQuery {
            search: "SIAM".into(),
            ..PetQuery::default()
        };
        assert_eq!(filter_and_sort_pets(&pets, &query)[0].id, 1);

        let query = PetQuery {
            species: "dog".into(),
            ..PetQuery::default()
        };
        let names: Vec<_> = filter_and_sort_pets(&pets, &query)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["lucky", "Max"]);
    }

    #[test]
    fn pet_sorts() {
        let pets = vec![
            pet(1, "Bella", "dog", Some(2), 5),
            pet(2, "apollo", "cat", None, 1),
            pet(3, "Coco", "bird", Some(7), 9),
        ];
        let by = |sort| {
            filter_and_sort_pets(&pets, &PetQuery { sort, ..PetQuery::default() })
                .into_iter()
                .map(|p| p.id)
                .collect::<Vec<_>>()
        };
        assert_eq!(by(PetSort::Name), vec![2, 1, 3]);
        assert_eq!(by(PetSort::Age), vec![3, 1, 2]);
        assert_eq!(by(PetSort::Newest), vec![3, 1, 2]);
        assert_eq!(by(PetSort::Oldest), vec![2, 1, 3]);
    }

    #[test]
    fn pet_sort_parse_falls_back_to_name() {
        assert_eq!(PetSort::parse("newest"), PetSort::Newest);
        assert_eq!(PetSort::parse("shoe size"), PetSort::Name);
        for sort in PetSort::ALL {
            assert_eq!(PetSort::parse(sort.key()), sort);
        }
    }

    #[test]
    fn pet_filter_parse_and_admit() {
        assert_eq!(PetFilter::parse(Some("all")), PetFilter::All);
        assert_eq!(PetFilter::parse(None), PetFilter::All);
        assert_eq!(PetFilter::parse(Some("4")), PetFilter::Only(4));
        assert!(PetFilter::Only(4).admits(Some(4)));
        assert!(!PetFilter::Only(4).admits(None));
        assert!(PetFilter::All.admits(None));
    }
}
