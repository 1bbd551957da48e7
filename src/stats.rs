use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::enrich::humanize;
use crate::models::{Activity, Medication, Pet, PetId, Reminder};

const TREND_DAYS: i64 = 30;
const SENIOR_DOG_AGE: i64 = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryCards {
    pub total_activities: usize,
    pub active_medications: usize,
    pub health_score: u32,
    pub this_week: usize,
}

pub fn summary_at(now: NaiveDateTime, activities: &[Activity], medications: &[Medication]) -> SummaryCards {
    let recent = recent_activity_count(now, activities);
    SummaryCards {
        total_activities: activities.len(),
        active_medications: medications.len(),
        health_score: health_score(recent),
        this_week: recent,
    }
}

/// 50 with nothing logged, +20 per daily-average activity over the last week, capped at 100.
pub fn health_score(recent_activities: usize) -> u32 {
    let score = (recent_activities as f64 / 7.0 * 20.0 + 50.0).round();
    score.min(100.0) as u32
}

fn recent_activity_count(now: NaiveDateTime, activities: &[Activity]) -> usize {
    let since = now - Duration::days(7);
    activities
        .iter()
        .filter(|activity| activity.activity_date >= since)
        .count()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeCount {
    pub label: String,
    pub count: usize,
}

/// Activity counts per type, in order of first appearance.
pub fn type_breakdown(activities: &[Activity]) -> Vec<TypeCount> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for activity in activities {
        match counts.iter_mut().find(|(kind, _)| *kind == activity.activity_type) {
            Some((_, count)) => *count += 1,
            None => counts.push((activity.activity_type.clone(), 1)),
        }
    }
    counts
        .into_iter()
        .map(|(kind, count)| TypeCount {
            label: humanize(&kind),
            count,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub label: String,
    pub count: usize,
}

/// Activities per day for the 30 days ending `today`, oldest first.
pub fn trend_at(today: NaiveDate, activities: &[Activity]) -> Vec<TrendPoint> {
    let mut points = Vec::with_capacity(TREND_DAYS as usize);
    for offset in (0..TREND_DAYS).rev() {
        let date = today - Duration::days(offset);
        let count = activities
            .iter()
            .filter(|activity| activity.activity_date.date() == date)
            .count();
        points.push(TrendPoint {
            date,
            label: date.format("%-m/%-d").to_string(),
            count,
        });
    }
    points
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    Success,
    Warning,
    Info,
}

impl InsightKind {
    pub fn css_class(self) -> &'static str {
        match self {
            InsightKind::Success => "success",
            InsightKind::Warning => "warning",
            InsightKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insight {
    pub kind: InsightKind,
    pub icon: &'static str,
    pub title: String,
    pub message: String,
}

pub fn insights_at(
    now: NaiveDateTime,
    pets: &[Pet],
    activities: &[Activity],
    medications: &[Medication],
) -> Vec<Insight> {
    let mut insights = Vec::new();

    let recent = recent_activity_count(now, activities);
    if recent >= 5 {
        let subject = if pets.len() > 1 { "s are" } else { " is" };
        insights.push(Insight {
            kind: InsightKind::Success,
            icon: "fa-check-circle",
            title: "Great Activity Level!".into(),
            message: format!(
                "{recent} activities logged this week. Your pet{subject} staying active and healthy!"
            ),
        });
    } else if recent == 0 {
        insights.push(Insight {
            kind: InsightKind::Warning,
            icon: "fa-exclamation-triangle",
            title: "Low Activity Alert".into(),
            message: "No activities logged this week. Regular exercise and engagement are important for your pet's health.".into(),
        });
    }

    let ending_soon = medications
        .iter()
        .filter(|medication| {
            medication
                .end_date
                .map(|end| (1..=7).contains(&days_until(now, end)))
                .unwrap_or(false)
        })
        .count();
    if ending_soon > 0 {
        let plural = if ending_soon > 1 { "s" } else { "" };
        insights.push(Insight {
            kind: InsightKind::Warning,
            icon: "fa-pills",
            title: "Medication Ending Soon".into(),
            message: format!(
                "{ending_soon} medication{plural} will end within the next week. Consider scheduling a vet follow-up."
            ),
        });
    }

    for pet in pets {
        let senior = pet.age.is_some_and(|age| age >= SENIOR_DOG_AGE);
        if senior && pet.species.eq_ignore_ascii_case("dog") {
            let age = pet.age.unwrap_or_default();
            insights.push(Insight {
                kind: InsightKind::Info,
                icon: "fa-heartbeat",
                title: format!("Senior Pet Care - {}", pet.name),
                message: format!(
                    "{} is {age} years old. Senior dogs benefit from regular vet checkups every 6 months and joint-supporting activities.",
                    pet.name
                ),
            });
        }
    }

    let walks: Vec<&Activity> = activities
        .iter()
        .filter(|activity| activity.activity_type == "walk")
        .collect();
    if !walks.is_empty() {
        let total: f64 = walks.iter().map(|walk| walk.distance.unwrap_or(0.0)).sum();
        let average = total / walks.len() as f64;
        if average > 0.0 {
            insights.push(Insight {
                kind: InsightKind::Success,
                icon: "fa-walking",
                title: "Regular Exercise".into(),
                message: format!(
                    "Average walk distance: {average:.1} miles. Consistent exercise helps maintain a healthy weight!"
                ),
            });
        }
    }

    if insights.is_empty() {
        insights.push(Insight {
            kind: InsightKind::Info,
            icon: "fa-info-circle",
            title: "Start Tracking".into(),
            message: "Log activities and medications to receive personalized health insights and recommendations.".into(),
        });
    }
    insights
}

/// Whole days until `end`, rounded up.
fn days_until(now: NaiveDateTime, end: NaiveDateTime) -> i64 {
    let seconds = (end - now).num_seconds();
    (seconds as f64 / 86_400.0).ceil() as i64
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PetCounts {
    pub activities: usize,
    pub medications: usize,
    pub reminders: usize,
}

/// Per-pet counts for the pet cards, from one set of collections.
pub fn pet_counts(
    activities: &[Activity],
    medications: &[Medication],
    reminders: &[Reminder],
) -> HashMap<PetId, PetCounts> {
    let mut counts: HashMap<PetId, PetCounts> = HashMap::new();
    for pet_id in activities.iter().filter_map(|a| a.pet_id) {
        counts.entry(pet_id).or_default().activities += 1;
    }
    for pet_id in medications.iter().filter_map(|m| m.pet_id) {
        counts.entry(pet_id).or_default().medications += 1;
    }
    for pet_id in reminders
        .iter()
        .filter(|reminder| !reminder.is_completed)
        .filter_map(|reminder| reminder.pet_id)
    {
        counts.entry(pet_id).or_default().reminders += 1;
    }
    counts
}
