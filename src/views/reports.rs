use chrono::NaiveDateTime;

use crate::enrich::{PetNames, UNKNOWN};
use crate::filters::PetFilter;
use crate::forms::{ActivityForm, MedicationForm};
use crate::loader::Collection;
use crate::models::{Activity, Medication, Pet, User};
use crate::stats::{insights_at, summary_at, trend_at, type_breakdown, Insight, SummaryCards, TypeCount};
use crate::ui::{self, escape, ChartPoint, Nav};
use crate::views::{pet_select, short_date, text_area, text_input, ModalState};

const RECENT_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum ReportsModal {
    LogActivity(ModalState<ActivityForm>),
    AddMedication(ModalState<MedicationForm>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRow {
    pub pet_name: String,
    pub kind: String,
    pub title: String,
    pub duration: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MedicationRow {
    pub pet_name: String,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub started: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportsPage {
    pub filter: PetFilter,
    pub pets: Vec<Pet>,
    pub summary: SummaryCards,
    pub breakdown: Vec<TypeCount>,
    pub trend: Vec<ChartPoint>,
    pub insights: Vec<Insight>,
    pub activities: Vec<ActivityRow>,
    pub medications: Vec<MedicationRow>,
    pub activities_failed: bool,
    pub medications_failed: bool,
    pub modal: Option<ReportsModal>,
}

impl ReportsPage {
    /// `medications` are the active ones only.
    pub fn build(
        pets: &Collection<Pet>,
        activities: &Collection<Activity>,
        medications: &Collection<Medication>,
        filter: PetFilter,
        now: NaiveDateTime,
        modal: Option<ReportsModal>,
    ) -> Self {
        let names = PetNames::from_pets(&pets.items);
        let scoped_pets = filter.pets(&pets.items);
        let mut scoped_activities = filter.activities(&activities.items);
        let scoped_medications = filter.medications(&medications.items);
        scoped_activities.sort_by(|a, b| b.activity_date.cmp(&a.activity_date));

        let trend = trend_at(now.date(), &scoped_activities)
            .into_iter()
            .map(|point| ChartPoint {
                label: point.label,
                value: point.count as f64,
            })
            .collect();

        Self {
            summary: summary_at(now, &scoped_activities, &scoped_medications),
            breakdown: type_breakdown(&scoped_activities),
            insights: insights_at(now, &scoped_pets, &scoped_activities, &scoped_medications),
            trend,
            activities: scoped_activities
                .iter()
                .take(RECENT_ROWS)
                .map(|activity| ActivityRow {
                    pet_name: names.resolve(activity.pet_id, UNKNOWN).to_string(),
                    kind: activity.activity_type.replace('_', " "),
                    title: activity.title.clone(),
                    duration: activity
                        .duration
                        .map(|minutes| format!("{minutes} min"))
                        .unwrap_or_else(|| "-".to_string()),
                    date: short_date(activity.activity_date),
                })
                .collect(),
            medications: scoped_medications
                .iter()
                .map(|medication| MedicationRow {
                    pet_name: names.resolve(medication.pet_id, UNKNOWN).to_string(),
                    name: medication.name.clone(),
                    dosage: medication.dosage.clone(),
                    frequency: medication.frequency.clone(),
                    started: short_date(medication.start_date),
                })
                .collect(),
            activities_failed: activities.failed,
            medications_failed: medications.failed,
            pets: pets.items.clone(),
            filter,
            modal,
        }
    }

    fn filter_key(&self) -> String {
        match self.filter {
            PetFilter::All => "all".to_string(),
            PetFilter::Only(id) => id.to_string(),
        }
    }

    pub fn render(&self, user: Option<&User>) -> String {
        let here = format!("/reports?pet={}", self.filter_key());
        let header = ui::page_header(
            "Health Reports",
            "Activity, medications and insights at a glance",
            &format!(
                r#"<a class="btn secondary" href="{h}&amp;modal=activity"><i class="fas fa-running"></i> Log Activity</a>
<a class="btn secondary" href="{h}&amp;modal=medication"><i class="fas fa-pills"></i> Add Medication</a>
<button class="ghost" type="button" onclick="window.print()"><i class="fas fa-print"></i> Print</button>"#,
                h = escape(&here)
            ),
        );

        let ids: Vec<String> = self.pets.iter().map(|pet| pet.id.to_string()).collect();
        let choices = std::iter::once(("all", "All pets"))
            .chain(ids.iter().zip(&self.pets).map(|(id, pet)| (id.as_str(), pet.name.as_str())));
        let selector = format!(
            r#"<form class="controls no-print" method="get" action="/reports"><select name="pet">{}</select><button class="secondary" type="submit">Show</button></form>"#,
            ui::options(choices, &self.filter_key())
        );

        let s = &self.summary;
        let cards = format!(
            r#"<section class="grid">
  <div class="stat"><span class="label">Total Activities</span><span class="value" id="totalActivities">{}</span></div>
  <div class="stat"><span class="label">Active Medications</span><span class="value" id="activeMedications">{}</span></div>
  <div class="stat"><span class="label">Health Score</span><span class="value" id="healthScore">{}%</span></div>
  <div class="stat"><span class="label">This Week</span><span class="value" id="thisWeek">{}</span></div>
</section>"#,
            s.total_activities, s.active_medications, s.health_score, s.this_week
        );

        let breakdown = if self.breakdown.is_empty() {
            ui::empty_state("fa-chart-pie", "No activities logged yet.", "")
        } else {
            let total: usize = self.breakdown.iter().map(|t| t.count).sum();
            self.breakdown
                .iter()
                .map(|t| {
                    let percent = t.count as f64 / total as f64 * 100.0;
                    format!(
                        r#"<div class="breakdown-row"><span>{} ({})</span><div class="bar"><span style="width: {percent:.0}%"></span></div></div>"#,
                        escape(&t.label),
                        t.count
                    )
                })
                .collect()
        };

        let insights: String = self
            .insights
            .iter()
            .map(|insight| {
                format!(
                    r#"<div class="insight {}"><i class="fas {}"></i><div><h4>{}</h4><p>{}</p></div></div>"#,
                    insight.kind.css_class(),
                    insight.icon,
                    escape(&insight.title),
                    escape(&insight.message)
                )
            })
            .collect();

        let activity_rows = if self.activities_failed {
            table_message(5, "Error loading activities")
        } else if self.activities.is_empty() {
            table_message(5, "No activities found")
        } else {
            self.activities
                .iter()
                .map(|row| {
                    format!(
                        "<tr><td><strong>{}</strong></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                        escape(&row.pet_name),
                        escape(&row.kind),
                        escape(&row.title),
                        row.duration,
                        row.date
                    )
                })
                .collect()
        };
        let medication_rows = if self.medications_failed {
            table_message(5, "Error loading medications")
        } else if self.medications.is_empty() {
            table_message(5, "No active medications")
        } else {
            self.medications
                .iter()
                .map(|row| {
                    format!(
                        "<tr><td><strong>{}</strong></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                        escape(&row.pet_name),
                        escape(&row.name),
                        escape(&row.dosage),
                        escape(&row.frequency),
                        row.started
                    )
                })
                .collect()
        };

        let modal = match &self.modal {
            Some(ReportsModal::LogActivity(state)) => activity_modal(state, &self.pets, &here),
            Some(ReportsModal::AddMedication(state)) => medication_modal(state, &self.pets, &here),
            None => String::new(),
        };

        let body = format!(
            r#"{header}{selector}{cards}
<section class="grid">
  <div class="card"><h2>Activity Breakdown</h2>{breakdown}</div>
  <div class="card"><h2>Health Insights</h2>{insights}</div>
</section>
<section class="card"><h2>30-Day Activity Trend</h2>{chart}</section>
<section class="card"><h2>Recent Activities</h2><table id="activitiesTable"><thead><tr><th>Pet</th><th>Type</th><th>Title</th><th>Duration</th><th>Date</th></tr></thead><tbody>{activity_rows}</tbody></table></section>
<section class="card"><h2>Active Medications</h2><table id="medicationsTable"><thead><tr><th>Pet</th><th>Medication</th><th>Dosage</th><th>Frequency</th><th>Started</th></tr></thead><tbody>{medication_rows}</tbody></table></section>
{modal}"#,
            chart = ui::line_chart(&self.trend),
        );
        ui::app_page("Reports", Nav::Reports, user, &body)
    }
}

fn table_message(columns: usize, message: &str) -> String {
    format!(
        r#"<tr><td colspan="{columns}" class="empty-state"><i class="fas fa-inbox"></i> {}</td></tr>"#,
        escape(message)
    )
}

fn activity_modal(state: &ModalState<ActivityForm>, pets: &[Pet], close_href: &str) -> String {
    let values = &state.values;
    let body = format!(
        r#"{error}<form class="form-grid" method="post" action="/activities">
  <label>Pet {pets}</label>
  <div class="form-row">{date}{time}</div>
  {description}
  <p class="hint">Describe what happened, e.g. "45 minute walk in the park, about 2 miles".</p>
  <button type="submit"><i class="fas fa-plus"></i> Log Activity</button>
</form>"#,
        error = ui::inline_error(state.error.as_deref()),
        pets = pet_select(pets, &values.pet_id),
        date = text_input("Date", "date", "date", &values.date, " required"),
        time = text_input("Time", "time", "time", &values.time, " required"),
        description = text_area("Description", "description", &values.description),
    );
    ui::modal("Log Activity", close_href, &body)
}

fn medication_modal(state: &ModalState<MedicationForm>, pets: &[Pet], close_href: &str) -> String {
    let v = &state.values;
    let body = format!(
        r#"{error}<form class="form-grid" method="post" action="/medications">
  <label>Pet {pets}</label>
  {name}
  <div class="form-row">{dosage}{frequency}</div>
  <div class="form-row">{route}{reason}</div>
  {vet}
  <div class="form-row">{start}{end}</div>
  {notes}
  <button type="submit"><i class="fas fa-plus"></i> Add Medication</button>
</form>"#,
        error = ui::inline_error(state.error.as_deref()),
        pets = pet_select(pets, &v.pet_id),
        name = text_input("Medication name", "name", "text", &v.name, " required"),
        dosage = text_input("Dosage", "dosage", "text", &v.dosage, " required"),
        frequency = text_input("Frequency", "frequency", "text", &v.frequency, " required"),
        route = text_input("Route", "route", "text", &v.route, ""),
        reason = text_input("Reason", "reason", "text", &v.reason, ""),
        vet = text_input("Prescribing vet", "prescribing_vet", "text", &v.prescribing_vet, ""),
        start = text_input("Start date", "start_date", "date", &v.start_date, ""),
        end = text_input("End date", "end_date", "date", &v.end_date, ""),
        notes = text_area("Notes", "notes", &v.notes),
    );
    ui::modal("Add Medication", close_href, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::fixtures::{activity, at, medication, pet};

    fn page(filter: PetFilter) -> ReportsPage {
        let pets = Collection::loaded(vec![pet(1, "Rex", "dog"), pet(2, "Tom", "cat")]);
        let activities = Collection::loaded(vec![
            activity(1, Some(1), "walk", at(9, 8)),
            activity(2, Some(2), "play", at(8, 8)),
            activity(3, Some(7), "vet_visit", at(10, 8)),
        ]);
        let medications = Collection::loaded(vec![medication(1, Some(2), "Apoquel")]);
        ReportsPage::build(&pets, &activities, &medications, filter, at(10, 12), None)
    }

    #[test]
    fn rows_are_newest_first_with_unknown_fallback() {
        let page = page(PetFilter::All);
        let pets: Vec<&str> = page.activities.iter().map(|r| r.pet_name.as_str()).collect();
        assert_eq!(pets, vec![UNKNOWN, "Rex", "Tom"]);
        assert_eq!(page.activities[0].kind, "vet visit");
        assert_eq!(page.activities[0].duration, "-");
        assert_eq!(page.summary.total_activities, 3);
        assert_eq!(page.trend.len(), 30);
        assert_eq!(page.trend.last().map(|p| p.value), Some(1.0));
    }

    #[test]
    fn pet_filter_scopes_everything() {
        let page = page(PetFilter::Only(2));
        assert_eq!(page.summary.total_activities, 1);
        assert_eq!(page.summary.active_medications, 1);
        assert_eq!(page.medications[0].pet_name, "Tom");
        let html = page.render(None);
        assert!(html.contains(r#"<option value="2" selected>Tom</option>"#));
        assert!(html.contains("Apoquel"));
    }

    #[test]
    fn failed_tables_say_so() {
        let page = ReportsPage::build(
            &Collection::loaded(vec![]),
            &Collection::failed(),
            &Collection::loaded(vec![]),
            PetFilter::All,
            at(10, 12),
            Some(ReportsModal::LogActivity(ModalState::blank())),
        );
        let html = page.render(None);
        assert!(html.contains("Error loading activities"));
        assert!(html.contains("No active medications"));
        assert!(html.contains(r#"action="/activities""#));
    }
}
