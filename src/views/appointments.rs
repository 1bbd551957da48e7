use chrono::NaiveDateTime;

use crate::enrich::{reminder_icon, reminder_label, DateStatus, PetNames, GENERAL};
use crate::filters::{filter_appointments, sort_by_due_date, AppointmentFilter};
use crate::forms::AppointmentForm;
use crate::loader::Collection;
use crate::models::{Pet, Reminder, User};
use crate::ui::{self, escape, Nav};
use crate::views::{clock_time, long_date, pet_select, text_area, text_input, ModalState};

/// Tabs across the top of the appointments page.
pub const FILTER_TABS: [(&str, &str); 6] = [
    ("all", "All"),
    ("upcoming", "Upcoming"),
    ("overdue", "Overdue"),
    ("appointment", "Vet Visits"),
    ("vaccination", "Vaccinations"),
    ("grooming", "Grooming"),
];

const TYPE_CHOICES: [(&str, &str); 4] = [
    ("appointment", "Vet Visit"),
    ("vaccination", "Vaccination"),
    ("grooming", "Grooming"),
    ("other", "Other"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentCard {
    pub id: i64,
    pub title: String,
    pub icon: &'static str,
    pub type_label: String,
    pub status: DateStatus,
    pub date: String,
    pub time: String,
    pub pet_name: String,
    pub description: Option<String>,
}

impl AppointmentCard {
    pub fn new(reminder: &Reminder, names: &PetNames, now: NaiveDateTime) -> Self {
        Self {
            id: reminder.id,
            title: reminder.title.clone(),
            icon: reminder_icon(&reminder.reminder_type),
            type_label: reminder_label(&reminder.reminder_type),
            status: DateStatus::classify(reminder.reminder_date, now),
            date: long_date(reminder.reminder_date),
            time: clock_time(reminder.reminder_date),
            pet_name: names.resolve(reminder.pet_id, GENERAL).to_string(),
            description: reminder.description.clone(),
        }
    }

    /// `back` is where complete and delete return to.
    pub fn render(&self, back: &str) -> String {
        let description = self
            .description
            .as_deref()
            .map(|text| format!(r#"<p class="description">{}</p>"#, escape(text)))
            .unwrap_or_default();
        format!(
            r#"<article class="appointment-card {status}" data-appointment-id="{id}">
  <h3><i class="fas {icon}"></i> {title} <span class="badge {status}">{label}</span></h3>
  <span class="meta">{type_label}</span>
  <div class="meta"><span><i class="fas fa-calendar"></i> {date}</span><span><i class="fas fa-clock"></i> {time}</span><span><i class="fas fa-paw"></i> {pet}</span></div>
  {description}
  <div class="card-actions">
    <form class="inline" method="post" action="/appointments/{id}/complete"><input type="hidden" name="next" value="{back}" /><button class="small" type="submit"><i class="fas fa-check"></i> Complete</button></form>
    <form class="inline" method="post" action="/appointments/{id}/delete"><input type="hidden" name="next" value="{back}" /><button class="small danger" type="submit"><i class="fas fa-trash"></i> Delete</button></form>
  </div>
</article>"#,
            id = self.id,
            status = self.status.css_class(),
            label = self.status.label(),
            icon = self.icon,
            title = escape(&self.title),
            type_label = escape(&self.type_label),
            date = self.date,
            time = self.time,
            pet = escape(&self.pet_name),
            back = escape(back),
        )
    }
}

pub fn add_appointment_modal(state: &ModalState<AppointmentForm>, pets: &[Pet], close_href: &str) -> String {
    let values = &state.values;
    let kind = if values.reminder_type.is_empty() { "appointment" } else { values.reminder_type.as_str() };
    let body = format!(
        r#"{error}<form class="form-grid" method="post" action="/appointments">
  <label>Pet {pets}</label>
  {title}
  <label>Type <select name="reminder_type">{types}</select></label>
  <div class="form-row">{date}{time}</div>
  {description}
  <button type="submit"><i class="fas fa-calendar-plus"></i> Schedule</button>
</form>"#,
        error = ui::inline_error(state.error.as_deref()),
        pets = pet_select(pets, &values.pet_id),
        title = text_input("Title", "title", "text", &values.title, " required"),
        types = ui::options(TYPE_CHOICES, kind),
        date = text_input("Date", "date", "date", &values.date, " required"),
        time = text_input("Time", "time", "time", &values.time, " required"),
        description = text_area("Description", "description", &values.description),
    );
    ui::modal("Schedule Appointment", close_href, &body)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentsPage {
    pub filter: AppointmentFilter,
    pub cards: Vec<AppointmentCard>,
    pub failed: bool,
    pub pets: Vec<Pet>,
    pub add_appointment: Option<ModalState<AppointmentForm>>,
}

impl AppointmentsPage {
    /// `appointments` are the open appointment-type reminders.
    pub fn build(
        appointments: &Collection<Reminder>,
        pets: &Collection<Pet>,
        filter: AppointmentFilter,
        now: NaiveDateTime,
        add_appointment: Option<ModalState<AppointmentForm>>,
    ) -> Self {
        let names = PetNames::from_pets(&pets.items);
        let mut shown = filter_appointments(&appointments.items, &filter, now);
        sort_by_due_date(&mut shown);
        Self {
            cards: shown.iter().map(|apt| AppointmentCard::new(apt, &names, now)).collect(),
            failed: appointments.failed,
            pets: pets.items.clone(),
            filter,
            add_appointment,
        }
    }

    pub fn render(&self, user: Option<&User>) -> String {
        let here = format!("/appointments?filter={}", ui::encode_component(self.filter.key()));
        let header = ui::page_header(
            "Appointments",
            "Vet visits, vaccinations and grooming",
            &format!(
                r#"<a class="btn" id="addAppointmentBtn" href="{}&amp;modal=add"><i class="fas fa-plus"></i> Add Appointment</a>"#,
                escape(&here)
            ),
        );
        let tabs: String = FILTER_TABS
            .iter()
            .map(|(key, label)| {
                let class = if *key == self.filter.key() { "filter active" } else { "filter" };
                format!(r#"<a class="{class}" href="/appointments?filter={key}">{label}</a>"#)
            })
            .collect();

        let grid = if self.failed {
            ui::load_error("appointments")
        } else if self.cards.is_empty() {
            ui::empty_state("fa-calendar-check", "No appointments scheduled.", "")
        } else {
            let cards: String = self.cards.iter().map(|card| card.render(&here)).collect();
            format!(r#"<section class="grid" id="appointmentsGrid">{cards}</section>"#)
        };

        let modal = self
            .add_appointment
            .as_ref()
            .map(|state| add_appointment_modal(state, &self.pets, &here))
            .unwrap_or_default();

        let body = format!(r#"{header}<nav class="filters">{tabs}</nav>{grid}{modal}"#);
        ui::app_page("Appointments", Nav::Appointments, user, &body)
    }
}
