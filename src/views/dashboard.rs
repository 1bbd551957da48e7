use chrono::NaiveDateTime;

use crate::enrich::{reminder_icon, DateStatus, PetNames, APPOINTMENT_TYPES, GENERAL};
use crate::filters::sort_by_due_date;
use crate::forms::PetForm;
use crate::loader::Collection;
use crate::models::{Pet, Reminder, User};
use crate::ui::{self, escape, Nav};
use crate::views::appointments::AppointmentCard;
use crate::views::pets::{add_pet_modal, PetCard};
use crate::views::{clock_time, short_date, ModalState};

const DASHBOARD_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ReminderItem {
    pub title: String,
    pub icon: &'static str,
    pub pet_name: String,
    pub when: String,
    pub status: DateStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardPage {
    pub greeting: String,
    pub pets: Vec<PetCard>,
    pub pets_failed: bool,
    pub upcoming: Vec<AppointmentCard>,
    pub reminders: Vec<ReminderItem>,
    pub reminders_failed: bool,
    pub add_pet: Option<ModalState<PetForm>>,
}

impl DashboardPage {
    /// `open_reminders` are every not-yet-completed reminder.
    pub fn build(
        user: Option<&User>,
        pets: &Collection<Pet>,
        open_reminders: &Collection<Reminder>,
        now: NaiveDateTime,
        add_pet: Option<ModalState<PetForm>>,
    ) -> Self {
        let names = PetNames::from_pets(&pets.items);
        let mut sorted = open_reminders.items.clone();
        sort_by_due_date(&mut sorted);

        let upcoming = sorted
            .iter()
            .filter(|r| APPOINTMENT_TYPES.contains(&r.reminder_type.as_str()))
            .filter(|r| DateStatus::classify(r.reminder_date, now) != DateStatus::Overdue)
            .take(DASHBOARD_LIMIT)
            .map(|r| AppointmentCard::new(r, &names, now))
            .collect();
        let reminders = sorted
            .iter()
            .take(DASHBOARD_LIMIT)
            .map(|r| ReminderItem {
                title: r.title.clone(),
                icon: reminder_icon(&r.reminder_type),
                pet_name: names.resolve(r.pet_id, GENERAL).to_string(),
                when: format!("{} {}", short_date(r.reminder_date), clock_time(r.reminder_date)),
                status: DateStatus::classify(r.reminder_date, now),
            })
            .collect();

        let name = user
            .map(|user| {
                if user.first_name.trim().is_empty() {
                    user.username.clone()
                } else {
                    user.first_name.clone()
                }
            })
            .unwrap_or_else(|| "there".to_string());

        Self {
            greeting: format!("Welcome back, {name}!"),
            pets: pets.items.iter().map(|pet| PetCard::new(pet).with_tips(pet)).collect(),
            pets_failed: pets.failed,
            upcoming,
            reminders,
            reminders_failed: open_reminders.failed,
            add_pet,
        }
    }

    pub fn render(&self, user: Option<&User>) -> String {
        let header = ui::page_header(
            &self.greeting,
            "Here's how your pets are doing today.",
            r#"<a class="btn" href="/dashboard?modal=add-pet"><i class="fas fa-plus"></i> Add Pet</a>"#,
        );

        let pets = if self.pets_failed {
            ui::load_error("pets")
        } else if self.pets.is_empty() {
            ui::empty_state("fa-paw", "No pets added yet. Add your first furry friend!", "")
        } else {
            let cards: String = self.pets.iter().map(|card| card.render("/dashboard")).collect();
            format!(r#"<div class="grid" id="petList">{cards}</div>"#)
        };

        let upcoming = if self.reminders_failed {
            ui::load_error("appointments")
        } else if self.upcoming.is_empty() {
            ui::empty_state("fa-calendar-check", "No upcoming appointments.", "")
        } else {
            self.upcoming.iter().map(|card| card.render("/dashboard")).collect()
        };

        let reminders = if self.reminders_failed {
            ui::load_error("reminders")
        } else if self.reminders.is_empty() {
            ui::empty_state("fa-bell-slash", "You're all caught up.", "")
        } else {
            self.reminders
                .iter()
                .map(|item| {
                    format!(
                        r#"<div class="reminder-item"><strong><i class="fas {icon}"></i> {title}</strong><span class="meta"><span>{pet}</span><span>{when}</span><span class="badge {class}">{label}</span></span></div>"#,
                        icon = item.icon,
                        title = escape(&item.title),
                        pet = escape(&item.pet_name),
                        when = item.when,
                        class = item.status.css_class(),
                        label = item.status.label(),
                    )
                })
                .collect()
        };

        let modal = self
            .add_pet
            .as_ref()
            .map(|state| add_pet_modal(state, "/dashboard", "/dashboard"))
            .unwrap_or_default();

        let body = format!(
            r#"{header}
<section class="card"><h2><i class="fas fa-paw"></i> My Pets</h2>{pets}</section>
<section class="grid">
  <div class="card"><h2><i class="fas fa-calendar-alt"></i> Upcoming Appointments</h2><div class="grid">{upcoming}</div><a href="/appointments">View all</a></div>
  <div class="card"><h2><i class="fas fa-bell"></i> Reminders</h2>{reminders}</div>
</section>{modal}"#
        );
        ui::app_page("Dashboard", Nav::Dashboard, user, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::fixtures::{at, pet, reminder};

    #[test]
    fn upcoming_skips_overdue_and_non_appointments() {
        let reminders = Collection::loaded(vec![
            reminder(1, Some(1), "medication", at(11, 9)),
            reminder(2, Some(1), "appointment", at(2, 9)),
            reminder(3, Some(1), "grooming", at(10, 8)),
            reminder(4, Some(2), "vaccination", at(15, 9)),
        ]);
        let pets = Collection::loaded(vec![pet(1, "Rex", "dog")]);
        let page = DashboardPage::build(None, &pets, &reminders, at(10, 12), None);
        let upcoming: Vec<i64> = page.upcoming.iter().map(|c| c.id).collect();
        assert_eq!(upcoming, vec![3, 4]);
        assert_eq!(page.reminders.len(), 4);
        assert_eq!(page.reminders[0].status, DateStatus::Overdue);
        assert_eq!(page.reminders[3].pet_name, GENERAL);
        assert_eq!(page.greeting, "Welcome back, there!");
    }

    #[test]
    fn lists_are_capped_at_five() {
        let reminders = Collection::loaded(
            (1..=8)
                .map(|i| reminder(i, None, "appointment", at(10 + i as u32, 9)))
                .collect(),
        );
        let page = DashboardPage::build(None, &Collection::loaded(vec![]), &reminders, at(10, 12), None);
        assert_eq!(page.upcoming.len(), DASHBOARD_LIMIT);
        assert_eq!(page.reminders.len(), DASHBOARD_LIMIT);
    }

    #[test]
    fn greeting_prefers_first_name() {
        let user = User {
            id: "1".into(),
            first_name: "Sam".into(),
            last_name: String::new(),
            username: "sam99".into(),
            email: String::new(),
        };
        let page = DashboardPage::build(
            Some(&user),
            &Collection::loaded(vec![]),
            &Collection::loaded(vec![]),
            at(10, 12),
            None,
        );
        assert_eq!(page.greeting, "Welcome back, Sam!");
    }
}
