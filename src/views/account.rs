use crate::forms::ProfileForm;
use crate::loader::Snapshot;
use crate::models::User;
use crate::session::{DetailLevel, Preferences};
use crate::ui::{self, checked, escape, Nav};
use crate::views::{text_input, ModalState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountCounts {
    pub pets: usize,
    pub activities: usize,
    pub medications: usize,
    pub reminders: usize,
}

impl AccountCounts {
    /// Expects a snapshot of active medications and open reminders.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            pets: snapshot.pets.len(),
            activities: snapshot.activities.len(),
            medications: snapshot.medications.len(),
            reminders: snapshot.reminders.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePage {
    pub user: User,
    pub counts: AccountCounts,
    pub edit: ModalState<ProfileForm>,
    pub password_error: Option<String>,
}

impl ProfilePage {
    pub fn new(user: User, counts: AccountCounts) -> Self {
        let edit = ModalState {
            values: ProfileForm {
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                email: user.email.clone(),
                username: user.username.clone(),
                password: String::new(),
            },
            error: None,
        };
        Self {
            user,
            counts,
            edit,
            password_error: None,
        }
    }

    pub fn render(&self) -> String {
        let user = &self.user;
        let c = self.counts;
        let v = &self.edit.values;
        let body = format!(
            r#"{header}
<section class="card profile-summary">
  <h2><span class="avatar">{initials}</span> {name}</h2>
  <p class="meta"><span><i class="fas fa-envelope"></i> {email}</span><span><i class="fas fa-user"></i> {username}</span></p>
</section>
<section class="grid">
  <div class="stat"><span class="label">Pets</span><span class="value" id="petsCount">{pets}</span></div>
  <div class="stat"><span class="label">Activities</span><span class="value" id="activitiesCount">{activities}</span></div>
  <div class="stat"><span class="label">Active Medications</span><span class="value" id="medicationsCount">{medications}</span></div>
  <div class="stat"><span class="label">Open Reminders</span><span class="value" id="remindersCount">{reminders}</span></div>
</section>
<section class="grid">
  <div class="card"><h2>Edit Profile</h2>{edit_error}
    <form class="form-grid" method="post" action="/profile">
      <div class="form-row">{first}{last}</div>
      {email_input}
      {username_input}
      <label>Current password <input type="password" name="password" required /></label>
      <button type="submit"><i class="fas fa-save"></i> Save Changes</button>
    </form>
  </div>
  <div class="card"><h2>Change Password</h2>{password_error}
    <form class="form-grid" method="post" action="/profile/password">
      <label>Current password <input type="password" name="current_password" required /></label>
      <label>New password <input type="password" name="new_password" minlength="6" required /></label>
      <label>Confirm new password <input type="password" name="confirm_password" minlength="6" required /></label>
      <button class="secondary" type="submit"><i class="fas fa-key"></i> Change Password</button>
    </form>
  </div>
</section>"#,
            header = ui::page_header("My Profile", "Your account details", ""),
            initials = escape(&user.initials()),
            name = escape(&user.full_name()),
            email = escape(&user.email),
            username = escape(&user.username),
            pets = c.pets,
            activities = c.activities,
            medications = c.medications,
            reminders = c.reminders,
            edit_error = ui::inline_error(self.edit.error.as_deref()),
            first = text_input("First name", "first_name", "text", &v.first_name, " required"),
            last = text_input("Last name", "last_name", "text", &v.last_name, " required"),
            email_input = text_input("Email", "email", "email", &v.email, " required"),
            username_input = text_input("Username", "username", "text", &v.username, " required"),
            password_error = ui::inline_error(self.password_error.as_deref()),
        );
        ui::app_page("Profile", Nav::Profile, Some(user), &body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingsPage {
    pub preferences: Preferences,
    pub saved: bool,
    /// `Some` while the delete-account confirmation is open.
    pub delete_account: Option<ModalState<()>>,
}

impl SettingsPage {
    pub fn render(&self, user: Option<&User>) -> String {
        let p = &self.preferences;
        let toggle = |name: &str, label: &str, on: bool| {
            format!(r#"<label class="toggle"><input type="checkbox" name="{name}"{} /> {label}</label>"#, checked(on))
        };
        let levels = ui::options(
            DetailLevel::ALL.iter().map(|level| {
                let label = match level {
                    DetailLevel::Brief => "Brief",
                    DetailLevel::Balanced => "Balanced",
                    DetailLevel::Detailed => "Detailed",
                };
                (level.key(), label)
            }),
            p.ai_detail_level.key(),
        );
        let saved = if self.saved {
            r#"<p class="alert success">Settings saved.</p>"#
        } else {
            ""
        };
        let modal = self
            .delete_account
            .as_ref()
            .map(|state| {
                let body = format!(
                    r#"{error}<p><strong>This action cannot be undone!</strong> Deleting your account will permanently remove:</p>
<ul><li>Your profile and account information</li><li>All pet records and health data</li><li>Activity logs and medication records</li><li>Appointments and reminders</li></ul>
<form class="form-grid" method="post" action="/settings/delete-account">
  <label class="toggle"><input type="checkbox" name="confirm" value="yes" required /> I understand, delete my account</label>
  <button class="danger" type="submit"><i class="fas fa-trash"></i> Delete Account</button>
</form>"#,
                    error = ui::inline_error(state.error.as_deref()),
                );
                ui::modal("Delete Account", "/settings", &body)
            })
            .unwrap_or_default();

        let body = format!(
            r#"{header}{saved}
<form class="card form-grid" method="post" action="/settings">
  <h2><i class="fas fa-bell"></i> Notifications</h2>
  {email}{appointments}{medications}
  <h2><i class="fas fa-robot"></i> AI Assistant</h2>
  {history}{context}
  <label>Response detail <select name="ai_detail_level">{levels}</select></label>
  <button type="submit"><i class="fas fa-save"></i> Save Settings</button>
</form>
<section class="card form-grid">
  <h2><i class="fas fa-database"></i> Your Data</h2>
  <p class="hint">Download your pets, activities, medications and reminders as JSON.</p>
  <a class="btn secondary" href="/settings/export"><i class="fas fa-download"></i> Export Data</a>
  <h2><i class="fas fa-triangle-exclamation"></i> Danger Zone</h2>
  <a class="btn danger" href="/settings?modal=delete-account"><i class="fas fa-trash"></i> Delete Account</a>
</section>{modal}"#,
            header = ui::page_header("Settings", "Preferences are stored in this browser", ""),
            email = toggle("email_notifications", "Email notifications", p.email_notifications),
            appointments = toggle("appointment_reminders", "Appointment reminders", p.appointment_reminders),
            medications = toggle("medication_alerts", "Medication alerts", p.medication_alerts),
            history = toggle("save_chat_history", "Save chat history", p.save_chat_history),
            context = toggle("include_pet_context", "Include pet context in chat", p.include_pet_context),
        );
        ui::app_page("Settings", Nav::Settings, user, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "7".into(),
            first_name: "Jo".into(),
            last_name: "March".into(),
            username: "jo".into(),
            email: "jo@example.com".into(),
        }
    }

    #[test]
    fn profile_prefills_edit_form() {
        let counts = AccountCounts {
            pets: 2,
            activities: 5,
            medications: 1,
            reminders: 3,
        };
        let html = ProfilePage::new(user(), counts).render();
        assert!(html.contains(r#"name="email" value="jo@example.com""#));
        assert!(html.contains(r#"<span class="value" id="activitiesCount">5</span>"#));
        assert!(html.contains("Jo March"));
    }

    #[test]
    fn settings_reflect_preferences() {
        let page = SettingsPage {
            preferences: Preferences {
                save_chat_history: true,
                medication_alerts: false,
                ai_detail_level: DetailLevel::Detailed,
                ..Preferences::default()
            },
            saved: true,
            delete_account: None,
        };
        let html = page.render(None);
        assert!(html.contains(r#"name="save_chat_history" checked"#));
        assert!(html.contains(r#"name="medication_alerts" />"#));
        assert!(html.contains(r#"<option value="detailed" selected>Detailed</option>"#));
        assert!(html.contains("Settings saved."));
        assert!(!html.contains("/settings/delete-account"));
    }
}
