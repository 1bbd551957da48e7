use crate::forms::RegisterForm;
use crate::ui::{self, escape};
use crate::views::text_input;

/// Banner shown above the login form after a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginNotice {
    Registered,
    AccountDeleted,
}

impl LoginNotice {
    fn message(self) -> &'static str {
        match self {
            LoginNotice::Registered => "Registration successful! Please log in.",
            LoginNotice::AccountDeleted => "Your account has been deleted.",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginPage {
    pub username: String,
    pub notice: Option<LoginNotice>,
    pub error: Option<String>,
}

impl LoginPage {
    pub fn render(&self) -> String {
        let notice = self
            .notice
            .map(|notice| format!(r#"<p class="alert success">{}</p>"#, notice.message()))
            .unwrap_or_default();
        let body = format!(
            r#"<section class="card form-grid">
  <h1><i class="fas fa-heart-pulse"></i> PetWell</h1>
  <p class="subtitle">Log in to care for your pets.</p>
  {notice}{error}
  <form class="form-grid" method="post" action="/login">
    {username}
    <label>Password <input type="password" name="password" required /></label>
    <button type="submit">Login</button>
  </form>
  <p class="hint">New here? <a href="/register">Create an account</a></p>
</section>"#,
            error = ui::inline_error(self.error.as_deref()),
            username = text_input("Username or email", "username", "text", &self.username, " required autofocus"),
        );
        ui::bare_page("Login", &body)
    }
}

/// Passwords are never echoed back into the form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterPage {
    pub form: RegisterForm,
    pub error: Option<String>,
}

impl RegisterPage {
    pub fn render(&self) -> String {
        let f = &self.form;
        let body = format!(
            r#"<section class="card form-grid">
  <h1>Create your account</h1>
  {error}
  <form class="form-grid" method="post" action="/register">
    <div class="form-row">{first}{last}</div>
    {email}
    {username}
    <label>Password <input type="password" name="password" required /></label>
    <label>Confirm password <input type="password" name="confirm_password" required /></label>
    <button type="submit">Register</button>
  </form>
  <p class="hint">Already registered? <a href="/login{login_query}">Log in</a></p>
</section>"#,
            error = ui::inline_error(self.error.as_deref()),
            first = text_input("First name", "first_name", "text", &f.first_name, " required"),
            last = text_input("Last name", "last_name", "text", &f.last_name, " required"),
            email = text_input("Email", "email", "email", &f.email, " required"),
            username = text_input("Username", "username", "text", &f.username, " required"),
            login_query = if f.username.is_empty() {
                String::new()
            } else {
                escape(&format!("?username={}", ui::encode_component(&f.username)))
            },
        );
        ui::bare_page("Register", &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_prefills_username_and_notice() {
        let page = LoginPage {
            username: "sam".into(),
            notice: Some(LoginNotice::AccountDeleted),
            error: None,
        };
        let html = page.render();
        assert!(html.contains(r#"name="username" value="sam""#));
        assert!(html.contains("Your account has been deleted."));
    }

    #[test]
    fn register_keeps_fields_but_not_passwords() {
        let page = RegisterPage {
            form: RegisterForm {
                first_name: "Sam".into(),
                username: "sam".into(),
                password: "hunter22".into(),
                confirm_password: "hunter23".into(),
                ..RegisterForm::default()
            },
            error: Some("Passwords do not match".into()),
        };
        let html = page.render();
        assert!(html.contains(r#"value="Sam""#));
        assert!(!html.contains("hunter22"));
        assert!(html.contains("Passwords do not match"));
    }
}
