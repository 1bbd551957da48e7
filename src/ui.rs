//! Shared page chrome and HTML building blocks.
//!
//! Everything here is plain string building over already-escaped fragments;
//! callers pass raw text through [`escape`] before it reaches markup.

use std::fmt::Write as _;
use std::time::Duration;

use axum::http::StatusCode;
use once_cell::sync::Lazy;
use regex::Regex;
use url::form_urlencoded;

use crate::models::User;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold pattern"));

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escaped text with `**bold**` spans turned into `<strong>`.
pub fn rich_text(raw: &str) -> String {
    BOLD.replace_all(&escape(raw), "<strong>$1</strong>").into_owned()
}

/// Top navigation entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Dashboard,
    Pets,
    Appointments,
    Reports,
    Chat,
    Profile,
    Settings,
}

const NAV_LINKS: [(Nav, &str, &str, &str); 5] = [
    (Nav::Dashboard, "/dashboard", "fa-home", "Dashboard"),
    (Nav::Pets, "/pets-page", "fa-paw", "My Pets"),
    (Nav::Appointments, "/appointments", "fa-calendar-alt", "Appointments"),
    (Nav::Reports, "/reports", "fa-chart-line", "Reports"),
    (Nav::Chat, "/chat", "fa-comments", "Vet Chat"),
];

/// A signed-in page: navbar plus `body`.
pub fn app_page(title: &str, active: Nav, user: Option<&User>, body: &str) -> String {
    let mut html = String::new();
    html.push_str(&navbar(active, user));
    let _ = write!(html, r#"<main class="app">{body}</main>"#);
    document(title, &html)
}

/// A page without the navbar (login, register, confirmations, errors).
pub fn bare_page(title: &str, body: &str) -> String {
    document(title, &format!(r#"<main class="app narrow">{body}</main>"#))
}

fn document(title: &str, body: &str) -> String {
    document_with_head(title, "", body)
}

fn document_with_head(title: &str, head: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  {head}
  <title>{title} - PetWell</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css" />
  <style>{STYLE}</style>
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
    )
}

fn navbar(active: Nav, user: Option<&User>) -> String {
    let links: String = NAV_LINKS
        .iter()
        .map(|(nav, href, icon, label)| {
            let class = if *nav == active { "nav-link active" } else { "nav-link" };
            format!(r#"<a class="{class}" href="{href}"><i class="fas {icon}"></i> {label}</a>"#)
        })
        .collect();

    let (initials, name) = match user {
        Some(user) => (user.initials(), user.username.clone()),
        None => ("U".to_string(), "Account".to_string()),
    };

    format!(
        r#"<nav class="navbar">
  <a class="brand" href="/dashboard"><i class="fas fa-heart-pulse"></i> PetWell</a>
  <div class="nav-links">{links}</div>
  <details class="user-menu">
    <summary><span class="avatar">{initials}</span><span class="username">{name}</span></summary>
    <div class="dropdown">
      <a href="/profile"{profile}><i class="fas fa-user"></i> Profile</a>
      <a href="/settings"{settings}><i class="fas fa-cog"></i> Settings</a>
      <a href="/logout"><i class="fas fa-sign-out-alt"></i> Logout</a>
    </div>
  </details>
</nav>"#,
        initials = escape(&initials),
        name = escape(&name),
        profile = if active == Nav::Profile { r#" class="active""# } else { "" },
        settings = if active == Nav::Settings { r#" class="active""# } else { "" },
    )
}

pub fn render_error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"<section class="card error-card">
  <h1><i class="fas fa-triangle-exclamation"></i> {code}</h1>
  <p>{message}</p>
  <a class="btn" href="/dashboard">Back to dashboard</a>
</section>"#,
        code = status.as_u16(),
        message = escape(message),
    );
    bare_page("Error", &body)
}

/// Success message that reloads `next` once `delay` has passed.
pub fn confirmation_page(message: &str, next: &str, delay: Duration) -> String {
    let refresh = format!(
        r#"<meta http-equiv="refresh" content="{};url={}" />"#,
        delay.as_secs(),
        escape(next)
    );
    let body = format!(
        r#"<main class="app narrow"><section class="card confirm-card">
  <p class="alert success"><i class="fas fa-check-circle"></i> {message}</p>
  <p class="hint">Returning shortly. <a href="{next}">Continue now</a></p>
</section></main>"#,
        message = escape(message),
        next = escape(next),
    );
    document_with_head("Saved", &refresh, &body)
}

pub fn page_header(title: &str, subtitle: &str, actions: &str) -> String {
    format!(
        r#"<header class="page-header"><div><h1>{}</h1><p class="subtitle">{}</p></div><div class="header-actions">{actions}</div></header>"#,
        escape(title),
        escape(subtitle),
    )
}

pub fn empty_state(icon: &str, message: &str, action: &str) -> String {
    format!(
        r#"<div class="empty-state"><i class="fas {icon}"></i><p>{}</p>{action}</div>"#,
        escape(message)
    )
}

pub fn load_error(what: &str) -> String {
    format!(
        r#"<div class="empty-state error-state"><i class="fas fa-exclamation-circle"></i><p>Error loading {}. Please refresh the page.</p></div>"#,
        escape(what)
    )
}

pub fn inline_error(message: Option<&str>) -> String {
    match message {
        Some(message) => format!(r#"<p class="alert error" role="alert">{}</p>"#, escape(message)),
        None => String::new(),
    }
}

/// Modal dialog; closing means navigating to `close_href`.
pub fn modal(title: &str, close_href: &str, body: &str) -> String {
    format!(
        r#"<div class="modal-backdrop"><div class="modal" role="dialog" aria-modal="true">
  <div class="modal-header"><h2>{}</h2><a class="close" href="{}" aria-label="Close">&times;</a></div>
  {body}
</div></div>"#,
        escape(title),
        escape(close_href),
    )
}

/// `<option>` list; values and labels are escaped here.
pub fn options<'a>(items: impl IntoIterator<Item = (&'a str, &'a str)>, selected: &str) -> String {
    items
        .into_iter()
        .map(|(value, label)| {
            let mark = if value == selected { " selected" } else { "" };
            format!(r#"<option value="{}"{mark}>{}</option>"#, escape(value), escape(label))
        })
        .collect()
}

/// Percent-encodes a query value (form encoding, spaces as `+`).
pub fn encode_component(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

pub fn checked(on: bool) -> &'static str {
    if on { " checked" } else { "" }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

fn format_axis_value(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

/// Inline SVG line chart with a zero line, 4 grid ticks and thinned x labels.
pub fn line_chart(points: &[ChartPoint]) -> String {
    const WIDTH: f64 = 600.0;
    const HEIGHT: f64 = 260.0;
    const PAD_X: f64 = 44.0;
    const PAD_Y: f64 = 34.0;
    const TOP: f64 = 24.0;
    const TICKS: usize = 4;

    let open = format!(
        r#"<svg class="chart" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="Activity trend">"#
    );
    if points.is_empty() {
        return format!(
            r#"{open}<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data yet</text></svg>"#
        );
    }

    let mut min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min).min(0.0);
    let mut max = points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max).max(0.0);
    if min == max {
        min -= 1.0;
        max += 1.0;
    }
    let range = max - min;
    let x_step = if points.len() > 1 {
        (WIDTH - PAD_X * 2.0) / (points.len() - 1) as f64
    } else {
        0.0
    };
    let scale_y = (HEIGHT - TOP - PAD_Y) / range;
    let x = |index: usize| PAD_X + index as f64 * x_step;
    let y = |value: f64| HEIGHT - PAD_Y - (value - min) * scale_y;

    let mut svg = open;
    for i in 0..=TICKS {
        let value = min + range * i as f64 / TICKS as f64;
        let y_pos = y(value);
        let _ = write!(
            svg,
            r#"<line class="chart-grid" x1="{PAD_X}" y1="{y_pos:.2}" x2="{}" y2="{y_pos:.2}" /><text class="chart-label" x="{}" y="{:.2}" text-anchor="end">{}</text>"#,
            WIDTH - PAD_X,
            PAD_X - 10.0,
            y_pos + 4.0,
            format_axis_value(value),
        );
    }
    let _ = write!(
        svg,
        r#"<line class="chart-axis" x1="{PAD_X}" y1="{zero:.2}" x2="{}" y2="{zero:.2}" />"#,
        WIDTH - PAD_X,
        zero = y(0.0),
    );

    let path: Vec<String> = points
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{} {:.2} {:.2}", if i == 0 { 'M' } else { 'L' }, x(i), y(p.value)))
        .collect();
    let _ = write!(svg, r#"<path class="chart-line" d="{}" />"#, path.join(" "));

    for (i, p) in points.iter().enumerate() {
        let _ = write!(
            svg,
            r#"<circle class="chart-point" cx="{:.2}" cy="{:.2}" r="4"><title>{}: {}</title></circle>"#,
            x(i),
            y(p.value),
            escape(&p.label),
            format_axis_value(p.value),
        );
    }

    let label_every = (points.len() / 8).max(1);
    for (i, p) in points.iter().enumerate().filter(|(i, _)| i % label_every == 0) {
        let _ = write!(
            svg,
            r#"<text class="chart-label" x="{:.2}" y="{}" text-anchor="middle">{}</text>"#,
            x(i),
            HEIGHT - PAD_Y + 18.0,
            escape(&p.label),
        );
    }
    svg.push_str("</svg>");
    svg
}

const STYLE: &str = r#"
@import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');
:root {
  --bg-1: #f3f7f4;
  --bg-2: #cfe8dc;
  --ink: #24302b;
  --muted: #66736d;
  --accent: #2f9e77;
  --accent-2: #2f4858;
  --danger: #c63b2b;
  --warning: #c9861a;
  --card: rgba(255, 255, 255, 0.92);
  --shadow: 0 18px 44px rgba(47, 72, 88, 0.14);
}
* { box-sizing: border-box; }
body {
  margin: 0;
  min-height: 100vh;
  background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
    linear-gradient(135deg, var(--bg-1), #eaf4ef 60%, #f7faf8 100%);
  color: var(--ink);
  font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
}
h1, h2, h3 { font-family: "Fraunces", "Georgia", serif; font-weight: 600; }
a { color: var(--accent-2); }
.navbar {
  display: flex; align-items: center; gap: 24px; flex-wrap: wrap;
  padding: 14px 28px; background: var(--card); box-shadow: var(--shadow);
}
.brand { font-weight: 600; font-size: 1.2rem; text-decoration: none; color: var(--accent); }
.nav-links { display: flex; gap: 6px; flex: 1; flex-wrap: wrap; }
.nav-link { padding: 8px 14px; border-radius: 999px; text-decoration: none; color: var(--muted); }
.nav-link.active { background: rgba(47, 158, 119, 0.12); color: var(--accent); font-weight: 600; }
.user-menu { position: relative; }
.user-menu summary { list-style: none; display: flex; align-items: center; gap: 10px; cursor: pointer; }
.avatar {
  width: 36px; height: 36px; border-radius: 50%; display: inline-grid; place-items: center;
  background: var(--accent); color: white; font-weight: 600;
}
.dropdown {
  position: absolute; right: 0; top: 46px; min-width: 180px; background: white;
  border-radius: 14px; box-shadow: var(--shadow); display: grid; padding: 8px; z-index: 5;
}
.dropdown a { padding: 10px 12px; border-radius: 10px; text-decoration: none; }
.dropdown a:hover, .dropdown a.active { background: rgba(47, 72, 88, 0.08); }
.app { width: min(1120px, 100%); margin: 0 auto; padding: 32px 18px 48px; display: grid; gap: 24px; animation: rise 500ms ease; }
.app.narrow { width: min(520px, 100%); padding-top: 64px; }
.page-header { display: flex; justify-content: space-between; align-items: flex-end; gap: 16px; flex-wrap: wrap; }
.page-header h1 { margin: 0; font-size: clamp(1.8rem, 3.5vw, 2.4rem); }
.subtitle, .hint { margin: 4px 0 0; color: var(--muted); }
.card { background: var(--card); border-radius: 22px; box-shadow: var(--shadow); padding: 24px; }
.grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(240px, 1fr)); gap: 16px; }
.stat { background: white; border-radius: 18px; padding: 18px; border: 1px solid rgba(47, 72, 88, 0.08); display: grid; gap: 6px; }
.stat .label { font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.12em; color: #8b857d; }
.stat .value { font-size: 1.7rem; font-weight: 600; color: var(--accent-2); }
.btn, button {
  appearance: none; border: none; border-radius: 999px; padding: 10px 18px; font: inherit; font-weight: 600;
  cursor: pointer; display: inline-flex; align-items: center; gap: 8px; text-decoration: none;
  background: var(--accent); color: white;
}
.btn.secondary, button.secondary { background: var(--accent-2); }
.btn.ghost, button.ghost { background: transparent; color: var(--accent-2); border: 1px solid rgba(47, 72, 88, 0.2); }
.btn.danger, button.danger { background: var(--danger); }
.btn.small, button.small { padding: 6px 12px; font-size: 0.85rem; }
form.inline { display: inline; }
.filters { display: flex; gap: 8px; flex-wrap: wrap; }
.filter { padding: 8px 14px; border-radius: 999px; text-decoration: none; color: var(--muted); background: rgba(47, 72, 88, 0.06); }
.filter.active { background: white; color: var(--accent-2); font-weight: 600; box-shadow: 0 8px 16px rgba(47, 72, 88, 0.12); }
.controls { display: flex; gap: 10px; flex-wrap: wrap; align-items: center; }
input, select, textarea {
  font: inherit; padding: 10px 12px; border-radius: 12px; border: 1px solid rgba(47, 72, 88, 0.2); background: white; width: 100%;
}
.controls input, .controls select { width: auto; }
label { display: grid; gap: 6px; font-weight: 500; }
.form-grid { display: grid; gap: 14px; }
.form-row { display: grid; grid-template-columns: 1fr 1fr; gap: 12px; }
.toggle { display: flex; align-items: center; gap: 10px; }
.toggle input { width: auto; }
.alert { padding: 12px 14px; border-radius: 12px; margin: 0; }
.alert.error { background: rgba(198, 59, 43, 0.1); color: var(--danger); }
.alert.success { background: rgba(45, 122, 75, 0.12); color: #2d7a4b; }
.empty-state { text-align: center; color: var(--muted); padding: 32px 12px; display: grid; gap: 8px; justify-items: center; }
.empty-state i { font-size: 2rem; }
.error-state { color: var(--danger); }
.pet-card, .appointment-card, .reminder-item { background: white; border-radius: 18px; padding: 18px; border: 1px solid rgba(47, 72, 88, 0.08); display: grid; gap: 10px; }
.pet-card h3, .appointment-card h3 { margin: 0; }
.pet-meta, .meta { color: var(--muted); font-size: 0.9rem; display: flex; gap: 12px; flex-wrap: wrap; }
.counts { display: flex; gap: 14px; font-size: 0.9rem; color: var(--accent-2); }
.card-actions { display: flex; gap: 8px; flex-wrap: wrap; }
.badge { padding: 4px 10px; border-radius: 999px; font-size: 0.8rem; font-weight: 600; }
.badge.today { background: rgba(201, 134, 26, 0.14); color: var(--warning); }
.badge.overdue { background: rgba(198, 59, 43, 0.12); color: var(--danger); }
.badge.upcoming { background: rgba(47, 158, 119, 0.12); color: var(--accent); }
.appointment-card.overdue { border-left: 4px solid var(--danger); }
.appointment-card.today { border-left: 4px solid var(--warning); }
.tips { display: grid; gap: 12px; }
.tip { background: white; border-radius: 14px; padding: 14px 16px; border: 1px solid rgba(47, 72, 88, 0.08); }
.tip h4 { margin: 0 0 6px; }
.tip .num { display: inline-grid; place-items: center; width: 26px; height: 26px; border-radius: 50%; background: var(--accent); color: white; margin-right: 8px; font-size: 0.85rem; }
.tip.warning { border-left: 4px solid var(--warning); }
.insight { border-radius: 14px; padding: 14px 16px; display: flex; gap: 12px; }
.insight.success { background: rgba(45, 122, 75, 0.1); }
.insight.warning { background: rgba(201, 134, 26, 0.12); }
.insight.info { background: rgba(47, 72, 88, 0.08); }
.insight h4 { margin: 0 0 4px; }
.bar { height: 10px; border-radius: 999px; background: rgba(47, 72, 88, 0.08); overflow: hidden; }
.bar span { display: block; height: 100%; background: var(--accent); }
table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: 10px 8px; border-bottom: 1px solid rgba(47, 72, 88, 0.08); }
th { font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.08em; color: var(--muted); }
.chart { width: 100%; height: 260px; display: block; }
.chart-line { fill: none; stroke: var(--accent); stroke-width: 3; }
.chart-point { fill: white; stroke: var(--accent); stroke-width: 2; }
.chart-grid { stroke: rgba(47, 72, 88, 0.12); }
.chart-axis { stroke: rgba(47, 72, 88, 0.25); stroke-dasharray: 4 6; }
.chart-label { fill: #7a746d; font-size: 11px; }
.modal-backdrop { position: fixed; inset: 0; background: rgba(36, 48, 43, 0.45); display: grid; place-items: center; padding: 18px; z-index: 10; }
.modal { background: white; border-radius: 22px; padding: 24px; width: min(560px, 100%); max-height: 90vh; overflow: auto; display: grid; gap: 14px; }
.modal-header { display: flex; justify-content: space-between; align-items: center; }
.modal-header h2 { margin: 0; }
.close { font-size: 1.6rem; text-decoration: none; color: var(--muted); }
.chat-log { display: grid; gap: 12px; max-height: 60vh; overflow: auto; }
.message { padding: 12px 16px; border-radius: 16px; max-width: 80%; }
.message.user { justify-self: end; background: var(--accent); color: white; }
.message.assistant { justify-self: start; background: white; border: 1px solid rgba(47, 72, 88, 0.08); }
.message p { margin: 0 0 8px; }
.message p:last-child { margin: 0; }
.chat-form { display: flex; gap: 10px; }
.confirm-card, .error-card { text-align: center; display: grid; gap: 12px; }
@keyframes rise { from { opacity: 0; transform: translateY(18px); } to { opacity: 1; transform: translateY(0); } }
@media print { .navbar, .header-actions, .no-print { display: none; } .card { box-shadow: none; } }
@media (max-width: 600px) { .form-row { grid-template-columns: 1fr; } .navbar { padding: 12px 16px; } }
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_and_quotes() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn rich_text_bolds_after_escaping() {
        assert_eq!(rich_text("**Tip** <b>"), "<strong>Tip</strong> &lt;b&gt;");
    }

    #[test]
    fn confirmation_refreshes_after_delay() {
        let html = confirmation_page("Pet added successfully!", "/dashboard", Duration::from_secs(2));
        assert!(html.contains(r#"content="2;url=/dashboard""#));
        assert!(html.contains("Pet added successfully!"));
    }

    #[test]
    fn app_page_marks_active_link_and_user() {
        let user = User {
            id: "1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            username: "ada<".into(),
            email: String::new(),
        };
        let html = app_page("Reports", Nav::Reports, Some(&user), "<p>body</p>");
        assert!(html.contains(r#"<a class="nav-link active" href="/reports">"#));
        assert!(html.contains(r#"<span class="avatar">AL</span>"#));
        assert!(html.contains("ada&lt;"));
        assert!(html.contains("<title>Reports - PetWell</title>"));
    }

    #[test]
    fn encode_component_escapes_reserved() {
        assert_eq!(encode_component("a b&c/é"), "a+b%26c%2F%C3%A9");
        assert_eq!(encode_component("x=1?y#z"), "x%3D1%3Fy%23z");
    }

    #[test]
    fn options_mark_selection() {
        let html = options([("all", "All"), ("dog", "Dog")], "dog");
        assert_eq!(html, r#"<option value="all">All</option><option value="dog" selected>Dog</option>"#);
    }

    #[test]
    fn chart_draws_every_point_and_handles_empty() {
        assert!(line_chart(&[]).contains("No data yet"));
        let points: Vec<ChartPoint> = (0..30)
            .map(|i| ChartPoint {
                label: format!("1/{}", i + 1),
                value: (i % 3) as f64,
            })
            .collect();
        let svg = line_chart(&points);
        assert_eq!(svg.matches("<circle").count(), 30);
        assert!(svg.contains(r#"<path class="chart-line" d="M 44.00"#));
    }

    #[test]
    fn flat_chart_still_has_a_range() {
        let svg = line_chart(&[ChartPoint { label: "a".into(), value: 0.0 }]);
        assert!(svg.contains(">-1<"));
        assert!(svg.contains(">1<"));
    }

    #[test]
    fn axis_values_drop_trailing_zero() {
        assert_eq!(format_axis_value(2.0), "2");
        assert_eq!(format_axis_value(0.25), "0.3");
        assert_eq!(format_axis_value(-0.5), "-0.5");
    }
}
