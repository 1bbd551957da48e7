use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::enrich::{humanize, species_icon, SPECIES};
use crate::filters::{filter_and_sort_pets, PetQuery, PetSort};
use crate::forms::PetForm;
use crate::loader::Collection;
use crate::models::{Pet, PetId, Reminder, User};
use crate::stats::PetCounts;
use crate::ui::{self, escape, rich_text, Nav};
use crate::views::{short_date, text_area, text_input, weight, ModalState};

pub const TIPS_UNAVAILABLE: &str = "AI care tips unavailable";

static TIP_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s\*\*([^*]+)\*\*:?\s*(.*)$").expect("valid tip heading pattern"));
static TIP_NUMBERING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.").expect("valid tip numbering pattern"));
static TIP_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d.\-*•]+\s*").expect("valid tip bullet pattern"));

#[derive(Debug, Clone, PartialEq)]
pub struct TipSection {
    pub heading: String,
    pub body: String,
}

/// Generated care tips, shaped for display.
#[derive(Debug, Clone, PartialEq)]
pub enum CareTips {
    /// The backend could not generate tips.
    Unavailable,
    /// `1. **Heading**: text` blocks.
    Sections(Vec<TipSection>),
    /// Anything else, one card per non-empty line.
    Cards(Vec<String>),
}

impl CareTips {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == TIPS_UNAVAILABLE {
            return CareTips::Unavailable;
        }

        let mut sections: Vec<TipSection> = Vec::new();
        for line in raw.lines().map(str::trim) {
            if let Some(caps) = TIP_HEADING.captures(line) {
                sections.push(TipSection {
                    heading: caps[1].replace(':', "").trim().to_string(),
                    body: caps[2].trim().to_string(),
                });
            } else if TIP_NUMBERING.is_match(line) {
                continue;
            } else if let Some(section) = sections.last_mut() {
                if !line.is_empty() {
                    if !section.body.is_empty() {
                        section.body.push(' ');
                    }
                    section.body.push_str(line);
                }
            }
        }
        if !sections.is_empty() {
            return CareTips::Sections(sections);
        }

        CareTips::Cards(
            raw.lines()
                .map(|line| TIP_BULLET.replace(line.trim(), "").trim().to_string())
                .filter(|line| !line.is_empty())
                .collect(),
        )
    }

    pub fn render(&self) -> String {
        let items: String = match self {
            CareTips::Unavailable => {
                format!(r#"<div class="tip warning"><span class="num">!</span>{TIPS_UNAVAILABLE}</div>"#)
            }
            CareTips::Sections(sections) => sections
                .iter()
                .map(|section| {
                    format!(
                        r#"<div class="tip"><h4>{}</h4><p>{}</p></div>"#,
                        escape(&section.heading),
                        rich_text(&section.body)
                    )
                })
                .collect(),
            CareTips::Cards(cards) if cards.is_empty() => {
                r#"<div class="tip warning"><span class="num">!</span>No tips available</div>"#.to_string()
            }
            CareTips::Cards(cards) => cards
                .iter()
                .enumerate()
                .map(|(i, card)| {
                    format!(r#"<div class="tip"><span class="num">{}</span>{}</div>"#, i + 1, rich_text(card))
                })
                .collect(),
        };
        format!(r#"<div class="tips">{items}</div>"#)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PetCard {
    pub id: PetId,
    pub name: String,
    pub species: String,
    pub icon: &'static str,
    pub breed: Option<String>,
    pub age: Option<i64>,
    pub weight: Option<f64>,
    pub medical_notes: Option<String>,
    pub counts: Option<PetCounts>,
    pub tips: Option<CareTips>,
}

impl PetCard {
    pub fn new(pet: &Pet) -> Self {
        Self {
            id: pet.id,
            name: pet.name.clone(),
            species: humanize(&pet.species),
            icon: species_icon(&pet.species),
            breed: pet.breed.clone(),
            age: pet.age,
            weight: pet.weight,
            medical_notes: pet.medical_notes.clone(),
            counts: None,
            tips: None,
        }
    }

    pub fn with_counts(mut self, counts: PetCounts) -> Self {
        self.counts = Some(counts);
        self
    }

    pub fn with_tips(mut self, pet: &Pet) -> Self {
        self.tips = pet.ai_care_tips.as_deref().map(CareTips::parse);
        self
    }

    /// `next` is where delete and tip refresh return to.
    pub fn render(&self, next: &str) -> String {
        let mut facts = String::new();
        if let Some(breed) = &self.breed {
            facts.push_str(&format!("<span>{}</span>", escape(breed)));
        }
        if let Some(age) = self.age {
            facts.push_str(&format!("<span>{age} {}</span>", if age == 1 { "year" } else { "years" }));
        }
        if let Some(pounds) = self.weight {
            facts.push_str(&format!("<span>{} lbs</span>", weight(pounds)));
        }
        let notes = self
            .medical_notes
            .as_deref()
            .map(|notes| format!(r#"<p class="meta"><strong>Medical notes:</strong> {}</p>"#, escape(notes)))
            .unwrap_or_default();
        let counts = self
            .counts
            .map(|c| {
                format!(
                    r#"<div class="counts"><span id="activities-{id}"><i class="fas fa-running"></i> {}</span><span id="medications-{id}"><i class="fas fa-pills"></i> {}</span><span id="reminders-{id}"><i class="fas fa-bell"></i> {}</span></div>"#,
                    c.activities,
                    c.medications,
                    c.reminders,
                    id = self.id,
                )
            })
            .unwrap_or_default();
        let tips = self
            .tips
            .as_ref()
            .map(|tips| format!("<h4>AI Care Tips</h4>{}", tips.render()))
            .unwrap_or_default();

        format!(
            r#"<article class="pet-card" data-pet-id="{id}">
  <h3><i class="fas {icon}"></i> {name}</h3>
  <div class="pet-meta"><span>{species}</span>{facts}</div>
  {notes}{counts}{tips}
  <div class="card-actions">
    <a class="btn small ghost" href="/pets-page/{id}">Details</a>
    <form class="inline" method="post" action="/pets/{id}/regenerate-tips"><input type="hidden" name="next" value="{next}" /><button class="small secondary" type="submit"><i class="fas fa-rotate"></i> Refresh AI Tips</button></form>
    <form class="inline" method="post" action="/pets/{id}/delete"><input type="hidden" name="next" value="{next}" /><button class="small danger" type="submit"><i class="fas fa-trash"></i> Delete</button></form>
  </div>
</article>"#,
            id = self.id,
            icon = self.icon,
            name = escape(&self.name),
            species = escape(&self.species),
            next = escape(next),
        )
    }
}

/// The add-pet modal body. `next` is the page the confirmation returns to.
pub fn add_pet_modal(state: &ModalState<PetForm>, next: &str, close_href: &str) -> String {
    let values = &state.values;
    let species = ui::options(
        SPECIES.iter().map(|species| (*species, *species)),
        &values.species.to_lowercase(),
    );
    let body = format!(
        r#"{error}<form class="form-grid" method="post" action="/pets">
  <input type="hidden" name="next" value="{next}" />
  {name}
  <label>Species <select name="species" required><option value="">Select species</option>{species}</select></label>
  <div class="form-row">{breed}{age}</div>
  {weight}
  {notes}
  <button type="submit"><i class="fas fa-plus"></i> Add Pet</button>
</form>"#,
        error = ui::inline_error(state.error.as_deref()),
        next = escape(next),
        name = text_input("Name", "name", "text", &values.name, " required"),
        breed = text_input("Breed", "breed", "text", &values.breed, ""),
        age = text_input("Age (years)", "age", "number", &values.age, r#" min="0""#),
        weight = text_input("Weight (lbs)", "weight", "number", &values.weight, r#" min="0" step="0.1""#),
        notes = text_area("Medical notes", "medical_notes", &values.medical_notes),
    );
    ui::modal("Add New Pet", close_href, &body)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PetsPage {
    pub query: PetQuery,
    pub total: usize,
    pub cards: Vec<PetCard>,
    pub failed: bool,
    pub add_pet: Option<ModalState<PetForm>>,
}

impl PetsPage {
    pub fn build(
        pets: &Collection<Pet>,
        counts: &HashMap<PetId, PetCounts>,
        query: PetQuery,
        add_pet: Option<ModalState<PetForm>>,
    ) -> Self {
        let cards = filter_and_sort_pets(&pets.items, &query)
            .iter()
            .map(|pet| PetCard::new(pet).with_counts(counts.get(&pet.id).copied().unwrap_or_default()))
            .collect();
        Self {
            query,
            total: pets.len(),
            cards,
            failed: pets.failed,
            add_pet,
        }
    }

    fn query_string(&self) -> String {
        format!(
            "search={}&species={}&sort={}",
            ui::encode_component(&self.query.search),
            ui::encode_component(&self.query.species),
            self.query.sort.key()
        )
    }

    pub fn render(&self, user: Option<&User>) -> String {
        let here = format!("/pets-page?{}", self.query_string());
        let header = ui::page_header(
            "My Pets",
            &format!("Showing {} of {} pets", self.cards.len(), self.total),
            &format!(
                r#"<a class="btn" href="{}&amp;modal=add-pet"><i class="fas fa-plus"></i> Add Pet</a>"#,
                escape(&here)
            ),
        );

        let species_choices: Vec<(String, String)> = std::iter::once(("all".to_string(), "All species".to_string()))
            .chain(SPECIES.iter().map(|s| (s.to_string(), humanize(s))))
            .collect();
        let selected_species = if self.query.species.is_empty() { "all" } else { self.query.species.as_str() };
        let controls = format!(
            r#"<form class="controls card" method="get" action="/pets-page">
  <input type="search" name="search" placeholder="Search by name or breed" value="{search}" />
  <select name="species">{species}</select>
  <select name="sort">{sort}</select>
  <button class="secondary" type="submit"><i class="fas fa-filter"></i> Apply</button>
</form>"#,
            search = escape(&self.query.search),
            species = ui::options(
                species_choices.iter().map(|(v, l)| (v.as_str(), l.as_str())),
                selected_species
            ),
            sort = ui::options(PetSort::ALL.iter().map(|s| (s.key(), s.label())), self.query.sort.key()),
        );

        let grid = if self.failed {
            ui::load_error("pets")
        } else if self.total == 0 {
            ui::empty_state(
                "fa-paw",
                "No pets yet. Add your first furry friend!",
                r#"<a class="btn" href="/pets-page?modal=add-pet">Add Pet</a>"#,
            )
        } else if self.cards.is_empty() {
            ui::empty_state("fa-search", "No pets match your search.", "")
        } else {
            let cards: String = self.cards.iter().map(|card| card.render(&here)).collect();
            format!(r#"<section class="grid" id="petsGrid">{cards}</section>"#)
        };

        let modal = self
            .add_pet
            .as_ref()
            .map(|state| add_pet_modal(state, &here, &here))
            .unwrap_or_default();

        ui::app_page("My Pets", Nav::Pets, user, &format!("{header}{controls}{grid}{modal}"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PetDetailsPage {
    pub card: PetCard,
    pub added: String,
    pub tips: Option<CareTips>,
    pub activities: usize,
    pub medications: usize,
    pub upcoming_reminders: usize,
}

impl PetDetailsPage {
    pub fn build(
        pet: &Pet,
        activities: usize,
        medications: usize,
        open_reminders: &[Reminder],
    ) -> Self {
        Self {
            card: PetCard::new(pet),
            added: short_date(pet.created_at),
            tips: pet.ai_care_tips.as_deref().map(CareTips::parse),
            activities,
            medications,
            upcoming_reminders: open_reminders
                .iter()
                .filter(|reminder| reminder.pet_id == Some(pet.id))
                .count(),
        }
    }

    pub fn render(&self, user: Option<&User>) -> String {
        let card = &self.card;
        let here = format!("/pets-page/{}", card.id);
        let mut info = String::new();
        if let Some(breed) = &card.breed {
            info.push_str(&format!("<p><strong>Breed:</strong> {}</p>", escape(breed)));
        }
        if let Some(age) = card.age {
            info.push_str(&format!("<p><strong>Age:</strong> {age} years</p>"));
        }
        if let Some(pounds) = card.weight {
            info.push_str(&format!("<p><strong>Weight:</strong> {} lbs</p>", weight(pounds)));
        }
        info.push_str(&format!("<p><strong>Added:</strong> {}</p>", self.added));
        if let Some(notes) = &card.medical_notes {
            info.push_str(&format!(
                r#"<div class="medical-notes"><strong>Medical Notes:</strong><p>{}</p></div>"#,
                escape(notes)
            ));
        }
        let tips = match &self.tips {
            Some(tips) => tips.render(),
            None => ui::empty_state("fa-lightbulb", "No care tips yet.", ""),
        };

        let body = format!(
            r#"{header}
<section class="card"><h2><i class="fas fa-info-circle"></i> Basic Information</h2>{info}</section>
<section class="card"><h2><i class="fas fa-lightbulb"></i> AI Care Tips</h2>{tips}
  <form method="post" action="/pets/{id}/regenerate-tips"><input type="hidden" name="next" value="{here}" /><button class="secondary" type="submit"><i class="fas fa-rotate"></i> Refresh AI Tips</button></form>
</section>
<section class="grid">
  <div class="stat"><span class="label">Activities Logged</span><span class="value">{activities}</span></div>
  <div class="stat"><span class="label">Active Medications</span><span class="value">{medications}</span></div>
  <div class="stat"><span class="label">Upcoming Reminders</span><span class="value">{reminders}</span></div>
</section>
<div class="card-actions">
  <a class="btn ghost" href="/pets-page">Back to pets</a>
  <form class="inline" method="post" action="/pets/{id}/delete"><input type="hidden" name="next" value="/pets-page" /><button class="danger" type="submit"><i class="fas fa-trash"></i> Delete Pet</button></form>
</div>"#,
            header = ui::page_header(
                &card.name,
                &match &card.breed {
                    Some(breed) => format!("{} • {}", card.species, breed),
                    None => card.species.clone(),
                },
                ""
            ),
            id = card.id,
            activities = self.activities,
            medications = self.medications,
            reminders = self.upcoming_reminders,
        );
        ui::app_page(&card.name, Nav::Pets, user, &body)
    }
}
