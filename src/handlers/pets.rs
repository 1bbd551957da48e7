use axum::extract::{Form, Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect};
use reqwest::Url;
use serde::Deserialize;
use tracing::info;

use crate::api::{ActivityQuery, MedicationQuery, ReminderQuery};
use crate::errors::AppError;
use crate::filters::{PetQuery, PetSort};
use crate::forms::PetForm;
use crate::handlers::{confirm, dashboard, form_failure, inline_message, safe_next, PageResult, ReturnTo};
use crate::loader::{self, SnapshotQuery};
use crate::models::PetId;
use crate::session::Session;
use crate::state::AppState;
use crate::stats::pet_counts;
use crate::views::pets::{PetDetailsPage, PetsPage};
use crate::views::ModalState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PetsPageQuery {
    pub search: String,
    pub species: String,
    pub sort: String,
    pub modal: Option<String>,
}

impl PetsPageQuery {
    fn pet_query(&self) -> PetQuery {
        PetQuery {
            search: self.search.clone(),
            species: self.species.clone(),
            sort: PetSort::parse(&self.sort),
        }
    }
}

/// Recovers the search state from a `/pets-page?...` return path.
fn pet_query_from_path(path: &str) -> PetQuery {
    let mut query = PetQuery::default();
    let Ok(url) = Url::parse(&format!("http://petwell.local{path}")) else {
        return query;
    };
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "search" => query.search = value.into_owned(),
            "species" => query.species = value.into_owned(),
            "sort" => query.sort = PetSort::parse(&value),
            _ => {}
        }
    }
    query
}

pub async fn list(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<PetsPageQuery>,
) -> PageResult {
    let add_pet = (query.modal.as_deref() == Some("add-pet")).then(ModalState::blank);
    Ok(Html(render_list(&state, &session, query.pet_query(), add_pet).await?).into_response())
}

async fn render_list(
    state: &AppState,
    session: &Session,
    query: PetQuery,
    add_pet: Option<ModalState<PetForm>>,
) -> Result<String, AppError> {
    let snapshot_query = SnapshotQuery {
        reminders: ReminderQuery {
            completed: Some(false),
        },
        ..SnapshotQuery::whole_account()
    };
    let (user, snapshot) = tokio::join!(
        loader::navbar_user(&state.api, &session.token),
        loader::snapshot(&state.api, &session.token, &snapshot_query),
    );
    let (user, snapshot) = (user?, snapshot?);
    let counts = pet_counts(
        &snapshot.activities.items,
        &snapshot.medications.items,
        &snapshot.reminders.items,
    );
    let page = PetsPage::build(&snapshot.pets, &counts, query, add_pet);
    Ok(page.render(user.as_ref()))
}

pub async fn details(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<PetId>,
) -> PageResult {
    let token = &session.token;
    let activities = ActivityQuery {
        pet_id: Some(id),
        ..ActivityQuery::default()
    };
    let medications = MedicationQuery {
        pet_id: Some(id),
        ..MedicationQuery::default()
    };
    let open = ReminderQuery {
        completed: Some(false),
    };
    let (user, pet, activities, medications, reminders) = tokio::join!(
        loader::navbar_user(&state.api, token),
        state.api.get_pet(token, id),
        loader::activities(&state.api, token, &activities),
        loader::medications(&state.api, token, &medications),
        loader::reminders(&state.api, token, &open),
    );
    let pet = pet.map_err(|err| {
        if err.is_not_found() {
            AppError::not_found("Pet not found")
        } else {
            err.into()
        }
    })?;
    let page = PetDetailsPage::build(&pet, activities?.len(), medications?.len(), &reminders?.items);
    Ok(Html(page.render(user?.as_ref())).into_response())
}

pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PetForm>,
) -> PageResult {
    let next = safe_next(&form.next, "/pets-page");
    let failure = match form.payload() {
        Ok(pet) => match state.api.create_pet(&session.token, &pet).await {
            Ok(created) => {
                info!(pet_id = created.id, "pet created");
                return Ok(confirm(&state, "Pet added successfully!", &next));
            }
            Err(err) => inline_message(err)?,
        },
        Err(invalid) => invalid.to_string(),
    };

    let modal = Some(ModalState::failed(form, failure));
    let html = if next.starts_with("/dashboard") {
        dashboard::render(&state, &session, modal).await?
    } else {
        render_list(&state, &session, pet_query_from_path(&next), modal).await?
    };
    Ok(form_failure(html))
}

pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<PetId>,
    Form(back): Form<ReturnTo>,
) -> PageResult {
    state.api.delete_pet(&session.token, id).await?;
    info!(pet_id = id, "pet deleted");
    Ok(Redirect::to(&safe_next(&back.next, "/pets-page")).into_response())
}

pub async fn regenerate_tips(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<PetId>,
    Form(back): Form<ReturnTo>,
) -> PageResult {
    state.api.regenerate_tips(&session.token, id).await?;
    let next = safe_next(&back.next, &format!("/pets-page/{id}"));
    Ok(confirm(&state, "Care tips refreshed!", &next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pet_query_survives_return_path() {
        let query = pet_query_from_path("/pets-page?search=golden+re&species=dog&sort=age&modal=add-pet");
        assert_eq!(query.search, "golden re");
        assert_eq!(query.species, "dog");
        assert_eq!(query.sort, PetSort::Age);
        assert_eq!(pet_query_from_path("/pets-page"), PetQuery::default());
    }
}
