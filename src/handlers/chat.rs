use axum::extract::{Form, State};
use axum::response::{Html, IntoResponse, Redirect};
use tracing::{info, warn};

use crate::errors::{ApiError, AppError};
use crate::forms::ChatForm;
use crate::handlers::PageResult;
use crate::loader;
use crate::models::{ChatRequest, User};
use crate::session::Session;
use crate::state::AppState;
use crate::views::chat::ChatPage;

/// Saved conversations follow the account across logins; otherwise they live
/// and die with the session token.
fn conversation_key(session: &Session, user: Option<&User>) -> String {
    match user {
        Some(user) if session.preferences.save_chat_history => format!("user:{}", user.id),
        _ => token_key(&session.token),
    }
}

pub(crate) fn token_key(token: &str) -> String {
    format!("token:{token}")
}

/// Drops every conversation a signed-out session could have left behind.
pub(crate) async fn forget(state: &AppState, session: &Session, user: Option<&User>) {
    state.chats.clear(&token_key(&session.token)).await;
    if let Some(user) = user {
        state.chats.clear(&format!("user:{}", user.id)).await;
    }
}

pub async fn show(State(state): State<AppState>, session: Session) -> PageResult {
    let (user, pets) = tokio::join!(
        loader::navbar_user(&state.api, &session.token),
        loader::pets(&state.api, &session.token),
    );
    let (user, pets) = (user?, pets?);
    let key = conversation_key(&session, user.as_ref());
    let page = ChatPage {
        conversation: state.chats.snapshot(&key).await,
        pet_count: pets.len(),
        include_pet_context: session.preferences.include_pet_context,
        error: pets.failed.then(|| "Pet details could not be loaded.".to_string()),
    };
    Ok(Html(page.render(user.as_ref())).into_response())
}

pub async fn send(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ChatForm>,
) -> PageResult {
    let question = form.message.trim();
    if question.is_empty() {
        return Ok(Redirect::to("/chat").into_response());
    }

    let include_pets = session.preferences.include_pet_context;
    let (user, pets) = tokio::join!(loader::navbar_user(&state.api, &session.token), async {
        if include_pets {
            loader::pets(&state.api, &session.token).await
        } else {
            Ok(loader::Collection::default())
        }
    });
    let (user, pets) = (user?, pets?);
    let key = conversation_key(&session, user.as_ref());

    let request = ChatRequest {
        message: question.to_string(),
        conversation_history: state.chats.snapshot(&key).await.history(),
        pets: pets.items,
    };
    match state.api.vet_chat(&session.token, &request).await {
        Ok(reply) => {
            info!(chars = reply.response.len(), "vet chat answered");
            state
                .chats
                .update(&key, |conversation| conversation.record_exchange(question, &reply.response))
                .await;
        }
        Err(ApiError::Unauthorized) => return Err(AppError::unauthorized()),
        Err(err) => {
            warn!(error = %err, "vet chat failed");
            state
                .chats
                .update(&key, |conversation| conversation.record_failure(question))
                .await;
        }
    }
    Ok(Redirect::to("/chat").into_response())
}

pub async fn clear(State(state): State<AppState>, session: Session) -> PageResult {
    let user = loader::navbar_user(&state.api, &session.token).await?;
    state.chats.clear(&conversation_key(&session, user.as_ref())).await;
    Ok(Redirect::to("/chat").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Preferences;

    fn session(save_chat_history: bool) -> Session {
        Session {
            token: "abc.def.ghi".into(),
            preferences: Preferences {
                save_chat_history,
                ..Preferences::default()
            },
        }
    }

    fn user() -> User {
        User {
            id: "7".into(),
            first_name: String::new(),
            last_name: String::new(),
            username: "jo".into(),
            email: String::new(),
        }
    }

    #[test]
    fn saved_history_is_keyed_by_account() {
        assert_eq!(conversation_key(&session(true), Some(&user())), "user:7");
        assert_eq!(conversation_key(&session(false), Some(&user())), "token:abc.def.ghi");
        assert_eq!(conversation_key(&session(true), None), "token:abc.def.ghi");

        let uuid = User {
            id: "3f2c7a1e-8b4d-4c55-9a61-0e2f4b7d9c10".into(),
            ..user()
        };
        assert_eq!(
            conversation_key(&session(true), Some(&uuid)),
            "user:3f2c7a1e-8b4d-4c55-9a61-0e2f4b7d9c10"
        );
    }

    #[tokio::test]
    async fn forget_clears_both_keys() {
        let state = AppState::new(crate::config::Config::default());
        let session = session(true);
        for key in ["token:abc.def.ghi", "user:7"] {
            state.chats.update(key, |c| c.record_exchange("hi", "hello")).await;
        }
        forget(&state, &session, Some(&user())).await;
        assert!(state.chats.snapshot("token:abc.def.ghi").await.is_empty());
        assert!(state.chats.snapshot("user:7").await.is_empty());
    }
}
