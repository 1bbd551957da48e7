//! Read-side loading for pages.
//!
//! A failed read becomes an empty [`Collection`] flagged `failed`, so a page can still
//! render with an error placeholder. An expired session is the one failure that
//! propagates, since it has to redirect.

use tracing::warn;

use crate::api::{ActivityQuery, ApiClient, ApiResult, MedicationQuery, ReminderQuery};
use crate::errors::ApiError;
use crate::models::{Activity, Medication, Pet, Reminder, User};

#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    pub items: Vec<T>,
    pub failed: bool,
}

impl<T> Collection<T> {
    pub fn loaded(items: Vec<T>) -> Self {
        Self { items, failed: false }
    }

    pub fn failed() -> Self {
        Self {
            items: Vec::new(),
            failed: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self::loaded(Vec::new())
    }
}

/// Turns one read into a collection, keeping only auth failures as errors.
pub fn settle<T>(resource: &str, result: ApiResult<Vec<T>>) -> ApiResult<Collection<T>> {
    match result {
        Ok(items) => Ok(Collection::loaded(items)),
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized),
        Err(err) => {
            warn!(resource, error = %err, "read failed; treating as empty");
            Ok(Collection::failed())
        }
    }
}

pub async fn pets(api: &ApiClient, token: &str) -> ApiResult<Collection<Pet>> {
    settle("pets", api.list_pets(token).await)
}

pub async fn activities(
    api: &ApiClient,
    token: &str,
    query: &ActivityQuery,
) -> ApiResult<Collection<Activity>> {
    settle("activities", api.list_activities(token, query).await)
}

pub async fn medications(
    api: &ApiClient,
    token: &str,
    query: &MedicationQuery,
) -> ApiResult<Collection<Medication>> {
    settle("medications", api.list_medications(token, query).await)
}

pub async fn reminders(
    api: &ApiClient,
    token: &str,
    query: &ReminderQuery,
) -> ApiResult<Collection<Reminder>> {
    settle("reminders", api.list_reminders(token, query).await)
}

/// The navbar degrades to a generic avatar when the profile can't be read.
pub async fn navbar_user(api: &ApiClient, token: &str) -> ApiResult<Option<User>> {
    match api.current_user(token).await {
        Ok(user) => Ok(Some(user)),
        Err(ApiError::Unauthorized) => Err(ApiError::Unauthorized),
        Err(err) => {
            warn!(error = %err, "failed to load current user");
            Ok(None)
        }
    }
}

/// The backend pages activity and medication lists at 100 unless asked for more.
pub const ACCOUNT_LIMIT: u32 = 1000;

#[derive(Debug, Clone, Default)]
pub struct SnapshotQuery {
    pub activities: ActivityQuery,
    pub medications: MedicationQuery,
    pub reminders: ReminderQuery,
}

impl SnapshotQuery {
    /// Every record of the account rather than the backend's first page.
    pub fn whole_account() -> Self {
        Self {
            activities: ActivityQuery {
                limit: Some(ACCOUNT_LIMIT),
                ..ActivityQuery::default()
            },
            medications: MedicationQuery {
                limit: Some(ACCOUNT_LIMIT),
                ..MedicationQuery::default()
            },
            reminders: ReminderQuery::default(),
        }
    }
}

/// All four collections of the signed-in user, fetched side by side.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub pets: Collection<Pet>,
    pub activities: Collection<Activity>,
    pub medications: Collection<Medication>,
    pub reminders: Collection<Reminder>,
}

pub async fn snapshot(api: &ApiClient, token: &str, query: &SnapshotQuery) -> ApiResult<Snapshot> {
    let (pets, activities, medications, reminders) = tokio::join!(
        pets(api, token),
        activities(api, token, &query.activities),
        medications(api, token, &query.medications),
        reminders(api, token, &query.reminders),
    );
    Ok(Snapshot {
        pets: pets?,
        activities: activities?,
        medications: medications?,
        reminders: reminders?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn settle_turns_rejections_into_failed_empty_collections() {
        let result: ApiResult<Vec<Pet>> = Err(ApiError::Rejected {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".into(),
        });
        let collection = settle("pets", result).unwrap();
        assert!(collection.failed);
        assert!(collection.is_empty());
    }

    #[test]
    fn settle_propagates_expired_sessions() {
        let result: ApiResult<Vec<Pet>> = Err(ApiError::Unauthorized);
        assert!(matches!(settle("pets", result), Err(ApiError::Unauthorized)));
    }

    #[test]
    fn settle_keeps_loaded_items() {
        let collection = settle("numbers", Ok(vec![1, 2, 3])).unwrap();
        assert!(!collection.failed);
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn whole_account_snapshot_asks_past_the_first_page() {
        let query = SnapshotQuery::whole_account();
        assert_eq!(query.activities.limit, Some(ACCOUNT_LIMIT));
        assert_eq!(query.medications.limit, Some(ACCOUNT_LIMIT));
        assert_eq!(query.activities.pet_id, None);
        assert_eq!(query.reminders.completed, None);
        assert_eq!(SnapshotQuery::default().activities.limit, None);
    }
}
