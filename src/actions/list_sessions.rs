use crate::pagination::{PageRequest, Paginated};
use crate::repository::SessionRepository;
use crate::session::{SessionStore, SessionView};
use crate::{AuthError, ObjectId};

/// A user's own sessions, least recently active first.
pub struct ListSessionsAction<S: SessionRepository> {
    sessions: SessionStore<S>,
}

impl<S: SessionRepository> ListSessionsAction<S> {
    pub fn new(sessions: SessionStore<S>) -> Self {
        Self { sessions }
    }

    /// `SessionNotFound` when the user has no sessions at all.
    pub async fn execute(
        &self,
        user_id: ObjectId,
        page: PageRequest,
    ) -> Result<Paginated<SessionView>, AuthError> {
        self.sessions.list_by_user(user_id, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::Fixture;

    #[tokio::test]
    async fn test_list_sessions_pages() {
        let fx = Fixture::new();
        let user_id = ObjectId::new();
        let store = fx.session_store();
        for _ in 0..3 {
            store.create("ip", user_id, "ua").await.unwrap();
        }
        store.create("ip", ObjectId::new(), "ua").await.unwrap();
        let action = ListSessionsAction::new(store);

        let page = action.execute(user_id, PageRequest::new(1, 2)).await.unwrap();
        assert_eq!(page.data.len(), 2);
        assert!(page.data.iter().all(|s| s.user_id == user_id));
        assert_eq!(page.items.total, 3);
        assert!(page.pages.has_next);

        let page = action.execute(user_id, PageRequest::new(2, 2)).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert!(!page.pages.has_next);
    }

    #[tokio::test]
    async fn test_list_sessions_none() {
        let fx = Fixture::new();
        assert_eq!(
            ListSessionsAction::new(fx.session_store())
                .execute(ObjectId::new(), PageRequest::default())
                .await
                .unwrap_err(),
            AuthError::SessionNotFound
        );
    }
}
