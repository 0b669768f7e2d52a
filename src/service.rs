use std::sync::Arc;

use async_trait::async_trait;
use opentelemetry::{global, metrics::Counter};

use crate::{error::Result, models::User, repository::UserRepository};

/// Operations the HTTP layer needs.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn create_user(&self, user: User) -> Result<()>;
    async fn get_user(&self, id: i64) -> Result<User>;
    async fn get_all_users(&self) -> Result<Vec<User>>;
    async fn update_user(&self, user: User) -> Result<()>;
    async fn delete_user(&self, id: i64) -> Result<()>;
}

/// Forwards to a [`UserRepository`], logging and counting successful
/// mutations. Repository errors are returned unchanged.
pub struct PeopleService<R> {
    repository: Arc<R>,
    users_created: Counter<u64>,
    users_updated: Counter<u64>,
    users_deleted: Counter<u64>,
}

impl<R: UserRepository> PeopleService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        let meter = global::meter("peopler");
        Self {
            repository,
            users_created: meter
                .u64_counter("users.created")
                .with_description("Users inserted")
                .build(),
            users_updated: meter
                .u64_counter("users.updated")
                .with_description("User updates applied")
                .build(),
            users_deleted: meter
                .u64_counter("users.deleted")
                .with_description("User deletions applied")
                .build(),
        }
    }
}

#[async_trait]
impl<R: UserRepository> UserService for PeopleService<R> {
    #[tracing::instrument(level = "debug", skip_all)]
    async fn create_user(&self, user: User) -> Result<()> {
        let id = self.repository.create_user(&user).await?;
        self.users_created.add(1, &[]);
        tracing::info!(user_id = id, "Created new user #{id}");
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_user(&self, id: i64) -> Result<User> {
        self.repository.get_user(id).await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn get_all_users(&self) -> Result<Vec<User>> {
        self.repository.get_all_users().await
    }

    #[tracing::instrument(level = "debug", skip_all, fields(user_id = user.id))]
    async fn update_user(&self, user: User) -> Result<()> {
        let id = self.repository.update_user(&user).await?;
        self.users_updated.add(1, &[]);
        tracing::info!(user_id = id, "Updated user #{id}");
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn delete_user(&self, id: i64) -> Result<()> {
        let id = self.repository.delete_user(id).await?;
        self.users_deleted.add(1, &[]);
        tracing::info!(user_id = id, "Deleted user #{id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tracing::{
        Event, Level, Subscriber,
        field::{Field, Visit},
        span,
    };
    use tracing_subscriber::{
        layer::{Context, Layer, SubscriberExt},
        registry::Registry,
    };

    use super::*;
    use crate::error::RepositoryError;

    /// Records the level and `user_id` field of every event, and the level
    /// of every span.
    #[derive(Clone, Default)]
    struct Captured {
        events: Arc<Mutex<Vec<(Level, Option<i64>)>>>,
        spans: Arc<Mutex<Vec<Level>>>,
    }

    impl Captured {
        fn info_user_ids(&self) -> Vec<Option<i64>> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|(level, _)| *level == Level::INFO)
                .map(|(_, id)| *id)
                .collect()
        }
    }

    struct UserIdVisitor(Option<i64>);

    impl Visit for UserIdVisitor {
        fn record_i64(&mut self, field: &Field, value: i64) {
            if field.name() == "user_id" {
                self.0 = Some(value);
            }
        }

        fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
    }

    impl<S: Subscriber> Layer<S> for Captured {
        fn on_new_span(&self, attrs: &span::Attributes<'_>, _id: &span::Id, _ctx: Context<'_, S>) {
            self.spans.lock().unwrap().push(*attrs.metadata().level());
        }

        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = UserIdVisitor(None);
            event.record(&mut visitor);
            self.events
                .lock()
                .unwrap()
                .push((*event.metadata().level(), visitor.0));
        }
    }

    fn capture() -> (Captured, tracing::subscriber::DefaultGuard) {
        let captured = Captured::default();
        let subscriber = Registry::default().with(captured.clone());
        (captured, tracing::subscriber::set_default(subscriber))
    }

    fn bad_things() -> RepositoryError {
        RepositoryError::Database(sqlx::Error::Protocol("bad things".to_string()))
    }

    fn test_user() -> User {
        User {
            id: 1,
            first_name: "Stephen".to_string(),
            last_name: "King".to_string(),
        }
    }

    fn test_users() -> Vec<User> {
        vec![
            User {
                id: 2,
                first_name: "Herman".to_string(),
                last_name: "Melville".to_string(),
            },
            User {
                id: 3,
                first_name: "Haruki".to_string(),
                last_name: "Murakami".to_string(),
            },
            User {
                id: 4,
                first_name: "Stanley".to_string(),
                last_name: "Kubrick".to_string(),
            },
        ]
    }

    /// Repository that either answers with fixtures or fails every call.
    struct MockRepository {
        fail: bool,
    }

    #[async_trait]
    impl UserRepository for MockRepository {
        async fn create_user(&self, _user: &User) -> Result<i64> {
            if self.fail { Err(bad_things()) } else { Ok(test_user().id) }
        }

        async fn get_user(&self, _id: i64) -> Result<User> {
            if self.fail { Err(bad_things()) } else { Ok(test_user()) }
        }

        async fn get_all_users(&self) -> Result<Vec<User>> {
            if self.fail { Err(bad_things()) } else { Ok(test_users()) }
        }

        async fn update_user(&self, user: &User) -> Result<i64> {
            if self.fail { Err(bad_things()) } else { Ok(user.id) }
        }

        async fn delete_user(&self, id: i64) -> Result<i64> {
            if self.fail { Err(bad_things()) } else { Ok(id) }
        }
    }

    fn service(fail: bool) -> PeopleService<MockRepository> {
        PeopleService::new(Arc::new(MockRepository { fail }))
    }

    #[tokio::test]
    async fn test_create_user() {
        assert!(service(false).create_user(test_user()).await.is_ok());

        let err = service(true).create_user(test_user()).await.unwrap_err();
        assert_eq!(err.to_string(), bad_things().to_string());
    }

    #[tokio::test]
    async fn test_get_all_users() {
        assert_eq!(service(false).get_all_users().await.unwrap(), test_users());
        assert!(service(true).get_all_users().await.is_err());
    }

    #[tokio::test]
    async fn test_get_user() {
        assert_eq!(service(false).get_user(1).await.unwrap(), test_user());
        assert!(service(true).get_user(1).await.is_err());
    }

    #[tokio::test]
    async fn test_update_user() {
        assert!(service(false).update_user(test_user()).await.is_ok());
        assert!(service(true).update_user(test_user()).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_user() {
        assert!(service(false).delete_user(1).await.is_ok());
        assert!(service(true).delete_user(1).await.is_err());
    }

    #[tokio::test]
    async fn test_mutations_log_affected_id() {
        let (captured, _guard) = capture();
        let service = service(false);

        service.create_user(User::new("Stephen", "King")).await.unwrap();
        let mut user = test_user();
        user.id = 5;
        service.update_user(user).await.unwrap();
        service.delete_user(9).await.unwrap();

        assert_eq!(captured.info_user_ids(), vec![Some(1), Some(5), Some(9)]);
    }

    #[tokio::test]
    async fn test_failed_mutations_log_nothing() {
        let (captured, _guard) = capture();
        let service = service(true);

        assert!(service.create_user(test_user()).await.is_err());
        assert!(service.update_user(test_user()).await.is_err());
        assert!(service.delete_user(1).await.is_err());

        assert!(captured.info_user_ids().is_empty());
    }

    #[tokio::test]
    async fn test_reads_stay_below_info() {
        let (captured, _guard) = capture();
        let service = service(false);

        service.get_user(1).await.unwrap();
        service.get_all_users().await.unwrap();

        assert!(captured.info_user_ids().is_empty());
        let spans = captured.spans.lock().unwrap();
        assert_eq!(spans.len(), 2);
        assert!(spans.iter().all(|level| *level == Level::DEBUG));
    }
}
