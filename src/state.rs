use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;

use crate::client::{ApiClient, Resource, Transport};
use crate::config::Config;
use crate::department::DepartmentForest;
use crate::entity::user::Actor;
use crate::error::{AppError, AppResult};
use crate::loader::{ListLoader, LoadOutcome, RequestGeneration};
use crate::permission::{Capabilities, RolePolicy, VisibilityScope};

/// Notification severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    Info,
    Warn,
    Error,
}

/// Transient notification (toast)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotifyLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotifyLevel::Info,
            message: message.into(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self {
            level: NotifyLevel::Warn,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotifyLevel::Error,
            message: message.into(),
        }
    }
}

/// Consistent view of the session. Forest and scope always belong together.
#[derive(Clone, Debug)]
pub struct SessionSnapshot {
    pub actor: Actor,
    pub forest: Arc<DepartmentForest>,
    pub scope: Arc<VisibilityScope>,
    pub capabilities: Capabilities,
}

impl SessionSnapshot {
    fn compute(actor: Actor, forest: Arc<DepartmentForest>, policy: &RolePolicy) -> Self {
        let scope = Arc::new(VisibilityScope::compute(&actor, policy, &forest));
        let capabilities = Capabilities::for_actor(&actor, policy);
        Self {
            actor,
            forest,
            scope,
            capabilities,
        }
    }
}

/// Application state for one logged-in session
pub struct AppState<T> {
    /// Application configuration
    pub config: Arc<Config>,
    api: Arc<ApiClient<T>>,
    policy: Arc<RolePolicy>,
    /// None once the session has ended
    session: Arc<RwLock<Option<SessionSnapshot>>>,
    forest_generation: Arc<RequestGeneration>,
    cancel: CancellationToken,
    notifier: broadcast::Sender<Notification>,
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            api: self.api.clone(),
            policy: self.policy.clone(),
            session: self.session.clone(),
            forest_generation: self.forest_generation.clone(),
            cancel: self.cancel.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

impl<T: Transport> AppState<T> {
    /// Load the department forest and compute the actor's scope
    pub async fn start(actor: Actor, api: ApiClient<T>, config: Config) -> AppResult<Self> {
        let (notifier, _) = broadcast::channel(256);
        let policy = config.roles.policy();

        let records = api.departments().await?;
        let forest = Arc::new(DepartmentForest::build(records));
        let snapshot = SessionSnapshot::compute(actor, forest, &policy);
        tracing::info!(
            "Session started for user {} ({} departments)",
            snapshot.actor.id,
            snapshot.forest.len()
        );

        Ok(Self {
            config: Arc::new(config),
            api: Arc::new(api),
            policy: Arc::new(policy),
            session: Arc::new(RwLock::new(Some(snapshot))),
            forest_generation: Arc::new(RequestGeneration::new()),
            cancel: CancellationToken::new(),
            notifier,
        })
    }

    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    pub fn policy(&self) -> &RolePolicy {
        &self.policy
    }

    /// Current session view, `Unauthorized` after `end`
    pub async fn snapshot(&self) -> AppResult<SessionSnapshot> {
        self.session.read().await.clone().ok_or(AppError::Unauthorized)
    }

    pub async fn is_active(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Refetch departments, then swap forest and scope together.
    /// On failure the previous forest stays in place. A reload overtaken by a
    /// newer one is dropped quietly, whether it succeeded or failed.
    pub async fn reload_departments(&self) -> AppResult<LoadOutcome> {
        let ticket = self.forest_generation.begin();

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(AppError::Cancelled),
            result = self.api.departments() => result,
        };

        let mut session = self.session.write().await;
        if !self.forest_generation.is_current(ticket) {
            tracing::warn!(
                "Discarding stale department reload (generation {}, current {})",
                ticket,
                self.forest_generation.current()
            );
            return Ok(LoadOutcome::Stale);
        }
        let records = match result {
            Ok(records) => records,
            Err(e) => {
                tracing::error!("Failed to reload departments: {}", e);
                self.notify(Notification::error(e.user_message()));
                return Err(e);
            }
        };
        let Some(current) = session.as_ref() else {
            return Err(AppError::Unauthorized);
        };

        let forest = Arc::new(DepartmentForest::build(records));
        let snapshot = SessionSnapshot::compute(current.actor.clone(), forest, &self.policy);
        let count = snapshot.forest.len();
        tracing::info!("Department forest reloaded ({} departments)", count);
        *session = Some(snapshot);
        Ok(LoadOutcome::Applied { count })
    }

    /// Replace the actor (e.g. after a role change) and recompute the scope
    pub async fn set_actor(&self, actor: Actor) -> AppResult<()> {
        let mut session = self.session.write().await;
        let Some(current) = session.as_ref() else {
            return Err(AppError::Unauthorized);
        };
        let snapshot = SessionSnapshot::compute(actor, current.forest.clone(), &self.policy);
        *session = Some(snapshot);
        Ok(())
    }

    /// Token for one screen's requests, cancelled when the session ends
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    /// Loader publishing into this session's notifications
    pub fn loader<R>(&self, name: &'static str) -> ListLoader<R> {
        ListLoader::new(name, self.notifier.clone())
    }

    /// Fetch every row of `R` into `loader`
    pub async fn load_all<R: Resource>(&self, loader: &ListLoader<R>) -> LoadOutcome {
        loader.load(&self.cancel, self.api.list_all::<R>()).await
    }

    /// Publish a notification; having no subscribers is fine
    pub fn notify(&self, notification: Notification) {
        let _ = self.notifier.send(notification);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    /// Cancel in-flight requests and drop the session
    pub async fn end(&self) {
        self.cancel.cancel();
        self.forest_generation.invalidate();
        let ended = self.session.write().await.take();
        if let Some(session) = ended {
            tracing::info!("Session ended for user {}", session.actor.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification() {
        let notification = Notification::error("Không thể kết nối tới máy chủ");
        assert_eq!(notification.level, NotifyLevel::Error);
        assert_eq!(
            serde_json::to_value(&notification).unwrap(),
            serde_json::json!({"level": "error", "message": "Không thể kết nối tới máy chủ"})
        );
        assert_eq!(Notification::warn("x").level, NotifyLevel::Warn);
        assert_eq!(Notification::info("x").level, NotifyLevel::Info);
    }
}
