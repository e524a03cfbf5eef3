//! Task service: orchestrates storage, broadcast, and notifications.

use std::fmt;
use std::sync::Arc;

use crate::domain::{ChangeEvent, Task};
use crate::error::GatewayError;
use crate::mail::Notifier;
use crate::persistence::TaskStore;
use crate::ws::Broadcaster;

/// Subject line for create notifications.
const SUBJECT_CREATED: &str = "New task created";
/// Subject line for update notifications.
const SUBJECT_UPDATED: &str = "Task updated";

/// Orchestration layer for all task operations.
///
/// Every mutation follows the same commit path: validate, write to
/// the store, broadcast the change event, then dispatch the optional
/// email notification. The broadcast is awaited before returning so
/// sequential mutations reach subscribers in commit order; the
/// notification runs on a detached task and never delays or fails the
/// request. A mutation rejected by validation or storage broadcasts
/// nothing.
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    broadcaster: Broadcaster,
    notifier: Option<Arc<dyn Notifier>>,
}

impl TaskService {
    /// Creates a new `TaskService`.
    ///
    /// `notifier` is optional; without one, notification requests are
    /// logged and skipped, and reminder requests fail.
    #[must_use]
    pub fn new(
        store: Arc<dyn TaskStore>,
        broadcaster: Broadcaster,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> Self {
        Self {
            store,
            broadcaster,
            notifier,
        }
    }

    /// Returns a reference to the inner [`Broadcaster`].
    #[must_use]
    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Returns all tasks.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] on storage failure.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, GatewayError> {
        self.store.list().await
    }

    /// Returns the task with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::TaskNotFound`] if no such task exists.
    pub async fn get_task(&self, id: i32) -> Result<Task, GatewayError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(GatewayError::TaskNotFound(id))
    }

    /// Creates a task, broadcasts the change, and optionally notifies.
    ///
    /// The returned task carries its storage-assigned id; any
    /// client-supplied id is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the title is empty,
    /// or [`GatewayError::PersistenceError`] on storage failure.
    pub async fn create_task(
        &self,
        task: Task,
        notify_email: Option<&str>,
    ) -> Result<Task, GatewayError> {
        validate_title(&task)?;

        let task = self.store.insert(task).await?;

        let delivered = self
            .broadcaster
            .broadcast(&ChangeEvent::Add { task: task.clone() })
            .await;
        tracing::info!(task_id = task.id, delivered, "task created");

        if let Some(recipient) = notify_email {
            self.dispatch_notification(&task.title, recipient, SUBJECT_CREATED);
        }

        Ok(task)
    }

    /// Replaces a task, broadcasts the change, and optionally notifies.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::IdMismatch`] if `path_id` differs from
    /// the task's own id, [`GatewayError::InvalidRequest`] if the
    /// title is empty, and [`GatewayError::TaskNotFound`] if no task
    /// with that id exists. Nothing is broadcast on any error.
    pub async fn update_task(
        &self,
        path_id: i32,
        task: Task,
        notify_email: Option<&str>,
    ) -> Result<(), GatewayError> {
        if path_id != task.id {
            return Err(GatewayError::IdMismatch {
                path_id,
                body_id: task.id,
            });
        }
        validate_title(&task)?;

        if !self.store.update(&task).await? {
            return Err(GatewayError::TaskNotFound(task.id));
        }

        let delivered = self
            .broadcaster
            .broadcast(&ChangeEvent::Update { task: task.clone() })
            .await;
        tracing::info!(task_id = task.id, delivered, "task updated");

        if let Some(recipient) = notify_email {
            self.dispatch_notification(&task.title, recipient, SUBJECT_UPDATED);
        }

        Ok(())
    }

    /// Deletes a task and broadcasts the removal.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::TaskNotFound`] if no task with that id
    /// exists; nothing is broadcast in that case.
    pub async fn delete_task(&self, id: i32) -> Result<(), GatewayError> {
        if !self.store.delete(id).await? {
            return Err(GatewayError::TaskNotFound(id));
        }

        let delivered = self
            .broadcaster
            .broadcast(&ChangeEvent::Delete { task_id: id })
            .await;
        tracing::info!(task_id = id, delivered, "task deleted");

        Ok(())
    }

    /// Sends a reminder email for an existing task.
    ///
    /// Unlike the create/update notifications this call is awaited:
    /// delivery failures surface to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::TaskNotFound`] if the task does not
    /// exist, [`GatewayError::InvalidRequest`] if no mailer is
    /// configured, and [`GatewayError::MailError`] on delivery
    /// failure.
    pub async fn send_reminder(&self, task_id: i32, recipient: &str) -> Result<(), GatewayError> {
        let task = self.get_task(task_id).await?;

        let Some(notifier) = &self.notifier else {
            return Err(GatewayError::InvalidRequest(
                "no mailer configured".to_string(),
            ));
        };

        tracing::info!(task_id, recipient, "sending reminder email");
        notifier
            .send_reminder(&task, recipient)
            .await
            .map_err(|e| GatewayError::MailError(e.to_string()))?;
        tracing::info!(task_id, recipient, "reminder email sent");

        Ok(())
    }

    /// Fires a notification on a detached task. Failures are logged
    /// and never surfaced to the caller.
    fn dispatch_notification(&self, task_title: &str, recipient: &str, subject: &'static str) {
        let Some(notifier) = &self.notifier else {
            tracing::debug!(recipient, "notification skipped: no mailer configured");
            return;
        };

        let notifier = Arc::clone(notifier);
        let title = task_title.to_string();
        let recipient = recipient.to_string();

        tokio::spawn(async move {
            match notifier.send_notification(&title, &recipient, subject).await {
                Ok(()) => tracing::info!(%recipient, subject, "notification email sent"),
                Err(e) => tracing::warn!(%recipient, error = %e, "notification email failed"),
            }
        });
    }
}

impl fmt::Debug for TaskService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskService")
            .field("broadcaster", &self.broadcaster)
            .field("notifier_configured", &self.notifier.is_some())
            .finish_non_exhaustive()
    }
}

fn validate_title(task: &Task) -> Result<(), GatewayError> {
    if task.title.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "task title must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::mail::NotifyError;
    use crate::persistence::InMemoryTaskStore;
    use crate::ws::connection::test_sink::RecordingSink;
    use crate::ws::{Connection, ConnectionRegistry};

    /// Notifier double recording every (title, recipient, subject).
    #[derive(Debug, Default)]
    struct RecordingNotifier {
        notifications: Mutex<Vec<(String, String, String)>>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn failing() -> Self {
            Self {
                notifications: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn recorded(&self) -> Vec<(String, String, String)> {
            self.notifications
                .lock()
                .map(|n| n.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_notification(
            &self,
            task_title: &str,
            recipient: &str,
            subject: &str,
        ) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Transport("simulated failure".to_string()));
            }
            if let Ok(mut n) = self.notifications.lock() {
                n.push((
                    task_title.to_string(),
                    recipient.to_string(),
                    subject.to_string(),
                ));
            }
            Ok(())
        }

        async fn send_reminder(&self, task: &Task, recipient: &str) -> Result<(), NotifyError> {
            self.send_notification(&task.title, recipient, "reminder")
                .await
        }
    }

    fn make_service(notifier: Option<Arc<dyn Notifier>>) -> (TaskService, Arc<ConnectionRegistry>) {
        let registry = Arc::new(ConnectionRegistry::new());
        let broadcaster = Broadcaster::new(Arc::clone(&registry));
        let store = Arc::new(InMemoryTaskStore::new());
        (TaskService::new(store, broadcaster, notifier), registry)
    }

    async fn attach_sink(registry: &Arc<ConnectionRegistry>) -> RecordingSink {
        let sink = RecordingSink::new();
        registry
            .register(Arc::new(Connection::new(sink.clone())))
            .await;
        sink
    }

    /// Polls `cond` until it holds or a short deadline expires.
    async fn eventually(cond: impl Fn() -> bool, what: &str) {
        for _ in 0..200 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("timed out waiting for {what}");
    }

    #[tokio::test]
    async fn create_assigns_id_and_broadcasts_add() {
        let (service, registry) = make_service(None);
        let sink = attach_sink(&registry).await;

        let created = service.create_task(Task::new(0, "write docs", ""), None).await;
        let Ok(created) = created else {
            panic!("create failed");
        };
        assert_eq!(created.id, 1);

        let expected = serde_json::to_string(&ChangeEvent::Add {
            task: created.clone(),
        })
        .unwrap_or_default();
        assert_eq!(sink.sent(), vec![expected]);
    }

    #[tokio::test]
    async fn create_without_connections_still_commits() {
        let (service, _registry) = make_service(None);

        let created = service.create_task(Task::new(0, "solo", ""), None).await;
        assert!(created.is_ok());

        let tasks = service.list_tasks().await.unwrap_or_default();
        assert_eq!(tasks.len(), 1);
    }

    #[tokio::test]
    async fn empty_title_is_rejected_before_storage() {
        let (service, registry) = make_service(None);
        let sink = attach_sink(&registry).await;

        let result = service.create_task(Task::new(0, "   ", ""), None).await;
        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));

        assert!(sink.sent().is_empty());
        assert!(service.list_tasks().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn update_broadcasts_new_state() {
        let (service, registry) = make_service(None);
        let sink = attach_sink(&registry).await;

        let Ok(mut task) = service.create_task(Task::new(0, "before", ""), None).await else {
            panic!("create failed");
        };

        task.title = "after".to_string();
        task.is_completed = true;
        let updated = service.update_task(task.id, task.clone(), None).await;
        assert!(updated.is_ok());

        let expected_update =
            serde_json::to_string(&ChangeEvent::Update { task }).unwrap_or_default();
        let frames = sink.sent();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames.last(), Some(&expected_update));
    }

    #[tokio::test]
    async fn id_mismatch_is_rejected_before_storage() {
        let (service, registry) = make_service(None);
        let sink = attach_sink(&registry).await;

        let Ok(task) = service.create_task(Task::new(0, "original", ""), None).await else {
            panic!("create failed");
        };

        let mut renamed = task.clone();
        renamed.title = "renamed".to_string();
        let result = service.update_task(task.id + 1, renamed, None).await;
        assert!(matches!(result, Err(GatewayError::IdMismatch { .. })));

        // Only the Add event went out, and storage kept the original.
        assert_eq!(sink.sent().len(), 1);
        let stored = service.get_task(task.id).await;
        assert_eq!(stored.map(|t| t.title).unwrap_or_default(), "original");
    }

    #[tokio::test]
    async fn update_unknown_task_is_not_found() {
        let (service, registry) = make_service(None);
        let sink = attach_sink(&registry).await;

        let result = service.update_task(9, Task::new(9, "ghost", ""), None).await;
        assert!(matches!(result, Err(GatewayError::TaskNotFound(9))));
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn delete_broadcasts_task_id_only() {
        let (service, registry) = make_service(None);
        let sink = attach_sink(&registry).await;

        let Ok(task) = service.create_task(Task::new(0, "temp", ""), None).await else {
            panic!("create failed");
        };

        let deleted = service.delete_task(task.id).await;
        assert!(deleted.is_ok());

        let frames = sink.sent();
        assert_eq!(
            frames.last().map(String::as_str),
            Some(r#"{"Action":"Delete","TaskId":1}"#)
        );
    }

    #[tokio::test]
    async fn delete_unknown_task_broadcasts_nothing() {
        let (service, registry) = make_service(None);
        let sink = attach_sink(&registry).await;

        let result = service.delete_task(42).await;
        assert!(matches!(result, Err(GatewayError::TaskNotFound(42))));
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn mutations_reach_subscribers_in_commit_order() {
        let (service, registry) = make_service(None);
        let sink = attach_sink(&registry).await;

        let Ok(task) = service.create_task(Task::new(0, "step", ""), None).await else {
            panic!("create failed");
        };
        let mut updated = task.clone();
        updated.is_completed = true;
        let _ = service.update_task(task.id, updated, None).await;
        let _ = service.delete_task(task.id).await;

        let actions: Vec<String> = sink
            .sent()
            .iter()
            .filter_map(|frame| serde_json::from_str::<serde_json::Value>(frame).ok())
            .filter_map(|v| v.get("Action").and_then(|a| a.as_str()).map(String::from))
            .collect();
        assert_eq!(actions, vec!["Add", "Update", "Delete"]);
    }

    #[tokio::test]
    async fn create_with_recipient_sends_notification() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (service, _registry) = make_service(Some(Arc::clone(&notifier) as Arc<dyn Notifier>));

        let created = service
            .create_task(Task::new(0, "notify me", ""), Some("user@example.com"))
            .await;
        assert!(created.is_ok());

        eventually(|| !notifier.recorded().is_empty(), "create notification").await;
        let recorded = notifier.recorded();
        assert_eq!(
            recorded.first(),
            Some(&(
                "notify me".to_string(),
                "user@example.com".to_string(),
                "New task created".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn update_with_recipient_sends_notification() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (service, _registry) = make_service(Some(Arc::clone(&notifier) as Arc<dyn Notifier>));

        let Ok(task) = service.create_task(Task::new(0, "step", ""), None).await else {
            panic!("create failed");
        };
        let updated = service
            .update_task(task.id, task.clone(), Some("user@example.com"))
            .await;
        assert!(updated.is_ok());

        eventually(|| !notifier.recorded().is_empty(), "update notification").await;
        let subjects: Vec<String> = notifier.recorded().into_iter().map(|n| n.2).collect();
        assert_eq!(subjects, vec!["Task updated".to_string()]);
    }

    #[tokio::test]
    async fn no_recipient_means_no_notification() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (service, _registry) = make_service(Some(Arc::clone(&notifier) as Arc<dyn Notifier>));

        let created = service.create_task(Task::new(0, "quiet", ""), None).await;
        assert!(created.is_ok());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(notifier.recorded().is_empty());
    }

    #[tokio::test]
    async fn notification_failure_does_not_fail_the_mutation() {
        let notifier = Arc::new(RecordingNotifier::failing());
        let (service, registry) = make_service(Some(notifier as Arc<dyn Notifier>));
        let sink = attach_sink(&registry).await;

        let created = service
            .create_task(Task::new(0, "still works", ""), Some("user@example.com"))
            .await;
        assert!(created.is_ok());

        // The task committed and the event still went out.
        assert_eq!(service.list_tasks().await.unwrap_or_default().len(), 1);
        assert_eq!(sink.sent().len(), 1);
    }

    #[tokio::test]
    async fn reminder_surfaces_mail_failure() {
        let notifier = Arc::new(RecordingNotifier::failing());
        let (service, _registry) = make_service(Some(notifier as Arc<dyn Notifier>));

        let Ok(task) = service.create_task(Task::new(0, "remind", ""), None).await else {
            panic!("create failed");
        };

        let result = service.send_reminder(task.id, "user@example.com").await;
        assert!(matches!(result, Err(GatewayError::MailError(_))));
    }

    #[tokio::test]
    async fn reminder_for_unknown_task_is_not_found() {
        let notifier = Arc::new(RecordingNotifier::default());
        let (service, _registry) = make_service(Some(notifier as Arc<dyn Notifier>));

        let result = service.send_reminder(404, "user@example.com").await;
        assert!(matches!(result, Err(GatewayError::TaskNotFound(404))));
    }

    #[tokio::test]
    async fn reminder_without_mailer_is_invalid() {
        let (service, _registry) = make_service(None);

        let Ok(task) = service.create_task(Task::new(0, "remind", ""), None).await else {
            panic!("create failed");
        };

        let result = service.send_reminder(task.id, "user@example.com").await;
        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn get_task_not_found() {
        let (service, _registry) = make_service(None);
        let result = service.get_task(1).await;
        assert!(matches!(result, Err(GatewayError::TaskNotFound(1))));
    }
}
