//! Background jobs with a progress sequence and a final result

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::errors::DomainError;
use crate::engine::progress::{progress_channel, ProgressSender, ProgressUpdate};

/// Handle to an operation running on its own task.
///
/// The progress sequence is finite: it ends once the operation returns and
/// its [`ProgressSender`] is dropped.
pub struct JobHandle<T> {
    progress: mpsc::UnboundedReceiver<ProgressUpdate>,
    task: JoinHandle<Result<T, DomainError>>,
}

/// Run `job` on a tokio task, handing it the sending half of its progress sequence
pub fn spawn_job<T, F, Fut>(job: F) -> JobHandle<T>
where
    T: Send + 'static,
    F: FnOnce(ProgressSender) -> Fut,
    Fut: Future<Output = Result<T, DomainError>> + Send + 'static,
{
    let (tx, rx) = progress_channel();
    let task = tokio::spawn(job(tx));
    JobHandle { progress: rx, task }
}

impl<T> JobHandle<T> {
    /// Next progress update, `None` once the job has finished
    pub async fn next_progress(&mut self) -> Option<ProgressUpdate> {
        self.progress.recv().await
    }

    /// Cancel the job. Engine children are killed and partial outputs removed
    /// when the operation's future is dropped.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Wait for the final result, discarding unread progress
    pub async fn wait(self) -> Result<T, DomainError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(DomainError::Cancelled("job aborted".to_string())),
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }

    /// Forward every progress update to `on_progress`, then return the result
    pub async fn drive<P>(mut self, mut on_progress: P) -> Result<T, DomainError>
    where
        P: FnMut(&ProgressUpdate),
    {
        while let Some(update) = self.next_progress().await {
            on_progress(&update);
        }
        self.wait().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_progress_then_result() {
        let handle = spawn_job(|progress| async move {
            progress.send("work", 25.0);
            progress.send("work", 100.0);
            Ok::<_, DomainError>(7)
        });

        let mut seen = Vec::new();
        let result = handle.drive(|update| seen.push(update.percent)).await;

        assert_eq!(result, Ok(7));
        assert_eq!(seen, vec![25.0, 100.0]);
    }

    #[tokio::test]
    async fn test_failure_is_returned() {
        let handle = spawn_job(|_progress| async move {
            Err::<(), _>(DomainError::InvalidGeometry("zero width".to_string()))
        });
        assert!(matches!(
            handle.wait().await,
            Err(DomainError::InvalidGeometry(_))
        ));
    }

    #[tokio::test]
    async fn test_abort_reports_cancelled() {
        let handle = spawn_job(|_progress| async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, DomainError>(())
        });
        handle.abort();
        assert!(matches!(handle.wait().await, Err(DomainError::Cancelled(_))));
    }
}
