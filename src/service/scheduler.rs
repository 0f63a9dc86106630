use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

/// One queued processing run for a freshly uploaded document.
#[derive(Debug, Clone)]
pub struct DocumentEvent {
    pub document_id: Uuid,
    pub queued_at: DateTime<Utc>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ScheduleError {
    /// The bounded queue is at capacity; the caller should surface 503
    /// rather than letting in-flight work grow without bound.
    QueueFull,
    /// All workers have shut down.
    Closed,
}

impl std::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::QueueFull => write!(f, "processing queue is full"),
            ScheduleError::Closed => write!(f, "processing queue is closed"),
        }
    }
}

impl std::error::Error for ScheduleError {}

/// Hands upload events to the worker pool. Cheap to clone into the HTTP state.
#[derive(Clone)]
pub struct Scheduler {
    sender: mpsc::Sender<DocumentEvent>,
}

impl Scheduler {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<DocumentEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Scheduler { sender }, receiver)
    }

    /// Enqueues exactly one run; never blocks the upload response path.
    pub fn schedule_document(&self, document_id: Uuid) -> Result<(), ScheduleError> {
        let event = DocumentEvent {
            document_id,
            queued_at: Utc::now(),
        };

        self.sender.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => ScheduleError::QueueFull,
            TrySendError::Closed(_) => ScheduleError::Closed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schedule_delivers_event() {
        let (scheduler, mut receiver) = Scheduler::new(4);
        let id = Uuid::new_v4();

        scheduler.schedule_document(id).unwrap();

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.document_id, id);
    }

    #[tokio::test]
    async fn test_full_queue_rejects_instead_of_blocking() {
        let (scheduler, _receiver) = Scheduler::new(1);

        scheduler.schedule_document(Uuid::new_v4()).unwrap();
        assert_eq!(
            scheduler.schedule_document(Uuid::new_v4()),
            Err(ScheduleError::QueueFull)
        );
    }

    #[tokio::test]
    async fn test_dropped_receiver_reports_closed() {
        let (scheduler, receiver) = Scheduler::new(1);
        drop(receiver);

        assert_eq!(
            scheduler.schedule_document(Uuid::new_v4()),
            Err(ScheduleError::Closed)
        );
    }
}
