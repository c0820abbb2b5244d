//! In-process notification channel for newly-queued jobs. §4.10.2 calls
//! for an "out-of-process-safe" enqueue: the channel is a latency
//! optimization only — the durable queue is the `upload_jobs` table
//! itself (`status = 'queued'`), and [`ingestgate_db::UploadJobRepository::claim_any_queued`]
//! is what actually guarantees delivery if this channel drops a
//! notification (buffer full, worker not yet running, process restart).

use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct JobQueue {
    sender: mpsc::Sender<Uuid>,
}

pub struct JobQueueReceiver {
    receiver: mpsc::Receiver<Uuid>,
}

impl JobQueue {
    pub fn new() -> (Self, JobQueueReceiver) {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        (Self { sender }, JobQueueReceiver { receiver })
    }

    /// Best-effort notify. A full or closed channel just means the worker
    /// falls back to its poll loop for this job; it is never a reason to
    /// fail the `complete` endpoint.
    pub fn notify(&self, job_id: Uuid) {
        if let Err(err) = self.sender.try_send(job_id) {
            warn!(job_id = %job_id, error = %err, "job queue notification dropped, worker will pick it up by polling");
        }
    }
}

impl JobQueueReceiver {
    pub async fn recv(&mut self) -> Option<Uuid> {
        self.receiver.recv().await
    }
}
