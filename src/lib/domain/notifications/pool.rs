//! Bounded worker pool for fire-and-forget jobs

use std::{fmt, future::Future, pin::Pin, str::FromStr, sync::Arc};

use thiserror::Error;
use tokio::{
    sync::{
        mpsc::{self, error::TrySendError},
        Mutex,
    },
    task::JoinSet,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// What to do with a submission when the queue is full
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueueFullPolicy {
    /// The submitter waits until a slot frees up
    #[default]
    Block,

    /// The job is dropped and a warning is logged
    Reject,
}

/// Unrecognized queue policy name
#[derive(Debug, Error)]
#[error("unknown queue policy \"{0}\", expected \"block\" or \"reject\"")]
pub struct UnknownQueuePolicy(String);

impl FromStr for QueueFullPolicy {
    type Err = UnknownQueuePolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "reject" => Ok(Self::Reject),
            other => Err(UnknownQueuePolicy(other.to_string())),
        }
    }
}

/// A fixed set of worker tasks draining one bounded queue.
///
/// Jobs run to completion once queued; there is no cancellation. A job that
/// panics is logged and does not take its worker down.
pub struct WorkerPool {
    sender: mpsc::Sender<Job>,
    policy: QueueFullPolicy,
    cancel: CancellationToken,
    workers: Mutex<JoinSet<()>>,
}

impl WorkerPool {
    /// Spawns `workers` tasks sharing a queue of `capacity` jobs.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(workers: usize, capacity: usize, policy: QueueFullPolicy) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let cancel = CancellationToken::new();

        let mut set = JoinSet::new();
        for id in 0..workers.max(1) {
            set.spawn(worker(id, receiver.clone(), cancel.clone()));
        }

        Self {
            sender,
            policy,
            cancel,
            workers: Mutex::new(set),
        }
    }

    /// Queues a job, returning whether it was accepted.
    ///
    /// Under [`QueueFullPolicy::Block`] this waits for a free slot; under
    /// [`QueueFullPolicy::Reject`] a full queue drops the job.
    pub async fn submit<F>(&self, job: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.cancel.is_cancelled() {
            warn!("mail worker pool is shut down, dropping job");
            return false;
        }

        let job: Job = Box::pin(job);

        match self.policy {
            QueueFullPolicy::Block => match self.sender.send(job).await {
                Ok(()) => true,
                Err(_) => {
                    warn!("mail queue closed, dropping job");
                    false
                }
            },
            QueueFullPolicy::Reject => match self.sender.try_send(job) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    warn!(
                        capacity = self.sender.max_capacity(),
                        "mail queue is full, dropping job"
                    );
                    false
                }
                Err(TrySendError::Closed(_)) => {
                    warn!("mail queue closed, dropping job");
                    false
                }
            },
        }
    }

    /// Stops accepting jobs, drains the queue and waits for every worker.
    pub async fn shutdown(&self) {
        self.cancel.cancel();

        let mut workers = self.workers.lock().await;
        while let Some(result) = workers.join_next().await {
            if let Err(err) = result {
                error!(error = %err, "mail worker failed");
            }
        }
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("policy", &self.policy)
            .field("capacity", &self.sender.max_capacity())
            .field("shut_down", &self.cancel.is_cancelled())
            .finish()
    }
}

async fn worker(id: usize, receiver: Arc<Mutex<mpsc::Receiver<Job>>>, cancel: CancellationToken) {
    debug!(worker = id, "mail worker started");

    loop {
        let job = {
            let mut receiver = receiver.lock().await;

            tokio::select! {
                biased;
                job = receiver.recv() => job,
                () = cancel.cancelled() => {
                    receiver.close();
                    receiver.recv().await
                }
            }
        };

        let Some(job) = job else {
            break;
        };

        if let Err(err) = tokio::spawn(job).await {
            error!(worker = id, error = %err, "mail job panicked");
        }
    }

    debug!(worker = id, "mail worker stopped");
}
