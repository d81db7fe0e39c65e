//! The single analysis thread.
//!
//! Every mutation of analysis state runs here, in submission order. A task
//! submitted from the worker thread itself runs inline, so a task may
//! submit follow-up work without deadlocking.

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle, ThreadId};

use crossbeam::channel::{self, Receiver, Sender};

use crate::config::WorkerConfig;
use crate::error::{AnalysisError, AnalysisResult};

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct Worker {
    sender: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
    thread_id: ThreadId,
}

impl Worker {
    pub fn spawn(config: &WorkerConfig) -> AnalysisResult<Self> {
        let (sender, jobs) = channel::unbounded::<Job>();
        let handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || {
                for job in jobs {
                    job();
                }
                tracing::debug!("analysis worker drained");
            })
            .map_err(AnalysisError::WorkerSpawn)?;
        let thread_id = handle.thread().id();
        tracing::debug!(thread = %config.thread_name, "analysis worker started");
        Ok(Worker {
            sender: Some(sender),
            handle: Some(handle),
            thread_id,
        })
    }

    /// Whether the caller runs on the worker thread.
    pub fn is_worker_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Queue `task`. Its result, or the reason there is none, comes back
    /// through the returned [`Task`].
    pub fn submit<T, F>(&self, task: F) -> Task<T>
    where
        T: Send + 'static,
        F: FnOnce() -> AnalysisResult<T> + Send + 'static,
    {
        if self.is_worker_thread() {
            return Task::ready(run_caught(task));
        }
        let Some(sender) = &self.sender else {
            return Task::ready(Err(AnalysisError::WorkerStopped));
        };

        let (reply, result) = channel::bounded(1);
        let job: Job = Box::new(move || {
            // The requester may have stopped waiting.
            let _ = reply.send(run_caught(task));
        });
        if sender.send(job).is_err() {
            return Task::ready(Err(AnalysisError::WorkerStopped));
        }
        Task {
            state: TaskState::Pending(result),
        }
    }

    /// Stop accepting tasks, finish the queued ones, and join the thread.
    pub fn shutdown(&mut self) {
        self.sender = None;
        if let Some(handle) = self.handle.take() {
            if self.is_worker_thread() {
                // Joining ourselves would never return; the thread exits
                // once the queue drains.
                return;
            }
            if handle.join().is_err() {
                tracing::warn!("analysis worker panicked");
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_caught<T>(task: impl FnOnce() -> AnalysisResult<T>) -> AnalysisResult<T> {
    match panic::catch_unwind(AssertUnwindSafe(task)) {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("analysis task panicked");
            Err(AnalysisError::TaskPanicked)
        }
    }
}

/// Handle to the result of a submitted task.
#[must_use = "a task does nothing observable unless waited on"]
pub struct Task<T> {
    state: TaskState<T>,
}

enum TaskState<T> {
    Ready(AnalysisResult<T>),
    Pending(Receiver<AnalysisResult<T>>),
}

impl<T> Task<T> {
    fn ready(result: AnalysisResult<T>) -> Self {
        Task {
            state: TaskState::Ready(result),
        }
    }

    /// Block until the task ran.
    pub fn wait(self) -> AnalysisResult<T> {
        match self.state {
            TaskState::Ready(result) => result,
            TaskState::Pending(result) => result.recv().unwrap_or(Err(AnalysisError::WorkerStopped)),
        }
    }
}
