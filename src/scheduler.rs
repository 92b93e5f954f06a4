//! Fixed-size background pool for every mutating operation.
//!
//! `submit` only enqueues; the caller never waits for the job. Jobs go
//! through one shared queue, so with more than one worker two submissions
//! from the same caller may finish in either order. A failing or panicking
//! job is logged and pushed onto the error channel, and the worker moves on
//! to the next job.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use tracing::{debug, error, info, warn};

use crate::config::ERROR_CHANNEL_CAPACITY;
use crate::error::{StoreError, TaskFailure};

type Job = Box<dyn FnOnce() -> Result<(), StoreError> + Send + 'static>;

struct Task {
    name: &'static str,
    job: Job,
}

pub struct WritePool {
    queue: Option<Sender<Task>>,
    errors: Receiver<TaskFailure>,
    workers: Vec<JoinHandle<()>>,
}

impl WritePool {
    /// Spawn `threads` named workers. Zero threads is rejected because the
    /// queue would never drain.
    pub fn new(threads: usize) -> io::Result<Self> {
        if threads == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "write pool needs at least one worker",
            ));
        }

        let (queue, jobs) = unbounded::<Task>();
        let (failures, errors) = bounded::<TaskFailure>(ERROR_CHANNEL_CAPACITY);

        let mut workers = Vec::with_capacity(threads);
        for index in 0..threads {
            let jobs = jobs.clone();
            let failures = failures.clone();
            let handle = thread::Builder::new()
                .name(format!("wordbook-writer-{index}"))
                .spawn(move || worker_loop(jobs, failures))?;
            workers.push(handle);
        }

        info!(threads, "write pool started");
        Ok(Self {
            queue: Some(queue),
            errors,
            workers,
        })
    }

    /// Queue `job` and return immediately. `name` labels the job in logs and
    /// in any [`TaskFailure`] it produces.
    pub fn submit<F>(&self, name: &'static str, job: F)
    where
        F: FnOnce() -> Result<(), StoreError> + Send + 'static,
    {
        let Some(queue) = &self.queue else {
            return;
        };
        if queue
            .send(Task {
                name,
                job: Box::new(job),
            })
            .is_err()
        {
            warn!(task = name, "write pool is shut down; job dropped");
        }
    }

    /// Out-of-band failure stream. Receivers share one queue: each failure is
    /// delivered to exactly one clone.
    pub fn errors(&self) -> Receiver<TaskFailure> {
        self.errors.clone()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WritePool {
    /// Close the queue, let workers finish what is already queued, and join
    /// them. A worker dropping the last handle to its own pool is not joined.
    fn drop(&mut self) {
        self.queue.take();
        let current = thread::current().id();
        for handle in self.workers.drain(..) {
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                error!("write pool worker exited abnormally");
            }
        }
    }
}

fn worker_loop(jobs: Receiver<Task>, failures: Sender<TaskFailure>) {
    for Task { name, job } in jobs.iter() {
        debug!(task = name, "running background job");
        let failure = match panic::catch_unwind(AssertUnwindSafe(job)) {
            Ok(Ok(())) => continue,
            Ok(Err(err)) => {
                error!(task = name, error = %err, "background job failed");
                TaskFailure::Failed {
                    task: name,
                    error: err,
                }
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(task = name, %message, "background job panicked");
                TaskFailure::Panicked {
                    task: name,
                    message,
                }
            }
        };

        match failures.try_send(failure) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(failure)) => {
                warn!(task = failure.task(), "error channel full; failure only logged");
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn zero_workers_is_rejected() {
        assert!(WritePool::new(0).is_err());
    }

    #[test]
    fn jobs_run_off_the_calling_thread() {
        let pool = WritePool::new(2).unwrap();
        let (tx, rx) = crossbeam_channel::bounded(1);

        pool.submit("thread-check", move || {
            tx.send(thread::current().id()).unwrap();
            Ok(())
        });

        let worker = rx.recv_timeout(WAIT).unwrap();
        assert_ne!(worker, thread::current().id());
    }

    #[test]
    fn failures_are_reported_and_the_pool_keeps_running() {
        let pool = WritePool::new(1).unwrap();
        let errors = pool.errors();
        let (tx, rx) = crossbeam_channel::bounded(1);

        pool.submit("refused", || {
            Err(StoreError::InvalidRow {
                reason: "nope".to_string(),
            })
        });
        pool.submit("exploding", || panic!("boom"));
        pool.submit("after", move || {
            tx.send(()).unwrap();
            Ok(())
        });

        match errors.recv_timeout(WAIT).unwrap() {
            TaskFailure::Failed { task, .. } => assert_eq!(task, "refused"),
            other => panic!("unexpected failure: {other}"),
        }
        match errors.recv_timeout(WAIT).unwrap() {
            TaskFailure::Panicked { task, message } => {
                assert_eq!(task, "exploding");
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected failure: {other}"),
        }
        rx.recv_timeout(WAIT).unwrap();
    }

    #[test]
    fn dropping_the_pool_drains_queued_jobs() {
        let pool = WritePool::new(4).unwrap();
        let done = Arc::new(AtomicUsize::new(0));
        for _ in 0..32 {
            let done = Arc::clone(&done);
            pool.submit("count", move || {
                done.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }

        drop(pool);
        assert_eq!(done.load(Ordering::SeqCst), 32);
    }
}
