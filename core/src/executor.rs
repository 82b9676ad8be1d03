//! # Executor: Running Loop Bodies in Parallel
//!
//! Builders hand their per-element work to an [`Executor`]. The contract is
//! narrow: `run_all` returns only once every task has finished. Ordering
//! across tasks is unspecified.

use crate::error::UsageError;
use parking_lot::Mutex;
use std::thread;

/// A unit of work borrowed from the caller's stack.
pub type Task<'a> = Box<dyn FnOnce() + Send + 'a>;

pub trait Executor: Send + Sync {
    /// Run every task to completion before returning.
    fn run_all<'a>(&self, tasks: Vec<Task<'a>>);
}

/// At most `workers` scoped threads, each pulling tasks from a shared queue.
///
/// A panicking task propagates once all workers have joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedPool {
    workers: usize,
}

impl BoundedPool {
    pub fn new(workers: usize) -> Result<Self, UsageError> {
        if workers == 0 {
            return Err(UsageError::InvalidParallelism(workers));
        }
        Ok(Self { workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Executor for BoundedPool {
    fn run_all<'a>(&self, tasks: Vec<Task<'a>>) {
        let workers = self.workers.min(tasks.len());
        tracing::debug!(workers, tasks = tasks.len(), "dispatching parallel loop");
        if workers <= 1 {
            Inline.run_all(tasks);
            return;
        }

        let queue = Mutex::new(tasks.into_iter());
        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| {
                    loop {
                        let next = queue.lock().next();
                        match next {
                            Some(task) => task(),
                            None => break,
                        }
                    }
                });
            }
        });
    }
}

/// Runs tasks one after another on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inline;

impl Executor for Inline {
    fn run_all<'a>(&self, tasks: Vec<Task<'a>>) {
        for task in tasks {
            task();
        }
    }
}
