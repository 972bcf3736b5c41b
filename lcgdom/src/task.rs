//! Deferred work ("next turn of the event loop").
//!
//! Tasks are boxed `FnOnce(&mut C)` closures queued in FIFO order. The
//! owner of the queue pops them one at a time after the current event has
//! been handled, so a task may freely schedule further tasks.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{extract_panic_message, TaskError};

pub type Task<C> = Box<dyn FnOnce(&mut C)>;

/// A task together with the label it was scheduled under.
pub struct Deferred<C> {
    pub label: &'static str,
    pub task: Task<C>,
}

impl<C> std::fmt::Debug for Deferred<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred").field("label", &self.label).finish()
    }
}

impl<C> Deferred<C> {
    /// Run the task, converting a panic into a [`TaskError`].
    pub fn run(self, cx: &mut C) -> Result<(), TaskError> {
        let Deferred { label, task } = self;
        panic::catch_unwind(AssertUnwindSafe(|| task(cx))).map_err(|payload| TaskError {
            task: label,
            message: extract_panic_message(&payload),
        })
    }
}

pub struct TaskQueue<C> {
    queue: VecDeque<Deferred<C>>,
}

impl<C> std::fmt::Debug for TaskQueue<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.queue.len())
            .finish()
    }
}

impl<C> Default for TaskQueue<C> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

impl<C> TaskQueue<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` to run after everything already queued.
    pub fn defer(&mut self, label: &'static str, task: impl FnOnce(&mut C) + 'static) {
        self.queue.push_back(Deferred {
            label,
            task: Box::new(task),
        });
    }

    pub fn pop(&mut self) -> Option<Deferred<C>> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Labels of the queued tasks, oldest first.
    pub fn labels(&self) -> Vec<&'static str> {
        self.queue.iter().map(|d| d.label).collect()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
