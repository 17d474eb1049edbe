//! Deferred continuations on a single cooperative thread.
//!
//! Every asynchronous completion in this crate is a closure pushed onto a
//! [`TaskQueue`]. Nothing runs inside the call that schedules it; the owner
//! of the queue drives it one turn at a time (or until idle), and tasks run
//! in the order they were deferred, including tasks deferred by tasks.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

type Task = Box<dyn FnOnce()>;

struct Inner {
    tx: UnboundedSender<Task>,
    rx: RefCell<UnboundedReceiver<Task>>,
    pending: Cell<usize>,
}

/// Cheap-clone handle; all clones feed the same FIFO.
#[derive(Clone)]
pub struct TaskQueue {
    inner: Rc<Inner>,
}

impl TaskQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            inner: Rc::new(Inner {
                tx,
                rx: RefCell::new(rx),
                pending: Cell::new(0),
            }),
        }
    }

    /// Schedule `task` for a later turn.
    pub fn defer<F>(&self, task: F)
    where
        F: FnOnce() + 'static,
    {
        // The receiver lives as long as `inner`, so the channel cannot be closed here.
        if self.inner.tx.send(Box::new(task)).is_ok() {
            self.inner.pending.set(self.inner.pending.get() + 1);
        }
    }

    /// Run one queued task. Returns false when the queue was empty.
    pub fn run_next(&self) -> bool {
        let task = self.inner.rx.borrow_mut().try_recv().ok();
        match task {
            Some(task) => {
                self.inner.pending.set(self.inner.pending.get() - 1);
                task();
                true
            }
            None => false,
        }
    }

    /// Run turns until nothing is queued; returns how many tasks ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        if ran > 0 {
            tracing::trace!(ran, "task queue idle");
        }
        ran
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.inner.pending.get()
    }

    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defer_never_runs_inline() {
        let queue = TaskQueue::new();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        queue.defer(move || flag.set(true));
        assert!(!ran.get());
        assert_eq!(queue.pending(), 1);
        assert!(queue.run_next());
        assert!(ran.get());
        assert!(queue.is_idle());
    }

    #[test]
    fn tasks_run_fifo_including_nested() {
        let queue = TaskQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let (l1, q1) = (Rc::clone(&log), queue.clone());
        queue.defer(move || {
            l1.borrow_mut().push(1);
            let l3 = Rc::clone(&l1);
            q1.defer(move || l3.borrow_mut().push(3));
        });
        let l2 = Rc::clone(&log);
        queue.defer(move || l2.borrow_mut().push(2));

        assert_eq!(queue.run_until_idle(), 3);
        assert_eq!(*log.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn run_next_on_empty_queue() {
        let queue = TaskQueue::default();
        assert!(!queue.run_next());
        assert_eq!(queue.run_until_idle(), 0);
    }
}
