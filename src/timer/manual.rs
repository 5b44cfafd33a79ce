use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use super::{Scheduler, TaskHandle};

enum Task {
    Once(Box<dyn FnOnce()>),
    Repeating {
        period_ms: u64,
        task: Box<dyn FnMut()>,
    },
}

#[derive(Default)]
struct Queue {
    now_ms: u64,
    next_seq: u64,
    next_id: u64,
    // (due_ms, seq) -> task. Entries whose handle is gone from `tasks` were cancelled.
    order: BTreeMap<(u64, u64), TaskHandle>,
    tasks: HashMap<TaskHandle, Task>,
    // Task currently executing, and whether it cancelled itself meanwhile.
    running: Option<(TaskHandle, bool)>,
}

impl Queue {
    fn enqueue(&mut self, handle: TaskHandle, due_ms: u64, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert((due_ms, seq), handle);
        self.tasks.insert(handle, task);
    }

    fn allocate(&mut self) -> TaskHandle {
        let handle = TaskHandle::new(self.next_id);
        self.next_id += 1;
        handle
    }
}

/// Deterministic scheduler driven by a virtual millisecond clock.
///
/// Nothing runs until [`ManualScheduler::advance_by`] is called. Tasks due at
/// the same instant run in the order they were (re)queued; a repeating task is
/// requeued after each run, so a one-shot registered before that run wins a tie.
#[derive(Default)]
pub struct ManualScheduler {
    queue: RefCell<Queue>,
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let queue = self.queue.borrow();
        f.debug_struct("ManualScheduler")
            .field("now_ms", &queue.now_ms)
            .field("pending", &queue.tasks.len())
            .finish()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now_ms(&self) -> u64 {
        self.queue.borrow().now_ms
    }

    /// Number of live (not yet finished, not cancelled) tasks.
    pub fn pending(&self) -> usize {
        self.queue.borrow().tasks.len()
    }

    /// Moves the clock forward by `ms`, running every task that falls due.
    pub fn advance_by(&self, ms: u64) {
        let target = self.queue.borrow().now_ms + ms;
        loop {
            // Borrow is released before the task runs so it can reach the scheduler.
            let (handle, due_ms, task) = {
                let mut queue = self.queue.borrow_mut();
                let Some((&(due_ms, seq), &handle)) = queue.order.iter().next() else {
                    break;
                };
                if due_ms > target {
                    break;
                }
                queue.order.remove(&(due_ms, seq));
                let Some(task) = queue.tasks.remove(&handle) else {
                    continue;
                };
                queue.now_ms = due_ms;
                queue.running = Some((handle, false));
                (handle, due_ms, task)
            };

            match task {
                Task::Once(task) => {
                    task();
                    self.queue.borrow_mut().running = None;
                }
                Task::Repeating {
                    period_ms,
                    mut task,
                } => {
                    task();
                    let mut queue = self.queue.borrow_mut();
                    let cancelled = matches!(queue.running.take(), Some((_, true)));
                    if !cancelled {
                        queue.enqueue(
                            handle,
                            due_ms + period_ms,
                            Task::Repeating { period_ms, task },
                        );
                    }
                }
            }
        }
        self.queue.borrow_mut().now_ms = target;
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskHandle {
        let mut queue = self.queue.borrow_mut();
        let handle = queue.allocate();
        let due = queue.now_ms + u64::from(delay_ms);
        queue.enqueue(handle, due, Task::Once(task));
        handle
    }

    fn schedule_repeating(&self, period_ms: u32, task: Box<dyn FnMut()>) -> TaskHandle {
        // A zero period would never let the clock move.
        let period_ms = u64::from(period_ms.max(1));
        let mut queue = self.queue.borrow_mut();
        let handle = queue.allocate();
        let due = queue.now_ms + period_ms;
        queue.enqueue(handle, due, Task::Repeating { period_ms, task });
        handle
    }

    fn cancel(&self, handle: TaskHandle) {
        let mut queue = self.queue.borrow_mut();
        if queue.tasks.remove(&handle).is_none() {
            if let Some((running, cancelled)) = queue.running.as_mut() {
                if *running == handle {
                    *cancelled = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn once_runs_at_its_due_time() {
        let sched = Rc::new(ManualScheduler::new());
        let fired_at = Rc::new(Cell::new(None));
        let seen = fired_at.clone();
        let weak = Rc::downgrade(&sched);
        sched.schedule_once(
            150,
            Box::new(move || {
                seen.set(weak.upgrade().map(|s| s.now_ms()));
            }),
        );
        sched.advance_by(149);
        assert_eq!(fired_at.get(), None);
        sched.advance_by(30);
        assert_eq!(fired_at.get(), Some(150));
        assert_eq!(sched.now_ms(), 179);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn repeating_fires_every_period_until_cancelled() {
        let sched = ManualScheduler::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let handle = sched.schedule_repeating(20, Box::new(move || c.set(c.get() + 1)));
        sched.advance_by(100);
        assert_eq!(count.get(), 5);
        sched.cancel(handle);
        sched.advance_by(100);
        assert_eq!(count.get(), 5);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn one_shot_wins_tie_against_requeued_interval() {
        let sched = Rc::new(ManualScheduler::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        let tick = sched.schedule_repeating(20, Box::new(move || l.borrow_mut().push("tick")));
        let l = log.clone();
        let weak = Rc::downgrade(&sched);
        sched.schedule_once(
            60,
            Box::new(move || {
                l.borrow_mut().push("done");
                if let Some(s) = weak.upgrade() {
                    s.cancel(tick);
                }
            }),
        );
        sched.advance_by(200);
        assert_eq!(*log.borrow(), vec!["tick", "tick", "done"]);
    }

    #[test]
    fn repeating_task_can_cancel_itself() {
        let sched = Rc::new(ManualScheduler::new());
        let count = Rc::new(Cell::new(0));
        let own: Rc<Cell<Option<TaskHandle>>> = Rc::new(Cell::new(None));
        let (c, o, weak) = (count.clone(), own.clone(), Rc::downgrade(&sched));
        let handle = sched.schedule_repeating(
            10,
            Box::new(move || {
                c.set(c.get() + 1);
                if c.get() == 3 {
                    if let (Some(s), Some(h)) = (weak.upgrade(), o.get()) {
                        s.cancel(h);
                    }
                }
            }),
        );
        own.set(Some(handle));
        sched.advance_by(1_000);
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn cancel_is_idempotent_for_unknown_handles() {
        let sched = ManualScheduler::new();
        let h = sched.schedule_once(5, Box::new(|| {}));
        sched.cancel(h);
        sched.cancel(h);
        sched.cancel(TaskHandle::new(999));
        sched.advance_by(10);
        assert_eq!(sched.pending(), 0);
    }
}
