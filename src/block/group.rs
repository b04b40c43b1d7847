//! Cooperative lane groups.
//!
//! A group runs the same closure on `threads` lanes at once. Lanes only meet at
//! [`Lane::sync`], a barrier that every lane of the group must reach before any of them
//! continues. Apart from a start gate that holds lanes back until every lane thread exists,
//! there is no other coordination, so a lane that skips a barrier the others take deadlocks
//! the group.

use std::{
    io, panic,
    sync::{Barrier, Condvar, Mutex, PoisonError},
    thread::{self, ScopedJoinHandle},
};

/// One lane of a running group.
#[derive(Clone, Copy)]
pub struct Lane<'g> {
    linear_tid: usize,
    threads: usize,
    barrier: &'g Barrier,
}

impl Lane<'_> {
    #[inline(always)]
    pub fn linear_tid(&self) -> usize {
        self.linear_tid
    }

    /// Number of lanes in the group.
    #[inline(always)]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Waits until every lane of the group has reached this point.
    ///
    /// Everything a lane wrote to shared scratch before the barrier is visible to every lane
    /// after it.
    #[inline(always)]
    pub fn sync(&self) {
        crate::scope!("lane sync");
        self.barrier.wait();
    }
}

/// A fixed-size group of lanes backed by scoped OS threads.
#[derive(Clone, Copy, Debug)]
pub struct ThreadGroup {
    threads: usize,
}

impl ThreadGroup {
    pub fn new(threads: usize) -> Self {
        assert!(threads > 0, "a lane group needs at least one lane");
        Self { threads }
    }

    #[inline(always)]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Runs `func` on every lane and returns the lane results ordered by `linear_tid`.
    ///
    /// The last lane runs on the calling thread. A panic on any lane is resumed here once the
    /// group has been joined. If a lane thread cannot be spawned no lane runs `func` and this
    /// panics with the spawn error.
    pub fn run<R, F>(&self, func: F) -> Vec<R>
    where
        R: Send,
        F: Fn(Lane) -> R + Send + Sync,
    {
        self.run_with(func, |_linear_tid| Ok(thread::Builder::new()))
    }

    /// [`ThreadGroup::run`] with the thread builder of every spawned lane coming from
    /// `builder`. An error from `builder` is treated like a failed spawn.
    fn run_with<R, F, B>(&self, func: F, builder: B) -> Vec<R>
    where
        R: Send,
        F: Fn(Lane) -> R + Send + Sync,
        B: Fn(usize) -> io::Result<thread::Builder>,
    {
        crate::scope!("ThreadGroup::run");
        let threads = self.threads;
        let barrier = Barrier::new(threads);
        let gate = StartGate::default();
        let (barrier, gate, func) = (&barrier, &gate, &func);

        thread::scope(|s| {
            let mut handles: Vec<ScopedJoinHandle<'_, Option<R>>> =
                Vec::with_capacity(threads - 1);
            for linear_tid in 0..threads - 1 {
                let spawned = builder(linear_tid).and_then(|b| {
                    b.spawn_scoped(s, move || {
                        gate.wait().then(|| {
                            func(Lane {
                                linear_tid,
                                threads,
                                barrier,
                            })
                        })
                    })
                });
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(e) => {
                        // Lanes already spawned never reach the barrier, release them first
                        gate.set(GateState::Aborted);
                        for handle in handles {
                            let _ = handle.join();
                        }
                        panic!("failed to spawn lane {linear_tid} of {threads}: {e}");
                    }
                }
            }
            gate.set(GateState::Open);

            // Run the last one on this thread
            let last = func(Lane {
                linear_tid: threads - 1,
                threads,
                barrier,
            });

            let mut results: Vec<R> = handles
                .into_iter()
                .map(|h| match h.join() {
                    Ok(Some(result)) => result,
                    Ok(None) => unreachable!("lanes only skip their work when the group aborts"),
                    Err(e) => panic::resume_unwind(e),
                })
                .collect();
            results.push(last);
            results
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
enum GateState {
    #[default]
    Closed,
    Open,
    Aborted,
}

/// Holds spawned lanes back until the whole group exists.
#[derive(Default)]
struct StartGate {
    state: Mutex<GateState>,
    changed: Condvar,
}

impl StartGate {
    fn set(&self, state: GateState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
        self.changed.notify_all();
    }

    /// Blocks while the gate is closed. Returns true if the lane should run.
    fn wait(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let state = self
            .changed
            .wait_while(state, |state| *state == GateState::Closed)
            .unwrap_or_else(PoisonError::into_inner);
        *state == GateState::Open
    }
}
