// src/executor.rs

use std::thread::{JoinHandle, ThreadId};

use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// A single dedicated OS thread with a FIFO task queue (§5 "actor
/// executors"). Nothing posted to an `Executor` ever runs concurrently
/// with anything else posted to the same `Executor`; cross-executor
/// delivery preserves per-edge FIFO order by construction (channel send
/// order == receive order).
pub struct Executor {
    owning_thread: ThreadId,
    sender: Option<UnboundedSender<Task>>,
    thread: Option<JoinHandle<()>>,
}

impl Executor {
    /// Spawns the executor's thread and starts its task loop.
    pub fn spawn(name: &str) -> Self {
        let (sender, mut receiver) = unbounded_channel::<Task>();
        let thread = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                while let Some(task) = receiver.blocking_recv() {
                    task();
                }
            })
            .expect("failed to spawn executor thread");

        // There's no race reading thread().id() here: the thread is
        // already running (spawn() returns after the OS thread starts),
        // and JoinHandle::thread() reports metadata, not a rendezvous.
        let owning_thread = thread.thread().id();

        Self { owning_thread, sender: Some(sender), thread: Some(thread) }
    }

    pub fn owning_thread(&self) -> ThreadId {
        self.owning_thread
    }

    pub fn is_current_thread(&self) -> bool {
        std::thread::current().id() == self.owning_thread
    }

    /// Posts a one-way task; never blocks the caller (§5 "Suspension
    /// points"). Silently dropped if the executor has already been torn
    /// down, matching "any outstanding inbound task observing a torn-down
    /// manager is a no-op" (§5 "Cancellation & timeouts").
    pub fn post(&self, task: impl FnOnce() + Send + 'static) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(Box::new(task));
        }
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        // Close the channel first so the thread's receive loop ends, then
        // join so in-flight tasks finish before we return.
        self.sender.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
