//! # Command Queue
//!
//! Deferred mutations executed on the scheduler thread.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │ Input       │──┐
//! └─────────────┘  │     ┌───────────────┐     ┌─────────────────┐
//! ┌─────────────┐  ├────>│ Command       │────>│ Scheduler       │
//! │ Scripting   │──┤     │ Channel (MPSC)│     │ (owns the world)│
//! └─────────────┘  │     └───────────────┘     └─────────────────┘
//! ┌─────────────┐  │
//! │ Tests       │──┘
//! └─────────────┘
//! ```
//!
//! Commands run one at a time between ticks with `&mut Simulation`, so they
//! can create bodies, register sprites and apply impulses without any lock.
//! Commands from one producer run in submission order.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};

use crate::error::{EngineError, EngineResult};
use crate::physics::PhysicsEngine;
use crate::simulation::Simulation;

/// A deferred mutation. Runs exactly once on the scheduler thread.
///
/// Returning an error is fatal: the scheduler stops and reports it.
pub type Command<P, S> = Box<dyn FnOnce(&mut Simulation<P, S>) -> EngineResult<()> + Send + 'static>;

/// Producer side of the command queue. Cheap to clone; any number of
/// threads may hold one.
pub struct CommandSender<P: PhysicsEngine, S> {
    sender: Sender<Command<P, S>>,
}

impl<P: PhysicsEngine, S> Clone for CommandSender<P, S> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<P: PhysicsEngine, S> CommandSender<P, S> {
    /// Queues `command`.
    ///
    /// Never blocks on an unbounded queue. On a bounded queue this blocks
    /// while the queue is full (back-pressure).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SchedulerStopped`] if the scheduler has exited.
    pub fn enqueue<F>(&self, command: F) -> EngineResult<()>
    where
        F: FnOnce(&mut Simulation<P, S>) -> EngineResult<()> + Send + 'static,
    {
        self.sender
            .send(Box::new(command))
            .map_err(|_| EngineError::SchedulerStopped)
    }

    /// Queues `command` without ever blocking.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CommandQueueFull`] if a bounded queue is full,
    /// [`EngineError::SchedulerStopped`] if the scheduler has exited.
    pub fn try_enqueue<F>(&self, command: F) -> EngineResult<()>
    where
        F: FnOnce(&mut Simulation<P, S>) -> EngineResult<()> + Send + 'static,
    {
        match self.sender.try_send(Box::new(command)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(EngineError::CommandQueueFull),
            Err(TrySendError::Disconnected(_)) => Err(EngineError::SchedulerStopped),
        }
    }

    /// Commands queued but not yet executed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.sender.len()
    }
}

/// Creates the queue. `None` capacity means unbounded.
pub(crate) fn command_queue<P: PhysicsEngine, S>(
    capacity: Option<usize>,
) -> (CommandSender<P, S>, Receiver<Command<P, S>>) {
    let (sender, receiver) = match capacity {
        Some(capacity) => bounded(capacity),
        None => unbounded(),
    };
    (CommandSender { sender }, receiver)
}
