//! # Physics Scheduler
//!
//! Dedicated thread that owns the [`Simulation`] and multiplexes three
//! event sources:
//!
//! ```text
//!            ┌──────────────┐
//!  ticker ──>│              │── Stepping: step, compute poses, publish
//!            │   select()   │
//!  commands >│  one event   │── run one command with &mut Simulation
//!            │  per loop    │
//!  stop ────>│              │── leave the loop, hand the Simulation back
//!            └──────────────┘
//! ```
//!
//! Exactly one ready event is handled per iteration; when several are
//! ready at once the pick is arbitrary. The ticker is created once and
//! drops ticks the thread could not take in time, so a slow step never
//! causes a burst of catch-up steps.

mod tick;

pub use tick::TickStats;

use std::any::Any;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, tick as ticker, Receiver, Select, Sender};
use tracing::{error, info, trace};

use crate::command::{command_queue, Command, CommandSender};
use crate::error::{EngineError, EngineResult};
use crate::physics::PhysicsEngine;
use crate::render::RenderFacade;
use crate::simulation::Simulation;
use crate::sync::PoseDoubleBuffer;

/// Observable state of the scheduler thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SchedulerPhase {
    /// Waiting on the tick timer, a command or the stop signal.
    Idle = 0,
    /// Running one physics update.
    Stepping = 1,
    /// Running one command.
    Command = 2,
    /// The loop has exited.
    Stopped = 3,
}

impl SchedulerPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Stepping,
            2 => Self::Command,
            _ => Self::Stopped,
        }
    }
}

/// What the scheduler thread returns when its loop ends.
struct SchedulerExit<P: PhysicsEngine, S> {
    simulation: Simulation<P, S>,
    failure: Option<EngineError>,
}

impl<P: PhysicsEngine, S: Send + Sync + 'static> Simulation<P, S> {
    /// Moves the simulation onto a new scheduler thread.
    ///
    /// Poses are published once before the thread starts, so the scene
    /// registered during setup is drawable immediately.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ThreadSpawn`] if the thread cannot be created.
    pub fn start(mut self) -> EngineResult<SchedulerHandle<P, S>> {
        self.publish_poses();

        let (commands, command_rx) = command_queue(self.config().command_capacity);
        let (shutdown, shutdown_rx) = bounded(1);
        let poses = Arc::clone(self.poses());
        let phase = Arc::new(AtomicU8::new(SchedulerPhase::Idle as u8));
        let thread_phase = Arc::clone(&phase);

        let thread = std::thread::Builder::new()
            .name("kinesis-physics".into())
            .spawn(move || run(self, &command_rx, &shutdown_rx, &thread_phase))
            .map_err(|err| EngineError::ThreadSpawn(err.to_string()))?;

        Ok(SchedulerHandle {
            commands,
            shutdown: Some(shutdown),
            thread: Some(thread),
            poses,
            phase,
        })
    }
}

/// The scheduler loop. Runs until stopped or until a command fails.
fn run<P: PhysicsEngine, S>(
    mut simulation: Simulation<P, S>,
    commands: &Receiver<Command<P, S>>,
    shutdown: &Receiver<()>,
    phase: &AtomicU8,
) -> SchedulerExit<P, S> {
    let config = simulation.config().clone();
    let timer = ticker(config.tick_interval());
    info!(
        tick_rate = config.tick_rate,
        velocity_iterations = config.velocity_iterations,
        position_iterations = config.position_iterations,
        bodies = simulation.registry().len(),
        "physics scheduler started"
    );

    let mut select = Select::new();
    let stop_op = select.recv(shutdown);
    let tick_op = select.recv(&timer);
    let command_op = select.recv(commands);

    let failure = loop {
        phase.store(SchedulerPhase::Idle as u8, Ordering::Release);
        let oper = select.select();
        let index = oper.index();

        if index == stop_op {
            // A message and a dropped handle both mean stop.
            let _ = oper.recv(shutdown);
            break None;
        } else if index == tick_op {
            let Ok(due) = oper.recv(&timer) else {
                break None;
            };
            phase.store(SchedulerPhase::Stepping as u8, Ordering::Release);
            // The ticker hands out the deadline of the tick it delivers; the
            // ones it dropped while this thread was busy fit in the delay.
            simulation.record_tick_delay(due.elapsed());
            let tick = simulation.tick();
            trace!(tick, "physics tick");
        } else {
            debug_assert_eq!(index, command_op);
            let Ok(command) = oper.recv(commands) else {
                break None;
            };
            phase.store(SchedulerPhase::Command as u8, Ordering::Release);
            if let Err(err) = command(&mut simulation) {
                error!(%err, tick = simulation.tick_count(), "command failed; stopping physics scheduler");
                break Some(err);
            }
        }
    };

    phase.store(SchedulerPhase::Stopped as u8, Ordering::Release);
    let stats = simulation.stats();
    info!(
        ticks = simulation.tick_count(),
        late_ticks = stats.late_ticks,
        max_tick_us = stats.max_tick_us,
        "physics scheduler stopped"
    );
    SchedulerExit {
        simulation,
        failure,
    }
}

/// Owner-side handle to a running scheduler.
///
/// Dropping the handle stops the scheduler and waits for its thread.
pub struct SchedulerHandle<P: PhysicsEngine, S> {
    commands: CommandSender<P, S>,
    shutdown: Option<Sender<()>>,
    thread: Option<JoinHandle<SchedulerExit<P, S>>>,
    poses: Arc<PoseDoubleBuffer<S>>,
    phase: Arc<AtomicU8>,
}

impl<P: PhysicsEngine, S> SchedulerHandle<P, S> {
    /// A new producer for the command queue.
    #[must_use]
    pub fn commands(&self) -> CommandSender<P, S> {
        self.commands.clone()
    }

    /// Queues a command. See [`CommandSender::enqueue`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SchedulerStopped`] if the scheduler has exited.
    pub fn enqueue<F>(&self, command: F) -> EngineResult<()>
    where
        F: FnOnce(&mut Simulation<P, S>) -> EngineResult<()> + Send + 'static,
    {
        self.commands.enqueue(command)
    }

    /// The shared front buffer.
    #[must_use]
    pub fn poses(&self) -> Arc<PoseDoubleBuffer<S>> {
        Arc::clone(&self.poses)
    }

    /// A render facade reading the published poses.
    #[must_use]
    pub fn render_facade(&self) -> RenderFacade<S> {
        RenderFacade::new(Arc::clone(&self.poses))
    }

    /// Current phase of the scheduler thread. Always
    /// [`SchedulerPhase::Stopped`] once the thread has ended, including by
    /// panic.
    #[must_use]
    pub fn phase(&self) -> SchedulerPhase {
        if !self.is_running() {
            return SchedulerPhase::Stopped;
        }
        SchedulerPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Returns true while the scheduler loop is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|thread| !thread.is_finished())
    }

    /// Signals the scheduler to stop, waits for it and returns the
    /// simulation in its final state.
    ///
    /// # Errors
    ///
    /// Returns the error of the command that stopped the scheduler, if one
    /// did, or [`EngineError::SchedulerPanicked`] if the thread panicked.
    pub fn stop(mut self) -> EngineResult<Simulation<P, S>> {
        self.signal_stop();
        self.join_thread()
    }

    /// Waits for the scheduler to exit on its own, without signalling it.
    ///
    /// The loop only exits by itself when a command fails or panics, so
    /// this blocks until one does.
    ///
    /// # Errors
    ///
    /// Same as [`SchedulerHandle::stop`].
    pub fn join(mut self) -> EngineResult<Simulation<P, S>> {
        self.join_thread()
    }

    fn signal_stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            // Fails only if the loop already exited.
            let _ = shutdown.send(());
        }
    }

    fn join_thread(&mut self) -> EngineResult<Simulation<P, S>> {
        // `stop` and `join` consume the handle and `Drop` checks first, so
        // the thread is always still there.
        let thread = self.thread.take().ok_or(EngineError::SchedulerStopped)?;
        let exit = thread
            .join()
            .map_err(|payload| EngineError::SchedulerPanicked(panic_message(payload.as_ref())))?;
        match exit.failure {
            Some(err) => Err(err),
            None => Ok(exit.simulation),
        }
    }
}

impl<P: PhysicsEngine, S> Drop for SchedulerHandle<P, S> {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.signal_stop();
            let _ = self.join_thread();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
