//! Background execution of cost matrix construction and solving
//!
//! A [`MosaicWorker`] owns one thread. Requests travel to it over a channel and
//! progress plus a single terminal event per request travel back, so the caller never
//! blocks on the computation and no state is shared between the two sides.

use crate::algorithm::solver::{Assignment, DuplicatePolicy, SolveStrategy, solve_with_strategy};
use crate::analysis::cost::{CostMatrix, validate_descriptors};
use crate::analysis::descriptor::Descriptor;
use crate::io::error::{MosaicError, Result};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

/// Everything the worker needs for one run
#[derive(Clone, Debug, PartialEq)]
pub struct ComputeRequest {
    /// Descriptors of the grid cells in row-major order
    pub cell_descriptors: Vec<Descriptor>,
    /// Descriptors of the available tiles
    pub tile_descriptors: Vec<Descriptor>,
    /// Whether and how often tiles may repeat
    pub policy: DuplicatePolicy,
    /// Algorithm used when tiles may not repeat
    pub strategy: SolveStrategy,
}

impl ComputeRequest {
    /// Create a request using the default solve strategy
    pub fn new(
        cell_descriptors: Vec<Descriptor>,
        tile_descriptors: Vec<Descriptor>,
        policy: DuplicatePolicy,
    ) -> Self {
        Self {
            cell_descriptors,
            tile_descriptors,
            policy,
            strategy: SolveStrategy::default(),
        }
    }

    /// Replace the solve strategy
    #[must_use]
    pub const fn with_strategy(mut self, strategy: SolveStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Check the request before any work is scheduled
    ///
    /// # Errors
    ///
    /// Returns an error if a descriptor list is empty, descriptor kinds are mixed, or
    /// the duplicate policy is invalid
    pub fn validate(&self) -> Result<()> {
        validate_descriptors(&self.cell_descriptors, &self.tile_descriptors)?;
        self.policy.validate()?;
        Ok(())
    }
}

/// Identifier tagging every event of one run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(u64);

impl RunId {
    /// Numeric value of the identifier
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Message sent from the worker back to the caller
#[derive(Clone, Debug, PartialEq)]
pub enum WorkerEvent {
    /// Fraction of the run completed, non-decreasing within a run
    Progress {
        /// Run the update belongs to
        run_id: RunId,
        /// Completed fraction in `[0, 1]`
        fraction: f64,
    },
    /// Run finished; always preceded by a progress update of 1.0
    Done {
        /// Run that finished
        run_id: RunId,
        /// Tile chosen for each cell
        assignment: Assignment,
    },
    /// Run aborted by an internal fault
    Failed {
        /// Run that failed
        run_id: RunId,
        /// Description of the fault
        reason: String,
    },
}

impl WorkerEvent {
    /// Run the event belongs to
    pub const fn run_id(&self) -> RunId {
        match self {
            Self::Progress { run_id, .. }
            | Self::Done { run_id, .. }
            | Self::Failed { run_id, .. } => *run_id,
        }
    }

    /// Whether this is the last event of its run
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}

struct Job {
    run_id: RunId,
    request: ComputeRequest,
}

/// Handle to the background thread computing assignments
///
/// At most one run is in flight at a time. Dropping the handle lets the current run
/// finish and then joins the thread.
pub struct MosaicWorker {
    jobs: Option<Sender<Job>>,
    events: Receiver<WorkerEvent>,
    thread: Option<JoinHandle<()>>,
    next_run: u64,
    in_flight: Option<RunId>,
}

impl MosaicWorker {
    /// Start a worker whose random fallbacks come from a seeded generator
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned
    pub fn spawn(seed: u64) -> Result<Self> {
        Self::spawn_with_rng(StdRng::seed_from_u64(seed))
    }

    /// Start a worker drawing random fallbacks from `rng`
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned
    pub fn spawn_with_rng<R>(rng: R) -> Result<Self>
    where
        R: Rng + Send + 'static,
    {
        let (job_sender, job_receiver) = mpsc::channel();
        let (event_sender, event_receiver) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("mosaic-worker".to_string())
            .spawn(move || worker_loop(&job_receiver, &event_sender, rng))
            .map_err(|e| MosaicError::WorkerFailure {
                run_id: None,
                reason: format!("failed to spawn worker thread: {e}"),
            })?;

        Ok(Self {
            jobs: Some(job_sender),
            events: event_receiver,
            thread: Some(thread),
            next_run: 1,
            in_flight: None,
        })
    }

    /// Validate a request and hand it to the worker
    ///
    /// Invalid requests are rejected here and produce no events.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - another run has not delivered its terminal event yet
    /// - the request is invalid
    /// - the worker thread has stopped
    pub fn submit(&mut self, request: ComputeRequest) -> Result<RunId> {
        if let Some(run_id) = self.in_flight {
            return Err(MosaicError::RunInFlight {
                run_id: run_id.get(),
            });
        }
        request.validate()?;

        let run_id = RunId(self.next_run);
        let stopped = |reason: String| MosaicError::WorkerFailure {
            run_id: Some(run_id.get()),
            reason,
        };
        self.jobs
            .as_ref()
            .ok_or_else(|| stopped("worker has shut down".to_string()))?
            .send(Job { run_id, request })
            .map_err(|e| stopped(format!("worker thread has stopped: {e}")))?;

        self.next_run += 1;
        self.in_flight = Some(run_id);
        Ok(run_id)
    }

    /// Run currently being computed
    pub const fn in_flight(&self) -> Option<RunId> {
        self.in_flight
    }

    /// Block until the next event arrives
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread has stopped
    pub fn recv(&mut self) -> Result<WorkerEvent> {
        let event = self.events.recv().map_err(|e| MosaicError::WorkerFailure {
            run_id: self.in_flight.map(RunId::get),
            reason: format!("event channel closed: {e}"),
        })?;
        self.observe(&event);
        Ok(event)
    }

    /// Take the next event if one is ready, without blocking
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread has stopped
    pub fn try_recv(&mut self) -> Result<Option<WorkerEvent>> {
        match self.events.try_recv() {
            Ok(event) => {
                self.observe(&event);
                Ok(Some(event))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(e @ TryRecvError::Disconnected) => Err(MosaicError::WorkerFailure {
                run_id: self.in_flight.map(RunId::get),
                reason: format!("event channel closed: {e}"),
            }),
        }
    }

    /// Block until `run_id` finishes, forwarding its progress
    ///
    /// Events of other runs are discarded as stale.
    ///
    /// # Errors
    ///
    /// Returns an error if `run_id` is not in flight, the run fails, or the worker
    /// thread stops
    pub fn wait<F>(&mut self, run_id: RunId, mut on_progress: F) -> Result<Assignment>
    where
        F: FnMut(f64),
    {
        if self.in_flight != Some(run_id) {
            return Err(MosaicError::WorkerFailure {
                run_id: Some(run_id.get()),
                reason: "run is not in flight".to_string(),
            });
        }

        loop {
            match self.recv()? {
                WorkerEvent::Progress {
                    run_id: id,
                    fraction,
                } if id == run_id => on_progress(fraction),
                WorkerEvent::Done {
                    run_id: id,
                    assignment,
                } if id == run_id => return Ok(assignment),
                WorkerEvent::Failed { run_id: id, reason } if id == run_id => {
                    return Err(MosaicError::WorkerFailure {
                        run_id: Some(id.get()),
                        reason,
                    });
                }
                _ => {}
            }
        }
    }

    fn observe(&mut self, event: &WorkerEvent) {
        if event.is_terminal() && self.in_flight == Some(event.run_id()) {
            self.in_flight = None;
        }
    }
}

impl Drop for MosaicWorker {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop after the current run
        self.jobs.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn worker_loop<R: Rng>(jobs: &Receiver<Job>, events: &Sender<WorkerEvent>, mut rng: R) {
    for Job { run_id, request } in jobs {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            run_job(&request, run_id, events, &mut rng)
        }));

        let terminal = match outcome {
            Ok(Ok(assignment)) => WorkerEvent::Done { run_id, assignment },
            Ok(Err(error)) => WorkerEvent::Failed {
                run_id,
                reason: error.to_string(),
            },
            Err(payload) => WorkerEvent::Failed {
                run_id,
                reason: panic_message(payload.as_ref()),
            },
        };

        if events.send(terminal).is_err() {
            break;
        }
    }
}

fn run_job<R: Rng + ?Sized>(
    request: &ComputeRequest,
    run_id: RunId,
    events: &Sender<WorkerEvent>,
    rng: &mut R,
) -> Result<Assignment> {
    let mut progress = ProgressEmitter::new(run_id, events);

    let cost = CostMatrix::build_with_progress(
        &request.cell_descriptors,
        &request.tile_descriptors,
        |fraction| progress.emit(fraction),
    )?;
    let assignment = solve_with_strategy(&cost, request.policy, request.strategy, rng)?;

    progress.emit(1.0);
    Ok(assignment)
}

/// Sends clamped, non-decreasing progress for one run
struct ProgressEmitter<'a> {
    run_id: RunId,
    events: &'a Sender<WorkerEvent>,
    last: f64,
}

impl<'a> ProgressEmitter<'a> {
    const fn new(run_id: RunId, events: &'a Sender<WorkerEvent>) -> Self {
        Self {
            run_id,
            events,
            last: 0.0,
        }
    }

    fn emit(&mut self, fraction: f64) {
        let fraction = fraction.clamp(0.0, 1.0).max(self.last);
        self.last = fraction;
        // A closed channel surfaces when the terminal event is sent
        let _ = self.events.send(WorkerEvent::Progress {
            run_id: self.run_id,
            fraction,
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .map_or_else(
            || "worker panicked".to_string(),
            |message| format!("worker panicked: {message}"),
        )
}
