//! The next-event M/M/1 simulation loop
//!
//! Each step jumps the clock to the nearer of the two pending events (ties go
//! to the arrival), charges the elapsed interval to the accumulators, and
//! applies the event. The loop is bounded by time, not by customer count: an
//! event scheduled past the horizon is never processed, and the last interval
//! is only accumulated up to the horizon.
//!
//! Random draws happen in a fixed order: on an arrival, a service time first
//! (only if the server was idle) and then the next inter-arrival time; on a
//! departure, a service time if someone was waiting.
//!
//! # Example
//!
//! ```
//! use qsim_core::{Mm1Simulation, SimulationConfig};
//!
//! let config = SimulationConfig::new(4.0, 12.0).with_seed(42).with_horizon(10_000.0);
//! let results = Mm1Simulation::new(config)?.run()?;
//! assert!(results.server_utilization > 0.0);
//! # Ok::<(), qsim_core::SimError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::aggregate::SimulationResults;
use crate::config::SimulationConfig;
use crate::dists::ExponentialVariate;
use crate::error::SimError;
use crate::logging::{diagnostics, events, simulation_span};
use crate::randomness::{RandomProvider, SeededRandomProvider};
use crate::state::{ArrivalOutcome, CompletedCustomer, EventKind, QueueState, SimulationState};
use crate::SimTime;

/// Snapshot handed to observers after every processed event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub time: SimTime,
    pub kind: EventKind,
    /// Queue state after the event was applied
    pub queue: QueueState,
}

/// Hook for collecting extra data while a run progresses.
///
/// Observers see the run; they cannot change it.
pub trait SimulationObserver {
    fn on_event(&mut self, _event: &EventRecord) {}

    fn on_customer_completed(&mut self, _customer: &CompletedCustomer) {}
}

impl SimulationObserver for () {}

/// Fan out to two observers, first `A` then `B`.
impl<A: SimulationObserver, B: SimulationObserver> SimulationObserver for (A, B) {
    fn on_event(&mut self, event: &EventRecord) {
        self.0.on_event(event);
        self.1.on_event(event);
    }

    fn on_customer_completed(&mut self, customer: &CompletedCustomer) {
        self.0.on_customer_completed(customer);
        self.1.on_customer_completed(customer);
    }
}

/// Result of a single [`Mm1Simulation::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Processed(EventKind),
    /// The clock has reached the horizon
    Finished,
}

/// One M/M/1 run from time zero to the configured horizon.
pub struct Mm1Simulation<R: RandomProvider = SeededRandomProvider> {
    config: SimulationConfig,
    horizon: SimTime,
    arrivals: ExponentialVariate,
    service: ExponentialVariate,
    rng: R,
    state: SimulationState,
    events_processed: u64,
}

impl Mm1Simulation<SeededRandomProvider> {
    /// Create a run seeded from `config.seed` (entropy when `None`).
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        let rng = SeededRandomProvider::new(config.seed);
        events::provider_seeded(rng.seed());
        Self::with_provider(config, rng)
    }
}

impl<R: RandomProvider> Mm1Simulation<R> {
    /// Create a run drawing from a caller-supplied provider.
    ///
    /// Inputs are validated before anything is drawn; the first inter-arrival
    /// time is drawn here so the arrival is pending from time zero.
    pub fn with_provider(config: SimulationConfig, mut rng: R) -> Result<Self, SimError> {
        config.validate()?;
        let arrivals = ExponentialVariate::inter_arrival(config.arrival_rate)?;
        let service = ExponentialVariate::service(config.service_rate)?;
        let horizon = SimTime::try_from_minutes(config.horizon)?;

        if !config.is_stable() {
            diagnostics::unstable_configuration(config.arrival_rate, config.service_rate);
        }

        let first_arrival = arrivals.sample(&mut rng)?;
        let state = SimulationState::new(SimTime::zero() + first_arrival);

        Ok(Self {
            config,
            horizon,
            arrivals,
            service,
            rng,
            state,
            events_processed: 0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn time(&self) -> SimTime {
        self.state.time()
    }

    pub fn horizon(&self) -> SimTime {
        self.horizon
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    pub fn is_finished(&self) -> bool {
        self.state.time() >= self.horizon
    }

    /// Process the next event.
    pub fn step(&mut self) -> Result<StepOutcome, SimError> {
        self.step_with(&mut ())
    }

    /// Process the next event, reporting it to `observer`.
    pub fn step_with(
        &mut self,
        observer: &mut dyn SimulationObserver,
    ) -> Result<StepOutcome, SimError> {
        if self.is_finished() {
            return Ok(StepOutcome::Finished);
        }

        let (next_time, kind) = self.state.pending().next();
        if next_time > self.horizon {
            self.state.advance_to(self.horizon)?;
            events::horizon_reached(self.horizon, self.state.queue().n_system);
            return Ok(StepOutcome::Finished);
        }
        self.state.advance_to(next_time)?;

        match kind {
            EventKind::Arrival => {
                if self.state.record_arrival() == ArrivalOutcome::EnteredService {
                    let service_time = self.service.sample(&mut self.rng)?;
                    self.state.schedule_departure(service_time);
                }
                let inter_arrival = self.arrivals.sample(&mut self.rng)?;
                self.state.schedule_arrival(inter_arrival);
            }
            EventKind::Departure => {
                let outcome = self.state.record_departure()?;
                if outcome.next_in_service {
                    let service_time = self.service.sample(&mut self.rng)?;
                    self.state.schedule_departure(service_time);
                }
                observer.on_customer_completed(&outcome.completed);
            }
        }

        self.events_processed += 1;
        let record = EventRecord {
            time: self.state.time(),
            kind,
            queue: *self.state.queue(),
        };
        events::event_processed(record.time, record.kind, &record.queue);
        observer.on_event(&record);

        Ok(StepOutcome::Processed(kind))
    }

    /// Run to the horizon and aggregate.
    pub fn run(self) -> Result<SimulationResults, SimError> {
        self.run_with_observer(&mut ())
    }

    /// Run to the horizon, reporting every event to `observer`, and aggregate.
    pub fn run_with_observer(
        mut self,
        observer: &mut dyn SimulationObserver,
    ) -> Result<SimulationResults, SimError> {
        let span = simulation_span(
            self.config.arrival_rate,
            self.config.service_rate,
            self.config.seed,
        );
        let _enter = span.enter();
        events::simulation_started(self.horizon, self.config.rho());

        while self.step_with(observer)? != StepOutcome::Finished {}

        let results =
            SimulationResults::from_accumulators(self.state.accumulators(), self.config.horizon);
        events::simulation_completed(
            self.state.time(),
            self.events_processed,
            results.customers_served,
        );
        Ok(results)
    }
}

/// Convenience: validate, run and aggregate one configuration.
pub fn simulate(config: SimulationConfig) -> Result<SimulationResults, SimError> {
    Mm1Simulation::new(config)?.run()
}
