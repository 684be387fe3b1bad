//! Clock, queue state and time-weighted accumulators for one run
//!
//! Everything the event loop mutates lives in [`SimulationState`]. The engine
//! threads one value through the loop and hands it to the aggregator at the
//! end; nothing here draws random numbers.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::error::SimError;
use crate::SimTime;

/// Server status for the single server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerStatus {
    Idle,
    Busy,
}

/// Kind of the next pending event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Arrival,
    Departure,
}

/// Instantaneous queue state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueState {
    /// Customers in the system (waiting plus in service)
    pub n_system: usize,
    /// Customers waiting for the server
    pub n_queue: usize,
    pub server: ServerStatus,
}

impl QueueState {
    fn empty() -> Self {
        Self {
            n_system: 0,
            n_queue: 0,
            server: ServerStatus::Idle,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.server == ServerStatus::Busy
    }
}

/// Timestamps of the two pending events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingEvents {
    /// Always finite once the run has started
    pub next_arrival: SimTime,
    /// `SimTime::INFINITY` while the server is idle
    pub next_departure: SimTime,
}

impl PendingEvents {
    /// The nearer pending event. Ties go to the arrival.
    pub fn next(&self) -> (SimTime, EventKind) {
        if self.next_arrival <= self.next_departure {
            (self.next_arrival, EventKind::Arrival)
        } else {
            (self.next_departure, EventKind::Departure)
        }
    }
}

/// Running area-under-curve sums and per-customer totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Accumulators {
    /// ∫ n_system dt
    pub system_area: f64,
    /// ∫ n_queue dt
    pub queue_area: f64,
    /// Total time spent with exactly `n` customers present, grown on demand
    pub state_time: BTreeMap<usize, f64>,
    /// Customers that completed service before the horizon
    pub customers_served: u64,
    /// Sum of queue waits over completed customers
    pub total_queue_time: f64,
    /// Sum of sojourn times over completed customers
    pub total_system_time: f64,
    /// Time covered by the accumulated intervals
    pub observed_time: f64,
}

impl Accumulators {
    fn accumulate(&mut self, elapsed: f64, queue: &QueueState) {
        if elapsed <= 0.0 {
            return;
        }
        self.system_area += elapsed * queue.n_system as f64;
        self.queue_area += elapsed * queue.n_queue as f64;
        *self.state_time.entry(queue.n_system).or_insert(0.0) += elapsed;
        self.observed_time += elapsed;
    }

    fn credit(&mut self, customer: &CompletedCustomer) {
        self.customers_served += 1;
        self.total_queue_time += customer.queue_time();
        self.total_system_time += customer.system_time();
    }
}

/// A customer that has left the system
///
/// A customer carries no identity beyond its arrival timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletedCustomer {
    pub arrived_at: SimTime,
    pub service_started: SimTime,
    pub departed_at: SimTime,
}

impl CompletedCustomer {
    /// Minutes spent waiting in the queue
    pub fn queue_time(&self) -> f64 {
        self.service_started - self.arrived_at
    }

    /// Minutes spent in the system (wait plus service)
    pub fn system_time(&self) -> f64 {
        self.departed_at - self.arrived_at
    }

    pub fn service_time(&self) -> f64 {
        self.departed_at - self.service_started
    }
}

/// What happened to an arriving customer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalOutcome {
    /// Server was idle; a service time must be drawn
    EnteredService,
    /// Server was busy; customer joined the queue at this position (1-based)
    Queued { position: usize },
}

/// What happened at a service completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepartureOutcome {
    pub completed: CompletedCustomer,
    /// The head of the queue entered service; a service time must be drawn
    pub next_in_service: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct InService {
    arrived_at: SimTime,
    service_started: SimTime,
}

/// The whole mutable state of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    clock: SimTime,
    queue: QueueState,
    pending: PendingEvents,
    /// Arrival timestamps of waiting customers, FIFO
    waiting: VecDeque<SimTime>,
    in_service: Option<InService>,
    accumulators: Accumulators,
}

impl SimulationState {
    /// Fresh state at time zero with the first arrival already scheduled.
    pub fn new(first_arrival: SimTime) -> Self {
        Self {
            clock: SimTime::zero(),
            queue: QueueState::empty(),
            pending: PendingEvents {
                next_arrival: first_arrival,
                next_departure: SimTime::INFINITY,
            },
            waiting: VecDeque::new(),
            in_service: None,
            accumulators: Accumulators::default(),
        }
    }

    pub fn time(&self) -> SimTime {
        self.clock
    }

    pub fn queue(&self) -> &QueueState {
        &self.queue
    }

    pub fn pending(&self) -> &PendingEvents {
        &self.pending
    }

    pub fn waiting(&self) -> &VecDeque<SimTime> {
        &self.waiting
    }

    pub fn accumulators(&self) -> &Accumulators {
        &self.accumulators
    }

    pub fn into_accumulators(self) -> Accumulators {
        self.accumulators
    }

    /// Move the clock to `t`, charging the elapsed interval to the current state.
    ///
    /// Returns the elapsed minutes.
    pub fn advance_to(&mut self, t: SimTime) -> Result<f64, SimError> {
        if t < self.clock {
            return Err(SimError::ScheduleInPast {
                now: self.clock,
                requested: t,
            });
        }
        let elapsed = t - self.clock;
        self.accumulators.accumulate(elapsed, &self.queue);
        self.clock = t;
        Ok(elapsed)
    }

    /// Admit a customer at the current time.
    pub fn record_arrival(&mut self) -> ArrivalOutcome {
        let now = self.clock;
        self.queue.n_system += 1;
        match self.queue.server {
            ServerStatus::Idle => {
                self.queue.server = ServerStatus::Busy;
                self.in_service = Some(InService {
                    arrived_at: now,
                    service_started: now,
                });
                ArrivalOutcome::EnteredService
            }
            ServerStatus::Busy => {
                self.waiting.push_back(now);
                self.queue.n_queue += 1;
                ArrivalOutcome::Queued {
                    position: self.waiting.len(),
                }
            }
        }
    }

    /// Complete the customer in service at the current time.
    ///
    /// Pulls the head of the queue into service if anyone is waiting,
    /// otherwise idles the server and clears the pending departure.
    pub fn record_departure(&mut self) -> Result<DepartureOutcome, SimError> {
        let now = self.clock;
        let served = self.in_service.take().ok_or_else(|| {
            SimError::Internal(format!("departure at {now} with no customer in service"))
        })?;

        let completed = CompletedCustomer {
            arrived_at: served.arrived_at,
            service_started: served.service_started,
            departed_at: now,
        };
        self.queue.n_system -= 1;
        self.accumulators.credit(&completed);

        let next_in_service = match self.waiting.pop_front() {
            Some(arrived_at) => {
                self.queue.n_queue -= 1;
                self.in_service = Some(InService {
                    arrived_at,
                    service_started: now,
                });
                true
            }
            None => {
                self.queue.server = ServerStatus::Idle;
                self.pending.next_departure = SimTime::INFINITY;
                false
            }
        };

        Ok(DepartureOutcome {
            completed,
            next_in_service,
        })
    }

    /// Schedule the next arrival `inter_arrival` minutes from now.
    pub fn schedule_arrival(&mut self, inter_arrival: f64) {
        self.pending.next_arrival = self.clock + inter_arrival;
    }

    /// Schedule the in-service customer's departure `service_time` minutes from now.
    pub fn schedule_departure(&mut self, service_time: f64) {
        self.pending.next_departure = self.clock + service_time;
    }

    /// Check the single-server bookkeeping invariants.
    pub fn check_invariants(&self) -> Result<(), SimError> {
        let q = &self.queue;
        let expected_queue = q.n_system.saturating_sub(1);
        let consistent = q.n_queue == expected_queue
            && q.n_queue == self.waiting.len()
            && (q.n_system == 0) == (q.server == ServerStatus::Idle)
            && self.in_service.is_some() == q.is_busy()
            && (q.is_busy() || !self.pending.next_departure.is_finite());
        if consistent {
            Ok(())
        } else {
            Err(SimError::Internal(format!(
                "inconsistent queue state at {}: {:?}, {} waiting",
                self.clock,
                q,
                self.waiting.len()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(minutes: f64) -> SimTime {
        SimTime::from_minutes(minutes)
    }

    #[test]
    fn test_new_state_is_empty_and_idle() {
        let state = SimulationState::new(at(3.0));

        assert_eq!(state.time(), SimTime::zero());
        assert_eq!(state.queue().n_system, 0);
        assert_eq!(state.queue().server, ServerStatus::Idle);
        assert_eq!(state.pending().next(), (at(3.0), EventKind::Arrival));
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_pending_tie_goes_to_arrival() {
        let pending = PendingEvents {
            next_arrival: at(5.0),
            next_departure: at(5.0),
        };
        assert_eq!(pending.next(), (at(5.0), EventKind::Arrival));

        let pending = PendingEvents {
            next_arrival: at(5.0),
            next_departure: at(4.0),
        };
        assert_eq!(pending.next(), (at(4.0), EventKind::Departure));
    }

    #[test]
    fn test_advance_accumulates_time_weighted_areas() {
        let mut state = SimulationState::new(at(1.0));
        state.advance_to(at(1.0)).unwrap();
        assert_eq!(state.record_arrival(), ArrivalOutcome::EnteredService);
        state.schedule_departure(10.0);

        state.advance_to(at(2.0)).unwrap();
        assert_eq!(state.record_arrival(), ArrivalOutcome::Queued { position: 1 });

        let elapsed = state.advance_to(at(5.0)).unwrap();
        assert_eq!(elapsed, 3.0);

        let acc = state.accumulators();
        // [0,1) empty, [1,2) one customer, [2,5) two customers with one waiting
        assert_eq!(acc.system_area, 1.0 + 6.0);
        assert_eq!(acc.queue_area, 3.0);
        assert_eq!(acc.state_time.get(&0), Some(&1.0));
        assert_eq!(acc.state_time.get(&1), Some(&1.0));
        assert_eq!(acc.state_time.get(&2), Some(&3.0));
        assert_eq!(acc.observed_time, 5.0);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_zero_length_interval_does_not_create_state_entry() {
        let mut state = SimulationState::new(at(0.0));
        state.advance_to(SimTime::zero()).unwrap();
        assert!(state.accumulators().state_time.is_empty());
    }

    #[test]
    fn test_advance_backwards_is_rejected() {
        let mut state = SimulationState::new(at(1.0));
        state.advance_to(at(4.0)).unwrap();

        let err = state.advance_to(at(2.0)).unwrap_err();
        assert!(matches!(err, SimError::ScheduleInPast { .. }));
        assert_eq!(state.time(), at(4.0));
    }

    #[test]
    fn test_departure_moves_queue_head_into_service() {
        let mut state = SimulationState::new(at(1.0));
        state.advance_to(at(1.0)).unwrap();
        state.record_arrival();
        state.schedule_departure(4.0);
        state.advance_to(at(2.0)).unwrap();
        state.record_arrival();

        state.advance_to(at(5.0)).unwrap();
        let outcome = state.record_departure().unwrap();

        assert!(outcome.next_in_service);
        assert_eq!(outcome.completed.queue_time(), 0.0);
        assert_eq!(outcome.completed.system_time(), 4.0);
        assert_eq!(state.queue().n_system, 1);
        assert_eq!(state.queue().n_queue, 0);
        assert!(state.queue().is_busy());
        assert_eq!(state.accumulators().customers_served, 1);

        state.schedule_departure(1.0);
        state.advance_to(at(6.0)).unwrap();
        let outcome = state.record_departure().unwrap();

        assert!(!outcome.next_in_service);
        assert_eq!(outcome.completed.queue_time(), 3.0);
        assert_eq!(outcome.completed.system_time(), 4.0);
        assert_eq!(outcome.completed.service_time(), 1.0);
        assert_eq!(state.queue().server, ServerStatus::Idle);
        assert_eq!(state.pending().next_departure, SimTime::INFINITY);
        assert_eq!(state.accumulators().total_queue_time, 3.0);
        assert_eq!(state.accumulators().total_system_time, 8.0);
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_departure_without_customer_is_internal_error() {
        let mut state = SimulationState::new(at(1.0));
        assert!(matches!(state.record_departure(), Err(SimError::Internal(_))));
    }
}
