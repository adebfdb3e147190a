//! Route evaluator that computes timing, load, and feasibility.

use std::iter;

use crate::constraints::{ConstraintSet, Load, Rest, TIME_EPS};
use crate::distance::Transit;
use crate::graph::{NodeKind, RoutingGraph};
use crate::models::{StepKind, ViolationType};

/// What a timed stop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopKind {
    /// Service at a graph node (including both depots).
    Visit,
    /// The vehicle's break, taken at the given node's location.
    Break,
}

/// One timed stop of a walked route, in seconds from the constraint origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop {
    pub kind: StopKind,
    pub node: usize,
    pub arrival: f64,
    pub finish: f64,
}

/// Where a route's break is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakSlot {
    /// At the previous stop, before travelling to the route node at this
    /// position. The route length stands for the leg to the end depot.
    Before(usize),
    /// At the end depot, after arrival.
    AtEnd,
}

/// Earliest finish of a route prefix with the break already behind it.
#[derive(Debug, Clone, Copy)]
struct Rested {
    time: f64,
    /// Idle time spent waiting for the break window to open.
    wait: f64,
    slot: Option<BreakSlot>,
}

/// The earlier of two fronts; on a tie, the one that idled less for its
/// break, then `a`.
fn earliest(a: Option<Rested>, b: Option<Rested>) -> Option<Rested> {
    match (a, b) {
        (Some(a), Some(b)) => {
            let b_wins = b.time < a.time - TIME_EPS || (b.time <= a.time + TIME_EPS && b.wait < a.wait);
            Some(if b_wins { b } else { a })
        }
        (a, b) => a.or(b),
    }
}

/// A feasible walk: when the vehicle is done, and where it rests.
#[derive(Debug, Clone, Copy)]
struct Walked {
    done: f64,
    slot: Option<BreakSlot>,
}

/// Walks vehicle routes through every constraint dimension.
///
/// A route is the sequence of pickup and delivery nodes between the
/// vehicle's start and end depots; the depots themselves are implicit.
///
/// # Examples
///
/// ```
/// use u_dispatch::constraints::ConstraintSet;
/// use u_dispatch::distance::TransitMatrices;
/// use u_dispatch::evaluation::RouteEvaluator;
/// use u_dispatch::graph::RoutingGraph;
/// use u_dispatch::models::{Location, OptimizationProblem, Shipment, ShipmentStep, TimeWindow, Vehicle};
///
/// let here = Location::new(127.0, 37.5).unwrap();
/// let day = TimeWindow::parse("2025-01-15 08:00", "2025-01-15 18:00").unwrap();
/// let step = ShipmentStep::new(here, "Loading bay", day);
/// let problem = OptimizationProblem::new(
///     vec![Shipment::new(step.clone(), step, vec![1])],
///     vec![Vehicle::new(here, here, vec![10], day)],
/// );
/// let graph = RoutingGraph::build(&problem).unwrap();
/// let constraints = ConstraintSet::build(&problem, &graph).unwrap();
/// let transit = TransitMatrices::zeros(graph.num_nodes());
///
/// let evaluator = RouteEvaluator::new(&graph, &constraints, &transit);
/// assert!(evaluator.is_feasible(0, &[graph.pickup(0), graph.delivery(0)]));
/// assert!(!evaluator.is_feasible(0, &[graph.delivery(0), graph.pickup(0)]));
/// ```
pub struct RouteEvaluator<'a> {
    graph: &'a RoutingGraph,
    constraints: &'a ConstraintSet,
    transit: &'a dyn Transit,
}

impl<'a> RouteEvaluator<'a> {
    /// Creates a new evaluator for the given problem data.
    pub fn new(
        graph: &'a RoutingGraph,
        constraints: &'a ConstraintSet,
        transit: &'a dyn Transit,
    ) -> Self {
        Self {
            graph,
            constraints,
            transit,
        }
    }

    pub fn graph(&self) -> &'a RoutingGraph {
        self.graph
    }

    pub fn constraints(&self) -> &'a ConstraintSet {
        self.constraints
    }

    pub fn transit(&self) -> &'a dyn Transit {
        self.transit
    }

    /// Walks `nodes` on `vehicle` and returns when it is done at its end
    /// depot, or the first violation.
    ///
    /// The break goes to the leg boundary (or the end depot) that lets the
    /// vehicle finish earliest. Ties go to the placement that idles least
    /// waiting for the break window, then to the earlier one. Two fronts are
    /// carried along the route: the earliest finish with the break behind,
    /// and the earliest finish with it still pending. Service is monotone in
    /// arrival time, so each front only needs its earliest time.
    fn walk<I>(&self, vehicle: usize, nodes: I) -> Result<Walked, ViolationType>
    where
        I: IntoIterator<Item = usize>,
    {
        let shift = self.constraints.shift(vehicle);
        let capacity = self.constraints.capacity(vehicle);
        let end = self.graph.end(vehicle);

        let mut load = Load::empty(self.constraints.dimensions());
        let mut on_board: Vec<usize> = Vec::new();
        let (mut rested, mut pending) = match shift.rest {
            None => (
                Some(Rested {
                    time: shift.start,
                    wait: 0.0,
                    slot: None,
                }),
                None,
            ),
            Some(rest) if rest.begin(shift.start).is_some() => (None, Some(shift.start)),
            Some(_) => return Err(ViolationType::BreakMissed { vehicle }),
        };
        let mut prev = self.graph.start(vehicle);
        let mut position = 0;

        for node in nodes {
            let (shipment, step) = self.visit(vehicle, node, &mut on_board)?;
            let timing = self.constraints.timing(node);
            let travel = self.transit.duration(prev, node);
            let serve = |free: f64| timing.serve(free + travel).map(|(_, finish)| finish);

            let mut next_rested = rested.and_then(|r| serve(r.time).map(|time| Rested { time, ..r }));
            let mut next_pending = None;
            if let (Some(rest), Some(free)) = (shift.rest, pending) {
                let now = rest.begin(free).and_then(|begin| {
                    serve(begin + rest.duration).map(|time| Rested {
                        time,
                        wait: begin - free,
                        slot: Some(BreakSlot::Before(position)),
                    })
                });
                next_rested = earliest(next_rested, now);
                next_pending = serve(free).filter(|&finish| rest.begin(finish).is_some());
            }
            if next_rested.is_none() && next_pending.is_none() {
                return Err(ViolationType::TimeWindowViolated { vehicle, shipment, step });
            }

            load.apply(self.constraints.demand(node), capacity)
                .map_err(|(dimension, load)| ViolationType::LoadOutOfBounds {
                    vehicle,
                    dimension,
                    load,
                    capacity: capacity[dimension],
                })?;
            rested = next_rested;
            pending = next_pending;
            prev = node;
            position += 1;
        }

        if let Some(&shipment) = on_board.first() {
            return Err(ViolationType::PairSplit { vehicle, shipment });
        }

        let travel = self.transit.duration(prev, end);
        let in_shift = |t: f64| (t <= shift.end + TIME_EPS).then_some(t);
        let mut done = rested.and_then(|r| in_shift(r.time + travel).map(|time| Rested { time, ..r }));
        if let (Some(rest), Some(free)) = (shift.rest, pending) {
            let before = rest.begin(free).and_then(|begin| {
                in_shift(begin + rest.duration + travel).map(|time| Rested {
                    time,
                    wait: begin - free,
                    slot: Some(BreakSlot::Before(position)),
                })
            });
            let arrival = free + travel;
            let at_end = in_shift(arrival)
                .and_then(|_| rest.begin(arrival))
                .and_then(|begin| {
                    in_shift(begin + rest.duration).map(|time| Rested {
                        time,
                        wait: begin - arrival,
                        slot: Some(BreakSlot::AtEnd),
                    })
                });
            done = earliest(earliest(done, before), at_end);
        }
        done.map(|r| Walked {
            done: r.time,
            slot: r.slot,
        })
        .ok_or(ViolationType::ShiftExceeded { vehicle })
    }

    /// Precedence and eligibility of visiting `node`, tracking what is on
    /// board.
    fn visit(
        &self,
        vehicle: usize,
        node: usize,
        on_board: &mut Vec<usize>,
    ) -> Result<(usize, StepKind), ViolationType> {
        match self.graph.node(node) {
            NodeKind::Pickup(shipment) => {
                if !self.constraints.allows(shipment, vehicle) {
                    return Err(ViolationType::Ineligible { vehicle, shipment });
                }
                on_board.push(shipment);
                Ok((shipment, StepKind::Pickup))
            }
            NodeKind::Delivery(shipment) => match on_board.iter().position(|&s| s == shipment) {
                Some(i) => {
                    on_board.swap_remove(i);
                    Ok((shipment, StepKind::Delivery))
                }
                None => Err(ViolationType::PrecedenceViolated { vehicle, shipment }),
            },
            NodeKind::Start(_) | NodeKind::End(_) => Err(ViolationType::ShiftExceeded { vehicle }),
        }
    }

    /// Returns the end time of a feasible route, or the first violation.
    pub fn check(&self, vehicle: usize, nodes: &[usize]) -> Result<f64, ViolationType> {
        self.walk(vehicle, nodes.iter().copied()).map(|w| w.done)
    }

    pub fn is_feasible(&self, vehicle: usize, nodes: &[usize]) -> bool {
        self.check(vehicle, nodes).is_ok()
    }

    /// Feasibility of a route given as an iterator, without materializing it.
    pub fn is_feasible_iter<I: IntoIterator<Item = usize>>(&self, vehicle: usize, nodes: I) -> bool {
        self.walk(vehicle, nodes).is_ok()
    }

    /// Every timed stop of a feasible route, in order: the start depot,
    /// every node with the break interleaved where it is taken, then the end
    /// depot.
    pub fn schedule(&self, vehicle: usize, nodes: &[usize]) -> Result<Vec<Stop>, ViolationType> {
        let walked = self.walk(vehicle, nodes.iter().copied())?;
        let shift = self.constraints.shift(vehicle);
        let rest = shift.rest.zip(walked.slot);
        let break_before = |position: usize| match rest {
            Some((r, BreakSlot::Before(p))) if p == position => Some(r),
            _ => None,
        };

        let mut stops = Vec::with_capacity(nodes.len() + 3);
        let mut time = shift.start;
        let mut prev = self.graph.start(vehicle);
        stops.push(Stop {
            kind: StopKind::Visit,
            node: prev,
            arrival: time,
            finish: time,
        });

        for (position, &node) in nodes.iter().enumerate() {
            if let Some(r) = break_before(position) {
                time = push_break(&mut stops, &r, prev, time);
            }
            let arrival = time + self.transit.duration(prev, node);
            let (_, finish) = self
                .constraints
                .timing(node)
                .serve(arrival)
                .ok_or(ViolationType::ShiftExceeded { vehicle })?;
            stops.push(Stop {
                kind: StopKind::Visit,
                node,
                arrival,
                finish,
            });
            time = finish;
            prev = node;
        }

        if let Some(r) = break_before(nodes.len()) {
            time = push_break(&mut stops, &r, prev, time);
        }
        let end = self.graph.end(vehicle);
        let mut done = time + self.transit.duration(prev, end);
        if let Some((r, BreakSlot::AtEnd)) = rest {
            done = push_break(&mut stops, &r, end, done);
        }
        stops.push(Stop {
            kind: StopKind::Visit,
            node: end,
            arrival: done,
            finish: done,
        });
        Ok(stops)
    }

    /// Total `(distance, duration)` over the arcs from the start depot through
    /// `nodes` to the end depot. An empty route travels nowhere.
    pub fn travel(&self, vehicle: usize, nodes: &[usize]) -> (f64, f64) {
        if nodes.is_empty() {
            return (0.0, 0.0);
        }
        let path = iter::once(self.graph.start(vehicle))
            .chain(nodes.iter().copied())
            .chain(iter::once(self.graph.end(vehicle)));
        let mut distance = 0.0;
        let mut duration = 0.0;
        let mut prev = None;
        for node in path {
            if let Some(p) = prev {
                distance += self.transit.distance(p, node);
                duration += self.transit.duration(p, node);
            }
            prev = Some(node);
        }
        (distance, duration)
    }
}

/// Records the break for a vehicle free at `free` and returns when it ends.
fn push_break(stops: &mut Vec<Stop>, rest: &Rest, at: usize, free: f64) -> f64 {
    let finish = free.max(rest.earliest) + rest.duration;
    stops.push(Stop {
        kind: StopKind::Break,
        node: at,
        arrival: free,
        finish,
    });
    finish
}
