//! Visit ordering for a set of work orders.
//!
//! The planner behind [`RoutePlanner`] only sees street addresses and answers with a
//! visiting order. Work orders without an address are never sent; they are appended
//! after the planned stops. At most [`MAX_WAYPOINTS`] addresses are sent per request
//! and anything beyond that keeps its input order at the end of the route.

use crate::error::{PortalError, PortalResult};
use crate::work_order::WorkOrder;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Waypoint limit of the directions service the portal targets.
pub const MAX_WAYPOINTS: usize = 23;

pub trait RoutePlanner: Send + Sync {
    /// Returns indices into `destinations` in visiting order.
    fn waypoint_order(&self, origin: &str, destinations: &[&str]) -> PortalResult<Vec<usize>>;

    fn name(&self) -> &'static str;
}

/// Stand-in planner that visits addresses in case-insensitive alphabetical order.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlphabeticalPlanner;

impl RoutePlanner for AlphabeticalPlanner {
    fn waypoint_order(&self, _origin: &str, destinations: &[&str]) -> PortalResult<Vec<usize>> {
        let mut order: Vec<usize> = (0..destinations.len()).collect();
        order.sort_by_key(|idx| destinations[*idx].to_lowercase());
        Ok(order)
    }

    fn name(&self) -> &'static str {
        "alphabetical"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteStop {
    pub sequence: usize,
    pub work_order_id: String,
    pub name: String,
    pub address: Option<String>,
    /// False when the stop was appended without going through the planner.
    pub planned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutePlan {
    pub origin: String,
    pub planner: String,
    pub stops: Vec<RouteStop>,
    /// More addressed work orders than the planner accepts were supplied.
    pub truncated: bool,
}

impl RoutePlan {
    pub fn work_order_ids(&self) -> Vec<&str> {
        self.stops
            .iter()
            .map(|stop| stop.work_order_id.as_str())
            .collect()
    }

    pub fn planned_count(&self) -> usize {
        self.stops.iter().filter(|stop| stop.planned).count()
    }

    pub fn to_cli_summary(&self) -> String {
        format!(
            "planner={}, stops={}, planned={}, truncated={}",
            self.planner,
            self.stops.len(),
            self.planned_count(),
            self.truncated
        )
    }
}

pub fn plan_route(
    planner: &dyn RoutePlanner,
    origin: &str,
    work_orders: &[&WorkOrder],
) -> PortalResult<RoutePlan> {
    let origin = origin.trim();
    if origin.is_empty() {
        return Err(PortalError::EmptyRoute("an origin address"));
    }
    if work_orders.is_empty() {
        return Err(PortalError::EmptyRoute("at least one work order"));
    }

    let (addressed, addressless): (Vec<&WorkOrder>, Vec<&WorkOrder>) = work_orders
        .iter()
        .copied()
        .partition(|work_order| !work_order.address.trim().is_empty());

    let cut = addressed.len().min(MAX_WAYPOINTS);
    let (sent, overflow) = addressed.split_at(cut);
    let truncated = !overflow.is_empty();
    if truncated {
        warn!(
            supplied = addressed.len(),
            limit = MAX_WAYPOINTS,
            "too many waypoints; extra stops keep their input order"
        );
    }

    let mut ordered: Vec<(&WorkOrder, bool)> = Vec::with_capacity(work_orders.len());
    if !sent.is_empty() {
        let destinations: Vec<&str> = sent
            .iter()
            .map(|work_order| work_order.address.trim())
            .collect();
        let order = planner.waypoint_order(origin, &destinations)?;
        for idx in reconcile_order(&order, sent.len()) {
            ordered.push((sent[idx], true));
        }
    }
    ordered.extend(overflow.iter().map(|work_order| (*work_order, false)));
    ordered.extend(addressless.iter().map(|work_order| (*work_order, false)));

    let stops: Vec<RouteStop> = ordered
        .into_iter()
        .enumerate()
        .map(|(sequence, (work_order, planned))| RouteStop {
            sequence: sequence + 1,
            work_order_id: work_order.id.clone(),
            name: work_order.name.clone(),
            address: Some(work_order.address.trim())
                .filter(|address| !address.is_empty())
                .map(str::to_string),
            planned,
        })
        .collect();

    info!(
        planner = planner.name(),
        stops = stops.len(),
        without_address = addressless.len(),
        truncated,
        "planned route"
    );

    Ok(RoutePlan {
        origin: origin.to_string(),
        planner: planner.name().to_string(),
        stops,
        truncated,
    })
}

/// Keeps the first occurrence of each valid index, then appends whatever the planner left out.
fn reconcile_order(order: &[usize], len: usize) -> Vec<usize> {
    let mut seen = HashSet::with_capacity(len);
    let mut reconciled = Vec::with_capacity(len);
    for idx in order {
        if *idx < len && seen.insert(*idx) {
            reconciled.push(*idx);
        } else {
            debug!(index = idx, "ignoring waypoint index from planner");
        }
    }
    reconciled.extend((0..len).filter(|idx| !seen.contains(idx)));
    reconciled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconcile_drops_duplicates_and_out_of_range() {
        assert_eq!(reconcile_order(&[2, 9, 2, 0], 4), vec![2, 0, 1, 3]);
    }

    #[test]
    fn reconcile_fills_empty_answer_in_input_order() {
        assert_eq!(reconcile_order(&[], 3), vec![0, 1, 2]);
    }
}
