use crate::error::{PortalError, PortalResult};
use crate::timestamp;
use crate::work_order::WorkOrder;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const BUNDLED_WORK_ORDERS: &str = include_str!("../data/work_orders.json");

/// Anything that can hand over the current list of work orders.
pub trait WorkOrderSource: Send + Sync {
    fn fetch(&self) -> PortalResult<Vec<WorkOrder>>;
    fn describe(&self) -> String;
}

/// Reads a JSON array of work orders from disk on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WorkOrderSource for JsonFileSource {
    fn fetch(&self) -> PortalResult<Vec<WorkOrder>> {
        load_work_orders_from_json(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Sample data set compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledSource;

impl WorkOrderSource for BundledSource {
    fn fetch(&self) -> PortalResult<Vec<WorkOrder>> {
        parse_work_orders(BUNDLED_WORK_ORDERS)
    }

    fn describe(&self) -> String {
        "bundled sample data".to_string()
    }
}

/// In-memory list, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    work_orders: Vec<WorkOrder>,
}

impl StaticSource {
    pub fn new(work_orders: Vec<WorkOrder>) -> Self {
        Self { work_orders }
    }
}

impl WorkOrderSource for StaticSource {
    fn fetch(&self) -> PortalResult<Vec<WorkOrder>> {
        validate_work_orders(&self.work_orders)?;
        Ok(self.work_orders.clone())
    }

    fn describe(&self) -> String {
        format!("{} in-memory work orders", self.work_orders.len())
    }
}

pub fn parse_work_orders(json: &str) -> PortalResult<Vec<WorkOrder>> {
    let work_orders: Vec<WorkOrder> = serde_json::from_str(json)?;
    validate_work_orders(&work_orders)?;
    Ok(work_orders)
}

pub fn load_work_orders_from_json<P: AsRef<Path>>(path: P) -> PortalResult<Vec<WorkOrder>> {
    let file = File::open(path)?;
    let work_orders: Vec<WorkOrder> = serde_json::from_reader(BufReader::new(file))?;
    validate_work_orders(&work_orders)?;
    Ok(work_orders)
}

pub fn save_work_orders_to_json<P: AsRef<Path>>(
    work_orders: &[WorkOrder],
    path: P,
) -> PortalResult<()> {
    validate_work_orders(work_orders)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, work_orders)?;
    Ok(())
}

/// Identifiers must be present and unique. Unreadable creation dates are reported but kept.
pub fn validate_work_orders(work_orders: &[WorkOrder]) -> PortalResult<()> {
    let mut seen = HashSet::with_capacity(work_orders.len());
    for (idx, work_order) in work_orders.iter().enumerate() {
        if work_order.id.trim().is_empty() {
            return Err(PortalError::InvalidData(format!(
                "work order #{idx} has an empty id"
            )));
        }
        if !seen.insert(work_order.id.as_str()) {
            return Err(PortalError::InvalidData(format!(
                "duplicate work order id {}",
                work_order.id
            )));
        }
        if !timestamp::is_readable(&work_order.created_date) {
            warn!(
                work_order_id = %work_order.id,
                created_date = %work_order.created_date,
                "work order has an unreadable created-date"
            );
        }
    }
    Ok(())
}

/// Holds the current list of work orders and knows how to reload it.
///
/// A failed fetch never leaves the store empty-handed: it falls back to the bundled
/// sample data and keeps the error message for display.
pub struct WorkOrderStore {
    source: Box<dyn WorkOrderSource>,
    fallback: Option<Box<dyn WorkOrderSource>>,
    work_orders: Vec<WorkOrder>,
    last_error: Option<String>,
}

impl WorkOrderStore {
    pub fn new(source: impl WorkOrderSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            fallback: Some(Box::new(BundledSource)),
            work_orders: Vec::new(),
            last_error: None,
        }
    }

    pub fn bundled() -> Self {
        let mut store = Self::new(BundledSource);
        store.fallback = None;
        store
    }

    pub fn without_fallback(mut self) -> Self {
        self.fallback = None;
        self
    }

    pub fn from_work_orders(work_orders: Vec<WorkOrder>) -> Self {
        let mut store = Self::new(StaticSource::new(work_orders.clone())).without_fallback();
        store.work_orders = work_orders;
        store
    }

    /// Fetches from the source, replacing the current list. Returns the number of work orders held.
    pub fn refresh(&mut self) -> PortalResult<usize> {
        self.last_error = None;
        match self.source.fetch() {
            Ok(work_orders) => {
                info!(
                    source = %self.source.describe(),
                    count = work_orders.len(),
                    "loaded work orders"
                );
                self.work_orders = work_orders;
                Ok(self.work_orders.len())
            }
            Err(err) => {
                warn!(source = %self.source.describe(), error = %err, "work order fetch failed");
                self.last_error = Some(err.to_string());
                let Some(fallback) = &self.fallback else {
                    return Err(err);
                };
                let work_orders = fallback.fetch()?;
                debug!(
                    fallback = %fallback.describe(),
                    count = work_orders.len(),
                    "using fallback work orders"
                );
                self.work_orders = work_orders;
                Ok(self.work_orders.len())
            }
        }
    }

    /// Fetches from `source` and adopts it only when the fetch succeeds. On failure the
    /// current source and work orders stay in place and the error is recorded.
    pub fn load(&mut self, source: impl WorkOrderSource + 'static) -> PortalResult<usize> {
        match source.fetch() {
            Ok(work_orders) => {
                info!(
                    source = %source.describe(),
                    count = work_orders.len(),
                    "switched work order source"
                );
                self.source = Box::new(source);
                self.work_orders = work_orders;
                self.last_error = None;
                Ok(self.work_orders.len())
            }
            Err(err) => {
                warn!(source = %source.describe(), error = %err, "work order load failed");
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    pub fn work_orders(&self) -> &[WorkOrder] {
        &self.work_orders
    }

    pub fn find(&self, id: &str) -> Option<&WorkOrder> {
        self.work_orders.iter().find(|work_order| work_order.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut WorkOrder> {
        self.work_orders
            .iter_mut()
            .find(|work_order| work_order.id == id)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn len(&self) -> usize {
        self.work_orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.work_orders.is_empty()
    }
}
