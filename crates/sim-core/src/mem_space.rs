//! In-memory stand-in for the OPC UA address space, used by tests and
//! standalone simulation.

use crate::space::{NodeSpace, SpaceError, WritableHandle};
use crate::tags::TagName;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Address space that keeps every variable in a shared cell so tests can
/// observe values after handles have moved into the update loop.
pub struct MemSpace {
    objects: Vec<String>,
    cells: BTreeMap<String, Arc<Mutex<f64>>>,
    writes: Arc<AtomicU64>,
    variables_until_failure: Option<usize>,
}

#[derive(Debug)]
pub struct MemHandle {
    node: String,
    cell: Arc<Mutex<f64>>,
    writes: Arc<AtomicU64>,
}

impl MemSpace {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            cells: BTreeMap::new(),
            writes: Arc::new(AtomicU64::new(0)),
            variables_until_failure: None,
        }
    }

    /// Space whose `add_variable` succeeds `n` times and fails on call n+1.
    pub fn fail_variable_create_after(n: usize) -> Self {
        let mut space = Self::new();
        space.variables_until_failure = Some(n);
        space
    }

    pub fn object_names(&self) -> &[String] {
        &self.objects
    }

    /// Current value of a variable, if it was created.
    pub fn value(&self, object: &str, tag: TagName) -> Option<f64> {
        self.cells
            .get(&Self::key(object, tag))
            .map(|cell| *cell.lock().unwrap())
    }

    pub fn total_writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Write counter handle for asserting across threads.
    pub fn write_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.writes)
    }

    fn key(object: &str, tag: TagName) -> String {
        format!("{object}/{tag}")
    }
}

impl Default for MemSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeSpace for MemSpace {
    type Object = String;
    type Handle = MemHandle;

    fn add_object(&mut self, name: &str) -> Result<String, SpaceError> {
        if self.objects.iter().any(|existing| existing == name) {
            return Err(SpaceError::ObjectCreate {
                name: name.to_string(),
            });
        }
        self.objects.push(name.to_string());
        Ok(name.to_string())
    }

    fn add_variable(
        &mut self,
        parent: &String,
        tag: TagName,
        initial: f64,
    ) -> Result<MemHandle, SpaceError> {
        if let Some(remaining) = self.variables_until_failure.as_mut() {
            if *remaining == 0 {
                return Err(SpaceError::VariableCreate {
                    object: parent.clone(),
                    tag,
                });
            }
            *remaining -= 1;
        }

        let key = Self::key(parent, tag);
        let cell = Arc::new(Mutex::new(initial));
        self.cells.insert(key.clone(), Arc::clone(&cell));
        Ok(MemHandle {
            node: key,
            cell,
            writes: Arc::clone(&self.writes),
        })
    }
}

impl WritableHandle for MemHandle {
    fn set_value(&mut self, value: f64) -> Result<(), SpaceError> {
        let mut cell = self
            .cell
            .lock()
            .map_err(|_| SpaceError::WriteRejected {
                node: self.node.clone(),
            })?;
        *cell = value;
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
