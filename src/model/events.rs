//! Notifications emitted by the table model

use std::fmt;

/// Something observable changed in the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    /// An operation failed, with the message also stored as the error string
    Error(String),
    /// A different table was bound
    TableChanged,
    /// A different database was opened
    DatabaseNameChanged,
    /// Rows were selected or deselected
    SelectedRowsChanged,
    /// A single cell changed
    DataChanged { row: usize, role: i32 },
    /// A row was inserted at this position
    RowsInserted(usize),
    /// The row at this position left the view
    RowsRemoved(usize),
    /// The rows were reloaded
    ModelReset,
    /// The role table was rebuilt
    RolesChanged,
}

type Listener = Box<dyn FnMut(&ModelEvent)>;

/// Registered listeners, called synchronously in registration order
#[derive(Default)]
pub(crate) struct Listeners {
    listeners: Vec<Listener>,
}

impl Listeners {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn connect<F>(&mut self, listener: F)
    where
        F: FnMut(&ModelEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Call every listener with `event`
    pub fn emit(&mut self, event: ModelEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}
