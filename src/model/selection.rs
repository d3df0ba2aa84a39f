//! Row selection shared between a view and the table model

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Selection handle owned by the UI layer and referenced by the model
pub type SharedSelection = Rc<RefCell<SelectionSet>>;

/// Set of selected row indices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    rows: BTreeSet<usize>,
}

impl SelectionSet {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty selection behind a shared handle
    pub fn shared() -> SharedSelection {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Select a row, `true` if the selection changed
    pub fn select(&mut self, row: usize) -> bool {
        self.rows.insert(row)
    }

    /// Deselect a row, `true` if the selection changed
    pub fn deselect(&mut self, row: usize) -> bool {
        self.rows.remove(&row)
    }

    /// Select or deselect a row, `true` if the selection changed
    pub fn set(&mut self, row: usize, selected: bool) -> bool {
        if selected {
            self.select(row)
        } else {
            self.deselect(row)
        }
    }

    /// Return `true` if the row is selected
    pub fn contains(&self, row: usize) -> bool {
        self.rows.contains(&row)
    }

    /// Number of selected rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Return `true` if nothing is selected
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Deselect everything
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Selected rows in ascending order
    pub fn rows(&self) -> Vec<usize> {
        self.rows.iter().copied().collect()
    }

    /// Adjust indices after a row was inserted at `row`
    pub fn row_inserted(&mut self, row: usize) {
        self.rows = self
            .rows
            .iter()
            .map(|&r| if r >= row { r + 1 } else { r })
            .collect();
    }

    /// Adjust indices after the row at `row` left the view
    ///
    /// The removed row is deselected and later rows move up by one.
    pub fn row_removed(&mut self, row: usize) {
        self.rows = self
            .rows
            .iter()
            .filter(|&&r| r != row)
            .map(|&r| if r > row { r - 1 } else { r })
            .collect();
    }
}
