//! Role-keyed item model
//!
//! - [`TableModel`]: the model itself
//! - [`RoleMap`]: role id <-> field name table
//! - [`SelectionSet`]: checkbox selection shared with the view
//! - [`ModelEvent`]: notifications for the binding layer

pub mod events;
pub mod roles;
pub mod selection;
pub mod table_model;

pub use events::ModelEvent;
pub use roles::RoleMap;
pub use selection::{SelectionSet, SharedSelection};
pub use table_model::TableModel;
