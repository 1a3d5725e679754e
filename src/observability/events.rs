//! Observable engine events
//!
//! Every mutation emits exactly one success or rejection event.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    ConfigLoaded,

    // Databases
    DatabaseCreated,
    DatabaseDropped,
    DatabaseSelected,

    // Tables
    TableCreated,
    TableDropped,
    /// A half-created table was cleaned up
    CreateRolledBack,

    // Rows
    RowInserted,
    RowRejected,
    CellUpdated,
    RowDeleted,

    /// Any operation rejected before commit
    OperationRejected,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::DatabaseCreated => "DATABASE_CREATED",
            Event::DatabaseDropped => "DATABASE_DROPPED",
            Event::DatabaseSelected => "DATABASE_SELECTED",
            Event::TableCreated => "TABLE_CREATED",
            Event::TableDropped => "TABLE_DROPPED",
            Event::CreateRolledBack => "CREATE_ROLLED_BACK",
            Event::RowInserted => "ROW_INSERTED",
            Event::RowRejected => "ROW_REJECTED",
            Event::CellUpdated => "CELL_UPDATED",
            Event::RowDeleted => "ROW_DELETED",
            Event::OperationRejected => "OPERATION_REJECTED",
        }
    }

    /// Rejections are logged at WARN, everything else at INFO.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Event::RowRejected | Event::OperationRejected | Event::CreateRolledBack
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
