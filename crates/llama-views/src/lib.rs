//! View models for the Llama Matemática admin client
//!
//! - [`table`]: a generic searchable, sortable table over typed columns
//! - [`reports`]: student report filters and CSV export
//! - [`charts`]: radar, pie and bar data shaping

#![forbid(unsafe_code)]

pub mod charts;
pub mod error;
pub mod reports;
pub mod table;

pub use error::{Result, ViewError};
pub use reports::{PerformanceFilter, ReportFilter};
pub use table::{
    CellValue, Column, EmptyState, RowAction, RowActions, SortDirection, SortState, TableModel,
    TableView,
};
