//! FlowWeek: turns a free-text description of weekly goals into a validated,
//! editable, exportable weekly schedule.

pub mod error;
pub mod export;
pub mod http;
pub mod models;
pub mod services;
pub mod utils;
