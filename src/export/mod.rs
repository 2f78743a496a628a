pub mod csv;
pub mod ics;
