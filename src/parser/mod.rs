//! Readers for transcript tables.

pub mod excel;
pub mod table;
pub mod util;

pub use excel::read_workbook;
pub use table::{read_table, TableFormat};
