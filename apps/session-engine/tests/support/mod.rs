#![allow(dead_code)]


pub use inbox::{drain, kinds};
pub use table::{test_config, Seat, Table};
