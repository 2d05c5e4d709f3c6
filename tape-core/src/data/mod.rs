//! Historical tick data input

pub mod parser;

pub use parser::TickReader;
