// Parser module: turns listing size text into canonical quantities.

pub mod patterns;
pub mod unit_parser;
pub mod units;

pub use unit_parser::UnitParser;
