pub mod analysis;
pub mod backtest;
pub mod check;
pub mod config;
pub mod error;
pub mod parser;
pub mod worker;
