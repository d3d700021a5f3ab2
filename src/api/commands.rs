//! Request handlers, grouped by feature.

pub mod currency;
pub mod fun_fact;
pub mod units;
