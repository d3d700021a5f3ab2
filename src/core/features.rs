//! Converter features
//!
//! `unit_converter` owns the registry and the conversion engine, `currency`
//! supplies live rates to it, and `fun_fact` annotates a conversion with a
//! generated one-liner about the source unit.

pub mod currency;
pub mod fun_fact;
pub mod unit_converter;
