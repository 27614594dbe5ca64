// Palisade: query-safety and input-sanitization layer
// Exposes the security primitives consumed by the marketplace API

pub mod audit;
pub mod builder;
pub mod cli;
pub mod csp;
pub mod driver;
pub mod error;
pub mod guard;
pub mod sanitize;
