//! Graph storage layer
//!
//! Per-walk node arena plus the CSR link graph behind the in-memory source.

pub mod csr;
pub mod registry;

pub use csr::CsrGraph;
pub use registry::{NodeEntry, NodeId, NodeRegistry};
