//! Tree capability port and evaluation oracle
//!
//! This crate defines the two capabilities the synthesis engine consumes:
//! - `TreeAdapter`: navigation, attributes, geometry and style of a live
//!   attributed tree
//! - `EvalOracle`: resolution of locator expressions against a tree scope
//!
//! It also ships a `VirtualTree` in-memory implementation and an XPath
//! subset evaluator so the engine can be exercised without a rendering
//! engine.

pub mod errors;
pub mod ports;
pub mod virtual_tree;
pub mod xpath;

pub use errors::*;
pub use ports::*;
pub use virtual_tree::*;
pub use xpath::*;
