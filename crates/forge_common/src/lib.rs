//! Shared foundational types for the Forge Verilog code generator.
//!
//! Provides the 4-state bit value used by sized literals and the packed
//! [`LogicVec`] that carries literal values containing unknown or
//! high-impedance bits.

#![warn(missing_docs)]

pub mod logic;
pub mod logic_vec;

pub use logic::Logic;
pub use logic_vec::LogicVec;
