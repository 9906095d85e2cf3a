//! Travgen - term-based career progression character generator

pub mod assembler;
pub mod character;
pub mod core;
pub mod dice;
pub mod progression;
pub mod rules;
