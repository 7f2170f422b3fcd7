//! Flapsim - headless gap-flight arena for scoring evolved agents
//!
//! An external optimizer hands over a population of decision capabilities;
//! one epoch flies them all through the same obstacle course and returns a
//! fitness per agent.

pub mod brains;
pub mod core;
pub mod render;
pub mod sim;
