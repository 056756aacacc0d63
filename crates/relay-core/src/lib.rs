//! # relay-core
//!
//! Core types shared across all Relay crates.
//!
//! - Entity structs for conversation state (messages, tool calls, thoughts)
//! - The planner's structured `Plan` and its parser
//! - Role, agent, and plan step enums
//! - Escalation links between a fast ReAct attempt and its planner takeover
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
