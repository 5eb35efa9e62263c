//! Core system components for standoff operation
pub mod echo;
pub mod effort_command;
pub mod resources;
