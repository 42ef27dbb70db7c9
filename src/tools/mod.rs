//! NutriCare Tools module
//!
//! MCP tool implementations for the NutriCare intake and recommendation service.

pub mod profile;
pub mod recommendations;
pub mod status;
