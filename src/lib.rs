//! NutriCare Library
//!
//! Health intake storage, rule-based diet recommendations and
//! classification of AI-generated advice.

pub mod build_info;
pub mod config;
pub mod db;
pub mod engine;
pub mod llm;
pub mod mcp;
pub mod models;
pub mod tools;
