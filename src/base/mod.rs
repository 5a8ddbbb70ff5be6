//! Core components, types, and utilities for the relay-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Fixed reply text.
//! - Common result types.

pub mod config;
pub mod prompts;
pub mod types;
