//! Birthday Bot Library
//!
//! Posts birthday congratulations to a Telegram chat.
//!
//! This crate provides the core functionality for:
//! - Loading and validating the birthday list and greeting templates
//! - Selecting today's celebrants and rendering their greetings
//! - Delivering messages through the Telegram Bot API

pub mod celebration;
pub mod config;
pub mod telegram;
