//! Study companion bot for HCM202 (Ho Chi Minh Thought), Chapter III.

pub mod bot;
pub mod chat;
pub mod config;
pub mod content;
pub mod feedback;
pub mod i18n;
pub mod markdown;
pub mod quiz;
