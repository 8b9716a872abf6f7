pub mod candidate_filter;
pub mod config;
pub mod error;
pub mod halftime;
pub mod live_fetcher;
pub mod monitor;
pub mod normalization;
pub mod notifier;
pub mod shared_types;
pub mod stats_fetcher;
pub mod team_matcher;
