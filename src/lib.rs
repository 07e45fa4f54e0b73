//! Reader, writer and converter for History Trends Unlimited browsing
//! history exports.

pub mod cli;
pub mod commands;
pub mod config;
pub mod historytrends;
pub mod logging;
pub mod metadata;
pub mod source;
pub mod timefmt;
pub mod transition;
pub mod util;
