//! CLI command handlers for the helpix application.
//!
//! Each read handler returns the rendered output instead of printing it.

mod matching;
mod output;
mod recommend;
mod serve;
mod settings;

pub(crate) use matching::{
    handle_helpers_command, handle_history_command, handle_match_command, handle_score_command,
};
pub(crate) use recommend::{
    handle_act_command, handle_alerts_command, handle_inbox_command, handle_recommend_command,
};
pub(crate) use serve::handle_serve_command;
pub(crate) use settings::handle_settings_command;
