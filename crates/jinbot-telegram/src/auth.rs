//! Command authorization.
//!
//! Every command declares the level it needs; the dispatcher resolves
//! the caller's level once before dispatch instead of re-checking
//! inside each handler. Unauthorized callers get the fixed denial
//! message and nothing else happens.

use crate::handlers::Command;

/// Reply sent when a restricted command comes from a stranger.
pub const DENIAL_MESSAGE: &str = "Not authorized. This bot only talks to its operator.";

/// How much trust a command needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AuthLevel {
    /// Anyone may run this.
    Public,
    /// Only the configured operator may run this.
    Owner,
}

/// The authorization table: which level each command needs.
pub fn required_level(cmd: &Command) -> AuthLevel {
    match cmd {
        Command::Start | Command::Help => AuthLevel::Public,
        Command::Task(_)
        | Command::Done(_)
        | Command::Tasks
        | Command::Find(_)
        | Command::Note(_)
        | Command::Messages(_)
        | Command::Recent(_)
        | Command::Check
        | Command::Status
        | Command::Stats
        | Command::Set(_)
        | Command::Settings => AuthLevel::Owner,
    }
}

/// Decides the caller's level from the configured operator identity.
#[derive(Debug, Clone)]
pub struct Authorizer {
    owner_chat_id: Option<i64>,
    owner_username: Option<String>,
}

impl Authorizer {
    /// Creates an authorizer for the given operator identity.
    ///
    /// With neither a chat id nor a username configured, nobody is the
    /// operator and only public commands work.
    pub fn new(owner_chat_id: Option<i64>, owner_username: Option<String>) -> Self {
        Self {
            owner_chat_id,
            owner_username: owner_username.map(|u| u.trim_start_matches('@').to_string()),
        }
    }

    /// Resolves a caller to an authorization level.
    ///
    /// Chat id match or case-insensitive username match makes the
    /// caller the operator.
    pub fn level_for(&self, chat_id: i64, username: Option<&str>) -> AuthLevel {
        if self.owner_chat_id == Some(chat_id) {
            return AuthLevel::Owner;
        }
        if let (Some(owner), Some(caller)) = (self.owner_username.as_deref(), username) {
            if owner.eq_ignore_ascii_case(caller.trim_start_matches('@')) {
                return AuthLevel::Owner;
            }
        }
        AuthLevel::Public
    }
}
