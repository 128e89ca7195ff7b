//! Provider credentials.
//!
//! Credentials are collected once at startup (the CLI reads them from the
//! environment) and handed to adapter construction. Check and escalation
//! logic never sees them.

use std::fmt;

/// Messaging provider account.
#[derive(Clone)]
pub struct MessagingCredentials {
    pub account_sid: String,
    pub auth_token: String,
}

/// Issue tracker access.
#[derive(Clone)]
pub struct IssueCredentials {
    pub token: String,
    /// `owner/name` of the repository issues are filed against.
    pub repository: String,
}

/// All provider credentials available to this process.
#[derive(Clone, Default)]
pub struct Credentials {
    pub messaging: Option<MessagingCredentials>,
    pub issues: Option<IssueCredentials>,
}

impl Credentials {
    /// Build from optional raw values, treating blanks as absent.
    pub fn from_parts(
        account_sid: Option<String>,
        auth_token: Option<String>,
        github_token: Option<String>,
        repository: Option<String>,
    ) -> Self {
        let messaging = match (non_blank(account_sid), non_blank(auth_token)) {
            (Some(account_sid), Some(auth_token)) => Some(MessagingCredentials {
                account_sid,
                auth_token,
            }),
            _ => None,
        };
        let issues = match (non_blank(github_token), non_blank(repository)) {
            (Some(token), Some(repository)) => Some(IssueCredentials { token, repository }),
            _ => None,
        };
        Self { messaging, issues }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl fmt::Debug for MessagingCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessagingCredentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for IssueCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssueCredentials")
            .field("token", &"<redacted>")
            .field("repository", &self.repository)
            .finish()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("messaging", &self.messaging)
            .field("issues", &self.issues)
            .finish()
    }
}
