//! Outbound security-alert collaborator.
//!
//! Alerts are fire-and-forget: the caller never learns whether delivery
//! happened, and a failing notifier must not fail the calling operation.

use log::{info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityAlertType {
    PasswordChanged,
    EmailChanged,
    NewSignIn,
    AccountDeleted,
}

impl SecurityAlertType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PasswordChanged => "password_changed",
            Self::EmailChanged => "email_changed",
            Self::NewSignIn => "new_sign_in",
            Self::AccountDeleted => "account_deleted",
        }
    }
}

/// Payload handed to the email renderer: `{to, type, details}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityAlert {
    pub to: String,
    #[serde(rename = "type")]
    pub alert_type: SecurityAlertType,
    pub details: String,
}

pub trait SecurityAlertNotifier {
    fn notify(&self, alert: &SecurityAlert);
}

/// Notifier that only records a metadata event. Recipient and details stay
/// out of the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnlyNotifier;

impl SecurityAlertNotifier for LogOnlyNotifier {
    fn notify(&self, alert: &SecurityAlert) {
        if alert.to.trim().is_empty() {
            warn!(
                "event=security_alert module=notify status=skipped type={} reason=no_recipient",
                alert.alert_type.as_str()
            );
            return;
        }
        info!(
            "event=security_alert module=notify status=queued type={} details_len={}",
            alert.alert_type.as_str(),
            alert.details.len()
        );
    }
}
