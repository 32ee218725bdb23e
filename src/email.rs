//! Best-effort email notifications.
//!
//! Mail goes out through an HTTP JSON provider (configured via
//! `MailConfig`). Every send is dispatched with `tokio::spawn` AFTER the
//! triggering state change has committed; the join handle is never awaited
//! by a response path and failures are only logged. With no provider
//! configured the portal runs normally and skips sending.

use std::sync::Arc;

use reqwest::Client;
use serde_json::json;

use crate::config::MailConfig;
use crate::models::ApplicationStatus;

pub struct Mailer {
    client: Client,
    config: MailConfig,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), String> {
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&json!({
                "from": self.config.from,
                "to": to,
                "subject": subject,
                "html": html,
            }))
            .send()
            .await
            .map_err(|e| format!("mail provider unreachable: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("mail provider returned {}", response.status()));
        }
        Ok(())
    }

    pub async fn send_welcome_email(&self, to: &str, name: &str) -> Result<(), String> {
        let html = welcome_html(name);
        self.send(to, "Welcome to College Admission Portal", &html).await
    }

    pub async fn send_status_email(
        &self,
        to: &str,
        name: &str,
        status: ApplicationStatus,
        remarks: &str,
    ) -> Result<(), String> {
        let subject = format!(
            "Application Status Update - {}",
            status.as_str().to_uppercase()
        );
        let html = status_html(name, status, remarks);
        self.send(to, &subject, &html).await
    }
}

fn welcome_html(name: &str) -> String {
    format!(
        "<h1>Welcome {}!</h1>\
         <p>Thank you for registering with our College Admission Portal.</p>\
         <p>You can now login and start your admission process.</p>\
         <br>\
         <p>Best regards,</p>\
         <p>College Admission Team</p>",
        name
    )
}

fn status_html(name: &str, status: ApplicationStatus, remarks: &str) -> String {
    let status_message = match status {
        ApplicationStatus::Approved => "Congratulations! Your application has been approved.",
        ApplicationStatus::Rejected => {
            "We regret to inform you that your application has been rejected."
        }
        ApplicationStatus::Pending => "Your application is under review.",
    };

    let remarks_block = if remarks.is_empty() {
        String::new()
    } else {
        format!("<p><strong>Remarks:</strong> {}</p>", remarks)
    };

    format!(
        "<h1>Dear {},</h1>\
         <p>{}</p>\
         {}\
         <br>\
         <p>Login to your portal to view more details.</p>\
         <br>\
         <p>Best regards,</p>\
         <p>College Admission Team</p>",
        name, status_message, remarks_block
    )
}

/// Welcome mail after registration, detached from the response path.
pub fn spawn_welcome_email(mailer: Option<Arc<Mailer>>, to: String, name: String) {
    let Some(mailer) = mailer else {
        tracing::debug!(to = %to, "mail provider not configured, skipping welcome email");
        return;
    };
    tokio::spawn(async move {
        if let Err(err) = mailer.send_welcome_email(&to, &name).await {
            tracing::warn!(to = %to, error = %err, "failed to send welcome email");
        } else {
            tracing::info!(to = %to, "welcome email sent");
        }
    });
}

/// Status-change mail after an admin review, detached from the response
/// path: a send failure never rolls back or fails the status change.
pub fn spawn_status_email(
    mailer: Option<Arc<Mailer>>,
    to: String,
    name: String,
    status: ApplicationStatus,
    remarks: String,
) {
    let Some(mailer) = mailer else {
        tracing::debug!(to = %to, "mail provider not configured, skipping status email");
        return;
    };
    tokio::spawn(async move {
        if let Err(err) = mailer.send_status_email(&to, &name, status, &remarks).await {
            tracing::warn!(to = %to, error = %err, "failed to send status email");
        } else {
            tracing::info!(to = %to, status = status.as_str(), "status email sent");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_html_picks_message_and_includes_remarks() {
        let html = status_html("Asha", ApplicationStatus::Approved, "Meets criteria");
        assert!(html.contains("Dear Asha"));
        assert!(html.contains("has been approved"));
        assert!(html.contains("<strong>Remarks:</strong> Meets criteria"));

        let rejected = status_html("Asha", ApplicationStatus::Rejected, "");
        assert!(rejected.contains("has been rejected"));
        assert!(!rejected.contains("Remarks"));

        let pending = status_html("Asha", ApplicationStatus::Pending, "");
        assert!(pending.contains("under review"));
    }

    #[test]
    fn test_welcome_html_addresses_user() {
        let html = welcome_html("Ravi");
        assert!(html.contains("Welcome Ravi!"));
        assert!(html.contains("College Admission Portal"));
    }
}
