use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{NotificationContent, NOTIFICATION_KIND_GENERAL};
use crate::services::email_service::{EmailSender, OutboundEmail};
use crate::services::recipient_service::ResolvedAudience;

/// Persistence seam for the two notification tables.
///
/// Users and mentors keep their divergent row shapes (`metadata`/`read`
/// vs `data`/`is_read`); the column mapping lives in the implementation,
/// never in the callers.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_user_notifications(
        &self,
        user_ids: &[Uuid],
        content: &NotificationContent,
    ) -> Result<()>;

    async fn insert_mentor_notifications(
        &self,
        mentor_ids: &[Uuid],
        kind: &str,
        content: &NotificationContent,
    ) -> Result<()>;
}

#[async_trait]
impl NotificationStore for Database {
    async fn insert_user_notifications(
        &self,
        user_ids: &[Uuid],
        content: &NotificationContent,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO notifications \
             (user_id, title, message, type, priority, action_url, expires_at, metadata, read) \
             SELECT u, $2, $3, $4, $5, $6, $7, $8, false FROM UNNEST($1::uuid[]) AS u",
        )
        .bind(user_ids)
        .bind(&content.title)
        .bind(&content.message)
        .bind(&content.kind)
        .bind(&content.priority)
        .bind(&content.action_url)
        .bind(content.expires_at)
        .bind(&content.metadata)
        .execute(&self.pg)
        .await?;

        Ok(())
    }

    async fn insert_mentor_notifications(
        &self,
        mentor_ids: &[Uuid],
        kind: &str,
        content: &NotificationContent,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO mentor_notifications \
             (mentor_id, title, message, type, data, is_read) \
             SELECT m, $2, $3, $4, $5, false FROM UNNEST($1::uuid[]) AS m",
        )
        .bind(mentor_ids)
        .bind(&content.title)
        .bind(&content.message)
        .bind(kind)
        .bind(&content.metadata)
        .execute(&self.pg)
        .await?;

        Ok(())
    }
}

/// Email channel result inside a dispatch outcome. `total` counts the
/// addresses attempted; a provider failure fills `error` without
/// affecting the notification counts.
#[derive(Debug, Clone, Serialize)]
pub struct EmailDispatch {
    pub sent: usize,
    #[serde(rename = "total")]
    pub attempted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate result of one dispatch. `email` is `None` when the email
/// channel was not requested, so callers can tell "not attempted" from
/// "attempted and sent zero".
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub users_notified: usize,
    pub mentors_notified: usize,
    pub email: Option<EmailDispatch>,
}

/// Dual-channel dispatcher: in-app notification rows first, outbound
/// email second. The email channel is best-effort; notification inserts
/// are never rolled back because a provider call failed.
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    email: Arc<dyn EmailSender>,
    mentor_default_kind: String,
}

impl NotificationService {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        email: Arc<dyn EmailSender>,
        mentor_default_kind: String,
    ) -> Self {
        Self {
            store,
            email,
            mentor_default_kind,
        }
    }

    pub async fn dispatch(
        &self,
        audience: &ResolvedAudience,
        content: &NotificationContent,
        send_email: bool,
    ) -> Result<DispatchOutcome> {
        if !audience.has_notification_targets() {
            return Err(AppError::NoRecipients);
        }

        let mut users_notified = 0;
        if !audience.users.is_empty() {
            let ids: Vec<Uuid> = audience.users.iter().map(|u| u.id).collect();
            self.store.insert_user_notifications(&ids, content).await?;
            users_notified = ids.len();
        }

        let mut mentors_notified = 0;
        if !audience.mentors.is_empty() {
            let ids: Vec<Uuid> = audience.mentors.iter().map(|m| m.id).collect();
            let kind = self.mentor_kind(&content.kind);
            self.store
                .insert_mentor_notifications(&ids, kind, content)
                .await?;
            mentors_notified = ids.len();
        }

        let email = if send_email {
            Some(self.send_email_channel(audience, content).await)
        } else {
            None
        };

        Ok(DispatchOutcome {
            users_notified,
            mentors_notified,
            email,
        })
    }

    /// The mentor taxonomy has no "general" entry; the replacement type is
    /// configurable (notifications.mentor_default_type).
    fn mentor_kind<'a>(&'a self, kind: &'a str) -> &'a str {
        if kind == NOTIFICATION_KIND_GENERAL {
            &self.mentor_default_kind
        } else {
            kind
        }
    }

    async fn send_email_channel(
        &self,
        audience: &ResolvedAudience,
        content: &NotificationContent,
    ) -> EmailDispatch {
        let recipients = audience.emails();
        if recipients.is_empty() {
            return EmailDispatch {
                sent: 0,
                attempted: 0,
                error: None,
            };
        }

        let attempted = recipients.len();
        let outbound = OutboundEmail {
            from: self.email.full_from(),
            to: recipients,
            subject: content.title.clone(),
            html: Some(render_html(content)),
            text: Some(render_text(content)),
            ..Default::default()
        };

        match self.email.send(&outbound).await {
            Ok(_) => EmailDispatch {
                sent: attempted,
                attempted,
                error: None,
            },
            Err(e) => {
                tracing::error!(error = %e, "email channel failed, notifications kept");
                EmailDispatch {
                    sent: 0,
                    attempted,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

pub fn render_html(content: &NotificationContent) -> String {
    let message_html = content.message.replace('\n', "<br>");
    let action_button = content
        .action_url
        .as_deref()
        .map(|url| {
            format!(
                r#"<a href="{url}" style="display: inline-block; background: #2563eb; color: white; padding: 12px 24px; text-decoration: none; border-radius: 8px; margin-top: 20px;">Ver más</a>"#
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h1 style="color: #1a1a1a; margin-bottom: 20px;">{title}</h1>
  <div style="color: #666; font-size: 16px; line-height: 1.6; white-space: pre-wrap;">{message_html}</div>
  {action_button}
</div>"#,
        title = content.title,
    )
}

/// Plain-text fallback: the same payload without markup, with the action
/// URL appended as its own line.
pub fn render_text(content: &NotificationContent) -> String {
    match content.action_url.as_deref() {
        Some(url) => format!("{}\n\n{}\n\nVer más: {}", content.title, content.message, url),
        None => format!("{}\n\n{}", content.title, content.message),
    }
}
