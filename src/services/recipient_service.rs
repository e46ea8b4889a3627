use std::collections::BTreeSet;

use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{Mentor, User, ACCOUNT_TYPE_FREE, ACCOUNT_TYPE_PRO};
use crate::utils::is_valid_email;

/// Audience selector for bulk notification and email dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientFilter {
    All,
    Free,
    Pro,
    Mentors,
    Specific {
        user_ids: Vec<Uuid>,
        mentor_ids: Vec<Uuid>,
        custom_emails: Vec<String>,
    },
}

impl RecipientFilter {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "all" => Some(Self::All),
            "free" => Some(Self::Free),
            "pro" => Some(Self::Pro),
            "mentors" => Some(Self::Mentors),
            _ => None,
        }
    }
}

/// Deduplicated, validated target set for one dispatch.
#[derive(Debug, Clone, Default)]
pub struct ResolvedAudience {
    pub users: Vec<User>,
    pub mentors: Vec<Mentor>,
    pub custom_emails: Vec<String>,
}

impl ResolvedAudience {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.mentors.is_empty() && self.custom_emails.is_empty()
    }

    pub fn has_notification_targets(&self) -> bool {
        !self.users.is_empty() || !self.mentors.is_empty()
    }

    /// Addresses from all three sources, lower-cased and deduplicated.
    pub fn emails(&self) -> Vec<String> {
        let merged: BTreeSet<String> = self
            .users
            .iter()
            .map(|u| u.email.as_str())
            .chain(self.mentors.iter().map(|m| m.email.as_str()))
            .chain(self.custom_emails.iter().map(String::as_str))
            .map(|e| e.to_lowercase())
            .collect();

        merged.into_iter().collect()
    }
}

/// Parse the free-text email field: entries separated by comma, semicolon
/// or newline; trimmed, lower-cased, invalid shapes silently dropped,
/// duplicates removed.
pub fn parse_custom_emails(raw: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut emails = Vec::new();

    for entry in raw.split([',', ';', '\n', '\r']) {
        let email = entry.trim().to_lowercase();
        if email.is_empty() || !is_valid_email(&email) {
            continue;
        }
        if seen.insert(email.clone()) {
            emails.push(email);
        }
    }

    emails
}

/// Apply a filter to in-memory candidate pools. Ids without a matching row
/// are silently excluded.
pub fn resolve(filter: &RecipientFilter, users: Vec<User>, mentors: Vec<Mentor>) -> ResolvedAudience {
    match filter {
        RecipientFilter::All => ResolvedAudience {
            users,
            ..Default::default()
        },
        RecipientFilter::Free => ResolvedAudience {
            users: users
                .into_iter()
                .filter(|u| u.account_type == ACCOUNT_TYPE_FREE)
                .collect(),
            ..Default::default()
        },
        RecipientFilter::Pro => ResolvedAudience {
            users: users.into_iter().filter(User::is_pro).collect(),
            ..Default::default()
        },
        RecipientFilter::Mentors => ResolvedAudience {
            mentors,
            ..Default::default()
        },
        RecipientFilter::Specific {
            user_ids,
            mentor_ids,
            custom_emails,
        } => ResolvedAudience {
            users: users
                .into_iter()
                .filter(|u| user_ids.contains(&u.id))
                .collect(),
            mentors: mentors
                .into_iter()
                .filter(|m| mentor_ids.contains(&m.id))
                .collect(),
            custom_emails: custom_emails.clone(),
        },
    }
}

pub struct RecipientService {
    db: Database,
}

impl RecipientService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Load the candidate pools for `filter` and resolve the audience.
    /// Fails with `NoRecipients` before any dispatch side effect can run.
    pub async fn resolve_audience(&self, filter: &RecipientFilter) -> Result<ResolvedAudience> {
        let (users, mentors) = self.load_pools(filter).await?;
        let audience = resolve(filter, users, mentors);

        if audience.is_empty() {
            return Err(AppError::NoRecipients);
        }

        Ok(audience)
    }

    async fn load_pools(&self, filter: &RecipientFilter) -> Result<(Vec<User>, Vec<Mentor>)> {
        const USER_COLUMNS: &str = "id, email, first_name, last_name, account_type, is_active";
        const MENTOR_COLUMNS: &str = "id, name, email, verified";

        match filter {
            RecipientFilter::All => {
                let users = sqlx::query_as(&format!(
                    "SELECT {USER_COLUMNS} FROM users \
                     WHERE is_active = true AND deleted_at IS NULL"
                ))
                .fetch_all(&self.db.pg)
                .await?;
                Ok((users, Vec::new()))
            }
            RecipientFilter::Free | RecipientFilter::Pro => {
                let tier = if matches!(filter, RecipientFilter::Free) {
                    ACCOUNT_TYPE_FREE
                } else {
                    ACCOUNT_TYPE_PRO
                };
                let users = sqlx::query_as(&format!(
                    "SELECT {USER_COLUMNS} FROM users \
                     WHERE is_active = true AND deleted_at IS NULL AND account_type = $1"
                ))
                .bind(tier)
                .fetch_all(&self.db.pg)
                .await?;
                Ok((users, Vec::new()))
            }
            RecipientFilter::Mentors => {
                let mentors = sqlx::query_as(&format!("SELECT {MENTOR_COLUMNS} FROM mentores"))
                    .fetch_all(&self.db.pg)
                    .await?;
                Ok((Vec::new(), mentors))
            }
            RecipientFilter::Specific {
                user_ids,
                mentor_ids,
                ..
            } => {
                let users = if user_ids.is_empty() {
                    Vec::new()
                } else {
                    sqlx::query_as(&format!(
                        "SELECT {USER_COLUMNS} FROM users \
                         WHERE is_active = true AND deleted_at IS NULL AND id = ANY($1)"
                    ))
                    .bind(user_ids)
                    .fetch_all(&self.db.pg)
                    .await?
                };

                let mentors = if mentor_ids.is_empty() {
                    Vec::new()
                } else {
                    sqlx::query_as(&format!(
                        "SELECT {MENTOR_COLUMNS} FROM mentores WHERE id = ANY($1)"
                    ))
                    .bind(mentor_ids)
                    .fetch_all(&self.db.pg)
                    .await?
                };

                Ok((users, mentors))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: Uuid, email: &str, account_type: &str) -> User {
        User {
            id,
            email: email.to_string(),
            first_name: None,
            last_name: None,
            account_type: account_type.to_string(),
            is_active: true,
        }
    }

    fn mentor(id: Uuid, email: &str) -> Mentor {
        Mentor {
            id,
            name: "Mentor".to_string(),
            email: email.to_string(),
            verified: true,
        }
    }

    #[test]
    fn parses_mixed_separators_and_drops_invalid_entries() {
        let parsed = parse_custom_emails("ok@example.com, not-an-email;OTRO@Example.Com\nok@example.com");
        assert_eq!(parsed, vec!["ok@example.com", "otro@example.com"]);
    }

    #[test]
    fn empty_free_text_yields_no_emails() {
        assert!(parse_custom_emails("").is_empty());
        assert!(parse_custom_emails("  \n ; , ").is_empty());
    }

    #[test]
    fn specific_filter_with_nothing_selected_is_empty() {
        let filter = RecipientFilter::Specific {
            user_ids: vec![],
            mentor_ids: vec![],
            custom_emails: vec![],
        };
        let audience = resolve(&filter, vec![], vec![]);
        assert!(audience.is_empty());
        assert!(!audience.has_notification_targets());
    }

    #[test]
    fn unknown_ids_are_silently_excluded() {
        let known = Uuid::new_v4();
        let filter = RecipientFilter::Specific {
            user_ids: vec![known, Uuid::new_v4()],
            mentor_ids: vec![Uuid::new_v4()],
            custom_emails: vec![],
        };
        let audience = resolve(&filter, vec![user(known, "a@b.co", "free")], vec![]);
        assert_eq!(audience.users.len(), 1);
        assert!(audience.mentors.is_empty());
    }

    #[test]
    fn tier_filters_select_by_account_type() {
        let users = vec![
            user(Uuid::new_v4(), "free@example.com", "free"),
            user(Uuid::new_v4(), "pro@example.com", "pro"),
        ];

        let free = resolve(&RecipientFilter::Free, users.clone(), vec![]);
        assert_eq!(free.users.len(), 1);
        assert_eq!(free.users[0].email, "free@example.com");

        let pro = resolve(&RecipientFilter::Pro, users, vec![]);
        assert_eq!(pro.users.len(), 1);
        assert!(pro.users[0].is_pro());
    }

    #[test]
    fn mentors_filter_selects_no_users() {
        let users = vec![user(Uuid::new_v4(), "u@example.com", "free")];
        let mentors = vec![mentor(Uuid::new_v4(), "m@example.com")];

        let audience = resolve(&RecipientFilter::Mentors, users, mentors);
        assert!(audience.users.is_empty());
        assert_eq!(audience.mentors.len(), 1);
    }

    #[test]
    fn emails_are_lowercased_and_deduplicated_across_sources() {
        let u = user(Uuid::new_v4(), "Foo@Bar.com", "free");
        let audience = ResolvedAudience {
            users: vec![u],
            mentors: vec![],
            custom_emails: vec!["foo@bar.com".to_string()],
        };

        assert_eq!(audience.emails(), vec!["foo@bar.com"]);
    }

    #[test]
    fn emails_merge_all_three_sources() {
        let audience = ResolvedAudience {
            users: vec![user(Uuid::new_v4(), "user@example.com", "pro")],
            mentors: vec![mentor(Uuid::new_v4(), "mentor@example.com")],
            custom_emails: vec!["extra@example.com".to_string()],
        };

        let emails = audience.emails();
        assert_eq!(emails.len(), 3);
        assert!(emails.contains(&"mentor@example.com".to_string()));
    }

    #[test]
    fn filter_tags_parse() {
        assert_eq!(RecipientFilter::from_tag("all"), Some(RecipientFilter::All));
        assert_eq!(RecipientFilter::from_tag("pro"), Some(RecipientFilter::Pro));
        assert_eq!(RecipientFilter::from_tag("everyone"), None);
    }
}
