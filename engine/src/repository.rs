//! Repository browser payload.

use crate::{Entity, FieldValue, Timestamp};
use serde::{Deserialize, Serialize};

/// Branch checked out when none is given.
pub const DEFAULT_BRANCH: &str = "main";

/// Local sync state of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepoStatus {
    Unsynced,
    Syncing,
    Synced,
    Error(String),
}

impl RepoStatus {
    /// Status name without the error message.
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoStatus::Unsynced => "unsynced",
            RepoStatus::Syncing => "syncing",
            RepoStatus::Synced => "synced",
            RepoStatus::Error(_) => "error",
        }
    }
}

impl From<&RepoStatus> for FieldValue {
    fn from(status: &RepoStatus) -> Self {
        FieldValue::Text(status.as_str().to_string())
    }
}

/// A tracked remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub name: String,
    pub url: String,
    pub branch: String,
    pub status: RepoStatus,
    pub size_bytes: u64,
    pub tags: Vec<String>,
    pub last_synced_at: Option<Timestamp>,
}

impl Repository {
    /// An unsynced repository on the default branch.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            branch: DEFAULT_BRANCH.to_string(),
            status: RepoStatus::Unsynced,
            size_bytes: 0,
            tags: Vec::new(),
            last_synced_at: None,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Case-insensitive name search.
    pub fn matches_query(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }

    /// Last URL segment without a `.git` suffix, or the name if that is empty.
    pub fn display_name(&self) -> &str {
        let last = self.url.trim_end_matches('/').rsplit('/').next().unwrap_or("");
        let last = last.strip_suffix(".git").unwrap_or(last);
        if last.is_empty() {
            &self.name
        } else {
            last
        }
    }
}

impl Entity for Repository {
    const FIELDS: &'static [&'static str] = &[
        "name",
        "url",
        "branch",
        "status",
        "sizeBytes",
        "tags",
        "lastSyncedAt",
    ];

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "name" => Some(self.name.as_str().into()),
            "url" => Some(self.url.as_str().into()),
            "branch" => Some(self.branch.as_str().into()),
            "status" => Some((&self.status).into()),
            "sizeBytes" => Some(FieldValue::Int(clamp_i64(self.size_bytes))),
            "tags" => Some(self.tags.clone().into()),
            "lastSyncedAt" => Some(self.last_synced_at.map(clamp_i64).into()),
            _ => None,
        }
    }
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Render a byte count with a binary unit, e.g. `2048576` as `"1.95 MB"`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    // compare the rounded value so 1023.999 KB is shown as 1 MB
    while round_cents(value) >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Total size of several repositories, formatted. Saturates at `u64::MAX`.
pub fn total_size<'a>(repos: impl IntoIterator<Item = &'a Repository>) -> String {
    let bytes = repos
        .into_iter()
        .map(|r| r.size_bytes)
        .fold(0u64, u64::saturating_add);
    format_size(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityStore, Filter};

    #[test]
    fn new_repository_defaults() {
        let repo = Repository::new("tokio", "https://github.com/tokio-rs/tokio");
        assert_eq!(repo.branch, "main");
        assert_eq!(repo.status, RepoStatus::Unsynced);
        assert_eq!(repo.size_bytes, 0);
        assert_eq!(repo.last_synced_at, None);
    }

    #[test]
    fn search_by_name() {
        let repo = Repository::new("actix", "https://github.com/actix/actix");
        assert!(repo.matches_query("act"));
        assert!(repo.matches_query("ACT"));
        assert!(!repo.matches_query("tokio"));
    }

    #[test]
    fn display_name_from_url() {
        let repo = Repository::new("Laravel", "https://github.com/laravel/laravel.git");
        assert_eq!(repo.display_name(), "laravel");

        let trailing = Repository::new("React", "https://github.com/facebook/react/");
        assert_eq!(trailing.display_name(), "react");

        let bare = Repository::new("Local", ".git");
        assert_eq!(bare.display_name(), "Local");
    }

    #[test]
    fn format_sizes() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(2_048_576), "1.95 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn format_sizes_promote_at_rounded_boundaries() {
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1_048_575), "1 MB");
        assert_eq!(format_size(1_048_570), "1023.99 KB");
        assert_eq!(format_size(1024 * 1024 * 1024 - 1), "1 GB");
        assert_eq!(format_size(u64::MAX), "16777216 TB");
    }

    #[test]
    fn total_size_sums() {
        let mut a = Repository::new("a", "u");
        a.size_bytes = 1024;
        let mut b = Repository::new("b", "u");
        b.size_bytes = 1024;
        assert_eq!(total_size([&a, &b]), "2 KB");
    }

    #[test]
    fn total_size_saturates() {
        let mut a = Repository::new("a", "u");
        a.size_bytes = u64::MAX;
        let mut b = Repository::new("b", "u");
        b.size_bytes = 1;
        assert_eq!(total_size([&a, &b]), format_size(u64::MAX));
    }

    #[test]
    fn filter_by_tag_and_status() {
        let store = EntityStore::new();
        store.create(
            Repository::new("fastapi-demo", "https://github.com/tiangolo/fastapi")
                .with_tags(["python", "web"]),
        );
        store.create(
            Repository::new("react-native", "https://github.com/facebook/react-native")
                .with_tags(["js", "mobile"]),
        );

        let web = store.filter(&Filter::new().includes("tags", "web"));
        assert_eq!(web.len(), 1);
        assert_eq!(web[0].payload().name, "fastapi-demo");

        let unsynced = store.filter(&Filter::new().eq("status", "unsynced"));
        assert_eq!(unsynced.len(), 2);

        let never_synced = store.filter(&Filter::new().eq("lastSyncedAt", FieldValue::Null));
        assert_eq!(never_synced.len(), 2);
    }
}
