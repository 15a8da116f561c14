//! Comment and comment status types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::utils::error::CastdeskError;

/// A single moderation tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTag {
    Unreviewed,
    Publish,
    Trash,
}

impl StatusTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTag::Unreviewed => "unreviewed",
            StatusTag::Publish => "publish",
            StatusTag::Trash => "trash",
        }
    }
}

impl FromStr for StatusTag {
    type Err = CastdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "unreviewed" => Ok(StatusTag::Unreviewed),
            "publish" => Ok(StatusTag::Publish),
            "trash" => Ok(StatusTag::Trash),
            other => Err(CastdeskError::Parse(format!("unknown comment status: {}", other))),
        }
    }
}

/// The set of tags on a comment.
///
/// `publish` never coexists with `trash` or with `unreviewed`; the only
/// mutators are [`approve`](Self::approve) and [`trash`](Self::trash), which
/// keep that true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentStatus(BTreeSet<StatusTag>);

impl CommentStatus {
    pub fn unreviewed() -> Self {
        Self(BTreeSet::from([StatusTag::Unreviewed]))
    }

    pub fn published() -> Self {
        Self(BTreeSet::from([StatusTag::Publish]))
    }

    pub fn contains(&self, tag: StatusTag) -> bool {
        self.0.contains(&tag)
    }

    pub fn is_trashed(&self) -> bool {
        self.contains(StatusTag::Trash)
    }

    pub fn is_published(&self) -> bool {
        self.contains(StatusTag::Publish)
    }

    /// unreviewed -> publish; also restores a trashed comment
    pub fn approve(&mut self) {
        self.0.remove(&StatusTag::Unreviewed);
        self.0.remove(&StatusTag::Trash);
        self.0.insert(StatusTag::Publish);
    }

    /// Hide the comment; a published comment stops being published
    pub fn trash(&mut self) {
        self.0.remove(&StatusTag::Publish);
        self.0.insert(StatusTag::Trash);
    }

    pub fn tags(&self) -> impl Iterator<Item = StatusTag> + '_ {
        self.0.iter().copied()
    }

    /// True when no contradictory tags are present
    pub fn is_consistent(&self) -> bool {
        !(self.is_published() && (self.is_trashed() || self.contains(StatusTag::Unreviewed)))
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<&str> = self.tags().map(|tag| tag.as_str()).collect();
        f.write_str(&tags.join(","))
    }
}

impl FromStr for CommentStatus {
    type Err = CastdeskError;

    /// Comma separated tags, as stored in the `comments.status` column
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tags = s
            .split(',')
            .filter(|t| !t.trim().is_empty())
            .map(StatusTag::from_str)
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self(tags))
    }
}

/// A reader comment on a media item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub subject: String,
    pub body: String,
    pub status: CommentStatus,
    pub created_on: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_approve_moves_unreviewed_to_publish() {
        let mut status = CommentStatus::unreviewed();
        status.approve();
        assert!(status.is_published());
        assert!(!status.contains(StatusTag::Unreviewed));
    }

    #[test]
    fn test_trash_unpublishes() {
        let mut status = CommentStatus::published();
        status.trash();
        assert!(status.is_trashed());
        assert!(!status.is_published());
    }

    #[test]
    fn test_approve_restores_from_trash() {
        let mut status = CommentStatus::unreviewed();
        status.trash();
        assert_eq!(status.to_string(), "unreviewed,trash");
        status.approve();
        assert_eq!(status.to_string(), "publish");
    }

    #[test]
    fn test_status_column_round_trip() {
        let status: CommentStatus = "trash,unreviewed".parse().unwrap();
        assert!(status.is_trashed());
        assert_eq!(status.to_string(), "unreviewed,trash");
        assert!("publish,bogus".parse::<CommentStatus>().is_err());
        assert_eq!("".parse::<CommentStatus>().unwrap().to_string(), "");
    }

    proptest! {
        #[test]
        fn prop_moderation_never_contradicts(ops in proptest::collection::vec(any::<bool>(), 0..32), start_published in any::<bool>()) {
            let mut status = if start_published {
                CommentStatus::published()
            } else {
                CommentStatus::unreviewed()
            };
            for approve in ops {
                if approve {
                    status.approve();
                } else {
                    status.trash();
                }
                prop_assert!(status.is_consistent(), "inconsistent status {}", status);
            }
        }
    }
}
