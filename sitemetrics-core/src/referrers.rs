//! Referrer tree model and spam-flag mutation.
//!
//! The tree is a value type: groups hold referrers, referrers hold exactly
//! one level of child referrers. A constructed tree is never mutated in
//! place; [`ReferrerTree::with_spam_flag`] produces a new tree in which only
//! the path from the root to the changed node is rebuilt and every sibling
//! subtree is carried over unchanged.
//!
//! Identifiers are not globally unique. The same URL may legitimately show
//! up as a group and again as a nested child; flag updates match by exact
//! identifier equality, scanning groups first, then each group's direct
//! referrers, then each referrer's children, and stop at the first match.
//! When identifiers collide across levels the shallowest node wins. That
//! asymmetry is part of the contract.

use serde::{Deserialize, Serialize};

/// A single referrer, optionally carrying one level of child referrers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referrer {
    /// Display name or URL; the handle spam moderation matches on.
    pub identifier: String,
    pub url: String,
    pub total: u64,
    pub marked_as_spam: bool,
    pub children: Vec<Referrer>,
}

impl Referrer {
    pub fn new(identifier: impl Into<String>, url: impl Into<String>, total: u64) -> Self {
        Self {
            identifier: identifier.into(),
            url: url.into(),
            total,
            marked_as_spam: false,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Referrer>) -> Self {
        self.children = children;
        self
    }
}

/// A named group of referrers (e.g. "Search Engines").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferrerGroup {
    pub identifier: String,
    pub total: u64,
    pub marked_as_spam: bool,
    pub referrers: Vec<Referrer>,
}

impl ReferrerGroup {
    pub fn new(identifier: impl Into<String>, total: u64, referrers: Vec<Referrer>) -> Self {
        Self {
            identifier: identifier.into(),
            total,
            marked_as_spam: false,
            referrers,
        }
    }
}

/// Ordered referrer groups for one stats period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferrerTree {
    pub groups: Vec<ReferrerGroup>,
    /// Whether the server had more groups than were requested.
    pub has_more: bool,
}

impl ReferrerTree {
    pub fn new(groups: Vec<ReferrerGroup>) -> Self {
        Self {
            groups,
            has_more: false,
        }
    }

    /// Return a new tree with the spam flag of the first node whose
    /// identifier equals `target` set to `flag`.
    ///
    /// Scan order is groups, then every group's direct referrers, then
    /// every referrer's children; only the first match is updated. A tree
    /// with no matching node is returned unchanged (identity, not an
    /// error). The receiver is left untouched.
    pub fn with_spam_flag(&self, target: &str, flag: bool) -> ReferrerTree {
        if let Some(gi) = self.groups.iter().position(|g| g.identifier == target) {
            let mut groups = self.groups.clone();
            groups[gi].marked_as_spam = flag;
            return ReferrerTree {
                groups,
                has_more: self.has_more,
            };
        }

        for (gi, group) in self.groups.iter().enumerate() {
            if let Some(ri) = group.referrers.iter().position(|r| r.identifier == target) {
                let mut groups = self.groups.clone();
                groups[gi].referrers[ri].marked_as_spam = flag;
                return ReferrerTree {
                    groups,
                    has_more: self.has_more,
                };
            }
        }

        for (gi, group) in self.groups.iter().enumerate() {
            for (ri, referrer) in group.referrers.iter().enumerate() {
                if let Some(ci) = referrer.children.iter().position(|c| c.identifier == target) {
                    let mut groups = self.groups.clone();
                    groups[gi].referrers[ri].children[ci].marked_as_spam = flag;
                    return ReferrerTree {
                        groups,
                        has_more: self.has_more,
                    };
                }
            }
        }

        self.clone()
    }

    /// Keep the first `limit` groups; `has_more` reports whether anything
    /// was cut off.
    pub fn truncated(&self, limit: usize) -> ReferrerTree {
        ReferrerTree {
            groups: self.groups.iter().take(limit).cloned().collect(),
            has_more: self.has_more || self.groups.len() > limit,
        }
    }
}
