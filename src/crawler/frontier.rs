//! Breadth-first frontier
//!
//! This module handles:
//! - The FIFO queue of (URL, depth) entries still to be fetched
//! - Deduplication of normalized URLs across the whole session
//! - Same-domain containment relative to the seed
//! - Depth and page-count bounds
//!
//! The frontier is owned by the crawl loop and mutated through `&mut self`
//! only, so check-then-insert on the seen set cannot race.

use crate::crawler::control::CrawlControl;
use crate::url::{network_location, normalize_url, same_network_location};
use crate::UrlError;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Normalized URL
    pub url: Url,

    /// Link distance from the seed (the seed is 0)
    pub depth: u32,
}

/// What happened to a URL offered to [`Frontier::enqueue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Appended to the tail of the queue
    Queued,
    /// Already queued or visited in this session
    AlreadySeen,
    /// Network location differs from the seed's
    OffDomain,
    /// Deeper than the configured maximum
    TooDeep,
    /// Not an absolute HTTP(S) URL
    Invalid,
}

impl EnqueueOutcome {
    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued)
    }
}

/// FIFO frontier with a visited set, bounded by depth and page count
#[derive(Debug)]
pub struct Frontier {
    /// Every queued page must share this URL's network location
    seed: Url,

    /// Maximum depth (0 = unlimited)
    max_depth: u32,

    /// Maximum pages to visit (0 = unlimited)
    max_pages: u32,

    queue: VecDeque<FrontierEntry>,

    /// Every URL ever accepted, queued or visited
    seen: HashSet<String>,

    /// Dequeued URLs in visiting order
    visited: Vec<String>,

    control: CrawlControl,
}

impl Frontier {
    /// Creates an empty frontier scoped to the seed's network location
    pub fn new(
        seed: &Url,
        max_depth: u32,
        max_pages: u32,
        control: CrawlControl,
    ) -> Result<Self, UrlError> {
        if network_location(seed).is_none() {
            return Err(UrlError::MissingDomain);
        }

        Ok(Self {
            seed: seed.clone(),
            max_depth,
            max_pages,
            queue: VecDeque::new(),
            seen: HashSet::new(),
            visited: Vec::new(),
            control,
        })
    }

    /// Offers a URL discovered at `depth`
    ///
    /// The URL is normalized, then rejected if already seen, off the seed's
    /// network location, or deeper than `max_depth` (when non-zero).
    /// Otherwise it is marked seen and appended to the tail.
    pub fn enqueue(&mut self, url: &str, depth: u32) -> EnqueueOutcome {
        let normalized = match normalize_url(url) {
            Ok(normalized) => normalized,
            Err(e) => {
                tracing::debug!("Not queueing {}: {}", url, e);
                return EnqueueOutcome::Invalid;
            }
        };

        if self.seen.contains(normalized.as_str()) {
            return EnqueueOutcome::AlreadySeen;
        }

        if !same_network_location(&self.seed, &normalized) {
            return EnqueueOutcome::OffDomain;
        }

        if self.max_depth > 0 && depth > self.max_depth {
            return EnqueueOutcome::TooDeep;
        }

        self.seen.insert(normalized.to_string());
        tracing::trace!("Queued {} at depth {}", normalized, depth);
        self.queue.push_back(FrontierEntry {
            url: normalized,
            depth,
        });

        EnqueueOutcome::Queued
    }

    /// Pops the head of the queue and records it as visited
    pub fn dequeue(&mut self) -> Option<FrontierEntry> {
        let entry = self.queue.pop_front()?;
        self.visited.push(entry.url.to_string());
        Some(entry)
    }

    /// True when a stop was requested or the page budget is spent
    pub fn should_stop(&self) -> bool {
        self.control.is_stop_requested() || self.page_budget_exhausted()
    }

    /// True when `max_pages` is set and that many URLs have been visited
    pub fn page_budget_exhausted(&self) -> bool {
        self.max_pages > 0 && self.visited.len() >= self.max_pages as usize
    }

    /// Dequeued URLs in visiting order
    pub fn visited(&self) -> &[String] {
        &self.visited
    }

    /// Number of URLs waiting in the queue
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Consumes the frontier, returning the visited list
    pub fn into_visited(self) -> Vec<String> {
        self.visited
    }
}
