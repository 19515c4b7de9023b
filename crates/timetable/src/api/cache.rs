//! TTL-based caching for instructor rosters.

use super::types::Instructor;
use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Roster scope: the roster is looked up per (university, program).
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RosterKey {
    pub university: String,
    pub program: String,
}

impl RosterKey {
    pub fn new(university: &str, program: &str) -> Self {
        Self {
            university: university.to_string(),
            program: program.to_string(),
        }
    }
}

impl std::fmt::Display for RosterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.university, self.program)
    }
}

#[derive(Clone)]
struct CachedRoster {
    instructors: Vec<Instructor>,
    cached_at: Instant,
}

/// Thread-safe cache of instructor rosters.
///
/// Uses DashMap for concurrent access without external locking.
pub struct RosterCache {
    entries: DashMap<RosterKey, CachedRoster>,
    ttl: Duration,
}

impl RosterCache {
    /// Creates a new cache with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Gets a cached roster if it exists and hasn't expired.
    pub fn get(&self, key: &RosterKey) -> Option<Vec<Instructor>> {
        let hit = self.entries.get(key).and_then(|entry| {
            (entry.cached_at.elapsed() < self.ttl).then(|| entry.instructors.clone())
        });
        if hit.is_none() {
            // Expired entries are dropped on read
            self.entries.remove(key);
        }
        hit
    }

    pub fn insert(&self, key: RosterKey, instructors: Vec<Instructor>) {
        self.entries.insert(
            key,
            CachedRoster {
                instructors,
                cached_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, key: &RosterKey) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
