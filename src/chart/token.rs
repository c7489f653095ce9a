//! Client-credentials token cache.

use chrono::{DateTime, Duration, DurationRound, Utc};

/// Cached bearer token and its expiry.
///
/// Tokens are treated as valid until the top of the hour after they were
/// stored. Two racing refreshes both store a fresh token; the later one wins.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

/// Top of the current hour plus one hour.
pub fn next_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now.duration_trunc(Duration::hours(1)).unwrap_or(now) + Duration::hours(1)
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        matches!((&self.token, self.expires_at), (Some(_), Some(expiry)) if now < expiry)
    }

    /// The cached token, if still valid at `now`.
    pub fn get(&self, now: DateTime<Utc>) -> Option<String> {
        if self.is_valid(now) {
            self.token.clone()
        } else {
            None
        }
    }

    pub fn store(&mut self, token: impl Into<String>, now: DateTime<Utc>) {
        self.token = Some(token.into());
        self.expires_at = Some(next_expiry(now));
    }

    pub fn clear(&mut self) {
        self.token = None;
        self.expires_at = None;
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, s).unwrap()
    }

    #[test]
    fn test_empty_cache_is_invalid() {
        let cache = TokenCache::new();
        assert!(!cache.is_valid(at(9, 0, 0)));
        assert_eq!(cache.get(at(9, 0, 0)), None);
    }

    #[test]
    fn test_expires_at_top_of_next_hour() {
        let mut cache = TokenCache::new();
        cache.store("abc", at(9, 42, 17));
        assert_eq!(cache.expires_at(), Some(at(10, 0, 0)));
        assert_eq!(cache.get(at(9, 59, 59)).as_deref(), Some("abc"));
        assert!(!cache.is_valid(at(10, 0, 0)));
    }

    #[test]
    fn test_store_on_the_hour() {
        assert_eq!(next_expiry(at(23, 0, 0)), Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_clear() {
        let mut cache = TokenCache::new();
        cache.store("abc", at(9, 0, 0));
        cache.clear();
        assert!(!cache.is_valid(at(9, 1, 0)));
    }
}
