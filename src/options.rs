//! Call Options Module
//!
//! Per-call parameter structs for the cache operations. All fields are
//! optional with sensible zero values, so `Default` plus the `with_*`
//! builders cover both the bare and the fully-specified call sites.

use std::time::Duration;

// == Set Options ==
/// Options for `set` (and the storing step of the refresh helpers).
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    /// Per-entry TTL; the engine default applies when unset
    pub ttl: Option<Duration>,
    /// Labels for group invalidation
    pub tags: Vec<String>,
}

impl SetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Adds one tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Adds several tags at once.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}

// == Preload Options ==
/// Options for `preload`: the storing options plus the `force` switch.
///
/// With `force` unset, a live entry short-circuits the loader entirely.
#[derive(Debug, Clone, Default)]
pub struct PreloadOptions {
    /// Per-entry TTL; the engine default applies when unset
    pub ttl: Option<Duration>,
    /// Labels for group invalidation
    pub tags: Vec<String>,
    /// Invoke the loader even when a live entry exists
    pub force: bool,
}

impl PreloadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Adds one tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Forces the loader to run even on a live entry.
    pub fn with_force(mut self) -> Self {
        self.force = true;
        self
    }
}

// == Get-Or-Set Options ==
/// Options for `get_or_set`: the storing options plus the
/// stale-while-revalidate threshold.
///
/// `refresh_threshold` is a percentage of the entry's TTL (0-100). When a
/// live entry has aged past it, `get_or_set` serves the current value and
/// refreshes in the background. Unset means no background refresh ever.
#[derive(Debug, Clone, Default)]
pub struct GetOrSetOptions {
    /// Per-entry TTL; the engine default applies when unset
    pub ttl: Option<Duration>,
    /// Labels for group invalidation
    pub tags: Vec<String>,
    /// Age threshold, as a percentage of the TTL, past which a background
    /// refresh fires on a hit
    pub refresh_threshold: Option<u8>,
}

impl GetOrSetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Adds one tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Enables background refresh past the given percentage of the TTL.
    pub fn with_refresh_threshold(mut self, percent: u8) -> Self {
        self.refresh_threshold = Some(percent);
        self
    }
}

// == Conversions ==
impl From<PreloadOptions> for SetOptions {
    fn from(opts: PreloadOptions) -> Self {
        SetOptions {
            ttl: opts.ttl,
            tags: opts.tags,
        }
    }
}

impl From<GetOrSetOptions> for SetOptions {
    fn from(opts: GetOrSetOptions) -> Self {
        SetOptions {
            ttl: opts.ttl,
            tags: opts.tags,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_options_builder() {
        let opts = SetOptions::new()
            .with_ttl(Duration::from_secs(30))
            .with_tag("products")
            .with_tags(["sessions", "users"]);

        assert_eq!(opts.ttl, Some(Duration::from_secs(30)));
        assert_eq!(opts.tags, vec!["products", "sessions", "users"]);
    }

    #[test]
    fn test_defaults_are_empty() {
        let opts = SetOptions::default();
        assert!(opts.ttl.is_none());
        assert!(opts.tags.is_empty());

        let opts = PreloadOptions::default();
        assert!(!opts.force);

        let opts = GetOrSetOptions::default();
        assert!(opts.refresh_threshold.is_none());
    }

    #[test]
    fn test_conversion_drops_extras() {
        let opts = GetOrSetOptions::new()
            .with_ttl(Duration::from_secs(5))
            .with_tag("products")
            .with_refresh_threshold(75);

        let set_opts: SetOptions = opts.into();
        assert_eq!(set_opts.ttl, Some(Duration::from_secs(5)));
        assert_eq!(set_opts.tags, vec!["products"]);
    }
}
