use crate::error::ConfigError;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::time::{Duration, Instant};

/// Cooldown used when nothing else is configured
pub const DEFAULT_COOLDOWN_SECS: u64 = 60;

/// The runtime-adjustable clip cooldown, and who may adjust it
#[derive(Debug)]
pub struct ConfigState {
    owner: String,
    cooldown_secs: AtomicU64,
}

impl ConfigState {
    pub fn new(owner: &str, cooldown_secs: u64) -> Self {
        Self {
            owner: owner.to_lowercase(),
            cooldown_secs: AtomicU64::new(cooldown_secs),
        }
    }

    /// The current cooldown in seconds
    pub fn get(&self) -> u64 {
        self.cooldown_secs.load(Ordering::SeqCst)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.get())
    }

    /// Replace the cooldown with `value` seconds on behalf of `requester`.
    ///
    /// Only the channel owner may do this, and `value` must be a plain
    /// non-negative integer. Returns the newly stored value.
    pub fn set(&self, value: &str, requester: &str) -> Result<u64, ConfigError> {
        if requester.to_lowercase() != self.owner {
            return Err(ConfigError::PermissionDenied);
        }

        if value.is_empty() || !value.bytes().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidArgument(value.to_string()));
        }

        let secs = value
            .parse()
            .map_err(|_| ConfigError::InvalidArgument(value.to_string()))?;

        self.cooldown_secs.store(secs, Ordering::SeqCst);
        Ok(secs)
    }
}

/// Outcome of a cooldown check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Allowed,
    Denied { remaining_secs: u64 },
}

type Slot = Arc<AsyncMutex<Option<Instant>>>;

/// Per-user ledger of the last successful clip.
///
/// Every user gets their own slot. Holding a slot (see [`acquire`]) is the
/// critical section for that user only, so one user's pending clip never
/// holds up anybody else.
///
/// [`acquire`]: CooldownTracker::acquire
#[derive(Debug)]
pub struct CooldownTracker {
    config: Arc<ConfigState>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl CooldownTracker {
    pub fn new(config: Arc<ConfigState>) -> Self {
        Self {
            config,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Take the cooldown slot for `user`, waiting for any in-flight request
    /// by the same user to finish first.
    pub async fn acquire(&self, user: &str) -> CooldownSlot<'_> {
        let user = user.to_lowercase();
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            self.evict_idle(&mut slots, Instant::now());
            slots.entry(user.clone()).or_default().clone()
        };

        CooldownSlot {
            config: &self.config,
            user,
            last: slot.lock_owned().await,
        }
    }

    /// Check `user` against the cooldown as of `now`
    pub async fn check(&self, user: &str, now: Instant) -> Check {
        self.acquire(user).await.check(now)
    }

    /// Record a successful clip by `user` at `now`
    pub async fn record(&self, user: &str, now: Instant) {
        self.acquire(user).await.record(now)
    }

    /// Number of users currently tracked
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // drops slots nobody is using that could no longer deny a request.
    // linear in tracked users, which stays bounded by one cooldown window of clippers
    fn evict_idle(&self, slots: &mut HashMap<String, Slot>, now: Instant) {
        let cooldown = self.config.duration();
        slots.retain(|_, slot| {
            // clones only happen under the map lock, so a count of one means
            // no request is holding or waiting on this slot
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(last) => match *last {
                    Some(last) => now.saturating_duration_since(last) < cooldown,
                    None => false,
                },
                Err(_) => true,
            }
        });
    }
}

/// Exclusive access to one user's cooldown entry
#[derive(Debug)]
pub struct CooldownSlot<'a> {
    config: &'a ConfigState,
    user: String,
    last: OwnedMutexGuard<Option<Instant>>,
}

impl CooldownSlot<'_> {
    /// The normalized (lower case) user this slot belongs to
    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn check(&self, now: Instant) -> Check {
        let last = match *self.last {
            Some(last) => last,
            None => return Check::Allowed,
        };

        let cooldown = self.config.duration();
        let elapsed = now.saturating_duration_since(last);
        if elapsed >= cooldown {
            return Check::Allowed;
        }

        let remaining = cooldown - elapsed;
        let mut remaining_secs = remaining.as_secs();
        if remaining.subsec_nanos() > 0 {
            remaining_secs += 1;
        }
        Check::Denied { remaining_secs }
    }

    pub fn record(&mut self, now: Instant) {
        *self.last = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(secs: u64) -> (Arc<ConfigState>, CooldownTracker) {
        let config = Arc::new(ConfigState::new("Spesta_", secs));
        let tracker = CooldownTracker::new(config.clone());
        (config, tracker)
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_user_is_allowed() {
        let (_, tracker) = tracker(60);
        assert_eq!(tracker.check("alice", Instant::now()).await, Check::Allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn denies_inside_the_window() {
        let (_, tracker) = tracker(60);
        let t0 = Instant::now();
        tracker.record("alice", t0).await;

        let check = tracker.check("alice", t0 + Duration::from_secs(10)).await;
        assert_eq!(check, Check::Denied { remaining_secs: 50 });

        let check = tracker.check("alice", t0 + Duration::from_secs(60)).await;
        assert_eq!(check, Check::Allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_rounds_up() {
        let (_, tracker) = tracker(60);
        let t0 = Instant::now();
        tracker.record("alice", t0).await;

        let check = tracker
            .check("alice", t0 + Duration::from_millis(10_500))
            .await;
        assert_eq!(check, Check::Denied { remaining_secs: 50 });
    }

    #[tokio::test(start_paused = true)]
    async fn users_are_case_insensitive() {
        let (_, tracker) = tracker(60);
        let t0 = Instant::now();
        tracker.record("Alice", t0).await;

        let check = tracker.check("ALICE", t0 + Duration::from_secs(1)).await;
        assert_eq!(check, Check::Denied { remaining_secs: 59 });
        assert_eq!(tracker.check("bob", t0).await, Check::Allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn config_changes_apply_to_later_checks() {
        let (config, tracker) = tracker(60);
        let t0 = Instant::now();
        tracker.record("alice", t0).await;

        let at = t0 + Duration::from_secs(31);
        assert!(matches!(tracker.check("alice", at).await, Check::Denied { .. }));
        config.set("30", "spesta_").unwrap();
        assert_eq!(tracker.check("alice", at).await, Check::Allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn check_does_not_record() {
        let (_, tracker) = tracker(60);
        let t0 = Instant::now();
        tracker.check("alice", t0).await;
        tracker.check("alice", t0).await;
        assert_eq!(tracker.check("alice", t0).await, Check::Allowed);
    }

    #[tokio::test(start_paused = true)]
    async fn same_user_is_serialized() {
        let (_, tracker) = tracker(60);
        let tracker = Arc::new(tracker);

        let mut first = tracker.acquire("alice").await;
        assert_eq!(first.check(Instant::now()), Check::Allowed);

        let second = tokio::spawn({
            let tracker = tracker.clone();
            async move { tracker.check("alice", Instant::now()).await }
        });

        // a different user is not held up by alice
        assert_eq!(tracker.check("bob", Instant::now()).await, Check::Allowed);

        tokio::task::yield_now().await;
        assert!(!second.is_finished());

        first.record(Instant::now());
        drop(first);

        assert!(matches!(second.await.unwrap(), Check::Denied { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_entries_are_evicted_lazily() {
        let (_, tracker) = tracker(60);
        let t0 = Instant::now();
        tracker.record("alice", t0).await;
        tracker.check("bob", t0).await;

        // bob never created a clip, so his slot is gone on the next access
        tracker.check("carol", t0).await;
        assert_eq!(tracker.len(), 2);

        tokio::time::advance(Duration::from_secs(30)).await;
        tracker.check("carol", Instant::now()).await;
        assert_eq!(tracker.len(), 2);
        assert!(matches!(
            tracker.check("alice", Instant::now()).await,
            Check::Denied { .. }
        ));

        tokio::time::advance(Duration::from_secs(30)).await;
        tracker.check("carol", Instant::now()).await;
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.check("alice", Instant::now()).await, Check::Allowed);
    }

    #[test]
    fn only_the_owner_sets_the_cooldown() {
        let config = ConfigState::new("spesta_", 60);
        assert_eq!(config.set("5", "bob"), Err(ConfigError::PermissionDenied));
        assert_eq!(config.get(), 60);

        assert_eq!(config.set("30", "Spesta_"), Ok(30));
        assert_eq!(config.get(), 30);
    }

    #[test]
    fn cooldown_must_be_a_plain_integer() {
        let config = ConfigState::new("spesta_", 60);
        for bad in &["", "abc", "-5", "+5", "1.5", "99999999999999999999999"] {
            assert!(matches!(
                config.set(bad, "spesta_"),
                Err(ConfigError::InvalidArgument(_))
            ));
        }
        assert_eq!(config.get(), 60);
        assert_eq!(config.set("0", "spesta_"), Ok(0));
    }

    #[test]
    fn permission_is_checked_first() {
        let config = ConfigState::new("spesta_", 60);
        assert_eq!(config.set("abc", "bob"), Err(ConfigError::PermissionDenied));
    }
}
