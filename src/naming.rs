use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of the millisecond timestamp embedded in file names.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingStrategy {
    /// `image_<millis>.jpg`; two fetches in the same millisecond share a name
    #[default]
    Timestamp,
    /// `image_<millis>_<8 hex digits>.jpg`
    Random,
    /// `image_<millis>_<counter>.jpg`
    Sequence,
}

pub struct FileNamer {
    strategy: NamingStrategy,
    clock: Arc<dyn Clock>,
    counter: AtomicU64,
}

impl FileNamer {
    pub fn new(strategy: NamingStrategy) -> Self {
        Self::with_clock(strategy, Arc::new(SystemClock))
    }

    pub fn with_clock(strategy: NamingStrategy, clock: Arc<dyn Clock>) -> Self {
        Self {
            strategy,
            clock,
            counter: AtomicU64::new(0),
        }
    }

    pub fn strategy(&self) -> NamingStrategy {
        self.strategy
    }

    pub fn next_name(&self) -> String {
        let millis = self.clock.now_millis();
        match self.strategy {
            NamingStrategy::Timestamp => format!("image_{}.jpg", millis),
            NamingStrategy::Random => {
                let suffix: u32 = rand::rng().random();
                format!("image_{}_{:08x}.jpg", millis, suffix)
            }
            NamingStrategy::Sequence => {
                let n = self.counter.fetch_add(1, Ordering::Relaxed);
                format!("image_{}_{:04}.jpg", millis, n)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn fixed(strategy: NamingStrategy) -> FileNamer {
        FileNamer::with_clock(strategy, Arc::new(FixedClock(1_700_000_000_000)))
    }

    #[test]
    fn timestamp_name_format() {
        assert_eq!(
            fixed(NamingStrategy::Timestamp).next_name(),
            "image_1700000000000.jpg"
        );
    }

    #[test]
    fn timestamp_names_collide_within_a_millisecond() {
        let namer = fixed(NamingStrategy::Timestamp);
        assert_eq!(namer.next_name(), namer.next_name());
    }

    #[test]
    fn distinct_timestamps_give_distinct_names() {
        let a = FileNamer::with_clock(NamingStrategy::Timestamp, Arc::new(FixedClock(1)));
        let b = FileNamer::with_clock(NamingStrategy::Timestamp, Arc::new(FixedClock(2)));
        assert_ne!(a.next_name(), b.next_name());
    }

    #[test]
    fn sequence_names_count_up() {
        let namer = fixed(NamingStrategy::Sequence);
        assert_eq!(namer.next_name(), "image_1700000000000_0000.jpg");
        assert_eq!(namer.next_name(), "image_1700000000000_0001.jpg");
    }

    #[test]
    fn random_names_do_not_collide() {
        let namer = fixed(NamingStrategy::Random);
        let names: HashSet<_> = (0..64).map(|_| namer.next_name()).collect();
        assert_eq!(names.len(), 64);
        for name in &names {
            assert!(name.starts_with("image_1700000000000_"));
            assert!(name.ends_with(".jpg"));
        }
    }

    #[test]
    fn system_clock_is_after_2023() {
        assert!(SystemClock.now_millis() > 1_700_000_000_000);
    }
}
