//! Advisory per-day usage counters. Nothing server-side enforces these.

use std::fmt;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageCategory {
    Chat,
    Transform,
    Image,
}

impl UsageCategory {
    pub const ALL: [UsageCategory; 3] = [
        UsageCategory::Chat,
        UsageCategory::Transform,
        UsageCategory::Image,
    ];

    pub fn daily_limit(self) -> u32 {
        match self {
            UsageCategory::Chat => 50,
            UsageCategory::Transform => 100,
            UsageCategory::Image => 10,
        }
    }

    pub fn limit_warning(self) -> &'static str {
        match self {
            UsageCategory::Chat => "今日对话次数已用完，请明天再试。",
            UsageCategory::Transform => "今日转换次数已用完，请明天再试。",
            UsageCategory::Image => "今日配图次数已用完，请明天再试。",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UsageCategory::Chat => "chat",
            UsageCategory::Transform => "transform",
            UsageCategory::Image => "image",
        }
    }
}

impl fmt::Display for UsageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitCheck {
    pub allowed: bool,
    pub remaining: u32,
}

/// Counters for a single day. `date` is ISO `YYYY-MM-DD`; an empty or stale
/// date reads as all-zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitState {
    pub date: String,
    pub chat: u32,
    pub transform: u32,
    pub image: u32,
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl RateLimitState {
    fn count(&self, category: UsageCategory) -> u32 {
        match category {
            UsageCategory::Chat => self.chat,
            UsageCategory::Transform => self.transform,
            UsageCategory::Image => self.image,
        }
    }

    fn count_mut(&mut self, category: UsageCategory) -> &mut u32 {
        match category {
            UsageCategory::Chat => &mut self.chat,
            UsageCategory::Transform => &mut self.transform,
            UsageCategory::Image => &mut self.image,
        }
    }

    /// Usage of `category` on `day`, zero when the counters belong to another day.
    pub fn used(&self, category: UsageCategory, day: NaiveDate) -> u32 {
        if self.date == iso(day) {
            self.count(category)
        } else {
            0
        }
    }

    /// Reads without mutating, so a rollover is only materialized by `increment`.
    pub fn check(&self, category: UsageCategory, day: NaiveDate) -> RateLimitCheck {
        let limit = category.daily_limit();
        let used = self.used(category, day);
        RateLimitCheck {
            allowed: used < limit,
            remaining: limit.saturating_sub(used),
        }
    }

    pub fn increment(&mut self, category: UsageCategory, day: NaiveDate) {
        let day = iso(day);
        if self.date != day {
            *self = RateLimitState {
                date: day,
                ..Default::default()
            };
        }
        *self.count_mut(category) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_fresh_state_allows_full_quota() {
        let state = RateLimitState::default();
        for category in UsageCategory::ALL {
            let check = state.check(category, day(1));
            assert!(check.allowed);
            assert_eq!(check.remaining, category.daily_limit());
        }
    }

    #[test]
    fn test_check_does_not_mutate() {
        let state = RateLimitState {
            date: "2025-03-01".to_string(),
            chat: 3,
            transform: 0,
            image: 0,
        };
        let before = state.clone();
        state.check(UsageCategory::Chat, day(2));
        assert_eq!(state, before);
    }

    #[test]
    fn test_exhausted_category_is_denied() {
        let mut state = RateLimitState::default();
        for _ in 0..10 {
            state.increment(UsageCategory::Image, day(1));
        }
        let check = state.check(UsageCategory::Image, day(1));
        assert!(!check.allowed);
        assert_eq!(check.remaining, 0);
        assert!(state.check(UsageCategory::Chat, day(1)).allowed);
    }

    #[test]
    fn test_rollover_resets_all_counters() {
        let mut state = RateLimitState {
            date: "2025-03-01".to_string(),
            chat: 50,
            transform: 100,
            image: 10,
        };
        assert!(state.check(UsageCategory::Transform, day(2)).allowed);

        state.increment(UsageCategory::Transform, day(2));
        assert_eq!(
            state,
            RateLimitState {
                date: "2025-03-02".to_string(),
                chat: 0,
                transform: 1,
                image: 0,
            }
        );
    }

    #[test]
    fn test_state_round_trips_as_json() {
        let state: RateLimitState = serde_json::from_str(
            r#"{"date": "2025-03-01", "chat": 2, "transform": 5, "image": 1}"#,
        )
        .unwrap();
        assert_eq!(state.used(UsageCategory::Transform, day(1)), 5);
    }
}
