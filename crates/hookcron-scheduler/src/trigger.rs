//! Trigger factory - turns a trigger type and expression into a policy that
//! computes fire times.
//!
//! Three policies exist:
//! - `cron`: calendar expression, repeats indefinitely
//! - `interval`: every N seconds, first fire N seconds after registration
//! - `once`: a single fire N seconds after registration

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio::time::Instant;

use crate::error::{SchedulerError, SchedulerResult};

/// Delays are clamped to this so that `Instant` arithmetic cannot overflow.
const MAX_DELAY: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 100);

/// Kind of trigger named by a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerType {
    Cron,
    Interval,
    Once,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::Cron => "cron",
            TriggerType::Interval => "interval",
            TriggerType::Once => "once",
        }
    }
}

impl FromStr for TriggerType {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cron" => Ok(TriggerType::Cron),
            "interval" => Ok(TriggerType::Interval),
            "once" => Ok(TriggerType::Once),
            other => Err(SchedulerError::UnsupportedTriggerType(other.to_string())),
        }
    }
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point at which a trigger wants to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Due {
    /// Monotonic fire time used by the dispatch loop.
    pub at: Instant,
    /// Wall-clock equivalent, for calendar bookkeeping and display.
    pub wall: DateTime<Utc>,
}

impl Due {
    fn after(delay: Duration) -> Self {
        let delay = delay.min(MAX_DELAY);
        let wall = Utc::now()
            + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
        Self {
            at: Instant::now() + delay,
            wall,
        }
    }

    fn at_wall(wall: DateTime<Utc>) -> Self {
        let delay = (wall - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        Self {
            at: Instant::now() + delay.min(MAX_DELAY),
            wall,
        }
    }
}

/// Executable trigger policy.
#[derive(Debug, Clone)]
pub enum TriggerPolicy {
    /// Fires at calendar instants defined by a cron expression.
    Calendar {
        expression: String,
        schedule: Box<Schedule>,
    },
    /// Fires every `Duration`, first fire one duration after registration.
    Interval(Duration),
    /// Fires exactly once, one duration after registration.
    OnceAfter(Duration),
}

impl TriggerPolicy {
    /// Build a policy from a trigger type name and its expression.
    pub fn parse(trigger_type: &str, expression: &str) -> SchedulerResult<Self> {
        Self::build(trigger_type.parse()?, expression)
    }

    /// Build a policy for a known trigger type.
    pub fn build(trigger_type: TriggerType, expression: &str) -> SchedulerResult<Self> {
        match trigger_type {
            TriggerType::Cron => {
                let normalized = normalize_cron(expression);
                let schedule = Schedule::from_str(&normalized).map_err(|e| {
                    SchedulerError::InvalidExpression {
                        expression: expression.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(TriggerPolicy::Calendar {
                    expression: expression.trim().to_string(),
                    schedule: Box::new(schedule),
                })
            }
            TriggerType::Interval => Ok(TriggerPolicy::Interval(parse_seconds(expression)?)),
            TriggerType::Once => Ok(TriggerPolicy::OnceAfter(parse_seconds(expression)?)),
        }
    }

    pub fn trigger_type(&self) -> TriggerType {
        match self {
            TriggerPolicy::Calendar { .. } => TriggerType::Cron,
            TriggerPolicy::Interval(_) => TriggerType::Interval,
            TriggerPolicy::OnceAfter(_) => TriggerType::Once,
        }
    }

    /// Whether the policy becomes inert after its first firing.
    pub fn is_one_shot(&self) -> bool {
        matches!(self, TriggerPolicy::OnceAfter(_))
    }

    /// First fire time, measured from now.
    ///
    /// `None` means the policy will never fire (a calendar with no future
    /// instants).
    pub fn first_due(&self) -> Option<Due> {
        match self {
            TriggerPolicy::Calendar { schedule, .. } => {
                schedule.after(&Utc::now()).next().map(Due::at_wall)
            }
            TriggerPolicy::Interval(period) | TriggerPolicy::OnceAfter(period) => {
                Some(Due::after(*period))
            }
        }
    }

    /// Fire time following a firing that was due at `previous` and was
    /// dispatched at `fired_at`.
    ///
    /// Calendars never repeat an instant at or before `previous`. Intervals
    /// measure from the dispatch instant so consecutive firings are at least
    /// one period apart.
    pub fn next_due(&self, previous: &Due, fired_at: Instant) -> Option<Due> {
        match self {
            TriggerPolicy::Calendar { schedule, .. } => {
                let from = previous.wall.max(Utc::now());
                schedule.after(&from).next().map(Due::at_wall)
            }
            TriggerPolicy::Interval(period) => {
                let period = (*period).min(MAX_DELAY);
                let wall = previous.wall
                    + chrono::Duration::from_std(period).unwrap_or_else(|_| chrono::Duration::zero());
                Some(Due {
                    at: fired_at + period,
                    wall,
                })
            }
            TriggerPolicy::OnceAfter(_) => None,
        }
    }
}

impl fmt::Display for TriggerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerPolicy::Calendar { expression, .. } => write!(f, "cron({})", expression),
            TriggerPolicy::Interval(period) => write!(f, "interval({}s)", period.as_secs()),
            TriggerPolicy::OnceAfter(delay) => write!(f, "once({}s)", delay.as_secs()),
        }
    }
}

/// Weekday names indexed by standard cron numbering (0 = Sunday).
const WEEKDAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Expand a standard 5-field cron expression to the 6-field form with a
/// leading seconds column. Other forms pass through unchanged.
///
/// The `cron` crate numbers weekdays 1-7 from Sunday, while 5-field cron
/// numbers them 0-7 with both 0 and 7 meaning Sunday. The day-of-week
/// column of a 5-field expression is therefore rewritten to weekday names.
pub(crate) fn normalize_cron(expression: &str) -> String {
    let trimmed = expression.trim();
    let fields: Vec<&str> = trimmed.split_whitespace().collect();
    match fields.as_slice() {
        [minute, hour, day_of_month, month, day_of_week] => format!(
            "0 {} {} {} {} {}",
            minute,
            hour,
            day_of_month,
            month,
            normalize_day_of_week(day_of_week)
        ),
        _ => trimmed.to_string(),
    }
}

/// Rewrite a 5-field day-of-week column as a list of weekday names.
///
/// A column that does not parse as standard cron is returned unchanged and
/// left to the `cron` crate to accept or reject.
fn normalize_day_of_week(field: &str) -> String {
    if field == "*" || field == "?" {
        return field.to_string();
    }

    let mut selected = [false; 7];
    for item in field.split(',') {
        match weekdays_in(item) {
            Some(days) => days.into_iter().for_each(|day| selected[day] = true),
            None => return field.to_string(),
        }
    }

    WEEKDAY_NAMES
        .iter()
        .zip(selected)
        .filter_map(|(name, on)| on.then_some(*name))
        .collect::<Vec<_>>()
        .join(",")
}

/// Weekdays (0 = Sunday) selected by one list item: a day, a range, or
/// either of those or `*` with a `/step`.
fn weekdays_in(item: &str) -> Option<Vec<usize>> {
    let (base, step) = match item.split_once('/') {
        Some((base, step)) => (base, step.parse::<usize>().ok().filter(|s| *s > 0)?),
        None => (item, 1),
    };

    let (start, end) = match base {
        "*" | "?" => (0, 6),
        _ => match base.split_once('-') {
            Some((start, end)) => (weekday_number(start)?, weekday_number(end)?),
            // `N/step` runs to the end of the week.
            None if item.contains('/') => {
                let start = weekday_number(base)?;
                (start, start.max(6))
            }
            None => {
                let day = weekday_number(base)?;
                (day, day)
            }
        },
    };
    if start > end {
        return None;
    }

    Some((start..=end).step_by(step).map(|day| day % 7).collect())
}

/// Standard cron weekday number (0-7) or three-letter name.
fn weekday_number(token: &str) -> Option<usize> {
    match token.parse::<usize>() {
        Ok(day) => (day <= 7).then_some(day),
        Err(_) => WEEKDAY_NAMES
            .iter()
            .position(|name| name.eq_ignore_ascii_case(token)),
    }
}

/// Parse a non-negative base-10 number of seconds.
fn parse_seconds(expression: &str) -> SchedulerResult<Duration> {
    let invalid = |reason: &str| SchedulerError::InvalidExpression {
        expression: expression.to_string(),
        reason: reason.to_string(),
    };

    if expression.is_empty() || !expression.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("expected a non-negative integer number of seconds"));
    }

    expression
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| invalid("number of seconds is out of range"))
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
