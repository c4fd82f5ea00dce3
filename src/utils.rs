//! Small helpers: number formatting, dates, debounce, nested lookups

use serde_json::Value;
use std::time::{Duration, Instant};

/// Format a count with thousands separators (1234567 -> "1,234,567")
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Date portion of a "date time" timestamp: everything before the first space
pub fn date_part(timestamp: &str) -> &str {
    timestamp.split(' ').next().unwrap_or("")
}

/// First `n` characters of `s`, or all of `s` when shorter
pub fn prefix_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Trailing-edge debouncer.
///
/// Each `push` replaces the pending value and restarts the quiet period;
/// `poll` releases the value only once `delay` has elapsed since the last
/// push. A burst of pushes therefore yields exactly one value: the last one.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `value`, cancelling any earlier pending value
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.delay, value));
    }

    /// Take the pending value if its quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((deadline, _)) if now >= deadline => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    /// Take the pending value immediately, ignoring the deadline
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(_, v)| v)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }
}

/// Follow a dotted path ("a.b.0.c") through objects and arrays
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, key| match current {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Dotted lookup rendered as a string, with a fallback for missing or null values
pub fn lookup_str(value: &Value, path: &str, fallback: &str) -> String {
    match lookup(value, path) {
        None | Some(Value::Null) => fallback.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
        assert_eq!(format_count(100000), "100,000");
    }

    #[test]
    fn test_date_part() {
        assert_eq!(date_part("2024-03-01 09:14"), "2024-03-01");
        assert_eq!(date_part("2024-03-01"), "2024-03-01");
        assert_eq!(date_part(""), "");
    }

    #[test]
    fn test_prefix_chars_clamps() {
        assert_eq!(prefix_chars("short", 40), "short");
        assert_eq!(prefix_chars("abcdef", 3), "abc");
        assert_eq!(prefix_chars("", 40), "");
        // multi-byte characters are never split
        assert_eq!(prefix_chars("ééé", 2), "éé");
    }

    #[test]
    fn test_debounce_burst_fires_once_with_last_value() {
        let start = Instant::now();
        let delay = Duration::from_millis(150);
        let mut debouncer = Debouncer::new(delay);

        for (i, q) in ["h", "ho", "hou", "hous", "housing"].iter().enumerate() {
            let at = start + Duration::from_millis(20 * i as u64);
            debouncer.push(q.to_string(), at);
            assert_eq!(debouncer.poll(at), None, "must not fire on the leading edge");
        }

        let last_push = start + Duration::from_millis(80);
        assert_eq!(debouncer.poll(last_push + Duration::from_millis(149)), None);
        assert_eq!(
            debouncer.poll(last_push + delay),
            Some("housing".to_string())
        );
        assert_eq!(debouncer.poll(last_push + delay * 4), None);
    }

    #[test]
    fn test_debounce_push_reschedules_deadline() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        assert_eq!(debouncer.delay(), Duration::from_millis(100));
        debouncer.push(1, start);
        debouncer.push(2, start + Duration::from_millis(90));
        assert_eq!(debouncer.poll(start + Duration::from_millis(120)), None);
        assert_eq!(debouncer.deadline(), Some(start + Duration::from_millis(190)));
        assert_eq!(debouncer.poll(start + Duration::from_millis(190)), Some(2));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_debounce_flush() {
        let mut debouncer = Debouncer::new(Duration::from_secs(60));
        assert_eq!(debouncer.flush(), None::<u8>);
        debouncer.push(5, Instant::now());
        assert_eq!(debouncer.flush(), Some(5));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_lookup_nested() {
        let value = json!({"a": {"b": [{"c": "deep"}]}, "n": 3, "z": null});
        assert_eq!(lookup(&value, "a.b.0.c"), Some(&json!("deep")));
        assert_eq!(lookup(&value, "a.x.c"), None);
        assert_eq!(lookup(&value, "n.m"), None);
        assert_eq!(lookup_str(&value, "a.b.0.c", "-"), "deep");
        assert_eq!(lookup_str(&value, "n", "-"), "3");
        assert_eq!(lookup_str(&value, "z", "-"), "-");
        assert_eq!(lookup_str(&value, "missing", "-"), "-");
    }
}
