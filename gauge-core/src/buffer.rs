use std::collections::VecDeque;

/// Longest window a buffer keeps: ten days, the span the coarsest time
/// gridline step can cover.
pub const MAX_WINDOW_MS: i64 = 10 * 86_400_000;

/// One timestamped reading; `time` is epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(time: i64, value: f64) -> Self {
        Self { time, value }
    }
}

/// Time-ordered samples of one gauge, bounded by a window duration.
///
/// Timestamps are non-decreasing front to back. Pushing evicts everything
/// older than `window_ms` before the pushed sample, and [`retain_window`]
/// does the same against the current server time on every tick.
///
/// [`retain_window`]: SampleBuffer::retain_window
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: VecDeque<Sample>,
    window_ms: i64,
}

impl SampleBuffer {
    pub fn new(window_ms: i64) -> Self {
        Self {
            samples: VecDeque::new(),
            window_ms: window_ms.clamp(1, MAX_WINDOW_MS),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    pub fn set_window_ms(&mut self, window_ms: i64) {
        self.window_ms = window_ms.clamp(1, MAX_WINDOW_MS);
        if let Some(last) = self.samples.back().copied() {
            self.evict_older_than(last.time - self.window_ms);
        }
    }

    /// Whether a sample at `time` keeps the buffer ordered.
    pub fn accepts(&self, time: i64) -> bool {
        self.samples.back().map_or(true, |last| time >= last.time)
    }

    /// Appends a sample. The caller guarantees `time` is not older than the
    /// last pushed sample.
    pub fn push(&mut self, time: i64, value: f64) {
        debug_assert!(
            self.accepts(time),
            "sample at {time} pushed after {:?}",
            self.samples.back()
        );
        self.evict_older_than(time - self.window_ms);
        self.samples.push_back(Sample { time, value });
    }

    /// Drops samples from the front while they are older than `window_start`.
    pub fn evict_older_than(&mut self, window_start: i64) -> usize {
        let mut evicted = 0;
        while let Some(front) = self.samples.front() {
            if front.time >= window_start {
                break;
            }
            self.samples.pop_front();
            evicted += 1;
        }
        evicted
    }

    pub fn retain_window(&mut self, now: i64) -> usize {
        self.evict_older_than(now - self.window_ms)
    }

    /// Replaces the whole buffer with a backfill. The samples are put in time
    /// order and trimmed to the window ending at the newest one.
    pub fn replace_all<I>(&mut self, samples: I)
    where
        I: IntoIterator<Item = Sample>,
    {
        let mut loaded: Vec<Sample> = samples
            .into_iter()
            .filter(|sample| sample.value.is_finite())
            .collect();
        loaded.sort_by_key(|sample| sample.time);
        self.samples = loaded.into();
        if let Some(last) = self.samples.back().copied() {
            self.evict_older_than(last.time - self.window_ms);
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.front()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> + '_ {
        self.samples.iter()
    }

    /// Min and max value over the retained samples.
    pub fn extent(&self) -> Option<(f64, f64)> {
        self.samples.iter().fold(None, |acc, sample| match acc {
            None => Some((sample.value, sample.value)),
            Some((min, max)) => Some((min.min(sample.value), max.max(sample.value))),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_sequence_is_kept_whole() {
        let mut buffer = SampleBuffer::new(60_000);
        buffer.push(0, 5.0);
        buffer.push(1_000, 5.2);
        buffer.push(2_000, 4.9);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.extent(), Some((4.9, 5.2)));
        assert_eq!(buffer.retain_window(2_000), 0);
    }

    #[test]
    fn long_sequence_is_capped_by_window() {
        let mut buffer = SampleBuffer::new(10_000);
        for i in 0..100 {
            let t = i * 1_000;
            buffer.push(t, i as f64);
            assert!(t - buffer.first().unwrap().time <= 10_000);
        }
        assert_eq!(buffer.len(), 11);
        assert_eq!(buffer.first().unwrap().time, 89_000);
        buffer.retain_window(100_000);
        assert_eq!(buffer.len(), 10);
    }

    #[test]
    fn evict_is_strictly_older() {
        let mut buffer = SampleBuffer::new(1_000_000);
        buffer.push(10, 1.0);
        buffer.push(20, 2.0);
        buffer.push(30, 3.0);
        assert_eq!(buffer.evict_older_than(20), 1);
        assert_eq!(buffer.first().map(|s| s.time), Some(20));
        assert_eq!(buffer.evict_older_than(31), 2);
        assert!(buffer.is_empty());
        assert_eq!(buffer.extent(), None);
    }

    #[test]
    fn replace_all_sorts_and_trims() {
        let mut buffer = SampleBuffer::new(5_000);
        buffer.push(1, 100.0);
        buffer.replace_all(vec![
            Sample::new(9_000, 3.0),
            Sample::new(1_000, 1.0),
            Sample::new(6_000, 2.0),
            Sample::new(7_000, f64::NAN),
        ]);
        let times: Vec<i64> = buffer.iter().map(|s| s.time).collect();
        assert_eq!(times, vec![6_000, 9_000]);
    }

    #[test]
    fn shrinking_window_evicts_from_newest() {
        let mut buffer = SampleBuffer::new(10_000);
        for t in [0, 2_000, 4_000, 6_000] {
            buffer.push(t, 0.0);
        }
        buffer.set_window_ms(3_000);
        assert_eq!(buffer.len(), 2);
        assert!(buffer.accepts(6_000));
        assert!(!buffer.accepts(5_999));
    }
}
