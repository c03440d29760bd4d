use std::collections::VecDeque;

use crate::playback::playback_source::PlaybackSource;

/// Fixed playback rate of translation audio from the engine.
pub const PLAYBACK_SAMPLE_RATE: u32 = 24_000;

/// Converts an arrival-ordered stream of decoded fragments into gapless,
/// non-overlapping audio output.
///
/// The scheduler owns the output-time cursor `next_start_time` and the set
/// of all not-yet-ended sources. The output clock is the number of samples
/// rendered so far divided by the sample rate; [`render`](Self::render)
/// advances it one sample per output sample.
///
/// Fragments are scheduled in arrival order and never reordered: if the
/// channel ever delivers fragments out of production order, playback order
/// will be wrong. Known limitation.
pub struct PlaybackScheduler {
    sample_rate: u32,
    rendered_samples: u64,
    next_start_time: f64,
    sources: VecDeque<PlaybackSource>,
}

impl PlaybackScheduler {
    #[must_use]
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            rendered_samples: 0,
            next_start_time: 0.0,
            sources: VecDeque::new(),
        }
    }

    /// Current output-clock time, in seconds since the scheduler opened.
    #[must_use]
    pub fn current_time(&self) -> f64 {
        self.rendered_samples as f64 / f64::from(self.sample_rate)
    }

    /// Where the next fragment will be chained, in seconds.
    #[must_use]
    pub fn next_start_time(&self) -> f64 {
        self.next_start_time
    }

    /// Number of sources that have not yet ended.
    #[must_use]
    pub fn active_sources(&self) -> usize {
        self.sources.len()
    }

    /// Schedules a decoded fragment for playback and returns its start time.
    ///
    /// The start is `max(next_start_time, current_time())` — chained to the
    /// previous fragment's end, but never in the past — and the cursor
    /// advances by the fragment's duration. Consecutive fragments therefore
    /// abut exactly: no gap, no overlap.
    pub fn schedule(&mut self, samples: Vec<f32>) -> f64 {
        let now = self.current_time();
        let start = if self.next_start_time > now {
            self.next_start_time
        } else {
            now
        };
        let duration = samples.len() as f64 / f64::from(self.sample_rate);

        // Sample-exact start position, so chained sources stay contiguous
        // with no float drift in the render path.
        let start_sample = (start * f64::from(self.sample_rate)).round() as u64;
        self.sources
            .push_back(PlaybackSource::new(samples, start, start_sample));

        self.next_start_time = start + duration;
        start
    }

    /// Barge-in: forcibly stops every pending or playing source, clears the
    /// active set and resets the cursor to the current clock time. Fragments
    /// arriving afterwards schedule fresh.
    pub fn interrupt(&mut self) {
        for src in &mut self.sources {
            src.stop();
        }
        self.sources.clear();
        self.next_start_time = self.current_time();
    }

    /// Renders output samples, advancing the clock one sample per slot.
    /// Emits silence until the front source is due, then plays sources
    /// back-to-back; ended sources are removed from the active set.
    pub fn render(&mut self, out: &mut [f32]) {
        for slot in out.iter_mut() {
            *slot = self.take_sample();
            self.rendered_samples += 1;
        }
    }

    fn take_sample(&mut self) -> f32 {
        loop {
            let Some(front) = self.sources.front_mut() else {
                return 0.0;
            };
            if self.rendered_samples < front.start_sample() {
                // Not due yet.
                return 0.0;
            }
            match front.take_sample() {
                Some(s) => return s,
                None => {
                    self.sources.pop_front();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    const EPS: f64 = 1e-9;

    fn render_seconds(sched: &mut PlaybackScheduler, secs: f64) -> Vec<f32> {
        let n = (secs * f64::from(PLAYBACK_SAMPLE_RATE)).round() as usize;
        let mut out = vec![0.0f32; n];
        sched.render(&mut out);
        out
    }

    fn samples_for(secs: f64) -> Vec<f32> {
        let n = (secs * f64::from(PLAYBACK_SAMPLE_RATE)).round() as usize;
        vec![0.5; n]
    }

    #[test]
    fn fragments_chain_gapless() {
        let mut sched = PlaybackScheduler::new(PLAYBACK_SAMPLE_RATE);
        render_seconds(&mut sched, 10.0);
        assert!((sched.current_time() - 10.0).abs() < EPS);

        let first = sched.schedule(samples_for(0.5));
        let second = sched.schedule(samples_for(0.3));

        assert!((first - 10.0).abs() < EPS, "first start was {first}");
        assert!((second - 10.5).abs() < EPS, "second start was {second}");
        assert!(
            (sched.next_start_time() - 10.8).abs() < EPS,
            "cursor was {}",
            sched.next_start_time()
        );
        assert_eq!(sched.active_sources(), 2);
    }

    #[test]
    fn chained_starts_equal_sum_of_previous_durations() {
        let mut sched = PlaybackScheduler::new(PLAYBACK_SAMPLE_RATE);
        let durations = [0.25, 0.1, 0.4, 0.05];

        let mut expected = sched.current_time();
        for d in durations {
            let start = sched.schedule(samples_for(d));
            assert!((start - expected).abs() < EPS, "start {start} != {expected}");
            expected += d;
        }
    }

    #[test]
    fn never_schedules_in_the_past() {
        let mut sched = PlaybackScheduler::new(PLAYBACK_SAMPLE_RATE);
        sched.schedule(samples_for(0.1));

        // Let the clock run well past the fragment's end.
        render_seconds(&mut sched, 1.0);

        let start = sched.schedule(samples_for(0.1));
        assert!(
            start >= sched.current_time() - EPS,
            "scheduled at {start}, clock at {}",
            sched.current_time()
        );
        assert!((start - 1.0).abs() < EPS);
    }

    #[test]
    fn interruption_stops_sources_and_resets_cursor() {
        let mut sched = PlaybackScheduler::new(PLAYBACK_SAMPLE_RATE);
        render_seconds(&mut sched, 10.0);
        sched.schedule(samples_for(0.5));
        sched.schedule(samples_for(0.5));

        // First fragment is mid-play when the barge-in arrives.
        render_seconds(&mut sched, 0.2);
        sched.interrupt();

        assert_eq!(sched.active_sources(), 0);
        assert!((sched.next_start_time() - 10.2).abs() < EPS);

        // Subsequent fragments schedule fresh, never before the interruption.
        let start = sched.schedule(samples_for(0.1));
        assert!(start >= 10.2 - EPS);
    }

    #[test]
    fn renders_silence_when_nothing_is_scheduled() {
        let mut sched = PlaybackScheduler::new(PLAYBACK_SAMPLE_RATE);
        let out = render_seconds(&mut sched, 0.01);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn renders_fragments_back_to_back() {
        let mut sched = PlaybackScheduler::new(PLAYBACK_SAMPLE_RATE);
        sched.schedule(vec![0.1; 24]);
        sched.schedule(vec![0.2; 24]);

        let mut out = vec![0.0f32; 48];
        sched.render(&mut out);

        assert!(out[..24].iter().all(|&s| (s - 0.1).abs() < f32::EPSILON));
        assert!(out[24..].iter().all(|&s| (s - 0.2).abs() < f32::EPSILON));
        assert_eq!(sched.active_sources(), 0, "ended sources are removed");
    }

    #[test]
    fn fragments_after_interruption_play_immediately() {
        let mut sched = PlaybackScheduler::new(PLAYBACK_SAMPLE_RATE);
        sched.schedule(vec![0.3; 24]);
        sched.schedule(vec![0.4; 24]);
        sched.interrupt();

        // Fresh fragment after a second of silence on the clock.
        render_seconds(&mut sched, 1.0);
        sched.schedule(vec![0.3; 24]);

        let mut out = vec![0.0f32; 24];
        sched.render(&mut out);
        assert!(out.iter().all(|&s| (s - 0.3).abs() < f32::EPSILON));
    }
}
