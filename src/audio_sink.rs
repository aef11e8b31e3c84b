//! The boundary to whatever actually makes noise. Speech synthesis and the
//! effect player live outside this crate; they only have to implement
//! [`AudioSink`] and call the completion they are handed exactly once.

use std::{thread, time::Duration};

use log::info;
use serde::{Deserialize, Serialize};

/// How a playback ended. Both count as done for the queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Finished,
    Failed,
}

/// Called by the sink when a playback is over, from any thread.
pub type Completion = Box<dyn FnOnce(PlaybackOutcome) + Send>;

/// A short non-speech clip with its playback parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundEffect {
    pub name: String,
    pub rate: f64,
    /// -1 is hard left, 1 is hard right.
    pub pan: f64,
    /// Seconds to keep the channel closed after this clip starts.
    pub interval: f64,
}

impl SoundEffect {
    pub fn new(name: &str, rate: f64, pan: f64, interval: f64) -> Self {
        Self {
            name: name.to_owned(),
            rate,
            pan,
            interval,
        }
    }
}

pub trait AudioSink: Send + Sync {
    /// Starts speaking `text`. Must not block until the end of the utterance.
    fn speak(&self, text: &str, done: Completion);

    /// Stops the current utterance. A stopped utterance may or may not still
    /// call its completion.
    fn stop(&self, immediate: bool);

    fn play_effect(&self, effect: &SoundEffect, done: Completion);
}

/// A sink that writes everything to the log and pretends to take the time
/// a speaker would.
#[derive(Debug, Clone)]
pub struct LogSink {
    per_char: Duration,
    effect: Duration,
}

impl Default for LogSink {
    fn default() -> Self {
        Self {
            per_char: Duration::from_millis(40),
            effect: Duration::from_millis(150),
        }
    }
}

impl LogSink {
    pub fn new(per_char: Duration, effect: Duration) -> Self {
        Self { per_char, effect }
    }

    /// A sink that finishes everything right away, handy for batch replays.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    fn finish_after(duration: Duration, done: Completion) {
        if duration.is_zero() {
            done(PlaybackOutcome::Finished);
            return;
        }
        thread::spawn(move || {
            spin_sleep::sleep(duration);
            done(PlaybackOutcome::Finished);
        });
    }
}

impl AudioSink for LogSink {
    fn speak(&self, text: &str, done: Completion) {
        info!("speak: {text}");
        let chars = text.chars().count() as u32;
        Self::finish_after(self.per_char * chars, done);
    }

    fn stop(&self, immediate: bool) {
        info!("stop speaking (immediate: {immediate})");
    }

    fn play_effect(&self, effect: &SoundEffect, done: Completion) {
        info!(
            "effect: {} rate {:.2} pan {:.2} interval {:.2}",
            effect.name, effect.rate, effect.pan, effect.interval
        );
        Self::finish_after(self.effect, done);
    }
}

#[cfg(test)]
pub(crate) mod recording {
    //! A sink that remembers what it was asked to do and lets the test decide
    //! when each playback ends.

    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Speak(String),
        Stop(bool),
        Effect(SoundEffect),
    }

    #[derive(Default)]
    struct Inner {
        calls: Vec<Call>,
        pending: Vec<Completion>,
        /// `stop` fires every outstanding completion before returning.
        cancel_on_stop: bool,
    }

    #[derive(Clone, Default)]
    pub struct RecordingSink {
        inner: Arc<Mutex<Inner>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// A sink whose `stop` cancels outstanding playbacks synchronously,
        /// calling their completions with `Failed`.
        pub fn cancelling() -> Self {
            let sink = Self::default();
            sink.inner.lock().unwrap().cancel_on_stop = true;
            sink
        }

        pub fn calls(&self) -> Vec<Call> {
            self.inner.lock().unwrap().calls.clone()
        }

        pub fn spoken(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::Speak(text) => Some(text),
                    _ => None,
                })
                .collect()
        }

        pub fn pending(&self) -> usize {
            self.inner.lock().unwrap().pending.len()
        }

        /// Completes the oldest outstanding playback. The lock is released
        /// before the completion runs, since it usually starts the next one.
        pub fn complete_next(&self, outcome: PlaybackOutcome) -> bool {
            let done = {
                let mut inner = self.inner.lock().unwrap();
                if inner.pending.is_empty() {
                    return false;
                }
                inner.pending.remove(0)
            };
            done(outcome);
            true
        }
    }

    impl AudioSink for RecordingSink {
        fn speak(&self, text: &str, done: Completion) {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(Call::Speak(text.to_owned()));
            inner.pending.push(done);
        }

        fn stop(&self, immediate: bool) {
            let cancelled: Vec<Completion> = {
                let mut inner = self.inner.lock().unwrap();
                inner.calls.push(Call::Stop(immediate));
                if inner.cancel_on_stop {
                    inner.pending.drain(..).collect()
                } else {
                    Vec::new()
                }
            };
            for done in cancelled {
                done(PlaybackOutcome::Failed);
            }
        }

        fn play_effect(&self, effect: &SoundEffect, done: Completion) {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push(Call::Effect(effect.clone()));
            inner.pending.push(done);
        }
    }
}
