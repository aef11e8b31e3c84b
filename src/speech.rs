//! The two exclusive audio channels: speech, fed through a FIFO queue, and
//! short sound effects.
//!
//! Both channels are shared between whoever submits audio and the sink's
//! completion callbacks, which arrive on the sink's own thread. The state
//! lives behind a mutex; every playback carries a generation number so that
//! a late completion for something that was already stopped or replaced
//! cannot release the channel a second time. The sink is never called while
//! the lock is held.

use std::{
    collections::VecDeque,
    fmt,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use log::{debug, info, warn};

use crate::audio_sink::{AudioSink, PlaybackOutcome, SoundEffect};

/// Priority given to entries submitted without one.
pub const DEFAULT_PRIORITY: i32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechEntry {
    pub text: String,
    pub id: Option<i32>,
    pub priority: i32,
}

#[derive(Debug, Clone)]
struct Playing {
    generation: u64,
    priority: i32,
}

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<SpeechEntry>,
    playing: Option<Playing>,
    generation: u64,
    last_spoken: Option<String>,
}

/// What happened to a message handed to
/// [`SpeechQueue::enqueue_with_priority`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Queued,
    /// Queued after throwing away everything that was waiting.
    Flushed,
    /// Not queued: something is playing and the message is not more urgent
    /// than what is waiting.
    Dropped,
}

/// The speech channel. Cheap to clone; clones share the queue.
#[derive(Clone)]
pub struct SpeechQueue {
    sink: Arc<dyn AudioSink>,
    state: Arc<Mutex<QueueState>>,
}

impl fmt::Debug for SpeechQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("SpeechQueue")
            .field("pending", &state.pending.len())
            .field("playing", &state.playing.is_some())
            .finish()
    }
}

impl SpeechQueue {
    pub fn new(sink: Arc<dyn AudioSink>) -> Self {
        Self {
            sink,
            state: Arc::new(Mutex::new(QueueState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // a panicking sink callback must not take the whole channel down
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_playing(&self) -> bool {
        self.lock().playing.is_some()
    }

    /// Whether anything is waiting behind the current utterance.
    pub fn is_stacked(&self) -> bool {
        !self.lock().pending.is_empty()
    }

    pub fn pending(&self) -> Vec<String> {
        self.lock().pending.iter().map(|e| e.text.clone()).collect()
    }

    pub fn last_spoken(&self) -> Option<String> {
        self.lock().last_spoken.clone()
    }

    /// Appends `text` and starts it if the channel is free.
    pub fn enqueue(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        info!("enqueue: {text}");
        self.lock().pending.push_back(SpeechEntry {
            text: text.to_owned(),
            id: None,
            priority: DEFAULT_PRIORITY,
        });
        self.pump();
    }

    /// The freshness-first variant. A message more urgent than the head of
    /// the queue (or the utterance playing when the queue is empty) flushes
    /// the queue; otherwise it is dropped while anything is playing.
    pub fn enqueue_with_priority(&self, text: &str, id: Option<i32>, priority: i32) -> Admission {
        let admission = {
            let mut state = self.lock();
            let head = state
                .pending
                .front()
                .map(|e| e.priority)
                .or(state.playing.as_ref().map(|p| p.priority));
            let admission = match head {
                Some(head) if head < priority => {
                    state.pending.clear();
                    Admission::Flushed
                }
                _ if state.playing.is_some() => Admission::Dropped,
                _ => Admission::Queued,
            };
            if admission != Admission::Dropped && !text.is_empty() {
                state.pending.push_back(SpeechEntry {
                    text: text.to_owned(),
                    id,
                    priority,
                });
            }
            admission
        };

        match admission {
            Admission::Dropped => debug!("dropped while busy: {text}"),
            _ => info!("enqueue ({admission:?}, priority {priority}): {text}"),
        }
        self.pump();
        admission
    }

    /// Plays the head of the queue if nothing else is playing.
    pub fn pump(&self) {
        let (generation, entry) = {
            let mut state = self.lock();
            if state.playing.is_some() {
                return;
            }
            let Some(entry) = state.pending.pop_front() else {
                return;
            };
            state.generation += 1;
            state.playing = Some(Playing {
                generation: state.generation,
                priority: entry.priority,
            });
            state.last_spoken = Some(entry.text.clone());
            (state.generation, entry)
        };
        self.start(generation, &entry.text);
    }

    fn start(&self, generation: u64, text: &str) {
        let queue = self.clone();
        self.sink.speak(
            text,
            Box::new(move |outcome| queue.finished(generation, outcome)),
        );
    }

    fn finished(&self, generation: u64, outcome: PlaybackOutcome) {
        {
            let mut state = self.lock();
            match &state.playing {
                Some(playing) if playing.generation == generation => state.playing = None,
                _ => return,
            }
        }
        if outcome == PlaybackOutcome::Failed {
            warn!("speech playback failed, moving on");
        }
        self.pump();
    }

    /// Cuts off whatever is playing and says `text` right away, ahead of the
    /// queue.
    pub fn forced_speak(&self, text: &str) {
        // claim the channel first so completions fired by the stop are stale
        let generation = {
            let mut state = self.lock();
            state.generation += 1;
            state.playing = Some(Playing {
                generation: state.generation,
                priority: DEFAULT_PRIORITY,
            });
            state.last_spoken = Some(text.to_owned());
            state.generation
        };
        self.sink.stop(true);
        info!("forced: {text}");
        self.start(generation, text);
    }

    /// Says the last utterance again, unless something is playing.
    pub fn repeat_last(&self) {
        let (generation, text) = {
            let mut state = self.lock();
            if state.playing.is_some() {
                return;
            }
            let Some(text) = state.last_spoken.clone() else {
                return;
            };
            state.generation += 1;
            state.playing = Some(Playing {
                generation: state.generation,
                priority: DEFAULT_PRIORITY,
            });
            (state.generation, text)
        };
        self.start(generation, &text);
    }

    /// Stops the current utterance. What is queued stays queued until the
    /// next enqueue or pump.
    pub fn stop(&self) {
        {
            let mut state = self.lock();
            state.playing = None;
            state.generation += 1;
        }
        self.sink.stop(true);
    }

    /// Throws away everything waiting. The current utterance plays on.
    pub fn clear(&self) {
        self.lock().pending.clear();
    }
}

#[derive(Debug, Default)]
struct EffectState {
    busy: Option<u64>,
    generation: u64,
    last_started: Option<Instant>,
    interval: Duration,
}

/// The sound effect channel: one clip at a time, and none until the
/// previous clip's interval has run out.
#[derive(Clone)]
pub struct SoundEffectChannel {
    sink: Arc<dyn AudioSink>,
    state: Arc<Mutex<EffectState>>,
}

impl fmt::Debug for SoundEffectChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundEffectChannel")
            .field("busy", &self.is_busy())
            .finish()
    }
}

impl SoundEffectChannel {
    pub fn new(sink: Arc<dyn AudioSink>) -> Self {
        Self {
            sink,
            state: Arc::new(Mutex::new(EffectState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EffectState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy.is_some()
    }

    /// Plays `effect` unless a clip is still playing or the previous clip's
    /// interval has not yet passed at `now`. Returns whether it played.
    pub fn play(&self, effect: &SoundEffect, now: Instant) -> bool {
        let generation = {
            let mut state = self.lock();
            if state.busy.is_some() {
                return false;
            }
            if let Some(last) = state.last_started {
                if last + state.interval > now {
                    return false;
                }
            }
            state.interval = Duration::from_secs_f64(effect.interval.max(0.0));
            state.last_started = Some(now);
            state.generation += 1;
            state.busy = Some(state.generation);
            state.generation
        };

        let channel = self.clone();
        self.sink.play_effect(
            effect,
            Box::new(move |outcome| {
                if outcome == PlaybackOutcome::Failed {
                    warn!("sound effect playback failed");
                }
                let mut state = channel.lock();
                if state.busy == Some(generation) {
                    state.busy = None;
                }
            }),
        );
        true
    }
}
