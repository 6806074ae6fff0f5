//! Reader session: the playback state machine
//!
//! One `ReaderSession` exists per active document. It owns the sentence
//! sequence and the playback cursor, and runs at most one playback loop
//! task at a time. Transport handlers mutate playback state only through
//! the session's own methods (pause/resume/stop/link resolution); the loop
//! observes those changes cooperatively at iteration boundaries and at the
//! link-detection suspension point.
//!
//! State machine: Idle -> Playing -> {Paused, Stopped}; Paused -> Playing
//! via resume; any state -> Stopped via stop.

use crate::error::Result;
use crate::ingest::DocumentStore;
use crate::remote::SpeechSynthesizer;
use crate::state::SharedState;
use crate::text::{links, question, segment};
use lectern_common::events::{PlaybackState, ReaderEvent};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{oneshot, RwLock};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Approximate encoded-audio data rate used for pacing, in bytes per second.
/// Dividing chunk length by this yields a sleep close to the chunk's real
/// playback duration without decoding the audio.
const PACING_BYTES_PER_SECOND: f32 = 18000.0;

/// Outcome of the link-detection suspension wait
enum LinkDecision {
    /// Client saw no problem; speak the sentence
    Proceed,
    /// Client took over the link; pause without speaking
    Halt,
    /// stop() dropped the pending token while we waited
    Stopped,
}

/// Per-document reader session
pub struct ReaderSession {
    /// Session identity, for log correlation
    id: Uuid,
    state: Arc<SharedState>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    documents: DocumentStore,

    /// Sentence sequence; written only by start(), read by the loop
    sentences: RwLock<Vec<String>>,
    /// Current sentence index; index == sentences.len() is terminal
    index: AtomicUsize,
    /// Pause flag, observed at the top of each loop iteration
    paused: AtomicBool,
    /// Guard ensuring at most one loop task runs at a time
    loop_active: AtomicBool,
    /// Outstanding link-detection suspension (at most one).
    /// Resolving takes the sender out, so a second resolution is a no-op;
    /// stop() takes and drops it, which wakes the waiting loop.
    pending_decision: Mutex<Option<oneshot::Sender<bool>>>,

    speech_speed: f32,
}

impl ReaderSession {
    pub fn new(
        state: Arc<SharedState>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        documents: DocumentStore,
        speech_speed: f32,
    ) -> Self {
        // A non-positive or non-finite speed would make the pacing divisor
        // unusable; fall back to real-time
        let speech_speed = if speech_speed.is_finite() && speech_speed > 0.0 {
            speech_speed
        } else {
            warn!(speech_speed, "Invalid speech speed, using 1.0");
            1.0
        };
        Self {
            id: Uuid::new_v4(),
            state,
            synthesizer,
            documents,
            sentences: RwLock::new(Vec::new()),
            index: AtomicUsize::new(0),
            paused: AtomicBool::new(false),
            loop_active: AtomicBool::new(false),
            pending_decision: Mutex::new(None),
            speech_speed,
        }
    }

    /// Number of sentences in the current sequence
    pub async fn sentence_count(&self) -> usize {
        self.sentences.read().await.len()
    }

    /// Current sentence index
    pub fn current_index(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }

    /// Whether the paused flag is set
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Start reading: extract the document text (destructive, one-shot),
    /// segment it, reset the cursor, and launch the playback loop.
    ///
    /// An unreadable document yields an empty sequence; the loop then
    /// reports "stopped" immediately.
    pub async fn start(self: &Arc<Self>) {
        let text = self.documents.extract_text();
        let sentences = segment(&text);
        info!(session = %self.id, sentences = sentences.len(), "Starting playback");

        *self.sentences.write().await = sentences;
        self.index.store(0, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);

        self.emit_status(PlaybackState::Playing);
        self.spawn_loop();
    }

    /// Set the pause flag. The loop observes it at the top of the next
    /// sentence iteration, never mid-sentence. Idempotent.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Clear the pause flag and re-enter the loop from the current index.
    /// After stop() the index is terminal, so resume only reports "stopped".
    pub async fn resume(self: &Arc<Self>) {
        self.paused.store(false, Ordering::SeqCst);

        let len = self.sentences.read().await.len();
        if self.index.load(Ordering::SeqCst) < len {
            self.spawn_loop();
        } else {
            self.emit_status(PlaybackState::Stopped);
        }
    }

    /// Force termination: pause, jump the cursor to the end, and drop any
    /// outstanding suspension token so a waiting loop wakes up. Cooperative;
    /// an in-flight synthesis call is not aborted.
    pub async fn stop(&self) {
        self.paused.store(true, Ordering::SeqCst);
        let len = self.sentences.read().await.len();
        self.index.store(len, Ordering::SeqCst);

        // Dropping the sender resolves the suspension wait with "stopped"
        self.pending_decision.lock().unwrap().take();
        info!("Playback stopped");
    }

    /// Resolve the outstanding link-detection suspension.
    ///
    /// `url_detected == true` means the client took over the link, so the
    /// loop must not speak the sentence (resume = !url_detected). The token
    /// is consumed exactly once; late or duplicate results are no-ops.
    pub fn resolve_link_detection(&self, url_detected: bool) {
        let sender = self.pending_decision.lock().unwrap().take();
        match sender {
            Some(sender) => {
                // Receiver may be gone if the loop already exited; fine
                let _ = sender.send(!url_detected);
            }
            None => {
                warn!("Link detection result received with no pending suspension");
            }
        }
    }

    /// Launch the playback loop task unless one is already running
    fn spawn_loop(self: &Arc<Self>) {
        if self
            .loop_active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Playback loop already running");
            return;
        }

        let session = Arc::clone(self);
        tokio::spawn(async move {
            // Failures terminate the loop but never the process, and the
            // guard-release bookkeeping below still runs
            if let Err(e) = session.run_loop().await {
                error!("Playback loop error: {}", e);
            }
            session.finish_loop_run().await;
        });
    }

    /// Release the loop guard, report terminal state, and catch a resume()
    /// that arrived while the guard was still held (such a resume clears
    /// the pause flag but its spawn is refused, so restart here).
    async fn finish_loop_run(self: &Arc<Self>) {
        self.loop_active.store(false, Ordering::SeqCst);

        let len = self.sentences.read().await.len();
        if self.index.load(Ordering::SeqCst) >= len {
            self.emit_status(PlaybackState::Stopped);
        } else if !self.paused.load(Ordering::SeqCst) {
            self.spawn_loop();
        }
    }

    /// Per-sentence pipeline, in strictly increasing index order
    async fn run_loop(&self) -> Result<()> {
        loop {
            let (index, sentence) = {
                let sentences = self.sentences.read().await;
                let index = self.index.load(Ordering::SeqCst);
                if index >= sentences.len() {
                    break;
                }
                (index, sentences[index].clone())
            };

            if self.paused.load(Ordering::SeqCst) {
                self.emit_status(PlaybackState::Paused);
                break;
            }

            // Link gate: suspend before speaking a sentence with a URL
            if links::contains_link(&sentence) {
                match self.await_link_decision(&sentence).await {
                    LinkDecision::Proceed => {}
                    LinkDecision::Halt => {
                        self.paused.store(true, Ordering::SeqCst);
                        self.emit_status(PlaybackState::Paused);
                        break;
                    }
                    LinkDecision::Stopped => break,
                }
            }

            match self.synthesizer.synthesize(&sentence).await {
                Some(audio) => {
                    let pacing_secs =
                        audio.len() as f32 / (PACING_BYTES_PER_SECOND * self.speech_speed);
                    self.state.broadcast_event(ReaderEvent::AudioChunk {
                        data: audio.to_vec(),
                        timestamp: chrono::Utc::now(),
                    });
                    // Approximate real-time playback without decoding
                    tokio::time::sleep(std::time::Duration::from_secs_f32(pacing_secs)).await;
                }
                None => {
                    // Soft failure: skip emission and pacing, still advance
                    // and still run the question gate below
                    warn!(index, "Synthesis failed, skipping sentence");
                }
            }

            // Advance unless stop() already jumped the cursor to the end
            let _ = self.index.compare_exchange(
                index,
                index + 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            );

            // Question gate: auto-pause after a spoken question
            if question::is_question(&sentence) {
                self.state.broadcast_event(ReaderEvent::QuestionResult {
                    is_question: true,
                    timestamp: chrono::Utc::now(),
                });
                self.paused.store(true, Ordering::SeqCst);
                self.emit_status(PlaybackState::Paused);
                break;
            }
        }

        Ok(())
    }

    /// Block on the link-detection rendezvous.
    ///
    /// Exactly one token is outstanding while we wait; the HTTP handler
    /// resolves it and stop() cancels it by dropping the sender.
    async fn await_link_decision(&self, sentence: &str) -> LinkDecision {
        let (tx, rx) = oneshot::channel();
        *self.pending_decision.lock().unwrap() = Some(tx);

        // stop() may have emptied the slot between the loop's bounds check
        // and the park above, leaving this sender orphaned. Its index jump
        // is visible by now, so re-check before committing to the wait.
        let len = self.sentences.read().await.len();
        if self.index.load(Ordering::SeqCst) >= len {
            self.pending_decision.lock().unwrap().take();
            return LinkDecision::Stopped;
        }

        self.state.broadcast_event(ReaderEvent::RequestLinkDetection {
            sentence: sentence.to_string(),
            timestamp: chrono::Utc::now(),
        });
        debug!("Awaiting link detection result");

        match rx.await {
            Ok(true) => LinkDecision::Proceed,
            Ok(false) => LinkDecision::Halt,
            Err(_) => LinkDecision::Stopped,
        }
    }

    fn emit_status(&self, state: PlaybackState) {
        self.state.broadcast_event(ReaderEvent::StatusChanged {
            state,
            timestamp: chrono::Utc::now(),
        });
    }
}
