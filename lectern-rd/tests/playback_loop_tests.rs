//! Playback loop integration tests
//!
//! Drives a ReaderSession end to end with a scripted synthesizer stand-in,
//! covering the pause/resume/stop contract, the link-detection suspension
//! protocol, synthesis-failure recovery, and question auto-pause.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::TempDir;
use tokio::sync::broadcast;
use tokio::time::timeout;

use lectern_common::events::{PlaybackState, ReaderEvent};
use lectern_rd::ingest::DocumentStore;
use lectern_rd::playback::ReaderSession;
use lectern_rd::remote::SpeechSynthesizer;
use lectern_rd::state::SharedState;

/// Synthesizer stand-in that replays a script of responses.
/// An exhausted script yields a small fixed chunk (about 1ms of pacing).
struct ScriptedSynth {
    script: Mutex<VecDeque<Option<Bytes>>>,
    calls: AtomicUsize,
}

impl ScriptedSynth {
    fn new(script: Vec<Option<Bytes>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn always_ok() -> Arc<Self> {
        Self::new(Vec::new())
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for ScriptedSynth {
    async fn synthesize(&self, _sentence: &str) -> Option<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(response) => response,
            None => Some(Bytes::from_static(&[0u8; 18])),
        }
    }
}

struct Harness {
    _dir: TempDir,
    session: Arc<ReaderSession>,
    events: broadcast::Receiver<ReaderEvent>,
}

fn harness(document: &str, synth: Arc<ScriptedSynth>) -> Harness {
    let dir = TempDir::new().unwrap();
    let documents = DocumentStore::new(dir.path());
    documents.store(document.as_bytes()).unwrap();

    let state = Arc::new(SharedState::new());
    let events = state.subscribe_events();
    let session = Arc::new(ReaderSession::new(state, synth, documents, 1.0));

    Harness {
        _dir: dir,
        session,
        events,
    }
}

async fn next_event(rx: &mut broadcast::Receiver<ReaderEvent>) -> ReaderEvent {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

fn assert_status(event: &ReaderEvent, expected: PlaybackState) {
    match event {
        ReaderEvent::StatusChanged { state, .. } => assert_eq!(*state, expected),
        other => panic!("expected StatusChanged({:?}), got {:?}", expected, other),
    }
}

#[tokio::test]
async fn test_full_read_of_plain_document() {
    let synth = ScriptedSynth::always_ok();
    let mut h = harness("First sentence. Second sentence.", Arc::clone(&synth));

    h.session.start().await;

    assert_status(&next_event(&mut h.events).await, PlaybackState::Playing);
    assert!(matches!(
        next_event(&mut h.events).await,
        ReaderEvent::AudioChunk { .. }
    ));
    assert!(matches!(
        next_event(&mut h.events).await,
        ReaderEvent::AudioChunk { .. }
    ));
    assert_status(&next_event(&mut h.events).await, PlaybackState::Stopped);

    assert_eq!(synth.call_count(), 2);
    assert_eq!(h.session.current_index(), 2);
}

#[tokio::test]
async fn test_empty_document_stops_immediately() {
    let synth = ScriptedSynth::always_ok();
    let dir = TempDir::new().unwrap();
    let state = Arc::new(SharedState::new());
    let mut events = state.subscribe_events();
    // No stored document at all: extraction recovers with empty text
    let session = Arc::new(ReaderSession::new(
        state,
        synth.clone(),
        DocumentStore::new(dir.path()),
        1.0,
    ));

    session.start().await;

    assert_status(&next_event(&mut events).await, PlaybackState::Playing);
    assert_status(&next_event(&mut events).await, PlaybackState::Stopped);
    assert_eq!(synth.call_count(), 0);
}

#[tokio::test]
async fn test_stop_then_resume_reports_stopped_never_playing() {
    let synth = ScriptedSynth::always_ok();
    let mut h = harness("Only sentence.", Arc::clone(&synth));

    h.session.start().await;

    // Drain the full read: playing, one chunk, stopped
    assert_status(&next_event(&mut h.events).await, PlaybackState::Playing);
    assert!(matches!(
        next_event(&mut h.events).await,
        ReaderEvent::AudioChunk { .. }
    ));
    assert_status(&next_event(&mut h.events).await, PlaybackState::Stopped);

    h.session.stop().await;
    h.session.resume().await;

    // Resume past the end reports stopped and emits no further audio
    assert_status(&next_event(&mut h.events).await, PlaybackState::Stopped);
    assert_eq!(synth.call_count(), 1);
    assert!(h.events.try_recv().is_err());
}

#[tokio::test]
async fn test_link_suspension_with_url_detected_pauses_without_audio() {
    let synth = ScriptedSynth::always_ok();
    let mut h = harness("Visit http://example.com/page now.", Arc::clone(&synth));

    h.session.start().await;

    assert_status(&next_event(&mut h.events).await, PlaybackState::Playing);
    match next_event(&mut h.events).await {
        ReaderEvent::RequestLinkDetection { sentence, .. } => {
            assert!(sentence.contains("http://example.com/page"));
        }
        other => panic!("expected RequestLinkDetection, got {:?}", other),
    }

    // Single-flight: nothing synthesized while the suspension is pending
    assert_eq!(synth.call_count(), 0);

    // Client handled the link: do not speak, pause instead
    h.session.resolve_link_detection(true);

    assert_status(&next_event(&mut h.events).await, PlaybackState::Paused);
    assert_eq!(synth.call_count(), 0);
    assert_eq!(h.session.current_index(), 0);
    assert!(h.session.is_paused());
}

#[tokio::test]
async fn test_link_suspension_with_no_url_detected_proceeds() {
    let synth = ScriptedSynth::always_ok();
    let mut h = harness("Visit http://example.com/page now.", Arc::clone(&synth));

    h.session.start().await;

    assert_status(&next_event(&mut h.events).await, PlaybackState::Playing);
    assert!(matches!(
        next_event(&mut h.events).await,
        ReaderEvent::RequestLinkDetection { .. }
    ));
    assert_eq!(synth.call_count(), 0);

    // Client saw nothing actionable: speak the sentence as normal
    h.session.resolve_link_detection(false);

    assert!(matches!(
        next_event(&mut h.events).await,
        ReaderEvent::AudioChunk { .. }
    ));
    assert_status(&next_event(&mut h.events).await, PlaybackState::Stopped);
    assert_eq!(synth.call_count(), 1);
    assert_eq!(h.session.current_index(), 1);
}

#[tokio::test]
async fn test_stop_during_link_suspension_terminates() {
    let synth = ScriptedSynth::always_ok();
    let mut h = harness("See http://example.com/x for more.", Arc::clone(&synth));

    h.session.start().await;

    assert_status(&next_event(&mut h.events).await, PlaybackState::Playing);
    assert!(matches!(
        next_event(&mut h.events).await,
        ReaderEvent::RequestLinkDetection { .. }
    ));

    // stop() drops the pending token; the waiting loop must wake and finish
    h.session.stop().await;

    assert_status(&next_event(&mut h.events).await, PlaybackState::Stopped);
    assert_eq!(synth.call_count(), 0);
}

#[tokio::test]
async fn test_synthesis_failure_skips_sentence_and_continues() {
    let synth = ScriptedSynth::new(vec![
        Some(Bytes::from_static(&[0u8; 18])),
        None, // sentence 2 fails
        Some(Bytes::from_static(&[0u8; 18])),
    ]);
    let mut h = harness("One. Two. Three.", Arc::clone(&synth));

    h.session.start().await;

    assert_status(&next_event(&mut h.events).await, PlaybackState::Playing);

    let mut audio_chunks = 0;
    loop {
        match next_event(&mut h.events).await {
            ReaderEvent::AudioChunk { .. } => audio_chunks += 1,
            ReaderEvent::StatusChanged { state, .. } => {
                assert_eq!(state, PlaybackState::Stopped);
                break;
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    // Exactly sentences 1 and 3 produced audio; the index still reached 3
    assert_eq!(audio_chunks, 2);
    assert_eq!(synth.call_count(), 3);
    assert_eq!(h.session.current_index(), 3);
}

#[tokio::test]
async fn test_question_pauses_and_resume_finishes() {
    let synth = ScriptedSynth::always_ok();
    let mut h = harness("Hello world. What is 2+2? Goodbye.", Arc::clone(&synth));

    h.session.start().await;

    assert_status(&next_event(&mut h.events).await, PlaybackState::Playing);

    // "Hello world." speaks with no pause after it
    assert!(matches!(
        next_event(&mut h.events).await,
        ReaderEvent::AudioChunk { .. }
    ));

    // "What is 2+2?" speaks, then triggers the question auto-pause
    assert!(matches!(
        next_event(&mut h.events).await,
        ReaderEvent::AudioChunk { .. }
    ));
    match next_event(&mut h.events).await {
        ReaderEvent::QuestionResult { is_question, .. } => assert!(is_question),
        other => panic!("expected QuestionResult, got {:?}", other),
    }
    assert_status(&next_event(&mut h.events).await, PlaybackState::Paused);
    assert_eq!(h.session.current_index(), 2);
    assert!(h.session.is_paused());

    // Resume speaks "Goodbye." and terminates
    h.session.resume().await;

    assert!(matches!(
        next_event(&mut h.events).await,
        ReaderEvent::AudioChunk { .. }
    ));
    assert_status(&next_event(&mut h.events).await, PlaybackState::Stopped);
    assert_eq!(synth.call_count(), 3);
    assert_eq!(h.session.current_index(), 3);
}

#[tokio::test]
async fn test_invalid_speech_speed_falls_back_to_real_time() {
    // A zero speed would make the pacing divisor unusable; construction
    // must recover so playback still runs and terminates
    let synth = ScriptedSynth::always_ok();
    let dir = TempDir::new().unwrap();
    let documents = DocumentStore::new(dir.path());
    documents.store(b"Only sentence.").unwrap();

    let state = Arc::new(SharedState::new());
    let mut events = state.subscribe_events();
    let session = Arc::new(ReaderSession::new(state, synth, documents, 0.0));

    session.start().await;

    assert_status(&next_event(&mut events).await, PlaybackState::Playing);
    assert!(matches!(
        next_event(&mut events).await,
        ReaderEvent::AudioChunk { .. }
    ));
    assert_status(&next_event(&mut events).await, PlaybackState::Stopped);
    assert_eq!(session.current_index(), 1);
}

#[tokio::test]
async fn test_pause_exits_at_sentence_boundary() {
    // First chunk paces for ~1s, so the pause flag set right after start()
    // is guaranteed to be observed no later than the second iteration top
    let synth = ScriptedSynth::new(vec![Some(Bytes::from(vec![0u8; 18000]))]);
    let mut h = harness("A one. B two. C three.", Arc::clone(&synth));

    h.session.start().await;
    h.session.pause();

    assert_status(&next_event(&mut h.events).await, PlaybackState::Playing);

    // Depending on when the flag is observed, zero or one sentence is
    // spoken; the loop never stops mid-sentence and never passes a second
    // boundary before exiting with a paused status
    let mut audio_chunks = 0;
    loop {
        match next_event(&mut h.events).await {
            ReaderEvent::AudioChunk { .. } => audio_chunks += 1,
            ReaderEvent::StatusChanged { state, .. } => {
                assert_eq!(state, PlaybackState::Paused);
                break;
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
    assert!(audio_chunks <= 1);
    assert!(h.session.is_paused());
    assert_eq!(h.session.current_index(), audio_chunks);
    assert!(h.events.try_recv().is_err());
}
