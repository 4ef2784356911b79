//! Speech collaborator: audio queue and recognizer seam
//!
//! Capture runs on its own thread or task and hands raw chunks to the tick
//! loop over a bounded single-producer/single-consumer channel. The tick loop
//! dequeues at most one chunk per tick without blocking.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::COMMAND_GRAMMAR;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"[a-z']+").unwrap();
}

/// Raw audio bytes as delivered by the capture context
pub type AudioChunk = Vec<u8>;

/// Create a bounded audio queue
pub fn audio_queue(capacity: usize) -> (AudioSender, AudioReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (AudioSender { tx }, AudioReceiver { rx })
}

/// Producer half, owned by the capture context
#[derive(Debug, Clone)]
pub struct AudioSender {
    tx: mpsc::Sender<AudioChunk>,
}

impl AudioSender {
    /// Non-blocking enqueue; drops the chunk when the queue is full
    pub fn try_push(&self, chunk: AudioChunk) -> bool {
        match self.tx.try_send(chunk) {
            Ok(()) => true,
            Err(TrySendError::Full(chunk)) => {
                tracing::warn!(bytes = chunk.len(), "audio queue full, dropping chunk");
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("audio queue closed");
                false
            }
        }
    }

    /// Blocking enqueue for capture threads. Must not be called from async code.
    pub fn blocking_push(&self, chunk: AudioChunk) -> bool {
        self.tx.blocking_send(chunk).is_ok()
    }

    /// Enqueue a transcript as one newline-terminated chunk. Embedded line
    /// breaks are folded into spaces so the text stays a single utterance.
    pub fn send_utterance(&self, text: &str) -> bool {
        let line = text.split_whitespace().collect::<Vec<_>>().join(" ");
        self.try_push(format!("{}\n", line).into_bytes())
    }
}

/// Consumer half, owned by the tick loop
#[derive(Debug)]
pub struct AudioReceiver {
    rx: mpsc::Receiver<AudioChunk>,
}

impl AudioReceiver {
    /// Next queued chunk, if any
    pub fn try_dequeue(&mut self) -> Option<AudioChunk> {
        self.rx.try_recv().ok()
    }
}

/// Result of feeding one chunk to a recognizer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recognition {
    /// An utterance boundary was reached
    pub is_final: bool,
    /// Finalized text; None when partial or empty
    pub text: Option<String>,
}

impl Recognition {
    pub fn partial() -> Self {
        Self::default()
    }

    /// Decode a `{"text": "..."}` final result
    pub fn from_result_json(json: &str) -> Self {
        #[derive(Deserialize)]
        struct FinalResult {
            #[serde(default)]
            text: String,
        }

        let text = serde_json::from_str::<FinalResult>(json)
            .map(|r| r.text.trim().to_lowercase())
            .unwrap_or_default();
        Self {
            is_final: true,
            text: (!text.is_empty()).then_some(text),
        }
    }
}

/// Speech-to-text engine fed one chunk at a time
pub trait SpeechRecognizer {
    fn push_audio(&mut self, chunk: &[u8]) -> Recognition;
}

#[derive(Debug, Serialize)]
struct ResultJson<'a> {
    text: &'a str,
}

/// Recognizer over transcript streams: chunks are UTF-8 text fragments and a
/// newline ends an utterance. With a grammar, words outside it are dropped,
/// like a restricted-vocabulary model.
#[derive(Debug, Default)]
pub struct TranscriptRecognizer {
    buffer: String,
    finalized: Option<String>,
    grammar: Option<Vec<String>>,
}

impl TranscriptRecognizer {
    /// Open vocabulary
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricted to `words`
    pub fn with_grammar<S: AsRef<str>>(words: &[S]) -> Self {
        Self {
            grammar: Some(words.iter().map(|w| w.as_ref().to_lowercase()).collect()),
            ..Self::default()
        }
    }

    /// Restricted to the robot's command words
    pub fn command_grammar() -> Self {
        Self::with_grammar(&COMMAND_GRAMMAR)
    }

    /// Buffer a chunk; true once an utterance is complete.
    ///
    /// Only the newest complete line is finalized. Older complete lines in
    /// the same backlog are discarded rather than replayed on later calls.
    pub fn accept_waveform(&mut self, chunk: &[u8]) -> bool {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));
        let Some(end) = self.buffer.rfind('\n') else {
            return false;
        };
        let complete: String = self.buffer.drain(..=end).collect();
        let line = complete
            .trim_end_matches('\n')
            .rsplit('\n')
            .next()
            .unwrap_or_default();
        self.finalized = Some(self.normalize(line));
        true
    }

    /// Final result of the last completed utterance as JSON
    pub fn result(&mut self) -> String {
        let text = self.finalized.take().unwrap_or_default();
        serde_json::to_string(&ResultJson { text: &text })
            .unwrap_or_else(|_| String::from(r#"{"text": ""}"#))
    }

    fn normalize(&self, line: &str) -> String {
        let lower = line.to_lowercase();
        let words = WORD.find_iter(&lower).map(|m| m.as_str());
        let kept: Vec<&str> = match &self.grammar {
            Some(grammar) => words.filter(|w| grammar.iter().any(|g| g == w)).collect(),
            None => words.collect(),
        };
        kept.join(" ")
    }
}

impl SpeechRecognizer for TranscriptRecognizer {
    fn push_audio(&mut self, chunk: &[u8]) -> Recognition {
        if self.accept_waveform(chunk) {
            Recognition::from_result_json(&self.result())
        } else {
            Recognition::partial()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragments_finalize_on_newline() {
        let mut recognizer = TranscriptRecognizer::new();
        assert_eq!(recognizer.push_audio(b"please go "), Recognition::partial());
        let result = recognizer.push_audio(b"Straight\n");
        assert!(result.is_final);
        assert_eq!(result.text.as_deref(), Some("please go straight"));
    }

    #[test]
    fn test_multi_line_chunk_keeps_newest_line() {
        let mut recognizer = TranscriptRecognizer::new();
        let first = recognizer.push_audio(b"left\nstop\n");
        assert_eq!(first.text.as_deref(), Some("stop"));

        // no backlog left behind: each later utterance is its own
        let second = recognizer.push_audio(b"straight\n");
        assert_eq!(second.text.as_deref(), Some("straight"));
        let third = recognizer.push_audio(b"search\n");
        assert_eq!(third.text.as_deref(), Some("search"));
    }

    #[test]
    fn test_partial_tail_survives_finalize() {
        let mut recognizer = TranscriptRecognizer::new();
        let result = recognizer.push_audio(b"left\nturn ");
        assert_eq!(result.text.as_deref(), Some("left"));
        let result = recognizer.push_audio(b"right\n");
        assert_eq!(result.text.as_deref(), Some("turn right"));
    }

    #[test]
    fn test_send_utterance_folds_line_breaks() {
        let (tx, mut rx) = audio_queue(2);
        assert!(tx.send_utterance("left\nstop\r\n"));
        assert_eq!(rx.try_dequeue(), Some(b"left stop\n".to_vec()));
    }

    #[test]
    fn test_grammar_filters_words() {
        let mut recognizer = TranscriptRecognizer::command_grammar();
        let result = recognizer.push_audio(b"could you search for colors\n");
        assert_eq!(result.text.as_deref(), Some("search"));
    }

    #[test]
    fn test_empty_final_has_no_text() {
        let mut recognizer = TranscriptRecognizer::command_grammar();
        let result = recognizer.push_audio(b"hello there\n");
        assert!(result.is_final);
        assert_eq!(result.text, None);
    }

    #[test]
    fn test_result_json_decoding() {
        assert_eq!(
            Recognition::from_result_json(r#"{"text": " Turn LEFT "}"#).text.as_deref(),
            Some("turn left")
        );
        assert_eq!(Recognition::from_result_json("{}").text, None);
        assert_eq!(Recognition::from_result_json("garbage").text, None);
    }

    #[test]
    fn test_queue_is_non_blocking() {
        let (tx, mut rx) = audio_queue(1);
        assert!(rx.try_dequeue().is_none());
        assert!(tx.send_utterance("stop"));
        // full: dropped, not blocked
        assert!(!tx.send_utterance("left"));
        assert_eq!(rx.try_dequeue(), Some(b"stop\n".to_vec()));
        assert!(rx.try_dequeue().is_none());
    }
}
