//! Voice command interpreter: utterance → VoiceCommand
//!
//! Keywords are matched as case-insensitive substrings in fixed priority
//! order: straight, left, right, stop, search. First match wins.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::VoiceCommand;

lazy_static! {
    // Substring containment, not word boundaries: "stopping" still means stop.
    static ref KEYWORDS: Vec<(Regex, VoiceCommand)> = vec![
        (Regex::new(r"(?i)straight").unwrap(), VoiceCommand::Straight),
        (Regex::new(r"(?i)left").unwrap(), VoiceCommand::Left),
        (Regex::new(r"(?i)right").unwrap(), VoiceCommand::Right),
        (Regex::new(r"(?i)stop").unwrap(), VoiceCommand::Stop),
        (Regex::new(r"(?i)search").unwrap(), VoiceCommand::Search),
    ];
}

/// Maps finalized utterances to commands
#[derive(Debug, Default)]
pub struct VoiceCommandInterpreter;

impl VoiceCommandInterpreter {
    /// Create new interpreter
    pub fn new() -> Self {
        Self
    }

    /// First keyword match in priority order, or NONE
    pub fn interpret(&self, utterance: &str) -> VoiceCommand {
        KEYWORDS
            .iter()
            .find(|(re, _)| re.is_match(utterance))
            .map(|(_, command)| *command)
            .unwrap_or(VoiceCommand::None)
    }
}
