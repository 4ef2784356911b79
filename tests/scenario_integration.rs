//! Integration tests for scenario and config loading

use pretty_assertions::assert_eq;
use std::path::PathBuf;

use rover_arbiter::core::{
    audio_queue, PpmFrameStore, Scenario, ScriptedDevice, TickDriver, TranscriptRecognizer,
};
use rover_arbiter::types::{ArbiterConfig, LoadReason, Mode, ReasonCode, WheelSpeeds};
use rover_arbiter::MAX_SPEED;

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("rover_{}_{}.json", name, std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

const CORRIDOR: &str = r#"{
    "ticks": [
        {"utterance": "go straight"},
        {},
        {"proximity": [0, 0, 0, 0, 0, 95, 110, 0]},
        {"proximity": [0, 0, 0, 0, 0, 70, 85, 0]},
        {"proximity": [0, 0, 0, 0, 0, 40, 60, 0]},
        {}
    ]
}"#;

#[test]
fn test_corridor_run() {
    let path = temp_file("corridor", CORRIDOR);
    let scenario = Scenario::load(&path).unwrap();

    let (tx, rx) = audio_queue(4);
    let device = ScriptedDevice::new(scenario).with_audio(tx);
    let mut driver = TickDriver::new(
        device,
        TranscriptRecognizer::command_grammar(),
        PpmFrameStore::new(),
        rx,
        ArbiterConfig::default(),
    );

    let mut outputs = Vec::new();
    while let Some(output) = driver.step() {
        outputs.push(output);
    }
    assert_eq!(outputs.len(), 6);

    let modes: Vec<Mode> = outputs.iter().map(|o| o.mode).collect();
    assert_eq!(
        modes,
        vec![Mode::Follow, Mode::Follow, Mode::Avoid, Mode::Avoid, Mode::Follow, Mode::Follow]
    );

    let reasons: Vec<ReasonCode> = outputs.iter().map(|o| o.reason).collect();
    assert_eq!(
        reasons,
        vec![
            ReasonCode::R101_VOICE_STRAIGHT,
            ReasonCode::R401_FOLLOW_HOLD,
            ReasonCode::R201_AVOID_LEFT_FLANK,
            ReasonCode::R201_AVOID_LEFT_FLANK,
            ReasonCode::R202_AVOID_FALLBACK_STRAIGHT,
            ReasonCode::R401_FOLLOW_HOLD,
        ]
    );

    // motors received exactly the arbiter's output every tick
    assert_eq!(driver.device().velocity_log().len(), 12);
    assert_eq!(driver.device().velocities(), outputs[5].speeds);
    assert_eq!(driver.device().elapsed_ms(), 6 * 64);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_missing_scenario_file() {
    let result = Scenario::load("/nonexistent/rover/world.json");
    assert_eq!(result, Err(LoadReason::R601_LOAD_READ_ERROR));
}

#[test]
fn test_config_file_overrides() {
    let path = temp_file("config", r#"{"time_step_ms": 32, "search_speed": 2.5}"#);
    let config = ArbiterConfig::load(&path).unwrap();
    assert_eq!(config.time_step_ms, 32);
    assert_eq!(config.search_speed, 2.5);
    assert_eq!(config.pause_ticks(), 40);
    assert_eq!(config.settle_ticks(), 20);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_invalid_config_rejected() {
    let path = temp_file("bad_config", r#"{"time_step_ms": 0}"#);
    assert_eq!(ArbiterConfig::load(&path), Err(LoadReason::R604_LOAD_INVALID_CONFIG));
    let _ = std::fs::remove_file(&path);

    let path = temp_file("broken_config", r#"{"time_step_ms": "fast"}"#);
    assert_eq!(ArbiterConfig::load(&path), Err(LoadReason::R602_LOAD_PARSE_ERROR));
    let _ = std::fs::remove_file(&path);
}

/// Utterances outside the grammar reach the recognizer but not the wheels
#[test]
fn test_unrecognized_utterance_ignored() {
    let scenario = Scenario::from_json(r#"{"ticks": [{"utterance": "right"}, {"utterance": "hello robot"}]}"#).unwrap();
    let (tx, rx) = audio_queue(4);
    let device = ScriptedDevice::new(scenario).with_audio(tx);
    let mut driver = TickDriver::new(
        device,
        TranscriptRecognizer::command_grammar(),
        PpmFrameStore::new(),
        rx,
        ArbiterConfig::default(),
    );

    let first = driver.step().unwrap();
    let second = driver.step().unwrap();
    assert_eq!(second.command, None);
    assert_eq!(second.speeds, first.speeds);
    let cruise = 0.5 * MAX_SPEED;
    assert_eq!(second.speeds, WheelSpeeds { left: cruise, right: -cruise });
}
