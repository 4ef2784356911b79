//! Tick driver: one pass of sensors → arbiter → motors per simulation step

use chrono::Utc;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::core::{
    default_snapshot_dir, frame_path, AudioReceiver, BehaviorArbiter, ConsoleReporter,
    DeviceLayer, FrameStore, MotorCommandSink, SpeechRecognizer, VoiceCommandInterpreter,
};
use crate::types::{
    ArbiterConfig, CameraFrame, ColorVerdict, FindEvent, SensorSnapshot, TickOutput, VoiceCommand,
};
use crate::FIND_LOG_CAPACITY;

/// Owns the collaborators and the arbiter for the lifetime of the simulation
pub struct TickDriver<D, R, S> {
    device: D,
    recognizer: R,
    store: S,
    audio: AudioReceiver,
    interpreter: VoiceCommandInterpreter,
    arbiter: BehaviorArbiter,
    sink: MotorCommandSink,
    reporter: ConsoleReporter,
    snapshot_dir: PathBuf,
    finds: VecDeque<FindEvent>,
    find_capacity: usize,
}

impl<D, R, S> TickDriver<D, R, S>
where
    D: DeviceLayer,
    R: SpeechRecognizer,
    S: FrameStore,
{
    pub fn new(device: D, recognizer: R, store: S, audio: AudioReceiver, config: ArbiterConfig) -> Self {
        Self {
            device,
            recognizer,
            store,
            audio,
            interpreter: VoiceCommandInterpreter::new(),
            arbiter: BehaviorArbiter::new(config),
            sink: MotorCommandSink::new(),
            reporter: ConsoleReporter::silent(),
            snapshot_dir: default_snapshot_dir(),
            finds: VecDeque::new(),
            find_capacity: FIND_LOG_CAPACITY,
        }
    }

    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = dir.into();
        self
    }

    /// Keep at most `capacity` find events (at least one)
    pub fn with_find_capacity(mut self, capacity: usize) -> Self {
        self.find_capacity = capacity.max(1);
        self
    }

    pub fn with_reporter(mut self, reporter: ConsoleReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Run one tick. None once the simulator has terminated.
    pub fn step(&mut self) -> Option<TickOutput> {
        if !self.device.step(self.arbiter.config().time_step_ms) {
            return None;
        }

        let snapshot = SensorSnapshot::new(
            self.device.read_proximity(),
            self.device.read_camera_frame(),
        );

        let command = self.poll_voice();
        let output = self.arbiter.tick(&snapshot, command);

        if let (Some(color), Some(frame)) = (output.found, snapshot.frame.as_ref()) {
            self.persist_find(color, frame, output.tick);
        }

        self.sink.apply(&mut self.device, output.speeds);
        Some(output)
    }

    /// Run until termination or `limit` ticks; returns ticks run
    pub fn run(&mut self, limit: Option<u64>) -> u64 {
        let mut ticks = 0;
        while limit.map_or(true, |l| ticks < l) {
            if self.step().is_none() {
                break;
            }
            ticks += 1;
        }
        ticks
    }

    /// At most one chunk per tick; only finalized, non-empty text is interpreted
    fn poll_voice(&mut self) -> Option<VoiceCommand> {
        let chunk = self.audio.try_dequeue()?;
        let recognition = self.recognizer.push_audio(&chunk);
        if !recognition.is_final {
            return None;
        }
        let text = recognition.text?;
        self.reporter.heard(&text);

        let command = self.interpreter.interpret(&text);
        tracing::debug!(%text, %command, "utterance interpreted");
        if command == VoiceCommand::Search {
            self.reporter.search_started();
        }
        Some(command)
    }

    fn persist_find(&mut self, color: ColorVerdict, frame: &CameraFrame, tick: u64) {
        let path = frame_path(&self.snapshot_dir, color);
        let saved = match path {
            Some(path) => match self.store.save_frame(frame, &path) {
                Ok(()) => Some(path),
                Err(reason) => {
                    tracing::error!(%reason, path = %path.display(), "failed to save frame");
                    self.reporter.store_failed(reason);
                    None
                }
            },
            None => None,
        };

        self.reporter.found(color, saved.as_deref());
        if self.finds.len() >= self.find_capacity {
            self.finds.pop_front();
        }
        self.finds.push_back(FindEvent {
            timestamp: Utc::now(),
            tick,
            color,
            path: saved.map(|p| p.display().to_string()),
            digest: frame.digest(),
        });
    }

    pub fn arbiter(&self) -> &BehaviorArbiter {
        &self.arbiter
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn snapshot_dir(&self) -> &Path {
        &self.snapshot_dir
    }

    /// Most recent finds, oldest first
    pub fn finds(&self) -> &VecDeque<FindEvent> {
        &self.finds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{audio_queue, Scenario, ScenarioTick, ScriptedDevice, TranscriptRecognizer};
    use crate::types::{FrameReason, Mode};

    /// Records save requests without touching the filesystem
    #[derive(Default)]
    struct MemoryStore {
        saved: Vec<(PathBuf, String)>,
    }

    impl FrameStore for MemoryStore {
        fn save_frame(&mut self, frame: &CameraFrame, path: &Path) -> Result<(), FrameReason> {
            self.saved.push((path.to_path_buf(), frame.digest()));
            Ok(())
        }
    }

    struct FailingStore;

    impl FrameStore for FailingStore {
        fn save_frame(&mut self, _: &CameraFrame, _: &Path) -> Result<(), FrameReason> {
            Err(FrameReason::R502_FRAME_STORE_IO)
        }
    }

    fn driver_for<S: FrameStore>(
        scenario: Scenario,
        store: S,
    ) -> TickDriver<ScriptedDevice, TranscriptRecognizer, S> {
        let (tx, rx) = audio_queue(8);
        let device = ScriptedDevice::new(scenario).with_audio(tx);
        TickDriver::new(device, TranscriptRecognizer::new(), store, rx, ArbiterConfig::default())
            .with_snapshot_dir("/tmp/rover-test")
    }

    #[test]
    fn test_terminates_with_scenario() {
        let mut driver = driver_for(Scenario::open_field(3), MemoryStore::default());
        assert_eq!(driver.run(None), 3);
        assert!(driver.step().is_none());
    }

    #[test]
    fn test_tick_limit() {
        let mut driver = driver_for(Scenario::endless(), MemoryStore::default());
        assert_eq!(driver.run(Some(25)), 25);
        assert_eq!(driver.arbiter().tick_count(), 25);
    }

    #[test]
    fn test_utterance_reaches_motors() {
        let mut scenario = Scenario::open_field(2);
        scenario.ticks[0].utterance = Some(String::from("please go straight"));
        let mut driver = driver_for(scenario, MemoryStore::default());

        let output = driver.step().unwrap();
        assert_eq!(output.command, Some(VoiceCommand::Straight));
        assert_eq!(driver.device().velocities(), output.speeds);

        let output = driver.step().unwrap();
        assert_eq!(output.command, None);
        assert_eq!(output.mode, Mode::Follow);
    }

    #[test]
    fn test_find_is_saved_once() {
        let blob = crate::core::FrameSpec::Solid { width: 52, height: 39, rgb: [0, 0, 240] };
        let scenario = Scenario {
            ticks: vec![
                ScenarioTick { utterance: Some(String::from("search")), frame: Some(blob.clone()), ..Default::default() },
                ScenarioTick { frame: Some(blob), ..Default::default() },
            ],
            repeat: false,
        };
        let mut driver = driver_for(scenario, MemoryStore::default());
        driver.run(None);

        assert_eq!(driver.store().saved.len(), 1);
        assert_eq!(driver.store().saved[0].0, PathBuf::from("/tmp/rover-test/blue_blob.ppm"));
        assert_eq!(driver.finds().len(), 1);
        assert_eq!(driver.finds()[0].color, ColorVerdict::Blue);
        assert_eq!(driver.finds()[0].digest, driver.store().saved[0].1);
    }

    #[test]
    fn test_find_log_is_capped() {
        let red = crate::core::FrameSpec::Solid { width: 52, height: 39, rgb: [250, 0, 0] };
        let mut ticks = vec![ScenarioTick { utterance: Some(String::from("search")), frame: Some(red.clone()), ..Default::default() }];
        ticks.extend(std::iter::repeat(ScenarioTick { frame: Some(red), ..Default::default() }).take(200));
        let scenario = Scenario { ticks, repeat: false };
        let mut driver = driver_for(scenario, MemoryStore::default()).with_find_capacity(3);

        let mut found_ticks = Vec::new();
        while let Some(output) = driver.step() {
            if output.found.is_some() {
                found_ticks.push(output.tick);
            }
        }

        assert!(found_ticks.len() > 3);
        assert_eq!(driver.store().saved.len(), found_ticks.len());
        let kept: Vec<u64> = driver.finds().iter().map(|f| f.tick).collect();
        assert_eq!(kept, found_ticks[found_ticks.len() - 3..].to_vec());
    }

    #[test]
    fn test_store_failure_is_not_fatal() {
        let blob = crate::core::FrameSpec::Solid { width: 52, height: 39, rgb: [250, 0, 0] };
        let scenario = Scenario {
            ticks: vec![
                ScenarioTick { utterance: Some(String::from("search")), frame: Some(blob), ..Default::default() },
                ScenarioTick::default(),
            ],
            repeat: false,
        };
        let mut driver = driver_for(scenario, FailingStore);
        assert_eq!(driver.run(None), 2);
        assert_eq!(driver.finds().len(), 1);
        assert!(driver.finds()[0].path.is_none());
    }
}
