//! Frame processor with statum state machine
//!
//! Owns the classifier and the link state and runs one input per cycle:
//!
//! ```text
//! Waiting ──► Handling(BridgeInput) ──► Publishing ──► Waiting
//!    │
//!    └── cancelled ──► stop
//! ```
//!
//! Inputs are frames from the detector side, manual commands from the
//! keyboard fallback and heartbeat ticks.

use statum::{machine, state};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc};
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::bridge_handle::BridgeSettings;
use super::link_state::LinkState;
use super::message::{now_millis, BridgeMessage};
use super::BridgeError;
use crate::gesture::{FrameObservation, GestureClassifier, GestureEvent};

/// What the frame source delivers
#[derive(Debug, Clone)]
pub enum FrameInput {
    Observation(FrameObservation),
    /// Camera or detector went away
    SourceLost,
}

/// Commands that bypass the classifier
#[derive(Debug, Clone)]
pub enum ManualCommand {
    Gesture(GestureEvent),
    /// Drop the active gesture label
    Idle,
}

#[derive(Debug, Clone)]
pub enum BridgeInput {
    Frame(FrameInput),
    Manual(ManualCommand),
    Heartbeat,
}

#[state]
#[derive(Debug, Clone)]
pub enum ProcessorState {
    Waiting,
    Handling(BridgeInput),
    Publishing,
}

#[machine]
#[derive(Debug)]
pub struct FrameProcessor<S: ProcessorState> {
    frame_receiver: mpsc::Receiver<FrameInput>,
    manual_receiver: mpsc::Receiver<ManualCommand>,
    message_sender: broadcast::Sender<BridgeMessage>,

    classifier: GestureClassifier,
    link: LinkState,
    heartbeat: Interval,
    cancel: CancellationToken,

    // messages produced by the current cycle
    outbox: Vec<BridgeMessage>,

    frames_closed: bool,
    manual_closed: bool,

    // inputs handled since cancellation was requested
    drained_after_cancel: usize,
}

impl<S: ProcessorState> FrameProcessor<S> {
    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }
}

/// Inputs still handled after cancellation before the processor stops
/// regardless of pending input
const MAX_DRAIN_AFTER_CANCEL: usize = 256;

enum Wake {
    Cancelled,
    Heartbeat,
    Frame(Option<FrameInput>),
    Manual(Option<ManualCommand>),
}

impl FrameProcessor<Waiting> {
    pub fn create(
        frame_receiver: mpsc::Receiver<FrameInput>,
        manual_receiver: mpsc::Receiver<ManualCommand>,
        message_sender: broadcast::Sender<BridgeMessage>,
        classifier: GestureClassifier,
        settings: &BridgeSettings,
        cancel: CancellationToken,
    ) -> Self {
        info!("Creating frame processor with settings: {:?}", settings);

        let mut heartbeat =
            tokio::time::interval(Duration::from_millis(settings.heartbeat_interval_ms));
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let link = LinkState::new(
            Instant::now(),
            Duration::from_millis(settings.hand_timeout_ms),
            Duration::from_millis(settings.active_gesture_hold_ms),
        );

        Self::new(
            frame_receiver,
            manual_receiver,
            message_sender,
            classifier,
            link,
            heartbeat,
            cancel,
            Vec::new(),
            false,
            false,
            0,
        )
    }

    /// Waits for the next input. `None` once the processor was cancelled.
    pub async fn wait_for_input(
        mut self,
    ) -> Result<Option<FrameProcessor<Handling>>, BridgeError> {
        loop {
            if self.cancel.is_cancelled() {
                if self.drained_after_cancel >= MAX_DRAIN_AFTER_CANCEL {
                    warn!(
                        "Input still pending after {} drained items, stopping anyway",
                        self.drained_after_cancel
                    );
                    return Ok(None);
                }
                self.drained_after_cancel += 1;
            }

            // queued input is drained before a cancellation is honored
            let wake = tokio::select! {
                biased;
                _ = self.heartbeat.tick() => Wake::Heartbeat,
                frame = self.frame_receiver.recv(), if !self.frames_closed => Wake::Frame(frame),
                cmd = self.manual_receiver.recv(), if !self.manual_closed => Wake::Manual(cmd),
                _ = self.cancel.cancelled() => Wake::Cancelled,
            };

            let input = match wake {
                Wake::Cancelled => {
                    info!("Frame processor cancelled");
                    return Ok(None);
                }
                Wake::Heartbeat => BridgeInput::Heartbeat,
                Wake::Frame(Some(frame)) => BridgeInput::Frame(frame),
                Wake::Frame(None) => {
                    info!("Frame channel closed, only heartbeats and manual input remain");
                    self.frames_closed = true;
                    continue;
                }
                Wake::Manual(Some(cmd)) => BridgeInput::Manual(cmd),
                Wake::Manual(None) => {
                    debug!("Manual command channel closed");
                    self.manual_closed = true;
                    continue;
                }
            };

            return Ok(Some(self.transition_with(input)));
        }
    }
}

impl FrameProcessor<Handling> {
    /// Runs the input through the classifier and link state, collecting
    /// outgoing messages
    pub fn handle(mut self) -> Result<FrameProcessor<Publishing>, BridgeError> {
        let Some(input) = self.get_state_data().cloned() else {
            warn!("No input found in state data, this should not happen");
            return Ok(self.transition());
        };

        let now = Instant::now();
        let timestamp = now_millis();

        match input {
            BridgeInput::Frame(FrameInput::Observation(frame)) => {
                if let Err(e) = frame.validate() {
                    error!("Dropping malformed frame: {}", e);
                    return Ok(self.transition());
                }

                if self.link.record_frame(frame.detected, now) {
                    warn!("No hand detected for {:?}", self.link.hand_timeout());
                    self.outbox.push(BridgeMessage::hand_timeout(timestamp));
                }

                if let Some(event) = self.classifier.update_at(&frame, now) {
                    debug!("Gesture event: {:?}", event);
                    self.link.record_gesture(event.kind, now);
                    self.outbox.push(BridgeMessage::gesture(&event, timestamp));
                }
            }
            BridgeInput::Frame(FrameInput::SourceLost) => {
                warn!("Frame source lost");
                self.classifier.reset();
                self.outbox.push(BridgeMessage::camera_disconnected(timestamp));
            }
            BridgeInput::Manual(ManualCommand::Gesture(event)) => {
                debug!("Manual gesture: {:?}", event);
                self.link.record_gesture(event.kind, now);
                self.outbox.push(BridgeMessage::gesture(&event, timestamp));
            }
            BridgeInput::Manual(ManualCommand::Idle) => {
                debug!("Manual idle");
                self.link.clear_active_gesture();
            }
            BridgeInput::Heartbeat => {
                let active = self.link.active_gesture(now);
                self.outbox.push(BridgeMessage::heartbeat(
                    self.link.hand_detected(),
                    self.link.fps(),
                    active,
                    timestamp,
                ));
            }
        }

        Ok(self.transition())
    }
}

impl FrameProcessor<Publishing> {
    /// Broadcasts the collected messages and goes back to waiting
    pub fn publish(mut self) -> FrameProcessor<Waiting> {
        for msg in self.outbox.drain(..) {
            if self.message_sender.send(msg).is_err() {
                // nobody subscribed right now, the message is dropped
                debug!("No subscribers for bridge message");
            }
        }
        self.transition()
    }
}

/// Drives the processor until it is cancelled or fails
pub async fn run_processor_loop(
    mut processor: FrameProcessor<Waiting>,
) -> Result<(), BridgeError> {
    info!("Entering frame processor loop");
    let mut frames: u64 = 0;

    loop {
        let Some(handling) = processor.wait_for_input().await? else {
            info!("Frame processor stopped after {} frames", frames);
            return Ok(());
        };

        if matches!(
            handling.get_state_data(),
            Some(BridgeInput::Frame(FrameInput::Observation(_)))
        ) {
            frames += 1;
        }

        let publishing = handling.handle()?;
        processor = publishing.publish();
    }
}
