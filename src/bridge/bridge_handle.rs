//! Bridge Handle - Unified API for the frame → gesture → client pipeline
//!
//! Spawns the frame processor task, hands out message subscriptions and
//! accepts manual commands. Shutdown goes through a cancellation token.

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::message::BridgeMessage;
use super::processor::{run_processor_loop, FrameInput, FrameProcessor, ManualCommand};
use super::BridgeError;
use crate::gesture::{ClassifierSettings, GestureClassifier, GestureEvent};

/// Configuration for the bridge between frame source and transport
///
/// # Performance Impact
///
/// - `heartbeat_interval_ms`: how quickly clients notice a dead link
/// - `message_capacity`: slow subscribers that fall further behind than this
///   lose the oldest messages
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// Interval between heartbeat messages (> 0)
    pub heartbeat_interval_ms: u64,

    /// Time without any detected hand before a status message is sent
    pub hand_timeout_ms: u64,

    /// How long the heartbeat keeps reporting the last gesture
    pub active_gesture_hold_ms: u64,

    /// Buffer between frame source and processor
    pub frame_capacity: usize,

    /// Broadcast buffer per subscriber (> 0)
    pub message_capacity: usize,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: 500,
            hand_timeout_ms: 5000,
            active_gesture_hold_ms: 1000,
            frame_capacity: 64,
            message_capacity: 256,
        }
    }
}

impl BridgeSettings {
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.heartbeat_interval_ms == 0 {
            return Err(BridgeError::InitializationError(
                "heartbeat_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.frame_capacity == 0 || self.message_capacity == 0 {
            return Err(BridgeError::InitializationError(
                "channel capacities must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Channel the frame source should feed
    pub fn frame_channel(&self) -> (mpsc::Sender<FrameInput>, mpsc::Receiver<FrameInput>) {
        mpsc::channel(self.frame_capacity.max(1))
    }
}

/// Handle for the running bridge
///
/// # Threading Model
///
/// One tokio task owns the classifier and link state. Frames arrive over an
/// mpsc channel, messages leave over a broadcast channel so several
/// transports can listen at once.
///
/// ```text
/// frame source ─[FrameInput]→ FrameProcessor ─[BridgeMessage]→ subscribers
///                              ▲
/// keyboard ─[ManualCommand]────┘
/// ```
pub struct BridgeHandle {
    message_sender: broadcast::Sender<BridgeMessage>,
    manual_sender: mpsc::Sender<ManualCommand>,
    cancel: CancellationToken,
    task: JoinHandle<Result<(), BridgeError>>,
}

impl BridgeHandle {
    /// Validates the settings and starts the processor task.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// * [`BridgeError::Gesture`] - classifier settings out of range
    /// * [`BridgeError::InitializationError`] - bridge settings out of range
    pub fn spawn(
        settings: Option<BridgeSettings>,
        classifier_settings: ClassifierSettings,
        frame_receiver: mpsc::Receiver<FrameInput>,
    ) -> Result<Self, BridgeError> {
        let settings = settings.unwrap_or_default();
        info!("Initializing bridge with settings: {:?}", settings);

        settings.validate()?;
        let classifier = GestureClassifier::try_new(classifier_settings)?;
        debug!("Classifier ready: {:?}", classifier.settings());

        let (message_sender, _) = broadcast::channel(settings.message_capacity);
        let (manual_sender, manual_receiver) = mpsc::channel(32);
        let cancel = CancellationToken::new();

        let processor = FrameProcessor::create(
            frame_receiver,
            manual_receiver,
            message_sender.clone(),
            classifier,
            &settings,
            cancel.clone(),
        );

        info!("Spawning frame processor task");
        let task = tokio::spawn(async move {
            let result = run_processor_loop(processor).await;
            if let Err(ref e) = result {
                error!("Frame processor terminated with error: {}", e);
            }
            result
        });

        info!("Bridge started");
        Ok(Self {
            message_sender,
            manual_sender,
            cancel,
            task,
        })
    }

    /// New receiver for everything the bridge publishes from now on
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeMessage> {
        debug!("New bridge subscriber");
        self.message_sender.subscribe()
    }

    /// Publishes a gesture without going through the classifier
    pub async fn publish_manual(&self, event: GestureEvent) -> Result<(), BridgeError> {
        self.send_manual(ManualCommand::Gesture(event)).await
    }

    /// Resets the active gesture label to idle
    pub async fn set_idle(&self) -> Result<(), BridgeError> {
        self.send_manual(ManualCommand::Idle).await
    }

    async fn send_manual(&self, cmd: ManualCommand) -> Result<(), BridgeError> {
        self.manual_sender
            .send(cmd)
            .await
            .map_err(|e| BridgeError::ChannelError(format!("processor is gone: {}", e)))
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the processor and waits for it. Returns the processor's own
    /// error if it failed before the shutdown.
    pub async fn shutdown(self) -> Result<(), BridgeError> {
        info!("Shutting down bridge");
        self.cancel.cancel();
        self.task
            .await
            .map_err(|e| BridgeError::TaskError(e.to_string()))?
    }
}
