//! Keyboard fallback for running without a camera
//!
//! Reads one key per stdin line and feeds the bridge directly, bypassing the
//! classifier.

use crate::bridge::{BridgeError, BridgeHandle, ManualCommand};
use crate::gesture::{GestureEvent, GestureKind};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Fixed intensity of the zoom keys
pub const KEY_ZOOM_INTENSITY: f32 = 0.5;
/// Fixed velocity of the pan keys
pub const KEY_PAN_VELOCITY: f32 = 0.3;

/// Maps one input line to a command. `None` for unknown keys.
pub fn map_key(line: &str) -> Option<ManualCommand> {
    // space or empty line
    let key = line.trim();
    if key.is_empty() {
        return Some(ManualCommand::Idle);
    }

    let event = match key.to_ascii_lowercase().as_str() {
        "w" => GestureEvent::new(GestureKind::ZoomIn, KEY_ZOOM_INTENSITY),
        "s" => GestureEvent::new(GestureKind::ZoomOut, KEY_ZOOM_INTENSITY),
        "a" => GestureEvent::new(GestureKind::PanLeft, KEY_PAN_VELOCITY),
        "d" => GestureEvent::new(GestureKind::PanRight, KEY_PAN_VELOCITY),
        _ => return None,
    };
    Some(ManualCommand::Gesture(event))
}

/// Reads keys until EOF or cancellation and forwards them to the bridge
pub async fn run_keyboard<R>(
    reader: R,
    bridge: &BridgeHandle,
    cancel: CancellationToken,
) -> Result<(), BridgeError>
where
    R: AsyncBufRead + Unpin,
{
    info!("Keyboard fallback active: w/s zoom, a/d pan, space idle");
    let mut lines = reader.lines();

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Keyboard input closed");
                break;
            }
            Err(e) => {
                return Err(BridgeError::ChannelError(format!(
                    "failed to read keyboard input: {}",
                    e
                )))
            }
        };

        match map_key(&line) {
            Some(ManualCommand::Gesture(event)) => bridge.publish_manual(event).await?,
            Some(ManualCommand::Idle) => bridge.set_idle().await?,
            None => debug!("Ignoring unknown key {:?}", line),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gesture(line: &str) -> Option<(GestureKind, f32)> {
        match map_key(line) {
            Some(ManualCommand::Gesture(e)) => Some((e.kind, e.magnitude)),
            _ => None,
        }
    }

    #[test]
    fn test_movement_keys() {
        assert_eq!(gesture("w"), Some((GestureKind::ZoomIn, 0.5)));
        assert_eq!(gesture("s"), Some((GestureKind::ZoomOut, 0.5)));
        assert_eq!(gesture("a"), Some((GestureKind::PanLeft, 0.3)));
        assert_eq!(gesture("d\n"), Some((GestureKind::PanRight, 0.3)));
        assert_eq!(gesture("W"), Some((GestureKind::ZoomIn, 0.5)));
    }

    #[test]
    fn test_space_and_empty_line_mean_idle() {
        assert!(matches!(map_key(" "), Some(ManualCommand::Idle)));
        assert!(matches!(map_key(""), Some(ManualCommand::Idle)));
        assert!(matches!(map_key("\r\n"), Some(ManualCommand::Idle)));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        assert!(map_key("q").is_none());
        assert!(map_key("wasd").is_none());
    }
}
