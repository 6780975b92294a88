//! Frame source that replays recorded observations
//!
//! One JSON `FrameObservation` per line, as a detector adapter would emit it:
//!
//! ```text
//! {"detected":false,"hand_count":0,"hands":[]}
//! {"detected":true,"hand_count":1,"hands":[{"landmarks":{...},"palm_center":{"x":0.5,"y":0.5},"handedness":"Right"}]}
//! ```

use crate::bridge::FrameInput;
use crate::gesture::{FrameObservation, GestureError};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: invalid JSON: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },

    #[error("Line {line}: {source}")]
    Invalid { line: usize, source: GestureError },

    #[error("Invalid frame rate: {0}")]
    InvalidFps(u32),

    #[error("Frame receiver dropped")]
    ReceiverDropped,
}

/// Parses one line. Blank lines yield `None`.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<FrameObservation>, ReplayError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let frame: FrameObservation = serde_json::from_str(line).map_err(|source| {
        ReplayError::Parse {
            line: line_no,
            source,
        }
    })?;
    frame.validate().map_err(|source| ReplayError::Invalid {
        line: line_no,
        source,
    })?;
    Ok(Some(frame))
}

/// Replays the file at `fps` frames per second
pub async fn run_replay(
    path: &Path,
    fps: u32,
    frame_sender: mpsc::Sender<FrameInput>,
) -> Result<usize, ReplayError> {
    info!("Replaying frames from {} at {} fps", path.display(), fps);
    let file = tokio::fs::File::open(path).await?;
    replay_frames(BufReader::new(file), fps, frame_sender).await
}

/// Sends every valid frame from `reader`, then `SourceLost`. Returns the
/// number of frames sent. Malformed lines are skipped.
pub async fn replay_frames<R>(
    reader: R,
    fps: u32,
    frame_sender: mpsc::Sender<FrameInput>,
) -> Result<usize, ReplayError>
where
    R: AsyncBufRead + Unpin,
{
    if fps == 0 {
        return Err(ReplayError::InvalidFps(fps));
    }

    let mut pacing = tokio::time::interval(Duration::from_secs_f64(1.0 / fps as f64));
    pacing.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut lines = reader.lines();
    let mut line_no = 0;
    let mut sent = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;

        let frame = match parse_line(line_no, &line) {
            Ok(Some(frame)) => frame,
            Ok(None) => continue,
            Err(e) => {
                warn!("Skipping frame: {}", e);
                continue;
            }
        };

        pacing.tick().await;
        frame_sender
            .send(FrameInput::Observation(frame))
            .await
            .map_err(|_| ReplayError::ReceiverDropped)?;
        sent += 1;
    }

    debug!("Replay reached end of input after {} lines", line_no);
    frame_sender
        .send(FrameInput::SourceLost)
        .await
        .map_err(|_| ReplayError::ReceiverDropped)?;

    info!("Replay finished, {} frames sent", sent);
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_FRAME: &str = r#"{"detected":false,"hand_count":0,"hands":[]}"#;

    #[test]
    fn test_blank_line_is_skipped() {
        assert!(parse_line(1, "   ").expect("blank").is_none());
    }

    #[test]
    fn test_parse_empty_frame() {
        let frame = parse_line(1, EMPTY_FRAME).expect("valid").expect("frame");
        assert!(!frame.detected);
        assert!(frame.hands.is_empty());
    }

    #[test]
    fn test_parse_errors_carry_line_number() {
        match parse_line(4, "{not json") {
            Err(ReplayError::Parse { line, .. }) => assert_eq!(line, 4),
            other => panic!("unexpected result {:?}", other),
        }

        // hand_count disagrees with hands
        match parse_line(9, r#"{"detected":true,"hand_count":1,"hands":[]}"#) {
            Err(ReplayError::Invalid { line, .. }) => assert_eq!(line, 9),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_replay_skips_bad_lines_and_ends_with_source_lost() {
        let input = format!("{}\n\ngarbage\n{}\n", EMPTY_FRAME, EMPTY_FRAME);
        let (tx, mut rx) = mpsc::channel(8);

        let sent = replay_frames(input.as_bytes(), 1000, tx)
            .await
            .expect("replay");
        assert_eq!(sent, 2);

        assert!(matches!(rx.recv().await, Some(FrameInput::Observation(_))));
        assert!(matches!(rx.recv().await, Some(FrameInput::Observation(_))));
        assert!(matches!(rx.recv().await, Some(FrameInput::SourceLost)));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_zero_fps_is_rejected() {
        let (tx, _rx) = mpsc::channel(1);
        assert!(matches!(
            replay_frames(&b""[..], 0, tx).await,
            Err(ReplayError::InvalidFps(0))
        ));
    }
}
