use futures::{Stream, StreamExt};
use gesture::Classifier;
use protocol::{Command, LandmarkFrame};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use crate::annotate::Annotate;
use crate::error::Error;
use crate::throttle::Throttle;

/// Per-frame glue between the pose estimator and the link.
pub struct Pipeline<A> {
    classifier: Classifier,
    annotator: A,
    throttle: Throttle,
    cmd_queue: mpsc::Sender<Command>,
}

impl<A: Annotate> Pipeline<A> {
    pub fn new(
        classifier: Classifier,
        annotator: A,
        throttle: Throttle,
        cmd_queue: mpsc::Sender<Command>,
    ) -> Self {
        Pipeline {
            classifier,
            annotator,
            throttle,
            cmd_queue,
        }
    }

    /// Classifies every hand of `frame` and queues the resulting commands.
    /// Returns the number of commands queued.
    pub async fn process(&mut self, frame: &LandmarkFrame) -> usize {
        self.annotator.draw(frame.hands.as_deref());

        let Some(hands) = frame.hands.as_deref() else {
            return 0;
        };

        let mut queued = 0;
        for (i, hand) in hands.iter().enumerate() {
            let snapshot = match self.classifier.snapshot(&hand.points) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!(frame = frame.timestamp_us, hand = i, "skipping hand: {e}");
                    continue;
                }
            };
            for (finger, landmarks) in snapshot.iter() {
                debug!(?finger, tip = ?landmarks.tip, joint = ?landmarks.joint);
            }

            self.throttle.tick().await;
            for cmd in self.classifier.commands(&snapshot) {
                if self.emit(cmd) {
                    queued += 1;
                }
            }
        }
        queued
    }

    // Fire and forget, the estimator is never held up by the link. A full
    // queue drops the newest command; the next frame repeats every finger.
    fn emit(&self, cmd: Command) -> bool {
        match self.cmd_queue.try_send(cmd) {
            Ok(()) => true,
            Err(TrySendError::Full(cmd)) => {
                warn!("Command queue full, dropping {cmd}");
                false
            }
            Err(TrySendError::Closed(cmd)) => {
                warn!("Link is gone, dropping {cmd}");
                false
            }
        }
    }

    /// Processes frames until the stream ends. Undecodable frames are
    /// skipped; an I/O error on the stream ends the run.
    pub async fn run<S>(&mut self, mut frames: S) -> Result<u64, Error>
    where
        S: Stream<Item = Result<LandmarkFrame, Error>> + Unpin,
    {
        let mut count = 0;
        while let Some(frame) = frames.next().await {
            match frame {
                Ok(frame) => {
                    self.process(&frame).await;
                    count += 1;
                }
                Err(Error::Decode(e)) => warn!("Dropping undecodable landmark frame: {e}"),
                Err(e) => return Err(e),
            }
        }
        info!("Landmark stream ended after {count} frames");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{
        frames,
        tests::{record, record_frame},
    };
    use gesture::{JointMode, LANDMARK_COUNT};
    use protocol::{HandLandmarks, Point};
    use tokio::time::{Duration, Instant};

    #[derive(Default)]
    struct Recorder {
        draws: Vec<Option<usize>>,
    }

    impl Annotate for Recorder {
        fn draw(&mut self, hands: Option<&[HandLandmarks]>) {
            self.draws.push(hands.map(|h| h.len()));
        }
    }

    fn pipeline(queue: usize) -> (Pipeline<Recorder>, mpsc::Receiver<Command>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(queue);
        let pipeline = Pipeline::new(
            Classifier::new(JointMode::Legacy, 2000),
            Recorder::default(),
            Throttle::new(Duration::from_millis(100)),
            cmd_tx,
        );
        (pipeline, cmd_rx)
    }

    // index finger extended, everything else level
    fn pointing_hand() -> HandLandmarks {
        let mut points = vec![Point::new(0.0, 0.5); LANDMARK_COUNT];
        points[5] = Point::new(0.0, 0.50);
        points[8] = Point::new(0.0, 0.30);
        HandLandmarks { points }
    }

    fn frame(hands: Option<Vec<HandLandmarks>>) -> LandmarkFrame {
        LandmarkFrame {
            timestamp_us: 0,
            hands,
        }
    }

    fn drain(cmd_rx: &mut mpsc::Receiver<Command>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(cmd) = cmd_rx.try_recv() {
            out.push(cmd.to_string());
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_hands() {
        let (mut pipeline, mut cmd_rx) = pipeline(8);

        assert_eq!(pipeline.process(&frame(None)).await, 0);
        assert_eq!(pipeline.process(&frame(Some(vec![]))).await, 0);

        assert!(drain(&mut cmd_rx).is_empty());
        assert_eq!(pipeline.annotator.draws, [None, Some(0)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_hand() {
        let (mut pipeline, mut cmd_rx) = pipeline(8);

        assert_eq!(pipeline.process(&frame(Some(vec![pointing_hand()]))).await, 1);
        assert_eq!(drain(&mut cmd_rx), ["#002P2500T2000!"]);
        assert_eq!(pipeline.annotator.draws, [Some(1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_hand_is_isolated() {
        let (mut pipeline, mut cmd_rx) = pipeline(8);
        let mut short = pointing_hand();
        short.points.truncate(LANDMARK_COUNT - 1);
        short.points[16] = Point::new(0.0, 0.9);

        let hands = vec![short, pointing_hand()];
        assert_eq!(pipeline.process(&frame(Some(hands))).await, 1);
        assert_eq!(drain(&mut cmd_rx), ["#002P2500T2000!"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hands_are_throttled() {
        let (mut pipeline, mut cmd_rx) = pipeline(8);
        let start = Instant::now();

        let hands = vec![pointing_hand(), pointing_hand()];
        assert_eq!(pipeline.process(&frame(Some(hands))).await, 2);
        assert_eq!(start.elapsed().as_millis(), 100);

        pipeline.process(&frame(Some(vec![pointing_hand()]))).await;
        assert_eq!(start.elapsed().as_millis(), 200);
        assert_eq!(drain(&mut cmd_rx).len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_queue_drops_commands() {
        let (mut pipeline, mut cmd_rx) = pipeline(1);
        let mut hand = pointing_hand();
        // ring finger curled as well
        hand.points[16] = Point::new(0.0, 0.9);

        assert_eq!(pipeline.process(&frame(Some(vec![hand.clone()]))).await, 1);
        assert_eq!(drain(&mut cmd_rx), ["#004P2500T2000!"]);

        // the dropped index command arrives with a later frame once the
        // link has caught up
        hand.points[16] = Point::new(0.0, 0.5);
        assert_eq!(pipeline.process(&frame(Some(vec![hand]))).await, 1);
        assert_eq!(drain(&mut cmd_rx), ["#002P2500T2000!"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_queue() {
        let (mut pipeline, cmd_rx) = pipeline(8);
        drop(cmd_rx);
        assert_eq!(pipeline.process(&frame(Some(vec![pointing_hand()]))).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_skips_undecodable_frames() {
        let (mut pipeline, mut cmd_rx) = pipeline(8);

        let mut buf = Vec::new();
        record_frame(&frame(Some(vec![pointing_hand()])), &mut buf);
        record(&[0xff], &mut buf);
        record_frame(&frame(None), &mut buf);

        assert_eq!(pipeline.run(frames(&buf[..])).await.unwrap(), 2);
        assert_eq!(drain(&mut cmd_rx), ["#002P2500T2000!"]);
        assert_eq!(pipeline.annotator.draws, [Some(1), None]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_truncated_stream() {
        let (mut pipeline, _cmd_rx) = pipeline(8);

        let mut buf = Vec::new();
        record_frame(&frame(None), &mut buf);
        buf.extend_from_slice(&[0x00, 0x05]);

        assert!(matches!(
            pipeline.run(frames(&buf[..])).await,
            Err(Error::Io(_))
        ));
    }
}
