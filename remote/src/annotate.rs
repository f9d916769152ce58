use protocol::HandLandmarks;
use tracing::{debug, info};

/// Receives the estimator output of every frame, detected hands or not.
pub trait Annotate {
    fn draw(&mut self, hands: Option<&[HandLandmarks]>);
}

/// Reports changes in the number of detected hands.
#[derive(Default)]
pub struct LogAnnotator {
    visible: usize,
}

impl Annotate for LogAnnotator {
    fn draw(&mut self, hands: Option<&[HandLandmarks]>) {
        let visible = hands.map_or(0, |h| h.len());
        if visible != self.visible {
            info!("{visible} hand(s) in view");
            self.visible = visible;
        }
        if let Some(hands) = hands {
            for (i, hand) in hands.iter().enumerate() {
                debug!(hand = i, landmarks = hand.points.len(), "hand landmarks");
            }
        }
    }
}
