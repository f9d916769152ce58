use tokio::time::{sleep_until, Duration, Instant};

/// Fixed-interval gate limiting how often commands reach the hand.
///
/// The first [`Throttle::tick`] passes immediately, every following one
/// waits until `interval` has passed since the previous tick returned.
pub struct Throttle {
    interval: Duration,
    next: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Throttle {
            interval,
            next: None,
        }
    }

    pub async fn tick(&mut self) {
        if let Some(next) = self.next {
            sleep_until(next).await;
        }
        self.next = Some(Instant::now() + self.interval);
    }
}
