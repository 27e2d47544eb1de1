use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

/// Quiescence window for search-box input.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Collapses bursts of values into the latest one, released once no new
/// value has arrived for `window`.
///
/// `next` is cancel-safe: the pending value and its deadline live in the
/// debouncer, so it can sit in a `tokio::select!` loop.
#[derive(Debug)]
pub struct Debouncer<T> {
    rx: mpsc::Receiver<T>,
    window: Duration,
    pending: Option<T>,
    deadline: Option<Instant>,
}

impl<T> Debouncer<T> {
    pub fn new(rx: mpsc::Receiver<T>, window: Duration) -> Self {
        Self {
            rx,
            window,
            pending: None,
            deadline: None,
        }
    }

    pub fn channel(window: Duration, capacity: usize) -> (mpsc::Sender<T>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (tx, Self::new(rx, window))
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn arm(&mut self, value: T) {
        self.pending = Some(value);
        self.deadline = Some(Instant::now() + self.window);
    }

    fn release(&mut self) -> Option<T> {
        self.deadline = None;
        self.pending.take()
    }

    /// The next settled value. A value still pending when every sender is
    /// gone is released immediately; after that, `None`.
    pub async fn next(&mut self) -> Option<T> {
        loop {
            match self.deadline {
                None => match self.rx.recv().await {
                    Some(value) => self.arm(value),
                    None => return None,
                },
                Some(deadline) => {
                    tokio::select! {
                        received = self.rx.recv() => match received {
                            Some(value) => self.arm(value),
                            None => return self.release(),
                        },
                        _ = tokio::time::sleep_until(deadline) => return self.release(),
                    }
                }
            }
        }
    }
}
