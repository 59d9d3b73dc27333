//! Turns a download's progress signals into percentage, elapsed time and ETA
//! updates for a renderer.

use std::time::{Duration, Instant};

/// One chunk arriving from the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSignal {
    pub chunk: u64,
    pub downloaded: u64,
    /// Expected total, 0 when the source has not said.
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eta {
    Unknown,
    Remaining(Duration),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// Whole percent, floored. `None` while the total is unknown.
    pub percent: Option<u8>,
    pub downloaded: u64,
    pub total: u64,
    pub elapsed: Duration,
    pub eta: Eta,
}

pub trait ProgressRenderer {
    fn start(&mut self);
    fn update(&mut self, update: &ProgressUpdate);
    fn finish(&mut self, update: &ProgressUpdate);
    fn abandon(&mut self, message: &str);
}

impl<T: ProgressRenderer + ?Sized> ProgressRenderer for Box<T> {
    fn start(&mut self) {
        (**self).start()
    }

    fn update(&mut self, update: &ProgressUpdate) {
        (**self).update(update)
    }

    fn finish(&mut self, update: &ProgressUpdate) {
        (**self).finish(update)
    }

    fn abandon(&mut self, message: &str) {
        (**self).abandon(message)
    }
}

/// ETA is `elapsed / fraction - elapsed` strictly between 0 and 1, zero at 1, unknown at 0.
pub fn estimate_eta(elapsed: Duration, fraction: f64) -> Eta {
    if fraction >= 1.0 {
        Eta::Remaining(Duration::ZERO)
    } else if fraction > 0.0 {
        let secs = elapsed.as_secs_f64();
        Eta::Remaining(Duration::from_secs_f64((secs / fraction - secs).max(0.0)))
    } else {
        Eta::Unknown
    }
}

#[derive(Debug)]
struct DownloadState {
    started: Instant,
    downloaded: u64,
    total: u64,
    last_percent: Option<u8>,
}

pub struct ProgressTracker<R> {
    renderer: R,
    state: Option<DownloadState>,
}

impl<R: ProgressRenderer> ProgressTracker<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            state: None,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn start(&mut self, total: Option<u64>) {
        self.start_at(Instant::now(), total);
    }

    pub fn start_at(&mut self, now: Instant, total: Option<u64>) {
        self.state = Some(DownloadState {
            started: now,
            downloaded: 0,
            total: total.unwrap_or(0),
            last_percent: None,
        });
        self.renderer.start();
    }

    pub fn progress(&mut self, signal: ProgressSignal) -> ProgressUpdate {
        self.progress_at(Instant::now(), signal)
    }

    /// Records `signal` and renders the resulting update. Signals arriving
    /// before [`start_at`](Self::start_at) start the clock themselves.
    pub fn progress_at(&mut self, now: Instant, signal: ProgressSignal) -> ProgressUpdate {
        let state = self.state.get_or_insert_with(|| DownloadState {
            started: now,
            downloaded: 0,
            total: 0,
            last_percent: None,
        });

        state.downloaded = state.downloaded.max(signal.downloaded);
        if signal.total > 0 {
            state.total = signal.total;
        }

        let elapsed = now.saturating_duration_since(state.started);
        let update = if state.total == 0 {
            ProgressUpdate {
                percent: None,
                downloaded: state.downloaded,
                total: 0,
                elapsed,
                eta: Eta::Unknown,
            }
        } else {
            let fraction = (state.downloaded as f64 / state.total as f64).min(1.0);
            let percent = ((fraction * 100.0).floor() as u8).max(state.last_percent.unwrap_or(0));
            state.last_percent = Some(percent);
            ProgressUpdate {
                percent: Some(percent),
                downloaded: state.downloaded,
                total: state.total,
                elapsed,
                eta: estimate_eta(elapsed, fraction),
            }
        };

        self.renderer.update(&update);
        update
    }

    pub fn finish(&mut self) -> ProgressUpdate {
        self.finish_at(Instant::now())
    }

    /// Forces a final render at 100% and ends the session.
    pub fn finish_at(&mut self, now: Instant) -> ProgressUpdate {
        let (downloaded, total, elapsed) = match self.state.take() {
            Some(state) => {
                let total = if state.total == 0 { state.downloaded } else { state.total };
                (
                    state.downloaded,
                    total,
                    now.saturating_duration_since(state.started),
                )
            }
            None => (0, 0, Duration::ZERO),
        };

        let update = ProgressUpdate {
            percent: Some(100),
            downloaded,
            total,
            elapsed,
            eta: Eta::Remaining(Duration::ZERO),
        };
        self.renderer.finish(&update);
        update
    }

    /// Stops rendering after a failed or aborted transfer.
    pub fn fail(&mut self, message: &str) {
        self.state = None;
        self.renderer.abandon(message);
    }
}
