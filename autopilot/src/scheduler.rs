use crashsim_execution::{Scheduler, Timer, TimerId};
use std::{collections::HashMap, time::Duration};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::trace;

/// Wall-clock timers on the tokio runtime.
///
/// Each timer is a spawned task that sends its id over the channel returned by
/// [`TokioScheduler::new`]. Cancelling aborts the task. An id already sitting in the channel
/// when its timer is cancelled is still delivered; the engine ignores it.
pub struct TokioScheduler {
    sender: mpsc::UnboundedSender<TimerId>,
    tasks: HashMap<TimerId, JoinHandle<()>>,
    next_id: u64,
    time_scale: f64,
}

impl TokioScheduler {
    /// Create a scheduler whose delays are divided by `time_scale`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(time_scale: f64) -> (Self, mpsc::UnboundedReceiver<TimerId>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let time_scale = if time_scale.is_finite() && time_scale > 0.0 {
            time_scale
        } else {
            1.0
        };
        (
            Self {
                sender,
                tasks: HashMap::new(),
                next_id: 0,
                time_scale,
            },
            receiver,
        )
    }

    /// Timers not yet finished or cancelled.
    pub fn pending(&self) -> usize {
        self.tasks.values().filter(|task| !task.is_finished()).count()
    }

    fn scaled(&self, duration: Duration) -> Duration {
        duration
            .div_f64(self.time_scale)
            .max(Duration::from_micros(100))
    }

    fn register(&mut self, task: impl FnOnce(TimerId) -> JoinHandle<()>) -> TimerId {
        self.tasks.retain(|_, handle| !handle.is_finished());
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.tasks.insert(id, task(id));
        id
    }
}

impl Scheduler for TokioScheduler {
    fn after(&mut self, delay: Duration, timer: Timer) -> TimerId {
        let delay = self.scaled(delay);
        let sender = self.sender.clone();
        self.register(move |id| {
            tokio::spawn(async move {
                time::sleep(delay).await;
                trace!(id = id.0, ?timer, "timer due");
                let _ = sender.send(id);
            })
        })
    }

    fn repeat(&mut self, interval: Duration, timer: Timer) -> TimerId {
        let period = self.scaled(interval);
        let sender = self.sender.clone();
        self.register(move |id| {
            tokio::spawn(async move {
                let mut ticker = time::interval_at(Instant::now() + period, period);
                // A late tick is dropped rather than replayed.
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    ticker.tick().await;
                    trace!(id = id.0, ?timer, "timer due");
                    if sender.send(id).is_err() {
                        break;
                    }
                }
            })
        })
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(handle) = self.tasks.remove(&id) {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_after_delivers_once() {
        let (mut scheduler, mut receiver) = TokioScheduler::new(1.0);
        let id = scheduler.after(Duration::from_millis(100), Timer::Cooldown);

        time::advance(Duration::from_millis(101)).await;
        assert_eq!(receiver.recv().await, Some(id));
        time::advance(Duration::from_secs(1)).await;
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeat_until_cancelled() {
        let (mut scheduler, mut receiver) = TokioScheduler::new(1.0);
        let id = scheduler.repeat(Duration::from_millis(50), Timer::Tick);

        for _ in 0..3 {
            assert_eq!(receiver.recv().await, Some(id));
        }
        scheduler.cancel(id);
        tokio::task::yield_now().await;
        while receiver.try_recv().is_ok() {}

        time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
        assert!(receiver.try_recv().is_err());
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_scale_shortens_delays() {
        let (mut scheduler, mut receiver) = TokioScheduler::new(10.0);
        let start = Instant::now();
        let id = scheduler.after(Duration::from_millis(1_000), Timer::AutoRestart);

        assert_eq!(receiver.recv().await, Some(id));
        assert!(start.elapsed() < Duration::from_millis(200));
    }
}
