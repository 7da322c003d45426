//! One-second tick loop for a foreground session.

use std::future::Future;

use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};

use super::error::Result;
use super::timer::TimerController;
use crate::store::SessionStore;
use crate::wakeup::WakeupScheduler;

/// How a tick loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer was not ticking
    Idle,
    /// The countdown reached zero
    Finished,
    /// The shutdown future completed first
    Interrupted,
}

/// Remaining-time interval, in seconds, between wall-clock checkpoints.
const CHECKPOINT_EVERY_SECONDS: u32 = 60;

/// Drives `controller.on_tick()` once per second until the countdown stops
/// ticking or `shutdown` completes.
///
/// Each time the remaining time crosses a whole minute, the controller is
/// re-synced against `clock` (epoch seconds) and the snapshot persisted.
pub async fn run_ticks<S, W, C, F>(
    controller: &mut TimerController<S, W>,
    clock: C,
    shutdown: F,
) -> Result<TickOutcome>
where
    S: SessionStore,
    W: WakeupScheduler,
    C: Fn() -> i64,
    F: Future<Output = ()>,
{
    if !controller.is_ticking() {
        return Ok(TickOutcome::Idle);
    }

    let period = Duration::from_secs(1);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                controller.on_tick()?;
                if controller.is_ticking()
                    && controller.session().seconds_remaining % CHECKPOINT_EVERY_SECONDS == 0
                {
                    controller.checkpoint(clock())?;
                }
                if !controller.is_ticking() {
                    return Ok(TickOutcome::Finished);
                }
            }
            _ = &mut shutdown => {
                return Ok(TickOutcome::Interrupted);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::TimerEvent;
    use crate::store::MemoryStore;
    use crate::types::TimerState;
    use crate::wakeup::MockWakeupScheduler;
    use tokio::sync::mpsc;

    fn create_controller(
        minutes: u32,
    ) -> (
        TimerController<MemoryStore, MockWakeupScheduler>,
        mpsc::UnboundedReceiver<TimerEvent>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = TimerController::new(
            MemoryStore::with_length_minutes(minutes),
            MockWakeupScheduler::new(),
            tx,
        )
        .unwrap();
        (controller, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_when_not_started() {
        let (mut controller, _rx) = create_controller(1);

        let outcome = run_ticks(&mut controller, || 0, std::future::pending())
            .await
            .unwrap();

        assert_eq!(outcome, TickOutcome::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_to_completion() {
        let (mut controller, _rx) = create_controller(1);
        controller.start().unwrap();

        let outcome = run_ticks(&mut controller, || 0, std::future::pending())
            .await
            .unwrap();

        assert_eq!(outcome, TickOutcome::Finished);
        assert_eq!(controller.state(), TimerState::Stopped);
        assert_eq!(controller.session().seconds_remaining, 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_ticks_then_interrupt() {
        let (mut controller, _rx) = create_controller(10);
        controller.start().unwrap();

        let shutdown = tokio::time::sleep(Duration::from_millis(3500));
        let outcome = run_ticks(&mut controller, || 0, shutdown).await.unwrap();

        assert_eq!(outcome, TickOutcome::Interrupted);
        assert_eq!(controller.state(), TimerState::Running);
        assert_eq!(controller.session().seconds_remaining, 597);
        assert_eq!(controller.session().countdown_text(), "9:57");
    }

    #[tokio::test(start_paused = true)]
    async fn test_anchored_countdown_checkpoints_each_minute() {
        let (mut controller, _rx) = create_controller(10);
        controller.start().unwrap();
        controller.anchor(1000).unwrap();
        assert_eq!(controller.scheduler().armed(), Some(1600));

        let started = Instant::now();
        let clock = move || 1000 + started.elapsed().as_secs() as i64;
        let shutdown = tokio::time::sleep(Duration::from_millis(61_500));
        let outcome = run_ticks(&mut controller, clock, shutdown).await.unwrap();

        assert_eq!(outcome, TickOutcome::Interrupted);
        let saved = controller.store().snapshot().unwrap();
        assert_eq!(saved.state, TimerState::Running);
        assert_eq!(saved.seconds_remaining, 540);
        assert_eq!(saved.scheduled_wakeup_at, Some(1600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkpoint_catches_up_after_stalled_clock() {
        let (mut controller, _rx) = create_controller(10);
        controller.start().unwrap();
        controller.anchor(1000).unwrap();

        // Wall clock jumps 300s ahead, as after a suspend
        let started = Instant::now();
        let clock = move || 1300 + started.elapsed().as_secs() as i64;
        let shutdown = tokio::time::sleep(Duration::from_millis(60_500));
        run_ticks(&mut controller, clock, shutdown).await.unwrap();

        assert_eq!(controller.session().seconds_remaining, 240);
        assert_eq!(controller.store().snapshot().unwrap().seconds_remaining, 240);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkpoint_past_anchor_finishes() {
        let (mut controller, _rx) = create_controller(10);
        controller.start().unwrap();
        controller.anchor(1000).unwrap();

        let outcome = run_ticks(&mut controller, || 5000, std::future::pending())
            .await
            .unwrap();

        assert_eq!(outcome, TickOutcome::Finished);
        assert_eq!(controller.state(), TimerState::Stopped);
        assert_eq!(controller.scheduler().armed(), None);
    }
}
