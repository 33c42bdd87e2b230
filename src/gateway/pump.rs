//! The background event pump.
//!
//! A statum state machine with a create/run lifecycle:
//!
//! ```text
//! Initializing ──► Dispatching ──► (cooperative stop)
//! ```
//!
//! The pump polls the gateway's event source at a bounded rate, orders each
//! polled batch by creation timestamp, drops events at or before the previous
//! cycle's high-water mark (a poll racing a rescan can read the same events
//! twice) and hands the remainder to the gateway for fan-out. After each cycle it
//! sleeps for whatever remains of the cycle period, so a slow cycle is never
//! compounded by a full-length sleep.

use chrono::{DateTime, Local};
use statum::{machine, state};
use std::sync::Weak;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use super::GatewayShared;
use crate::device::InputEvent;

/// Poll ceiling for the pump loop.
const POLLS_PER_SECOND_LIMIT: u64 = 250;

#[state]
#[derive(Debug, Clone)]
pub enum PumpState {
    Initializing,
    Dispatching,
}

#[machine]
pub struct EventPump<S: PumpState> {
    gateway: Weak<GatewayShared>,
    cycle_period: Duration,
    last_scan: Option<Instant>,
    high_water: Option<DateTime<Local>>,
}

impl EventPump<Initializing> {
    pub fn create(gateway: Weak<GatewayShared>) -> Self {
        Self::new(
            gateway,
            Duration::from_millis(1000 / POLLS_PER_SECOND_LIMIT),
            None,
            None,
        )
    }

    pub fn arm(self) -> EventPump<Dispatching> {
        self.transition()
    }
}

impl EventPump<Dispatching> {
    /// Runs until cancelled or until the owning gateway is dropped. The stop is
    /// cooperative, checked once per cycle.
    pub async fn run(&mut self, cancel: CancellationToken) {
        info!("input event pump started");
        loop {
            if cancel.is_cancelled() {
                break;
            }
            let cycle_start = Instant::now();
            let Some(shared) = self.gateway.upgrade() else {
                debug!("gateway dropped, pump exiting");
                break;
            };
            self.cycle(&shared);
            drop(shared);

            let idle = self.cycle_period.saturating_sub(cycle_start.elapsed());
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(idle) => {}
            }
        }
        info!("input event pump stopped");
    }

    fn cycle(&mut self, shared: &GatewayShared) {
        if shared.is_scan_mode() {
            let interval = shared.scan_interval();
            let due = self.last_scan.is_none_or(|at| at.elapsed() >= interval);
            if due {
                if let Some(source) = shared.source() {
                    debug!("periodic device rescan");
                    source.rescan();
                }
                self.last_scan = Some(Instant::now());
            }
        }

        let polled = shared.poll_source();
        if polled.is_empty() {
            return;
        }
        let (ordered, high_water) = order_and_filter(polled, self.high_water);
        self.high_water = high_water;
        for event in &ordered {
            trace!(%event, "dispatching input event");
            shared.dispatch_event(event);
        }
    }
}

/// Sorts a polled batch by creation timestamp and drops events at or before the
/// previous cycle's high-water mark. Events sharing a timestamp within one batch
/// all survive; the mark only guards across cycles.
fn order_and_filter(
    mut events: Vec<InputEvent>,
    high_water: Option<DateTime<Local>>,
) -> (Vec<InputEvent>, Option<DateTime<Local>>) {
    events.sort_by_key(|event| event.timestamp());
    if let Some(mark) = high_water {
        events.retain(|event| event.timestamp() > mark);
    }
    let mark = events.last().map(|event| event.timestamp()).or(high_water);
    (events, mark)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceKind, InputDevice, InputSpec};
    use chrono::TimeDelta;

    fn axis_events(offsets_ms: &[i64]) -> Vec<InputEvent> {
        let device = InputDevice::new(
            "Pad",
            DeviceKind::Gamepad,
            vec![InputSpec::analog_axis("axis.x", "X")],
        );
        let input = device.input_with_identifier("axis.x").unwrap();
        let base = Local::now();
        offsets_ms
            .iter()
            .map(|ms| {
                InputEvent::at(
                    input.clone(),
                    0.5,
                    base + TimeDelta::milliseconds(*ms),
                )
            })
            .collect()
    }

    #[test]
    fn batches_are_ordered_by_timestamp() {
        let events = axis_events(&[30, 10, 20]);
        let (ordered, mark) = order_and_filter(events, None);
        let stamps: Vec<_> = ordered.iter().map(|e| e.timestamp()).collect();
        let mut sorted = stamps.clone();
        sorted.sort();
        assert_eq!(stamps, sorted);
        assert_eq!(mark, Some(stamps[2]));
    }

    #[test]
    fn events_at_or_before_the_mark_are_dropped() {
        let events = axis_events(&[0, 10, 20]);
        let (first_pass, mark) = order_and_filter(events.clone(), None);
        assert_eq!(first_pass.len(), 3);

        // A re-read of the same events plus one genuinely new event.
        let fresh = InputEvent::at(
            events[2].input().clone(),
            0.7,
            events[2].timestamp() + TimeDelta::milliseconds(15),
        );
        let mut second = events;
        second.push(fresh);
        let (second_pass, _) = order_and_filter(second, mark);
        assert_eq!(second_pass.len(), 1);
        assert!((second_pass[0].value() - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn equal_timestamps_within_one_batch_all_deliver() {
        let events = axis_events(&[5, 5, 5]);
        let (ordered, _) = order_and_filter(events, None);
        assert_eq!(ordered.len(), 3);
    }
}
