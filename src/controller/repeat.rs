//! Auto-repeat scheduling.
//!
//! One [`CommandRepeater`] serves every controller built against it. Pending
//! entries are keyed by (controller, command); the worker task sleeps toward the
//! nearest due time (bounded, so a vanished handle is noticed promptly), wakes
//! early whenever the pending set changes, and re-fires due commands through
//! their controllers at the controller's configured cadence.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::command::InputCommand;
use super::controller::{ControllerId, ControllerInner, InputController};

/// Upper bound on one worker sleep slice.
const MAX_SLEEP: Duration = Duration::from_millis(50);

/// Entries due within this window are fired in the current pass instead of
/// scheduling one more micro-sleep.
const DUE_LOOKAHEAD: Duration = Duration::from_millis(3);

struct ScheduledRepeat {
    controller_id: ControllerId,
    controller: Weak<ControllerInner>,
    command: InputCommand,
    due_at: Instant,
}

impl ScheduledRepeat {
    fn matches(&self, controller_id: ControllerId, command: &InputCommand) -> bool {
        self.controller_id == controller_id && self.command == *command
    }
}

struct RepeaterShared {
    pending: Mutex<Vec<ScheduledRepeat>>,
    changed: Notify,
}

/// The auto-repeat scheduler service.
///
/// Constructed once at the application's composition root and handed to each
/// controller; cloning yields another handle onto the same scheduler. The
/// worker task is spawned on construction and ends on its own once the last
/// handle is dropped.
#[derive(Clone)]
pub struct CommandRepeater {
    shared: Arc<RepeaterShared>,
}

impl CommandRepeater {
    /// Must be called within a tokio runtime context.
    pub fn new() -> Self {
        let shared = Arc::new(RepeaterShared {
            pending: Mutex::new(Vec::new()),
            changed: Notify::new(),
        });
        tokio::spawn(run_repeat_loop(Arc::downgrade(&shared)));
        Self { shared }
    }

    /// Schedules the first repeat of a freshly fired command after the
    /// controller's initial delay. A no-op when the entry already exists.
    pub(crate) fn schedule(&self, controller: &InputController, command: &InputCommand) {
        let controller_id = controller.id();
        let mut pending = self.shared.pending.lock().expect("pending set poisoned");
        if pending
            .iter()
            .any(|entry| entry.matches(controller_id, command))
        {
            return;
        }
        trace!(command = command.identifier(), "auto-repeat scheduled");
        pending.push(ScheduledRepeat {
            controller_id,
            controller: controller.downgrade(),
            command: command.clone(),
            due_at: Instant::now() + controller.auto_repeat_initial_delay(),
        });
        drop(pending);
        self.shared.changed.notify_one();
    }

    /// Cancels the pending repeat of one command, if any.
    pub(crate) fn cancel(&self, controller_id: ControllerId, command: &InputCommand) {
        let mut pending = self.shared.pending.lock().expect("pending set poisoned");
        let before = pending.len();
        pending.retain(|entry| !entry.matches(controller_id, command));
        let removed = pending.len() != before;
        drop(pending);
        if removed {
            trace!(command = command.identifier(), "auto-repeat cancelled");
            self.shared.changed.notify_one();
        }
    }
}

impl Default for CommandRepeater {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandRepeater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pending = self.shared.pending.lock().expect("pending set poisoned");
        f.debug_struct("CommandRepeater")
            .field("pending", &pending.len())
            .finish()
    }
}

async fn run_repeat_loop(shared: Weak<RepeaterShared>) {
    debug!("auto-repeat scheduler started");
    loop {
        let Some(live) = shared.upgrade() else {
            break;
        };

        let now = Instant::now();
        let due: Vec<(ControllerId, Weak<ControllerInner>, InputCommand)> = {
            let pending = live.pending.lock().expect("pending set poisoned");
            pending
                .iter()
                .filter(|entry| entry.due_at <= now + DUE_LOOKAHEAD)
                .map(|entry| {
                    (
                        entry.controller_id,
                        entry.controller.clone(),
                        entry.command.clone(),
                    )
                })
                .collect()
        };

        for (controller_id, weak_controller, command) in due {
            let Some(inner) = weak_controller.upgrade() else {
                live.pending
                    .lock()
                    .expect("pending set poisoned")
                    .retain(|entry| !entry.matches(controller_id, &command));
                continue;
            };
            // A release may have cancelled the entry since it was collected.
            let still_pending = live
                .pending
                .lock()
                .expect("pending set poisoned")
                .iter()
                .any(|entry| entry.matches(controller_id, &command));
            if !still_pending {
                continue;
            }
            let controller = InputController::from_inner(inner);
            controller.fire_command_repeat(&command);
            let next_due = Instant::now() + controller.auto_repeat_delay();
            let mut pending = live.pending.lock().expect("pending set poisoned");
            if let Some(entry) = pending
                .iter_mut()
                .find(|entry| entry.matches(controller_id, &command))
            {
                entry.due_at = next_due;
            }
        }

        let sleep_for = {
            let pending = live.pending.lock().expect("pending set poisoned");
            let now = Instant::now();
            pending
                .iter()
                .map(|entry| entry.due_at.duration_since(now))
                .min()
                .unwrap_or(MAX_SLEEP)
                .min(MAX_SLEEP)
        };
        tokio::select! {
            _ = tokio::time::sleep(sleep_for) => {}
            _ = live.changed.notified() => {}
        }
        drop(live);
    }
    debug!("auto-repeat scheduler stopped");
}
