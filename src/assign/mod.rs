//! Guided command assignment.
//!
//! An [`InteractiveAssignment`] session walks a user through binding every
//! command of one or more command groups to physical inputs, using the
//! [tuner](crate::tuner) for discovery:
//!
//! ```text
//! tuner ──(event, tuning range)──► session cursor ──► assignment table
//!                                      │                   │
//!                            auto-advance to next      device lock,
//!                            unassigned command        group exclusivity
//! ```
//!
//! The cursor ranges over the unique commands (deduplicated across groups,
//! order preserved) plus an *end* pseudo-position for submit/cancel. The first
//! accepted assignment locks the session to that device; within each group
//! every member must be bound to a distinct physical input, while commands
//! never sharing a group may reuse one. The finished session builds a
//! [`ControllerConfiguration`] with one context per group.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, info, warn};

use crate::controller::{
    CommandBinding, ContextConfiguration, ControllerConfiguration, ControllerKind,
    GatedInputSelector, InputCommand, InputCommandGroup,
};
use crate::device::range::ensure_valid_sensitivity;
use crate::device::{DeviceFilter, InputEvent, InputFilter, InputValueRange, RangeError};
use crate::gateway::InputEventGateway;
use crate::listeners::ListenerList;
use crate::tuner::{InputTuner, TunerListener, DEFAULT_ANALOG_SENSITIVITY};

/// Placeholder until the host names the controller.
const INITIAL_CONTROLLER_NAME: &str = "$name";

/// Placeholder until the first assignment locks a device.
const INITIAL_DEVICE_IDENTIFIER: &str = "$device";

/// Which commands must be assigned before the session may submit.
#[derive(Clone)]
pub struct RequiredCommands(Arc<dyn Fn(&InputCommand) -> bool + Send + Sync>);

impl RequiredCommands {
    pub fn require_all() -> Self {
        Self(Arc::new(|_| true))
    }

    pub fn require_none() -> Self {
        Self(Arc::new(|_| false))
    }

    /// Requires exactly the commands with the given identifiers.
    pub fn from_identifiers(identifiers: impl IntoIterator<Item = String>) -> Self {
        let required: std::collections::HashSet<String> = identifiers.into_iter().collect();
        Self(Arc::new(move |command| {
            required.contains(command.identifier())
        }))
    }

    pub fn custom(predicate: impl Fn(&InputCommand) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    pub fn is_required(&self, command: &InputCommand) -> bool {
        (self.0)(command)
    }
}

impl Default for RequiredCommands {
    fn default() -> Self {
        Self::require_all()
    }
}

impl std::fmt::Debug for RequiredCommands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RequiredCommands(..)")
    }
}

/// Receives assignment session notifications. All methods default to no-ops.
pub trait AssignmentListener: Send + Sync {
    fn current_command_changed(&self, _session: &InteractiveAssignment) {}

    fn device_assigned(&self, _session: &InteractiveAssignment, _device_identifier: &str) {}

    fn command_assigned(&self, _session: &InteractiveAssignment, _command: &InputCommand) {}

    fn assignments_changed(&self, _session: &InteractiveAssignment) {}

    fn assignments_submitted(&self, _session: &InteractiveAssignment) {}
}

struct AssignState {
    /// Cursor over `[0, unique_commands.len()]`; the top value is the end
    /// pseudo-position.
    cursor: usize,
    assignments: HashMap<InputCommand, GatedInputSelector>,
    device_identifier: Option<String>,
}

struct AssignShared {
    gateway: InputEventGateway,
    command_groups: Vec<InputCommandGroup>,
    unique_commands: Vec<InputCommand>,
    device_filter: DeviceFilter,
    input_filter: InputFilter,
    required: Mutex<RequiredCommands>,
    controller_kind: Mutex<ControllerKind>,
    controller_name: Mutex<String>,
    sensitivity: Mutex<f32>,
    concurrent_firing: AtomicBool,
    fast_releasing: AtomicBool,
    listeners: ListenerList<dyn AssignmentListener>,
    state: Mutex<AssignState>,
    tuner: Mutex<Option<(InputTuner, Arc<dyn TunerListener>)>>,
    interaction_stopped: AtomicBool,
}

enum Notice {
    CurrentCommand,
    Device(String),
    Command(InputCommand),
    Assignments,
    Submitted,
}

/// A guided command-assignment session.
#[derive(Clone)]
pub struct InteractiveAssignment {
    shared: Arc<AssignShared>,
}

impl InteractiveAssignment {
    /// A session over `command_groups`, discovering inputs on devices accepted
    /// by `device_filter` and inputs accepted by `input_filter` (defaults:
    /// every device, the source's explicit-gesture inputs).
    pub fn new(
        gateway: &InputEventGateway,
        command_groups: Vec<InputCommandGroup>,
        device_filter: Option<DeviceFilter>,
        input_filter: Option<InputFilter>,
    ) -> Self {
        let mut unique_commands = Vec::new();
        for group in &command_groups {
            for command in group.members() {
                if !unique_commands.contains(command) {
                    unique_commands.push(command.clone());
                }
            }
        }
        let input_filter = input_filter.unwrap_or_else(|| gateway.user_gesture_filter());
        Self {
            shared: Arc::new(AssignShared {
                gateway: gateway.clone(),
                command_groups,
                unique_commands,
                device_filter: device_filter.unwrap_or_default(),
                input_filter,
                required: Mutex::new(RequiredCommands::require_all()),
                controller_kind: Mutex::new(ControllerKind::Gated),
                controller_name: Mutex::new(INITIAL_CONTROLLER_NAME.to_string()),
                sensitivity: Mutex::new(DEFAULT_ANALOG_SENSITIVITY),
                concurrent_firing: AtomicBool::new(true),
                fast_releasing: AtomicBool::new(true),
                listeners: ListenerList::new(),
                state: Mutex::new(AssignState {
                    cursor: 0,
                    assignments: HashMap::new(),
                    device_identifier: None,
                }),
                tuner: Mutex::new(None),
                interaction_stopped: AtomicBool::new(true),
            }),
        }
    }

    fn from_shared(shared: Arc<AssignShared>) -> Self {
        Self { shared }
    }

    // --- session configuration -------------------------------------------

    pub fn with_required(self, required: RequiredCommands) -> Self {
        *self.shared.required.lock().expect("required poisoned") = required;
        self
    }

    pub fn with_controller_kind(self, kind: ControllerKind) -> Self {
        *self
            .shared
            .controller_kind
            .lock()
            .expect("kind poisoned") = kind;
        self
    }

    pub fn with_controller_name(self, name: impl Into<String>) -> Self {
        *self
            .shared
            .controller_name
            .lock()
            .expect("name poisoned") = name.into();
        self
    }

    pub fn set_concurrent_firing(&self, enabled: bool) {
        self.shared
            .concurrent_firing
            .store(enabled, Ordering::Relaxed);
    }

    pub fn set_fast_releasing(&self, enabled: bool) {
        self.shared.fast_releasing.store(enabled, Ordering::Relaxed);
    }

    pub fn add_listener(&self, listener: Arc<dyn AssignmentListener>) {
        self.shared.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn AssignmentListener>) {
        self.shared.listeners.remove(listener);
    }

    // --- lifecycle --------------------------------------------------------

    /// Opens the discovery tuner and starts reacting to gestures. While no
    /// assignment has locked a device yet, periodic device scanning is on so a
    /// controller plugged in mid-session is picked up.
    ///
    /// Must be called within a tokio runtime context.
    pub fn start_interaction(&self) {
        if !self
            .shared
            .interaction_stopped
            .swap(false, Ordering::SeqCst)
        {
            return;
        }
        let tuner = InputTuner::with_filters(
            &self.shared.gateway,
            self.shared.device_filter.clone(),
            self.shared.input_filter.clone(),
        );
        if let Err(error) = tuner.set_analog_sensitivity(self.analog_sensitivity()) {
            warn!(%error, "keeping tuner default sensitivity");
        }
        let tap: Arc<dyn TunerListener> = Arc::new(AssignTunerTap {
            session: Arc::downgrade(&self.shared),
        });
        tuner.add_listener(tap.clone());
        tuner.start_tuning(true);
        *self.shared.tuner.lock().expect("tuner slot poisoned") = Some((tuner, tap));
        self.shared.gateway.rescan();
        self.update_scan_mode();
        info!("interactive assignment started");
        self.fire(vec![Notice::CurrentCommand]);
    }

    /// Closes the tuner; the assignment table and cursor survive, so a session
    /// can be resumed with [`start_interaction`](Self::start_interaction).
    pub fn stop_interaction(&self) {
        if self
            .shared
            .interaction_stopped
            .swap(true, Ordering::SeqCst)
        {
            return;
        }
        if let Some((tuner, tap)) = self.shared.tuner.lock().expect("tuner slot poisoned").take() {
            tuner.remove_listener(&tap);
            tuner.stop_tuning();
        }
        self.update_scan_mode();
        info!("interactive assignment stopped");
    }

    pub fn is_interaction_stopped(&self) -> bool {
        self.shared.interaction_stopped.load(Ordering::SeqCst)
    }

    // --- cursor -----------------------------------------------------------

    pub fn unique_commands(&self) -> &[InputCommand] {
        &self.shared.unique_commands
    }

    fn command_count(&self) -> usize {
        self.shared.unique_commands.len()
    }

    pub fn current_command(&self) -> Option<InputCommand> {
        let state = self.shared.state.lock().expect("state poisoned");
        self.shared.unique_commands.get(state.cursor).cloned()
    }

    pub fn is_at_end(&self) -> bool {
        let state = self.shared.state.lock().expect("state poisoned");
        state.cursor == self.command_count()
    }

    fn move_to_index(&self, index: usize) {
        let changed = {
            let mut state = self.shared.state.lock().expect("state poisoned");
            let clamped = index.min(self.command_count());
            if state.cursor == clamped {
                false
            } else {
                state.cursor = clamped;
                true
            }
        };
        if changed {
            self.fire(vec![Notice::CurrentCommand]);
        }
    }

    pub fn move_to_command(&self, command: &InputCommand) {
        if let Some(index) = self
            .shared
            .unique_commands
            .iter()
            .position(|known| known == command)
        {
            self.move_to_index(index);
        }
    }

    pub fn move_to_first_command(&self) {
        self.move_to_index(0);
    }

    pub fn move_to_last_command(&self) {
        self.move_to_index(self.command_count().saturating_sub(1));
    }

    pub fn move_to_end(&self) {
        self.move_to_index(self.command_count());
    }

    pub fn move_to_next_command(&self) {
        let cursor = self.shared.state.lock().expect("state poisoned").cursor;
        self.move_to_index((cursor + 1).min(self.command_count()));
    }

    pub fn move_to_previous_command(&self) {
        let cursor = self.shared.state.lock().expect("state poisoned").cursor;
        self.move_to_index(cursor.saturating_sub(1));
    }

    /// Advances cyclically; the end position is only reachable once every
    /// required command is assigned.
    pub fn roll_to_next_command(&self) {
        if self.is_at_end() {
            self.move_to_first_command();
        } else {
            let cursor = self.shared.state.lock().expect("state poisoned").cursor;
            if cursor + 1 == self.command_count() {
                if self.is_every_required_command_assigned() {
                    self.move_to_end();
                } else {
                    self.move_to_first_command();
                }
            } else {
                self.move_to_next_command();
            }
        }
    }

    pub fn roll_to_previous_command(&self) {
        let cursor = self.shared.state.lock().expect("state poisoned").cursor;
        if cursor == 0 {
            if self.is_every_required_command_assigned() {
                self.move_to_end();
            } else {
                self.move_to_last_command();
            }
        } else {
            self.move_to_previous_command();
        }
    }

    /// Scans forward cyclically for the next command lacking an assignment.
    pub fn roll_to_next_unassigned_command(&self) {
        if self.is_every_command_assigned() {
            return;
        }
        let target = {
            let state = self.shared.state.lock().expect("state poisoned");
            let n = self.command_count();
            let start = state.cursor;
            let mut offset = 0;
            while offset < n
                && state
                    .assignments
                    .contains_key(&self.shared.unique_commands[(start + offset) % n])
            {
                offset += 1;
            }
            (start + offset) % n
        };
        self.move_to_index(target);
    }

    // --- assignments ------------------------------------------------------

    pub fn is_command_assigned(&self, command: &InputCommand) -> bool {
        self.shared
            .state
            .lock()
            .expect("state poisoned")
            .assignments
            .contains_key(command)
    }

    pub fn assignment_of(&self, command: &InputCommand) -> Option<GatedInputSelector> {
        self.shared
            .state
            .lock()
            .expect("state poisoned")
            .assignments
            .get(command)
            .cloned()
    }

    pub fn has_assignments(&self) -> bool {
        !self
            .shared
            .state
            .lock()
            .expect("state poisoned")
            .assignments
            .is_empty()
    }

    pub fn is_every_command_assigned(&self) -> bool {
        let state = self.shared.state.lock().expect("state poisoned");
        state.assignments.len() == self.command_count()
    }

    pub fn is_command_required(&self, command: &InputCommand) -> bool {
        self.shared
            .required
            .lock()
            .expect("required poisoned")
            .is_required(command)
    }

    pub fn is_every_required_command_assigned(&self) -> bool {
        let state = self.shared.state.lock().expect("state poisoned");
        let required = self.shared.required.lock().expect("required poisoned");
        self.shared
            .unique_commands
            .iter()
            .all(|command| !required.is_required(command) || state.assignments.contains_key(command))
    }

    /// The device the session locked onto with its first assignment.
    pub fn device_identifier(&self) -> Option<String> {
        self.shared
            .state
            .lock()
            .expect("state poisoned")
            .device_identifier
            .clone()
    }

    /// Every command sharing at least one group with `command`, itself excluded.
    pub fn fellow_group_members(&self, command: &InputCommand) -> Vec<InputCommand> {
        let mut fellows = Vec::new();
        for group in &self.shared.command_groups {
            if group.has_member(command) {
                for member in group.members() {
                    if member != command && !fellows.contains(member) {
                        fellows.push(member.clone());
                    }
                }
            }
        }
        fellows
    }

    /// Proposes `selector` for the current command. Returns whether it was
    /// accepted; on acceptance the cursor auto-advances to the next unassigned
    /// command, or to the end position when the walk is complete.
    pub fn propose_assignment(&self, selector: GatedInputSelector) -> bool {
        let Some(command) = self.current_command() else {
            return false;
        };
        if !self.assign(&command, selector, false) {
            return false;
        }
        if !self.is_every_command_assigned() {
            self.roll_to_next_unassigned_command();
        } else {
            let cursor = self.shared.state.lock().expect("state poisoned").cursor;
            if cursor + 1 == self.command_count() {
                self.move_to_end();
            }
            // Otherwise stay in place.
        }
        true
    }

    /// Tuner entry point: converts the tuned gesture into a selector proposal
    /// and re-arms the silence debounce after an accepted capture.
    pub fn handle_tuned_input(&self, event: &InputEvent, tuning_range: InputValueRange) {
        if self.is_at_end() {
            return;
        }
        let selector = GatedInputSelector::for_event(event, tuning_range);
        if self.propose_assignment(selector) {
            let tuner = self
                .shared
                .tuner
                .lock()
                .expect("tuner slot poisoned")
                .as_ref()
                .map(|(tuner, _)| tuner.clone());
            if let Some(tuner) = tuner {
                tuner.wait_for_silence();
            }
        }
    }

    fn assign(
        &self,
        command: &InputCommand,
        selector: GatedInputSelector,
        suppress_notifications: bool,
    ) -> bool {
        let mut notices = Vec::new();
        let accepted = {
            let mut state = self.shared.state.lock().expect("state poisoned");
            if !self.accepts_assignment(&state, command, &selector) {
                false
            } else {
                if state.assignments.is_empty() {
                    // First capture locks the session onto this device.
                    state.device_identifier = Some(selector.device_identifier().to_string());
                    if !suppress_notifications {
                        notices.push(Notice::Device(selector.device_identifier().to_string()));
                    }
                }
                debug!(
                    command = command.identifier(),
                    selector = %selector,
                    "command assigned"
                );
                state.assignments.insert(command.clone(), selector);
                if !suppress_notifications {
                    notices.push(Notice::Command(command.clone()));
                    notices.push(Notice::Assignments);
                }
                true
            }
        };
        if accepted {
            self.fire(notices);
            self.update_scan_mode();
        }
        accepted
    }

    fn accepts_assignment(
        &self,
        state: &AssignState,
        command: &InputCommand,
        selector: &GatedInputSelector,
    ) -> bool {
        if !self.shared.unique_commands.contains(command) {
            return false;
        }
        // The first accepted assignment fixes the device for the session.
        if let Some(device) = &state.device_identifier {
            if !state.assignments.is_empty() && selector.device_identifier() != device.as_str() {
                return false;
            }
        }
        if state.assignments.get(command) == Some(selector) {
            return false;
        }
        // Each participating group keeps physical inputs unique among fellows.
        for fellow in self.fellow_group_members(command) {
            if state.assignments.get(&fellow) == Some(selector) {
                return false;
            }
        }
        true
    }

    /// Clears the current command's assignment. When the last assignment goes,
    /// the device lock is released so a different device may be chosen next.
    pub fn clear_current_command_assignment(&self) {
        let Some(command) = self.current_command() else {
            return;
        };
        let cleared = {
            let mut state = self.shared.state.lock().expect("state poisoned");
            let removed = state.assignments.remove(&command).is_some();
            if removed && state.assignments.is_empty() {
                state.device_identifier = None;
            }
            removed
        };
        if cleared {
            self.fire(vec![Notice::Assignments]);
            self.update_scan_mode();
        }
    }

    fn clear_all_assignments(&self) {
        let cleared = {
            let mut state = self.shared.state.lock().expect("state poisoned");
            let had_any = !state.assignments.is_empty();
            state.assignments.clear();
            state.device_identifier = None;
            had_any
        };
        if cleared {
            self.fire(vec![Notice::Assignments]);
            self.update_scan_mode();
        }
    }

    /// Back to an empty table with the cursor on the first command.
    pub fn reset(&self) {
        self.clear_all_assignments();
        self.move_to_first_command();
    }

    /// Seeds the session from an existing configuration: assignments load with
    /// notifications suppressed, the analog sensitivity adapts to the first
    /// analog firing range encountered, and the cursor lands on the first
    /// command still unassigned.
    pub fn reset_to(&self, configuration: &ControllerConfiguration) {
        self.reset();
        *self
            .shared
            .controller_kind
            .lock()
            .expect("kind poisoned") = configuration.controller_kind;
        if !configuration.controller_name.is_empty() {
            *self
                .shared
                .controller_name
                .lock()
                .expect("name poisoned") = configuration.controller_name.clone();
        }
        self.set_concurrent_firing(configuration.concurrent_firing);
        self.set_fast_releasing(configuration.fast_releasing);

        let mut device_notified = false;
        let mut sensitivity_adopted = false;
        for context in &configuration.contexts {
            for binding in &context.commands {
                let selector = match binding.selector(&configuration.device_id) {
                    Ok(selector) => selector,
                    Err(error) => {
                        warn!(%error, command = binding.command_id.as_str(), "skipping binding");
                        continue;
                    }
                };
                let firing_range = selector.firing_range();
                if self.assign(&binding.command(), selector, true) {
                    if !device_notified {
                        if let Some(device) = self.device_identifier() {
                            self.fire(vec![Notice::Device(device)]);
                        }
                        device_notified = true;
                    }
                    if !sensitivity_adopted {
                        if let Some(sensitivity) = firing_range.analog_sensitivity() {
                            if let Err(error) = self.change_analog_sensitivity(sensitivity) {
                                warn!(%error, "could not adopt configured sensitivity");
                            }
                            sensitivity_adopted = true;
                        }
                    }
                }
            }
        }
        self.fire(vec![Notice::Assignments]);
        if !self.is_every_command_assigned() {
            self.roll_to_next_unassigned_command();
        }
    }

    // --- submit -----------------------------------------------------------

    /// Submission requires the end position, every required command assigned
    /// and the tuner out of its silence wait - the trailing signal of the last
    /// capture must not double as a submit gesture.
    pub fn can_submit(&self) -> bool {
        if self.is_interaction_stopped() || !self.is_at_end() {
            return false;
        }
        if !self.is_every_required_command_assigned() {
            return false;
        }
        let tuner_waiting = self
            .shared
            .tuner
            .lock()
            .expect("tuner slot poisoned")
            .as_ref()
            .is_some_and(|(tuner, _)| tuner.is_waiting_for_silence());
        !tuner_waiting
    }

    /// Fires the submitted notification when submission is currently allowed.
    pub fn submit(&self) -> bool {
        if !self.can_submit() {
            return false;
        }
        self.fire(vec![Notice::Submitted]);
        true
    }

    // --- sensitivity ------------------------------------------------------

    pub fn analog_sensitivity(&self) -> f32 {
        *self.shared.sensitivity.lock().expect("sensitivity poisoned")
    }

    /// Adjusts the analog sensitivity of the session: the tuner threshold and
    /// every analog assignment's firing range follow.
    pub fn change_analog_sensitivity(&self, sensitivity: f32) -> Result<(), RangeError> {
        ensure_valid_sensitivity(sensitivity)?;
        *self.shared.sensitivity.lock().expect("sensitivity poisoned") = sensitivity;
        if let Some((tuner, _)) = self
            .shared
            .tuner
            .lock()
            .expect("tuner slot poisoned")
            .as_ref()
        {
            tuner.set_analog_sensitivity(sensitivity)?;
        }
        let mut state = self.shared.state.lock().expect("state poisoned");
        for selector in state.assignments.values_mut() {
            let adjusted = selector.firing_range().with_analog_sensitivity(sensitivity)?;
            *selector = selector.with_firing_range(adjusted);
        }
        Ok(())
    }

    // --- building ---------------------------------------------------------

    pub fn controller_name(&self) -> String {
        self.shared
            .controller_name
            .lock()
            .expect("name poisoned")
            .clone()
    }

    pub fn controller_kind(&self) -> ControllerKind {
        *self
            .shared
            .controller_kind
            .lock()
            .expect("kind poisoned")
    }

    /// Builds the configuration: one context per command group, carrying the
    /// assigned members only.
    pub fn build(&self) -> ControllerConfiguration {
        let device_identifier = self
            .device_identifier()
            .unwrap_or_else(|| INITIAL_DEVICE_IDENTIFIER.to_string());
        let mut configuration = ControllerConfiguration::new(
            self.controller_kind(),
            self.controller_name(),
            device_identifier,
        );
        configuration.concurrent_firing = self.shared.concurrent_firing.load(Ordering::Relaxed);
        configuration.fast_releasing = self.shared.fast_releasing.load(Ordering::Relaxed);
        let state = self.shared.state.lock().expect("state poisoned");
        for group in &self.shared.command_groups {
            let mut context = ContextConfiguration::new(group.name());
            for command in group.members() {
                if let Some(selector) = state.assignments.get(command) {
                    context.commands.push(CommandBinding::new(command, selector));
                }
            }
            configuration.add_context(context);
        }
        configuration
    }

    // --- internals --------------------------------------------------------

    /// Scan for new devices only until an assignment pins one down.
    fn update_scan_mode(&self) {
        let scan = !self.is_interaction_stopped() && !self.has_assignments();
        self.shared.gateway.set_scan_mode(scan);
    }

    fn fire(&self, notices: Vec<Notice>) {
        if notices.is_empty() {
            return;
        }
        let listeners = self.shared.listeners.snapshot();
        for notice in notices {
            for listener in &listeners {
                match &notice {
                    Notice::CurrentCommand => listener.current_command_changed(self),
                    Notice::Device(device) => listener.device_assigned(self, device),
                    Notice::Command(command) => listener.command_assigned(self, command),
                    Notice::Assignments => listener.assignments_changed(self),
                    Notice::Submitted => listener.assignments_submitted(self),
                }
            }
        }
    }
}

impl std::fmt::Debug for InteractiveAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock().expect("state poisoned");
        f.debug_struct("InteractiveAssignment")
            .field("commands", &self.shared.unique_commands.len())
            .field("cursor", &state.cursor)
            .field("assignments", &state.assignments.len())
            .field("device", &state.device_identifier)
            .finish()
    }
}

struct AssignTunerTap {
    session: Weak<AssignShared>,
}

impl TunerListener for AssignTunerTap {
    fn tuned_input(&self, _tuner: &InputTuner, event: &InputEvent, tuning_range: InputValueRange) {
        if let Some(shared) = self.session.upgrade() {
            InteractiveAssignment::from_shared(shared).handle_tuned_input(event, tuning_range);
        }
    }
}
