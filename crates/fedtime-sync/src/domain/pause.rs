//! Pause Points
//!
//! A named list of sync points interpreted as run-control commands. Any
//! achieved point freezes the federate; clearing an achieved point whose
//! label starts with `stop`, `restart` or `reconfig_` requests exit,
//! restart or reconfiguration.
//!
//! ```text
//!   Unknown ──begin──► Run ◄──resume── Freeze
//!                       │                ▲
//!                       └──any ACHIEVED──┘
//!   Freeze ──clear "stop*"──► Exit   "restart*" ► Restart   "reconfig_x" ► Reconfig(x)
//! ```

use std::fmt;
use std::fmt::Write as _;

use tracing::{debug, info};

use crate::domain::rendezvous::{RtiAmbassador, SyncPntManager};
use crate::domain::sync::SyncPntState;

/// Run-control state derived from the pause list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PausePointState {
    /// Run-control failure.
    Error,
    /// A pause request is in flight.
    Pending,
    /// A pause request was acknowledged by the federation.
    Acknowledged,
    /// Running.
    Run,
    /// Exit requested.
    Exit,
    /// Restart requested.
    Restart,
    /// Reconfiguration requested, with the configuration name.
    Reconfig(String),
    /// Not started.
    #[default]
    Unknown,
    /// Paused at an achieved pause point.
    Freeze,
}

impl PausePointState {
    /// Diagnostic name, e.g. `PAUSE_POINT_STATE_FREEZE`.
    pub fn name(&self) -> &'static str {
        match self {
            PausePointState::Error => "PAUSE_POINT_STATE_ERROR",
            PausePointState::Pending => "PAUSE_POINT_STATE_PENDING",
            PausePointState::Acknowledged => "PAUSE_POINT_STATE_ACKNOWLEDGED",
            PausePointState::Run => "PAUSE_POINT_STATE_RUN",
            PausePointState::Exit => "PAUSE_POINT_STATE_EXIT",
            PausePointState::Restart => "PAUSE_POINT_STATE_RESTART",
            PausePointState::Reconfig(_) => "PAUSE_POINT_STATE_RECONFIG",
            PausePointState::Unknown => "PAUSE_POINT_STATE_UNKNOWN",
            PausePointState::Freeze => "PAUSE_POINT_STATE_FREEZE",
        }
    }

    /// Exit, restart and reconfig end the run; nothing overrides them.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PausePointState::Exit | PausePointState::Restart | PausePointState::Reconfig(_)
        )
    }
}

impl fmt::Display for PausePointState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PausePointState::Reconfig(name) if !name.is_empty() => write!(f, "{} ({name})", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

/// Run-control view over one sync-point list.
#[derive(Debug, Clone)]
pub struct PausePointList {
    list_name: String,
    state: PausePointState,
}

impl PausePointList {
    /// Pause list bound to `list_name`, in `Unknown`.
    pub fn new(list_name: impl Into<String>) -> Self {
        Self {
            list_name: list_name.into(),
            state: PausePointState::Unknown,
        }
    }

    /// Sync-point list this view interprets.
    pub fn list_name(&self) -> &str {
        &self.list_name
    }

    /// Current run-control state.
    pub fn state(&self) -> &PausePointState {
        &self.state
    }

    /// True while frozen at a pause point.
    pub fn is_frozen(&self) -> bool {
        self.state == PausePointState::Freeze
    }

    /// Set the state directly (pending / acknowledged bookkeeping by the
    /// host's execution control).
    pub fn set_state(&mut self, state: PausePointState) {
        if state != self.state {
            debug!(list = %self.list_name, from = %self.state, to = %state, "pause state change");
            self.state = state;
        }
    }

    /// Unknown → Run at execution start.
    pub fn begin(&mut self) {
        if self.state == PausePointState::Unknown {
            self.set_state(PausePointState::Run);
        }
    }

    /// Re-derive the state from the list: any ACHIEVED point → Freeze;
    /// otherwise Run, unless frozen, not started or terminal.
    pub fn check_state<R: RtiAmbassador>(&mut self, manager: &SyncPntManager<R>) -> &PausePointState {
        if self.state.is_terminal() {
            return &self.state;
        }
        let any_achieved = manager
            .get_sync_point_list(&self.list_name)
            .iter()
            .any(|p| p.state() == SyncPntState::Achieved);
        if any_achieved {
            if self.state != PausePointState::Freeze {
                info!(list = %self.list_name, "⏸️ pause point reached; freezing");
            }
            self.set_state(PausePointState::Freeze);
        } else if !matches!(self.state, PausePointState::Freeze | PausePointState::Unknown) {
            self.set_state(PausePointState::Run);
        }
        &self.state
    }

    /// Remove an ACHIEVED point of this list and apply its command.
    /// Returns `false` if the label is not an achieved point of this list.
    pub fn clear_sync_point<R: RtiAmbassador>(&mut self, manager: &mut SyncPntManager<R>, label: &str) -> bool {
        if manager.list_of(label) != Some(self.list_name.as_str()) {
            return false;
        }
        if manager.clear_sync_point(label).is_none() {
            return false;
        }

        if label.starts_with("stop") {
            self.set_state(PausePointState::Exit);
        } else if label.starts_with("restart") {
            self.set_state(PausePointState::Restart);
        } else if label.starts_with("reconfig") {
            let name = label.get(9..).unwrap_or_default().to_owned();
            self.set_state(PausePointState::Reconfig(name));
        }
        info!(list = %self.list_name, label, state = %self.state, "pause point cleared");
        true
    }

    /// Freeze → Run once no achieved point remains in the list.
    pub fn resume<R: RtiAmbassador>(&mut self, manager: &SyncPntManager<R>) -> bool {
        if self.state != PausePointState::Freeze {
            return false;
        }
        let still_achieved = manager
            .get_sync_point_list(&self.list_name)
            .iter()
            .any(|p| p.state() == SyncPntState::Achieved);
        if still_achieved {
            return false;
        }
        info!(list = %self.list_name, "▶️ resuming from pause");
        self.set_state(PausePointState::Run);
        true
    }

    /// Multi-line rendering of the state and the list's points.
    pub fn render<R: RtiAmbassador>(&self, manager: &SyncPntManager<R>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Pause Points ({})", self.list_name);
        let _ = writeln!(out, "  state: {}", self.state);
        for point in manager.get_sync_point_list(&self.list_name) {
            let _ = writeln!(out, "  {point}");
        }
        out
    }
}
