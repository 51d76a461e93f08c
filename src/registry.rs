use std::sync::{Mutex, MutexGuard, PoisonError};

use hashbrown::HashMap;
use log::trace;

use crate::host::{Hwnd, Menu16, NarrowProc};
use crate::message::{DWL_DLGPROC, DWL_MSGRESULT, MSG_RESULT_UNSET};
use crate::style::DialogStyle;

/// Identifies a staged [`InitWrapper`]. Travels as the creation parameter of the native dialog
/// and comes back as the `lParam` of `WM_INITDIALOG`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InitToken(pub isize);

/// What the relay needs at `WM_INITDIALOG` that the native creation call cannot carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitWrapper {
    /// Creation parameter the narrow caller supplied.
    pub param: i32,
    /// Explicit narrow procedure. When absent the class default procedure is used.
    pub proc: Option<NarrowProc>,
    pub menu: Option<Menu16>,
    /// Style of the decoded template.
    pub style: DialogStyle,
}

#[derive(Debug, Default)]
struct RegistryState {
    bindings: HashMap<Hwnd, NarrowProc>,
    /// Result slots of windows that have been dispatched to. `None` until a handler writes
    /// `DWL_MSGRESULT` during the current dispatch.
    slots: HashMap<Hwnd, Option<i32>>,
    staged: HashMap<InitToken, InitWrapper>,
    last_token: isize,
}

/// Window → narrow procedure bindings, their result slots, and init wrappers waiting for their
/// dialog.
///
/// Every method takes the lock for its own duration only, so the registry can be used from
/// inside a narrow handler that is itself being dispatched.
#[derive(Debug, Default)]
pub struct ProcRegistry {
    state: Mutex<RegistryState>,
}

impl ProcRegistry {
    pub fn new() -> Self {
        ProcRegistry::default()
    }

    fn state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `wrapper` until its dialog receives `WM_INITDIALOG`.
    pub fn stage(&self, wrapper: InitWrapper) -> InitToken {
        let mut state = self.state();
        state.last_token = state.last_token.wrapping_add(1).max(1);
        let token = InitToken(state.last_token);
        state.staged.insert(token, wrapper);
        trace!("staged init wrapper {token:?}: {wrapper:?}");
        token
    }

    pub fn take_staged(&self, token: InitToken) -> Option<InitWrapper> {
        self.state().staged.remove(&token)
    }

    pub fn is_staged(&self, token: InitToken) -> bool {
        self.state().staged.contains_key(&token)
    }

    /// Binds `proc` to `hwnd`, returning the procedure it replaces.
    pub fn bind(&self, hwnd: Hwnd, proc: NarrowProc) -> Option<NarrowProc> {
        trace!("binding {hwnd:?} to {proc:?}");
        self.state().bindings.insert(hwnd, proc)
    }

    /// Removes the binding and the result slot of `hwnd`.
    pub fn unbind(&self, hwnd: Hwnd) -> Option<NarrowProc> {
        let mut state = self.state();
        state.slots.remove(&hwnd);
        state.bindings.remove(&hwnd)
    }

    pub fn proc_for(&self, hwnd: Hwnd) -> Option<NarrowProc> {
        self.state().bindings.get(&hwnd).copied()
    }

    /// Clears the result slot of `hwnd` before a dispatch.
    pub fn arm(&self, hwnd: Hwnd) {
        self.state().slots.insert(hwnd, None);
    }

    /// The value written to the result slot since it was last armed.
    pub fn msg_result(&self, hwnd: Hwnd) -> Option<i32> {
        self.state().slots.get(&hwnd).copied().flatten()
    }

    /// Narrow-side read of a dialog window long.
    ///
    /// `None` for windows the registry knows nothing about and for indexes it does not own.
    pub fn get_window_long16(&self, hwnd: Hwnd, index: i16) -> Option<i32> {
        let state = self.state();
        match index {
            DWL_MSGRESULT => match state.slots.get(&hwnd) {
                Some(slot) => Some(slot.unwrap_or(MSG_RESULT_UNSET)),
                None => state
                    .bindings
                    .contains_key(&hwnd)
                    .then_some(MSG_RESULT_UNSET),
            },
            DWL_DLGPROC => state.bindings.get(&hwnd).map(|proc| proc.0 as i32),
            _ => None,
        }
    }

    /// Narrow-side write of a dialog window long, returning the previous value.
    ///
    /// A write to `DWL_MSGRESULT` marks the slot as written even when `value` equals
    /// [`MSG_RESULT_UNSET`]. Writing `DWL_DLGPROC` rebinds the window.
    pub fn set_window_long16(&self, hwnd: Hwnd, index: i16, value: i32) -> Option<i32> {
        let mut state = self.state();
        match index {
            DWL_MSGRESULT => {
                if !state.slots.contains_key(&hwnd) && !state.bindings.contains_key(&hwnd) {
                    return None;
                }
                let previous = state.slots.insert(hwnd, Some(value)).flatten();
                Some(previous.unwrap_or(MSG_RESULT_UNSET))
            }
            DWL_DLGPROC => {
                let previous = state.bindings.insert(hwnd, NarrowProc(value as u32));
                Some(previous.map_or(0, |proc| proc.0 as i32))
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.state().bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
