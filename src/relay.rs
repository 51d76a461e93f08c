//! Native dialog and window procedures that forward to narrow-convention procedures.
//!
//! A dialog created by [`crate::lifecycle::DialogLifecycle`] starts out unbound. Its
//! `WM_INITDIALOG` carries an [`InitToken`] naming the staged [`InitWrapper`], from which the relay
//! binds the narrow procedure, attaches the menu and recovers the caller's creation parameter.
//! From then on every message is narrowed and forwarded, with the result-slot protocol applied,
//! until `WM_NCDESTROY` removes the binding.

use std::sync::Arc;

use log::{debug, trace, warn};

use crate::host::{DialogProc, Environment, Hwnd, NarrowProc};
use crate::message::{
    IDCANCEL, IDOK, NarrowMessage, WM_CLOSE, WM_COMMAND, WM_INITDIALOG, WM_NCDESTROY, loword,
};
use crate::registry::{InitToken, InitWrapper, ProcRegistry};
use crate::style::DialogStyle;
use crate::thunk::HeldThunkLock;

pub struct CallbackRelay<'e, E: Environment + ?Sized> {
    env: &'e E,
    registry: Arc<ProcRegistry>,
}

impl<'e, E: Environment + ?Sized> CallbackRelay<'e, E> {
    pub fn new(env: &'e E, registry: Arc<ProcRegistry>) -> Self {
        CallbackRelay { env, registry }
    }

    pub fn registry(&self) -> &Arc<ProcRegistry> {
        &self.registry
    }

    pub fn env(&self) -> &'e E {
        self.env
    }

    /// Replaces the narrow procedure of `hwnd`, returning the previous one.
    pub fn set_dialog_proc(&self, hwnd: Hwnd, proc: NarrowProc) -> Option<NarrowProc> {
        self.registry.bind(hwnd, proc)
    }

    /// Drops whatever the relay knows about `hwnd`.
    pub fn forget_window(&self, hwnd: Hwnd) {
        if let Some(proc) = self.registry.unbind(hwnd) {
            trace!("{hwnd:?}: forgot {proc:?}");
        }
    }

    /// Narrow code reading a window long of a dialog.
    pub fn get_window_long16(&self, hwnd: Hwnd, index: i16) -> Option<i32> {
        self.registry.get_window_long16(hwnd, index)
    }

    /// Narrow code writing a window long of a dialog.
    pub fn set_window_long16(&self, hwnd: Hwnd, index: i16, value: i32) -> Option<i32> {
        self.registry.set_window_long16(hwnd, index, value)
    }

    /// Window procedure for windows of the stand-in class.
    ///
    /// No result slot and no dialog default processing: the message goes to the bound procedure
    /// as is, or to the host's default window procedure when nothing is bound.
    pub fn window_proc(&self, hwnd: Hwnd, msg: u32, wparam: usize, lparam: isize) -> isize {
        let Some(proc) = self.registry.proc_for(hwnd) else {
            return self.env.def_window_proc(hwnd, msg, wparam, lparam);
        };

        let narrow = NarrowMessage::from_native(self.env, hwnd, msg, wparam, lparam);
        let result = self.invoke(proc, narrow) as isize;
        if msg == WM_NCDESTROY {
            self.forget_window(hwnd);
        }
        result
    }

    /// Runs `proc` for a message of `hwnd` with the result-slot protocol, whether or not `hwnd`
    /// is bound. Common-dialog hooks use this. The slot is dropped with `WM_NCDESTROY`.
    pub fn call_dialog_proc(
        &self,
        hwnd: Hwnd,
        msg: u32,
        wparam: usize,
        lparam: isize,
        proc: NarrowProc,
    ) -> isize {
        let narrow = NarrowMessage::from_native(self.env, hwnd, msg, wparam, lparam);
        let result = self.dispatch_dialog(hwnd, proc, narrow);
        if msg == WM_NCDESTROY {
            self.forget_window(hwnd);
        }
        result
    }

    fn invoke(&self, proc: NarrowProc, msg: NarrowMessage) -> i32 {
        let _lock = HeldThunkLock::new(self.env);
        self.env
            .call_proc16(proc, msg.hwnd, msg.msg, msg.wparam, msg.lparam)
    }

    /// Forwards with the result slot armed. The slot value, when written, is what the host sees
    /// as `DWL_MSGRESULT`; the direct return is what the dialog procedure returns.
    fn dispatch_dialog(&self, hwnd: Hwnd, proc: NarrowProc, msg: NarrowMessage) -> isize {
        self.registry.arm(hwnd);
        let direct = self.invoke(proc, msg);
        let reported = self.registry.msg_result(hwnd).unwrap_or(direct);
        trace!(
            "{hwnd:?}: msg {:#06x} returned {direct}, result {reported}",
            msg.msg
        );
        self.env.set_msg_result(hwnd, reported as isize);
        direct as isize
    }

    fn init_dialog(&self, hwnd: Hwnd, focus: usize, wrapper: InitWrapper) -> isize {
        if let Some(menu) = wrapper.menu {
            if !self.env.set_menu(hwnd, menu) {
                warn!("{hwnd:?}: failed to attach menu {menu:?}");
            }
        }

        let proc = wrapper.proc.or_else(|| {
            self.env
                .class_atom(hwnd)
                .and_then(|atom| self.env.class_default_proc(atom))
        });

        let focus_before = self.env.focus();
        let handled = match proc {
            Some(proc) => {
                self.registry.bind(hwnd, proc);
                let narrow = NarrowMessage {
                    hwnd: self.env.to_narrow(hwnd),
                    msg: WM_INITDIALOG as u16,
                    wparam: self.env.to_narrow(Hwnd(focus)).0,
                    lparam: wrapper.param,
                };
                self.dispatch_dialog(hwnd, proc, narrow)
            }
            None => {
                debug!("{hwnd:?}: no narrow procedure, using default dialog processing");
                1
            }
        };

        if handled != 0
            || (self.env.focus() == focus_before && self.env.is_window_visible(hwnd))
        {
            self.focus_first_tab_item(hwnd);
        }
        if wrapper.style.contains(DialogStyle::WS_VISIBLE) && !self.env.is_window_visible(hwnd) {
            self.env.show_window(hwnd);
        }
        0
    }

    fn focus_first_tab_item(&self, hwnd: Hwnd) {
        if let Some(item) = self.env.next_tab_item(hwnd) {
            self.env.set_focus(item);
        }
    }

    /// Processing for dialogs without a narrow procedure.
    fn default_dialog_proc(&self, hwnd: Hwnd, msg: u32, wparam: usize) -> isize {
        match msg {
            WM_COMMAND => match isize::from(loword(wparam) as i16) {
                code @ (IDOK | IDCANCEL) => {
                    self.env.end_dialog(hwnd, code);
                    1
                }
                _ => 0,
            },
            WM_CLOSE => {
                self.env.end_dialog(hwnd, IDCANCEL);
                1
            }
            _ => 0,
        }
    }
}

impl<E: Environment + ?Sized> DialogProc for CallbackRelay<'_, E> {
    fn dialog_proc(&self, hwnd: Hwnd, msg: u32, wparam: usize, lparam: isize) -> isize {
        if msg == WM_INITDIALOG {
            if let Some(wrapper) = self.registry.take_staged(InitToken(lparam)) {
                return self.init_dialog(hwnd, wparam, wrapper);
            }
        }

        let Some(proc) = self.registry.proc_for(hwnd) else {
            return self.default_dialog_proc(hwnd, msg, wparam);
        };

        let narrow = NarrowMessage::from_native(self.env, hwnd, msg, wparam, lparam);
        let result = if self.env.is_dialog(hwnd) {
            self.dispatch_dialog(hwnd, proc, narrow)
        } else {
            trace!("{hwnd:?} is not a dialog, forwarding as a window message");
            self.invoke(proc, narrow) as isize
        };

        if msg == WM_NCDESTROY {
            self.forget_window(hwnd);
        }
        result
    }
}
