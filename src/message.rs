//! Message numbers the relay interprets and conversion of native message parameters to the
//! 16-bit layout.

use crate::host::{HandleMap, Hwnd, Hwnd16};

pub const WM_CLOSE: u32 = 0x0010;
pub const WM_NCDESTROY: u32 = 0x0082;
pub const WM_INITDIALOG: u32 = 0x0110;
pub const WM_COMMAND: u32 = 0x0111;

pub const IDOK: isize = 1;
pub const IDCANCEL: isize = 2;

/// Window-long index of the dialog result slot.
pub const DWL_MSGRESULT: i16 = 0;
/// Window-long index of the dialog procedure.
pub const DWL_DLGPROC: i16 = 4;

/// What narrow code reads from `DWL_MSGRESULT` before a handler has written it.
pub const MSG_RESULT_UNSET: i32 = 0xDEAD_BEEF_u32 as i32;

#[inline]
pub fn loword(v: usize) -> u16 {
    (v & 0xffff) as u16
}

#[inline]
pub fn hiword(v: usize) -> u16 {
    ((v >> 16) & 0xffff) as u16
}

#[inline]
pub fn make_long(lo: u16, hi: u16) -> i32 {
    ((u32::from(hi) << 16) | u32::from(lo)) as i32
}

/// A message in the form narrow procedures receive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrowMessage {
    pub hwnd: Hwnd16,
    pub msg: u16,
    pub wparam: u16,
    pub lparam: i32,
}

impl NarrowMessage {
    /// Repacks a native message.
    ///
    /// `WM_COMMAND` moves the notification code from the high word of `wparam` to the high word
    /// of `lparam`, next to the narrow handle of the control. `WM_INITDIALOG` carries the focus
    /// candidate in `wparam`, which is translated as a handle. Everything else is truncated.
    pub fn from_native<H: HandleMap + ?Sized>(
        handles: &H,
        hwnd: Hwnd,
        msg: u32,
        wparam: usize,
        lparam: isize,
    ) -> Self {
        let hwnd16 = handles.to_narrow(hwnd);
        let (wparam16, lparam32) = match msg {
            WM_COMMAND => {
                let control = handles.to_narrow(Hwnd(lparam as usize));
                (loword(wparam), make_long(control.0, hiword(wparam)))
            }
            WM_INITDIALOG => (handles.to_narrow(Hwnd(wparam)).0, lparam as i32),
            _ => (loword(wparam), lparam as i32),
        };

        NarrowMessage {
            hwnd: hwnd16,
            msg: msg as u16,
            wparam: wparam16,
            lparam: lparam32,
        }
    }
}
