//! Interfaces of the services this crate relies on but does not implement: resource loading,
//! window-handle translation, the thunk lock, menus, string tables, class registration, the native
//! windowing host and the narrow-code trampoline.
//!
//! [`Environment`] bundles them so callers can hand a single value to the relay and lifecycle.

use std::fmt;

use crate::model::MenuRef;
use crate::utils::decode_ansi;
use encoding::EncodingRef;

/// Native (flat address space) window handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hwnd(pub usize);

/// 16-bit window handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hwnd16(pub u16);

/// 16-bit module instance owning templates, menus and string tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Module(pub u16);

/// Segmented (16:16) address of a narrow-convention window or dialog procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NarrowProc(pub u32);

/// 16-bit menu handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Menu16(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Atom(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceHandle(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalHandle(pub u16);

/// Resource type of dialog templates.
pub const RT_DIALOG: u16 = 5;

/// A resource named either by ordinal or by string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceId {
    Id(u16),
    Name(String),
}

impl ResourceId {
    /// Converts a template menu reference. `MenuRef::None` has no resource.
    pub fn from_menu_ref(menu: MenuRef<'_>, codec: EncodingRef) -> Option<ResourceId> {
        match menu {
            MenuRef::None => None,
            MenuRef::Ordinal(id) => Some(ResourceId::Id(id)),
            MenuRef::Named(name) => decode_ansi(name, codec, "dialog.menu")
                .ok()
                .map(ResourceId::Name),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Id(id) => write!(f, "#{id}"),
            ResourceId::Name(name) => f.write_str(name),
        }
    }
}

pub trait ResourceLoader {
    fn find_resource(&self, module: Module, name: &ResourceId, kind: u16) -> Option<ResourceHandle>;
    fn load_resource(&self, module: Module, resource: ResourceHandle) -> Option<GlobalHandle>;
    /// Bytes of a loaded resource. They stay valid until [`ResourceLoader::free_resource`].
    fn lock_resource(&self, memory: GlobalHandle) -> Option<&[u8]>;
    fn free_resource(&self, memory: GlobalHandle);
}

/// Translation between narrow and native window handles.
pub trait HandleMap {
    fn to_narrow(&self, hwnd: Hwnd) -> Hwnd16;
    /// `None` for the null handle and for handles that name no window.
    fn to_native(&self, hwnd: Hwnd16) -> Option<Hwnd>;
}

/// The global lock serializing execution of narrow code.
///
/// Use it through [`crate::thunk::ReleasedThunkLock`] and [`crate::thunk::HeldThunkLock`].
pub trait ThunkLock {
    /// Releases every recursion level held by the current thread, returning how many there were.
    fn release_all(&self) -> u32;
    /// Re-acquires the number of levels previously returned by `release_all`.
    fn restore(&self, count: u32);
    fn acquire(&self);
    fn release(&self);
}

pub trait MenuLoader {
    fn load_menu(&self, module: Module, menu: &ResourceId) -> Option<Menu16>;
    fn destroy_menu(&self, menu: Menu16);
}

pub trait StringResources {
    /// Loads string resource `id` as narrow text of at most `max_len - 1` bytes.
    /// `None` (or an empty string) means the resource does not exist.
    fn load_string(&self, module: Module, id: u16, max_len: usize) -> Option<Vec<u8>>;
}

pub trait ClassRegistry {
    /// Registers the stand-in dialog class for `module` unless it already exists.
    /// Returns `false` only when registration failed.
    fn ensure_stand_in_class(&self, module: Module, class_name: &str) -> bool;
    /// Maps a 16-bit class name to the native class name windows of that class are created with.
    fn native_class_name(&self, module: Module, class_name: &str) -> String;
    /// Atom of the class the window belongs to, if the class was registered by narrow code.
    fn class_atom(&self, hwnd: Hwnd) -> Option<Atom>;
    /// Narrow procedure the class was registered with.
    fn class_default_proc(&self, atom: Atom) -> Option<NarrowProc>;
    /// Menu a class declares for its windows.
    fn class_menu(&self, module: Module, class_name: &str) -> Option<ResourceId>;
}

/// A native dialog procedure. Implemented by [`crate::relay::CallbackRelay`].
pub trait DialogProc {
    fn dialog_proc(&self, hwnd: Hwnd, msg: u32, wparam: usize, lparam: isize) -> isize;
}

/// The native windowing host.
pub trait NativeWindows {
    /// Creates a modal dialog from a native template and runs it until `end_dialog` is called.
    /// Returns the dismissal code, or `None` when the dialog could not be created.
    fn dialog_box_indirect(
        &self,
        module: Module,
        template: &[u8],
        owner: Option<Hwnd>,
        proc: &dyn DialogProc,
        param: isize,
    ) -> Option<isize>;

    /// Creates a modeless dialog from a native template.
    fn create_dialog_indirect(
        &self,
        module: Module,
        template: &[u8],
        owner: Option<Hwnd>,
        proc: &dyn DialogProc,
        param: isize,
    ) -> Option<Hwnd>;

    fn end_dialog(&self, hwnd: Hwnd, code: isize) -> bool;
    fn is_dialog(&self, hwnd: Hwnd) -> bool;
    /// Top-level window `hwnd` belongs to.
    fn root_ancestor(&self, hwnd: Hwnd) -> Option<Hwnd>;
    fn is_window_enabled(&self, hwnd: Hwnd) -> bool;
    fn enable_window(&self, hwnd: Hwnd, enable: bool);
    fn is_window_visible(&self, hwnd: Hwnd) -> bool;
    fn show_window(&self, hwnd: Hwnd);
    fn focus(&self) -> Option<Hwnd>;
    fn set_focus(&self, hwnd: Hwnd);
    /// First control of `dialog` with the tab-stop style.
    fn next_tab_item(&self, dialog: Hwnd) -> Option<Hwnd>;
    fn set_menu(&self, hwnd: Hwnd, menu: Menu16) -> bool;
    /// Stores the value a dialog reports for the message being processed (`DWL_MSGRESULT`).
    fn set_msg_result(&self, hwnd: Hwnd, value: isize);
    fn def_window_proc(&self, hwnd: Hwnd, msg: u32, wparam: usize, lparam: isize) -> isize;
    /// Text of a dialog control parsed as an integer.
    fn dlg_item_int(&self, dialog: Hwnd, id: u16, signed: bool) -> Option<u32>;
}

/// Trampoline into narrow code.
pub trait NarrowInvoker {
    /// Calls a 16-bit window or dialog procedure and returns its `DX:AX` result.
    fn call_proc16(&self, proc: NarrowProc, hwnd: Hwnd16, msg: u16, wparam: u16, lparam: i32)
    -> i32;
}

/// Everything the relay and the lifecycle need from their surroundings.
pub trait Environment:
    ResourceLoader
    + HandleMap
    + ThunkLock
    + MenuLoader
    + StringResources
    + ClassRegistry
    + NativeWindows
    + NarrowInvoker
{
}

impl<T> Environment for T where
    T: ResourceLoader
        + HandleMap
        + ThunkLock
        + MenuLoader
        + StringResources
        + ClassRegistry
        + NativeWindows
        + NarrowInvoker
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnsiStr;
    use encoding::all::WINDOWS_1252;

    #[test]
    fn menu_refs_become_resource_ids() {
        assert_eq!(ResourceId::from_menu_ref(MenuRef::None, WINDOWS_1252), None);
        assert_eq!(
            ResourceId::from_menu_ref(MenuRef::Ordinal(3), WINDOWS_1252),
            Some(ResourceId::Id(3))
        );
        assert_eq!(
            ResourceId::from_menu_ref(MenuRef::Named(AnsiStr::from("MAIN")), WINDOWS_1252),
            Some(ResourceId::Name("MAIN".to_owned()))
        );
        assert_eq!(ResourceId::Id(3).to_string(), "#3");
    }
}
