//! 16-bit dialog entry points expressed on top of [`DialogLifecycle`].
//!
//! These keep the Win16 calling conventions: handles are 16-bit and failures are reported as
//! sentinel return values rather than errors.

use log::{debug, warn};

use crate::err::{DialogError, Result, WidenResult};
use crate::host::{Environment, Hwnd16, Module, NarrowProc, RT_DIALOG, ResourceId};
use crate::lifecycle::DialogLifecycle;
use crate::settings::DialogSettings;
use crate::widen::{ClassMode, TemplateWidener, WidenedTemplate};

/// `DlgDirList` attribute: list drives.
pub const DDL_DRIVES: u16 = 0x4000;
/// `DlgDirList` attribute: list only the requested kinds.
pub const DDL_EXCLUSIVE: u16 = 0x8000;

/// Finds, loads and locks a dialog resource, runs `f` on its bytes and frees it again.
fn with_dialog_resource<E, R>(
    env: &E,
    module: Module,
    name: &ResourceId,
    f: impl FnOnce(&[u8]) -> R,
) -> Result<R>
where
    E: Environment + ?Sized,
{
    let resource = env
        .find_resource(module, name, RT_DIALOG)
        .ok_or_else(|| DialogError::ResourceNotFound {
            name: name.to_string(),
        })?;
    let memory = env
        .load_resource(module, resource)
        .ok_or_else(|| DialogError::ResourceLoad {
            name: name.to_string(),
        })?;

    let result = match env.lock_resource(memory) {
        Some(data) => Ok(f(data)),
        None => Err(DialogError::ResourceLock {
            name: name.to_string(),
        }),
    };
    env.free_resource(memory);
    result
}

/// Runs the modal dialog stored as resource `name`.
///
/// Returns 0 when the resource cannot be found or loaded, and -1 when it cannot be locked or the
/// dialog cannot be created.
pub fn dialog_box_param<E: Environment + ?Sized>(
    dialogs: &DialogLifecycle<'_, E>,
    module: Module,
    name: &ResourceId,
    owner: Hwnd16,
    proc: Option<NarrowProc>,
    param: i32,
) -> i16 {
    with_dialog_resource(dialogs.env(), module, name, |data| {
        dialog_box_indirect_param(dialogs, module, data, owner, proc, param)
    })
    .unwrap_or_else(|e| {
        warn!("{e}");
        match e {
            DialogError::ResourceLock { .. } => -1,
            _ => 0,
        }
    })
}

/// Runs a modal dialog from template bytes. Returns -1 when it cannot be created.
pub fn dialog_box_indirect_param<E: Environment + ?Sized>(
    dialogs: &DialogLifecycle<'_, E>,
    module: Module,
    template: &[u8],
    owner: Hwnd16,
    proc: Option<NarrowProc>,
    param: i32,
) -> i16 {
    let owner = dialogs.env().to_native(owner);
    match dialogs.create_modal(module, template, owner, proc, param) {
        Ok(code) => code as i16,
        Err(e) => {
            debug!("modal dialog failed: {e}");
            -1
        }
    }
}

/// Creates the modeless dialog stored as resource `name`. Returns the null handle on failure.
pub fn create_dialog_param<E: Environment + ?Sized>(
    dialogs: &DialogLifecycle<'_, E>,
    module: Module,
    name: &ResourceId,
    owner: Hwnd16,
    proc: Option<NarrowProc>,
    param: i32,
) -> Hwnd16 {
    with_dialog_resource(dialogs.env(), module, name, |data| {
        create_dialog_indirect_param(dialogs, module, data, owner, proc, param)
    })
    .unwrap_or_else(|e| {
        warn!("{e}");
        Hwnd16(0)
    })
}

/// Creates a modeless dialog from template bytes. Returns the null handle on failure.
pub fn create_dialog_indirect_param<E: Environment + ?Sized>(
    dialogs: &DialogLifecycle<'_, E>,
    module: Module,
    template: &[u8],
    owner: Hwnd16,
    proc: Option<NarrowProc>,
    param: i32,
) -> Hwnd16 {
    if template.is_empty() {
        return Hwnd16(0);
    }

    let env = dialogs.env();
    match dialogs.create_modeless(module, template, env.to_native(owner), proc, param) {
        Ok(hwnd) => env.to_narrow(hwnd),
        Err(e) => {
            debug!("modeless dialog failed: {e}");
            Hwnd16(0)
        }
    }
}

pub fn end_dialog<E: Environment + ?Sized>(env: &E, hwnd: Hwnd16, code: i16) -> bool {
    match env.to_native(hwnd) {
        Some(hwnd) => env.end_dialog(hwnd, isize::from(code)),
        None => false,
    }
}

/// Reads a control's text as an integer that fits the 16-bit return type.
///
/// Signed values must lie in `-32767..=32767`, unsigned ones must not exceed 65535. The signed
/// result is returned in its two's-complement 16-bit form.
pub fn get_dlg_item_int<E: Environment + ?Sized>(
    env: &E,
    hwnd: Hwnd16,
    id: u16,
    signed: bool,
) -> Option<u16> {
    let value = env.dlg_item_int(env.to_native(hwnd)?, id, signed)?;
    if signed {
        let value = value as i32;
        (-32767..=32767).contains(&value).then_some(value as u16)
    } else {
        u16::try_from(value).ok()
    }
}

/// Attribute mask for listing a directory into a dialog control. Listing drives implies an
/// exclusive listing.
pub fn dlg_dir_list_attrib(attrib: u16) -> u16 {
    if attrib & DDL_DRIVES != 0 {
        attrib | DDL_EXCLUSIVE
    } else {
        attrib
    }
}

/// Converts a template for a common-dialog hook: decoded and widened with the platform dialog
/// class instead of the stand-in class. The size is the length of the returned buffer.
pub fn template16_to_template32<'a, E: Environment + ?Sized>(
    env: &E,
    settings: &DialogSettings,
    module: Module,
    template: &'a [u8],
) -> WidenResult<(WidenedTemplate<'a>, usize)> {
    let widened = TemplateWidener::new(env, settings, module)
        .with_class_mode(ClassMode::PlatformDefault)
        .widen_bytes(template)?;
    let size = widened.len();
    Ok((widened, size))
}
