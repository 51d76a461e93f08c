
use fixtures::*;

use dlg16::compat::{
    create_dialog_indirect_param, create_dialog_param, dialog_box_indirect_param,
    dialog_box_param, end_dialog, get_dlg_item_int,
};
use dlg16::host::{Hwnd16, Menu16, NarrowProc, NativeWindows, ResourceId};
use dlg16::message::{WM_INITDIALOG, WM_NCDESTROY};
use dlg16::registry::InitToken;
use dlg16::{DialogError, DialogStyle};
use pretty_assertions::assert_eq;

const PROC: NarrowProc = NarrowProc(0x2a11_0040);
const WM_USER: u32 = 0x0400;

fn simple_template() -> Vec<u8> {
    LegacyTemplateBuilder::new((DialogStyle::WS_POPUP | DialogStyle::WS_VISIBLE).bits())
        .caption(b"Confirm")
        .control(ControlBuilder::builtin(0x80, 1).text(b"OK"))
        .build()
}

/// The narrow procedure ends the dialog with `code` when it sees `WM_USER`.
fn end_on_user_message(env: &MockEnv, code: i16) {
    env.on(PROC, move |env, h, msg, _, _| {
        if u32::from(msg) == WM_USER {
            env.end_dialog(native(h), isize::from(code));
        }
        0
    });
    env.script.borrow_mut().push((WM_USER, 0, 0));
}

#[test]
fn test_modal_dialog_returns_the_end_code() {
    let env = MockEnv::new();
    end_on_user_message(&env, 6);
    let dialogs = env.lifecycle();

    let code = dialogs
        .create_modal(MODULE, &simple_template(), None, Some(PROC), 77)
        .unwrap();

    assert_eq!(code, 6);
    let init = env.calls_with(WM_INITDIALOG);
    assert_eq!(init.len(), 1);
    assert_eq!(init[0].lparam, 77);
    assert_eq!(env.calls_with(WM_NCDESTROY).len(), 1);
    assert!(env.registry.is_empty());
    assert!(!env.registry.is_staged(InitToken(1)));
}

#[test]
fn test_modal_dialog_disables_the_top_level_owner() {
    let env = MockEnv::new();
    let owner = native(Hwnd16(0x10));
    let root = native(Hwnd16(0x11));
    env.roots.borrow_mut().insert(owner, root);
    let dialogs = env.lifecycle();

    dialogs
        .create_modal(MODULE, &simple_template(), Some(owner), Some(PROC), 0)
        .unwrap();

    assert_eq!(*env.owner_enabled_during.borrow(), vec![false]);
    assert!(env.is_window_enabled(root));
}

#[test]
fn test_modal_dialog_leaves_a_disabled_owner_disabled() {
    let env = MockEnv::new();
    let owner = native(Hwnd16(0x10));
    env.disabled.borrow_mut().insert(owner);
    let dialogs = env.lifecycle();

    dialogs
        .create_modal(MODULE, &simple_template(), Some(owner), Some(PROC), 0)
        .unwrap();

    assert!(!env.is_window_enabled(owner));
}

#[test]
fn test_thunk_lock_is_released_around_the_host_call() {
    let env = MockEnv::new();
    env.lock_depth.set(2);
    let dialogs = env.lifecycle();

    dialogs
        .create_modal(MODULE, &simple_template(), None, Some(PROC), 0)
        .unwrap();

    assert_eq!(*env.lock_depth_in_host.borrow(), vec![0]);
    assert!(env.narrow_calls.borrow().iter().all(|c| c.lock_depth == 1));
    assert_eq!(env.lock_depth.get(), 2);
}

#[test]
fn test_creation_failure_cleans_up() {
    let env = MockEnv::new();
    env.fail_creation.set(true);
    env.menus
        .borrow_mut()
        .insert(ResourceId::Id(5), Menu16(0x21));
    let owner = native(Hwnd16(0x10));

    let template = LegacyTemplateBuilder::new(0)
        .menu_ordinal(5)
        .caption(b"Broken")
        .build();
    let dialogs = env.lifecycle();

    let err = dialogs
        .create_modal(MODULE, &template, Some(owner), Some(PROC), 0)
        .unwrap_err();

    assert!(matches!(err, DialogError::CreationFailed));
    assert_eq!(*env.destroyed_menus.borrow(), vec![Menu16(0x21)]);
    assert!(!env.registry.is_staged(InitToken(1)));
    assert!(env.is_window_enabled(owner));
    assert!(env.narrow_calls.borrow().is_empty());
}

#[test]
fn test_malformed_template_never_reaches_the_host() {
    let env = MockEnv::new();
    env.menus
        .borrow_mut()
        .insert(ResourceId::Id(5), Menu16(0x22));
    let dialogs = env.lifecycle();

    let header_only = LegacyTemplateBuilder::new(0).build();
    let err = dialogs
        .create_modal(MODULE, &header_only[..6], None, Some(PROC), 0)
        .unwrap_err();
    assert!(matches!(err, DialogError::MalformedTemplate(_)));

    let mut bad_control = LegacyTemplateBuilder::new(0)
        .menu_ordinal(5)
        .control(ControlBuilder::builtin(0x80, 1))
        .build();
    bad_control.truncate(bad_control.len() - 1);
    let err = dialogs
        .create_modeless(MODULE, &bad_control, None, Some(PROC), 0)
        .unwrap_err();
    assert!(matches!(err, DialogError::MalformedTemplate(_)));

    assert!(env.templates.borrow().is_empty());
    assert_eq!(*env.destroyed_menus.borrow(), vec![Menu16(0x22)]);
    assert!(!env.registry.is_staged(InitToken(1)));
}

#[test]
fn test_unclaimed_menu_is_destroyed_after_a_modal_dialog() {
    let env = MockEnv::new();
    env.skip_init.set(true);
    env.menus
        .borrow_mut()
        .insert(ResourceId::Id(7), Menu16(0x55));
    let dialogs = env.lifecycle();

    let template = LegacyTemplateBuilder::new(0).menu_ordinal(7).build();
    let code = dialogs
        .create_modal(MODULE, &template, None, Some(PROC), 0)
        .unwrap();

    assert_eq!(code, 0);
    assert!(env.attached_menus.borrow().is_empty());
    assert_eq!(*env.destroyed_menus.borrow(), vec![Menu16(0x55)]);
    assert!(!env.registry.is_staged(InitToken(1)));
}

#[test]
fn test_unclaimed_wrapper_is_dropped_after_a_modeless_dialog() {
    let env = MockEnv::new();
    env.skip_init.set(true);
    env.menus
        .borrow_mut()
        .insert(ResourceId::Id(7), Menu16(0x56));
    let dialogs = env.lifecycle();

    let template = LegacyTemplateBuilder::new(0).menu_ordinal(7).build();
    let hwnd = dialogs
        .create_modeless(MODULE, &template, None, Some(PROC), 0)
        .unwrap();

    assert!(!env.registry.is_staged(InitToken(1)));
    assert_eq!(*env.destroyed_menus.borrow(), vec![Menu16(0x56)]);
    assert_eq!(env.registry.proc_for(hwnd), Some(PROC));
}

#[test]
fn test_claimed_menu_is_left_to_the_window() {
    let env = MockEnv::new();
    env.menus
        .borrow_mut()
        .insert(ResourceId::Id(7), Menu16(0x57));
    let dialogs = env.lifecycle();

    let template = LegacyTemplateBuilder::new(0).menu_ordinal(7).build();
    dialogs
        .create_modal(MODULE, &template, None, Some(PROC), 0)
        .unwrap();

    assert_eq!(env.attached_menus.borrow().len(), 1);
    assert!(env.destroyed_menus.borrow().is_empty());
}

#[test]
fn test_template_menu_is_attached_at_init() {
    let env = MockEnv::new();
    env.menus
        .borrow_mut()
        .insert(ResourceId::Name("MAIN".to_owned()), Menu16(0x31));
    let dialogs = env.lifecycle();

    let template = LegacyTemplateBuilder::new(0).menu_name("MAIN").build();
    let hwnd = dialogs
        .create_modeless(MODULE, &template, None, Some(PROC), 0)
        .unwrap();

    assert_eq!(*env.attached_menus.borrow(), vec![(hwnd, Menu16(0x31))]);
    // widened menu field stays empty
    assert_eq!(read_u16(&env.templates.borrow()[0], 18), 0);
}

#[test]
fn test_class_menu_is_used_when_the_template_has_none() {
    let env = MockEnv::new();
    *env.class_menu.borrow_mut() = Some(ResourceId::Id(40));
    env.menus
        .borrow_mut()
        .insert(ResourceId::Id(40), Menu16(0x32));
    let dialogs = env.lifecycle();

    let template = LegacyTemplateBuilder::new(0).class("Calc").build();
    let hwnd = dialogs
        .create_modeless(MODULE, &template, None, Some(PROC), 0)
        .unwrap();

    assert_eq!(*env.attached_menus.borrow(), vec![(hwnd, Menu16(0x32))]);
}

#[test]
fn test_missing_menu_does_not_prevent_creation() {
    let env = MockEnv::new();
    let dialogs = env.lifecycle();

    let template = LegacyTemplateBuilder::new(0).menu_ordinal(9).build();
    let hwnd = dialogs.create_modeless(MODULE, &template, None, Some(PROC), 0);

    assert!(hwnd.is_ok());
    assert!(env.attached_menus.borrow().is_empty());
}

#[test]
fn test_modeless_dialog_stays_bound() {
    let env = MockEnv::new();
    let dialogs = env.lifecycle();

    let hwnd = dialogs
        .create_modeless(MODULE, &simple_template(), None, Some(PROC), 12)
        .unwrap();

    assert_eq!(env.registry.proc_for(hwnd), Some(PROC));
    assert_eq!(env.calls_with(WM_INITDIALOG)[0].lparam, 12);
    assert_eq!(*env.shown.borrow(), vec![hwnd]);
    assert_eq!(
        read_u32(&env.templates.borrow()[0], 0),
        (DialogStyle::WS_POPUP | DialogStyle::WS_VISIBLE).bits()
    );
}

#[test]
fn test_dialog_box_param_resource_failures() {
    let mut env = MockEnv::new();
    env.resources.insert(ResourceId::Id(100), simple_template());
    end_on_user_message(&env, 4);
    let dialogs = env.lifecycle();

    let missing = dialog_box_param(&dialogs, MODULE, &ResourceId::Id(101), Hwnd16(0), Some(PROC), 0);
    assert_eq!(missing, 0);
    assert!(env.freed.borrow().is_empty());

    env.lockable.set(false);
    let unlockable =
        dialog_box_param(&dialogs, MODULE, &ResourceId::Id(100), Hwnd16(0), Some(PROC), 0);
    assert_eq!(unlockable, -1);
    assert_eq!(env.freed.borrow().len(), 1);

    env.lockable.set(true);
    let code = dialog_box_param(&dialogs, MODULE, &ResourceId::Id(100), Hwnd16(0), Some(PROC), 0);
    assert_eq!(code, 4);
    assert_eq!(env.freed.borrow().len(), 2);
}

#[test]
fn test_dialog_box_param_reports_creation_failure_as_minus_one() {
    let mut env = MockEnv::new();
    env.resources.insert(ResourceId::Id(100), simple_template());
    env.fail_creation.set(true);
    let dialogs = env.lifecycle();

    let code = dialog_box_param(&dialogs, MODULE, &ResourceId::Id(100), Hwnd16(0), Some(PROC), 0);
    assert_eq!(code, -1);
    assert_eq!(env.freed.borrow().len(), 1);

    let code = dialog_box_indirect_param(&dialogs, MODULE, &[0x01], Hwnd16(0), Some(PROC), 0);
    assert_eq!(code, -1);
}

#[test]
fn test_create_dialog_entry_points_return_narrow_handles() {
    let mut env = MockEnv::new();
    env.resources
        .insert(ResourceId::Name("FIND".to_owned()), simple_template());
    let dialogs = env.lifecycle();

    let hwnd = create_dialog_param(
        &dialogs,
        MODULE,
        &ResourceId::Name("FIND".to_owned()),
        Hwnd16(0),
        Some(PROC),
        0,
    );
    assert_eq!(hwnd, Hwnd16(0x40));
    assert_eq!(env.registry.proc_for(native(hwnd)), Some(PROC));

    let empty = create_dialog_indirect_param(&dialogs, MODULE, &[], Hwnd16(0), Some(PROC), 0);
    assert_eq!(empty, Hwnd16(0));
    assert_eq!(env.templates.borrow().len(), 1);
}

#[test]
fn test_end_dialog_maps_the_handle() {
    let env = MockEnv::new();

    assert!(end_dialog(&env, Hwnd16(0x41), 3));
    assert!(!end_dialog(&env, Hwnd16(0), 3));
    assert_eq!(*env.ended.borrow(), vec![(native(Hwnd16(0x41)), 3)]);
}

#[test]
fn test_dlg_item_int_must_fit_sixteen_bits() {
    let env = MockEnv::new();
    env.item_ints.borrow_mut().insert(1, 40_000);
    env.item_ints.borrow_mut().insert(2, (-5_i32) as u32);
    env.item_ints.borrow_mut().insert(3, 32_767);
    let dialog = Hwnd16(0x41);

    assert_eq!(get_dlg_item_int(&env, dialog, 1, false), Some(40_000));
    assert_eq!(get_dlg_item_int(&env, dialog, 1, true), None);
    assert_eq!(get_dlg_item_int(&env, dialog, 2, true), Some((-5_i16) as u16));
    assert_eq!(get_dlg_item_int(&env, dialog, 2, false), None);
    assert_eq!(get_dlg_item_int(&env, dialog, 3, true), Some(32_767));
    assert_eq!(get_dlg_item_int(&env, dialog, 4, false), None);
    assert_eq!(get_dlg_item_int(&env, Hwnd16(0), 1, false), None);
}
