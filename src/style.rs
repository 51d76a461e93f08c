//! Window, dialog and control style bits shared by the legacy and native template layouts.
//!
//! Both layouts store the same 32-bit style value, so nothing here converts bits; the flags only
//! give names to the bits the decoder, widener and lifecycle look at.

use bitflags::bitflags;

bitflags! {
    /// Style of a dialog window, as stored in the template header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DialogStyle: u32 {
        const DS_ABSALIGN = 0x0000_0001;
        const DS_SYSMODAL = 0x0000_0002;
        const DS_3DLOOK = 0x0000_0004;
        const DS_FIXEDSYS = 0x0000_0008;
        /// Keep creating the remaining controls when one of them fails.
        const DS_NOFAILCREATE = 0x0000_0010;
        const DS_LOCALEDIT = 0x0000_0020;
        /// The header carries a point size and a face name after the caption.
        const DS_SETFONT = 0x0000_0040;
        const DS_MODALFRAME = 0x0000_0080;
        const DS_NOIDLEMSG = 0x0000_0100;
        const DS_SETFOREGROUND = 0x0000_0200;
        const DS_CONTROL = 0x0000_0400;
        const DS_CENTER = 0x0000_0800;
        const DS_CENTERMOUSE = 0x0000_1000;
        const DS_CONTEXTHELP = 0x0000_2000;

        const WS_TABSTOP = 0x0001_0000;
        const WS_GROUP = 0x0002_0000;
        const WS_SYSMENU = 0x0008_0000;
        const WS_DLGFRAME = 0x0040_0000;
        const WS_BORDER = 0x0080_0000;
        const WS_CAPTION = 0x00C0_0000;
        const WS_DISABLED = 0x0800_0000;
        const WS_VISIBLE = 0x1000_0000;
        const WS_CHILD = 0x4000_0000;
        const WS_POPUP = 0x8000_0000;

        // Control- and class-specific bits live in the low word.
        const _ = !0;
    }
}

/// Window style bits forced onto every widened control.
pub const CONTROL_FORCED_STYLE: u32 = DialogStyle::WS_CHILD.bits() | DialogStyle::WS_VISIBLE.bits();

/// Mask selecting the static-control type from a control style.
pub const SS_TYPEMASK: u32 = 0x0000_000F;
pub const SS_ICON: u32 = 0x0000_0003;
pub const SS_BITMAP: u32 = 0x0000_000E;

/// Whether a STATIC control with this style shows an image named by its window-name ordinal.
pub fn is_static_image(style: u32) -> bool {
    matches!(style & SS_TYPEMASK, SS_ICON | SS_BITMAP)
}
