//! Decoding of 16-bit dialog templates, widening them into the native wide-character layout,
//! and relaying native dialog messages to 16-bit dialog procedures.
//!
//! The pieces, bottom up:
//!
//! - [`DecodedDialog`], [`DialogTemplate`] and [`ControlInfo`] decode the legacy layout without
//!   copying text.
//! - [`TemplateWidener`] produces a [`WidenedTemplate`] a native dialog manager accepts.
//! - [`CallbackRelay`] is the native dialog procedure that forwards to the narrow procedure
//!   bound in a [`ProcRegistry`].
//! - [`DialogLifecycle`] ties these together to create modal and modeless dialogs; [`compat`]
//!   exposes the 16-bit entry points on top of it.
//!
//! Everything the crate needs from the outside world is described by the traits in [`host`].
#![forbid(unsafe_code)]

pub mod compat;
mod control;
pub mod err;
pub mod host;
pub mod lifecycle;
pub mod message;
pub mod model;
pub mod registry;
pub mod relay;
mod settings;
pub mod style;
mod template;
pub mod thunk;
mod utils;
pub mod widen;

pub use crate::err::{DeserializationError, DialogError, WidenError};
pub use crate::host::{Environment, Hwnd, Hwnd16, Module, NarrowProc};
pub use crate::lifecycle::DialogLifecycle;
pub use crate::model::{
    AnsiStr, BuiltinClass, ClassName, ClassRef, ControlInfo, DialogTemplate, FontSpec, MenuRef,
    WindowName,
};
pub use crate::registry::ProcRegistry;
pub use crate::relay::CallbackRelay;
pub use crate::settings::{
    DEFAULT_INVALID_NAME_PLACEHOLDER, DEFAULT_MAX_STRING_RESOURCE_LEN,
    DEFAULT_STAND_IN_CLASS_NAME, DialogSettings,
};
pub use crate::style::DialogStyle;
pub use crate::template::DecodedDialog;
pub use crate::utils::{ByteCursor, hexdump};
pub use crate::widen::{ClassMode, TemplateWidener, WidenedTemplate};
