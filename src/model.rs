//! Decoded forms of a 16-bit dialog template.
//!
//! Everything here borrows from the template bytes: strings are [`AnsiStr`] views and creation
//! data is a sub-slice of the input, so decoding never copies text.

use std::fmt;

use encoding::{DecoderTrap, EncodingRef};

use crate::style::DialogStyle;

/// Narrow (code-page) text, borrowed from a template without its NUL terminator.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AnsiStr<'a>(&'a [u8]);

impl<'a> AnsiStr<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        AnsiStr(bytes)
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn eq_ignore_ascii_case(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.as_bytes())
    }

    /// Decodes with `codec`, replacing bytes it cannot map.
    pub fn to_string_lossy(&self, codec: EncodingRef) -> String {
        codec
            .decode(self.0, DecoderTrap::Replace)
            .unwrap_or_else(|_| String::from_utf8_lossy(self.0).into_owned())
    }
}

impl fmt::Debug for AnsiStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(self.0))
    }
}

impl<'a> From<&'a str> for AnsiStr<'a> {
    fn from(s: &'a str) -> Self {
        AnsiStr(s.as_bytes())
    }
}

/// Predefined control classes addressable by a one-byte tag (`0x80 | index`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinClass {
    Button,
    Edit,
    Static,
    ListBox,
    ScrollBar,
    ComboBox,
    /// A tag with the high bit set that names no known class. Widens to an empty class name.
    Unknown(u8),
}

impl BuiltinClass {
    pub fn from_tag(tag: u8) -> Self {
        match tag & 0x7f {
            0x00 => BuiltinClass::Button,
            0x01 => BuiltinClass::Edit,
            0x02 => BuiltinClass::Static,
            0x03 => BuiltinClass::ListBox,
            0x04 => BuiltinClass::ScrollBar,
            0x05 => BuiltinClass::ComboBox,
            _ => BuiltinClass::Unknown(tag),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinClass::Button => "BUTTON",
            BuiltinClass::Edit => "EDIT",
            BuiltinClass::Static => "STATIC",
            BuiltinClass::ListBox => "LISTBOX",
            BuiltinClass::ScrollBar => "SCROLLBAR",
            BuiltinClass::ComboBox => "COMBOBOX",
            BuiltinClass::Unknown(_) => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassName<'a> {
    Builtin(BuiltinClass),
    Named(AnsiStr<'a>),
}

impl ClassName<'_> {
    /// Whether this names the STATIC class, by tag or by (case-insensitive) name.
    pub fn is_static(&self) -> bool {
        match self {
            ClassName::Builtin(class) => *class == BuiltinClass::Static,
            ClassName::Named(name) => name.eq_ignore_ascii_case(BuiltinClass::Static.name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowName<'a> {
    Text(AnsiStr<'a>),
    /// A resource ordinal: a string-table id, or an icon/bitmap id for static image controls.
    Ordinal(u16),
}

/// One decoded control record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlInfo<'a> {
    pub style: u32,
    pub x: i16,
    pub y: i16,
    pub cx: i16,
    pub cy: i16,
    pub id: u16,
    pub class_name: ClassName<'a>,
    pub window_name: WindowName<'a>,
    /// Bytes handed to the control at creation. Aliases the template buffer.
    pub creation_data: Option<&'a [u8]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuRef<'a> {
    None,
    Ordinal(u16),
    Named(AnsiStr<'a>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassRef<'a> {
    /// The template names no class: use the platform's dialog class.
    PlatformDefault,
    Named(AnsiStr<'a>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSpec<'a> {
    pub point_size: u16,
    pub face_name: AnsiStr<'a>,
}

/// A decoded dialog header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogTemplate<'a> {
    pub style: DialogStyle,
    pub item_count: u8,
    pub x: i16,
    pub y: i16,
    pub cx: i16,
    pub cy: i16,
    pub menu: MenuRef<'a>,
    pub class: ClassRef<'a>,
    pub caption: AnsiStr<'a>,
    /// Present iff the style has `DS_SETFONT`.
    pub font: Option<FontSpec<'a>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tags_map_low_bits() {
        assert_eq!(BuiltinClass::from_tag(0x80), BuiltinClass::Button);
        assert_eq!(BuiltinClass::from_tag(0x85), BuiltinClass::ComboBox);
        assert_eq!(BuiltinClass::from_tag(0x86), BuiltinClass::Unknown(0x86));
        assert_eq!(BuiltinClass::from_tag(0xff).name(), "");
    }

    #[test]
    fn static_is_recognized_by_tag_or_name() {
        assert!(ClassName::Builtin(BuiltinClass::Static).is_static());
        assert!(ClassName::Named(AnsiStr::from("static")).is_static());
        assert!(!ClassName::Named(AnsiStr::from("Button")).is_static());
    }

    #[test]
    fn lossy_decoding_uses_codec() {
        let caption = AnsiStr::new(b"Gr\xfc\xdfe");
        assert_eq!(
            caption.to_string_lossy(encoding::all::WINDOWS_1252),
            "Grüße"
        );
    }
}
