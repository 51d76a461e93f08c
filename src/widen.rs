//! Re-encoding of a decoded 16-bit template into the native wide-character layout.

use std::io::{Cursor, Write};
use std::marker::PhantomData;
use std::mem::size_of;

use byteorder::{LittleEndian, WriteBytesExt};
use log::{debug, trace, warn};

use crate::err::{WidenError, WidenResult};
use crate::host::{ClassRegistry, Module, StringResources};
use crate::model::{AnsiStr, ClassName, ClassRef, ControlInfo, DialogTemplate, WindowName};
use crate::settings::DialogSettings;
use crate::style::{CONTROL_FORCED_STYLE, is_static_image};
use crate::utils::{ByteCursor, ansi_to_utf16, decode_ansi};

/// Size of the fixed part of the native dialog header.
const DIALOG_HEADER_LEN: usize = 18;
/// Size of the fixed part of a native item header.
const ITEM_HEADER_LEN: usize = 18;
/// Worst-case padding inserted to align an item to 4 bytes.
const ITEM_ALIGN_SLACK: usize = 3;
/// Byte count recorded for creation data: the count itself plus a native pointer.
const CREATION_DATA_RECORD: u16 = (size_of::<u16>() + size_of::<usize>()) as u16;

/// What the widened header names as the dialog's window class when the template names none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassMode {
    /// The stand-in class, registered for the module on first use.
    #[default]
    StandIn,
    /// The platform dialog class (empty class field).
    PlatformDefault,
}

/// A native dialog template.
///
/// Creation-data records hold the address of bytes inside the source template, so the value
/// borrows that template for `'a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidenedTemplate<'a> {
    buffer: Vec<u8>,
    written_len: usize,
    item_offsets: Vec<usize>,
    source: PhantomData<&'a [u8]>,
}

impl<'a> WidenedTemplate<'a> {
    /// The whole buffer, including any zero-filled tail past [`WidenedTemplate::written_len`].
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Only the bytes that were written.
    pub fn written(&self) -> &[u8] {
        &self.buffer[..self.written_len]
    }

    pub fn written_len(&self) -> usize {
        self.written_len
    }

    /// Size of the buffer handed to the host.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Offset of each item header from the start of the buffer.
    pub fn item_offsets(&self) -> &[usize] {
        &self.item_offsets
    }
}

struct ResolvedItem {
    style: u32,
    x: i16,
    y: i16,
    cx: i16,
    cy: i16,
    id: u16,
    class: Vec<u16>,
    name: Vec<u16>,
    creation_data: Option<usize>,
}

impl ResolvedItem {
    fn max_len(&self) -> usize {
        ITEM_ALIGN_SLACK
            + ITEM_HEADER_LEN
            + wide_len(&self.class)
            + wide_len(&self.name)
            + match self.creation_data {
                Some(_) => usize::from(CREATION_DATA_RECORD),
                None => size_of::<u16>(),
            }
    }
}

/// Bytes a string takes in the native layout, terminator included.
fn wide_len(units: &[u16]) -> usize {
    (units.len() + 1) * size_of::<u16>()
}

fn write_wide<W: Write>(out: &mut W, units: &[u16]) -> std::io::Result<()> {
    for &unit in units {
        out.write_u16::<LittleEndian>(unit)?;
    }
    out.write_u16::<LittleEndian>(0)
}

pub struct TemplateWidener<'s, E: ClassRegistry + StringResources + ?Sized> {
    env: &'s E,
    settings: &'s DialogSettings,
    module: Module,
    class_mode: ClassMode,
}

impl<'s, E: ClassRegistry + StringResources + ?Sized> TemplateWidener<'s, E> {
    pub fn new(env: &'s E, settings: &'s DialogSettings, module: Module) -> Self {
        TemplateWidener {
            env,
            settings,
            module,
            class_mode: ClassMode::default(),
        }
    }

    pub fn with_class_mode(mut self, class_mode: ClassMode) -> Self {
        self.class_mode = class_mode;
        self
    }

    /// Decodes and widens a whole template.
    pub fn widen_bytes<'a>(&self, data: &'a [u8]) -> WidenResult<WidenedTemplate<'a>> {
        let mut cursor = ByteCursor::new(data);
        let template = DialogTemplate::read(&mut cursor)?;
        self.widen(&template, &mut cursor)
    }

    /// Widens `template`, decoding its `item_count` control records from `cursor`.
    pub fn widen<'a>(
        &self,
        template: &DialogTemplate<'a>,
        cursor: &mut ByteCursor<'a>,
    ) -> WidenResult<WidenedTemplate<'a>> {
        let codec = self.settings.get_ansi_codec();

        let class = self.resolve_dialog_class(template.class)?;
        let caption = ansi_to_utf16(template.caption, codec, "dialog.caption")?;
        let font = match template.font {
            Some(font) => Some((
                font.point_size,
                ansi_to_utf16(font.face_name, codec, "dialog.face_name")?,
            )),
            None => None,
        };

        let mut items = Vec::with_capacity(usize::from(template.item_count));
        for _ in 0..template.item_count {
            let info = ControlInfo::read(cursor)?;
            items.push(self.resolve_item(&info)?);
        }

        let capacity = DIALOG_HEADER_LEN
            + size_of::<u16>()
            + wide_len(&class)
            + wide_len(&caption)
            + font
                .as_ref()
                .map_or(0, |(_, face)| size_of::<u16>() + wide_len(face))
            + items.iter().map(ResolvedItem::max_len).sum::<usize>();

        let mut buffer = vec![0_u8; capacity];
        let mut item_offsets = Vec::with_capacity(items.len());
        let written_len = {
            let mut out = Cursor::new(buffer.as_mut_slice());

            out.write_u32::<LittleEndian>(template.style.bits())?;
            out.write_u32::<LittleEndian>(0)?;
            out.write_u16::<LittleEndian>(u16::from(template.item_count))?;
            for v in [template.x, template.y, template.cx, template.cy] {
                out.write_i16::<LittleEndian>(v)?;
            }
            // Menu: attached at WM_INITDIALOG.
            out.write_u16::<LittleEndian>(0)?;
            write_wide(&mut out, &class)?;
            write_wide(&mut out, &caption)?;
            if let Some((point_size, face)) = &font {
                out.write_u16::<LittleEndian>(*point_size)?;
                write_wide(&mut out, face)?;
            }

            for item in &items {
                let aligned = (out.position() + 3) & !3;
                out.set_position(aligned);
                item_offsets.push(aligned as usize);

                out.write_u32::<LittleEndian>(item.style)?;
                out.write_u32::<LittleEndian>(0)?;
                for v in [item.x, item.y, item.cx, item.cy] {
                    out.write_i16::<LittleEndian>(v)?;
                }
                out.write_u16::<LittleEndian>(item.id)?;
                write_wide(&mut out, &item.class)?;
                write_wide(&mut out, &item.name)?;
                match item.creation_data {
                    Some(address) => {
                        out.write_u16::<LittleEndian>(CREATION_DATA_RECORD)?;
                        out.write_all(&address.to_le_bytes())?;
                    }
                    None => out.write_u16::<LittleEndian>(0)?,
                }
            }

            out.position() as usize
        };

        if self.settings.should_trim_widened_buffer() {
            buffer.truncate(written_len);
        }

        debug!(
            "widened dialog with {} control(s): {written_len} of {} bytes written",
            items.len(),
            buffer.len()
        );

        Ok(WidenedTemplate {
            buffer,
            written_len,
            item_offsets,
            source: PhantomData,
        })
    }

    fn resolve_dialog_class(&self, class: ClassRef<'_>) -> WidenResult<Vec<u16>> {
        match (class, self.class_mode) {
            (ClassRef::PlatformDefault, ClassMode::PlatformDefault) => Ok(Vec::new()),
            (ClassRef::PlatformDefault, ClassMode::StandIn) => {
                let name = self.settings.get_stand_in_class_name();
                if !self.env.ensure_stand_in_class(self.module, name) {
                    return Err(WidenError::ClassRegistration {
                        class: name.to_owned(),
                    });
                }
                Ok(name.encode_utf16().collect())
            }
            (ClassRef::Named(name), _) => {
                let name = decode_ansi(name, self.settings.get_ansi_codec(), "dialog.class")?;
                Ok(self
                    .env
                    .native_class_name(self.module, &name)
                    .encode_utf16()
                    .collect())
            }
        }
    }

    fn resolve_item(&self, info: &ControlInfo<'_>) -> WidenResult<ResolvedItem> {
        let codec = self.settings.get_ansi_codec();

        let class = match info.class_name {
            ClassName::Builtin(builtin) => builtin.name().to_owned(),
            ClassName::Named(name) => decode_ansi(name, codec, "control.class")?,
        };
        let class = if class.is_empty() {
            class
        } else {
            self.env.native_class_name(self.module, &class)
        };

        let name = match info.window_name {
            WindowName::Text(text) => ansi_to_utf16(text, codec, "control.window_name")?,
            WindowName::Ordinal(ordinal)
                if info.class_name.is_static() && is_static_image(info.style) =>
            {
                format!("#{ordinal}").encode_utf16().collect()
            }
            WindowName::Ordinal(ordinal) => self.load_window_name(info.id, ordinal)?,
        };

        trace!("control {} widened as class {class:?}", info.id);

        Ok(ResolvedItem {
            style: info.style | CONTROL_FORCED_STYLE,
            x: info.x,
            y: info.y,
            cx: info.cx,
            cy: info.cy,
            id: info.id,
            class: class.encode_utf16().collect(),
            name,
            creation_data: info.creation_data.map(|data| data.as_ptr() as usize),
        })
    }

    fn load_window_name(&self, id: u16, ordinal: u16) -> WidenResult<Vec<u16>> {
        let loaded = self
            .env
            .load_string(
                self.module,
                ordinal,
                self.settings.get_max_string_resource_len(),
            )
            .filter(|text| !text.is_empty());

        match loaded {
            Some(text) => ansi_to_utf16(
                AnsiStr::new(&text),
                self.settings.get_ansi_codec(),
                "control.window_name",
            ),
            None => {
                warn!("control {id}: no string resource {ordinal} for its window name");
                Ok(self
                    .settings
                    .get_invalid_name_placeholder()
                    .encode_utf16()
                    .collect())
            }
        }
    }
}
