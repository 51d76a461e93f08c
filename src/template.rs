use log::{debug, trace};

use crate::err::{DeserializationError, DeserializationResult};
use crate::model::{ClassRef, ControlInfo, DialogTemplate, FontSpec, MenuRef};
use crate::style::DialogStyle;
use crate::utils::{ByteCursor, dump_around};

impl<'a> DialogTemplate<'a> {
    /// Decode the dialog header, leaving the cursor on the first control record.
    ///
    /// Field order is fixed: `style: u32`, `item_count: u8`, `x, y, cx, cy: i16`, menu, class,
    /// caption, and, only when `DS_SETFONT` is set, `point_size: u16` and a face name.
    pub fn read(cursor: &mut ByteCursor<'a>) -> DeserializationResult<Self> {
        let style = DialogStyle::from_bits_retain(cursor.u32_named("dialog.style")?);
        let item_count = cursor.u8_named("dialog.item_count")?;
        let x = cursor.i16_named("dialog.x")?;
        let y = cursor.i16_named("dialog.y")?;
        let cx = cursor.i16_named("dialog.cx")?;
        let cy = cursor.i16_named("dialog.cy")?;

        trace!("DIALOG {x}, {y}, {cx}, {cy} STYLE {:08x}", style.bits());

        let menu = match cursor.peek_u8("dialog.menu")? {
            0 => {
                cursor.advance(1, "dialog.menu")?;
                MenuRef::None
            }
            _ => match cursor.ordinal_escape("dialog.menu")? {
                Some(ordinal) => MenuRef::Ordinal(ordinal),
                None => MenuRef::Named(cursor.c_str("dialog.menu")?),
            },
        };
        trace!(" MENU {menu:?}");

        let class = match cursor.c_str("dialog.class")? {
            name if name.is_empty() => ClassRef::PlatformDefault,
            name => ClassRef::Named(name),
        };
        trace!(" CLASS {class:?}");

        let caption = cursor.c_str("dialog.caption")?;
        trace!(" CAPTION {caption:?}");

        let font = if style.contains(DialogStyle::DS_SETFONT) {
            let point_size = cursor.u16_named("dialog.point_size")?;
            let face_name = cursor.c_str("dialog.face_name")?;
            trace!(" FONT {point_size}, {face_name:?}");
            Some(FontSpec {
                point_size,
                face_name,
            })
        } else {
            None
        };

        Ok(DialogTemplate {
            style,
            item_count,
            x,
            y,
            cx,
            cy,
            menu,
            class,
            caption,
            font,
        })
    }
}

/// Logs `err` along with a hexdump of the bytes around where decoding stopped.
pub(crate) fn log_malformed(data: &[u8], err: &DeserializationError) {
    debug!(
        "Malformed dialog template: {err}\n{}",
        dump_around(data, err.offset() as usize, 32)
    );
}

/// A dialog header together with all of its control records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDialog<'a> {
    pub template: DialogTemplate<'a>,
    pub controls: Vec<ControlInfo<'a>>,
    /// Bytes of the input the template occupies. The format has no length field, so this is only
    /// known after decoding every record.
    pub consumed: usize,
}

impl<'a> DecodedDialog<'a> {
    /// Decode a whole template: the header, then exactly `item_count` control records.
    pub fn parse(data: &'a [u8]) -> DeserializationResult<Self> {
        let mut cursor = ByteCursor::new(data);
        Self::read(&mut cursor).inspect_err(|e| log_malformed(data, e))
    }

    pub fn read(cursor: &mut ByteCursor<'a>) -> DeserializationResult<Self> {
        let start = cursor.pos();
        let template = DialogTemplate::read(cursor)?;
        let controls = (0..template.item_count)
            .map(|_| ControlInfo::read(cursor))
            .collect::<DeserializationResult<Vec<_>>>()?;

        Ok(DecodedDialog {
            template,
            controls,
            consumed: cursor.pos() - start,
        })
    }
}
