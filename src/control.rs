use log::trace;

use crate::err::DeserializationResult;
use crate::model::{BuiltinClass, ClassName, ControlInfo, WindowName};
use crate::utils::ByteCursor;

impl<'a> ControlInfo<'a> {
    /// Decode exactly one control record, leaving the cursor on the byte after it.
    ///
    /// Layout: `x, y, cx, cy: i16`, `id: u16`, `style: u32`, class (`0x80|tag` or string),
    /// window name (`0xFF <u16 ordinal>` or string), then a one-byte creation-data length followed
    /// by that many bytes.
    pub fn read(cursor: &mut ByteCursor<'a>) -> DeserializationResult<Self> {
        let start = cursor.pos();

        let x = cursor.i16_named("control.x")?;
        let y = cursor.i16_named("control.y")?;
        let cx = cursor.i16_named("control.cx")?;
        let cy = cursor.i16_named("control.cy")?;
        let id = cursor.u16_named("control.id")?;
        let style = cursor.u32_named("control.style")?;

        let class_name = if cursor.peek_u8("control.class")? & 0x80 != 0 {
            ClassName::Builtin(BuiltinClass::from_tag(cursor.u8_named("control.class")?))
        } else {
            ClassName::Named(cursor.c_str("control.class")?)
        };

        let window_name = match cursor.ordinal_escape("control.window_name")? {
            Some(ordinal) => WindowName::Ordinal(ordinal),
            None => WindowName::Text(cursor.c_str("control.window_name")?),
        };

        let data_len = cursor.u8_named("control.creation_data_len")?;
        let creation_data = match data_len {
            0 => None,
            n => Some(cursor.take_bytes(usize::from(n), "control.creation_data")?),
        };

        trace!(
            "Offset `0x{start:08x}`: control {class_name:?} {window_name:?} id={id} ({x}, {y}, {cx}, {cy}) style={style:08x} data={:?}",
            creation_data.map(<[u8]>::len)
        );

        Ok(ControlInfo {
            style,
            x,
            y,
            cx,
            cy,
            id,
            class_name,
            window_name,
            creation_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::err::DeserializationError;
    use crate::model::AnsiStr;
    use pretty_assertions::assert_eq;

    fn header(id: u16, style: u32) -> Vec<u8> {
        let mut v = Vec::new();
        for n in [10i16, 20, 30, 40] {
            v.extend_from_slice(&n.to_le_bytes());
        }
        v.extend_from_slice(&id.to_le_bytes());
        v.extend_from_slice(&style.to_le_bytes());
        v
    }

    #[test]
    fn decodes_builtin_static_with_text() {
        let mut bytes = header(7, 0x5000_0000);
        bytes.push(0x82);
        bytes.extend_from_slice(b"Hello\0");
        bytes.push(0);

        let mut cursor = ByteCursor::new(&bytes);
        let info = ControlInfo::read(&mut cursor).unwrap();

        assert_eq!(
            info,
            ControlInfo {
                style: 0x5000_0000,
                x: 10,
                y: 20,
                cx: 30,
                cy: 40,
                id: 7,
                class_name: ClassName::Builtin(BuiltinClass::Static),
                window_name: WindowName::Text(AnsiStr::from("Hello")),
                creation_data: None,
            }
        );
        assert!(cursor.is_at_end());
    }

    #[test]
    fn ordinal_window_name_takes_three_bytes() {
        let mut bytes = header(1, 0);
        bytes.extend_from_slice(b"MyClass\0");
        let name_at = bytes.len();
        bytes.extend_from_slice(&[0xff, 17, 0]);
        bytes.push(0);

        let mut cursor = ByteCursor::new(&bytes);
        let info = ControlInfo::read(&mut cursor).unwrap();

        assert_eq!(info.class_name, ClassName::Named(AnsiStr::from("MyClass")));
        assert_eq!(info.window_name, WindowName::Ordinal(17));
        // length byte follows the 3-byte ordinal
        assert_eq!(cursor.pos(), name_at + 3 + 1);
    }

    #[test]
    fn creation_data_aliases_input() {
        let mut bytes = header(3, 0);
        bytes.push(0x80);
        bytes.extend_from_slice(b"OK\0");
        bytes.extend_from_slice(&[3, 0xaa, 0xbb, 0xcc]);
        bytes.push(0x99);

        let mut cursor = ByteCursor::new(&bytes);
        let info = ControlInfo::read(&mut cursor).unwrap();

        let data = info.creation_data.unwrap();
        assert_eq!(data, &[0xaa, 0xbb, 0xcc]);
        assert_eq!(data.as_ptr(), bytes[bytes.len() - 4..].as_ptr());
        assert_eq!(cursor.remaining(), &[0x99]);
    }

    #[test]
    fn unknown_tag_is_kept() {
        let mut bytes = header(3, 0);
        bytes.push(0x8a);
        bytes.extend_from_slice(b"\0\0");

        let info = ControlInfo::read(&mut ByteCursor::new(&bytes)).unwrap();
        assert_eq!(info.class_name, ClassName::Builtin(BuiltinClass::Unknown(0x8a)));
        assert_eq!(info.window_name, WindowName::Text(AnsiStr::default()));
    }

    #[test]
    fn truncated_creation_data_is_an_error() {
        let mut bytes = header(3, 0);
        bytes.push(0x81);
        bytes.extend_from_slice(b"\0");
        bytes.extend_from_slice(&[5, 1, 2]);

        let err = ControlInfo::read(&mut ByteCursor::new(&bytes)).unwrap_err();
        assert!(matches!(
            err,
            DeserializationError::Truncated {
                what: "control.creation_data",
                need: 5,
                have: 2,
                ..
            }
        ));
    }
}
