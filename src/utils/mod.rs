mod ansi;
mod byte_cursor;
pub(crate) mod bytes;
mod hexdump;

pub(crate) use self::ansi::{ansi_to_utf16, decode_ansi};
pub use self::byte_cursor::ByteCursor;
pub(crate) use self::hexdump::dump_around;
pub use self::hexdump::hexdump;
