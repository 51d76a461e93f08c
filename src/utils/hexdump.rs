use std::cmp;
use std::fmt::Write;

/// Renders `data` in canonical hex display: the offset in hexadecimal, followed by sixteen
/// space-separated two-column bytes, followed by the same bytes as printable ASCII between `|`.
///
/// `offset` is added to every printed address, so a sub-slice can be shown with the addresses it
/// has in its containing buffer.
pub fn hexdump(data: &[u8], offset: usize) -> String {
    let mut out = String::with_capacity((data.len() / 16 + 1) * 78);
    for (row, line) in data.chunks(16).enumerate() {
        write_line(&mut out, line, offset + row * 16);
    }
    out
}

fn write_line(out: &mut String, line: &[u8], address: usize) {
    let _ = write!(out, "{address:08x}:");
    for b in line {
        let _ = write!(out, " {b:02x}");
    }
    for _ in line.len()..16 {
        out.push_str("   ");
    }

    out.push_str("  |");
    for &c in line {
        // replace all control chars with dots
        match (c as char).is_ascii_graphic() || c == b' ' {
            true => out.push(c as char),
            false => out.push('.'),
        }
    }
    out.push_str("|\n");
}

/// Renders up to `radius` bytes on each side of `offset`, for diagnosing a malformed template.
pub(crate) fn dump_around(buf: &[u8], offset: usize, radius: usize) -> String {
    let offset = cmp::min(offset, buf.len());
    let start = offset.saturating_sub(radius) & !0xf;
    let end = cmp::min(offset.saturating_add(radius), buf.len());
    hexdump(&buf[start..end], start)
}
