use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

/// Render one full frame into `buf`: clear screen, frame text, progress line.
///
/// `position` is 1-based. Line feeds become CRLF so the layout holds in raw
/// mode as well.
pub fn render_frame(content: &str, position: usize, total: usize, buf: &mut Vec<u8>) -> std::io::Result<()> {
    buf.clear();

    queue!(buf, Clear(ClearType::All), MoveTo(0, 0))?;

    for (i, line) in content.split('\n').enumerate() {
        if i > 0 {
            buf.extend_from_slice(b"\r\n");
        }
        buf.extend_from_slice(line.trim_end_matches('\r').as_bytes());
    }

    buf.extend_from_slice(b"\r\n\r\n******\r\nframe ");
    write_usize(buf, position);
    buf.push(b'/');
    write_usize(buf, total);
    buf.extend_from_slice(b"\r\n");
    Ok(())
}

/// Integer-to-ASCII without going through `fmt`.
fn write_usize(buf: &mut Vec<u8>, v: usize) {
    let mut digits = [0u8; 20];
    let mut n = v;
    let mut i = digits.len();
    loop {
        i -= 1;
        digits[i] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    buf.extend_from_slice(&digits[i..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_layout() {
        let mut buf = Vec::new();
        render_frame("ab\ncd", 3, 12, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        // Clear + home come first.
        assert!(text.starts_with("\x1b[2J"));
        assert!(text.ends_with("ab\r\ncd\r\n\r\n******\r\nframe 3/12\r\n"));
    }

    #[test]
    fn crlf_input_is_not_doubled() {
        let mut buf = Vec::new();
        render_frame("ab\r\ncd", 1, 1, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("ab\r\ncd"));
        assert!(!text.contains("\r\r"));
    }

    #[test]
    fn buffer_is_reused() {
        let mut buf = Vec::new();
        render_frame("first", 1, 2, &mut buf).unwrap();
        render_frame("second", 2, 2, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(!text.contains("first"));
        assert!(text.contains("frame 2/2"));
    }

    #[test]
    fn usize_digits() {
        for v in [0usize, 7, 10, 99, 100, 474, 1_000_000] {
            let mut buf = Vec::new();
            write_usize(&mut buf, v);
            assert_eq!(String::from_utf8(buf).unwrap(), v.to_string());
        }
    }
}
