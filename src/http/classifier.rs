//! Status-line classification of raw payload chunks.

use memchr::memchr;

/// Longest first line (terminator excluded) that is still considered.
pub const MAX_LINE_LEN: usize = 2048 - 1;

const HTTP_VERSIONS: [&[u8]; 2] = [b"HTTP/1.1", b"HTTP/1.0"];

/// Decide whether `data` begins a new HTTP response.
///
/// Unterminated, empty or oversized first lines are never a boundary.
#[must_use]
pub fn is_response_start(data: &[u8]) -> bool {
    let Some(line) = first_line(data) else {
        return false;
    };

    let mut tokens = line
        .split(u8::is_ascii_whitespace)
        .filter(|token| !token.is_empty());
    let (Some(version), Some(_status)) = (tokens.next(), tokens.next()) else {
        return false;
    };

    HTTP_VERSIONS
        .iter()
        .any(|known| version.eq_ignore_ascii_case(known))
}

/// Extract the first line of `data`.
///
/// The byte right before the line feed is treated as a one-byte marker
/// (normally `\r`) and dropped with it.
fn first_line(data: &[u8]) -> Option<&[u8]> {
    let window = &data[..data.len().min(MAX_LINE_LEN + 2)];
    let lf = memchr(b'\n', window)?;
    let end = lf.checked_sub(1)?;
    if end == 0 {
        return None;
    }
    Some(&data[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello", true)]
    #[case(b"HTTP/1.0 404 Not Found\n", true)]
    #[case(b"http/1.1 301 Moved Permanently\r\n", true)]
    #[case(b"HTTP/1.1 200\r\n", true)]
    #[case(b"HTTP/2 200\r\n", false)]
    #[case(b"HTTP/1.1\r\n", false)]
    #[case(b"some body fragment\n", false)]
    #[case(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n", false)]
    #[case(b"HTTP/1.1 200 OK", false)]
    #[case(b"\r\nHTTP/1.1 200 OK\r\n", false)]
    #[case(b"\n", false)]
    #[case(b"", false)]
    fn test_is_response_start(#[case] data: &[u8], #[case] expected: bool) {
        assert_eq!(is_response_start(data), expected);
    }

    #[test]
    fn test_bare_line_feed_drops_preceding_byte() {
        // "HTTP/1.1 2\n" loses its last byte and leaves a single token.
        assert!(!is_response_start(b"HTTP/1.1 2\n"));
        assert!(is_response_start(b"HTTP/1.1 20\n"));
    }

    #[test]
    fn test_oversized_line_is_not_a_boundary() {
        let mut data = b"HTTP/1.1 200 ".to_vec();
        data.resize(4096, b'x');
        data.extend_from_slice(b"\r\n");
        assert!(!is_response_start(&data));
    }

    #[test]
    fn test_line_at_length_limit() {
        let mut data = b"HTTP/1.1 200 ".to_vec();
        data.resize(MAX_LINE_LEN, b'x');
        data.extend_from_slice(b"\r\n");
        assert!(is_response_start(&data));

        let mut too_long = b"HTTP/1.1 200 ".to_vec();
        too_long.resize(MAX_LINE_LEN + 1, b'x');
        too_long.extend_from_slice(b"\r\n");
        assert!(!is_response_start(&too_long));
    }

    #[test]
    fn test_binary_payload() {
        assert!(!is_response_start(&[0xff, 0x00, 0x13, b'\n', 0x80]));
    }
}
