//! Line obfuscation and the markers that control it.
//!
//! A game file may switch to XOR-obfuscated lines part way through: every
//! line after the `#encrypted` marker has each byte flipped. Line breaks are
//! never obfuscated.

/// Marker line after which every line is obfuscated.
pub const ENCRYPTED_MARKER: &str = "#encrypted";

/// Prefix of the header written by the preprocessor.
pub const PROCESSED_PREFIX: &str = "#processed:";

const KEY: u8 = 0xFF;

/// Flip every byte of one line.
pub fn xor_line(line: &[u8]) -> Vec<u8> {
    line.iter().map(|b| b ^ KEY).collect()
}

/// The version recorded in a `#processed:<version>` header, if `line` is
/// one.
pub fn processed_version(line: &str) -> Option<u32> {
    line.trim()
        .strip_prefix(PROCESSED_PREFIX)
        .and_then(|v| v.trim().parse().ok())
}

/// Split raw file bytes into numbered text lines, undoing obfuscation after
/// the `#encrypted` marker. The marker line is kept as written so that line
/// numbers match the file.
pub fn decode_lines(bytes: &[u8]) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut encrypted = false;

    for (index, raw) in bytes.split(|b| *b == b'\n').enumerate() {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        let number = index + 1;
        if !encrypted && contains_marker(raw) {
            encrypted = true;
            lines.push((number, String::from_utf8_lossy(raw).into_owned()));
            continue;
        }
        let text = if encrypted {
            let plain = xor_line(raw);
            let plain = plain.strip_suffix(b"\r").unwrap_or(&plain).to_vec();
            String::from_utf8_lossy(&plain).into_owned()
        } else {
            String::from_utf8_lossy(raw).into_owned()
        };
        lines.push((number, text));
    }
    lines
}

fn contains_marker(raw: &[u8]) -> bool {
    let marker = ENCRYPTED_MARKER.as_bytes();
    raw.windows(marker.len()).any(|w| w == marker)
}

/// Obfuscate `lines` for writing, inserting the marker before the first.
pub fn encode_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(ENCRYPTED_MARKER.as_bytes());
    out.push(b'\n');
    for line in lines {
        out.extend(xor_line(line.as_bytes()));
        out.push(b'\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_is_its_own_inverse() {
        let line = b"write \"hello\"";
        assert_eq!(xor_line(&xor_line(line)), line.to_vec());
        assert_ne!(xor_line(line), line.to_vec());
    }

    #[test]
    fn processed_header() {
        assert_eq!(processed_version("#processed:2"), Some(2));
        assert_eq!(processed_version("  #processed: 7 "), Some(7));
        assert_eq!(processed_version("#processed:x"), None);
        assert_eq!(processed_version("object lamp"), None);
    }

    #[test]
    fn decode_after_marker() {
        let mut bytes = b"#processed:2\n".to_vec();
        bytes.extend(encode_lines(["location cave", "object lamp"]));
        let lines = decode_lines(&bytes);
        let texts: Vec<&str> = lines.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(
            texts,
            vec!["#processed:2", "#encrypted", "location cave", "object lamp", ""]
        );
        assert_eq!(lines[2].0, 3);
    }

    #[test]
    fn plain_files_pass_through() {
        let lines = decode_lines(b"location cave\r\nobject lamp");
        assert_eq!(lines, vec![(1, "location cave".to_string()), (2, "object lamp".to_string())]);
    }
}
