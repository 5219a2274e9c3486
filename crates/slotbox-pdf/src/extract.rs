//! Non-executing first-page text extraction.
//!
//! This is a pure read over untrusted bytes: stream bodies are carved and
//! inflated under hard caps, and only text-show operands (`Tj`, `'`, `"`,
//! `TJ`) are interpreted. Action dictionaries (`/OpenAction`, `/AA`, `/A`),
//! names trees and embedded scripts are never resolved or evaluated. Every
//! loop is bounded; hostile input yields `None`, never a panic.

use std::io::Read;

use tracing::debug;

const MAX_STREAMS_SCANNED: usize = 64;
const MAX_STREAM_INPUT: usize = 4 * 1024 * 1024;
const MAX_DECODED_BYTES: usize = 1024 * 1024;
const MAX_TEXT_BYTES: usize = 4096;

/// Extract the visible text of the first text-bearing content stream, in
/// file order. Returns `None` when no stream yields any text.
pub fn first_page_text(bytes: &[u8]) -> Option<String> {
    let mut cursor = 0usize;
    for _ in 0..MAX_STREAMS_SCANNED {
        let (body, next) = next_stream_body(bytes, cursor)?;
        cursor = next;
        if body.len() > MAX_STREAM_INPUT {
            continue;
        }
        let decoded = decode_body(body);
        let strings = show_strings(&decoded);
        if !strings.is_empty() {
            let mut text = strings.join(" ");
            if text.len() > MAX_TEXT_BYTES {
                let mut cut = MAX_TEXT_BYTES;
                while !text.is_char_boundary(cut) {
                    cut -= 1;
                }
                text.truncate(cut);
            }
            return Some(text);
        }
    }
    None
}

/// Carve the next `stream … endstream` body at or after `from`.
/// Returns the body slice and the scan position after `endstream`.
fn next_stream_body(bytes: &[u8], from: usize) -> Option<(&[u8], usize)> {
    let rel = find(&bytes[from.min(bytes.len())..], b"stream")?;
    let kw_end = from + rel + b"stream".len();
    // Skip the EOL that terminates the `stream` keyword.
    let mut start = kw_end;
    if bytes.get(start) == Some(&b'\r') {
        start += 1;
    }
    if bytes.get(start) == Some(&b'\n') {
        start += 1;
    }
    let end_rel = find(&bytes[start..], b"endstream")?;
    Some((&bytes[start..start + end_rel], start + end_rel + b"endstream".len()))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Inflate zlib-looking bodies under a hard output cap; anything else is
/// taken raw. A corrupt deflate stream yields whatever decoded cleanly.
fn decode_body(body: &[u8]) -> Vec<u8> {
    if body.first() != Some(&0x78) {
        return body[..body.len().min(MAX_DECODED_BYTES)].to_vec();
    }
    let mut decoder = flate2::read::ZlibDecoder::new(body);
    let mut out = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        match decoder.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                if out.len() + n > MAX_DECODED_BYTES {
                    out.extend_from_slice(&buf[..MAX_DECODED_BYTES - out.len()]);
                    break;
                }
                out.extend_from_slice(&buf[..n]);
            }
            Err(err) => {
                debug!(error = %err, "flate decode stopped early");
                break;
            }
        }
    }
    out
}

/// Collect operand strings of text-show operators from a decoded content
/// stream. Streams with no `BT` text object are skipped outright.
fn show_strings(decoded: &[u8]) -> Vec<String> {
    if find(decoded, b"BT").is_none() {
        return Vec::new();
    }
    let mut strings = Vec::new();
    let mut i = 0usize;
    while i < decoded.len() && strings.len() < 256 {
        match decoded[i] {
            b'(' => {
                let (raw, next) = scan_literal(decoded, i);
                i = next;
                if operator_follows(decoded, i, &[b"Tj", b"'", b"\""]) {
                    push_text(&mut strings, &raw);
                }
            }
            b'[' => {
                let (fragments, next) = scan_array(decoded, i);
                i = next;
                if operator_follows(decoded, i, &[b"TJ"]) {
                    for raw in fragments {
                        push_text(&mut strings, &raw);
                    }
                }
            }
            _ => i += 1,
        }
    }
    strings
}

fn push_text(strings: &mut Vec<String>, raw: &[u8]) {
    if raw.is_empty() {
        return;
    }
    // Latin-1 byte-to-char mapping; matches the WinAnsi text the demo
    // composer emits and degrades losslessly for plain ASCII.
    let text: String = raw.iter().map(|&b| b as char).collect();
    if !text.trim().is_empty() {
        strings.push(text);
    }
}

/// Scan a `(…)` literal starting at `open`, honouring nesting, backslash
/// escapes and octal codes. Returns the unescaped bytes and the index just
/// past the closing parenthesis.
fn scan_literal(bytes: &[u8], open: usize) -> (Vec<u8>, usize) {
    let mut out = Vec::new();
    let mut depth = 1i32;
    let mut i = open + 1;
    while i < bytes.len() && depth > 0 && out.len() < MAX_TEXT_BYTES {
        match bytes[i] {
            b'\\' => {
                i += 1;
                match bytes.get(i) {
                    Some(b'n') => out.push(b'\n'),
                    Some(b'r') => out.push(b'\r'),
                    Some(b't') => out.push(b'\t'),
                    Some(&c @ b'0'..=b'7') => {
                        let mut value = (c - b'0') as u32;
                        for _ in 0..2 {
                            match bytes.get(i + 1) {
                                Some(&d @ b'0'..=b'7') => {
                                    value = value * 8 + (d - b'0') as u32;
                                    i += 1;
                                }
                                _ => break,
                            }
                        }
                        out.push((value & 0xff) as u8);
                    }
                    Some(&c) => out.push(c),
                    None => break,
                }
                i += 1;
            }
            b'(' => {
                depth += 1;
                out.push(b'(');
                i += 1;
            }
            b')' => {
                depth -= 1;
                if depth > 0 {
                    out.push(b')');
                }
                i += 1;
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    (out, i)
}

/// Scan a `[…]` TJ array starting at `open`, collecting literal-string
/// fragments and skipping kern offsets. Returns the index just past `]`.
fn scan_array(bytes: &[u8], open: usize) -> (Vec<Vec<u8>>, usize) {
    let mut fragments = Vec::new();
    let mut i = open + 1;
    while i < bytes.len() && fragments.len() < 256 {
        match bytes[i] {
            b']' => return (fragments, i + 1),
            b'(' => {
                let (raw, next) = scan_literal(bytes, i);
                fragments.push(raw);
                i = next;
            }
            _ => i += 1,
        }
    }
    (fragments, i)
}

/// True when the next non-whitespace token at `at` is one of `candidates`.
fn operator_follows(bytes: &[u8], at: usize, candidates: &[&[u8]]) -> bool {
    let mut i = at;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    let start = i;
    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && i - start < 4 {
        i += 1;
    }
    let token = &bytes[start..i];
    candidates.iter().any(|c| *c == token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap_stream(content: &[u8]) -> Vec<u8> {
        let mut pdf = b"%PDF-1.4\n4 0 obj\n<< /Length 0 >>\nstream\n".to_vec();
        pdf.extend_from_slice(content);
        pdf.extend_from_slice(b"\nendstream\nendobj\n%%EOF\n");
        pdf
    }

    #[test]
    fn reads_tj_and_quote_operands() {
        let pdf = wrap_stream(b"BT /F1 12 Tf 10 20 Td (hola) Tj (mundo) ' ET");
        assert_eq!(first_page_text(&pdf).as_deref(), Some("hola mundo"));
    }

    #[test]
    fn reads_tj_array_fragments_and_skips_kerns() {
        let pdf = wrap_stream(b"BT [(ab) -120 (cd) 40 (ef)] TJ ET");
        assert_eq!(first_page_text(&pdf).as_deref(), Some("ab cd ef"));
    }

    #[test]
    fn ignores_strings_that_are_not_shown() {
        // A URI action string inside the stream body must not leak into the
        // extracted text: only show-operator operands count.
        let pdf = wrap_stream(b"BT (shown) Tj ET /A << /S /URI /URI (http://evil) >>");
        assert_eq!(first_page_text(&pdf).as_deref(), Some("shown"));
    }

    #[test]
    fn unescapes_octal_and_specials() {
        let pdf = wrap_stream(b"BT (a\\(b\\)c \\361 x) Tj ET");
        assert_eq!(first_page_text(&pdf).as_deref(), Some("a(b)c ñ x"));
    }

    #[test]
    fn textless_and_hostile_inputs_yield_none() {
        assert_eq!(first_page_text(b""), None);
        assert_eq!(first_page_text(b"%PDF-1.4 nothing here"), None);
        assert_eq!(first_page_text(&wrap_stream(b"0 0 100 100 re f")), None);
        // Unterminated constructs must not loop or panic.
        assert_eq!(first_page_text(b"stream\nBT ((((( \\"), None);
    }
}
