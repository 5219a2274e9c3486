//! Single-page PDF writer for demo PoC documents.
//!
//! Emits a complete PDF 1.4 byte stream with a real xref table: catalog,
//! page tree, one 612x792 page, a Helvetica text content stream, and
//! optionally a `/Link` annotation (URI action) and document-level
//! JavaScript wired through both `/OpenAction` and the `/Names /JavaScript`
//! tree. Output is all-or-nothing: a failed build returns an error, never a
//! truncated byte stream.

use thiserror::Error;

/// A positioned line of visible page text. Coordinates are PDF user-space
/// points with the origin at the lower-left corner of the page.
#[derive(Debug, Clone)]
pub struct TextLine {
    pub x: i32,
    pub y: i32,
    pub text: String,
}

/// A clickable rectangle whose activation issues a GET against `uri`.
#[derive(Debug, Clone)]
pub struct LinkRegion {
    /// `[llx, lly, urx, ury]` in page user space.
    pub rect: [i32; 4],
    pub uri: String,
}

/// Declarative description of the document to emit.
#[derive(Debug, Clone, Default)]
pub struct DocumentSpec {
    pub lines: Vec<TextLine>,
    pub link: Option<LinkRegion>,
    /// Script attached at document level; runs on open in script-capable
    /// viewers. The composer treats it as an opaque string and performs no
    /// interpolation of its own.
    pub javascript: Option<String>,
}

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("document spec has no visible text lines")]
    EmptySpec,
}

const PAGE_WIDTH: i32 = 612;
const PAGE_HEIGHT: i32 = 792;
const FONT_SIZE: i32 = 12;

/// Build the PDF byte stream described by `spec`.
pub fn compose_document(spec: &DocumentSpec) -> Result<Vec<u8>, ComposeError> {
    if spec.lines.is_empty() {
        return Err(ComposeError::EmptySpec);
    }

    // Fixed ids 1..=5, then optional JS action and link annotation.
    let js_id: Option<u32> = spec.javascript.as_ref().map(|_| 6);
    let link_id: Option<u32> = spec.link.as_ref().map(|_| if js_id.is_some() { 7 } else { 6 });
    let max_id = link_id.or(js_id).unwrap_or(5);

    let mut objects: Vec<(u32, Vec<u8>)> = Vec::new();

    let mut catalog = String::from("<< /Type /Catalog /Pages 2 0 R");
    if let Some(js) = js_id {
        catalog.push_str(&format!(
            " /OpenAction {js} 0 R /Names << /JavaScript << /Names [(EmbeddedJS) {js} 0 R] >> >>"
        ));
    }
    catalog.push_str(" >>");
    objects.push((1, dict_object(&catalog)));

    objects.push((2, dict_object("<< /Type /Pages /Count 1 /Kids [3 0 R] >>")));

    let mut page = format!(
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R"
    );
    if let Some(link) = link_id {
        page.push_str(&format!(" /Annots [{link} 0 R]"));
    }
    page.push_str(" >>");
    objects.push((3, dict_object(&page)));

    objects.push((4, stream_object(&content_stream(&spec.lines))));

    objects.push((
        5,
        dict_object(
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
        ),
    ));

    if let (Some(id), Some(js)) = (js_id, spec.javascript.as_ref()) {
        let mut body = b"<< /S /JavaScript /JS (".to_vec();
        body.extend_from_slice(&escape_pdf_string(js));
        body.extend_from_slice(b") >>");
        objects.push((id, dict_object_bytes(&body)));
    }

    if let (Some(id), Some(link)) = (link_id, spec.link.as_ref()) {
        let [llx, lly, urx, ury] = link.rect;
        let mut body = format!(
            "<< /Type /Annot /Subtype /Link /Rect [{llx} {lly} {urx} {ury}] /Border [0 0 0] \
             /A << /S /URI /URI ("
        )
        .into_bytes();
        body.extend_from_slice(&escape_pdf_string(&link.uri));
        body.extend_from_slice(b") >> >>");
        objects.push((id, dict_object_bytes(&body)));
    }

    Ok(assemble(&objects, max_id))
}

/// Serialise objects in id order with a correct xref table and trailer.
fn assemble(objects: &[(u32, Vec<u8>)], max_id: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n");

    let size = max_id as usize + 1;
    let mut offsets = vec![0usize; size];
    for (id, body) in objects {
        offsets[*id as usize] = out.len();
        out.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
        out.extend_from_slice(body);
        out.extend_from_slice(b"\nendobj\n");
    }

    let startxref = out.len();
    out.extend_from_slice(format!("xref\n0 {size}\n").as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets.iter().skip(1) {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(format!("trailer\n<< /Size {size} /Root 1 0 R >>\nstartxref\n").as_bytes());
    out.extend_from_slice(startxref.to_string().as_bytes());
    out.extend_from_slice(b"\n%%EOF\n");
    out
}

fn dict_object(body: &str) -> Vec<u8> {
    body.as_bytes().to_vec()
}

fn dict_object_bytes(body: &[u8]) -> Vec<u8> {
    body.to_vec()
}

fn stream_object(data: &[u8]) -> Vec<u8> {
    let mut out = format!("<< /Length {} >>\nstream\n", data.len()).into_bytes();
    out.extend_from_slice(data);
    out.extend_from_slice(b"\nendstream");
    out
}

fn content_stream(lines: &[TextLine]) -> Vec<u8> {
    let mut out = Vec::new();
    for line in lines {
        out.extend_from_slice(
            format!("BT /F1 {FONT_SIZE} Tf {} {} Td (", line.x, line.y).as_bytes(),
        );
        out.extend_from_slice(&escape_pdf_string(&line.text));
        out.extend_from_slice(b") Tj ET\n");
    }
    out
}

/// Encode text as a PDF literal string body: Latin-1 bytes with `\`, `(`,
/// `)` and line breaks escaped. Characters outside Latin-1 degrade to `?`.
fn escape_pdf_string(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.extend_from_slice(b"\\\\"),
            '(' => out.extend_from_slice(b"\\("),
            ')' => out.extend_from_slice(b"\\)"),
            '\n' => out.extend_from_slice(b"\\n"),
            '\r' => out.extend_from_slice(b"\\r"),
            c if (c as u32) < 0x100 => out.push(c as u32 as u8),
            _ => out.push(b'?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(bytes: &[u8], needle: &[u8]) -> bool {
        bytes.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn composed_document_has_header_xref_and_eof() {
        let spec = DocumentSpec {
            lines: vec![TextLine { x: 100, y: 750, text: "hello".into() }],
            ..Default::default()
        };
        let bytes = compose_document(&spec).expect("compose");
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(window(&bytes, b"xref\n0 6\n"));
        assert!(bytes.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn empty_spec_is_rejected() {
        assert!(matches!(
            compose_document(&DocumentSpec::default()),
            Err(ComposeError::EmptySpec)
        ));
    }

    #[test]
    fn javascript_is_wired_through_open_action_and_names_tree() {
        let spec = DocumentSpec {
            lines: vec![TextLine { x: 100, y: 750, text: "demo".into() }],
            javascript: Some("app.alert(1);".into()),
            ..Default::default()
        };
        let bytes = compose_document(&spec).expect("compose");
        assert!(window(&bytes, b"/OpenAction 6 0 R"));
        assert!(window(&bytes, b"/Names [(EmbeddedJS) 6 0 R]"));
        assert!(window(&bytes, b"/S /JavaScript /JS (app.alert\\(1\\);)"));
    }

    #[test]
    fn link_annotation_carries_rect_and_uri() {
        let spec = DocumentSpec {
            lines: vec![TextLine { x: 100, y: 700, text: "click".into() }],
            link: Some(LinkRegion {
                rect: [160, 688, 460, 708],
                uri: "http://127.0.0.1:5000/x?a=b".into(),
            }),
            ..Default::default()
        };
        let bytes = compose_document(&spec).expect("compose");
        assert!(window(&bytes, b"/Rect [160 688 460 708]"));
        assert!(window(&bytes, b"/S /URI /URI (http://127.0.0.1:5000/x?a=b)"));
        // Without JavaScript the annotation takes object id 6.
        assert!(window(&bytes, b"/Annots [6 0 R]"));
    }

    #[test]
    fn string_escaping_keeps_latin1_and_drops_wide_chars() {
        let escaped = escape_pdf_string("a(b)c\\ ñ 漢");
        assert_eq!(escaped, b"a\\(b\\)c\\\\ \xf1 ?".to_vec());
    }
}
