use slotbox_core::poc::{synthesize, PocKind};
use slotbox_core::preview::render_preview;
use slotbox_core::surface::has_risk_marker;
use slotbox_pdf::first_page_text;

#[test]
fn script_poc_visible_text_survives_extraction() {
    let doc = synthesize(PocKind::Script, None).expect("synthesize");
    let text = first_page_text(&doc.bytes).expect("text");
    assert!(text.contains("Documento de prueba - Riesgo de Seguridad"));
    assert!(text.contains("la frase que debe activar la alerta"));
}

#[test]
fn script_poc_trips_the_risk_marker_heuristic() {
    let doc = synthesize(PocKind::Script, None).expect("synthesize");
    assert!(has_risk_marker(&doc.bytes));
}

#[test]
fn extraction_reads_text_without_touching_the_script_payload() {
    // The extractor must not evaluate or surface the OpenAction payload:
    // only page text comes back.
    let doc = synthesize(PocKind::Script, None).expect("synthesize");
    let text = first_page_text(&doc.bytes).expect("text");
    assert!(!text.contains("app.alert"));
    assert!(!text.contains("robadas"));
}

#[test]
fn link_poc_preview_shows_the_target_url() {
    let doc = synthesize(PocKind::Link, Some("http://demo.local")).expect("synthesize");
    let text = first_page_text(&doc.bytes).expect("text");
    assert!(text.contains("http://demo.local/admin/change-email"));

    // And the preview card renders without executing anything embedded.
    let img = render_preview(&doc.bytes, &doc.name, &doc.name);
    let png = img.encode_png().expect("encode");
    assert!(!png.is_empty());
}
