use chartmark::cache::ParseCache;
use chartmark::{ChartError, ViewMode};
use once_cell::sync::Lazy;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct ExportError {
    message: String,
}

#[derive(Serialize)]
struct LintEntry {
    message: String,
    section: String,
    bar: usize,
    symbol: String,
    severity: String,
}

/// Editors re-render on every keystroke, mostly with unchanged text
static CACHE: Lazy<ParseCache> = Lazy::new(ParseCache::default);

fn to_js_error(e: ChartError) -> JsValue {
    let error = ExportError {
        message: e.to_string(),
    };
    JsValue::from_str(&serde_json::to_string(&error).unwrap_or_else(|_| e.to_string()))
}

/// Render chart text as HTML in one of the views: "full", "chords", "lyrics"
/// or "one-line". Unknown view names fall back to the full view.
#[wasm_bindgen]
pub fn render(source: &str, view: &str) -> String {
    let mode = view.parse::<ViewMode>().unwrap_or_default();
    match CACHE.get_or_parse(source) {
        Ok(doc) => chartmark::render(doc.as_deref(), mode),
        Err(_) => chartmark::render_source(source, mode),
    }
}

/// Chart text written back in the canonical bar-line form
#[wasm_bindgen]
pub fn serialize(source: &str) -> Result<String, JsValue> {
    let doc = CACHE.get_or_parse(source).map_err(to_js_error)?;
    Ok(doc.map(|doc| chartmark::serialize(&doc)).unwrap_or_default())
}

/// Transpose chart text by a number of semitones
#[wasm_bindgen]
pub fn transpose(source: &str, semitones: i32) -> Result<String, JsValue> {
    chartmark::api::transpose(source, semitones).map_err(to_js_error)
}

/// Timed chord events as a JS object: `{ events, totalBeats }`
#[wasm_bindgen]
pub fn events(source: &str) -> Result<JsValue, JsValue> {
    let doc = CACHE.get_or_parse(source).map_err(to_js_error)?;
    let timeline = doc
        .map(|doc| chartmark::extract_timeline(&doc))
        .unwrap_or_default();
    serde_wasm_bindgen::to_value(&timeline).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Standard MIDI File bytes. A tempo of 0 uses the chart's own tempo.
#[wasm_bindgen]
pub fn export_midi(source: &str, tempo: u16) -> Result<Vec<u8>, JsValue> {
    let doc = CACHE
        .get_or_parse(source)
        .map_err(to_js_error)?
        .ok_or_else(|| to_js_error(ChartError::NoSections))?;
    let tempo = chartmark::effective_tempo(Some(&doc), (tempo > 0).then_some(tempo));
    chartmark::export_document(&doc, tempo).map_err(to_js_error)
}

/// Lint chart text and return the findings as a JSON array
#[wasm_bindgen]
pub fn lint(source: &str) -> String {
    let entries: Vec<LintEntry> = match CACHE.get_or_parse(source) {
        Ok(Some(doc)) => chartmark::lint(&doc)
            .into_iter()
            .map(|diagnostic| LintEntry {
                message: diagnostic.to_string(),
                section: diagnostic.section,
                bar: diagnostic.bar,
                symbol: diagnostic.symbol,
                severity: "warning".to_string(),
            })
            .collect(),
        Ok(None) => Vec::new(),
        Err(e) => vec![LintEntry {
            message: e.to_string(),
            section: String::new(),
            bar: 0,
            symbol: String::new(),
            severity: "error".to_string(),
        }],
    };

    serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string())
}
