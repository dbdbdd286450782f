use std::fs;
use std::process;

use argh::FromArgs;
use chartmark::{
    effective_tempo, export_document, extract_timeline, lint, parse, render, serialize,
    transpose_document, ChartError, ViewMode,
};

/// Render a chord chart, or export it as MIDI
#[derive(FromArgs)]
struct Args {
    /// view to print: full, chords, lyrics, one-line, text or events
    #[argh(option, default = "String::from(\"full\")")]
    view: String,

    /// write a MIDI file to this path instead of printing a view
    #[argh(option)]
    midi: Option<String>,

    /// tempo in BPM (defaults to the chart's own tempo, then 120)
    #[argh(option)]
    tempo: Option<u16>,

    /// transpose by this many semitones
    #[argh(option, default = "0")]
    transpose: i32,

    /// input chart file
    #[argh(positional)]
    input: String,
}

fn main() {
    env_logger::init();
    let args: Args = argh::from_env();

    let source = match fs::read_to_string(&args.input) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", args.input, e);
            process::exit(1);
        }
    };

    let doc = match parse(&source) {
        Ok(doc) => doc.map(|doc| transpose_document(&doc, args.transpose)),
        Err(e) => {
            eprintln!("Parse error: {}", e);
            process::exit(1);
        }
    };

    if let Some(doc) = &doc {
        for diagnostic in lint(doc) {
            log::warn!("{}", diagnostic);
        }
    }

    if let Some(path) = &args.midi {
        let tempo = effective_tempo(doc.as_ref(), args.tempo);
        let exported = match &doc {
            Some(doc) => export_document(doc, tempo),
            None => Err(ChartError::NoSections),
        };
        let bytes = match exported {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("MIDI export error: {}", e);
                process::exit(1);
            }
        };
        if let Err(e) = fs::write(path, &bytes) {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        }
        eprintln!("Wrote {} bytes of MIDI at {} BPM to {}", bytes.len(), tempo, path);
        return;
    }

    let output = match args.view.as_str() {
        "text" => doc.as_ref().map(serialize).unwrap_or_default(),
        "events" => {
            let timeline = doc.as_ref().map(extract_timeline).unwrap_or_default();
            match serde_json::to_string_pretty(&timeline) {
                Ok(json) => json,
                Err(e) => {
                    eprintln!("Error encoding events: {}", e);
                    process::exit(1);
                }
            }
        }
        view => match view.parse::<ViewMode>() {
            Ok(mode) => render(doc.as_ref(), mode),
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        },
    };

    println!("{}", output);
}
