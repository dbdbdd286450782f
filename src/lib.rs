pub mod api;
pub mod ast;
pub mod cache;
pub mod chord;
pub mod error;
pub mod lexer;
pub mod midi;
pub mod parser;
pub mod pitch;
pub mod playback;
pub mod render;
pub mod semantic;
pub mod transpose;

pub use api::{effective_tempo, export_document, export_midi};
pub use ast::*;
pub use chord::{resolve, Chord};
pub use error::*;
pub use midi::{encode_midi, encode_timeline};
pub use parser::{parse, parse_chart};
pub use pitch::Pitch;
pub use playback::{event_at, extract_events, extract_timeline, ChordEvent, Player, Timeline};
pub use render::{render, render_source, serialize, ViewMode};
pub use semantic::{lint, validate};
pub use transpose::transpose_document;
