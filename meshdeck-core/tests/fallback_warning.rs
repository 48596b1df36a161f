use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use meshdeck_core::mesh::{convert, ConversionOptions};
use meshdeck_core::{ElementType, GenericMesh};

struct Capture(Mutex<Vec<(Level, String)>>);

impl Log for Capture {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut lines) = self.0.lock() {
            lines.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

const VERTICES: [f64; 12] = [
    0.0, 0.0, 0.0, //
    1.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, //
    0.0, 0.0, 1.0,
];

#[test]
fn unknown_code_warning_names_the_cell() {
    log::set_logger(&CAPTURE).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let mesh = GenericMesh::new(&VERTICES, &[0, 1, 2, 3, 0, 2, 1, 3], &[10, 250]);
    let converted = convert(&mesh, &ConversionOptions::default()).unwrap();
    assert_eq!(converted.elements[1].element_type, ElementType::Tet4);
    assert_eq!(converted.stats.n_fallback_cells, 1);

    let lines = CAPTURE.0.lock().unwrap();
    let warnings: Vec<&String> = lines
        .iter()
        .filter(|(level, _)| *level == Level::Warn)
        .map(|(_, line)| line)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("cell 1"));
    assert!(warnings[0].contains("element 2"));
    assert!(warnings[0].contains("250"));
    assert!(!lines
        .iter()
        .any(|(level, line)| *level == Level::Debug && line.contains("cell 1")));
}
