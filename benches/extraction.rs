//! Benchmarks for the overlay extraction pipeline.
//!
//! Run with: cargo bench

use std::fmt::Write as _;
use std::io::{Cursor, Write};

use criterion::{Criterion, criterion_group, criterion_main};
use zip::write::SimpleFileOptions;

use geolay::color::decode_color;
use geolay::kml::KmlDocument;
use geolay::{DataUriTracker, Extractor, StyleCatalog};

/// A document with `n` styled polygons, each a 64-vertex ring.
fn synthetic_kml(n: usize) -> String {
    let mut doc = String::from("<kml><Document>");
    for i in 0..8 {
        let _ = write!(
            doc,
            "<Style id=\"s{i}\"><PolyStyle><color>7f{i:02x}34ff</color></PolyStyle>\
             <LineStyle><width>2</width></LineStyle></Style>\
             <StyleMap id=\"m{i}\"><Pair><key>normal</key><styleUrl>#s{i}</styleUrl></Pair></StyleMap>"
        );
    }
    for i in 0..n {
        let _ = write!(
            doc,
            "<Placemark><name>Parcel {i}</name><styleUrl>#m{}</styleUrl><Polygon><outerBoundaryIs><LinearRing><coordinates>",
            i % 8
        );
        for v in 0..64 {
            let angle = v as f64 / 64.0 * std::f64::consts::TAU;
            let _ = write!(
                doc,
                "{:.6},{:.6},0 ",
                (i % 100) as f64 + angle.cos() * 0.01,
                (i / 100) as f64 + angle.sin() * 0.01
            );
        }
        doc.push_str("</coordinates></LinearRing></outerBoundaryIs></Polygon></Placemark>");
    }
    doc.push_str("</Document></kml>");
    doc
}

fn synthetic_kmz(kml: &str) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    zip.start_file("doc.kml", options).unwrap();
    zip.write_all(kml.as_bytes()).unwrap();
    zip.start_file("files/icon.png", options).unwrap();
    zip.write_all(&[0x89, b'P', b'N', b'G', 0, 0, 0, 0]).unwrap();
    zip.finish().unwrap().into_inner()
}

// ============================================================================
// Pipeline Benchmarks
// ============================================================================

fn bench_process_kml(c: &mut Criterion) {
    let kml = synthetic_kml(500);
    let extractor = Extractor::new();
    c.bench_function("process_kml_500", |b| {
        b.iter(|| {
            extractor
                .process(kml.as_bytes(), &mut DataUriTracker::new())
                .unwrap()
        });
    });
}

fn bench_process_kmz(c: &mut Criterion) {
    let kmz = synthetic_kmz(&synthetic_kml(500));
    let extractor = Extractor::new();
    c.bench_function("process_kmz_500", |b| {
        b.iter(|| extractor.process(&kmz, &mut DataUriTracker::new()).unwrap());
    });
}

// ============================================================================
// Component Benchmarks
// ============================================================================

fn bench_parse_and_catalog(c: &mut Criterion) {
    let kml = synthetic_kml(500);
    c.bench_function("parse_kml_500", |b| {
        b.iter(|| KmlDocument::parse(&kml).unwrap());
    });

    let doc = KmlDocument::parse(&kml).unwrap();
    c.bench_function("style_catalog", |b| {
        b.iter(|| StyleCatalog::from_document(&doc));
    });
}

fn bench_decode_color(c: &mut Criterion) {
    c.bench_function("decode_color", |b| {
        b.iter(|| decode_color(std::hint::black_box("7f123456")));
    });
}

criterion_group!(
    benches,
    bench_process_kml,
    bench_process_kmz,
    bench_parse_and_catalog,
    bench_decode_color
);
criterion_main!(benches);
