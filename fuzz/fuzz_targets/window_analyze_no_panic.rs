// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

#[path = "common.rs"]
mod common;

use libfuzzer_sys::fuzz_target;
use nlid_core::SignalView;
use nlid_recurrence::{EmbeddingParams, ThresholdSpec, WindowAnalyzer};

fn build_threshold(mode_seed: u8, value_seed: u8) -> ThresholdSpec {
    match mode_seed % 4 {
        0 => ThresholdSpec::Static {
            threshold: f64::from(value_seed) / 16.0,
        },
        1 => ThresholdSpec::Dynamic {
            fraction: f64::from(value_seed) / 255.0,
        },
        2 => ThresholdSpec::Static {
            threshold: -f64::from(value_seed),
        },
        _ => ThresholdSpec::default(),
    }
}

fn sanitize(value: f64, mode_seed: u8) -> f64 {
    match mode_seed % 5 {
        0 => value,
        1 => f64::NAN,
        2 => f64::INFINITY,
        _ if value.is_finite() => value.clamp(-1.0e150, 1.0e150),
        _ => 0.0,
    }
}

fuzz_target!(|data: &[u8]| {
    let mut cursor = common::ByteCursor::new(data);

    let params = EmbeddingParams {
        dimension: common::bounded(cursor.next_u8(), 0, 6),
        delay: common::bounded(cursor.next_u8(), 0, 8),
    };
    let threshold = build_threshold(cursor.next_u8(), cursor.next_u8());
    let Ok(analyzer) = WindowAnalyzer::new(params, threshold) else {
        return;
    };

    let len = common::bounded(cursor.next_u8(), 0, 96);
    let raw_x = common::decode_f64_chunks(&cursor.take_padded(len * 8), len);
    let raw_y = common::decode_f64_chunks(&cursor.take_padded(len * 8), len);
    let mode_seed = cursor.next_u8();
    let x: Vec<f64> = raw_x.iter().map(|&v| sanitize(v, mode_seed)).collect();
    let y: Vec<f64> = raw_y.iter().map(|&v| sanitize(v, mode_seed / 5)).collect();

    let (Ok(view_x), Ok(view_y)) = (SignalView::new(&x), SignalView::new(&y)) else {
        return;
    };

    if let Ok(analysis) = analyzer.analyze(&view_x, &view_y) {
        let coupling = analysis.result;
        assert!((0.0..=1.0).contains(&coupling.x_given_y));
        assert!((0.0..=1.0).contains(&coupling.y_given_x));
    }
});
