//! Performance benchmarks for the request pipeline

use server::{decide, reconstruct};
use shared::{decode, encode, StrokeEvent};
use std::time::Instant;

fn zigzag(events: usize) -> Vec<StrokeEvent> {
    let mut drawing = vec![StrokeEvent::press(0, 0)];
    for i in 1..events {
        let x = ((i * 37) % 800) as i32;
        let y = ((i * 53) % 600) as i32;
        drawing.push(StrokeEvent::moved(x, y));
    }
    drawing
}

/// Benchmarks replaying a long stroke sequence
#[test]
fn benchmark_reconstruction() {
    let drawing = zigzag(2_000);

    let start = Instant::now();
    let canvas = reconstruct(&drawing);
    let duration = start.elapsed();

    println!(
        "Reconstruction: {} events in {:?} ({:.2} μs/event)",
        drawing.len(),
        duration,
        duration.as_micros() as f64 / drawing.len() as f64
    );

    assert!(!canvas.is_blank());
    // Generous bound for unoptimised builds
    assert!(duration.as_secs() < 10);
}

/// Benchmarks replay cost of clears, which touch every pixel
#[test]
fn benchmark_clears() {
    let drawing: Vec<StrokeEvent> = (0..100)
        .flat_map(|i| [StrokeEvent::press(i, i), StrokeEvent::clear()])
        .collect();

    let start = Instant::now();
    let canvas = reconstruct(&drawing);
    let duration = start.elapsed();

    println!("100 clears in {:?}", duration);
    assert!(canvas.is_blank());
    assert!(duration.as_secs() < 10);
}

/// Benchmarks framing a large payload through an in-memory stream
#[tokio::test]
async fn benchmark_frame_roundtrip() {
    let payload = vec![b'x'; 4 * 1024 * 1024];
    let iterations = 10;

    let start = Instant::now();
    for _ in 0..iterations {
        let frame = encode(&payload).unwrap();
        let mut stream = &frame[..];
        let decoded = decode(&mut stream).await.unwrap();
        assert_eq!(decoded.len(), payload.len());
    }
    let duration = start.elapsed();

    println!(
        "Frame roundtrip: {} x {} bytes in {:?}",
        iterations,
        payload.len(),
        duration
    );
    assert!(duration.as_secs() < 10);
}

/// Benchmarks the verdict step over a large candidate list
#[test]
fn benchmark_decision() {
    let candidates: Vec<String> = (0..10_000).map(|i| format!("word{}", i)).collect();
    let probs = vec![1.0 / candidates.len() as f64; candidates.len()];

    let iterations = 100;
    let start = Instant::now();
    for _ in 0..iterations {
        let result = decide(&candidates, "word9999", &probs).unwrap();
        assert_eq!(result.predicted_word, "word0");
    }
    let duration = start.elapsed();

    println!(
        "Decision: {} iterations over {} candidates in {:?}",
        iterations,
        candidates.len(),
        duration
    );
    assert!(duration.as_secs() < 5);
}
