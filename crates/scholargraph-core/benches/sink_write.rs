use scholargraph_core::BatchedSink;

const HEADER: &[&str] = &["paperID", "title"];

fn synthetic_rows(n: usize) -> Vec<(String, String)> {
    (0..n)
        .map(|i| (format!("paper-{i:08}"), format!("Title for record {i}")))
        .collect()
}

#[divan::bench(args = [1_000, 10_000, 100_000])]
fn batched_csv_write(bencher: divan::Bencher, batch_size: usize) {
    let rows = synthetic_rows(100_000);
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("nodes-bench-{batch}.csv").display().to_string();
    bencher.bench(|| {
        let mut sink = BatchedSink::new(template.clone(), HEADER, batch_size).unwrap();
        for row in &rows {
            sink.write(row).unwrap();
        }
        sink.finish().unwrap();
    });
}

fn main() {
    divan::main();
}
