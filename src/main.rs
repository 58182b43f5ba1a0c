// A small end-to-end demo: classify points drawn from two noisy clusters.
use std::error::Error;
use std::fmt::Write as _;

use knnflow::{Classify, L2Dist, Pipeline, TrainingSet, Voter, DEFAULT_K};
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

fn blob_lines<R: Rng>(rng: &mut R, count: usize, center: (f64, f64), label: &str) -> String {
    let mut lines = String::new();
    for _ in 0..count {
        let x = center.0 + rng.random_range(-1.5..1.5);
        let y = center.1 + rng.random_range(-1.5..1.5);
        let _ = writeln!(lines, "{:.3} {:.3} {}", x, y, label);
    }
    lines
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // Seeded generation keeps the demo reproducible.
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
    let mut train = blob_lines(&mut rng, 20, (0.0, 0.0), "inner");
    train.push_str(&blob_lines(&mut rng, 20, (8.0, 8.0), "outer"));

    let test = "0.5 0.5\n7.5 8.5\n4.0 4.0\n-1.0 0.0\n9.0 7.0\n";

    let training: TrainingSet<f64> = TrainingSet::from_reader(train.as_bytes())?;
    let pipeline = Pipeline::new(Classify::new(training, L2Dist), Voter::new(DEFAULT_K)?);

    let mut out = Vec::new();
    let stats = pipeline.run_readers(test.as_bytes(), &mut out)?;

    println!("predictions (k = {}):", DEFAULT_K);
    print!("{}", String::from_utf8(out)?);
    println!(
        "{} test records, {} emissions, {} keys",
        stats.tests_seen, stats.records_emitted, stats.groups
    );
    Ok(())
}
