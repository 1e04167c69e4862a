use data_loader::{MovieLensPaths, load_split};
use std::path::Path;
use std::time::Instant;

fn main() {
    let paths = MovieLensPaths::in_root(Path::new("data"));

    println!("Loading MovieLens 100k split...\n");

    let start = Instant::now();
    let mut split = load_split(&paths, 64).expect("Failed to load dataset");
    let elapsed = start.elapsed();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Train ratings: {}", split.train.len());
    println!("Test ratings: {}", split.test.len());
    println!("Users: {}", split.bounds.num_users);
    println!("Items: {}", split.bounds.num_items);

    let start = Instant::now();
    split.train.reset();
    let batches = split.train.batches().count();
    let elapsed = start.elapsed();
    println!(
        "\nShuffled and sliced {} batches in {:?} ({:.0} ratings/second)",
        batches,
        elapsed,
        (batches * split.train.batch_size()) as f64 / elapsed.as_secs_f64()
    );
}
