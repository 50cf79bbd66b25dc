use clap::Parser;
use symtab::SequenceMap;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Number of identifiers to insert; defaults to the table capacity
    #[arg(short = 'n', long = "count")]
    count: Option<usize>,
}

fn identifier(i: usize) -> String {
    format!("sym_{i}_t")
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating SequenceMap with target capacity: {}",
        args.target_capacity
    );

    let mut map: SequenceMap<usize> = SequenceMap::with_capacity(args.target_capacity);

    println!("Actual capacity: {}", map.capacity());
    let count = args.count.unwrap_or(map.capacity());
    println!("Filling map with {count} identifiers...");

    for i in 0..count {
        if map.insert(identifier(i).as_bytes(), i).is_some() {
            panic!("Identifier already exists in map: {}", identifier(i));
        }
    }

    println!("Inserted {} identifiers into map", map.len());
    println!(
        "Final load factor: {:.2}%",
        (map.len() as f64 / map.capacity() as f64) * 100.0
    );

    let stats = map.debug_stats();
    stats.print();

    println!("Chain length histogram:");
    for (length, buckets) in map.key_table().engine().chain_histogram().iter().enumerate() {
        println!("  {length:>3}: {buckets}");
    }
}
