use clap::Parser;
use long_map::{ChainedLongMap, LongMap, ProbingLongMap};

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'n', long = "target_len", default_value_t = 1000)]
    target_len: usize,
    /// Multiply every key by this stride; a multiple of the table length
    /// sends all keys to one bucket.
    #[arg(short = 's', long = "stride", default_value_t = 1)]
    stride: i64,
    #[arg(short = 'l', long = "load_factor", default_value_t = long_map::DEFAULT_LOAD_FACTOR)]
    load_factor: f64,
}

fn fill<M: LongMap<u64>>(map: &mut M, args: &Args) {
    for i in 0..args.target_len {
        let key = (i as i64).wrapping_mul(args.stride);
        map.put(key, i as u64);
    }
}

fn main() {
    let args = Args::parse();

    println!(
        "Filling tables with {} keys (stride {}, load factor {})",
        args.target_len, args.stride, args.load_factor
    );

    let mut chained: ChainedLongMap<u64> =
        match ChainedLongMap::with_capacity_and_load_factor(long_map::DEFAULT_CAPACITY, args.load_factor) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("invalid arguments: {}", e);
                std::process::exit(2);
            }
        };
    let mut probing: ProbingLongMap<u64> =
        match ProbingLongMap::with_capacity_and_load_factor(long_map::DEFAULT_CAPACITY, args.load_factor) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("invalid arguments: {}", e);
                std::process::exit(2);
            }
        };

    fill(&mut chained, &args);
    fill(&mut probing, &args);

    println!();
    println!("Separate chaining ({} buckets)", chained.capacity());
    chained.stats().print();

    println!();
    println!("Linear probing ({} slots)", probing.capacity());
    probing.stats().print();
}
