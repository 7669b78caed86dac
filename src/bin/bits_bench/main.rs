mod unit_fmt;

use std::hint::black_box;
use std::time::Instant;

use compact_bits::{BitVec, BitVecMut, BitsError, CompactBits, HeapWords};
use datasize::{data_size, DataSize};
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use structopt::StructOpt;

use crate::unit_fmt::{Bytes, Count, PerOp};

#[derive(StructOpt, Debug)]
#[structopt(
    name = "compact-bits benchmark",
    about = "Compare bit vector backends on single-bit, range, scan and aggregate operations."
)]
struct Opts {
    /// Random indices are drawn from [0, N)
    #[structopt(long, name = "N", default_value = "1000000")]
    max_bit_index: usize,
    /// Operations per measurement
    #[structopt(long, default_value = "10000")]
    operations: usize,
    /// Random ranges are between 1 and this many bits wide
    #[structopt(long, default_value = "1000")]
    max_range: usize,
    /// Seed for the random index generator
    #[structopt(long, default_value = "42")]
    seed: u64,
    /// Measurements per benchmark, the fastest one is reported
    #[structopt(long, default_value = "5")]
    iterations: usize,
    /// Only run the given backends (compact, heap, bit-vec)
    #[structopt(long)]
    backend: Vec<String>,
}

/// Operations timed by the benchmark, normalised across backends.
trait Subject {
    const NAME: &'static str;

    fn create() -> Self;
    fn set(&mut self, index: usize) -> Result<(), BitsError>;
    fn get(&self, index: usize) -> Result<bool, BitsError>;
    fn clear(&mut self, index: usize) -> Result<(), BitsError>;
    fn set_range(&mut self, from: usize, to: usize) -> Result<(), BitsError>;
    fn clear_range(&mut self, from: usize, to: usize) -> Result<(), BitsError>;
    fn next_set_bit(&self, from: usize) -> Result<Option<usize>, BitsError>;
    fn next_clear_bit(&self, from: usize) -> Result<usize, BitsError>;
    fn cardinality(&self) -> usize;
    fn length(&self) -> usize;
    fn heap_bytes(&self) -> usize;
}

struct Engine<S>(S);

impl<S> Subject for Engine<S>
where
    S: BitVecMut + Default + DataSize + EngineName,
{
    const NAME: &'static str = S::NAME;

    fn create() -> Self {
        Engine(S::default())
    }

    fn set(&mut self, index: usize) -> Result<(), BitsError> {
        self.0.set(index)
    }

    fn get(&self, index: usize) -> Result<bool, BitsError> {
        self.0.get(index)
    }

    fn clear(&mut self, index: usize) -> Result<(), BitsError> {
        self.0.clear(index)
    }

    fn set_range(&mut self, from: usize, to: usize) -> Result<(), BitsError> {
        self.0.set_range(from, to)
    }

    fn clear_range(&mut self, from: usize, to: usize) -> Result<(), BitsError> {
        self.0.clear_range(from, to)
    }

    fn next_set_bit(&self, from: usize) -> Result<Option<usize>, BitsError> {
        self.0.next_set_bit(from)
    }

    fn next_clear_bit(&self, from: usize) -> Result<usize, BitsError> {
        self.0.next_clear_bit(from)
    }

    fn cardinality(&self) -> usize {
        self.0.cardinality()
    }

    fn length(&self) -> usize {
        self.0.length()
    }

    fn heap_bytes(&self) -> usize {
        data_size(&self.0)
    }
}

trait EngineName {
    const NAME: &'static str;
}

impl EngineName for CompactBits {
    const NAME: &'static str = "compact";
}

impl EngineName for HeapWords {
    const NAME: &'static str = "heap";
}

/// `bit_vec::BitVec` grown on demand, mirroring the zero-extended semantics of the engine.
struct Reference(bit_vec::BitVec);

impl Reference {
    fn bit(&self, index: usize) -> bool {
        self.0.get(index).unwrap_or(false)
    }
}

impl Subject for Reference {
    const NAME: &'static str = "bit-vec";

    fn create() -> Self {
        Reference(bit_vec::BitVec::new())
    }

    fn set(&mut self, index: usize) -> Result<(), BitsError> {
        if index >= self.0.len() {
            let missing = index + 1 - self.0.len();
            self.0.grow(missing, false);
        }
        self.0.set(index, true);
        Ok(())
    }

    fn get(&self, index: usize) -> Result<bool, BitsError> {
        Ok(self.bit(index))
    }

    fn clear(&mut self, index: usize) -> Result<(), BitsError> {
        if index < self.0.len() {
            self.0.set(index, false);
        }
        Ok(())
    }

    fn set_range(&mut self, from: usize, to: usize) -> Result<(), BitsError> {
        for i in from..to {
            self.set(i)?;
        }
        Ok(())
    }

    fn clear_range(&mut self, from: usize, to: usize) -> Result<(), BitsError> {
        for i in from..to.min(self.0.len()) {
            self.0.set(i, false);
        }
        Ok(())
    }

    fn next_set_bit(&self, from: usize) -> Result<Option<usize>, BitsError> {
        Ok((from..self.0.len()).find(|&i| self.bit(i)))
    }

    fn next_clear_bit(&self, from: usize) -> Result<usize, BitsError> {
        Ok((from..self.0.len())
            .find(|&i| !self.bit(i))
            .unwrap_or_else(|| from.max(self.0.len())))
    }

    fn cardinality(&self) -> usize {
        self.0.iter().filter(|&b| b).count()
    }

    fn length(&self) -> usize {
        (0..self.0.len()).rev().find(|&i| self.bit(i)).map_or(0, |i| i + 1)
    }

    fn heap_bytes(&self) -> usize {
        self.0.capacity() / 8
    }
}

struct Workload {
    indices: Vec<usize>,
    ranges: Vec<(usize, usize)>,
}

impl Workload {
    fn generate(opts: &Opts) -> Workload {
        let mut rng = XorShiftRng::seed_from_u64(opts.seed);
        let indices = (0..opts.operations)
            .map(|_| rng.random_range(0..opts.max_bit_index.max(1)))
            .collect();
        let ranges = (0..opts.operations)
            .map(|_| {
                let from = rng.random_range(0..(opts.max_bit_index / 2).max(1));
                (from, from + rng.random_range(0..opts.max_range.max(1)) + 1)
            })
            .collect();
        Workload { indices, ranges }
    }
}

const BENCHMARKS: &[&str] = &[
    "set",
    "get",
    "clear",
    "set_range",
    "clear_range",
    "next_set_bit",
    "next_clear_bit",
    "cardinality",
    "length",
];

/// Every other bit in the lower half of the index space is set before each measurement.
fn prefilled<S: Subject>(opts: &Opts) -> Result<S, BitsError> {
    let mut subject = S::create();
    for i in (0..opts.max_bit_index / 2).step_by(2) {
        subject.set(i)?;
    }
    Ok(subject)
}

fn run_once<S: Subject>(
    name: &str,
    subject: &mut S,
    workload: &Workload,
    opts: &Opts,
) -> Result<usize, BitsError> {
    let mut ops = opts.operations;
    match name {
        "set" => {
            for &i in &workload.indices {
                subject.set(i)?;
            }
        }
        "get" => {
            for &i in &workload.indices {
                black_box(subject.get(i)?);
            }
        }
        "clear" => {
            for &i in &workload.indices {
                subject.clear(i)?;
            }
        }
        "set_range" => {
            for &(from, to) in &workload.ranges {
                subject.set_range(from, to)?;
            }
        }
        "clear_range" => {
            for &(from, to) in &workload.ranges {
                subject.clear_range(from, to)?;
            }
        }
        "next_set_bit" => {
            let mut from = 0;
            for _ in 0..opts.operations {
                from = match subject.next_set_bit(from + 1)? {
                    Some(next) => next,
                    None => 0,
                };
                black_box(from);
            }
        }
        "next_clear_bit" => {
            let mut from = 0;
            for _ in 0..opts.operations {
                from = subject.next_clear_bit(from + 1)?;
                black_box(from);
            }
        }
        "cardinality" => {
            black_box(subject.cardinality());
            ops = 1;
        }
        "length" => {
            black_box(subject.length());
            ops = 1;
        }
        _ => unreachable!("unknown benchmark {}", name),
    }
    Ok(ops)
}

/// Fastest time per operation for each benchmark, plus heap usage after prefill.
fn measure<S: Subject>(workload: &Workload, opts: &Opts) -> Result<(Vec<PerOp>, usize), BitsError> {
    let heap_bytes = prefilled::<S>(opts)?.heap_bytes();
    let mut results = Vec::with_capacity(BENCHMARKS.len());
    for &name in BENCHMARKS {
        let mut best: Option<PerOp> = None;
        for _ in 0..opts.iterations.max(1) {
            let mut subject = prefilled::<S>(opts)?;
            let start = Instant::now();
            let ops = run_once(name, &mut subject, workload, opts)?;
            let per_op = PerOp::new(start.elapsed(), ops);
            if best.map_or(true, |best| per_op < best) {
                best = Some(per_op);
            }
        }
        let best = best.unwrap_or_default();
        log::debug!("{} {}: {}/op", S::NAME, name, best);
        results.push(best);
    }
    log::info!("Finished {} benchmarks", S::NAME);
    Ok((results, heap_bytes))
}

fn selected(opts: &Opts, name: &str) -> bool {
    opts.backend.is_empty() || opts.backend.iter().any(|b| b == name)
}

fn main() -> Result<(), BitsError> {
    env_logger::init();
    let opts = Opts::from_args();
    log::info!("{:?}", opts);
    let workload = Workload::generate(&opts);

    let mut columns = Vec::new();
    if selected(&opts, Engine::<CompactBits>::NAME) {
        let results = measure::<Engine<CompactBits>>(&workload, &opts)?;
        columns.push((Engine::<CompactBits>::NAME, results));
    }
    if selected(&opts, Engine::<HeapWords>::NAME) {
        let results = measure::<Engine<HeapWords>>(&workload, &opts)?;
        columns.push((Engine::<HeapWords>::NAME, results));
    }
    if selected(&opts, Reference::NAME) {
        columns.push((Reference::NAME, measure::<Reference>(&workload, &opts)?));
    }

    println!(
        "{} operations over {} bits, ranges up to {} bits",
        Count(opts.operations),
        Count(opts.max_bit_index),
        opts.max_range
    );
    print!("{:16}", "");
    for (name, _) in &columns {
        print!("{:>14}", name);
    }
    println!();
    for (i, benchmark) in BENCHMARKS.iter().enumerate() {
        print!("{:16}", benchmark);
        let baseline = columns.last().map(|(_, (results, _))| results[i]);
        for (_, (results, _)) in &columns {
            let cell = match baseline {
                Some(baseline) => format!("{} ({})", results[i], results[i].speedup_over(baseline)),
                None => results[i].to_string(),
            };
            print!("{:>14}", cell);
        }
        println!();
    }
    print!("{:16}", "heap");
    for (_, (_, heap_bytes)) in &columns {
        print!("{:>14}", Bytes(*heap_bytes).to_string());
    }
    println!();
    Ok(())
}
