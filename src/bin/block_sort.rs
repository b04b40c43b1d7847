use std::time::Instant;

use block_radix_sort::{
    block::SortOrder,
    radix::{key_bits, NullType, RadixKey},
    scope_print, scope_print_major,
    test_util::{random_data, reference_sort_tiles, same_keys, RandomItem},
    tiles::{sort_tiles, SortOptions},
    Args, KeyType, PrettyDuration,
};
use bytemuck::Pod;

/// `(threads, items_per_thread)` shapes the binary is compiled for.
const SHAPES: &str = "64x1, 128x4, 256x7, 33x5, 100x3, 256x1, 512x2";

fn main() {
    let args: Args = argh::from_env();
    if let Err(e) = run(&args) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), String> {
    match args.key {
        KeyType::U8 => run_key::<u8>(args),
        KeyType::U16 => run_key::<u16>(args),
        KeyType::U32 => run_key::<u32>(args),
        KeyType::U64 => run_key::<u64>(args),
        KeyType::I8 => run_key::<i8>(args),
        KeyType::I16 => run_key::<i16>(args),
        KeyType::I32 => run_key::<i32>(args),
        KeyType::I64 => run_key::<i64>(args),
        KeyType::F32 => run_key::<f32>(args),
        KeyType::F64 => run_key::<f64>(args),
    }
}

fn run_key<K: RadixKey + RandomItem>(args: &Args) -> Result<(), String> {
    if args.values {
        run_values::<K, u32>(args)
    } else {
        run_values::<K, NullType>(args)
    }
}

fn run_values<K, V>(args: &Args) -> Result<(), String>
where
    K: RadixKey + RandomItem,
    V: Pod + Send + Sync + PartialEq + RandomItem,
{
    match (args.threads, args.items_per_thread) {
        (64, 1) => run_shape::<K, V, 64, 1>(args),
        (128, 4) => run_shape::<K, V, 128, 4>(args),
        (256, 7) => run_shape::<K, V, 256, 7>(args),
        (33, 5) => run_shape::<K, V, 33, 5>(args),
        (100, 3) => run_shape::<K, V, 100, 3>(args),
        (256, 1) => run_shape::<K, V, 256, 1>(args),
        (512, 2) => run_shape::<K, V, 512, 2>(args),
        (threads, items) => Err(format!(
            "unsupported group shape {threads}x{items}, available shapes: {SHAPES}"
        )),
    }
}

fn run_shape<K, V, const THREADS: usize, const ITEMS_PER_THREAD: usize>(
    args: &Args,
) -> Result<(), String>
where
    K: RadixKey + RandomItem,
    V: Pod + Send + Sync + PartialEq + RandomItem,
{
    let tile_len = THREADS * ITEMS_PER_THREAD;
    let len = tile_len * args.tiles;

    let bits = match (args.begin_bit, args.end_bit) {
        (None, None) => None,
        (begin_bit, end_bit) => {
            Some(begin_bit.unwrap_or(0)..end_bit.unwrap_or(key_bits::<K>()))
        }
    };
    let options = SortOptions {
        order: args.order,
        arrangement: args.arrangement,
        bits,
    };
    let window = options.window::<K>()?;

    let (mut keys, mut values) = {
        scope_print!("generate data");
        (
            random_data::<K>(len, args.seed),
            random_data::<V>(len, args.seed.wrapping_add(1)),
        )
    };

    let mut expected_keys = keys.clone();
    let mut expected_values = values.clone();
    {
        scope_print_major!("reference sort");
        reference_sort_tiles(
            &mut expected_keys,
            &mut expected_values,
            tile_len,
            args.order,
            window,
        );
    }

    let start = Instant::now();
    sort_tiles::<K, V, THREADS, ITEMS_PER_THREAD>(
        args.scheduler,
        &mut keys,
        &mut values,
        &options,
    )?;
    let elapsed = start.elapsed();

    if !same_keys(&keys, &expected_keys) {
        return Err(key_mismatch(&keys, &expected_keys, tile_len));
    }
    if values != expected_values {
        return Err(format!(
            "values differ from the reference sort with {:?}",
            args.scheduler
        ));
    }

    println!(
        "{:>10} {} tiles of {THREADS}x{ITEMS_PER_THREAD} {:?} keys, {} {}, bits {}..{}, {:?} on {} threads",
        PrettyDuration(elapsed),
        args.tiles,
        args.key,
        match args.order {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        },
        if args.values { "with values" } else { "keys only" },
        window.0,
        window.1,
        args.scheduler,
        args.scheduler.current_num_threads(),
    );
    Ok(())
}

fn key_mismatch<K: RadixKey>(got: &[K], expected: &[K], tile_len: usize) -> String {
    let i = got
        .iter()
        .zip(expected)
        .position(|(a, b)| a.twiddle_in() != b.twiddle_in())
        .unwrap_or(0);
    format!(
        "keys differ from the reference sort at index {i} (tile {}): got {:?}, expected {:?}",
        i / tile_len,
        got[i],
        expected[i]
    )
}
