//! Reads `/dev/sir0` from a thread pinned to one cpu.

use std::{env, process, thread};

use user_lib::{parse_args, pin_to_cpu, Args, SirReader, DEVICE_PATH, USAGE};

const ROUNDS: usize = 4;

fn run(args: Args) -> std::io::Result<()> {
    pin_to_cpu(args.cpu)?;
    let reader = SirReader::open(DEVICE_PATH)?;
    println!("cpu {}: reading {} in {} byte chunks", args.cpu, DEVICE_PATH, args.chunk);

    for round in 0..ROUNDS {
        let value = reader.read_streamed(args.chunk)?;
        println!("[read {}] interrupts: {}", round, value);
    }
    for round in 0..ROUNDS {
        let value = reader.get()?;
        println!("[get {}] interrupts: {}", round, value);
    }
    for round in 0..ROUNDS {
        let report = reader.get_detailed()?;
        println!("[detailed {}] total: {}", round, report.total());
        println!("{}", report);
        match report.unaccounted() {
            Some(rest) => println!("[detailed {}] unaccounted: {}", round, rest),
            None => println!("[detailed {}] unaccounted: inconsistent report", round),
        }
    }
    Ok(())
}

fn main() {
    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("sir_char_reader: {}", err);
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };
    let worker = thread::spawn(move || run(args));
    match worker.join() {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            eprintln!("sir_char_reader: {}", err);
            process::exit(1);
        }
        Err(_) => {
            eprintln!("sir_char_reader: reader thread panicked");
            process::exit(1);
        }
    }
}
