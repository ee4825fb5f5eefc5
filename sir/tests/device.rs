//! `/dev/sir0` driven through the char device table, as a caller would.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
};

use sir::{
    config::{ProviderKind, SirConfig},
    fs::{DevTable, File, SeekFrom, SirIoctlCmd},
    irq::{CounterCaps, IrqClass, IrqStatTable},
    mm::UserPtr,
    module::SirModule,
    provider::ProviderBacking,
    report::{DetailedReport, REPORT_SIZE},
    session::WIDTH,
    SysError,
};

struct Bench {
    stat: Arc<IrqStatTable>,
    table: Arc<DevTable>,
    module: SirModule,
}

fn bench(nr_cpus: usize) -> Bench {
    hal::console::init();
    let stat = Arc::new(IrqStatTable::new(nr_cpus, CounterCaps::APIC_BASE));
    let table = Arc::new(DevTable::new());
    let config = SirConfig {
        provider: ProviderKind::Sim,
        ..Default::default()
    };
    let module = SirModule::init(
        config,
        stat.clone(),
        ProviderBacking::table(stat.clone()),
        table.clone(),
    )
    .unwrap();
    Bench { stat, table, module }
}

impl Bench {
    fn open(&self) -> Arc<dyn File> {
        self.table.open_path("/dev/sir0").unwrap()
    }
}

fn get(file: &dyn File) -> Result<u64, SysError> {
    let mut word = 0u64;
    let mut out = unsafe { UserPtr::new(&mut word as *mut u64 as usize, WIDTH) };
    file.ioctl(SirIoctlCmd::Get as usize, &mut out)?;
    Ok(word)
}

fn get_detailed(file: &dyn File) -> Result<DetailedReport, SysError> {
    let mut report = DetailedReport::default();
    let mut out =
        unsafe { UserPtr::new(&mut report as *mut DetailedReport as usize, REPORT_SIZE) };
    file.ioctl(SirIoctlCmd::GetDetailed as usize, &mut out)?;
    Ok(report)
}

/// Read exactly `len` bytes with a single request.
fn read_piece(file: &dyn File, len: usize) -> Vec<u8> {
    let mut buf = [0u8; WIDTH];
    let mut out = unsafe { UserPtr::new(buf.as_mut_ptr() as usize, len) };
    assert_eq!(file.read(&mut out), Ok(len));
    buf[..len].to_vec()
}

/// Every way to split 8 into ordered positive parts.
fn compositions(total: usize) -> Vec<Vec<usize>> {
    if total == 0 {
        return vec![vec![]];
    }
    (1..=total)
        .flat_map(|first| {
            compositions(total - first).into_iter().map(move |mut rest| {
                rest.insert(0, first);
                rest
            })
        })
        .collect()
}

#[test]
fn every_partition_reassembles_one_capture() {
    let bench = bench(1);
    hal::sim::set_cpu(0);
    let parts = compositions(WIDTH);
    assert_eq!(parts.len(), 128);

    for split in parts {
        let file = bench.open();
        bench.stat.record_irq(0);
        let expected = get(&*file).unwrap();
        let mut got = Vec::new();
        for len in &split {
            got.extend(read_piece(&*file, *len));
            // counters keep moving while the value is being streamed out
            bench.stat.record_irq(0);
            bench.stat.record_class(0, IrqClass::Loc);
        }
        assert_eq!(got, expected.to_ne_bytes(), "split {:?}", split);

        let next = u64::from_ne_bytes(read_piece(&*file, WIDTH).try_into().unwrap());
        assert_eq!(next, expected + 2 * split.len() as u64);
    }
}

#[test]
fn two_byte_reads_then_fresh_capture() {
    let bench = bench(1);
    hal::sim::set_cpu(0);
    for _ in 0..0x0304 {
        bench.stat.record_irq(0);
    }
    let file = bench.open();
    let mut got = Vec::new();
    for _ in 0..4 {
        got.extend(read_piece(&*file, 2));
        bench.stat.record_irq(0);
    }
    assert_eq!(got, 0x0304u64.to_ne_bytes());
    assert_eq!(file.pos(), WIDTH);
    assert_eq!(file.seek(SeekFrom::Current(-8)), Ok(WIDTH));

    let fifth = read_piece(&*file, 2);
    assert_eq!(fifth, 0x0308u64.to_ne_bytes()[..2]);
}

#[test]
fn get_on_fresh_handle_leaves_stream_idle() {
    let bench = bench(1);
    hal::sim::set_cpu(0);
    bench.stat.record_irq(0);
    let file = bench.open();
    assert_eq!(get(&*file), Ok(1));
    bench.stat.record_irq(0);
    // idle: a full read captures anew instead of finishing anything
    assert_eq!(read_piece(&*file, WIDTH), 2u64.to_ne_bytes());
}

#[test]
fn unsupported_op_leaves_state_alone() {
    let bench = bench(1);
    hal::sim::set_cpu(0);
    bench.stat.record_irq(0);
    let file = bench.open();
    let head = read_piece(&*file, 5);

    let mut word = 0u64;
    let mut out = unsafe { UserPtr::new(&mut word as *mut u64 as usize, WIDTH) };
    assert_eq!(file.ioctl(0x5401, &mut out), Err(SysError::ENOTTY));

    bench.stat.record_irq(0);
    let mut all = head;
    all.extend(read_piece(&*file, 3));
    assert_eq!(all, 1u64.to_ne_bytes());
}

#[test]
fn zero_length_reads_do_nothing() {
    let bench = bench(1);
    hal::sim::set_cpu(0);
    bench.stat.record_irq(0);
    let file = bench.open();
    assert_eq!(file.read(&mut [0u8; 0]), Ok(0));
    let head = read_piece(&*file, 1);
    bench.stat.record_irq(0);
    assert_eq!(file.read(&mut [0u8; 0]), Ok(0));
    assert_eq!(file.pos(), 1);
    let mut all = head;
    all.extend(read_piece(&*file, 7));
    assert_eq!(all, 1u64.to_ne_bytes());
}

#[test]
fn sessions_on_one_cpu_do_not_share_state() {
    let bench = bench(1);
    hal::sim::set_cpu(0);
    bench.stat.record_irq(0);
    let a = bench.open();
    let b = bench.open();
    let a_head = read_piece(&*a, 3);

    bench.stat.record_irq(0);
    assert_eq!(read_piece(&*b, WIDTH), 2u64.to_ne_bytes());
    assert_eq!(get(&*b), Ok(2));

    let mut a_all = a_head;
    a_all.extend(read_piece(&*a, 5));
    assert_eq!(a_all, 1u64.to_ne_bytes());
    assert_eq!(bench.module.device().sessions(), 2);
}

#[test]
fn sessions_on_different_cpus_run_in_parallel() {
    let bench = Arc::new(bench(2));
    let workers: Vec<_> = (0..2usize)
        .map(|cpu| {
            let bench = bench.clone();
            thread::spawn(move || {
                hal::sim::set_cpu(cpu);
                let file = bench.open();
                for round in 1..=200u64 {
                    bench.stat.record_irq(cpu);
                    let mut got = read_piece(&*file, 1);
                    got.extend(read_piece(&*file, 7));
                    assert_eq!(got, round.to_ne_bytes());
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
}

#[test]
fn detailed_report_accounts_for_everything() {
    let bench = bench(1);
    hal::sim::set_cpu(0);
    let stat = &bench.stat;
    stat.record_irq(0);
    for _ in 0..5 {
        stat.record_class(0, IrqClass::Loc);
    }
    stat.record_class(0, IrqClass::Res);
    // not in the supported set: counted in the total, reported as 0
    stat.record_class(0, IrqClass::Mce);
    stat.record_unexported(0);

    let file = bench.open();
    let head = read_piece(&*file, 4);
    assert_eq!(head.len(), 4);
    let report = get_detailed(&*file).unwrap();
    assert_eq!(report.irq_std, 1);
    assert_eq!(report.class(IrqClass::Loc), 5);
    assert_eq!(report.class(IrqClass::Res), 1);
    assert_eq!(report.class(IrqClass::Mce), 0);
    assert_eq!(report.arch_irq_stat_sum, 8);
    assert_eq!(report.unaccounted(), Some(2));

    // the query reset the stream
    assert_eq!(read_piece(&*file, WIDTH), 9u64.to_ne_bytes());
}

#[test]
fn short_detailed_output_is_a_fault() {
    let bench = bench(1);
    hal::sim::set_cpu(0);
    let file = bench.open();
    let mut words = [0u64; 4];
    let mut out = unsafe { UserPtr::new(words.as_mut_ptr() as usize, 32) };
    assert_eq!(
        file.ioctl(SirIoctlCmd::GetDetailed as usize, &mut out),
        Err(SysError::EFAULT)
    );
    assert_eq!(words, [0; 4]);
}

#[test]
fn cpu_outside_counter_table_is_an_error() {
    let bench = bench(1);
    let file = bench.open();
    hal::sim::set_cpu(1);
    assert_eq!(file.read(&mut [0u8; WIDTH]), Err(SysError::ENODEV));
    assert_eq!(get(&*file), Err(SysError::ENODEV));
    assert_eq!(get_detailed(&*file).err(), Some(SysError::ENODEV));
    assert_eq!(file.pos(), 0);

    // back on a counted cpu the handle works as before
    hal::sim::set_cpu(0);
    bench.stat.record_irq(0);
    assert_eq!(read_piece(&*file, WIDTH), 1u64.to_ne_bytes());
}

#[test]
fn queries_on_one_handle_never_tear_reads_on_another() {
    let bench = Arc::new(bench(1));
    let stop = Arc::new(AtomicBool::new(false));

    // interrupts keep arriving on cpu 0 the whole time
    let source = {
        let (bench, stop) = (bench.clone(), stop.clone());
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                bench.stat.record_irq(0);
                bench.stat.record_class(0, IrqClass::Loc);
                bench.stat.record_unexported(0);
            }
        })
    };
    let querier = {
        let (bench, stop) = (bench.clone(), stop.clone());
        thread::spawn(move || {
            hal::sim::set_cpu(0);
            let file = bench.open();
            let mut last = 0;
            while !stop.load(Ordering::Relaxed) {
                let total = get(&*file).unwrap();
                assert!(total >= last);
                last = total;
                let report = get_detailed(&*file).unwrap();
                assert!(report.unaccounted().is_some());
            }
        })
    };

    hal::sim::set_cpu(0);
    let streamer = bench.open();
    for _ in 0..500 {
        let lo = get(&*streamer).unwrap();
        let mut bytes = Vec::new();
        for _ in 0..WIDTH {
            bytes.extend(read_piece(&*streamer, 1));
        }
        let value = u64::from_ne_bytes(bytes.try_into().unwrap());
        let hi = get(&*streamer).unwrap();
        assert!(lo <= value && value <= hi, "{} not within {}..={}", value, lo, hi);
    }

    stop.store(true, Ordering::Relaxed);
    source.join().unwrap();
    querier.join().unwrap();
}
