//! Subcommand implementations.

use std::error::Error;
use std::thread;

use excite_core::CellRegion;
use excite_engine::{CancelToken, Simulation, StepObserver};
use excite_io::{read_checkpoint, write_checkpoint, OutputSinks};
use excite_ionic::{Gate, LookupTable};
use excite_space::{load_lattice, Lattice};

use crate::cli::{LookupArgs, RunArgs};
use crate::run_file::RunFile;

/// Sheet coefficient when neither a map nor `--uniform` is given.
const DEFAULT_SHEET_COEFFICIENT: f64 = 0.2;

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let cancel = CancelToken::new();
    cancel_on_interrupt(cancel.clone());
    run_until_cancelled(args, &cancel)
}

/// Cancel `token` when the process receives Ctrl-C. The run stops after
/// the step in progress and still writes its end-of-run outputs.
fn cancel_on_interrupt(token: CancelToken) {
    let spawned = thread::Builder::new()
        .name("excite-interrupt".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    tracing::warn!(error = %err, "cannot listen for Ctrl-C");
                    return;
                }
            };
            runtime.block_on(async {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        tracing::info!("interrupt received, stopping after the current step");
                        token.cancel();
                    }
                    Err(err) => tracing::warn!(error = %err, "cannot listen for Ctrl-C"),
                }
            });
        });
    if let Err(err) = spawned {
        tracing::warn!(error = %err, "cannot listen for Ctrl-C");
    }
}

fn run_until_cancelled(args: &RunArgs, cancel: &CancelToken) -> Result<(), Box<dyn Error>> {
    let file = match &args.config {
        Some(path) => RunFile::load(path)?,
        None => RunFile::default(),
    };

    let mut lattice = match &args.coefficients {
        Some(path) => load_lattice(path, args.rows, args.cols, file.void_threshold)?,
        None => Lattice::uniform(
            args.rows,
            args.cols,
            args.uniform.unwrap_or(DEFAULT_SHEET_COEFFICIENT),
        )?,
    };
    let region = CellRegion::from(file.region);
    lattice.assign_regions(|_, _| region);

    let mut sim = Simulation::new(file.simulation_config(), lattice)?;
    if let Some(path) = &args.restore {
        sim.restore(read_checkpoint(path)?)?;
    }
    let mut sinks = OutputSinks::create(file.output_config(args.out.clone()), &sim)?;

    let end = args.steps.unwrap_or(file.steps);
    tracing::info!(
        from = sim.step_id().0,
        to = end,
        %region,
        diffusion = %sim.config().diffusion,
        "starting run"
    );

    if let Some(at) = args.checkpoint_at {
        let current = sim.step_id().0;
        if at < current || at > end {
            tracing::warn!(at, current, end, "checkpoint step outside the run, skipped");
        } else {
            if !advance_to(&mut sim, at, cancel, &mut sinks)? {
                return Ok(());
            }
            write_checkpoint(&args.out, &sim.checkpoint())?;
            if args.stop_after_checkpoint {
                tracing::info!(step = at, "stopping after checkpoint");
                return Ok(());
            }
        }
    }
    advance_to(&mut sim, end, cancel, &mut sinks)?;

    if sinks.failures() > 0 {
        tracing::warn!(failures = sinks.failures(), "some output files were not written");
    }
    Ok(())
}

/// Run until `sim` has completed `target` steps. Returns `false` if the
/// run was cancelled first.
fn advance_to(
    sim: &mut Simulation,
    target: u64,
    cancel: &CancelToken,
    observer: &mut dyn StepObserver,
) -> Result<bool, Box<dyn Error>> {
    let remaining = target.saturating_sub(sim.step_id().0);
    let summary = sim.run(remaining, cancel, observer)?;
    tracing::info!(
        steps = summary.steps,
        time_ms = summary.final_time,
        cancelled = summary.cancelled,
        "segment finished"
    );
    Ok(!summary.cancelled)
}

pub fn lookup(args: &LookupArgs) {
    let table = LookupTable::build();
    let bin = LookupTable::clamped_bin(args.voltage);
    println!(
        "V = {} mV -> bin {bin} ({} mV)",
        args.voltage,
        LookupTable::bin_voltage(bin)
    );
    println!("{:<6} {:>14} {:>14}", "gate", "steady", "tau (ms)");
    for gate in Gate::ALL {
        let k = table.kinetics(gate, bin);
        println!("{:<6} {:>14.6e} {:>14.6e}", format!("{gate:?}"), k.steady, k.tau);
    }
}
