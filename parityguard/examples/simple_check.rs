//! Simple parity example: compare a netlist export with a board and print the result.

use parityguard::prelude::*;
use std::path::Path;

fn main() -> Result<(), ParityGuardError> {
    let mut args = std::env::args().skip(1);
    let (Some(export), Some(board)) = (args.next(), args.next()) else {
        eprintln!("Usage: cargo run --example simple_check <export.xml> <board.kicad_pcb>");
        std::process::exit(1);
    };

    let options = ParityOptions {
        as_warnings: true,
        ..Default::default()
    };

    let Some(report) = ParityGuardCore::check_files(Path::new(&export), Path::new(&board), &options)?
    else {
        println!("Parity check disabled.");
        return Ok(());
    };

    println!("Parity results for: {} vs {}", export, board);
    println!("Total discrepancies: {}", report.total_discrepancies());
    for (kind, count) in &report.stats.by_kind {
        println!("  {}: {}", kind, count);
    }
    println!();

    for d in &report.discrepancies {
        println!("  - {}", d);
    }

    if report.outcome != Outcome::Pass {
        println!("\nSchematic and PCB differ.");
        std::process::exit(parityguard::exit_codes::NETLIST_DIFF);
    }

    println!("\nSchematic and PCB are in sync.");
    Ok(())
}
