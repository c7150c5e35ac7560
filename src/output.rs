//! Terminal rendering of statistics snapshots.

use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use evtstat_core::{ExecutableSnapshot, StatisticsSnapshot};

/// Which optional rows the per-executable table includes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayOptions {
    /// list the child processes each watched executable execs into
    pub children: bool,
    /// list the parent processes exec'ing into each watched executable
    pub parents: bool,
}

/// Print one complete statistics dump.
pub fn print_statistics(snapshot: &StatisticsSnapshot, options: DisplayOptions, dump_number: u32) {
    println!("\nEvent statistics #{dump_number}:");

    if !snapshot.executables.is_empty() {
        println!("{}", executable_table(&snapshot.executables, options));
    }
    println!("{}", event_table(snapshot));
    println!("interval duration: {} seconds", snapshot.interval.as_secs());
}

fn executable_table(executables: &[ExecutableSnapshot], options: DisplayOptions) -> Table {
    let mut table = table();
    table.set_header(vec![
        header("executable"),
        header("#exec_source_events"),
        header("#exec_target_events"),
        header("#fork_events"),
        header("#exit_events"),
        header("delta"),
    ]);

    for executable in executables {
        let delta = executable.delta();
        let delta_color = if delta == 0 { Color::Green } else { Color::Red };
        table.add_row(vec![
            Cell::new(&executable.name)
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold),
            number(executable.exec_source),
            number(executable.exec_target),
            number(executable.forks),
            number(executable.exits),
            Cell::new(delta)
                .set_alignment(CellAlignment::Right)
                .fg(delta_color)
                .add_attribute(Attribute::Bold),
        ]);

        if options.children {
            // children the executable execs into are exec targets from
            // their own point of view
            for (child, count) in &executable.execs_to_children {
                table.add_row(vec![
                    Cell::new(format!("--{child}")).fg(Color::Blue),
                    blank(),
                    number(*count),
                    blank(),
                    blank(),
                    blank(),
                ]);
            }
        }
        if options.parents {
            for (parent, count) in &executable.execs_from_parents {
                table.add_row(vec![
                    Cell::new(format!("--{parent}")).fg(Color::Blue),
                    number(*count),
                    blank(),
                    blank(),
                    blank(),
                    blank(),
                ]);
            }
        }
    }

    table
}

fn event_table(snapshot: &StatisticsSnapshot) -> Table {
    let mut table = table();
    table.set_header(vec![
        header("event_type"),
        header("#messages_received"),
        header("#messages_missing"),
    ]);

    let mut total_received = 0;
    let mut total_missing = 0;
    for counts in &snapshot.events {
        total_received += counts.total;
        total_missing += counts.missing;
        table.add_row(vec![
            Cell::new(counts.kind.name())
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold),
            number(counts.total),
            missing_cell(counts.missing),
        ]);
    }
    table.add_row(vec![
        Cell::new("total:").add_attribute(Attribute::Bold),
        number(total_received),
        missing_cell(total_missing),
    ]);

    table
}

fn table() -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table
}

fn header(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn number(value: u64) -> Cell {
    Cell::new(value).set_alignment(CellAlignment::Right)
}

fn blank() -> Cell {
    Cell::new("-").set_alignment(CellAlignment::Right)
}

fn missing_cell(missing: u64) -> Cell {
    let color = if missing == 0 { Color::Green } else { Color::Red };
    Cell::new(missing)
        .set_alignment(CellAlignment::Right)
        .fg(color)
        .add_attribute(Attribute::Bold)
}
