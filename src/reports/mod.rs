use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use hftrigger::error::TrResult;
use hftrigger::filter::EventDecision;
use hftrigger::monitoring::CountingSink;
use hftrigger::species::HfTrigger;
use serde::Serialize;
use strum::IntoEnumIterator;

pub fn print_trigger_summary(decisions: &[EventDecision]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Trigger").add_attribute(Attribute::Bold),
        Cell::new("Bit"),
        Cell::new("Events").fg(Color::Cyan),
        Cell::new("Fraction"),
    ]);

    for i in 1..=3 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    let total = decisions.len().max(1) as f64;
    for trigger in HfTrigger::iter() {
        let n = decisions.iter().filter(|d| d.has(trigger)).count();
        let color = if n > 0 { Color::Green } else { Color::Reset };
        table.add_row(vec![
            Cell::new(trigger.to_string()).add_attribute(Attribute::Bold),
            Cell::new(trigger as u16),
            Cell::new(n).fg(color),
            Cell::new(format!("{:.4}", n as f64 / total)),
        ]);
    }

    let n_any = decisions.iter().filter(|d| d.is_triggered()).count();
    table.add_row(vec![
        Cell::new("any").add_attribute(Attribute::Bold),
        Cell::new("-"),
        Cell::new(n_any).fg(Color::Cyan),
        Cell::new(format!("{:.4}", n_any as f64 / total)),
    ]);

    println!("\n{}", table);
}

pub fn print_monitoring_summary(sink: &CountingSink) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Series").add_attribute(Attribute::Bold),
        Cell::new("Entries"),
        Cell::new("Mean x"),
    ]);

    for name in sink.names() {
        let series = sink.get(&name);
        let mean = if series.is_empty() {
            0.0
        } else {
            series.xs.iter().map(|&x| x as f64).sum::<f64>() / series.len() as f64
        };
        table.add_row(vec![
            Cell::new(&name),
            Cell::new(series.len()).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.3}", mean)).set_alignment(CellAlignment::Right),
        ]);
    }

    println!("\n{}", table);
}

#[derive(Serialize)]
struct DecisionRow {
    event_id: u64,
    triggers: u16,
    n_two_prongs: usize,
    n_three_prongs: usize,
    n_selected_gammas: usize,
    n_calo_photons: usize,
    n_femto_pairs: usize,
}

pub fn write_decisions_csv(path: &str, decisions: &[EventDecision]) -> TrResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for d in decisions {
        writer.serialize(DecisionRow {
            event_id: d.event_id,
            triggers: d.triggers,
            n_two_prongs: d.two_prongs.len(),
            n_three_prongs: d.three_prongs.len(),
            n_selected_gammas: d.n_selected_gammas,
            n_calo_photons: d.n_calo_photons,
            n_femto_pairs: d.femto_kstar.len(),
        })?;
    }
    writer.flush()?;
    Ok(())
}
