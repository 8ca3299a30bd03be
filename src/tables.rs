use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::core::{
    LoadTestStudy, RuleStudy, TapStudy,
    overall::OverallConfiguration,
    supply::CompensatedCurrent,
    switching::Compensation,
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

pub fn build_scenario_table(tap: &TapStudy) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Scenario", "V test", "I test", "S", "P", "Q",
    ]);
    for study in &tap.scenarios {
        let scenario = &study.scenario;
        table.add_row(vec![
            Cell::new(scenario.kind),
            Cell::new(scenario.voltage).set_alignment(CellAlignment::Right),
            Cell::new(scenario.current).set_alignment(CellAlignment::Right),
            Cell::new(scenario.apparent_power).set_alignment(CellAlignment::Right),
            Cell::new(scenario.active_power).set_alignment(CellAlignment::Right),
            Cell::new(scenario.reactive_power).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn build_bank_table(tap: &TapStudy) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Scenario", "Rule", "Tier", "Required", "Switches", "Coupling", "Provided",
    ]);
    for study in &tap.scenarios {
        for rule in [&study.without_factor, &study.with_factor] {
            table.add_row(bank_row(study.scenario.kind.to_string(), rule));
        }
    }
    table
}

fn bank_row(scenario: String, rule: &RuleStudy) -> Vec<Cell> {
    let selection = &rule.selection;
    let tier = Cell::new(selection.tier_voltage).fg(if selection.out_of_range {
        Color::Red
    } else {
        Color::Reset
    });
    let (switches, coupling, provided) = match &rule.compensation {
        Compensation::NotNeeded => {
            (Cell::new("-").add_attribute(Attribute::Dim), Cell::new("-"), Cell::new("-"))
        }
        Compensation::Configured(bank) => (
            Cell::new(bank.switch_labels()),
            Cell::new(&bank.coupling),
            Cell::new(bank.provided_power).set_alignment(CellAlignment::Right),
        ),
        Compensation::Infeasible { max_available, .. } => (
            Cell::new("infeasible").fg(Color::Red),
            Cell::new("-"),
            Cell::new(format!("max {max_available}"))
                .set_alignment(CellAlignment::Right)
                .fg(Color::Red),
        ),
    };
    vec![
        Cell::new(scenario),
        Cell::new(selection.rule),
        tier,
        Cell::new(selection.required_power).set_alignment(CellAlignment::Right),
        switches,
        coupling,
        provided,
    ]
}

pub fn build_supply_table(tap: &TapStudy) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Scenario", "Tap SUT", "I EPS (S/F)", "% limit", "I EPS (C/F)", "% limit"]);
    for study in &tap.scenarios {
        for row in &study.supply {
            table.add_row(vec![
                Cell::new(study.scenario.kind).add_attribute(Attribute::Dim),
                Cell::new(row.tap_voltage).set_alignment(CellAlignment::Right),
                current_cell(&row.without_factor),
                percent_cell(&row.without_factor),
                current_cell(&row.with_factor),
                percent_cell(&row.with_factor),
            ]);
        }
    }
    table
}

fn current_cell(compensated: &CompensatedCurrent) -> Cell {
    Cell::new(compensated.current)
        .set_alignment(CellAlignment::Right)
        .fg(percent_color(compensated.percent_of_limit))
}

fn percent_cell(compensated: &CompensatedCurrent) -> Cell {
    Cell::new(format!("{:.1}%", compensated.percent_of_limit))
        .set_alignment(CellAlignment::Right)
        .fg(percent_color(compensated.percent_of_limit))
}

/// Same thresholds the operators use on the bench sheets: green under 50%,
/// yellow to 85%, orange to the limit, red above it, blue when the bank
/// over-compensates.
fn percent_color(percent: f64) -> Color {
    if percent < 0.0 {
        Color::Blue
    } else if percent < 50.0 {
        Color::Green
    } else if percent < 85.0 {
        Color::Yellow
    } else if percent <= 100.0 {
        Color::DarkYellow
    } else {
        Color::Red
    }
}

pub fn build_overall_table(overall: &OverallConfiguration) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Max V test", "Max Q required", "Tier", "Switches", "Coupling", "Provided"]);
    let (switches, coupling, provided) = match &overall.compensation {
        Compensation::NotNeeded => ("-".to_owned(), "-".to_owned(), "-".to_owned()),
        Compensation::Configured(bank) => {
            (bank.switch_labels(), bank.coupling.clone(), bank.provided_power.to_string())
        }
        Compensation::Infeasible { max_available, .. } => {
            ("infeasible".to_owned(), "-".to_owned(), format!("max {max_available}"))
        }
    };
    table.add_row(vec![
        Cell::new(overall.max_test_voltage).set_alignment(CellAlignment::Right),
        Cell::new(overall.max_required_power).set_alignment(CellAlignment::Right),
        Cell::new(overall.tier_voltage).fg(if overall.out_of_range {
            Color::Red
        } else {
            Color::Reset
        }),
        Cell::new(switches),
        Cell::new(coupling),
        Cell::new(provided).set_alignment(CellAlignment::Right),
    ]);
    table
}

pub fn print_study(study: &LoadTestStudy) {
    for tap in &study.taps {
        println!("\nTap {}:", tap.tap);
        println!("{}", build_scenario_table(tap));
        println!("{}", build_bank_table(tap));
        println!("{}", build_supply_table(tap));
    }
    if let Some(overall) = &study.overall {
        println!("\nSuggested overall configuration:");
        println!("{}", build_overall_table(overall));
    }
}
