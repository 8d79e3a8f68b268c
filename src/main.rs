use critter_brain::definition::{build, BrainDefinition};
use critter_brain::observer::GraphAdapter;
use critter_brain::ports::{Actuator, Sense, FOOD_ANGLE, FOOD_DISTANCE};
use critter_brain::stock;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h" || args[1] == "help") {
        print_help();
        return;
    }
    if args.len() >= 2 && args[1] == "check" {
        let Some(path) = args.get(2) else {
            eprintln!("check: missing definition path");
            print_help();
            std::process::exit(2);
        };
        std::process::exit(run_check(path));
    }
    if args.len() >= 2 && args[1] == "dump" {
        run_dump(args.get(2).map(String::as_str).unwrap_or("forager"));
        return;
    }

    if args.len() >= 2 {
        eprintln!("Unknown command: {}", args[1]);
        print_help();
        std::process::exit(2);
    }

    // Minimal demo:
    // - a forager sees food off to one side for a while, then loses it
    // - the turn actuator follows the food angle only while food is sensed
    // - the turn -> hold -> turn loop keeps it turning briefly afterwards
    let mut brain = build(&stock::forager());

    for t in 0..40u32 {
        if t < 20 {
            // Food drifts from the right toward straight ahead.
            let angle = 1.0 - f64::from(t) / 20.0;
            brain.write_input(FOOD_ANGLE, angle);
            brain.write_input(FOOD_DISTANCE, 5.0 - f64::from(t) * 0.2);
        }

        let report = brain.tick();

        if t % 4 == 0 {
            let outputs: Vec<String> = Actuator::ALL
                .iter()
                .map(|a| match brain.read_output(a.index()) {
                    Some(v) => format!("{}={v:+.3}", a.label()),
                    None => format!("{}=-", a.label()),
                })
                .collect();
            println!(
                "t={t:3} rounds={} settled={} sent={:3}  {}",
                report.rounds,
                report.settled,
                report.transmissions,
                outputs.join(" ")
            );
        }
    }

    let snap = GraphAdapter::new(&brain).snapshot();
    println!(
        "ticks={} cells={} active={} links={}",
        snap.tick_count,
        snap.cells.len(),
        snap.active_count(),
        snap.link_count
    );
}

fn print_help() {
    println!("critter-brain (signal-propagation brain for simulated critters)");
    println!("usage:");
    println!("  cargo run");
    println!("  cargo run -- check <definition.json>");
    println!("  cargo run -- dump [forager|drifter]");
    println!("  cargo run -- --help");
}

fn run_check(path: &str) -> i32 {
    let def = match BrainDefinition::from_json_file(path) {
        Ok(def) => def,
        Err(e) => {
            eprintln!("{path}: {e}");
            return 1;
        }
    };

    let brain = build(&def);
    println!(
        "{path}: ok ({} cells, {} links)",
        brain.cell_count(),
        brain.link_count()
    );
    for sense in Sense::ALL {
        if !brain.has_cell(sense.index()) {
            println!("  note: no cell for sense {}", sense.label());
        }
    }
    for actuator in Actuator::ALL {
        if !brain.has_cell(actuator.index()) {
            println!("  note: no cell for actuator {}", actuator.label());
        }
    }
    0
}

fn run_dump(name: &str) {
    let Some(def) = stock_by_name(name) else {
        eprintln!("Unknown stock brain: {name} (expected forager or drifter)");
        print_help();
        std::process::exit(2);
    };
    match def.to_json_string() {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("dump failed: {e}");
            std::process::exit(1);
        }
    }
}

fn stock_by_name(name: &str) -> Option<BrainDefinition> {
    match name {
        "forager" => Some(stock::forager()),
        "drifter" => Some(stock::drifter()),
        _ => None,
    }
}
