//! Drives the default view sense with a fixed movement and feature.
//!
//! Runs one step, repeats it a hundred times, then prints the location per module and
//! the sensation before and after. Set `RUST_LOG=debug` to follow allocations and bursts.

use grid_sense::{Brain, LocationLayer};

const MOVEMENT: [f64; 2] = [2.0, 5.0];
const FEATURE: &str = "xyz";
const REPETITIONS: usize = 100;

fn render(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '.' }).collect()
}

fn print_step(layer: &LocationLayer, location: &[bool], sensation: &[bool]) -> anyhow::Result<()> {
    for (i, module) in layer.unflatten(location)?.iter().enumerate() {
        println!("  module {i:>2}: {}", render(module));
    }
    println!("  sensation: {}", render(sensation));
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut brain = Brain::new();

    println!("First view of {FEATURE:?} after moving {MOVEMENT:?}");
    let (location, sensation) = brain.view(MOVEMENT, FEATURE)?;
    print_step(brain.get_sense("view")?.location_layer(), &location, &sensation)?;

    let (mut location, mut sensation) = (location, sensation);
    for _ in 0..REPETITIONS {
        (location, sensation) = brain.view(MOVEMENT, FEATURE)?;
    }

    println!("After {REPETITIONS} more views");
    let view = brain.get_sense("view")?;
    print_step(view.location_layer(), &location, &sensation)?;
    println!("{}", view.location_layer());

    Ok(())
}
