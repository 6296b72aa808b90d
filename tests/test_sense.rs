//! End-to-end tests of the move, recognize, correct and link cycle.

use grid_sense::{
    Brain, Config, GridCellModule, LocationConfig, LocationLayer, SensationConfig, Sense,
    SensoryLayer,
};
use rand::{rngs::StdRng, SeedableRng};

const MOVEMENT: [f64; 2] = [2.0, 5.0];
const FEATURE: &str = "xyz";

fn active(bits: &[bool]) -> usize {
    bits.iter().filter(|&&b| b).count()
}

// ============== View scenario ==============

#[test]
fn test_first_view_bursts_one_column() {
    let mut sense = Sense::with_seed(&Config::view(), 2024);
    let (location, sensation) = sense.sense(MOVEMENT, FEATURE).unwrap();

    assert_eq!(location.len(), 12 * 36);
    assert_eq!(sensation.len(), 16 * 7);

    // A new feature is spread over ceil(3 * 16 / 50) = 1 column, which bursts.
    let columns = sense.sensory_layer().columns_for(FEATURE).unwrap();
    assert_eq!(columns.len(), 1);
    let column = columns[0];
    assert_eq!(active(&sensation), 7);
    assert!(sensation[column * 7..(column + 1) * 7].iter().all(|&b| b));

    let learners = sense.sensory_layer().columns()[column]
        .cells()
        .iter()
        .filter(|cell| cell.is_learner())
        .count();
    assert_eq!(learners, 1);
}

#[test]
fn test_repeated_view_stays_within_the_allotted_column() {
    let mut sense = Sense::with_seed(&Config::view(), 7);
    sense.sense(MOVEMENT, FEATURE).unwrap();
    let column = sense.sensory_layer().columns_for(FEATURE).unwrap()[0];

    for _ in 0..100 {
        let (location, sensation) = sense.sense(MOVEMENT, FEATURE).unwrap();
        assert_eq!(location.len(), 432);
        assert_eq!(sensation.len(), 112);

        let outside = sensation
            .chunks(7)
            .enumerate()
            .filter(|&(c, _)| c != column)
            .any(|(_, cells)| cells.iter().any(|&b| b));
        assert!(!outside);
        assert!(active(&sensation) > 0);
    }

    // Every cell learns at most once, the column cannot hold more learners than cells.
    let learners = sense.sensory_layer().columns()[column]
        .cells()
        .iter()
        .filter(|cell| cell.is_learner())
        .count();
    assert!((1..=7).contains(&learners));
    assert_eq!(
        sense.sensory_layer().columns_for(FEATURE).unwrap(),
        &[column]
    );
}

#[test]
fn test_brain_view_matches_the_view_config() {
    let mut brain = Brain::new();
    for _ in 0..3 {
        let (location, sensation) = brain.view(MOVEMENT, FEATURE).unwrap();
        assert_eq!(location.len(), 432);
        assert_eq!(sensation.len(), 112);
    }
}

// ============== Stabilization ==============

/// One module of 6x6 cells and 134 single-cell columns. A feature then spans nine columns.
///
/// With one cell per column a feature column reports its cell active whether it recognizes
/// the location or bursts, so every step senses the same nine cells. Grid cells linked to
/// those nine cells on the first step fire from the second step on and pin the bumps. The
/// set of firing grid cells only grows and is bounded by the module size, so the location
/// has to settle well within a hundred steps.
fn recognition_driven_sense() -> Sense {
    let config = Config::new(
        "view",
        LocationConfig::new(1, 6).unwrap(),
        SensationConfig::new(134, 1).unwrap(),
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(99);
    // A scale above one guarantees an active cell wherever a bump lands.
    let module = GridCellModule::with_geometry(1.5, 25, &config, &mut rng);
    let location = LocationLayer::from_modules(vec![module]).unwrap();
    let sensory = SensoryLayer::new(&config, StdRng::seed_from_u64(100));
    Sense::from_layers("view", location, sensory).unwrap()
}

#[test]
fn test_sensation_is_identical_every_step() {
    let mut sense = recognition_driven_sense();
    let (_, first) = sense.sense(MOVEMENT, FEATURE).unwrap();
    assert_eq!(active(&first), 9);

    for _ in 0..20 {
        let (_, sensation) = sense.sense(MOVEMENT, FEATURE).unwrap();
        assert_eq!(sensation, first);
    }
}

#[test]
fn test_bumps_stabilize_under_repetition() {
    let mut sense = recognition_driven_sense();

    let (first, _) = sense.sense(MOVEMENT, FEATURE).unwrap();
    assert!(active(&first) > 0);

    let mut history = Vec::new();
    for _ in 0..100 {
        let (location, _) = sense.sense(MOVEMENT, FEATURE).unwrap();
        let module = &sense.location_layer().modules()[0];

        // From the second step on the bumps sit on cells recognizing the sensation.
        assert!(module
            .bumps()
            .iter()
            .all(|bump| module.cells().iter().any(|cell| cell.phase() == *bump)));
        history.push((location, module.bumps().to_vec()));
    }

    let settled = &history[history.len() - 1];
    for earlier in &history[history.len() - 5..] {
        assert_eq!(earlier, settled);
    }
}

#[test]
fn test_same_seed_reproduces_the_view() {
    let mut first = Sense::with_seed(&Config::view(), 5);
    let mut second = Sense::with_seed(&Config::view(), 5);
    for _ in 0..10 {
        assert_eq!(
            first.sense(MOVEMENT, FEATURE).unwrap(),
            second.sense(MOVEMENT, FEATURE).unwrap()
        );
    }
}
