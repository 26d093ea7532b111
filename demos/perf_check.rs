use perineighbor::points::random_points;
use perineighbor::{BoundingBox, NeighborDeck, NeighborList};

fn main() {
    // Initialize Rayon explicitly so thread creation (clone3) happens
    // before the heavy calculation we want to profile.
    rayon::ThreadPoolBuilder::new().build_global().unwrap();

    let bounds = BoundingBox::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
    let points = random_points(200_000, &bounds, 1);

    // About 130 neighbors per point, a typical peridynamic load
    let horizon = 0.05;
    let deck = NeighborDeck::from_json_str(r#"{ "Safety_Factor": 1.0 }"#).unwrap();

    // The hot path: tree construction plus one query per point
    let horizon = deck.effective_horizon(horizon).unwrap();
    let list = NeighborList::build(horizon, &points, &deck).unwrap();
    println!("{}", list);
}
