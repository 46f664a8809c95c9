use std::time::Instant;

use once_cell::sync::Lazy;
use roundabout_sim::math::Point3d;
use roundabout_sim::{
    AgentAttributes, LoopMode, PathGeometry, RateConvention, Regime, Simulation,
};

/// Nine points on a circle of radius 10. The last point closes the loop.
const ROUNDABOUT_POINTS: [[f64; 3]; 10] = [
    [-5.877852522924734, 0.0, 8.090169943749473],
    [5.877852522924732, 0.0, 8.090169943749475],
    [9.510565162951535, 0.0, 3.0901699437494745],
    [9.510565162951536, 0.0, -3.0901699437494736],
    [5.877852522924733, 0.0, -8.090169943749473],
    [0.0, 0.0, -10.0],
    [-5.87785252292473, 0.0, -8.090169943749476],
    [-9.510565162951535, 0.0, -3.0901699437494754],
    [-9.510565162951536, 0.0, 3.0901699437494723],
    [-5.877852522924734, 0.0, 8.090169943749473],
];

static ROUNDABOUT: Lazy<Vec<Point3d>> = Lazy::new(|| {
    ROUNDABOUT_POINTS
        .iter()
        .map(|&[x, y, z]| Point3d::new(x, y, z))
        .collect()
});

const CAR: AgentAttributes = AgentAttributes {
    max_speed: 2.0,
    acceleration: 0.01,
    min_gap: 2.0,
    loop_mode: LoopMode::Loop,
};

const NUM_CARS: usize = 12;
const NUM_FRAMES: u32 = 5000;
const DT: f64 = 0.05;

fn main() -> roundabout_sim::Result<()> {
    let path = PathGeometry::catmull_rom(&ROUNDABOUT, RateConvention::Local)?;
    println!("Roundabout length: {:.3}", path.path_length());

    let mut sim = Simulation::new(path);
    let mut last = None;

    let start = Instant::now();
    for _ in 0..NUM_FRAMES {
        // Let a new car in once the entrance is clear
        let clear = last
            .and_then(|id| sim.get_agent(id))
            .map_or(true, |car| car.progress() * sim.path().path_length() > 2.0 * CAR.min_gap);
        if clear && sim.agents().len() < NUM_CARS {
            last = Some(sim.add_agent(&CAR)?);
        }
        sim.step(DT);
    }
    let frame = start.elapsed() / NUM_FRAMES;

    println!(
        "Avg. frame: {:?} ({} cars, {} frames)",
        frame,
        sim.agents().len(),
        sim.frame()
    );
    for car in sim.iter_agents() {
        let pos = car.position();
        println!(
            "{:?}: progress {:.4}, speed {:.3}, at ({:.2}, {:.2}){}",
            car.id(),
            car.progress(),
            car.speed(),
            pos.x,
            pos.z,
            if car.regime() == Regime::Blocked { " blocked" } else { "" }
        );
    }
    Ok(())
}
