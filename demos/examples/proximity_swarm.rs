// Copyright 2026 the Shoal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small swarm simulation driving the per-cycle rebuild + query loop.
//!
//! The host owns its world state in kurbo types and rebuilds the grid every
//! tick: clear, insert everything at its new position, then run read-only
//! neighborhood queries to steer the agents.
//!
//! Run:
//! - `cargo run -p shoal_demos --example proximity_swarm`

use kurbo::{Point, Vec2};
use shoal_grid::collectors::{KNearest, WithinRadius};
use shoal_grid::{Element, Point2, SpatialDatabase};

const HALF_EXTENT: f64 = 256.0;
const SUBDIVISIONS: u32 = 32;
const INITIAL_CAPACITY: u32 = 4;
const AGENTS: usize = 2_000;
const TICKS: u32 = 200;
const PERCEPTION: f64 = 24.0;
const MAX_SPEED: f64 = 3.0;

struct Agent {
    position: Point,
    velocity: Vec2,
}

struct Rng(u64);

impl Rng {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn spawn(count: usize) -> Vec<Agent> {
    let mut rng = Rng(0x5EED_CAFE_F00D_0001);
    (0..count)
        .map(|_| Agent {
            position: Point::new(
                (rng.next_f64() * 2.0 - 1.0) * (HALF_EXTENT - 1.0),
                (rng.next_f64() * 2.0 - 1.0) * (HALF_EXTENT - 1.0),
            ),
            velocity: Vec2::new(rng.next_f64() - 0.5, rng.next_f64() - 0.5) * 2.0,
        })
        .collect()
}

fn grid_point(p: Point) -> Point2<f64> {
    Point2::new(p.x, p.y)
}

fn wrap(v: f64) -> f64 {
    if v >= HALF_EXTENT {
        v - 2.0 * HALF_EXTENT
    } else if v < -HALF_EXTENT {
        v + 2.0 * HALF_EXTENT
    } else {
        v
    }
}

fn main() {
    let mut agents = spawn(AGENTS);

    let mut cells = Vec::new();
    let mut elements = Vec::new();
    let db = SpatialDatabase::initialize(
        HALF_EXTENT,
        SUBDIVISIONS,
        INITIAL_CAPACITY,
        &mut cells,
        &mut elements,
    );

    let mut steering = vec![Vec2::ZERO; agents.len()];
    let mut near = Vec::new();

    for tick in 0..TICKS {
        // Write phase: rebuild the index at this tick's positions.
        db.clear_and_resize(&mut cells, &mut elements);
        for (i, agent) in agents.iter().enumerate() {
            db.insert(
                &mut cells,
                &mut elements,
                Element::new(i as u32, grid_point(agent.position)),
            );
        }

        // Read phase: steer each agent toward its neighborhood's center.
        for (i, agent) in agents.iter().enumerate() {
            near.clear();
            let center = grid_point(agent.position);
            let mut collector = WithinRadius::new(center, PERCEPTION, &mut near);
            db.query_range(
                &cells,
                &elements,
                center,
                Point2::new(PERCEPTION, PERCEPTION),
                &mut collector,
            );

            let mut pull = Vec2::ZERO;
            let mut others = 0;
            for e in near.iter().filter(|e| e.value != i as u32) {
                pull += Point::new(e.position.x, e.position.y) - agent.position;
                others += 1;
            }
            steering[i] = if others > 0 {
                pull * (0.05 / others as f64)
            } else {
                Vec2::ZERO
            };
        }

        for (agent, steer) in agents.iter_mut().zip(&steering) {
            agent.velocity += *steer;
            let speed = agent.velocity.hypot();
            if speed > MAX_SPEED {
                agent.velocity = agent.velocity * (MAX_SPEED / speed);
            }
            agent.position += agent.velocity;
            agent.position.x = wrap(agent.position.x);
            agent.position.y = wrap(agent.position.y);
        }

        if tick % 50 == 0 {
            let stats = db.stats(&cells);
            let probe = grid_point(agents[0].position);
            let mut nearest = KNearest::new(db.geometry(), probe, 4);
            db.query_range_nearest_first(
                &cells,
                &elements,
                probe,
                Point2::new(2.0 * HALF_EXTENT, 2.0 * HALF_EXTENT),
                &mut nearest,
            );
            let ids: Vec<u32> = nearest.neighbors().iter().map(|n| n.element.value).collect();
            println!(
                "tick {tick:3}: {} stored / {} slots, {} cells overflowed (excess {}), agent 0 nearest: {:?}",
                stats.elements, stats.capacity, stats.overflowed_cells, stats.excess, ids
            );
        }
    }

    println!("done after {TICKS} ticks");
}
