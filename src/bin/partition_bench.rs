#[cfg(feature = "bench_partition")]
use roomcut::genetic::Budget;
#[cfg(feature = "bench_partition")]
use roomcut::layout::{plan, LayoutOptions};
#[cfg(feature = "bench_partition")]
use roomcut::rooms::RoomsDefinition;
#[cfg(feature = "bench_partition")]
use roomcut::{Graph, PointId, Vec2};
#[cfg(feature = "bench_partition")]
use std::time::{Duration, Instant};

#[cfg(not(feature = "bench_partition"))]
fn main() {
    panic!("partition_bench requires --features bench_partition");
}

// a b c
// d   f
// g h i
#[cfg(feature = "bench_partition")]
fn build_scene() -> Graph {
    let mut g = Graph::new();
    let mut at = |name: &str, x: f64, y: f64| g.add_point(Vec2::new(x, y), Some(PointId::from(name)));
    let a = at("a", -50.0, -50.0);
    let b = at("b", 0.0, -50.0);
    let c = at("c", 50.0, -50.0);
    let d = at("d", -50.0, 0.0);
    let f = at("f", 50.0, 0.0);
    let gg = at("g", -50.0, 50.0);
    let h = at("h", 0.0, 50.0);
    let i = at("i", 50.0, 50.0);
    for (p, q) in [(&a, &b), (&b, &c), (&c, &f), (&f, &i), (&i, &h), (&h, &gg), (&gg, &d), (&d, &a), (&b, &h), (&d, &f)] {
        g.add_edge(p, q);
    }
    g
}

#[cfg(feature = "bench_partition")]
fn main() {
    tracing_subscriber::fmt::SubscriberBuilder::default().with_target(false).init();

    let args: Vec<String> = std::env::args().collect();
    let mut population = 40usize;
    let mut slice_ms = 16u64;
    let mut seed = 0u64;
    for a in &args[1..] {
        if let Some(val) = a.strip_prefix("--population=") {
            if let Ok(v) = val.parse() {
                population = v;
            }
        } else if let Some(val) = a.strip_prefix("--slice-ms=") {
            if let Ok(v) = val.parse() {
                slice_ms = v;
            }
        } else if let Some(val) = a.strip_prefix("--seed=") {
            if let Ok(v) = val.parse() {
                seed = v;
            }
        }
    }

    let opts = LayoutOptions { population, seed, ..LayoutOptions::default() };
    let (planar, jobs) = plan(&build_scene(), &RoomsDefinition::many_rooms(), &opts);
    for job in &jobs {
        let mut evo = match job.evolution(&planar, &opts) {
            Ok(evo) => evo,
            Err(e) => {
                eprintln!("face {}: {}", job.index, e);
                continue;
            }
        };
        // Time-sliced like a frame loop
        let t0 = Instant::now();
        let mut slices = 0usize;
        let mut evaluations = 0usize;
        while !evo.is_done() {
            evaluations += evo.run(Budget::duration(Duration::from_millis(slice_ms)));
            slices += 1;
        }
        let total_ms = t0.elapsed().as_secs_f64() * 1000.0;
        let best = evo.best().map(|r| r.score).unwrap_or(0.0);
        println!(
            "face={} region={} rooms={} evaluations={} slices={} best={} total_ms={:.3}",
            job.index,
            job.region_id,
            job.weights.len(),
            evaluations,
            slices,
            best,
            total_ms
        );
    }
}
