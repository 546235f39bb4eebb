//! End-to-end floor plan pipeline: planarize an edited graph, pick its faces
//! in reading order, and set up one room search per face.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithms::planarize::planarize;
use crate::algorithms::regions::{sorted_regions, RegionId, RegionStrategy};
use crate::error::Result;
use crate::genetic::{Evolution, GeneticParameters};
use crate::model::PointId;
use crate::rooms::{Partition, Partitioner, RoomsDefinition};
use crate::scoring::ScoreConfig;
use crate::Graph;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub strategy: RegionStrategy,
    pub population: usize,
    pub seed: u64,
    pub genetic: GeneticParameters,
    pub score: ScoreConfig,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            strategy: RegionStrategy::default(),
            population: 40,
            seed: 0,
            genetic: GeneticParameters::default(),
            score: ScoreConfig::default(),
        }
    }
}

/// One face to be split into rooms.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceJob {
    /// Position of the face in reading order; selects the weight line.
    pub index: usize,
    pub region_id: RegionId,
    pub cycle: Vec<PointId>,
    pub weights: Vec<f64>,
}

impl FaceJob {
    pub fn partitioner(&self, planar: &Graph, opts: &LayoutOptions) -> Result<Partitioner> {
        Ok(Partitioner::new(planar, &self.cycle, &self.weights)?
            .with_config(opts.score.clone())
            .with_strategy(opts.strategy))
    }

    /// Search for this face. Each face gets its own seed so faces do not
    /// share random streams; initial cuts and mutation draw from one stream.
    pub fn evolution(&self, planar: &Graph, opts: &LayoutOptions) -> Result<Evolution<Partition, Partitioner>> {
        let seed = opts.seed.wrapping_add(self.index as u64);
        let partitioner = self.partitioner(planar, opts)?;
        let dimensions = partitioner.dimensions();
        Evolution::seeded(partitioner, opts.population, dimensions, seed, opts.genetic.clone())
    }
}

/// Faces of an already planar graph, each paired with its weight line.
pub fn face_jobs(planar: &Graph, rooms: &RoomsDefinition, strategy: RegionStrategy) -> Vec<FaceJob> {
    let regions = planar.regions(strategy);
    sorted_regions(planar, &regions)
        .into_iter()
        .enumerate()
        .map(|(index, info)| FaceJob {
            index,
            region_id: info.id,
            cycle: info.points,
            weights: rooms.room_weights(index).to_vec(),
        })
        .collect()
}

/// Planarizes `source` and returns the planar graph with its face jobs.
pub fn plan(source: &Graph, rooms: &RoomsDefinition, opts: &LayoutOptions) -> (Graph, Vec<FaceJob>) {
    let planar = planarize(source);
    let jobs = face_jobs(&planar, rooms, opts.strategy);
    debug!(
        points = planar.points().len(),
        edges = planar.edges().len(),
        faces = jobs.len(),
        "floor plan prepared"
    );
    (planar, jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetic::Budget;
    use crate::model::Vec2;

    fn crossed_square() -> Graph {
        // square with both medians drawn as single edges across it
        let mut g = Graph::new();
        let c: Vec<PointId> = [(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]
            .iter()
            .map(|&(x, y)| g.add_point(Vec2::new(x, y), None))
            .collect();
        for i in 0..4 {
            g.add_edge(&c[i], &c[(i + 1) % 4]);
        }
        let m: Vec<PointId> = [(1.0, 0.0), (1.0, 2.0), (0.0, 1.0), (2.0, 1.0)]
            .iter()
            .map(|&(x, y)| g.add_point(Vec2::new(x, y), None))
            .collect();
        g.add_edge(&m[0], &m[1]);
        g.add_edge(&m[2], &m[3]);
        g
    }

    #[test]
    fn plan_yields_one_job_per_face() {
        let rooms = RoomsDefinition::new(vec![vec![2.0, 1.0], vec![1.0]]);
        let (planar, jobs) = plan(&crossed_square(), &rooms, &LayoutOptions::default());
        assert_eq!(jobs.len(), 4);
        assert_eq!(jobs[0].weights, vec![2.0, 1.0]);
        assert_eq!(jobs[1].weights, vec![1.0]);
        assert_eq!(jobs[3].weights, vec![1.0]);
        for job in &jobs {
            assert!(job.cycle.iter().all(|id| planar.contains_point(id)));
        }
    }

    #[test]
    fn face_job_runs_a_search() {
        let rooms = RoomsDefinition::new(vec![vec![1.0, 1.0]]);
        let opts = LayoutOptions {
            population: 6,
            genetic: GeneticParameters { generations: 3, ..GeneticParameters::default() },
            ..LayoutOptions::default()
        };
        let (planar, jobs) = plan(&crossed_square(), &rooms, &opts);
        let mut evo = jobs[0].evolution(&planar, &opts).unwrap();
        evo.run(Budget::unlimited());
        let best = evo.best().unwrap();
        assert_eq!(best.parameters.len(), 1);
        assert!(best.score > 0.0);
        assert_eq!(best.result.regions.len(), 2);
    }

    #[test]
    fn face_job_samples_and_mutates_from_one_stream() {
        let rooms = RoomsDefinition::new(vec![vec![1.0; 4]; 4]);
        let opts = LayoutOptions { seed: 3, population: 5, ..LayoutOptions::default() };
        let (planar, jobs) = plan(&crossed_square(), &rooms, &opts);
        let job = &jobs[2];
        let evo = job.evolution(&planar, &opts).unwrap();
        let reference: Evolution<Partition, Partitioner> =
            Evolution::seeded(job.partitioner(&planar, &opts).unwrap(), 5, 3, 5, opts.genetic.clone()).unwrap();
        assert_eq!(evo.population(), reference.population());
        assert_eq!(evo.population().len(), 5);
        assert!(evo.population().iter().all(|p| p.len() == 3));
    }
}
