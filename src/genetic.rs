//! Resumable genetic search over real-valued parameter vectors.
//!
//! [`Evolution`] holds the whole search state and advances one fitness
//! evaluation per [`Evolution::step`], so a host can time-slice it (see
//! [`Evolution::run`] with a [`Budget`]) and stop at any point.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{check_range, Error, Result};

/// Scores a parameter vector and returns the payload that produced the score.
pub trait Fitness<T> {
    fn evaluate(&mut self, parameters: &[f64]) -> (f64, T);
}

impl<T, F> Fitness<T> for F
where
    F: FnMut(&[f64]) -> (f64, T),
{
    fn evaluate(&mut self, parameters: &[f64]) -> (f64, T) {
        self(parameters)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticParameters {
    pub generations: usize,
    /// Width of the uniform perturbation applied to each offspring parameter.
    pub mutation_rate: f64,
    /// Mutation rate multiplier applied after every generation.
    pub annealing: f64,
    /// Fraction of the current population kept as elite parents.
    pub survival_rate: f64,
    /// Next population size as a fraction of the current one.
    pub cull_rate: f64,
}

impl Default for GeneticParameters {
    fn default() -> Self {
        GeneticParameters {
            generations: 30,
            mutation_rate: 0.2,
            annealing: 0.95,
            survival_rate: 0.25,
            cull_rate: 0.9,
        }
    }
}

impl GeneticParameters {
    pub fn validate(&self) -> Result<()> {
        check_range("mutation_rate", self.mutation_rate, 0.0, 1.0)?;
        check_range("annealing", self.annealing, 0.0, 1.0)?;
        check_range("survival_rate", self.survival_rate, f64::MIN_POSITIVE, 1.0)?;
        check_range("cull_rate", self.cull_rate, f64::MIN_POSITIVE, 1.0)?;
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct Evaluated<T> {
    pub parameters: Vec<f64>,
    pub score: f64,
    pub result: T,
}

/// What a single [`Evolution::step`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    Evaluated { generation: usize, index: usize, score: f64 },
    Done,
}

/// Limits for one [`Evolution::run`] call; `None` means unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Budget {
    pub max_evaluations: Option<usize>,
    pub max_duration: Option<Duration>,
}

impl Budget {
    pub fn unlimited() -> Self {
        Budget::default()
    }

    pub fn evaluations(n: usize) -> Self {
        Budget { max_evaluations: Some(n), max_duration: None }
    }

    pub fn duration(d: Duration) -> Self {
        Budget { max_evaluations: None, max_duration: Some(d) }
    }
}

pub struct Evolution<T, F> {
    fitness: F,
    params: GeneticParameters,
    rng: StdRng,
    capacity: usize,
    population: Vec<Vec<f64>>,
    // Leading members carried over from `results` without re-evaluation
    carried: Vec<f64>,
    cursor: usize,
    pending: Vec<Evaluated<T>>,
    results: Vec<Evaluated<T>>,
    generation: usize,
    mutation_rate: f64,
    generation_best: Vec<f64>,
}

impl<T, F: Fitness<T>> Evolution<T, F> {
    /// Starts a search from an explicit initial population. Its size bounds
    /// the retained result list.
    pub fn new(fitness: F, population: Vec<Vec<f64>>, seed: u64, params: GeneticParameters) -> Result<Self> {
        Self::with_rng(fitness, population, StdRng::seed_from_u64(seed), params)
    }

    /// Starts a search from `population_size` vectors of `dimensions` values
    /// in `[0, 1)`, drawn from the same generator that later drives mutation.
    pub fn seeded(
        fitness: F,
        population_size: usize,
        dimensions: usize,
        seed: u64,
        params: GeneticParameters,
    ) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let population = (0..population_size)
            .map(|_| (0..dimensions).map(|_| rng.gen::<f64>()).collect())
            .collect();
        Self::with_rng(fitness, population, rng, params)
    }

    /// Starts a search from an explicit population that was sampled from
    /// `rng`; mutation continues on the same stream.
    pub fn with_rng(fitness: F, population: Vec<Vec<f64>>, rng: StdRng, params: GeneticParameters) -> Result<Self> {
        params.validate()?;
        if population.is_empty() {
            return Err(Error::EmptyPopulation);
        }
        if population.iter().flatten().any(|x| !x.is_finite()) {
            return Err(Error::NonFinite("population"));
        }
        Ok(Evolution {
            fitness,
            capacity: population.len(),
            mutation_rate: params.mutation_rate,
            params,
            rng,
            population,
            carried: Vec::new(),
            cursor: 0,
            pending: Vec::new(),
            results: Vec::new(),
            generation: 0,
            generation_best: Vec::new(),
        })
    }

    pub fn is_done(&self) -> bool {
        self.generation >= self.params.generations
    }

    /// Evaluates the next member of the current generation. Finishing the
    /// last member also breeds the next generation. Elites carried over from
    /// the previous generation keep their score and are not evaluated again.
    pub fn step(&mut self) -> Step {
        // a generation of elites only has nothing to evaluate
        while !self.is_done() && self.cursor == self.population.len() {
            self.finish_generation();
        }
        if self.is_done() {
            return Step::Done;
        }
        let index = self.cursor;
        let parameters = self.population[index].clone();
        let (score, result) = self.fitness.evaluate(&parameters);
        self.pending.push(Evaluated { parameters, score, result });
        self.cursor += 1;
        let generation = self.generation;
        if self.cursor == self.population.len() {
            self.finish_generation();
        }
        Step::Evaluated { generation, index, score }
    }

    /// Steps until done or until `budget` runs out. Returns the number of
    /// evaluations made by this call.
    pub fn run(&mut self, budget: Budget) -> usize {
        let started = Instant::now();
        let mut n = 0;
        while !self.is_done() {
            if budget.max_evaluations.is_some_and(|max| n >= max) {
                break;
            }
            if budget.max_duration.is_some_and(|max| started.elapsed() >= max) {
                break;
            }
            if self.step() == Step::Done {
                break;
            }
            n += 1;
        }
        n
    }

    fn finish_generation(&mut self) {
        let current_size = self.population.len();
        let best_now = self
            .pending
            .iter()
            .map(|r| r.score)
            .chain(self.carried.iter().copied())
            .fold(f64::NEG_INFINITY, f64::max);
        self.generation_best.push(best_now);

        self.results.append(&mut self.pending);
        self.results.sort_by(|a, b| b.score.total_cmp(&a.score));
        self.results.truncate(self.capacity);

        info!(
            generation = self.generation,
            best = best_now,
            overall_best = self.results.first().map(|r| r.score),
            population = current_size,
            mutation_rate = self.mutation_rate,
            "generation complete"
        );

        self.generation += 1;
        self.cursor = 0;
        self.carried.clear();
        if self.is_done() {
            self.population.clear();
            return;
        }

        let parents = ((self.params.survival_rate * current_size as f64).ceil() as usize)
            .clamp(1, self.results.len());
        let next_size = ((current_size as f64 * self.params.cull_rate).ceil() as usize).max(1);
        self.mutation_rate *= self.params.annealing;

        let mut next = Vec::with_capacity(next_size);
        for i in 0..next_size {
            if i < parents {
                next.push(self.results[i].parameters.clone());
                self.carried.push(self.results[i].score);
                continue;
            }
            let parent = &self.results[self.rng.gen_range(0..parents)].parameters;
            let child = parent
                .iter()
                .map(|p| p + (self.rng.gen::<f64>() - 0.5) * self.mutation_rate)
                .collect();
            next.push(child);
        }
        debug!(parents, next_size, "bred next generation");
        self.cursor = self.carried.len();
        self.population = next;
    }

    /// Retained results, best first. At most the initial population size.
    pub fn results(&self) -> &[Evaluated<T>] {
        &self.results
    }

    pub fn best(&self) -> Option<&Evaluated<T>> {
        self.results.first()
    }

    /// Members of the generation in progress, carried elites first.
    pub fn population(&self) -> &[Vec<f64>] {
        &self.population
    }

    /// Completed generations.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Best score seen in each completed generation.
    pub fn generation_best(&self) -> &[f64] {
        &self.generation_best
    }

    pub fn params(&self) -> &GeneticParameters {
        &self.params
    }

    pub fn into_results(self) -> Vec<Evaluated<T>> {
        self.results
    }
}
