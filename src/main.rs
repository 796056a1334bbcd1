use anyhow::{anyhow, bail};
use clap::{Parser, ValueEnum};
use pairplan::core::{PlanConfig, Planner, Schedule, Task, TaskUniverse};
use pairplan::exec::{execute, Perform, ThreadPool};
use pairplan::{algo, data, plan};
use std::fs::File;
use std::io::BufReader;
use std::num::NonZero;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug)]
struct Algorithm(usize, &'static str);

impl Algorithm {
    fn init(self, config: &PlanConfig) -> Box<dyn Planner> {
        algo::PLANNERS[self.0](config)
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.1)
    }
}

impl ValueEnum for Algorithm {
    fn value_variants<'a>() -> &'a [Self] {
        static ALGORITHMS: std::sync::LazyLock<Vec<Algorithm>> = std::sync::LazyLock::new(|| {
            let config = PlanConfig::default();
            let iter = algo::PLANNERS.iter().enumerate();
            iter.map(|(i, init)| Algorithm(i, init(&config).name()))
                .collect()
        });

        ALGORITHMS.as_slice()
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.1))
    }
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum Format {
    #[default]
    Text,
    Json,
}

/// Plans all-pairs-plus-self comparisons over partitions into conflict free batches.
#[derive(Debug, Parser)]
#[command(version, about)]
enum Application {
    /// Print the schedule for a number of partitions.
    Plan {
        /// The number of partitions.
        partitions: usize,
        /// The planning algorithm.
        #[clap(short, long, default_value = "greedy")]
        algorithm: Algorithm,
        /// The largest number of tasks in one batch.
        #[clap(short = 'w', long)]
        max_width: Option<NonZero<usize>>,
        /// Output format.
        #[clap(short, long, value_enum, default_value_t)]
        format: Format,
    },
    /// Check that a JSON schedule covers every task once without partition conflicts.
    Check {
        /// The number of partitions.
        partitions: usize,
        /// The schedule file.
        input: String,
    },
    /// Compare the planners on every partition count up to a limit.
    Bench {
        /// The largest number of partitions.
        up_to: NonZero<usize>,
        /// Exclude planning algorithms.
        #[clap(short, long, value_delimiter = ',')]
        exclude: Vec<Algorithm>,
        /// The largest number of tasks in one batch.
        #[clap(short = 'w', long)]
        max_width: Option<NonZero<usize>>,
    },
    /// Execute a schedule on a worker pool with an empty comparison.
    Run {
        /// The number of partitions.
        partitions: usize,
        /// The planning algorithm.
        #[clap(short, long, default_value = "greedy")]
        algorithm: Algorithm,
        /// The number of worker threads. Also bounds the batch width.
        #[clap(short = 'j', long, default_value = "4")]
        workers: NonZero<usize>,
    },
}

fn planners(exclude: &[Algorithm], config: &PlanConfig) -> Vec<Box<dyn Planner>> {
    let iter = algo::PLANNERS.iter().map(|init| init(config));
    iter.filter(|planner| !exclude.iter().any(|name| name.1 == planner.name()))
        .collect()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Application::parse() {
        Application::Plan {
            partitions,
            algorithm,
            max_width,
            format,
        } => {
            let config = PlanConfig::with_max_width(max_width);
            let schedule = plan(partitions, algorithm.init(&config).as_mut())?;
            match format {
                Format::Text => print!("{schedule}"),
                Format::Json => println!("{}", data::to_string(&schedule)?),
            }
            Ok(())
        }
        Application::Check { partitions, input } => {
            let universe = TaskUniverse::build(partitions)?;
            let schedule: Schedule = data::deserialize(&mut BufReader::new(File::open(&input)?))?;
            if schedule.partitions() != partitions {
                bail!(
                    "{input} was planned for {} partitions, not {partitions}",
                    schedule.partitions()
                );
            }
            schedule
                .validate(&universe)
                .map_err(|violation| anyhow!("{input}: {violation}"))?;
            println!(
                "{input}: valid, {} tasks in {} batches",
                schedule.task_count(),
                schedule.len()
            );
            Ok(())
        }
        Application::Bench {
            up_to,
            exclude,
            max_width,
        } => {
            let config = PlanConfig::with_max_width(max_width);
            for mut planner in planners(&exclude, &config) {
                print!("{}", data::run(1..=up_to.get(), planner.as_mut())?);
            }
            Ok(())
        }
        Application::Run {
            partitions,
            algorithm,
            workers,
        } => {
            let config = PlanConfig::with_max_width(Some(workers));
            let schedule = plan(partitions, algorithm.init(&config).as_mut())?;
            let mut executor = ThreadPool::new(workers)?;
            let perform: Perform = Arc::new(|_: Task| -> anyhow::Result<()> { Ok(()) });
            let report = execute(&schedule, &mut executor, &perform);
            print!("{report}");
            if report.is_success() {
                Ok(())
            } else {
                bail!("{} tasks failed", report.failures.len())
            }
        }
    }
}
