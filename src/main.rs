use log::info;
use log::LevelFilter;
use mvc_solver::graph::IncidenceGraph;
use mvc_solver::io::{
    solution_filename, trace_filename, write_solution, MetisReader, TraceWriter,
};
use mvc_solver::logging;
use mvc_solver::solver::{Algorithm, Solver, DEFAULT_SEED};
use std::convert::TryFrom;
use std::fs::{File, OpenOptions};
use std::io;
use std::io::{stdin, BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Duration;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "mvc-cli",
    about = "Searches for a minimum vertex cover of a given input graph."
)]
struct Opt {
    /// Input file: first line `num_vertices num_edges`, then one line of
    /// 1-based neighbor ids per vertex. `stdin` if not specified.
    #[structopt(parse(from_os_str))]
    input: Option<PathBuf>,

    /// Directory the solution and trace files are written to.
    #[structopt(short, long, parse(from_os_str), default_value = ".")]
    output_dir: PathBuf,

    /// Algorithm: `bnb` (exact branch and bound), `genetic` or `annealing`.
    #[structopt(short, long, default_value = "bnb")]
    algorithm: Algorithm,

    /// Wall-clock cutoff in seconds.
    #[structopt(short, long, default_value = "600")]
    time_limit: f64,

    /// Seed for the pseudo random generator.
    #[structopt(short, long)]
    seed: Option<u64>,

    /// Verbose step tracing.
    #[structopt(short, long)]
    verbose: bool,
}

fn main() -> io::Result<()> {
    let opt = Opt::from_args();
    let level = if opt.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::build_logger_for_level(level);

    let graph: IncidenceGraph = match &opt.input {
        Some(path) => {
            let file = File::open(path)?;
            IncidenceGraph::try_from(MetisReader(BufReader::new(file)))?
        }
        None => {
            let stdin = stdin();
            IncidenceGraph::try_from(MetisReader(stdin.lock()))?
        }
    };
    info!(
        "read graph with {} vertices and {} edges",
        graph.order(),
        graph.size()
    );

    let input_name = opt
        .input
        .clone()
        .unwrap_or_else(|| PathBuf::from("stdin.graph"));
    let method = opt.algorithm.tag();
    let trace_path = opt
        .output_dir
        .join(trace_filename(&input_name, method, opt.time_limit, opt.seed));
    let solution_path = opt
        .output_dir
        .join(solution_filename(&input_name, method, opt.time_limit, opt.seed));

    let trace_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&trace_path)?;

    info!(
        "running {} with a {}s cutoff, writing {}",
        method,
        opt.time_limit,
        solution_path.display()
    );
    let outcome = Solver::default()
        .algorithm(opt.algorithm)
        .timeout(Duration::from_secs_f64(opt.time_limit))
        .seed(opt.seed.unwrap_or(DEFAULT_SEED))
        .tracer(Box::new(TraceWriter::new(trace_file)))
        .solve(&graph);

    let solution_file = File::create(&solution_path)?;
    write_solution(BufWriter::new(solution_file), &outcome.best)?;

    if outcome.proved_optimal {
        info!("optimal cover of size {}", outcome.best.size());
    } else {
        info!("best cover found: size {}", outcome.best.size());
    }
    Ok(())
}
