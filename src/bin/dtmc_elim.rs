use cancel_this::Cancellable;
use clap::Parser;
use dtmc_state_elimination::elimination::{EliminationConfig, EliminationMethod, EliminationOrder};
use dtmc_state_elimination::error::CheckError;
use dtmc_state_elimination::logic::{PathFormula, Property, StateFormula};
use dtmc_state_elimination::model::explicit::{load_dtmc, model_stem};
use dtmc_state_elimination::modelchecker::EliminationModelChecker;
use dtmc_state_elimination::value::{RationalFunction, ValueOps};
use env_logger::Builder;
use log::LevelFilter;
use num_rational::BigRational;
use std::path::Path;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "dtmc_elim")]
#[command(about = "Check reachability, reward and conditional properties of a DTMC by state elimination")]
struct Args {
    /// Path to the `.tra` file of the model (or its path without extension)
    #[arg(value_name = "FILE")]
    file: String,

    /// State formula of the target states, e.g. `"done" & !failed`
    #[arg(long, require_equals = true)]
    target: String,

    /// Only visit states satisfying this formula before the target (`phi U target`)
    #[arg(long, require_equals = true, conflicts_with_all = ["condition", "reward"])]
    phi: Option<String>,

    /// Compute the probability of reaching the target given that this formula is reached
    #[arg(long, require_equals = true, conflicts_with = "reward")]
    condition: Option<String>,

    /// Compute the expected reward until the target is reached instead of a probability
    #[arg(long)]
    reward: bool,

    /// Elimination method: "state" or "hybrid"
    #[arg(long, default_value = "state", require_equals = true)]
    method: Method,

    /// Elimination order
    #[arg(long, default_value = "forward-reversed", require_equals = true)]
    order: Order,

    /// Maximal size of an SCC that the hybrid method does not decompose further
    #[arg(long, default_value_t = 20, require_equals = true)]
    max_scc_size: usize,

    /// Eliminate the entry states of nested SCCs only after all SCCs are treated
    #[arg(long)]
    entry_states_last: bool,

    /// Seed of the random elimination order
    #[arg(long, default_value_t = 0, require_equals = true)]
    seed: u64,

    /// Number representation: "float", "exact" or "parametric"
    #[arg(long, default_value = "float", require_equals = true)]
    values: Values,

    /// Cancel the check after this many seconds (0 means no limit)
    #[arg(long, default_value_t = 0, require_equals = true)]
    timeout: u64,

    /// Verbose logging level: "trace", "debug", or "info"
    /// If specified without a value (--verbose or -v), defaults to "info"
    /// Use --verbose=LEVEL or -v=LEVEL to specify a level, or just --verbose/-v for info
    #[arg(long, short = 'v', value_name = "LEVEL", num_args = 0..=1, default_missing_value = "info", require_equals = true)]
    verbose: Option<Option<LogLevel>>,
}

#[derive(Clone, clap::ValueEnum)]
enum Method {
    State,
    Hybrid,
}

#[derive(Clone, clap::ValueEnum)]
enum Order {
    Forward,
    ForwardReversed,
    Backward,
    BackwardReversed,
    Random,
}

#[derive(Clone, clap::ValueEnum)]
enum Values {
    Float,
    Exact,
    Parametric,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
}

impl From<Method> for EliminationMethod {
    fn from(value: Method) -> Self {
        match value {
            Method::State => EliminationMethod::State,
            Method::Hybrid => EliminationMethod::Hybrid,
        }
    }
}

impl From<Order> for EliminationOrder {
    fn from(value: Order) -> Self {
        match value {
            Order::Forward => EliminationOrder::Forward,
            Order::ForwardReversed => EliminationOrder::ForwardReversed,
            Order::Backward => EliminationOrder::Backward,
            Order::BackwardReversed => EliminationOrder::BackwardReversed,
            Order::Random => EliminationOrder::Random,
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
        }
    }
}

fn parse_formula(text: &str) -> StateFormula {
    text.parse()
        .unwrap_or_else(|e| panic!("Invalid state formula `{text}`: {e}"))
}

fn property(args: &Args) -> Property {
    let target = parse_formula(&args.target);
    if args.reward {
        return Property::Reward(target);
    }
    let path = match &args.phi {
        Some(phi) => PathFormula::until(parse_formula(phi), target),
        None => PathFormula::eventually(target),
    };
    match &args.condition {
        Some(condition) => Property::Probability(PathFormula::conditional(
            path,
            PathFormula::eventually(parse_formula(condition)),
        )),
        None => Property::Probability(path),
    }
}

fn check<V: ValueOps>(args: &Args, property: &Property, config: EliminationConfig) {
    let stem = model_stem(Path::new(&args.file));
    let model = load_dtmc::<V>(&stem)
        .unwrap_or_else(|e| panic!("Failed to load model {}: {}", args.file, e));
    println!(
        "Loaded DTMC with {} states and {} transitions.",
        model.state_count(),
        model.transition_matrix().entry_count()
    );

    let checker = EliminationModelChecker::with_config(&model, config);
    let result = if args.timeout == 0 {
        checker.check(property)
    } else {
        let timeout = Duration::from_secs(args.timeout);
        let result: Cancellable<_> =
            cancel_this::on_timeout(timeout, || Ok(checker.check(property)));
        result.unwrap_or_else(|cancelled| Err(CheckError::from(cancelled)))
    };

    match result {
        Ok(result) => {
            println!("Result for {property}: {}", result.value);
            if let Some(approximation) = result.value.to_f64() {
                println!("Approximately: {approximation}");
            }
            println!(
                "Maybe states: {}, eliminated states: {}, maximal SCC depth: {}",
                result.statistics.maybe_states,
                result.statistics.eliminated_states,
                result.statistics.maximal_scc_depth
            );
        }
        Err(e) => {
            eprintln!("Error during model checking: {}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    let args = Args::parse();

    let log_level = match args.verbose {
        None => LevelFilter::Off,
        Some(None) => LevelFilter::Info,
        Some(Some(ref level)) => level.clone().into(),
    };
    Builder::from_default_env().filter_level(log_level).init();

    let property = property(&args);
    let config = EliminationConfig::default()
        .method(args.method.clone().into())
        .order(args.order.clone().into())
        .maximal_scc_size(args.max_scc_size)
        .eliminate_entry_states_last(args.entry_states_last)
        .random_seed(args.seed)
        .progress(|progress| {
            let percent = 100 * progress.eliminated / progress.total.max(1);
            eprint!("\rEliminating states: {percent:>3}%");
            if progress.eliminated >= progress.total {
                eprintln!();
            }
        });

    match args.values {
        Values::Float => check::<f64>(&args, &property, config),
        Values::Exact => check::<BigRational>(&args, &property, config),
        Values::Parametric => check::<RationalFunction>(&args, &property, config),
    }
}
