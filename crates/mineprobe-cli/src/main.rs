//! Command-line boundary for the mineprobe solver.
//!
//! Reads one JSON request from a file or stdin, solves it and writes the
//! JSON response to stdout. Malformed requests still produce a response,
//! with `valid: false` and an `InputValidationError` message.
//!
//! # Usage
//!
//! ```sh
//! mineprobe request.json
//! echo '{"board":{"width":2,"height":2,"mines":1},"tiles":[{"x":0,"y":0,"value":1}]}' | mineprobe
//! ```
//!
//! Solver limits can be set with flags or `MINEPROBE_*` environment
//! variables; see `mineprobe --help`. Logging follows `RUST_LOG` (default
//! `warn`); `--verbose` raises it to `info` and turns on per-query
//! diagnostics.
//!
//! # Exit status
//!
//! `0` when the response is valid, `1` when it is not, `2` when the request
//! could not be read or the response could not be written.

use std::{
    fs,
    io::{self, Read as _, Write as _},
    path::PathBuf,
    process::ExitCode,
};

use clap::{ArgAction, Parser};
use mineprobe_solver::{SolveRequest, SolveResponse, Solver, SolverConfig};

#[derive(Debug, Parser)]
#[command(author, version, about)]
#[expect(clippy::struct_excessive_bools)]
struct Args {
    /// Request file. Reads stdin when omitted or `-`.
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Pretty-print the response.
    #[arg(long)]
    pretty: bool,

    /// Log solver diagnostics at info level.
    #[arg(short, long)]
    verbose: bool,

    /// Allow tie-break scoring.
    #[arg(long, env = "MINEPROBE_TIE_BREAK", default_value_t = true, action = ArgAction::Set)]
    tie_break: bool,

    /// Allow dead tile analysis.
    #[arg(long, env = "MINEPROBE_DEAD_TILE_ANALYSIS", default_value_t = true, action = ArgAction::Set)]
    dead_tile_analysis: bool,

    /// Allow unavoidable-guess detection.
    #[arg(long, env = "MINEPROBE_FIFTY_FIFTY_CHECK", default_value_t = true, action = ArgAction::Set)]
    fifty_fifty_check: bool,

    /// Upper clamp for a request's brute force threshold.
    #[arg(long, env = "MINEPROBE_MAX_BRUTE_FORCE_THRESHOLD", default_value_t = 2_000)]
    max_brute_force_threshold: usize,

    /// Largest enumeration cycle count that will be attempted.
    #[arg(long, env = "MINEPROBE_BRUTE_FORCE_MAX_CYCLES", default_value_t = 1_000_000)]
    brute_force_max_cycles: u64,

    /// Node visits allowed during decision-tree search.
    #[arg(long, env = "MINEPROBE_BRUTE_FORCE_MAX_NODES", default_value_t = 150_000)]
    brute_force_max_nodes: usize,

    /// Decision-tree levels memoized during search and logged by the strategy dump.
    #[arg(long, env = "MINEPROBE_BRUTE_FORCE_TREE_DEPTH", default_value_t = 4)]
    brute_force_tree_depth: usize,

    /// Tiles at least this fraction of the best safety enter tie-break.
    #[arg(long, env = "MINEPROBE_TIE_BREAK_FRACTION", default_value_t = 0.9)]
    tie_break_fraction: f64,

    /// Most candidates scored by tie-break.
    #[arg(long, env = "MINEPROBE_TIE_BREAK_MAX_CANDIDATES", default_value_t = 20)]
    tie_break_max_candidates: usize,

    /// Largest `n` accepted by the binomial calculator.
    #[arg(long, env = "MINEPROBE_BINOMIAL_MAX", default_value_t = 50_000)]
    binomial_max: usize,

    /// Largest `n` served from the precomputed binomial table.
    #[arg(long, env = "MINEPROBE_BINOMIAL_LOOKUP", default_value_t = 500)]
    binomial_lookup: usize,

    /// Working line count above which dead tile analysis is abandoned.
    #[arg(long, env = "MINEPROBE_DEAD_ANALYSIS_MAX_LINES", default_value_t = 10_000)]
    dead_analysis_max_lines: usize,
}

impl Args {
    fn config(&self) -> SolverConfig {
        SolverConfig {
            tie_break: self.tie_break,
            dead_tile_analysis: self.dead_tile_analysis,
            fifty_fifty_check: self.fifty_fifty_check,
            max_brute_force_threshold: self.max_brute_force_threshold,
            brute_force_max_cycles: self.brute_force_max_cycles,
            brute_force_max_nodes: self.brute_force_max_nodes,
            brute_force_tree_depth: self.brute_force_tree_depth,
            tie_break_fraction: self.tie_break_fraction,
            tie_break_max_candidates: self.tie_break_max_candidates,
            binomial_max: self.binomial_max,
            binomial_lookup: self.binomial_lookup,
            dead_analysis_max_lines: self.dead_analysis_max_lines,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
enum CliError {
    #[display("cannot read request: {_0}")]
    Read(io::Error),
    #[display("cannot write response: {_0}")]
    #[from(ignore)]
    Write(io::Error),
    #[display("cannot encode response: {_0}")]
    Encode(serde_json::Error),
}

fn main() -> ExitCode {
    better_panic::install();
    let args = Args::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if args.verbose {
        logger.filter_level(log::LevelFilter::Info);
    }
    logger.init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
    }
}

fn run(args: &Args) -> Result<bool, CliError> {
    let input = read_input(args.input.as_deref())?;
    let solver = Solver::new(args.config());
    let response = respond(&solver, &input, args.verbose);

    let json = if args.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{json}").map_err(CliError::Write)?;
    Ok(response.valid)
}

fn read_input(path: Option<&std::path::Path>) -> Result<String, CliError> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            log::debug!("reading request from {}", path.display());
            Ok(fs::read_to_string(path)?)
        }
        _ => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

/// Decodes and solves one request. Never fails: every problem becomes a
/// `valid: false` response.
fn respond(solver: &Solver, input: &str, verbose: bool) -> SolveResponse {
    let mut request: SolveRequest = match serde_json::from_str(input) {
        Ok(request) => request,
        Err(e) => {
            log::debug!("request rejected: {e}");
            return SolveResponse::invalid_input(e);
        }
    };
    request.options.verbose |= verbose;
    solver.solve_request(&request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_solver_config() {
        let args = Args::parse_from(["mineprobe"]);
        assert_eq!(args.config(), SolverConfig::default());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "mineprobe",
            "--tie-break",
            "false",
            "--brute-force-max-nodes",
            "10",
            "request.json",
        ]);
        let config = args.config();
        assert!(!config.tie_break);
        assert_eq!(config.brute_force_max_nodes, 10);
        assert_eq!(args.input, Some(PathBuf::from("request.json")));
    }

    #[test]
    fn test_respond_solves_request() {
        let solver = Solver::default();
        let response = respond(
            &solver,
            r#"{ "board": { "width": 2, "height": 1, "mines": 1 }, "tiles": [{ "x": 0, "y": 0, "value": 1 }] }"#,
            false,
        );
        assert!(response.valid);
        assert_eq!(response.tiles.len(), 1);
        assert!(response.tiles[0].mine);
    }

    #[test]
    fn test_respond_reports_malformed_json() {
        let solver = Solver::default();
        let response = respond(&solver, r#"{ "tiles": [] }"#, false);
        assert!(!response.valid);
        let message = response.message.unwrap();
        assert!(message.starts_with("InputValidationError: missing field `board`"), "{message}");
    }

    #[test]
    fn test_respond_reports_inconsistent_position() {
        let solver = Solver::default();
        let response = respond(
            &solver,
            r#"{ "board": { "width": 2, "height": 1, "mines": 0 }, "tiles": [{ "x": 0, "y": 0, "value": 1 }] }"#,
            false,
        );
        assert!(!response.valid);
        assert!(response.message.unwrap().starts_with("LogicalInconsistency: "));
    }
}
