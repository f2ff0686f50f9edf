//! Solver configuration and per-request options.
//!
//! [`SolverConfig`] is built once per process and owned by the
//! [`Solver`](crate::Solver). Each request carries its own [`SolveOptions`],
//! which are resolved against the configuration into [`EffectiveOptions`]
//! before any work starts.

use log::Level;

/// Process-wide solver limits and master switches.
///
/// # Examples
///
/// ```
/// use mineprobe_solver::{SolveOptions, SolverConfig};
///
/// let config = SolverConfig {
///     tie_break: false,
///     ..SolverConfig::default()
/// };
/// let options = SolveOptions {
///     brute_force_threshold: 1_000_000,
///     ..SolveOptions::default()
/// };
///
/// let effective = config.resolve(&options);
/// assert!(!effective.tie_break);
/// assert_eq!(effective.brute_force_threshold, config.max_brute_force_threshold);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Master switch for tie-break scoring.
    pub tie_break: bool,
    /// Master switch for dead tile analysis.
    pub dead_tile_analysis: bool,
    /// Master switch for unavoidable-guess detection.
    pub fifty_fifty_check: bool,
    /// Upper clamp for a request's brute force threshold.
    pub max_brute_force_threshold: usize,
    /// Largest enumeration cycle count that will be attempted.
    pub brute_force_max_cycles: u64,
    /// Node visits allowed during decision-tree search.
    pub brute_force_max_nodes: usize,
    /// Decision-tree levels memoized during search and shown by the
    /// strategy dump. Deeper sub-trees are recomputed instead of cached.
    pub brute_force_tree_depth: usize,
    /// Tiles at least this fraction of the best safety enter tie-break.
    pub tie_break_fraction: f64,
    /// Most candidates scored by tie-break.
    pub tie_break_max_candidates: usize,
    /// Largest `n` accepted by the binomial calculator.
    pub binomial_max: usize,
    /// Largest `n` served from the precomputed binomial table.
    pub binomial_lookup: usize,
    /// Working line count above which dead tile analysis is abandoned.
    pub dead_analysis_max_lines: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tie_break: true,
            dead_tile_analysis: true,
            fifty_fifty_check: true,
            max_brute_force_threshold: 2000,
            brute_force_max_cycles: 1_000_000,
            brute_force_max_nodes: 150_000,
            brute_force_tree_depth: 4,
            tie_break_fraction: 0.9,
            tie_break_max_candidates: 20,
            binomial_max: 50_000,
            binomial_lookup: 500,
            dead_analysis_max_lines: 10_000,
        }
    }
}

impl SolverConfig {
    /// Resolves request options against this configuration.
    ///
    /// Feature flags are AND-ed with the master switches and the brute force
    /// threshold is clamped to `0..=max_brute_force_threshold`.
    #[must_use]
    pub fn resolve(&self, options: &SolveOptions) -> EffectiveOptions {
        let threshold = usize::try_from(options.brute_force_threshold.max(0)).unwrap_or(usize::MAX);
        EffectiveOptions {
            tie_break: self.tie_break && options.allow_tie_break,
            dead_tile_analysis: self.dead_tile_analysis && options.allow_dead_tile_analysis,
            fifty_fifty_check: self.fifty_fifty_check && options.allow_5050_check,
            brute_force_threshold: threshold.min(self.max_brute_force_threshold),
            verbose: options.verbose,
        }
    }
}

/// Options supplied with a single request.
///
/// Every field is optional on the wire; missing fields take the
/// [`Default`] value.
///
/// ```
/// use mineprobe_solver::SolveOptions;
///
/// let options: SolveOptions =
///     serde_json::from_str(r#"{ "allow5050Check": false, "bruteForceThreshold": 50 }"#)?;
/// assert!(!options.allow_5050_check);
/// assert!(options.allow_tie_break);
/// assert_eq!(options.brute_force_threshold, 50);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[expect(clippy::struct_excessive_bools)]
pub struct SolveOptions {
    /// Allow tie-break scoring of near-equal candidates.
    pub allow_tie_break: bool,
    /// Allow dead tile analysis.
    pub allow_dead_tile_analysis: bool,
    /// Allow unavoidable-guess detection.
    #[serde(rename = "allow5050Check")]
    pub allow_5050_check: bool,
    /// Largest solution count handed to the exhaustive search.
    pub brute_force_threshold: i64,
    /// Log diagnostics at info level instead of debug.
    pub verbose: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            allow_tie_break: true,
            allow_dead_tile_analysis: true,
            allow_5050_check: true,
            brute_force_threshold: 200,
            verbose: false,
        }
    }
}

/// Request options after resolution against a [`SolverConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(clippy::struct_excessive_bools)]
pub struct EffectiveOptions {
    /// Tie-break scoring is enabled.
    pub tie_break: bool,
    /// Dead tile analysis is enabled.
    pub dead_tile_analysis: bool,
    /// Unavoidable-guess detection is enabled.
    pub fifty_fifty_check: bool,
    /// Largest solution count handed to the exhaustive search.
    pub brute_force_threshold: usize,
    /// Diagnostics are logged at info level.
    pub verbose: bool,
}

impl Default for EffectiveOptions {
    fn default() -> Self {
        SolverConfig::default().resolve(&SolveOptions::default())
    }
}

impl EffectiveOptions {
    /// Log level used for per-query diagnostics.
    #[must_use]
    pub fn diagnostic_level(&self) -> Level {
        if self.verbose { Level::Info } else { Level::Debug }
    }

    /// Options for speculative sub-queries: the same flags, without the
    /// expensive phases and without verbose output.
    #[must_use]
    pub(crate) fn for_speculation(&self) -> Self {
        Self {
            tie_break: false,
            fifty_fifty_check: false,
            brute_force_threshold: 0,
            verbose: false,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_masks_and_clamps() {
        let config = SolverConfig {
            dead_tile_analysis: false,
            max_brute_force_threshold: 500,
            ..SolverConfig::default()
        };
        let options = SolveOptions {
            allow_tie_break: false,
            brute_force_threshold: -3,
            ..SolveOptions::default()
        };
        let effective = config.resolve(&options);
        assert!(!effective.tie_break);
        assert!(!effective.dead_tile_analysis);
        assert!(effective.fifty_fifty_check);
        assert_eq!(effective.brute_force_threshold, 0);

        let effective = config.resolve(&SolveOptions::default());
        assert_eq!(effective.brute_force_threshold, 200);
        let big = SolveOptions {
            brute_force_threshold: 10_000,
            ..SolveOptions::default()
        };
        assert_eq!(config.resolve(&big).brute_force_threshold, 500);
    }

    #[test]
    fn test_options_wire_names() {
        let json = serde_json::to_value(SolveOptions::default()).unwrap();
        assert_eq!(json["allow5050Check"], true);
        assert_eq!(json["allowDeadTileAnalysis"], true);
        assert_eq!(json["bruteForceThreshold"], 200);

        let options: SolveOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, SolveOptions::default());
    }

    #[test]
    fn test_diagnostic_level() {
        let mut options = EffectiveOptions::default();
        assert_eq!(options.diagnostic_level(), Level::Debug);
        options.verbose = true;
        assert_eq!(options.diagnostic_level(), Level::Info);
        assert!(!options.for_speculation().verbose);
    }
}
