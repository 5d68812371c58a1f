// crates/mm_cli/src/args.rs
//
// Offline CLI argument surface.
//
// - Local paths only (reject any scheme:// like http/https/file)
// - Exactly one vote source: --results XOR --candidates
// - One or more --boundaries PATH[:PROPERTY]
// - Flags override the params file, which overrides built-in defaults

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args as ClapArgs, Parser, Subcommand};
use mm_core::variables::{AmbiguityPolicy, MatchStrategy, Variant};
use mm_core::Params;
use mm_pipeline::{BoundarySource, InputPaths, VoteSource};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "mm",
    disable_help_subcommand = true,
    about = "Merge constituencies and allocate seats by D'Hondt"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Only log warnings and errors.
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the full pipeline and write data.json plus geometries/.
    Run(RunArgs),
    /// Load, aggregate and check consistency; write nothing.
    Validate(InputArgs),
}

#[derive(Debug, ClapArgs, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Output directory.
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Debug, ClapArgs, Clone)]
pub struct InputArgs {
    /// Constituency table CSV: name, electorate, seats[, topupSeats], legacy...
    #[arg(long)]
    pub constituencies: PathBuf,

    /// Flat results CSV (mutually exclusive with --candidates).
    #[arg(long, conflicts_with = "candidates", required_unless_present = "candidates")]
    pub results: Option<PathBuf>,

    /// Per-unit candidates JSON (mutually exclusive with --results).
    #[arg(long)]
    pub candidates: Option<PathBuf>,

    /// Boundary GeoJSON, optionally with its id property (PATH[:PROPERTY]). Repeatable.
    #[arg(long = "boundaries", value_parser = parse_boundary, required = true)]
    pub boundaries: Vec<BoundarySource>,

    /// Params JSON; any field may be omitted.
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// plain | top-up
    #[arg(long)]
    pub variant: Option<Variant>,

    /// exact | token-set
    #[arg(long)]
    pub matcher: Option<MatchStrategy>,

    /// reject | first-match
    #[arg(long)]
    pub ambiguity: Option<AmbiguityPolicy>,

    /// National top-up seat total (top-up variant).
    #[arg(long)]
    pub topup_seats: Option<u32>,

    /// The results CSV starts with a header row.
    #[arg(long)]
    pub results_header: bool,
}

/// Errors surfaced by argument validation.
/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            CliError::NotFound(p) => write!(f, "file not found: {p}"),
        }
    }
}

impl std::error::Error for CliError {}

/// `PATH` or `PATH:PROPERTY`. A suffix that looks like part of a path stays in the path.
pub fn parse_boundary(s: &str) -> Result<BoundarySource, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty boundary path".into());
    }
    if let Some((path, prop)) = s.rsplit_once(':') {
        let looks_like_property =
            !path.is_empty() && !prop.is_empty() && !prop.contains(['/', '\\', '.']);
        if looks_like_property {
            return Ok(BoundarySource {
                path: PathBuf::from(path),
                id_property: Some(prop.to_string()),
            });
        }
    }
    Ok(BoundarySource {
        path: PathBuf::from(s),
        id_property: None,
    })
}

/// Reject any explicit URI scheme (e.g., http://, https://, file://).
#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    match p.to_str() {
        Some(s) if has_scheme(s) => Err(CliError::NonLocalPath(s.to_string())),
        _ => Ok(()),
    }
}

/// Ensure a path is local (no scheme) and exists as a regular file.
fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    ensure_local_path(p)?;
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}

/// Best-effort normalization to an absolute path.
fn normalize_path(p: &Path) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(p)
        }
    })
}

impl InputArgs {
    /// Check every input file and resolve to absolute input paths.
    pub fn input_paths(&self) -> Result<InputPaths, CliError> {
        ensure_local_exists(&self.constituencies, "--constituencies")?;
        let votes = match (&self.results, &self.candidates) {
            (Some(p), _) => {
                ensure_local_exists(p, "--results")?;
                VoteSource::ResultsCsv(normalize_path(p))
            }
            (None, Some(p)) => {
                ensure_local_exists(p, "--candidates")?;
                VoteSource::CandidatesJson(normalize_path(p))
            }
            // clap enforces one of the two
            (None, None) => return Err(CliError::NotFound("--results or --candidates".into())),
        };

        let mut boundaries = Vec::with_capacity(self.boundaries.len());
        for b in &self.boundaries {
            ensure_local_exists(&b.path, "--boundaries")?;
            boundaries.push(BoundarySource {
                path: normalize_path(&b.path),
                id_property: b.id_property.clone(),
            });
        }
        if let Some(p) = &self.params {
            ensure_local_exists(p, "--params")?;
        }

        Ok(InputPaths {
            constituencies: normalize_path(&self.constituencies),
            votes,
            boundaries,
        })
    }

    /// Layer flag overrides onto `base`.
    pub fn apply_overrides(&self, mut base: Params) -> Params {
        if let Some(v) = self.variant {
            base.variant = v;
        }
        if let Some(m) = self.matcher {
            base.matcher = m;
        }
        if let Some(a) = self.ambiguity {
            base.ambiguity = a;
        }
        if let Some(n) = self.topup_seats {
            base.national_topup_seats = n;
        }
        if self.results_header {
            base.results_has_header = true;
        }
        base
    }
}

/// Output directory: scheme check and normalization only (it may not exist yet).
pub fn check_out_dir(out: &Path) -> Result<PathBuf, CliError> {
    ensure_local_path(out)?;
    Ok(normalize_path(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("mm").chain(argv.iter().copied()))
    }

    #[test]
    fn boundary_flag_splits_property() {
        let b = parse_boundary("data/gb.geojson:CODE").unwrap();
        assert_eq!(b.path, PathBuf::from("data/gb.geojson"));
        assert_eq!(b.id_property.as_deref(), Some("CODE"));

        let b = parse_boundary("data/ni.geojson").unwrap();
        assert_eq!(b.id_property, None);

        let b = parse_boundary(r"C:\data\gb.geojson").unwrap();
        assert_eq!(b.path, PathBuf::from(r"C:\data\gb.geojson"));
        assert_eq!(b.id_property, None);

        assert!(parse_boundary("  ").is_err());
    }

    #[test]
    fn run_parses_with_overrides() {
        let cli = parse(&[
            "run",
            "--constituencies", "c.csv",
            "--results", "r.csv",
            "--boundaries", "gb.geojson:CODE",
            "--boundaries", "ni.geojson:PC_ID",
            "--out", "out",
            "--variant", "top-up",
            "--matcher", "token-set",
            "--topup-seats", "12",
        ])
        .unwrap();
        let Command::Run(run) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(run.inputs.boundaries.len(), 2);
        let p = run.inputs.apply_overrides(Params::default());
        assert_eq!(p.variant, Variant::TopUp);
        assert_eq!(p.matcher, MatchStrategy::TokenSet);
        assert_eq!(p.national_topup_seats, 12);
        assert_eq!(p.ambiguity, AmbiguityPolicy::Reject);
    }

    #[test]
    fn vote_sources_are_exclusive_and_required() {
        let base = ["validate", "--constituencies", "c.csv", "--boundaries", "b.geojson"];
        assert!(parse(&base).is_err());

        let mut both = base.to_vec();
        both.extend(["--results", "r.csv", "--candidates", "c.json"]);
        assert!(parse(&both).is_err());

        let mut one = base.to_vec();
        one.extend(["--candidates", "c.json"]);
        assert!(parse(&one).is_ok());
    }

    #[test]
    fn unknown_variant_is_rejected() {
        let argv = [
            "validate", "--constituencies", "c.csv", "--results", "r.csv", "--boundaries", "b", "--variant", "stv",
        ];
        assert!(parse(&argv).is_err());
    }

    #[test]
    fn ensure_local_path_rejects_schemes() {
        assert!(ensure_local_path(Path::new("http://x")).is_err());
        assert!(ensure_local_path(Path::new("file://C:/x.csv")).is_err());
        assert!(ensure_local_path(Path::new("/tmp/file.csv")).is_ok());
    }

    #[test]
    fn normalize_path_returns_absolute() {
        assert!(normalize_path(Path::new("does/not/exist.csv")).is_absolute());
    }
}
