// crates/provenance-gate-cli/src/main.rs
// ============================================================================
// Module: Provenance Gate CLI Entry Point
// Description: Command dispatcher for attestation and evidence workflows.
// Purpose: Provide a thin CLI over the Provenance Gate core services.
// Dependencies: clap, provenance-gate-core, thiserror
// ============================================================================

//! ## Overview
//! The Provenance Gate CLI drives directory attestation and verification,
//! receipt inspection, reproducibility checks, evidence manifest
//! evaluation, and consolidated report generation. The signing key is read
//! from `PROVENANCE_GATE_SIGNING_KEY`; when absent the CLI runs in
//! digest-only mode rather than failing. Exit code 0 means every check
//! passed; 1 means at least one verification error occurred. Warnings are
//! printed but never change the exit code.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use provenance_gate_core::AttestationStore;
use provenance_gate_core::BlueprintId;
use provenance_gate_core::EnvKeyProvider;
use provenance_gate_core::EvidenceEvaluator;
use provenance_gate_core::GitRevisionSource;
use provenance_gate_core::ReceiptLedger;
use provenance_gate_core::ReportBuilder;
use provenance_gate_core::RevisionId;
use provenance_gate_core::RevisionSource;
use provenance_gate_core::SigningService;
use provenance_gate_core::SystemCommandExecutor;
use provenance_gate_core::TrustContext;
use provenance_gate_core::parse_manifest;
use thiserror::Error;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default attestation output root.
const DEFAULT_OUTPUT_ROOT: &str = ".provenance";
/// Default receipt ledger directory.
const DEFAULT_LEDGER_DIR: &str = ".provenance/receipts";
/// Extensions attested when none are given.
const DEFAULT_EXTENSIONS: &[&str] = &["md"];

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "provenance-gate", version, about = "Artifact provenance attestation and evidence verification")]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Attests every matching file under a directory.
    Attest {
        /// Directory to attest.
        dir: PathBuf,
        /// Attestation output root.
        #[arg(long, default_value = DEFAULT_OUTPUT_ROOT)]
        out: PathBuf,
        /// File extensions to include (repeatable).
        #[arg(long = "ext", value_name = "EXT")]
        extensions: Vec<String>,
    },
    /// Verifies every matching file under a directory.
    Verify {
        /// Directory to verify.
        dir: PathBuf,
        /// Attestation output root.
        #[arg(long, default_value = DEFAULT_OUTPUT_ROOT)]
        out: PathBuf,
        /// File extensions to include (repeatable).
        #[arg(long = "ext", value_name = "EXT")]
        extensions: Vec<String>,
    },
    /// Lists generation receipts.
    Receipts {
        /// Receipt ledger directory.
        #[arg(long, default_value = DEFAULT_LEDGER_DIR)]
        dir: PathBuf,
        /// Filter by blueprint identifier.
        #[arg(long)]
        blueprint: Option<String>,
    },
    /// Checks bit-exact reproducibility for a blueprint.
    CheckRepro {
        /// Blueprint path recorded in the receipts.
        blueprint_path: String,
        /// Receipt ledger directory.
        #[arg(long, default_value = DEFAULT_LEDGER_DIR)]
        dir: PathBuf,
    },
    /// Evaluates an evidence manifest.
    Evaluate {
        /// Path of the JSON evidence manifest.
        manifest: PathBuf,
    },
    /// Generates a consolidated provenance report.
    Report {
        /// Report output file; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Directory whose attestations the report re-verifies.
        #[arg(long)]
        verify_dir: Option<PathBuf>,
        /// Attestation output root for the verify sweep.
        #[arg(long, default_value = DEFAULT_OUTPUT_ROOT)]
        store: PathBuf,
        /// File extensions for the verify sweep (repeatable).
        #[arg(long = "ext", value_name = "EXT")]
        extensions: Vec<String>,
    },
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI-level errors that abort the whole command.
#[derive(Debug, Error)]
enum CliError {
    /// Input file could not be read.
    #[error("failed to read {path}: {detail}")]
    Read {
        /// Path that failed to read.
        path: String,
        /// Underlying error detail.
        detail: String,
    },
    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Write(String),
    /// A core operation failed structurally.
    #[error("{0}")]
    Core(String),
}

/// Result alias for CLI operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Attest {
            dir,
            out,
            extensions,
        } => run_attest(&dir, &out, &extensions),
        Commands::Verify {
            dir,
            out,
            extensions,
        } => run_verify(&dir, &out, &extensions),
        Commands::Receipts {
            dir,
            blueprint,
        } => run_receipts(&dir, blueprint.as_deref()),
        Commands::CheckRepro {
            blueprint_path,
            dir,
        } => run_check_repro(&blueprint_path, &dir),
        Commands::Evaluate {
            manifest,
        } => run_evaluate(&manifest),
        Commands::Report {
            out,
            verify_dir,
            store,
            extensions,
        } => run_report(out.as_deref(), verify_dir.as_deref(), &store, &extensions),
    }
}

// ============================================================================
// SECTION: Command Handlers
// ============================================================================

/// Runs the `attest` subcommand.
fn run_attest(dir: &std::path::Path, out: &std::path::Path, extensions: &[String]) -> CliResult<ExitCode> {
    let signer = build_signer();
    if !signer.has_key() {
        write_stderr_line("warning: no signing key configured; attesting in digest-only mode")?;
    }
    let store = AttestationStore::new(out, resolve_revision(), signer);
    let extensions = effective_extensions(extensions);
    let refs: Vec<&str> = extensions.iter().map(String::as_str).collect();
    let sweep = store.attest_directory(dir, &refs).map_err(|err| CliError::Core(err.to_string()))?;

    for (file, signature) in &sweep.signatures {
        let label = signature.as_ref().map_or("digest-only", |_| "signed");
        write_stdout_line(&format!("attested {file} ({label})"))?;
    }
    for failure in &sweep.failures {
        write_stderr_line(&format!("error: {}: {}", failure.file, failure.reason))?;
    }
    Ok(exit_for(sweep.failures.is_empty()))
}

/// Runs the `verify` subcommand.
fn run_verify(dir: &std::path::Path, out: &std::path::Path, extensions: &[String]) -> CliResult<ExitCode> {
    let store = AttestationStore::new(out, resolve_revision(), build_signer());
    let extensions = effective_extensions(extensions);
    let refs: Vec<&str> = extensions.iter().map(String::as_str).collect();
    let sweep = store.verify_directory(dir, &refs).map_err(|err| CliError::Core(err.to_string()))?;

    for file in &sweep.passed {
        write_stdout_line(&format!("ok {file}"))?;
    }
    for failure in &sweep.failures {
        write_stderr_line(&format!("error: {}: {}", failure.file, failure.reason))?;
    }
    for warning in &sweep.warnings {
        write_stderr_line(&format!("warning: {warning}"))?;
    }
    Ok(exit_for(sweep.all_passed()))
}

/// Runs the `receipts` subcommand.
fn run_receipts(dir: &std::path::Path, blueprint: Option<&str>) -> CliResult<ExitCode> {
    let ledger = ReceiptLedger::new(dir, build_signer());
    let filter = blueprint.map(BlueprintId::new);
    let receipts = ledger.list(filter.as_ref()).map_err(|err| CliError::Core(err.to_string()))?;

    for receipt in &receipts {
        let output = receipt.output_digest.as_ref().map_or("pending", |digest| digest.as_str());
        write_stdout_line(&format!(
            "{} blueprint={} reproduced={} output={output}",
            receipt.key(),
            receipt.blueprint.id,
            receipt.reproduced,
        ))?;
    }
    write_stdout_line(&format!("{} receipt(s)", receipts.len()))?;
    Ok(ExitCode::SUCCESS)
}

/// Runs the `check-repro` subcommand.
fn run_check_repro(blueprint_path: &str, dir: &std::path::Path) -> CliResult<ExitCode> {
    let ledger = ReceiptLedger::new(dir, build_signer());
    let outcome = ledger
        .check_reproducibility(blueprint_path)
        .map_err(|err| CliError::Core(err.to_string()))?;
    write_stdout_line(&format!(
        "reproduced={} ({})",
        outcome.reproduced, outcome.detail
    ))?;
    Ok(exit_for(outcome.reproduced))
}

/// Runs the `evaluate` subcommand.
fn run_evaluate(manifest_path: &std::path::Path) -> CliResult<ExitCode> {
    let bytes = fs::read(manifest_path).map_err(|err| CliError::Read {
        path: manifest_path.display().to_string(),
        detail: err.to_string(),
    })?;
    let manifest = parse_manifest(&bytes).map_err(|err| CliError::Core(err.to_string()))?;

    let trust = TrustContext::new(build_signer().has_key());
    let result = EvidenceEvaluator::new(SystemCommandExecutor::new()).evaluate(&manifest, &trust);

    for error in &result.errors {
        write_stderr_line(&format!("error: {error}"))?;
    }
    for warning in &result.warnings {
        write_stderr_line(&format!("warning: {warning}"))?;
    }
    write_stdout_line(&format!(
        "evaluation {}: {} error(s), {} warning(s)",
        if result.passed() { "passed" } else { "failed" },
        result.errors.len(),
        result.warnings.len(),
    ))?;
    Ok(exit_for(result.passed()))
}

/// Runs the `report` subcommand.
fn run_report(
    out: Option<&std::path::Path>,
    verify_dir: Option<&std::path::Path>,
    store_root: &std::path::Path,
    extensions: &[String],
) -> CliResult<ExitCode> {
    let signer = build_signer();
    let revision = resolve_revision();
    let mut builder = ReportBuilder::new(SystemCommandExecutor::new(), signer.algorithm())
        .with_command("git_status", "git status --porcelain")
        .with_command("git_head", "git log -1 --format=%H");

    if let Some(dir) = verify_dir {
        let extensions = effective_extensions(extensions);
        let refs: Vec<&str> = extensions.iter().map(String::as_str).collect();
        let store = AttestationStore::new(store_root, revision.clone(), signer);
        builder = builder.with_verify_sweep(store, dir, &refs);
    }

    let report = builder.generate(revision);
    let json = report.to_json_pretty().map_err(|err| CliError::Core(err.to_string()))?;
    match out {
        Some(path) => {
            fs::write(path, json.as_bytes()).map_err(|err| CliError::Write(err.to_string()))?;
            write_stdout_line(&format!("report written to {}", path.display()))?;
        }
        None => write_stdout_line(&json)?,
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the signing service from the environment key provider.
fn build_signer() -> SigningService {
    SigningService::from_provider(&EnvKeyProvider::new())
}

/// Resolves the current revision, falling back to `local`.
fn resolve_revision() -> RevisionId {
    GitRevisionSource::new(SystemCommandExecutor::new()).revision()
}

/// Applies the default extension list when none was given.
fn effective_extensions(extensions: &[String]) -> Vec<String> {
    if extensions.is_empty() {
        DEFAULT_EXTENSIONS.iter().map(|ext| (*ext).to_string()).collect()
    } else {
        extensions.to_vec()
    }
}

/// Maps an overall pass decision to a process exit code.
fn exit_for(passed: bool) -> ExitCode {
    if passed { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|err| CliError::Write(err.to_string()))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> CliResult<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}").map_err(|err| CliError::Write(err.to_string()))
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "error: {message}");
    ExitCode::FAILURE
}
