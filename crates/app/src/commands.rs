//! Command implementations.

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use envshield_application::use_cases::{ResolveEnvironment, ResolveEnvironmentOutput};
use envshield_application::variable_resolver::{VariableResolver, validate_variable_names};
use envshield_application::{ApplicationError, ApplicationResult};
use envshield_domain::environment::{
    ResolutionErrorKind, ResolutionResult, VariableMap, validate_variable_name,
};
use envshield_infrastructure::{JsonVariableSource, run_with_variables, to_json_stable};
use tracing::info;

use crate::cli::{OutputFormat, ResolveArgs, RunArgs, SourceArgs};

/// Exit code of `resolve` when a cycle prevented resolution.
const CIRCULAR_EXIT_CODE: u8 = 2;

fn use_case(
    source: &SourceArgs,
    resolver: VariableResolver,
) -> ResolveEnvironment<JsonVariableSource> {
    ResolveEnvironment::new(JsonVariableSource::from_arg(&source.file)).with_resolver(resolver)
}

async fn load_resolved(
    environment: &ResolveEnvironment<JsonVariableSource>,
) -> ApplicationResult<ResolveEnvironmentOutput> {
    Ok(environment.execute().await?)
}

async fn load_raw(
    environment: &ResolveEnvironment<JsonVariableSource>,
) -> ApplicationResult<VariableMap> {
    Ok(environment.load_raw().await?)
}

/// Rejects keys that cannot be exported as environment variable names.
fn ensure_injectable(variables: &VariableMap) -> ApplicationResult<()> {
    for key in variables.keys() {
        validate_variable_name(key)?;
    }
    Ok(())
}

/// Prints errors and warnings to stderr.
fn report_diagnostics(result: &ResolutionResult) {
    if !result.errors.is_empty() {
        eprintln!("Resolution errors:");
        for error in &result.errors {
            eprintln!("  • {error}");
        }
    }

    if !result.warnings.is_empty() {
        eprintln!("Resolution warnings:");
        for warning in &result.warnings {
            eprintln!("  • {warning}");
        }
    }
}

fn circular_variables(result: &ResolutionResult) -> String {
    result
        .errors_of_kind(ResolutionErrorKind::Circular)
        .map(|e| e.variable.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `envshield resolve`
pub async fn resolve(args: &ResolveArgs, resolver: VariableResolver) -> Result<ExitCode> {
    let output = load_resolved(&use_case(&args.source, resolver))
        .await
        .context("Failed to load variables")?;
    let result = output.result;

    let mut stdout = std::io::stdout().lock();
    match args.format {
        OutputFormat::Json => {
            stdout.write_all(to_json_stable(&result)?.as_bytes())?;
        }
        OutputFormat::Text => {
            report_diagnostics(&result);
            if result.is_safe_to_inject() {
                for (key, value) in &result.resolved {
                    writeln!(stdout, "{key}={value}")?;
                }
            }
        }
    }
    stdout.flush()?;

    if result.has_circular() {
        return Ok(ExitCode::from(CIRCULAR_EXIT_CODE));
    }
    Ok(ExitCode::SUCCESS)
}

/// `envshield check`
pub async fn check(args: &SourceArgs, resolver: VariableResolver) -> Result<ExitCode> {
    let output = load_resolved(&use_case(args, resolver))
        .await
        .context("Failed to load variables")?;

    let mut errors = validate_variable_names(&output.raw);
    errors.extend(output.result.errors);

    for error in &errors {
        println!("{} {error}", error.kind);
    }
    // Warning text carries partial values, so only the count is shown.
    println!(
        "{} variable(s), {} error(s), {} warning(s)",
        output.raw.len(),
        errors.len(),
        output.result.warnings.len()
    );

    if errors.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// `envshield run`
pub async fn run(args: &RunArgs, resolver: VariableResolver) -> Result<ExitCode> {
    let environment = use_case(&args.source, resolver);

    let variables = if args.resolve {
        let output = load_resolved(&environment)
            .await
            .context("Failed to load variables")?;
        report_diagnostics(&output.result);

        if !output.result.is_safe_to_inject() {
            return Err(ApplicationError::Circular(circular_variables(&output.result)).into());
        }
        if output.result.has_errors() {
            eprintln!("Continuing with partially resolved variables...");
        }
        output.result.resolved
    } else {
        load_raw(&environment)
            .await
            .context("Failed to load variables")?
    };
    ensure_injectable(&variables)?;

    info!(
        variables = variables.len(),
        resolved = args.resolve,
        "Injecting variables"
    );
    eprintln!("Running with injected variables (not written to disk)");
    eprintln!("Executing: {}", args.command.join(" "));

    let code = run_with_variables(&args.command, &variables).await?;
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}
