mod display;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use endorshim_core::actions::pull_request_number;
use endorshim_core::export::{
    scan_routes, write_output_file, ArtifactExporter, DirectoryArtifactStore, ExportOutcome,
};
use endorshim_core::inputs::{EnvInputs, LayeredInputs, MapInputs};
use endorshim_core::metadata::http_client;
use endorshim_core::options::setup::{render_setup_config, write_setup_config};
use endorshim_core::options::{check_prerequisites, Diagnostic};
use endorshim_core::provision::download::HttpDownloader;
use endorshim_core::{
    assemble, redact, runner, toolchain, ActionInputs, ActionsRuntime, AssemblyContext,
    BinaryProvisioner, ExecutionEnv, InstalledBinary, MetadataClient, SetupSpec,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "endorshim",
    version,
    about = "Install a verified endorctl and run it with options assembled from CI inputs",
    long_about = "Resolves the endorctl build for this runner, checks its SHA-256 against the \
    published checksum, puts it on the PATH and runs the requested operation.\n\n\
    Inputs are read from INPUT_<KEY> variables, or from a TOML file passed with --inputs."
)]
struct Cli {
    /// TOML file of action inputs; its values win over INPUT_* variables
    #[arg(long, global = true)]
    inputs: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the repository for vulnerable dependencies, secrets and tools
    Scan,
    /// Sign an artifact
    Sign,
    /// Verify an artifact signature
    Verify,
    /// Persist endorctl credentials and check that they work
    Setup,
}

impl From<Commands> for endorshim_core::Subcommand {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Scan => endorshim_core::Subcommand::Scan,
            Commands::Sign => endorshim_core::Subcommand::Sign,
            Commands::Verify => endorshim_core::Subcommand::Verify,
            Commands::Setup => endorshim_core::Subcommand::Setup,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(std::env::var("GITHUB_ACTIONS").as_deref() == Ok("true"));

    match cmd_run(cli.command.into(), cli.inputs.as_deref()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_inputs(file: Option<&Path>) -> Result<ActionInputs> {
    let mut sources = LayeredInputs::new();
    if let Some(path) = file {
        sources = sources.push(MapInputs::load(path)?);
    }
    sources = sources.push(EnvInputs);
    Ok(ActionInputs::load(&sources)?)
}

async fn provision(
    inputs: &ActionInputs,
    env: &ExecutionEnv,
    runtime: &ActionsRuntime,
) -> Result<InstalledBinary> {
    let client = http_client().context("Failed to build HTTP client")?;
    let provisioner = BinaryProvisioner::new(
        MetadataClient::new(client.clone()),
        HttpDownloader::new(client, &env.temp_dir),
        runtime.clone(),
    );
    let spec = SetupSpec {
        version: inputs.endorctl_version.clone(),
        checksum: inputs.endorctl_checksum.clone(),
        api_base: inputs.api.clone(),
    };
    Ok(provisioner.provision(&spec, env).await?)
}

async fn cmd_run(subcommand: endorshim_core::Subcommand, inputs_file: Option<&Path>) -> Result<()> {
    let env = ExecutionEnv::from_process().context("Failed to read the job environment")?;
    let inputs = load_inputs(inputs_file)?;
    let runtime = ActionsRuntime::from_env(&env);
    let secrets = inputs.secrets();
    for secret in &secrets {
        runtime.mask(secret);
    }

    // error chains can quote server responses and argv
    execute(subcommand, &inputs, &env, &runtime, &secrets)
        .await
        .map_err(|e| anyhow::anyhow!(redact::redact_text(&format!("{e:#}"), &secrets)))
}

async fn execute(
    subcommand: endorshim_core::Subcommand,
    inputs: &ActionInputs,
    env: &ExecutionEnv,
    runtime: &ActionsRuntime,
    secrets: &[&str],
) -> Result<()> {
    use endorshim_core::Subcommand as Op;

    let platform = env.platform()?;
    tracing::info!("Endor Namespace: {}", inputs.namespace);
    let auth = check_prerequisites(inputs)?;

    let installed = provision(inputs, env, runtime).await?;

    let mut diagnostics: Vec<Diagnostic> = toolchain::ensure_tsserver();

    let pull_request = env.event_path.as_deref().and_then(pull_request_number);
    let assembly = assemble(
        subcommand,
        inputs,
        &AssemblyContext::new(platform, pull_request),
    )?;
    diagnostics.extend(assembly.diagnostics.iter().cloned());

    if subcommand == Op::Setup {
        let config = render_setup_config(inputs, &auth).context("Endorctl setup failed")?;
        let path = write_setup_config(env.home.as_deref(), &config)
            .context("Endorctl setup failed")?;
        tracing::info!("Wrote endorctl configuration to {}", path.display());
    }
    if subcommand == Op::Scan {
        if let Some(repository) = &env.repository {
            tracing::info!("Scanning repository {repository}");
        }
    }

    let mut invocation = vec![assembly.program.clone()];
    invocation.extend(redact::redact_args(&assembly.args, secrets));
    tracing::info!("Running {}", invocation.join(" "));

    let install_dir = installed.dir.clone();
    let program = assembly.program.clone();
    let args = assembly.args.clone();
    let run = tokio::task::spawn_blocking(move || {
        runner::run_captured(&program, &args, Some(install_dir.as_path()))
    })
    .await
    .context("endorctl runner panicked")??;

    let mut export = None;
    if run.success() {
        tracing::info!("Endorctl {subcommand} completed successfully!");
        if subcommand == Op::Scan {
            export = route_scan_output(inputs, env, runtime, &run.stdout, &mut diagnostics);
        }
    }

    if !env.in_actions {
        display::print_run_summary(&display::RunSummary {
            subcommand,
            installed: &installed,
            invocation: &invocation,
            diagnostics: &diagnostics,
            export: export.as_ref(),
            succeeded: run.success(),
        });
    }

    if !run.success() {
        anyhow::bail!("Endorctl {subcommand} failed");
    }
    Ok(())
}

/// Send scan output where the inputs ask for it. Problems are recorded only.
fn route_scan_output(
    inputs: &ActionInputs,
    env: &ExecutionEnv,
    runtime: &ActionsRuntime,
    stdout: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<ExportOutcome> {
    let routes = scan_routes(inputs, stdout);
    if let Some(path) = &routes.output_file {
        diagnostics.extend(write_output_file(path, stdout));
    }

    if stdout.trim().is_empty() {
        tracing::info!("No vulnerabilities found for given filters.");
    }
    if !routes.artifact {
        return None;
    }

    let exporter = ArtifactExporter::new(
        DirectoryArtifactStore::new(&env.artifact_dir),
        &env.temp_dir,
        env.run_id.clone(),
        runtime.clone(),
    );
    let outcome = exporter.export(stdout, &mut rand::thread_rng());
    if let ExportOutcome::Skipped(diagnostic) = &outcome {
        diagnostics.push(diagnostic.clone());
    }
    Some(outcome)
}
