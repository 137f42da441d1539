mod config;
mod explain;

use anyhow::Context;
use bundleplan_core::adapters::PackageJsonSource;
use bundleplan_core::ports::DependencySource;
use bundleplan_core::{BuildOrchestrator, BuildSettings, FsFileProbe, Resolution};
use bundleplan_domain::is_deduped;
use bundleplan_render::{render_plan_md, render_plan_text};
use bundleplan_types::BuildError;
use bundleplan_types::diagnostic::DiagnosticRecord;
use bundleplan_types::env::EnvironmentContext;
use bundleplan_types::plan::BuildPlan;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use config::ConfigMerger;
use fs_err as fs;
use std::io::{BufRead, Write};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "bundleplan",
    version,
    about = "Deterministic stage planner for client, server and service-worker bundles."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan the stage pipeline of every target.
    Plan(PlanArgs),
    /// Resolve an aliased import specifier against the project tree.
    Resolve(ResolveArgs),
    /// Read diagnostics as JSON lines on stdin and print the ones that survive filtering.
    FilterDiagnostics(FilterArgs),
    /// Explain what a stage does and when it is scheduled.
    Explain(ExplainArgs),
    /// List all stages in scheduling order.
    ListStages(ListStagesArgs),
}

#[derive(Debug, Parser)]
struct PlanArgs {
    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Build mode: development or production.
    #[arg(long, env = "NODE_ENV")]
    mode: Option<String>,

    /// Add the legacy-downleveling stage to the client build.
    #[arg(
        long,
        env = "BUNDLEPLAN_LEGACY_BUILD",
        value_parser = clap::builder::FalseyValueParser::new(),
        default_value_t = false
    )]
    legacy: bool,

    /// Add the typed-source stage to client and server builds.
    #[arg(long, default_value_t = false)]
    typescript: bool,

    /// Plan only these targets (repeatable). Default: all three.
    #[arg(long = "target")]
    targets: Vec<String>,

    /// Output format.
    #[arg(long, value_enum, default_value = "json")]
    format: PlanFormat,

    /// Write plan.json and plan.md here instead of printing to stdout.
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct ResolveArgs {
    /// Specifier to resolve (e.g., "components/Foo").
    specifier: String,

    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,
}

#[derive(Debug, Parser)]
struct FilterArgs {
    /// Project root (default: current directory).
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Stage key (e.g., "legacy-downlevel", "minification").
    stage: String,
}

#[derive(Debug, Parser)]
struct ListStagesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: ListFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum PlanFormat {
    Json,
    Md,
    Text,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ListFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:?}", e);
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Plan(args) => cmd_plan(args),
        Command::Resolve(args) => cmd_resolve(args),
        Command::FilterDiagnostics(args) => cmd_filter_diagnostics(args),
        Command::Explain(args) => cmd_explain(args),
        Command::ListStages(args) => cmd_list_stages(args),
    }
}

/// Alias targets are rooted here, so it is made absolute once up front.
fn project_root(root: &Utf8Path) -> anyhow::Result<Utf8PathBuf> {
    root.canonicalize_utf8()
        .with_context(|| format!("project root {}", root))
}

fn load_settings(root: &Utf8Path) -> anyhow::Result<(BuildSettings, ConfigMerger)> {
    let file_config = config::load_or_default(root).context("load bundleplan.toml config")?;
    let merger = ConfigMerger::new(file_config);
    let settings = merger.into_settings(root)?;
    Ok((settings, merger))
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let mode = args.mode.as_deref().map(str::trim).unwrap_or_default();
    if mode.is_empty() {
        return Err(BuildError::configuration("build mode is required (pass --mode or set NODE_ENV)").into());
    }

    let root = project_root(&args.root)?;
    let (mut settings, merger) = load_settings(&root)?;
    settings.declared_dependencies = PackageJsonSource::in_root(&root)
        .declared_dependencies()
        .context("read declared dependencies")?;

    let env = EnvironmentContext::from_inputs(mode, args.legacy, true)?
        .with_typescript(merger.typescript(args.typescript));
    debug!(?env, declared = settings.declared_dependencies.len(), "resolved inputs");

    let orchestrator = BuildOrchestrator::new(settings);
    let plan = if args.targets.is_empty() {
        orchestrator.build_all(&env)?
    } else {
        orchestrator.build_selected(&env, &args.targets)?
    };

    match &args.out_dir {
        Some(out_dir) => write_plan(out_dir, &plan)?,
        None => {
            let rendered = match args.format {
                PlanFormat::Json => serde_json::to_string_pretty(&plan).context("serialize plan")? + "\n",
                PlanFormat::Md => render_plan_md(&plan),
                PlanFormat::Text => render_plan_text(&plan),
            };
            print!("{rendered}");
        }
    }
    Ok(())
}

fn write_plan(out_dir: &Utf8Path, plan: &BuildPlan) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir))?;
    let json = serde_json::to_string_pretty(plan).context("serialize json")?;
    fs::write(out_dir.join("plan.json"), json).with_context(|| format!("write {}/plan.json", out_dir))?;
    fs::write(out_dir.join("plan.md"), render_plan_md(plan))
        .with_context(|| format!("write {}/plan.md", out_dir))?;
    info!("wrote plan to {}", out_dir);
    Ok(())
}

fn cmd_resolve(args: ResolveArgs) -> anyhow::Result<()> {
    let root = project_root(&args.root)?;
    let (settings, _) = load_settings(&root)?;
    let dedupe = settings.dedupe.clone();
    let resolver = BuildOrchestrator::new(settings).alias_resolver()?;
    let probe = FsFileProbe::new(root);

    match resolver.resolve(&args.specifier, &probe) {
        Resolution::Resolved(path) => println!("{path}"),
        Resolution::Unresolved => {
            println!("unresolved: {}", args.specifier);
            if let Some(pkg) = dedupe.filter(|pkg| is_deduped(pkg, &args.specifier)) {
                println!("deduped: {pkg}");
            }
        }
    }
    Ok(())
}

fn cmd_filter_diagnostics(args: FilterArgs) -> anyhow::Result<()> {
    let (settings, _) = load_settings(&project_root(&args.root)?)?;
    let filter = BuildOrchestrator::new(settings).diagnostic_filter()?;

    let stdin = std::io::stdin();
    let mut records = Vec::new();
    for (i, line) in stdin.lock().lines().enumerate() {
        let line = line.context("read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let record: DiagnosticRecord = serde_json::from_str(&line)
            .with_context(|| format!("parse diagnostic on line {}", i + 1))?;
        records.push(record);
    }

    let total = records.len();
    let forwarded = filter.forward(records);
    debug!(total, forwarded = forwarded.len(), "filtered diagnostics");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for record in &forwarded {
        writeln!(out, "{}", serde_json::to_string(record)?)?;
    }
    Ok(())
}

fn cmd_explain(args: ExplainArgs) -> anyhow::Result<()> {
    use explain::{list_stage_keys, lookup_stage};

    let Some(stage) = lookup_stage(&args.stage) else {
        let available = list_stage_keys().join(", ");
        anyhow::bail!(
            "Unknown stage: '{}'\n\nAvailable stages: {}",
            args.stage,
            available
        );
    };
    let planner = bundleplan_domain::StagePlanner::new();
    let rule = planner
        .definition(stage.id)
        .map(|d| d.rule())
        .unwrap_or("not scheduled by the built-in planner");

    println!("================================================================================");
    println!("STAGE: {}", stage.title);
    println!("================================================================================");
    println!();
    println!("Key:     {}", stage.id);
    println!("When:    {}", rule);
    println!("Options: {}", stage.options);
    println!();
    println!("DESCRIPTION");
    println!("--------------------------------------------------------------------------------");
    println!("{}", stage.description);
    println!();
    Ok(())
}

fn cmd_list_stages(args: ListStagesArgs) -> anyhow::Result<()> {
    use explain::STAGE_REGISTRY;

    let planner = bundleplan_domain::StagePlanner::new();
    let rule = |id| planner.definition(id).map(|d| d.rule()).unwrap_or("-");

    match args.format {
        ListFormat::Text => {
            println!("Stages in scheduling order:\n");
            println!("  {:<24} WHEN", "KEY");
            println!("  {:<24} ----", "---");
            for stage in STAGE_REGISTRY {
                println!("  {:<24} {}", stage.id, rule(stage.id));
            }
            println!();
            println!("Use 'bundleplan explain <key>' for details.");
        }
        ListFormat::Json => {
            let stages: Vec<_> = STAGE_REGISTRY
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "key": s.id,
                        "title": s.title,
                        "when": rule(s.id),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&stages)?);
        }
    }
    Ok(())
}
