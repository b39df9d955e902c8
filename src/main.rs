use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result, WrapErr};

use janus_core::{JanusConfig, OutputFormat};
use janus_ingest::fixtures;
use janus_ingest::service::RepoDataClient;
use janus_ingest::Snapshot;
use janus_knowledge::metrics::ModuleMetric;
use janus_planning::gap::SprintMetrics;
use janus_planning::learn::CorrectionRule;

#[derive(Parser)]
#[command(
    name = "janus",
    version,
    about = "Team analytics: knowledge risk and sprint reality gaps",
    long_about = "Janus looks both ways: at the delivery plan (sprints, tracked issues) and at\n\
                   the engineering reality (commits, pull requests, reviews), and reports where\n\
                   they diverge.\n\n\
                   Examples:\n  \
                     janus risk                                Module knowledge-risk metrics\n  \
                     janus sprints --now 2026-02-07T12:00:00Z  Sprint reality-gap metrics\n  \
                     janus corrections                         Learned estimate-correction rules\n  \
                     janus brief                               LLM executive briefing\n  \
                     janus fetch --org acme --repo shop        Snapshot live activity to disk\n  \
                     janus doctor                              Check setup and environment"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: janus.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable tables and summaries (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Reference instant for time-based analysis (RFC 3339, default: now)
    #[arg(long, global = true)]
    now: Option<String>,

    /// Data directory holding the JSON files (default: from config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Compute module knowledge-risk metrics
    #[command(long_about = "Compute module knowledge-risk metrics.\n\n\
        Converts commits, pull requests, and reviews into weighted knowledge\n\
        signals per module, then reports share concentration, bus factor, and\n\
        a 0-100 risk index per module.\n\n\
        Examples:\n  janus risk\n  janus risk --format json --data-dir fixtures/acme")]
    Risk,
    /// Compute sprint reality-gap metrics
    #[command(long_about = "Compute sprint reality-gap metrics.\n\n\
        Compares planned vs completed story points against elapsed time, folds\n\
        in review latency, and projects slip for the current sprint.\n\n\
        Examples:\n  janus sprints\n  janus sprints --now 2026-02-07T12:00:00Z --format json")]
    Sprints,
    /// Learn estimate-correction rules from completed issues
    #[command(long_about = "Learn estimate-correction rules from completed issues.\n\n\
        Mines fully-completed issues from past sprints for the ratio of actual\n\
        to planned duration, grouped by (team, module, issue type).\n\n\
        Example:\n  janus corrections --format json")]
    Corrections,
    /// Generate an executive briefing via the configured LLM
    #[command(long_about = "Generate an executive briefing via the configured LLM.\n\n\
        Summarizes the current sprint's plan and the engineering activity in\n\
        its window, then asks the model for a strategic-drift narrative.\n\
        Requires an LLM API key (config or environment).\n\n\
        Example:\n  janus brief --now 2026-02-07T12:00:00Z")]
    Brief,
    /// Snapshot live activity from the repo-data service to disk
    #[command(long_about = "Snapshot live activity from the repo-data service to disk.\n\n\
        Fetches commits, pull requests, reviews, and the module mapping for a\n\
        repository and writes them as JSON files into the data directory,\n\
        where the compute subcommands pick them up.\n\n\
        Example:\n  janus fetch --org acme --repo shop")]
    Fetch {
        /// Organization or owner name
        #[arg(long)]
        org: String,
        /// Repository name
        #[arg(long)]
        repo: String,
    },
    /// Create a default janus.toml configuration file
    #[command(long_about = "Create a default janus.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if janus.toml already exists.")]
    Init,
    /// Check your Janus setup and environment
    #[command(long_about = "Check your Janus setup and environment.\n\n\
        Runs diagnostics for the config file, data files, LLM API key, and\n\
        repo-data service settings. Use --format json for machine-readable\n\
        output.")]
    Doctor,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1m\x1b[33m⇆\x1b[0m \x1b[1mjanus\x1b[0m v{version} — plan on one side, reality on the other\n");

        println!("Quick start:");
        println!("  \x1b[36mjanus init\x1b[0m                    Create a janus.toml config file");
        println!("  \x1b[36mjanus risk\x1b[0m                    Module knowledge-risk metrics");
        println!("  \x1b[36mjanus sprints\x1b[0m                 Sprint reality-gap metrics\n");

        println!("All commands:");
        println!("  \x1b[32mrisk\x1b[0m         Knowledge shares, bus factor, risk index per module");
        println!("  \x1b[32msprints\x1b[0m      Plan vs reality per sprint, with slip projection");
        println!("  \x1b[32mcorrections\x1b[0m  Learned estimate-correction multipliers");
        println!("  \x1b[32mbrief\x1b[0m        LLM executive briefing on strategic drift");
        println!("  \x1b[32mfetch\x1b[0m        Snapshot live activity from the repo-data service");
        println!("  \x1b[32mdoctor\x1b[0m       Check your setup and environment");
        println!("  \x1b[32minit\x1b[0m         Create default configuration\n");
    } else {
        println!("janus v{version} — plan on one side, reality on the other\n");

        println!("Quick start:");
        println!("  janus init                    Create a janus.toml config file");
        println!("  janus risk                    Module knowledge-risk metrics");
        println!("  janus sprints                 Sprint reality-gap metrics\n");

        println!("All commands:");
        println!("  risk         Knowledge shares, bus factor, risk index per module");
        println!("  sprints      Plan vs reality per sprint, with slip projection");
        println!("  corrections  Learned estimate-correction multipliers");
        println!("  brief        LLM executive briefing on strategic drift");
        println!("  fetch        Snapshot live activity from the repo-data service");
        println!("  doctor       Check your setup and environment");
        println!("  init         Create default configuration\n");
    }

    println!("Run 'janus <command> --help' for details.");
}

fn parse_now(flag: &Option<String>) -> Result<DateTime<Utc>> {
    match flag {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .into_diagnostic()
            .wrap_err(format!("parsing --now value '{raw}' as RFC 3339")),
        None => Ok(Utc::now()),
    }
}

fn data_dir(cli: &Cli, config: &JanusConfig) -> PathBuf {
    cli.data_dir
        .clone()
        .unwrap_or_else(|| config.data.dir.clone())
}

fn load_engineering_into(snapshot: &mut Snapshot, dir: &Path) -> Result<()> {
    let data = fixtures::load_engineering(dir)
        .into_diagnostic()
        .wrap_err(format!("loading engineering data from {}", dir.display()))?;
    snapshot.load_engineering(data);
    Ok(())
}

fn load_planning_into(snapshot: &mut Snapshot, dir: &Path) -> Result<()> {
    let data = fixtures::load_planning(dir)
        .into_diagnostic()
        .wrap_err(format!("loading planning data from {}", dir.display()))?;
    snapshot.load_planning(data);
    Ok(())
}

fn render_modules(
    format: OutputFormat,
    headline: &str,
    modules: &[&ModuleMetric],
    verbose: bool,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "headline": headline,
                "modules": modules,
            });
            println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
        }
        OutputFormat::Markdown => {
            println!("## Module knowledge risk\n");
            println!("| Module | Risk | Severity | Bus factor | Top share | Signals |");
            println!("|---|---|---|---|---|---|");
            for m in modules {
                println!(
                    "| {} | {:.2} | {} | {} | {:.1}% | {} |",
                    m.module_id,
                    m.risk_index,
                    m.severity,
                    m.bus_factor,
                    m.top1_share_pct * 100.0,
                    m.signals_count,
                );
            }
            println!("\n> {headline}");
        }
        OutputFormat::Text => {
            println!("Module knowledge risk — {} modules\n", modules.len());
            for m in modules {
                println!(
                    "  {:<16} risk {:>6.2}  {:<8}  bus={}  top1={:>5.1}%  signals={}",
                    m.module_id,
                    m.risk_index,
                    m.severity.to_string(),
                    m.bus_factor,
                    m.top1_share_pct * 100.0,
                    m.signals_count,
                );
                if verbose {
                    for line in &m.evidence {
                        println!("      {line}");
                    }
                }
            }
            println!("\n{headline}");
        }
    }
    Ok(())
}

fn render_sprints(format: OutputFormat, headline: &str, sprints: &[&SprintMetrics]) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "headline": headline,
                "sprints": sprints,
            });
            println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
        }
        OutputFormat::Markdown => {
            println!("## Sprint reality gaps\n");
            println!("| Sprint | Gap score | Completed | Planned | Slip (days) | Finish |");
            println!("|---|---|---|---|---|---|");
            for s in sprints {
                println!(
                    "| {} | {} | {} | {} | {} | {} |",
                    s.name,
                    s.reality_gap_score,
                    s.completed_story_points,
                    s.planned_story_points,
                    s.predicted_slip_days,
                    s.predicted_finish_date,
                );
            }
            println!("\n> {headline}");
        }
        OutputFormat::Text => {
            println!("Sprint reality gaps — {} sprints\n", sprints.len());
            for s in sprints {
                println!(
                    "  {:<20} gap {:>3}  {:>3}/{:<3} pts ({:.1}%)  slip {} days, finish {}",
                    s.name,
                    s.reality_gap_score,
                    s.completed_story_points,
                    s.planned_story_points,
                    s.completion_pct,
                    s.predicted_slip_days,
                    s.predicted_finish_date,
                );
                for driver in &s.top_drivers {
                    println!("      driver: {driver}");
                }
                for action in &s.recommended_actions {
                    println!("      action: {action}");
                }
            }
            println!("\n{headline}");
        }
    }
    Ok(())
}

fn render_corrections(format: OutputFormat, rules: &[CorrectionRule]) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({ "rules": rules });
            println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
        }
        OutputFormat::Markdown => {
            println!("## Estimate-correction rules\n");
            println!("| Module | Type | Multiplier | Samples |");
            println!("|---|---|---|---|");
            for rule in rules {
                println!(
                    "| {} | {} | {:.2}x | {} |",
                    rule.module_id, rule.issue_type, rule.multiplier, rule.samples_count,
                );
            }
        }
        OutputFormat::Text => {
            if rules.is_empty() {
                println!("No correction rules learned (no fully-completed issues in the data).");
                return Ok(());
            }
            println!("Estimate-correction rules — {} groups\n", rules.len());
            for rule in rules {
                println!("  {}", rule.explanation);
            }
        }
    }
    Ok(())
}

#[derive(serde::Serialize)]
struct CheckResult {
    name: &'static str,
    status: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl CheckResult {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "pass",
            detail: detail.into(),
            hint: None,
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            name,
            status: "fail",
            detail: detail.into(),
            hint: Some(hint.into()),
        }
    }

    fn info(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "info",
            detail: detail.into(),
            hint: None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self.status {
            "pass" => "\u{2713}",
            "fail" => "\u{2717}",
            _ => "~",
        }
    }

    fn colored_symbol(&self) -> String {
        match self.status {
            "pass" => "\x1b[32m\u{2713}\x1b[0m".into(),
            "fail" => "\x1b[31m\u{2717}\x1b[0m".into(),
            _ => "\x1b[33m~\x1b[0m".into(),
        }
    }
}

fn llm_env_var(provider: &str) -> &'static str {
    match provider {
        "anthropic" => "ANTHROPIC_API_KEY",
        "gemini" => "GEMINI_API_KEY",
        _ => "OPENAI_API_KEY",
    }
}

fn run_doctor(
    config: &JanusConfig,
    dir: &Path,
    format: OutputFormat,
    use_color: bool,
) -> Result<()> {
    let mut checks: Vec<CheckResult> = Vec::new();

    // 1. Config file
    let config_path = Path::new("janus.toml");
    if config_path.exists() {
        checks.push(CheckResult::pass("config_file", "janus.toml found"));
    } else {
        checks.push(CheckResult::fail(
            "config_file",
            "janus.toml not found",
            "run 'janus init' to create a default config",
        ));
    }

    // 2. Data files
    if dir.is_dir() {
        let data_files = [
            fixtures::COMMITS_FILE,
            fixtures::PRS_FILE,
            fixtures::REVIEWS_FILE,
            fixtures::MODULES_FILE,
            fixtures::SPRINTS_FILE,
            fixtures::ISSUES_FILE,
            fixtures::ISSUE_EVENTS_FILE,
        ];
        let missing: Vec<&str> = data_files
            .iter()
            .copied()
            .filter(|file| !dir.join(file).exists())
            .collect();
        if missing.is_empty() {
            checks.push(CheckResult::pass(
                "data_files",
                format!("all data files present in {}", dir.display()),
            ));
        } else {
            checks.push(CheckResult::fail(
                "data_files",
                format!("missing: {}", missing.join(", ")),
                "run 'janus fetch' or place the JSON files in the data directory",
            ));
        }
    } else {
        checks.push(CheckResult::fail(
            "data_directory",
            format!("{} does not exist", dir.display()),
            "create it or point --data-dir at your fixtures",
        ));
    }

    // 3. LLM provider + API key
    let env_var = llm_env_var(&config.llm.provider);
    checks.push(CheckResult::pass(
        "llm_provider",
        format!("{} (model: {})", config.llm.provider, config.llm.model),
    ));
    if config.llm.api_key.is_some() || std::env::var(env_var).is_ok() {
        checks.push(CheckResult::pass("llm_api_key", format!("{env_var} set")));
    } else {
        checks.push(CheckResult::fail(
            "llm_api_key",
            format!("{env_var} not set"),
            format!(
                "export {env_var}=... or set api_key in janus.toml [llm] (needed for 'janus brief')"
            ),
        ));
    }

    // 4. Repo-data service
    checks.push(CheckResult::info(
        "repo_data_service",
        format!("{} (used by 'janus fetch')", config.service.base_url),
    ));

    match format {
        OutputFormat::Json => {
            let version = env!("CARGO_PKG_VERSION");
            let json = serde_json::json!({
                "version": version,
                "checks": checks,
            });
            println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
        }
        _ => {
            let version = env!("CARGO_PKG_VERSION");
            println!("Janus v{version} — Environment Check\n");

            for check in &checks {
                let sym = if use_color {
                    check.colored_symbol()
                } else {
                    check.symbol().to_string()
                };
                let label = check.name.replace('_', " ");
                println!("  {sym} {label:<20} {}", check.detail);
                if let Some(hint) = &check.hint {
                    println!("    hint: {hint}");
                }
            }

            let passed = checks.iter().filter(|c| c.status == "pass").count();
            let failed = checks.iter().filter(|c| c.status == "fail").count();
            let info = checks.iter().filter(|c| c.status == "info").count();
            println!("\n{passed} checks passed, {failed} failed, {info} info");
        }
    }

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Janus Configuration
# See: https://github.com/janus-dev/janus

[llm]
# OpenAI-compatible provider for 'janus brief'
# provider = "openai"
# model = "gpt-4o"
# base_url = "http://localhost:11434"

[service]
# Repo-data proxy used by 'janus fetch'
# base_url = "http://localhost:8000"
# api_key = "svc-token"

[data]
# Directory holding the JSON data files
# dir = "data"
"#;

fn new_spinner(message: String) -> Result<indicatif::ProgressBar> {
    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_style(
        indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
            .into_diagnostic()?,
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(spinner)
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => JanusConfig::from_file(path).into_diagnostic()?,
        None => {
            let default_path = Path::new("janus.toml");
            if default_path.exists() {
                JanusConfig::from_file(default_path).into_diagnostic()?
            } else {
                JanusConfig::default()
            }
        }
    };

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    if cli.verbose {
        eprintln!("format: {}", cli.format);
        eprintln!("data dir: {}", data_dir(&cli, &config).display());
    }

    match cli.command {
        None => {
            print_welcome(use_color);
            return Ok(());
        }
        Some(Command::Risk) => {
            let dir = data_dir(&cli, &config);
            let mut snapshot = Snapshot::new();
            load_engineering_into(&mut snapshot, &dir)?;
            let headline = snapshot.compute_risk().into_diagnostic()?;
            render_modules(cli.format, &headline, &snapshot.modules(), cli.verbose)?;
        }
        Some(Command::Sprints) => {
            let now = parse_now(&cli.now)?;
            let dir = data_dir(&cli, &config);
            let mut snapshot = Snapshot::new();
            load_engineering_into(&mut snapshot, &dir)?;
            load_planning_into(&mut snapshot, &dir)?;
            snapshot.compute_planning(now).into_diagnostic()?;
            render_sprints(cli.format, snapshot.planning_headline(), &snapshot.sprints())?;
        }
        Some(Command::Corrections) => {
            let now = parse_now(&cli.now)?;
            let dir = data_dir(&cli, &config);
            let mut snapshot = Snapshot::new();
            load_engineering_into(&mut snapshot, &dir)?;
            load_planning_into(&mut snapshot, &dir)?;
            snapshot.compute_planning(now).into_diagnostic()?;
            render_corrections(cli.format, snapshot.correction_rules())?;
        }
        Some(Command::Brief) => {
            let now = parse_now(&cli.now)?;
            let dir = data_dir(&cli, &config);
            let mut snapshot = Snapshot::new();
            load_engineering_into(&mut snapshot, &dir)?;
            load_planning_into(&mut snapshot, &dir)?;

            let mut llm_config = config.llm.clone();
            if llm_config.api_key.is_none() {
                let env_var = llm_env_var(&llm_config.provider);
                match std::env::var(env_var) {
                    Ok(key) => llm_config.api_key = Some(key),
                    Err(_) => miette::bail!(miette::miette!(
                        help = "Set {env_var} or add api_key in your janus.toml under [llm]",
                        "No API key configured for LLM provider '{}'",
                        llm_config.provider
                    )),
                }
            }

            let spinner = new_spinner(format!("asking {} for a briefing", llm_config.model))?;
            let briefing = janus_brief::generate_briefing(
                &llm_config,
                snapshot.raw_sprints(),
                snapshot.raw_issues(),
                snapshot.raw_commits(),
                snapshot.raw_prs(),
                now,
            )
            .await;
            spinner.finish_and_clear();

            println!("{}", briefing.into_diagnostic()?);
        }
        Some(Command::Fetch { ref org, ref repo }) => {
            let dir = data_dir(&cli, &config);
            let client = RepoDataClient::new(&config.service).into_diagnostic()?;

            let spinner = new_spinner(format!("fetching {org}/{repo}"))?;
            let data = client.fetch_engineering(org, repo).await;
            spinner.finish_and_clear();
            let data = data.into_diagnostic()?;

            fixtures::write_engineering(&dir, &data)
                .into_diagnostic()
                .wrap_err(format!("writing snapshot to {}", dir.display()))?;
            println!(
                "Fetched {org}/{repo}: {} commits, {} PRs, {} reviews, {} modules -> {}",
                data.commits.len(),
                data.prs.len(),
                data.reviews.len(),
                data.modules.len(),
                dir.display(),
            );
        }
        Some(Command::Init) => {
            let path = Path::new("janus.toml");
            if path.exists() {
                miette::bail!("janus.toml already exists; refusing to overwrite it.");
            }
            std::fs::write(path, DEFAULT_CONFIG)
                .into_diagnostic()
                .wrap_err("writing janus.toml")?;
            println!("Created janus.toml — uncomment and edit the options you need.");
        }
        Some(Command::Doctor) => {
            let dir = data_dir(&cli, &config);
            run_doctor(&config, &dir, cli.format, use_color)?;
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        }
    }

    Ok(())
}
