pub mod classifier;
pub mod cli;
pub mod field;
pub mod generators;
pub mod heuristic;
pub mod locale;
pub mod overrides;
pub mod rules;
pub mod select;
pub mod settings;
pub mod signals;
pub mod table;

use std::{env, fs::File, io::BufReader, path::Path, sync::OnceLock};

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{LevelFilter, debug, info};
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;

use crate::{
    classifier::{Classification, Classifier},
    cli::{Cli, Commands},
    field::{FieldHandle, NativeKind},
    overrides::RuleAction,
    select::OptionPick,
    settings::Settings,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("formsense", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Classify(args) => handle_classify(&args),
        Commands::Lint(args) => handle_lint(&args),
        Commands::Explain(args) => handle_explain(&args),
    }
}

/// One field's entry in the classify report.
#[derive(Debug, Serialize)]
pub struct FieldReport {
    pub field: String,
    #[serde(flatten)]
    pub classification: Classification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_option: Option<OptionPick>,
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => {
            Settings::load(path).with_context(|| format!("Loading settings from {path:?}"))
        }
        None => Ok(Settings::default()),
    }
}

fn load_fields(path: &Path) -> Result<Vec<FieldHandle>> {
    let file = File::open(path).with_context(|| format!("Opening field snapshot {path:?}"))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).with_context(|| format!("Parsing field snapshot {path:?}"))
}

/// Classifies every field in a snapshot file. Public so the bench and
/// integration tests can drive the same path the binary does.
pub fn classify_snapshot(
    fields: &[FieldHandle],
    settings: Settings,
    seed: Option<u64>,
) -> Vec<FieldReport> {
    let mut classifier = Classifier::new(settings);
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut reports = Vec::with_capacity(fields.len());
    for field in fields {
        let classification = classifier.classify(field);
        let recommended_option = if field.kind == NativeKind::Select {
            classifier.recommend_option(field, &mut rng)
        } else {
            None
        };
        let label = if field.name.is_empty() { &field.element_id } else { &field.name };
        reports.push(FieldReport {
            field: label.clone(),
            classification,
            recommended_option,
        });
    }
    classifier.end_pass();
    reports
}

fn handle_classify(args: &cli::ClassifyArgs) -> Result<()> {
    let settings = load_settings(args.settings.as_deref())?;
    let fields = load_fields(&args.input)?;
    info!(
        "Classifying {} field(s) from '{}'",
        fields.len(),
        args.input.display()
    );
    let reports = classify_snapshot(&fields, settings, args.seed);

    if args.table {
        let headers = ["field", "type", "confidence", "source", "option"]
            .map(String::from)
            .to_vec();
        let rows = reports
            .iter()
            .map(|r| {
                vec![
                    r.field.clone(),
                    r.classification.field_type.to_string(),
                    r.classification
                        .confidence
                        .map(|c| format!("{c:.2}"))
                        .unwrap_or_default(),
                    format!("{:?}", r.classification.source).to_lowercase(),
                    r.recommended_option
                        .as_ref()
                        .map(|o| o.value.clone())
                        .unwrap_or_default(),
                ]
            })
            .collect::<Vec<_>>();
        print!("{}", table::render_table(&headers, &rows));
        return Ok(());
    }

    let rendered = serde_json::to_string_pretty(&reports).context("Rendering report JSON")?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Writing report to {path:?}"))?;
            info!("Report for {} field(s) written to {:?}", reports.len(), path);
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn handle_lint(args: &cli::LintArgs) -> Result<()> {
    let file = File::open(&args.rules)
        .with_context(|| format!("Opening rules file {:?}", args.rules))?;
    let rules: Vec<overrides::CustomRule> =
        serde_yaml::from_reader(BufReader::new(file)).context("Parsing rules YAML")?;
    debug!("linting {} rule(s)", rules.len());

    let mut findings = Vec::new();
    for (idx, rule) in rules.iter().enumerate() {
        let position = idx + 1;
        if rule.pattern.trim().is_empty() {
            findings.push(format!("rule {position}: empty match pattern (never matches)"));
        }
        match &rule.action {
            RuleAction::Regex { pattern } => {
                if let Err(err) = overrides::validate_regex(pattern) {
                    findings.push(format!("rule {position}: {err}"));
                }
            }
            RuleAction::Generator { path } => {
                if generators::lookup(path).is_none() {
                    findings.push(format!("rule {position}: unknown generator path '{path}'"));
                }
            }
            RuleAction::Values { values } => {
                if values.is_empty() {
                    findings.push(format!("rule {position}: empty value list"));
                }
            }
        }
    }

    if findings.is_empty() {
        info!("{} rule(s) OK", rules.len());
        return Ok(());
    }
    for finding in &findings {
        eprintln!("{finding}");
    }
    bail!("{} finding(s) in {:?}", findings.len(), args.rules);
}

fn handle_explain(args: &cli::ExplainArgs) -> Result<()> {
    let settings = load_settings(args.settings.as_deref())?;
    let fields = load_fields(&args.input)?;
    let field = fields
        .iter()
        .find(|f| f.name == args.field || f.element_id == args.field)
        .with_context(|| format!("No field named '{}' in {:?}", args.field, args.input))?;

    let extracted = signals::extract(field);
    println!("signals:");
    println!("  kind:        {:?}", extracted.kind);
    println!("  name:        {:?} (tail {:?})", extracted.name, extracted.name_tail);
    println!("  id:          {:?} (tail {:?})", extracted.id, extracted.id_tail);
    println!("  placeholder: {:?}", extracted.placeholder);
    println!("  label:       {:?}", extracted.label);
    println!("  classes:     {:?}", extracted.classes);

    let matched = overrides::find_match(
        &settings.custom_rules,
        field,
        &extracted.label,
        settings.match_labels,
    );
    match matched {
        Some(rule) => println!("override:    matched pattern {:?}", rule.pattern),
        None => println!("override:    no rule matched"),
    }

    if field.kind == NativeKind::Select {
        let (field_type, confidence) = select::classify(&extracted, &field.options);
        println!("select:      {field_type} ({confidence:.2})");
    } else {
        println!("rules:       {}", rules::classify(&extracted));
        match heuristic::classify(&extracted, settings.threshold_fraction()) {
            Ok(Some((field_type, confidence))) => {
                println!("heuristic:   {field_type} ({confidence:.2})");
            }
            Ok(None) => println!("heuristic:   below threshold"),
            Err(err) => println!("heuristic:   unavailable ({err})"),
        }
    }

    let mut classifier = Classifier::new(settings);
    let verdict = classifier.classify(field);
    println!(
        "verdict:     {} via {:?}",
        verdict.field_type, verdict.source
    );
    Ok(())
}
