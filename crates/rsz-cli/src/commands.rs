use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use rsz_diff::{apply_scene_diff, get_scene_diff};
use rsz_ledger::Bundle;
use rsz_paths::iterate_forest;
use rsz_sdk::{BaseFile, BundleReport, EditorConfig, Environment, Session};
use serde_json::{json, Value as Json};
use tracing::warn;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Diff(args) => cmd_diff(args),
        Command::Apply(args) => cmd_apply(args),
        Command::Paths(args) => cmd_paths(args, format),
        Command::Bundle(args) => cmd_bundle(args, format),
        Command::Collect(args) => cmd_collect(args),
        Command::Patch(args) => cmd_patch(args, format),
    }
}

fn load_schema(path: &Path) -> anyhow::Result<Environment> {
    let text = fs::read_to_string(path).with_context(|| format!("reading schema {}", path.display()))?;
    Ok(Environment::from_json(&text)?)
}

fn load_dump(path: &Path) -> anyhow::Result<BaseFile> {
    let text = fs::read_to_string(path).with_context(|| format!("reading dump {}", path.display()))?;
    Ok(BaseFile::from_json(&text)?)
}

/// Dumps are laid out by native path: `<dir>/<native path>.json`.
fn dump_path(dir: &Path, native: &str) -> PathBuf {
    dir.join(format!("{native}.json"))
}

fn cmd_diff(args: DiffArgs) -> anyhow::Result<()> {
    let env = load_schema(&args.schema)?;
    let base = load_dump(&args.base)?;
    let edited = load_dump(&args.edited)?;

    let diff = if args.scene {
        let (Some(base), Some(edited)) = (base.as_rsz(), edited.as_rsz()) else {
            bail!("scene diffs need two rsz dumps");
        };
        get_scene_diff(&base.game_objects, &edited.game_objects, &env)?
    } else {
        let (Some(config), Some(native)) = (&args.config, &args.native) else {
            bail!("resource diffs need --config and --native");
        };
        let session = Session::new(env, EditorConfig::load(config)?)?;
        session.open_file(native, None, base)?;
        session.load_edits(native, &edited)?;
        session.file_diff(native)?
    };

    match diff {
        Some(diff) => println!("{}", serde_json::to_string_pretty(&diff)?),
        None => println!("No changes."),
    }
    Ok(())
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let env = load_schema(&args.schema)?;
    let mut base = load_dump(&args.base)?;
    let diff: Json = serde_json::from_str(&fs::read_to_string(&args.diff)?)?;

    let file = base.as_rsz_mut().context("scene diffs apply to rsz dumps only")?;
    let report = apply_scene_diff(&mut file.game_objects, &diff, &env)?;
    for unit in &report.applied {
        eprintln!("  {} {}", "applied".green(), unit);
    }
    for failure in &report.failures {
        eprintln!("  {} {}: {}", "failed".red(), failure.unit, failure.error);
    }

    let out = base.to_json()?;
    match &args.output {
        Some(path) => fs::write(path, out)?,
        None => println!("{out}"),
    }
    if !report.is_clean() {
        bail!("{} unit(s) failed to apply", report.failures.len());
    }
    Ok(())
}

fn cmd_paths(args: PathsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let dump = load_dump(&args.file)?;
    let file = dump.as_rsz().context("only rsz dumps have game objects")?;
    let nodes = iterate_forest(&file.game_objects);

    if format == OutputFormat::Json {
        let paths: Vec<String> = nodes.iter().map(|(_, path)| path.to_string()).collect();
        println!("{}", serde_json::to_string_pretty(&paths)?);
        return Ok(());
    }
    for (node, path) in nodes {
        println!("{}  {}", path.to_string().cyan(), format!("{} component(s)", node.components.len()).dimmed());
    }
    Ok(())
}

fn cmd_bundle(args: BundleArgs, format: OutputFormat) -> anyhow::Result<()> {
    match args.action {
        BundleAction::Show { bundle } => {
            let bundle = Bundle::load(&bundle)?;
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&bundle)?);
                return Ok(());
            }
            println!("Bundle {}", bundle.name.bold());
            for (key, listing) in bundle.resource_listing() {
                let mode = if listing.replace { "replace".yellow() } else { "patch".green() };
                let units = listing.diff.as_ref().and_then(Json::as_object).map_or(0, |m| m.len());
                println!("  {} {} → {} ({} unit(s))", mode, key.bold(), listing.target, units);
            }
            for entity in bundle.entities() {
                println!("  {} {}:{} {}", "entity".blue(), entity.entity_type, entity.id, entity.label);
            }
        }
        BundleAction::Find { bundle, native } => {
            let bundle = Bundle::load(&bundle)?;
            match bundle.try_find_resource_listing(&native) {
                Some((key, listing)) => println!("{} → {}", listing.target, key.bold()),
                None => println!("{} is not claimed by {}", native, bundle.name.bold()),
            }
        }
    }
    Ok(())
}

fn cmd_collect(args: CollectArgs) -> anyhow::Result<()> {
    let env = load_schema(&args.schema)?;
    let config = EditorConfig::load(&args.config)?;
    let files: Vec<String> = config.files.keys().cloned().collect();
    let mut bundle = if args.bundle.exists() {
        Bundle::load(&args.bundle)?
    } else {
        Bundle::new(config.bundle_name.clone().unwrap_or_else(|| "bundle".into()))
    };

    let session = Session::new(env, config)?;
    for native in &files {
        let edited = dump_path(&args.edited_dir, native);
        if !edited.exists() {
            continue;
        }
        session.open_file(native, None, load_dump(&dump_path(&args.base_dir, native))?)?;
        session.load_edits(native, &load_dump(&edited)?)?;
    }

    let collected = session.collect_into(&mut bundle)?;
    bundle.save(&args.bundle)?;
    println!(
        "{} Collected {} file(s) into {}",
        "✓".green().bold(),
        collected,
        args.bundle.display()
    );
    Ok(())
}

fn cmd_patch(args: PatchArgs, format: OutputFormat) -> anyhow::Result<()> {
    let env = load_schema(&args.schema)?;
    let bundle = Bundle::load(&args.bundle)?;
    let session = Session::new(env, EditorConfig::load(&args.config)?)?;

    for (key, listing) in bundle.resource_listing() {
        let input = dump_path(&args.base_dir, &listing.target);
        if session.config().resource_type_for(&listing.target).is_none() || !input.exists() {
            warn!(key, path = %listing.target, "no configured dump for listed file");
            continue;
        }
        session.open_file(&listing.target, None, load_dump(&input)?)?;
    }

    let report = session.apply_bundle(&bundle)?;
    for native in &report.patched {
        let out = dump_path(&args.out_dir, native);
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&out, session.write_back(native)?.to_json()?)?;
    }

    print_report(&report, format)?;
    if !report.is_clean() {
        bail!("{} unit(s) failed to apply", report.failures.len());
    }
    Ok(())
}

fn print_report(report: &BundleReport, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        let failures: Vec<Json> = report
            .failures
            .iter()
            .map(|f| json!({"unit": f.unit, "error": f.error.to_string()}))
            .collect();
        let out = json!({
            "patched": report.patched,
            "replaced": report.replaced,
            "skipped": report.skipped,
            "applied": report.applied,
            "failures": failures
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for path in &report.patched {
        println!("  {} {}", "patched:".green(), path);
    }
    for path in &report.replaced {
        println!("  {} {}", "replaced:".yellow(), path);
    }
    for path in &report.skipped {
        println!("  {} {}", "skipped:".dimmed(), path);
    }
    for failure in &report.failures {
        println!("  {} {}: {}", "failed:".red(), failure.unit, failure.error);
    }
    println!(
        "{} {} unit(s) applied, {} failed",
        if report.is_clean() { "✓".green().bold() } else { "✗".red().bold() },
        report.applied.len(),
        report.failures.len()
    );
    Ok(())
}
