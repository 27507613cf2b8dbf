use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use serde_json::json;
use tracing::info;

use stac_graph::{DefaultRenderer, NodeId, Renderer, StacGraph};
use stac_store::{make_absolute_href, FileStore, StoreContext};
use stac_types::{DocumentKind, StacObject};
use stac_validate::{SchemaCache, SchemaValidator, ValidateError, Validator};

use crate::cli::*;
use crate::config::CliConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    let format = cli.format;
    match cli.command {
        Command::Show(args) => cmd_show(args, format, &config),
        Command::Tree(args) => cmd_tree(args, format, &config),
        Command::Render(args) => cmd_render(args, format, &config),
        Command::Validate(args) => cmd_validate(args, format, &config),
        Command::Version => cmd_version(format, &config),
    }
}

/// Make a command-line path absolute so relative links resolve against it.
fn absolute(href: &str) -> anyhow::Result<String> {
    let cwd = std::env::current_dir().context("reading working directory")?;
    let base = format!("{}/", cwd.display());
    Ok(make_absolute_href(href, Some(&base))?)
}

fn open(href: &str, config: &CliConfig) -> anyhow::Result<(StacGraph, NodeId)> {
    let store = StoreContext::filesystem().with_pretty(config.pretty_json);
    let mut graph = StacGraph::new(store);
    let href = absolute(href)?;
    let id = graph
        .read_file(&href)
        .with_context(|| format!("reading {href}"))?;
    Ok((graph, id))
}

fn kind_label(kind: DocumentKind) -> colored::ColoredString {
    match kind {
        DocumentKind::Catalog => "Catalog".blue(),
        DocumentKind::Collection => "Collection".magenta(),
        DocumentKind::Item => "Item".green(),
    }
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_show(args: ShowArgs, format: OutputFormat, config: &CliConfig) -> anyhow::Result<()> {
    let (graph, id) = open(&args.href, config)?;
    let document = graph.document(id)?;
    if format == OutputFormat::Json {
        return print_json(&document.to_value()?);
    }
    println!("{} {}", kind_label(document.kind()).bold(), document.id().bold());
    println!("  STAC version: {}", document.stac_version());
    if let Some(title) = document.title() {
        println!("  Title: {title}");
    }
    if let Some(href) = graph.href(id)? {
        println!("  Href: {}", href.dimmed());
    }
    if let Some(extensions) = document.stac_extensions() {
        for extension in extensions {
            println!("  Extension: {}", extension.cyan());
        }
    }
    for link in document.links() {
        println!(
            "  {:>8} {}",
            link.rel.yellow(),
            link.href.as_deref().unwrap_or("(no href)")
        );
    }
    Ok(())
}

fn cmd_tree(args: TreeArgs, format: OutputFormat, config: &CliConfig) -> anyhow::Result<()> {
    let (mut graph, root) = open(&args.href, config)?;
    let order = graph.walk(root)?;
    if format == OutputFormat::Json {
        let mut nodes = Vec::with_capacity(order.len());
        for (id, depth) in &order {
            let document = graph.document(*id)?;
            nodes.push(json!({
                "id": document.id(),
                "type": document.kind().type_tag(),
                "depth": depth,
                "href": graph.href(*id)?,
            }));
        }
        return print_json(&serde_json::Value::Array(nodes));
    }
    for (id, depth) in &order {
        let document = graph.document(*id)?;
        println!(
            "{}{} {}",
            "  ".repeat(*depth),
            kind_label(document.kind()),
            document.id().bold()
        );
    }
    Ok(())
}

fn cmd_render(args: RenderArgs, format: OutputFormat, config: &CliConfig) -> anyhow::Result<()> {
    let (mut graph, root) = open(&args.href, config)?;
    let renderer = DefaultRenderer::new(absolute(&args.root)?);
    if args.upgrade {
        graph.set_stac_version(root, &config.stac_version)?;
    }
    renderer.render(&mut graph, root)?;

    let order = graph.walk(root)?;
    let written = if args.write {
        graph.save_tree(root)?
    } else {
        0
    };
    info!(documents = order.len(), written, "render complete");

    if format == OutputFormat::Json {
        let mut hrefs = Vec::with_capacity(order.len());
        for (id, _) in &order {
            hrefs.push(json!({
                "id": graph.document(*id)?.id(),
                "href": graph.href(*id)?,
            }));
        }
        return print_json(&json!({"documents": hrefs, "written": written}));
    }
    for (id, _) in &order {
        println!(
            "  {} {}",
            graph.document(*id)?.id().bold(),
            graph.href(*id)?.unwrap_or_default().dimmed()
        );
    }
    if args.write {
        println!("{} Wrote {} documents under {}", "✓".green().bold(), written, renderer.root().bold());
    } else {
        println!("Rendered {} documents (dry run, use {} to save)", order.len(), "--write".bold());
    }
    Ok(())
}

fn schema_cache(args: &ValidateArgs, config: &CliConfig) -> SchemaCache {
    let local = args.schemas.clone().or_else(|| config.schema_dir.clone());
    let cache = SchemaCache::new(local);
    match &config.schema_mirror {
        Some(mirror) => cache.with_remote(Arc::new(FileStore::new()), mirror.clone()),
        None => cache,
    }
}

fn cmd_validate(args: ValidateArgs, format: OutputFormat, config: &CliConfig) -> anyhow::Result<()> {
    let validator = SchemaValidator::new(Arc::new(schema_cache(&args, config)));
    let (mut graph, root) = open(&args.href, config)?;
    let targets: Vec<NodeId> = if args.recursive {
        graph.walk(root)?.into_iter().map(|(id, _)| id).collect()
    } else {
        vec![root]
    };

    let mut failures = 0;
    let mut report = Vec::with_capacity(targets.len());
    for id in targets {
        let document = graph.document(id)?;
        let result = validator.validate(document);
        let violations: Vec<String> = match &result {
            Ok(()) => Vec::new(),
            Err(ValidateError::SchemaViolation { violations, .. }) => {
                violations.iter().map(ToString::to_string).collect()
            }
            Err(e) => return Err(anyhow::anyhow!("validating {}: {e}", document.id())),
        };
        if !violations.is_empty() {
            failures += 1;
        }
        if format == OutputFormat::Json {
            report.push(json!({"id": document.id(), "valid": violations.is_empty(), "violations": violations}));
        } else if violations.is_empty() {
            println!("{} {}", "✓".green().bold(), document.id());
        } else {
            println!("{} {}", "✗".red().bold(), document.id().bold());
            for violation in &violations {
                println!("    {}", violation.red());
            }
        }
    }

    if format == OutputFormat::Json {
        print_json(&serde_json::Value::Array(report))?;
    }
    if failures > 0 {
        anyhow::bail!("{failures} document(s) failed validation");
    }
    Ok(())
}

fn cmd_version(format: OutputFormat, config: &CliConfig) -> anyhow::Result<()> {
    let tool = env!("CARGO_PKG_VERSION");
    if format == OutputFormat::Json {
        return print_json(&json!({"stac": tool, "stac_version": config.stac_version}));
    }
    println!("stac {}", tool.bold());
    println!("  STAC version: {}", config.stac_version.cyan());
    if let Some(dir) = &config.schema_dir {
        println!("  Schemas: {}", dir.display());
    }
    Ok(())
}
