//! docweave - render document trees to HTML5, LaTeX or pseudo-XML

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;

use docweave::io::{DecodeOptions, FileInput, FileOutput, Input, Output, StringOutput};
use docweave::nodes::Document;
use docweave::settings::Settings;
use docweave::writers::Parts;
use docweave::{Result, publish, publish_parts};

#[derive(Parser)]
#[command(name = "docweave")]
#[command(version, about = "Render document trees to HTML5, LaTeX or pseudo-XML", long_about = None)]
#[command(after_help = "EXAMPLES:
    docweave tree.json page.html              Render HTML5
    docweave -w latex tree.json paper.tex     Render LaTeX
    docweave -w pseudoxml tree.json           Dump the tree to stdout
    docweave --parts tree.json                Print every part as JSON")]
struct Cli {
    /// Document tree as JSON
    #[arg(value_name = "SOURCE")]
    source: String,

    /// Output file (stdout when omitted)
    #[arg(value_name = "DEST")]
    dest: Option<String>,

    /// Writer name: html5, latex, pseudoxml (or an alias)
    #[arg(short, long, default_value = "html5")]
    writer: String,

    /// JSON settings file; flags override its values
    #[arg(long, value_name = "FILE")]
    settings: Option<String>,

    #[arg(long)]
    input_encoding: Option<String>,

    #[arg(long)]
    output_encoding: Option<String>,

    /// strict, replace or xmlcharrefreplace
    #[arg(long)]
    output_encoding_error_handler: Option<String>,

    /// link, lazy or embed
    #[arg(long)]
    image_loading: Option<String>,

    #[arg(long)]
    section_self_link: bool,

    #[arg(long)]
    initial_header_level: Option<u8>,

    /// Lowest level rendered: debug, info, warning, error, severe (or 0-4)
    #[arg(long)]
    report_level: Option<String>,

    /// Fail on node types the writer does not handle
    #[arg(long)]
    strict_visitor: bool,

    /// Stylesheet (repeatable)
    #[arg(long)]
    stylesheet: Vec<String>,

    /// LaTeX document class
    #[arg(long)]
    documentclass: Option<String>,

    /// Print all parts as a JSON object instead of the whole document
    #[arg(long)]
    parts: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.quiet {
        log::LevelFilter::Error
    } else if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let settings = settings(cli)?;

    let mut input = FileInput::new(&cli.source, DecodeOptions::from_settings(&settings));
    let text = input.read()?;
    let doc = Document::from_json(&text, input.source_path())?;
    log::debug!("{}: {} nodes", input.source_path(), doc.node_count());

    if cli.parts {
        let parts = publish_parts(&doc, &cli.writer, &settings)?;
        let json = serde_json::to_string_pretty(&parts_map(&parts))?;
        return emit(cli, &settings, &format!("{json}\n"));
    }

    match &cli.dest {
        Some(dest) => {
            let mut output = FileOutput::new(
                dest,
                settings.output_encoding.clone(),
                settings.output_encoding_error_handler,
            );
            publish(&doc, &cli.writer, &settings, &mut output)?;
        }
        None => {
            let mut output = StringOutput::new(
                settings.output_encoding.clone(),
                settings.output_encoding_error_handler,
            );
            publish(&doc, &cli.writer, &settings, &mut output)?;
            std::io::stdout().lock().write_all(output.as_bytes())?;
        }
    }
    Ok(())
}

/// Settings file first, then command-line overrides.
fn settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.settings {
        Some(path) => Settings::from_json(&fs::read_to_string(path)?)?,
        None => Settings::default(),
    };
    settings.source_path = Some(cli.source.clone());
    if let Some(encoding) = &cli.input_encoding {
        settings.input_encoding = Some(encoding.clone());
    }
    if let Some(encoding) = &cli.output_encoding {
        settings.output_encoding = encoding.clone();
    }
    if let Some(handler) = &cli.output_encoding_error_handler {
        settings.output_encoding_error_handler = handler.parse()?;
    }
    if let Some(loading) = &cli.image_loading {
        settings.image_loading = loading.parse()?;
    }
    if cli.section_self_link {
        settings.section_self_link = true;
    }
    if let Some(level) = cli.initial_header_level {
        settings.initial_header_level = level;
    }
    if let Some(level) = &cli.report_level {
        settings.report_level = level.parse()?;
    }
    if cli.strict_visitor {
        settings.strict_visitor = true;
    }
    settings.stylesheet_path.extend(cli.stylesheet.iter().cloned());
    if let Some(class) = &cli.documentclass {
        settings.documentclass = class.clone();
    }
    settings.validate()?;
    Ok(settings)
}

fn parts_map(parts: &Parts) -> BTreeMap<&str, &str> {
    parts.iter().collect()
}

fn emit(cli: &Cli, settings: &Settings, text: &str) -> Result<()> {
    match &cli.dest {
        Some(dest) => FileOutput::new(
            dest,
            settings.output_encoding.clone(),
            settings.output_encoding_error_handler,
        )
        .write(docweave::io::OutputData::Text(text)),
        None => {
            std::io::stdout().lock().write_all(text.as_bytes())?;
            Ok(())
        }
    }
}
