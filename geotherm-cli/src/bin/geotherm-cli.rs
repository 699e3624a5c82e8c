use anyhow::{ensure, Context};
use clap::{ArgAction, Parser, ValueEnum};
use log::{LevelFilter, Log, Metadata, Record};
use rayon::prelude::*;

use std::fs;
use std::path::{Path, PathBuf};

extern crate geotherm_core;
use geotherm_core::prelude::*;

/// Techno-economic simulation of geothermal energy projects.
/// After running `cargo build --release`, run with
/// ```bash
/// ./target/release/geotherm-cli resources/example1.txt --output example1.out --json example1.json
/// ```
/// Several input decks run in parallel; with more than one input, the input's file stem is
/// appended to every output file name.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct GeothermApi {
    /// Input decks (`Description, Value[, Comment]` text, or yaml/json)
    #[clap(value_parser, required = true)]
    inputs: Vec<PathBuf>,
    /// File the rendered report is written to
    #[clap(long, short, value_parser)]
    output: Option<PathBuf>,
    /// File the structured result is written to (format chosen by extension)
    #[clap(long, value_parser)]
    json: Option<PathBuf>,
    /// Format of the rendered report
    #[clap(long, value_enum, default_value = "text")]
    format: ReportFormat,
    /// Log verbosity; repeat for more
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
    Yaml,
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

struct Report {
    input: PathBuf,
    rendered: String,
    result: RunResult,
    print: bool,
}

fn run_deck(path: &Path, format: ReportFormat) -> anyhow::Result<Report> {
    if !path.exists() {
        log::warn!("input file {path:?} not found; running on default parameters");
    }
    let mut model = Model::from_path(path)?;
    model.read_parameters()?;
    model.calculate()?;
    let result = model.result()?;
    let rendered = match format {
        ReportFormat::Text => model.render_text()?,
        ReportFormat::Json => result.to_json()?,
        ReportFormat::Yaml => result.to_yaml()?,
    };
    Ok(Report {
        input: path.to_path_buf(),
        rendered,
        result,
        print: model.outputs.print_to_console(),
    })
}

/// `base` itself for a single input, `base` with the input's stem appended otherwise
fn output_path(base: &Path, input: &Path, several: bool) -> PathBuf {
    if !several {
        return base.to_path_buf();
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("report");
    let input_stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("input");
    let name = match base.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_{input_stem}.{ext}"),
        None => format!("{stem}_{input_stem}"),
    };
    base.with_file_name(name)
}

fn write_report(api: &GeothermApi, report: &Report) -> anyhow::Result<()> {
    let several = api.inputs.len() > 1;
    if report.print {
        println!("{}", report.rendered);
    }
    if let Some(output) = &api.output {
        let path = output_path(output, &report.input, several);
        fs::write(&path, &report.rendered)
            .with_context(|| format!("writing report to {path:?}"))?;
    }
    if let Some(json) = &api.json {
        report.result.to_file(output_path(json, &report.input, several))?;
    }
    Ok(())
}

pub fn main() -> anyhow::Result<()> {
    let api = GeothermApi::parse();
    init_logging(api.verbose);

    let reports: Vec<anyhow::Result<Report>> = api
        .inputs
        .par_iter()
        .map(|path| {
            run_deck(path, api.format).with_context(|| format!("simulating {path:?}"))
        })
        .collect();

    let mut failures = 0;
    for report in reports {
        match report.and_then(|report| write_report(&api, &report)) {
            Ok(()) => {}
            Err(err) => {
                eprintln!("error: {err:#}");
                failures += 1;
            }
        }
    }
    ensure!(failures == 0, "{failures} of {} run(s) failed", api.inputs.len());
    Ok(())
}
