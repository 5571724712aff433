mod tree;

use std::io::{self, Write};

use crate::{
    config::ProctreeConfig,
    local_logger::{PROCTREE_U8_COLOR_CODE, init_local_logger},
    prelude::*,
    snapshot::{ProcessSource, SourceKind},
};
use clap::{
    Parser, ValueEnum,
    builder::{Styles, styling},
};
use libc::pid_t;
use process_hierarchy::{ConnectorStyle, DuplicatePolicy};

fn create_styles() -> Styles {
    styling::Styles::styled()
        .header(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .literal(
            styling::Ansi256Color(PROCTREE_U8_COLOR_CODE).on_default() | styling::Effects::BOLD,
        )
        .placeholder(styling::AnsiColor::Cyan.on_default())
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleArg {
    /// `|-` and `` `- `` connectors
    Ascii,
    /// Box-drawing connectors
    Unicode,
}

impl From<StyleArg> for ConnectorStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Ascii => ConnectorStyle::Ascii,
            StyleArg::Unicode => ConnectorStyle::Unicode,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicatesArg {
    /// List a repeated pid under its parent once per record
    Append,
    /// List a repeated pid once, under the parent of its last record
    Unique,
}

impl From<DuplicatesArg> for DuplicatePolicy {
    fn from(duplicates: DuplicatesArg) -> Self {
        match duplicates {
            DuplicatesArg::Append => DuplicatePolicy::Append,
            DuplicatesArg::Unique => DuplicatePolicy::Unique,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Print the process hierarchy as a tree", styles = create_styles())]
pub struct Cli {
    /// The pid to print the tree from
    #[arg(default_value_t = 1)]
    pub root_pid: pid_t,

    /// Where to list the running processes from
    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,

    /// Read a captured `ps axo ppid,pid,comm` listing instead of the running system.
    /// Use `-` to read it from stdin.
    #[arg(long, short, conflicts_with = "source")]
    pub input: Option<String>,

    /// The connectors used to draw the tree
    #[arg(long, value_enum)]
    pub style: Option<StyleArg>,

    /// How to list a pid that appears more than once in the snapshot
    #[arg(long, value_enum)]
    pub duplicates: Option<DuplicatesArg>,

    /// The configuration name to use
    /// If provided, the configuration will be loaded from ~/.config/proctree/{config-name}.yaml
    /// Otherwise, loads from ~/.config/proctree/config.yaml
    #[arg(long, env = "PROCTREE_CONFIG_NAME")]
    pub config_name: Option<String>,
}

/// Everything one snapshot, build and render cycle needs
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct TreeSettings {
    pub source: ProcessSource,
    pub style: ConnectorStyle,
    pub duplicates: DuplicatePolicy,
}

impl TreeSettings {
    /// Command line flags win over the config file, which wins over the defaults
    fn resolve(cli: &Cli, config: &ProctreeConfig) -> Self {
        let source = match &cli.input {
            Some(input) => ProcessSource::from_input(input),
            None => ProcessSource::Live(cli.source.or(config.snapshot.source).unwrap_or_default()),
        };

        Self {
            source,
            style: cli
                .style
                .map(ConnectorStyle::from)
                .or(config.display.style)
                .unwrap_or_default(),
            duplicates: cli
                .duplicates
                .map(DuplicatePolicy::from)
                .or(config.snapshot.duplicates)
                .unwrap_or_default(),
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_local_logger()?;

    let config = ProctreeConfig::load(cli.config_name.as_deref())?;
    let settings = TreeSettings::resolve(&cli, &config);
    debug!("Settings: {settings:?}");

    let lines = tree::render_tree(&settings, cli.root_pid)?;
    write_lines(io::stdout().lock(), &lines)
}

/// Write the rendered tree, stopping quietly if the reader went away
fn write_lines(mut out: impl Write, lines: &[String]) -> Result<()> {
    for line in lines {
        match writeln!(out, "{line}") {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => return Ok(()),
            Err(err) => return Err(err).context("Failed to write the process tree"),
        }
    }

    match out.flush() {
        Err(err) if err.kind() != io::ErrorKind::BrokenPipe => {
            Err(err).context("Failed to write the process tree")
        }
        _ => Ok(()),
    }
}
