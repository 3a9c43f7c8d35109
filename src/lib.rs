//! Shared functionality for the `stackcheck` CLI.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Read};
use std::path::{Path, PathBuf};
use termcolor::{Ansi, ColorChoice, NoColor, StandardStream, WriteColor};
use wasm_stackcheck::Module;

/// Options shared by every subcommand.
#[derive(clap::Parser)]
pub struct GeneralOpts {
    /// Use verbose output (-v info, -vv debug, -vvv trace).
    #[clap(long = "verbose", short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration over whether terminal colors are used in output.
    ///
    /// Supports one of `auto|never|always|always-ansi`. The default is to
    /// detect what to do based on the terminal environment, for example by
    /// using `isatty`.
    #[clap(long = "color", default_value = "auto")]
    pub color: ColorChoice,
}

impl GeneralOpts {
    /// Initializes the logger based on the verbosity level, unless
    /// `RUST_LOG` overrides it.
    pub fn init_logger(&self) {
        let default = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
            .format_target(false)
            .init();
    }
}

// This is intended to be included in a struct as:
//
//      #[clap(flatten)]
//      io: stackcheck::InputOutput,
//
// and then the methods are used to read the arguments,
#[derive(clap::Parser)]
pub struct InputOutput {
    #[clap(flatten)]
    input: InputArg,

    #[clap(flatten)]
    output: OutputArg,

    #[clap(flatten)]
    general: GeneralOpts,
}

#[derive(clap::Parser)]
pub struct InputArg {
    /// Input JSON module to process.
    ///
    /// If not provided or if this is `-` then stdin is read entirely and
    /// processed.
    input: Option<PathBuf>,
}

#[derive(clap::Parser)]
pub struct OutputArg {
    /// Where to place output.
    ///
    /// If not provided then stdout is used.
    #[clap(short, long)]
    output: Option<PathBuf>,
}

impl InputOutput {
    pub fn parse_input_module(&self) -> Result<Module> {
        self.input.parse_module()
    }

    pub fn output_writer(&self) -> Result<Box<dyn WriteColor>> {
        self.output.output_writer(self.general.color)
    }

    pub fn general_opts(&self) -> &GeneralOpts {
        &self.general
    }
}

impl InputArg {
    /// Reads the whole input and deserializes a [`Module`] from it.
    pub fn parse_module(&self) -> Result<Module> {
        let (bytes, name) = match &self.input {
            Some(path) if path != Path::new("-") => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("failed to read input file `{}`", path.display()))?;
                (bytes, path.display().to_string())
            }
            _ => {
                let mut bytes = Vec::new();
                io::stdin()
                    .read_to_end(&mut bytes)
                    .context("failed to read <stdin>")?;
                (bytes, "<stdin>".to_string())
            }
        };
        let module = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse module in `{name}`"))?;
        log::debug!("parsed module from `{name}`");
        Ok(module)
    }
}

impl OutputArg {
    pub fn output_writer(&self, color: ColorChoice) -> Result<Box<dyn WriteColor>> {
        match &self.output {
            Some(output) => {
                let writer = BufWriter::new(
                    File::create(output)
                        .with_context(|| format!("failed to create `{}`", output.display()))?,
                );
                if color == ColorChoice::AlwaysAnsi {
                    Ok(Box::new(Ansi::new(writer)))
                } else {
                    Ok(Box::new(NoColor::new(writer)))
                }
            }
            None => {
                let stdout = io::stdout();
                if color == ColorChoice::Auto && !stdout.is_terminal() {
                    Ok(Box::new(StandardStream::stdout(ColorChoice::Never)))
                } else {
                    Ok(Box::new(StandardStream::stdout(color)))
                }
            }
        }
    }
}
