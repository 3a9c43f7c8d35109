use anyhow::Result;
use clap::Parser;
use std::io;
use std::process::ExitCode;

macro_rules! subcommands {
    ($(
        $(#[$attr:meta])*
        ($name:ident, $string:tt)
    )*) => {
        $(
            mod $name;
        )*

        #[derive(Parser)]
        #[clap(version)]
        #[allow(non_camel_case_types)]
        enum Stackcheck {
            $(
                $(#[$attr])*
                #[command(name = $string)]
                $name($name::Opts),
            )*
        }

        impl Stackcheck {
            fn general_opts(&self) -> &stackcheck::GeneralOpts {
                match self {
                    $(
                        Self::$name(opts) => opts.general_opts(),
                    )*
                }
            }

            fn run(self) -> Result<()> {
                match self {
                    $(
                        Self::$name(opts) => opts.run(),
                    )*
                }
            }
        }
    }
}

subcommands! {
    (validate, "validate")
    (dump, "dump")
}

fn main() -> ExitCode {
    let args = <Stackcheck as Parser>::parse();
    args.general_opts().init_logger();
    let err = match args.run() {
        Ok(()) => return ExitCode::SUCCESS,
        Err(e) => e,
    };
    // If an error happened and it's connected to something like `EPIPE` then
    // don't print out an error and instead just silently exit with a failure.
    // This prevents stray panic messages when the stdout pipe is closed, for
    // example.
    if let Some(io) = err.downcast_ref::<io::Error>() {
        if io.kind() == io::ErrorKind::BrokenPipe {
            return ExitCode::FAILURE;
        }
    }
    eprintln!("Error: {err:?}");
    ExitCode::FAILURE
}

#[test]
fn verify_cli() {
    use clap::CommandFactory;
    Stackcheck::command().debug_assert()
}
