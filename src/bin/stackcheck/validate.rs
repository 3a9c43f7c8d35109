use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use std::mem;
use std::time::Instant;
use wasm_stackcheck::{Features, FuncValidatorAllocations, Validator};

/// Type-check every function body of a module
///
/// This subcommand reads a module in its JSON form, checks the parts of it
/// that function bodies depend on, and then type-checks every function body
/// in parallel. The process will exit with 0 and no output if the module is
/// valid, or nonzero and an error message on stderr if it is not.
///
/// Examples:
///
/// ```sh
/// # Validate `foo.json` with the default proposals.
/// $ stackcheck validate foo.json
///
/// # Validate `foo.json` with timings printed.
/// $ stackcheck validate -v foo.json
///
/// # Validate `mvp.json` without any proposals enabled.
/// $ stackcheck validate --features=-all mvp.json
/// ```
#[derive(clap::Parser)]
pub struct Opts {
    /// Comma-separated list of WebAssembly features to enable during validation.
    ///
    /// The placeholder "all" can be used to enable all features. If a "-"
    /// character is present in front of a feature it will disable that feature.
    /// For example "all,-memory64" would enable everything but memory64.
    #[clap(long, short = 'f', value_parser = parse_features)]
    features: Option<Features>,

    #[clap(flatten)]
    io: stackcheck::InputOutput,
}

impl Opts {
    pub fn general_opts(&self) -> &stackcheck::GeneralOpts {
        self.io.general_opts()
    }

    pub fn run(&self) -> Result<()> {
        let module = self.io.parse_input_module()?;
        let validator = Validator::new_with_features(self.features.unwrap_or_default());

        let start = Instant::now();
        let functions = validator
            .validate_module(&module)
            .context("invalid module structure")?;
        log::info!("module structure validated in {:?}", start.elapsed());

        // Each function only reads the module, so they are all validated in
        // parallel, with every rayon worker reusing its stack allocations.
        let start = Instant::now();
        functions.into_par_iter().try_for_each_init(
            FuncValidatorAllocations::default,
            |allocs, (to_validate, body)| -> Result<_> {
                let index = to_validate.index;
                let mut validator = to_validate
                    .into_validator(mem::take(allocs))
                    .with_context(|| format!("func {index} failed to validate"))?;
                validator
                    .validate(body)
                    .with_context(|| format!("func {} failed to validate", validator.index()))?;
                *allocs = validator.into_allocations();
                Ok(())
            },
        )?;
        log::info!("functions validated in {:?}", start.elapsed());
        Ok(())
    }
}

pub(crate) fn parse_features(arg: &str) -> Result<Features> {
    let mut ret = Features::default();

    for part in arg.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let (enable, part) = if let Some(part) = part.strip_prefix("-") {
            (false, part)
        } else {
            (true, part)
        };
        match part {
            "all" => ret.set(Features::all(), enable),

            name => {
                let (_, flag) = Features::NAMED
                    .iter()
                    .find(|(n, _)| *n == name)
                    .ok_or_else(|| {
                        anyhow!(
                            "unknown feature `{}`\nValid features: {}",
                            name,
                            Features::NAMED
                                .iter()
                                .map(|(name, _)| *name)
                                .collect::<Vec<_>>()
                                .join(", "),
                        )
                    })?;
                ret.set(*flag, enable);
            }
        }
    }

    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn features_list() {
        let features = parse_features("all,-memory64").unwrap();
        assert!(features.multi_memory());
        assert!(!features.memory64());

        let features = parse_features("-all,sign-extension").unwrap();
        assert_eq!(features, Features::SIGN_EXTENSION);

        let err = parse_features("simd").unwrap_err();
        assert!(err.to_string().starts_with("unknown feature `simd`"));
    }
}
