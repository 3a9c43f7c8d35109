use anyhow::{Context, Result};
use std::io::Write;
use termcolor::{Color, ColorSpec, WriteColor};
use wasm_stackcheck::*;

/// Debugging utility to trace the type stacks through function bodies.
///
/// Every operator of every function is printed, nested by its control
/// depth, followed by the types on the operand stack after it has been
/// validated. Operators in unreachable code are marked. Printing stops at
/// the first operator that fails to validate.
#[derive(clap::Parser)]
pub struct Opts {
    /// Comma-separated list of WebAssembly features to enable during validation.
    ///
    /// See `stackcheck validate --help` for the syntax.
    #[clap(long, short = 'f', value_parser = crate::validate::parse_features)]
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
        let functions = validator
            .validate_module(&module)
            .context("invalid module structure")?;

        let mut dump = Dump {
            dst: self.io.output_writer()?,
        };
        let mut allocs = FuncValidatorAllocations::default();
        for (to_validate, body) in functions {
            let index = to_validate.index;
            let ty = to_validate.ty;
            let mut validator = to_validate
                .into_validator(allocs)
                .with_context(|| format!("func {index} failed to validate"))?;
            dump.function(&mut validator, ty, body)
                .with_context(|| format!("func {index} failed to validate"))?;
            allocs = validator.into_allocations();
        }
        dump.dst.flush()?;
        Ok(())
    }
}

struct Dump {
    dst: Box<dyn WriteColor>,
}

impl Dump {
    fn function(
        &mut self,
        validator: &mut FuncValidator<&Module>,
        ty: u32,
        func: &Function,
    ) -> Result<()> {
        let index = validator.index();
        match validator.resources().func_type_at(ty) {
            Some(sig) => writeln!(self.dst, "func {index} (type {ty}) {sig}")?,
            None => writeln!(self.dst, "func {index} (type {ty})")?,
        }
        for &(count, ty) in func.locals.iter() {
            validator.define_locals(0, count, ty)?;
        }
        if validator.len_locals() > 0 {
            write!(self.dst, "  locals:")?;
            for i in 0..validator.len_locals() {
                if let Some(ty) = validator.get_local_type(i) {
                    write!(self.dst, " {ty}")?;
                }
            }
            writeln!(self.dst)?;
        }

        for (offset, op) in func.body.iter().enumerate() {
            // `else` and `end` print at the depth of the frame they close.
            let depth = match op {
                Operator::Else | Operator::End => {
                    validator.control_stack_height().saturating_sub(2)
                }
                _ => validator.control_stack_height().saturating_sub(1),
            };
            let result = validator.op(offset, op);
            write!(self.dst, "{offset:>6} | ")?;
            for _ in 0..depth {
                write!(self.dst, "  ")?;
            }
            write!(self.dst, "{op}")?;
            if result.is_err() {
                writeln!(self.dst)?;
                result?;
            }
            self.stack(validator)?;
        }
        validator.finish(func.body.len())?;
        Ok(())
    }

    fn stack(&mut self, validator: &FuncValidator<&Module>) -> Result<()> {
        // Operands of unknown type are counted at their frame's height
        // rather than stored. They print as `?`.
        let frames = (0..validator.control_stack_height() as usize)
            .rev()
            .filter_map(|depth| validator.get_control_frame(depth))
            .map(|frame| (frame.height, frame.unknown_operands))
            .collect::<Vec<_>>();
        let operands = validator.operands();
        let mut items = Vec::new();
        for i in 0..=operands.len() {
            for &(height, unknown) in frames.iter() {
                if height == i {
                    items.extend(std::iter::repeat("?".to_string()).take(unknown));
                }
            }
            if let Some(ty) = operands.get(i) {
                items.push(ty.to_string());
            }
        }

        write!(self.dst, "  ;; ")?;
        self.dst.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(self.dst, "[{}]", items.join(" "))?;
        self.dst.reset()?;
        let unreachable = validator
            .get_control_frame(0)
            .map_or(false, |frame| frame.unreachable);
        if unreachable {
            self.dst.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
            write!(self.dst, " unreachable")?;
            self.dst.reset()?;
        }
        writeln!(self.dst)?;
        Ok(())
    }
}
