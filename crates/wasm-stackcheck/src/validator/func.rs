/* Copyright 2026 The Stackcheck Project Developers
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use super::operators::{Frame, OperatorValidator, OperatorValidatorAllocations};
use crate::{Features, Function, ModuleResources, Operator, Result, ValType};

/// Resources necessary to perform validation of a function.
///
/// This structure is created by
/// [`Validator::validate_module`](crate::Validator::validate_module) and
/// represents everything necessary to validate a function. It can be sent
/// to another thread and turned into a [`FuncValidator`] there with
/// [`FuncToValidate::into_validator`].
#[derive(Debug)]
pub struct FuncToValidate<T> {
    /// Reusable, heap allocated resources to drive the Wasm validation.
    pub resources: T,
    /// The core Wasm function index being validated.
    pub index: u32,
    /// The core Wasm type index of the function being validated,
    /// defining the results and parameters to the function.
    pub ty: u32,
    /// The Wasm features enabled to validate the function.
    pub features: Features,
}

impl<T: ModuleResources> FuncToValidate<T> {
    /// Converts this [`FuncToValidate`] into a [`FuncValidator`] using the
    /// `allocs` provided.
    ///
    /// This method, in conjunction with [`FuncValidator::into_allocations`],
    /// provides a means to reuse allocations across validation of each
    /// individual function. Note that it is also sufficient to call this
    /// method with `Default::default()` if no prior allocations are
    /// available.
    ///
    /// # Errors
    ///
    /// Fails if the function's type index is not in the type section.
    pub fn into_validator(self, allocs: FuncValidatorAllocations) -> Result<FuncValidator<T>> {
        let FuncToValidate {
            resources,
            index,
            ty,
            features,
        } = self;
        let validator = OperatorValidator::new_func(ty, 0, features, &resources, allocs.0)?;
        Ok(FuncValidator {
            validator,
            resources,
            index,
        })
    }
}

/// Validation context for a WebAssembly function.
///
/// This is a finite state machine over the operators of one function body.
/// Each call to [`FuncValidator::op`] either applies the operator's effect
/// to the operand and control stacks or reports the first violated
/// constraint. After an error the validator should be discarded.
pub struct FuncValidator<T> {
    validator: OperatorValidator,
    resources: T,
    index: u32,
}

/// External handle to the internal allocations used during function validation.
///
/// This is created with either the `Default` implementation or with
/// [`FuncValidator::into_allocations`]. It is then passed as an argument to
/// [`FuncToValidate::into_validator`] to provide a means of reusing allocations
/// between each function.
#[derive(Default)]
pub struct FuncValidatorAllocations(OperatorValidatorAllocations);

impl<T: ModuleResources> FuncValidator<T> {
    /// Creates a new `FuncValidator`.
    ///
    /// The returned `FuncValidator` can be used to validate a function with
    /// the type `ty` specified. The `resources` indicate what the containing
    /// module has for the function to use, and the `features` configure what
    /// WebAssembly proposals are enabled for this function.
    pub fn new(index: u32, ty: u32, resources: T, features: Features) -> Result<FuncValidator<T>> {
        FuncToValidate {
            resources,
            index,
            ty,
            features,
        }
        .into_validator(Default::default())
    }

    /// Convenience function to validate an entire function's body.
    ///
    /// The function's declared locals are defined first, then every operator
    /// is validated in order, and finally [`FuncValidator::finish`] is
    /// called with the number of operators as its offset.
    pub fn validate(&mut self, func: &Function) -> Result<()> {
        for &(count, ty) in func.locals.iter() {
            self.define_locals(0, count, ty)?;
        }
        for (offset, op) in func.body.iter().enumerate() {
            self.op(offset, op)?;
        }
        self.finish(func.body.len())
    }

    /// Defines locals into this validator.
    ///
    /// Locals are numbered after the function's parameters, in the order in
    /// which they are defined.
    pub fn define_locals(&mut self, offset: usize, count: u32, ty: ValType) -> Result<()> {
        self.validator.define_locals(offset, count, ty)
    }

    /// Validates the next operator in a function.
    ///
    /// This functions is expected to be called once-per-operator in a
    /// WebAssembly function. Each operator's offset and the operator itself
    /// are passed to this function to provide more useful error messages.
    pub fn op(&mut self, offset: usize, operator: &Operator) -> Result<()> {
        self.validator.op(offset, operator, &self.resources)
    }

    /// Function that must be called after the last opcode has been processed.
    ///
    /// This will validate that the function was properly terminated. If only
    /// the function's own frame is still open it is closed here as if by a
    /// final `end`. If this function is not called then the function will not
    /// be properly validated.
    ///
    /// The `offset` provided to this function will be used as a position for an
    /// error if validation fails.
    pub fn finish(&mut self, offset: usize) -> Result<()> {
        self.validator.finish(offset, &self.resources)?;
        log::debug!("func {} validated", self.index);
        Ok(())
    }

    /// Returns the underlying module resources that this validator is using.
    pub fn resources(&self) -> &T {
        &self.resources
    }

    /// The index of the function within the module's function index space that
    /// is being validated.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Returns the number of defined local variables in the function.
    pub fn len_locals(&self) -> u32 {
        self.validator.locals.len_locals()
    }

    /// Returns the type of the local variable at the given `index` if any.
    pub fn get_local_type(&self, index: u32) -> Option<ValType> {
        self.validator.locals.get(index)
    }

    /// Get the current height of the operand stack.
    ///
    /// This returns the height of the whole operand stack for this function,
    /// not just for the current control frame. Results of unknown type left
    /// by `select` in unreachable code are not stored and not counted; see
    /// [`Frame::unknown_operands`].
    pub fn operand_stack_height(&self) -> u32 {
        self.validator.operand_stack_height() as u32
    }

    /// Returns the value type of the operand at the given `depth` from the
    /// top of the operand stack, or `None` if `depth` is out of bounds.
    ///
    /// Operands of unknown type are never stored, so every operand on the
    /// stack has a concrete type.
    ///
    /// # Note
    ///
    /// A `depth` of 0 will refer to the last operand on the stack.
    pub fn get_operand_type(&self, depth: usize) -> Option<ValType> {
        self.validator.peek_operand_at(depth)
    }

    /// Returns the whole operand stack, bottom first.
    pub fn operands(&self) -> &[ValType] {
        self.validator.operands()
    }

    /// Returns the number of frames on the control flow stack.
    ///
    /// This returns the height of the whole control stack for this function,
    /// not just for the current control frame.
    pub fn control_stack_height(&self) -> u32 {
        self.validator.control_stack_height() as u32
    }

    /// Returns a shared reference to the control flow [`Frame`] of the
    /// control flow stack at the given `depth` if any.
    ///
    /// Returns `None` if the `depth` is out of bounds.
    ///
    /// # Note
    ///
    /// A `depth` of 0 will refer to the last frame on the stack.
    pub fn get_control_frame(&self, depth: usize) -> Option<&Frame> {
        self.validator.get_frame(depth)
    }

    /// Consumes this validator and returns the underlying allocations that
    /// were used during the validation process.
    ///
    /// The returned value here can be paired with
    /// [`FuncToValidate::into_validator`] to reuse the allocations already
    /// created by this validator.
    pub fn into_allocations(self) -> FuncValidatorAllocations {
        FuncValidatorAllocations(self.validator.into_allocations())
    }
}
