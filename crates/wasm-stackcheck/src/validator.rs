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
//! Validation of whole modules and of individual function bodies.

use crate::{ErrorKind, Features, Module, Result, ValidationError};

mod func;
mod operators;

pub use func::{FuncToValidate, FuncValidator, FuncValidatorAllocations};
pub use operators::{Frame, FrameKind};

/// Validator for a [`Module`].
///
/// The validator first checks the parts of the module that function bodies
/// depend on: type indices, memories and function signatures. It then hands
/// out one [`FuncToValidate`] per defined function. Those are independent of
/// each other and can be validated in any order or in parallel.
#[derive(Default, Clone)]
pub struct Validator {
    features: Features,
}

impl Validator {
    /// Creates a new [`Validator`] ready to validate a WebAssembly module
    /// with the default set of proposals enabled.
    pub fn new() -> Validator {
        Validator::default()
    }

    /// Creates a new [`Validator`] which has the specified set of wasm
    /// features activated for validation.
    ///
    /// This function is the same as [`Validator::new`] except it also allows
    /// you to customize the active wasm features in use for validation. This
    /// can allow enabling experimental proposals or also turning off
    /// on-by-default wasm proposals.
    pub fn new_with_features(features: Features) -> Validator {
        Validator { features }
    }

    /// Returns the wasm features used for this validator.
    pub fn features(&self) -> &Features {
        &self.features
    }

    /// Validates the structure of `module` and returns a validator for each
    /// defined function, paired with its body.
    ///
    /// The offset of a structural error is the index of the offending item
    /// within its list.
    pub fn validate_module<'a>(
        &self,
        module: &'a Module,
    ) -> Result<Vec<(FuncToValidate<&'a Module>, &'a crate::Function)>> {
        for (i, ty) in module.types.iter().enumerate() {
            if ty.results().len() > 1 && !self.features.multi_value() {
                return Err(ValidationError::new(
                    ErrorKind::FeatureDisabled(Features::MULTI_VALUE.name()),
                    i,
                ));
            }
        }
        if module.memories.len() > 1 && !self.features.multi_memory() {
            return Err(ValidationError::new(
                ErrorKind::FeatureDisabled(Features::MULTI_MEMORY.name()),
                1,
            ));
        }
        for (i, memory) in module.memories.iter().enumerate() {
            if memory.memory64 && !self.features.memory64() {
                return Err(ValidationError::new(
                    ErrorKind::FeatureDisabled(Features::MEMORY64.name()),
                    i,
                ));
            }
        }
        let num_types = module.types.len() as u32;
        for (i, ty) in module.imported_functions.iter().enumerate() {
            if *ty >= num_types {
                return Err(ValidationError::new(ErrorKind::UnknownType(*ty), i));
            }
        }

        let imported = module.num_imported_functions();
        let mut functions = Vec::with_capacity(module.functions.len());
        for (i, func) in module.functions.iter().enumerate() {
            if func.ty >= num_types {
                return Err(ValidationError::new(ErrorKind::UnknownType(func.ty), i));
            }
            let to_validate = FuncToValidate {
                resources: module,
                index: imported + i as u32,
                ty: func.ty,
                features: self.features,
            };
            functions.push((to_validate, func));
        }
        log::debug!(
            "module structure validated: {} types, {} functions to validate",
            module.types.len(),
            functions.len()
        );
        Ok(functions)
    }

    /// Validates an entire module with this validator, one function after
    /// another.
    pub fn validate_all(&self, module: &Module) -> Result<()> {
        let mut allocs = FuncValidatorAllocations::default();
        for (to_validate, body) in self.validate_module(module)? {
            let mut validator = to_validate.into_validator(allocs)?;
            validator.validate(body)?;
            allocs = validator.into_allocations();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FuncType, Function, MemoryType, Operator, ValType};

    fn module() -> Module {
        Module {
            types: vec![
                FuncType::new([], [ValType::I32]),
                FuncType::new([ValType::I32], [ValType::I32, ValType::I32]),
            ],
            imported_functions: vec![1],
            functions: vec![Function {
                ty: 0,
                locals: Vec::new(),
                body: vec![Operator::I32Const { value: 3 }, Operator::End],
            }],
            ..Module::default()
        }
    }

    #[test]
    fn function_indices_follow_imports() {
        let module = module();
        let funcs = Validator::new().validate_module(&module).unwrap();
        assert_eq!(funcs.len(), 1);
        assert_eq!(funcs[0].0.index, 1);
        assert_eq!(funcs[0].0.ty, 0);
        Validator::new().validate_all(&module).unwrap();
    }

    #[test]
    fn multi_value_signatures_need_feature() {
        let module = module();
        let validator = Validator::new_with_features(Features::default() - Features::MULTI_VALUE);
        let err = validator.validate_module(&module).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::FeatureDisabled("multi-value"));
        assert_eq!(err.offset(), 1);
    }

    #[test]
    fn memories_need_features() {
        let mut module = module();
        module.memories.push(MemoryType {
            memory64: true,
            ..MemoryType::default()
        });
        let err = Validator::new().validate_module(&module).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::FeatureDisabled("memory64"));
        Validator::new_with_features(Features::default() | Features::MEMORY64)
            .validate_module(&module)
            .unwrap();

        module.memories.push(MemoryType::default());
        let err = Validator::new().validate_module(&module).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::FeatureDisabled("multi-memory"));
    }

    #[test]
    fn unknown_function_type() {
        let mut module = module();
        module.functions[0].ty = 7;
        let err = Validator::new().validate_all(&module).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnknownType(7));
    }

    #[test]
    fn first_invalid_body_fails() {
        let mut module = module();
        module.functions[0].body.insert(0, Operator::F32Neg);
        let err = Validator::new().validate_all(&module).unwrap_err();
        assert_eq!(
            err.to_string(),
            "type mismatch: expected f32 but nothing on stack (at offset 0x0)"
        );
    }
}
