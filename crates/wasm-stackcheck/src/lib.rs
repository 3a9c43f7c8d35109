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
//! A single-pass type checker for WebAssembly function bodies.
//!
//! This crate checks that a function's operators are well typed: every
//! operator finds the operands it needs on the operand stack, structured
//! control (`block`, `loop`, `if`/`else`, `end`) is properly nested, and
//! branches carry the values their target labels expect. It implements the
//! validation algorithm from the appendix of the WebAssembly specification.
//!
//! Function bodies are handed over already decoded, as [`Operator`]s, along
//! with a typing context implementing [`ModuleResources`]. The [`Module`]
//! type is one such context and, with the `serde` feature, can be loaded
//! from any serde format.
//!
//! ```
//! use wasm_stackcheck::{FuncType, Function, Module, Operator, ValType, Validator};
//!
//! let module = Module {
//!     types: vec![FuncType::new([ValType::I32], [ValType::I32])],
//!     functions: vec![Function {
//!         ty: 0,
//!         locals: Vec::new(),
//!         body: vec![
//!             Operator::LocalGet { local_index: 0 },
//!             Operator::I32Const { value: 1 },
//!             Operator::I32Add,
//!             Operator::End,
//!         ],
//!     }],
//!     ..Module::default()
//! };
//! Validator::new().validate_all(&module)?;
//! # Ok::<(), wasm_stackcheck::ValidationError>(())
//! ```

#![deny(missing_docs)]

pub use crate::error::*;
pub use crate::features::*;
pub use crate::module::*;
pub use crate::module_resources::*;
pub use crate::operators::*;
pub use crate::primitives::*;
pub use crate::validator::*;

mod error;
mod features;
pub mod limits;
mod module;
mod module_resources;
mod operators;
mod primitives;
mod validator;
