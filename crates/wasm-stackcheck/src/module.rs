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
use crate::{
    FuncType, GlobalType, MemoryType, ModuleResources, Operator, TableType, ValType,
};

/// An in-memory WebAssembly module, reduced to what function-body
/// validation needs.
///
/// The function index space starts with the imported functions followed by
/// the defined `functions`, as in a binary module.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde_derive::Serialize, serde_derive::Deserialize),
    serde(default)
)]
pub struct Module {
    /// The type section.
    pub types: Vec<FuncType>,
    /// The type index of every imported function.
    pub imported_functions: Vec<u32>,
    /// The functions defined by this module, with their bodies.
    pub functions: Vec<Function>,
    /// Global variables, imported and defined.
    pub globals: Vec<GlobalType>,
    /// Linear memories, imported and defined.
    pub memories: Vec<MemoryType>,
    /// Tables, imported and defined.
    pub tables: Vec<TableType>,
}

/// A function defined in a [`Module`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde_derive::Serialize, serde_derive::Deserialize)
)]
pub struct Function {
    /// Index of this function's type in [`Module::types`].
    pub ty: u32,
    /// Declared locals as `(count, type)` runs, after the parameters.
    #[cfg_attr(feature = "serde", serde(default))]
    pub locals: Vec<(u32, ValType)>,
    /// The body, including its final `end`.
    pub body: Vec<Operator>,
}

impl Module {
    /// Returns the number of imported functions, which is also the index of
    /// the first defined function.
    pub fn num_imported_functions(&self) -> u32 {
        self.imported_functions.len() as u32
    }

    /// Returns the type index of the function at `func_index`.
    pub fn type_index_of_function(&self, func_index: u32) -> Option<u32> {
        let imported = self.num_imported_functions();
        if func_index < imported {
            self.imported_functions.get(func_index as usize).copied()
        } else {
            self.functions
                .get((func_index - imported) as usize)
                .map(|f| f.ty)
        }
    }
}

impl ModuleResources for Module {
    fn func_type_at(&self, type_index: u32) -> Option<&FuncType> {
        self.types.get(type_index as usize)
    }

    fn type_of_function(&self, func_index: u32) -> Option<&FuncType> {
        self.func_type_at(self.type_index_of_function(func_index)?)
    }

    fn global_at(&self, at: u32) -> Option<GlobalType> {
        self.globals.get(at as usize).copied()
    }

    fn memory_at(&self, at: u32) -> Option<MemoryType> {
        self.memories.get(at as usize).copied()
    }

    fn table_at(&self, at: u32) -> Option<TableType> {
        self.tables.get(at as usize).copied()
    }
}
