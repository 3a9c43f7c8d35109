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

use crate::{FuncType, GlobalType, MemoryType, TableType};
use std::sync::Arc;

/// The read-only typing context a function body is validated against.
///
/// This is everything outside the body itself: the type section, the
/// function index space, and the declared globals, memories and tables.
/// Implementations are shared (by reference or `Arc`) between the
/// validators of all functions of a module, which may run on different
/// threads, so nothing here is ever mutated during validation.
pub trait ModuleResources {
    /// Returns the function type at the given type index, if any.
    fn func_type_at(&self, type_index: u32) -> Option<&FuncType>;

    /// Returns the type of the function at `func_index` in the function
    /// index space, if any.
    fn type_of_function(&self, func_index: u32) -> Option<&FuncType>;

    /// Returns the global variable at the given index, if any.
    fn global_at(&self, at: u32) -> Option<GlobalType>;

    /// Returns the linear memory at the given index, if any.
    fn memory_at(&self, at: u32) -> Option<MemoryType>;

    /// Returns the table at the given index, if any.
    fn table_at(&self, at: u32) -> Option<TableType>;
}

impl<T> ModuleResources for &'_ T
where
    T: ?Sized + ModuleResources,
{
    fn func_type_at(&self, type_index: u32) -> Option<&FuncType> {
        T::func_type_at(self, type_index)
    }
    fn type_of_function(&self, func_index: u32) -> Option<&FuncType> {
        T::type_of_function(self, func_index)
    }
    fn global_at(&self, at: u32) -> Option<GlobalType> {
        T::global_at(self, at)
    }
    fn memory_at(&self, at: u32) -> Option<MemoryType> {
        T::memory_at(self, at)
    }
    fn table_at(&self, at: u32) -> Option<TableType> {
        T::table_at(self, at)
    }
}

impl<T> ModuleResources for Arc<T>
where
    T: ?Sized + ModuleResources,
{
    fn func_type_at(&self, type_index: u32) -> Option<&FuncType> {
        T::func_type_at(self, type_index)
    }
    fn type_of_function(&self, func_index: u32) -> Option<&FuncType> {
        T::type_of_function(self, func_index)
    }
    fn global_at(&self, at: u32) -> Option<GlobalType> {
        T::global_at(self, at)
    }
    fn memory_at(&self, at: u32) -> Option<MemoryType> {
        T::memory_at(self, at)
    }
    fn table_at(&self, at: u32) -> Option<TableType> {
        T::table_at(self, at)
    }
}
