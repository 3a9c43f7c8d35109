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

use std::fmt;

/// Value types as defined [here].
///
/// Only the four numeric types exist. There is deliberately no "unknown"
/// member: operands of unknown type in unreachable code are never stored,
/// see [`FuncValidator`](crate::FuncValidator).
///
/// [here]: https://webassembly.github.io/spec/core/syntax/types.html#value-types
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde_derive::Serialize, serde_derive::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ValType {
    /// The value type is i32.
    I32,
    /// The value type is i64.
    I64,
    /// The value type is f32.
    F32,
    /// The value type is f64.
    F64,
}

impl fmt::Display for ValType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValType::I32 => "i32",
            ValType::I64 => "i64",
            ValType::F32 => "f32",
            ValType::F64 => "f64",
        };
        f.write_str(s)
    }
}

/// Represents a block type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde_derive::Serialize, serde_derive::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum BlockType {
    /// The block neither consumes nor produces any values.
    Empty,
    /// The block produces a singular value of the given type ([] -> \[t]).
    Type(ValType),
    /// The block is described by a function type.
    ///
    /// The index is to a function type in the types section.
    FuncType(u32),
}

/// A function signature: the types consumed from the stack and the types
/// left on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde_derive::Serialize, serde_derive::Deserialize)
)]
pub struct FuncType {
    #[cfg_attr(feature = "serde", serde(default))]
    params: Box<[ValType]>,
    #[cfg_attr(feature = "serde", serde(default))]
    results: Box<[ValType]>,
}

impl FuncType {
    /// Creates a new [`FuncType`] from the given `params` and `results`.
    pub fn new<P, R>(params: P, results: R) -> FuncType
    where
        P: IntoIterator<Item = ValType>,
        R: IntoIterator<Item = ValType>,
    {
        FuncType {
            params: params.into_iter().collect(),
            results: results.into_iter().collect(),
        }
    }

    /// Returns a shared slice to the parameter types of the [`FuncType`].
    #[inline]
    pub fn params(&self) -> &[ValType] {
        &self.params
    }

    /// Returns a shared slice to the result types of the [`FuncType`].
    #[inline]
    pub fn results(&self) -> &[ValType] {
        &self.results
    }
}

impl fmt::Display for FuncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, ty) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{ty}")?;
        }
        f.write_str("] -> [")?;
        for (i, ty) in self.results.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{ty}")?;
        }
        f.write_str("]")
    }
}

/// The type of a global variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde_derive::Serialize, serde_derive::Deserialize)
)]
pub struct GlobalType {
    /// The global's type.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub content_type: ValType,
    /// Whether or not the global is mutable.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mutable: bool,
}

/// The type of a linear memory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde_derive::Serialize, serde_derive::Deserialize)
)]
pub struct MemoryType {
    /// Whether or not this is a 64-bit memory, using i64 as an index. If this
    /// is false it's a 32-bit memory using i32 as an index.
    #[cfg_attr(feature = "serde", serde(default))]
    pub memory64: bool,
    /// Initial size of this memory, in wasm pages.
    #[cfg_attr(feature = "serde", serde(default))]
    pub initial: u64,
    /// Optional maximum size of this memory, in wasm pages.
    #[cfg_attr(feature = "serde", serde(default))]
    pub maximum: Option<u64>,
}

impl MemoryType {
    /// Gets the index type for the memory.
    pub fn index_type(&self) -> ValType {
        if self.memory64 {
            ValType::I64
        } else {
            ValType::I32
        }
    }
}

/// The type of a table. Tables always hold function references.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde_derive::Serialize, serde_derive::Deserialize)
)]
pub struct TableType {
    /// Initial size of this table, in elements.
    #[cfg_attr(feature = "serde", serde(default))]
    pub initial: u32,
    /// Optional maximum size of the table, in elements.
    #[cfg_attr(feature = "serde", serde(default))]
    pub maximum: Option<u32>,
}

/// Represents a memory immediate in a WebAssembly memory instruction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde_derive::Serialize, serde_derive::Deserialize)
)]
pub struct MemArg {
    /// Alignment, stored as `n` where the actual alignment is `2^n`
    pub align: u8,
    /// A fixed byte-offset that this memory immediate specifies.
    ///
    /// Offsets for 32-bit memories must fit in a `u32` while 64-bit memories
    /// can use the full 64 bits.
    #[cfg_attr(feature = "serde", serde(default))]
    pub offset: u64,
    /// The index of the memory this immediate points to.
    ///
    /// This is always zero unless multi-memory is enabled.
    #[cfg_attr(feature = "serde", serde(default))]
    pub memory: u32,
}

/// A `br_table` immediate: the explicit targets and the default target,
/// all as relative label depths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde_derive::Serialize, serde_derive::Deserialize)
)]
pub struct BrTable {
    #[cfg_attr(feature = "serde", serde(default))]
    targets: Vec<u32>,
    default: u32,
}

impl BrTable {
    /// Creates a new `br_table` immediate.
    pub fn new(targets: impl IntoIterator<Item = u32>, default: u32) -> BrTable {
        BrTable {
            targets: targets.into_iter().collect(),
            default,
        }
    }

    /// Returns the default target of this `br_table`.
    pub fn default(&self) -> u32 {
        self.default
    }

    /// Returns the explicit targets of this `br_table`, in order.
    pub fn targets(&self) -> impl ExactSizeIterator<Item = u32> + '_ {
        self.targets.iter().copied()
    }
}

/// An IEEE binary32 immediate floating point value, represented as a u32
/// containing the bit pattern.
///
/// All bit patterns are allowed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde_derive::Serialize, serde_derive::Deserialize)
)]
pub struct Ieee32(pub u32);

impl Ieee32 {
    /// Gets the underlying bits of the 32-bit float.
    pub fn bits(self) -> u32 {
        self.0
    }
}

impl From<f32> for Ieee32 {
    fn from(value: f32) -> Ieee32 {
        Ieee32(value.to_bits())
    }
}

/// An IEEE binary64 immediate floating point value, represented as a u64
/// containing the bit pattern.
///
/// All bit patterns are allowed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde_derive::Serialize, serde_derive::Deserialize)
)]
pub struct Ieee64(pub u64);

impl Ieee64 {
    /// Gets the underlying bits of the 64-bit float.
    pub fn bits(self) -> u64 {
        self.0
    }
}

impl From<f64> for Ieee64 {
    fn from(value: f64) -> Ieee64 {
        Ieee64(value.to_bits())
    }
}
