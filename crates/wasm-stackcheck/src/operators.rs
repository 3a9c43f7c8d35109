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

use crate::{BlockType, BrTable, Features, Ieee32, Ieee64, MemArg};
use std::fmt;

/// A helper macro which is the single source of truth for every operator
/// this crate understands.
///
/// Each entry lists the proposal the operator belongs to, its variant name
/// and immediates, and its textual name. The macro passed in as `$mac` is
/// invoked with the whole list, which is how [`Operator`] and its
/// introspection methods are defined below. Adding an operator here and to
/// the match in the validator is all that is needed to support it.
#[macro_export]
macro_rules! for_each_operator {
    ($mac:ident) => {
        $mac! {
            @mvp Unreachable => "unreachable"
            @mvp Nop => "nop"
            @mvp Block { blockty: $crate::BlockType } => "block"
            @mvp Loop { blockty: $crate::BlockType } => "loop"
            @mvp If { blockty: $crate::BlockType } => "if"
            @mvp Else => "else"
            @mvp End => "end"
            @mvp Br { relative_depth: u32 } => "br"
            @mvp BrIf { relative_depth: u32 } => "br_if"
            @mvp BrTable { table: $crate::BrTable } => "br_table"
            @mvp Return => "return"
            @mvp Call { function_index: u32 } => "call"
            @mvp CallIndirect { type_index: u32, table_index: u32 } => "call_indirect"
            @mvp Drop => "drop"
            @mvp Select => "select"
            @mvp LocalGet { local_index: u32 } => "local.get"
            @mvp LocalSet { local_index: u32 } => "local.set"
            @mvp LocalTee { local_index: u32 } => "local.tee"
            @mvp GlobalGet { global_index: u32 } => "global.get"
            @mvp GlobalSet { global_index: u32 } => "global.set"
            @mvp I32Load { memarg: $crate::MemArg } => "i32.load"
            @mvp I64Load { memarg: $crate::MemArg } => "i64.load"
            @mvp F32Load { memarg: $crate::MemArg } => "f32.load"
            @mvp F64Load { memarg: $crate::MemArg } => "f64.load"
            @mvp I32Load8S { memarg: $crate::MemArg } => "i32.load8_s"
            @mvp I32Load8U { memarg: $crate::MemArg } => "i32.load8_u"
            @mvp I32Load16S { memarg: $crate::MemArg } => "i32.load16_s"
            @mvp I32Load16U { memarg: $crate::MemArg } => "i32.load16_u"
            @mvp I64Load8S { memarg: $crate::MemArg } => "i64.load8_s"
            @mvp I64Load8U { memarg: $crate::MemArg } => "i64.load8_u"
            @mvp I64Load16S { memarg: $crate::MemArg } => "i64.load16_s"
            @mvp I64Load16U { memarg: $crate::MemArg } => "i64.load16_u"
            @mvp I64Load32S { memarg: $crate::MemArg } => "i64.load32_s"
            @mvp I64Load32U { memarg: $crate::MemArg } => "i64.load32_u"
            @mvp I32Store { memarg: $crate::MemArg } => "i32.store"
            @mvp I64Store { memarg: $crate::MemArg } => "i64.store"
            @mvp F32Store { memarg: $crate::MemArg } => "f32.store"
            @mvp F64Store { memarg: $crate::MemArg } => "f64.store"
            @mvp I32Store8 { memarg: $crate::MemArg } => "i32.store8"
            @mvp I32Store16 { memarg: $crate::MemArg } => "i32.store16"
            @mvp I64Store8 { memarg: $crate::MemArg } => "i64.store8"
            @mvp I64Store16 { memarg: $crate::MemArg } => "i64.store16"
            @mvp I64Store32 { memarg: $crate::MemArg } => "i64.store32"
            @mvp MemorySize { mem: u32 } => "memory.size"
            @mvp MemoryGrow { mem: u32 } => "memory.grow"
            @mvp I32Const { value: i32 } => "i32.const"
            @mvp I64Const { value: i64 } => "i64.const"
            @mvp F32Const { value: $crate::Ieee32 } => "f32.const"
            @mvp F64Const { value: $crate::Ieee64 } => "f64.const"
            @mvp I32Eqz => "i32.eqz"
            @mvp I32Eq => "i32.eq"
            @mvp I32Ne => "i32.ne"
            @mvp I32LtS => "i32.lt_s"
            @mvp I32LtU => "i32.lt_u"
            @mvp I32GtS => "i32.gt_s"
            @mvp I32GtU => "i32.gt_u"
            @mvp I32LeS => "i32.le_s"
            @mvp I32LeU => "i32.le_u"
            @mvp I32GeS => "i32.ge_s"
            @mvp I32GeU => "i32.ge_u"
            @mvp I64Eqz => "i64.eqz"
            @mvp I64Eq => "i64.eq"
            @mvp I64Ne => "i64.ne"
            @mvp I64LtS => "i64.lt_s"
            @mvp I64LtU => "i64.lt_u"
            @mvp I64GtS => "i64.gt_s"
            @mvp I64GtU => "i64.gt_u"
            @mvp I64LeS => "i64.le_s"
            @mvp I64LeU => "i64.le_u"
            @mvp I64GeS => "i64.ge_s"
            @mvp I64GeU => "i64.ge_u"
            @mvp F32Eq => "f32.eq"
            @mvp F32Ne => "f32.ne"
            @mvp F32Lt => "f32.lt"
            @mvp F32Gt => "f32.gt"
            @mvp F32Le => "f32.le"
            @mvp F32Ge => "f32.ge"
            @mvp F64Eq => "f64.eq"
            @mvp F64Ne => "f64.ne"
            @mvp F64Lt => "f64.lt"
            @mvp F64Gt => "f64.gt"
            @mvp F64Le => "f64.le"
            @mvp F64Ge => "f64.ge"
            @mvp I32Clz => "i32.clz"
            @mvp I32Ctz => "i32.ctz"
            @mvp I32Popcnt => "i32.popcnt"
            @mvp I32Add => "i32.add"
            @mvp I32Sub => "i32.sub"
            @mvp I32Mul => "i32.mul"
            @mvp I32DivS => "i32.div_s"
            @mvp I32DivU => "i32.div_u"
            @mvp I32RemS => "i32.rem_s"
            @mvp I32RemU => "i32.rem_u"
            @mvp I32And => "i32.and"
            @mvp I32Or => "i32.or"
            @mvp I32Xor => "i32.xor"
            @mvp I32Shl => "i32.shl"
            @mvp I32ShrS => "i32.shr_s"
            @mvp I32ShrU => "i32.shr_u"
            @mvp I32Rotl => "i32.rotl"
            @mvp I32Rotr => "i32.rotr"
            @mvp I64Clz => "i64.clz"
            @mvp I64Ctz => "i64.ctz"
            @mvp I64Popcnt => "i64.popcnt"
            @mvp I64Add => "i64.add"
            @mvp I64Sub => "i64.sub"
            @mvp I64Mul => "i64.mul"
            @mvp I64DivS => "i64.div_s"
            @mvp I64DivU => "i64.div_u"
            @mvp I64RemS => "i64.rem_s"
            @mvp I64RemU => "i64.rem_u"
            @mvp I64And => "i64.and"
            @mvp I64Or => "i64.or"
            @mvp I64Xor => "i64.xor"
            @mvp I64Shl => "i64.shl"
            @mvp I64ShrS => "i64.shr_s"
            @mvp I64ShrU => "i64.shr_u"
            @mvp I64Rotl => "i64.rotl"
            @mvp I64Rotr => "i64.rotr"
            @mvp F32Abs => "f32.abs"
            @mvp F32Neg => "f32.neg"
            @mvp F32Ceil => "f32.ceil"
            @mvp F32Floor => "f32.floor"
            @mvp F32Trunc => "f32.trunc"
            @mvp F32Nearest => "f32.nearest"
            @mvp F32Sqrt => "f32.sqrt"
            @mvp F32Add => "f32.add"
            @mvp F32Sub => "f32.sub"
            @mvp F32Mul => "f32.mul"
            @mvp F32Div => "f32.div"
            @mvp F32Min => "f32.min"
            @mvp F32Max => "f32.max"
            @mvp F32Copysign => "f32.copysign"
            @mvp F64Abs => "f64.abs"
            @mvp F64Neg => "f64.neg"
            @mvp F64Ceil => "f64.ceil"
            @mvp F64Floor => "f64.floor"
            @mvp F64Trunc => "f64.trunc"
            @mvp F64Nearest => "f64.nearest"
            @mvp F64Sqrt => "f64.sqrt"
            @mvp F64Add => "f64.add"
            @mvp F64Sub => "f64.sub"
            @mvp F64Mul => "f64.mul"
            @mvp F64Div => "f64.div"
            @mvp F64Min => "f64.min"
            @mvp F64Max => "f64.max"
            @mvp F64Copysign => "f64.copysign"
            @mvp I32WrapI64 => "i32.wrap_i64"
            @mvp I32TruncF32S => "i32.trunc_f32_s"
            @mvp I32TruncF32U => "i32.trunc_f32_u"
            @mvp I32TruncF64S => "i32.trunc_f64_s"
            @mvp I32TruncF64U => "i32.trunc_f64_u"
            @mvp I64ExtendI32S => "i64.extend_i32_s"
            @mvp I64ExtendI32U => "i64.extend_i32_u"
            @mvp I64TruncF32S => "i64.trunc_f32_s"
            @mvp I64TruncF32U => "i64.trunc_f32_u"
            @mvp I64TruncF64S => "i64.trunc_f64_s"
            @mvp I64TruncF64U => "i64.trunc_f64_u"
            @mvp F32ConvertI32S => "f32.convert_i32_s"
            @mvp F32ConvertI32U => "f32.convert_i32_u"
            @mvp F32ConvertI64S => "f32.convert_i64_s"
            @mvp F32ConvertI64U => "f32.convert_i64_u"
            @mvp F32DemoteF64 => "f32.demote_f64"
            @mvp F64ConvertI32S => "f64.convert_i32_s"
            @mvp F64ConvertI32U => "f64.convert_i32_u"
            @mvp F64ConvertI64S => "f64.convert_i64_s"
            @mvp F64ConvertI64U => "f64.convert_i64_u"
            @mvp F64PromoteF32 => "f64.promote_f32"
            @mvp I32ReinterpretF32 => "i32.reinterpret_f32"
            @mvp I64ReinterpretF64 => "i64.reinterpret_f64"
            @mvp F32ReinterpretI32 => "f32.reinterpret_i32"
            @mvp F64ReinterpretI64 => "f64.reinterpret_i64"
            @sign_extension I32Extend8S => "i32.extend8_s"
            @sign_extension I32Extend16S => "i32.extend16_s"
            @sign_extension I64Extend8S => "i64.extend8_s"
            @sign_extension I64Extend16S => "i64.extend16_s"
            @sign_extension I64Extend32S => "i64.extend32_s"
            @saturating_float_to_int I32TruncSatF32S => "i32.trunc_sat_f32_s"
            @saturating_float_to_int I32TruncSatF32U => "i32.trunc_sat_f32_u"
            @saturating_float_to_int I32TruncSatF64S => "i32.trunc_sat_f64_s"
            @saturating_float_to_int I32TruncSatF64U => "i32.trunc_sat_f64_u"
            @saturating_float_to_int I64TruncSatF32S => "i64.trunc_sat_f32_s"
            @saturating_float_to_int I64TruncSatF32U => "i64.trunc_sat_f32_u"
            @saturating_float_to_int I64TruncSatF64S => "i64.trunc_sat_f64_s"
            @saturating_float_to_int I64TruncSatF64U => "i64.trunc_sat_f64_u"
        }
    };
}

macro_rules! required_feature {
    (mvp) => {
        None
    };
    (sign_extension) => {
        Some(Features::SIGN_EXTENSION)
    };
    (saturating_float_to_int) => {
        Some(Features::SATURATING_FLOAT_TO_INT)
    };
}

macro_rules! define_operator {
    ($(@$proposal:ident $op:ident $({ $($field:ident: $ty:ty),* })? => $name:literal)*) => {
        /// Instructions as defined [here], already decoded together with
        /// their immediates.
        ///
        /// With the `serde` feature the operator's textual name is used as
        /// the `"op"` tag, for example `{"op": "br_if", "relative_depth": 0}`.
        ///
        /// [here]: https://webassembly.github.io/spec/core/binary/instructions.html
        #[derive(Debug, Clone, PartialEq)]
        #[cfg_attr(
            feature = "serde",
            derive(serde_derive::Serialize, serde_derive::Deserialize),
            serde(tag = "op")
        )]
        #[allow(missing_docs)]
        pub enum Operator {
            $(
                #[cfg_attr(feature = "serde", serde(rename = $name))]
                $op $({ $($field: $ty,)* })?,
            )*
        }

        impl Operator {
            /// Returns the textual name of this operator, such as `i32.add`.
            pub fn name(&self) -> &'static str {
                match self {
                    $(
                        Operator::$op { .. } => $name,
                    )*
                }
            }

            /// Returns the proposal that must be enabled to use this
            /// operator, or `None` if it is part of the MVP.
            pub fn required_feature(&self) -> Option<Features> {
                match self {
                    $(
                        Operator::$op { .. } => required_feature!($proposal),
                    )*
                }
            }
        }

        impl fmt::Display for Operator {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(
                        Operator::$op $({ $($field),* })? => {
                            f.write_str($name)?;
                            $($(
                                $field.fmt_immediate(f)?;
                            )*)?
                            Ok(())
                        }
                    )*
                }
            }
        }
    };
}

for_each_operator!(define_operator);

/// Formatting of an immediate after its operator's name, including the
/// leading space.
trait FmtImmediate {
    fn fmt_immediate(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

macro_rules! fmt_immediate_display {
    ($($ty:ty)*) => ($(
        impl FmtImmediate for $ty {
            fn fmt_immediate(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, " {self}")
            }
        }
    )*)
}

fmt_immediate_display!(u32 i32 i64);

impl FmtImmediate for Ieee32 {
    fn fmt_immediate(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " {}", f32::from_bits(self.bits()))
    }
}

impl FmtImmediate for Ieee64 {
    fn fmt_immediate(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " {}", f64::from_bits(self.bits()))
    }
}

impl FmtImmediate for BlockType {
    fn fmt_immediate(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockType::Empty => Ok(()),
            BlockType::Type(ty) => write!(f, " (result {ty})"),
            BlockType::FuncType(idx) => write!(f, " (type {idx})"),
        }
    }
}

impl FmtImmediate for MemArg {
    fn fmt_immediate(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.memory != 0 {
            write!(f, " {}", self.memory)?;
        }
        if self.offset != 0 {
            write!(f, " offset={}", self.offset)?;
        }
        write!(f, " align={}", 1u64 << self.align.min(63))
    }
}

impl FmtImmediate for BrTable {
    fn fmt_immediate(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for target in self.targets() {
            write!(f, " {target}")?;
        }
        write!(f, " {}", self.default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValType;

    #[test]
    fn names() {
        assert_eq!(Operator::I32Add.name(), "i32.add");
        assert_eq!(Operator::I64TruncSatF64U.name(), "i64.trunc_sat_f64_u");
        assert_eq!(Operator::BrIf { relative_depth: 3 }.name(), "br_if");
        assert_eq!(
            Operator::I64Load32U {
                memarg: MemArg {
                    align: 2,
                    offset: 0,
                    memory: 0,
                }
            }
            .name(),
            "i64.load32_u"
        );
    }

    #[test]
    fn required_features() {
        assert_eq!(Operator::Select.required_feature(), None);
        assert_eq!(
            Operator::I64Extend32S.required_feature(),
            Some(Features::SIGN_EXTENSION)
        );
        assert_eq!(
            Operator::I32TruncSatF32S.required_feature(),
            Some(Features::SATURATING_FLOAT_TO_INT)
        );
    }

    #[test]
    fn display() {
        assert_eq!(Operator::Drop.to_string(), "drop");
        assert_eq!(Operator::I32Const { value: -7 }.to_string(), "i32.const -7");
        assert_eq!(
            Operator::Block {
                blockty: BlockType::Type(ValType::I32)
            }
            .to_string(),
            "block (result i32)"
        );
        assert_eq!(
            Operator::BrTable {
                table: BrTable::new([0, 2], 1)
            }
            .to_string(),
            "br_table 0 2 1"
        );
        assert_eq!(
            Operator::CallIndirect {
                type_index: 4,
                table_index: 0
            }
            .to_string(),
            "call_indirect 4 0"
        );
        assert_eq!(
            Operator::I32Store8 {
                memarg: MemArg {
                    align: 0,
                    offset: 16,
                    memory: 0,
                }
            }
            .to_string(),
            "i32.store8 offset=16 align=1"
        );
    }
}
