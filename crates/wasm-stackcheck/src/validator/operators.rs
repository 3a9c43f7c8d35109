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

// The validation algorithm here follows the "Validation Algorithm" appendix
// of the WebAssembly specification -
// https://webassembly.github.io/spec/core/appendix/algorithm.html.
//
// The names line up with that appendix: `push_operand`, `pop_operand`,
// `push_ctrl`, `pop_ctrl`, `label_types` and `unreachable`. Reachability is
// tracked per control frame, so leaving a frame never has to restore
// anything. Unknown operand types are never stored on the operand stack;
// instead a pop at the height of an unreachable frame yields `None`, as if
// the stack were padded with an endless supply of operands of any type.
// The only instruction that can produce an operand of unknown type is
// `select`, and it can only do so with the stack at the frame's height, so
// such results are counted on the frame rather than stored.

use crate::limits::MAX_WASM_FUNCTION_LOCALS;
use crate::{
    BlockType, BrTable, ErrorKind, Features, MemArg, ModuleResources, Operator, Result, ValType,
    ValidationError,
};

/// Create a `ValidationError` of the given kind at `offset`.
macro_rules! format_op_err {
    ($offset:expr, $kind:expr $(,)?) => {
        ValidationError::new($kind, $offset)
    };
}

/// Early return an `Err(ValidationError)` of the given kind.
macro_rules! bail_op_err {
    ($offset:expr, $kind:expr $(,)?) => {
        return Err(format_op_err!($offset, $kind))
    };
}

/// A control frame: bookkeeping for one open structured-control region.
///
/// This corresponds to `ctrl_frame` in the validation appendix of the wasm
/// spec. The block type, kind and height are fixed for the lifetime of a
/// frame, only `unreachable` changes after it has been pushed.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Indicator for what kind of instruction pushed this frame.
    pub kind: FrameKind,
    /// The type signature of this frame, represented as a singular return type
    /// or a type index pointing into the module's types.
    pub block_type: BlockType,
    /// The index, below which, this frame cannot modify the operand stack.
    pub height: usize,
    /// Whether this frame is unreachable so far.
    pub unreachable: bool,
    /// The number of operands of unknown type sitting directly at `height`,
    /// below every concrete operand of this frame.
    pub unknown_operands: usize,
}

/// The kind of construct that pushed a [`Frame`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// The implicit frame of the function body itself.
    Function,
    /// A `block` instruction.
    Block,
    /// A `loop` instruction. Branches to it target its parameters.
    Loop,
    /// The first arm of an `if` instruction.
    If,
    /// The `else` arm of an `if` instruction.
    Else,
}

/// The declared locals of a function, parameters included.
///
/// This is a "compressed" list of locals. Each entry pairs the maximum index
/// of a run of locals with their shared type, and the indices are
/// monotonically increasing, so the type of a local is found with a binary
/// search.
#[derive(Default)]
pub(crate) struct Locals {
    num_locals: u32,
    all: Vec<(u32, ValType)>,
}

impl Locals {
    /// Defines another group of `count` local variables of type `ty`.
    ///
    /// Returns `false` if the definition overflowed the maximum number of
    /// locals.
    fn define(&mut self, count: u32, ty: ValType) -> bool {
        if count == 0 {
            return true;
        }
        match self.num_locals.checked_add(count) {
            Some(n) => self.num_locals = n,
            None => return false,
        }
        if self.num_locals > (MAX_WASM_FUNCTION_LOCALS as u32) {
            return false;
        }
        self.all.push((self.num_locals - 1, ty));
        true
    }

    /// Returns the number of defined local variables.
    pub(crate) fn len_locals(&self) -> u32 {
        self.num_locals
    }

    /// Returns the type of the local variable at the given index if any.
    pub(crate) fn get(&self, idx: u32) -> Option<ValType> {
        match self.all.binary_search_by_key(&idx, |(idx, _)| *idx) {
            // If this index would be inserted at the end of the list, then the
            // index is out of bounds.
            Err(i) if i == self.all.len() => None,
            // Either the index was found exactly, or `i` is the position of
            // the least maximum index greater than `idx`, which is the run
            // that `idx` belongs to.
            Ok(i) | Err(i) => Some(self.all[i].1),
        }
    }
}

/// Reusable heap allocations of an [`OperatorValidator`].
#[derive(Default)]
pub(crate) struct OperatorValidatorAllocations {
    control: Vec<Frame>,
    operands: Vec<ValType>,
    locals: Vec<(u32, ValType)>,
}

pub(crate) struct OperatorValidator {
    pub(crate) locals: Locals,

    // The set of proposals that gate operators and block types.
    features: Features,

    // The `control` list is the list of blocks that we're currently in.
    control: Vec<Frame>,

    // The `operands` is the current type stack.
    operands: Vec<ValType>,
}

impl OperatorValidator {
    /// Creates a new operator validator which will be used to validate a
    /// function whose type is the `ty` index specified.
    ///
    /// The function's parameters become its first locals and its results
    /// are the end types of the implicit function frame.
    pub fn new_func<R>(
        ty: u32,
        offset: usize,
        features: Features,
        resources: &R,
        allocs: OperatorValidatorAllocations,
    ) -> Result<Self>
    where
        R: ModuleResources + ?Sized,
    {
        let OperatorValidatorAllocations {
            control,
            operands,
            locals,
        } = allocs;
        debug_assert!(control.is_empty());
        debug_assert!(operands.is_empty());
        debug_assert!(locals.is_empty());

        let mut ret = OperatorValidator {
            locals: Locals {
                num_locals: 0,
                all: locals,
            },
            features,
            control,
            operands,
        };
        for &param in func_type_at(resources, ty, offset)?.params() {
            // Parameters count towards the limit of locals.
            if !ret.locals.define(1, param) {
                bail_op_err!(offset, ErrorKind::TooManyLocals);
            }
        }
        ret.control.push(Frame {
            kind: FrameKind::Function,
            block_type: BlockType::FuncType(ty),
            height: 0,
            unreachable: false,
            unknown_operands: 0,
        });
        Ok(ret)
    }

    /// Declares `count` more locals of type `ty`.
    pub fn define_locals(&mut self, offset: usize, count: u32, ty: ValType) -> Result<()> {
        if !self.locals.define(count, ty) {
            bail_op_err!(offset, ErrorKind::TooManyLocals);
        }
        Ok(())
    }

    /// Returns the current number of operands of known type on the operand
    /// stack.
    pub fn operand_stack_height(&self) -> usize {
        self.operands.len()
    }

    /// Returns the type of the operand `depth` entries below the top.
    pub fn peek_operand_at(&self, depth: usize) -> Option<ValType> {
        self.operands.iter().rev().nth(depth).copied()
    }

    /// Returns the number of frames on the control stack.
    pub fn control_stack_height(&self) -> usize {
        self.control.len()
    }

    /// Returns the frame `depth` entries below the innermost one.
    pub fn get_frame(&self, depth: usize) -> Option<&Frame> {
        self.control.iter().rev().nth(depth)
    }

    /// Returns the operand stack, bottom first.
    pub fn operands(&self) -> &[ValType] {
        &self.operands
    }

    pub fn into_allocations(self) -> OperatorValidatorAllocations {
        fn clear<T>(mut tmp: Vec<T>) -> Vec<T> {
            tmp.clear();
            tmp
        }
        OperatorValidatorAllocations {
            control: clear(self.control),
            operands: clear(self.operands),
            locals: clear(self.locals.all),
        }
    }

    /// Pushes a type onto the operand stack.
    ///
    /// This is used by instructions to represent a value that is pushed to
    /// the operand stack. This always succeeds.
    fn push_operand(&mut self, ty: ValType) {
        self.operands.push(ty);
    }

    /// Pushes a list of types in order, so the last one ends up on top.
    fn push_operands(&mut self, tys: &[ValType]) {
        self.operands.extend_from_slice(tys);
    }

    /// Attempts to pop a type from the operand stack.
    ///
    /// If `expected` is `Some(T)` then the popped type must be `T`. If it is
    /// `None` then anything may be popped, which is what polymorphic
    /// instructions such as `drop` and `select` use.
    ///
    /// Popping at the height of the innermost frame is an underflow, unless
    /// that frame is unreachable. Then `None` is returned: the operand exists
    /// but its type is indeterminate, and it satisfies any `expected` type.
    /// Operands of unknown type counted on the frame are consumed first,
    /// before falling back to the endless padding.
    fn pop_operand(
        &mut self,
        offset: usize,
        expected: Option<ValType>,
    ) -> Result<Option<ValType>> {
        let control = match self.control.last_mut() {
            Some(frame) => frame,
            None => bail_op_err!(
                offset,
                ErrorKind::UnbalancedControl("control stack is empty")
            ),
        };
        let actual = if self.operands.len() == control.height {
            if control.unknown_operands > 0 {
                control.unknown_operands -= 1;
            } else if !control.unreachable {
                bail_op_err!(offset, ErrorKind::StackUnderflow { expected })
            }
            None
        } else {
            self.operands.pop()
        };
        if let (Some(actual), Some(expected)) = (actual, expected) {
            if actual != expected {
                bail_op_err!(offset, ErrorKind::TypeMismatch { expected, actual })
            }
        }
        Ok(actual)
    }

    /// Pops a stack-effect signature: the last type listed is expected on
    /// top, so the list is checked in reverse.
    fn pop_operands(&mut self, offset: usize, expected: &[ValType]) -> Result<()> {
        for &ty in expected.iter().rev() {
            self.pop_operand(offset, Some(ty))?;
        }
        Ok(())
    }

    /// Flags the current control frame as unreachable, additionally truncating
    /// the currently active operand stack.
    fn unreachable(&mut self, offset: usize) -> Result<()> {
        let control = match self.control.last_mut() {
            Some(frame) => frame,
            None => bail_op_err!(
                offset,
                ErrorKind::UnbalancedControl("control stack is empty")
            ),
        };
        control.unreachable = true;
        control.unknown_operands = 0;
        let new_height = control.height;
        self.operands.truncate(new_height);
        Ok(())
    }

    /// Pushes a new frame onto the control stack.
    ///
    /// This operation is used when entering a new block such as an if, loop,
    /// or block itself. The `kind` of block is specified which indicates how
    /// breaks interact with this block's type. Additionally the type signature
    /// of the block is specified by `ty`.
    fn push_ctrl<R>(
        &mut self,
        offset: usize,
        resources: &R,
        kind: FrameKind,
        ty: BlockType,
    ) -> Result<()>
    where
        R: ModuleResources + ?Sized,
    {
        // Push a new frame which has a snapshot of the height of the current
        // operand stack.
        self.control.push(Frame {
            kind,
            block_type: ty,
            height: self.operands.len(),
            unreachable: false,
            unknown_operands: 0,
        });
        // All of the parameters are now also available in this control frame,
        // so we push them here in order.
        self.push_operands(params(offset, ty, resources)?);
        Ok(())
    }

    /// Pops a frame from the control stack.
    ///
    /// This function is used when exiting a block and leaves a block scope.
    /// Internally this will validate that blocks have the correct result type.
    fn pop_ctrl<R>(&mut self, offset: usize, resources: &R) -> Result<Frame>
    where
        R: ModuleResources + ?Sized,
    {
        // Read the expected type and expected height of the operand stack the
        // end of the frame.
        let frame = match self.control.last() {
            Some(frame) => frame,
            None => bail_op_err!(
                offset,
                ErrorKind::UnbalancedControl("no open block to close")
            ),
        };
        let ty = frame.block_type;
        let height = frame.height;

        // Pop all the result types, in reverse order, from the operand stack.
        // These types will, possibly, be transferred to the next frame.
        self.pop_operands(offset, results(offset, ty, resources)?)?;

        // And then we can remove it, provided the operand stack has returned
        // to its original height with no operands of unknown type left.
        match self.control.pop() {
            Some(frame) if self.operands.len() == height && frame.unknown_operands == 0 => {
                Ok(frame)
            }
            Some(_) => bail_op_err!(offset, ErrorKind::StackHeightMismatch),
            None => bail_op_err!(
                offset,
                ErrorKind::UnbalancedControl("no open block to close")
            ),
        }
    }

    /// Validates a relative jump to the `depth` specified.
    ///
    /// Returns the type signature of the block that we're jumping to as well
    /// as the kind of block if the jump is valid. Otherwise returns an error.
    fn jump(&self, offset: usize, depth: u32) -> Result<(BlockType, FrameKind)> {
        match self.control.len().checked_sub(depth as usize + 1) {
            Some(i) => {
                let frame = &self.control[i];
                Ok((frame.block_type, frame.kind))
            }
            None => bail_op_err!(offset, ErrorKind::InvalidLabel(depth)),
        }
    }

    /// Validates a block type, both that it exists and that the proposals it
    /// needs are enabled.
    fn check_block_type<R>(&self, offset: usize, resources: &R, ty: BlockType) -> Result<()>
    where
        R: ModuleResources + ?Sized,
    {
        match ty {
            BlockType::Empty | BlockType::Type(_) => Ok(()),
            BlockType::FuncType(idx) => {
                let ty = func_type_at(resources, idx, offset)?;
                if (!ty.params().is_empty() || ty.results().len() > 1)
                    && !self.features.multi_value()
                {
                    bail_op_err!(
                        offset,
                        ErrorKind::FeatureDisabled(Features::MULTI_VALUE.name())
                    );
                }
                Ok(())
            }
        }
    }

    /// Validates that `memory_index` is valid in this module, and returns the
    /// type of address used to index the memory specified.
    fn check_memory_index<R>(
        &self,
        offset: usize,
        resources: &R,
        memory_index: u32,
    ) -> Result<ValType>
    where
        R: ModuleResources + ?Sized,
    {
        if memory_index > 0 && !self.features.multi_memory() {
            bail_op_err!(
                offset,
                ErrorKind::FeatureDisabled(Features::MULTI_MEMORY.name())
            );
        }
        match resources.memory_at(memory_index) {
            Some(mem) => Ok(mem.index_type()),
            None => bail_op_err!(offset, ErrorKind::UnknownMemory(memory_index)),
        }
    }

    /// Validates a `memarg` for alignment and such (also the memory it
    /// references), and returns the type of index used to address the memory.
    fn check_memarg<R>(
        &self,
        offset: usize,
        resources: &R,
        memarg: &MemArg,
        max_align: u8,
    ) -> Result<ValType>
    where
        R: ModuleResources + ?Sized,
    {
        let index_ty = self.check_memory_index(offset, resources, memarg.memory)?;
        if memarg.align > max_align {
            bail_op_err!(offset, ErrorKind::InvalidAlignment);
        }
        if index_ty == ValType::I32 && memarg.offset > u64::from(u32::MAX) {
            bail_op_err!(offset, ErrorKind::OffsetOutOfRange);
        }
        Ok(index_ty)
    }

    /// Checks a load of a `load_ty` value with natural alignment `max_align`.
    fn check_load<R>(
        &mut self,
        offset: usize,
        resources: &R,
        memarg: &MemArg,
        max_align: u8,
        load_ty: ValType,
    ) -> Result<()>
    where
        R: ModuleResources + ?Sized,
    {
        let index_ty = self.check_memarg(offset, resources, memarg, max_align)?;
        self.pop_operand(offset, Some(index_ty))?;
        self.push_operand(load_ty);
        Ok(())
    }

    /// Checks a store of a `store_ty` value with natural alignment `max_align`.
    fn check_store<R>(
        &mut self,
        offset: usize,
        resources: &R,
        memarg: &MemArg,
        max_align: u8,
        store_ty: ValType,
    ) -> Result<()>
    where
        R: ModuleResources + ?Sized,
    {
        let index_ty = self.check_memarg(offset, resources, memarg, max_align)?;
        self.pop_operand(offset, Some(store_ty))?;
        self.pop_operand(offset, Some(index_ty))?;
        Ok(())
    }

    /// Validates a `call` instruction, ensuring that the function index is
    /// in-bounds and the right types are on the stack to call the function.
    fn check_call<R>(&mut self, offset: usize, resources: &R, function_index: u32) -> Result<()>
    where
        R: ModuleResources + ?Sized,
    {
        let ty = match resources.type_of_function(function_index) {
            Some(ty) => ty,
            None => bail_op_err!(offset, ErrorKind::UnknownFunction(function_index)),
        };
        self.pop_operands(offset, ty.params())?;
        self.push_operands(ty.results());
        Ok(())
    }

    /// Validates a call to an indirect function, very similar to `check_call`.
    fn check_call_indirect<R>(
        &mut self,
        offset: usize,
        resources: &R,
        type_index: u32,
        table_index: u32,
    ) -> Result<()>
    where
        R: ModuleResources + ?Sized,
    {
        if resources.table_at(table_index).is_none() {
            bail_op_err!(offset, ErrorKind::UnknownTable(table_index));
        }
        let ty = func_type_at(resources, type_index, offset)?;
        self.pop_operand(offset, Some(ValType::I32))?;
        self.pop_operands(offset, ty.params())?;
        self.push_operands(ty.results());
        Ok(())
    }

    /// Validates a `return` instruction, popping types from the operand
    /// stack that the function needs.
    fn check_return<R>(&mut self, offset: usize, resources: &R) -> Result<()>
    where
        R: ModuleResources + ?Sized,
    {
        let ty = match self.control.first() {
            Some(frame) => frame.block_type,
            None => bail_op_err!(
                offset,
                ErrorKind::UnbalancedControl("control stack is empty")
            ),
        };
        self.pop_operands(offset, results(offset, ty, resources)?)?;
        self.unreachable(offset)
    }

    /// Validates `br_table`.
    ///
    /// Every target must agree with the default target on its label types.
    /// That only depends on the control stack, so it is checked even in
    /// unreachable code. The operands are checked afterwards, against the
    /// default target's label types.
    fn check_br_table<R>(&mut self, offset: usize, resources: &R, table: &BrTable) -> Result<()>
    where
        R: ModuleResources + ?Sized,
    {
        let (ty, kind) = self.jump(offset, table.default())?;
        let default_types = label_types(offset, ty, resources, kind)?;
        for relative_depth in table.targets() {
            let (ty, kind) = self.jump(offset, relative_depth)?;
            let tys = label_types(offset, ty, resources, kind)?;
            if tys != default_types {
                bail_op_err!(offset, ErrorKind::InconsistentBranchTargets);
            }
        }
        self.pop_operand(offset, Some(ValType::I32))?;
        self.pop_operands(offset, default_types)?;
        self.unreachable(offset)
    }

    /// Validates `select`: an `i32` condition and two operands of one type.
    fn check_select(&mut self, offset: usize) -> Result<()> {
        self.pop_operand(offset, Some(ValType::I32))?;
        let ty1 = self.pop_operand(offset, None)?;
        let ty2 = self.pop_operand(offset, ty1)?;
        match ty1.or(ty2) {
            Some(ty) => self.push_operand(ty),
            // Both operands were unknown, so the stack is at the frame's
            // height.
            None => {
                if let Some(frame) = self.control.last_mut() {
                    frame.unknown_operands += 1;
                }
            }
        }
        Ok(())
    }

    /// Checks the validity of a common test operator.
    fn check_test_op(&mut self, offset: usize, ty: ValType) -> Result<()> {
        self.pop_operand(offset, Some(ty))?;
        self.push_operand(ValType::I32);
        Ok(())
    }

    /// Checks the validity of a common comparison operator.
    fn check_cmp_op(&mut self, offset: usize, ty: ValType) -> Result<()> {
        self.pop_operand(offset, Some(ty))?;
        self.pop_operand(offset, Some(ty))?;
        self.push_operand(ValType::I32);
        Ok(())
    }

    /// Checks the validity of a common unary operator.
    fn check_unary_op(&mut self, offset: usize, ty: ValType) -> Result<()> {
        self.pop_operand(offset, Some(ty))?;
        self.push_operand(ty);
        Ok(())
    }

    /// Checks the validity of a common binary operator.
    fn check_binary_op(&mut self, offset: usize, ty: ValType) -> Result<()> {
        self.pop_operand(offset, Some(ty))?;
        self.pop_operand(offset, Some(ty))?;
        self.push_operand(ty);
        Ok(())
    }

    /// Checks the validity of a common conversion operator.
    fn check_conversion_op(&mut self, offset: usize, into: ValType, from: ValType) -> Result<()> {
        self.pop_operand(offset, Some(from))?;
        self.push_operand(into);
        Ok(())
    }

    /// Validates one operator against the current state of the stacks,
    /// updating them with its effect.
    ///
    /// This is expected to be called once per operator, in order, and stops
    /// at the first violated constraint.
    pub fn op<R>(&mut self, offset: usize, operator: &Operator, resources: &R) -> Result<()>
    where
        R: ModuleResources + ?Sized,
    {
        if self.control.is_empty() {
            bail_op_err!(
                offset,
                ErrorKind::UnbalancedControl("operators remaining after end of function")
            );
        }
        if let Some(feature) = operator.required_feature() {
            if !self.features.contains(feature) {
                bail_op_err!(offset, ErrorKind::FeatureDisabled(feature.name()));
            }
        }
        log::trace!("validating `{operator}` at offset {offset}");

        use ValType::*;
        match operator {
            Operator::Unreachable => self.unreachable(offset)?,
            Operator::Nop => {}
            Operator::Block { blockty } => {
                self.check_block_type(offset, resources, *blockty)?;
                self.pop_operands(offset, params(offset, *blockty, resources)?)?;
                self.push_ctrl(offset, resources, FrameKind::Block, *blockty)?;
            }
            Operator::Loop { blockty } => {
                self.check_block_type(offset, resources, *blockty)?;
                self.pop_operands(offset, params(offset, *blockty, resources)?)?;
                self.push_ctrl(offset, resources, FrameKind::Loop, *blockty)?;
            }
            Operator::If { blockty } => {
                self.check_block_type(offset, resources, *blockty)?;
                self.pop_operand(offset, Some(I32))?;
                self.pop_operands(offset, params(offset, *blockty, resources)?)?;
                self.push_ctrl(offset, resources, FrameKind::If, *blockty)?;
            }
            Operator::Else => {
                let frame = self.pop_ctrl(offset, resources)?;
                if frame.kind != FrameKind::If {
                    bail_op_err!(offset, ErrorKind::MalformedElse);
                }
                self.push_ctrl(offset, resources, FrameKind::Else, frame.block_type)?;
            }
            Operator::End => {
                let mut frame = self.pop_ctrl(offset, resources)?;

                // An `if` without an `else` behaves as if it had an empty
                // `else` arm, which is only valid when the block's
                // parameters are also its results.
                if frame.kind == FrameKind::If {
                    self.push_ctrl(offset, resources, FrameKind::Else, frame.block_type)?;
                    frame = self.pop_ctrl(offset, resources)?;
                }
                self.push_operands(results(offset, frame.block_type, resources)?);
            }
            Operator::Br { relative_depth } => {
                let (ty, kind) = self.jump(offset, *relative_depth)?;
                self.pop_operands(offset, label_types(offset, ty, resources, kind)?)?;
                self.unreachable(offset)?;
            }
            Operator::BrIf { relative_depth } => {
                let (ty, kind) = self.jump(offset, *relative_depth)?;
                let tys = label_types(offset, ty, resources, kind)?;
                self.pop_operand(offset, Some(I32))?;
                self.pop_operands(offset, tys)?;
                self.push_operands(tys);
            }
            Operator::BrTable { table } => self.check_br_table(offset, resources, table)?,
            Operator::Return => self.check_return(offset, resources)?,
            Operator::Call { function_index } => {
                self.check_call(offset, resources, *function_index)?
            }
            Operator::CallIndirect {
                type_index,
                table_index,
            } => self.check_call_indirect(offset, resources, *type_index, *table_index)?,

            Operator::Drop => {
                self.pop_operand(offset, None)?;
            }
            Operator::Select => self.check_select(offset)?,

            Operator::LocalGet { local_index } => {
                let ty = self.local(offset, *local_index)?;
                self.push_operand(ty);
            }
            Operator::LocalSet { local_index } => {
                let ty = self.local(offset, *local_index)?;
                self.pop_operand(offset, Some(ty))?;
            }
            Operator::LocalTee { local_index } => {
                let ty = self.local(offset, *local_index)?;
                self.pop_operand(offset, Some(ty))?;
                self.push_operand(ty);
            }
            Operator::GlobalGet { global_index } => match resources.global_at(*global_index) {
                Some(ty) => self.push_operand(ty.content_type),
                None => bail_op_err!(offset, ErrorKind::UnknownGlobal(*global_index)),
            },
            Operator::GlobalSet { global_index } => match resources.global_at(*global_index) {
                Some(ty) => {
                    if !ty.mutable {
                        bail_op_err!(offset, ErrorKind::ImmutableGlobal);
                    }
                    self.pop_operand(offset, Some(ty.content_type))?;
                }
                None => bail_op_err!(offset, ErrorKind::UnknownGlobal(*global_index)),
            },

            Operator::I32Load { memarg } => self.check_load(offset, resources, memarg, 2, I32)?,
            Operator::I64Load { memarg } => self.check_load(offset, resources, memarg, 3, I64)?,
            Operator::F32Load { memarg } => self.check_load(offset, resources, memarg, 2, F32)?,
            Operator::F64Load { memarg } => self.check_load(offset, resources, memarg, 3, F64)?,
            Operator::I32Load8S { memarg } | Operator::I32Load8U { memarg } => {
                self.check_load(offset, resources, memarg, 0, I32)?
            }
            Operator::I32Load16S { memarg } | Operator::I32Load16U { memarg } => {
                self.check_load(offset, resources, memarg, 1, I32)?
            }
            Operator::I64Load8S { memarg } | Operator::I64Load8U { memarg } => {
                self.check_load(offset, resources, memarg, 0, I64)?
            }
            Operator::I64Load16S { memarg } | Operator::I64Load16U { memarg } => {
                self.check_load(offset, resources, memarg, 1, I64)?
            }
            Operator::I64Load32S { memarg } | Operator::I64Load32U { memarg } => {
                self.check_load(offset, resources, memarg, 2, I64)?
            }
            Operator::I32Store { memarg } => self.check_store(offset, resources, memarg, 2, I32)?,
            Operator::I64Store { memarg } => self.check_store(offset, resources, memarg, 3, I64)?,
            Operator::F32Store { memarg } => self.check_store(offset, resources, memarg, 2, F32)?,
            Operator::F64Store { memarg } => self.check_store(offset, resources, memarg, 3, F64)?,
            Operator::I32Store8 { memarg } => self.check_store(offset, resources, memarg, 0, I32)?,
            Operator::I32Store16 { memarg } => {
                self.check_store(offset, resources, memarg, 1, I32)?
            }
            Operator::I64Store8 { memarg } => self.check_store(offset, resources, memarg, 0, I64)?,
            Operator::I64Store16 { memarg } => {
                self.check_store(offset, resources, memarg, 1, I64)?
            }
            Operator::I64Store32 { memarg } => {
                self.check_store(offset, resources, memarg, 2, I64)?
            }
            Operator::MemorySize { mem } => {
                let index_ty = self.check_memory_index(offset, resources, *mem)?;
                self.push_operand(index_ty);
            }
            Operator::MemoryGrow { mem } => {
                let index_ty = self.check_memory_index(offset, resources, *mem)?;
                self.pop_operand(offset, Some(index_ty))?;
                self.push_operand(index_ty);
            }

            Operator::I32Const { .. } => self.push_operand(I32),
            Operator::I64Const { .. } => self.push_operand(I64),
            Operator::F32Const { .. } => self.push_operand(F32),
            Operator::F64Const { .. } => self.push_operand(F64),

            Operator::I32Eqz => self.check_test_op(offset, I32)?,
            Operator::I32Eq
            | Operator::I32Ne
            | Operator::I32LtS
            | Operator::I32LtU
            | Operator::I32GtS
            | Operator::I32GtU
            | Operator::I32LeS
            | Operator::I32LeU
            | Operator::I32GeS
            | Operator::I32GeU => self.check_cmp_op(offset, I32)?,
            Operator::I64Eqz => self.check_test_op(offset, I64)?,
            Operator::I64Eq
            | Operator::I64Ne
            | Operator::I64LtS
            | Operator::I64LtU
            | Operator::I64GtS
            | Operator::I64GtU
            | Operator::I64LeS
            | Operator::I64LeU
            | Operator::I64GeS
            | Operator::I64GeU => self.check_cmp_op(offset, I64)?,
            Operator::F32Eq
            | Operator::F32Ne
            | Operator::F32Lt
            | Operator::F32Gt
            | Operator::F32Le
            | Operator::F32Ge => self.check_cmp_op(offset, F32)?,
            Operator::F64Eq
            | Operator::F64Ne
            | Operator::F64Lt
            | Operator::F64Gt
            | Operator::F64Le
            | Operator::F64Ge => self.check_cmp_op(offset, F64)?,

            Operator::I32Clz | Operator::I32Ctz | Operator::I32Popcnt => {
                self.check_unary_op(offset, I32)?
            }
            Operator::I32Add
            | Operator::I32Sub
            | Operator::I32Mul
            | Operator::I32DivS
            | Operator::I32DivU
            | Operator::I32RemS
            | Operator::I32RemU
            | Operator::I32And
            | Operator::I32Or
            | Operator::I32Xor
            | Operator::I32Shl
            | Operator::I32ShrS
            | Operator::I32ShrU
            | Operator::I32Rotl
            | Operator::I32Rotr => self.check_binary_op(offset, I32)?,
            Operator::I64Clz | Operator::I64Ctz | Operator::I64Popcnt => {
                self.check_unary_op(offset, I64)?
            }
            Operator::I64Add
            | Operator::I64Sub
            | Operator::I64Mul
            | Operator::I64DivS
            | Operator::I64DivU
            | Operator::I64RemS
            | Operator::I64RemU
            | Operator::I64And
            | Operator::I64Or
            | Operator::I64Xor
            | Operator::I64Shl
            | Operator::I64ShrS
            | Operator::I64ShrU
            | Operator::I64Rotl
            | Operator::I64Rotr => self.check_binary_op(offset, I64)?,
            Operator::F32Abs
            | Operator::F32Neg
            | Operator::F32Ceil
            | Operator::F32Floor
            | Operator::F32Trunc
            | Operator::F32Nearest
            | Operator::F32Sqrt => self.check_unary_op(offset, F32)?,
            Operator::F32Add
            | Operator::F32Sub
            | Operator::F32Mul
            | Operator::F32Div
            | Operator::F32Min
            | Operator::F32Max
            | Operator::F32Copysign => self.check_binary_op(offset, F32)?,
            Operator::F64Abs
            | Operator::F64Neg
            | Operator::F64Ceil
            | Operator::F64Floor
            | Operator::F64Trunc
            | Operator::F64Nearest
            | Operator::F64Sqrt => self.check_unary_op(offset, F64)?,
            Operator::F64Add
            | Operator::F64Sub
            | Operator::F64Mul
            | Operator::F64Div
            | Operator::F64Min
            | Operator::F64Max
            | Operator::F64Copysign => self.check_binary_op(offset, F64)?,

            Operator::I32WrapI64 => self.check_conversion_op(offset, I32, I64)?,
            Operator::I32TruncF32S | Operator::I32TruncF32U => {
                self.check_conversion_op(offset, I32, F32)?
            }
            Operator::I32TruncF64S | Operator::I32TruncF64U => {
                self.check_conversion_op(offset, I32, F64)?
            }
            Operator::I64ExtendI32S | Operator::I64ExtendI32U => {
                self.check_conversion_op(offset, I64, I32)?
            }
            Operator::I64TruncF32S | Operator::I64TruncF32U => {
                self.check_conversion_op(offset, I64, F32)?
            }
            Operator::I64TruncF64S | Operator::I64TruncF64U => {
                self.check_conversion_op(offset, I64, F64)?
            }
            Operator::F32ConvertI32S | Operator::F32ConvertI32U => {
                self.check_conversion_op(offset, F32, I32)?
            }
            Operator::F32ConvertI64S | Operator::F32ConvertI64U => {
                self.check_conversion_op(offset, F32, I64)?
            }
            Operator::F32DemoteF64 => self.check_conversion_op(offset, F32, F64)?,
            Operator::F64ConvertI32S | Operator::F64ConvertI32U => {
                self.check_conversion_op(offset, F64, I32)?
            }
            Operator::F64ConvertI64S | Operator::F64ConvertI64U => {
                self.check_conversion_op(offset, F64, I64)?
            }
            Operator::F64PromoteF32 => self.check_conversion_op(offset, F64, F32)?,
            Operator::I32ReinterpretF32 => self.check_conversion_op(offset, I32, F32)?,
            Operator::I64ReinterpretF64 => self.check_conversion_op(offset, I64, F64)?,
            Operator::F32ReinterpretI32 => self.check_conversion_op(offset, F32, I32)?,
            Operator::F64ReinterpretI64 => self.check_conversion_op(offset, F64, I64)?,

            Operator::I32Extend8S | Operator::I32Extend16S => self.check_unary_op(offset, I32)?,
            Operator::I64Extend8S | Operator::I64Extend16S | Operator::I64Extend32S => {
                self.check_unary_op(offset, I64)?
            }

            Operator::I32TruncSatF32S | Operator::I32TruncSatF32U => {
                self.check_conversion_op(offset, I32, F32)?
            }
            Operator::I32TruncSatF64S | Operator::I32TruncSatF64U => {
                self.check_conversion_op(offset, I32, F64)?
            }
            Operator::I64TruncSatF32S | Operator::I64TruncSatF32U => {
                self.check_conversion_op(offset, I64, F32)?
            }
            Operator::I64TruncSatF64S | Operator::I64TruncSatF64U => {
                self.check_conversion_op(offset, I64, F64)?
            }
        }
        Ok(())
    }

    /// Fetches the type for the local at `idx`, returning an error if it's out
    /// of bounds.
    fn local(&self, offset: usize, idx: u32) -> Result<ValType> {
        match self.locals.get(idx) {
            Some(ty) => Ok(ty),
            None => bail_op_err!(offset, ErrorKind::UnknownLocal(idx)),
        }
    }

    /// Validates the end of a function body.
    ///
    /// If the final `end` has already been validated there is nothing left
    /// to check. If only the implicit function frame is still open it is
    /// closed here exactly as `end` would close it. Any other open frame is
    /// an error.
    pub fn finish<R>(&mut self, offset: usize, resources: &R) -> Result<()>
    where
        R: ModuleResources + ?Sized,
    {
        match self.control.len() {
            0 => Ok(()),
            1 => {
                let frame = self.pop_ctrl(offset, resources)?;
                self.push_operands(results(offset, frame.block_type, resources)?);
                Ok(())
            }
            _ => bail_op_err!(
                offset,
                ErrorKind::UnbalancedControl(
                    "control frames remain at end of function: END opcode expected"
                )
            ),
        }
    }
}

fn func_type_at<R>(resources: &R, at: u32, offset: usize) -> Result<&crate::FuncType>
where
    R: ModuleResources + ?Sized,
{
    resources
        .func_type_at(at)
        .ok_or_else(|| format_op_err!(offset, ErrorKind::UnknownType(at)))
}

/// Returns a one-element slice holding `ty`.
fn single(ty: ValType) -> &'static [ValType] {
    match ty {
        ValType::I32 => &[ValType::I32],
        ValType::I64 => &[ValType::I64],
        ValType::F32 => &[ValType::F32],
        ValType::F64 => &[ValType::F64],
    }
}

/// The start types of a block: what it consumes on entry.
fn params<R>(offset: usize, ty: BlockType, resources: &R) -> Result<&[ValType]>
where
    R: ModuleResources + ?Sized,
{
    Ok(match ty {
        BlockType::Empty | BlockType::Type(_) => &[],
        BlockType::FuncType(t) => func_type_at(resources, t, offset)?.params(),
    })
}

/// The end types of a block: what it leaves behind on exit.
fn results<R>(offset: usize, ty: BlockType, resources: &R) -> Result<&[ValType]>
where
    R: ModuleResources + ?Sized,
{
    Ok(match ty {
        BlockType::Empty => &[],
        BlockType::Type(t) => single(t),
        BlockType::FuncType(t) => func_type_at(resources, t, offset)?.results(),
    })
}

/// The types a branch to a frame must provide. Branching to a loop
/// re-enters it, so it takes the loop's parameters; every other frame is
/// exited, so it takes the frame's results.
fn label_types<R>(
    offset: usize,
    ty: BlockType,
    resources: &R,
    kind: FrameKind,
) -> Result<&[ValType]>
where
    R: ModuleResources + ?Sized,
{
    match kind {
        FrameKind::Loop => params(offset, ty, resources),
        _ => results(offset, ty, resources),
    }
}
