#[macro_use]
extern crate criterion;

use criterion::Criterion;
use wasm_stackcheck::{
    BlockType, BrTable, FuncType, Function, Module, Operator, ValType, Validator,
};

/// Builds a module with `funcs` copies of a function mixing straight-line
/// arithmetic, nested control and branches.
fn generate(funcs: usize, iterations: usize) -> Module {
    let mut body = Vec::new();
    for i in 0..iterations {
        body.push(Operator::Block {
            blockty: BlockType::Type(ValType::I32),
        });
        body.push(Operator::Loop {
            blockty: BlockType::Empty,
        });
        body.push(Operator::LocalGet { local_index: 0 });
        body.push(Operator::I32Const { value: i as i32 });
        body.push(Operator::I32Add);
        body.push(Operator::LocalTee { local_index: 0 });
        body.push(Operator::BrIf { relative_depth: 0 });
        body.push(Operator::End);
        body.push(Operator::LocalGet { local_index: 1 });
        body.push(Operator::F64Const {
            value: 1.5f64.into(),
        });
        body.push(Operator::F64Mul);
        body.push(Operator::I64TruncF64S);
        body.push(Operator::Drop);
        body.push(Operator::LocalGet { local_index: 0 });
        body.push(Operator::LocalGet { local_index: 0 });
        body.push(Operator::BrTable {
            table: BrTable::new([0, 0, 0], 0),
        });
        body.push(Operator::End);
        body.push(Operator::Drop);
    }
    body.push(Operator::LocalGet { local_index: 0 });
    body.push(Operator::End);

    let function = Function {
        ty: 0,
        locals: vec![(1, ValType::F64)],
        body,
    };
    Module {
        types: vec![FuncType::new([ValType::I32], [ValType::I32])],
        functions: vec![function; funcs],
        ..Module::default()
    }
}

fn define_benchmarks(c: &mut Criterion) {
    let module = generate(100, 1_000);
    c.bench_function("validate/generated", |b| {
        b.iter(|| {
            Validator::new().validate_all(&module).unwrap();
        })
    });
}

criterion_group!(benchmark, define_benchmarks);
criterion_main!(benchmark);
