use wasm_stackcheck::*;

fn single_function(ty: FuncType, locals: Vec<(u32, ValType)>, body: Vec<Operator>) -> Module {
    Module {
        types: vec![ty],
        functions: vec![Function {
            ty: 0,
            locals,
            body,
        }],
        ..Module::default()
    }
}

#[test]
fn deeply_nested_blocks() {
    const N: usize = 10_000;
    let mut body = Vec::new();
    body.push(Operator::I64Const { value: 0 });
    for _ in 0..N {
        body.push(Operator::Block {
            blockty: BlockType::Type(ValType::I32),
        });
    }
    body.push(Operator::I32Const { value: 1 });
    for _ in 0..N {
        body.push(Operator::End);
    }
    body.push(Operator::Drop);
    body.push(Operator::Drop);
    body.push(Operator::End);
    let module = single_function(FuncType::default(), Vec::new(), body);
    Validator::new().validate_all(&module).unwrap();
}

#[test]
fn long_unreachable_body() {
    let mut body = vec![Operator::Unreachable; 100_000];
    body.push(Operator::F64Add);
    body.push(Operator::End);
    let module = single_function(FuncType::new([], [ValType::F64]), Vec::new(), body);
    Validator::new().validate_all(&module).unwrap();
}

#[test]
fn branch_out_of_deep_nesting() {
    const N: u32 = 1_000;
    let mut body = Vec::new();
    for _ in 0..N {
        body.push(Operator::Loop {
            blockty: BlockType::Empty,
        });
    }
    body.push(Operator::I32Const { value: 9 });
    body.push(Operator::Br { relative_depth: N });
    for _ in 0..N {
        body.push(Operator::End);
    }
    body.push(Operator::I32Const { value: 9 });
    body.push(Operator::End);
    let module = single_function(FuncType::new([], [ValType::I32]), Vec::new(), body);
    Validator::new().validate_all(&module).unwrap();

    // One level deeper than the function frame has no target.
    let module = single_function(
        FuncType::default(),
        Vec::new(),
        vec![Operator::Br { relative_depth: 1 }, Operator::End],
    );
    let err = Validator::new().validate_all(&module).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidLabel(1));
}

#[test]
fn many_locals() {
    let locals = vec![(10_000, ValType::I32); 5];
    let body = vec![
        Operator::LocalGet {
            local_index: 49_999,
        },
        Operator::Drop,
        Operator::End,
    ];
    let module = single_function(FuncType::default(), locals.clone(), body.clone());
    Validator::new().validate_all(&module).unwrap();

    let module = single_function(FuncType::new([ValType::F32], []), locals, body);
    let err = Validator::new().validate_all(&module).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::TooManyLocals);
}
