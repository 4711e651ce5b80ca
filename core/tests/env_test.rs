mod common;

use common::*;
use serde_json::{json, Value};
use vm_env::{names, ElementType, EnvError, OverlapPolicy, ParamWriter};

#[test]
fn allocation_records_descriptors() {
    init_logger();
    let mut machine = MachineBuilder::new().build();
    let a = machine.call(names::MALLOC, &[24]).unwrap();
    let b = machine.call(names::CALLOC, &[3, 4]).unwrap();
    assert_eq!(b, a + 24);
    let heap = machine.env.heap();
    assert_eq!(heap.region(a).unwrap().byte_length, 24);
    assert_eq!(heap.region(b).unwrap().byte_length, 12);
    assert_eq!(heap.region(b).unwrap().element_type, ElementType::Unknown);
    assert_eq!(
        machine.call(names::MALLOC, &[0]),
        Err(EnvError::InvalidSize(0))
    );
    assert_eq!(
        machine.call(names::MALLOC, &[(-1i64) as u64]),
        Err(EnvError::InvalidSize(-1))
    );
}

#[test]
fn array_len_of_typed_and_unknown_addresses() {
    let mut machine = MachineBuilder::new().build();
    let ints = machine
        .env
        .heap_mut()
        .allocate(16, ElementType::Int32)
        .unwrap();
    assert_eq!(machine.call(names::ARRAY_LEN, &[ints]), Ok(4));
    assert_eq!(machine.call(names::ARRAY_LEN, &[4096]), Ok(0));
}

#[test]
fn memcpy_round_trip() {
    let mut machine = MachineBuilder::new().build();
    let src = machine.call(names::MALLOC, &[6]).unwrap();
    let dest = machine.call(names::MALLOC, &[6]).unwrap();
    machine.env.heap_mut().write(src, b"abcdef").unwrap();
    let before = machine.env.heap().read(src, 6).unwrap().to_vec();
    assert_eq!(machine.call(names::MEMCPY, &[dest, src, 6]), Ok(1));
    assert_eq!(machine.env.heap().read(dest, 6).unwrap(), before.as_slice());
    machine.call_void(names::MEMCPY, &[src, dest, 3]).unwrap();
}

#[test]
fn memcpy_overlap_is_rejected_in_both_directions_by_default() {
    let mut machine = MachineBuilder::new().build();
    machine.call(names::MALLOC, &[16]).unwrap();
    assert_eq!(
        machine.call(names::MEMCPY, &[0, 2, 5]),
        Err(EnvError::OverlapViolation {
            dest: 0,
            src: 2,
            length: 5
        })
    );
    assert_eq!(
        machine.call(names::MEMCPY, &[2, 0, 5]),
        Err(EnvError::OverlapViolation {
            dest: 2,
            src: 0,
            length: 5
        })
    );
}

#[test]
fn memcpy_forward_policy_allows_backward_overlap() {
    let mut machine = MachineBuilder::new()
        .with_overlap(OverlapPolicy::Forward)
        .build();
    machine.call(names::MALLOC, &[16]).unwrap();
    assert!(matches!(
        machine.call(names::MEMCPY, &[0, 2, 5]),
        Err(EnvError::OverlapViolation { .. })
    ));
    assert_eq!(machine.call(names::MEMCPY, &[2, 0, 5]), Ok(1));
}

#[test]
fn strcmp_of_same_address_is_zero() {
    let mut machine = MachineBuilder::new().build();
    for address in [0, 17, u64::MAX] {
        assert_eq!(machine.call(names::STRCMP, &[address, address]), Ok(0));
    }
    let a = machine.store_str("guest");
    let b = machine.store_str("guest");
    let c = machine.store_str("host");
    assert_eq!(machine.call(names::STRCMP, &[a, b]), Ok(0));
    assert_eq!(machine.call(names::STRCMP, &[a, c]), Ok(1));
}

#[test]
fn read_param_sequence() {
    let mut machine = MachineBuilder::new().build();
    let text = "z".repeat(130);
    let stream = ParamWriter::new()
        .write_u32(11)
        .write_str(&text)
        .write_u64(1 << 33)
        .into_bytes();
    assert_eq!(stream[4], 0xfd);
    let address = machine
        .env
        .heap_mut()
        .store_bytes(&stream, ElementType::Unknown)
        .unwrap();
    assert_eq!(machine.call(names::READ_INT32_PARAM, &[address]), Ok(11));
    let string = machine.call(names::READ_STRING_PARAM, &[address]).unwrap();
    assert_eq!(machine.c_str(string), text);
    assert_eq!(
        machine.env.param_cursor().position(address),
        4 + 3 + 130 + 1
    );
    assert_eq!(machine.call(names::READ_INT64_PARAM, &[address]), Ok(1 << 33));
    assert!(matches!(
        machine.call(names::READ_INT32_PARAM, &[address]),
        Err(EnvError::OutOfBounds { .. })
    ));
}

#[test]
fn new_stream_address_restarts_cursor() {
    let mut machine = MachineBuilder::new().build();
    let first = ParamWriter::new().write_u32(1).write_u32(2).into_bytes();
    let second = ParamWriter::new().write_u32(3).into_bytes();
    let first = machine
        .env
        .heap_mut()
        .store_bytes(&first, ElementType::Unknown)
        .unwrap();
    let second = machine
        .env
        .heap_mut()
        .store_bytes(&second, ElementType::Unknown)
        .unwrap();
    assert_eq!(machine.call(names::READ_INT32_PARAM, &[first]), Ok(1));
    assert_eq!(machine.call(names::READ_INT32_PARAM, &[second]), Ok(3));
    assert_eq!(machine.call(names::READ_INT32_PARAM, &[first]), Ok(1));
    assert_eq!(machine.call(names::READ_INT32_PARAM, &[first]), Ok(2));
}

#[test]
fn json_marshal_then_unmarshal_int_array() {
    let mut machine = MachineBuilder::new().build();
    let array = machine.env.heap_mut().store_i32s(&[1, 2, 3]).unwrap();
    let tag = machine.store_str("int_array");
    let result = machine.call(names::JSON_MARSHAL, &[array, tag]).unwrap();
    let descriptor: Value = serde_json::from_str(&machine.c_str(result)).unwrap();
    assert_eq!(descriptor, json!({"type": "int_array", "val": "1,2,3"}));

    let schema = machine.store_str(&json!({ "params": [descriptor] }).to_string());
    let dest = machine.call(names::MALLOC, &[4]).unwrap();
    machine
        .call_void(names::JSON_UNMARSHAL, &[dest, 4, schema])
        .unwrap();
    let heap = machine.env.heap();
    let pointer = u32::from_le_bytes(heap.read(dest, 4).unwrap().try_into().unwrap()) as u64;
    let mut expected = vec![];
    for value in [1u32, 2, 3] {
        expected.extend_from_slice(&value.to_le_bytes());
    }
    assert_eq!(heap.read(pointer, 12).unwrap(), expected.as_slice());
    assert_eq!(heap.region(pointer).unwrap().element_count(), 3);
}

#[test]
fn misspelled_and_aliased_marshal_names_agree() {
    let mut machine = MachineBuilder::new().build();
    let tag = machine.store_str("int64");
    let first = machine.call(names::JSON_MARSHAL, &[99, tag]).unwrap();
    let second = machine.call(names::JSON_MARSHAL_ALIAS, &[99, tag]).unwrap();
    assert_eq!(machine.c_str(first), machine.c_str(second));
    assert_eq!(machine.c_str(first), r#"{"type":"int64","val":"99"}"#);
}

#[test]
fn malloc_memcpy_marshal_end_to_end() {
    init_logger();
    let mut machine = MachineBuilder::new().build();
    let a = machine.call(names::MALLOC, &[10]).unwrap();
    assert_eq!(machine.call(names::ARRAY_LEN, &[a]), Ok(10));
    let source = machine
        .env
        .heap_mut()
        .store_bytes(b"0123456789", ElementType::Int8)
        .unwrap();
    assert_eq!(machine.call(names::MEMCPY, &[a, source, 10]), Ok(1));
    let tag = machine.store_str("string");
    let result = machine.call(names::JSON_MARSHAL, &[a, tag]).unwrap();
    let descriptor: Value = serde_json::from_str(&machine.c_str(result)).unwrap();
    assert_eq!(descriptor, json!({"type": "string", "val": "0123456789"}));
}

#[test]
fn raw_unmarshal_passthrough() {
    let mut machine = MachineBuilder::new().build();
    let dest = machine.call(names::MALLOC, &[4]).unwrap();
    let raw = machine
        .env
        .heap_mut()
        .store_bytes(&[4, 3, 2, 1], ElementType::Int8)
        .unwrap();
    machine
        .call_void(names::RAW_UNMARSHAL, &[dest, 4, raw])
        .unwrap();
    assert_eq!(machine.env.heap().read(dest, 4).unwrap(), &[4, 3, 2, 1]);
}

#[test]
fn read_message_from_host() {
    let mut machine = MachineBuilder::new().with_message(b"{\"op\":1}").build();
    let buffer = machine.call(names::MALLOC, &[8]).unwrap();
    assert_eq!(machine.call(names::READ_MESSAGE, &[buffer, 8]), Ok(8));
    assert_eq!(machine.c_str(buffer), "{\"op\":1}");
    assert_eq!(machine.call(names::ARRAY_LEN, &[buffer]), Ok(8));
}

#[test]
fn message_inside_allocation_keeps_enclosing_region_readable() {
    let mut machine = MachineBuilder::new().with_message(b"xy").build();
    let buffer = machine.call(names::MALLOC, &[16]).unwrap();
    machine.env.heap_mut().write(buffer + 8, b"abcd").unwrap();
    assert_eq!(machine.call(names::READ_MESSAGE, &[buffer + 4, 2]), Ok(2));
    assert_eq!(machine.call(names::ARRAY_LEN, &[buffer]), Ok(16));
    let tag = machine.store_str("string");
    let result = machine.call(names::JSON_MARSHAL, &[buffer + 8, tag]).unwrap();
    assert_eq!(machine.c_str(result), r#"{"type":"string","val":"abcd"}"#);
}

#[test]
fn calloc_overflow_is_heap_exhaustion() {
    let mut machine = MachineBuilder::new().build();
    assert!(matches!(
        machine.call(names::CALLOC, &[u64::MAX, u64::MAX]),
        Err(EnvError::HeapExhausted { .. })
    ));
    assert!(machine.env.heap().is_empty());
}

#[test]
fn reserved_area_and_limit() {
    let mut machine = MachineBuilder::new()
        .with_reserved(64)
        .with_limit(96)
        .build();
    assert_eq!(machine.call(names::MALLOC, &[32]), Ok(64));
    assert!(matches!(
        machine.call(names::MALLOC, &[1]),
        Err(EnvError::HeapExhausted { .. })
    ));
}

#[test]
fn unknown_import_is_fatal() {
    let mut machine = MachineBuilder::new().build();
    assert_eq!(
        machine.call("free", &[0]),
        Err(EnvError::UnknownFunction("free".into()))
    );
    assert_eq!(machine.stack.pc, 0);
}

#[test]
fn continuation_is_restored_after_each_call() {
    let mut machine = MachineBuilder::new().build();
    machine.call(names::MALLOC, &[1]).unwrap();
    machine.call(names::MALLOC, &[1]).unwrap();
    assert_eq!(machine.stack.pc, 2);
}
