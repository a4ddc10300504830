#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use basic_snmp::ber::{Decoder, tag};
use basic_snmp::value::Value;
use basic_snmp::varbind::{VarBind, decode_varbind_list_with_raw};

fuzz_target!(|data: &[u8]| {
    let bytes = Bytes::copy_from_slice(data);

    let mut decoder = Decoder::new(bytes.clone());
    let _ = decoder.read_integer();

    let mut decoder = Decoder::new(bytes.clone());
    let _ = decoder.read_unsigned(tag::application::COUNTER32);

    let mut decoder = Decoder::new(bytes.clone());
    let _ = decoder.read_octet_string();

    let mut decoder = Decoder::new(bytes.clone());
    let _ = decoder.read_oid();

    let mut decoder = Decoder::new(bytes.clone());
    let _ = decoder.read_ip_address();

    // Every value tag, including the opaque-wrapped 64-bit types
    let mut decoder = Decoder::new(bytes.clone());
    let _ = Value::decode(&mut decoder);

    let mut decoder = Decoder::new(bytes.clone());
    let _ = VarBind::decode(&mut decoder);

    let mut decoder = Decoder::new(bytes);
    let _ = decode_varbind_list_with_raw(&mut decoder, true);
});
