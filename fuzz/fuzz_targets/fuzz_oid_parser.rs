#![no_main]

use libfuzzer_sys::fuzz_target;

use basic_snmp::oid::Oid;

fuzz_target!(|data: &[u8]| {
    let _ = Oid::from_ber(data);

    if let Ok(s) = std::str::from_utf8(data)
        && let Ok(oid) = Oid::parse(s)
        && oid.validate().is_ok()
    {
        let _ = Oid::from_ber(&oid.to_ber());
    }
});
