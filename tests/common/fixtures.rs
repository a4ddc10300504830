//! Common test fixtures and constants.

use basic_snmp::table::{SmiVersion, TableLayout};
use basic_snmp::{Oid, Value, oid};
use bytes::Bytes;
use std::collections::BTreeMap;

// =============================================================================
// Wire vectors
// =============================================================================

/// v1 GetRequest, community "private", request ID 1, for
/// 1.3.6.1.4.1.2680.1.2.7.3.2.0.
pub const FULL_GET: [u8; 46] = [
    0x30, 0x2C, 0x02, 0x01, 0x00, 0x04, 0x07, b'p', b'r', b'i', b'v', b'a', b't', b'e', 0xA0,
    0x1E, 0x02, 0x01, 0x01, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00, 0x30, 0x13, 0x30, 0x11, 0x06,
    0x0D, 0x2B, 0x06, 0x01, 0x04, 0x01, 0x94, 0x78, 0x01, 0x02, 0x07, 0x03, 0x02, 0x00, 0x05,
    0x00,
];

pub fn full_get_oid() -> Oid {
    oid!(1, 3, 6, 1, 4, 1, 2680, 1, 2, 7, 3, 2, 0)
}

// =============================================================================
// Standard system MIB OIDs (1.3.6.1.2.1.1.*)
// =============================================================================

pub fn sys_descr() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)
}
pub fn sys_uptime() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)
}
pub fn sys_name() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)
}

/// System subtree root: 1.3.6.1.2.1.1
pub fn system_subtree() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1)
}

// =============================================================================
// A small conceptual table
// =============================================================================

/// Entry OID of the test table.
pub fn table_base() -> Oid {
    oid!(1, 3, 6, 1, 4, 1, 2680, 1, 2, 7, 3, 2)
}

/// Three columns keyed by one index; column 3 is a RowStatus.
pub fn table_layout() -> TableLayout {
    TableLayout::new(1, 1, 3).with_status_column(3, SmiVersion::V2)
}

/// Rows 5 and 7 of the test table, plus one object on either side of it.
pub fn table_mib() -> BTreeMap<Oid, Value> {
    let base = table_base();
    let mut mib = BTreeMap::new();
    mib.insert(sys_descr(), Value::from("test agent"));
    mib.insert(sys_name(), Value::from("core-1"));
    for (key, name, status) in [(5u64, "eth0", 1i64), (7, "eth1", 2)] {
        mib.insert(base.child(1).child(key), Value::Integer(key as i64 * 10));
        mib.insert(
            base.child(2).child(key),
            Value::OctetString(Bytes::from(name)),
        );
        mib.insert(base.child(3).child(key), Value::Integer(status));
    }
    mib.insert(oid!(1, 3, 6, 1, 4, 1, 2680, 1, 2, 8, 0), Value::Integer(0));
    mib
}

/// ipAddrEntry: rows indexed by a four-arc IpAddress.
pub fn ip_addr_entry() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 4, 20, 1)
}

/// Two ipAddrTable rows (10.0.0.1 and 192.0.2.7) with their ifIndex.
pub fn ip_addr_mib() -> BTreeMap<Oid, Value> {
    let entry = ip_addr_entry();
    let mut mib = table_mib();
    for (addr, if_index) in [([10u64, 0, 0, 1], 1i64), ([192, 0, 2, 7], 2)] {
        let ip = addr.map(|arc| arc as u8);
        let mut cell = entry.child(1);
        cell.extend_from_slice(&addr);
        mib.insert(cell, Value::IpAddress(ip));
        let mut cell = entry.child(2);
        cell.extend_from_slice(&addr);
        mib.insert(cell, Value::Integer(if_index));
    }
    mib
}

/// V2c read-write community used by the test agent.
pub const COMMUNITY: &[u8] = b"public";
