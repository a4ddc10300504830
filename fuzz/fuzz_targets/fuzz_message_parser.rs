#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

use basic_snmp::message::CommunityMessage;
use basic_snmp::sequencer::Sequencer;
use basic_snmp::table::{Table, TableLayout};
use basic_snmp::{Version, oid};

fuzz_target!(|data: &[u8]| {
    let bytes = Bytes::copy_from_slice(data);

    let _ = CommunityMessage::decode(bytes.clone());

    // Whatever decodes must be placeable in a table without panicking
    if let Ok(msg) = CommunityMessage::decode_all(bytes.clone(), true) {
        let mut table = Table::new(oid!(1, 3, 6, 1), TableLayout::new(2, 1, 4));
        for vb in &msg.pdu.varbinds {
            let _ = table.set_cell_data(vb);
        }
        let _ = msg.encode();
    }

    // An active walk fed arbitrary datagrams
    let mut seq = Sequencer::default();
    if seq
        .discover_table(Version::V2c, oid!(1, 3, 6, 1), Bytes::from_static(b"public"), 1)
        .is_ok()
    {
        let _ = seq.handle_datagram(bytes);
        while seq.poll_event().is_some() {}
    }
});
