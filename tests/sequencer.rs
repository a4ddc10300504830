//! Driving the sans-IO sequencer by hand over a plain UDP socket.

mod common;

use basic_snmp::{Sequencer, SequencerEvent, Table, Version};
use common::*;
use std::time::Duration;
use tokio::net::UdpSocket;

#[tokio::test]
async fn hand_driven_walk_fills_table() {
    init_tracing();
    let agent = FakeAgent::start(table_mib(), COMMUNITY).await;
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.connect(agent.addr()).await.unwrap();

    let mut seq = Sequencer::default();
    let mut table = Table::new(table_base(), table_layout());
    seq.discover_table(Version::V2c, table_base(), COMMUNITY, 40)
        .unwrap();

    let mut buf = vec![0u8; 65535];
    let mut transmits = 0;
    'outer: loop {
        while let Some(event) = seq.poll_event() {
            match event {
                SequencerEvent::Transmit { datagram, .. } => {
                    transmits += 1;
                    socket.send(&datagram).await.unwrap();
                }
                SequencerEvent::CellReceived { request_id, varbind } => {
                    assert_eq!(request_id, 40);
                    table.set_cell_data(&varbind);
                }
                SequencerEvent::TableComplete { request_id } => {
                    assert_eq!(request_id, 40);
                    break 'outer;
                }
                other => panic!("unexpected event {:?}", other),
            }
        }

        let len = tokio::time::timeout(Duration::from_secs(2), socket.recv(&mut buf))
            .await
            .unwrap()
            .unwrap();
        seq.handle_datagram(bytes::Bytes::copy_from_slice(&buf[..len]))
            .unwrap();
    }

    assert!(!seq.is_active(40));
    assert_eq!(transmits, 7);
    assert_eq!(table.len(), 2);
    assert_eq!(table.row_status_label(0), Some("RowStatus: active"));
}

#[tokio::test]
async fn second_walk_waits_for_first() {
    let mut seq = Sequencer::default();
    seq.discover_table(Version::V2c, table_base(), COMMUNITY, 1)
        .unwrap();
    seq.discover_table(Version::V1, system_subtree(), COMMUNITY, 2)
        .unwrap();

    assert_eq!(seq.len(), 2);
    assert_eq!(seq.in_flight().map(|info| info.request_id), Some(1));

    let mut transmitted = Vec::new();
    while let Some(event) = seq.poll_event() {
        if let SequencerEvent::Transmit { request_id, .. } = event {
            transmitted.push(request_id);
        }
    }
    assert_eq!(transmitted, vec![1]);

    assert!(seq.cancel_discover_table(1));
    assert_eq!(seq.in_flight().map(|info| info.request_id), Some(2));
    assert!(matches!(
        seq.poll_event(),
        Some(SequencerEvent::Transmit { request_id: 2, .. })
    ));
}
