//! Async SNMP client.
//!
//! [`Client`] drives a [`Sequencer`] over a [`Transport`]: the sequencer
//! decides what to send and when an exchange is over, the client owns the
//! socket and the timers.

mod builder;
pub mod retry;
mod walk;

pub use builder::ClientBuilder;
pub(crate) use builder::resolve_target;
pub use retry::{Backoff, Retry};
pub use walk::Walk;
pub use crate::config::ClientConfig;

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use tokio_util::sync::CancellationToken;

use crate::error::{Error, ErrorCode, Result, WalkFailure};
use crate::message::CommunityMessage;
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType};
use crate::sequencer::{Sequencer, SequencerEvent};
use crate::table::{Table, TableLayout};
use crate::transport::Transport;
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;

/// SNMP v1/v2c client bound to one agent.
///
/// Cloning is cheap; clones share the transport and the request ID counter.
/// Exchanges on one client must not overlap: while waiting, the UDP transport
/// drops answers meant for other request IDs.
///
/// ```rust,no_run
/// use basic_snmp::{Client, oid};
/// use basic_snmp::table::TableLayout;
///
/// # async fn example() -> basic_snmp::Result<()> {
/// let client = Client::v2c("192.0.2.1").community(b"public").connect().await?;
///
/// let descr = client.get(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)).await?;
/// println!("{}", descr.value);
///
/// // ifTable: one key (ifIndex), columns 1..=22
/// let table = client
///     .discover_table(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1), TableLayout::new(1, 1, 22))
///     .await?;
/// println!("{} interfaces", table.len());
/// # Ok(())
/// # }
/// ```
pub struct Client<T: Transport> {
    inner: Arc<ClientInner<T>>,
}

struct ClientInner<T> {
    transport: T,
    config: ClientConfig,
    next_request_id: AtomicI32,
}

impl<T: Transport> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

enum Outcome {
    TableComplete,
    Response(CommunityMessage),
}

impl Client<crate::transport::UdpTransport> {
    /// Start building a v1 client for `target` (`host` or `host:port`).
    pub fn v1(target: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(target, Version::V1)
    }

    /// Start building a v2c client for `target` (`host` or `host:port`).
    pub fn v2c(target: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(target, Version::V2c)
    }

    /// Resolve `target` and connect a UDP transport to it.
    pub async fn connect(target: &str, config: ClientConfig) -> Result<Self> {
        let addr = resolve_target(target)?;
        let transport = crate::transport::UdpTransport::connect(addr).await?;
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> Client<T> {
    /// Create a client over an existing transport.
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                transport,
                config,
                next_request_id: AtomicI32::new(initial_request_id()),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Address of the agent.
    pub fn peer_addr(&self) -> std::net::SocketAddr {
        self.inner.transport.peer_addr()
    }

    /// Allocate a request ID.
    ///
    /// Table walks consume one ID per step, so callers running several walks
    /// should space their IDs apart.
    pub fn next_request_id(&self) -> i32 {
        let id = self.inner.next_request_id.fetch_add(1, Ordering::Relaxed);
        if id == 0 {
            self.inner.next_request_id.fetch_add(1, Ordering::Relaxed)
        } else {
            id
        }
    }

    /// Fetch a single object.
    pub async fn get(&self, oid: &Oid) -> Result<VarBind> {
        let mut varbinds = self.get_many(std::slice::from_ref(oid)).await?;
        self.first(&mut varbinds)
    }

    /// Fetch several objects in one request.
    pub async fn get_many(&self, oids: &[Oid]) -> Result<Vec<VarBind>> {
        let varbinds = oids.iter().cloned().map(VarBind::null).collect();
        Ok(self.request(PduType::GetRequest, varbinds).await?.varbinds)
    }

    /// Fetch the object following `oid`.
    pub async fn get_next(&self, oid: &Oid) -> Result<VarBind> {
        let response = self
            .request(PduType::GetNextRequest, vec![VarBind::null(oid.clone())])
            .await?;
        let mut varbinds = response.varbinds;
        self.first(&mut varbinds)
    }

    /// Write one object.
    pub async fn set(&self, oid: &Oid, value: Value) -> Result<VarBind> {
        let mut varbinds = self.set_many(vec![VarBind::new(oid.clone(), value)]).await?;
        self.first(&mut varbinds)
    }

    /// Write several objects in one request.
    pub async fn set_many(&self, varbinds: Vec<VarBind>) -> Result<Vec<VarBind>> {
        Ok(self.request(PduType::SetRequest, varbinds).await?.varbinds)
    }

    /// Stream every object under `oid`.
    pub fn walk(&self, oid: Oid) -> Walk<T> {
        Walk::new(self.clone(), oid)
    }

    /// Read the whole table rooted at `base`.
    ///
    /// Fails with [`Error::InvalidLayout`] before sending anything when the
    /// layout cannot hold a table.
    pub async fn discover_table(&self, base: Oid, layout: TableLayout) -> Result<Table> {
        self.discover_table_inner(base, layout, None).await
    }

    /// Read a table, giving up with [`WalkFailure::Cancelled`] once `cancel` fires.
    pub async fn discover_table_with_cancel(
        &self,
        base: Oid,
        layout: TableLayout,
        cancel: &CancellationToken,
    ) -> Result<Table> {
        self.discover_table_inner(base, layout, Some(cancel)).await
    }

    /// Create a row in `table` with the given `(column, value)` cells.
    ///
    /// The status column is set to `createAndGo` (SMIv2) or
    /// `createRequest` (SMIv1).
    pub async fn create_row(
        &self,
        table: &Table,
        keys: &[u64],
        values: &[(u64, Value)],
    ) -> Result<Vec<VarBind>> {
        let config = &self.inner.config;
        let msg = table.create_row_request(
            keys,
            values,
            config.version,
            config.community.clone(),
            self.next_request_id(),
        );
        Ok(self.exchange(msg).await?.varbinds)
    }

    /// Remove row `row` of `table` through its status column.
    ///
    /// Returns `Ok(None)` when the row does not exist or the table has no
    /// status column.
    pub async fn destroy_row(&self, table: &Table, row: usize) -> Result<Option<Vec<VarBind>>> {
        let config = &self.inner.config;
        let Some(msg) = table.destroy_row_request(
            row,
            config.version,
            config.community.clone(),
            self.next_request_id(),
        ) else {
            return Ok(None);
        };
        Ok(Some(self.exchange(msg).await?.varbinds))
    }

    async fn request(&self, pdu_type: PduType, varbinds: Vec<VarBind>) -> Result<Pdu> {
        let config = &self.inner.config;
        let msg = CommunityMessage::new(
            config.version,
            config.community.clone(),
            Pdu::request(pdu_type, self.next_request_id(), varbinds),
        );
        self.exchange(msg).await
    }

    async fn exchange(&self, msg: CommunityMessage) -> Result<Pdu> {
        let request_id = msg.pdu.request_id;
        let mut seq = Sequencer::new(self.inner.config.retry.clone());
        seq.enqueue_request(
            msg.version,
            msg.community,
            request_id,
            msg.pdu.pdu_type,
            msg.pdu.varbinds,
        )?;

        match self.run(&mut seq, request_id, None, None).await? {
            Outcome::Response(response) => self.check_response(response),
            Outcome::TableComplete => Err(Error::EmptyResponse {
                target: Some(self.peer_addr()),
            }),
        }
    }

    async fn discover_table_inner(
        &self,
        base: Oid,
        layout: TableLayout,
        cancel: Option<&CancellationToken>,
    ) -> Result<Table> {
        layout.validate()?;
        let config = &self.inner.config;
        let request_id = self.next_request_id();
        let mut table = Table::new(base.clone(), layout);
        let mut seq = Sequencer::new(config.retry.clone());
        seq.discover_table(config.version, base, config.community.clone(), request_id)?;

        self.run(&mut seq, request_id, Some(&mut table), cancel)
            .await?;
        tracing::debug!(target: "basic_snmp::client", { snmp.target = %self.peer_addr(), request_id, rows = table.len() }, "table discovered");
        Ok(table)
    }

    /// Pump the sequencer until its single entry finishes.
    async fn run(
        &self,
        seq: &mut Sequencer,
        request_id: i32,
        mut table: Option<&mut Table>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Outcome> {
        let transport = &self.inner.transport;
        let config = &self.inner.config;
        let mut awaiting = None;

        loop {
            while let Some(event) = seq.poll_event() {
                match event {
                    SequencerEvent::Transmit {
                        wire_id, datagram, ..
                    } => {
                        if let Some(retries) = seq.in_flight().map(|r| r.retries())
                            && retries > 0
                        {
                            let delay = config.retry.compute_delay(retries - 1);
                            if !delay.is_zero() {
                                tokio::time::sleep(delay).await;
                            }
                        }
                        transport.send(&datagram).await?;
                        awaiting = Some(wire_id);
                    }
                    SequencerEvent::CellReceived { varbind, .. } => {
                        if let Some(table) = table.as_deref_mut() {
                            table.set_cell_data(&varbind);
                        }
                    }
                    SequencerEvent::TableComplete { .. } => return Ok(Outcome::TableComplete),
                    SequencerEvent::Response { message, .. } => {
                        return Ok(Outcome::Response(message));
                    }
                    SequencerEvent::WalkFailed {
                        reason: WalkFailure::Timeout,
                        ..
                    } => {
                        let attempts = config.retry.max_attempts + 1;
                        return Err(Error::Timeout {
                            target: Some(self.peer_addr()),
                            elapsed: config.timeout.saturating_mul(attempts),
                            request_id,
                            retries: config.retry.max_attempts,
                        });
                    }
                    SequencerEvent::WalkFailed { request_id, reason } => {
                        return Err(Error::WalkFailed { request_id, reason });
                    }
                }
            }

            let Some(wire_id) = awaiting else {
                return Err(Error::WalkFailed {
                    request_id,
                    reason: WalkFailure::Encode,
                });
            };

            let cancelled = async {
                match cancel {
                    Some(token) => token.cancelled().await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                _ = cancelled => {
                    seq.cancel_discover_table(request_id);
                    tracing::debug!(target: "basic_snmp::client", { snmp.target = %self.peer_addr(), request_id }, "walk cancelled");
                    return Err(Error::WalkFailed {
                        request_id,
                        reason: WalkFailure::Cancelled,
                    });
                }
                received = transport.recv(wire_id, config.timeout) => match received {
                    Ok((data, _)) => {
                        if let Err(e) = seq.handle_datagram(data) {
                            tracing::debug!(target: "basic_snmp::client", { snmp.target = %self.peer_addr(), error = %e }, "dropping undecodable response");
                        }
                    }
                    Err(Error::Timeout { .. }) => seq.on_timeout(),
                    Err(e) => return Err(e),
                },
            }
        }
    }

    fn check_response(&self, msg: CommunityMessage) -> Result<Pdu> {
        if let Some(code) = msg.first_warning() {
            tracing::debug!(target: "basic_snmp::client", { snmp.target = %self.peer_addr(), code = %code }, "response decoded with warnings");
        }
        let pdu = msg.into_pdu();
        if pdu.pdu_type != PduType::Response {
            return Err(Error::decode(0, ErrorCode::WrongType));
        }
        if pdu.error_status != ErrorCode::NoError {
            return Err(Error::Snmp {
                target: Some(self.peer_addr()),
                status: pdu.error_status,
                index: u32::try_from(pdu.error_index).unwrap_or(0),
                oid: pdu.error_varbind().map(|vb| vb.oid.clone()),
            });
        }
        Ok(pdu)
    }

    fn first(&self, varbinds: &mut Vec<VarBind>) -> Result<VarBind> {
        if varbinds.is_empty() {
            return Err(Error::EmptyResponse {
                target: Some(self.peer_addr()),
            });
        }
        Ok(varbinds.swap_remove(0))
    }
}

fn initial_request_id() -> i32 {
    let mut buf = [0u8; 4];
    match getrandom::fill(&mut buf) {
        Ok(()) => (i32::from_ne_bytes(buf) & 0x3FFF_FFFF).max(1),
        Err(_) => 1,
    }
}
