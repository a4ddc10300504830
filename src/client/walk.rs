//! GetNext walk as an async stream.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::error::{Error, ErrorCode, Result};
use crate::oid::Oid;
use crate::transport::Transport;
use crate::varbind::VarBind;

use super::Client;

type PendingStep = Pin<Box<dyn std::future::Future<Output = Result<VarBind>> + Send>>;

/// Stream of the objects under an OID, fetched one GetNext at a time.
///
/// Created by [`Client::walk()`]. The stream ends when the agent answers
/// outside the subtree, with `endOfMibView`, or with v1 `noSuchName`.
pub struct Walk<T: Transport> {
    client: Client<T>,
    base_oid: Oid,
    current_oid: Oid,
    last_returned_oid: Option<Oid>,
    done: bool,
    pending: Option<PendingStep>,
}

impl<T: Transport> Walk<T> {
    pub(crate) fn new(client: Client<T>, oid: Oid) -> Self {
        Self {
            client,
            base_oid: oid.clone(),
            current_oid: oid,
            last_returned_oid: None,
            done: false,
            pending: None,
        }
    }
}

impl<T: Transport + 'static> Stream for Walk<T> {
    type Item = Result<VarBind>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }

        let client = self.client.clone();
        let oid = self.current_oid.clone();
        let pending = self
            .pending
            .get_or_insert_with(|| Box::pin(async move { client.get_next(&oid).await }));

        let result = match pending.as_mut().poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(result) => result,
        };
        self.pending = None;

        let vb = match result {
            Ok(vb) => vb,
            Err(Error::Snmp {
                status: ErrorCode::NoSuchName,
                ..
            }) => {
                self.done = true;
                return Poll::Ready(None);
            }
            Err(e) => {
                self.done = true;
                return Poll::Ready(Some(Err(e)));
            }
        };

        if vb.value.is_end_of_mib_view() || !vb.oid.starts_with(&self.base_oid) {
            self.done = true;
            return Poll::Ready(None);
        }

        if let Some(last_oid) = self.last_returned_oid.take()
            && vb.oid <= last_oid
        {
            self.done = true;
            return Poll::Ready(Some(Err(Error::NonIncreasingOid {
                previous: last_oid,
                current: vb.oid,
            })));
        }

        self.current_oid = vb.oid.clone();
        self.last_returned_oid = Some(vb.oid.clone());
        Poll::Ready(Some(Ok(vb)))
    }
}
