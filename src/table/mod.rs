//! Conceptual tables rebuilt from individually named cells.
//!
//! A cell of a MIB table is named `<base>.<column>.<key arcs>`. Feeding the
//! varbinds of a walk into [`Table::set_cell_data`] groups them into rows by
//! their key arcs; [`Table::cell_oid`] goes the other way when a cell must be
//! read or written again.
//!
//! ```
//! use basic_snmp::table::{Table, TableLayout};
//! use basic_snmp::{Value, VarBind, oid};
//!
//! let base = oid!(1, 3, 6, 1, 4, 1, 2680, 1, 2, 7, 3, 2);
//! let mut table = Table::new(base.clone(), TableLayout::new(1, 1, 2));
//!
//! table.set_cell_data(&VarBind::new(base.child(1).child(5), Value::Integer(10)));
//! table.set_cell_data(&VarBind::new(base.child(2).child(5), Value::from("eth0")));
//!
//! assert_eq!(table.len(), 1);
//! assert_eq!(table.rows()[0].keys(), &[5]);
//! assert_eq!(table.cell_oid(0, 2), Some(base.child(2).child(5)));
//! ```

mod keys;
mod status;

pub use keys::KeyStrategy;
pub use status::{EntryStatus, RowStatus, SmiVersion};

use crate::error::{Error, LayoutErrorKind, Result};
use crate::message::CommunityMessage;
use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;
use bytes::Bytes;

/// Widest column range a layout may span.
pub const MAX_COLUMNS: usize = 4096;

/// Column layout of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableLayout {
    /// Number of trailing key (index) arcs in every cell OID. `None` takes
    /// the count from the first cell stored.
    #[cfg_attr(feature = "serde", serde(default))]
    pub key_count: Option<usize>,
    /// First column number, inclusive.
    pub first_column: u64,
    /// Last column number, inclusive.
    pub last_column: u64,
    /// Column holding the RowStatus/EntryStatus value, if the table has one.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status_column: Option<u64>,
    /// SMI version deciding how the status column is read.
    #[cfg_attr(feature = "serde", serde(default))]
    pub smi_version: SmiVersion,
}

impl TableLayout {
    /// Layout with a fixed number of key arcs and no status column.
    pub fn new(key_count: usize, first_column: u64, last_column: u64) -> Self {
        Self {
            key_count: Some(key_count),
            first_column,
            last_column,
            status_column: None,
            smi_version: SmiVersion::default(),
        }
    }

    /// Layout whose key arc count is learned from the data.
    pub fn inferred_keys(first_column: u64, last_column: u64) -> Self {
        Self {
            key_count: None,
            ..Self::new(0, first_column, last_column)
        }
    }

    /// Like [`TableLayout::new`], but rejects a layout that cannot hold a table.
    ///
    /// ```
    /// use basic_snmp::table::TableLayout;
    ///
    /// assert!(TableLayout::try_new(1, 1, 22).is_ok());
    /// assert!(TableLayout::try_new(1, 5, 2).is_err());
    /// assert!(TableLayout::try_new(1, 0, u64::MAX).is_err());
    /// ```
    pub fn try_new(key_count: usize, first_column: u64, last_column: u64) -> Result<Self> {
        let layout = Self::new(key_count, first_column, last_column);
        layout.validate()?;
        Ok(layout)
    }

    /// Set the status column and the SMI version that interprets it.
    pub fn with_status_column(mut self, column: u64, smi_version: SmiVersion) -> Self {
        self.status_column = Some(column);
        self.smi_version = smi_version;
        self
    }

    /// Check the column range and the status column.
    pub fn validate(&self) -> Result<()> {
        let (first, last) = (self.first_column, self.last_column);
        let Some(span) = last.checked_sub(first) else {
            return Err(Error::invalid_layout(LayoutErrorKind::ColumnRange { first, last }));
        };
        if span >= MAX_COLUMNS as u64 {
            return Err(Error::invalid_layout(LayoutErrorKind::TooManyColumns {
                first,
                last,
                max: MAX_COLUMNS,
            }));
        }
        if let Some(column) = self.status_column
            && !self.contains_column(column)
        {
            return Err(Error::invalid_layout(LayoutErrorKind::StatusColumnOutside(column)));
        }
        Ok(())
    }

    /// Number of columns in the configured range, saturating at `usize::MAX`.
    pub fn column_count(&self) -> usize {
        self.last_column
            .checked_sub(self.first_column)
            .map_or(0, |span| {
                usize::try_from(span).map_or(usize::MAX, |n| n.saturating_add(1))
            })
    }

    /// Check if a column is inside the configured range.
    pub fn contains_column(&self, column: u64) -> bool {
        (self.first_column..=self.last_column).contains(&column)
    }

    fn cell_index(&self, column: u64) -> Option<usize> {
        self.contains_column(column)
            .then(|| usize::try_from(column - self.first_column).ok())
            .flatten()
    }
}

/// One row: its key arcs plus one slot per configured column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    keys: Vec<u64>,
    cells: Vec<Option<Value>>,
}

impl TableRow {
    fn new(keys: &[u64], column_count: usize) -> Self {
        Self {
            keys: keys.to_vec(),
            cells: vec![None; column_count],
        }
    }

    /// The key arcs identifying this row.
    pub fn keys(&self) -> &[u64] {
        &self.keys
    }

    /// Cell slots in column order; `None` where nothing was received.
    pub fn cells(&self) -> &[Option<Value>] {
        &self.cells
    }
}

/// Where [`Table::set_cell_data`] put a varbind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellPlacement {
    /// Stored in the row at `index`; `created` when the row was new.
    Row { index: usize, created: bool },
    /// The OID lies outside the table's subtree.
    NotMine,
    /// The OID lies inside the subtree but cannot be placed (column out of
    /// range or wrong number of key arcs). Logged and discarded.
    Dropped,
}

impl CellPlacement {
    /// Row index, when the cell was stored.
    pub fn row(self) -> Option<usize> {
        match self {
            CellPlacement::Row { index, .. } => Some(index),
            _ => None,
        }
    }
}

/// A MIB table assembled from cell varbinds.
#[derive(Debug, Clone)]
pub struct Table {
    base: Oid,
    layout: TableLayout,
    key_count: Option<usize>,
    rows: Vec<TableRow>,
}

impl Table {
    /// Create an empty table rooted at `base` (the entry OID, without column).
    ///
    /// An invalid layout is accepted here, but every cell is then dropped;
    /// call [`TableLayout::validate`] first to get the reason up front.
    pub fn new(base: Oid, layout: TableLayout) -> Self {
        Self {
            base,
            key_count: layout.key_count,
            layout,
            rows: Vec::new(),
        }
    }

    /// The base OID.
    pub fn base(&self) -> &Oid {
        &self.base
    }

    /// The column layout.
    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    /// Rows in order of first appearance.
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Key arcs per row: the layout's count, or the one learned from the
    /// first cell. `None` until then.
    pub fn key_count(&self) -> Option<usize> {
        self.key_count
    }

    /// Drop every row, keeping base and layout.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.key_count = self.layout.key_count;
    }

    /// Store one cell.
    ///
    /// The arc after the base names the column, every arc after that is a
    /// row key. When the layout leaves the key count open, the first stored
    /// cell fixes it. A row is created the first time its keys are seen;
    /// later cells overwrite in place.
    pub fn set_cell_data(&mut self, varbind: &VarBind) -> CellPlacement {
        let Some(suffix) = varbind.oid.strip_prefix(&self.base) else {
            return CellPlacement::NotMine;
        };

        if let Err(err) = self.layout.validate() {
            tracing::warn!(target: "basic_snmp::table", { oid = %varbind.oid, error = %err }, "cell dropped");
            return CellPlacement::Dropped;
        }

        let Some((&column, keys)) = suffix.split_first() else {
            tracing::warn!(target: "basic_snmp::table", { oid = %varbind.oid }, "cell OID names no column");
            return CellPlacement::Dropped;
        };

        let Some(cell_index) = self.layout.cell_index(column) else {
            tracing::warn!(
                target: "basic_snmp::table",
                { oid = %varbind.oid, column, first = self.layout.first_column, last = self.layout.last_column },
                "column out of range, cell dropped"
            );
            return CellPlacement::Dropped;
        };

        match self.key_count {
            Some(expected) if keys.len() != expected => {
                tracing::warn!(
                    target: "basic_snmp::table",
                    { oid = %varbind.oid, keys = keys.len(), expected },
                    "wrong number of key arcs, cell dropped"
                );
                return CellPlacement::Dropped;
            }
            Some(_) => {}
            None if keys.is_empty() => {
                tracing::warn!(target: "basic_snmp::table", { oid = %varbind.oid }, "cell OID has no key arcs");
                return CellPlacement::Dropped;
            }
            None => {
                tracing::debug!(target: "basic_snmp::table", { keys = keys.len() }, "key count taken from first cell");
                self.key_count = Some(keys.len());
            }
        }

        let (index, created) = match self.find_row_by_keys(keys) {
            Some(index) => (index, false),
            None => {
                self.rows
                    .push(TableRow::new(keys, self.layout.column_count()));
                (self.rows.len() - 1, true)
            }
        };

        self.rows[index].cells[cell_index] = Some(varbind.value.clone());
        tracing::trace!(target: "basic_snmp::table", { row = index, column, created }, "cell stored");
        CellPlacement::Row { index, created }
    }

    /// OID of a cell: `base ⧺ [column] ⧺ row keys`.
    pub fn cell_oid(&self, row: usize, column: u64) -> Option<Oid> {
        let row = self.rows.get(row)?;
        Some(self.cell_oid_for_keys(&row.keys, column))
    }

    /// OID of a cell in a row that may not exist yet.
    pub fn cell_oid_for_keys(&self, keys: &[u64], column: u64) -> Oid {
        let mut oid = self.base.child(column);
        oid.extend_from_slice(keys);
        oid
    }

    /// Value of a cell, if it was received.
    pub fn cell(&self, row: usize, column: u64) -> Option<&Value> {
        let index = self.layout.cell_index(column)?;
        self.rows.get(row)?.cells.get(index)?.as_ref()
    }

    /// Status column value of a row.
    pub fn row_status(&self, row: usize) -> Option<i64> {
        let column = self.layout.status_column?;
        self.cell(row, column)?.as_i64()
    }

    /// Label of a row's status column value.
    pub fn row_status_label(&self, row: usize) -> Option<&'static str> {
        self.row_status(row)
            .map(|v| self.layout.smi_version.status_label(v))
    }

    /// Find the row whose full key vector equals `keys`.
    pub fn find_row_by_keys(&self, keys: &[u64]) -> Option<usize> {
        self.rows.iter().position(|row| row.keys == keys)
    }

    /// Find the first row whose key at `key_index` equals `value`.
    pub fn find_row_by_key(&self, key_index: usize, value: u64) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.keys.get(key_index) == Some(&value))
    }

    /// Find the first row whose cell in `column` holds the number `value`.
    pub fn find_row_by_number(&self, column: u64, value: i64) -> Option<usize> {
        let index = self.layout.cell_index(column)?;
        self.rows.iter().position(|row| {
            row.cells
                .get(index)
                .and_then(Option::as_ref)
                .and_then(Value::as_i64)
                == Some(value)
        })
    }

    /// Find the first row whose cell in `column` holds the string `value`.
    pub fn find_row_by_string(&self, column: u64, value: &[u8]) -> Option<usize> {
        let index = self.layout.cell_index(column)?;
        self.rows.iter().position(|row| {
            row.cells
                .get(index)
                .and_then(Option::as_ref)
                .and_then(Value::as_bytes)
                == Some(value)
        })
    }

    /// Build a SetRequest writing back every populated cell of a row.
    ///
    /// The status column, when configured and populated, comes first so the
    /// agent sees it before the columns it governs.
    pub fn set_request_for_row(
        &self,
        row: usize,
        version: Version,
        community: impl Into<Bytes>,
        request_id: i32,
    ) -> Option<CommunityMessage> {
        let table_row = self.rows.get(row)?;
        let mut msg = CommunityMessage::setup_set_request(version, community, request_id, vec![]);

        let status_column = self.layout.status_column;
        if let Some(column) = status_column
            && let Some(value) = self.cell(row, column)
        {
            msg.add_cell_varbind(&self.base, &table_row.keys, column, value.clone());
        }

        for (column, value) in self.populated_cells(table_row) {
            if Some(column) != status_column {
                msg.add_cell_varbind(&self.base, &table_row.keys, column, value.clone());
            }
        }

        Some(msg)
    }

    /// Build a SetRequest creating a row with the given keys.
    ///
    /// When the layout has a status column, its first varbind carries
    /// `createAndGo` (SMIv2) or `createRequest` (SMIv1); any value supplied
    /// for the status column itself is ignored.
    pub fn create_row_request(
        &self,
        keys: &[u64],
        values: &[(u64, Value)],
        version: Version,
        community: impl Into<Bytes>,
        request_id: i32,
    ) -> CommunityMessage {
        self.status_request(
            keys,
            values,
            self.layout.smi_version.create_value(),
            version,
            community,
            request_id,
        )
    }

    /// Build a SetRequest removing a row (`destroy` / `invalid`).
    ///
    /// Returns `None` when the row does not exist or the layout has no
    /// status column.
    pub fn destroy_row_request(
        &self,
        row: usize,
        version: Version,
        community: impl Into<Bytes>,
        request_id: i32,
    ) -> Option<CommunityMessage> {
        let column = self.layout.status_column?;
        let keys = &self.rows.get(row)?.keys;
        let mut msg = CommunityMessage::setup_set_request(version, community, request_id, vec![]);
        msg.add_cell_varbind(
            &self.base,
            keys,
            column,
            Value::Integer(self.layout.smi_version.destroy_value()),
        );
        Some(msg)
    }

    fn status_request(
        &self,
        keys: &[u64],
        values: &[(u64, Value)],
        status: i64,
        version: Version,
        community: impl Into<Bytes>,
        request_id: i32,
    ) -> CommunityMessage {
        let mut msg = CommunityMessage::setup_set_request(version, community, request_id, vec![]);
        let status_column = self.layout.status_column;

        if let Some(column) = status_column {
            msg.add_cell_varbind(&self.base, keys, column, Value::Integer(status));
        }
        for (column, value) in values {
            if Some(*column) != status_column {
                msg.add_cell_varbind(&self.base, keys, *column, value.clone());
            }
        }
        msg
    }

    fn populated_cells<'a>(
        &'a self,
        row: &'a TableRow,
    ) -> impl Iterator<Item = (u64, &'a Value)> + 'a {
        row.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.as_ref()
                .map(|value| (self.layout.first_column + i as u64, value))
        })
    }
}
