//! Proposing key values for rows that do not exist yet.

use super::Table;

/// Attempts made by [`KeyStrategy::Random`] before falling back to a
/// sequential scan.
const RANDOM_PROBES: usize = 64;

/// How [`Table::next_free_key`] picks a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrategy {
    /// Smallest unused value starting at `start`.
    Sequential { start: u64 },
    /// Uniformly random unused value in `min..=max`.
    Random { min: u64, max: u64 },
}

impl Default for KeyStrategy {
    fn default() -> Self {
        KeyStrategy::Sequential { start: 1 }
    }
}

impl Table {
    /// Propose a value for the key at `key_index` that no row uses yet.
    ///
    /// Returns `None` only when the searched range is exhausted.
    ///
    /// # Examples
    ///
    /// ```
    /// use basic_snmp::table::{KeyStrategy, Table, TableLayout};
    /// use basic_snmp::{Value, VarBind, oid};
    ///
    /// let base = oid!(1, 3, 6, 1, 4, 1, 9999, 1);
    /// let mut table = Table::new(base.clone(), TableLayout::new(1, 1, 1));
    /// for key in [1, 2, 4] {
    ///     table.set_cell_data(&VarBind::new(base.child(1).child(key), Value::Integer(0)));
    /// }
    ///
    /// assert_eq!(table.next_free_key(0, KeyStrategy::default()), Some(3));
    /// ```
    pub fn next_free_key(&self, key_index: usize, strategy: KeyStrategy) -> Option<u64> {
        let in_use = |candidate: u64| self.find_row_by_key(key_index, candidate).is_some();

        match strategy {
            KeyStrategy::Sequential { start } => (start..=u64::MAX).find(|&k| !in_use(k)),
            KeyStrategy::Random { min, max } => {
                if min > max {
                    return None;
                }
                let span = max - min;
                for _ in 0..RANDOM_PROBES {
                    let Some(r) = random_u64() else {
                        break;
                    };
                    let candidate = match span.checked_add(1) {
                        Some(width) => min + r % width,
                        None => r,
                    };
                    if !in_use(candidate) {
                        return Some(candidate);
                    }
                }
                tracing::debug!(target: "basic_snmp::table", { min, max }, "random key search exhausted, scanning");
                (min..=max).find(|&k| !in_use(k))
            }
        }
    }
}

fn random_u64() -> Option<u64> {
    let mut buf = [0u8; 8];
    match getrandom::fill(&mut buf) {
        Ok(()) => Some(u64::from_ne_bytes(buf)),
        Err(e) => {
            tracing::warn!(target: "basic_snmp::table", { error = %e }, "random source unavailable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableLayout;
    use crate::{Value, VarBind, oid};

    fn table_with_keys(keys: &[u64]) -> Table {
        let base = oid!(1, 3, 6, 1, 4, 1, 2680, 9);
        let mut table = Table::new(base.clone(), TableLayout::new(1, 1, 1));
        for &key in keys {
            table.set_cell_data(&VarBind::new(base.child(1).child(key), Value::Integer(0)));
        }
        table
    }

    #[test]
    fn test_sequential_skips_used() {
        let table = table_with_keys(&[1, 2, 3, 5]);
        assert_eq!(table.next_free_key(0, KeyStrategy::default()), Some(4));
        assert_eq!(
            table.next_free_key(0, KeyStrategy::Sequential { start: 5 }),
            Some(6)
        );
    }

    #[test]
    fn test_random_stays_in_range_and_unused() {
        let table = table_with_keys(&[10, 11, 12]);
        for _ in 0..50 {
            let key = table
                .next_free_key(0, KeyStrategy::Random { min: 10, max: 20 })
                .unwrap();
            assert!((13..=20).contains(&key));
        }
    }

    #[test]
    fn test_random_exhausted_range() {
        let table = table_with_keys(&[1, 2]);
        assert_eq!(
            table.next_free_key(0, KeyStrategy::Random { min: 1, max: 2 }),
            None
        );
        assert_eq!(
            table.next_free_key(0, KeyStrategy::Random { min: 3, max: 2 }),
            None
        );
        assert_eq!(
            table.next_free_key(0, KeyStrategy::Random { min: 1, max: 3 }),
            Some(3)
        );
    }
}
