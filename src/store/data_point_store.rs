use crate::datamodel::{DataPoint, Measurement, Timestamp};
use tracing::debug;

/// Time-indexed table of merged measurement rows.
///
/// Rows are strictly ascending by `date` with at most one row per
/// timestamp. Measurements arrive out of order across metrics and
/// fetches, so every merge lands each value at its sorted position.
#[derive(Debug, Default, Clone)]
pub struct DataPointStore {
    rows: Vec<DataPoint>,
}

impl DataPointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges measurements into the table.
    ///
    /// A measurement whose timestamp matches an existing row sets the
    /// metric's field on that row, overwriting a previous value. Any other
    /// measurement inserts a new row.
    pub fn merge_measurements<'a, I>(&mut self, measurements: I)
    where
        I: IntoIterator<Item = &'a Measurement>,
    {
        let mut inserted = 0usize;
        let mut updated = 0usize;
        for measurement in measurements {
            match self.position(measurement.at) {
                Ok(idx) => {
                    self.rows[idx].set(&measurement.metric, measurement.value);
                    updated += 1;
                }
                Err(idx) => {
                    self.rows.insert(
                        idx,
                        DataPoint::with_value(
                            measurement.at,
                            &measurement.metric,
                            measurement.value,
                        ),
                    );
                    inserted += 1;
                }
            }
        }
        debug!(inserted, updated, total = self.rows.len(), "merged measurements");
    }

    /// Full sorted sequence of rows.
    pub fn all_rows(&self) -> &[DataPoint] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last_date(&self) -> Option<Timestamp> {
        self.rows.last().map(|row| row.date)
    }

    pub fn row_at(&self, date: Timestamp) -> Option<&DataPoint> {
        self.position(date).ok().map(|idx| &self.rows[idx])
    }

    /// Index of the first row strictly newer than `date`, walking back from
    /// the tail. `None` when the newest row is not newer than `date`.
    pub fn first_newer_than(&self, date: Timestamp) -> Option<usize> {
        let mut idx = self.rows.len();
        while idx > 0 && self.rows[idx - 1].date > date {
            idx -= 1;
        }
        (idx < self.rows.len()).then_some(idx)
    }

    fn position(&self, date: Timestamp) -> Result<usize, usize> {
        self.rows.binary_search_by_key(&date, |row| row.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::Unit;

    fn m(metric: &str, at: Timestamp, value: f64) -> Measurement {
        Measurement::live(metric, at, value)
    }

    fn dates(store: &DataPointStore) -> Vec<Timestamp> {
        store.all_rows().iter().map(|row| row.date).collect()
    }

    #[test]
    fn test_merge_into_empty_store() {
        let mut store = DataPointStore::new();
        store.merge_measurements(&[Measurement::new(
            "pressure",
            100,
            10.0,
            Some(Unit::from("psi")),
        )]);
        assert_eq!(
            store.all_rows(),
            &[DataPoint::with_value(100, "pressure", 10.0)]
        );
    }

    #[test]
    fn test_out_of_order_measurements_are_sorted() {
        let mut store = DataPointStore::new();
        store.merge_measurements(&[m("pressure", 300, 3.0), m("pressure", 100, 1.0)]);
        store.merge_measurements(&[m("temperature", 200, 70.0), m("temperature", 50, 68.0)]);
        assert_eq!(dates(&store), vec![50, 100, 200, 300]);
    }

    #[test]
    fn test_same_timestamp_merges_into_one_row() {
        let mut store = DataPointStore::new();
        store.merge_measurements(&[m("pressure", 100, 10.0)]);
        store.merge_measurements(&[m("temperature", 100, 70.0)]);
        assert_eq!(store.len(), 1);
        let row = store.row_at(100).unwrap();
        assert_eq!(row.get("pressure"), Some(10.0));
        assert_eq!(row.get("temperature"), Some(70.0));
    }

    #[test]
    fn test_duplicates_within_one_list() {
        let mut store = DataPointStore::new();
        store.merge_measurements(&[m("pressure", 100, 10.0), m("pressure", 100, 11.0)]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.row_at(100).unwrap().get("pressure"), Some(11.0));
    }

    #[test]
    fn test_remerge_is_idempotent() {
        let batch = vec![
            m("pressure", 100, 10.0),
            m("temperature", 100, 70.0),
            m("pressure", 50, 9.0),
        ];
        let mut store = DataPointStore::new();
        store.merge_measurements(&batch);
        let before = store.all_rows().to_vec();
        store.merge_measurements(&batch);
        assert_eq!(store.all_rows(), before.as_slice());
    }

    #[test]
    fn test_any_interleaving_stays_sorted_and_unique() {
        let measurements: Vec<Measurement> = (0..40)
            .map(|i| {
                let metric = if i % 3 == 0 { "a" } else { "b" };
                m(metric, (i * 37) % 17, i as f64)
            })
            .collect();

        for chunk_size in 1..6 {
            let mut store = DataPointStore::new();
            for chunk in measurements.chunks(chunk_size).rev() {
                store.merge_measurements(chunk);
            }
            let dates = dates(&store);
            assert!(dates.windows(2).all(|w| w[0] < w[1]));
            assert_eq!(dates.len(), 17);
        }
    }

    #[test]
    fn test_first_newer_than() {
        let mut store = DataPointStore::new();
        assert_eq!(store.first_newer_than(0), None);
        store.merge_measurements(&[m("a", 100, 1.0), m("a", 200, 2.0), m("a", 300, 3.0)]);
        assert_eq!(store.first_newer_than(300), None);
        assert_eq!(store.first_newer_than(200), Some(2));
        assert_eq!(store.first_newer_than(150), Some(1));
        assert_eq!(store.first_newer_than(100), Some(1));
        assert_eq!(store.first_newer_than(10), Some(0));
        assert_eq!(store.last_date(), Some(300));
    }
}
