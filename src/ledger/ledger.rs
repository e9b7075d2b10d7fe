use std::collections::{BTreeMap, BTreeSet};

use serde::{
    ser::{SerializeMap, SerializeSeq},
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::Value;
use uuid::Uuid;

use super::{expense::Expense, month::MonthKey};

/// Raw expense records bucketed by the month they were created in.
///
/// Buckets enumerate chronologically and records keep insertion order, which
/// makes every projection of the ledger reproducible.
///
/// Stored data that cannot be read as expenses is kept verbatim and written
/// back on save, so a whole-snapshot save never shrinks the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    months: BTreeMap<MonthKey, Vec<Expense>>,
    /// Values under a valid month key that failed to decode as records.
    unreadable: BTreeMap<MonthKey, Vec<Value>>,
    /// Whole buckets whose key is not a month key.
    foreign: BTreeMap<String, Value>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records created in `key`, empty when the month has none.
    pub fn get(&self, key: MonthKey) -> &[Expense] {
        self.months.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn append(&mut self, key: MonthKey, expense: Expense) -> Uuid {
        let id = expense.id;
        self.months.entry(key).or_default().push(expense);
        id
    }

    /// Removes by position; later records in the same month shift down by one.
    /// Out-of-range positions leave the ledger untouched.
    pub fn remove_at(&mut self, key: MonthKey, index: usize) -> Option<Expense> {
        let bucket = self.months.get_mut(&key)?;
        if index < bucket.len() {
            Some(bucket.remove(index))
        } else {
            None
        }
    }

    pub fn locate(&self, id: Uuid) -> Option<(MonthKey, usize)> {
        self.months.iter().find_map(|(key, bucket)| {
            bucket
                .iter()
                .position(|expense| expense.id == id)
                .map(|index| (*key, index))
        })
    }

    pub fn expense(&self, id: Uuid) -> Option<&Expense> {
        self.months
            .values()
            .flat_map(|bucket| bucket.iter())
            .find(|expense| expense.id == id)
    }

    pub fn expense_mut(&mut self, id: Uuid) -> Option<&mut Expense> {
        self.months
            .values_mut()
            .flat_map(|bucket| bucket.iter_mut())
            .find(|expense| expense.id == id)
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Expense> {
        let (key, index) = self.locate(id)?;
        self.remove_at(key, index)
    }

    /// All records as `(creation key, position, record)`, chronologically.
    pub fn iter(&self) -> impl Iterator<Item = (MonthKey, usize, &Expense)> {
        self.months.iter().flat_map(|(key, bucket)| {
            bucket
                .iter()
                .enumerate()
                .map(move |(index, expense)| (*key, index, expense))
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = MonthKey> + '_ {
        self.months.keys().copied()
    }

    pub fn record_count(&self) -> usize {
        self.months.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }

    /// Stored entries that are carried along untouched because they could not
    /// be read: undecodable records plus unusable buckets.
    pub fn unreadable_count(&self) -> usize {
        self.unreadable.values().map(Vec::len).sum::<usize>() + self.foreign.len()
    }

    /// Builds a ledger from loosely-typed JSON. Entries that cannot be
    /// interpreted are set aside instead of failing the whole load.
    fn from_raw(raw: BTreeMap<String, Value>) -> Self {
        let mut ledger = Ledger::new();
        for (raw_key, value) in raw {
            let key = match raw_key.parse::<MonthKey>() {
                Ok(key) => key,
                Err(err) => {
                    tracing::warn!(key = %raw_key, error = %err, "keeping unreadable ledger bucket");
                    ledger.foreign.insert(raw_key, value);
                    continue;
                }
            };
            let items = match value {
                Value::Array(items) => items,
                other => {
                    tracing::warn!(key = %raw_key, "keeping ledger bucket that is not a list");
                    ledger.unreadable.entry(key).or_default().push(other);
                    continue;
                }
            };
            let bucket = ledger.months.entry(key).or_default();
            for item in items {
                if item.is_null() {
                    continue;
                }
                match serde_json::from_value::<Expense>(item.clone()) {
                    Ok(expense) => bucket.push(expense),
                    Err(err) => {
                        tracing::warn!(key = %raw_key, error = %err, "keeping unreadable expense");
                        ledger.unreadable.entry(key).or_default().push(item);
                    }
                }
            }
        }
        ledger
    }
}

/// One month's list on disk: readable records first, then the ones kept as-is.
struct Bucket<'a> {
    records: &'a [Expense],
    unreadable: &'a [Value],
}

impl Serialize for Bucket<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.records.len() + self.unreadable.len()))?;
        for record in self.records {
            seq.serialize_element(record)?;
        }
        for raw in self.unreadable {
            seq.serialize_element(raw)?;
        }
        seq.end()
    }
}

impl Serialize for Ledger {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let keys: BTreeSet<MonthKey> = self
            .months
            .keys()
            .chain(self.unreadable.keys())
            .copied()
            .collect();
        let mut map = serializer.serialize_map(Some(keys.len() + self.foreign.len()))?;
        for key in keys {
            let bucket = Bucket {
                records: self.get(key),
                unreadable: self.unreadable.get(&key).map(Vec::as_slice).unwrap_or(&[]),
            };
            map.serialize_entry(&key.to_string(), &bucket)?;
        }
        for (raw_key, value) in &self.foreign {
            map.serialize_entry(raw_key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Ledger {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(Ledger::from_raw(raw))
    }
}
