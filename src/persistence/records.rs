use std::collections::HashMap;

/// Anything stored in a [`RecordSet`]: the index is unique within the set
/// and stable once assigned.
pub trait Record {
    fn index(&self) -> u32;
}

/// Owning collection for one record type. Fresh indices are assigned on
/// creation only; loading derives the counter from the highest index seen.
#[derive(Debug, Clone)]
pub struct RecordSet<T: Record> {
    entries: Vec<T>,
    next_index: u32,
}

impl<T: Record> RecordSet<T> {
    pub fn new() -> RecordSet<T> {
        RecordSet {
            entries: Vec::new(),
            next_index: 1,
        }
    }

    /// Creates a record with a fresh unique index and returns that index.
    pub fn create<F>(&mut self, build: F) -> u32
    where
        F: FnOnce(u32) -> T,
    {
        let index = self.next_index;
        self.next_index += 1;
        self.entries.push(build(index));
        index
    }

    /// Load path: inserts a record that already carries its index. Rejects
    /// duplicates and keeps the fresh-index counter above everything seen.
    pub fn insert_loaded(&mut self, record: T) -> Result<(), String> {
        let index = record.index();
        if index == 0 {
            return Err("record index 0 is reserved".to_string());
        }
        if self.get(index).is_some() {
            return Err(format!("duplicate record index {}", index));
        }
        if index >= self.next_index {
            self.next_index = index + 1;
        }
        self.entries.push(record);
        Ok(())
    }

    pub fn get(&self, index: u32) -> Option<&T> {
        self.entries.iter().find(|record| record.index() == index)
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|record| record.index() == index)
    }

    pub fn remove(&mut self, index: u32) -> Option<T> {
        let position = self
            .entries
            .iter()
            .position(|record| record.index() == index)?;
        Some(self.entries.remove(position))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_index(&self) -> u32 {
        self.next_index
    }
}

impl<T: Record> Default for RecordSet<T> {
    fn default() -> Self {
        RecordSet::new()
    }
}

/// One `key = value` block from a record file, with duplicate keys kept in
/// order. Readers take fields out; whatever remains at `finish` is an error.
#[derive(Debug)]
pub struct FieldBlock {
    label: String,
    line_no: usize,
    fields: HashMap<String, Vec<String>>,
}

impl FieldBlock {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }

    pub fn take(&mut self, key: &str) -> Result<Option<String>, String> {
        let Some(mut values) = self.fields.remove(key) else {
            return Ok(None);
        };
        if values.len() > 1 {
            return Err(format!(
                "{} repeated field '{}' near line {}",
                self.label, key, self.line_no
            ));
        }
        Ok(values.pop())
    }

    pub fn take_all(&mut self, key: &str) -> Vec<String> {
        self.fields.remove(key).unwrap_or_default()
    }

    pub fn require(&mut self, key: &str) -> Result<String, String> {
        self.take(key)?.ok_or_else(|| {
            format!(
                "{} missing field '{}' near line {}",
                self.label, key, self.line_no
            )
        })
    }

    pub fn require_u32(&mut self, key: &str) -> Result<u32, String> {
        let value = self.require(key)?;
        parse_number(&value, &self.label, key, self.line_no)
    }

    pub fn take_u32(&mut self, key: &str, default: u32) -> Result<u32, String> {
        match self.take(key)? {
            Some(value) => parse_number(&value, &self.label, key, self.line_no),
            None => Ok(default),
        }
    }

    pub fn take_u16(&mut self, key: &str, default: u16) -> Result<u16, String> {
        match self.take(key)? {
            Some(value) => parse_number(&value, &self.label, key, self.line_no),
            None => Ok(default),
        }
    }

    pub fn take_u8(&mut self, key: &str, default: u8) -> Result<u8, String> {
        match self.take(key)? {
            Some(value) => parse_number(&value, &self.label, key, self.line_no),
            None => Ok(default),
        }
    }

    pub fn take_i64(&mut self, key: &str, default: i64) -> Result<i64, String> {
        match self.take(key)? {
            Some(value) => parse_number(&value, &self.label, key, self.line_no),
            None => Ok(default),
        }
    }

    pub fn take_bool(&mut self, key: &str, default: bool) -> Result<bool, String> {
        match self.take(key)? {
            Some(value) => match value.as_str() {
                "0" => Ok(false),
                "1" => Ok(true),
                other => Err(format!(
                    "{} field '{}' expects 0 or 1 near line {}, got '{}'",
                    self.label, key, self.line_no, other
                )),
            },
            None => Ok(default),
        }
    }

    /// Fails on leftover keys so typos in record files surface as load
    /// errors instead of silently dropped data.
    pub fn finish(self) -> Result<(), String> {
        if let Some(key) = self.fields.keys().next() {
            return Err(format!(
                "{} unknown field '{}' near line {}",
                self.label, key, self.line_no
            ));
        }
        Ok(())
    }
}

fn parse_number<N: std::str::FromStr>(
    value: &str,
    label: &str,
    key: &str,
    line_no: usize,
) -> Result<N, String> {
    value.trim().parse::<N>().map_err(|_| {
        format!(
            "{} field '{}' has invalid number near line {}, got '{}'",
            label, key, line_no, value
        )
    })
}

/// Splits a record file into blank-line separated blocks of `key = value`
/// lines. `#` starts a comment line.
pub fn parse_blocks(data: &str, label: &str) -> Result<Vec<FieldBlock>, String> {
    let mut blocks = Vec::new();
    let mut current: Option<FieldBlock> = None;

    for (idx, raw_line) in data.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        let (key, value) = line.split_once('=').ok_or_else(|| {
            format!(
                "{} expected key=value at line {}, got '{}'",
                label, line_no, line
            )
        })?;
        let block = current.get_or_insert_with(|| FieldBlock {
            label: label.to_string(),
            line_no,
            fields: HashMap::new(),
        });
        block
            .fields
            .entry(key.trim().to_string())
            .or_default()
            .push(value.trim().to_string());
    }

    if let Some(block) = current.take() {
        blocks.push(block);
    }
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Row {
        index: u32,
        name: String,
    }

    impl Record for Row {
        fn index(&self) -> u32 {
            self.index
        }
    }

    #[test]
    fn create_assigns_sequential_indices() {
        let mut set: RecordSet<Row> = RecordSet::new();
        let first = set.create(|index| Row {
            index,
            name: "a".to_string(),
        });
        let second = set.create(|index| Row {
            index,
            name: "b".to_string(),
        });
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn insert_loaded_bumps_the_fresh_index_counter() {
        let mut set: RecordSet<Row> = RecordSet::new();
        set.insert_loaded(Row {
            index: 7,
            name: "a".to_string(),
        })
        .expect("insert");
        let created = set.create(|index| Row {
            index,
            name: "b".to_string(),
        });
        assert_eq!(created, 8);
    }

    #[test]
    fn insert_loaded_rejects_duplicate_indices() {
        let mut set: RecordSet<Row> = RecordSet::new();
        set.insert_loaded(Row {
            index: 3,
            name: "a".to_string(),
        })
        .expect("insert");
        let err = set
            .insert_loaded(Row {
                index: 3,
                name: "b".to_string(),
            })
            .unwrap_err();
        assert!(err.contains("duplicate record index 3"));
    }

    #[test]
    fn remove_keeps_remaining_indices_stable() {
        let mut set: RecordSet<Row> = RecordSet::new();
        for name in ["a", "b", "c"] {
            set.create(|index| Row {
                index,
                name: name.to_string(),
            });
        }
        let removed = set.remove(2).expect("remove");
        assert_eq!(removed.name, "b");
        assert!(set.get(2).is_none());
        assert_eq!(set.get(3).map(|row| row.name.as_str()), Some("c"));
        assert_eq!(set.next_index(), 4);
    }

    #[test]
    fn parse_blocks_splits_on_blank_lines() {
        let data = "# comment\nindex = 1\nname = first\n\nindex = 2\nname = second\n";
        let blocks = parse_blocks(data, "rows.txt").expect("parse");
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn field_block_rejects_unknown_leftovers() {
        let data = "index = 1\nbogus = 3\n";
        let mut blocks = parse_blocks(data, "rows.txt").expect("parse");
        let mut block = blocks.pop().expect("block");
        assert_eq!(block.require_u32("index").expect("index"), 1);
        let err = block.finish().unwrap_err();
        assert!(err.contains("unknown field 'bogus'"));
    }

    #[test]
    fn field_block_reports_bad_numbers_with_line_context() {
        let data = "index = one\n";
        let mut blocks = parse_blocks(data, "rows.txt").expect("parse");
        let mut block = blocks.pop().expect("block");
        let err = block.require_u32("index").unwrap_err();
        assert!(err.contains("rows.txt"));
        assert!(err.contains("line 1"));
    }
}
