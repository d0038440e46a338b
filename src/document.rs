use std::collections::BTreeMap;

/// Key/value data of a single section occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    entries: BTreeMap<String, Vec<String>>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Values for `key` in file order; empty when the key never appeared.
    #[must_use]
    pub fn values(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Iterate over keys (sorted) and their values.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, key: &str, value: String) {
        self.entries.entry(key.to_owned()).or_default().push(value);
    }
}

/// Every occurrence of one section name, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    records: Vec<Record>,
}

impl Section {
    #[must_use]
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            records: Vec::with_capacity(1),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

/// Parse result: section names in order of first appearance, each with its records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }

    /// Records for the section `name` in file order; empty when it never appeared.
    #[must_use]
    pub fn records(&self, name: &str) -> &[Record] {
        self.section(name).map(Section::records).unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Open a fresh record under `name`, returning its `(section, record)` index.
    pub(crate) fn open_record(&mut self, name: String) -> (usize, usize) {
        let i = match self.sections.iter().position(|section| section.name == name) {
            Some(i) => i,
            None => {
                self.sections.push(Section::new(name));
                self.sections.len() - 1
            }
        };

        let records = &mut self.sections[i].records;
        records.push(Record::new());
        (i, records.len() - 1)
    }

    pub(crate) fn record_mut(&mut self, (section, record): (usize, usize)) -> &mut Record {
        &mut self.sections[section].records[record]
    }
}
