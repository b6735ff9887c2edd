use serde::Serialize;

/// One business location. Field names follow the source CSV columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessRecord {
    #[serde(rename = "nama_umkm")]
    pub name: String,
    #[serde(rename = "kategori")]
    pub category: String,
    #[serde(rename = "kabupaten")]
    pub district: String,
    #[serde(rename = "alamat")]
    pub address: String,
    pub lat: f64,
    pub lon: f64,
}

/// Ordered records, in source order. Replaced wholesale, never edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecordTable {
    records: Vec<BusinessRecord>,
}

impl RecordTable {
    pub fn new(records: Vec<BusinessRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BusinessRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[BusinessRecord] {
        &self.records
    }
}

impl FromIterator<BusinessRecord> for RecordTable {
    fn from_iter<I: IntoIterator<Item = BusinessRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordTable {
    type Item = &'a BusinessRecord;
    type IntoIter = std::slice::Iter<'a, BusinessRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Field a table can be grouped or filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    District,
    Category,
}

impl GroupField {
    pub fn value<'a>(&self, record: &'a BusinessRecord) -> &'a str {
        match self {
            GroupField::District => &record.district,
            GroupField::Category => &record.category,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateCount {
    pub key: String,
    pub count: usize,
}
