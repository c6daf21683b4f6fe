//! Synthetic row generation.
//!
//! Rows are derived purely from their index, so two runs with the same row
//! count insert byte-identical data.

/// One synthetic row destined for the `test_data` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub payload: String,
    pub description: String,
    pub counter1: i64,
    pub counter2: i64,
}

impl Record {
    pub fn synthetic(index: usize) -> Self {
        let i = index as i64;
        Self {
            payload: format!("test data row {index}"),
            description: format!(
                "description for row {index} with some additional text to make it more realistic"
            ),
            counter1: i * 2,
            counter2: i * 3,
        }
    }
}

/// Generate `n` records in index order.
pub fn generate(n: usize) -> Vec<Record> {
    (0..n).map(Record::synthetic).collect()
}
