/// Group label of the identity series.
const LINEAR_GROUP: i64 = 1;
/// Group label of the squared series.
const SQUARE_GROUP: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub x: i64,
    pub y: i64,
}

impl Record {
    /// Column names, in the order `x` and `y` are bound when written.
    pub const COLUMNS: [&'static str; 2] = ["x", "y"];

    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Build the fixed record sequence: `(1, i)` for `i` in `0..=9`,
/// then `(2, i*i)` for `i` in `11..=20`.
pub fn generate() -> Vec<Record> {
    let linear = (0..=9).map(|i| Record::new(LINEAR_GROUP, i));
    let square = (11..=20).map(|i: i64| Record::new(SQUARE_GROUP, i * i));
    linear.chain(square).collect()
}

pub fn assemble(records: Vec<Record>) -> Table {
    Table {
        columns: Record::COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows: records,
    }
}
