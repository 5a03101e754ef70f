use std::{fmt::Display, path::Path};

use itertools::Itertools;
use owo_colors::OwoColorize;
use serde::Deserialize;
use tabled::{builder::Builder, settings::Style};
use tracing::{debug, trace};

use crate::{Dfa, Map, StateIndex, Symbol, TableError, Word};

/// Tables read by [`ObservationTable::from_json`] may have at most this many cells after filling
/// up.
pub const MAX_CELLS: usize = 1 << 24;

/// The value of an experiment in an [`ObservationTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Cell {
    /// The word was rejected, written `0`.
    Reject,
    /// The word was accepted, written `1`.
    Accept,
    /// The value has not been determined, written `?`, `-` or `*`.
    Unknown,
}

impl Cell {
    /// Reads a cell from its marker. Markers other than `1`, `?`, `-` and `*` count as
    /// [`Cell::Reject`], `position` is only used for logging.
    pub fn parse(value: char, position: usize) -> Self {
        match value {
            '1' => Cell::Accept,
            '?' | '-' | '*' => Cell::Unknown,
            '0' => Cell::Reject,
            value => {
                trace!("Reading marker {:?} at position {} as reject", value, position);
                Cell::Reject
            }
        }
    }

    /// Returns true iff the cell is [`Cell::Accept`].
    pub fn is_accept(self) -> bool {
        self == Cell::Accept
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Reject => write!(f, "0"),
            Cell::Accept => write!(f, "1"),
            Cell::Unknown => write!(f, "?"),
        }
    }
}

/// On-disk form of an observation table. All fields are whitespace separated lists, `pref` and
/// `dop_pref` are the base prefixes and their extensions.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TableFile {
    table: String,
    pref: String,
    dop_pref: String,
    suff: String,
}

/// An observation table as produced by an L*-style learner: rows are labelled by prefixes,
/// columns by suffixes (experiments) and each cell holds the observed output for the
/// concatenation of the two.
///
/// The first [`ObservationTable::base`] prefixes are the representatives of the learner's
/// states, the remaining ones are their one-symbol extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationTable {
    prefixes: Vec<Word>,
    suffixes: Vec<Word>,
    cells: Vec<Cell>,
    base: usize,
}

impl ObservationTable {
    /// Creates a table from row-major `cells`. Missing cells are filled with
    /// [`Cell::Reject`], surplus cells are dropped. All prefixes are considered base prefixes.
    pub fn new(prefixes: Vec<Word>, suffixes: Vec<Word>, cells: Vec<Cell>) -> Self {
        let base = prefixes.len();
        Self::with_base(prefixes, base, suffixes, cells)
    }

    fn with_base(
        prefixes: Vec<Word>,
        base: usize,
        suffixes: Vec<Word>,
        mut cells: Vec<Cell>,
    ) -> Self {
        let expected = prefixes.len() * suffixes.len();
        if cells.len() < expected {
            debug!(
                "Table has {} of {} cells, filling up with rejects",
                cells.len(),
                expected
            );
        } else if cells.len() > expected {
            debug!(
                "Table has {} cells but only {} are used, dropping the rest",
                cells.len(),
                expected
            );
        }
        cells.resize(expected, Cell::Reject);
        Self {
            prefixes,
            suffixes,
            cells,
            base,
        }
    }

    /// Reads a table from the JSON record used by learners, an object with the string fields
    /// `table` (the cells, whitespace is ignored), `pref`, `dop_pref` and `suff`. Missing fields
    /// count as empty and an empty word list stands for `[ε]`.
    ///
    /// Fails if the table would have more than [`MAX_CELLS`] cells.
    pub fn from_json(input: &str) -> Result<Self, TableError> {
        let file: TableFile = serde_json::from_str(input)?;

        let base = Word::parse_list(&file.pref)?;
        let extensions = Word::parse_list(&file.dop_pref)?;
        let suffixes = Word::parse_list(&file.suff)?;
        let cells = file
            .table
            .chars()
            .filter(|c| !c.is_whitespace())
            .enumerate()
            .map(|(position, value)| Cell::parse(value, position))
            .collect_vec();

        let base_len = base.len();
        let prefixes = base.into_iter().chain(extensions).collect_vec();
        match prefixes.len().checked_mul(suffixes.len()) {
            Some(size) if size <= MAX_CELLS => {}
            _ => {
                return Err(TableError::Malformed(format!(
                    "table has too many cells, {} rows and {} columns",
                    prefixes.len(),
                    suffixes.len()
                )))
            }
        }
        Ok(Self::with_base(prefixes, base_len, suffixes, cells))
    }

    /// Reads the file at `path` with [`ObservationTable::from_json`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&input)
    }

    /// The row labels, base prefixes first.
    pub fn prefixes(&self) -> &[Word] {
        &self.prefixes
    }

    /// The column labels.
    pub fn suffixes(&self) -> &[Word] {
        &self.suffixes
    }

    /// Number of base prefixes.
    pub fn base(&self) -> usize {
        self.base
    }

    /// The row signature of the `index`-th prefix, i.e. its cells in column order.
    pub fn row(&self, index: usize) -> &[Cell] {
        let width = self.suffixes.len();
        &self.cells[index * width..(index + 1) * width]
    }

    /// The cell in row `prefix` and column `suffix`.
    pub fn cell(&self, prefix: usize, suffix: usize) -> Cell {
        self.row(prefix)[suffix]
    }
}

/// Builds the hypothesis automaton described by `table`.
///
/// Prefixes with equal row signatures are merged into one state, states are numbered in the
/// order in which their signatures first occur. For a prefix `p` and a symbol `s` the
/// transition `p --s--> p·s` exists only if `p·s` is itself a row of the table; the table is
/// not checked for closedness. If two merged prefixes disagree on a successor, the one listed
/// first wins. The initial state is the one of the empty prefix, a state is accepting iff its
/// cell in the empty-suffix column is [`Cell::Accept`].
///
/// A prefix listed more than once takes the row of its last occurrence. Fails if the table has
/// no row for the empty prefix.
pub fn synthesize(table: &ObservationTable) -> Result<Dfa, TableError> {
    let mut order: Vec<&Word> = vec![];
    let mut rows: Map<&Word, &[Cell]> = Map::default();
    for (index, prefix) in table.prefixes().iter().enumerate() {
        if rows.insert(prefix, table.row(index)).is_none() {
            order.push(prefix);
        }
    }

    let epsilon = Word::epsilon();
    if !rows.contains_key(&epsilon) {
        return Err(TableError::Malformed(
            "there is no row for the empty prefix".to_string(),
        ));
    }

    let mut dfa = Dfa::new();
    let mut signatures: Map<&[Cell], StateIndex> = Map::default();
    let mut states: Map<&Word, StateIndex> = Map::default();
    for prefix in &order {
        let signature = rows[*prefix];
        let next = signatures.len();
        let state = *signatures.entry(signature).or_insert_with(|| {
            if next == 0 {
                dfa.initial()
            } else {
                dfa.add_state()
            }
        });
        states.insert(*prefix, state);
    }

    for prefix in &order {
        let source = states[*prefix];
        for sym in Symbol::ALL {
            let extension = *prefix + sym;
            if let Some(target) = states.get(&extension) {
                if !dfa.add_transition(source, sym, *target) {
                    trace!("Transition of {} on {} already present", prefix, sym);
                }
            }
        }
    }

    dfa.set_initial(states[&epsilon]);
    if let Some(column) = table.suffixes().iter().rposition(Word::is_empty) {
        for prefix in &order {
            if rows[*prefix][column].is_accept() {
                dfa.set_accepting(states[*prefix], true);
            }
        }
    }

    debug!(
        "Synthesized hypothesis with {} states from {} prefixes",
        dfa.size(),
        order.len()
    );
    Ok(dfa)
}

impl Display for ObservationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut builder = Builder::default();
        let header = std::iter::once("".to_string())
            .chain(self.suffixes.iter().map(|suffix| suffix.to_string()));
        builder.push_record(header);

        for (index, prefix) in self.prefixes.iter().enumerate() {
            let row_name = if index < self.base {
                prefix.bold().to_string()
            } else {
                prefix.to_string()
            };
            let outputs = self.row(index).iter().map(|cell| cell.to_string());
            builder.push_record(std::iter::once(row_name).chain(outputs));
        }

        let mut table = builder.build();
        table.with(Style::modern());
        write!(f, "{}", table)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::{synthesize, Cell, ObservationTable};
    use crate::{Symbol, TableError, Word};

    fn words(list: &str) -> Vec<Word> {
        Word::parse_list(list).unwrap()
    }

    fn word(s: &str) -> Word {
        s.parse().unwrap()
    }

    #[test]
    fn two_state_hypothesis() {
        let table = ObservationTable::new(
            words("ε A"),
            words("ε"),
            vec![Cell::Accept, Cell::Reject],
        );
        let dfa = synthesize(&table).unwrap();
        assert_eq!(dfa.size(), 2);
        assert!(dfa.is_accepting(dfa.initial()));
        let next = dfa.successor(dfa.initial(), Symbol::A).unwrap();
        assert!(!dfa.is_accepting(next));
        assert_eq!(dfa.successor(dfa.initial(), Symbol::B), None);
    }

    #[test]
    fn equal_rows_are_merged() {
        // (AA)* over A, B is a dead end: ε and AA agree on every experiment
        let table = ObservationTable::new(
            words("ε A AA B"),
            words("ε A"),
            vec![
                Cell::Accept,
                Cell::Reject,
                Cell::Reject,
                Cell::Accept,
                Cell::Accept,
                Cell::Reject,
                Cell::Reject,
                Cell::Reject,
            ],
        );
        let dfa = synthesize(&table).unwrap();
        assert_eq!(dfa.size(), 3);
        assert!(dfa.accepts(&Word::epsilon()));
        assert!(!dfa.accepts(&word("A")));
        // ε and AA share state 0, A is the only prefix in state 1
        assert_eq!(dfa.successor(0, Symbol::A), Some(1));
        assert_eq!(dfa.successor(1, Symbol::A), Some(0));
        assert!(dfa.accepts(&word("AAAA")));
        assert!(!dfa.accepts(&word("BA")));
    }

    #[test]
    #[traced_test]
    fn short_tables_are_padded() {
        let table = ObservationTable::new(words("ε A B"), words("ε"), vec![Cell::Accept]);
        assert_eq!(table.cell(1, 0), Cell::Reject);
        assert_eq!(table.cell(2, 0), Cell::Reject);
        let dfa = synthesize(&table).unwrap();
        assert_eq!(dfa.size(), 2);
        assert!(logs_contain("filling up with rejects"));
    }

    #[test]
    fn missing_empty_prefix() {
        let table = ObservationTable::new(words("A"), words("ε"), vec![Cell::Accept]);
        assert!(matches!(synthesize(&table), Err(TableError::Malformed(_))));
    }

    #[test]
    fn no_empty_suffix_means_no_accepting_states() {
        let table = ObservationTable::new(words("ε A"), words("A"), vec![Cell::Accept; 2]);
        let dfa = synthesize(&table).unwrap();
        assert_eq!(dfa.accepting_states().count(), 0);
    }

    #[test]
    fn last_occurrence_of_a_prefix_counts() {
        let table = ObservationTable::new(
            words("ε A A"),
            words("ε"),
            vec![Cell::Reject, Cell::Reject, Cell::Accept],
        );
        let dfa = synthesize(&table).unwrap();
        assert!(dfa.accepts(&word("A")));
    }

    #[test]
    fn json_table_files() {
        let table = ObservationTable::from_json(
            r#"{"table": "1 0\n 0 1", "pref": "ε", "dop_pref": "L R", "suff": "ε"}"#,
        )
        .unwrap();
        assert_eq!(table.base(), 1);
        assert_eq!(table.prefixes(), &words("ε A B")[..]);
        assert_eq!(table.suffixes(), &[Word::epsilon()][..]);
        assert_eq!(table.row(2), &[Cell::Reject][..]);

        let dfa = synthesize(&table).unwrap();
        assert!(dfa.accepts(&Word::epsilon()));
        assert!(!dfa.accepts(&word("A")));
        assert!(!dfa.accepts(&word("B")));
    }

    #[test]
    fn json_defaults_and_errors() {
        let table = ObservationTable::from_json("{}").unwrap();
        // both prefix groups default to [ε]
        assert_eq!(table.prefixes().len(), 2);
        assert_eq!(table.row(0), &[Cell::Reject][..]);

        let lenient =
            ObservationTable::from_json(r#"{"table": "x1 *", "suff": "ε A"}"#).unwrap();
        assert_eq!(lenient.row(0), &[Cell::Reject, Cell::Accept][..]);
        assert_eq!(lenient.row(1), &[Cell::Unknown, Cell::Reject][..]);
        assert!(matches!(
            ObservationTable::from_json(r#"{"pref": "AC"}"#),
            Err(TableError::Word(_))
        ));
        assert!(matches!(
            ObservationTable::from_json("not json"),
            Err(TableError::Json(_))
        ));
        assert!(matches!(
            ObservationTable::load("/definitely/not/here.json"),
            Err(TableError::Io { .. })
        ));
    }

    #[test]
    fn oversized_tables_are_rejected() {
        let tokens = vec!["A"; 5000].join(" ");
        let input = format!(
            r#"{{"table": "", "pref": "{tokens}", "dop_pref": "", "suff": "{tokens}"}}"#
        );
        match ObservationTable::from_json(&input) {
            Err(TableError::Malformed(message)) => assert!(message.contains("too many cells")),
            other => panic!("expected a malformed table, got {other:?}"),
        }

        // the missing `dop_pref` adds the row of ε
        let columns = vec!["A"; 4096].join(" ");
        let rows = vec!["A"; 4095].join(" ");
        let input = format!(r#"{{"pref": "{rows}", "suff": "{columns}"}}"#);
        assert_eq!(ObservationTable::from_json(&input).unwrap().prefixes().len(), 4096);
        let input = format!(r#"{{"pref": "{columns}", "suff": "{columns}"}}"#);
        assert!(ObservationTable::from_json(&input).is_err());
    }

    #[test]
    fn display_shows_all_rows() {
        let table = ObservationTable::new(
            words("ε A"),
            words("ε B"),
            vec![Cell::Accept, Cell::Unknown, Cell::Reject, Cell::Reject],
        );
        let rendered = table.to_string();
        assert!(rendered.contains('?'));
        assert_eq!(rendered.matches(" B ").count(), 1);
    }
}
