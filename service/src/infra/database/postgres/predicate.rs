//! SQL rendering of [`Predicate`]s.

use common::Date;
use derive_more::Display;
use itertools::Itertools as _;
use postgres_types::{FromSql, ToSql};
use uuid::Uuid;

use crate::filter::{Op, Predicate, Value};

/// [`Predicate`] rendered into SQL `AND <condition>` fragments with
/// `$n`-indexed parameters.
///
/// An empty [`Predicate`] renders into no fragments at all, so queries embed
/// the result after a `WHERE TRUE` clause.
#[derive(Debug)]
pub struct SqlPredicate {
    /// Rendered ` AND <condition>` fragments.
    sql: String,

    /// Parameters backing the fragments, in `$n` order.
    params: Vec<Param>,
}

impl SqlPredicate {
    /// Renders the provided [`Predicate`] against columns of the table
    /// aliased as `table`, numbering parameters from `$1`.
    #[must_use]
    pub fn render(predicate: &Predicate, table: &str) -> Self {
        let params = predicate
            .atoms()
            .iter()
            .map(|atom| Param::new(atom.op, &atom.value))
            .collect::<Vec<_>>();
        let sql = predicate
            .atoms()
            .iter()
            .zip(&params)
            .enumerate()
            .format_with("", |(i, (atom, param)), f| {
                f(&format_args!(
                    " AND {table}.{field} {op} ${n}::{cast}",
                    field = atom.field,
                    op = sql_op(atom.op),
                    n = i + 1,
                    cast = param.cast(),
                ))
            })
            .to_string();

        Self { sql, params }
    }

    /// Returns the rendered ` AND <condition>` fragments.
    ///
    /// Empty for an empty [`Predicate`].
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the index the next `$n` parameter after this [`SqlPredicate`]
    /// should use.
    #[must_use]
    pub fn next_index(&self) -> usize {
        self.params.len() + 1
    }

    /// Returns the rendered parameters, in `$n` order.
    #[must_use]
    pub fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(Param::as_sql).collect()
    }
}

/// Single rendered parameter of a [`SqlPredicate`].
#[derive(Clone, Debug)]
enum Param {
    /// Verbatim textual parameter.
    Text(String),

    /// [`LikePattern`] parameter of a substring match.
    Like(LikePattern),

    /// [`Date`] parameter.
    Date(Date),

    /// ID parameter.
    Id(Uuid),
}

impl Param {
    /// Creates a new [`Param`] out of the provided [`Value`].
    fn new(op: Op, value: &Value) -> Self {
        match value {
            Value::Text(v) => match op {
                Op::ContainsIgnoringCase | Op::Contains => {
                    Self::Like(LikePattern::contains(v))
                }
                Op::Equals | Op::AtLeast | Op::AtMost | Op::Before => {
                    Self::Text(v.clone())
                }
            },
            Value::Date(v) => Self::Date(*v),
            Value::Id(v) => Self::Id(*v),
        }
    }

    /// Returns this [`Param`] as a SQL statement parameter.
    fn as_sql(&self) -> &(dyn ToSql + Sync) {
        match self {
            Self::Text(v) => v,
            Self::Like(v) => v,
            Self::Date(v) => v,
            Self::Id(v) => v,
        }
    }

    /// Returns the SQL type this [`Param`] is cast to.
    fn cast(&self) -> &'static str {
        match self {
            Self::Text(_) | Self::Like(_) => "VARCHAR",
            Self::Date(_) => "DATE",
            Self::Id(_) => "UUID",
        }
    }
}

/// Returns the SQL operator representing the provided [`Op`].
fn sql_op(op: Op) -> &'static str {
    match op {
        Op::ContainsIgnoringCase => "ILIKE",
        Op::Contains => "LIKE",
        Op::Equals => "=",
        Op::AtLeast => ">=",
        Op::AtMost => "<=",
        Op::Before => "<",
    }
}

/// SQL `LIKE` pattern matching a substring verbatim.
#[derive(Clone, Debug, Display, Eq, FromSql, PartialEq, ToSql)]
#[postgres(transparent)]
pub struct LikePattern(String);

impl LikePattern {
    /// Creates a new [`LikePattern`] matching the given `input` as a
    /// substring.
    ///
    /// `LIKE` metacharacters of the `input` are escaped, so match only
    /// themselves.
    #[must_use]
    pub fn contains(input: &str) -> Self {
        Self(format!(
            "%{}%",
            input
                .replace('\\', r"\\")
                .replace('%', r"\%")
                .replace('_', r"\_"),
        ))
    }
}
