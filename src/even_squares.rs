//! Sum of the squares of the even numbers in a list, plus the input
//! handling behind the `evensq` tool.

use std::fmt;

use thiserror::Error;

/// Lists shown by `evensq demo`.
pub const DEMO_CASES: &[&[i64]] = &[
    &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10],
    &[2, 4, 6, 8],
    &[1, 3, 5, 7, 9],
    &[0, 1, 2, 3, 4],
    &[10, 20, 30, 40, 50],
];

/// Lists shown by `evensq walkthrough`, followed by [`CUSTOM_CASE`].
pub const WALKTHROUGH_CASES: &[&[i64]] = &[
    &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10],
    &[2, 4, 6, 8],
    &[1, 3, 5, 7, 9],
    &[0, 1, 2, 3, 4],
    &[10, 20, 30, 40, 50],
    &[],
];

pub const CUSTOM_CASE: &[i64] = &[12, 15, 18, 21, 24, 27, 30];

/// Sum of `x²` over the even `x` in `numbers`. Empty or all-odd input gives 0.
///
/// Accumulates in `i128`, where the square of any `i64` fits, so the result
/// is exact for every input a caller can hold in memory.
pub fn even_squares_sum(numbers: &[i64]) -> i128 {
    numbers
        .iter()
        .filter(|x| *x % 2 == 0)
        .map(|&x| square(x))
        .sum()
}

fn square(x: i64) -> i128 {
    let x = i128::from(x);
    x * x
}

/// Every intermediate step of [`even_squares_sum`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakdown {
    pub input: Vec<i64>,
    pub evens: Vec<i64>,
    pub squares: Vec<i128>,
    pub sum: i128,
}

impl Breakdown {
    pub fn new(numbers: &[i64]) -> Self {
        let evens: Vec<i64> = numbers.iter().copied().filter(|x| x % 2 == 0).collect();
        let squares = evens.iter().map(|&x| square(x)).collect();
        Self {
            input: numbers.to_vec(),
            sum: even_squares_sum(numbers),
            evens,
            squares,
        }
    }

    pub fn has_evens(&self) -> bool {
        !self.evens.is_empty()
    }

    /// The sum written out, e.g. `2² + 4² = 20`. `None` without evens.
    pub fn calculation(&self) -> Option<String> {
        if self.evens.is_empty() {
            return None;
        }
        let terms: Vec<String> = self.evens.iter().map(|x| format!("{x}²")).collect();
        Some(format!("{} = {}", terms.join(" + "), self.sum))
    }
}

impl fmt::Display for Breakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "   input:   {:?}", self.input)?;
        writeln!(f, "   evens:   {:?}", self.evens)?;
        if self.has_evens() {
            writeln!(f, "   squares: {:?}", self.squares)?;
            write!(f, "   sum:     {}", self.sum)
        } else {
            write!(f, "   no even numbers, result: {}", self.sum)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseNumbersError {
    #[error("not a valid integer: {0:?}")]
    InvalidNumber(String),
    #[error("enter at least one number")]
    Empty,
}

/// Parse a comma-separated list such as `"1, 2,3"`. Empty segments are ignored.
pub fn parse_number_list(line: &str) -> Result<Vec<i64>, ParseNumbersError> {
    let numbers = line
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<i64>()
                .map_err(|_| ParseNumbersError::InvalidNumber(token.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if numbers.is_empty() {
        return Err(ParseNumbersError::Empty);
    }
    Ok(numbers)
}

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// Blank line; prompt again.
    Empty,
    Numbers(Vec<i64>),
}

impl Command {
    pub fn from_line(line: &str) -> Result<Self, ParseNumbersError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Command::Empty);
        }
        if ["quit", "exit", "q"]
            .iter()
            .any(|word| line.eq_ignore_ascii_case(word))
        {
            return Ok(Command::Quit);
        }
        parse_number_list(line).map(Command::Numbers)
    }
}
