//! Interactive host: prompts on the terminal through a line editor.

use matcalc_core::{ComputationError, Matrix, Value};
use matcalc_engine::{matrix_from_text, EvalError, Evaluate, Host};
use rand::Rng;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Largest number of entries a generated matrix may have.
const MAX_RANDOM_ENTRIES: usize = 1 << 20;

pub struct ConsoleHost {
    editor: DefaultEditor,
}

impl ConsoleHost {
    pub fn new() -> rustyline::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }

    pub fn read_line(&mut self, prompt: &str) -> rustyline::Result<String> {
        self.editor.readline(prompt)
    }

    pub fn add_history(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            log::debug!("Failed to record history: {}", e);
        }
    }

    fn prompt(&mut self, prompt: &str) -> Result<String, EvalError> {
        self.editor.readline(prompt).map_err(|err| match err {
            ReadlineError::Interrupted | ReadlineError::Eof => {
                ComputationError::new("input was cancelled").into()
            }
            other => EvalError::Internal(format!("terminal error: {}", other)),
        })
    }

    /// Asks until the answer evaluates to a number.
    fn ask_number(&mut self, question: &str, eval: &mut Evaluate<'_>) -> Result<f64, EvalError> {
        println!("{}", question);
        loop {
            let answer = self.prompt("> ")?;
            if answer.trim().is_empty() {
                continue;
            }
            match eval(&answer) {
                Ok(Some(Value::Number(x))) => return Ok(x),
                Ok(Some(other)) => println!("Expected a number, got {}.", other),
                Ok(None) => println!("Expected a number."),
                Err(e) => println!("{}: {}", e.category(), e),
            }
        }
    }

    fn ask_count(&mut self, question: &str, eval: &mut Evaluate<'_>) -> Result<usize, EvalError> {
        loop {
            let x = self.ask_number(question, eval)?;
            if x.fract() == 0.0 && x >= 1.0 && x <= MAX_RANDOM_ENTRIES as f64 {
                return Ok(x as usize);
            }
            println!("Expected a positive whole number.");
        }
    }

    fn ask_yes_no(&mut self, question: &str) -> Result<bool, EvalError> {
        loop {
            let answer = self.prompt(&format!("{} (y/n) ", question))?;
            match answer.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
                Some('y') => return Ok(true),
                Some('n') => return Ok(false),
                _ => {}
            }
        }
    }
}

/// Fills a `rows x cols` matrix with values drawn uniformly from `[min, max]`, rounded to
/// whole numbers when `integers` is set.
pub fn random_matrix(
    rng: &mut impl Rng,
    rows: usize,
    cols: usize,
    min: f64,
    max: f64,
    integers: bool,
) -> Result<Matrix, EvalError> {
    if !min.is_finite() || !max.is_finite() || min > max || !(max - min).is_finite() {
        return Err(ComputationError::new(format!(
            "cannot draw values between {} and {}",
            min, max
        ))
        .into());
    }
    let entries = rows.checked_mul(cols).filter(|&n| n <= MAX_RANDOM_ENTRIES);
    let Some(entries) = entries else {
        return Err(ComputationError::new(format!(
            "a random matrix of size {} x {} is too large",
            rows, cols
        ))
        .into());
    };

    let data = if integers {
        let (low, high) = (min.ceil() as i64, max.floor() as i64);
        if low > high {
            return Err(ComputationError::new(format!(
                "there are no whole numbers between {} and {}",
                min, max
            ))
            .into());
        }
        (0..entries).map(|_| rng.gen_range(low..=high) as f64).collect()
    } else {
        (0..entries).map(|_| rng.gen_range(min..=max)).collect()
    };
    Ok(Matrix::from_vec(rows, cols, data)?)
}

impl Host for ConsoleHost {
    fn random_matrix(&mut self, eval: &mut Evaluate<'_>) -> Result<Matrix, EvalError> {
        println!("Generating a random matrix.");
        let rows = self.ask_count("Number of rows:", eval)?;
        let cols = self.ask_count("Number of columns:", eval)?;
        let integers = self.ask_yes_no("Whole numbers only?")?;
        let min = self.ask_number("Minimum value:", eval)?;
        let max = self.ask_number("Maximum value:", eval)?;
        random_matrix(&mut rand::thread_rng(), rows, cols, min, max, integers)
    }

    fn read_matrix(&mut self, eval: &mut Evaluate<'_>) -> Result<Matrix, EvalError> {
        println!("Enter the matrix, one row per line, entries separated by spaces.");
        println!("Rows may also be separated by `;`. Finish with an empty line.");
        let mut lines = Vec::new();
        loop {
            let line = self.prompt("| ")?;
            if line.trim().is_empty() {
                break;
            }
            lines.push(line);
        }
        matrix_from_text(&lines.join("\n"), eval)
    }

    fn warn_extreme_magnitude(&mut self, low: f64, high: f64) {
        eprintln!(
            "warning: results with magnitudes below {} or above {} may be imprecise",
            low, high
        );
    }
}
