//! The fixed set of commands the reducer knows, grouped into precedence tiers.
//!
//! Tiers are listed from the tightest binding to the loosest. Within a tier, commands mark
//! their matches in the listed order, so a command whose literal contains another command's
//! literal has to come first (`.*` before `*`, `Tr` before the bare `T` of transposition).

use crate::error::EvalError;
use crate::pattern::{Args, Pattern, PatternError};
use crate::session::Scope;
use matcalc_core::gauss;
use matcalc_core::{ComputationError, Matrix, Value};
use once_cell::sync::Lazy;
use std::fmt;

pub type Compute = fn(&mut Scope<'_>, &Args) -> Result<Option<Value>, EvalError>;

/// Largest number of entries the identity command will allocate.
const MAX_IDENTITY_ENTRIES: u64 = 1 << 24;

pub struct Command {
    pub title: &'static str,
    pub description: &'static str,
    pub patterns: Vec<Pattern>,
    compute: Compute,
}

impl Command {
    pub fn compute(&self, scope: &mut Scope<'_>, args: &Args) -> Result<Option<Value>, EvalError> {
        (self.compute)(scope, args)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("title", &self.title)
            .field("patterns", &self.patterns)
            .finish()
    }
}

struct Definition {
    title: &'static str,
    description: &'static str,
    patterns: &'static [&'static str],
    compute: Compute,
}

#[derive(Debug)]
pub struct Catalog {
    tiers: Vec<Vec<Command>>,
}

static STANDARD: Lazy<Result<Catalog, PatternError>> = Lazy::new(|| Catalog::build(TIERS));

impl Catalog {
    /// The built-in command set.
    pub fn standard() -> Result<&'static Catalog, EvalError> {
        STANDARD
            .as_ref()
            .map_err(|e| EvalError::Internal(format!("invalid built-in pattern: {}", e)))
    }

    fn build(tiers: &[&[Definition]]) -> Result<Catalog, PatternError> {
        let tiers = tiers
            .iter()
            .map(|tier| {
                tier.iter()
                    .map(|def| {
                        let patterns = def
                            .patterns
                            .iter()
                            .map(|p| Pattern::parse(p))
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok(Command {
                            title: def.title,
                            description: def.description,
                            patterns,
                            compute: def.compute,
                        })
                    })
                    .collect::<Result<Vec<_>, PatternError>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Catalog { tiers })
    }

    /// Tiers from the highest precedence to the lowest.
    pub fn tiers(&self) -> impl Iterator<Item = &[Command]> {
        self.tiers.iter().map(Vec::as_slice)
    }

    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.tiers.iter().flatten()
    }

    /// Looks a command up by title or by the literal text of one of its patterns, ignoring
    /// case.
    pub fn find(&self, topic: &str) -> Option<&Command> {
        let topic = topic.trim();
        self.commands().find(|c| {
            c.title.eq_ignore_ascii_case(topic)
                || c.patterns
                    .iter()
                    .any(|p| p.literal.eq_ignore_ascii_case(topic))
        })
    }
}

const TIERS: &[&[Definition]] = &[
    &[
        Definition {
            title: "Variable",
            description: "Reads the value of the variable `name`.",
            patterns: &["${name:name}"],
            compute: variable,
        },
        Definition {
            title: "Random matrix",
            description: "Generates a random matrix. The size and the range of the entries are asked for separately.",
            patterns: &["rand"],
            compute: random_matrix,
        },
        Definition {
            title: "Empty list",
            description: "Creates a list without elements.",
            patterns: &["[]"],
            compute: empty_list,
        },
    ],
    &[Definition {
        title: "Identity matrix",
        description: "An identity matrix scaled by `m` (1 by default). With a size `n` it becomes an ordinary n x n matrix, otherwise its size follows the matrix it meets.",
        patterns: &["{m:Number?} E {n:uint?}"],
        compute: identity,
    }],
    &[
        Definition {
            title: "Trace",
            description: "Sum of the main diagonal of a square matrix.",
            patterns: &["Tr {m:Matrix}", "trace {m:Matrix}"],
            compute: trace,
        },
        Definition {
            title: "Transpose",
            description: "Swaps the rows and the columns of a matrix.",
            patterns: &["i/{m:Matrix} ^ T", "i/{m:Matrix} ^T", "{m:Matrix}T"],
            compute: transpose,
        },
        Definition {
            title: "Canonical form",
            description: "Reduces a matrix to its reduced row echelon form.",
            patterns: &["{m:Matrix} ~"],
            compute: canonical,
        },
    ],
    &[
        Definition {
            title: "Join right",
            description: "Block matrix with `a` on the left and `b` on the right. Row counts must match.",
            patterns: &["{a:Matrix} | {b:Matrix}"],
            compute: join_right,
        },
        Definition {
            title: "Join below",
            description: "Block matrix with `a` on top and `b` below. Column counts must match.",
            patterns: &["{a:Matrix} _ {b:Matrix}"],
            compute: join_below,
        },
    ],
    &[
        Definition {
            title: "Determinant",
            description: "Determinant of a square matrix.",
            patterns: &["i/det {m:Matrix}"],
            compute: determinant,
        },
        Definition {
            title: "Solve",
            description: "Solves a linear system written as an augmented matrix. The last column holds the free terms.",
            patterns: &["i/solve {m:Matrix}"],
            compute: solve,
        },
    ],
    &[Definition {
        title: "Power",
        description: "Raises `o` to the power `p`. Matrices need an integer exponent; a negative one inverts the matrix first.",
        patterns: &["{o:Basic} ^ {p:double}"],
        compute: power,
    }],
    &[
        Definition {
            title: "Element-wise product",
            description: "Multiplies corresponding entries of two matrices of the same size.",
            patterns: &["{a:Matrix} .* {b:Matrix}"],
            compute: multiply_elements,
        },
        Definition {
            title: "Product",
            description: "Multiplies two values. Two matrices give their matrix product.",
            patterns: &["{a:Basic} * {b:Basic}"],
            compute: multiply,
        },
        Definition {
            title: "Quotient",
            description: "Divides `a` by a number or an identity matrix.",
            patterns: &["/{a:Basic} / {b:Basic}"],
            compute: divide,
        },
    ],
    &[
        Definition {
            title: "Sum",
            description: "Adds two values.",
            patterns: &["{a:Basic} + {b:Basic}"],
            compute: add,
        },
        Definition {
            title: "Difference",
            description: "Subtracts `b` from `a`, or negates `b` when there is nothing on the left.",
            patterns: &["{a:Basic?} - {b:Basic}"],
            compute: subtract,
        },
    ],
    &[Definition {
        title: "Append",
        description: "A new list made of the list `xs` followed by `x`.",
        patterns: &["{xs:List} , {x:Basic}"],
        compute: append,
    }],
    &[Definition {
        title: "Assignment",
        description: "Stores the value on the right in the variable `name`. Without a value, a matrix is read interactively.",
        patterns: &["{name:name} = {value:Basic?}"],
        compute: assign,
    }],
];

type Outcome = Result<Option<Value>, EvalError>;

fn variable(scope: &mut Scope<'_>, args: &Args) -> Outcome {
    let value = scope.environment().get_variable(args.name("name")?)?;
    Ok(Some(value))
}

fn random_matrix(scope: &mut Scope<'_>, _args: &Args) -> Outcome {
    Ok(Some(scope.random_matrix()?.into()))
}

fn empty_list(_scope: &mut Scope<'_>, _args: &Args) -> Outcome {
    Ok(Some(Value::List(Vec::new())))
}

fn identity(_scope: &mut Scope<'_>, args: &Args) -> Outcome {
    let scale = match args.opt_value("m")? {
        Some(value) => value.scalar().unwrap_or(1.0),
        None => 1.0,
    };
    let Some(size) = args.opt_uint("n")? else {
        return Ok(Some(Value::IdentityMatrix(scale)));
    };
    if size.saturating_mul(size) > MAX_IDENTITY_ENTRIES {
        return Err(ComputationError::new(format!(
            "an identity matrix of size {} x {} is too large",
            size, size
        ))
        .into());
    }
    let size = size as usize;
    Ok(Some(Matrix::identity(size, size, scale).into()))
}

fn trace(_scope: &mut Scope<'_>, args: &Args) -> Outcome {
    Ok(Some(Value::Number(gauss::trace(args.matrix("m")?)?)))
}

fn transpose(_scope: &mut Scope<'_>, args: &Args) -> Outcome {
    Ok(Some(args.value("m")?.transpose()?))
}

fn canonical(_scope: &mut Scope<'_>, args: &Args) -> Outcome {
    Ok(Some(gauss::canonical(args.matrix("m")?).into()))
}

fn join_right(_scope: &mut Scope<'_>, args: &Args) -> Outcome {
    Ok(Some(args.value("a")?.join_horizontal(args.value("b")?)?))
}

fn join_below(_scope: &mut Scope<'_>, args: &Args) -> Outcome {
    Ok(Some(args.value("a")?.join_vertical(args.value("b")?)?))
}

fn determinant(_scope: &mut Scope<'_>, args: &Args) -> Outcome {
    Ok(Some(Value::Number(gauss::determinant(args.matrix("m")?)?)))
}

fn solve(_scope: &mut Scope<'_>, args: &Args) -> Outcome {
    Ok(Some(gauss::solve(args.matrix("m")?).into()))
}

fn power(_scope: &mut Scope<'_>, args: &Args) -> Outcome {
    Ok(Some(args.value("o")?.power(args.double("p")?)?))
}

fn multiply_elements(_scope: &mut Scope<'_>, args: &Args) -> Outcome {
    Ok(Some(args.value("a")?.multiply_elements(args.value("b")?)?))
}

fn multiply(_scope: &mut Scope<'_>, args: &Args) -> Outcome {
    Ok(Some(args.value("a")?.multiply(args.value("b")?)?))
}

fn divide(_scope: &mut Scope<'_>, args: &Args) -> Outcome {
    Ok(Some(args.value("a")?.divide(args.value("b")?)?))
}

fn add(_scope: &mut Scope<'_>, args: &Args) -> Outcome {
    Ok(Some(args.value("a")?.add(args.value("b")?)?))
}

fn subtract(_scope: &mut Scope<'_>, args: &Args) -> Outcome {
    let b = args.value("b")?;
    let result = match args.opt_value("a")? {
        Some(a) => a.subtract(b)?,
        None => b.negate()?,
    };
    Ok(Some(result))
}

fn append(_scope: &mut Scope<'_>, args: &Args) -> Outcome {
    Ok(Some(args.value("xs")?.append(args.value("x")?.clone())?))
}

fn assign(scope: &mut Scope<'_>, args: &Args) -> Outcome {
    let name = args.name("name")?;
    let value = match args.opt_value("value")? {
        Some(value) => value.clone(),
        None => scope.read_matrix()?.into(),
    };
    scope
        .environment()
        .set_variable(name, Some(value.clone()));
    Ok(Some(value))
}
