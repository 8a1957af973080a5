//! Path Expression Compiler
//!
//! Compiles `a|b[n]/*/@attr` style paths into steps. `@attr` may only
//! come last.

use crate::core::scanner::is_name;
use std::fmt;

/// Compiled path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPath {
    pub steps: Vec<Step>,
}

/// One compiled segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// `.`
    Current,
    /// `@name`
    Attribute(String),
    /// `a|b|*`, optionally `[n]` (0-based, over the whole alternation)
    Elements {
        terms: Vec<NameTest>,
        index: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTest {
    Any,
    Name(String),
}

impl NameTest {
    #[inline]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameTest::Any => true,
            NameTest::Name(n) => n == name,
        }
    }
}

impl fmt::Display for NameTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameTest::Any => f.write_str("*"),
            NameTest::Name(n) => f.write_str(n),
        }
    }
}

impl Step {
    /// The alternation without its index, e.g. `b|c`
    pub fn terms_label(&self) -> String {
        match self {
            Step::Elements { terms, .. } => terms
                .iter()
                .map(NameTest::to_string)
                .collect::<Vec<_>>()
                .join("|"),
            Step::Current => ".".to_string(),
            Step::Attribute(name) => format!("@{name}"),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.terms_label())?;
        if let Step::Elements {
            index: Some(index), ..
        } = self
        {
            write!(f, "[{index}]")?;
        }
        Ok(())
    }
}

/// Compile a path expression string
pub fn compile(path: &str) -> Result<CompiledPath, String> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Ok(CompiledPath { steps: Vec::new() });
    }

    let segments: Vec<&str> = trimmed.split('/').collect();
    let last = segments.len() - 1;
    let mut steps = Vec::with_capacity(segments.len());

    for (i, segment) in segments.into_iter().enumerate() {
        let step = compile_segment(segment)?;
        if matches!(step, Step::Attribute(_)) && i != last {
            return Err(format!("attribute segment '{segment}' must be last"));
        }
        steps.push(step);
    }

    Ok(CompiledPath { steps })
}

fn compile_segment(segment: &str) -> Result<Step, String> {
    if segment.is_empty() {
        return Err("empty segment".to_string());
    }
    if segment == "." {
        return Ok(Step::Current);
    }
    if let Some(name) = segment.strip_prefix('@') {
        if !is_name(name) {
            return Err(format!("invalid attribute name '{name}'"));
        }
        return Ok(Step::Attribute(name.to_string()));
    }

    let (alternation, index) = split_index(segment)?;
    let terms = alternation
        .split('|')
        .map(|term| match term {
            "*" => Ok(NameTest::Any),
            name if is_name(name) => Ok(NameTest::Name(name.to_string())),
            other => Err(format!("invalid element name '{other}'")),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Step::Elements { terms, index })
}

/// Split `name[3]` into `("name", Some(3))`
fn split_index(segment: &str) -> Result<(&str, Option<usize>), String> {
    let Some(body) = segment.strip_suffix(']') else {
        return Ok((segment, None));
    };
    let Some(open) = body.rfind('[') else {
        return Err(format!("unbalanced index in '{segment}'"));
    };

    let digits = &body[open + 1..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid index '{digits}'"));
    }
    let index = digits
        .parse::<usize>()
        .map_err(|e| format!("invalid index '{digits}': {e}"))?;

    Ok((&body[..open], Some(index)))
}
