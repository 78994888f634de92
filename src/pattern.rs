use std::fmt::Display;
use rand::Rng;
use crate::{Dice, Error, Score, Template};
use crate::notation;
use crate::parser::{self, EvalError};
use crate::score::integer_like;


/// A dice-notation pattern such as `"3d6+4-1d4l1"` or `"max(d20, d20) + 5"`.
///
/// Compiling a pattern extracts each die group, left to right, and replaces it
/// with a placeholder in a [`Template`]. Rolling resolves every die group and
/// evaluates the template with the totals substituted.
///
/// # Examples
/// ```
/// use xdice::Pattern;
///
/// let mut pattern = Pattern::new("1d6 + 4").unwrap();
/// pattern.compile().unwrap();
///
/// assert_eq!(pattern.source(), "1d6+4");
/// assert_eq!(pattern.template().to_string(), "{0}+4");
/// assert_eq!(pattern.dice()[0].name(), "1d6");
///
/// let score = pattern.roll().unwrap();
/// assert!(score >= 5i64 && score <= 10i64);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    source: String,
    dice: Vec<Dice>,
    template: Template,
    compiled: bool
}

impl Pattern {
    /// Creates an uncompiled pattern from `input`, normalized (whitespace
    /// removed, lowercased, `d%` expanded).
    ///
    /// # Errors
    /// Returns [`Error::Grammar`] if `input` is empty or only whitespace.
    pub fn new(input: &str) -> Result<Self, Error> {
        let source = notation::normalize(input);
        if source.is_empty() {
            return Err(Error::Grammar(input.to_string()));
        }

        Ok(Self {
            source,
            dice: Vec::new(),
            template: Template::default(),
            compiled: false
        })
    }

    /// Normalized source of the pattern.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Die groups found by [`Pattern::compile`], in order of appearance.
    pub fn dice(&self) -> &[Dice] {
        &self.dice
    }

    /// Template built by [`Pattern::compile`]. Empty before compilation.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Whether [`Pattern::compile`] has succeeded on this pattern.
    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    /// Extracts the die groups and builds the template.
    ///
    /// Both are derived from the source every time, so compiling again yields the
    /// same result. On error the pattern is left as it was.
    ///
    /// # Errors
    /// Returns the [`Error::Validation`] of the first invalid die group.
    pub fn compile(&mut self) -> Result<(), Error> {
        let mut dice = Vec::new();
        let mut template = Template::default();
        let mut position = 0;

        for found in notation::find_all(&self.source) {
            template.push_text(&self.source[position..found.span.start]);
            template.push_placeholder(dice.len());
            dice.push(Dice::from_match(&found)?);
            position = found.span.end;
        }
        template.push_text(&self.source[position..]);

        tracing::debug!(source = %self.source, template = %template, dice = dice.len(), "compiled pattern");

        self.dice = dice;
        self.template = template;
        self.compiled = true;
        Ok(())
    }

    /// Compiles the pattern if needed, then rolls it with the thread-local
    /// random generator.
    ///
    /// # Errors
    /// - Any error of [`Pattern::compile`].
    /// - [`Error::Evaluation`] if the resulting arithmetic cannot be evaluated,
    ///   e.g. `"1d6/0"` or `"foo(1d6)"`.
    pub fn roll(&mut self) -> Result<PatternScore, Error> {
        self.roll_with(&mut rand::rng())
    }

    /// Same as [`Pattern::roll`] using `rng` as the random source.
    ///
    /// # Errors
    /// See [`Pattern::roll`].
    pub fn roll_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<PatternScore, Error> {
        if !self.compiled {
            self.compile()?;
        }

        let scores = self.dice.iter()
            .map(|dice| dice.roll_with(rng))
            .collect();

        let score = PatternScore::new(self.template.clone(), scores)?;
        tracing::debug!(source = %self.source, total = score.total(), "rolled pattern");
        Ok(score)
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}


/// The result of rolling a [`Pattern`].
///
/// Like [`Score`], it behaves as its integer total and keeps the individual
/// scores, one per die group of the pattern.
///
/// # Examples
/// ```
/// use xdice::{PatternScore, Score};
///
/// let template = "{0}+4".parse().unwrap();
/// let score = PatternScore::new(template, vec![Score::new(vec![5], vec![], "1d6")]).unwrap();
///
/// assert_eq!(score, 9i64);
/// assert_eq!(score.format(false), "[5]+4");
/// assert_eq!(score.format(true), " 1d6 (scores:[5]) +4");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PatternScore {
    total: i64,
    scores: Vec<Score>,
    template: Template
}

impl PatternScore {
    /// Evaluates `template` with each placeholder `{i}` replaced by the total of
    /// `scores[i]`. A real-valued result is truncated toward zero.
    ///
    /// # Errors
    /// Returns [`Error::Evaluation`] if a placeholder has no matching score or
    /// the substituted text is rejected by the evaluator.
    pub fn new(template: Template, scores: Vec<Score>) -> Result<Self, Error> {
        let expression = template.render(|index| {
            scores.get(index)
                .map(|score| score.total().to_string())
                .ok_or(EvalError::UnboundPlaceholder(index))
        })?;

        let total = parser::evaluate(&expression)?.to_integer()?;
        Ok(Self { total, scores, template })
    }

    /// The evaluated result.
    pub fn total(&self) -> i64 {
        self.total
    }

    /// Score of the `i`-th die group.
    ///
    /// # Errors
    /// Returns [`Error::Index`] if `i` is out of range.
    pub fn score(&self, i: usize) -> Result<&Score, Error> {
        self.scores.get(i).ok_or(Error::Index { index: i, len: self.scores.len() })
    }

    /// All scores, aligned with [`Pattern::dice`].
    pub fn scores(&self) -> &[Score] {
        &self.scores
    }

    /// Template the pattern was compiled to.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Renders the template with every placeholder replaced by the matching
    /// [`Score::format`], e.g. `"[1,5,6]+4"` for `"3d6+4"`.
    pub fn format(&self, verbose: bool) -> String {
        self.template.fill(|index| {
            self.scores.get(index).map(|score| score.format(verbose)).unwrap_or_default()
        })
    }
}

impl Display for PatternScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.total)
    }
}

integer_like!(PatternScore);
