use std::{fmt::Display, str::FromStr};
use crate::Error;


#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
enum Segment {
    Text(String),
    Placeholder(usize)
}


/// An arithmetic expression in which every die group has been replaced by a
/// positional placeholder `{i}`.
///
/// Templates are produced by [`crate::Pattern::compile`] but can also be written
/// by hand and parsed with [`str::parse`].
///
/// # Examples
/// ```
/// use xdice::Template;
///
/// let template: Template = "{0}+4-{1}".parse().unwrap();
///
/// assert_eq!(template.placeholders().collect::<Vec<_>>(), vec![0, 1]);
/// assert_eq!(template.to_string(), "{0}+4-{1}");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Template {
    segments: Vec<Segment>
}

impl Template {
    pub(crate) fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        match self.segments.last_mut() {
            Some(Segment::Text(last)) => last.push_str(text),
            _ => self.segments.push(Segment::Text(text.to_string()))
        }
    }

    pub(crate) fn push_placeholder(&mut self, index: usize) {
        self.segments.push(Segment::Placeholder(index));
    }

    /// Placeholder indices, left to right.
    pub fn placeholders(&self) -> impl Iterator<Item = usize> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Placeholder(index) => Some(*index),
            Segment::Text(_) => None
        })
    }

    /// Replaces every placeholder with the string produced by `fill`.
    ///
    /// # Errors
    /// Propagates the first error returned by `fill`.
    pub fn render<E>(&self, mut fill: impl FnMut(usize) -> Result<String, E>) -> Result<String, E> {
        let mut rendered = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => rendered.push_str(text),
                Segment::Placeholder(index) => rendered.push_str(&fill(*index)?)
            }
        }

        Ok(rendered)
    }

    /// Same as [`Template::render`] for a `fill` that cannot fail.
    pub(crate) fn fill(&self, mut fill: impl FnMut(usize) -> String) -> String {
        let mut rendered = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => rendered.push_str(text),
                Segment::Placeholder(index) => rendered.push_str(&fill(*index))
            }
        }

        rendered
    }
}

impl Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => write!(f, "{text}")?,
                Segment::Placeholder(index) => write!(f, "{{{index}}}")?
            }
        }

        Ok(())
    }
}

impl FromStr for Template {
    type Err = Error;

    /// Reads `{i}` placeholders; any other brace is a grammar error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut template = Template::default();
        let mut rest = s;

        while let Some(open) = rest.find(['{', '}']) {
            template.push_text(&rest[..open]);

            let after = &rest[open..];
            let close = after.find('}').filter(|_| after.starts_with('{'));
            let index = close
                .map(|close| &after[1..close])
                .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|digits| digits.parse::<usize>().ok());

            match (close, index) {
                (Some(close), Some(index)) => {
                    template.push_placeholder(index);
                    rest = &after[close + 1..];
                },
                _ => return Err(Error::Grammar(s.to_string()))
            }
        }

        template.push_text(rest);
        Ok(template)
    }
}


#[cfg(test)]
mod test {
    use proptest::prelude::*;
    use super::*;


    #[test]
    fn test_parse_template() {
        let template: Template = "max({0}, {1}) - 2".parse().unwrap();

        assert_eq!(template.placeholders().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(template.to_string(), "max({0}, {1}) - 2");
    }

    #[test]
    fn test_parse_template_errors() {
        assert!("{".parse::<Template>().is_err());
        assert!("}".parse::<Template>().is_err());
        assert!("{x}".parse::<Template>().is_err());
        assert!("{}".parse::<Template>().is_err());
        assert!("{-1}".parse::<Template>().is_err());
        assert!("{+1}".parse::<Template>().is_err());
        assert!("{ 1}".parse::<Template>().is_err());
    }

    #[test]
    fn test_render() {
        let template: Template = "{1}*{0}".parse().unwrap();
        let rendered = template.render(|i| Ok::<_, ()>(format!("<{i}>"))).unwrap();

        assert_eq!(rendered, "<1>*<0>");
        assert_eq!(template.render(|i| Err::<String, _>(i)), Err(1));
    }

    #[test]
    fn test_fill() {
        let template: Template = "max({0},{2})-{0}".parse().unwrap();

        assert_eq!(template.fill(|i| format!("[{i}]")), "max([0],[2])-[0]");
        assert_eq!(Template::default().fill(|i| i.to_string()), "");
    }

    #[test]
    fn test_adjacent_text_is_merged() {
        let mut template = Template::default();
        template.push_text("1");
        template.push_text("+");
        template.push_text("");
        template.push_placeholder(0);

        assert_eq!(template.segments.len(), 2);
        assert_eq!(template.to_string(), "1+{0}");
    }

    proptest! {
        #[test]
        fn test_display_parses_back(text in "[0-9+*/() -]{0,8}", indices in prop::collection::vec(0usize..20, 0..5)) {
            let mut template = Template::default();
            for index in &indices {
                template.push_text(&text);
                template.push_placeholder(*index);
            }

            let parsed: Template = template.to_string().parse().unwrap();
            prop_assert_eq!(parsed.placeholders().collect::<Vec<_>>(), indices);
            prop_assert_eq!(parsed, template);
        }
    }
}
