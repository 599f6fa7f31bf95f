use nom::{
    character::complete::{char, digit1, one_of},
    combinator::{opt, recognize},
    sequence::{pair, tuple},
    IResult,
};

const SEPARATORS: [char; 3] = [' ', ',', ';'];

/// Upper-cased option string consumed token by token, e.g.
/// `"hist same ndiv505 lw2"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawOptions {
    opt: String,
    part: String,
}

impl DrawOptions {
    pub fn new(opt: &str) -> Self {
        Self {
            opt: opt.to_uppercase().trim().to_string(),
            part: String::new(),
        }
    }

    /// True when nothing but separators is left.
    pub fn empty(&self) -> bool {
        self.opt
            .chars()
            .all(|c| matches!(c, ' ' | ';' | '_' | ','))
    }

    /// Options not consumed yet.
    pub fn remain(&self) -> &str {
        &self.opt
    }

    /// Text captured after the last option found by [`check_with_part`].
    ///
    /// [`check_with_part`]: DrawOptions::check_with_part
    pub fn part(&self) -> &str {
        &self.part
    }

    /// Removes the first occurrence of `name`, reporting whether it was there.
    pub fn check(&mut self, name: &str) -> bool {
        self.take(name).is_some()
    }

    /// Like [`check`](DrawOptions::check), also capturing the characters up
    /// to the next separator as the option's part.
    pub fn check_with_part(&mut self, name: &str) -> bool {
        let Some(pos) = self.take(name) else {
            return false;
        };
        let end = self.opt[pos..]
            .find(SEPARATORS)
            .map_or(self.opt.len(), |off| pos + off);
        if end > pos {
            self.part = self.opt[pos..end].to_string();
            self.opt.replace_range(pos..end, "");
        }
        true
    }

    fn take(&mut self, name: &str) -> Option<usize> {
        let name = name.to_uppercase();
        let pos = self.opt.find(&name)?;
        self.opt.replace_range(pos..pos + name.len(), "");
        self.part.clear();
        Some(pos)
    }

    /// The captured part as integer plus `offset`, or `default` when it
    /// holds no digits.
    pub fn part_as_int(&self, offset: i64, default: i64) -> i64 {
        let digits: IResult<&str, &str> = digit1(self.numeric_part());
        match digits.ok().and_then(|(_, d)| d.parse::<i64>().ok()) {
            Some(v) => v + offset,
            None => default,
        }
    }

    /// The captured part as float plus `offset`, or `default` when it
    /// holds no number.
    pub fn part_as_float(&self, offset: f64, default: f64) -> f64 {
        match leading_float(self.numeric_part())
            .ok()
            .and_then(|(_, text)| text.parse::<f64>().ok())
        {
            Some(v) if v.is_finite() => v + offset,
            _ => default,
        }
    }

    fn numeric_part(&self) -> &str {
        self.part.trim_start_matches(|c: char| !c.is_ascii_digit())
    }
}

// longest float prefix; an exponent only counts when digits follow it
fn leading_float(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        digit1,
        opt(pair(char('.'), opt(digit1))),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_consumes_tokens() {
        let mut opt = DrawOptions::new("  hist,same ");
        assert_eq!(opt.remain(), "HIST,SAME");
        assert!(opt.check("SAME"));
        assert!(!opt.check("SAME"));
        assert!(!opt.empty());
        assert!(opt.check("hist"));
        assert_eq!(opt.remain(), ",");
        assert!(opt.empty());
    }

    #[test]
    fn separators_only_is_empty() {
        assert!(DrawOptions::new("").empty());
        assert!(DrawOptions::new(" ;_, ").empty());
        assert!(!DrawOptions::new("e1").empty());
    }

    #[test]
    fn parts_parse_as_numbers() {
        let mut opt = DrawOptions::new("ndiv505 lw2.5;fill");
        assert!(opt.check_with_part("NDIV"));
        assert_eq!(opt.part(), "505");
        assert_eq!(opt.part_as_int(0, 510), 505);
        assert_eq!(opt.part_as_int(10, 510), 515);

        assert!(opt.check_with_part("LW"));
        assert_eq!(opt.part(), "2.5");
        assert_eq!(opt.part_as_float(0.5, 1.0), 3.0);
        assert_eq!(opt.remain(), " ;FILL");
    }

    #[test]
    fn parts_skip_leading_non_digits() {
        let mut opt = DrawOptions::new("text_45 pal-3");
        assert!(opt.check_with_part("TEXT"));
        assert_eq!(opt.part(), "_45");
        assert_eq!(opt.part_as_int(0, 0), 45);

        // the sign is a non-digit too
        assert!(opt.check_with_part("PAL"));
        assert_eq!(opt.part_as_int(0, 0), 3);
    }

    #[test]
    fn missing_number_falls_back_to_default() {
        let mut opt = DrawOptions::new("ndiv same");
        assert!(opt.check_with_part("NDIV"));
        assert_eq!(opt.part(), "");
        assert_eq!(opt.part_as_int(5, 510), 510);
        assert_eq!(opt.part_as_float(5.0, 1.5), 1.5);

        let mut opt = DrawOptions::new("lwx");
        assert!(opt.check_with_part("LW"));
        assert_eq!(opt.part(), "X");
        assert_eq!(opt.part_as_float(0.0, 2.0), 2.0);
    }

    #[test]
    fn plain_check_clears_part() {
        let mut opt = DrawOptions::new("lw3 same");
        assert!(opt.check_with_part("LW"));
        assert_eq!(opt.part(), "3");
        assert!(opt.check("SAME"));
        assert_eq!(opt.part(), "");
    }

    #[test]
    fn float_part_ignores_dangling_exponent() {
        let mut opt = DrawOptions::new("lw2e");
        assert!(opt.check_with_part("LW"));
        assert_eq!(opt.part(), "2E");
        assert_eq!(opt.part_as_float(0.0, 7.0), 2.0);

        let mut opt = DrawOptions::new("size1.5e-");
        assert!(opt.check_with_part("SIZE"));
        assert_eq!(opt.part_as_float(0.0, 7.0), 1.5);

        let mut opt = DrawOptions::new("size2.e1x");
        assert!(opt.check_with_part("SIZE"));
        assert_eq!(opt.part_as_float(1.0, 7.0), 21.0);

        let mut opt = DrawOptions::new("size3e2");
        assert!(opt.check_with_part("SIZE"));
        assert_eq!(opt.part_as_float(0.0, 7.0), 300.0);
    }
}
