//! Compact format specs (`"6.4g"`, `"8.3e"`, `"5.2W"`) and the formatting
//! rules behind statistics boxes and axis labels.
//!
//! The grammar is `<width>.<precision><letter>`. Width is carried along but
//! never affects the output. The letters are:
//!
//! | letter  | representation                                   |
//! |---------|--------------------------------------------------|
//! | `e` `E` | exponential, `precision` digits after the point  |
//! | `Q`     | exponential, `precision` significant digits      |
//! | `f` `F` | fixed, `precision` digits after the point        |
//! | `W`     | fixed, `precision` significant digits            |
//! | `g` `G` | the shorter of `Q` and `W`                       |

use std::fmt;

use log::debug;
use nom::{
    character::complete::{digit1, multispace0, one_of},
    combinator::{opt, recognize},
    sequence::{pair, preceded},
    IResult,
};

use crate::number::{to_exponential, to_fixed, MAX_DIGITS};

pub const DEFAULT_FORMAT: &str = "6.4g";

const DEFAULT_PRECISION: u32 = 4;
const MAX_SIGNIFICANT_PRECISION: i64 = 20;
const USED_WIDTH: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Fixed,
    Exponential,
    General,
    SignificantFixed,
    SignificantExponential,
}

impl FormatKind {
    fn from_letter(c: char) -> Option<Self> {
        match c {
            'e' | 'E' => Some(Self::Exponential),
            'Q' => Some(Self::SignificantExponential),
            'f' | 'F' => Some(Self::Fixed),
            'W' => Some(Self::SignificantFixed),
            'g' | 'G' => Some(Self::General),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Self::Fixed => 'f',
            Self::Exponential => 'e',
            Self::General => 'g',
            Self::SignificantFixed => 'W',
            Self::SignificantExponential => 'Q',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatSpec {
    pub width: Option<u32>,
    pub precision: u32,
    pub kind: FormatKind,
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self {
            width: Some(6),
            precision: DEFAULT_PRECISION,
            kind: FormatKind::General,
        }
    }
}

impl FormatSpec {
    /// Parses a spec. Returns `None` when the text is too short to carry
    /// a kind letter; an empty spec is the default `"6.4g"`.
    ///
    /// Never fails otherwise: an unknown letter means fixed with four
    /// digits, a missing or non-positive precision means four.
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Some(Self::default());
        }
        let mut chars = spec.chars();
        let letter = chars.next_back()?;
        let body = chars.as_str();
        if body.is_empty() {
            return None;
        }

        let (width_text, precision_text) = match body.split_once('.') {
            Some((w, p)) => (w, Some(p)),
            None => (body, None),
        };
        let width = js_parse_int(width_text).and_then(|w| u32::try_from(w).ok());
        let precision = precision_text
            .and_then(js_parse_int)
            .filter(|p| *p > 0)
            .map(|p| p.min(MAX_DIGITS as i64) as u32)
            .unwrap_or(DEFAULT_PRECISION);

        Some(match FormatKind::from_letter(letter) {
            Some(kind) => Self {
                width,
                precision,
                kind,
            },
            None => {
                debug!("unknown format letter '{}' in '{}', using fixed", letter, spec);
                Self {
                    width,
                    precision: DEFAULT_PRECISION,
                    kind: FormatKind::Fixed,
                }
            }
        })
    }

    fn used(precision: i64, kind: FormatKind) -> Self {
        Self {
            width: Some(USED_WIDTH),
            precision: precision.max(0) as u32,
            kind,
        }
    }
}

impl fmt::Display for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(width) = self.width {
            write!(f, "{}", width)?;
        }
        write!(f, ".{}{}", self.precision, self.kind.letter())
    }
}

/// A formatted value together with the spec that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatted {
    pub text: String,
    pub spec: FormatSpec,
}

impl fmt::Display for Formatted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Formats `value` according to `spec` (`"6.4g"` when empty).
pub fn float_to_string(value: f64, spec: &str) -> String {
    float_to_string_with_spec(value, spec).text
}

/// Like [`float_to_string`], also reporting the representation actually
/// chosen, e.g. `("0.1", "5.1f")`.
pub fn float_to_string_with_spec(value: f64, spec: &str) -> Formatted {
    match FormatSpec::parse(spec) {
        Some(spec) => format_with(value, spec),
        None => {
            debug!("format spec '{}' too short, using fixed", spec);
            Formatted {
                text: to_fixed(value, DEFAULT_PRECISION as usize),
                spec: FormatSpec {
                    kind: FormatKind::Fixed,
                    ..FormatSpec::default()
                },
            }
        }
    }
}

pub fn format_with(value: f64, spec: FormatSpec) -> Formatted {
    match spec.kind {
        FormatKind::General => {
            let exp = format_exponential(value, spec.precision, true);
            let fixed = format_fixed(value, spec.precision, true);
            // equal lengths keep the fixed form
            if exp.text.len() < fixed.text.len() {
                exp
            } else {
                fixed
            }
        }
        FormatKind::Exponential => format_exponential(value, spec.precision, false),
        FormatKind::SignificantExponential => format_exponential(value, spec.precision, true),
        FormatKind::Fixed => format_fixed(value, spec.precision, false),
        FormatKind::SignificantFixed => format_fixed(value, spec.precision, true),
    }
}

fn format_exponential(value: f64, precision: u32, significant: bool) -> Formatted {
    let mut prec = i64::from(precision);
    // one significant digit sits before the point
    if significant {
        prec -= 1;
    }
    let prec = prec.max(0);
    Formatted {
        text: to_exponential(value, prec as usize),
        spec: FormatSpec::used(prec, FormatKind::Exponential),
    }
}

fn format_fixed(value: f64, precision: u32, significant: bool) -> Formatted {
    let requested = i64::from(precision);
    let mut prec = requested;
    let mut text = to_fixed(value, prec as usize);

    if significant {
        if value != 0.0 && prec > 0 && text.parse::<f64>().is_ok_and(|v| v == 0.0) {
            prec = MAX_SIGNIFICANT_PRECISION;
            text = to_fixed(value, prec as usize);
        }

        let lead = text
            .bytes()
            .take_while(|b| matches!(b, b'0' | b'-' | b'.'))
            .count();
        // significant characters beyond the requested count
        let mut diff = text.len() as i64 - lead as i64 - requested;
        if text.find('.').is_some_and(|pos| pos > lead) {
            diff -= 1;
        }

        if diff != 0 {
            prec = (prec - diff).clamp(0, MAX_SIGNIFICANT_PRECISION);
            text = to_fixed(value, prec as usize);
        }
    }

    Formatted {
        text,
        spec: FormatSpec::used(prec, FormatKind::Fixed),
    }
}

fn leading_int(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, recognize(pair(opt(one_of("+-")), digit1)))(input)
}

/// `parseInt(text, 10)`: leading integer, `None` for NaN.
pub(crate) fn js_parse_int(text: &str) -> Option<i64> {
    let (_, digits) = leading_int(text).ok()?;
    digits.parse().ok()
}
