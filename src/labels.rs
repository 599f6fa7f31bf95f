use serde::{Deserialize, Serialize};

use crate::format::{float_to_string, DEFAULT_FORMAT};
use crate::number::{js_round, to_exponential, to_fixed, to_js_string};

/// How labels are marked up for the text renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatexMode {
    /// Plain Unicode text.
    #[default]
    Off,
    /// `#times` instead of `x`, superscripts still Unicode.
    Symbols,
    /// Full `^{...}` markup.
    Normal,
    MathJax,
    AlwaysMathJax,
}

/// What a label is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRole {
    /// Tooltips, statistics boxes and other free-standing values.
    Value,
    /// Major tick labels.
    Tick,
    /// Tick labels that must stay in plain positional notation.
    PlainTick,
}

impl LabelRole {
    fn is_tick(self) -> bool {
        !matches!(self, LabelRole::Value)
    }
}

/// Per-axis label settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisLabels {
    /// Base of a logarithmic axis.
    pub log_base: f64,
    /// Power of ten factored out of tick labels on normal axes.
    pub order: i32,
    /// Decimals of tick labels; above 10 switches to exponential
    /// with `ndig - 11` digits.
    pub ndig: u32,
    /// Label every log tick, not only integral powers of the base.
    pub more_log_labels: bool,
    /// Write log tick labels positionally instead of as powers.
    pub no_exp: bool,
    pub latex: LatexMode,
    /// Format used for non-tick values when the caller passes none.
    pub stat_format: String,
}

impl Default for AxisLabels {
    fn default() -> Self {
        Self {
            log_base: 10.0,
            order: 0,
            ndig: 0,
            more_log_labels: false,
            no_exp: false,
            latex: LatexMode::Off,
            stat_format: DEFAULT_FORMAT.to_string(),
        }
    }
}

impl AxisLabels {
    /// Label on a linear axis.
    pub fn format_normal(&self, value: f64, role: LabelRole, fmt: Option<&str>) -> String {
        let mut val = value;
        if role.is_tick() && self.order != 0 {
            val /= 10f64.powi(self.order);
        }

        if val == js_round(val) {
            return if val.abs() < 1e9 {
                to_fixed(val, 0)
            } else {
                to_exponential(val, 4)
            };
        }

        if role.is_tick() {
            return if self.ndig > 10 {
                to_exponential(val, (self.ndig - 11) as usize)
            } else {
                to_fixed(val, self.ndig as usize)
            };
        }

        float_to_string(val, fmt.unwrap_or(&self.stat_format))
    }

    /// Label on a logarithmic axis. Ticks away from integral powers of the
    /// base get no label unless `more_log_labels` is set.
    pub fn format_log(&self, value: f64, role: LabelRole, fmt: Option<&str>) -> Option<String> {
        if !role.is_tick() {
            let rnd = js_round(value);
            return Some(if rnd == value && rnd.abs() < 1e9 {
                to_js_string(rnd)
            } else {
                float_to_string(value, fmt.unwrap_or(&self.stat_format))
            });
        }
        if value <= 0.0 {
            return None;
        }

        let base = self.log_base;
        let mut vlog = value.log10();
        if base != 10.0 {
            vlog /= base.log10();
        }
        if !self.more_log_labels && (vlog - js_round(vlog)).abs() >= 0.001 {
            return None;
        }

        if !self.no_exp && role != LabelRole::PlainTick {
            return Some(self.format_exp(base, (vlog + 0.01).floor() as i32, value));
        }
        Some(if vlog < 0.0 {
            to_fixed(value, js_round(-vlog + 0.5) as usize)
        } else {
            to_fixed(value, 0)
        })
    }

    /// `[<mult>x]<base><order>` with the order as superscript.
    pub fn format_exp(&self, base: f64, order: i32, value: f64) -> String {
        let mut res = String::new();
        if value != 0.0 && !value.is_nan() {
            let mult = js_round(value / base.powi(order));
            if mult != 0.0 && mult != 1.0 {
                res.push_str(&to_js_string(mult));
                res.push_str(if self.latex == LatexMode::Off { "x" } else { "#times" });
            }
        }

        if (base - std::f64::consts::E).abs() < 0.001 {
            res.push('e');
        } else {
            res.push_str(&to_js_string(base));
        }

        if self.latex > LatexMode::Symbols {
            res.push_str(&format!("^{{{}}}", order));
            return res;
        }
        res.extend(order.to_string().chars().filter_map(superscript));
        res
    }
}

fn superscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '\u{2070}',
        '1' => '\u{00B9}',
        '2' => '\u{00B2}',
        '3' => '\u{00B3}',
        '4' => '\u{2074}',
        '5' => '\u{2075}',
        '6' => '\u{2076}',
        '7' => '\u{2077}',
        '8' => '\u{2078}',
        '9' => '\u{2079}',
        '-' => '\u{207B}',
        _ => return None,
    })
}

/// Picks a strftime-style pattern for a time axis spanning `width`
/// seconds. Tick labels get the compact variants.
pub fn choose_time_format(width: f64, for_ticks: bool) -> &'static str {
    let pick = |tick: &'static str, full: &'static str| if for_ticks { tick } else { full };

    let mut w = width;
    if w < 0.5 {
        return pick("%S.%L", "%H:%M:%S.%L");
    }
    if w < 30.0 {
        return pick("%Mm%S", "%H:%M:%S");
    }
    w /= 60.0;
    if w < 30.0 {
        return pick("%Hh%M", "%d/%m %H:%M");
    }
    w /= 60.0;
    if w < 12.0 {
        return pick("%d-%Hh", "%d/%m/%y %Hh");
    }
    w /= 24.0;
    if w < 15.218425 {
        return pick("%d/%m", "%d/%m/%y");
    }
    w /= 30.43685;
    if w < 6.0 {
        return "%d/%m/%y";
    }
    w /= 12.0;
    if w < 2.0 {
        return pick("%m/%y", "%d/%m/%y");
    }
    "%Y"
}
