//! Data-to-device scales and the tick generators behind them.
//!
//! Tick generation follows d3 (`d3.ticks`, `scaleLog().ticks`), including
//! the near-arithmetic log ticks it returns for narrow decade ranges, which
//! [`crate::ticks::produce_log_ticks`] corrects for.

use std::f64::consts::E;

use crate::number::js_round;

/// What tick production needs from an axis scale.
pub trait TickScale {
    /// Roughly `count` ticks inside the domain, ordered like the domain.
    fn ticks(&self, count: usize) -> Vec<f64>;

    fn domain(&self) -> (f64, f64);

    /// Base of a logarithmic scale, `None` for linear ones.
    fn log_base(&self) -> Option<f64> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Maps a data value to device coordinates.
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }
}

impl TickScale for LinearScale {
    fn ticks(&self, count: usize) -> Vec<f64> {
        nice_ticks(self.domain.0, self.domain.1, count as f64)
    }

    fn domain(&self) -> (f64, f64) {
        self.domain
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
    pub base: f64,
}

impl LogScale {
    pub fn new(domain: (f64, f64), range: (f64, f64), base: f64) -> Self {
        Self {
            domain,
            range,
            base,
        }
    }

    /// Domains entirely below zero are mirrored.
    fn reflected(&self) -> bool {
        self.domain.0 < 0.0
    }

    fn logs(&self, x: f64) -> f64 {
        if self.reflected() {
            -self.log(-x)
        } else {
            self.log(x)
        }
    }

    fn pows(&self, x: f64) -> f64 {
        if self.reflected() {
            -self.pow(-x)
        } else {
            self.pow(x)
        }
    }

    fn log(&self, x: f64) -> f64 {
        if self.base == E {
            x.ln()
        } else if self.base == 10.0 {
            x.log10()
        } else if self.base == 2.0 {
            x.log2()
        } else {
            x.ln() / self.base.ln()
        }
    }

    fn pow(&self, x: f64) -> f64 {
        if self.base == E {
            x.exp()
        } else if self.base == 10.0 {
            pow10(x)
        } else {
            self.base.powf(x)
        }
    }

    pub fn map(&self, value: f64) -> f64 {
        let (r0, r1) = self.range;
        let l0 = self.logs(self.domain.0);
        let l1 = self.logs(self.domain.1);
        if l1 == l0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (self.logs(value) - l0) / (l1 - l0) * (r1 - r0)
    }
}

impl TickScale for LogScale {
    fn ticks(&self, count: usize) -> Vec<f64> {
        let (mut u, mut v) = self.domain;
        let reverse = v < u;
        if reverse {
            std::mem::swap(&mut u, &mut v);
        }
        let mut i = self.logs(u);
        let mut j = self.logs(v);
        let n = count as f64;
        let base = self.base;

        let mut z = Vec::new();
        if base.fract() == 0.0 && j - i < n {
            i = i.floor();
            j = j.ceil();
            let multipliers = 1..base as i64;
            if u > 0.0 {
                while i <= j {
                    for k in multipliers.clone() {
                        let k = k as f64;
                        let t = if i < 0.0 { k / self.pows(-i) } else { k * self.pows(i) };
                        if t < u {
                            continue;
                        }
                        if t > v {
                            break;
                        }
                        z.push(t);
                    }
                    i += 1.0;
                }
            } else {
                while i <= j {
                    for k in multipliers.clone().rev() {
                        let k = k as f64;
                        let t = if i > 0.0 { k / self.pows(-i) } else { k * self.pows(i) };
                        if t < u {
                            continue;
                        }
                        if t > v {
                            break;
                        }
                        z.push(t);
                    }
                    i += 1.0;
                }
            }
            if z.len() * 2 < count {
                z = nice_ticks(u, v, n);
            }
        } else {
            z = nice_ticks(i, j, (j - i).min(n))
                .into_iter()
                .map(|x| self.pows(x))
                .collect();
        }

        if reverse {
            z.reverse();
        }
        z
    }

    fn domain(&self) -> (f64, f64) {
        self.domain
    }

    fn log_base(&self) -> Option<f64> {
        Some(self.base)
    }
}

/// Exact powers of ten for integral exponents.
fn pow10(x: f64) -> f64 {
    if x.fract() == 0.0 && x.abs() < 400.0 {
        format!("1e{}", x as i64).parse().unwrap_or_else(|_| 10f64.powf(x))
    } else {
        10f64.powf(x)
    }
}

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Integer bounds and increment of the tick sequence. A negative increment
/// means "divide by its magnitude", which keeps decimals exact.
fn tick_spec(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let inv = 10f64.powf(-power) / factor;
        i1 = js_round(start * inv);
        i2 = js_round(stop * inv);
        if i1 / inv < start {
            i1 += 1.0;
        }
        if i2 / inv > stop {
            i2 -= 1.0;
        }
        inc = -inv;
    } else {
        let step = 10f64.powf(power) * factor;
        i1 = js_round(start / step);
        i2 = js_round(stop / step);
        if i1 * step < start {
            i1 += 1.0;
        }
        if i2 * step > stop {
            i2 -= 1.0;
        }
        inc = step;
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

/// Roughly `count` round-valued ticks between `start` and `stop`,
/// inclusive, in the direction of the interval.
pub fn nice_ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !(count > 0.0) {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let reverse = stop < start;
    let (i1, i2, inc) = if reverse {
        tick_spec(stop, start, count)
    } else {
        tick_spec(start, stop, count)
    };
    if !(i2 >= i1) {
        return Vec::new();
    }

    let n = (i2 - i1 + 1.0) as usize;
    (0..n)
        .map(|i| {
            let k = if reverse { i2 - i as f64 } else { i1 + i as f64 };
            if inc < 0.0 {
                k / -inc
            } else {
                k * inc
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nice_ticks_decimal_steps() {
        assert_eq!(
            nice_ticks(0.0, 1.0, 5.0),
            vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]
        );
        assert_eq!(nice_ticks(0.0, 7.0, 4.0), vec![0.0, 2.0, 4.0, 6.0]);
        assert_eq!(nice_ticks(-10.0, 10.0, 4.0), vec![-10.0, -5.0, 0.0, 5.0, 10.0]);
    }

    #[test]
    fn nice_ticks_reversed_and_degenerate() {
        assert_eq!(nice_ticks(10.0, 0.0, 2.0), vec![10.0, 5.0, 0.0]);
        assert_eq!(nice_ticks(3.0, 3.0, 5.0), vec![3.0]);
        assert!(nice_ticks(0.0, 1.0, 0.0).is_empty());
        assert!(nice_ticks(f64::NAN, 1.0, 5.0).is_empty());
    }

    #[test]
    fn linear_map() {
        let scale = LinearScale::new((0.0, 10.0), (0.0, 200.0));
        assert_eq!(scale.map(2.5), 50.0);
        assert_eq!(scale.log_base(), None);
        assert_eq!(scale.ticks(2), vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn log_ticks_per_decade() {
        let scale = LogScale::new((1.0, 100.0), (0.0, 100.0), 10.0);
        let ticks = scale.ticks(10);
        assert_eq!(ticks.first(), Some(&1.0));
        assert_eq!(ticks.last(), Some(&100.0));
        assert_eq!(ticks.len(), 19);
        assert!(ticks.contains(&20.0));
        assert_eq!(scale.log_base(), Some(10.0));
    }

    #[test]
    fn log_ticks_over_many_decades_are_powers() {
        let scale = LogScale::new((1.0, 1e20), (0.0, 100.0), 10.0);
        let ticks = scale.ticks(5);
        assert_eq!(ticks, vec![1.0, 1e5, 1e10, 1e15, 1e20]);
    }

    #[test]
    fn narrow_log_domain_degrades_to_linear_ticks() {
        let scale = LogScale::new((1.0, 3.0), (0.0, 100.0), 10.0);
        assert_eq!(scale.ticks(10).len(), 11);
        assert_eq!(scale.ticks(6), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn log_map_and_reflection() {
        let scale = LogScale::new((1.0, 100.0), (0.0, 200.0), 10.0);
        assert_eq!(scale.map(10.0), 100.0);

        let scale = LogScale::new((-100.0, -1.0), (0.0, 100.0), 10.0);
        let ticks = scale.ticks(10);
        assert_eq!(ticks.first(), Some(&-100.0));
        assert_eq!(ticks.last(), Some(&-1.0));
    }
}
