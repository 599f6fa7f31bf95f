use log::debug;

use crate::number::js_round;
use crate::scale::TickScale;

// relative spread of tick spacing below which ticks count as arithmetic
const LINEARITY_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickMode {
    /// Round tick values chosen by the scale.
    #[default]
    Nice,
    /// Equal subdivisions of the domain including both ends.
    Exact,
}

/// Ticks for an axis with `ndiv` primary and optionally `ndiv2` secondary
/// divisions.
pub fn produce_ticks<S: TickScale + ?Sized>(
    scale: &S,
    ndiv: usize,
    ndiv2: Option<usize>,
    mode: TickMode,
) -> Vec<f64> {
    let (d0, d1) = scale.domain();
    // zero secondary divisions means none
    let ndiv2 = ndiv2.filter(|n| *n > 0);

    if mode == TickMode::Exact {
        let n = match ndiv2 {
            Some(ndiv2) => ndiv.saturating_sub(1) * ndiv2,
            None => ndiv,
        };
        if n == 0 {
            return vec![d0];
        }
        let nf = n as f64;
        return (0..=n)
            .map(|k| (d0 * (n - k) as f64 + d1 * k as f64) / nf)
            .collect();
    }

    let total = ndiv * ndiv2.unwrap_or(1);
    if scale.log_base().is_some() {
        return produce_log_ticks(scale, total);
    }

    // one extra tick is fine when it sits on a domain boundary
    let accept = |ticks: &[f64]| {
        if ticks.len() <= total {
            return true;
        }
        if ticks.len() > total + 1 {
            return false;
        }
        ticks[0] == d0 || ticks[total] == d1
    };

    let first = scale.ticks(total);
    if ndiv2.is_some() || accept(&first) {
        return first;
    }

    let retry_count = js_round(total as f64 * 0.7) as usize;
    let second = scale.ticks(retry_count);
    debug!(
        "{} ticks for {} divisions, retried with {}: {} ticks",
        first.len(),
        total,
        retry_count,
        second.len()
    );
    if second.len() > 2 && accept(&second) {
        second
    } else {
        first
    }
}

/// Log ticks, guarding against the arithmetic progressions log scales
/// produce for domains spanning less than a decade or so.
pub fn produce_log_ticks<S: TickScale + ?Sized>(scale: &S, count: usize) -> Vec<f64> {
    let mut count = count;
    let mut ticks = scale.ticks(count);

    while count > 4 && is_linear(&ticks) {
        count = js_round(count as f64 * 0.8) as usize;
        debug!("log ticks are arithmetic, asking for {}", count);
        ticks = scale.ticks(count);
    }

    if count < 5 && is_linear(&ticks) {
        if let Some(base) = scale.log_base().filter(|b| *b != 0.0 && *b != 10.0) {
            let log_base = base.log10();
            let powers: Vec<f64> = ticks
                .iter()
                .copied()
                .filter(|v| {
                    let pow = v.log10() / log_base;
                    (js_round(pow) - pow).abs() < 0.01
                })
                .collect();
            if !powers.is_empty() {
                ticks = powers;
            }
        }
    }

    ticks
}

// successive differences (nearly) constant
pub fn is_linear(ticks: &[f64]) -> bool {
    if ticks.len() < 2 {
        return false;
    }
    let n = (ticks.len() - 1) as f64;
    let (sum1, sum2) = ticks.windows(2).fold((0.0, 0.0), |(s1, s2), w| {
        let diff = w[1] - w[0];
        (s1 + diff, s2 + diff * diff)
    });
    let mean = sum1 / n;
    let dev = sum2 / n - mean * mean;

    if dev <= 0.0 {
        return true;
    }
    if mean.abs() < 1e-100 {
        return false;
    }
    dev.sqrt() / mean < LINEARITY_TOLERANCE
}
