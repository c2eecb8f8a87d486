use super::types::{CalibrationResult, CalibrationSample, Orientation, Q17, Q17_SHIFT};

/// `100 * min / max` must be strictly above `threshold`.
pub fn validate_precision(a: i32, b: i32, threshold: i32) -> bool {
    let (low, high) = if a > b { (b, a) } else { (a, b) };
    if high <= 0 {
        return false;
    }
    (100 * i64::from(low)) / i64::from(high) > i64::from(threshold)
}

/// Fits a transform to the four samples, trying landscape first.
///
/// Sample slots follow the on-screen order: top-left, bottom-left,
/// top-right, bottom-right. The pairings below assume exactly that order.
/// A hypothesis whose spans are degenerate falls through to the next one.
pub fn solve(samples: &[CalibrationSample; 4], threshold: i32) -> Option<CalibrationResult> {
    let precise_x = |a: usize, b: usize| validate_precision(samples[a].raw_x, samples[b].raw_x, threshold);
    let precise_y = |a: usize, b: usize| validate_precision(samples[a].raw_y, samples[b].raw_y, threshold);

    if precise_x(0, 1) && precise_x(2, 3) && precise_y(0, 2) && precise_y(1, 3) {
        if let Some(result) = fit(samples, Orientation::Landscape) {
            return Some(result);
        }
    }
    if precise_y(0, 1) && precise_y(2, 3) && precise_x(0, 2) && precise_x(1, 3) {
        return fit(samples, Orientation::Portrait);
    }
    None
}

fn fit(samples: &[CalibrationSample; 4], orientation: Orientation) -> Option<CalibrationResult> {
    // Portrait panels report the screen's x axis on the controller's y channel.
    // Sums of four readings can leave i32, so the arithmetic runs in i64.
    let raw = |index: usize| -> (i64, i64) {
        let sample = &samples[index];
        let (x, y) = match orientation {
            Orientation::Portrait => (sample.raw_y, sample.raw_x),
            Orientation::Landscape | Orientation::None => (sample.raw_x, sample.raw_y),
        };
        (i64::from(x), i64::from(y))
    };
    let (r0, r1, r2, r3) = (raw(0), raw(1), raw(2), raw(3));

    let scale_x = scale(
        samples[2].ref_x - samples[0].ref_x,
        r3.0 + r2.0 - r1.0 - r0.0,
    )?;
    let scale_y = scale(
        samples[1].ref_y - samples[0].ref_y,
        r3.1 - r2.1 + r1.1 - r0.1,
    )?;

    Some(CalibrationResult {
        scale_x,
        scale_y,
        offset_x: offset(samples[0].ref_x, r0.0 + r1.0, scale_x)?,
        offset_y: offset(samples[0].ref_y, r0.1 + r2.1, scale_y)?,
        orientation,
    })
}

fn scale(ref_span: i32, raw_span: i64) -> Option<Q17> {
    let shifted = i64::from(ref_span) << Q17_SHIFT;
    let bits = shifted.checked_div(raw_span)?;
    i32::try_from(bits).ok().map(Q17::from_bits)
}

fn offset(reference: i32, raw_sum: i64, scale: Q17) -> Option<i16> {
    let scaled = raw_sum.checked_mul(i64::from(scale.to_bits()))? >> Q17_SHIFT;
    Some((reference - i32::from(scaled as i16)) as i16)
}
