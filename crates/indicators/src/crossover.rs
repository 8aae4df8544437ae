/// True when `a` moved from at-or-below `b` to strictly above it on the last bar.
pub fn crossed_above(a: &[f64], b: &[f64]) -> bool {
    match last_two_pairs(a, b) {
        Some(((a0, b0), (a1, b1))) => a0 <= b0 && a1 > b1,
        None => false,
    }
}

/// True when `a` moved from at-or-above `b` to strictly below it on the last bar.
pub fn crossed_below(a: &[f64], b: &[f64]) -> bool {
    match last_two_pairs(a, b) {
        Some(((a0, b0), (a1, b1))) => a0 >= b0 && a1 < b1,
        None => false,
    }
}

fn last_two_pairs(a: &[f64], b: &[f64]) -> Option<((f64, f64), (f64, f64))> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }
    let pairs = (
        (a[a.len() - 2], b[b.len() - 2]),
        (a[a.len() - 1], b[b.len() - 1]),
    );
    let all_finite = [pairs.0.0, pairs.0.1, pairs.1.0, pairs.1.1]
        .iter()
        .all(|v| v.is_finite());
    all_finite.then_some(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_crossings() {
        assert!(crossed_above(&[1.0, 3.0], &[2.0, 2.0]));
        assert!(crossed_above(&[2.0, 3.0], &[2.0, 2.0]));
        assert!(!crossed_above(&[3.0, 4.0], &[2.0, 2.0]));
        assert!(crossed_below(&[3.0, 1.0], &[2.0, 2.0]));
        assert!(!crossed_below(&[1.0, 0.0], &[2.0, 2.0]));
    }

    #[test]
    fn short_or_undefined_input_never_crosses() {
        assert!(!crossed_above(&[1.0], &[0.0]));
        assert!(!crossed_above(&[f64::NAN, 3.0], &[2.0, 2.0]));
        assert!(!crossed_below(&[], &[]));
    }
}
