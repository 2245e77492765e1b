//! Frequency binning for one-dimensional arrays.

use crate::figure::Bin;

/// Integer data spanning at most this many values gets one bin per integer.
const MAX_UNIT_BINS: f64 = 100.0;

/// Unit bins need half-unit edges, which `f64` represents only below 2^52.
const MAX_UNIT_MAGNITUDE: f64 = 4_503_599_627_370_496.0;

/// Bins the finite values of `data`.
///
/// Integer-valued data with a small range gets unit-width bins centred on
/// each integer; anything else uses Sturges' rule over the data range.
/// Non-finite values are not counted.
#[must_use]
pub fn bin_values(data: &[f64]) -> Vec<Bin> {
    let finite: Vec<f64> = data.iter().copied().filter(|value| value.is_finite()).collect();
    let Some((low, high)) = extent(&finite) else {
        return Vec::new();
    };

    let integral = finite.iter().all(|value| value.fract() == 0.0);
    let unit_sized = high - low <= MAX_UNIT_BINS
        && low.abs() < MAX_UNIT_MAGNITUDE
        && high.abs() < MAX_UNIT_MAGNITUDE;
    let edges = if integral && unit_sized {
        unit_edges(low, high)
    } else {
        sturges_edges(low, high, finite.len())
    };

    let mut bins: Vec<Bin> = edges
        .windows(2)
        .filter_map(|pair| match pair {
            [start, end] => Some(Bin {
                start: *start,
                end: *end,
                count: 0,
            }),
            _ => None,
        })
        .collect();
    let last = bins.len().saturating_sub(1);
    for value in finite {
        let slot = bins
            .iter()
            .position(|bin| value >= bin.start && value < bin.end)
            .unwrap_or(last);
        if let Some(bin) = bins.get_mut(slot) {
            bin.count += 1;
        }
    }
    bins
}

fn extent(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, value| {
        Some(acc.map_or((*value, *value), |(low, high): (f64, f64)| {
            (low.min(*value), high.max(*value))
        }))
    })
}

fn unit_edges(low: f64, high: f64) -> Vec<f64> {
    let bins = (high - low).round() as usize + 1;
    let start = low - 0.5;
    (0..=bins).map(|index| start + index as f64).collect()
}

fn sturges_edges(low: f64, high: f64, count: usize) -> Vec<f64> {
    if (high - low).abs() < f64::EPSILON {
        return vec![low - 0.5, high + 0.5];
    }
    let bins = (count as f64).log2().ceil().max(0.0) as usize + 1;
    let width = (high - low) / bins as f64;
    (0..=bins)
        .map(|index| if index == bins { high } else { low + width * index as f64 })
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn small_integers_get_unit_bins() {
        let bins = bin_values(&[1.0, 1.0, 2.0, 3.0, 3.0, 3.0]);

        let centres: Vec<(f64, usize)> = bins.iter().map(|bin| (bin.centre(), bin.count)).collect();
        assert_eq!(centres, vec![(1.0, 2), (2.0, 1), (3.0, 3)]);
    }

    #[rstest]
    fn fractional_data_uses_sturges_rule() {
        let data: Vec<f64> = (0..16).map(|index| f64::from(index) * 0.25).collect();

        let bins = bin_values(&data);

        assert_eq!(bins.len(), 5);
        assert_eq!(bins.iter().map(|bin| bin.count).sum::<usize>(), 16);
        assert_eq!(bins.first().map(|bin| bin.start), Some(0.0));
        assert_eq!(bins.last().map(|bin| bin.end), Some(3.75));
    }

    #[rstest]
    fn constant_fractional_data_gets_one_bin() {
        let bins = bin_values(&[0.5, 0.5, 0.5]);

        assert_eq!(bins.len(), 1);
        assert_eq!(bins.first().map(|bin| bin.count), Some(3));
    }

    #[rstest]
    #[case(&[])]
    #[case(&[f64::NAN, f64::INFINITY])]
    fn nothing_finite_means_no_bins(#[case] data: &[f64]) {
        assert!(bin_values(data).is_empty());
    }

    #[rstest]
    #[case(&[7.0, 7.0, 7.0])]
    #[case(&[1e20, 1e20])]
    #[case(&[9_007_199_254_740_992.0, 9_007_199_254_740_994.0])]
    #[case(&[-9_007_199_254_740_994.0, -9_007_199_254_740_992.0, -9_007_199_254_740_992.0])]
    #[case(&[4_503_599_627_370_495.0, 4_503_599_627_370_496.0])]
    fn every_value_lands_in_a_bin(#[case] data: &[f64]) {
        let bins = bin_values(data);

        assert!(!bins.is_empty());
        assert_eq!(bins.iter().map(|bin| bin.count).sum::<usize>(), data.len());
    }

    #[rstest]
    fn constant_integers_get_one_unit_bin() {
        let bins = bin_values(&[7.0, 7.0, 7.0]);

        let spans: Vec<(f64, f64, usize)> =
            bins.iter().map(|bin| (bin.start, bin.end, bin.count)).collect();
        assert_eq!(spans, vec![(6.5, 7.5, 3)]);
    }

    #[rstest]
    fn non_finite_values_are_skipped() {
        let bins = bin_values(&[2.0, f64::NAN, 2.0]);

        assert_eq!(bins.len(), 1);
        assert_eq!(bins.first().map(|bin| bin.count), Some(2));
    }
}
