use rust_decimal::Decimal;

use crate::model::{HeightTrend, Measurement};

pub const NOTE_NO_BASELINE: &str =
    "Tidak ada data sebelumnya untuk memverifikasi rasionalitas tinggi badan.";
pub const NOTE_NO_HEIGHT: &str = "Tidak ada data tinggi badan untuk periode ini.";
pub const NOTE_DECLINE_SAME_METHOD: &str = "Tinggi badan menurun, tidak rasional.";
pub const NOTE_SMALL_DECLINE: &str = "Penurunan kecil bisa karena beda metode ukur.";
pub const NOTE_LARGE_DECLINE: &str = "Penurunan besar, kemungkinan data salah.";
pub const NOTE_STABLE: &str = "Tinggi badan stabil dibanding bulan sebelumnya.";
pub const NOTE_GROWTH: &str = "Pertumbuhan tinggi badan normal.";

/// A decline below this many centimetres can come from switching between
/// lying and standing measurement.
pub const METHOD_TOLERANCE_CM: Decimal = Decimal::ONE;

/// Annotate each measurement with its height trend, in list order.
///
/// Each height is compared with the most recent earlier measurement that has
/// a height. The first measurement, and any measurement without a height or
/// without such a predecessor, has no baseline.
pub fn validate_height_trend(measurements: &mut [Measurement]) {
    let mut baseline: Option<(Decimal, String)> = None;

    for (i, m) in measurements.iter_mut().enumerate() {
        let method = m.method.clone().unwrap_or_default();
        let (trend, note) = match (i, m.height_cm, &baseline) {
            (0, _, _) | (_, _, None) => (HeightTrend::NoBaseline, NOTE_NO_BASELINE),
            (_, None, Some(_)) => (HeightTrend::NoBaseline, NOTE_NO_HEIGHT),
            (_, Some(current), Some((previous, previous_method))) => {
                compare(current, &method, *previous, previous_method)
            }
        };
        m.height_trend = trend;
        m.height_note = note.to_string();

        if let Some(height) = m.height_cm {
            baseline = Some((height, method));
        }
    }
}

fn compare(current: Decimal, method: &str, previous: Decimal, previous_method: &str) -> (HeightTrend, &'static str) {
    if current > previous {
        return (HeightTrend::Normal, NOTE_GROWTH);
    }
    if current == previous {
        return (HeightTrend::Normal, NOTE_STABLE);
    }
    if method.eq_ignore_ascii_case(previous_method) {
        (HeightTrend::Danger, NOTE_DECLINE_SAME_METHOD)
    } else if previous - current < METHOD_TOLERANCE_CM {
        (HeightTrend::AmbiguMethodology, NOTE_SMALL_DECLINE)
    } else {
        (HeightTrend::Danger, NOTE_LARGE_DECLINE)
    }
}
