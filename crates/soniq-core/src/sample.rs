//! Shared buffer sampling helpers
//!
//! The radial visualizations aggregate the whole spectrum into a small number
//! of elements. Each element blends an interleaved stride (element `i` of `n`
//! reads indices `i`, `n + i`, `2n + i`, ...) with its contiguous home band,
//! then combines the running mean and peak half-and-half so quiet passages
//! still show shape while transients stay punchy.

/// Normalizes a frequency byte to `[0, 1]`.
#[inline]
pub fn normalize(byte: u8) -> f32 {
    byte as f32 / 255.0
}

/// Maps a time-domain byte (centered at 128) to `[-1, 1]`.
#[inline]
pub fn time_value(byte: u8) -> f32 {
    (byte as f32 - 128.0) / 128.0
}

/// Aggregated spectrum value for element `index` of `elements`, in `[0, 1]`.
///
/// Blends interleaved-stride samples with the element's contiguous band and
/// returns `mean * 0.5 + max * 0.5`, normalized. Callers apply their own
/// amplification and visual floor on top.
pub fn interleaved_value(data: &[u8], elements: usize, index: usize) -> f32 {
    if data.is_empty() || elements == 0 {
        return 0.0;
    }
    let mut sum = 0u32;
    let mut max = 0u8;
    let mut count = 0u32;

    let per_element = data.len() / elements;
    for j in 0..per_element {
        let value = data[(j * elements + index) % data.len()];
        sum += value as u32;
        max = max.max(value);
        count += 1;
    }

    let band_start = index * data.len() / elements;
    let band_size = data.len() / elements;
    for j in 0..band_size {
        let Some(&value) = data.get(band_start + j) else {
            break;
        };
        sum += value as u32;
        max = max.max(value);
        count += 1;
    }

    if count == 0 {
        return normalize(data[index % data.len()]);
    }
    let mean = sum as f32 / count as f32;
    (mean * 0.5 + max as f32 * 0.5) / 255.0
}

/// Mean of the contiguous band belonging to element `index` of `elements`.
pub fn band_average(data: &[u8], elements: usize, index: usize) -> f32 {
    if data.is_empty() || elements == 0 {
        return 0.0;
    }
    let start = index * data.len() / elements;
    let end = ((index + 1) * data.len() / elements).min(data.len());
    if start >= end {
        return normalize(data[start.min(data.len() - 1)]);
    }
    let sum: u32 = data[start..end].iter().map(|&b| b as u32).sum();
    normalize((sum / (end - start) as u32) as u8)
}

/// Mean of all frequency bytes, normalized to `[0, 1]`.
pub fn average(data: &[u8]) -> f32 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: u32 = data.iter().map(|&b| b as u32).sum();
    sum as f32 / data.len() as f32 / 255.0
}

/// Root-mean-square of a time-domain buffer, in `[0, 1]`.
pub fn rms(data: &[u8]) -> f32 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f32 = data.iter().map(|&b| time_value(b).powi(2)).sum();
    (sum / data.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_yields_zero() {
        let data = [0u8; 512];
        assert_eq!(interleaved_value(&data, 64, 0), 0.0);
        assert_eq!(average(&data), 0.0);
    }

    #[test]
    fn test_full_scale_yields_one() {
        let data = [255u8; 512];
        let v = interleaved_value(&data, 64, 10);
        assert!((v - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_blend_of_mean_and_peak() {
        // One loud bin inside element 0's stride, everything else silent.
        let mut data = [0u8; 64];
        data[0] = 255;
        let v = interleaved_value(&data, 64, 0);
        // stride contributes one sample (255), band contributes the same bin.
        // mean = 255, max = 255 over the two identical reads.
        assert!(v > 0.9);
        let quiet = interleaved_value(&data, 64, 1);
        assert_eq!(quiet, 0.0);
    }

    #[test]
    fn test_rms_of_centered_silence() {
        let data = [128u8; 1024];
        assert_eq!(rms(&data), 0.0);
    }

    #[test]
    fn test_rms_of_full_square_wave() {
        let mut data = [0u8; 8];
        for (i, b) in data.iter_mut().enumerate() {
            *b = if i % 2 == 0 { 0 } else { 255 };
        }
        let v = rms(&data);
        assert!(v > 0.98 && v <= 1.01);
    }

    #[test]
    fn test_time_value_center() {
        assert_eq!(time_value(128), 0.0);
        assert_eq!(time_value(0), -1.0);
        assert!((time_value(255) - 0.992).abs() < 0.01);
    }

    #[test]
    fn test_empty_buffers() {
        assert_eq!(interleaved_value(&[], 16, 3), 0.0);
        assert_eq!(band_average(&[], 16, 3), 0.0);
        assert_eq!(rms(&[]), 0.0);
    }
}
