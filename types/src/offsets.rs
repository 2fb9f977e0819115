//! Conversion between relative and absolute output offsets.
//!
//! A keyed input lists the outputs it may spend as offsets within one amount
//! class. On the wire each offset is stored relative to the previous one (the
//! first is absolute).

use crate::TypesError;

/// Decode relative offsets into absolute output indices (running sum).
///
/// Fails on overflow, and on a zero step after the first entry, since that
/// would make the absolute sequence non-increasing.
pub fn relative_to_absolute(relative: &[u64]) -> Result<Vec<u64>, TypesError> {
    let mut absolute = Vec::with_capacity(relative.len());
    let mut running: u64 = 0;
    for (i, &step) in relative.iter().enumerate() {
        if i > 0 && step == 0 {
            return Err(TypesError::InvalidOffsets(format!(
                "duplicate output reference at position {i}"
            )));
        }
        running = running
            .checked_add(step)
            .ok_or_else(|| TypesError::InvalidOffsets("offset sum overflows u64".into()))?;
        absolute.push(running);
    }
    Ok(absolute)
}

/// Encode absolute output indices as relative offsets.
///
/// The input must be strictly increasing.
pub fn absolute_to_relative(absolute: &[u64]) -> Result<Vec<u64>, TypesError> {
    let mut relative = Vec::with_capacity(absolute.len());
    let mut previous: Option<u64> = None;
    for &index in absolute {
        let step = match previous {
            None => index,
            Some(prev) if index > prev => index - prev,
            Some(prev) => {
                return Err(TypesError::InvalidOffsets(format!(
                    "indices must be strictly increasing ({prev} then {index})"
                )))
            }
        };
        relative.push(step);
        previous = Some(index);
    }
    Ok(relative)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_sum() {
        assert_eq!(relative_to_absolute(&[5, 3, 10]).unwrap(), vec![5, 8, 18]);
    }

    #[test]
    fn first_offset_may_be_zero() {
        assert_eq!(relative_to_absolute(&[0, 1, 1]).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn empty_is_empty() {
        assert!(relative_to_absolute(&[]).unwrap().is_empty());
        assert!(absolute_to_relative(&[]).unwrap().is_empty());
    }

    #[test]
    fn zero_step_is_rejected() {
        assert!(relative_to_absolute(&[4, 0]).is_err());
    }

    #[test]
    fn overflow_is_rejected() {
        assert!(relative_to_absolute(&[u64::MAX, 1]).is_err());
    }

    #[test]
    fn unsorted_absolute_is_rejected() {
        assert!(absolute_to_relative(&[3, 3]).is_err());
        assert!(absolute_to_relative(&[7, 2]).is_err());
    }
}
