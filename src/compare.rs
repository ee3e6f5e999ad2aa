use subtle::{Choice, ConstantTimeEq};

/// Compare two byte sequences in time that depends only on their lengths.
///
/// Every byte position up to the longer of the two lengths is visited, the shorter side
/// reading as zero past its end. Byte comparisons are combined as `subtle::Choice` values and
/// only converted to `bool` after the loop.
pub fn fixed_time_equal(lhs: &[u8], rhs: &[u8]) -> bool {
    let mut visited = 0;
    fixed_time_equal_counted(lhs, rhs, &mut visited)
}

pub(crate) fn fixed_time_equal_counted(lhs: &[u8], rhs: &[u8], visited: &mut usize) -> bool {
    let len = lhs.len().max(rhs.len());
    let mut equal: Choice = lhs.len().ct_eq(&rhs.len());
    for i in 0..len {
        let a = lhs.get(i).copied().unwrap_or(0);
        let b = rhs.get(i).copied().unwrap_or(0);
        equal &= a.ct_eq(&b);
        *visited += 1;
    }
    bool::from(equal)
}
