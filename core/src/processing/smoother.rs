/// Fill single-gate holes between flagged gates, scanning forward in place.
pub fn fill_pass(flags: &mut [bool]) {
    for gate in 1..flags.len().saturating_sub(1) {
        if flags[gate - 1] && flags[gate + 1] {
            flags[gate] = true;
        }
    }
}

/// Clear single flagged gates between unflagged gates, scanning forward
/// in place.
pub fn clear_pass(flags: &mut [bool]) {
    for gate in 1..flags.len().saturating_sub(1) {
        if !flags[gate - 1] && !flags[gate + 1] {
            flags[gate] = false;
        }
    }
}

/// Fill pass followed by clear pass.
pub fn smooth_flags(flags: &mut [bool]) {
    fill_pass(flags);
    clear_pass(flags);
}
