use std::cmp::Ordering;

/// Compare two alphanumeric identifiers the way a planner reads them:
/// digit runs compare by numeric value ("A2" < "A10"), letter runs compare
/// case-insensitively, and a shorter prefix sorts first.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ca = a.chars().peekable();
    let mut cb = b.chars().peekable();

    loop {
        match (ca.peek().copied(), cb.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                if x.is_ascii_digit() && y.is_ascii_digit() {
                    let na = take_number(&mut ca);
                    let nb = take_number(&mut cb);
                    match na.cmp(&nb) {
                        Ordering::Equal => {}
                        other => return other,
                    }
                } else {
                    ca.next();
                    cb.next();
                    let (lx, ly) = (
                        x.to_ascii_lowercase(),
                        y.to_ascii_lowercase(),
                    );
                    match lx.cmp(&ly) {
                        Ordering::Equal => {}
                        other => return other,
                    }
                }
            }
        }
    }
}

/// Consume a digit run and return its value with leading-zero tie-breaking:
/// the numeric value dominates, the run length breaks "007" vs "7".
fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> (u64, usize) {
    let mut value: u64 = 0;
    let mut len = 0usize;
    while let Some(c) = chars.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        chars.next();
        value = value.saturating_mul(10).saturating_add((c as u64) - ('0' as u64));
        len += 1;
    }
    (value, len)
}
