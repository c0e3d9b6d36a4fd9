use std::collections::BTreeSet;
use std::fmt::Write;

pub fn plain_list_names(names: BTreeSet<String>) -> String {
    let mut s = String::new();
    let len = names.len();
    for (idx, n) in names.into_iter().enumerate() {
        if idx != 0 {
            if idx == len - 1 {
                if len == 2 {
                    s.push_str(" and ");
                } else {
                    s.push_str(", and ");
                }
            } else {
                s.push_str(", ");
            }
        }
        // Writing to a String can't fail
        let _ = write!(s, "{}", n);
    }
    s
}

pub fn prettyprint_usize(x: usize) -> String {
    let num = format!("{}", x);
    let mut result = String::new();
    let mut i = num.len();
    for c in num.chars() {
        result.push(c);
        i -= 1;
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
    }
    result
}

/// Rewind the cursor so a progress line can be overwritten.
pub fn clear_current_line() {
    print!("\r");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commas() {
        assert_eq!(prettyprint_usize(0), "0");
        assert_eq!(prettyprint_usize(999), "999");
        assert_eq!(prettyprint_usize(1000), "1,000");
        assert_eq!(prettyprint_usize(1234567), "1,234,567");
    }

    #[test]
    fn lists() {
        let names = |list: &[&str]| list.iter().map(|x| x.to_string()).collect::<BTreeSet<_>>();
        assert_eq!(plain_list_names(names(&["RD_A"])), "RD_A");
        assert_eq!(plain_list_names(names(&["RD_B", "RD_A"])), "RD_A and RD_B");
        assert_eq!(
            plain_list_names(names(&["RD_C", "RD_A", "RD_B"])),
            "RD_A, RD_B, and RD_C"
        );
    }
}
