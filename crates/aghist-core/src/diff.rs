/// Index-paired line diff in unified-style notation.
///
/// Lines are compared position by position, not via LCS, which is enough
/// to show what an edit touched without pulling in a diff engine. Equal
/// pairs render with a leading space, differing positions as `-old` then
/// `+new`. Identical inputs yield an empty string.
pub fn line_diff(old: &str, new: &str) -> String {
    if old == new {
        return String::new();
    }

    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let mut out = Vec::new();

    for i in 0..old_lines.len().max(new_lines.len()) {
        let old_line = old_lines.get(i);
        let new_line = new_lines.get(i);
        if old_line == new_line {
            if let Some(line) = old_line {
                out.push(format!(" {}", line));
            }
        } else {
            if let Some(line) = old_line {
                out.push(format!("-{}", line));
            }
            if let Some(line) = new_line {
                out.push(format!("+{}", line));
            }
        }
    }

    out.join("\n")
}
